//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> world series -> region series -> growth rate
//!
//! Interactions are explicit: a front-end applies an [`Interaction`] to its
//! [`ViewState`] and, when the state changed, calls [`compute_view`] again.

use crate::analytics::{aggregate, growth_rate};
use crate::domain::{AggregatedSeries, GrowthRate, RegionCatalog, RegionFilter};
use crate::error::PipelineError;
use crate::io::ingest::Dataset;

/// Interaction-scoped state: the only inputs besides the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub show_raw: bool,
    /// Index into the region catalog (0 is the all-regions sentinel).
    pub selected: usize,
    /// A region key outside the catalog (CLI `--region` with a raw code).
    pub custom_region: Option<String>,
}

/// A user action that may change the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    ToggleRaw,
    SelectNext,
    SelectPrev,
    Select(usize),
}

impl ViewState {
    /// Build a state from a selector value (display name, region name/code,
    /// or the sentinel).
    pub fn for_region(catalog: &RegionCatalog, input: Option<&str>) -> Self {
        let mut state = ViewState::default();
        let Some(input) = input else { return state };
        match catalog.position(input) {
            Some(idx) => state.selected = idx,
            None => state.custom_region = Some(input.trim().to_string()),
        }
        state
    }

    /// Apply an interaction; returns whether the state changed.
    pub fn apply(&mut self, interaction: Interaction, catalog: &RegionCatalog) -> bool {
        let before = self.clone();
        match interaction {
            Interaction::ToggleRaw => self.show_raw = !self.show_raw,
            // Leaving a custom region lands on the current catalog entry first.
            Interaction::SelectNext | Interaction::SelectPrev if self.custom_region.is_some() => {
                self.custom_region = None;
            }
            Interaction::SelectNext => {
                if self.selected + 1 < catalog.len() {
                    self.selected += 1;
                }
            }
            Interaction::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            Interaction::Select(idx) => {
                if idx < catalog.len() {
                    self.selected = idx;
                    self.custom_region = None;
                }
            }
        }
        *self != before
    }

    pub fn filter(&self, catalog: &RegionCatalog) -> RegionFilter {
        if let Some(key) = &self.custom_region {
            return RegionFilter::Region(key.clone());
        }
        catalog
            .get(self.selected)
            .map(|opt| opt.filter.clone())
            .unwrap_or(RegionFilter::All)
    }

    /// Label of the current selection for headers.
    pub fn label<'a>(&'a self, catalog: &'a RegionCatalog) -> &'a str {
        if let Some(key) = &self.custom_region {
            return key;
        }
        catalog.get(self.selected).map(|opt| opt.label).unwrap_or("-")
    }
}

/// All computed outputs for one view state.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub world: AggregatedSeries,
    /// `Err(UnknownRegion)` renders as an empty state.
    pub region: Result<AggregatedSeries, PipelineError>,
    /// `Err` renders as "not available".
    pub growth: Result<GrowthRate, PipelineError>,
    pub show_raw: bool,
}

/// Recompute every derived series for `state`.
///
/// The world aggregation over the full table cannot fail; only the region
/// branch and the growth rate carry recoverable errors.
pub fn compute_view(dataset: &Dataset, catalog: &RegionCatalog, state: &ViewState) -> DashboardView {
    let table = dataset.table.as_ref();
    let world = match aggregate(table, &RegionFilter::All) {
        Ok(series) => series,
        Err(err) => {
            log::warn!("world aggregation failed: {err}");
            AggregatedSeries {
                filter: RegionFilter::All,
                points: Vec::new(),
            }
        }
    };

    let filter = state.filter(catalog);
    let region = if filter.is_all() {
        Ok(world.clone())
    } else {
        aggregate(table, &filter)
    };
    let growth = match &region {
        Ok(series) => growth_rate(series),
        Err(err) => Err(err.clone()),
    };
    if let Err(err) = &growth {
        log::debug!("growth rate unavailable for {}: {err}", filter.label());
    }

    DashboardView {
        world,
        region,
        growth,
        show_raw: state.show_raw,
    }
}
