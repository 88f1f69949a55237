//! Region selector catalog.
//!
//! The selector shows French country names; the dataset uses English region
//! names. The mapping is fixed and checked against the loaded table at startup.

use crate::domain::types::{ObservationTable, RegionFilter};
use crate::error::AppError;

/// Label of the "all regions" sentinel option.
pub const ALL_REGIONS_LABEL: &str = "Tous les pays";

/// (display name, dataset region name) pairs, in selector order.
pub const REGION_NAMES: [(&str, &str); 30] = [
    ("Allemagne", "Germany"),
    ("Autriche", "Austria"),
    ("Belgique", "Belgium"),
    ("Bulgarie", "Bulgaria"),
    ("Croatie", "Croatia"),
    ("Chypre", "Cyprus"),
    ("Danemark", "Denmark"),
    ("Espagne", "Spain"),
    ("Estonie", "Estonia"),
    ("Finlande", "Finland"),
    ("France", "France"),
    ("Grèce", "Greece"),
    ("Hongrie", "Hungary"),
    ("Islande", "Iceland"),
    ("Irlande", "Ireland"),
    ("Italie", "Italy"),
    ("Lettonie", "Latvia"),
    ("Liechtenstein", "Liechtenstein"),
    ("Lituanie", "Lithuania"),
    ("Luxembourg", "Luxembourg"),
    ("Malte", "Malta"),
    ("Norvège", "Norway"),
    ("Pays-Bas", "Netherlands"),
    ("Pologne", "Poland"),
    ("Portugal", "Portugal"),
    ("Roumanie", "Romania"),
    ("Slovaquie", "Slovakia"),
    ("Slovénie", "Slovenia"),
    ("Suède", "Sweden"),
    ("Tchéquie", "Czechia"),
];

/// One entry of the region selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOption {
    pub label: &'static str,
    pub filter: RegionFilter,
}

/// Ordered selector options: the sentinel first, then one per mapped country.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    options: Vec<RegionOption>,
}

impl RegionCatalog {
    pub fn standard() -> Self {
        let mut options = Vec::with_capacity(REGION_NAMES.len() + 1);
        options.push(RegionOption {
            label: ALL_REGIONS_LABEL,
            filter: RegionFilter::All,
        });
        for (label, name) in REGION_NAMES {
            options.push(RegionOption {
                label,
                filter: RegionFilter::Region(name.to_string()),
            });
        }
        Self { options }
    }

    pub fn options(&self) -> &[RegionOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RegionOption> {
        self.options.get(idx)
    }

    /// Mapped regions that have no record in `table`.
    pub fn missing_in(&self, table: &ObservationTable) -> Vec<&'static str> {
        REGION_NAMES
            .iter()
            .filter(|(_, name)| !table.contains_region(name))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Fail fast when the dataset lacks any mapped region.
    pub fn validate(&self, table: &ObservationTable) -> Result<(), AppError> {
        let missing = self.missing_in(table);
        if missing.is_empty() {
            return Ok(());
        }
        log::warn!("region catalog: {} mapped region(s) absent from dataset", missing.len());
        Err(AppError::new(
            2,
            format!(
                "Dataset is missing mapped region(s): {}",
                missing.join(", ")
            ),
        ))
    }

    /// Position of the option matching a user-supplied selector value.
    ///
    /// Accepts the display label, the dataset region name (case-insensitive),
    /// or `all` for the sentinel.
    pub fn position(&self, input: &str) -> Option<usize> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Some(0);
        }
        self.options.iter().position(|opt| {
            opt.label.eq_ignore_ascii_case(input)
                || matches!(&opt.filter, RegionFilter::Region(name) if name.eq_ignore_ascii_case(input))
        })
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Observation;
    use chrono::NaiveDate;

    fn table_with(names: &[&str]) -> ObservationTable {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        ObservationTable::from_observations(
            names
                .iter()
                .map(|n| Observation {
                    date,
                    region_code: n[..2].to_uppercase(),
                    region_name: n.to_string(),
                    cases: 0,
                    deaths: 0,
                    year: 2021,
                    population: 0,
                })
                .collect(),
        )
    }

    #[test]
    fn sentinel_comes_first() {
        let catalog = RegionCatalog::standard();
        assert_eq!(catalog.len(), 31);
        assert_eq!(catalog.options()[0].label, ALL_REGIONS_LABEL);
        assert!(catalog.options()[0].filter.is_all());
    }

    #[test]
    fn positions_display_and_dataset_names() {
        let catalog = RegionCatalog::standard();
        let germany = catalog.position("Allemagne").unwrap();
        assert_eq!(catalog.get(germany).unwrap().filter, RegionFilter::Region("Germany".to_string()));
        assert_eq!(catalog.position("germany"), Some(germany));
        assert_eq!(catalog.position("Tous les pays"), Some(0));
        assert_eq!(catalog.position("all"), Some(0));
        assert_eq!(catalog.position(" DE "), None);
    }

    #[test]
    fn validation_lists_absent_regions() {
        let catalog = RegionCatalog::standard();
        let names: Vec<&str> = REGION_NAMES
            .iter()
            .map(|(_, n)| *n)
            .filter(|n| *n != "Malta" && *n != "Iceland")
            .collect();
        let table = table_with(&names);

        let missing = catalog.missing_in(&table);
        assert_eq!(missing, vec!["Iceland", "Malta"]);
        let err = catalog.validate(&table).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Iceland, Malta"));

        let all: Vec<&str> = REGION_NAMES.iter().map(|(_, n)| *n).collect();
        assert!(catalog.validate(&table_with(&all)).is_ok());
    }
}
