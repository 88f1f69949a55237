//! Monthly growth rate of the 7-day case average.
//!
//! `rolling_cases_7d[last] / rolling_cases_7d[last - 30]`, where the offset is
//! a position in the series, not a calendar distance. With one row per day the
//! two coincide; with missing dates the ratio spans more than 30 days.

use crate::domain::{AggregatedSeries, GrowthRate};
use crate::error::PipelineError;

/// Positional offset between the two compared averages.
pub const GROWTH_OFFSET: usize = 30;

/// Compute the growth rate of `series`.
pub fn growth_rate(series: &AggregatedSeries) -> Result<GrowthRate, PipelineError> {
    let required = GROWTH_OFFSET + 1;
    let points = &series.points;
    if points.len() < required {
        return Err(PipelineError::InsufficientHistory {
            points: points.len(),
            required,
        });
    }

    let latest = &points[points.len() - 1];
    let prior = &points[points.len() - 1 - GROWTH_OFFSET];

    let (Some(latest_avg), Some(prior_avg)) = (latest.rolling_cases_7d, prior.rolling_cases_7d) else {
        return Err(PipelineError::InsufficientHistory {
            points: points.len(),
            required,
        });
    };

    if prior_avg == 0.0 {
        return Err(PipelineError::UndefinedGrowthRate {
            prior_date: prior.date,
        });
    }

    Ok(GrowthRate {
        value: latest_avg / prior_avg,
        latest_date: latest.date,
        latest_avg,
        prior_date: prior.date,
        prior_avg,
    })
}
