//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and normalized observations (`RawObservation`, `Observation`)
//! - the immutable observation table (`ObservationTable`)
//! - aggregation outputs (`AggregatedSeries`, `SeriesPoint`, `GrowthRate`)
//! - the fixed region selector catalog (`regions`)

pub mod regions;
pub mod types;

pub use regions::*;
pub use types::*;
