//! The computation core: normalize -> aggregate -> growth rate.
//!
//! Everything here is a pure function of its inputs; front-ends call these
//! again on every interaction instead of caching derived series.

pub mod aggregate;
pub mod growth;
pub mod normalize;
pub mod rolling;

pub use aggregate::aggregate;
pub use growth::{GROWTH_OFFSET, growth_rate};
pub use normalize::{Normalized, normalize, parse_date};
pub use rolling::ROLLING_WINDOW;
