//! Reporting utilities: formatted terminal output for the `summary` and
//! `regions` commands.

pub mod format;

pub use format::*;
