//! `covid-dashboard` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that the
//! aggregation pipeline is testable without spawning processes or a terminal.

pub mod analytics;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
