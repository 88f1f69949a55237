//! Error types.
//!
//! Two layers:
//! - [`PipelineError`]: failures of the data pipeline itself (load, aggregate,
//!   growth rate). The dashboard turns the recoverable ones into messages.
//! - [`AppError`]: anything that ends the process, carrying its exit code.

use chrono::NaiveDate;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the normalize / aggregate / growth-rate pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Unparseable date, bad integer cell, or a missing required column.
    ///
    /// `line` is the 1-based CSV line when the problem is row-specific.
    MalformedInput { line: Option<usize>, message: String },
    /// The region filter does not match any record.
    UnknownRegion(String),
    /// Not enough points (or no 7-day average yet) to compute a growth rate.
    InsufficientHistory { points: usize, required: usize },
    /// The 7-day average 30 points back is zero.
    UndefinedGrowthRate { prior_date: NaiveDate },
}

impl PipelineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            line: None,
            message: message.into(),
        }
    }

    pub fn malformed_at(line: usize, message: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Whether the dashboard can keep running and show a message instead.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::MalformedInput { .. })
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MalformedInput { line: Some(line), message } => {
                write!(f, "Malformed input (line {line}): {message}")
            }
            PipelineError::MalformedInput { line: None, message } => {
                write!(f, "Malformed input: {message}")
            }
            PipelineError::UnknownRegion(key) => {
                write!(f, "No data for region '{key}'.")
            }
            PipelineError::InsufficientHistory { points, required } => {
                write!(
                    f,
                    "Not enough history: {points} point(s), at least {required} with a 7-day average needed."
                )
            }
            PipelineError::UndefinedGrowthRate { prior_date } => {
                write!(f, "Growth rate undefined: 7-day average was zero on {prior_date}.")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let code = if err.is_recoverable() { 3 } else { 2 };
        AppError::new(code, err.to_string())
    }
}
