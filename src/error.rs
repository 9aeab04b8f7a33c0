//! Error types shared across the data, simulation, and configuration layers.

use std::path::PathBuf;

use thiserror::Error;

/// An out-of-range calendar index (month, day, or hour of day).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("month {0} is outside 1..=12")]
    Month(u32),
    #[error("day {day} is outside 1..={days_in_month} for month {month}")]
    Day {
        month: u32,
        day: u32,
        days_in_month: u32,
    },
    #[error("hour {0} is outside 0..24")]
    Hour(usize),
}

/// A fatal problem with the exogenous time-series inputs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read \"{path}\": {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("\"{path}\" has no column named \"{column}\"")]
    MissingColumn { path: PathBuf, column: String },
    #[error("\"{path}\" row {row}: cannot parse \"{value}\" as a number")]
    Parse {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("{series} series has {actual} hourly entries, expected {expected}")]
    Length {
        series: &'static str,
        actual: usize,
        expected: usize,
    },
}

/// Errors raised by the environment's runtime contract.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("step called before the first reset")]
    NotReset,
    #[error("invalid episode anchor: {0}")]
    Anchor(#[from] CalendarError),
    #[error("action has {actual} components, expected {expected}")]
    ActionDimension { actual: usize, expected: usize },
}

/// Logger initialisation failures.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("unknown log level \"{0}\" (expected off, error, warn, info, debug or trace)")]
    UnknownLevel(String),
    #[error("cannot install the log subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}
