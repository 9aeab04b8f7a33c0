//! Exogenous time-series inputs: calendar indexing, storage, and ingestion.

pub mod calendar;
/// CSV ingestion and rescaling of the raw yearly series.
pub mod loader;
pub mod store;
/// Deterministic synthetic year for demos and tests.
pub mod synthetic;

pub use calendar::{CalendarDay, HOURS_PER_DAY, HOURS_PER_YEAR, MONTH_LENGTHS, days_in_month};
pub use store::{Series, TimeSeriesStore};
pub use synthetic::SyntheticProfile;
