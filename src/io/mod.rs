/// CSV and JSON export of evaluated episodes.
pub mod export;

pub use export::{export_csv, export_json, write_csv, write_json};
