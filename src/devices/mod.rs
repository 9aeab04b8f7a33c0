//! Physical and economic models of the microgrid's assets.

/// Stationary battery storage model.
pub mod battery;
/// Dispatchable diesel generator model.
pub mod generator;
/// External grid tie-line model.
pub mod grid;
pub mod types;

// Re-export the main types for convenience
pub use battery::{Battery, BatteryParams};
pub use generator::{Generator, GeneratorParams};
pub use grid::GridConnection;
pub use types::DispatchableAsset;
