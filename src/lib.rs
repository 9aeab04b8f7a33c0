//! Episodic microgrid energy-dispatch simulator.
//!
//! A plant of three diesel generators, a battery and a capacity-limited grid
//! tie line serves a PV-offset demand hour by hour. [`sim::env::MicrogridEnv`]
//! exposes the plant as a reset/step environment whose reward is the
//! negated hourly operating cost.

pub mod cli;
pub mod config;
/// Exogenous yearly series: calendar, storage, CSV ingestion, synthetic data.
pub mod data;
pub mod devices;
pub mod error;
/// Export of evaluated episodes.
pub mod io;
pub mod log;
/// Environment, settlement, policies, and episode evaluation.
pub mod sim;
