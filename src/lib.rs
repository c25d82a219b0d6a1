//! Per-circuit-group net supply aggregation for grid upgrade prioritization.

pub mod cli;
pub mod config;
/// Worker pool, dispatch and result channels, netting, and run summary.
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod runner;
pub mod synthetic;
