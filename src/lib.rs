//! Library exports for the app binary and integration tests.
/// Per-user application directories.
pub mod app_dirs;
/// Experiment service seam and its HTTP implementation.
pub mod backend;
/// TOML settings.
pub mod config;
/// Request, result, and error types for one experiment.
pub mod experiment;
pub(crate) mod http_client;
/// Stdout and rolling file logging.
pub mod logging;
/// Orchestration state machine and background calls.
pub mod session;
/// egui front-end.
pub mod ui;
