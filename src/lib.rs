//! Driver for the novel service performance-test endpoints.
//!
//! Logs in, reseeds test data, triggers the server-side load tests and
//! prints what the service reports back.

pub mod client;
pub mod config;
pub mod domain;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use orchestrator::Orchestrator;
