//! Typed views of the performance-test endpoint payloads.
//!
//! The service answers with loose JSON maps; every field that may be absent
//! is an `Option` here, and a missing `success` flag reads as `false`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `DELETE /performance-test/clear-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /performance-test/generate-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGenerationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub novel_count: Option<u64>,
    #[serde(default)]
    pub scene_count: Option<u64>,
    #[serde(default)]
    pub character_count: Option<u64>,
}

/// `GET /performance-test/stats`. Carries no success flag on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    #[serde(default)]
    pub novel_count: Option<u64>,
    #[serde(default)]
    pub scene_count: Option<u64>,
}

/// Result of one of the server-side load tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// concurrentUsers * requestsPerUser as planned by the service
    #[serde(default)]
    pub total_requests: Option<u64>,
    #[serde(default)]
    pub successful_requests: Option<u64>,
    #[serde(default)]
    pub total_time_ms: Option<u64>,
    #[serde(default)]
    pub requests_per_second: Option<Throughput>,
}

/// Requests per second as reported by the service.
///
/// The service pre-formats the figure (`"123.45"`); a plain number is
/// accepted too and shown with two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Throughput {
    Number(f64),
    Formatted(String),
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throughput::Number(n) => write!(f, "{n:.2}"),
            Throughput::Formatted(s) => f.write_str(s),
        }
    }
}

/// `GET /performance-test/server-status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default)]
    pub available_processors: Option<u32>,
    #[serde(default, rename = "maxMemoryMB")]
    pub max_memory_mb: Option<u64>,
    #[serde(default, rename = "totalMemoryMB")]
    pub total_memory_mb: Option<u64>,
    #[serde(default, rename = "usedMemoryMB")]
    pub used_memory_mb: Option<u64>,
    #[serde(default, rename = "freeMemoryMB")]
    pub free_memory_mb: Option<u64>,
    #[serde(default)]
    pub java_version: Option<String>,
    #[serde(default)]
    pub java_vendor: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub os_arch: Option<String>,
}

/// What a single step of the run produced, tagged by endpoint family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    Cleared(OperationResult),
    Generated(DataGenerationResult),
    Stats(DatabaseStats),
    LoadTest(LoadTestResult),
    ServerStatus(ServerStatus),
}

impl StepOutcome {
    /// Whether the service reported success. Stats and server status have
    /// no flag and count as successful once decoded.
    pub fn reported_success(&self) -> bool {
        match self {
            StepOutcome::Cleared(r) => r.success,
            StepOutcome::Generated(r) => r.success,
            StepOutcome::LoadTest(r) => r.success,
            StepOutcome::Stats(_) | StepOutcome::ServerStatus(_) => true,
        }
    }
}
