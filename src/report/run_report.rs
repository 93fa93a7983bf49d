use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

use crate::client::ApiError;
use crate::domain::{Step, StepOutcome};
use crate::session::AuthMode;

/// Machine-readable record of a run, written as JSON when configured
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub mode: AuthMode,
    pub base_url: String,
    pub steps: Vec<StepRecord>,
    pub failure: Option<RunFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: StepOutcome,
}

/// Where and why the run stopped early
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    /// `authenticate` or the name of the failing step
    pub stage: String,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl RunFailure {
    pub fn new(stage: impl Into<String>, error: &ApiError) -> Self {
        Self {
            stage: stage.into(),
            message: error.to_string(),
            status: error.status().map(|s| s.as_u16()),
            body: error.body().map(str::to_string),
        }
    }
}

impl RunReport {
    pub fn new(run_id: Uuid, mode: AuthMode, base_url: impl Into<String>) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            mode,
            base_url: base_url.into(),
            steps: Vec::new(),
            failure: None,
        }
    }

    pub fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepRecord { step, outcome });
    }

    pub fn fail(&mut self, failure: RunFailure) {
        self.failure = Some(failure);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when every step of the sequence ran
    pub fn completed(&self) -> bool {
        self.failure.is_none() && self.steps.len() == Step::SEQUENCE.len()
    }

    pub async fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(self).context("serializing run report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatabaseStats, OperationResult};
    use reqwest::StatusCode;

    fn sample() -> RunReport {
        RunReport::new(Uuid::new_v4(), AuthMode::Authenticated, "http://localhost:8088/api")
    }

    #[test]
    fn test_partial_run_is_not_completed() {
        let mut report = sample();
        report.record(
            Step::ClearData,
            StepOutcome::Cleared(OperationResult { success: true, message: None }),
        );
        report.fail(RunFailure::new(
            Step::GenerateData.to_string(),
            &ApiError::Status {
                path: "/performance-test/generate-data".into(),
                status: StatusCode::BAD_GATEWAY,
                body: "upstream down".into(),
            },
        ));
        report.finish();

        assert!(!report.completed());
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.stage, "generate-data");
        assert_eq!(failure.status, Some(502));
        assert_eq!(failure.body.as_deref(), Some("upstream down"));
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let mut report = sample();
        report.record(
            Step::Stats,
            StepOutcome::Stats(DatabaseStats { novel_count: Some(3), scene_count: Some(15) }),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["mode"], "authenticated");
        assert_eq!(value["steps"][0]["step"], "stats");
        assert_eq!(value["steps"][0]["outcome"]["kind"], "stats");
        assert!(value["failure"].is_null());
    }

    #[tokio::test]
    async fn test_write_json_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("perf-report-{}", Uuid::new_v4()));
        let path = dir.join("nested").join("run.json");

        sample().write_json(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(written["base_url"], "http://localhost:8088/api");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
