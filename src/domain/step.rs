use reqwest::Method;
use serde::Serialize;
use std::fmt;

use crate::config::{LoadConfig, LoadProfile};

/// The server-side load tests the run triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum LoadTest {
    #[strum(serialize = "novel query")]
    NovelQuery,
    #[strum(serialize = "scene query")]
    SceneQuery,
    #[strum(serialize = "novel create")]
    NovelCreate,
}

impl LoadTest {
    pub fn path(&self) -> &'static str {
        match self {
            LoadTest::NovelQuery => "/performance-test/novel-query-test",
            LoadTest::SceneQuery => "/performance-test/scene-query-test",
            LoadTest::NovelCreate => "/performance-test/novel-create-test",
        }
    }

    /// Create tests write to the service and need the CSRF header
    pub fn is_write(&self) -> bool {
        matches!(self, LoadTest::NovelCreate)
    }

    pub fn method(&self) -> Method {
        if self.is_write() {
            Method::POST
        } else {
            Method::GET
        }
    }

    pub fn profile(&self, load: &LoadConfig) -> LoadProfile {
        if self.is_write() {
            load.create
        } else {
            load.query
        }
    }
}

/// One step of the test sequence after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    ClearData,
    GenerateData,
    Stats,
    LoadTest(LoadTest),
    ServerStatus,
}

impl Step {
    /// Fixed execution order
    pub const SEQUENCE: [Step; 7] = [
        Step::ClearData,
        Step::GenerateData,
        Step::Stats,
        Step::LoadTest(LoadTest::NovelQuery),
        Step::LoadTest(LoadTest::SceneQuery),
        Step::LoadTest(LoadTest::NovelCreate),
        Step::ServerStatus,
    ];

    /// Heading of the result block
    pub fn title(&self) -> &'static str {
        match self {
            Step::ClearData => "Clear test data",
            Step::GenerateData => "Generate test data",
            Step::Stats => "Database statistics",
            Step::LoadTest(LoadTest::NovelQuery) => "Novel query performance test",
            Step::LoadTest(LoadTest::SceneQuery) => "Scene query performance test",
            Step::LoadTest(LoadTest::NovelCreate) => "Novel create performance test",
            Step::ServerStatus => "Server status",
        }
    }

    /// Line printed before the request goes out
    pub fn progress_message(&self) -> &'static str {
        match self {
            Step::ClearData => "Clearing existing test data...",
            Step::GenerateData => "Generating test data...",
            Step::Stats => "Fetching database statistics...",
            Step::LoadTest(LoadTest::NovelQuery) => "Running novel query performance test...",
            Step::LoadTest(LoadTest::SceneQuery) => "Running scene query performance test...",
            Step::LoadTest(LoadTest::NovelCreate) => "Running novel create performance test...",
            Step::ServerStatus => "Fetching server status...",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::ClearData => f.write_str("clear-data"),
            Step::GenerateData => f.write_str("generate-data"),
            Step::Stats => f.write_str("stats"),
            Step::LoadTest(test) => write!(f, "{test} test"),
            Step::ServerStatus => f.write_str("server-status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_load_test_is_in_sequence() {
        for test in LoadTest::iter() {
            assert!(Step::SEQUENCE.contains(&Step::LoadTest(test)), "{test} missing");
        }
    }

    #[test]
    fn test_only_create_is_write() {
        assert!(LoadTest::NovelCreate.is_write());
        assert_eq!(LoadTest::NovelCreate.method(), Method::POST);
        assert!(!LoadTest::NovelQuery.is_write());
        assert_eq!(LoadTest::SceneQuery.method(), Method::GET);
    }

    #[test]
    fn test_profiles_follow_test_kind() {
        let load = LoadConfig::default();
        assert_eq!(LoadTest::NovelQuery.profile(&load), load.query);
        assert_eq!(LoadTest::SceneQuery.profile(&load), load.query);
        assert_eq!(LoadTest::NovelCreate.profile(&load), load.create);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::ClearData.to_string(), "clear-data");
        assert_eq!(Step::LoadTest(LoadTest::SceneQuery).to_string(), "scene query test");
    }
}
