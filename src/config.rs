use anyhow::{anyhow, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Config file read when `PERF_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Env var overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PERF_CONFIG";
/// Prefix for nested env overrides, e.g. `PERF__TARGET__BASE_URL`.
pub const ENV_PREFIX: &str = "PERF__";
/// `TEST_MODE=true` runs against a deployment without auth.
pub const TEST_MODE_ENV: &str = "TEST_MODE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub auth: AuthConfig,
    pub data: DataConfig,
    pub load: LoadConfig,
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Root of the service API, e.g. `http://localhost:8088/api`
    pub base_url: String,
    /// Per-request timeout. Unset means the HTTP client default (none).
    pub http_timeout_seconds: Option<u64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8088/api".to_string(),
            http_timeout_seconds: None,
        }
    }
}

impl TargetConfig {
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Skip login and send no credentials at all
    pub disabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            disabled: false,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Number of novels the service should generate
    pub count: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { count: 20 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    pub query: LoadProfile,
    pub create: LoadProfile,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            query: LoadProfile { concurrent_users: 50, requests_per_user: 10 },
            create: LoadProfile { concurrent_users: 20, requests_per_user: 5 },
        }
    }
}

/// Shape of a server-side load test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoadProfile {
    pub concurrent_users: u32,
    pub requests_per_user: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json_logs: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Where to write the JSON run report, if anywhere
    pub output_path: Option<PathBuf>,
}

impl Config {
    /// Load from the config file, `PERF__*` env vars and `TEST_MODE`.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::from_figment(Self::figment(&path))?;
        if test_mode_from_env() {
            cfg.auth.disabled = true;
        }
        Ok(cfg)
    }

    /// Built-in defaults, then the TOML file, then `PERF__*` env vars.
    /// Each layer overrides individual keys of the one below.
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("invalid configuration")?;
        cfg.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.target.base_url.trim();
        if url.is_empty() {
            return Err("target.base_url cannot be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("target.base_url must be an http(s) URL, got {url}"));
        }

        if self.data.count == 0 {
            return Err("data.count must be at least 1".to_string());
        }

        for (name, profile) in [("query", &self.load.query), ("create", &self.load.create)] {
            if profile.concurrent_users == 0 {
                return Err(format!("load.{name}.concurrent_users must be at least 1"));
            }
            if profile.requests_per_user == 0 {
                return Err(format!("load.{name}.requests_per_user must be at least 1"));
            }
        }

        if !self.auth.disabled && self.auth.username.is_empty() {
            return Err("auth.username is required unless auth is disabled".to_string());
        }

        Ok(())
    }
}

fn test_mode_from_env() -> bool {
    std::env::var(TEST_MODE_ENV).map(|v| v == "true").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = Config::from_figment(Config::figment(DEFAULT_CONFIG_PATH))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.target.base_url, "http://localhost:8088/api");
            assert_eq!(cfg.data.count, 20);
            assert_eq!(cfg.load.query, LoadProfile { concurrent_users: 50, requests_per_user: 10 });
            assert_eq!(cfg.load.create, LoadProfile { concurrent_users: 20, requests_per_user: 5 });
            assert_eq!(cfg.auth.username, "admin");
            assert!(!cfg.auth.disabled);
            assert!(cfg.target.http_timeout().is_none());
            assert!(cfg.report.output_path.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "perf.toml",
                r#"
                [target]
                base_url = "http://perf.internal:9000/api"
                http_timeout_seconds = 120

                [data]
                count = 5

                [load.query]
                concurrent_users = 4
                requests_per_user = 2
                "#,
            )?;
            jail.set_env(CONFIG_PATH_ENV, "perf.toml");
            jail.set_env("PERF__DATA__COUNT", "7");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.target.base_url, "http://perf.internal:9000/api");
            assert_eq!(cfg.target.http_timeout(), Some(Duration::from_secs(120)));
            assert_eq!(cfg.data.count, 7);
            assert_eq!(cfg.load.query.concurrent_users, 4);
            // untouched sections keep their defaults
            assert_eq!(cfg.load.create.concurrent_users, 20);
            Ok(())
        });
    }

    #[test]
    fn test_single_profile_field_from_env_keeps_other_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("PERF__LOAD__QUERY__CONCURRENT_USERS", "4");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.load.query, LoadProfile { concurrent_users: 4, requests_per_user: 10 });
            assert_eq!(cfg.load.create, LoadProfile { concurrent_users: 20, requests_per_user: 5 });
            Ok(())
        });
    }

    #[test]
    fn test_single_profile_field_from_toml_keeps_other_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("perf.toml", "[load.create]\nconcurrent_users = 3")?;
            jail.set_env(CONFIG_PATH_ENV, "perf.toml");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.load.create, LoadProfile { concurrent_users: 3, requests_per_user: 5 });
            assert_eq!(cfg.load.query.requests_per_user, 10);
            Ok(())
        });
    }

    #[test]
    fn test_config_path_override() {
        Jail::expect_with(|jail| {
            jail.create_file("staging.toml", "[auth]\nusername = \"perf\"\npassword = \"secret\"")?;
            jail.set_env(CONFIG_PATH_ENV, "staging.toml");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.auth.username, "perf");
            assert_eq!(cfg.auth.password, "secret");
            Ok(())
        });
    }

    #[test]
    fn test_test_mode_disables_auth() {
        Jail::expect_with(|jail| {
            jail.set_env(TEST_MODE_ENV, "true");
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert!(cfg.auth.disabled);
            Ok(())
        });
    }

    #[test]
    fn test_test_mode_requires_literal_true() {
        Jail::expect_with(|jail| {
            jail.set_env(TEST_MODE_ENV, "1");
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert!(!cfg.auth.disabled);
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());

        cfg.target.base_url = "localhost:8088".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.data.count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.load.create.requests_per_user = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.auth.username.clear();
        assert!(cfg.validate().is_err());
        cfg.auth.disabled = true;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let cfg = Config::default();
        let rendered = format!("{:?}", cfg.auth);
        assert!(!rendered.contains("admin123"));
    }
}
