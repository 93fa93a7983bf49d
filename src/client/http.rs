use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{ApiError, PerfTestApi};
use crate::config::LoadProfile;
use crate::domain::{
    DataGenerationResult, DatabaseStats, LoadTest, LoadTestResult, LoginRequest, LoginResponse,
    OperationResult, ServerStatus,
};
use crate::session::{Session, CSRF_HEADER};

const LOGIN_PATH: &str = "/auth/login";
const CSRF_PATH: &str = "/auth/csrf";
const CLEAR_DATA_PATH: &str = "/performance-test/clear-data";
const GENERATE_DATA_PATH: &str = "/performance-test/generate-data";
const STATS_PATH: &str = "/performance-test/stats";
const SERVER_STATUS_PATH: &str = "/performance-test/server-status";

/// reqwest-backed client for the performance-test endpoints
#[derive(Clone)]
pub struct HttpPerfTestApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPerfTestApi {
    /// `timeout` of `None` leaves requests unbounded; the load-test
    /// endpoints only answer once the whole server-side run is over.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("novel-perf-runner/", env!("CARGO_PKG_VERSION"))),
        );
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.into(),
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session: &Session,
        needs_csrf: bool,
    ) -> Result<RequestBuilder, ApiError> {
        let headers = session.headers(needs_csrf)?;
        debug!(%method, path, "sending request");
        Ok(self.client.request(method, self.url(path)).headers(headers))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            path: path.to_string(),
            source,
        };

        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        debug!(path, %status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            body,
            source,
        })
    }
}

#[async_trait]
impl PerfTestApi for HttpPerfTestApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        debug!(username = %credentials.username, "logging in");
        let req = self.client.post(self.url(LOGIN_PATH)).json(credentials);
        self.send(req, LOGIN_PATH).await
    }

    async fn fetch_csrf_token(&self, access_token: &str) -> Result<Option<String>, ApiError> {
        let transport = |source| ApiError::Transport {
            path: CSRF_PATH.to_string(),
            source,
        };
        let req = self.client.get(self.url(CSRF_PATH)).bearer_auth(access_token);
        let resp = req.send().await.map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.map_err(transport)?;
            return Err(ApiError::Status {
                path: CSRF_PATH.to_string(),
                status,
                body,
            });
        }

        Ok(resp
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    async fn clear_data(&self, session: &Session) -> Result<OperationResult, ApiError> {
        let req = self.request(Method::DELETE, CLEAR_DATA_PATH, session, true)?;
        self.send(req, CLEAR_DATA_PATH).await
    }

    async fn generate_data(
        &self,
        session: &Session,
        count: u32,
    ) -> Result<DataGenerationResult, ApiError> {
        let path = format!("{GENERATE_DATA_PATH}?count={count}");
        let req = self
            .request(Method::POST, &path, session, true)?
            .json(&serde_json::json!({}));
        self.send(req, GENERATE_DATA_PATH).await
    }

    async fn stats(&self, session: &Session) -> Result<DatabaseStats, ApiError> {
        let req = self.request(Method::GET, STATS_PATH, session, false)?;
        self.send(req, STATS_PATH).await
    }

    async fn run_load_test(
        &self,
        session: &Session,
        test: LoadTest,
        profile: LoadProfile,
    ) -> Result<LoadTestResult, ApiError> {
        let path = format!(
            "{}?concurrentUsers={}&requestsPerUser={}",
            test.path(),
            profile.concurrent_users,
            profile.requests_per_user
        );
        let mut req = self.request(test.method(), &path, session, test.is_write())?;
        if test.is_write() {
            req = req.json(&serde_json::json!({}));
        }
        self.send(req, test.path()).await
    }

    async fn server_status(&self, session: &Session) -> Result<ServerStatus, ApiError> {
        let req = self.request(Method::GET, SERVER_STATUS_PATH, session, false)?;
        self.send(req, SERVER_STATUS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = HttpPerfTestApi::new("http://localhost:8088/api/", None).unwrap();
        assert_eq!(api.url(STATS_PATH), "http://localhost:8088/api/performance-test/stats");

        let api = HttpPerfTestApi::new("http://localhost:8088/api", None).unwrap();
        assert_eq!(api.url(LOGIN_PATH), "http://localhost:8088/api/auth/login");
    }
}
