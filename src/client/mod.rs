pub mod error;
pub mod http;

pub use error::ApiError;
pub use http::HttpPerfTestApi;

use async_trait::async_trait;

use crate::config::LoadProfile;
use crate::domain::{
    DataGenerationResult, DatabaseStats, LoadTest, LoadTestResult, LoginRequest, LoginResponse,
    OperationResult, ServerStatus,
};
use crate::session::Session;

/// The performance-test surface of the novel service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PerfTestApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// Anti-forgery token from the `x-csrf-token` response header, if any
    async fn fetch_csrf_token(&self, access_token: &str) -> Result<Option<String>, ApiError>;

    async fn clear_data(&self, session: &Session) -> Result<OperationResult, ApiError>;

    async fn generate_data(
        &self,
        session: &Session,
        count: u32,
    ) -> Result<DataGenerationResult, ApiError>;

    async fn stats(&self, session: &Session) -> Result<DatabaseStats, ApiError>;

    async fn run_load_test(
        &self,
        session: &Session,
        test: LoadTest,
        profile: LoadProfile,
    ) -> Result<LoadTestResult, ApiError>;

    async fn server_status(&self, session: &Session) -> Result<ServerStatus, ApiError>;
}
