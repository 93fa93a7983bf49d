//! The authenticated load-test sequence.
//!
//! `run` logs in (unless auth is disabled), then walks [`Step::SEQUENCE`]
//! one awaited call at a time, printing a block per response. The first
//! failing call ends the run; nothing is retried or rolled back.

use anyhow::Result;
use std::io::{Stdout, Write};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::client::{ApiError, HttpPerfTestApi, PerfTestApi};
use crate::config::Config;
use crate::domain::{LoginRequest, Step, StepOutcome};
use crate::report::{Console, RunFailure, RunReport};
use crate::session::{AuthMode, Session};

pub struct Orchestrator<W: Write = Stdout> {
    config: Config,
    api: Arc<dyn PerfTestApi>,
    console: Console<W>,
}

impl Orchestrator<Stdout> {
    /// Orchestrator talking HTTP to the configured service and printing to stdout
    pub fn from_config(config: Config) -> Result<Self> {
        let api = HttpPerfTestApi::new(config.target.base_url.clone(), config.target.http_timeout())?;
        Ok(Self::new(config, Arc::new(api), Console::stdout()))
    }
}

impl<W: Write> Orchestrator<W> {
    pub fn new(config: Config, api: Arc<dyn PerfTestApi>, console: Console<W>) -> Self {
        Self { config, api, console }
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    fn mode(&self) -> AuthMode {
        if self.config.auth.disabled {
            AuthMode::Unauthenticated
        } else {
            AuthMode::Authenticated
        }
    }

    /// Execute the whole run. All diagnostics end up on the console; the
    /// returned report is for callers that want the structured results.
    pub async fn run(&mut self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("perf_run", %run_id, base_url = %self.config.target.base_url);
        let report = self.run_sequence(run_id).instrument(span).await;

        if let Some(path) = self.config.report.output_path.clone() {
            match report.write_json(&path).await {
                Ok(()) => info!(path = %path.display(), "run report written"),
                Err(e) => warn!(error = %e, "failed to write run report"),
            }
        }

        report
    }

    async fn run_sequence(&mut self, run_id: Uuid) -> RunReport {
        let mode = self.mode();
        let mut report = RunReport::new(run_id, mode, self.config.target.base_url.clone());
        self.console.banner(mode);

        let session = match self.authenticate(mode).await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "authentication failed");
                match &e {
                    ApiError::MissingToken => {
                        self.console.failure("Authentication failed: no token returned")
                    }
                    other => self.console.auth_error(other),
                }
                self.console.failure("Authentication failed, cannot continue");
                report.fail(RunFailure::new("authenticate", &e));
                report.finish();
                return report;
            }
        };

        for step in Step::SEQUENCE {
            self.console.progress(step);
            match self.perform(step, &session).await {
                Ok(outcome) => {
                    if !outcome.reported_success() {
                        warn!(%step, "service reported failure");
                    }
                    self.console.outcome(step, &outcome);
                    report.record(step, outcome);
                }
                Err(e) => {
                    error!(%step, error = %e, "step failed, aborting run");
                    self.console.run_error(&e);
                    report.fail(RunFailure::new(step.to_string(), &e));
                    report.finish();
                    return report;
                }
            }
        }

        self.console.completed();
        info!(steps = report.steps.len(), "run completed");
        report.finish();
        report
    }

    async fn authenticate(&mut self, mode: AuthMode) -> Result<Session, ApiError> {
        if mode == AuthMode::Unauthenticated {
            self.console.info("Test mode: skipping authentication");
            return Ok(Session::unauthenticated());
        }

        self.console.info("Requesting authentication token...");
        let credentials = LoginRequest::new(&self.config.auth.username, &self.config.auth.password);
        let token = self
            .api
            .login(&credentials)
            .await?
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?;
        self.console.success("Obtained JWT token");

        let csrf = self.api.fetch_csrf_token(&token).await?;
        if csrf.is_some() {
            self.console.success("Obtained CSRF token");
        } else {
            warn!("no CSRF token returned");
            self.console.warning("Could not obtain CSRF token, continuing without it");
        }

        Ok(Session::authenticated(token).with_csrf_token(csrf))
    }

    async fn perform(&self, step: Step, session: &Session) -> Result<StepOutcome, ApiError> {
        let outcome = match step {
            Step::ClearData => StepOutcome::Cleared(self.api.clear_data(session).await?),
            Step::GenerateData => StepOutcome::Generated(
                self.api.generate_data(session, self.config.data.count).await?,
            ),
            Step::Stats => StepOutcome::Stats(self.api.stats(session).await?),
            Step::LoadTest(test) => {
                let profile = test.profile(&self.config.load);
                StepOutcome::LoadTest(self.api.run_load_test(session, test, profile).await?)
            }
            Step::ServerStatus => StepOutcome::ServerStatus(self.api.server_status(session).await?),
        };
        Ok(outcome)
    }
}
