use std::fmt::Arguments;
use std::io::{self, Stdout, Write};
use tracing::warn;

use super::format::{format_duration, or_na};
use crate::client::ApiError;
use crate::domain::{
    DataGenerationResult, DatabaseStats, LoadTestResult, OperationResult, ServerStatus, Step,
    StepOutcome,
};
use crate::session::AuthMode;

const RULE: &str = "===================================";

/// Human-readable output of a run.
///
/// Write failures are logged and otherwise ignored; losing a line of
/// console output must not abort the run.
pub struct Console<W: Write = Stdout> {
    out: W,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            warn!(error = %e, "console write failed");
        }
    }

    pub fn banner(&mut self, mode: AuthMode) {
        self.emit(format_args!("Starting novel service performance test..."));
        self.emit(format_args!("Run mode: {mode}"));
    }

    pub fn info(&mut self, message: &str) {
        self.emit(format_args!("{message}"));
    }

    pub fn success(&mut self, message: &str) {
        self.emit(format_args!("✓ {message}"));
    }

    pub fn warning(&mut self, message: &str) {
        self.emit(format_args!("! {message}"));
    }

    pub fn failure(&mut self, message: &str) {
        self.emit(format_args!("✗ {message}"));
    }

    pub fn progress(&mut self, step: Step) {
        self.emit(format_args!("\n{}", step.progress_message()));
    }

    /// Status code and body when the service answered, nothing otherwise
    fn error_details(&mut self, error: &ApiError) {
        if let Some(status) = error.status() {
            self.emit(format_args!("Status code: {}", status.as_u16()));
        }
        if let Some(body) = error.body() {
            self.emit(format_args!("Error body: {}", body.trim()));
        }
    }

    pub fn auth_error(&mut self, error: &ApiError) {
        self.failure(&format!("Error during authentication: {error}"));
        self.error_details(error);
    }

    /// The single block printed when a step of the sequence fails
    pub fn run_error(&mut self, error: &ApiError) {
        self.emit(format_args!("\n✗ Error during test run:"));
        if error.status().is_none() {
            self.emit(format_args!("{error}"));
        }
        self.error_details(error);
    }

    pub fn completed(&mut self) {
        self.emit(format_args!("\n✓ All tests completed!"));
    }

    fn header(&mut self, title: &str) {
        self.emit(format_args!("\n{RULE}"));
        self.emit(format_args!("{title}"));
        self.emit(format_args!("{RULE}"));
    }

    fn verdict(&mut self, success: bool, message: &Option<String>) {
        let message = message.as_deref().unwrap_or("");
        if success {
            self.success(message);
        } else {
            self.failure(message);
        }
    }

    pub fn outcome(&mut self, step: Step, outcome: &StepOutcome) {
        self.header(step.title());
        match outcome {
            StepOutcome::Cleared(r) => self.operation(r),
            StepOutcome::Generated(r) => self.generation(r),
            StepOutcome::Stats(r) => self.stats(r),
            StepOutcome::LoadTest(r) => self.load_test(r),
            StepOutcome::ServerStatus(r) => self.server_status(r),
        }
    }

    fn operation(&mut self, result: &OperationResult) {
        self.verdict(result.success, &result.message);
    }

    fn generation(&mut self, result: &DataGenerationResult) {
        self.verdict(result.success, &result.message);
        if !result.success {
            return;
        }
        if result.novel_count.unwrap_or(0) > 0 {
            self.emit(format_args!("Novels: {}", or_na(&result.novel_count)));
            self.emit(format_args!("Scenes: {}", or_na(&result.scene_count)));
            self.emit(format_args!("Characters: {}", or_na(&result.character_count)));
        }
    }

    fn stats(&mut self, stats: &DatabaseStats) {
        self.emit(format_args!("Novels: {}", or_na(&stats.novel_count)));
        self.emit(format_args!("Scenes: {}", or_na(&stats.scene_count)));
    }

    fn load_test(&mut self, result: &LoadTestResult) {
        self.verdict(result.success, &result.message);
        if !result.success {
            return;
        }
        if result.total_requests.unwrap_or(0) > 0 {
            self.emit(format_args!("Total requests: {}", or_na(&result.total_requests)));
            self.emit(format_args!(
                "Successful requests: {}",
                or_na(&result.successful_requests)
            ));
            let elapsed = result
                .total_time_ms
                .map(format_duration)
                .unwrap_or_else(|| "n/a".to_string());
            self.emit(format_args!("Total time: {elapsed}"));
            self.emit(format_args!(
                "Requests per second: {}/s",
                or_na(&result.requests_per_second)
            ));
        }
    }

    fn server_status(&mut self, status: &ServerStatus) {
        self.emit(format_args!("Processors: {}", or_na(&status.available_processors)));
        self.emit(format_args!("Max memory: {}MB", or_na(&status.max_memory_mb)));
        self.emit(format_args!("Total memory: {}MB", or_na(&status.total_memory_mb)));
        self.emit(format_args!("Used memory: {}MB", or_na(&status.used_memory_mb)));
        self.emit(format_args!("Free memory: {}MB", or_na(&status.free_memory_mb)));

        let mut runtime = or_na(&status.java_version);
        if let Some(vendor) = &status.java_vendor {
            runtime.push_str(&format!(" ({vendor})"));
        }
        self.emit(format_args!("Java version: {runtime}"));

        let mut os = format!("{} {}", or_na(&status.os_name), or_na(&status.os_version));
        if let Some(arch) = &status.os_arch {
            os.push_str(&format!(" ({arch})"));
        }
        self.emit(format_args!("Operating system: {os}"));
    }
}
