pub mod console;
pub mod format;
pub mod run_report;

pub use console::Console;
pub use format::format_duration;
pub use run_report::{RunFailure, RunReport, StepRecord};
