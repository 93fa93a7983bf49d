use anyhow::{Context, Result};
use novel_perf_runner::{config, orchestrator, telemetry};
use config::Config;
use orchestrator::Orchestrator;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load().context("failed to load configuration")?;
    init_tracing(cfg.telemetry.json_logs);

    if cfg.auth.disabled {
        warn!("authentication disabled; requests carry no credentials");
    }
    info!(base_url = %cfg.target.base_url, "starting performance run");

    let mut orchestrator = Orchestrator::from_config(cfg)?;
    // Outcome is reported on the console; the exit status does not reflect it.
    orchestrator.run().await;

    Ok(())
}
