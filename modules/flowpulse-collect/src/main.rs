use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flowpulse_collect::pipeline::Pipeline;
use flowpulse_collect::profile;
use flowpulse_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flowpulse=info".parse()?))
        .init();

    info!("FlowPulse collector starting...");

    let config = Config::from_env();
    config.log_redacted();

    let pipeline = Pipeline::from_config(&config, profile::default_profile());
    let stats = pipeline.run().await?;

    info!(records = stats.records_total, "Collection finished");
    Ok(())
}
