use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stroke_analysis::analysis::AnalysisPipeline;
use stroke_analysis::config::ConfigArgs;
use stroke_analysis::server::{metrics, run_server, ServerConfig};
use stroke_analysis::store::open_store;

#[derive(Parser, Debug)]
struct CliArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let app_config = cli_args.config.resolve()?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let store = open_store(app_config.store_backend, &app_config.data_dir)?;
    let pipeline = Arc::new(AnalysisPipeline::new(
        store,
        app_config.analysis_settings(),
    ));
    info!(
        "Measuring {} side joints, freeze threshold {} degrees",
        app_config.body_side, app_config.freeze_threshold_deg
    );

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        max_frames_per_request: app_config.max_frames_per_request,
    };
    run_server(server_config, pipeline).await
}
