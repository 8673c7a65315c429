//! porc-server: live pig-logistics simulation
//!
//! - Serves the static dataset over HTTP
//! - Streams simulation events to map clients over `/ws`

use porc_server::simulation::SimulationRunner;
use porc_server::utils::init_logger;
use porc_server::{AppState, Config, api};
use shared::StaticDataset;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    init_logger(config.log_dir.as_deref(), config.is_production());

    tracing::info!("Starting porc-server (env: {})", config.environment);

    let dataset = match StaticDataset::load_dir(&config.data_dir) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(code = %e.code(), "Static dataset not loaded: {e}");
            StaticDataset::default()
        }
    };

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let simulation = config.simulation.clone();
    let state = AppState::new(config, dataset);

    let shutdown = CancellationToken::new();
    let runner = SimulationRunner::new(state.dataset.clone(), state.hub.clone(), simulation);
    let runner_handle = tokio::spawn(runner.run(shutdown.clone()));

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("porc-server HTTP listening on {http_addr}");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    runner_handle.await?;
    tracing::info!("porc-server stopped");
    Ok(())
}
