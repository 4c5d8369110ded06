//! CLI command implementations

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use super::args::{Cli, Command};
use super::errors::CliResult;
use crate::config::AppConfig;
use crate::http_server::{AppState, HttpServer};
use crate::weather::OpenWeatherClient;

/// Dispatch a parsed command
pub async fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Serve { port } => serve(port).await,
    }
}

/// Boot the store, provision it, and serve HTTP until shutdown.
pub async fn serve(port: Option<u16>) -> CliResult<()> {
    init_tracing();

    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    if config.weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set; weather lookups will fail");
    }

    let weather = Arc::new(OpenWeatherClient::new(config.weather_api_key.clone()));
    let state = AppState::bootstrap(config, weather).await?;
    let server = HttpServer::new(Arc::new(state));

    server.start().await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
