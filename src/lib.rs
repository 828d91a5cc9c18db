pub mod cli;
pub mod core;
pub mod providers;
pub mod rpc;
pub mod service;
pub mod store;

use crate::cli::query::Query;
use crate::core::config::AppConfig;
use crate::service::CurrencyService;
use crate::store::{RateStore, SystemClock};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub enum AppCommand {
    Serve,
    Query {
        query: Query,
        /// Server address overriding the configured one
        server: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Serve => {
            let config = load_config(config_path)?;
            serve(&config).await
        }
        AppCommand::Query { query, server } => {
            let address = match server {
                Some(address) => address,
                None => load_config(config_path)?.server.address(),
            };
            cli::query::run(&address, query).await
        }
    }
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Builds the rate store and handlers described by `config`. Completes the
/// initial rate load before returning.
pub async fn build_service(config: &AppConfig) -> Result<CurrencyService> {
    let source = providers::from_config(&config.source)?;
    let store = RateStore::new(source, Arc::new(SystemClock), config.refresh_interval()).await;
    let status = store.status();
    info!(
        base = %status.base,
        currencies = status.currencies,
        degraded = status.degraded,
        "Rate store ready"
    );
    Ok(CurrencyService::new(Arc::new(store)))
}

async fn serve(config: &AppConfig) -> Result<()> {
    info!("Currency service starting...");
    let service = build_service(config).await?;

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    rpc::serve(listener, service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await
}
