use std::sync::Arc;

use tally_agent::{QueryResolver, RemoteError};
use tally_core::config::{AppConfig, ConfigError, LoadOptions};
use tally_core::Dataset;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub resolver: QueryResolver,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("remote client initialization failed: {0}")]
    Remote(#[from] RemoteError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let dataset = Dataset::sample();
    let summary = dataset.summary();
    info!(
        event_name = "system.bootstrap.dataset_loaded",
        correlation_id = "bootstrap",
        accounts = summary.accounts,
        deals = summary.deals,
        orphaned_deals = summary.orphaned_deals,
        "bundled dataset loaded"
    );

    let resolver = QueryResolver::from_config(&config, Arc::new(dataset))?;
    info!(
        event_name = "system.bootstrap.remote_mode",
        correlation_id = "bootstrap",
        remote_mode = if config.remote.active_url().is_some() { "webhook" } else { "local_only" },
        "query resolver ready"
    );

    Ok(Application { config, resolver })
}
