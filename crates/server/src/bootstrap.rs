use std::sync::Arc;

use mater_agent::llm::{HttpChatTransport, StreamError};
use mater_agent::runtime::AgentRuntime;
use mater_core::catalog::{Catalog, CatalogError};
use mater_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub api_state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog load failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("baseline material `{0}` is not in the catalog")]
    UnknownBaseline(String),
    #[error("assistant transport setup failed: {0}")]
    Transport(#[from] StreamError),
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

    let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref())?);
    if catalog.find(&config.catalog.baseline_material).is_none() {
        return Err(BootstrapError::UnknownBaseline(config.catalog.baseline_material.clone()));
    }
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        materials = catalog.len(),
        origins = catalog.origin_count(),
        source = config
            .catalog
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "bundled".to_string()),
        "material catalog loaded"
    );

    let transport = HttpChatTransport::from_config(&config.llm)?;
    info!(
        event_name = "system.bootstrap.transport_ready",
        correlation_id = "bootstrap",
        endpoint = %transport.endpoint(),
        model = %config.llm.model,
        credentials = config.has_llm_credentials(),
        "assistant transport configured"
    );

    let agent = AgentRuntime::new(catalog.clone(), Arc::new(transport));
    let api_state = ApiState::new(agent, config.catalog.baseline_material.clone());

    Ok(Application { config, catalog, api_state })
}
