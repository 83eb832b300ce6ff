//! Mintflow application composition root
//!
//! Builds the pinning and ledger providers from configuration and composes
//! them into a `PublishWorkflow`.

use std::sync::Arc;

use mintflow_common::Config;
use mintflow_ledger::{AssetPublisher, LedgerConfig, LedgerService, LedgerServiceFactory};
use mintflow_pinning::{
    ContentUploader, MetadataPublisher, PinningConfig, PinningService, PinningServiceFactory,
};
use mintflow_publishing::PublishWorkflow;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// JSON output when `LOG_FORMAT=json`, human-readable otherwise.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.rust_log)
        .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG filter '{}': {}", config.rust_log, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.log_format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Create the publish workflow from configuration
pub fn create_workflow(config: &Config) -> anyhow::Result<PublishWorkflow> {
    let pinning_config = PinningConfig::from_config(config);
    let gateway_url = pinning_config.gateway_url.clone();
    let pinning: Arc<dyn PinningService> = Arc::from(PinningServiceFactory::create(pinning_config)?);

    let ledger_config = LedgerConfig::from_config(config)?;
    let ledger: Arc<dyn LedgerService> = Arc::from(LedgerServiceFactory::create(&ledger_config)?);

    tracing::info!(
        pinning_provider = %config.pinning_provider,
        ledger_provider = %config.ledger_provider,
        cluster = %ledger_config.cluster,
        "Publish workflow created"
    );

    Ok(PublishWorkflow::new(
        ContentUploader::new(pinning.clone(), gateway_url.as_str()),
        MetadataPublisher::new(pinning, gateway_url),
        AssetPublisher::new(ledger, &ledger_config),
    ))
}

/// Load configuration from the environment, install tracing and build the workflow
pub fn bootstrap() -> anyhow::Result<PublishWorkflow> {
    let config = Config::from_env()?;
    init_tracing(&config)?;
    tracing::info!(?config, "Configuration loaded");
    create_workflow(&config)
}
