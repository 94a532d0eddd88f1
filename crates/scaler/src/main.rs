//! Utility Scaler - utility-driven autoscaling daemon
//!
//! Periodically samples workload utilization metrics, scores a fixed
//! catalog of resource configurations against them, and reshapes each
//! monitored service when a new configuration stays preferred for a full
//! cycle.

use anyhow::{Context, Result};
use scaler_lib::actuator::{Actuator, CommandActuator, LogOnlyActuator};
use scaler_lib::catalog::ConfigurationCatalog;
use scaler_lib::controller::{ControlLoopBuilder, ServiceSpec};
use scaler_lib::criteria::{discover_services, load_criteria};
use scaler_lib::engine::ServiceTarget;
use scaler_lib::health::components;
use scaler_lib::sampler::SamplerLoopBuilder;
use scaler_lib::source::{HttpMetricsSource, SourceConfig};
use scaler_lib::store::{ControlStateStore, SampleLog};
use scaler_lib::{HealthRegistry, ScalerMetrics, StructuredLogger};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SCALER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting utility-scaler");

    // Load configuration
    let config = config::ScalerConfig::load()?;
    info!(
        namespace = %config.namespace,
        defs_dir = %config.defs_dir,
        "Scaler configured"
    );

    // Load static definitions: catalog plus per-service criteria
    let defs_dir = Path::new(&config.defs_dir);
    let catalog = ConfigurationCatalog::load(&defs_dir.join("catalog.json"))?;
    let services = discover_services(defs_dir)?;
    if services.is_empty() {
        anyhow::bail!("no service definitions found under {:?}", defs_dir);
    }

    let mut specs = Vec::with_capacity(services.len());
    let mut targets = Vec::with_capacity(services.len());
    for service in &services {
        let criteria = load_criteria(&defs_dir.join(service).join("criteria.json"))
            .with_context(|| format!("failed to load criteria for '{}'", service))?;
        let target = ServiceTarget::new(service.clone(), config.namespace.clone());
        targets.push(target.clone());
        specs.push(ServiceSpec { target, criteria });
    }
    info!(
        services = services.len(),
        configurations = catalog.len(),
        "Definitions loaded"
    );

    // Open durable stores
    let data_dir = Path::new(&config.data_dir);
    let samples = Arc::new(SampleLog::open(data_dir.join("samples"))?);
    let states = ControlStateStore::open(data_dir.join("state"))?;

    // Metrics source and actuator collaborators
    let source = Arc::new(HttpMetricsSource::new(SourceConfig {
        endpoint: config.metrics_endpoint.clone(),
        ..Default::default()
    })?);
    let actuator: Arc<dyn Actuator> = if config.dry_run {
        info!("Dry-run mode: reconfigurations will be logged, not applied");
        Arc::new(LogOnlyActuator)
    } else {
        Arc::new(CommandActuator::new(&config.actuator_path))
    };

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SAMPLER).await;
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::ACTUATOR).await;
    health_registry.register(components::STATE_STORE).await;

    // Initialize metrics and structured logging
    let metrics = ScalerMetrics::new();
    let logger = StructuredLogger::new(&config.namespace);
    logger.log_startup(SCALER_VERSION, services.len());

    // Build the loops
    let sampler = SamplerLoopBuilder::new()
        .source(source)
        .log(samples.clone())
        .targets(targets)
        .interval(Duration::from_secs(config.sample_interval_secs))
        .build()?;

    let control_loop = ControlLoopBuilder::new()
        .specs(specs)
        .catalog(catalog)
        .samples(samples)
        .states(states)
        .actuator(actuator)
        .cycle_interval(Duration::from_secs(config.cycle_interval_secs))
        .window_size(config.window_size)
        .namespace(config.namespace.clone())
        .build()?;

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics.clone(),
        control_loop.decisions(),
    ));

    // Shutdown fan-out for the loops
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

    // Mark ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server and both loops
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));
    let sampler_handle = tokio::spawn(sampler.run(shutdown_tx.subscribe()));
    let control_handle = tokio::spawn(control_loop.run(shutdown_tx.subscribe()));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    let _ = shutdown_tx.send(());
    let _ = tokio::join!(sampler_handle, control_handle);
    api_handle.abort();

    Ok(())
}
