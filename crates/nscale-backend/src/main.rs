//! Nscale configuration check
//!
//! Usage: `nscale-check <config> [component=quantity ...]`

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nscale_backend::{AgentConfig, InMemoryComputeApi, NscaleBackend, BACKEND_VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Nscale backend check v{}", BACKEND_VERSION);

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: nscale-check <config> [component=quantity ...]");
    };

    // Load configuration
    let config = AgentConfig::load(&path)?;
    info!(
        api_url = %config.settings.api_url,
        organization_id = %config.settings.organization_id,
        project_id = %config.settings.project_id,
        resource_type = ?config.settings.resource_type,
        "Loaded settings"
    );
    for (name, spec) in config.components.iter() {
        info!(
            component = name,
            unit_factor = %spec.unit_factor(),
            measured_unit = spec.measured_unit(),
            "Component"
        );
    }

    let backend = NscaleBackend::new(config, Arc::new(InMemoryComputeApi::new()));
    backend.ping(true).await?;
    backend.diagnostics().await;

    for arg in args {
        let (component, quantity) = arg
            .split_once('=')
            .with_context(|| format!("expected component=quantity, got {}", arg))?;
        let quantity: f64 = quantity
            .parse()
            .with_context(|| format!("invalid quantity for {}", component))?;

        let converted = backend.converter().to_backend(component, quantity)?;
        println!("{} = {} -> {}", component, quantity, converted);
    }

    Ok(())
}
