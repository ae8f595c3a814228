//! Chanclas artifact service entrypoint.
//!
//! Wires configuration into the core services (chain fetcher, generator,
//! artifact cache), mounts the router, and serves until interrupted.

mod router;

use std::sync::Arc;

use anyhow::{Context, Result};
use chanclas_core::{
    artifact::{ArtifactCache, ArtifactStore},
    chain::{HttpTransport, RotatingFetcher},
    config::AppConfig,
    generator::{Generator, LayerCompositor, MetadataBuilder, TraitSelector},
    rarity::RarityLoader,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,chanclas_core={level},server={level}",
            level = config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

fn init_cache(config: &AppConfig) -> Result<ArtifactCache> {
    let transport = HttpTransport::new(config.chain_request_timeout())
        .context("HTTP transport initialization failed")?;
    let fetcher = RotatingFetcher::new(
        transport,
        config.chain.rpc_urls.clone(),
        config.chain.contract_address.clone(),
        config.backoff_base(),
    )
    .context("chain fetcher initialization failed")?;

    let generator = Generator::new(
        TraitSelector::new(config.generator.secret_salt.clone()),
        LayerCompositor::new(config.generator.layers_dir.clone()),
        MetadataBuilder::new(config.collection.clone()),
        Arc::new(RarityLoader::new(config.generator.rarity_dir.clone())),
    );

    Ok(ArtifactCache::new(
        ArtifactStore::new(config.generator.output_dir.clone()),
        Arc::new(fetcher),
        generator,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&config);

    config.validate().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let cache = init_cache(&config)?;
    let app = router::build_router(
        Arc::new(router::AppState { cache }),
        config.server.max_concurrent_requests,
    );

    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        endpoints = config.chain.rpc_urls.len(),
        contract = %config.chain.contract_address,
        "chanclas server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}
