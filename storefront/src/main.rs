//! Storefront Server
//!
//! Serves the event catalog and creates hosted-checkout orders.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Builds the payment client and order orchestrator
//! - Registers the IPN URL when one is configured without a notification id
//! - Serves the HTTP API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! PESAPAL_CONSUMER_KEY=... PESAPAL_CONSUMER_SECRET=... PESAPAL_SANDBOX=true \
//!     cargo run --bin storefront
//! ```

use anyhow::Context;
use boxoffice_gateway::EnvCredentials;
use boxoffice_storefront::{build_router, AppState, Config, OrderOrchestrator};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront server...");

    let catalog = config.load_catalog().context("Failed to load catalog")?;
    let client = config.payment_client().context("Failed to build payment client")?;
    tracing::info!(
        base_url = %client.base_url(),
        timeout_secs = config.gateway.timeout_secs,
        event = %catalog.event.title,
        ticket_types = catalog.ticket_types.len(),
        "Configuration loaded"
    );

    let mut orchestrator = OrderOrchestrator::new(
        client,
        Arc::new(EnvCredentials),
        Arc::new(catalog),
        config.order.clone(),
    );

    if let Some(ipn_url) = &config.gateway.ipn_url {
        if orchestrator.settings().notification_id.is_empty() {
            orchestrator = register_ipn(orchestrator, ipn_url, &config).await;
        }
    }

    let app = build_router(AppState::new(orchestrator));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!(%address, "Storefront server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

/// Register the IPN URL and adopt the returned id. Failure is logged and
/// orders proceed without a notification id.
async fn register_ipn(orchestrator: OrderOrchestrator, url: &str, config: &Config) -> OrderOrchestrator {
    match orchestrator
        .register_ipn(url, config.gateway.ipn_notification_type)
        .await
    {
        Ok(response) => match response.ipn_id.filter(|id| !id.is_empty()) {
            Some(ipn_id) => {
                tracing::info!(%url, %ipn_id, "IPN URL registered");
                orchestrator.with_notification_id(ipn_id)
            }
            None => {
                tracing::warn!(%url, error = ?response.error, "IPN registration returned no id");
                orchestrator
            }
        },
        Err(failure) => {
            tracing::warn!(%url, kind = ?failure.kind, "IPN registration failed");
            orchestrator
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
