//! rwnews webhook server.
//!
//! Receives Mailgun inbound route deliveries on `/submit`, acknowledges them
//! immediately and processes each message in the background.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rwnews::web::{router, SignatureVerifier};
use rwnews::{AppState, Config, Dispatcher, Engine, MailgunSender, ReadabilityClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        group_address = %config.group_address,
        mailgun_domain = %config.mailgun_domain,
        readability_api_url = %config.readability_api_url,
        intake_queue_capacity = config.intake_queue_capacity,
        concurrency = config.worker_concurrency,
        request_timeout_ms = config.request_timeout_ms,
        mailgun_signing_configured = config.mailgun_signing_key.is_some(),
        "config_loaded"
    );

    // One HTTP client shared by the resolver and the sender
    let client = Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let resolver = ReadabilityClient::new(
        client.clone(),
        config.readability_api_url.clone(),
        config.readability_key.clone(),
    );
    let sender = MailgunSender::new(
        client,
        config.mailgun_api_base.clone(),
        config.mailgun_domain.clone(),
        config.mailgun_api_key.clone(),
    );
    let engine = Arc::new(Engine::new(
        config.group_address.clone(),
        Arc::new(resolver),
        Arc::new(sender),
    ));

    let (dispatcher, dispatch_loop) =
        Dispatcher::spawn(engine, config.intake_queue_capacity, config.worker_concurrency);

    let verifier = SignatureVerifier::from_key(
        config.mailgun_signing_key.as_deref(),
        config.mailgun_signature_max_age,
    );
    let app = router(AppState::new(dispatcher, verifier));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router held the last dispatcher handle; wait for in-flight messages
    dispatch_loop.await.context("Dispatcher task failed")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
