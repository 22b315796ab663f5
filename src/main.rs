//! ircwebhook - IRC to Discord webhook bridge
//!
//! A bot that sits in IRC channels and posts their activity to Discord
//! channels through webhooks.

mod bridge;
mod common;
mod config;
mod discord;
mod protocol;

use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bridge::Bridge;
use common::reconnect::{connection_backoff, MAX_DELAY};
use config::{env::get_config_path, load_and_validate};
use discord::{WebhookClient, WebhookDispatcher};
use protocol::SessionEnd;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("ircwebhook v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See config.example.json for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!(
        "  Server: {}:{}{}",
        config.host,
        config.port,
        if config.secure { " (TLS)" } else { "" }
    );
    info!("  Nick: {}", config.nick);
    if let Some(relay) = &config.relay {
        info!("  Relay bot: {}", relay);
    }

    // ============================================================
    // Create bridge
    // ============================================================
    let webhooks = WebhookClient::new(&config.webhook_api)?;
    let mut bridge = Bridge::new(&config, WebhookDispatcher::new(webhooks));
    let channels_to_join = bridge.channels_to_join().to_vec();
    info!("  Channels: {}", channels_to_join.join(", "));

    // ============================================================
    // Start IRC client in separate task
    // ============================================================
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let mut irc_task = tokio::spawn(async move {
        let mut backoff = connection_backoff();

        loop {
            // Check for shutdown before connecting
            if *shutdown_rx.borrow() {
                info!("Shutdown signal detected, stopping reconnection loop");
                break;
            }

            match protocol::connect(&config, &channels_to_join).await {
                Ok(mut session) => {
                    let result = session.run(&mut bridge, &mut shutdown_rx).await;

                    // Reset backoff once the server has accepted us
                    if session.registered() {
                        backoff = connection_backoff();
                    }

                    match result {
                        Ok(SessionEnd::Shutdown) => break,
                        Ok(SessionEnd::Disconnected) => info!("Disconnected from IRC server"),
                        Err(e) => error!("IRC connection error: {}", e),
                    }
                }
                Err(e) => {
                    error!("Connection failed: {}", e);
                }
            }

            // Calculate backoff delay
            let delay = backoff.next().unwrap_or(MAX_DELAY);
            info!("Reconnecting in {:.1} seconds...", delay.as_secs_f64());

            // Wait for delay OR shutdown signal
            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received during backoff");
                        break;
                    }
                }
            }
        }
    });

    // ============================================================
    // Run until a signal arrives or the client gives up
    // ============================================================
    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            true
        }
        _ = &mut irc_task => false,
    };

    // Handle graceful shutdown
    if shutdown {
        // Signal the IRC client to quit (if channel closed, client is already gone)
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (IRC client already exited): {}", e);
        }
        match tokio::time::timeout(Duration::from_secs(5), irc_task).await {
            Ok(Ok(())) => info!("IRC client disconnected gracefully"),
            Ok(Err(e)) => warn!("IRC client task panicked: {}", e),
            Err(_) => warn!("IRC disconnect timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
