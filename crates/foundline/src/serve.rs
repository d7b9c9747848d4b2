// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `foundline serve` command implementation.
//!
//! Opens the SQLite database, wires the claim engine, chat channel,
//! notification dispatcher, and presence registry together, and serves the
//! HTTP/WebSocket gateway until a shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use foundline_config::model::FoundlineConfig;
use foundline_core::{FoundlineError, ImageStore};
use foundline_engine::{ChatChannel, ClaimEngine, NotificationDispatcher};
use foundline_gateway::{GatewayState, ServerConfig, start_server};
use foundline_gateway::auth::AuthConfig;
use foundline_images::{DisabledImageStore, HttpImageStore};
use foundline_presence::PresenceRegistry;
use foundline_storage::Database;

use crate::shutdown;

/// Runs the `foundline serve` command.
pub async fn run_serve(config: FoundlineConfig) -> Result<(), FoundlineError> {
    init_tracing(&config.service.log_level);

    info!("starting foundline serve");

    let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(path = %config.storage.database_path, "database ready");

    let images: Arc<dyn ImageStore> = match &config.images.endpoint {
        Some(endpoint) => Arc::new(HttpImageStore::new(
            endpoint.clone(),
            config.images.upload_timeout_secs,
        )?),
        None => {
            info!("no image endpoint configured, proof uploads disabled");
            Arc::new(DisabledImageStore)
        }
    };

    let presence = PresenceRegistry::new();
    let dispatcher = NotificationDispatcher::new(db.clone(), presence.clone());
    let engine = ClaimEngine::new(db.clone(), dispatcher.clone(), images);
    let chat = ChatChannel::new(db.clone(), dispatcher.clone());

    let state = GatewayState {
        engine,
        chat,
        dispatcher,
        presence,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        start_time: std::time::Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        bearer_token: config.gateway.bearer_token.clone(),
        request_timeout: std::time::Duration::from_secs(config.gateway.request_timeout_secs),
    };

    let cancel = shutdown::install_signal_handler();
    let server_result = tokio::select! {
        result = start_server(&server_config, state) => result,
        _ = cancel.cancelled() => {
            info!("shutdown signal received, stopping gateway");
            Ok(())
        }
    };

    // Checkpoint the WAL even when the server loop died on an error.
    let close_result = db.close().await;
    shutdown_outcome(server_result, close_result)?;
    info!("foundline serve shutdown complete");
    Ok(())
}

/// Combine the server and close outcomes; the server error wins if both fail.
fn shutdown_outcome(
    server: Result<(), FoundlineError>,
    close: Result<(), FoundlineError>,
) -> Result<(), FoundlineError> {
    server?;
    close
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("foundline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_wins_over_close_error() {
        let err = shutdown_outcome(
            Err(FoundlineError::Internal("bind failed".to_string())),
            Err(FoundlineError::Internal("checkpoint failed".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, FoundlineError::Internal(msg) if msg == "bind failed"));
    }

    #[test]
    fn close_error_surfaces_after_clean_server_exit() {
        let err = shutdown_outcome(
            Ok(()),
            Err(FoundlineError::Internal("checkpoint failed".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, FoundlineError::Internal(msg) if msg == "checkpoint failed"));
    }
}
