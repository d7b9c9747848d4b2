// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use foundline_core::FoundlineError;
use foundline_engine::{ChatChannel, ClaimEngine, NotificationDispatcher};
use foundline_presence::PresenceRegistry;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: ClaimEngine,
    pub chat: ChatChannel,
    pub dispatcher: NotificationDispatcher,
    pub presence: PresenceRegistry,
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from foundline-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for auth (None = identity headers only).
    pub bearer_token: Option<String>,
    /// Per-request deadline for the REST routes.
    pub request_timeout: Duration,
}

/// Build the full gateway router.
///
/// Split from [`start_server`] so tests can serve it on an ephemeral port.
/// The timeout applies to the REST routes only; `/ws` connections are
/// long-lived and `/health` must answer even under load.
pub fn build_router(state: GatewayState, request_timeout: Duration) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated liveness probe.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/claims", post(handlers::post_claims))
        .route("/v1/claims/{id}", get(handlers::get_claim))
        .route("/v1/claims/{id}/status", post(handlers::post_claim_status))
        .route(
            "/v1/claims/{id}/messages",
            post(handlers::post_claim_message).get(handlers::get_claim_messages),
        )
        .route("/v1/items/{id}/claims", get(handlers::list_item_claims))
        .route("/v1/notifications", get(handlers::get_notifications))
        .route(
            "/v1/notifications/read",
            post(handlers::post_notifications_read),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state.clone());

    // WebSocket route (identity checked during the upgrade, not via middleware).
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server and serve until the task is
/// cancelled or the listener fails.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), FoundlineError> {
    let app = build_router(state, config.request_timeout);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FoundlineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| FoundlineError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
