// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use foundline_core::{
    Claim, ChatMessage, ClaimStatus, FoundlineError, Identity, ItemStatus, Notification,
    ProofImage,
};
use foundline_engine::NewClaim;

use crate::server::GatewayState;

/// One proof image in a claim submission, base64-encoded.
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub filename: String,
    /// Base64 (standard alphabet) image bytes.
    pub data: String,
}

/// Request body for POST /v1/claims.
#[derive(Debug, Deserialize)]
pub struct CreateClaimRequest {
    pub item_id: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<ImagePayload>,
}

/// Response body for POST /v1/claims.
#[derive(Debug, Serialize)]
pub struct CreateClaimResponse {
    pub claim: Claim,
    /// Proof images dropped because their upload failed.
    pub failed_uploads: usize,
}

/// Request body for POST /v1/claims/{id}/status.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: ClaimStatus,
}

/// Response body for POST /v1/claims/{id}/status.
#[derive(Debug, Serialize)]
pub struct ChangeStatusResponse {
    pub claim: Claim,
    pub item_status: ItemStatus,
    /// Claims force-rejected by this approval.
    pub rejected_claim_ids: Vec<String>,
    /// True when the transition was an idempotent repeat.
    pub no_op: bool,
}

/// Request body for POST /v1/claims/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

/// Response body for POST /v1/notifications/read.
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked: usize,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub online_users: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

/// Map a domain error onto an HTTP status and JSON body.
pub fn error_response(err: FoundlineError) -> Response {
    let status = match &err {
        FoundlineError::NotFound(_) => StatusCode::NOT_FOUND,
        FoundlineError::Forbidden(_) => StatusCode::FORBIDDEN,
        FoundlineError::InvalidState(_)
        | FoundlineError::InvalidTransition { .. }
        | FoundlineError::DuplicateClaim(_) => StatusCode::CONFLICT,
        FoundlineError::UploadFailed { .. } => StatusCode::BAD_GATEWAY,
        FoundlineError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        FoundlineError::Config(_) | FoundlineError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = ErrorResponse {
        error: err.to_string(),
        retryable: err.is_retryable(),
    };
    (status, Json(body)).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            retryable: false,
        }),
    )
        .into_response()
}

/// POST /v1/claims
pub async fn post_claims(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CreateClaimRequest>,
) -> Response {
    if body.description.trim().is_empty() {
        return bad_request("description must not be empty");
    }
    let mut images = Vec::with_capacity(body.images.len());
    for payload in body.images {
        let bytes = match BASE64.decode(payload.data.as_bytes()) {
            Ok(b) => b,
            Err(e) => return bad_request(format!("image {} is not valid base64: {e}", payload.filename)),
        };
        images.push(ProofImage {
            filename: payload.filename,
            bytes,
        });
    }

    let new_claim = NewClaim {
        item_id: body.item_id,
        description: body.description,
        images,
    };
    match state.engine.create_claim(&identity, new_claim).await {
        Ok(submission) => (
            StatusCode::CREATED,
            Json(CreateClaimResponse {
                claim: submission.claim,
                failed_uploads: submission.failed_uploads,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /v1/claims/{id}
///
/// Visible to the claimant, the item owner, and admins.
pub async fn get_claim(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(claim_id): Path<String>,
) -> Response {
    let claim = match state.engine.get_claim(&claim_id).await {
        Ok(Some(claim)) => claim,
        Ok(None) => return error_response(FoundlineError::NotFound(format!("claim {claim_id}"))),
        Err(e) => return error_response(e),
    };
    if identity.user_id != claim.claimant_id && !identity.is_admin() {
        let owns_item = match state.engine.get_item(&claim.item_id).await {
            Ok(item) => item.is_some_and(|i| i.owner_id == identity.user_id),
            Err(e) => return error_response(e),
        };
        if !owns_item {
            return error_response(FoundlineError::Forbidden(
                "claim is only visible to its participants".to_string(),
            ));
        }
    }
    Json(claim).into_response()
}

/// GET /v1/items/{id}/claims
///
/// Visible to the item owner and admins.
pub async fn list_item_claims(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(item_id): Path<String>,
) -> Response {
    if !identity.is_admin() {
        let owns_item = match state.engine.get_item(&item_id).await {
            Ok(Some(item)) => item.owner_id == identity.user_id,
            Ok(None) => {
                return error_response(FoundlineError::NotFound(format!("item {item_id}")));
            }
            Err(e) => return error_response(e),
        };
        if !owns_item {
            return error_response(FoundlineError::Forbidden(
                "claims on an item are only visible to its owner".to_string(),
            ));
        }
    }
    match state.engine.list_claims_for_item(&item_id).await {
        Ok(claims) => Json(ClaimListResponse { claims }).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/claims/{id}/status
pub async fn post_claim_status(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(claim_id): Path<String>,
    Json(body): Json<ChangeStatusRequest>,
) -> Response {
    match state
        .engine
        .change_status(&identity, &claim_id, body.status)
        .await
    {
        Ok(change) => Json(ChangeStatusResponse {
            claim: change.claim,
            item_status: change.item_status,
            rejected_claim_ids: change.rejected.into_iter().map(|(id, _)| id).collect(),
            no_op: change.no_op,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/claims/{id}/messages
pub async fn post_claim_message(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(claim_id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Response {
    if body.content.trim().is_empty() {
        return bad_request("message content must not be empty");
    }
    match state
        .chat
        .post_message(&identity, &claim_id, &body.content)
        .await
    {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /v1/claims/{id}/messages
pub async fn get_claim_messages(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(claim_id): Path<String>,
) -> Response {
    match state.chat.list_messages(&identity, &claim_id).await {
        Ok(messages) => Json(MessageListResponse { messages }).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /v1/notifications
pub async fn get_notifications(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.dispatcher.list(&identity.user_id).await {
        Ok(notifications) => Json(NotificationListResponse { notifications }).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/notifications/read
pub async fn post_notifications_read(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.dispatcher.mark_all_read(&identity.user_id).await {
        Ok(marked) => Json(MarkReadResponse { marked }).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /health (unauthenticated, for liveness probes)
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        online_users: state.presence.online_users(),
    })
}
