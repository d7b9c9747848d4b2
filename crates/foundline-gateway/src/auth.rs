// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway authentication.
//!
//! The gateway sits behind the campus SSO proxy, which injects the caller's
//! identity as trusted headers:
//!
//! - `x-user-id`: opaque user identifier (required)
//! - `x-user-role`: `STUDENT`, `FACULTY`, or `ADMIN` (required)
//! - `x-user-verified`: `true`/`false` (missing counts as unverified)
//!
//! When a bearer token is configured, it is additionally required on every
//! API request (`Authorization: Bearer <token>`); a configured token that is
//! missing or wrong is rejected before identity parsing.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use foundline_core::{Identity, Role};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. If `Some`, bearer auth is enforced.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Parse the trusted identity headers, if present and well-formed.
pub fn identity_from_headers(headers: &axum::http::HeaderMap) -> Option<Identity> {
    let user_id = headers.get("x-user-id")?.to_str().ok()?.trim();
    if user_id.is_empty() {
        return None;
    }
    let role: Role = headers
        .get("x-user-role")?
        .to_str()
        .ok()?
        .parse()
        .ok()?;
    let verified = headers
        .get("x-user-verified")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true" || v == "1");
    Some(Identity {
        user_id: user_id.to_string(),
        role,
        verified,
    })
}

/// Middleware that enforces the optional bearer token and attaches the
/// caller's [`Identity`] to the request extensions.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(ref expected_token) = auth.bearer_token {
        let presented = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected_token.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    let Some(identity) = identity_from_headers(request.headers()) else {
        tracing::debug!("request rejected: missing or malformed identity headers");
        return Err(StatusCode::UNAUTHORIZED);
    };
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
