// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Foundline claim service.
//!
//! REST routes cover claim submission, status transitions, claim chat, and
//! the notification inbox; `/ws` carries live pushes to connected users.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
