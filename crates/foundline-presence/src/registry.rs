// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user connection registry.
//!
//! Each WebSocket connection registers an mpsc sender under its user id.
//! Pushes fan out to every live connection for that user; each connection's
//! channel preserves send order, so a single client sees events in the order
//! they were pushed.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use foundline_core::PushEvent;

/// Buffered events per connection before pushes start dropping.
const CONNECTION_BUFFER: usize = 64;

/// One registered WebSocket connection for a user.
#[derive(Debug, Clone)]
struct ConnectionHandle {
    id: String,
    sender: mpsc::Sender<String>,
}

/// Shared registry mapping user ids to their live connections.
///
/// Cloning is cheap; all clones observe the same registrations.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    connections: Arc<DashMap<String, Vec<ConnectionHandle>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`, returning the connection id and
    /// the receiving half the socket task should drain.
    pub fn register(&self, user_id: &str) -> (String, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        let connection_id = uuid::Uuid::new_v4().to_string();
        self.connections
            .entry(user_id.to_string())
            .or_default()
            .push(ConnectionHandle {
                id: connection_id.clone(),
                sender: tx,
            });
        tracing::debug!(user_id, connection_id, "registered connection");
        (connection_id, rx)
    }

    /// Remove one connection for `user_id`. Dropping the last connection
    /// removes the user's entry entirely.
    pub fn unregister(&self, user_id: &str, connection_id: &str) {
        if let Some(mut entry) = self.connections.get_mut(user_id) {
            entry.retain(|c| c.id != connection_id);
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.connections
                    .remove_if(user_id, |_, handles| handles.is_empty());
            }
        }
        tracing::debug!(user_id, connection_id, "unregistered connection");
    }

    /// Whether `user_id` has at least one live connection.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections
            .get(user_id)
            .is_some_and(|handles| !handles.is_empty())
    }

    /// Best-effort push to every connection of `user_id`.
    ///
    /// An offline user is a silent no-op. A connection with a full buffer
    /// drops this event rather than blocking the caller. Returns the number
    /// of connections the event was handed to.
    pub fn push(&self, user_id: &str, event: &PushEvent) -> usize {
        let Some(handles) = self.connections.get(user_id) else {
            return 0;
        };
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("failed to serialize push event: {e}");
                return 0;
            }
        };
        let mut delivered = 0;
        for handle in handles.iter() {
            match handle.sender.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(user_id, connection_id = %handle.id, "push buffer full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Socket task is gone; unregister will catch up.
                    tracing::debug!(user_id, connection_id = %handle.id, "push to closed connection");
                }
            }
        }
        delivered
    }

    /// Number of distinct users with at least one connection.
    pub fn online_users(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(user_id: &str) -> PushEvent {
        PushEvent::Connected {
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn push_reaches_every_connection_of_a_user() {
        let registry = PresenceRegistry::new();
        let (_id_a, mut rx_a) = registry.register("u-1");
        let (_id_b, mut rx_b) = registry.register("u-1");

        assert_eq!(registry.push("u-1", &connected("u-1")), 2);

        for rx in [&mut rx_a, &mut rx_b] {
            let payload = rx.recv().await.unwrap();
            assert!(payload.contains("\"connected\""));
        }
    }

    #[tokio::test]
    async fn push_to_offline_user_is_a_silent_no_op() {
        let registry = PresenceRegistry::new();
        assert_eq!(registry.push("u-ghost", &connected("u-ghost")), 0);
    }

    #[tokio::test]
    async fn unregister_removes_only_that_connection() {
        let registry = PresenceRegistry::new();
        let (id_a, rx_a) = registry.register("u-1");
        let (_id_b, mut rx_b) = registry.register("u-1");

        drop(rx_a);
        registry.unregister("u-1", &id_a);
        assert!(registry.is_online("u-1"));

        assert_eq!(registry.push("u-1", &connected("u-1")), 1);
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn last_unregister_takes_user_offline() {
        let registry = PresenceRegistry::new();
        let (id, rx) = registry.register("u-1");
        drop(rx);
        registry.unregister("u-1", &id);
        assert!(!registry.is_online("u-1"));
        assert_eq!(registry.online_users(), 0);
    }

    #[tokio::test]
    async fn events_for_one_connection_arrive_in_push_order() {
        let registry = PresenceRegistry::new();
        let (_id, mut rx) = registry.register("u-1");

        for n in 0..3 {
            registry.push("u-1", &connected(&format!("u-{n}")));
        }
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(rx.recv().await.unwrap());
        }
        assert!(seen[0].contains("u-0"));
        assert!(seen[1].contains("u-1"));
        assert!(seen[2].contains("u-2"));
    }
}
