// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification dispatch: durable first, push second.
//!
//! Every notification is persisted before any delivery attempt, so the
//! record survives even when the receiver is offline or the push buffer is
//! full. The push itself is fire-and-forget; its failure is logged, never
//! surfaced to the caller.

use foundline_core::{FoundlineError, Notification, PushEvent};
use foundline_presence::PresenceRegistry;
use foundline_storage::queries::notifications;
use foundline_storage::{Database, now_utc};

#[derive(Clone)]
pub struct NotificationDispatcher {
    db: Database,
    presence: PresenceRegistry,
}

impl NotificationDispatcher {
    pub fn new(db: Database, presence: PresenceRegistry) -> Self {
        Self { db, presence }
    }

    /// Persist a notification for `receiver_id`, then attempt a live push.
    ///
    /// Returns the stored notification. The push outcome does not affect the
    /// returned value; an offline receiver reads the record later via
    /// [`Self::list`].
    pub async fn dispatch(
        &self,
        receiver_id: &str,
        sender_id: Option<&str>,
        title: &str,
        body: &str,
    ) -> Result<Notification, FoundlineError> {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            receiver_id: receiver_id.to_string(),
            sender_id: sender_id.map(str::to_string),
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: now_utc(),
        };
        notifications::insert_notification(&self.db, &notification).await?;

        let event = PushEvent::Notification {
            id: notification.id.clone(),
            sender_id: notification.sender_id.clone(),
            title: notification.title.clone(),
            created_at: notification.created_at.clone(),
        };
        let delivered = self.presence.push(receiver_id, &event);
        tracing::debug!(
            receiver_id,
            notification_id = %notification.id,
            delivered,
            "dispatched notification"
        );
        Ok(notification)
    }

    /// Newest-first inbox for `receiver_id`.
    pub async fn list(&self, receiver_id: &str) -> Result<Vec<Notification>, FoundlineError> {
        notifications::list_for_receiver(&self.db, receiver_id).await
    }

    /// Mark the whole inbox read; repeating is a no-op.
    pub async fn mark_all_read(&self, receiver_id: &str) -> Result<usize, FoundlineError> {
        notifications::mark_all_read(&self.db, receiver_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundline_test_utils::TestHarness;

    #[tokio::test]
    async fn dispatch_persists_even_when_receiver_is_offline() {
        let harness = TestHarness::new().await.unwrap();
        let dispatcher =
            NotificationDispatcher::new(harness.db.clone(), PresenceRegistry::new());

        dispatcher
            .dispatch("u-offline", Some("u-sender"), "Claim update", "Approved")
            .await
            .unwrap();

        let inbox = dispatcher.list("u-offline").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Claim update");
        assert!(!inbox[0].read);
    }

    #[tokio::test]
    async fn dispatch_pushes_to_connected_receivers() {
        let harness = TestHarness::new().await.unwrap();
        let presence = PresenceRegistry::new();
        let (_conn_id, mut rx) = presence.register("u-online");
        let dispatcher = NotificationDispatcher::new(harness.db.clone(), presence);

        let stored = dispatcher
            .dispatch("u-online", None, "Claim update", "Approved")
            .await
            .unwrap();

        let payload = rx.recv().await.unwrap();
        assert!(payload.contains(&stored.id));
        assert!(payload.contains("Claim update"));
    }

    #[tokio::test]
    async fn mark_all_read_clears_the_inbox_flag() {
        let harness = TestHarness::new().await.unwrap();
        let dispatcher =
            NotificationDispatcher::new(harness.db.clone(), PresenceRegistry::new());
        dispatcher.dispatch("u-1", None, "a", "a").await.unwrap();
        dispatcher.dispatch("u-1", None, "b", "b").await.unwrap();

        assert_eq!(dispatcher.mark_all_read("u-1").await.unwrap(), 2);
        assert!(dispatcher.list("u-1").await.unwrap().iter().all(|n| n.read));
        assert_eq!(dispatcher.mark_all_read("u-1").await.unwrap(), 0);
    }
}
