// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-claim chat threads between claimant and item owner.

use foundline_core::{ChatMessage, FoundlineError, Identity};
use foundline_storage::queries::messages;
use foundline_storage::{Database, now_utc};

use crate::dispatcher::NotificationDispatcher;

#[derive(Clone)]
pub struct ChatChannel {
    db: Database,
    dispatcher: NotificationDispatcher,
}

impl ChatChannel {
    pub fn new(db: Database, dispatcher: NotificationDispatcher) -> Self {
        Self { db, dispatcher }
    }

    /// Append a message to the claim thread and notify the counterpart.
    ///
    /// Storage enforces participant membership, assigns the sequence number,
    /// and derives the receiver; a notification failure is logged but the
    /// message stays committed.
    pub async fn post_message(
        &self,
        actor: &Identity,
        claim_id: &str,
        content: &str,
    ) -> Result<ChatMessage, FoundlineError> {
        let message = messages::append_message(
            &self.db,
            claim_id,
            &actor.user_id,
            &uuid::Uuid::new_v4().to_string(),
            content,
            &now_utc(),
        )
        .await?;

        if let Err(e) = self
            .dispatcher
            .dispatch(
                &message.receiver_id,
                Some(&actor.user_id),
                "New message on your claim",
                &message.content,
            )
            .await
        {
            tracing::error!(claim_id, "failed to record message notification: {e}");
        }
        Ok(message)
    }

    /// Read the thread in order, marking the requester's messages read.
    pub async fn list_messages(
        &self,
        actor: &Identity,
        claim_id: &str,
    ) -> Result<Vec<ChatMessage>, FoundlineError> {
        messages::list_messages(&self.db, claim_id, &actor.user_id).await
    }
}
