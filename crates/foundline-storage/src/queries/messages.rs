// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim chat thread operations.
//!
//! Threads are append-only. `seq` is assigned inside the append transaction
//! (`MAX(seq) + 1` for the claim), so concurrent senders get a total order
//! and listing never depends on wall-clock timestamps.

use rusqlite::params;

use foundline_core::{ChatMessage, ClaimStatus, FoundlineError};

use crate::database::{Database, map_tr_err};
use crate::queries::parse_status;

enum ThreadOutcome {
    Ok(ChatMessage),
    ClaimMissing,
    NotParticipant,
    ClaimRejected,
}

// Listing never rejects on claim status: dead threads stay readable.
enum ListOutcome {
    Ok(Vec<ChatMessage>),
    ClaimMissing,
    NotParticipant,
}

/// Participants of a claim thread: `(claimant_id, item_owner_id)`.
fn thread_participants(
    tx: &rusqlite::Transaction<'_>,
    claim_id: &str,
) -> Result<Option<(String, String, ClaimStatus)>, rusqlite::Error> {
    let row = tx
        .query_row(
            "SELECT c.claimant_id, i.owner_id, c.status
             FROM claims c JOIN items i ON i.id = c.item_id
             WHERE c.id = ?1",
            params![claim_id],
            |row| {
                let status: String = row.get(2)?;
                Ok((row.get(0)?, row.get(1)?, status))
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    match row {
        Some((claimant, owner, status)) => {
            Ok(Some((claimant, owner, parse_status(2, &status)?)))
        }
        None => Ok(None),
    }
}

/// Append a message to a claim thread, atomically assigning the next `seq`
/// and deriving the receiver as the sender's counterpart.
///
/// Fails with `Forbidden` if the sender is neither claimant nor item owner,
/// and `InvalidState` if the claim is REJECTED (dead threads stay readable
/// but closed to new messages).
pub async fn append_message(
    db: &Database,
    claim_id: &str,
    sender_id: &str,
    message_id: &str,
    content: &str,
    created_at: &str,
) -> Result<ChatMessage, FoundlineError> {
    let claim_id = claim_id.to_string();
    let sender_id = sender_id.to_string();
    let message_id = message_id.to_string();
    let content = content.to_string();
    let created_at = created_at.to_string();
    let claim_id_err = claim_id.clone();

    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some((claimant, owner, status)) = thread_participants(&tx, &claim_id)? else {
                return Ok(ThreadOutcome::ClaimMissing);
            };
            let receiver_id = if sender_id == claimant {
                owner
            } else if sender_id == owner {
                claimant
            } else {
                return Ok(ThreadOutcome::NotParticipant);
            };
            if status == ClaimStatus::Rejected {
                return Ok(ThreadOutcome::ClaimRejected);
            }

            let seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM claim_messages WHERE claim_id = ?1",
                params![claim_id],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO claim_messages
                 (id, claim_id, seq, sender_id, receiver_id, content, read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                params![message_id, claim_id, seq, sender_id, receiver_id, content, created_at],
            )?;
            tx.commit()?;

            Ok(ThreadOutcome::Ok(ChatMessage {
                id: message_id,
                claim_id,
                seq,
                sender_id,
                receiver_id,
                content,
                read: false,
                created_at,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        ThreadOutcome::Ok(message) => Ok(message),
        ThreadOutcome::ClaimMissing => {
            Err(FoundlineError::NotFound(format!("claim {claim_id_err}")))
        }
        ThreadOutcome::NotParticipant => Err(FoundlineError::Forbidden(
            "only the claimant or the item owner may post to this thread".to_string(),
        )),
        ThreadOutcome::ClaimRejected => Err(FoundlineError::InvalidState(
            "claim is rejected; its thread is closed".to_string(),
        )),
    }
}

/// List a claim thread in `seq` order, marking messages addressed to the
/// requester as read within the same transaction.
pub async fn list_messages(
    db: &Database,
    claim_id: &str,
    requester_id: &str,
) -> Result<Vec<ChatMessage>, FoundlineError> {
    let claim_id = claim_id.to_string();
    let requester_id = requester_id.to_string();
    let claim_id_err = claim_id.clone();

    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some((claimant, owner, _status)) = thread_participants(&tx, &claim_id)? else {
                return Ok(ListOutcome::ClaimMissing);
            };
            if requester_id != claimant && requester_id != owner {
                return Ok(ListOutcome::NotParticipant);
            }

            tx.execute(
                "UPDATE claim_messages SET read = 1
                 WHERE claim_id = ?1 AND receiver_id = ?2 AND read = 0",
                params![claim_id, requester_id],
            )?;

            let mut messages = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "SELECT id, claim_id, seq, sender_id, receiver_id, content, read, created_at
                     FROM claim_messages WHERE claim_id = ?1 ORDER BY seq ASC",
                )?;
                let rows = stmt.query_map(params![claim_id], |row| {
                    Ok(ChatMessage {
                        id: row.get(0)?,
                        claim_id: row.get(1)?,
                        seq: row.get(2)?,
                        sender_id: row.get(3)?,
                        receiver_id: row.get(4)?,
                        content: row.get(5)?,
                        read: row.get::<_, i64>(6)? != 0,
                        created_at: row.get(7)?,
                    })
                })?;
                for row in rows {
                    messages.push(row?);
                }
            }
            tx.commit()?;
            Ok(ListOutcome::Ok(messages))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        ListOutcome::Ok(messages) => Ok(messages),
        ListOutcome::ClaimMissing => {
            Err(FoundlineError::NotFound(format!("claim {claim_id_err}")))
        }
        ListOutcome::NotParticipant => Err(FoundlineError::Forbidden(
            "only the claimant or the item owner may read this thread".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::claims::{change_status, create_claim};
    use crate::queries::items::insert_item;
    use foundline_core::{Claim, Identity, Item, ItemKind, ItemStatus, Role};

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        insert_item(
            &db,
            &Item {
                id: "i-1".to_string(),
                kind: ItemKind::Lost,
                status: ItemStatus::Active,
                owner_id: "u-owner".to_string(),
                title: "Student ID card".to_string(),
                created_at: "2026-03-01T00:00:00.000Z".to_string(),
                updated_at: "2026-03-01T00:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();
        create_claim(
            &db,
            &Claim {
                id: "c-1".to_string(),
                item_id: "i-1".to_string(),
                claimant_id: "u-alice".to_string(),
                description: "Found it near the library".to_string(),
                proof_images: vec![],
                status: ClaimStatus::Pending,
                created_at: "2026-03-01T01:00:00.000Z".to_string(),
                updated_at: "2026-03-01T01:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn alternating_senders_keep_append_order() {
        let db = setup().await;
        // Identical timestamps on purpose: ordering must come from seq.
        let ts = "2026-03-01T02:00:00.000Z";
        append_message(&db, "c-1", "u-alice", "m-1", "A", ts).await.unwrap();
        append_message(&db, "c-1", "u-owner", "m-2", "B", ts).await.unwrap();
        append_message(&db, "c-1", "u-alice", "m-3", "C", ts).await.unwrap();

        let thread = list_messages(&db, "c-1", "u-owner").await.unwrap();
        let contents: Vec<_> = thread.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["A", "B", "C"]);
        let seqs: Vec<_> = thread.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, [1, 2, 3]);
    }

    #[tokio::test]
    async fn receiver_is_the_counterpart() {
        let db = setup().await;
        let from_claimant =
            append_message(&db, "c-1", "u-alice", "m-1", "hello", "2026-03-01T02:00:00.000Z")
                .await
                .unwrap();
        assert_eq!(from_claimant.receiver_id, "u-owner");

        let from_owner =
            append_message(&db, "c-1", "u-owner", "m-2", "hi", "2026-03-01T02:00:01.000Z")
                .await
                .unwrap();
        assert_eq!(from_owner.receiver_id, "u-alice");
    }

    #[tokio::test]
    async fn outsiders_are_forbidden() {
        let db = setup().await;
        let err = append_message(&db, "c-1", "u-eve", "m-1", "hi", "2026-03-01T02:00:00.000Z")
            .await
            .unwrap_err();
        assert!(matches!(err, FoundlineError::Forbidden(_)));

        let err = list_messages(&db, "c-1", "u-eve").await.unwrap_err();
        assert!(matches!(err, FoundlineError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejected_claim_thread_is_closed_but_readable() {
        let db = setup().await;
        append_message(&db, "c-1", "u-alice", "m-1", "hello", "2026-03-01T02:00:00.000Z")
            .await
            .unwrap();
        let owner = Identity {
            user_id: "u-owner".to_string(),
            role: Role::Student,
            verified: true,
        };
        change_status(&db, "c-1", ClaimStatus::Rejected, &owner)
            .await
            .unwrap();

        let err = append_message(&db, "c-1", "u-alice", "m-2", "??", "2026-03-01T03:00:00.000Z")
            .await
            .unwrap_err();
        assert!(matches!(err, FoundlineError::InvalidState(_)));

        // Reading history still works for participants.
        let thread = list_messages(&db, "c-1", "u-alice").await.unwrap();
        assert_eq!(thread.len(), 1);
    }

    #[tokio::test]
    async fn listing_flips_read_flag_for_requester_only() {
        let db = setup().await;
        append_message(&db, "c-1", "u-alice", "m-1", "for owner", "2026-03-01T02:00:00.000Z")
            .await
            .unwrap();
        append_message(&db, "c-1", "u-owner", "m-2", "for alice", "2026-03-01T02:00:01.000Z")
            .await
            .unwrap();

        let thread = list_messages(&db, "c-1", "u-owner").await.unwrap();
        // m-1 was addressed to the owner and is now read; m-2 is not.
        assert!(thread.iter().find(|m| m.id == "m-1").unwrap().read);
        assert!(!thread.iter().find(|m| m.id == "m-2").unwrap().read);
    }

    #[tokio::test]
    async fn missing_claim_is_not_found() {
        let db = setup().await;
        let err = list_messages(&db, "c-ghost", "u-alice").await.unwrap_err();
        assert!(matches!(err, FoundlineError::NotFound(_)));
    }
}
