// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification persistence. The dispatcher writes here before any push
//! attempt, so delivery failures never lose the record.

use rusqlite::params;

use foundline_core::{FoundlineError, Notification};

use crate::database::{Database, map_tr_err};

/// Hard cap on a single inbox listing.
const LIST_LIMIT: i64 = 200;

pub async fn insert_notification(
    db: &Database,
    notification: &Notification,
) -> Result<(), FoundlineError> {
    let n = notification.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications
                 (id, receiver_id, sender_id, title, body, read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                params![n.id, n.receiver_id, n.sender_id, n.title, n.body, n.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest-first inbox for a receiver, capped at 200 rows.
pub async fn list_for_receiver(
    db: &Database,
    receiver_id: &str,
) -> Result<Vec<Notification>, FoundlineError> {
    let receiver_id = receiver_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, receiver_id, sender_id, title, body, read, created_at
                 FROM notifications WHERE receiver_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![receiver_id, LIST_LIMIT], |row| {
                Ok(Notification {
                    id: row.get(0)?,
                    receiver_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    title: row.get(3)?,
                    body: row.get(4)?,
                    read: row.get::<_, i64>(5)? != 0,
                    created_at: row.get(6)?,
                })
            })?;
            let mut notifications = Vec::new();
            for row in rows {
                notifications.push(row?);
            }
            Ok(notifications)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark every unread notification for a receiver as read. Returns the number
/// of rows flipped; repeating the call is a zero-row no-op.
pub async fn mark_all_read(db: &Database, receiver_id: &str) -> Result<usize, FoundlineError> {
    let receiver_id = receiver_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE notifications SET read = 1 WHERE receiver_id = ?1 AND read = 0",
                params![receiver_id],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, receiver: &str, created_at: &str) -> Notification {
        Notification {
            id: id.to_string(),
            receiver_id: receiver.to_string(),
            sender_id: Some("u-system".to_string()),
            title: "Claim update".to_string(),
            body: "Your claim changed state".to_string(),
            read: false,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped_to_receiver() {
        let db = Database::open_in_memory().await.unwrap();
        insert_notification(&db, &note("n-1", "u-a", "2026-03-01T01:00:00.000Z"))
            .await
            .unwrap();
        insert_notification(&db, &note("n-2", "u-a", "2026-03-01T02:00:00.000Z"))
            .await
            .unwrap();
        insert_notification(&db, &note("n-3", "u-b", "2026-03-01T03:00:00.000Z"))
            .await
            .unwrap();

        let inbox = list_for_receiver(&db, "u-a").await.unwrap();
        let ids: Vec<_> = inbox.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["n-2", "n-1"]);
        assert_eq!(inbox[0].title, "Claim update");
        assert_eq!(inbox[0].body, "Your claim changed state");
    }

    #[tokio::test]
    async fn mark_all_read_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        insert_notification(&db, &note("n-1", "u-a", "2026-03-01T01:00:00.000Z"))
            .await
            .unwrap();
        insert_notification(&db, &note("n-2", "u-a", "2026-03-01T02:00:00.000Z"))
            .await
            .unwrap();

        assert_eq!(mark_all_read(&db, "u-a").await.unwrap(), 2);
        assert_eq!(mark_all_read(&db, "u-a").await.unwrap(), 0);

        let inbox = list_for_receiver(&db, "u-a").await.unwrap();
        assert!(inbox.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn empty_inbox_lists_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(list_for_receiver(&db, "u-nobody").await.unwrap().is_empty());
    }
}
