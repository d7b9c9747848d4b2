// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item read/insert operations.
//!
//! Item status is mutated only by the claim transitions in
//! [`crate::queries::claims`]; report intake inserts, nothing deletes.

use rusqlite::params;

use foundline_core::{FoundlineError, Item};

use crate::database::{Database, map_tr_err};
use crate::queries::parse_status;

/// Insert a newly reported item.
pub async fn insert_item(db: &Database, item: &Item) -> Result<(), FoundlineError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO items (id, kind, status, owner_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.id,
                    item.kind.to_string(),
                    item.status.to_string(),
                    item.owner_id,
                    item.title,
                    item.created_at,
                    item.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an item by id.
pub async fn get_item(db: &Database, id: &str) -> Result<Option<Item>, FoundlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, status, owner_id, title, created_at, updated_at
                 FROM items WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map(params![id], row_to_item)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub(crate) fn row_to_item(row: &rusqlite::Row<'_>) -> Result<Item, rusqlite::Error> {
    let kind: String = row.get(1)?;
    let status: String = row.get(2)?;
    Ok(Item {
        id: row.get(0)?,
        kind: parse_status(1, &kind)?,
        status: parse_status(2, &status)?,
        owner_id: row.get(3)?,
        title: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
