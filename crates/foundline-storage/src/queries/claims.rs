// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transactional claim operations: creation checks and the status state
//! machine with its cascades.
//!
//! Every function here decides domain outcomes (not-found, forbidden,
//! duplicate, invalid transition) *inside* the transaction, so the checks
//! and the writes they guard commit or fail together. The closures return
//! outcome enums rather than errors; callers map them to the error taxonomy
//! after the transaction resolves.

use rusqlite::params;

use foundline_core::{Claim, ClaimStatus, FoundlineError, Identity, ItemStatus};

use crate::database::{Database, map_tr_err, now_utc};
use crate::queries::{parse_status, proofs_from_json};

/// Result of a committed claim creation.
#[derive(Debug, Clone)]
pub struct ClaimCreated {
    pub claim: Claim,
    /// Receiver of the "new claim" notification.
    pub item_owner_id: String,
}

/// Result of a committed status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// The claim after the transition.
    pub claim: Claim,
    pub item_owner_id: String,
    /// Item status after any side effect.
    pub item_status: ItemStatus,
    /// `(claim_id, claimant_id)` of every claim force-rejected by this
    /// approval. Empty unless the transition was to APPROVED.
    pub rejected: Vec<(String, String)>,
    /// True when `new_status` equaled the current status and nothing was
    /// written — an idempotent repeat, not to be re-notified.
    pub no_op: bool,
}

enum CreateOutcome {
    Created { owner_id: String },
    ItemMissing,
    OwnItem,
    ItemNotActive(ItemStatus),
    Duplicate,
}

enum ChangeOutcome {
    Applied(StatusChange),
    ClaimMissing,
    NotPermitted(&'static str),
    BadTransition { from: ClaimStatus, to: ClaimStatus },
    SiblingWins,
}

/// Create a claim in PENDING after validating, atomically:
/// the item exists, is ACTIVE, is not the claimant's own report, and the
/// claimant holds no other non-REJECTED claim on it.
///
/// `claim.status` must be PENDING and proof references already uploaded;
/// the transaction persists the claim exactly as given.
pub async fn create_claim(db: &Database, claim: &Claim) -> Result<ClaimCreated, FoundlineError> {
    debug_assert_eq!(claim.status, ClaimStatus::Pending);
    let claim = claim.clone();
    let returned = claim.clone();

    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let item = tx
                .query_row(
                    "SELECT status, owner_id FROM items WHERE id = ?1",
                    params![claim.item_id],
                    |row| {
                        let status: String = row.get(0)?;
                        let owner: String = row.get(1)?;
                        Ok((status, owner))
                    },
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            let Some((status, owner_id)) = item else {
                return Ok(CreateOutcome::ItemMissing);
            };
            let item_status: ItemStatus = parse_status(0, &status)?;

            if owner_id == claim.claimant_id {
                return Ok(CreateOutcome::OwnItem);
            }
            if !item_status.accepts_claims() {
                return Ok(CreateOutcome::ItemNotActive(item_status));
            }

            let existing: i64 = tx.query_row(
                "SELECT COUNT(*) FROM claims
                 WHERE item_id = ?1 AND claimant_id = ?2 AND status != 'REJECTED'",
                params![claim.item_id, claim.claimant_id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Ok(CreateOutcome::Duplicate);
            }

            tx.execute(
                "INSERT INTO claims
                 (id, item_id, claimant_id, description, proof_images, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    claim.id,
                    claim.item_id,
                    claim.claimant_id,
                    claim.description,
                    serde_json::to_string(&claim.proof_images)
                        .unwrap_or_else(|_| "[]".to_string()),
                    claim.status.to_string(),
                    claim.created_at,
                    claim.updated_at,
                ],
            )?;

            tx.commit()?;
            Ok(CreateOutcome::Created { owner_id })
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        CreateOutcome::Created { owner_id } => Ok(ClaimCreated {
            claim: returned,
            item_owner_id: owner_id,
        }),
        CreateOutcome::ItemMissing => Err(FoundlineError::NotFound(format!(
            "item {}",
            returned.item_id
        ))),
        CreateOutcome::OwnItem => Err(FoundlineError::Forbidden(
            "cannot claim your own item".to_string(),
        )),
        CreateOutcome::ItemNotActive(status) => Err(FoundlineError::InvalidState(format!(
            "item {} is {status} and not available for claims",
            returned.item_id
        ))),
        CreateOutcome::Duplicate => Err(FoundlineError::DuplicateClaim(format!(
            "user {} already holds a claim on item {}",
            returned.claimant_id, returned.item_id
        ))),
    }
}

/// Apply a status transition with its cascades, atomically.
///
/// Permission: the item owner or an ADMIN; re-resolving a DISPUTED claim is
/// ADMIN-only. `new_status` equal to the current status commits nothing and
/// returns `no_op = true`. Transitions outside the table on
/// [`ClaimStatus::can_transition_to`] fail with `InvalidTransition`.
///
/// Side effects inside the same transaction:
/// - to APPROVED: every other PENDING/DISPUTED claim on the item becomes
///   REJECTED; the item becomes CLAIMED. Fails with `InvalidState` if a
///   sibling already holds APPROVED/COMPLETED (one winner per item — this is
///   also the deterministic tie-break for disputed re-resolutions racing a
///   completed sibling).
/// - to COMPLETED: the item becomes RETURNED.
/// - DISPUTED -> REJECTED with no surviving winner: the item returns to
///   ACTIVE.
pub async fn change_status(
    db: &Database,
    claim_id: &str,
    new_status: ClaimStatus,
    actor: &Identity,
) -> Result<StatusChange, FoundlineError> {
    let claim_id_arg = claim_id.to_string();
    let actor = actor.clone();

    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let row = tx
                .query_row(
                    "SELECT c.id, c.item_id, c.claimant_id, c.description, c.proof_images,
                            c.status, c.created_at, c.updated_at, i.status, i.owner_id
                     FROM claims c JOIN items i ON i.id = c.item_id
                     WHERE c.id = ?1",
                    params![claim_id_arg],
                    |row| {
                        let proofs: String = row.get(4)?;
                        let claim_status: String = row.get(5)?;
                        let item_status: String = row.get(8)?;
                        Ok((
                            Claim {
                                id: row.get(0)?,
                                item_id: row.get(1)?,
                                claimant_id: row.get(2)?,
                                description: row.get(3)?,
                                proof_images: proofs_from_json(4, &proofs)?,
                                status: parse_status(5, &claim_status)?,
                                created_at: row.get(6)?,
                                updated_at: row.get(7)?,
                            },
                            parse_status::<ItemStatus>(8, &item_status)?,
                            row.get::<_, String>(9)?,
                        ))
                    },
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            let Some((mut claim, item_status, owner_id)) = row else {
                return Ok(ChangeOutcome::ClaimMissing);
            };

            if actor.user_id != owner_id && !actor.is_admin() {
                return Ok(ChangeOutcome::NotPermitted(
                    "only the item owner or an administrator may change claim status",
                ));
            }
            if claim.status.requires_admin_from() && !actor.is_admin() {
                return Ok(ChangeOutcome::NotPermitted(
                    "disputed claims are re-resolved by an administrator",
                ));
            }

            if new_status == claim.status {
                // Idempotent repeat: a retried or racing request observes
                // success without new writes or notifications.
                return Ok(ChangeOutcome::Applied(StatusChange {
                    claim,
                    item_owner_id: owner_id,
                    item_status,
                    rejected: Vec::new(),
                    no_op: true,
                }));
            }
            if !claim.status.can_transition_to(new_status) {
                return Ok(ChangeOutcome::BadTransition {
                    from: claim.status,
                    to: new_status,
                });
            }

            let now = now_utc();
            let mut rejected = Vec::new();
            let mut item_after = item_status;

            match new_status {
                ClaimStatus::Approved => {
                    let winners: i64 = tx.query_row(
                        "SELECT COUNT(*) FROM claims
                         WHERE item_id = ?1 AND id != ?2
                           AND status IN ('APPROVED', 'COMPLETED')",
                        params![claim.item_id, claim.id],
                        |row| row.get(0),
                    )?;
                    if winners > 0 {
                        return Ok(ChangeOutcome::SiblingWins);
                    }

                    // Cascade: force-reject every competing live claim.
                    // Already-terminal siblings stay untouched.
                    {
                        let mut stmt = tx.prepare(
                            "SELECT id, claimant_id FROM claims
                             WHERE item_id = ?1 AND id != ?2
                               AND status IN ('PENDING', 'DISPUTED')",
                        )?;
                        let rows = stmt.query_map(params![claim.item_id, claim.id], |row| {
                            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                        })?;
                        for row in rows {
                            rejected.push(row?);
                        }
                    }
                    tx.execute(
                        "UPDATE claims SET status = 'REJECTED', updated_at = ?1
                         WHERE item_id = ?2 AND id != ?3
                           AND status IN ('PENDING', 'DISPUTED')",
                        params![now, claim.item_id, claim.id],
                    )?;

                    item_after = ItemStatus::Claimed;
                }
                ClaimStatus::Completed => {
                    item_after = ItemStatus::Returned;
                }
                ClaimStatus::Rejected => {
                    // DISPUTED -> REJECTED may leave the item winner-less.
                    if claim.status == ClaimStatus::Disputed {
                        let winners: i64 = tx.query_row(
                            "SELECT COUNT(*) FROM claims
                             WHERE item_id = ?1 AND id != ?2
                               AND status IN ('APPROVED', 'COMPLETED')",
                            params![claim.item_id, claim.id],
                            |row| row.get(0),
                        )?;
                        if winners == 0 {
                            item_after = ItemStatus::Active;
                        }
                    }
                }
                ClaimStatus::Disputed | ClaimStatus::Pending => {}
            }

            if item_after != item_status {
                tx.execute(
                    "UPDATE items SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![item_after.to_string(), now, claim.item_id],
                )?;
            }

            tx.execute(
                "UPDATE claims SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![new_status.to_string(), now, claim.id],
            )?;

            tx.commit()?;

            claim.status = new_status;
            claim.updated_at = now;
            Ok(ChangeOutcome::Applied(StatusChange {
                claim,
                item_owner_id: owner_id,
                item_status: item_after,
                rejected,
                no_op: false,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        ChangeOutcome::Applied(change) => Ok(change),
        ChangeOutcome::ClaimMissing => {
            Err(FoundlineError::NotFound(format!("claim {claim_id}")))
        }
        ChangeOutcome::NotPermitted(reason) => {
            Err(FoundlineError::Forbidden(reason.to_string()))
        }
        ChangeOutcome::BadTransition { from, to } => {
            Err(FoundlineError::InvalidTransition { from, to })
        }
        ChangeOutcome::SiblingWins => Err(FoundlineError::InvalidState(
            "another claim on this item is already approved or completed".to_string(),
        )),
    }
}

/// Get a claim by id.
pub async fn get_claim(db: &Database, id: &str) -> Result<Option<Claim>, FoundlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, item_id, claimant_id, description, proof_images, status,
                        created_at, updated_at
                 FROM claims WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map(params![id], row_to_claim)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All claims on an item, oldest first.
pub async fn list_claims_for_item(
    db: &Database,
    item_id: &str,
) -> Result<Vec<Claim>, FoundlineError> {
    let item_id = item_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, item_id, claimant_id, description, proof_images, status,
                        created_at, updated_at
                 FROM claims WHERE item_id = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![item_id], row_to_claim)?;
            let mut claims = Vec::new();
            for row in rows {
                claims.push(row?);
            }
            Ok(claims)
        })
        .await
        .map_err(map_tr_err)
}

pub(crate) fn row_to_claim(row: &rusqlite::Row<'_>) -> Result<Claim, rusqlite::Error> {
    let proofs: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(Claim {
        id: row.get(0)?,
        item_id: row.get(1)?,
        claimant_id: row.get(2)?,
        description: row.get(3)?,
        proof_images: proofs_from_json(4, &proofs)?,
        status: parse_status(5, &status)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
