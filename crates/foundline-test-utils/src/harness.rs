// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seeded temp-database harness for integration tests.

use foundline_core::{Claim, ClaimStatus, FoundlineError, Identity, Item, ItemKind, ItemStatus, Role};
use foundline_storage::queries::{claims, items};
use foundline_storage::{Database, now_utc};

/// A temp-file database plus helpers for seeding lost-and-found state.
///
/// The temp directory lives as long as the harness; dropping it deletes
/// the database file.
pub struct TestHarness {
    pub db: Database,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, FoundlineError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| FoundlineError::Internal(format!("temp dir: {e}")))?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy(), true).await?;
        Ok(Self {
            db,
            _temp_dir: temp_dir,
        })
    }

    /// Insert an ACTIVE item owned by `owner_id` and return it.
    pub async fn seed_item(&self, id: &str, owner_id: &str) -> Result<Item, FoundlineError> {
        let now = now_utc();
        let item = Item {
            id: id.to_string(),
            kind: ItemKind::Found,
            status: ItemStatus::Active,
            owner_id: owner_id.to_string(),
            title: format!("seeded item {id}"),
            created_at: now.clone(),
            updated_at: now,
        };
        items::insert_item(&self.db, &item).await?;
        Ok(item)
    }

    /// Insert a PENDING claim by `claimant_id` on `item_id` and return it.
    pub async fn seed_claim(
        &self,
        id: &str,
        item_id: &str,
        claimant_id: &str,
    ) -> Result<Claim, FoundlineError> {
        let now = now_utc();
        let claim = Claim {
            id: id.to_string(),
            item_id: item_id.to_string(),
            claimant_id: claimant_id.to_string(),
            description: "seeded claim".to_string(),
            proof_images: vec![],
            status: ClaimStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };
        claims::create_claim(&self.db, &claim).await?;
        Ok(claim)
    }
}

/// A verified student identity.
pub fn student(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        role: Role::Student,
        verified: true,
    }
}

/// A verified admin identity.
pub fn admin(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        role: Role::Admin,
        verified: true,
    }
}
