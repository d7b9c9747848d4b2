// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim lifecycle orchestration.
//!
//! The engine runs proof-image uploads and notification dispatch around the
//! transactional state machine in storage. Uploads happen before the claim
//! row exists and individual failures never abort the submission; the claim
//! simply carries fewer proof URLs, with the failure count reported back.

use std::sync::Arc;

use foundline_core::{
    Claim, ClaimStatus, FoundlineError, Identity, ImageStore, Item, ProofImage,
};
use foundline_storage::queries::claims::{self, StatusChange};
use foundline_storage::queries::items;
use foundline_storage::{Database, now_utc};

use crate::dispatcher::NotificationDispatcher;

/// A claim submission as received from the gateway.
#[derive(Debug)]
pub struct NewClaim {
    pub item_id: String,
    pub description: String,
    pub images: Vec<ProofImage>,
}

/// Result of a submission: the stored claim plus how many proof-image
/// uploads were dropped along the way.
#[derive(Debug)]
pub struct ClaimSubmission {
    pub claim: Claim,
    pub failed_uploads: usize,
}

#[derive(Clone)]
pub struct ClaimEngine {
    db: Database,
    dispatcher: NotificationDispatcher,
    images: Arc<dyn ImageStore>,
}

impl ClaimEngine {
    pub fn new(
        db: Database,
        dispatcher: NotificationDispatcher,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            db,
            dispatcher,
            images,
        }
    }

    /// Submit a claim on an item, uploading proof images first.
    ///
    /// A failed upload logs a warning and is counted; only the row insert can
    /// fail the submission (own item, inactive item, duplicate, missing item).
    /// On success the item owner is notified.
    pub async fn create_claim(
        &self,
        actor: &Identity,
        new_claim: NewClaim,
    ) -> Result<ClaimSubmission, FoundlineError> {
        let mut proof_images = Vec::with_capacity(new_claim.images.len());
        let mut failed_uploads = 0;
        for image in &new_claim.images {
            match self.images.upload(image).await {
                Ok(url) => proof_images.push(url),
                Err(e) => {
                    failed_uploads += 1;
                    tracing::warn!(filename = %image.filename, "proof image upload failed: {e}");
                }
            }
        }

        let now = now_utc();
        let claim = Claim {
            id: uuid::Uuid::new_v4().to_string(),
            item_id: new_claim.item_id,
            claimant_id: actor.user_id.clone(),
            description: new_claim.description,
            proof_images,
            status: ClaimStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };
        let created = claims::create_claim(&self.db, &claim).await?;

        self.notify(
            &created.item_owner_id,
            Some(&actor.user_id),
            "New claim on your item",
            &format!("{} submitted a claim: {}", actor.user_id, created.claim.description),
        )
        .await;

        Ok(ClaimSubmission {
            claim: created.claim,
            failed_uploads,
        })
    }

    /// Apply a status transition and notify everyone it touched.
    ///
    /// An idempotent repeat (`no_op`) notifies nobody. An approval also
    /// notifies each cascade-rejected claimant; a dispute notifies the item
    /// owner as well as the claimant.
    pub async fn change_status(
        &self,
        actor: &Identity,
        claim_id: &str,
        new_status: ClaimStatus,
    ) -> Result<StatusChange, FoundlineError> {
        let change = claims::change_status(&self.db, claim_id, new_status, actor).await?;
        if change.no_op {
            return Ok(change);
        }

        let title = match new_status {
            ClaimStatus::Approved => "Your claim was approved",
            ClaimStatus::Rejected => "Your claim was rejected",
            ClaimStatus::Completed => "Your claim was completed",
            ClaimStatus::Disputed => "Your claim was disputed",
            ClaimStatus::Pending => unreachable!("no transition targets PENDING"),
        };
        let body = format!("Claim {} on item {}", change.claim.id, change.claim.item_id);
        self.notify(&change.claim.claimant_id, Some(&actor.user_id), title, &body)
            .await;

        for (rejected_claim_id, claimant_id) in &change.rejected {
            self.notify(
                claimant_id,
                Some(&actor.user_id),
                "Your claim was rejected",
                &format!(
                    "Claim {rejected_claim_id} on item {} lost to another claimant",
                    change.claim.item_id
                ),
            )
            .await;
        }

        if new_status == ClaimStatus::Disputed {
            self.notify(
                &change.item_owner_id,
                Some(&actor.user_id),
                "A claim on your item was disputed",
                &body,
            )
            .await;
        }

        Ok(change)
    }

    pub async fn get_claim(&self, id: &str) -> Result<Option<Claim>, FoundlineError> {
        claims::get_claim(&self.db, id).await
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, FoundlineError> {
        items::get_item(&self.db, id).await
    }

    pub async fn list_claims_for_item(&self, item_id: &str) -> Result<Vec<Claim>, FoundlineError> {
        claims::list_claims_for_item(&self.db, item_id).await
    }

    // Notification failure never unwinds a committed claim mutation.
    async fn notify(&self, receiver_id: &str, sender_id: Option<&str>, title: &str, body: &str) {
        if let Err(e) = self
            .dispatcher
            .dispatch(receiver_id, sender_id, title, body)
            .await
        {
            tracing::error!(receiver_id, "failed to record notification: {e}");
        }
    }
}
