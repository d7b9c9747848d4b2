// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Foundline workspace.
//!
//! Status enums are closed enumerations stored as SCREAMING_SNAKE_CASE text
//! in SQLite and on the wire. The claim transition table lives here, on
//! [`ClaimStatus`], so every crate validates against the same rules.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role carried by the opaque identity context.
///
/// Authentication itself happens outside the core; the gateway only relays
/// what the session layer already verified.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

/// Verified caller identity handed to the core by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub verified: bool,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Whether an item was reported as lost by its owner or found by a stranger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Lost,
    Found,
}

/// Lifecycle status of a reported item.
///
/// `Returned` is reachable only through a COMPLETED claim; once an item is
/// `Returned`, `Expired`, or `Archived` no new claims may be created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Active,
    Claimed,
    Returned,
    Expired,
    Archived,
}

impl ItemStatus {
    /// Whether new claims may be created against an item in this status.
    pub fn accepts_claims(self) -> bool {
        self == Self::Active
    }
}

/// Status of an ownership/finder claim.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Disputed,
}

impl ClaimStatus {
    /// The claim state machine transition table.
    ///
    /// PENDING -> {APPROVED, REJECTED}
    /// APPROVED -> {COMPLETED, DISPUTED}
    /// DISPUTED -> {APPROVED, REJECTED}
    /// REJECTED and COMPLETED are terminal.
    pub fn can_transition_to(self, next: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Completed)
                | (Approved, Disputed)
                | (Disputed, Approved)
                | (Disputed, Rejected)
        )
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Winning states are mutually exclusive per item: at most one claim on
    /// an item may be APPROVED or COMPLETED at any time.
    pub fn is_winning(self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }

    /// Re-resolving a disputed claim is admin-mediated.
    pub fn requires_admin_from(self) -> bool {
        self == Self::Disputed
    }
}

/// A reported lost or found item, the subject of zero or more claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub status: ItemStatus,
    /// The reporting user (counterparty of every claim on this item).
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A user's assertion of ownership (found item) or of having found an item
/// (lost item). Never physically deleted; REJECTED is retained for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub item_id: String,
    pub claimant_id: String,
    pub description: String,
    /// Durable URL references returned by the image store.
    pub proof_images: Vec<String>,
    pub status: ClaimStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One message in a claim's chat thread.
///
/// `seq` is store-assigned and strictly increasing within a claim; thread
/// order is by `seq`, never by wall-clock timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub claim_id: String,
    pub seq: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

/// Durable record that a user-facing event occurred, independent of live
/// delivery. `sender_id` is `None` for system-generated notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub sender_id: Option<String>,
    pub receiver_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

/// Wire envelope for live pushes to connected clients.
///
/// Delivery is best-effort: the durable [`Notification`] row always exists
/// before a push is attempted, so a dropped event is recoverable from the
/// inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// Handshake acknowledgement sent once per connection after `join`.
    Connected { user_id: String },
    /// A new durable notification addressed to the connected user.
    Notification {
        id: String,
        sender_id: Option<String>,
        title: String,
        created_at: String,
    },
}

/// A raw proof image handed to the image store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn claim_transition_table_is_closed() {
        use ClaimStatus::*;
        let all = [Pending, Approved, Rejected, Completed, Disputed];
        let allowed = [
            (Pending, Approved),
            (Pending, Rejected),
            (Approved, Completed),
            (Approved, Disputed),
            (Disputed, Approved),
            (Disputed, Rejected),
        ];
        for from in all {
            for to in all {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        use ClaimStatus::*;
        for from in [Rejected, Completed] {
            assert!(from.is_terminal());
            for to in [Pending, Approved, Rejected, Completed, Disputed] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn winning_states() {
        assert!(ClaimStatus::Approved.is_winning());
        assert!(ClaimStatus::Completed.is_winning());
        assert!(!ClaimStatus::Pending.is_winning());
        assert!(!ClaimStatus::Rejected.is_winning());
        assert!(!ClaimStatus::Disputed.is_winning());
    }

    #[test]
    fn status_strings_round_trip_screaming_case() {
        assert_eq!(ClaimStatus::Pending.to_string(), "PENDING");
        assert_eq!(ItemStatus::Active.to_string(), "ACTIVE");
        assert_eq!(ItemKind::Found.to_string(), "FOUND");
        assert_eq!(Role::Faculty.to_string(), "FACULTY");

        assert_eq!(
            ClaimStatus::from_str("DISPUTED").unwrap(),
            ClaimStatus::Disputed
        );
        assert_eq!(ItemStatus::from_str("RETURNED").unwrap(), ItemStatus::Returned);
        assert!(ClaimStatus::from_str("pending").is_err());
    }

    #[test]
    fn only_active_items_accept_claims() {
        assert!(ItemStatus::Active.accepts_claims());
        for status in [
            ItemStatus::Claimed,
            ItemStatus::Returned,
            ItemStatus::Expired,
            ItemStatus::Archived,
        ] {
            assert!(!status.accepts_claims());
        }
    }

    #[test]
    fn push_event_serializes_with_type_tag() {
        let event = PushEvent::Notification {
            id: "n-1".into(),
            sender_id: Some("u-2".into()),
            title: "Alice has claimed your item".into(),
            created_at: "2026-03-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"notification\""));
        let parsed: PushEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn identity_admin_check() {
        let admin = Identity {
            user_id: "u-admin".into(),
            role: Role::Admin,
            verified: true,
        };
        let student = Identity {
            user_id: "u-1".into(),
            role: Role::Student,
            verified: true,
        };
        assert!(admin.is_admin());
        assert!(!student.is_admin());
    }
}
