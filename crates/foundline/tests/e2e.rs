// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Foundline pipeline.
//!
//! Each test creates an isolated harness with a temp SQLite database and
//! mock image uploads. HTTP tests bind a real gateway on an ephemeral port
//! and drive it with reqwest. Tests are independent and order-insensitive.

use std::net::SocketAddr;
use std::sync::Arc;

use foundline_core::{ClaimStatus, Identity, ItemStatus, Role};
use foundline_engine::{ChatChannel, ClaimEngine, NewClaim, NotificationDispatcher};
use foundline_gateway::auth::AuthConfig;
use foundline_gateway::{GatewayState, build_router};
use foundline_presence::PresenceRegistry;
use foundline_storage::queries::items;
use foundline_test_utils::{MockImageStore, TestHarness, admin, student};

struct Stack {
    harness: TestHarness,
    engine: ClaimEngine,
    chat: ChatChannel,
    dispatcher: NotificationDispatcher,
    presence: PresenceRegistry,
}

async fn stack() -> Stack {
    let harness = TestHarness::new().await.unwrap();
    let presence = PresenceRegistry::new();
    let dispatcher = NotificationDispatcher::new(harness.db.clone(), presence.clone());
    let engine = ClaimEngine::new(
        harness.db.clone(),
        dispatcher.clone(),
        Arc::new(MockImageStore::new()),
    );
    let chat = ChatChannel::new(harness.db.clone(), dispatcher.clone());
    Stack {
        harness,
        engine,
        chat,
        dispatcher,
        presence,
    }
}

fn claim_on(item_id: &str) -> NewClaim {
    NewClaim {
        item_id: item_id.to_string(),
        description: "it has my initials on the strap".to_string(),
        images: vec![],
    }
}

// ---- Full claim lifecycle ----

#[tokio::test]
async fn approving_one_claim_rejects_rivals_and_claims_the_item() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();

    let a = s
        .engine
        .create_claim(&student("u-alice"), claim_on("i-1"))
        .await
        .unwrap();
    let b = s
        .engine
        .create_claim(&student("u-bob"), claim_on("i-1"))
        .await
        .unwrap();

    let change = s
        .engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Approved)
        .await
        .unwrap();
    assert_eq!(change.claim.status, ClaimStatus::Approved);
    assert_eq!(change.item_status, ItemStatus::Claimed);

    let b_after = s.engine.get_claim(&b.claim.id).await.unwrap().unwrap();
    assert_eq!(b_after.status, ClaimStatus::Rejected);

    // Completing the handover returns the item.
    let done = s
        .engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Completed)
        .await
        .unwrap();
    assert_eq!(done.item_status, ItemStatus::Returned);
    let item = items::get_item(&s.harness.db, "i-1").await.unwrap().unwrap();
    assert_eq!(item.status, ItemStatus::Returned);

    // A claimed-then-returned item accepts no further claims.
    let err = s
        .engine
        .create_claim(&student("u-carol"), claim_on("i-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, foundline_core::FoundlineError::InvalidState(_)));
}

#[tokio::test]
async fn dispute_path_returns_the_item_to_active() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();
    let a = s
        .engine
        .create_claim(&student("u-alice"), claim_on("i-1"))
        .await
        .unwrap();

    s.engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Approved)
        .await
        .unwrap();
    s.engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Disputed)
        .await
        .unwrap();

    // Only an admin can resolve a dispute.
    let err = s
        .engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, foundline_core::FoundlineError::Forbidden(_)));

    let change = s
        .engine
        .change_status(&admin("u-admin"), &a.claim.id, ClaimStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(change.item_status, ItemStatus::Active);

    // The item is claimable again.
    s.engine
        .create_claim(&student("u-bob"), claim_on("i-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn live_connection_receives_approval_push() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();
    let a = s
        .engine
        .create_claim(&student("u-alice"), claim_on("i-1"))
        .await
        .unwrap();

    let (_conn_id, mut rx) = s.presence.register("u-alice");
    s.engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Approved)
        .await
        .unwrap();

    let payload = rx.recv().await.unwrap();
    assert!(payload.contains("\"notification\""));
    assert!(payload.contains("Your claim was approved"));

    // The durable record exists regardless of the push.
    let inbox = s.dispatcher.list("u-alice").await.unwrap();
    assert!(inbox.iter().any(|n| n.title == "Your claim was approved"));
}

#[tokio::test]
async fn chat_thread_spans_the_whole_lifecycle() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();
    let a = s
        .engine
        .create_claim(&student("u-alice"), claim_on("i-1"))
        .await
        .unwrap();

    s.chat
        .post_message(&student("u-alice"), &a.claim.id, "where can I pick it up?")
        .await
        .unwrap();
    s.engine
        .change_status(&student("u-owner"), &a.claim.id, ClaimStatus::Approved)
        .await
        .unwrap();
    s.chat
        .post_message(&student("u-owner"), &a.claim.id, "front desk, building C")
        .await
        .unwrap();

    let thread = s
        .chat
        .list_messages(&student("u-alice"), &a.claim.id)
        .await
        .unwrap();
    assert_eq!(thread.len(), 2);
    assert!(thread[0].seq < thread[1].seq);
}

// ---- HTTP gateway ----

async fn spawn_gateway(state: GatewayState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let app = build_router(state, std::time::Duration::from_secs(15));
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn gateway_state(s: &Stack, bearer_token: Option<String>) -> GatewayState {
    GatewayState {
        engine: s.engine.clone(),
        chat: s.chat.clone(),
        dispatcher: s.dispatcher.clone(),
        presence: s.presence.clone(),
        auth: AuthConfig { bearer_token },
        start_time: std::time::Instant::now(),
    }
}

fn with_identity(req: reqwest::RequestBuilder, identity: &Identity) -> reqwest::RequestBuilder {
    req.header("x-user-id", &identity.user_id)
        .header("x-user-role", identity.role.to_string())
        .header("x-user-verified", if identity.verified { "true" } else { "false" })
}

#[tokio::test]
async fn http_claim_lifecycle_end_to_end() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();
    let addr = spawn_gateway(gateway_state(&s, None)).await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    // Alice submits a claim.
    let resp = with_identity(client.post(format!("{base}/v1/claims")), &student("u-alice"))
        .json(&serde_json::json!({
            "item_id": "i-1",
            "description": "blue backpack",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = resp.json().await.unwrap();
    let claim_id = created["claim"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["claim"]["status"], "PENDING");

    // A duplicate submission conflicts.
    let dup = with_identity(client.post(format!("{base}/v1/claims")), &student("u-alice"))
        .json(&serde_json::json!({
            "item_id": "i-1",
            "description": "blue backpack again",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), 409);
    let dup_body: serde_json::Value = dup.json().await.unwrap();
    assert_eq!(dup_body["retryable"], false);

    // The owner approves it.
    let resp = with_identity(
        client.post(format!("{base}/v1/claims/{claim_id}/status")),
        &student("u-owner"),
    )
    .json(&serde_json::json!({"status": "APPROVED"}))
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);
    let change: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(change["item_status"], "CLAIMED");

    // A stranger cannot flip the claim.
    let resp = with_identity(
        client.post(format!("{base}/v1/claims/{claim_id}/status")),
        &student("u-eve"),
    )
    .json(&serde_json::json!({"status": "COMPLETED"}))
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 403);

    // Alice reads her inbox and marks it read.
    let resp = with_identity(client.get(format!("{base}/v1/notifications")), &student("u-alice"))
        .send()
        .await
        .unwrap();
    let inbox: serde_json::Value = resp.json().await.unwrap();
    assert!(!inbox["notifications"].as_array().unwrap().is_empty());

    let resp = with_identity(
        client.post(format!("{base}/v1/notifications/read")),
        &student("u-alice"),
    )
    .send()
    .await
    .unwrap();
    let marked: serde_json::Value = resp.json().await.unwrap();
    assert!(marked["marked"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn http_messages_round_trip() {
    let s = stack().await;
    s.harness.seed_item("i-1", "u-owner").await.unwrap();
    s.harness.seed_claim("c-1", "i-1", "u-alice").await.unwrap();
    let addr = spawn_gateway(gateway_state(&s, None)).await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    let resp = with_identity(
        client.post(format!("{base}/v1/claims/c-1/messages")),
        &student("u-alice"),
    )
    .json(&serde_json::json!({"content": "is this mine?"}))
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = with_identity(
        client.get(format!("{base}/v1/claims/c-1/messages")),
        &student("u-owner"),
    )
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "is this mine?");
    assert_eq!(messages[0]["read"], true);

    // Outsiders get 403.
    let resp = with_identity(
        client.get(format!("{base}/v1/claims/c-1/messages")),
        &student("u-eve"),
    )
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn http_auth_gates_the_api_but_not_health() {
    let s = stack().await;
    let addr = spawn_gateway(gateway_state(&s, Some("shh".to_string()))).await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    // Health stays open.
    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // Identity headers without the bearer token are rejected.
    let resp = with_identity(client.get(format!("{base}/v1/notifications")), &student("u-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Bearer token without identity headers is rejected too.
    let resp = client
        .get(format!("{base}/v1/notifications"))
        .header("authorization", "Bearer shh")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Both together pass.
    let resp = with_identity(client.get(format!("{base}/v1/notifications")), &student("u-1"))
        .header("authorization", "Bearer shh")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn http_unknown_claim_is_404() {
    let s = stack().await;
    let addr = spawn_gateway(gateway_state(&s, None)).await;
    let client = reqwest::Client::new();

    let resp = with_identity(
        client.get(format!("http://{addr}/v1/claims/c-ghost")),
        &Identity {
            user_id: "u-1".to_string(),
            role: Role::Faculty,
            verified: true,
        },
    )
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 404);
}
