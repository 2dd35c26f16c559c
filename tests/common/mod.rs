#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use shared_expenses::core::{AppState, connect_in_memory};
use std::sync::Arc;

/// Crea un AppState per i test
///
/// # Returns
/// Arc<AppState> su un database SQLite in memoria, già migrato e vuoto
pub async fn create_test_state() -> Arc<AppState> {
    let pool = connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    Arc::new(AppState::new(pool))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = shared_expenses::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Server su un database nuovo
pub async fn setup() -> TestServer {
    create_test_server(create_test_state().await)
}

/// Crea un utente via API e ne ritorna l'id
pub async fn seed_user(server: &TestServer, name: &str) -> i64 {
    let response = server.post("/users").json(&json!({ "name": name })).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_i64()
        .expect("user id in response")
}

/// Crea uno share con i membri indicati e ne ritorna l'id
pub async fn seed_share(server: &TestServer, name: &str, users: &[i64]) -> i64 {
    let response = server
        .post("/shares")
        .json(&json!({
            "name": name,
            "description": format!("{name} expenses"),
            "users": users,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_i64()
        .expect("share id in response")
}

/// Share "flat" con due membri: ritorna (share, alice, bob)
pub async fn seed_flat(server: &TestServer) -> (i64, i64, i64) {
    let alice = seed_user(server, "alice").await;
    let bob = seed_user(server, "bob").await;
    let share = seed_share(server, "flat", &[alice, bob]).await;
    (share, alice, bob)
}

/// Payload di una spesa da 10.00 pagata da `payer`
pub fn lunch(share: i64, payer: i64, paid_for: Value) -> Value {
    json!({
        "description": "lunch",
        "share": share,
        "total": "10.00",
        "paid_by": payer,
        "paid_for": paid_for,
    })
}
