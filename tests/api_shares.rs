//! Integration tests per gli endpoints degli share
//!
//! Test per:
//! - GET /shares, POST /shares
//! - GET/PATCH/DELETE /shares/{share_id}
//! - POST/DELETE /shares/{share_id}/members/{user_id}

mod common;

#[cfg(test)]
mod share_tests {
    use super::common::{lunch, seed_flat, seed_share, seed_user, setup};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_root_health_check() {
        let server = setup().await;
        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("Server is running!");
    }

    // ============================================================
    // Test per POST /shares - create_share
    // ============================================================

    #[tokio::test]
    async fn test_create_share_with_members() {
        let server = setup().await;
        let alice = seed_user(&server, "alice").await;
        let bob = seed_user(&server, "bob").await;

        let response = server
            .post("/shares")
            .json(&json!({ "name": "flat", "description": "rent and bills", "users": [bob, alice] }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let share: Value = response.json();
        assert_eq!(share["name"], "flat");
        assert_eq!(share["users"], json!([alice, bob]));
        assert_eq!(share["expenses"], json!([]));
        assert_eq!(share["total"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn test_create_share_with_unknown_user() {
        let server = setup().await;

        let response = server
            .post("/shares")
            .json(&json!({ "name": "flat", "description": "", "users": [41] }))
            .await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["fields"]["users"], "User with ID 41 not found.");
        let shares: Vec<Value> = server.get("/shares").await.json();
        assert!(shares.is_empty());
    }

    #[tokio::test]
    async fn test_create_share_duplicate_name() {
        let server = setup().await;
        seed_share(&server, "flat", &[]).await;

        let response = server
            .post("/shares")
            .json(&json!({ "name": "flat", "description": "again" }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_share_name_too_long() {
        let server = setup().await;

        let response = server
            .post("/shares")
            .json(&json!({ "name": "x".repeat(65), "description": "" }))
            .await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["fields"]["name"].is_string());
    }

    #[tokio::test]
    async fn test_create_share_rejects_computed_fields() {
        let server = setup().await;
        let alice = seed_user(&server, "alice").await;

        let response = server
            .post("/shares")
            .json(&json!({
                "name": "flat",
                "description": "d",
                "users": [alice],
                "total": 5,
                "expenses": [1]
            }))
            .await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["fields"]["total"], "read-only field.");
        assert_eq!(error["fields"]["expenses"], "read-only field.");
        let shares: Vec<Value> = server.get("/shares").await.json();
        assert!(shares.is_empty());
    }

    // ============================================================
    // Test per GET /shares - list_shares, get_share
    // ============================================================

    #[tokio::test]
    async fn test_get_share_sums_expense_totals() {
        let server = setup().await;
        let (share, alice, bob) = seed_flat(&server).await;

        let mut ids = Vec::new();
        for total in ["10.10", "0.20"] {
            let mut body = lunch(share, alice, json!({ alice.to_string(): "1/2", bob.to_string(): "1/2" }));
            body["total"] = json!(total);
            let expense: Value = server.post("/expenses").json(&body).await.json();
            ids.push(expense["id"].clone());
        }

        let response = server.get(&format!("/shares/{share}")).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["expenses"], Value::Array(ids));
        let total = body["total"].as_f64().unwrap_or_default();
        assert!((total - 10.3).abs() < 1e-9, "total was {total}");
    }

    #[tokio::test]
    async fn test_list_shares_filters() {
        let server = setup().await;
        let flat = seed_share(&server, "flat", &[]).await;
        let trip = seed_share(&server, "trip", &[]).await;
        seed_share(&server, "car", &[]).await;

        let by_name: Vec<Value> = server
            .get("/shares")
            .add_query_param("name", "flat,trip,")
            .await
            .json();
        assert_eq!(by_name.len(), 2);

        let both: Vec<Value> = server
            .get("/shares")
            .add_query_param("name", "flat,trip")
            .add_query_param("id", trip)
            .await
            .json();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0]["id"], trip);
        assert_ne!(both[0]["id"], flat);
    }

    #[tokio::test]
    async fn test_get_missing_share() {
        let server = setup().await;
        server.get("/shares/9").await.assert_status_not_found();
    }

    // ============================================================
    // Test per PATCH /shares/{share_id} - update_share
    // ============================================================

    #[tokio::test]
    async fn test_update_share_replaces_members() {
        let server = setup().await;
        let (share, alice, _bob) = seed_flat(&server).await;
        let carol = seed_user(&server, "carol").await;

        let response = server
            .patch(&format!("/shares/{share}"))
            .json(&json!({ "users": [alice, carol] }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["users"], json!([alice, carol]));
        assert_eq!(body["name"], "flat");
    }

    #[tokio::test]
    async fn test_update_share_rejects_read_only_fields() {
        let server = setup().await;
        let share = seed_share(&server, "flat", &[]).await;

        let response = server
            .patch(&format!("/shares/{share}"))
            .json(&json!({ "created_at": 0 }))
            .await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["fields"]["created_at"], "read-only field.");

        let response = server
            .patch(&format!("/shares/{share}"))
            .json(&json!({ "description": "d", "total": "12.50" }))
            .await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["fields"]["total"], "read-only field.");
    }

    // ============================================================
    // Test per /shares/{share_id}/members/{user_id}
    // ============================================================

    #[tokio::test]
    async fn test_add_member_is_idempotent() {
        let server = setup().await;
        let (share, alice, bob) = seed_flat(&server).await;
        let carol = seed_user(&server, "carol").await;
        let path = format!("/shares/{share}/members/{carol}");

        server.post(&path).await.assert_status_ok();
        let response = server.post(&path).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["users"], json!([alice, bob, carol]));
    }

    #[tokio::test]
    async fn test_add_unknown_member() {
        let server = setup().await;
        let share = seed_share(&server, "flat", &[]).await;

        server
            .post(&format!("/shares/{share}/members/8"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_remove_member() {
        let server = setup().await;
        let (share, alice, bob) = seed_flat(&server).await;
        let path = format!("/shares/{share}/members/{bob}");

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status_not_found();

        let body: Value = server.get(&format!("/shares/{share}")).await.json();
        assert_eq!(body["users"], json!([alice]));
    }

    #[tokio::test]
    async fn test_remove_member_keeps_their_expenses() {
        let server = setup().await;
        let (share, alice, bob) = seed_flat(&server).await;
        let expense: Value = server
            .post("/expenses")
            .json(&lunch(share, alice, json!({ alice.to_string(): "1/2", bob.to_string(): "1/2" })))
            .await
            .json();

        server
            .delete(&format!("/shares/{share}/members/{alice}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let stored: Value = server.get(&format!("/expenses/{}", expense["id"])).await.json();
        assert_eq!(stored["paid_by"], alice);
        assert_eq!(stored["paid_for"], expense["paid_for"]);
        let body: Value = server.get(&format!("/shares/{share}")).await.json();
        assert_eq!(body["users"], json!([bob]));
        assert_eq!(body["expenses"], json!([expense["id"]]));
    }

    // ============================================================
    // Test per DELETE /shares/{share_id} - delete_share
    // ============================================================

    #[tokio::test]
    async fn test_delete_share_cascades_to_expenses() {
        let server = setup().await;
        let (share, alice, bob) = seed_flat(&server).await;
        let expense: Value = server
            .post("/expenses")
            .json(&lunch(share, alice, json!({ alice.to_string(): "1/2", bob.to_string(): "1/2" })))
            .await
            .json();

        server
            .delete(&format!("/shares/{share}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/expenses/{}", expense["id"]))
            .await
            .assert_status_not_found();
        let user: Value = server.get(&format!("/users/{alice}")).await.json();
        assert_eq!(user["shares"], json!([]));
        assert_eq!(user["paid_by"], json!([]));
    }
}
