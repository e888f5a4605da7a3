//! End-to-end tests for the HTTP API, driven through the router in-process
//! with a temp-file SQLite store behind it.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use calma_core::config::AuthConfig;
use calma_server::router;
use calma_store::SqliteStore;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("api.db")).await.unwrap();
    let auth = AuthConfig {
        login_token_ttl_mins: 15,
        session_ttl_hours: 1,
        expose_login_token: true,
    };
    (dir, router(Arc::new(store), auth))
}

fn post_json(uri: &str, bearer: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Run the full login flow and return a bearer token.
async fn bearer_for(app: &Router, email: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            None,
            serde_json::json!({ "email": email }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login = body_json(resp).await;
    let token = login["token"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(post_json(
            "/auth/verify",
            None,
            serde_json::json!({ "email": email, "token": token }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn do_check_in(app: &Router, bearer: &str, feeling: &str, severity: u8) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/checkin",
            Some(bearer),
            serde_json::json!({ "feeling": feeling, "severity": severity }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = test_app().await;
    let resp = app.oneshot(get_req("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_email() {
    let (_dir, app) = test_app().await;
    for email in ["", "no-at", "@x.com", "user@"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                None,
                serde_json::json!({ "email": email }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "email {:?}", email);
    }
}

#[tokio::test]
async fn test_login_token_is_single_use() {
    let (_dir, app) = test_app().await;
    let resp = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            None,
            serde_json::json!({ "email": "a@example.com" }),
        ))
        .await
        .unwrap();
    let token = body_json(resp).await["token"].as_str().unwrap().to_string();

    let verify = serde_json::json!({ "email": "a@example.com", "token": token });
    let first = app
        .clone()
        .oneshot(post_json("/auth/verify", None, verify.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(post_json("/auth/verify", None, verify))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_bearer() {
    let (_dir, app) = test_app().await;
    let body = serde_json::json!({ "feeling": "stress", "severity": 5 });

    let resp = app
        .clone()
        .oneshot(post_json("/checkin", None, body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(post_json("/checkin", Some("not-a-session"), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.clone().oneshot(get_req("/history", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.clone().oneshot(get_req("/stats", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_in_validation() {
    let (_dir, app) = test_app().await;
    let bearer = bearer_for(&app, "a@example.com").await;

    // Unknown feeling
    let resp = app
        .clone()
        .oneshot(post_json(
            "/checkin",
            Some(&bearer),
            serde_json::json!({ "feeling": "bored", "severity": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err = body_json(resp).await;
    assert!(err["error"].as_str().unwrap().contains("bored"));

    // Severity out of range, both ends
    for severity in [0u8, 11] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/checkin",
                Some(&bearer),
                serde_json::json!({ "feeling": "stress", "severity": severity }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // Oversized note
    let resp = app
        .clone()
        .oneshot(post_json(
            "/checkin",
            Some(&bearer),
            serde_json::json!({
                "feeling": "stress",
                "severity": 5,
                "note": "x".repeat(501),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_in_returns_experience() {
    let (_dir, app) = test_app().await;
    let bearer = bearer_for(&app, "a@example.com").await;

    let low = do_check_in(&app, &bearer, "anxiety", 4).await;
    assert_eq!(low["experience"]["primary"], "music");
    assert_eq!(low["experience"]["prompts"].as_array().unwrap().len(), 3);
    assert_eq!(low["experience"]["duration_minutes"], 5);
    assert!(low["experience"]["breathing"].is_null());

    let high = do_check_in(&app, &bearer, "anxiety", 9).await;
    assert_eq!(high["experience"]["primary"], "nature_video");
    assert_eq!(high["experience"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(high["experience"]["duration_minutes"], 10);
    assert_eq!(high["experience"]["breathing"]["hold_secs"], 7);
    assert_eq!(high["check_in"]["feeling"], "anxiety");
}

#[tokio::test]
async fn test_history_and_session_detail() {
    let (_dir, app) = test_app().await;
    let bearer = bearer_for(&app, "a@example.com").await;

    let first = do_check_in(&app, &bearer, "stress", 3).await;
    let second = do_check_in(&app, &bearer, "frustration", 8).await;

    let resp = app
        .clone()
        .oneshot(get_req("/history", Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history = body_json(resp).await;
    let sessions = history["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["id"], second["session_id"]);
    assert_eq!(sessions[1]["id"], first["session_id"]);

    let resp = app
        .clone()
        .oneshot(get_req("/history?limit=1", Some(&bearer)))
        .await
        .unwrap();
    let limited = body_json(resp).await;
    assert_eq!(limited["sessions"].as_array().unwrap().len(), 1);

    let uri = format!("/sessions/{}", first["session_id"].as_str().unwrap());
    let resp = app.clone().oneshot(get_req(&uri, Some(&bearer))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["check_in"]["feeling"], "stress");

    // Unknown session id
    let resp = app
        .clone()
        .oneshot(get_req(
            &format!("/sessions/{}", uuid::Uuid::new_v4()),
            Some(&bearer),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_are_not_visible_across_users() {
    let (_dir, app) = test_app().await;
    let alice = bearer_for(&app, "alice@example.com").await;
    let mallory = bearer_for(&app, "mallory@example.com").await;

    let session = do_check_in(&app, &alice, "depression", 6).await;
    let uri = format!("/sessions/{}", session["session_id"].as_str().unwrap());

    let resp = app.clone().oneshot(get_req(&uri, Some(&mallory))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_and_stats() {
    let (_dir, app) = test_app().await;
    let bearer = bearer_for(&app, "a@example.com").await;

    let session = do_check_in(&app, &bearer, "stress", 7).await;
    do_check_in(&app, &bearer, "anxiety", 3).await;

    let uri = format!(
        "/sessions/{}/complete",
        session["session_id"].as_str().unwrap()
    );
    let first = app
        .clone()
        .oneshot(post_json(&uri, Some(&bearer), serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let completed_at = body_json(first).await["completed_at"].as_i64().unwrap();

    // Idempotent: same timestamp back
    let second = app
        .clone()
        .oneshot(post_json(&uri, Some(&bearer), serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(
        body_json(second).await["completed_at"].as_i64().unwrap(),
        completed_at
    );

    let resp = app.clone().oneshot(get_req("/stats", Some(&bearer))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp).await;
    assert_eq!(stats["total_sessions"], 2);
    assert_eq!(stats["completed_sessions"], 1);
    assert!((stats["average_severity"].as_f64().unwrap() - 5.0).abs() < 1e-9);
}
