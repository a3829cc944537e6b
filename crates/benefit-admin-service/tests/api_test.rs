//! 管理后台 HTTP 接口测试
//!
//! 使用内存存储与演示数据，通过 `tower::ServiceExt::oneshot` 直接驱动路由。

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use benefit_admin_service::{routes, state::AppState};
use benefit_management::{Repositories, seed};
use benefit_shared::config::BenefitsConfig;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

// ==================== 辅助函数 ====================

async fn setup_app() -> Router {
    let repos = Repositories::in_memory();
    seed::load_demo_data(&repos, Utc::now()).await.unwrap();
    routes::build_app(AppState::new(&repos, &BenefitsConfig::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, user, None).await
}

const ADMIN: Option<&str> = Some(seed::ADMIN_ID);

// ==================== 公开与会话 ====================

#[tokio::test]
async fn test_health_is_public() {
    let app = setup_app().await;
    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "memory");
}

#[tokio::test]
async fn test_session_required() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/api/benefits", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["data"].is_null());

    let (status, _) = get(&app, "/api/benefits", Some("ghost")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_subscribers() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/api/admin/redemptions", Some("user-1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = get(&app, "/api/admin/redemptions", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
}

// ==================== 订阅者 ====================

#[tokio::test]
async fn test_available_benefits_and_eligibility() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/api/benefits", Some("user-3")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], seed::TEAM_ANALYSIS_ID);
    assert_eq!(items[0]["cooldownDays"], 31);
    assert_eq!(items[0]["eligibility"]["eligible"], true);

    let uri = format!("/api/benefits/{}/eligibility", seed::TEAM_ANALYSIS_ID);
    let (status, body) = get(&app, &uri, Some("user-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], false);
    assert!(body["data"]["availableAt"].is_string());

    let (status, body) = get(&app, "/api/benefits/missing/eligibility", Some("user-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], false);
}

#[tokio::test]
async fn test_redeem_flow() {
    let app = setup_app().await;
    let uri = format!("/api/benefits/{}/redeem", seed::TEAM_ANALYSIS_ID);

    let (status, body) = send(&app, Method::POST, &uri, Some("user-3"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["username"], "viewer3");
    assert_eq!(body["data"]["benefitTitle"], "Análise de Time");
    assert!(body["data"].get("completedAt").is_none());

    let (status, body) = send(&app, Method::POST, &uri, Some("user-3"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "COOLDOWN_ACTIVE");

    let (status, body) = get(&app, "/api/me/history", Some("user-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["benefitId"], seed::TEAM_ANALYSIS_ID);

    let (_, body) = get(&app, "/api/me/redemptions", Some("user-3")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) =
        send(&app, Method::POST, "/api/benefits/missing/redeem", Some("user-3"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BENEFIT_NOT_FOUND");
}

#[tokio::test]
async fn test_redeem_disabled_benefit() {
    let app = setup_app().await;
    let uri = format!("/api/admin/benefits/{}", seed::TEAM_ANALYSIS_ID);

    let (status, body) =
        send(&app, Method::PUT, &uri, ADMIN, Some(json!({ "enabled": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);

    let redeem = format!("/api/benefits/{}/redeem", seed::TEAM_ANALYSIS_ID);
    let (status, body) = send(&app, Method::POST, &redeem, Some("user-4"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BENEFIT_DISABLED");

    let (_, body) = get(&app, "/api/benefits", Some("user-4")).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// ==================== 管理员 ====================

#[tokio::test]
async fn test_review_redemption() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/api/admin/redemptions?status=pending", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], "redemption-2");

    let (_, body) = get(&app, "/api/admin/redemptions/summary", ADMIN).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["byCategory"]["analysis"], 1);

    let uri = "/api/admin/redemptions/redemption-2/status";
    let (status, body) =
        send(&app, Method::PATCH, uri, ADMIN, Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completedAt"].is_string());

    let (status, body) =
        send(&app, Method::PATCH, uri, ADMIN, Some(json!({ "status": "pending" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/admin/redemptions/redemption-missing/status",
        ADMIN,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REDEMPTION_NOT_FOUND");

    let (_, body) = get(&app, "/api/admin/redemptions/summary", ADMIN).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_cancel_reopens_redemption_for_user() {
    let app = setup_app().await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/admin/redemptions/redemption-1/status",
        ADMIN,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/benefits/{}/eligibility", seed::TEAM_ANALYSIS_ID);
    let (_, body) = get(&app, &uri, Some("user-1")).await;
    assert_eq!(body["data"]["eligible"], true);
}

#[tokio::test]
async fn test_catalog_management() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/benefits",
        ADMIN,
        Some(json!({ "title": "ab", "description": "short", "category": "review" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/benefits",
        ADMIN,
        Some(json!({
            "id": "benefit-vod-review",
            "title": "Review de VOD",
            "description": "Revisão de uma partida gravada.",
            "category": "review"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["cooldownDays"], 30);
    assert_eq!(body["data"]["enabled"], true);

    let (_, body) = get(&app, "/api/admin/benefits", ADMIN).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let uri = "/api/admin/benefits/benefit-vod-review";
    let (status, body) =
        send(&app, Method::PUT, uri, ADMIN, Some(json!({ "cooldownDays": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cooldownDays"], 7);
    assert_eq!(body["data"]["title"], "Review de VOD");

    let (status, body) = send(&app, Method::DELETE, uri, ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, body) = get(&app, uri, ADMIN).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BENEFIT_NOT_FOUND");
}

#[tokio::test]
async fn test_deleted_benefit_keeps_redemptions() {
    let app = setup_app().await;

    let uri = format!("/api/admin/benefits/{}", seed::TEAM_ANALYSIS_ID);
    let (status, _) = send(&app, Method::DELETE, &uri, ADMIN, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/admin/redemptions", ADMIN).await;
    let redemptions = body["data"].as_array().unwrap();
    assert_eq!(redemptions.len(), 2);
    assert!(redemptions.iter().all(|r| r["benefitTitle"] == "Análise de Time"));

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/admin/redemptions/redemption-2/status",
        ADMIN,
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_subscriber_roster() {
    let app = setup_app().await;

    let (status, body) =
        get(&app, "/api/admin/subscribers?search=viewer&sort=desc", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["viewer5", "viewer4", "viewer3", "viewer2", "viewer1"]);

    let (status, body) = get(&app, "/api/admin/subscribers/user-2/redemptions", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], "redemption-2");
}
