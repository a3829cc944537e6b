//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use benefit_shared::observability::middleware as obs_middleware;

use crate::{handlers, middleware as session, state::AppState};

/// 订阅者侧路由（需要会话）
fn subscriber_routes() -> Router<AppState> {
    Router::new()
        .route("/benefits", get(handlers::benefit::list_available))
        .route(
            "/benefits/{id}/eligibility",
            get(handlers::benefit::get_eligibility),
        )
        .route("/benefits/{id}/redeem", post(handlers::benefit::redeem))
        .route("/me/history", get(handlers::benefit::my_history))
        .route("/me/redemptions", get(handlers::benefit::my_redemptions))
}

/// 管理员路由
///
/// 包含权益目录、兑换审核、订阅者名册
fn admin_routes() -> Router<AppState> {
    Router::new()
        // 权益目录
        .route(
            "/benefits",
            get(handlers::catalog::list_benefits).post(handlers::catalog::create_benefit),
        )
        .route(
            "/benefits/{id}",
            get(handlers::catalog::get_benefit)
                .put(handlers::catalog::update_benefit)
                .delete(handlers::catalog::delete_benefit),
        )
        // 兑换审核
        .route("/redemptions", get(handlers::redemption::list_redemptions))
        .route("/redemptions/summary", get(handlers::redemption::pending_summary))
        .route(
            "/redemptions/{id}/status",
            patch(handlers::redemption::update_status),
        )
        // 订阅者名册
        .route("/subscribers", get(handlers::subscriber::list_subscribers))
        .route(
            "/subscribers/{id}/redemptions",
            get(handlers::subscriber::subscriber_redemptions),
        )
        .route_layer(middleware::from_fn(session::require_admin))
}

/// `/api` 下的全部路由，统一经过会话中间件
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(subscriber_routes())
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state,
            session::session_middleware,
        ))
}

/// 完整应用：API、健康检查与可观测性中间件
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
