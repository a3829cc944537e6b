//! 健康检查

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// 存活探针
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "benefit-admin-service"
    }))
}

/// 就绪探针：使用 PostgreSQL 存储时检查数据库连接
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.database {
        Some(db) if db.health_check().await.is_ok() => "ok",
        Some(_) => "fail",
        None => "memory",
    };

    Json(json!({
        "status": if database == "fail" { "degraded" } else { "ok" },
        "service": "benefit-admin-service",
        "checks": {
            "database": database
        }
    }))
}
