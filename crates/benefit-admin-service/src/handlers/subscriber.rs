//! 订阅者名册 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};

use benefit_management::service::dto::SubscriberQuery;
use benefit_management::{Redemption, Subscriber};

use crate::{dto::ApiResponse, error::AdminError, state::AppState};

/// 订阅者列表，支持 search 与 sort=asc|desc
///
/// GET /api/admin/subscribers
pub async fn list_subscribers(
    State(state): State<AppState>,
    Query(query): Query<SubscriberQuery>,
) -> Result<Json<ApiResponse<Vec<Subscriber>>>, AdminError> {
    let subscribers = state.subscribers.list_subscribers(&query).await?;
    Ok(Json(ApiResponse::success(subscribers)))
}

/// 指定用户的兑换明细
///
/// GET /api/admin/subscribers/{id}/redemptions
pub async fn subscriber_redemptions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Redemption>>>, AdminError> {
    let redemptions = state.subscribers.redemption_details(&user_id).await?;
    Ok(Json(ApiResponse::success(redemptions)))
}
