//! 兑换审核 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;

use benefit_management::Redemption;
use benefit_management::service::dto::{PendingSummary, RedemptionFilter};

use crate::{
    dto::{ApiResponse, UpdateStatusRequest},
    error::AdminError,
    state::AppState,
};

/// 兑换列表，支持 status / userId / benefitId / keyword 过滤
///
/// GET /api/admin/redemptions
pub async fn list_redemptions(
    State(state): State<AppState>,
    Query(filter): Query<RedemptionFilter>,
) -> Result<Json<ApiResponse<Vec<Redemption>>>, AdminError> {
    let redemptions = state.redemptions.list_redemptions(&filter).await?;
    Ok(Json(ApiResponse::success(redemptions)))
}

/// GET /api/admin/redemptions/summary
pub async fn pending_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PendingSummary>>, AdminError> {
    let summary = state.redemptions.pending_summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// 审核兑换：通过、拒绝、撤销或恢复
///
/// PATCH /api/admin/redemptions/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Redemption>>, AdminError> {
    let redemption = state.redemptions.transition_status(&id, req.status).await?;
    info!(redemption_id = %id, status = %redemption.status, "Redemption status updated");
    Ok(Json(ApiResponse::success(redemption)))
}
