//! 权益目录管理 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use benefit_management::Benefit;

use crate::{
    dto::{ApiResponse, CreateBenefitRequest, DeletedResponse, UpdateBenefitRequest},
    error::AdminError,
    state::AppState,
};

/// 全部权益（含停用）
///
/// GET /api/admin/benefits
pub async fn list_benefits(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Benefit>>>, AdminError> {
    let benefits = state.catalog.list_benefits().await?;
    Ok(Json(ApiResponse::success(benefits)))
}

/// POST /api/admin/benefits
pub async fn create_benefit(
    State(state): State<AppState>,
    Json(req): Json<CreateBenefitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Benefit>>), AdminError> {
    req.validate()?;

    let benefit = state.catalog.create_benefit(req.into()).await?;
    info!(benefit_id = %benefit.id, "Benefit created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(benefit))))
}

/// GET /api/admin/benefits/{id}
pub async fn get_benefit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Benefit>>, AdminError> {
    let benefit = state.catalog.get_benefit(&id).await?;
    Ok(Json(ApiResponse::success(benefit)))
}

/// PUT /api/admin/benefits/{id}
pub async fn update_benefit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBenefitRequest>,
) -> Result<Json<ApiResponse<Benefit>>, AdminError> {
    req.validate()?;

    let benefit = state.catalog.update_benefit(&id, req.into()).await?;
    info!(benefit_id = %benefit.id, "Benefit updated");
    Ok(Json(ApiResponse::success(benefit)))
}

/// 删除权益，已有兑换记录保留
///
/// DELETE /api/admin/benefits/{id}
pub async fn delete_benefit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AdminError> {
    state.catalog.delete_benefit(&id).await?;
    info!(benefit_id = %id, "Benefit deleted");
    Ok(Json(ApiResponse::success(DeletedResponse::success())))
}
