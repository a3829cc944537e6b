//! 订阅者侧 API 处理器
//!
//! 可兑换权益列表、资格查询、兑换以及个人历史

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use benefit_management::service::dto::{BenefitAvailability, CreateRedemptionRequest};
use benefit_management::{BenefitError, Eligibility, Redemption, UserRedemptionHistory};

use crate::{dto::ApiResponse, error::AdminError, middleware::Session, state::AppState};

/// 启用中的权益及当前用户的兑换资格
///
/// GET /api/benefits
pub async fn list_available(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<BenefitAvailability>>>, AdminError> {
    let items = state
        .redemptions
        .list_available_for(&session.user().id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// 当前用户对指定权益的兑换资格
///
/// GET /api/benefits/{id}/eligibility
///
/// 未知权益返回不可兑换而非 404
pub async fn get_eligibility(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(benefit_id): Path<String>,
) -> Result<Json<ApiResponse<Eligibility>>, AdminError> {
    let eligibility = match state
        .redemptions
        .eligibility_for(&session.user().id, &benefit_id)
        .await
    {
        Ok(eligibility) => eligibility,
        Err(BenefitError::BenefitNotFound(_)) => Eligibility::denied(),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(ApiResponse::success(eligibility)))
}

/// 兑换权益
///
/// POST /api/benefits/{id}/redeem
pub async fn redeem(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(benefit_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Redemption>>), AdminError> {
    let user = session.user();
    if !user.is_subscriber {
        return Err(AdminError::Forbidden("只有订阅者可以兑换权益".to_string()));
    }

    let redemption = state
        .redemptions
        .create_redemption(CreateRedemptionRequest {
            user_id: user.id.clone(),
            username: user.username.clone(),
            user_avatar: user.avatar.clone(),
            benefit_id,
        })
        .await?;

    info!(redemption_id = %redemption.id, user_id = %user.id, "Redemption submitted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(redemption, "兑换已提交，等待审核")),
    ))
}

/// 当前用户的派生历史
///
/// GET /api/me/history
pub async fn my_history(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<UserRedemptionHistory>>>, AdminError> {
    let history = state.redemptions.user_history(&session.user().id).await?;
    Ok(Json(ApiResponse::success(history)))
}

/// 当前用户的兑换记录
///
/// GET /api/me/redemptions
pub async fn my_redemptions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Redemption>>>, AdminError> {
    let redemptions = state
        .redemptions
        .list_user_redemptions(&session.user().id)
        .await?;
    Ok(Json(ApiResponse::success(redemptions)))
}
