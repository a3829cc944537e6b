//! 管理后台错误类型定义
//!
//! 领域错误到 HTTP 状态码与统一响应体的映射

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use benefit_management::BenefitError;
use chrono::{DateTime, Utc};
use serde_json::json;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // 会话错误
    #[error("未登录: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("权益不存在: {0}")]
    BenefitNotFound(String),
    #[error("兑换记录不存在: {0}")]
    RedemptionNotFound(String),
    #[error("订阅者不存在: {0}")]
    SubscriberNotFound(String),

    // 业务错误
    #[error("权益已停用: {0}")]
    BenefitDisabled(String),
    #[error("权益 {benefit_id} 冷却中，可再次兑换时间: {available_at}")]
    CooldownActive {
        benefit_id: String,
        available_at: DateTime<Utc>,
    },
    #[error("不允许的状态迁移: {0}")]
    InvalidTransition(String),
    #[error("请求冲突，请稍后重试: {0}")]
    Conflict(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) => StatusCode::BAD_REQUEST,

            Self::BenefitNotFound(_)
            | Self::RedemptionNotFound(_)
            | Self::SubscriberNotFound(_) => StatusCode::NOT_FOUND,

            Self::CooldownActive { .. } | Self::InvalidTransition(_) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::BenefitDisabled(_) => StatusCode::UNPROCESSABLE_ENTITY,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BenefitNotFound(_) => "BENEFIT_NOT_FOUND",
            Self::RedemptionNotFound(_) => "REDEMPTION_NOT_FOUND",
            Self::SubscriberNotFound(_) => "SUBSCRIBER_NOT_FOUND",
            Self::BenefitDisabled(_) => "BENEFIT_DISABLED",
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Conflict(_) => "LOCK_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从领域错误转换
impl From<BenefitError> for AdminError {
    fn from(err: BenefitError) -> Self {
        match err {
            BenefitError::BenefitNotFound(id) => Self::BenefitNotFound(id),
            BenefitError::BenefitDisabled(id) => Self::BenefitDisabled(id),
            BenefitError::CooldownActive {
                benefit_id,
                available_at,
            } => Self::CooldownActive {
                benefit_id,
                available_at,
            },
            BenefitError::RedemptionNotFound(id) => Self::RedemptionNotFound(id),
            e @ BenefitError::InvalidTransition { .. } => Self::InvalidTransition(e.to_string()),
            BenefitError::SubscriberNotFound(id) => Self::SubscriberNotFound(id),
            BenefitError::Validation(msg) => Self::Validation(msg),
            BenefitError::LockConflict { resource } => Self::Conflict(resource),
            BenefitError::Database(e) => Self::Database(e),
            BenefitError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
