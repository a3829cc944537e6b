//! 权益服务错误类型
//!
//! 定义服务层的业务错误和系统错误。业务错误均可由调用方恢复，
//! 失败的操作不会对账本产生部分写入。

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::RedemptionStatus;

/// 权益服务错误类型
#[derive(Debug, Error)]
pub enum BenefitError {
    // === 权益相关错误 ===
    #[error("权益不存在: {0}")]
    BenefitNotFound(String),

    #[error("权益已停用: {0}")]
    BenefitDisabled(String),

    #[error("权益冷却中: benefit_id={benefit_id}, 可兑换时间 {available_at}")]
    CooldownActive {
        benefit_id: String,
        available_at: DateTime<Utc>,
    },

    // === 兑换相关错误 ===
    #[error("兑换记录不存在: {0}")]
    RedemptionNotFound(String),

    #[error("不允许的状态迁移: redemption_id={redemption_id}, {from} -> {to}")]
    InvalidTransition {
        redemption_id: String,
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    // === 订阅者相关错误 ===
    #[error("订阅者不存在: {0}")]
    SubscriberNotFound(String),

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("资源被占用，请稍后重试: {resource}")]
    LockConflict { resource: String },

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 权益服务 Result 类型别名
pub type Result<T> = std::result::Result<T, BenefitError>;

impl BenefitError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::LockConflict { .. })
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::LockConflict { .. }
        )
    }

    /// 获取错误码（用于 API 响应与指标标签）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BenefitNotFound(_) => "BENEFIT_NOT_FOUND",
            Self::BenefitDisabled(_) => "BENEFIT_DISABLED",
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            Self::RedemptionNotFound(_) => "REDEMPTION_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::SubscriberNotFound(_) => "SUBSCRIBER_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::LockConflict { .. } => "LOCK_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
