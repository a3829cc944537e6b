//! 兑换状态枚举
//!
//! 同时支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};
use std::fmt;

/// 兑换状态
///
/// 状态迁移：
/// ```text
/// Pending ──(approve)──► Completed
/// Pending ──(reject)───► Cancelled
/// Completed ──(revert)─► Cancelled
/// Cancelled ──(reinstate)─► Completed
/// ```
///
/// Pending 只能由新建兑换进入；Completed 与 Cancelled 之间可由管理员来回切换。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum RedemptionStatus {
    /// 待处理 - 新建兑换的唯一初始状态
    #[default]
    Pending,
    /// 已完成
    Completed,
    /// 已取消 - 不计入冷却期
    Cancelled,
}

impl RedemptionStatus {
    /// 是否允许迁移到目标状态
    pub fn can_transition_to(self, next: RedemptionStatus) -> bool {
        use RedemptionStatus::*;
        matches!(
            (self, next),
            (Pending, Completed)
                | (Pending, Cancelled)
                | (Completed, Cancelled)
                | (Cancelled, Completed)
        )
    }

    /// 是否计入冷却期计算
    pub fn counts_toward_cooldown(self) -> bool {
        self != RedemptionStatus::Cancelled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
