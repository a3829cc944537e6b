//! 兑换记录
//!
//! 兑换记录在创建时冗余保存用户与权益的快照字段，
//! 之后对权益或用户的修改不会回写到历史记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::benefit::Benefit;
use super::enums::RedemptionStatus;

/// 兑换记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub user_id: String,
    /// 兑换时的用户名快照
    pub username: String,
    /// 兑换时的头像快照
    pub user_avatar: String,
    pub benefit_id: String,
    /// 兑换时的权益标题快照
    pub benefit_title: String,
    /// 兑换时的权益分类快照
    pub category: String,
    /// 创建时刻
    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
    pub status: RedemptionStatus,
    /// 最近一次进入 Completed 的时刻
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Redemption {
    /// 以 Pending 状态新建兑换记录，并复制快照字段
    pub fn new_pending(
        user_id: &str,
        username: &str,
        user_avatar: &str,
        benefit: &Benefit,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("redemption-{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            username: username.to_string(),
            user_avatar: user_avatar.to_string(),
            benefit_id: benefit.id.clone(),
            benefit_title: benefit.title.clone(),
            category: benefit.category.clone(),
            timestamp: now,
            status: RedemptionStatus::Pending,
            completed_at: None,
        }
    }

    /// 是否计入冷却期
    pub fn is_active(&self) -> bool {
        self.status.counts_toward_cooldown()
    }

    /// 锁键：同一用户对同一权益的兑换需互斥
    pub fn lock_key(&self) -> String {
        redeem_lock_key(&self.user_id, &self.benefit_id)
    }
}

/// (user, benefit) 维度的兑换锁键
pub fn redeem_lock_key(user_id: &str, benefit_id: &str) -> String {
    format!("redeem:{}:{}", user_id, benefit_id)
}

/// 单条兑换记录的状态锁键
pub fn redemption_lock_key(redemption_id: &str) -> String {
    format!("redemption:{}", redemption_id)
}

/// 用户兑换历史（派生）
///
/// 每个权益一条，记录最近一次未取消兑换的时间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRedemptionHistory {
    pub benefit_id: String,
    pub last_redeemed: DateTime<Utc>,
}
