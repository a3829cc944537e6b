//! 权益定义

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 权益
///
/// 订阅者可兑换的福利定义，每个用户对同一权益的兑换受冷却期约束
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 分组标签（自由文本）
    pub category: String,
    /// 冷却天数，最小为 1
    #[sqlx(try_from = "i64")]
    pub cooldown_days: u32,
    /// 是否可兑换
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Benefit {
    /// 生成新的权益 ID
    pub fn generate_id() -> String {
        format!("benefit-{}", Uuid::new_v4().simple())
    }

    /// 冷却期结束时刻（按自然日累加）
    ///
    /// 溢出时返回可表示的最大时刻，即永不结束
    pub fn cooldown_end(&self, last_redeemed: DateTime<Utc>) -> DateTime<Utc> {
        last_redeemed
            .checked_add_days(Days::new(u64::from(self.cooldown_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_redeemable(&self) -> bool {
        self.enabled
    }
}
