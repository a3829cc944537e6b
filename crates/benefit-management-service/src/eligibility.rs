//! 兑换资格判定
//!
//! 纯函数实现，不访问存储。当前时间由调用方显式传入。
//!
//! 冷却期规则：最近一次未取消兑换的时间加上 `cooldown_days` 个自然日得到冷却结束时刻，
//! 仅当 `now` 严格大于该时刻时才可再次兑换。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Benefit, Redemption, UserRedemptionHistory};

/// 资格判定结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub eligible: bool,
    /// 最近一次未取消兑换的时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_redeemed: Option<DateTime<Utc>>,
    /// 冷却结束时刻（仍在冷却中时返回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_at: Option<DateTime<Utc>>,
}

impl Eligibility {
    /// 不可兑换且无历史（未知或已停用权益）
    pub fn denied() -> Self {
        Self {
            eligible: false,
            last_redeemed: None,
            available_at: None,
        }
    }
}

/// 判定资格
///
/// - 权益不存在或已停用：不可兑换
/// - 无有效历史：可兑换
/// - 否则 `now > cooldown_end` 时可兑换（等于时仍在冷却中）
pub fn evaluate(
    benefit: Option<&Benefit>,
    last_redeemed: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Eligibility {
    let Some(benefit) = benefit.filter(|b| b.is_redeemable()) else {
        return Eligibility::denied();
    };

    match last_redeemed {
        None => Eligibility {
            eligible: true,
            last_redeemed: None,
            available_at: None,
        },
        Some(last) => {
            let cooldown_end = benefit.cooldown_end(last);
            let eligible = now > cooldown_end;
            Eligibility {
                eligible,
                last_redeemed: Some(last),
                available_at: (!eligible).then_some(cooldown_end),
            }
        }
    }
}

/// 最近一次未取消的兑换
pub fn latest_active<'a, I>(redemptions: I) -> Option<&'a Redemption>
where
    I: IntoIterator<Item = &'a Redemption>,
{
    redemptions
        .into_iter()
        .filter(|r| r.is_active())
        .max_by_key(|r| r.timestamp)
}

/// 由兑换记录派生用户历史
///
/// 排除已取消记录，每个权益取最新时间，按时间倒序
pub fn derive_history<'a, I>(redemptions: I) -> Vec<UserRedemptionHistory>
where
    I: IntoIterator<Item = &'a Redemption>,
{
    let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for r in redemptions.into_iter().filter(|r| r.is_active()) {
        latest
            .entry(r.benefit_id.as_str())
            .and_modify(|t| *t = (*t).max(r.timestamp))
            .or_insert(r.timestamp);
    }

    let mut history: Vec<UserRedemptionHistory> = latest
        .into_iter()
        .map(|(benefit_id, last_redeemed)| UserRedemptionHistory {
            benefit_id: benefit_id.to_string(),
            last_redeemed,
        })
        .collect();
    history.sort_by(|a, b| {
        b.last_redeemed
            .cmp(&a.last_redeemed)
            .then_with(|| a.benefit_id.cmp(&b.benefit_id))
    });
    history
}
