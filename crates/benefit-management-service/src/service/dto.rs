//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::eligibility::Eligibility;
use crate::models::{Benefit, Redemption, RedemptionStatus};

// ==================== 兑换 ====================

/// 创建兑换请求
///
/// 用户名与头像由会话提供，写入兑换记录作为快照
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedemptionRequest {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub user_avatar: String,
    pub benefit_id: String,
}

/// 兑换列表过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionFilter {
    pub status: Option<RedemptionStatus>,
    pub user_id: Option<String>,
    pub benefit_id: Option<String>,
    /// 关键字，不区分大小写匹配用户名或权益标题
    pub keyword: Option<String>,
}

impl RedemptionFilter {
    pub fn matches(&self, redemption: &Redemption) -> bool {
        if self.status.is_some_and(|s| s != redemption.status) {
            return false;
        }
        if self
            .user_id
            .as_deref()
            .is_some_and(|id| id != redemption.user_id)
        {
            return false;
        }
        if self
            .benefit_id
            .as_deref()
            .is_some_and(|id| id != redemption.benefit_id)
        {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                let keyword = keyword.to_lowercase();
                redemption.username.to_lowercase().contains(&keyword)
                    || redemption.benefit_title.to_lowercase().contains(&keyword)
            }
            _ => true,
        }
    }
}

/// 待处理兑换汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub total: usize,
    /// 分类 -> 待处理数量
    pub by_category: BTreeMap<String, usize>,
}

/// 权益及当前用户的兑换资格
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitAvailability {
    #[serde(flatten)]
    pub benefit: Benefit,
    pub eligibility: Eligibility,
}

// ==================== 权益目录 ====================

/// 新建权益
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBenefit {
    /// 为空时自动生成
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    /// 为空时使用配置的默认冷却天数
    pub cooldown_days: Option<u32>,
    /// 默认启用
    pub enabled: Option<bool>,
}

/// 权益更新（仅更新提供的字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cooldown_days: Option<u32>,
    pub enabled: Option<bool>,
}

// ==================== 订阅者 ====================

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// 订阅者列表查询
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberQuery {
    /// 用户名关键字（不区分大小写）
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}
