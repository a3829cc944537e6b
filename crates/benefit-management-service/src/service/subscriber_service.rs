//! 订阅者名册服务
//!
//! 名册同时充当会话身份来源：请求中的用户 ID 在此解析为订阅者记录。

use std::sync::Arc;

use tracing::instrument;

use crate::error::{BenefitError, Result};
use crate::models::{Redemption, Subscriber};
use crate::repository::{RedemptionRepositoryTrait, SubscriberRepositoryTrait};
use crate::service::dto::{SortOrder, SubscriberQuery};

/// 订阅者名册服务
pub struct SubscriberService<SR, RR>
where
    SR: SubscriberRepositoryTrait + ?Sized,
    RR: RedemptionRepositoryTrait + ?Sized,
{
    subscriber_repo: Arc<SR>,
    redemption_repo: Arc<RR>,
}

impl<SR, RR> SubscriberService<SR, RR>
where
    SR: SubscriberRepositoryTrait + ?Sized,
    RR: RedemptionRepositoryTrait + ?Sized,
{
    pub fn new(subscriber_repo: Arc<SR>, redemption_repo: Arc<RR>) -> Self {
        Self {
            subscriber_repo,
            redemption_repo,
        }
    }

    /// 订阅者列表
    ///
    /// 不含管理员；按用户名关键字过滤（不区分大小写），按用户名排序
    #[instrument(skip(self))]
    pub async fn list_subscribers(&self, query: &SubscriberQuery) -> Result<Vec<Subscriber>> {
        let keyword = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut subscribers: Vec<Subscriber> = self
            .subscriber_repo
            .list_subscribers()
            .await?
            .into_iter()
            .filter(|s| s.is_subscriber && !s.is_admin)
            .filter(|s| {
                keyword
                    .as_deref()
                    .is_none_or(|k| s.username.to_lowercase().contains(k))
            })
            .collect();

        subscribers.sort_by(|a, b| {
            a.username
                .to_lowercase()
                .cmp(&b.username.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        if query.sort == SortOrder::Desc {
            subscribers.reverse();
        }

        Ok(subscribers)
    }

    #[instrument(skip(self))]
    pub async fn get_subscriber(&self, id: &str) -> Result<Subscriber> {
        self.subscriber_repo
            .get_subscriber(id)
            .await?
            .ok_or_else(|| BenefitError::SubscriberNotFound(id.to_string()))
    }

    /// 指定用户的兑换明细，倒序
    ///
    /// 不要求用户在名册中
    #[instrument(skip(self))]
    pub async fn redemption_details(&self, user_id: &str) -> Result<Vec<Redemption>> {
        self.redemption_repo.list_by_user(user_id).await
    }
}
