//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试。
//! 内存实现与 PostgreSQL 实现共享同一组接口。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Benefit, Redemption, RedemptionStatus, Subscriber};

/// 权益目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BenefitRepositoryTrait: Send + Sync {
    /// 全部权益（含停用），按创建时间升序
    async fn list_benefits(&self) -> Result<Vec<Benefit>>;
    async fn get_benefit(&self, id: &str) -> Result<Option<Benefit>>;
    /// 新增权益，ID 已存在时返回 false
    async fn insert_benefit(&self, benefit: &Benefit) -> Result<bool>;
    /// 覆盖更新，记录不存在时返回 false
    async fn update_benefit(&self, benefit: &Benefit) -> Result<bool>;
    /// 删除权益，记录不存在时返回 false
    async fn delete_benefit(&self, id: &str) -> Result<bool>;
}

/// 兑换账本仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionRepositoryTrait: Send + Sync {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<()>;
    async fn get_redemption(&self, id: &str) -> Result<Option<Redemption>>;
    /// 更新状态与完成时间，返回更新后的记录；记录不存在时返回 None
    async fn update_status(
        &self,
        id: &str,
        status: RedemptionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Redemption>>;
    /// 全部兑换记录，按创建时间倒序
    async fn list_redemptions(&self) -> Result<Vec<Redemption>>;
    /// 指定用户的兑换记录，按创建时间倒序
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Redemption>>;
    /// 指定 (user, benefit) 最近一次未取消的兑换
    async fn latest_active_redemption(
        &self,
        user_id: &str,
        benefit_id: &str,
    ) -> Result<Option<Redemption>>;
}

/// 订阅者名册仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepositoryTrait: Send + Sync {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>>;
    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>>;
    async fn upsert_subscriber(&self, subscriber: &Subscriber) -> Result<()>;
}
