//! 仓储层
//!
//! 提供所有实体的数据访问接口，封装存储细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 服务层只依赖 trait，内存实现与 PostgreSQL 实现可互换
//! - 互斥控制由调用方（服务层）通过 `LockManager` 决定

mod memory;
mod postgres;
mod traits;

pub use memory::{
    InMemoryBenefitRepository, InMemoryRedemptionRepository, InMemorySubscriberRepository,
};
pub use postgres::{PgBenefitRepository, PgRedemptionRepository, PgSubscriberRepository};
pub use traits::*;

use std::sync::Arc;

use sqlx::PgPool;

/// 仓储集合
///
/// 以 trait 对象持有三类仓储，由配置的存储后端决定具体实现
#[derive(Clone)]
pub struct Repositories {
    pub benefits: Arc<dyn BenefitRepositoryTrait>,
    pub redemptions: Arc<dyn RedemptionRepositoryTrait>,
    pub subscribers: Arc<dyn SubscriberRepositoryTrait>,
}

impl Repositories {
    /// 进程内存储
    pub fn in_memory() -> Self {
        Self {
            benefits: Arc::new(InMemoryBenefitRepository::new()),
            redemptions: Arc::new(InMemoryRedemptionRepository::new()),
            subscribers: Arc::new(InMemorySubscriberRepository::new()),
        }
    }

    /// PostgreSQL 存储
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            benefits: Arc::new(PgBenefitRepository::new(pool.clone())),
            redemptions: Arc::new(PgRedemptionRepository::new(pool.clone())),
            subscribers: Arc::new(PgSubscriberRepository::new(pool)),
        }
    }
}
