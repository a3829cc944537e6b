//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use benefit_management::lock::{LockConfig, LockManager};
use benefit_management::notification::LogNotifier;
use benefit_management::repository::{
    BenefitRepositoryTrait, RedemptionRepositoryTrait, Repositories, SubscriberRepositoryTrait,
};
use benefit_management::service::{CatalogService, RedemptionService, SubscriberService};
use benefit_shared::config::BenefitsConfig;
use benefit_shared::database::Database;

pub type AppRedemptionService =
    RedemptionService<dyn BenefitRepositoryTrait, dyn RedemptionRepositoryTrait>;
pub type AppCatalogService = CatalogService<dyn BenefitRepositoryTrait>;
pub type AppSubscriberService =
    SubscriberService<dyn SubscriberRepositoryTrait, dyn RedemptionRepositoryTrait>;

/// Axum 应用共享状态
///
/// 服务以 Arc 在 handler 间共享；使用 PostgreSQL 存储时额外持有数据库句柄用于就绪探针
#[derive(Clone)]
pub struct AppState {
    pub redemptions: Arc<AppRedemptionService>,
    pub catalog: Arc<AppCatalogService>,
    pub subscribers: Arc<AppSubscriberService>,
    pub database: Option<Database>,
}

impl AppState {
    /// 基于仓储集合与业务配置组装服务
    pub fn new(repos: &Repositories, config: &BenefitsConfig) -> Self {
        let locks = Arc::new(LockManager::new(LockConfig::with_timeout_ms(
            config.lock_timeout_ms,
        )));

        let redemptions = RedemptionService::new(
            repos.benefits.clone(),
            repos.redemptions.clone(),
            locks,
            Arc::new(LogNotifier::new()),
        )
        .with_notifications(config.notify_new_redemptions);

        Self {
            redemptions: Arc::new(redemptions),
            catalog: Arc::new(CatalogService::new(
                repos.benefits.clone(),
                config.default_cooldown_days,
            )),
            subscribers: Arc::new(SubscriberService::new(
                repos.subscribers.clone(),
                repos.redemptions.clone(),
            )),
            database: None,
        }
    }

    pub fn with_database(mut self, database: Option<Database>) -> Self {
        self.database = database;
        self
    }
}
