//! 订阅者权益管理服务
//!
//! 订阅者在冷却期约束下兑换权益，管理员审核兑换并维护权益目录。
//!
//! ## 核心功能
//!
//! - **资格判定**：根据最近一次有效兑换与冷却期计算是否可兑换
//! - **兑换生命周期**：`pending`、`completed`、`cancelled` 三态流转
//! - **权益目录**：权益的增删改查与表单校验
//! - **订阅者名册**：订阅者搜索、排序与兑换明细
//! - **通知**：新兑换产生时的 TTS 提示与聊天消息
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `eligibility`: 冷却期资格判定（纯函数）
//! - `repository`: 仓储层（内存与 PostgreSQL）
//! - `service`: 业务服务层
//! - `lock`: 进程内键控锁
//! - `notification`: 兑换通知
//! - `seed`: 演示数据

pub mod eligibility;
pub mod error;
pub mod lock;
pub mod models;
pub mod notification;
pub mod repository;
pub mod seed;
pub mod service;

pub use eligibility::Eligibility;
pub use error::{BenefitError, Result};
pub use lock::{LockConfig, LockGuard, LockManager};
pub use models::*;
pub use notification::{LogNotifier, RedemptionNotifier};
pub use repository::Repositories;
pub use service::{CatalogService, RedemptionService, SubscriberService, dto};

/// 数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
