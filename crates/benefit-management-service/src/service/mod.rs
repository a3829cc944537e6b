//! 服务层
//!
//! 实现权益业务逻辑，协调仓储层与锁。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `redemption_service`: 兑换资格与生命周期
//! - `catalog_service`: 权益目录管理
//! - `subscriber_service`: 订阅者名册

pub mod catalog_service;
pub mod dto;
pub mod redemption_service;
pub mod subscriber_service;

pub use catalog_service::CatalogService;
pub use dto::*;
pub use redemption_service::RedemptionService;
pub use subscriber_service::SubscriberService;
