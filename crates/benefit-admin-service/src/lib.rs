//! 权益管理后台服务
//!
//! 订阅者兑换与管理员审核的 REST API。
//!
//! ## 核心功能
//!
//! - **订阅者**：查看可兑换权益与冷却状态、提交兑换、查看个人历史
//! - **兑换审核**：按条件筛选兑换，通过、拒绝、撤销或恢复
//! - **权益目录**：权益的增删改查
//! - **订阅者名册**：搜索、排序与兑换明细
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 会话与角色检查
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, CreateBenefitRequest, UpdateBenefitRequest, UpdateStatusRequest};
pub use error::{AdminError, Result};
pub use state::AppState;
