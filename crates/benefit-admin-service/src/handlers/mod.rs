//! HTTP 请求处理器模块

pub mod benefit;
pub mod catalog;
pub mod health;
pub mod redemption;
pub mod subscriber;
