//! 订阅者

use serde::{Deserialize, Serialize};

/// 订阅者（名册条目，同时作为会话身份）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub is_subscriber: bool,
    pub is_admin: bool,
}
