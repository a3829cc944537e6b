//! 中间件模块
//!
//! 会话解析与角色检查

mod session;

pub use session::{SESSION_HEADER, Session, require_admin, session_middleware};
