//! 会话中间件
//!
//! 从 `X-User-Id` 请求头解析当前用户，并在订阅者名册中查找。
//! 这是模拟的会话提供方，不构成安全边界。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use benefit_management::{BenefitError, Subscriber};

use crate::error::AdminError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-user-id";

/// 当前会话用户，由 `session_middleware` 注入请求扩展
#[derive(Debug, Clone)]
pub struct Session(pub Subscriber);

impl Session {
    pub fn user(&self) -> &Subscriber {
        &self.0
    }
}

/// 会话中间件
///
/// 缺少请求头或用户不在名册中返回 401
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let user_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AdminError::Unauthorized("缺少 X-User-Id 请求头".to_string()))?
        .to_string();

    let subscriber = match state.subscribers.get_subscriber(&user_id).await {
        Ok(subscriber) => subscriber,
        Err(BenefitError::SubscriberNotFound(_)) => {
            return Err(AdminError::Unauthorized(format!("未知用户: {user_id}")));
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(Session(subscriber));
    Ok(next.run(request).await)
}

/// 管理员检查，需位于 `session_middleware` 之后
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AdminError> {
    match request.extensions().get::<Session>() {
        Some(session) if session.user().is_admin => Ok(next.run(request).await),
        Some(session) => Err(AdminError::Forbidden(format!(
            "用户 {} 不是管理员",
            session.user().username
        ))),
        None => Err(AdminError::Unauthorized("未登录".to_string())),
    }
}
