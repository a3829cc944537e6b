//! 领域模型
//!
//! - `benefit`: 权益定义
//! - `redemption`: 兑换记录与派生历史
//! - `subscriber`: 订阅者
//! - `enums`: 兑换状态

mod benefit;
mod enums;
mod redemption;
mod subscriber;

pub use benefit::Benefit;
pub use enums::RedemptionStatus;
pub use redemption::{Redemption, UserRedemptionHistory, redeem_lock_key, redemption_lock_key};
pub use subscriber::Subscriber;
