//! 兑换通知模块
//!
//! 新兑换创建后向主播侧发出提示：语音播报与聊天消息。
//! 目前只有日志实现，真实平台接入通过实现 `RedemptionNotifier` 完成。
//!
//! ## 使用示例
//!
//! ```ignore
//! let notifier: Arc<dyn RedemptionNotifier> = Arc::new(LogNotifier::new());
//! notifier.notify_new_redemption(&redemption).await?;
//! ```

mod notifier;

#[cfg(test)]
pub use notifier::MockRedemptionNotifier;
pub use notifier::{LogNotifier, RedemptionNotifier};
