//! 兑换通知器

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::models::Redemption;

/// 新兑换通知接口
///
/// 在兑换创建成功后调用。实现应尽快返回，失败只记录日志，不影响兑换结果。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionNotifier: Send + Sync {
    async fn notify_new_redemption(&self, redemption: &Redemption) -> Result<()>;
}

/// 日志通知器
///
/// 将直播间的语音播报（TTS）与聊天消息以结构化日志输出，不接入真实平台。
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }

    /// 语音播报文本
    pub fn tts_text(redemption: &Redemption) -> String {
        format!(
            "{} redeemed {}",
            redemption.username, redemption.benefit_title
        )
    }

    /// 聊天消息文本
    pub fn chat_text(redemption: &Redemption) -> String {
        format!(
            "@{} your request for \"{}\" was received and is pending review",
            redemption.username, redemption.benefit_title
        )
    }
}

#[async_trait]
impl RedemptionNotifier for LogNotifier {
    async fn notify_new_redemption(&self, redemption: &Redemption) -> Result<()> {
        info!(
            channel = "tts",
            redemption_id = %redemption.id,
            user_id = %redemption.user_id,
            text = %Self::tts_text(redemption),
            "语音播报"
        );
        info!(
            channel = "chat",
            redemption_id = %redemption.id,
            user_id = %redemption.user_id,
            text = %Self::chat_text(redemption),
            "聊天消息"
        );
        Ok(())
    }
}
