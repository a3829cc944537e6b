//! 演示数据
//!
//! 一个权益、两条兑换记录（已完成与待处理）、五名订阅者，
//! 以及用于会话登录的普通订阅者和主播管理员账号。时间相对 `now` 计算。

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::{Benefit, Redemption, RedemptionStatus, Subscriber};
use crate::repository::Repositories;

pub const TEAM_ANALYSIS_ID: &str = "benefit-team-analysis";
pub const ADMIN_ID: &str = "admin123";
pub const SESSION_SUBSCRIBER_ID: &str = "12345";

const AVATARS: [&str; 5] = [
    "https://static-cdn.jtvnw.net/jtv_user_pictures/ad9b44c9-afb5-4df7-b8ff-acc103ef42b6-profile_image-300x300.png",
    "https://static-cdn.jtvnw.net/jtv_user_pictures/8a6381c7-d0c1-4882-8c51-8fec7ee5fe0d-profile_image-300x300.png",
    "https://static-cdn.jtvnw.net/jtv_user_pictures/7d33c7c2-a0b6-4856-8f65-e47a553abdb3-profile_image-300x300.png",
    "https://static-cdn.jtvnw.net/jtv_user_pictures/3f00c94f-a1c7-4a0d-9fc4-9b0b74e4f341-profile_image-300x300.png",
    "https://static-cdn.jtvnw.net/jtv_user_pictures/05544e79-0969-4ae7-afaf-6290daf5673c-profile_image-300x300.png",
];

pub fn demo_benefits(now: DateTime<Utc>) -> Vec<Benefit> {
    vec![Benefit {
        id: TEAM_ANALYSIS_ID.to_string(),
        title: "Análise de Time".to_string(),
        description: "Solicite uma análise detalhada do seu time pelo streamer.".to_string(),
        category: "analysis".to_string(),
        cooldown_days: 31,
        enabled: true,
        created_at: now - Duration::days(30),
        updated_at: now - Duration::days(30),
    }]
}

pub fn demo_subscribers() -> Vec<Subscriber> {
    let mut subscribers: Vec<Subscriber> = AVATARS
        .iter()
        .enumerate()
        .map(|(i, avatar)| Subscriber {
            id: format!("user-{}", i + 1),
            username: format!("viewer{}", i + 1),
            avatar: avatar.to_string(),
            is_subscriber: true,
            is_admin: false,
        })
        .collect();

    subscribers.push(Subscriber {
        id: SESSION_SUBSCRIBER_ID.to_string(),
        username: "twitchUser".to_string(),
        avatar: AVATARS[0].to_string(),
        is_subscriber: true,
        is_admin: false,
    });
    subscribers.push(Subscriber {
        id: ADMIN_ID.to_string(),
        username: "streamer".to_string(),
        avatar: AVATARS[0].to_string(),
        is_subscriber: true,
        is_admin: true,
    });
    subscribers
}

pub fn demo_redemptions(now: DateTime<Utc>) -> Vec<Redemption> {
    vec![
        Redemption {
            id: "redemption-1".to_string(),
            user_id: "user-1".to_string(),
            username: "viewer1".to_string(),
            user_avatar: AVATARS[0].to_string(),
            benefit_id: TEAM_ANALYSIS_ID.to_string(),
            benefit_title: "Análise de Time".to_string(),
            category: "analysis".to_string(),
            timestamp: now - Duration::days(12),
            status: RedemptionStatus::Completed,
            completed_at: Some(now - Duration::days(11)),
        },
        Redemption {
            id: "redemption-2".to_string(),
            user_id: "user-2".to_string(),
            username: "viewer2".to_string(),
            user_avatar: AVATARS[0].to_string(),
            benefit_id: TEAM_ANALYSIS_ID.to_string(),
            benefit_title: "Análise de Time".to_string(),
            category: "analysis".to_string(),
            timestamp: now - Duration::days(2),
            status: RedemptionStatus::Pending,
            completed_at: None,
        },
    ]
}

/// 写入演示数据，已存在的权益不会被覆盖
pub async fn load_demo_data(repos: &Repositories, now: DateTime<Utc>) -> Result<()> {
    for benefit in demo_benefits(now) {
        repos.benefits.insert_benefit(&benefit).await?;
    }
    for subscriber in demo_subscribers() {
        repos.subscribers.upsert_subscriber(&subscriber).await?;
    }
    for redemption in demo_redemptions(now) {
        if repos.redemptions.get_redemption(&redemption.id).await?.is_none() {
            repos.redemptions.insert_redemption(&redemption).await?;
        }
    }

    info!("Demo data loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_roster() {
        let subscribers = demo_subscribers();
        assert_eq!(subscribers.len(), 7);
        assert_eq!(subscribers.iter().filter(|s| s.is_admin).count(), 1);
        assert_eq!(subscribers[4].username, "viewer5");
    }

    #[tokio::test]
    async fn test_load_demo_data_is_idempotent() {
        let repos = Repositories::in_memory();
        let now = Utc::now();
        load_demo_data(&repos, now).await.unwrap();
        load_demo_data(&repos, now).await.unwrap();

        assert_eq!(repos.benefits.list_benefits().await.unwrap().len(), 1);
        assert_eq!(repos.redemptions.list_redemptions().await.unwrap().len(), 2);
        assert_eq!(repos.subscribers.list_subscribers().await.unwrap().len(), 7);
    }
}
