//! 内存仓储
//!
//! 基于 `tokio::sync::RwLock` 的进程内实现，用于本地开发、演示数据与测试。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::traits::{BenefitRepositoryTrait, RedemptionRepositoryTrait, SubscriberRepositoryTrait};
use crate::eligibility;
use crate::error::Result;
use crate::models::{Benefit, Redemption, RedemptionStatus, Subscriber};

// ==================== 权益 ====================

/// 内存权益仓储
#[derive(Default)]
pub struct InMemoryBenefitRepository {
    benefits: RwLock<HashMap<String, Benefit>>,
}

impl InMemoryBenefitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BenefitRepositoryTrait for InMemoryBenefitRepository {
    async fn list_benefits(&self) -> Result<Vec<Benefit>> {
        let benefits = self.benefits.read().await;
        let mut list: Vec<Benefit> = benefits.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn get_benefit(&self, id: &str) -> Result<Option<Benefit>> {
        Ok(self.benefits.read().await.get(id).cloned())
    }

    async fn insert_benefit(&self, benefit: &Benefit) -> Result<bool> {
        let mut benefits = self.benefits.write().await;
        if benefits.contains_key(&benefit.id) {
            return Ok(false);
        }
        benefits.insert(benefit.id.clone(), benefit.clone());
        Ok(true)
    }

    async fn update_benefit(&self, benefit: &Benefit) -> Result<bool> {
        let mut benefits = self.benefits.write().await;
        match benefits.get_mut(&benefit.id) {
            Some(existing) => {
                *existing = benefit.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_benefit(&self, id: &str) -> Result<bool> {
        Ok(self.benefits.write().await.remove(id).is_some())
    }
}

// ==================== 兑换 ====================

#[derive(Default)]
struct RedemptionStore {
    by_id: HashMap<String, Redemption>,
    /// 插入顺序，用于同一时间戳下的稳定排序
    order: Vec<String>,
    /// (user_id, benefit_id) -> 兑换 ID 列表
    by_key: HashMap<(String, String), Vec<String>>,
}

impl RedemptionStore {
    /// 按创建时间倒序输出，时间相同时后插入的在前
    fn newest_first<'a>(
        &'a self,
        ids: impl DoubleEndedIterator<Item = &'a String>,
    ) -> Vec<Redemption> {
        let mut list: Vec<Redemption> = ids
            .rev()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        list
    }
}

/// 内存兑换仓储
///
/// 维护 (user, benefit) 索引，资格判定只扫描该键下的记录
#[derive(Default)]
pub struct InMemoryRedemptionRepository {
    store: RwLock<RedemptionStore>,
}

impl InMemoryRedemptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RedemptionRepositoryTrait for InMemoryRedemptionRepository {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<()> {
        let mut store = self.store.write().await;
        let id = redemption.id.clone();
        if store.by_id.insert(id.clone(), redemption.clone()).is_none() {
            store.order.push(id.clone());
            store
                .by_key
                .entry((redemption.user_id.clone(), redemption.benefit_id.clone()))
                .or_default()
                .push(id);
        }
        Ok(())
    }

    async fn get_redemption(&self, id: &str) -> Result<Option<Redemption>> {
        Ok(self.store.read().await.by_id.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: RedemptionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Redemption>> {
        let mut store = self.store.write().await;
        Ok(store.by_id.get_mut(id).map(|r| {
            r.status = status;
            r.completed_at = completed_at;
            r.clone()
        }))
    }

    async fn list_redemptions(&self) -> Result<Vec<Redemption>> {
        let store = self.store.read().await;
        Ok(store.newest_first(store.order.iter()))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Redemption>> {
        let store = self.store.read().await;
        let ids = store
            .order
            .iter()
            .filter(|id| store.by_id.get(*id).is_some_and(|r| r.user_id == user_id));
        Ok(store.newest_first(ids))
    }

    async fn latest_active_redemption(
        &self,
        user_id: &str,
        benefit_id: &str,
    ) -> Result<Option<Redemption>> {
        let store = self.store.read().await;
        let Some(ids) = store
            .by_key
            .get(&(user_id.to_string(), benefit_id.to_string()))
        else {
            return Ok(None);
        };
        let entries = ids.iter().filter_map(|id| store.by_id.get(id));
        Ok(eligibility::latest_active(entries).cloned())
    }
}

// ==================== 订阅者 ====================

/// 内存订阅者仓储
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<HashMap<String, Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRepositoryTrait for InMemorySubscriberRepository {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        let mut list: Vec<Subscriber> = subscribers.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>> {
        Ok(self.subscribers.read().await.get(id).cloned())
    }

    async fn upsert_subscriber(&self, subscriber: &Subscriber) -> Result<()> {
        self.subscribers
            .write()
            .await
            .insert(subscriber.id.clone(), subscriber.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn benefit(id: &str, created_at: DateTime<Utc>) -> Benefit {
        Benefit {
            id: id.to_string(),
            title: "Análise de Time".to_string(),
            description: "Solicite uma análise".to_string(),
            category: "analysis".to_string(),
            cooldown_days: 31,
            enabled: true,
            created_at,
            updated_at: created_at,
        }
    }

    fn redemption(user_id: &str, benefit_id: &str, at: DateTime<Utc>) -> Redemption {
        Redemption::new_pending(user_id, user_id, "", &benefit(benefit_id, t0()), at)
    }

    #[tokio::test]
    async fn test_benefit_crud() {
        let repo = InMemoryBenefitRepository::new();
        let b = benefit("b-1", t0());

        assert!(repo.insert_benefit(&b).await.unwrap());
        assert!(!repo.insert_benefit(&b).await.unwrap());

        let mut updated = b.clone();
        updated.title = "Renamed".to_string();
        assert!(repo.update_benefit(&updated).await.unwrap());
        assert_eq!(repo.get_benefit("b-1").await.unwrap().unwrap().title, "Renamed");

        assert!(repo.delete_benefit("b-1").await.unwrap());
        assert!(!repo.delete_benefit("b-1").await.unwrap());
        assert!(!repo.update_benefit(&updated).await.unwrap());
        assert!(repo.get_benefit("b-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_benefits_in_creation_order() {
        let repo = InMemoryBenefitRepository::new();
        repo.insert_benefit(&benefit("late", t0() + Duration::days(1))).await.unwrap();
        repo.insert_benefit(&benefit("early", t0())).await.unwrap();

        let ids: Vec<String> = repo
            .list_benefits()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_redemptions_newest_first() {
        let repo = InMemoryRedemptionRepository::new();
        let old = redemption("user-1", "b", t0());
        let new = redemption("user-2", "b", t0() + Duration::days(2));
        let mid = redemption("user-1", "c", t0() + Duration::days(1));
        for r in [&old, &new, &mid] {
            repo.insert_redemption(r).await.unwrap();
        }

        let all: Vec<String> = repo
            .list_redemptions()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(all, vec![new.id.clone(), mid.id.clone(), old.id.clone()]);

        let user1: Vec<String> = repo
            .list_by_user("user-1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(user1, vec![mid.id, old.id]);
    }

    #[tokio::test]
    async fn test_latest_active_uses_key_index() {
        let repo = InMemoryRedemptionRepository::new();
        let first = redemption("user-1", "b", t0());
        let second = redemption("user-1", "b", t0() + Duration::days(40));
        let other_user = redemption("user-2", "b", t0() + Duration::days(50));
        for r in [&first, &second, &other_user] {
            repo.insert_redemption(r).await.unwrap();
        }

        let latest = repo.latest_active_redemption("user-1", "b").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        repo.update_status(&second.id, RedemptionStatus::Cancelled, None)
            .await
            .unwrap();
        let latest = repo.latest_active_redemption("user-1", "b").await.unwrap().unwrap();
        assert_eq!(latest.id, first.id);

        assert!(repo.latest_active_redemption("user-3", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_missing_returns_none() {
        let repo = InMemoryRedemptionRepository::new();
        let result = repo
            .update_status("missing", RedemptionStatus::Completed, Some(t0()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_subscriber_upsert() {
        let repo = InMemorySubscriberRepository::new();
        let mut s = Subscriber {
            id: "user-1".to_string(),
            username: "viewer1".to_string(),
            avatar: String::new(),
            is_subscriber: true,
            is_admin: false,
        };
        repo.upsert_subscriber(&s).await.unwrap();
        s.username = "viewer-one".to_string();
        repo.upsert_subscriber(&s).await.unwrap();

        let all = repo.list_subscribers().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].username, "viewer-one");
    }
}
