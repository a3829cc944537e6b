//! 权益兑换服务
//!
//! 兑换资格判定与兑换生命周期的核心业务逻辑：
//! - 资格判定（冷却期，未知或停用权益一律不可兑换）
//! - 新建兑换（按 (user, benefit) 加锁，检查与写入不可被并发打断）
//! - 状态迁移（按兑换 ID 加锁的读-改-写）
//! - 派生历史、列表过滤与待处理汇总
//!
//! ## 兑换流程
//!
//! 1. 获取 `redeem:{user}:{benefit}` 锁 -> 2. 权益存在且启用 -> 3. 冷却检查
//!    -> 4. 写入 Pending 记录 -> 5. 释放锁 -> 6. 通知与指标
//!
//! 每个操作都有显式传入 `now` 的 `*_at` 版本，便于测试控制时钟。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use benefit_shared::observability::metrics;

use crate::eligibility::{self, Eligibility};
use crate::error::{BenefitError, Result};
use crate::lock::LockManager;
use crate::models::{
    Redemption, RedemptionStatus, UserRedemptionHistory, redeem_lock_key, redemption_lock_key,
};
use crate::notification::RedemptionNotifier;
use crate::repository::{BenefitRepositoryTrait, RedemptionRepositoryTrait};
use crate::service::dto::{
    BenefitAvailability, CreateRedemptionRequest, PendingSummary, RedemptionFilter,
};

/// 权益兑换服务
///
/// 仓储以 trait 形式注入，既可传入具体类型（测试中的 mock），也可传入 `dyn` trait 对象
pub struct RedemptionService<BR, RR>
where
    BR: BenefitRepositoryTrait + ?Sized,
    RR: RedemptionRepositoryTrait + ?Sized,
{
    benefit_repo: Arc<BR>,
    redemption_repo: Arc<RR>,
    locks: Arc<LockManager>,
    notifier: Arc<dyn RedemptionNotifier>,
    notify_enabled: bool,
}

impl<BR, RR> RedemptionService<BR, RR>
where
    BR: BenefitRepositoryTrait + ?Sized,
    RR: RedemptionRepositoryTrait + ?Sized,
{
    pub fn new(
        benefit_repo: Arc<BR>,
        redemption_repo: Arc<RR>,
        locks: Arc<LockManager>,
        notifier: Arc<dyn RedemptionNotifier>,
    ) -> Self {
        Self {
            benefit_repo,
            redemption_repo,
            locks,
            notifier,
            notify_enabled: true,
        }
    }

    /// 是否在新兑换后发送通知
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notify_enabled = enabled;
        self
    }

    // ==================== 资格判定 ====================

    /// 判定用户当前能否兑换指定权益
    pub async fn compute_eligibility(&self, user_id: &str, benefit_id: &str) -> Result<bool> {
        self.compute_eligibility_at(user_id, benefit_id, Utc::now())
            .await
    }

    /// 判定用户在 `now` 时刻能否兑换指定权益
    ///
    /// 未知或已停用的权益返回 false，不视为错误
    #[instrument(skip(self))]
    pub async fn compute_eligibility_at(
        &self,
        user_id: &str,
        benefit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.eligibility_for_at(user_id, benefit_id, now).await {
            Ok(eligibility) => Ok(eligibility.eligible),
            Err(BenefitError::BenefitNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 资格详情（含最近兑换时间与可再次兑换时间）
    pub async fn eligibility_for(&self, user_id: &str, benefit_id: &str) -> Result<Eligibility> {
        self.eligibility_for_at(user_id, benefit_id, Utc::now())
            .await
    }

    #[instrument(skip(self))]
    pub async fn eligibility_for_at(
        &self,
        user_id: &str,
        benefit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Eligibility> {
        let benefit = self
            .benefit_repo
            .get_benefit(benefit_id)
            .await?
            .ok_or_else(|| BenefitError::BenefitNotFound(benefit_id.to_string()))?;

        if !benefit.is_redeemable() {
            return Ok(Eligibility::denied());
        }

        let last = self
            .redemption_repo
            .latest_active_redemption(user_id, benefit_id)
            .await?;

        Ok(eligibility::evaluate(
            Some(&benefit),
            last.map(|r| r.timestamp),
            now,
        ))
    }

    /// 启用中的权益及用户对每个权益的兑换资格
    pub async fn list_available_for(&self, user_id: &str) -> Result<Vec<BenefitAvailability>> {
        self.list_available_for_at(user_id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn list_available_for_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<BenefitAvailability>> {
        let benefits = self.benefit_repo.list_benefits().await?;

        let mut result = Vec::new();
        for benefit in benefits.into_iter().filter(|b| b.is_redeemable()) {
            let last = self
                .redemption_repo
                .latest_active_redemption(user_id, &benefit.id)
                .await?;
            let eligibility = eligibility::evaluate(Some(&benefit), last.map(|r| r.timestamp), now);
            result.push(BenefitAvailability {
                benefit,
                eligibility,
            });
        }

        Ok(result)
    }

    // ==================== 新建兑换 ====================

    /// 新建兑换
    pub async fn create_redemption(&self, request: CreateRedemptionRequest) -> Result<Redemption> {
        self.create_redemption_at(request, Utc::now()).await
    }

    /// 在 `now` 时刻新建兑换
    ///
    /// 检查与写入在同一把 (user, benefit) 锁内完成，并发请求中只有一个能通过冷却检查
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id, benefit_id = %request.benefit_id)
    )]
    pub async fn create_redemption_at(
        &self,
        request: CreateRedemptionRequest,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        let outcome = self.create_locked(&request, now).await;

        match outcome {
            Ok(redemption) => {
                metrics::record_redemption("created");
                info!(
                    redemption_id = %redemption.id,
                    user_id = %redemption.user_id,
                    benefit_id = %redemption.benefit_id,
                    "兑换创建成功"
                );
                self.notify(&redemption).await;
                Ok(redemption)
            }
            Err(e) => {
                metrics::record_redemption(e.error_code());
                info!(
                    user_id = %request.user_id,
                    benefit_id = %request.benefit_id,
                    error_code = e.error_code(),
                    "兑换被拒绝"
                );
                Err(e)
            }
        }
    }

    /// 持锁执行检查与写入，返回时锁已释放
    async fn create_locked(
        &self,
        request: &CreateRedemptionRequest,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        if request.user_id.trim().is_empty() {
            return Err(BenefitError::Validation("user_id 不能为空".to_string()));
        }

        let _guard = self
            .locks
            .acquire(&redeem_lock_key(&request.user_id, &request.benefit_id))
            .await?;

        let benefit = self
            .benefit_repo
            .get_benefit(&request.benefit_id)
            .await?
            .ok_or_else(|| BenefitError::BenefitNotFound(request.benefit_id.clone()))?;

        if !benefit.is_redeemable() {
            return Err(BenefitError::BenefitDisabled(benefit.id));
        }

        if let Some(last) = self
            .redemption_repo
            .latest_active_redemption(&request.user_id, &request.benefit_id)
            .await?
        {
            let cooldown_end = benefit.cooldown_end(last.timestamp);
            if now <= cooldown_end {
                return Err(BenefitError::CooldownActive {
                    benefit_id: benefit.id,
                    available_at: cooldown_end,
                });
            }
        }

        let redemption = Redemption::new_pending(
            &request.user_id,
            &request.username,
            &request.user_avatar,
            &benefit,
            now,
        );
        self.redemption_repo.insert_redemption(&redemption).await?;

        Ok(redemption)
    }

    async fn notify(&self, redemption: &Redemption) {
        if !self.notify_enabled {
            return;
        }
        if let Err(e) = self.notifier.notify_new_redemption(redemption).await {
            warn!(
                redemption_id = %redemption.id,
                error = %e,
                "兑换通知发送失败"
            );
        }
    }

    // ==================== 状态迁移 ====================

    /// 迁移兑换状态
    pub async fn transition_status(
        &self,
        redemption_id: &str,
        new_status: RedemptionStatus,
    ) -> Result<Redemption> {
        self.transition_status_at(redemption_id, new_status, Utc::now())
            .await
    }

    /// 在 `now` 时刻迁移兑换状态
    ///
    /// 进入 Completed 时刷新 `completed_at`；进入 Cancelled 时保留原值。
    /// 所属权益被删除的兑换仍可迁移。
    #[instrument(skip(self))]
    pub async fn transition_status_at(
        &self,
        redemption_id: &str,
        new_status: RedemptionStatus,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        let _id_guard = self
            .locks
            .acquire(&redemption_lock_key(redemption_id))
            .await?;

        let current = self
            .redemption_repo
            .get_redemption(redemption_id)
            .await?
            .ok_or_else(|| BenefitError::RedemptionNotFound(redemption_id.to_string()))?;

        if !current.status.can_transition_to(new_status) {
            warn!(
                redemption_id = %redemption_id,
                from = %current.status,
                to = %new_status,
                "不允许的状态迁移"
            );
            return Err(BenefitError::InvalidTransition {
                redemption_id: redemption_id.to_string(),
                from: current.status,
                to: new_status,
            });
        }

        // 与同一 (user, benefit) 的新建兑换互斥
        let _key_guard = self.locks.acquire(&current.lock_key()).await?;

        let completed_at = match new_status {
            RedemptionStatus::Completed => Some(now),
            _ => current.completed_at,
        };

        let updated = self
            .redemption_repo
            .update_status(redemption_id, new_status, completed_at)
            .await?
            .ok_or_else(|| BenefitError::RedemptionNotFound(redemption_id.to_string()))?;

        metrics::record_transition(new_status.as_str());
        info!(
            redemption_id = %redemption_id,
            from = %current.status,
            to = %new_status,
            "兑换状态已更新"
        );

        Ok(updated)
    }

    // ==================== 查询 ====================

    /// 用户派生历史：每个权益最近一次未取消兑换的时间，倒序
    #[instrument(skip(self))]
    pub async fn user_history(&self, user_id: &str) -> Result<Vec<UserRedemptionHistory>> {
        let redemptions = self.redemption_repo.list_by_user(user_id).await?;
        Ok(eligibility::derive_history(&redemptions))
    }

    /// 用户的全部兑换记录，倒序
    #[instrument(skip(self))]
    pub async fn list_user_redemptions(&self, user_id: &str) -> Result<Vec<Redemption>> {
        self.redemption_repo.list_by_user(user_id).await
    }

    /// 按条件过滤的兑换列表，倒序
    #[instrument(skip(self))]
    pub async fn list_redemptions(&self, filter: &RedemptionFilter) -> Result<Vec<Redemption>> {
        let redemptions = self.redemption_repo.list_redemptions().await?;
        Ok(redemptions
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// 待处理兑换汇总（总数与分类计数）
    #[instrument(skip(self))]
    pub async fn pending_summary(&self) -> Result<PendingSummary> {
        let redemptions = self.redemption_repo.list_redemptions().await?;

        let mut summary = PendingSummary::default();
        for r in redemptions
            .iter()
            .filter(|r| r.status == RedemptionStatus::Pending)
        {
            summary.total += 1;
            *summary.by_category.entry(r.category.clone()).or_default() += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::LockConfig;
    use crate::models::Benefit;
    use crate::notification::MockRedemptionNotifier;
    use crate::repository::{MockBenefitRepositoryTrait, MockRedemptionRepositoryTrait};
    use chrono::{Duration, TimeZone};

    type TestService = RedemptionService<MockBenefitRepositoryTrait, MockRedemptionRepositoryTrait>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn benefit(enabled: bool) -> Benefit {
        Benefit {
            id: "benefit-team-analysis".to_string(),
            title: "Análise de Time".to_string(),
            description: "Solicite uma análise detalhada do seu time pelo streamer.".to_string(),
            category: "analysis".to_string(),
            cooldown_days: 31,
            enabled,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn request() -> CreateRedemptionRequest {
        CreateRedemptionRequest {
            user_id: "user-1".to_string(),
            username: "viewer1".to_string(),
            user_avatar: String::new(),
            benefit_id: "benefit-team-analysis".to_string(),
        }
    }

    fn service(
        benefit_repo: MockBenefitRepositoryTrait,
        redemption_repo: MockRedemptionRepositoryTrait,
        notifier: MockRedemptionNotifier,
    ) -> TestService {
        RedemptionService::new(
            Arc::new(benefit_repo),
            Arc::new(redemption_repo),
            Arc::new(LockManager::new(LockConfig::with_timeout_ms(100))),
            Arc::new(notifier),
        )
    }

    fn silent_notifier() -> MockRedemptionNotifier {
        let mut notifier = MockRedemptionNotifier::new();
        notifier.expect_notify_new_redemption().never();
        notifier
    }

    #[tokio::test]
    async fn test_create_unknown_benefit_writes_nothing() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits.expect_get_benefit().times(1).returning(|_| Ok(None));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions.expect_insert_redemption().never();

        let err = service(benefits, redemptions, silent_notifier())
            .create_redemption_at(request(), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, BenefitError::BenefitNotFound(id) if id == "benefit-team-analysis"));
    }

    #[tokio::test]
    async fn test_create_disabled_benefit_writes_nothing() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits
            .expect_get_benefit()
            .returning(|_| Ok(Some(benefit(false))));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions.expect_latest_active_redemption().never();
        redemptions.expect_insert_redemption().never();

        let err = service(benefits, redemptions, silent_notifier())
            .create_redemption_at(request(), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, BenefitError::BenefitDisabled(_)));
    }

    #[tokio::test]
    async fn test_create_in_cooldown_reports_available_at() {
        let last = Redemption::new_pending("user-1", "viewer1", "", &benefit(true), t0());
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits
            .expect_get_benefit()
            .returning(|_| Ok(Some(benefit(true))));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions
            .expect_latest_active_redemption()
            .returning(move |_, _| Ok(Some(last.clone())));
        redemptions.expect_insert_redemption().never();

        let err = service(benefits, redemptions, silent_notifier())
            .create_redemption_at(request(), t0() + Duration::days(31))
            .await
            .unwrap_err();
        match err {
            BenefitError::CooldownActive { available_at, .. } => {
                assert_eq!(available_at, t0() + Duration::days(31));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_redemption() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits
            .expect_get_benefit()
            .returning(|_| Ok(Some(benefit(true))));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions
            .expect_latest_active_redemption()
            .returning(|_, _| Ok(None));
        redemptions
            .expect_insert_redemption()
            .times(1)
            .returning(|_| Ok(()));
        let mut notifier = MockRedemptionNotifier::new();
        notifier
            .expect_notify_new_redemption()
            .times(1)
            .returning(|_| Err(BenefitError::Internal("chat offline".to_string())));

        let redemption = service(benefits, redemptions, notifier)
            .create_redemption_at(request(), t0())
            .await
            .unwrap();
        assert_eq!(redemption.status, RedemptionStatus::Pending);
        assert_eq!(redemption.username, "viewer1");
    }

    #[tokio::test]
    async fn test_notifications_can_be_disabled() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits
            .expect_get_benefit()
            .returning(|_| Ok(Some(benefit(true))));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions
            .expect_latest_active_redemption()
            .returning(|_, _| Ok(None));
        redemptions.expect_insert_redemption().returning(|_| Ok(()));

        let result = service(benefits, redemptions, silent_notifier())
            .with_notifications(false)
            .create_redemption_at(request(), t0())
            .await;
        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_invalid_transition_writes_nothing() {
        let mut completed = Redemption::new_pending("user-1", "viewer1", "", &benefit(true), t0());
        completed.status = RedemptionStatus::Completed;
        let id = completed.id.clone();

        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions
            .expect_get_redemption()
            .returning(move |_| Ok(Some(completed.clone())));
        redemptions.expect_update_status().never();

        let svc = service(
            MockBenefitRepositoryTrait::new(),
            redemptions,
            silent_notifier(),
        );
        for target in [RedemptionStatus::Pending, RedemptionStatus::Completed] {
            let err = svc.transition_status_at(&id, target, t0()).await.unwrap_err();
            assert!(matches!(err, BenefitError::InvalidTransition { .. }));
        }
    }

    #[tokio::test]
    async fn test_transition_unknown_redemption() {
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions.expect_get_redemption().returning(|_| Ok(None));
        redemptions.expect_update_status().never();

        let err = service(
            MockBenefitRepositoryTrait::new(),
            redemptions,
            silent_notifier(),
        )
        .transition_status_at("redemption-missing", RedemptionStatus::Completed, t0())
        .await
        .unwrap_err();
        assert!(matches!(err, BenefitError::RedemptionNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_keeps_completed_at() {
        let completed_at = t0() + Duration::days(1);
        let mut completed = Redemption::new_pending("user-1", "viewer1", "", &benefit(true), t0());
        completed.status = RedemptionStatus::Completed;
        completed.completed_at = Some(completed_at);
        let stored = completed.clone();

        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions
            .expect_get_redemption()
            .returning(move |_| Ok(Some(stored.clone())));
        redemptions
            .expect_update_status()
            .times(1)
            .withf(move |_, status, at| {
                *status == RedemptionStatus::Cancelled && *at == Some(completed_at)
            })
            .returning(move |_, status, at| {
                let mut r = completed.clone();
                r.status = status;
                r.completed_at = at;
                Ok(Some(r))
            });

        let updated = service(
            MockBenefitRepositoryTrait::new(),
            redemptions,
            silent_notifier(),
        )
        .transition_status_at("redemption-1", RedemptionStatus::Cancelled, t0() + Duration::days(5))
        .await
        .unwrap();
        assert_eq!(updated.status, RedemptionStatus::Cancelled);
        assert_eq!(updated.completed_at, Some(completed_at));
    }

    #[tokio::test]
    async fn test_compute_eligibility_fails_closed_for_unknown_benefit() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits.expect_get_benefit().returning(|_| Ok(None));
        let mut redemptions = MockRedemptionRepositoryTrait::new();
        redemptions.expect_latest_active_redemption().never();

        let eligible = service(benefits, redemptions, silent_notifier())
            .compute_eligibility_at("user-1", "missing", t0())
            .await
            .unwrap();
        assert!(!eligible);
    }

    #[tokio::test]
    async fn test_compute_eligibility_propagates_storage_errors() {
        let mut benefits = MockBenefitRepositoryTrait::new();
        benefits
            .expect_get_benefit()
            .returning(|_| Err(BenefitError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(
            benefits,
            MockRedemptionRepositoryTrait::new(),
            silent_notifier(),
        )
        .compute_eligibility_at("user-1", "benefit-team-analysis", t0())
        .await
        .unwrap_err();
        assert!(err.is_retryable());
    }
}
