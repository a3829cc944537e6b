//! PostgreSQL 仓储
//!
//! 使用运行时 `sqlx::query_as` 访问 benefits / redemptions / subscribers 三张表，
//! 表结构见 `migrations/`。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::{BenefitRepositoryTrait, RedemptionRepositoryTrait, SubscriberRepositoryTrait};
use crate::error::Result;
use crate::models::{Benefit, Redemption, RedemptionStatus, Subscriber};

const BENEFIT_COLUMNS: &str =
    "id, title, description, category, cooldown_days, enabled, created_at, updated_at";

const REDEMPTION_COLUMNS: &str = "id, user_id, username, user_avatar, benefit_id, benefit_title, \
     category, status, created_at, completed_at";

// ==================== 权益 ====================

/// 权益仓储
pub struct PgBenefitRepository {
    pool: PgPool,
}

impl PgBenefitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BenefitRepositoryTrait for PgBenefitRepository {
    async fn list_benefits(&self) -> Result<Vec<Benefit>> {
        let benefits = sqlx::query_as::<_, Benefit>(&format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(benefits)
    }

    async fn get_benefit(&self, id: &str) -> Result<Option<Benefit>> {
        let benefit = sqlx::query_as::<_, Benefit>(&format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(benefit)
    }

    async fn insert_benefit(&self, benefit: &Benefit) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO benefits (id, title, description, category, cooldown_days, enabled,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&benefit.id)
        .bind(&benefit.title)
        .bind(&benefit.description)
        .bind(&benefit.category)
        .bind(i64::from(benefit.cooldown_days))
        .bind(benefit.enabled)
        .bind(benefit.created_at)
        .bind(benefit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_benefit(&self, benefit: &Benefit) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE benefits
            SET title = $2, description = $3, category = $4, cooldown_days = $5,
                enabled = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(&benefit.id)
        .bind(&benefit.title)
        .bind(&benefit.description)
        .bind(&benefit.category)
        .bind(i64::from(benefit.cooldown_days))
        .bind(benefit.enabled)
        .bind(benefit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_benefit(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM benefits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ==================== 兑换 ====================

/// 兑换仓储
pub struct PgRedemptionRepository {
    pool: PgPool,
}

impl PgRedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedemptionRepositoryTrait for PgRedemptionRepository {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO redemptions (id, user_id, username, user_avatar, benefit_id,
                                     benefit_title, category, status, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&redemption.id)
        .bind(&redemption.user_id)
        .bind(&redemption.username)
        .bind(&redemption.user_avatar)
        .bind(&redemption.benefit_id)
        .bind(&redemption.benefit_title)
        .bind(&redemption.category)
        .bind(redemption.status)
        .bind(redemption.timestamp)
        .bind(redemption.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_redemption(&self, id: &str) -> Result<Option<Redemption>> {
        let redemption = sqlx::query_as::<_, Redemption>(&format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(redemption)
    }

    async fn update_status(
        &self,
        id: &str,
        status: RedemptionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Redemption>> {
        let redemption = sqlx::query_as::<_, Redemption>(&format!(
            "UPDATE redemptions SET status = $2, completed_at = $3 WHERE id = $1 \
             RETURNING {REDEMPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(redemption)
    }

    async fn list_redemptions(&self) -> Result<Vec<Redemption>> {
        let redemptions = sqlx::query_as::<_, Redemption>(&format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(redemptions)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Redemption>> {
        let redemptions = sqlx::query_as::<_, Redemption>(&format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(redemptions)
    }

    async fn latest_active_redemption(
        &self,
        user_id: &str,
        benefit_id: &str,
    ) -> Result<Option<Redemption>> {
        // 命中 idx_redemptions_user_benefit_created
        let redemption = sqlx::query_as::<_, Redemption>(&format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions \
             WHERE user_id = $1 AND benefit_id = $2 AND status <> 'cancelled' \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(benefit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(redemption)
    }
}

// ==================== 订阅者 ====================

/// 订阅者仓储
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepositoryTrait for PgSubscriberRepository {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            "SELECT id, username, avatar, is_subscriber, is_admin FROM subscribers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "SELECT id, username, avatar, is_subscriber, is_admin FROM subscribers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber)
    }

    async fn upsert_subscriber(&self, subscriber: &Subscriber) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscribers (id, username, avatar, is_subscriber, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                avatar = EXCLUDED.avatar,
                is_subscriber = EXCLUDED.is_subscriber,
                is_admin = EXCLUDED.is_admin
            "#,
        )
        .bind(&subscriber.id)
        .bind(&subscriber.username)
        .bind(&subscriber.avatar)
        .bind(subscriber.is_subscriber)
        .bind(subscriber.is_admin)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
