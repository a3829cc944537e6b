//! 权益目录服务
//!
//! 权益的增删改查与表单校验。删除权益不影响已有兑换记录（快照字段保留）。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{BenefitError, Result};
use crate::models::Benefit;
use crate::repository::BenefitRepositoryTrait;
use crate::service::dto::{BenefitUpdate, NewBenefit};

/// 字段最小长度
mod limits {
    pub const TITLE_MIN: usize = 3;
    pub const DESCRIPTION_MIN: usize = 5;
    pub const CATEGORY_MIN: usize = 2;
    pub const COOLDOWN_MIN: u32 = 1;
}

/// 校验权益字段
///
/// 长度按字符计算，首尾空白不计入
pub fn validate_benefit_fields(
    title: &str,
    description: &str,
    category: &str,
    cooldown_days: u32,
) -> Result<()> {
    let checks = [
        ("title", title, limits::TITLE_MIN),
        ("description", description, limits::DESCRIPTION_MIN),
        ("category", category, limits::CATEGORY_MIN),
    ];
    for (field, value, min) in checks {
        if value.trim().chars().count() < min {
            return Err(BenefitError::Validation(format!(
                "{field} 至少需要 {min} 个字符"
            )));
        }
    }
    if cooldown_days < limits::COOLDOWN_MIN {
        return Err(BenefitError::Validation(format!(
            "cooldown_days 至少为 {}",
            limits::COOLDOWN_MIN
        )));
    }
    Ok(())
}

/// 权益目录服务
pub struct CatalogService<BR>
where
    BR: BenefitRepositoryTrait + ?Sized,
{
    benefit_repo: Arc<BR>,
    default_cooldown_days: u32,
}

impl<BR> CatalogService<BR>
where
    BR: BenefitRepositoryTrait + ?Sized,
{
    pub fn new(benefit_repo: Arc<BR>, default_cooldown_days: u32) -> Self {
        Self {
            benefit_repo,
            default_cooldown_days,
        }
    }

    /// 全部权益（含停用）
    #[instrument(skip(self))]
    pub async fn list_benefits(&self) -> Result<Vec<Benefit>> {
        self.benefit_repo.list_benefits().await
    }

    /// 启用中的权益
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<Benefit>> {
        let benefits = self.benefit_repo.list_benefits().await?;
        Ok(benefits.into_iter().filter(|b| b.is_redeemable()).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_benefit(&self, id: &str) -> Result<Benefit> {
        self.benefit_repo
            .get_benefit(id)
            .await?
            .ok_or_else(|| BenefitError::BenefitNotFound(id.to_string()))
    }

    pub async fn create_benefit(&self, new: NewBenefit) -> Result<Benefit> {
        self.create_benefit_at(new, Utc::now()).await
    }

    /// 新建权益
    ///
    /// 未提供 ID 时自动生成；ID 已存在返回 `Validation`
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create_benefit_at(&self, new: NewBenefit, now: DateTime<Utc>) -> Result<Benefit> {
        let cooldown_days = new.cooldown_days.unwrap_or(self.default_cooldown_days);
        validate_benefit_fields(&new.title, &new.description, &new.category, cooldown_days)?;

        let id = match new.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Benefit::generate_id(),
        };

        let benefit = Benefit {
            id,
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            category: new.category.trim().to_string(),
            cooldown_days,
            enabled: new.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        if !self.benefit_repo.insert_benefit(&benefit).await? {
            return Err(BenefitError::Validation(format!(
                "权益 ID 已存在: {}",
                benefit.id
            )));
        }

        info!(benefit_id = %benefit.id, cooldown_days = benefit.cooldown_days, "权益已创建");
        Ok(benefit)
    }

    pub async fn update_benefit(&self, id: &str, update: BenefitUpdate) -> Result<Benefit> {
        self.update_benefit_at(id, update, Utc::now()).await
    }

    /// 更新权益，仅覆盖提供的字段
    ///
    /// 已有兑换记录中的标题与分类快照不受影响
    #[instrument(skip(self, update))]
    pub async fn update_benefit_at(
        &self,
        id: &str,
        update: BenefitUpdate,
        now: DateTime<Utc>,
    ) -> Result<Benefit> {
        let mut benefit = self.get_benefit(id).await?;

        if let Some(title) = update.title {
            benefit.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            benefit.description = description.trim().to_string();
        }
        if let Some(category) = update.category {
            benefit.category = category.trim().to_string();
        }
        if let Some(cooldown_days) = update.cooldown_days {
            benefit.cooldown_days = cooldown_days;
        }
        if let Some(enabled) = update.enabled {
            benefit.enabled = enabled;
        }
        validate_benefit_fields(
            &benefit.title,
            &benefit.description,
            &benefit.category,
            benefit.cooldown_days,
        )?;
        benefit.updated_at = now;

        if !self.benefit_repo.update_benefit(&benefit).await? {
            return Err(BenefitError::BenefitNotFound(id.to_string()));
        }

        info!(benefit_id = %benefit.id, enabled = benefit.enabled, "权益已更新");
        Ok(benefit)
    }

    /// 删除权益
    #[instrument(skip(self))]
    pub async fn delete_benefit(&self, id: &str) -> Result<()> {
        if !self.benefit_repo.delete_benefit(id).await? {
            return Err(BenefitError::BenefitNotFound(id.to_string()));
        }
        info!(benefit_id = %id, "权益已删除");
        Ok(())
    }
}
