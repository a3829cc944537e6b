//! 请求 DTO 定义
//!
//! 字段长度限制与权益目录服务的校验一致，这里提前拦截明显无效的请求

use benefit_management::RedemptionStatus;
use benefit_management::service::dto::{BenefitUpdate, NewBenefit};
use serde::Deserialize;
use validator::Validate;

/// 创建权益请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBenefitRequest {
    #[validate(length(min = 1, max = 64, message = "权益 ID 长度必须在1-64个字符之间"))]
    pub id: Option<String>,
    #[validate(length(min = 3, max = 100, message = "标题至少需要3个字符"))]
    pub title: String,
    #[validate(length(min = 5, max = 1000, message = "描述至少需要5个字符"))]
    pub description: String,
    #[validate(length(min = 2, max = 50, message = "分类至少需要2个字符"))]
    pub category: String,
    #[validate(range(min = 1, message = "冷却天数至少为1"))]
    pub cooldown_days: Option<u32>,
    pub enabled: Option<bool>,
}

impl From<CreateBenefitRequest> for NewBenefit {
    fn from(req: CreateBenefitRequest) -> Self {
        Self {
            id: req.id,
            title: req.title,
            description: req.description,
            category: req.category,
            cooldown_days: req.cooldown_days,
            enabled: req.enabled,
        }
    }
}

/// 更新权益请求（仅更新提供的字段）
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBenefitRequest {
    #[validate(length(min = 3, max = 100, message = "标题至少需要3个字符"))]
    pub title: Option<String>,
    #[validate(length(min = 5, max = 1000, message = "描述至少需要5个字符"))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 50, message = "分类至少需要2个字符"))]
    pub category: Option<String>,
    #[validate(range(min = 1, message = "冷却天数至少为1"))]
    pub cooldown_days: Option<u32>,
    pub enabled: Option<bool>,
}

impl From<UpdateBenefitRequest> for BenefitUpdate {
    fn from(req: UpdateBenefitRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            cooldown_days: req.cooldown_days,
            enabled: req.enabled,
        }
    }
}

/// 更新兑换状态请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: RedemptionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateBenefitRequest {
        CreateBenefitRequest {
            id: None,
            title: "Review de VOD".to_string(),
            description: "Revisão de uma partida gravada.".to_string(),
            category: "review".to_string(),
            cooldown_days: Some(14),
            enabled: None,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(valid_create().validate().is_ok());

        let short_title = CreateBenefitRequest {
            title: "ab".to_string(),
            ..valid_create()
        };
        assert!(short_title.validate().is_err());

        let zero_cooldown = CreateBenefitRequest {
            cooldown_days: Some(0),
            ..valid_create()
        };
        assert!(zero_cooldown.validate().is_err());
    }

    #[test]
    fn test_update_request_allows_partial() {
        assert!(UpdateBenefitRequest::default().validate().is_ok());

        let short_category = UpdateBenefitRequest {
            category: Some("a".to_string()),
            ..Default::default()
        };
        assert!(short_category.validate().is_err());
    }

    #[test]
    fn test_status_request_lowercase() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(req.status, RedemptionStatus::Completed);
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"approved"}"#).is_err());
    }
}
