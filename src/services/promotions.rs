use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::promotion::{self, Entity as PromotionEntity, Model as PromotionModel},
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 50, message = "Promotion code is required"))]
    pub promotion_code: String,
    #[validate(length(min = 1, message = "Option name is required"))]
    pub option_name: String,
    pub option_value: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResponse {
    pub promotion_id: i32,
    pub promotion_code: String,
    pub option_name: String,
    pub option_value: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Derived, time-dependent property; never stored.
    pub active: bool,
}

/// Decides whether a promotion code is currently usable.
///
/// Pure over its inputs. An empty code means "no promotion" and returns
/// `None` without being an error; the caller decides whether an unmatched
/// non-empty code blocks the operation. Matching is case-insensitive and the
/// activity window is inclusive on both ends. First match wins when the data
/// holds duplicate codes.
pub fn validate_code<'a>(
    code: &str,
    promotions: &'a [PromotionModel],
    now: DateTime<Utc>,
) -> Option<&'a PromotionModel> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    promotions
        .iter()
        .find(|p| p.is_active_at(now) && p.promotion_code.eq_ignore_ascii_case(code))
}

fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DatabaseConnection>,
}

impl PromotionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All promotions whose window contains `now`.
    pub async fn active_promotions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PromotionModel>, ServiceError> {
        let promotions = PromotionEntity::find()
            .filter(promotion::Column::StartDate.lte(now))
            .filter(promotion::Column::EndDate.gte(now))
            .all(&*self.db)
            .await?;
        Ok(promotions)
    }

    /// Resolves a user-entered promotion code against the active set.
    ///
    /// Empty code → `Ok(None)` (promotion usage is optional). A non-empty
    /// code with no active match blocks the enclosing operation.
    #[instrument(skip(self))]
    pub async fn resolve_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PromotionModel>, ServiceError> {
        if code.trim().is_empty() {
            return Ok(None);
        }
        let active = self.active_promotions(now).await?;
        match validate_code(code, &active, now) {
            Some(promo) => Ok(Some(promo.clone())),
            None => {
                warn!(code, "promotion code did not match any active promotion");
                Err(ServiceError::ValidationError(
                    "invalid or inactive promotion code".to_string(),
                ))
            }
        }
    }

    #[instrument(skip(self, request), fields(code = %request.promotion_code))]
    pub async fn create_promotion(
        &self,
        request: CreatePromotionRequest,
    ) -> Result<PromotionResponse, ServiceError> {
        request.validate()?;
        self.check_window(&request, None).await?;

        let now = Utc::now();
        let model = promotion::ActiveModel {
            promotion_code: Set(request.promotion_code.trim().to_string()),
            option_name: Set(request.option_name),
            option_value: Set(request.option_value),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;
        info!(promotion_id = created.id, "promotion created");
        Ok(to_response(created, now))
    }

    pub async fn get_promotion(&self, id: i32) -> Result<PromotionResponse, ServiceError> {
        let promo = PromotionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Promotion {id} not found")))?;
        Ok(to_response(promo, Utc::now()))
    }

    pub async fn list_promotions(&self) -> Result<Vec<PromotionResponse>, ServiceError> {
        let now = Utc::now();
        let promotions = PromotionEntity::find()
            .order_by_desc(promotion::Column::StartDate)
            .all(&*self.db)
            .await?;
        Ok(promotions
            .into_iter()
            .map(|p| to_response(p, now))
            .collect())
    }

    #[instrument(skip(self, request), fields(promotion_id = id))]
    pub async fn update_promotion(
        &self,
        id: i32,
        request: CreatePromotionRequest,
    ) -> Result<PromotionResponse, ServiceError> {
        request.validate()?;
        self.check_window(&request, Some(id)).await?;

        let promo = PromotionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Promotion {id} not found")))?;

        let now = Utc::now();
        let mut active: promotion::ActiveModel = promo.into();
        active.promotion_code = Set(request.promotion_code.trim().to_string());
        active.option_name = Set(request.option_name);
        active.option_value = Set(request.option_value);
        active.start_date = Set(request.start_date);
        active.end_date = Set(request.end_date);
        active.updated_at = Set(Some(now));

        let updated = active.update(&*self.db).await?;
        info!(promotion_id = id, "promotion updated");
        Ok(to_response(updated, now))
    }

    /// Promotions are deletable at any time; quotations carrying the code
    /// keep their frozen promotion data (see the conversion workflow).
    #[instrument(skip(self), fields(promotion_id = id))]
    pub async fn delete_promotion(&self, id: i32) -> Result<(), ServiceError> {
        let result = PromotionEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Promotion {id} not found")));
        }
        info!(promotion_id = id, "promotion deleted");
        Ok(())
    }

    /// Data-quality invariant: no two promotions may share a code while
    /// their active windows overlap.
    async fn check_window(
        &self,
        request: &CreatePromotionRequest,
        exclude_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        if request.end_date < request.start_date {
            return Err(ServiceError::ValidationError(
                "promotion end date must not precede its start date".to_string(),
            ));
        }

        let existing = PromotionEntity::find().all(&*self.db).await?;
        let clash = existing.iter().any(|p| {
            Some(p.id) != exclude_id
                && p.promotion_code
                    .eq_ignore_ascii_case(request.promotion_code.trim())
                && windows_overlap(p.start_date, p.end_date, request.start_date, request.end_date)
        });
        if clash {
            return Err(ServiceError::ValidationError(format!(
                "promotion code {} already exists with an overlapping active window",
                request.promotion_code.trim()
            )));
        }
        Ok(())
    }
}

fn to_response(model: PromotionModel, now: DateTime<Utc>) -> PromotionResponse {
    let active = model.is_active_at(now);
    PromotionResponse {
        promotion_id: model.id,
        promotion_code: model.promotion_code,
        option_name: model.option_name,
        option_value: model.option_value,
        start_date: model.start_date,
        end_date: model.end_date,
        active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn promo(id: i32, code: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> PromotionModel {
        PromotionModel {
            id,
            promotion_code: code.to_string(),
            option_name: "Free home charger".to_string(),
            option_value: None,
            start_date: start,
            end_date: end,
            created_at: start,
            updated_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_code_matches_nothing_without_error() {
        let promos = vec![promo(1, "SUMMER10", date(2025, 1, 1), date(2025, 12, 31))];
        assert!(validate_code("", &promos, date(2025, 6, 1)).is_none());
        assert!(validate_code("   ", &promos, date(2025, 6, 1)).is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let promos = vec![promo(1, "SUMMER10", date(2025, 1, 1), date(2025, 12, 31))];
        let hit = validate_code("summer10", &promos, date(2025, 6, 1));
        assert_eq!(hit.map(|p| p.id), Some(1));
    }

    #[test]
    fn expired_promotion_does_not_match() {
        // SUMMER10 runs through January 2025; validating on Feb 1 finds nothing.
        let promos = vec![promo(1, "SUMMER10", date(2025, 1, 1), date(2025, 1, 31))];
        assert!(validate_code("SUMMER10", &promos, date(2025, 2, 1)).is_none());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let instant = date(2025, 3, 15);
        let promos = vec![promo(1, "FLASH", instant, instant)];
        assert!(validate_code("FLASH", &promos, instant).is_some());
    }

    #[test]
    fn first_match_wins_on_duplicate_codes() {
        let promos = vec![
            promo(1, "DUP", date(2025, 1, 1), date(2025, 12, 31)),
            promo(2, "DUP", date(2025, 1, 1), date(2025, 12, 31)),
        ];
        let hit = validate_code("DUP", &promos, date(2025, 6, 1));
        assert_eq!(hit.map(|p| p.id), Some(1));
    }

    #[test]
    fn overlap_detection_covers_touching_windows() {
        assert!(windows_overlap(
            date(2025, 1, 1),
            date(2025, 1, 31),
            date(2025, 1, 31),
            date(2025, 2, 28),
        ));
        assert!(!windows_overlap(
            date(2025, 1, 1),
            date(2025, 1, 31),
            date(2025, 2, 1),
            date(2025, 2, 28),
        ));
    }
}
