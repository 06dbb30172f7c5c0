use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        order::{self, Entity as OrderEntity},
        quotation::{self, Entity as QuotationEntity, Model as QuotationModel, QuotationStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::promotions::PromotionService,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationRequest {
    pub user_id: i32,
    pub vehicle_id: i32,
    #[validate(length(min = 1, message = "Color is required"))]
    pub color: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub promotion_code: Option<String>,
    #[serde(default)]
    pub quotation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    /// Ignored: every new quotation starts PENDING regardless of what the
    /// form submits.
    #[serde(default)]
    pub status: Option<QuotationStatus>,
}

/// Full-payload update, including staff status transitions.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotationRequest {
    #[validate(length(min = 1, message = "Color is required"))]
    pub color: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub promotion_code: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    pub status: QuotationStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    pub quotation_id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub quotation_date: DateTime<Utc>,
    pub color: String,
    pub base_price: Decimal,
    pub discount: Decimal,
    pub final_price: Decimal,
    pub promotion_code: Option<String>,
    pub promotion_option_name: Option<String>,
    pub status: QuotationStatus,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Staff-reachable transition graph. Conversion to CONVERTED is deliberately
/// absent: only the order workflow performs it.
pub fn transition_allowed(from: QuotationStatus, to: QuotationStatus) -> bool {
    use QuotationStatus::*;
    if from == to {
        // Same-state update: field edit without a transition.
        return true;
    }
    matches!(
        (from, to),
        (Draft, Pending) | (Pending, Sent) | (Pending, Approved) | (Pending, Rejected)
            | (Sent, Approved)
            | (Sent, Rejected)
    )
}

#[derive(Clone)]
pub struct QuotationService {
    db: Arc<DbPool>,
    promotions: PromotionService,
    event_sender: EventSender,
}

impl QuotationService {
    pub fn new(db: Arc<DbPool>, promotions: PromotionService, event_sender: EventSender) -> Self {
        Self {
            db,
            promotions,
            event_sender,
        }
    }

    /// Creates a quotation. Status is forced to PENDING and the final price
    /// is computed server-side: the client's arithmetic is never trusted.
    #[instrument(skip(self, request), fields(user_id = request.user_id, vehicle_id = request.vehicle_id))]
    pub async fn create_quotation(
        &self,
        request: CreateQuotationRequest,
    ) -> Result<QuotationResponse, ServiceError> {
        request.validate()?;
        check_pricing(request.base_price, request.discount)?;

        let now = Utc::now();
        let promotion = self
            .promotions
            .resolve_code(request.promotion_code.as_deref().unwrap_or(""), now)
            .await?;

        let final_price = request.base_price - request.discount;
        let model = quotation::ActiveModel {
            user_id: Set(request.user_id),
            vehicle_id: Set(request.vehicle_id),
            quotation_date: Set(request.quotation_date.unwrap_or(now)),
            color: Set(request.color),
            base_price: Set(request.base_price),
            discount: Set(request.discount),
            final_price: Set(final_price),
            promotion_code: Set(promotion.as_ref().map(|p| p.promotion_code.clone())),
            promotion_option_name: Set(promotion.as_ref().map(|p| p.option_name.clone())),
            status: Set(QuotationStatus::Pending),
            attachment_url: Set(request.attachment_url),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;
        info!(quotation_id = created.id, "quotation created");

        if let Err(e) = self
            .event_sender
            .send(Event::QuotationCreated {
                quotation_id: created.id,
                user_id: created.user_id,
                vehicle_id: created.vehicle_id,
            })
            .await
        {
            warn!(error = %e, quotation_id = created.id, "failed to send quotation created event");
        }

        Ok(to_response(created))
    }

    pub async fn get_quotation(&self, id: i32) -> Result<QuotationResponse, ServiceError> {
        let quotation = self.find_model(id).await?;
        Ok(to_response(quotation))
    }

    pub async fn list_quotations(&self) -> Result<Vec<QuotationResponse>, ServiceError> {
        let quotations = QuotationEntity::find()
            .order_by_desc(quotation::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(quotations.into_iter().map(to_response).collect())
    }

    /// Full-payload update. Status transitions are validated against the
    /// enforced graph; requesting CONVERTED through this path is always
    /// rejected.
    #[instrument(skip(self, request), fields(quotation_id = id, requested_status = %request.status))]
    pub async fn update_quotation(
        &self,
        id: i32,
        request: UpdateQuotationRequest,
    ) -> Result<QuotationResponse, ServiceError> {
        let quotation = self.find_model(id).await?;
        self.update_from_snapshot(quotation, request).await
    }

    /// Applies a full-payload update against a previously read row. The write
    /// is version-checked: it only lands if the stored version still matches
    /// the snapshot, so a quotation converted (or otherwise written) after
    /// the read fails with a conflict instead of being overwritten.
    pub async fn update_from_snapshot(
        &self,
        quotation: QuotationModel,
        request: UpdateQuotationRequest,
    ) -> Result<QuotationResponse, ServiceError> {
        request.validate()?;
        check_pricing(request.base_price, request.discount)?;

        let id = quotation.id;
        let old_status = quotation.status;

        if request.status == QuotationStatus::Converted {
            return Err(ServiceError::PreconditionFailed(
                "quotations are converted through the order workflow, not a status update"
                    .to_string(),
            ));
        }
        if !transition_allowed(old_status, request.status) {
            return Err(ServiceError::PreconditionFailed(format!(
                "cannot transition quotation from {old_status} to {}",
                request.status
            )));
        }

        let now = Utc::now();
        let submitted = request.promotion_code.as_deref().map(str::trim);
        let promotion = match submitted {
            Some(code) if !code.is_empty() && Some(code) != quotation.promotion_code.as_deref() => {
                self.promotions.resolve_code(code, now).await?
            }
            _ => None,
        };
        // An omitted or empty code clears the promotion, same as at creation;
        // resubmitting the stored code keeps the frozen promotion data.
        let (promo_code, promo_option) = match promotion {
            Some(promo) => (Some(promo.promotion_code), Some(promo.option_name)),
            None => match submitted {
                None | Some("") => (None, None),
                Some(_) => (
                    quotation.promotion_code.clone(),
                    quotation.promotion_option_name.clone(),
                ),
            },
        };

        let update = QuotationEntity::update_many()
            .col_expr(quotation::Column::Color, Expr::value(request.color))
            .col_expr(quotation::Column::BasePrice, Expr::value(request.base_price))
            .col_expr(quotation::Column::Discount, Expr::value(request.discount))
            .col_expr(
                quotation::Column::FinalPrice,
                Expr::value(request.base_price - request.discount),
            )
            .col_expr(quotation::Column::PromotionCode, Expr::value(promo_code))
            .col_expr(
                quotation::Column::PromotionOptionName,
                Expr::value(promo_option),
            )
            .col_expr(
                quotation::Column::AttachmentUrl,
                Expr::value(request.attachment_url),
            )
            .col_expr(quotation::Column::Status, Expr::value(request.status))
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .col_expr(
                quotation::Column::Version,
                Expr::value(quotation.version + 1),
            )
            .filter(quotation::Column::Id.eq(id))
            .filter(quotation::Column::Version.eq(quotation.version))
            .exec(&*self.db)
            .await?;
        if update.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "quotation {id} was modified concurrently; update aborted"
            )));
        }

        let updated = self.find_model(id).await?;
        info!(
            quotation_id = id,
            old_status = %old_status,
            new_status = %updated.status,
            "quotation updated"
        );

        if old_status != updated.status {
            if let Err(e) = self
                .event_sender
                .send(Event::QuotationStatusChanged {
                    quotation_id: id,
                    old_status,
                    new_status: updated.status,
                })
                .await
            {
                warn!(error = %e, quotation_id = id, "failed to send status changed event");
            }
        }

        Ok(to_response(updated))
    }

    /// Deletes a quotation unless an order references it, in which case the
    /// caller gets a conflict with the corrective next step.
    #[instrument(skip(self), fields(quotation_id = id))]
    pub async fn delete_quotation(&self, id: i32) -> Result<(), ServiceError> {
        let quotation = self.find_model(id).await?;

        let referencing_orders = OrderEntity::find()
            .filter(order::Column::QuotationId.eq(id))
            .count(&*self.db)
            .await?;
        if referencing_orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "cannot delete quotation {id}: it is used in an order; delete the related order first"
            )));
        }

        QuotationEntity::delete_by_id(quotation.id)
            .exec(&*self.db)
            .await
            .map_err(|e| {
                // Backstop: an order created between the check and the delete
                // trips the foreign key.
                ServiceError::from_write_error(
                    e,
                    &format!(
                        "cannot delete quotation {id}: it is used in an order; delete the related order first"
                    ),
                )
            })?;

        info!(quotation_id = id, "quotation deleted");
        if let Err(e) = self
            .event_sender
            .send(Event::QuotationDeleted { quotation_id: id })
            .await
        {
            warn!(error = %e, quotation_id = id, "failed to send quotation deleted event");
        }
        Ok(())
    }

    async fn find_model(&self, id: i32) -> Result<QuotationModel, ServiceError> {
        QuotationEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quotation {id} not found")))
    }
}

fn check_pricing(base_price: Decimal, discount: Decimal) -> Result<(), ServiceError> {
    if base_price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "base price must not be negative".to_string(),
        ));
    }
    if discount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "discount must not be negative".to_string(),
        ));
    }
    if discount > base_price {
        return Err(ServiceError::ValidationError(
            "discount must not exceed the base price".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn to_response(model: QuotationModel) -> QuotationResponse {
    QuotationResponse {
        quotation_id: model.id,
        user_id: model.user_id,
        vehicle_id: model.vehicle_id,
        quotation_date: model.quotation_date,
        color: model.color,
        base_price: model.base_price,
        discount: model.discount,
        final_price: model.final_price,
        promotion_code: model.promotion_code,
        promotion_option_name: model.promotion_option_name,
        status: model.status,
        attachment_url: model.attachment_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use QuotationStatus::*;

    #[test]
    fn staff_transition_graph() {
        let allowed = [
            (Draft, Pending),
            (Pending, Sent),
            (Pending, Approved),
            (Pending, Rejected),
            (Sent, Approved),
            (Sent, Rejected),
        ];
        for (from, to) in allowed {
            assert!(transition_allowed(from, to), "{from} -> {to} should pass");
        }

        let rejected = [
            (Pending, Draft),
            (Approved, Pending),
            (Approved, Rejected),
            (Rejected, Pending),
            (Rejected, Approved),
            (Converted, Pending),
            (Converted, Approved),
            (Draft, Approved),
            (Approved, Converted), // converter-only, never via staff update
            (Pending, Converted),
        ];
        for (from, to) in rejected {
            assert!(!transition_allowed(from, to), "{from} -> {to} should fail");
        }
    }

    #[test]
    fn same_state_update_is_a_noop_transition() {
        for status in [Draft, Pending, Sent, Approved, Rejected, Converted] {
            assert!(transition_allowed(status, status));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(Rejected.is_terminal());
        assert!(Converted.is_terminal());
        assert!(!Approved.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn pricing_rules() {
        assert!(check_pricing(dec!(1000), dec!(100)).is_ok());
        assert!(check_pricing(dec!(1000), dec!(0)).is_ok());
        assert!(check_pricing(dec!(1000), dec!(1000)).is_ok());
        assert!(check_pricing(dec!(-1), dec!(0)).is_err());
        assert!(check_pricing(dec!(1000), dec!(-5)).is_err());
        assert!(check_pricing(dec!(100), dec!(101)).is_err());
    }
}
