use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
        quotation::{self, Entity as QuotationEntity, Model as QuotationModel, QuotationStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        inventory::InventoryService,
        promotions::{validate_code, PromotionService},
    },
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuotationRequest {
    pub quotation_id: i32,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i32,
    pub quotation_id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub color: String,
    pub order_date: DateTime<Utc>,
    pub delivery_address: Option<String>,
    pub status: OrderStatus,
    pub promotion_code: Option<String>,
    pub promotion_option_name: Option<String>,
    pub quotation_price: Decimal,
    pub final_price: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Conversion result. `warnings` carries non-fatal findings (zero inventory,
/// stale promotion data) the staff UI should display alongside the order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub order: OrderResponse,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    inventory: InventoryService,
    promotions: PromotionService,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        inventory: InventoryService,
        promotions: PromotionService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            inventory,
            promotions,
            event_sender,
        }
    }

    /// Converts an APPROVED quotation into an order.
    ///
    /// The order insert and the quotation's move to CONVERTED run in one
    /// transaction, so a partial conversion can never persist. Idempotence is
    /// enforced three ways: the in-transaction existence check, the unique
    /// index on `orders.quotation_id`, and the version-checked status update.
    /// A repeat call fails with a conflict and creates nothing.
    #[instrument(skip(self, request), fields(quotation_id = request.quotation_id))]
    pub async fn convert_quotation(
        &self,
        request: ConvertQuotationRequest,
    ) -> Result<ConversionResponse, ServiceError> {
        let quotation_id = request.quotation_id;
        let quotation = QuotationEntity::find_by_id(quotation_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quotation {quotation_id} not found")))?;
        self.convert_from_snapshot(quotation, request.delivery_address)
            .await
    }

    /// Converts from a previously read quotation row. The CONVERTED
    /// transition is filtered on the snapshot's version; every quotation
    /// write bumps the version, so any write that landed after the read
    /// makes the update match zero rows and the whole transaction rolls
    /// back with a conflict.
    pub async fn convert_from_snapshot(
        &self,
        quotation: QuotationModel,
        delivery_address: Option<String>,
    ) -> Result<ConversionResponse, ServiceError> {
        let quotation_id = quotation.id;
        let now = Utc::now();

        if quotation.status != QuotationStatus::Approved {
            return Err(ServiceError::PreconditionFailed(
                "only approved quotations can be converted".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let already_converted = OrderEntity::find()
            .filter(order::Column::QuotationId.eq(quotation_id))
            .one(&txn)
            .await?;
        if already_converted.is_some() {
            return Err(ServiceError::Conflict(format!(
                "quotation {quotation_id} has already been converted to an order"
            )));
        }

        let order_model = order::ActiveModel {
            quotation_id: Set(quotation_id),
            user_id: Set(quotation.user_id),
            vehicle_id: Set(quotation.vehicle_id),
            color: Set(quotation.color.clone()),
            order_date: Set(now),
            delivery_address: Set(delivery_address),
            status: Set(OrderStatus::Pending),
            promotion_code: Set(quotation.promotion_code.clone()),
            promotion_option_name: Set(quotation.promotion_option_name.clone()),
            quotation_price: Set(quotation.base_price),
            final_price: Set(quotation.final_price),
            total_amount: Set(quotation.final_price),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            ServiceError::from_write_error(
                e,
                &format!("quotation {quotation_id} has already been converted to an order"),
            )
        })?;

        // Version-checked transition: if another writer touched the quotation
        // after our read, zero rows match and the whole conversion rolls back.
        let update = QuotationEntity::update_many()
            .col_expr(
                quotation::Column::Status,
                Expr::value(QuotationStatus::Converted),
            )
            .col_expr(quotation::Column::Version, Expr::value(quotation.version + 1))
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(quotation::Column::Version.eq(quotation.version))
            .exec(&txn)
            .await?;
        if update.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "quotation {quotation_id} was modified concurrently; conversion aborted"
            )));
        }

        txn.commit().await?;

        info!(
            quotation_id,
            order_id = order_model.id,
            "quotation converted to order"
        );

        let warnings = self.collect_warnings(&quotation, now).await;

        if let Err(e) = self
            .event_sender
            .send(Event::QuotationConverted {
                quotation_id,
                order_id: order_model.id,
            })
            .await
        {
            warn!(error = %e, quotation_id, "failed to send quotation converted event");
        }
        if let Err(e) = self
            .event_sender
            .send(Event::OrderCreated {
                order_id: order_model.id,
            })
            .await
        {
            warn!(error = %e, order_id = order_model.id, "failed to send order created event");
        }

        Ok(ConversionResponse {
            order: to_response(order_model),
            warnings,
        })
    }

    /// Non-fatal checks surfaced to the staff UI. Inventory is read, never
    /// mutated, during conversion; promotion data on the quotation is frozen
    /// at approval time, so a lapsed code is reported rather than enforced.
    async fn collect_warnings(
        &self,
        quotation: &quotation::Model,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.inventory.availability(quotation.vehicle_id).await {
            Ok(availability) if !availability.available => {
                warn!(
                    vehicle_id = quotation.vehicle_id,
                    "converted an order for a vehicle with no available inventory"
                );
                warnings.push(format!(
                    "vehicle {} has no available inventory",
                    quotation.vehicle_id
                ));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "inventory availability lookup failed"),
        }

        if let Some(code) = quotation
            .promotion_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        {
            match self.promotions.active_promotions(now).await {
                Ok(active) if validate_code(code, &active, now).is_none() => {
                    warn!(code, "quotation promotion is no longer active at conversion time");
                    warnings.push(format!(
                        "promotion {code} is no longer active; order keeps the quoted terms"
                    ));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "promotion lookup failed"),
            }
        }

        warnings
    }

    pub async fn get_order(&self, id: i32) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;
        Ok(to_response(order))
    }

    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(orders.into_iter().map(to_response).collect())
    }

    /// Deletes an order. The source quotation stays CONVERTED; re-quoting a
    /// customer means creating a fresh quotation.
    #[instrument(skip(self), fields(order_id = id))]
    pub async fn delete_order(&self, id: i32) -> Result<(), ServiceError> {
        let result = OrderEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Order {id} not found")));
        }
        info!(order_id = id, "order deleted");
        if let Err(e) = self.event_sender.send(Event::OrderDeleted { order_id: id }).await {
            warn!(error = %e, order_id = id, "failed to send order deleted event");
        }
        Ok(())
    }
}

fn to_response(model: OrderModel) -> OrderResponse {
    OrderResponse {
        order_id: model.id,
        quotation_id: model.quotation_id,
        user_id: model.user_id,
        vehicle_id: model.vehicle_id,
        color: model.color,
        order_date: model.order_date,
        delivery_address: model.delivery_address,
        status: model.status,
        promotion_code: model.promotion_code,
        promotion_option_name: model.promotion_option_name,
        quotation_price: model.quotation_price,
        final_price: model.final_price,
        total_amount: model.total_amount,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_response_carries_quotation_pricing() {
        let now = Utc::now();
        let model = OrderModel {
            id: 7,
            quotation_id: 3,
            user_id: 11,
            vehicle_id: 5,
            color: "Midnight Blue".to_string(),
            order_date: now,
            delivery_address: Some("12 Dealer Way".to_string()),
            status: OrderStatus::Pending,
            promotion_code: Some("SUMMER10".to_string()),
            promotion_option_name: Some("Free home charger".to_string()),
            quotation_price: dec!(800000000),
            final_price: dec!(800000000),
            total_amount: dec!(800000000),
            created_at: now,
            updated_at: Some(now),
        };

        let response = to_response(model);
        assert_eq!(response.order_id, 7);
        assert_eq!(response.quotation_id, 3);
        assert_eq!(response.quotation_price, dec!(800000000));
        assert_eq!(response.final_price, dec!(800000000));
        assert_eq!(response.total_amount, dec!(800000000));
        assert_eq!(response.status, OrderStatus::Pending);
    }
}
