use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        inventory_record::{self, Entity as InventoryEntity, Model as InventoryModel},
        vehicle::{self, Entity as VehicleEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Where an availability answer came from: the quantity ledger, or the
/// vehicle's legacy stored status when no ledger record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySource {
    Inventory,
    VehicleStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAvailability {
    pub vehicle_id: i32,
    pub quantity: i32,
    pub available: bool,
    pub source: AvailabilitySource,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub vehicle_id: i32,
    pub quantity: i32,
    pub dealer_id: i32,
}

/// Quantity is the single source of truth: a vehicle is available iff its
/// ledger quantity is positive.
fn derived_available(quantity: i32) -> bool {
    quantity > 0
}

fn status_fallback_available(status: &str) -> bool {
    status.eq_ignore_ascii_case("available")
}

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Availability for one vehicle. Falls back to the vehicle's stored
    /// status when no inventory record exists; only a missing vehicle fails.
    #[instrument(skip(self))]
    pub async fn availability(&self, vehicle_id: i32) -> Result<VehicleAvailability, ServiceError> {
        let record = InventoryEntity::find()
            .filter(inventory_record::Column::VehicleId.eq(vehicle_id))
            .one(&*self.db)
            .await?;

        if let Some(record) = record {
            return Ok(VehicleAvailability {
                vehicle_id,
                quantity: record.quantity,
                available: derived_available(record.quantity),
                source: AvailabilitySource::Inventory,
            });
        }

        let vehicle = VehicleEntity::find_by_id(vehicle_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {vehicle_id} not found")))?;

        Ok(VehicleAvailability {
            vehicle_id,
            quantity: 0,
            available: status_fallback_available(&vehicle.status),
            source: AvailabilitySource::VehicleStatus,
        })
    }

    pub async fn list_availability(&self) -> Result<Vec<VehicleAvailability>, ServiceError> {
        let records = InventoryEntity::find()
            .order_by_asc(inventory_record::Column::VehicleId)
            .all(&*self.db)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| VehicleAvailability {
                vehicle_id: r.vehicle_id,
                quantity: r.quantity,
                available: derived_available(r.quantity),
                source: AvailabilitySource::Inventory,
            })
            .collect())
    }

    /// Restock/correction write: sets the absolute quantity, creating the
    /// ledger record if the vehicle never had one.
    #[instrument(skip(self), fields(vehicle_id, quantity = request.quantity))]
    pub async fn update_quantity(
        &self,
        vehicle_id: i32,
        request: UpdateQuantityRequest,
    ) -> Result<VehicleAvailability, ServiceError> {
        if request.quantity < 0 {
            return Err(ServiceError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let existing = InventoryEntity::find()
            .filter(inventory_record::Column::VehicleId.eq(vehicle_id))
            .one(&*self.db)
            .await?;

        let updated: InventoryModel = match existing {
            Some(record) => {
                let mut active: inventory_record::ActiveModel = record.into();
                active.quantity = Set(request.quantity);
                active.updated_at = Set(Some(now));
                active.update(&*self.db).await?
            }
            None => {
                // The vehicle must exist before it can carry inventory.
                VehicleEntity::find_by_id(vehicle_id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Vehicle {vehicle_id} not found"))
                    })?;
                inventory_record::ActiveModel {
                    vehicle_id: Set(vehicle_id),
                    quantity: Set(request.quantity),
                    status: Set("available".to_string()),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(&*self.db)
                .await?
            }
        };

        info!(vehicle_id, quantity = updated.quantity, "inventory quantity updated");
        Ok(VehicleAvailability {
            vehicle_id,
            quantity: updated.quantity,
            available: derived_available(updated.quantity),
            source: AvailabilitySource::Inventory,
        })
    }

    /// Dispatches stock to a dealer. Refuses to drive the quantity negative.
    #[instrument(skip(self, request), fields(vehicle_id = request.vehicle_id, quantity = request.quantity, dealer_id = request.dealer_id))]
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<VehicleAvailability, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "dispatch quantity must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let record = InventoryEntity::find()
            .filter(inventory_record::Column::VehicleId.eq(request.vehicle_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no inventory record for vehicle {}",
                    request.vehicle_id
                ))
            })?;

        if record.quantity < request.quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "vehicle {} has {} in stock, cannot dispatch {}",
                request.vehicle_id, record.quantity, request.quantity
            )));
        }

        let remaining = record.quantity - request.quantity;
        let mut active: inventory_record::ActiveModel = record.into();
        active.quantity = Set(remaining);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            vehicle_id = request.vehicle_id,
            dealer_id = request.dealer_id,
            remaining,
            "inventory dispatched"
        );
        if let Err(e) = self
            .event_sender
            .send(Event::InventoryDispatched {
                vehicle_id: request.vehicle_id,
                quantity: request.quantity,
                dealer_id: request.dealer_id,
                remaining,
            })
            .await
        {
            warn!(error = %e, "failed to send inventory dispatched event");
        }

        Ok(VehicleAvailability {
            vehicle_id: request.vehicle_id,
            quantity: remaining,
            available: derived_available(remaining),
            source: AvailabilitySource::Inventory,
        })
    }

    /// Seed helper for the vehicle catalog rows the core reads.
    pub async fn create_vehicle(
        &self,
        model_name: &str,
        status: &str,
    ) -> Result<vehicle::Model, ServiceError> {
        let created = vehicle::ActiveModel {
            model_name: Set(model_name.to_string()),
            status: Set(status.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        Ok(created)
    }
}
