use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    services::inventory::{DispatchRequest, UpdateQuantityRequest},
    ApiResponse, AppState,
};

#[utoipa::path(
    get,
    path = "/api/Inventory",
    responses(
        (status = 200, description = "Availability for every tracked vehicle"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state.services.inventory.list_availability().await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// Availability for one vehicle, derived from quantity with the vehicle's
/// stored status as fallback.
#[utoipa::path(
    get,
    path = "/api/Inventory/{vehicleId}",
    params(("vehicleId" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle availability", body = crate::services::inventory::VehicleAvailability),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(vehicle_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let availability = state.services.inventory.availability(vehicle_id).await?;
    Ok(Json(ApiResponse::ok(availability)))
}

#[utoipa::path(
    put,
    path = "/api/Inventory/{vehicleId}/update",
    params(("vehicleId" = i32, Path, description = "Vehicle id")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = crate::services::inventory::VehicleAvailability),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(vehicle_id): Path<i32>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    let availability = state
        .services
        .inventory
        .update_quantity(vehicle_id, payload)
        .await?;
    Ok(Json(ApiResponse::with_message(availability, "inventory updated")))
}

#[utoipa::path(
    post,
    path = "/api/Inventory/dispatch",
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Stock dispatched", body = crate::services::inventory::VehicleAvailability),
        (status = 404, description = "No inventory record", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn dispatch(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DispatchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    let availability = state.services.inventory.dispatch(payload).await?;
    Ok(Json(ApiResponse::with_message(availability, "stock dispatched")))
}
