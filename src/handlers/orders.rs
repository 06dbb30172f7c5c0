use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    services::orders::ConvertQuotationRequest,
    ApiResponse, AppState,
};

/// Convert an approved quotation into an order. The order fields are derived
/// server-side from the source quotation; both writes commit atomically.
#[utoipa::path(
    post,
    path = "/api/SaleManagement/CreateOrder",
    request_body = ConvertQuotationRequest,
    responses(
        (status = 201, description = "Order created from quotation", body = crate::services::orders::ConversionResponse),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation already converted", body = crate::errors::ErrorResponse),
        (status = 422, description = "Quotation is not approved", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn convert_quotation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ConvertQuotationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::DEALER_STAFF)?;
    let conversion = state.services.orders.convert_quotation(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(conversion, "order created")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/Order",
    responses(
        (status = 200, description = "Order list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_orders().await?;
    Ok(Json(ApiResponse::ok(orders)))
}

#[utoipa::path(
    get,
    path = "/api/Order/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = crate::services::orders::OrderResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

#[utoipa::path(
    delete,
    path = "/api/Order/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    state.services.orders.delete_order(id).await?;
    Ok(Json(ApiResponse::<()>::message_only("order deleted")))
}
