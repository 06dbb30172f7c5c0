use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    services::quotations::{CreateQuotationRequest, UpdateQuotationRequest},
    ApiResponse, AppState,
};

/// Create a quotation. The submitted status is ignored; every new quotation
/// starts PENDING.
#[utoipa::path(
    post,
    path = "/api/SaleManagement/CreateQuotation",
    request_body = CreateQuotationRequest,
    responses(
        (status = 201, description = "Quotation created", body = crate::services::quotations::QuotationResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn create_quotation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateQuotationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::DEALER_STAFF)?;
    let quotation = state.services.quotations.create_quotation(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(quotation, "quotation created")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/Quotation",
    responses(
        (status = 200, description = "Quotation list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn list_quotations(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let quotations = state.services.quotations.list_quotations().await?;
    Ok(Json(ApiResponse::ok(quotations)))
}

#[utoipa::path(
    get,
    path = "/api/Quotation/{id}",
    params(("id" = i32, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation found", body = crate::services::quotations::QuotationResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn get_quotation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let quotation = state.services.quotations.get_quotation(id).await?;
    Ok(Json(ApiResponse::ok(quotation)))
}

/// Full-payload update, including staff status transitions. Illegal
/// transitions are rejected; CONVERTED can never be requested here.
#[utoipa::path(
    put,
    path = "/api/Quotation/{id}",
    params(("id" = i32, Path, description = "Quotation id")),
    request_body = UpdateQuotationRequest,
    responses(
        (status = 200, description = "Quotation updated", body = crate::services::quotations::QuotationResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation was modified concurrently", body = crate::errors::ErrorResponse),
        (status = 422, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn update_quotation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateQuotationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    let quotation = state
        .services
        .quotations
        .update_quotation(id, payload)
        .await?;
    Ok(Json(ApiResponse::with_message(quotation, "quotation updated")))
}

#[utoipa::path(
    delete,
    path = "/api/Quotation/{id}",
    params(("id" = i32, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation is used in an order", body = crate::errors::ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn delete_quotation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::DEALER_STAFF)?;
    state.services.quotations.delete_quotation(id).await?;
    Ok(Json(ApiResponse::<()>::message_only("quotation deleted")))
}
