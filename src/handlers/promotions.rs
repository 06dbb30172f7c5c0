use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    services::promotions::CreatePromotionRequest,
    ApiResponse, AppState,
};

#[utoipa::path(
    get,
    path = "/api/Promotion",
    responses(
        (status = 200, description = "Promotion list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let promotions = state.services.promotions.list_promotions().await?;
    Ok(Json(ApiResponse::ok(promotions)))
}

#[utoipa::path(
    get,
    path = "/api/Promotion/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    responses(
        (status = 200, description = "Promotion found", body = crate::services::promotions::PromotionResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "promotions"
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let promotion = state.services.promotions.get_promotion(id).await?;
    Ok(Json(ApiResponse::ok(promotion)))
}

#[utoipa::path(
    post,
    path = "/api/Promotion",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Promotion created", body = crate::services::promotions::PromotionResponse),
        (status = 400, description = "Invalid input or duplicate active code", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    let promotion = state.services.promotions.create_promotion(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(promotion, "promotion created")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/Promotion/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    request_body = CreatePromotionRequest,
    responses(
        (status = 200, description = "Promotion updated", body = crate::services::promotions::PromotionResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "promotions"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreatePromotionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    let promotion = state
        .services
        .promotions
        .update_promotion(id, payload)
        .await?;
    Ok(Json(ApiResponse::with_message(promotion, "promotion updated")))
}

#[utoipa::path(
    delete,
    path = "/api/Promotion/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    responses(
        (status = 200, description = "Promotion deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "promotions"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(roles::EVM_STAFF)?;
    state.services.promotions.delete_promotion(id).await?;
    Ok(Json(ApiResponse::<()>::message_only("promotion deleted")))
}
