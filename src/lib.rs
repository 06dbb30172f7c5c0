//! EV Sales Portal API
//!
//! Backend core for an electric-vehicle dealer/manufacturer sales portal:
//! the quotation lifecycle, quotation-to-order conversion, promotion-code
//! validation, and the inventory availability read path.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

/// Response envelope used by every successful endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Assembles the application router. Middleware layers (trace, timeout,
/// CORS) are applied by the binary so tests can drive the bare router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            openapi::ApiDoc::openapi(),
        ))
        .with_state(state)
}
