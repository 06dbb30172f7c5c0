pub mod inventory;
pub mod orders;
pub mod promotions;
pub mod quotations;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// Routes consumed by the portal frontend. Paths mirror the portal's
/// observed interface.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/SaleManagement/CreateQuotation",
            post(quotations::create_quotation),
        )
        .route("/api/Quotation", get(quotations::list_quotations))
        .route(
            "/api/Quotation/:id",
            get(quotations::get_quotation)
                .put(quotations::update_quotation)
                .delete(quotations::delete_quotation),
        )
        .route(
            "/api/SaleManagement/CreateOrder",
            post(orders::convert_quotation),
        )
        .route("/api/Order", get(orders::list_orders))
        .route(
            "/api/Order/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route(
            "/api/Promotion",
            get(promotions::list_promotions).post(promotions::create_promotion),
        )
        .route(
            "/api/Promotion/:id",
            get(promotions::get_promotion)
                .put(promotions::update_promotion)
                .delete(promotions::delete_promotion),
        )
        .route("/api/Inventory", get(inventory::list_inventory))
        .route("/api/Inventory/dispatch", post(inventory::dispatch))
        .route("/api/Inventory/:vehicle_id", get(inventory::get_availability))
        .route(
            "/api/Inventory/:vehicle_id/update",
            put(inventory::update_quantity),
        )
}
