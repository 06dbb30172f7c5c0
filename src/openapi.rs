use utoipa::OpenApi;

use crate::{entities, errors, handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EV Sales Portal API",
        description = "Quotation-to-order conversion workflow, promotions, and inventory availability for the EV dealer portal"
    ),
    paths(
        handlers::quotations::create_quotation,
        handlers::quotations::list_quotations,
        handlers::quotations::get_quotation,
        handlers::quotations::update_quotation,
        handlers::quotations::delete_quotation,
        handlers::orders::convert_quotation,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::delete_order,
        handlers::promotions::list_promotions,
        handlers::promotions::get_promotion,
        handlers::promotions::create_promotion,
        handlers::promotions::update_promotion,
        handlers::promotions::delete_promotion,
        handlers::inventory::list_inventory,
        handlers::inventory::get_availability,
        handlers::inventory::update_quantity,
        handlers::inventory::dispatch,
    ),
    components(schemas(
        entities::quotation::QuotationStatus,
        entities::order::OrderStatus,
        services::quotations::CreateQuotationRequest,
        services::quotations::UpdateQuotationRequest,
        services::quotations::QuotationResponse,
        services::orders::ConvertQuotationRequest,
        services::orders::OrderResponse,
        services::orders::ConversionResponse,
        services::promotions::CreatePromotionRequest,
        services::promotions::PromotionResponse,
        services::inventory::VehicleAvailability,
        services::inventory::AvailabilitySource,
        services::inventory::UpdateQuantityRequest,
        services::inventory::DispatchRequest,
        errors::ErrorResponse,
    )),
    tags(
        (name = "quotations", description = "Quotation lifecycle"),
        (name = "orders", description = "Order conversion and management"),
        (name = "promotions", description = "Promotion management"),
        (name = "inventory", description = "Vehicle availability and dispatch"),
    )
)]
pub struct ApiDoc;
