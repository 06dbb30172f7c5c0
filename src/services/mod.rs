pub mod inventory;
pub mod orders;
pub mod promotions;
pub mod quotations;

use std::sync::Arc;

use crate::{db::DbPool, events::EventSender};

/// Business-logic layer consumed by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub quotations: quotations::QuotationService,
    pub orders: orders::OrderService,
    pub promotions: promotions::PromotionService,
    pub inventory: inventory::InventoryService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let promotions = promotions::PromotionService::new(db.clone());
        let inventory = inventory::InventoryService::new(db.clone(), event_sender.clone());
        let quotations = quotations::QuotationService::new(
            db.clone(),
            promotions.clone(),
            event_sender.clone(),
        );
        let orders = orders::OrderService::new(
            db,
            inventory.clone(),
            promotions.clone(),
            event_sender,
        );
        Self {
            quotations,
            orders,
            promotions,
            inventory,
        }
    }
}
