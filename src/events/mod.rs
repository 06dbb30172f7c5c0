use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::quotation::QuotationStatus;

/// Domain events emitted by the sales core. Consumers are fire-and-forget;
/// a failed send never fails the originating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    QuotationCreated {
        quotation_id: i32,
        user_id: i32,
        vehicle_id: i32,
    },
    QuotationStatusChanged {
        quotation_id: i32,
        old_status: QuotationStatus,
        new_status: QuotationStatus,
    },
    QuotationDeleted {
        quotation_id: i32,
    },
    QuotationConverted {
        quotation_id: i32,
        order_id: i32,
    },
    OrderCreated {
        order_id: i32,
    },
    OrderDeleted {
        order_id: i32,
    },
    InventoryDispatched {
        vehicle_id: i32,
        quantity: i32,
        dealer_id: i32,
        remaining: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::QuotationConverted {
                quotation_id,
                order_id,
            } => {
                info!(quotation_id, order_id, "quotation converted to order");
            }
            Event::QuotationStatusChanged {
                quotation_id,
                old_status,
                new_status,
            } => {
                info!(
                    quotation_id,
                    %old_status,
                    %new_status,
                    "quotation status changed"
                );
            }
            Event::InventoryDispatched {
                vehicle_id,
                quantity,
                dealer_id,
                remaining,
            } => {
                info!(vehicle_id, quantity, dealer_id, remaining, "inventory dispatched");
                if *remaining == 0 {
                    warn!(vehicle_id, "vehicle is now out of stock");
                }
            }
            other => info!(event = ?other, "event processed"),
        }
    }
}
