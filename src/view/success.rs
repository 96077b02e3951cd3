//! Confirmation panel shown after an order is placed.

use std::sync::Arc;

use super::{Mounted, View, format_price};
use crate::events::{Event, EventBus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessData {
    pub order_id: String,
    pub total: u64,
}

/// Order confirmation panel.
pub struct SuccessView {
    bus: Arc<EventBus>,
}

impl SuccessView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub fn close(&self) {
        self.bus.emit(Event::ModalClose);
    }
}

impl View for SuccessView {
    type Snapshot = SuccessData;

    fn render(&self, snapshot: &SuccessData) -> Mounted {
        let mut out = String::from("Order placed\n");
        out.push_str(&format!("  Charged {}\n", format_price(Some(snapshot.total))));
        if !snapshot.order_id.is_empty() {
            out.push_str(&format!("  order   {}\n", snapshot.order_id));
        }
        out.push_str("\n  [new purchases]");
        Mounted::new("success", out)
    }
}
