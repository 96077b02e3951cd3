//! First checkout step: payment method and delivery address.

use std::sync::{Arc, Mutex};

use super::{Mounted, View, lock};
use crate::events::{Event, EventBus};
use crate::model::Payment;

/// First checkout step: payment method and delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFormData {
    pub payment: Option<Payment>,
    pub address: String,
    pub valid: bool,
    pub errors: String,
}

pub struct OrderFormView {
    bus: Arc<EventBus>,
    data: Mutex<OrderFormData>,
}

impl OrderFormView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            data: Mutex::new(OrderFormData::default()),
        }
    }

    pub fn select_payment(&self, payment: Payment) {
        lock(&self.data).payment = Some(payment);
        self.bus.emit(Event::PaymentChanged {
            payment: Some(payment),
        });
    }

    pub fn input_address(&self, address: &str) {
        lock(&self.data).address = address.to_string();
        self.bus.emit(Event::AddressChanged {
            address: address.to_string(),
        });
    }

    /// Set validity and the error line without a full render.
    pub fn set_validity(&self, valid: bool, errors: String) {
        let mut data = lock(&self.data);
        data.valid = valid;
        data.errors = errors;
    }

    pub fn is_valid(&self) -> bool {
        lock(&self.data).valid
    }

    /// Go on to the contacts step. Refused while the form is invalid.
    pub fn submit(&self) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.bus.emit(Event::ContactsOpen);
        true
    }

    /// Render from the view's current data.
    pub fn refresh(&self) -> Mounted {
        let data = lock(&self.data).clone();
        draw(&data)
    }
}

impl View for OrderFormView {
    type Snapshot = OrderFormData;

    fn render(&self, snapshot: &OrderFormData) -> Mounted {
        *lock(&self.data) = snapshot.clone();
        draw(snapshot)
    }
}

fn draw(data: &OrderFormData) -> Mounted {
    let methods: Vec<String> = Payment::ALL
        .iter()
        .map(|p| {
            if data.payment == Some(*p) {
                format!("(•) {} [{}]", p.label(), p.as_str())
            } else {
                format!("( ) {} [{}]", p.label(), p.as_str())
            }
        })
        .collect();

    let mut out = String::from("Order\n");
    out.push_str(&format!("  payment   {}\n", methods.join("   ")));
    out.push_str(&format!("  address   {}\n", display_or_blank(&data.address)));
    if !data.errors.is_empty() {
        out.push_str(&format!("\n  ! {}\n", data.errors));
    }
    out.push_str(if data.valid {
        "\n  [next]"
    } else {
        "\n  [next disabled]"
    });
    Mounted::new("order", out)
}

fn display_or_blank(s: &str) -> &str {
    if s.is_empty() { "—" } else { s }
}
