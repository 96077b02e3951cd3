//! Second checkout step: email and phone.

use std::sync::{Arc, Mutex};

use super::{Mounted, View, lock};
use crate::events::{Event, EventBus};

/// Second checkout step: email and phone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactsFormData {
    pub email: String,
    pub phone: String,
    pub valid: bool,
    pub errors: String,
}

#[derive(Default)]
struct Inner {
    data: ContactsFormData,
    pending: bool,
}

pub struct ContactsFormView {
    bus: Arc<EventBus>,
    inner: Mutex<Inner>,
}

impl ContactsFormView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn input_email(&self, email: &str) {
        lock(&self.inner).data.email = email.to_string();
        self.bus.emit(Event::EmailChanged {
            email: email.to_string(),
        });
    }

    pub fn input_phone(&self, phone: &str) {
        lock(&self.inner).data.phone = phone.to_string();
        self.bus.emit(Event::PhoneChanged {
            phone: phone.to_string(),
        });
    }

    pub fn set_validity(&self, valid: bool, errors: String) {
        let mut inner = lock(&self.inner);
        inner.data.valid = valid;
        inner.data.errors = errors;
    }

    /// Show a failure message and re-enable submission.
    pub fn fail(&self, message: &str) {
        let mut inner = lock(&self.inner);
        inner.pending = false;
        inner.data.errors = message.to_string();
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        let inner = lock(&self.inner);
        inner.data.valid && !inner.pending
    }

    /// Place the order. Refused while invalid or while a submission is
    /// already in flight; the control stays disabled until the next render.
    pub fn submit(&self) -> bool {
        {
            let mut inner = lock(&self.inner);
            if !inner.data.valid || inner.pending {
                return false;
            }
            inner.pending = true;
        }
        self.bus.emit(Event::OrderSubmit);
        true
    }

    pub fn refresh(&self) -> Mounted {
        let inner = lock(&self.inner);
        draw(&inner.data, inner.pending)
    }
}

impl View for ContactsFormView {
    type Snapshot = ContactsFormData;

    fn render(&self, snapshot: &ContactsFormData) -> Mounted {
        let mut inner = lock(&self.inner);
        inner.data = snapshot.clone();
        inner.pending = false;
        draw(&inner.data, false)
    }
}

fn draw(data: &ContactsFormData, pending: bool) -> Mounted {
    let mut out = String::from("Contacts\n");
    out.push_str(&format!("  email  {}\n", blank(&data.email)));
    out.push_str(&format!("  phone  {}\n", blank(&data.phone)));
    if !data.errors.is_empty() {
        out.push_str(&format!("\n  ! {}\n", data.errors));
    }
    out.push_str(if pending {
        "\n  [submitting…]"
    } else if data.valid {
        "\n  [pay]"
    } else {
        "\n  [pay disabled]"
    });
    Mounted::new("contacts", out)
}

fn blank(s: &str) -> &str {
    if s.is_empty() { "—" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn counting_bus() -> (Arc<EventBus>, Arc<Mutex<usize>>) {
        let bus = Arc::new(EventBus::new());
        let submits = Arc::new(Mutex::new(0));
        let s = Arc::clone(&submits);
        bus.on(EventKind::OrderSubmit, move |_| {
            *s.lock().unwrap() += 1;
            Ok(())
        });
        (bus, submits)
    }

    #[test]
    fn submit_disabled_until_valid() {
        let (bus, submits) = counting_bus();
        let view = ContactsFormView::new(bus);
        view.render(&ContactsFormData::default());
        assert!(!view.submit());
        assert_eq!(*submits.lock().unwrap(), 0);
    }

    #[test]
    fn submit_stays_disabled_while_pending() {
        let (bus, submits) = counting_bus();
        let view = ContactsFormView::new(bus);
        view.render(&ContactsFormData {
            email: "a@b.co".to_string(),
            phone: "+7 999 123 4567".to_string(),
            valid: true,
            errors: String::new(),
        });

        assert!(view.submit());
        assert!(!view.submit());
        assert!(view.refresh().text.contains("submitting"));
        assert_eq!(*submits.lock().unwrap(), 1);

        view.fail("Could not place the order");
        assert!(view.can_submit());
        assert!(view.refresh().text.contains("Could not place the order"));
    }
}
