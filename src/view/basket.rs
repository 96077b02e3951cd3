//! Basket listing with per-line removal and the checkout button.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use super::{Mounted, View, format_price, lock};
use crate::events::{Event, EventBus};
use crate::model::{BasketSnapshot, Product};

/// What the basket view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketViewData {
    pub items: Vec<Product>,
    pub total: u64,
}

impl From<&BasketSnapshot> for BasketViewData {
    fn from(s: &BasketSnapshot) -> Self {
        Self {
            items: s.items.clone(),
            total: s.total,
        }
    }
}

/// The basket listing with per-line delete and a checkout button.
pub struct BasketView {
    bus: Arc<EventBus>,
    items: Mutex<Vec<Product>>,
}

impl BasketView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            items: Mutex::new(Vec::new()),
        }
    }

    /// Delete the line at 1-based `position`. Returns false when out of range.
    pub fn remove(&self, position: usize) -> bool {
        let id = {
            let items = lock(&self.items);
            match position.checked_sub(1).and_then(|i| items.get(i)) {
                Some(p) => p.id.clone(),
                None => return false,
            }
        };
        self.bus.emit(Event::CardRemove { id });
        true
    }

    /// Proceed to checkout. Disabled while the basket is empty.
    pub fn checkout(&self) -> bool {
        if lock(&self.items).is_empty() {
            return false;
        }
        self.bus.emit(Event::OrderOpen);
        true
    }
}

impl View for BasketView {
    type Snapshot = BasketViewData;

    fn render(&self, snapshot: &BasketViewData) -> Mounted {
        *lock(&self.items) = snapshot.items.clone();

        let mut out = String::from("Basket\n");
        if snapshot.items.is_empty() {
            out.push_str("  (empty)\n");
        }
        for (i, item) in snapshot.items.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {}  {}",
                i + 1,
                item.title,
                format_price(item.price)
            );
        }
        let _ = writeln!(out, "\n  total  {}", format_price(Some(snapshot.total)));
        let checkout = if snapshot.items.is_empty() {
            "[checkout disabled]"
        } else {
            "[checkout]"
        };
        out.push_str("  ");
        out.push_str(checkout);
        Mounted::new("basket", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn item(id: &str, price: Option<u64>) -> Product {
        Product {
            id: id.to_string(),
            title: format!("title {id}"),
            price,
            category: String::new(),
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn renders_numbered_lines_and_total() {
        let view = BasketView::new(Arc::new(EventBus::new()));
        let text = view
            .render(&BasketViewData {
                items: vec![item("a", Some(100)), item("b", None)],
                total: 100,
            })
            .text;
        assert!(text.contains(" 1. title a  100 synapses"));
        assert!(text.contains(" 2. title b  Priceless"));
        assert!(text.contains("total  100 synapses"));
        assert!(text.ends_with("[checkout]"));
    }

    #[test]
    fn empty_basket_cannot_check_out() {
        let bus = Arc::new(EventBus::new());
        let opened = Arc::new(Mutex::new(0));
        let o = Arc::clone(&opened);
        bus.on(EventKind::OrderOpen, move |_| {
            *o.lock().unwrap() += 1;
            Ok(())
        });

        let view = BasketView::new(Arc::clone(&bus));
        view.render(&BasketViewData::default());
        assert!(!view.checkout());

        view.render(&BasketViewData {
            items: vec![item("a", Some(1))],
            total: 1,
        });
        assert!(view.checkout());
        assert_eq!(*opened.lock().unwrap(), 1);
    }

    #[test]
    fn remove_emits_id_of_line() {
        let bus = Arc::new(EventBus::new());
        let removed = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&removed);
        bus.on(EventKind::CardRemove, move |e| {
            if let Event::CardRemove { id } = e {
                r.lock().unwrap().push(id.clone());
            }
            Ok(())
        });

        let view = BasketView::new(Arc::clone(&bus));
        view.render(&BasketViewData {
            items: vec![item("a", None), item("b", None)],
            total: 0,
        });
        assert!(view.remove(2));
        assert!(!view.remove(0));
        assert!(!view.remove(3));
        assert_eq!(*removed.lock().unwrap(), vec!["b".to_string()]);
    }
}
