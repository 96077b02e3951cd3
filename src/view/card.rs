//! Product card, used both in the catalog gallery and as the preview.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use super::{Mounted, View, format_price, lock};
use crate::consts::category_class;
use crate::events::{Event, EventBus};
use crate::model::Product;

/// Compact gallery tile or full preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    Catalog,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub product: Product,
    pub in_basket: bool,
    /// 1-based position in the gallery, shown as the card's handle.
    pub position: Option<usize>,
}

/// A product card. Selecting it asks for a preview; its button toggles
/// basket membership.
pub struct CardView {
    bus: Arc<EventBus>,
    mode: CardMode,
    data: Mutex<Option<CardData>>,
}

impl CardView {
    pub fn new(bus: Arc<EventBus>, mode: CardMode) -> Self {
        Self {
            bus,
            mode,
            data: Mutex::new(None),
        }
    }

    pub fn product(&self) -> Option<Product> {
        lock(&self.data).as_ref().map(|d| d.product.clone())
    }

    pub fn button_label(&self) -> &'static str {
        match lock(&self.data).as_ref() {
            Some(d) if d.in_basket => "Remove",
            _ => "Add to basket",
        }
    }

    /// Ask for this card's product to be shown in detail.
    pub fn select(&self) -> bool {
        let Some(product) = self.product() else {
            return false;
        };
        self.bus.emit(Event::CardSelect(product));
        true
    }

    /// Press the card button: add when absent, remove when present.
    pub fn press(&self) -> bool {
        let Some(data) = lock(&self.data).clone() else {
            return false;
        };
        if data.in_basket {
            self.bus.emit(Event::CardRemove {
                id: data.product.id,
            });
        } else {
            self.bus.emit(Event::CardAdd(data.product));
        }
        true
    }
}

impl View for CardView {
    type Snapshot = CardData;

    fn render(&self, snapshot: &CardData) -> Mounted {
        *lock(&self.data) = Some(snapshot.clone());
        let p = &snapshot.product;
        let button = if snapshot.in_basket {
            "Remove"
        } else {
            "Add to basket"
        };

        let mut out = String::new();
        match self.mode {
            CardMode::Catalog => {
                let handle = snapshot
                    .position
                    .map(|n| format!("{n:>3}. "))
                    .unwrap_or_default();
                let mark = if snapshot.in_basket { " ✓" } else { "" };
                let _ = write!(
                    out,
                    "{handle}[{}] {} · {}{mark}",
                    category_class(&p.category),
                    p.title,
                    format_price(p.price),
                );
            }
            CardMode::Preview => {
                let _ = writeln!(out, "{}", p.title);
                let _ = writeln!(out, "  category  {}", p.category);
                let _ = writeln!(out, "  price     {}", format_price(p.price));
                let _ = writeln!(out, "  image     {}", p.image);
                if !p.description.is_empty() {
                    let _ = writeln!(out, "\n  {}", p.description);
                }
                let _ = write!(out, "\n  [{button}]");
            }
        }
        Mounted::new("card", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn data(in_basket: bool, price: Option<u64>) -> CardData {
        CardData {
            product: Product {
                id: "p1".to_string(),
                title: "Бэкенд-антистресс".to_string(),
                price,
                category: "другое".to_string(),
                description: "Сжимайте".to_string(),
                image: "https://cdn.test/Shell.svg".to_string(),
            },
            in_basket,
            position: Some(2),
        }
    }

    #[test]
    fn catalog_card_shows_position_and_price() {
        let card = CardView::new(Arc::new(EventBus::new()), CardMode::Catalog);
        let mounted = card.render(&data(false, Some(1000)));
        assert!(mounted.text.starts_with("  2. [other]"));
        assert!(mounted.text.contains("1,000 synapses"));
    }

    #[test]
    fn preview_shows_button_for_membership() {
        let card = CardView::new(Arc::new(EventBus::new()), CardMode::Preview);
        assert!(card.render(&data(true, None)).text.contains("[Remove]"));
        assert!(card.render(&data(false, None)).text.contains("[Add to basket]"));
        assert!(card.render(&data(false, None)).text.contains("Priceless"));
    }

    #[test]
    fn press_toggles_between_add_and_remove() {
        let bus = Arc::new(EventBus::new());
        let adds = Arc::new(AtomicUsize::new(0));
        let removes = Arc::new(AtomicUsize::new(0));
        {
            let adds = Arc::clone(&adds);
            bus.on(EventKind::CardAdd, move |_| {
                adds.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let removes = Arc::clone(&removes);
            bus.on(EventKind::CardRemove, move |_| {
                removes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let card = CardView::new(Arc::clone(&bus), CardMode::Preview);
        assert!(!card.press(), "unrendered card has nothing to press");

        card.render(&data(false, Some(1)));
        card.press();
        card.render(&data(true, Some(1)));
        card.press();

        assert_eq!(adds.load(Ordering::SeqCst), 1);
        assert_eq!(removes.load(Ordering::SeqCst), 1);
    }
}
