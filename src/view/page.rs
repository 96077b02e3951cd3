//! Page shell around the catalog.

use std::sync::{Arc, Mutex};

use super::{Mounted, View, lock};
use crate::events::{Event, EventBus};

/// The page shell: header with basket counter, gallery, lock state and an
/// optional notice line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    pub counter: usize,
    pub catalog: Vec<Mounted>,
    pub locked: bool,
    pub notice: Option<String>,
}

pub struct PageView {
    bus: Arc<EventBus>,
    data: Mutex<PageData>,
}

impl PageView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            data: Mutex::new(PageData::default()),
        }
    }

    pub fn set_counter(&self, counter: usize) {
        lock(&self.data).counter = counter;
    }

    pub fn set_catalog(&self, catalog: Vec<Mounted>) {
        lock(&self.data).catalog = catalog;
    }

    pub fn set_locked(&self, locked: bool) {
        lock(&self.data).locked = locked;
    }

    pub fn set_notice(&self, notice: Option<String>) {
        lock(&self.data).notice = notice;
    }

    pub fn snapshot(&self) -> PageData {
        lock(&self.data).clone()
    }

    pub fn open_basket(&self) {
        self.bus.emit(Event::BasketOpen);
    }

    pub fn refresh(&self) -> Mounted {
        draw(&lock(&self.data))
    }
}

impl View for PageView {
    type Snapshot = PageData;

    fn render(&self, snapshot: &PageData) -> Mounted {
        *lock(&self.data) = snapshot.clone();
        draw(snapshot)
    }
}

fn draw(data: &PageData) -> Mounted {
    let mut out = format!("web-larek                                  basket: {}\n", data.counter);
    if let Some(notice) = &data.notice {
        out.push_str(&format!("! {notice}\n"));
    }
    out.push('\n');
    if data.catalog.is_empty() {
        out.push_str("  (catalog is empty)");
    } else {
        let lines: Vec<&str> = data.catalog.iter().map(Mounted::as_str).collect();
        out.push_str(&lines.join("\n"));
    }
    Mounted::new("page", out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_counter_and_gallery() {
        let page = PageView::new(Arc::new(EventBus::new()));
        let text = page
            .render(&PageData {
                counter: 3,
                catalog: vec![
                    Mounted::new("card", "  1. one".to_string()),
                    Mounted::new("card", "  2. two".to_string()),
                ],
                locked: false,
                notice: None,
            })
            .text;
        assert!(text.contains("basket: 3"));
        assert!(text.contains("  1. one\n  2. two"));
    }

    #[test]
    fn notice_is_shown_until_cleared() {
        let page = PageView::new(Arc::new(EventBus::new()));
        page.set_notice(Some("Could not load the catalog".to_string()));
        assert!(page.refresh().text.contains("! Could not load the catalog"));
        page.set_notice(None);
        assert!(!page.refresh().text.contains("!"));
        assert_eq!(page.snapshot().notice, None);
    }
}
