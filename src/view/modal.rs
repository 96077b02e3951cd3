//! Modal container that frames whatever content is open.

use std::sync::{Arc, Mutex};

use super::{Mounted, View, lock};
use crate::events::{Event, EventBus};

#[derive(Default)]
struct Inner {
    content: Option<Mounted>,
}

/// Hosts one piece of mounted content at a time on top of the page.
pub struct ModalView {
    bus: Arc<EventBus>,
    inner: Mutex<Inner>,
}

impl ModalView {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).content.is_some()
    }

    /// Region of the content currently shown, if open.
    pub fn showing(&self) -> Option<&'static str> {
        lock(&self.inner).content.as_ref().map(|c| c.region)
    }

    pub fn content(&self) -> Option<Mounted> {
        lock(&self.inner).content.clone()
    }

    /// Swap the content of an open modal without re-announcing it.
    /// Returns the framed result, or `None` when the modal is closed.
    pub fn replace(&self, content: Mounted) -> Option<Mounted> {
        let mut inner = lock(&self.inner);
        if inner.content.is_none() {
            return None;
        }
        let framed = Mounted::new("modal", framed(&content));
        inner.content = Some(content);
        Some(framed)
    }

    /// Drop the content without announcing it.
    pub fn clear(&self) {
        lock(&self.inner).content = None;
    }

    /// Close the modal. Closing an already closed modal does nothing.
    pub fn close(&self) -> bool {
        if lock(&self.inner).content.take().is_none() {
            return false;
        }
        self.bus.emit(Event::ModalClose);
        true
    }
}

impl View for ModalView {
    type Snapshot = Mounted;

    /// Show `content`, opening the modal if it was closed.
    fn render(&self, content: &Mounted) -> Mounted {
        let was_open = {
            let mut inner = lock(&self.inner);
            inner.content.replace(content.clone()).is_some()
        };
        if !was_open {
            self.bus.emit(Event::ModalOpen);
        }
        Mounted::new("modal", framed(content))
    }
}

fn framed(content: &Mounted) -> String {
    let width = content
        .text
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(20);
    let rule = "─".repeat(width + 2);
    let mut out = format!("┌{rule}┐\n");
    for line in content.text.lines() {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("└{rule}┘"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn open_and_close_emit_once() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [EventKind::ModalOpen, EventKind::ModalClose] {
            let s = Arc::clone(&seen);
            bus.on(kind, move |e| {
                s.lock().unwrap().push(e.kind());
                Ok(())
            });
        }

        let modal = ModalView::new(Arc::clone(&bus));
        modal.render(&Mounted::new("basket", "one".to_string()));
        modal.render(&Mounted::new("order", "two".to_string()));
        assert_eq!(modal.showing(), Some("order"));

        assert!(modal.close());
        assert!(!modal.close());
        assert!(!modal.is_open());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::ModalOpen, EventKind::ModalClose]
        );
    }

    #[test]
    fn replace_keeps_closed_modal_closed() {
        let modal = ModalView::new(Arc::new(EventBus::new()));
        assert!(modal.replace(Mounted::new("basket", "x".to_string())).is_none());
        assert!(!modal.is_open());
    }

    #[test]
    fn frame_wraps_every_line() {
        let framed = framed(&Mounted::new("x", "ab\nc".to_string()));
        assert_eq!(framed.lines().count(), 4);
        assert!(framed.contains("│ ab"));
    }
}
