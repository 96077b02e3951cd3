//! Synchronous event bus for cross-component communication.
//!
//! Components emit typed [`Event`]s via [`EventBus::emit`] and subscribe
//! handlers via [`EventBus::subscribe`] with a [`Pattern`]: one event kind,
//! a regex over event names, or everything. Dispatch runs on the caller's
//! stack; the handler set is snapshotted first, so handlers are free to
//! emit, subscribe or unsubscribe while being invoked.

use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use regex::Regex;

use crate::model::{BasketSnapshot, FormErrors, OrderResult, Payment, Product};

/// Nested emits deeper than this are dropped.
pub const MAX_DISPATCH_DEPTH: usize = 32;

/// Which backend call a [`Event::RequestFailed`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Catalog,
    Order,
}

/// Events that flow through the storefront.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The catalog was replaced. Listeners re-read it from the state.
    CatalogChanged,
    /// A product was resolved as the current preview.
    PreviewChanged(Product),
    /// The user picked a card to look at.
    CardSelect(Product),
    /// The user asked to put a product in the basket.
    CardAdd(Product),
    /// The user asked to take a product out of the basket.
    CardRemove { id: String },
    /// Basket contents changed (or were announced at startup).
    BasketChanged(BasketSnapshot),
    BasketOpen,
    OrderOpen,
    PaymentChanged { payment: Option<Payment> },
    AddressChanged { address: String },
    EmailChanged { email: String },
    PhoneChanged { phone: String },
    ContactsOpen,
    OrderSubmit,
    /// Complete current error mapping after a form change.
    FormErrorsChanged(FormErrors),
    OrderSuccess(OrderResult),
    /// A network operation failed; carries a user-facing message.
    RequestFailed { request: Request, message: String },
    ModalOpen,
    ModalClose,
}

/// Fieldless mirror of [`Event`], used for exact subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CatalogChanged,
    PreviewChanged,
    CardSelect,
    CardAdd,
    CardRemove,
    BasketChanged,
    BasketOpen,
    OrderOpen,
    PaymentChanged,
    AddressChanged,
    EmailChanged,
    PhoneChanged,
    ContactsOpen,
    OrderSubmit,
    FormErrorsChanged,
    OrderSuccess,
    RequestFailed,
    ModalOpen,
    ModalClose,
}

impl EventKind {
    /// Canonical event name, matched by [`Pattern::Matches`].
    pub fn name(self) -> &'static str {
        match self {
            EventKind::CatalogChanged => "catalog:changed",
            EventKind::PreviewChanged => "preview:changed",
            EventKind::CardSelect => "card:select",
            EventKind::CardAdd => "card:add",
            EventKind::CardRemove => "card:remove",
            EventKind::BasketChanged => "basket:changed",
            EventKind::BasketOpen => "basket:open",
            EventKind::OrderOpen => "order:open",
            EventKind::PaymentChanged => "order.payment:change",
            EventKind::AddressChanged => "order.address:change",
            EventKind::EmailChanged => "contacts.email:change",
            EventKind::PhoneChanged => "contacts.phone:change",
            EventKind::ContactsOpen => "contacts:open",
            EventKind::OrderSubmit => "order:submit",
            EventKind::FormErrorsChanged => "formErrors:change",
            EventKind::OrderSuccess => "order:success",
            EventKind::RequestFailed => "request:failed",
            EventKind::ModalOpen => "modal:open",
            EventKind::ModalClose => "modal:close",
        }
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CatalogChanged => EventKind::CatalogChanged,
            Event::PreviewChanged(_) => EventKind::PreviewChanged,
            Event::CardSelect(_) => EventKind::CardSelect,
            Event::CardAdd(_) => EventKind::CardAdd,
            Event::CardRemove { .. } => EventKind::CardRemove,
            Event::BasketChanged(_) => EventKind::BasketChanged,
            Event::BasketOpen => EventKind::BasketOpen,
            Event::OrderOpen => EventKind::OrderOpen,
            Event::PaymentChanged { .. } => EventKind::PaymentChanged,
            Event::AddressChanged { .. } => EventKind::AddressChanged,
            Event::EmailChanged { .. } => EventKind::EmailChanged,
            Event::PhoneChanged { .. } => EventKind::PhoneChanged,
            Event::ContactsOpen => EventKind::ContactsOpen,
            Event::OrderSubmit => EventKind::OrderSubmit,
            Event::FormErrorsChanged(_) => EventKind::FormErrorsChanged,
            Event::OrderSuccess(_) => EventKind::OrderSuccess,
            Event::RequestFailed { .. } => EventKind::RequestFailed,
            Event::ModalOpen => EventKind::ModalOpen,
            Event::ModalClose => EventKind::ModalClose,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Which events a handler wants.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exactly one event kind.
    Kind(EventKind),
    /// Every event whose name matches the regex.
    Matches(Regex),
    /// Every event.
    All,
}

impl Pattern {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Pattern::Kind(kind) => event.kind() == *kind,
            Pattern::Matches(re) => re.is_match(event.name()),
            Pattern::All => true,
        }
    }

    fn key(&self) -> PatternKey {
        match self {
            Pattern::Kind(kind) => PatternKey::Kind(*kind),
            Pattern::Matches(re) => PatternKey::Regex(re.as_str().to_string()),
            Pattern::All => PatternKey::All,
        }
    }
}

impl From<EventKind> for Pattern {
    fn from(kind: EventKind) -> Self {
        Pattern::Kind(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PatternKey {
    Kind(EventKind),
    Regex(String),
    All,
}

/// A subscribed callback. Errors are logged by the bus, never propagated.
pub type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Identifies one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Subscription {
    id: HandlerId,
    handler: Handler,
}

struct Entry {
    pattern: Pattern,
    subs: Vec<Subscription>,
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Routes events to every handler whose pattern matches.
#[derive(Default)]
pub struct EventBus {
    entries: Mutex<HashMap<PatternKey, Entry>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`. Registering the same handler for the
    /// same pattern again is a no-op and returns the original id.
    pub fn subscribe(&self, pattern: impl Into<Pattern>, handler: Handler) -> HandlerId {
        let pattern = pattern.into();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(pattern.key()).or_insert_with(|| Entry {
            pattern,
            subs: Vec::new(),
        });

        if let Some(existing) = entry
            .subs
            .iter()
            .find(|s| Arc::ptr_eq(&s.handler, &handler))
        {
            return existing.id;
        }

        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entry.subs.push(Subscription { id, handler });
        id
    }

    /// Convenience wrapper boxing a closure into a [`Handler`].
    pub fn on<F>(&self, pattern: impl Into<Pattern>, f: F) -> HandlerId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(pattern, Arc::new(f))
    }

    /// Subscribe to every event.
    pub fn on_all(&self, handler: Handler) -> HandlerId {
        self.subscribe(Pattern::All, handler)
    }

    /// Remove `handler` from `pattern`. Unknown handlers are ignored.
    pub fn unsubscribe(&self, pattern: &Pattern, handler: &Handler) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = pattern.key();
        if let Some(entry) = entries.get_mut(&key) {
            entry.subs.retain(|s| !Arc::ptr_eq(&s.handler, handler));
            if entry.subs.is_empty() {
                entries.remove(&key);
            }
        }
    }

    /// Remove a subscription by id.
    pub fn unsubscribe_id(&self, id: HandlerId) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| {
            entry.subs.retain(|s| s.id != id);
            !entry.subs.is_empty()
        });
    }

    /// Dispatch `event` to all matching handlers, in unspecified order.
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: Event) -> usize {
        let depth = DEPTH.with(Cell::get);
        if depth >= MAX_DISPATCH_DEPTH {
            tracing::error!(
                event = event.name(),
                depth,
                "event dispatch too deep, dropping event"
            );
            return 0;
        }

        let handlers: Vec<Handler> = {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .values()
                .filter(|entry| entry.pattern.matches(&event))
                .flat_map(|entry| entry.subs.iter().map(|s| Arc::clone(&s.handler)))
                .collect()
        };

        DEPTH.with(|d| d.set(depth + 1));
        for handler in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(event = event.name(), error = %e, "event handler failed");
                }
                Err(_) => {
                    tracing::error!(event = event.name(), "event handler panicked");
                }
            }
        }
        DEPTH.with(|d| d.set(depth));

        handlers.len()
    }

    /// A closure that emits a clone of `event` each time it is called.
    pub fn trigger(self: &Arc<Self>, event: Event) -> impl Fn() -> usize + use<> {
        let bus = Arc::clone(self);
        move || bus.emit(event.clone())
    }

    /// Drop every subscription.
    pub fn destroy(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|e| e.subs.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handler: Handler = Arc::new(move |_: &Event| -> anyhow::Result<()> {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (count, handler)
    }

    #[test]
    fn emit_reaches_exact_subscriber() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        bus.subscribe(EventKind::BasketOpen, handler);

        bus.emit(Event::BasketOpen);
        bus.emit(Event::OrderOpen);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_registration_fires_once() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        let first = bus.subscribe(EventKind::ModalOpen, Arc::clone(&handler));
        let second = bus.subscribe(EventKind::ModalOpen, handler);

        assert_eq!(first, second);
        assert_eq!(bus.emit(Event::ModalOpen), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_handler_never_fires() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        let pattern = Pattern::Kind(EventKind::ModalClose);
        bus.subscribe(pattern.clone(), Arc::clone(&handler));
        bus.unsubscribe(&pattern, &handler);

        assert_eq!(bus.emit(Event::ModalClose), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(bus.is_empty());
    }

    #[test]
    fn unsubscribe_by_id() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        let id = bus.subscribe(EventKind::ModalClose, handler);
        bus.unsubscribe_id(id);

        bus.emit(Event::ModalClose);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wildcard_sees_every_event() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        bus.on_all(handler);

        bus.emit(Event::CatalogChanged);
        bus.emit(Event::OrderSubmit);
        bus.emit(Event::CardRemove {
            id: "x".to_string(),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn regex_pattern_matches_names() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        bus.subscribe(Pattern::Matches(Regex::new(r"^contacts\.").unwrap()), handler);

        bus.emit(Event::EmailChanged {
            email: "a@b.co".to_string(),
        });
        bus.emit(Event::PhoneChanged {
            phone: "1".to_string(),
        });
        bus.emit(Event::AddressChanged {
            address: "x".to_string(),
        });

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_handler_does_not_block_others() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        bus.on(EventKind::OrderSubmit, |_| anyhow::bail!("boom"));
        bus.on(EventKind::OrderSubmit, |_| panic!("worse"));
        bus.subscribe(EventKind::OrderSubmit, handler);

        assert_eq!(bus.emit(Event::OrderSubmit), 3);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let id_cell: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));

        let id = {
            let bus_ref = Arc::clone(&bus);
            let count = Arc::clone(&count);
            let id_cell = Arc::clone(&id_cell);
            bus.on(EventKind::CatalogChanged, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *id_cell.lock().unwrap() {
                    bus_ref.unsubscribe_id(id);
                }
                Ok(())
            })
        };
        *id_cell.lock().unwrap() = Some(id);

        bus.emit(Event::CatalogChanged);
        bus.emit(Event::CatalogChanged);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.destroy();
    }

    #[test]
    fn runaway_reentrant_emit_is_bounded() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        {
            let bus_ref = Arc::clone(&bus);
            let count = Arc::clone(&count);
            bus.on(EventKind::ModalOpen, move |event| {
                count.fetch_add(1, Ordering::SeqCst);
                bus_ref.emit(event.clone());
                Ok(())
            });
        }

        bus.emit(Event::ModalOpen);
        assert_eq!(count.load(Ordering::SeqCst), MAX_DISPATCH_DEPTH);
        bus.destroy();
    }

    #[test]
    fn trigger_emits_clone() {
        let bus = Arc::new(EventBus::new());
        let (count, handler) = counter();
        bus.subscribe(EventKind::BasketOpen, handler);

        let open = bus.trigger(Event::BasketOpen);
        open();
        open();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn destroy_clears_everything() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        bus.on_all(handler);
        bus.destroy();

        assert_eq!(bus.emit(Event::CatalogChanged), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn event_names_are_distinct() {
        let events = [
            Event::CatalogChanged,
            Event::BasketOpen,
            Event::OrderOpen,
            Event::ContactsOpen,
            Event::OrderSubmit,
            Event::ModalOpen,
            Event::ModalClose,
        ];
        let mut seen = Vec::new();
        for e in &events {
            assert!(!seen.contains(&e.name()), "duplicate name: {}", e.name());
            seen.push(e.name());
        }
    }
}
