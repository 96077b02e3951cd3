//! The authoritative application state.
//!
//! [`AppState`] owns the catalog, basket, order form, form errors and preview
//! selection. Every mutation goes through its methods, which announce the
//! change on the [`EventBus`]. The internal lock is released before any
//! event is emitted, so handlers can read the state back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;
use crate::events::{Event, EventBus};
use crate::model::{BasketSnapshot, FormErrors, Order, OrderField, OrderForm, Product, total_of};
use crate::storage::Storage;
use crate::validation;

/// Storage key of the persisted basket.
pub const BASKET_KEY: &str = "basket";

#[derive(Default)]
struct Inner {
    catalog: Vec<Product>,
    basket: Vec<Product>,
    order: OrderForm,
    preview: Option<String>,
    errors: FormErrors,
}

impl Inner {
    fn basket_snapshot(&self) -> BasketSnapshot {
        BasketSnapshot {
            items: self.basket.clone(),
            total: total_of(&self.basket),
        }
    }
}

pub struct AppState {
    inner: Mutex<Inner>,
    bus: Arc<EventBus>,
    storage: Box<dyn Storage>,
}

impl AppState {
    /// Create the state, restoring the basket from `storage`.
    /// Unreadable or corrupt basket data is discarded.
    pub fn load(bus: Arc<EventBus>, storage: Box<dyn Storage>) -> Self {
        let basket = load_basket(storage.as_ref());
        tracing::debug!(items = basket.len(), "basket restored");
        Self {
            inner: Mutex::new(Inner {
                basket,
                ..Inner::default()
            }),
            bus,
            storage,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Catalog & preview ---

    /// Replace the catalog wholesale.
    pub fn set_catalog(&self, items: Vec<Product>) {
        let count = items.len();
        self.lock().catalog = items;
        tracing::info!(count, "catalog replaced");
        self.bus.emit(Event::CatalogChanged);
    }

    /// Select the product shown in detail view. Unknown ids are rejected
    /// and leave the current preview untouched.
    pub fn set_preview(&self, id: &str) -> Result<Product, StoreError> {
        let product = {
            let mut inner = self.lock();
            let product = inner
                .catalog
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| StoreError::UnknownProduct(id.to_string()))?;
            inner.preview = Some(product.id.clone());
            product
        };
        self.bus.emit(Event::PreviewChanged(product.clone()));
        Ok(product)
    }

    // --- Basket ---

    /// Add a product unless one with the same id is already present.
    /// Returns whether the basket changed.
    pub fn add_to_basket(&self, product: Product) -> bool {
        {
            let mut inner = self.lock();
            if inner.basket.iter().any(|p| p.id == product.id) {
                return false;
            }
            inner.basket.push(product);
        }
        self.basket_updated();
        true
    }

    /// Remove every entry with `id`. Absent ids are fine.
    pub fn remove_from_basket(&self, id: &str) {
        self.lock().basket.retain(|p| p.id != id);
        self.basket_updated();
    }

    /// Empty the basket and drop its persisted copy.
    pub fn clear_basket(&self) {
        self.lock().basket.clear();
        if let Err(e) = self.storage.remove(BASKET_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted basket");
        }
        self.publish_basket();
    }

    /// Announce the current basket without changing it.
    pub fn publish_basket(&self) {
        let snapshot = self.lock().basket_snapshot();
        self.bus.emit(Event::BasketChanged(snapshot));
    }

    fn basket_updated(&self) {
        self.save_basket();
        self.publish_basket();
    }

    fn save_basket(&self) {
        let json = match serde_json::to_string(&self.lock().basket) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize basket");
                return;
            }
        };
        if let Err(e) = self.storage.set(BASKET_KEY, &json) {
            tracing::warn!(error = %e, "failed to persist basket");
        }
    }

    // --- Order form ---

    /// Store one form field, revalidate the whole form and publish the
    /// complete error mapping.
    pub fn update_field(&self, field: OrderField, value: &str) {
        let errors = {
            let mut inner = self.lock();
            inner.order.set(field, value);
            inner.errors = validation::validate(&inner.order);
            inner.errors.clone()
        };
        tracing::debug!(%field, errors = errors.len(), "order field updated");
        self.bus.emit(Event::FormErrorsChanged(errors));
    }

    /// Build an order snapshot from the basket and the form.
    /// Email and phone are required; nothing is mutated.
    pub fn prepare_order(&self) -> Result<Order, StoreError> {
        let inner = self.lock();
        if inner.order.email.is_empty() || inner.order.phone.is_empty() {
            return Err(StoreError::IncompleteOrder);
        }
        Ok(Order {
            payment: inner.order.payment,
            address: inner.order.address.clone(),
            email: inner.order.email.clone(),
            phone: inner.order.phone.clone(),
            items: inner.basket.iter().map(|p| p.id.clone()).collect(),
            total: total_of(&inner.basket),
        })
    }

    /// Clear the form and its errors.
    pub fn reset_order_form(&self) {
        {
            let mut inner = self.lock();
            inner.order = OrderForm::default();
            inner.errors = FormErrors::new();
        }
        self.bus.emit(Event::FormErrorsChanged(FormErrors::new()));
    }

    // --- Getters ---

    pub fn total(&self) -> u64 {
        total_of(&self.lock().basket)
    }

    pub fn catalog(&self) -> Vec<Product> {
        self.lock().catalog.clone()
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.lock().catalog.iter().find(|p| p.id == id).cloned()
    }

    pub fn basket(&self) -> Vec<Product> {
        self.lock().basket.clone()
    }

    pub fn basket_snapshot(&self) -> BasketSnapshot {
        self.lock().basket_snapshot()
    }

    pub fn in_basket(&self, id: &str) -> bool {
        self.lock().basket.iter().any(|p| p.id == id)
    }

    pub fn order_form(&self) -> OrderForm {
        self.lock().order.clone()
    }

    pub fn form_errors(&self) -> FormErrors {
        self.lock().errors.clone()
    }

    pub fn preview(&self) -> Option<String> {
        self.lock().preview.clone()
    }
}

fn load_basket(storage: &dyn Storage) -> Vec<Product> {
    let raw = match storage.get(BASKET_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read persisted basket");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Product>>(&raw) {
        Ok(mut items) => {
            // Older snapshots may hold duplicates; keep the first of each id.
            let mut seen = std::collections::HashSet::new();
            items.retain(|p| seen.insert(p.id.clone()));
            items
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding corrupt basket");
            if let Err(e) = storage.remove(BASKET_KEY) {
                tracing::warn!(error = %e, "failed to remove corrupt basket");
            }
            Vec::new()
        }
    }
}
