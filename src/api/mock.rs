use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{ApiError, LarekApi};
use crate::model::{Order, OrderResult, Product};

/// A scripted backend for tests. Catalog and order responses are consumed
/// in order; submitted orders are recorded.
#[derive(Default)]
pub struct MockApi {
    catalogs: Mutex<VecDeque<Result<Vec<Product>, String>>>,
    orders: Mutex<VecDeque<Result<OrderResult, String>>>,
    submitted: Mutex<Vec<Order>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful catalog response.
    pub fn with_catalog(self, items: Vec<Product>) -> Self {
        lock(&self.catalogs).push_back(Ok(items));
        self
    }

    /// Queue a failed catalog response.
    pub fn with_catalog_error(self, message: &str) -> Self {
        lock(&self.catalogs).push_back(Err(message.to_string()));
        self
    }

    /// Queue a successful order response.
    pub fn with_order(self, id: &str, total: u64) -> Self {
        lock(&self.orders).push_back(Ok(OrderResult {
            id: id.to_string(),
            total,
        }));
        self
    }

    /// Queue a failed order response.
    pub fn with_order_error(self, message: &str) -> Self {
        lock(&self.orders).push_back(Err(message.to_string()));
        self
    }

    /// Orders received so far, successful or not.
    pub fn submitted(&self) -> Vec<Order> {
        lock(&self.submitted).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn failure(message: String) -> ApiError {
    ApiError::Status {
        status: 500,
        body: message,
    }
}

#[async_trait]
impl LarekApi for MockApi {
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        lock(&self.catalogs)
            .pop_front()
            .ok_or_else(|| ApiError::Decode("MockApi: no catalog response scripted".to_string()))?
            .map_err(failure)
    }

    async fn product_item(&self, id: &str) -> Result<Product, ApiError> {
        let catalogs = lock(&self.catalogs);
        catalogs
            .iter()
            .filter_map(|c| c.as_ref().ok())
            .flatten()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("product {id} not found"),
            })
    }

    async fn order_products(&self, order: &Order) -> Result<OrderResult, ApiError> {
        lock(&self.submitted).push(order.clone());
        lock(&self.orders)
            .pop_front()
            .ok_or_else(|| ApiError::Decode("MockApi: no order response scripted".to_string()))?
            .map_err(failure)
    }
}
