pub mod http;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Order, OrderResult, Product};

/// Failures talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (DNS, connect, TLS, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The two (plus one) backend operations the storefront needs.
/// Each call is a single round trip; there is no retry.
#[async_trait]
pub trait LarekApi: Send + Sync {
    /// Fetch the full catalog with absolute image URLs.
    async fn product_list(&self) -> Result<Vec<Product>, ApiError>;

    /// Fetch one product by id.
    async fn product_item(&self, id: &str) -> Result<Product, ApiError>;

    /// Place an order and return the server-assigned id.
    async fn order_products(&self, order: &Order) -> Result<OrderResult, ApiError>;
}
