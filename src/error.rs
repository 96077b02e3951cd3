//! Errors raised by the application state.

use thiserror::Error;

/// Failures of [`AppState`](crate::state::AppState) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The id does not resolve to a product in the current catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// An order was requested while email or phone is still empty.
    /// Validation should have blocked submission before this point.
    #[error("contact details are incomplete")]
    IncompleteOrder,
}
