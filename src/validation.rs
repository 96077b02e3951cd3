//! Order form validation.
//!
//! Every check is independent of the others; the result is recomputed from
//! scratch for the whole form each time.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FormErrors, OrderField, OrderForm};

/// Fields edited on the first checkout step.
pub const ORDER_STEP: [OrderField; 2] = [OrderField::Payment, OrderField::Address];

/// Fields edited on the contacts step.
pub const CONTACTS_STEP: [OrderField; 2] = [OrderField::Email, OrderField::Phone];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").expect("valid phone regex"));

pub fn is_valid_email(email: &str) -> bool {
    email.is_ascii() && EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_ascii() && PHONE_RE.is_match(phone)
}

/// Validate the full form.
pub fn validate(form: &OrderForm) -> FormErrors {
    let mut errors = FormErrors::new();

    if form.payment.is_none() {
        errors.insert(OrderField::Payment, "Select a payment method");
    }

    if form.address.trim().is_empty() {
        errors.insert(OrderField::Address, "Enter a delivery address");
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert(OrderField::Email, "Enter an email");
    } else if !is_valid_email(email) {
        errors.insert(OrderField::Email, "Invalid email");
    }

    let phone = form.phone.trim();
    if phone.is_empty() {
        errors.insert(OrderField::Phone, "Enter a phone number");
    } else if !is_valid_phone(phone) {
        errors.insert(OrderField::Phone, "Invalid phone number");
    }

    errors
}
