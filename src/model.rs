//! Storefront domain types: products, the order form, orders and form errors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A catalog entry. Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// `None` for priceless items. Always serialized, as `null` when absent.
    pub price: Option<u64>,
    pub category: String,
    pub description: String,
    /// Absolute image URL.
    pub image: String,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payment {
    Card,
    Cash,
}

impl Payment {
    pub const ALL: [Payment; 2] = [Payment::Card, Payment::Cash];

    /// Wire name used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Payment::Card => "card",
            Payment::Cash => "cash",
        }
    }

    /// Human label shown on the order form.
    pub fn label(self) -> &'static str {
        match self {
            Payment::Card => "online",
            Payment::Cash => "upon receipt",
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Payment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" | "online" => Ok(Payment::Card),
            "cash" => Ok(Payment::Cash),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// One editable field of the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Payment,
    Address,
    Email,
    Phone,
}

impl OrderField {
    pub const ALL: [OrderField; 4] = [
        OrderField::Payment,
        OrderField::Address,
        OrderField::Email,
        OrderField::Phone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderField::Payment => "payment",
            OrderField::Address => "address",
            OrderField::Email => "email",
            OrderField::Phone => "phone",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The in-progress checkout draft. Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub payment: Option<Payment>,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl OrderForm {
    /// Store a field value. Strings are trimmed; an unrecognized payment clears it.
    pub fn set(&mut self, field: OrderField, value: &str) {
        let value = value.trim();
        match field {
            OrderField::Payment => self.payment = value.parse().ok(),
            OrderField::Address => self.address = value.to_string(),
            OrderField::Email => self.email = value.to_string(),
            OrderField::Phone => self.phone = value.to_string(),
        }
    }
}

/// Immutable order snapshot built from the basket and the form at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub items: Vec<String>,
    pub total: u64,
}

/// Server acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderResult {
    pub id: String,
    #[serde(default)]
    pub total: u64,
}

/// Field-level validation messages. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<OrderField, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: OrderField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Only the errors for `fields`.
    pub fn subset(&self, fields: &[OrderField]) -> FormErrors {
        FormErrors(
            self.0
                .iter()
                .filter(|(k, _)| fields.contains(k))
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
        )
    }

    /// Messages for `fields` joined into one line, in field order.
    pub fn summary(&self, fields: &[OrderField]) -> String {
        fields
            .iter()
            .filter_map(|f| self.get(*f))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Basket contents handed to listeners after every basket mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketSnapshot {
    pub items: Vec<Product>,
    pub total: u64,
}

impl BasketSnapshot {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|p| p.id == id)
    }
}

/// Sum of prices, priceless items counting as zero.
pub fn total_of(items: &[Product]) -> u64 {
    items
        .iter()
        .map(|p| p.price.unwrap_or(0))
        .fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: Option<u64>) -> Product {
        Product {
            id: id.to_string(),
            title: format!("item {id}"),
            price,
            category: "другое".to_string(),
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn priceless_product_serializes_explicit_null() {
        let json = serde_json::to_value(product("a", None)).unwrap();
        assert!(json.get("price").unwrap().is_null());
    }

    #[test]
    fn total_treats_null_as_zero() {
        let items = vec![
            product("a", Some(100)),
            product("b", None),
            product("c", Some(50)),
        ];
        assert_eq!(total_of(&items), 150);
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let items = vec![product("a", Some(u64::MAX)), product("b", Some(1))];
        assert_eq!(total_of(&items), u64::MAX);
    }

    #[test]
    fn payment_parses_wire_names() {
        assert_eq!("card".parse::<Payment>().unwrap(), Payment::Card);
        assert_eq!(" Cash ".parse::<Payment>().unwrap(), Payment::Cash);
        assert!("barter".parse::<Payment>().is_err());
    }

    #[test]
    fn form_set_trims_and_parses() {
        let mut form = OrderForm::default();
        form.set(OrderField::Email, "  a@b.co ");
        form.set(OrderField::Payment, "cash");
        assert_eq!(form.email, "a@b.co");
        assert_eq!(form.payment, Some(Payment::Cash));

        form.set(OrderField::Payment, "");
        assert_eq!(form.payment, None);
    }

    #[test]
    fn order_without_payment_omits_field() {
        let order = Order {
            payment: None,
            address: String::new(),
            email: "a@b.co".to_string(),
            phone: "+7 999 123 4567".to_string(),
            items: vec![],
            total: 0,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("payment").is_none());
    }

    #[test]
    fn errors_summary_follows_field_order() {
        let mut errors = FormErrors::new();
        errors.insert(OrderField::Phone, "bad phone");
        errors.insert(OrderField::Email, "bad email");
        errors.insert(OrderField::Address, "no address");

        assert_eq!(
            errors.summary(&[OrderField::Email, OrderField::Phone]),
            "bad email; bad phone"
        );
        assert_eq!(errors.subset(&[OrderField::Address]).len(), 1);
    }
}
