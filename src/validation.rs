//! Request validation, independent of persistence. Multipart forms arrive as
//! string fields; these parsers turn them into typed inputs or a 400-worthy
//! error.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::db::models::{OrderItem, PaymentMethod};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A validated medicine create payload.
#[derive(Debug, Clone)]
pub struct MedicineInput {
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub price: f64,
    pub quantity: i64,
    pub expiry: NaiveDate,
    pub description: String,
    pub prescription_required: bool,
}

/// A validated medicine update: only the supplied fields are overwritten.
#[derive(Debug, Clone, Default)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub expiry: Option<NaiveDate>,
    pub description: Option<String>,
    pub prescription_required: Option<bool>,
}

impl MedicineUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.manufacturer.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.expiry.is_none()
            && self.description.is_none()
            && self.prescription_required.is_none()
    }
}

/// A validated order create payload.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub customer: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub address: String,
    pub payment_method: PaymentMethod,
}

pub fn parse_medicine(fields: &HashMap<String, String>) -> Result<MedicineInput, ValidationError> {
    const REQUIRED: [&str; 6] = [
        "name",
        "category",
        "price",
        "quantity",
        "expiry",
        "manufacturer",
    ];
    if REQUIRED.iter().any(|key| text(fields, key).is_none()) {
        return Err(ValidationError::new("All fields are required"));
    }

    Ok(MedicineInput {
        name: text(fields, "name").unwrap_or_default(),
        category: text(fields, "category").unwrap_or_default(),
        manufacturer: text(fields, "manufacturer").unwrap_or_default(),
        price: parse_price(&fields["price"])?,
        quantity: parse_quantity(&fields["quantity"])?,
        expiry: parse_expiry(&fields["expiry"])?,
        description: text(fields, "description").unwrap_or_default(),
        prescription_required: fields
            .get("prescriptionRequired")
            .map(|s| parse_bool(s))
            .unwrap_or(false),
    })
}

pub fn parse_medicine_update(
    fields: &HashMap<String, String>,
) -> Result<MedicineUpdate, ValidationError> {
    Ok(MedicineUpdate {
        name: text(fields, "name"),
        category: text(fields, "category"),
        manufacturer: text(fields, "manufacturer"),
        price: fields.get("price").map(|s| parse_price(s)).transpose()?,
        quantity: fields
            .get("quantity")
            .map(|s| parse_quantity(s))
            .transpose()?,
        expiry: fields.get("expiry").map(|s| parse_expiry(s)).transpose()?,
        description: fields.get("description").cloned(),
        prescription_required: fields.get("prescriptionRequired").map(|s| parse_bool(s)),
    })
}

pub fn parse_order(fields: &HashMap<String, String>) -> Result<OrderInput, ValidationError> {
    let customer = text(fields, "customer")
        .ok_or_else(|| ValidationError::new("Customer is required"))?;
    let address =
        text(fields, "address").ok_or_else(|| ValidationError::new("Address is required"))?;
    let payment_method: PaymentMethod = text(fields, "paymentMethod")
        .ok_or_else(|| ValidationError::new("Payment method is required"))?
        .parse()
        .map_err(ValidationError::new)?;
    let total = text(fields, "total")
        .ok_or_else(|| ValidationError::new("Total is required"))?
        .parse::<f64>()
        .map_err(|_| ValidationError::new("Total must be a number"))?;

    // The storefront serializes the cart into a JSON string form field.
    let items = match fields.get("items") {
        Some(raw) => serde_json::from_str::<Vec<OrderItem>>(raw)
            .map_err(|_| ValidationError::new("Items must be a valid JSON array"))?,
        None => Vec::new(),
    };

    Ok(OrderInput {
        customer,
        items,
        total,
        address,
        payment_method,
    })
}

/// Trimmed, non-empty text field.
fn text(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| *p >= 0.0 && p.is_finite())
        .ok_or_else(|| ValidationError::new("Price must be a non-negative number"))
}

fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|q| *q >= 0)
        .ok_or_else(|| ValidationError::new("Quantity must be a non-negative number"))
}

/// Accepts a plain date ("2027-01-31") or an RFC 3339 timestamp.
fn parse_expiry(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::new("Invalid expiry date"))
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1" | "on")
}
