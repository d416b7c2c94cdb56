//! Product payload schemas.
//!
//! Rules are checked in a fixed order and the first violation is reported,
//! so clients always get a single, stable message per bad payload.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::database::models::{NewProduct, ProductPatch};

const FIELDS: &[&str] = &["name", "description", "price", "imageUrl"];
const MAX_TEXT_LENGTH: usize = 255;
const PRICE_SCALE: u32 = 2;
/// NUMERIC(12, 2)
const MAX_PRICE_CENTS: i64 = 999_999_999_999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("\"value\" must be of type object")]
    NotAnObject,
    #[error("\"value\" must have at least 1 key")]
    Empty,
    #[error("\"{0}\" is not allowed")]
    UnknownField(String),
    #[error("\"{0}\" is required")]
    Required(&'static str),
    #[error("\"{0}\" must be a string")]
    NotAString(&'static str),
    #[error("\"{0}\" is not allowed to be empty")]
    EmptyString(&'static str),
    #[error("\"{field}\" length must be less than or equal to {max} characters long")]
    TooLong { field: &'static str, max: usize },
    #[error("\"{0}\" must be a number")]
    NotANumber(&'static str),
    #[error("\"{0}\" must be greater than or equal to 0")]
    Negative(&'static str),
    #[error("\"{0}\" must be less than or equal to 9999999999.99")]
    TooLarge(&'static str),
    #[error("\"{0}\" must have no more than 2 decimal places")]
    Precision(&'static str),
    #[error("\"{0}\" must be a valid uri")]
    InvalidUri(&'static str),
}

/// Validate a create payload. Every field except `imageUrl` is required.
pub fn validate_new_product(body: &Value) -> Result<NewProduct, ValidationError> {
    let object = as_object(body)?;

    let product = NewProduct {
        name: required(object, "name", text)?,
        description: required(object, "description", text)?,
        price: required(object, "price", price)?,
        image_url: optional(object, "imageUrl", image_url)?,
    };
    reject_unknown(object)?;
    Ok(product)
}

/// Validate a partial update payload. Every field is optional but at least one must be present.
pub fn validate_product_patch(body: &Value) -> Result<ProductPatch, ValidationError> {
    let object = as_object(body)?;
    if object.is_empty() {
        return Err(ValidationError::Empty);
    }

    let patch = ProductPatch {
        name: optional(object, "name", text)?,
        description: optional(object, "description", text)?,
        price: optional(object, "price", price)?,
        image_url: optional(object, "imageUrl", image_url)?,
    };
    reject_unknown(object)?;
    Ok(patch)
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

/// Declared keys are checked first; extra keys are reported last
fn reject_unknown(object: &Map<String, Value>) -> Result<(), ValidationError> {
    match object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        Some(unknown) => Err(ValidationError::UnknownField(unknown.clone())),
        None => Ok(()),
    }
}

fn required<T>(
    object: &Map<String, Value>,
    field: &'static str,
    rule: fn(&'static str, &Value) -> Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    match object.get(field) {
        Some(value) => rule(field, value),
        None => Err(ValidationError::Required(field)),
    }
}

fn optional<T>(
    object: &Map<String, Value>,
    field: &'static str,
    rule: fn(&'static str, &Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    object.get(field).map(|value| rule(field, value)).transpose()
}

fn text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let s = value.as_str().ok_or(ValidationError::NotAString(field))?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyString(field));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong { field, max: MAX_TEXT_LENGTH });
    }
    Ok(trimmed.to_string())
}

fn price(field: &'static str, value: &Value) -> Result<Decimal, ValidationError> {
    let number = match value {
        Value::Number(n) => n,
        _ => return Err(ValidationError::NotANumber(field)),
    };
    // serde_json renders large or tiny floats in exponent form
    let rendered = number.to_string();
    let amount = match Decimal::from_str(&rendered).or_else(|_| Decimal::from_scientific(&rendered)) {
        Ok(amount) => amount,
        Err(_) => return Err(out_of_range(field, number.as_f64().unwrap_or(f64::INFINITY))),
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative(field));
    }
    if amount > Decimal::new(MAX_PRICE_CENTS, PRICE_SCALE) {
        return Err(ValidationError::TooLarge(field));
    }
    let amount = amount.normalize();
    if amount.scale() > PRICE_SCALE {
        return Err(ValidationError::Precision(field));
    }
    Ok(amount)
}

/// Rule for a JSON number `Decimal` cannot represent at all
fn out_of_range(field: &'static str, value: f64) -> ValidationError {
    if value < 0.0 {
        ValidationError::Negative(field)
    } else if value >= 1.0 {
        ValidationError::TooLarge(field)
    } else {
        // Tiny magnitudes only fail on scale
        ValidationError::Precision(field)
    }
}

fn image_url(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let raw = value.as_str().ok_or(ValidationError::NotAString(field))?.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyString(field));
    }
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(raw.to_string())
        }
        _ => Err(ValidationError::InvalidUri(field)),
    }
}
