use std::str::FromStr;

use crate::models::Side;
use crate::service::QuoteRequest;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Response for GET /
#[derive(Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
}

/// Error envelope shared by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    pub extra: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            error: "required",
        }
    }

    fn invalid(field: &'static str) -> Self {
        Self {
            field,
            error: "invalid",
        }
    }
}

const REQUIRED_FIELDS: [&str; 4] = ["action", "base_currency", "quote_currency", "amount"];

/// Shallow validation of a POST /quote body. Collects every problem instead
/// of stopping at the first one.
pub fn parse_quote_request(body: &Value) -> Result<QuoteRequest, Vec<FieldError>> {
    let mut errors: Vec<FieldError> = REQUIRED_FIELDS
        .iter()
        .filter(|field| body.get(*field).is_none_or(Value::is_null))
        .map(|field| FieldError::required(*field))
        .collect();

    let action = body
        .get("action")
        .filter(|v| !v.is_null())
        .map(|v| v.as_str().and_then(|s| Side::from_str(s).ok()));
    if let Some(None) = action {
        errors.push(FieldError::invalid("action"));
    }

    let base_currency = currency(body, "base_currency", &mut errors);
    let quote_currency = currency(body, "quote_currency", &mut errors);

    let amount = body
        .get("amount")
        .filter(|v| !v.is_null())
        .map(parse_decimal);
    if let Some(None) = amount {
        errors.push(FieldError::invalid("amount"));
    }

    match (action, base_currency, quote_currency, amount) {
        (Some(Some(action)), Some(base_currency), Some(quote_currency), Some(Some(amount)))
            if errors.is_empty() =>
        {
            Ok(QuoteRequest {
                action,
                base_currency,
                quote_currency,
                amount,
            })
        }
        _ => Err(errors),
    }
}

fn currency(body: &Value, field: &'static str, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = body.get(field).filter(|v| !v.is_null())?;
    match value.as_str().map(str::trim) {
        Some(code) if !code.is_empty() => Some(code.to_uppercase()),
        _ => {
            errors.push(FieldError::invalid(field));
            None
        }
    }
}

/// Accepts "1.5" as well as 1.5 or 1e3
fn parse_decimal(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}
