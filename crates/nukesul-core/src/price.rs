//! Loosely-typed price values.
//!
//! The catalog API is not consistent about how it encodes money: the same
//! field may arrive as a JSON number (`100`), a decimal string (`"100.00"`),
//! `null`, or be missing entirely. Carts persisted by older clients carry the
//! same mix. [`PriceValue`] keeps the raw JSON so a persisted cart round-trips
//! byte-for-byte, and coerces to [`Decimal`] only when arithmetic is needed.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A price exactly as the API (or a persisted cart) delivered it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceValue(Value);

impl PriceValue {
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn null() -> Self {
        Self(Value::Null)
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Numeric value of the price; anything non-numeric counts as zero.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match &self.0 {
            Value::Number(n) => parse_decimal(&n.to_string()).unwrap_or(Decimal::ZERO),
            Value::String(s) => parse_decimal(s.trim()).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    /// Whether the field counts as "set" for pricing purposes.
    ///
    /// `null`, numeric zero and the empty string are unset; any other value
    /// is set, including strings that fail to parse.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// The price as shown to a customer: the raw string or number, `0` when unset.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.0 {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => "0".to_string(),
        }
    }
}

impl From<Decimal> for PriceValue {
    fn from(d: Decimal) -> Self {
        Self(Value::String(d.normalize().to_string()))
    }
}

impl From<i64> for PriceValue {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<&str> for PriceValue {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Format an amount with space-separated thousands, dropping a zero fraction.
///
/// `1250` → `"1 250"`, `1250.5` → `"1 250.50"`.
#[must_use]
pub fn format_grouped(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();
    let whole = abs.trunc();
    let fraction = abs - whole;

    let digits = whole.normalize().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_zero() {
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_u32().unwrap_or(0);
        out.push_str(&format!(".{cents:02}"));
    }
    out
}
