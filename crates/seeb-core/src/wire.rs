//! # Wire Format Helpers
//!
//! The catalog and cart APIs are loose about JSON types: ids arrive as
//! `5` or `"5"`, flags as `"1"`/`"0"`, prices as `150` or `"150.00"`, and
//! list fields of a cart item as either an array or a string holding an
//! encoded array. These serde helpers normalise all of that at the edge so
//! the domain types only ever see one representation.
//!
//! ```text
//! ┌────────────────────┬──────────────────────────┬──────────────────────┐
//! │ Field kind         │ Accepted on the wire     │ Domain type          │
//! ├────────────────────┼──────────────────────────┼──────────────────────┤
//! │ id                 │ 5, "5"                   │ u64 newtype          │
//! │ flag               │ "1", "0", 1, 0, bool     │ bool                 │
//! │ decimal            │ 19.2, "19.2", "", null   │ Decimal (null → 0)   │
//! │ money              │ 150, "150.00"            │ Money (paise)        │
//! │ list               │ [..], "[..]", "", null   │ Vec<T>               │
//! └────────────────────┴──────────────────────────┴──────────────────────┘
//! ```

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use crate::money::Money;

/// Parses a numeric identifier from a JSON number or numeric string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("id must be a non-negative integer, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("id must be numeric, got '{}'", s))),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Like [`deserialize_id`] but `null`, `""` and `0` mean "absent".
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::Number(n) => Ok(n.as_u64().filter(|id| *id != 0)),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(|id| Some(id).filter(|id| *id != 0))
            .map_err(|_| D::Error::custom(format!("id must be numeric, got '{}'", s))),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Parses a `"1"`/`"0"` style flag. Missing or null means false.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag: '{}'", other))),
        },
        other => Err(D::Error::custom(format!("invalid flag: {}", other))),
    }
}

/// Serializes a flag the way the backend stores it: `"1"` or `"0"`.
pub fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "1" } else { "0" })
}

/// Parses a decimal from a number or string. `null` and `""` become zero.
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value).map_err(D::Error::custom)
}

/// Parses a money amount in major units ("150.00", 150) into paise.
pub fn deserialize_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_decimal(deserializer).map(Money::from_decimal)
}

/// Serializes money as a two-decimal string ("4800.00").
pub fn serialize_money<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_fixed_2())
}

/// Parses a whole quantity. Fractional input is rounded up.
pub fn deserialize_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let decimal = deserialize_decimal(deserializer)?;
    decimal
        .ceil()
        .to_i64()
        .ok_or_else(|| D::Error::custom(format!("quantity out of range: {}", decimal)))
}

/// Parses a list given either as a JSON array or as a string holding one.
pub fn deserialize_json_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
        array @ Value::Array(_) => serde_json::from_value(array).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected a list, got {}", other))),
    }
}

/// Accepts a string, number or null and returns an optional trimmed string.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected text, got {}", other))),
    }
}

fn decimal_from_value(value: &Value) -> Result<Decimal, String> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        Value::Number(n) => parse_decimal_text(&n.to_string()),
        Value::String(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Value::String(s) => parse_decimal_text(s.trim()),
        other => Err(format!("expected a number, got {}", other)),
    }
}

fn parse_decimal_text(text: &str) -> Result<Decimal, String> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| format!("invalid number '{}': {}", text, e))
}
