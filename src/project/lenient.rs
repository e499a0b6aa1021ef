//! Tolerant serde helpers for documents written by older tool versions.
//!
//! Numbers may arrive as JSON numbers, numeric strings, `null` or `""`. Optional fields treat the
//! last two as "unset"; required fields reject them so the enclosing params fall back to defaults.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub(crate) fn opt_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(number_from_value(&value))
}

pub(crate) fn number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    number_from_value(&value).ok_or_else(|| D::Error::custom(format!("expected a number, got {value}")))
}

/// Seconds are never negative; anything unreadable means zero.
pub(crate) fn seconds<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_number(d)?.unwrap_or(0.0).max(0.0))
}

/// Non-negative integer step index; floats are truncated and negatives clamp to zero.
pub(crate) fn step<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = number(d)?;
    Ok(v.max(0.0).min(f64::from(u32::MAX)) as u32)
}

/// Block ids were historically `Date.now()` values, sometimes with a random fraction added.
pub(crate) fn id<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = number(d)?;
    if v < 0.0 {
        return Err(D::Error::custom("block id must be non-negative"));
    }
    Ok(v as u64)
}

pub(crate) fn flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

/// Strings that may be stored as numbers or `null` (scene targets, sprite ids).
pub(crate) fn text<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/project/lenient.rs"]
mod tests;
