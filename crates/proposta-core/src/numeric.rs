//! # Lenient Numeric Coercion
//!
//! Monthly history arrives from spreadsheets and hand-typed forms: numbers may
//! be JSON numbers, strings with a comma decimal separator, blanks or nulls.
//! Both engines read values only through this module.
//!
//! ## Coercion Contract
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │  Raw input           │  Result                                          │
//! ├──────────────────────┼──────────────────────────────────────────────────┤
//! │  12.5 / 12           │  Some(12.5) / Some(12.0)                         │
//! │  "12,5" / " 12.5 "   │  Some(12.5)                                      │
//! │  "" / "   " / null   │  None                                            │
//! │  "abc" / "NaN"       │  None  (absent, never zero)                      │
//! │  missing key         │  None                                            │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! `None` means *absent*: mandatory checks treat it as missing, zeroing checks
//! treat it as "absent or zero".

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Parses a number leniently.
///
/// ## Example
/// ```rust
/// use proposta_core::numeric::parse_lenient_number;
///
/// assert_eq!(parse_lenient_number("1.234"), Some(1.234));
/// assert_eq!(parse_lenient_number(" 75,5 "), Some(75.5));
/// assert_eq!(parse_lenient_number(""), None);
/// assert_eq!(parse_lenient_number("n/a"), None);
/// ```
pub fn parse_lenient_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// True when the value is present and different from zero.
#[inline]
pub fn is_nonzero(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0)
}

/// True when the value is present and strictly positive.
#[inline]
pub fn is_positive(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v > 0.0)
}

// =============================================================================
// Serde Adapters
// =============================================================================

/// `deserialize_with` adapter for `Option<f64>` fields.
///
/// Use together with `#[serde(default)]` so a missing key also becomes `None`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientNumberVisitor)
}

/// `deserialize_with` adapter for yes/no flags stored in loosely typed columns.
///
/// Accepts booleans, numbers (non-zero is true) and the strings `true`, `1`,
/// `sim`, `s`, `yes`, `y` in any case. Everything else is false.
pub fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientBoolVisitor)
}

/// Interprets a flag string.
pub fn parse_lenient_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "sim" | "s" | "yes" | "y"
    )
}

struct LenientNumberVisitor;

impl<'de> Visitor<'de> for LenientNumberVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v).filter(|v| v.is_finite()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_lenient_number(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

struct LenientBoolVisitor;

impl<'de> Visitor<'de> for LenientBoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean-like value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v != 0)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v != 0.0 && !v.is_nan())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_lenient_bool(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(false)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
