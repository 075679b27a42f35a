//! Tolerant scalar decoding.
//!
//! The companion service encodes some numeric fields as JSON numbers on one
//! day and as quoted strings on the next (`"id": 128049230` vs
//! `"id": "128049230"`). The functions here are attached to those fields with
//! `#[serde(deserialize_with = ...)]` so the decode accepts either form, while
//! still rejecting anything that is not actually a number.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Market {
//!     #[serde(deserialize_with = "sedr::scalar::int")]
//!     id: i64,
//! }
//!
//! let a: Market = serde_json::from_str(r#"{"id": 14}"#).unwrap();
//! let b: Market = serde_json::from_str(r#"{"id": "14"}"#).unwrap();
//! assert_eq!(a.id, b.id);
//! ```
use std::fmt;

use serde::de::{self, Deserializer, Visitor};

/// Prefix of every [`MalformedScalar`] message, used to recognise it again
/// after serde has wrapped it into its own error type.
pub(crate) const MALFORMED_SCALAR_PREFIX: &str = "malformed scalar";

/// A string-or-number field that did not hold a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedScalar {
    /// What was found, rendered for diagnostics
    pub raw: String,
    /// The numeric type that was expected
    pub expected: &'static str,
}

impl fmt::Display for MalformedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MALFORMED_SCALAR_PREFIX} {:?}: expected {}", self.raw, self.expected)
    }
}

impl std::error::Error for MalformedScalar {}

/// Parses an integer the way JSON-ish producers write them: optional sign,
/// optional `0x` / `0o` / `0b` / leading-zero octal prefix, and `_`
/// separators once a prefix is present. Surrounding quotes are stripped.
pub fn parse_int(raw: &str) -> Result<i64, MalformedScalar> {
    let malformed = || MalformedScalar {
        raw: raw.to_string(),
        expected: "integer",
    };

    let text = raw.trim_matches('"');
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = split_radix(unsigned);
    let digits = if radix == 10 {
        digits.to_string()
    } else {
        digits.replace('_', "")
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(malformed());
    }

    // Parse with the sign attached so i64::MIN does not overflow
    let signed = if negative { format!("-{digits}") } else { digits };
    i64::from_str_radix(&signed, radix).map_err(|_| malformed())
}

fn split_radix(text: &str) -> (u32, &str) {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &text[2..]),
        Some("0o") => (8, &text[2..]),
        Some("0b") => (2, &text[2..]),
        _ if text.len() > 1 && text.starts_with('0') => (8, &text[1..]),
        _ => (10, text),
    }
}

/// Parses a float with standard decimal / exponent syntax. Surrounding quotes are stripped.
///
/// `NaN`, `inf` and values that overflow to infinity are rejected, as they are
/// for native JSON numbers.
pub fn parse_float(raw: &str) -> Result<f64, MalformedScalar> {
    let malformed = || MalformedScalar {
        raw: raw.to_string(),
        expected: "float",
    };

    let text = raw.trim_matches('"');
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return Err(malformed());
    }

    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(malformed()),
    }
}

/// `deserialize_with` hook for an `i64` that may arrive as a number or a string.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntVisitor)
}

/// `deserialize_with` hook for an `f64` that may arrive as a number or a string.
pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FloatVisitor)
}

fn reject<E: de::Error>(raw: impl fmt::Display, expected: &'static str) -> E {
    E::custom(MalformedScalar {
        raw: raw.to_string(),
        expected,
    })
}

struct IntVisitor;

impl<'de> Visitor<'de> for IntVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string containing an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| reject(v, "integer"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        // serde_json reads `-0` as a float
        if v == 0.0 {
            return Ok(0);
        }
        Err(reject(v, "integer"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_int(v).map_err(E::custom)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<i64, E> {
        Err(reject(v, "integer"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Err(reject("null", "integer"))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _seq: A) -> Result<i64, A::Error> {
        Err(reject("array", "integer"))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, _map: A) -> Result<i64, A::Error> {
        Err(reject("object", "integer"))
    }
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string containing a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        parse_float(v).map_err(E::custom)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<f64, E> {
        Err(reject(v, "float"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Err(reject("null", "float"))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _seq: A) -> Result<f64, A::Error> {
        Err(reject("array", "float"))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, _map: A) -> Result<f64, A::Error> {
        Err(reject("object", "float"))
    }
}
