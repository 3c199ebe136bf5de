//! Fixed-point decimal values

use crate::value::{kind_mismatch, linear_position};
use crate::{Collation, Error, HistogramValue, Result, ValueKind};
use num_traits::ToPrimitive;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Largest number of fractional digits a [`Decimal`] may carry
pub const MAX_SCALE: u32 = 30;

/// Exact decimal number `mantissa * 10^-scale`
///
/// Values that differ only in trailing fractional zeros (`1.5` and `1.50`)
/// compare equal.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Create a decimal from its unscaled mantissa and scale
    pub fn new(mantissa: i128, scale: u32) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(Error::InvalidArgument(format!(
                "decimal scale {scale} exceeds the maximum of {MAX_SCALE}"
            )));
        }
        Ok(Self { mantissa, scale })
    }

    /// Unscaled integer value
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of fractional digits
    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn rescaled(&self, scale: u32) -> Option<i128> {
        10i128
            .checked_pow(scale - self.scale)
            .and_then(|factor| self.mantissa.checked_mul(factor))
    }

    /// `self - other` as a float, computed exactly where the range allows
    fn difference(&self, other: &Self) -> f64 {
        let scale = self.scale.max(other.scale);
        match (self.rescaled(scale), other.rescaled(scale)) {
            (Some(a), Some(b)) => match a.checked_sub(b) {
                Some(d) => d.to_f64().unwrap_or(0.0) / 10f64.powi(scale as i32),
                None => self.to_f64().unwrap_or(0.0) - other.to_f64().unwrap_or(0.0),
            },
            _ => self.to_f64().unwrap_or(0.0) - other.to_f64().unwrap_or(0.0),
        }
    }
}

impl From<i64> for Decimal {
    fn from(val: i64) -> Self {
        Decimal {
            mantissa: val as i128,
            scale: 0,
        }
    }
}

impl ToPrimitive for Decimal {
    fn to_i64(&self) -> Option<i64> {
        let factor = 10i128.checked_pow(self.scale)?;
        (self.mantissa / factor).to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        let factor = 10i128.checked_pow(self.scale)?;
        (self.mantissa / factor).to_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.mantissa.to_f64()? / 10f64.powi(self.scale as i32))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        match (self.rescaled(scale), other.rescaled(scale)) {
            (Some(a), Some(b)) => a.cmp(&b),
            // Only the side being scaled up can overflow, and then it dominates
            (None, _) => {
                if self.mantissa < 0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (_, None) => {
                if other.mantissa < 0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let factor = 10u128.pow(self.scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            digits / factor,
            digits % factor,
            width = self.scale as usize
        )
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("invalid decimal literal '{s}'"));

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let digit = c.to_digit(10).ok_or_else(invalid)?;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(digit as i128))
                .ok_or_else(invalid)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Decimal::new(mantissa, frac_part.len() as u32)
    }
}

impl HistogramValue for Decimal {
    const KIND: ValueKind = ValueKind::Decimal;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        linear_position(0.0, upper.difference(lower), value.difference(lower))
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(self.to_string())
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}
