//! Collated string values
//!
//! A [`CollatedString`] owns its payload, so histograms holding string
//! endpoints never borrow from the buffers they were built from, and a
//! cloned histogram shares no storage with its source.

use crate::value::kind_mismatch;
use crate::{Collation, HistogramValue, Result, ValueKind};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// Prefix marking a hex-encoded payload in persisted documents
const BASE16_PREFIX: &str = "base16:";

/// Number of sort-key bytes used to place a string inside a range
const POSITION_KEY_BYTES: usize = 8;

/// Byte string compared under a collation
#[derive(Clone)]
pub struct CollatedString {
    bytes: Vec<u8>,
    collation: Collation,
}

impl CollatedString {
    /// Create a string from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>, collation: Collation) -> Self {
        Self {
            bytes: bytes.into(),
            collation,
        }
    }

    /// Create a string with the binary collation
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, Collation::Binary)
    }

    /// Raw payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Ord for CollatedString {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(
            self.collation, other.collation,
            "strings under different collations are not comparable"
        );
        self.collation.compare(&self.bytes, &other.bytes)
    }
}

impl PartialOrd for CollatedString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CollatedString {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CollatedString {}

impl fmt::Debug for CollatedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", String::from_utf8_lossy(&self.bytes), self.collation)
    }
}

impl fmt::Display for CollatedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Big-endian integer made of the first key bytes after `skip`, zero padded
fn key_prefix(key: &[u8], skip: usize) -> u64 {
    let mut buf = [0u8; POSITION_KEY_BYTES];
    let tail = key.get(skip..).unwrap_or(&[]);
    let n = tail.len().min(POSITION_KEY_BYTES);
    buf[..n].copy_from_slice(&tail[..n]);
    u64::from_be_bytes(buf)
}

fn encode_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(BASE16_PREFIX.len() + bytes.len() * 2);
    out.push_str(BASE16_PREFIX);
    for b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

impl HistogramValue for CollatedString {
    const KIND: ValueKind = ValueKind::String;

    /// Ordinal approximation over the collation sort keys
    ///
    /// The prefix shared by `lower` and `upper` carries no information about
    /// where `value` sits, so it is skipped and the next eight key bytes are
    /// compared as integers.
    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let collation = lower.collation;
        let lo = collation.sort_key(&lower.bytes);
        let hi = collation.sort_key(&upper.bytes);
        let v = collation.sort_key(&value.bytes);

        let common = lo.iter().zip(hi.iter()).take_while(|(a, b)| a == b).count();
        u64::normalized_position(
            &key_prefix(&lo, common),
            &key_prefix(&hi, common),
            &key_prefix(&v, common),
        )
    }

    fn to_json(&self) -> JsonValue {
        match self.as_str() {
            Some(s) if !s.starts_with(BASE16_PREFIX) => JsonValue::from(s),
            _ => JsonValue::from(encode_hex(&self.bytes)),
        }
    }

    fn from_json(json: &JsonValue, collation: Collation) -> Result<Self> {
        let s = json.as_str().ok_or_else(|| kind_mismatch(Self::KIND, json))?;
        let bytes = match s.strip_prefix(BASE16_PREFIX) {
            Some(hex) => decode_hex(hex).ok_or_else(|| kind_mismatch(Self::KIND, json))?,
            None => s.as_bytes().to_vec(),
        };
        Ok(Self::new(bytes, collation))
    }

    fn value_collation(&self) -> Option<Collation> {
        Some(self.collation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn s(text: &str) -> CollatedString {
        CollatedString::binary(text)
    }

    #[test]
    fn test_collation_aware_equality() {
        let a = CollatedString::new("Apple", Collation::AsciiGeneralCi);
        let b = CollatedString::new("apple", Collation::AsciiGeneralCi);
        assert_eq!(a, b);
        assert_ne!(s("Apple"), s("apple"));
        assert!(s("Apple") < s("apple"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "different collations")]
    fn test_mixed_collations_do_not_compare() {
        let ci = CollatedString::new("a", Collation::AsciiGeneralCi);
        let _ = ci.cmp(&s("a"));
    }

    #[test]
    fn test_value_collation() {
        assert_eq!(s("x").value_collation(), Some(Collation::Binary));
        assert_eq!(5i64.value_collation(), None);
    }

    #[test]
    fn test_position_skips_common_prefix() {
        let p = CollatedString::normalized_position(&s("prefix-a"), &s("prefix-c"), &s("prefix-b"));
        assert_relative_eq!(p, 0.5, epsilon = 1e-9);

        assert_eq!(CollatedString::normalized_position(&s("a"), &s("z"), &s("a")), 0.0);
        assert_eq!(CollatedString::normalized_position(&s("a"), &s("z"), &s("z")), 1.0);
        assert_eq!(CollatedString::normalized_position(&s("same"), &s("same"), &s("same")), 0.0);

        let p = CollatedString::normalized_position(&s("ab"), &s("abc"), &s("abb"));
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_position_uses_sort_keys() {
        let ci = |t: &str| CollatedString::new(t, Collation::AsciiGeneralCi);
        let p = CollatedString::normalized_position(&ci("A"), &ci("c"), &ci("B"));
        assert_relative_eq!(p, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_json_encoding() {
        assert_eq!(s("hello").to_json(), JsonValue::from("hello"));

        let raw = CollatedString::binary(vec![0xff, 0x00, 0x10]);
        assert_eq!(raw.to_json(), JsonValue::from("base16:ff0010"));
        let back = CollatedString::from_json(&raw.to_json(), Collation::Binary).unwrap();
        assert_eq!(back.as_bytes(), &[0xff, 0x00, 0x10]);

        let tricky = s("base16:not-hex");
        let back = CollatedString::from_json(&tricky.to_json(), Collation::Binary).unwrap();
        assert_eq!(back.as_bytes(), b"base16:not-hex");

        let back = CollatedString::from_json(&JsonValue::from("x"), Collation::Utf8GeneralCi).unwrap();
        assert_eq!(back.collation(), Collation::Utf8GeneralCi);

        assert!(CollatedString::from_json(&JsonValue::from("base16:abc"), Collation::Binary).is_err());
        assert!(CollatedString::from_json(&JsonValue::from(3), Collation::Binary).is_err());
    }

    #[test]
    fn test_clone_owns_payload() {
        let original = s("payload");
        let copy = original.clone();
        drop(original);
        assert_eq!(copy.as_str(), Some("payload"));
    }
}
