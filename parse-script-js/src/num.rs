use core::hash::Hash;
use core::hash::Hasher;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

// This provides Eq for f64.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl JsNumber {
  /// Parses the raw text of a numeric literal token.
  pub fn from_literal(raw: &str) -> Option<JsNumber> {
    let radix_digits = |prefixes: [&str; 2]| {
      prefixes
        .iter()
        .find_map(|p| raw.strip_prefix(p))
    };
    if let Some(digits) = radix_digits(["0x", "0X"]) {
      return parse_radix(digits, 16);
    }
    if let Some(digits) = radix_digits(["0o", "0O"]) {
      return parse_radix(digits, 8);
    }
    if let Some(digits) = radix_digits(["0b", "0B"]) {
      return parse_radix(digits, 2);
    }
    // Legacy octal, e.g. `017`.
    if raw.len() > 1 && raw.starts_with('0') && raw.bytes().all(|b| matches!(b, b'0'..=b'7')) {
      return parse_radix(&raw[1..], 8);
    }
    raw.parse::<f64>().ok().map(JsNumber)
  }
}

fn parse_radix(digits: &str, radix: u32) -> Option<JsNumber> {
  if digits.is_empty() {
    return None;
  }
  let mut value = 0f64;
  for c in digits.chars() {
    value = value * radix as f64 + c.to_digit(radix)? as f64;
  }
  Some(JsNumber(value))
}

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.eq(&other.0)
  }
}

impl Eq for JsNumber {}

impl Ord for JsNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    // Only NaNs cannot be compared, and we treat them as equal.
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

impl PartialOrd for JsNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::JsNumber;

  #[test]
  fn test_from_literal() {
    assert_eq!(JsNumber::from_literal("42"), Some(JsNumber(42.0)));
    assert_eq!(JsNumber::from_literal(".5"), Some(JsNumber(0.5)));
    assert_eq!(JsNumber::from_literal("1e3"), Some(JsNumber(1000.0)));
    assert_eq!(JsNumber::from_literal("0xff"), Some(JsNumber(255.0)));
    assert_eq!(JsNumber::from_literal("0b101"), Some(JsNumber(5.0)));
    assert_eq!(JsNumber::from_literal("017"), Some(JsNumber(15.0)));
    assert_eq!(JsNumber::from_literal("019"), Some(JsNumber(19.0)));
    assert_eq!(JsNumber::from_literal("0x"), None);
  }
}
