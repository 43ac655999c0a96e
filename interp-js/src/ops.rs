//! Conversions and comparisons that don't need to call back into script code.

use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::value::Value;
use parse_script_js::char::is_line_terminator;
use parse_script_js::char::is_whitespace;
use std::rc::Rc;

pub fn to_boolean(value: &Value) -> bool {
  match value {
    Value::Undefined | Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => *n != 0.0 && !n.is_nan(),
    Value::String(s) => !s.is_empty(),
    Value::Object(_) => true,
  }
}

fn is_js_space(c: char) -> bool {
  is_whitespace(c) || is_line_terminator(c)
}

/// ECMAScript `ToNumber` applied to a string.
pub fn string_to_number(s: &str) -> f64 {
  let s = s.trim_matches(is_js_space);
  if s.is_empty() {
    return 0.0;
  };
  let radix = match s.get(..2) {
    Some("0x" | "0X") => 16,
    Some("0o" | "0O") => 8,
    Some("0b" | "0B") => 2,
    _ => 10,
  };
  if radix != 10 {
    let digits = &s[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
      return f64::NAN;
    };
    return digits
      .chars()
      .fold(0.0, |acc, c| acc * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64);
  };
  match s {
    "Infinity" | "+Infinity" => return f64::INFINITY,
    "-Infinity" => return f64::NEG_INFINITY,
    _ => {}
  };
  // Rust accepts spellings like "inf" and "NaN" that JS doesn't.
  if !s.chars().all(|c| matches!(c, '0'..='9' | '.' | 'e' | 'E' | '+' | '-'))
    || !s.chars().any(|c| c.is_ascii_digit())
  {
    return f64::NAN;
  };
  s.parse::<f64>().unwrap_or(f64::NAN)
}

/// ECMAScript `Number::toString(10)`: shortest round-trip digits, switching to exponent form
/// outside `1e-7 < |n| < 1e21`.
pub fn number_to_string(n: f64) -> String {
  if n.is_nan() {
    return "NaN".to_string();
  };
  if n == 0.0 {
    return "0".to_string();
  };
  if n.is_infinite() {
    return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
  };
  if n < 0.0 {
    return format!("-{}", number_to_string(-n));
  };
  // `{:e}` gives the shortest digits that round-trip, e.g. "1.2345e3".
  let sci = format!("{n:e}");
  let (mantissa, exp) = match sci.split_once('e') {
    Some(parts) => parts,
    None => return sci,
  };
  let exp: i32 = exp.parse().unwrap_or(0);
  let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
  let k = digits.len() as i32;
  // Position of the decimal point relative to the start of `digits`.
  let n = exp + 1;
  if k <= n && n <= 21 {
    format!("{digits}{}", "0".repeat((n - k) as usize))
  } else if 0 < n && n <= 21 {
    format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
  } else if -6 < n && n <= 0 {
    format!("0.{}{digits}", "0".repeat((-n) as usize))
  } else {
    let sign = if n - 1 < 0 { '-' } else { '+' };
    let e = (n - 1).abs();
    if k == 1 {
      format!("{digits}e{sign}{e}")
    } else {
      format!("{}.{}e{sign}{e}", &digits[..1], &digits[1..])
    }
  }
}

/// Formats a number in the given radix (2 to 36), as `Number.prototype.toString(radix)` does.
pub fn number_to_radix_string(n: f64, radix: u32) -> String {
  if radix == 10 || !n.is_finite() {
    return number_to_string(n);
  };
  let negative = n < 0.0;
  let n = n.abs();
  let mut int = n.trunc();
  let mut frac = n - int;
  let mut int_digits = Vec::new();
  loop {
    let d = (int % radix as f64) as u32;
    int_digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
    int = (int / radix as f64).trunc();
    if int < 1.0 {
      break;
    };
  }
  let mut out = String::new();
  if negative {
    out.push('-');
  };
  out.extend(int_digits.iter().rev());
  if frac > 0.0 {
    out.push('.');
    // Enough digits to round-trip a double in any radix.
    for _ in 0..52 {
      frac *= radix as f64;
      let d = frac.trunc() as u32;
      out.push(std::char::from_digit(d, radix).unwrap_or('0'));
      frac -= d as f64;
      if frac <= 0.0 {
        break;
      };
    }
  };
  out
}

pub fn to_int32(n: f64) -> i32 {
  to_uint32(n) as i32
}

pub fn to_uint32(n: f64) -> u32 {
  if !n.is_finite() {
    return 0;
  };
  n.trunc().rem_euclid(4294967296.0) as u32
}

/// ECMAScript `ToIntegerOrInfinity`.
pub fn to_integer(n: f64) -> f64 {
  if n.is_nan() {
    0.0
  } else {
    n.trunc()
  }
}

/// `**`.
pub fn exponentiate(base: f64, exp: f64) -> f64 {
  // `powf` returns 1 for these, JS returns NaN.
  if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
    return f64::NAN;
  };
  base.powf(exp)
}

/// `===`.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
  a == b
}

pub fn utf16_len(s: &str) -> usize {
  s.chars().map(char::len_utf16).sum()
}

/// The UTF-16 code unit at `index`, as `charCodeAt` sees it.
pub fn utf16_unit_at(s: &str, index: usize) -> Option<u16> {
  s.encode_utf16().nth(index)
}

/// Decodes UTF-16 code units, replacing unpaired surrogates.
pub fn string_from_utf16(units: &[u16]) -> String {
  String::from_utf16_lossy(units)
}

/// Slices a string by UTF-16 code unit offsets.
pub fn utf16_slice(s: &str, start: usize, end: usize) -> String {
  if s.is_ascii() {
    let end = end.min(s.len());
    return s.get(start.min(end)..end).unwrap_or("").to_string();
  };
  let units: Vec<u16> = s.encode_utf16().collect();
  let end = end.min(units.len());
  string_from_utf16(&units[start.min(end)..end])
}

/// Converts a byte offset into a UTF-16 offset.
pub fn utf16_offset(s: &str, byte_offset: usize) -> usize {
  utf16_len(&s[..byte_offset])
}

/// Converts a UTF-16 offset into a byte offset, clamping to the string's end.
pub fn byte_offset(s: &str, utf16_offset: usize) -> usize {
  let mut units = 0;
  for (i, c) in s.char_indices() {
    if units >= utf16_offset {
      return i;
    };
    units += c.len_utf16();
  }
  s.len()
}

/// Own `length` and index properties of a string value.
pub fn string_own_property(s: &str, key: &str) -> Option<Value> {
  if key == "length" {
    return Some(Value::Number(utf16_len(s) as f64));
  };
  let index = crate::object::array_index(key)? as usize;
  utf16_unit_at(s, index).map(|_| Value::string(utf16_slice(s, index, index + 1)))
}

/// `ToString` for primitives. Objects render as their class tag.
pub fn primitive_to_string(value: &Value) -> Rc<str> {
  match value {
    Value::Undefined => "undefined".into(),
    Value::Null => "null".into(),
    Value::Bool(b) => if *b { "true" } else { "false" }.into(),
    Value::Number(n) => number_to_string(*n).into(),
    Value::String(s) => s.clone(),
    Value::Object(o) => format!("[object {}]", o.borrow().class.tag()).into(),
  }
}

/// Renders a thrown value for the host, e.g. `TypeError: x is not a function`.
pub fn describe_thrown(value: &Value) -> String {
  match value {
    Value::Object(o) => {
      let name = o.get("name");
      let message = o.get("message");
      match (name.as_str(), message.as_str()) {
        (Some(name), Some("")) => name.to_string(),
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (Some(name), None) => name.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => inspect(value),
      }
    }
    other => inspect(other),
  }
}

/// Formats a value for console output. Top-level strings are written as-is.
pub fn format_console_arg(value: &Value) -> String {
  match value {
    Value::String(s) => s.to_string(),
    other => inspect(other),
  }
}

/// A readable, Node-like rendering of a value.
pub fn inspect(value: &Value) -> String {
  let mut out = String::new();
  let mut seen = Vec::new();
  inspect_into(value, 0, &mut seen, &mut out);
  out
}

const INSPECT_DEPTH: usize = 2;

fn is_plain_identifier(key: &str) -> bool {
  let mut chars = key.chars();
  chars
    .next()
    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn inspect_into(value: &Value, depth: usize, seen: &mut Vec<JsObject>, out: &mut String) {
  let obj = match value {
    Value::String(s) => {
      out.push('\'');
      out.push_str(&s.replace('\'', "\\'"));
      out.push('\'');
      return;
    }
    Value::Object(o) => o,
    other => {
      out.push_str(&primitive_to_string(other));
      return;
    }
  };
  if seen.iter().any(|s| s.ptr_eq(obj)) {
    out.push_str("[Circular]");
    return;
  };
  let class = obj.class();
  match &class {
    ObjectClass::Function(c) => {
      let name = c.name();
      if name.is_empty() {
        out.push_str("[Function (anonymous)]");
      } else {
        out.push_str(&format!("[Function: {name}]"));
      };
      return;
    }
    ObjectClass::Error => {
      out.push_str(&describe_thrown(value));
      return;
    }
    ObjectClass::Boolean(b) => {
      out.push_str(&format!("[Boolean: {b}]"));
      return;
    }
    ObjectClass::Number(n) => {
      out.push_str(&format!("[Number: {}]", number_to_string(*n)));
      return;
    }
    ObjectClass::String(s) => {
      out.push_str(&format!("[String: '{s}']"));
      return;
    }
    _ => {}
  };
  let is_array = matches!(class, ObjectClass::Array);
  if depth > INSPECT_DEPTH {
    out.push_str(if is_array { "[Array]" } else { "[Object]" });
    return;
  };
  let keys = obj.own_enumerable_keys();
  let (open, close) = if is_array { ("[", "]") } else { ("{", "}") };
  if keys.is_empty() {
    out.push_str(open);
    out.push_str(close);
    return;
  };
  seen.push(obj.clone());
  out.push_str(open);
  out.push(' ');
  let mut first = true;
  let mut next_index = 0u32;
  for key in keys.iter() {
    if !first {
      out.push_str(", ");
    };
    first = false;
    let index = crate::object::array_index(key);
    if is_array && index == Some(next_index) {
      next_index += 1;
    } else if is_plain_identifier(key) {
      out.push_str(key);
      out.push_str(": ");
    } else {
      out.push_str(&format!("'{key}': "));
    };
    inspect_into(&obj.get(key), depth + 1, seen, out);
  }
  out.push(' ');
  out.push_str(close);
  seen.pop();
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn test_number_to_string() {
    assert_eq!(number_to_string(0.0), "0");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(1.0), "1");
    assert_eq!(number_to_string(-42.5), "-42.5");
    assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(number_to_string(123456789.0), "123456789");
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1.5e21), "1.5e+21");
    assert_eq!(number_to_string(1e20), "100000000000000000000");
    assert_eq!(number_to_string(0.000001), "0.000001");
    assert_eq!(number_to_string(0.0000001), "1e-7");
    assert_eq!(number_to_string(1.25e-10), "1.25e-10");
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
  }

  #[test]
  fn test_string_to_number() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("  \n\t "), 0.0);
    assert_eq!(string_to_number(" 42 "), 42.0);
    assert_eq!(string_to_number("-1.5e3"), -1500.0);
    assert_eq!(string_to_number(".5"), 0.5);
    assert_eq!(string_to_number("0x1F"), 31.0);
    assert_eq!(string_to_number("0b101"), 5.0);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert!(string_to_number("inf").is_nan());
    assert!(string_to_number("NaN").is_nan());
    assert!(string_to_number("12px").is_nan());
    assert!(string_to_number("0x").is_nan());
    assert!(string_to_number("-").is_nan());
  }

  #[test]
  fn test_int_conversions() {
    assert_eq!(to_int32(4294967296.0 + 5.0), 5);
    assert_eq!(to_int32(2147483648.0), -2147483648);
    assert_eq!(to_int32(-1.0), -1);
    assert_eq!(to_uint32(-1.0), 4294967295);
    assert_eq!(to_int32(f64::NAN), 0);
    assert_eq!(to_int32(3.9), 3);
  }

  #[test]
  fn test_radix_string() {
    assert_eq!(number_to_radix_string(255.0, 16), "ff");
    assert_eq!(number_to_radix_string(-10.0, 2), "-1010");
    assert_eq!(number_to_radix_string(0.5, 2), "0.1");
    assert_eq!(number_to_radix_string(0.0, 36), "0");
  }

  #[test]
  fn test_utf16_helpers() {
    let s = "a\u{1F600}b";
    assert_eq!(utf16_len(s), 4);
    assert_eq!(utf16_unit_at(s, 1), Some(0xD83D));
    assert_eq!(utf16_slice(s, 1, 3), "\u{1F600}");
    assert_eq!(byte_offset(s, 3), 5);
    assert_eq!(utf16_offset(s, 5), 3);
  }

  #[test]
  fn test_inspect() {
    let arr = JsObject::new(ObjectClass::Array, None);
    arr.push(Value::Number(1.0));
    arr.push(Value::from("two"));
    let obj = JsObject::new(ObjectClass::Ordinary, None);
    obj.set("list", Value::Object(arr));
    obj.set("odd key", Value::Null);
    obj.set("self", Value::Object(obj.clone()));
    assert_eq!(
      inspect(&Value::Object(obj)),
      "{ list: [ 1, 'two' ], 'odd key': null, self: [Circular] }"
    );
    assert_eq!(format_console_arg(&Value::from("raw")), "raw");
  }

  proptest! {
    #[test]
    fn number_string_round_trip(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
      let s = number_to_string(n);
      let back = string_to_number(&s);
      prop_assert!(back == n || (n == 0.0 && back == 0.0), "{} -> {} -> {}", n, s, back);
    }

    #[test]
    fn integers_print_without_fraction(n in -9007199254740991i64..9007199254740991i64) {
      prop_assert_eq!(number_to_string(n as f64), n.to_string());
    }
  }
}
