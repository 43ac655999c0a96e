//! Global functions: number parsing and checks, URI coding, `escape`/`unescape`.

use super::arg;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::ops;
use crate::realm::ErrorKind;
use crate::realm::Realm;
use crate::value::Value;
use parse_script_js::char::is_line_terminator;
use parse_script_js::char::is_whitespace;

fn trim_start(s: &str) -> &str {
  s.trim_start_matches(|c| is_whitespace(c) || is_line_terminator(c))
}

/// The value of the longest prefix of `s` that is a decimal literal, as `parseFloat` sees it.
pub fn parse_float_prefix(s: &str) -> f64 {
  let s = trim_start(s);
  let (sign, rest) = match s.as_bytes().first() {
    Some(b'-') => (-1.0, &s[1..]),
    Some(b'+') => (1.0, &s[1..]),
    _ => (1.0, s),
  };
  if rest.starts_with("Infinity") {
    return sign * f64::INFINITY;
  };
  let bytes = rest.as_bytes();
  let mut end = 0;
  let mut mantissa_digits = 0;
  while end < bytes.len() && bytes[end].is_ascii_digit() {
    end += 1;
    mantissa_digits += 1;
  }
  if end < bytes.len() && bytes[end] == b'.' {
    end += 1;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
      end += 1;
      mantissa_digits += 1;
    }
  };
  if mantissa_digits == 0 {
    return f64::NAN;
  };
  // The exponent only counts if it has digits.
  if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
    let mut exp_end = end + 1;
    if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
      exp_end += 1;
    };
    let digits_start = exp_end;
    while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
      exp_end += 1;
    }
    if exp_end > digits_start {
      end = exp_end;
    };
  };
  sign * rest[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// `parseInt` over an already converted string and radix.
pub fn parse_int_prefix(s: &str, radix: i32) -> f64 {
  let s = trim_start(s);
  let (sign, mut rest) = match s.as_bytes().first() {
    Some(b'-') => (-1.0, &s[1..]),
    Some(b'+') => (1.0, &s[1..]),
    _ => (1.0, s),
  };
  let mut radix = radix;
  let has_hex_prefix = rest.starts_with("0x") || rest.starts_with("0X");
  if radix == 0 {
    radix = if has_hex_prefix { 16 } else { 10 };
  };
  if !(2..=36).contains(&radix) {
    return f64::NAN;
  };
  if radix == 16 && has_hex_prefix {
    rest = &rest[2..];
  };
  let mut value = 0.0;
  let mut any = false;
  for c in rest.chars() {
    let Some(d) = c.to_digit(radix as u32) else {
      break;
    };
    value = value * radix as f64 + d as f64;
    any = true;
  }
  if any {
    sign * value
  } else {
    f64::NAN
  }
}

fn parse_float_fn(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = ev.to_string(&arg(args, 0))?;
  Ok(Value::Number(parse_float_prefix(&s)))
}

fn parse_int_fn(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = ev.to_string(&arg(args, 0))?;
  let radix = ev.to_int32(&arg(args, 1))?;
  Ok(Value::Number(parse_int_prefix(&s, radix)))
}

pub fn parse_float(realm: &Realm) -> Value {
  Value::Object(realm.new_function("parseFloat", 1, parse_float_fn))
}

pub fn parse_int(realm: &Realm) -> Value {
  Value::Object(realm.new_function("parseInt", 2, parse_int_fn))
}

pub fn is_finite(realm: &Realm) -> Value {
  Value::Object(realm.new_function("isFinite", 1, |ev, _, args| {
    Ok(Value::Bool(ev.to_number(&arg(args, 0))?.is_finite()))
  }))
}

pub fn is_nan(realm: &Realm) -> Value {
  Value::Object(realm.new_function("isNaN", 1, |ev, _, args| {
    Ok(Value::Bool(ev.to_number(&arg(args, 0))?.is_nan()))
  }))
}

const URI_UNRESERVED_MARKS: &str = "-_.!~*'()";
const URI_RESERVED: &str = ";/?:@&=+$,#";

fn uri_encode(s: &str, keep: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if c.is_ascii_alphanumeric() || URI_UNRESERVED_MARKS.contains(c) || keep.contains(c) {
      out.push(c);
      continue;
    };
    let mut buf = [0u8; 4];
    for b in c.encode_utf8(&mut buf).bytes() {
      out.push_str(&format!("%{b:02X}"));
    }
  }
  out
}

fn hex_byte(bytes: &[u8], i: usize) -> Option<u8> {
  let hi = (*bytes.get(i + 1)? as char).to_digit(16)?;
  let lo = (*bytes.get(i + 2)? as char).to_digit(16)?;
  Some((hi * 16 + lo) as u8)
}

/// Decodes `%XX` escapes as UTF-8. Escapes that decode to a character in `keep` stay escaped.
/// Returns `None` for malformed input.
fn uri_decode(s: &str, keep: &str) -> Option<String> {
  let bytes = s.as_bytes();
  let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] != b'%' {
      out.push(bytes[i]);
      i += 1;
      continue;
    };
    let first = hex_byte(bytes, i)?;
    let width = match first {
      0x00..=0x7F => 1,
      0xC0..=0xDF => 2,
      0xE0..=0xEF => 3,
      0xF0..=0xF7 => 4,
      _ => return None,
    };
    let mut seq = vec![first];
    for k in 1..width {
      let at = i + 3 * k;
      if bytes.get(at) != Some(&b'%') {
        return None;
      };
      seq.push(hex_byte(bytes, at)?);
    }
    let decoded = std::str::from_utf8(&seq).ok()?;
    if width == 1 && keep.contains(decoded) {
      out.extend_from_slice(&bytes[i..i + 3]);
    } else {
      out.extend_from_slice(decoded.as_bytes());
    };
    i += 3 * width;
  }
  String::from_utf8(out).ok()
}

fn uri_function(
  realm: &Realm,
  name: &'static str,
  f: fn(&str) -> Option<String>,
) -> Value {
  Value::Object(realm.new_function(name, 1, move |ev, _, args| {
    let s = ev.to_string(&arg(args, 0))?;
    match f(&s) {
      Some(out) => Ok(Value::string(out)),
      None => Err(ev.error(ErrorKind::URIError, "URI malformed")),
    }
  }))
}

pub fn encode_uri(realm: &Realm) -> Value {
  uri_function(realm, "encodeURI", |s| Some(uri_encode(s, URI_RESERVED)))
}

pub fn encode_uri_component(realm: &Realm) -> Value {
  uri_function(realm, "encodeURIComponent", |s| Some(uri_encode(s, "")))
}

pub fn decode_uri(realm: &Realm) -> Value {
  uri_function(realm, "decodeURI", |s| uri_decode(s, URI_RESERVED))
}

pub fn decode_uri_component(realm: &Realm) -> Value {
  uri_function(realm, "decodeURIComponent", |s| uri_decode(s, ""))
}

const ESCAPE_KEEP: &str = "@*_+-./";

pub fn escape_str(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for unit in s.encode_utf16() {
    match char::from_u32(unit as u32) {
      Some(c) if c.is_ascii_alphanumeric() || ESCAPE_KEEP.contains(c) => out.push(c),
      _ if unit < 256 => out.push_str(&format!("%{unit:02X}")),
      _ => out.push_str(&format!("%u{unit:04X}")),
    };
  }
  out
}

pub fn unescape_str(s: &str) -> String {
  let units: Vec<u16> = s.encode_utf16().collect();
  let hex = |range: &[u16]| -> Option<u16> {
    let text = String::from_utf16(range).ok()?;
    if !text.chars().all(|c| c.is_ascii_hexdigit()) {
      return None;
    };
    u16::from_str_radix(&text, 16).ok()
  };
  let mut out = Vec::with_capacity(units.len());
  let mut i = 0;
  while i < units.len() {
    if units[i] == b'%' as u16 {
      if units.get(i + 1) == Some(&(b'u' as u16)) {
        if let Some(v) = units.get(i + 2..i + 6).and_then(hex) {
          out.push(v);
          i += 6;
          continue;
        };
      } else if let Some(v) = units.get(i + 1..i + 3).and_then(hex) {
        out.push(v);
        i += 3;
        continue;
      };
    };
    out.push(units[i]);
    i += 1;
  }
  ops::string_from_utf16(&out)
}

pub fn escape(realm: &Realm) -> Value {
  Value::Object(realm.new_function("escape", 1, |ev, _, args| {
    let s = ev.to_string(&arg(args, 0))?;
    Ok(Value::string(escape_str(&s)))
  }))
}

pub fn unescape(realm: &Realm) -> Value {
  Value::Object(realm.new_function("unescape", 1, |ev, _, args| {
    let s = ev.to_string(&arg(args, 0))?;
    Ok(Value::string(unescape_str(&s)))
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_float_prefix() {
    assert_eq!(parse_float_prefix("  3.14abc"), 3.14);
    assert_eq!(parse_float_prefix("-.5"), -0.5);
    assert_eq!(parse_float_prefix("1e3x"), 1000.0);
    assert_eq!(parse_float_prefix("1e"), 1.0);
    assert_eq!(parse_float_prefix("-Infinityx"), f64::NEG_INFINITY);
    assert!(parse_float_prefix("abc").is_nan());
    assert!(parse_float_prefix(".").is_nan());
  }

  #[test]
  fn test_parse_int_prefix() {
    assert_eq!(parse_int_prefix("42px", 0), 42.0);
    assert_eq!(parse_int_prefix("  -0x1f", 0), -31.0);
    assert_eq!(parse_int_prefix("ff", 16), 255.0);
    assert_eq!(parse_int_prefix("101", 2), 5.0);
    assert_eq!(parse_int_prefix("3.9", 10), 3.0);
    assert!(parse_int_prefix("z", 10).is_nan());
    assert!(parse_int_prefix("1", 37).is_nan());
  }

  #[test]
  fn test_uri_coding() {
    assert_eq!(uri_encode("a b&c/é", ""), "a%20b%26c%2F%C3%A9");
    assert_eq!(uri_encode("a b&c/é", URI_RESERVED), "a%20b&c/%C3%A9");
    assert_eq!(uri_decode("a%20b%26c%2F%C3%A9", "").as_deref(), Some("a b&c/é"));
    assert_eq!(uri_decode("%26%20", URI_RESERVED).as_deref(), Some("%26 "));
    assert_eq!(uri_decode("%E0%A4%A", ""), None);
    assert_eq!(uri_decode("%C3", ""), None);
  }

  #[test]
  fn test_escape() {
    assert_eq!(escape_str("a b+ü\u{4e2d}"), "a%20b+%FC%u4E2D");
    assert_eq!(unescape_str("a%20b+%FC%u4E2D%zz"), "a b+ü\u{4e2d}%zz");
  }
}
