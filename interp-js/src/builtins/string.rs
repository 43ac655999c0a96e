use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::ops;
use crate::realm::Realm;
use crate::value::Value;
use parse_script_js::char::is_line_terminator;
use parse_script_js::char::is_whitespace;
use std::rc::Rc;

fn call(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  match args.first() {
    None => Ok(Value::string("")),
    Some(v) => Ok(Value::String(ev.to_string(v)?)),
  }
}

fn construct(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  let s = match args.first() {
    None => "".into(),
    Some(v) => ev.to_string(v)?,
  };
  let proto = ev.realm().intrinsics.string_prototype.clone();
  Ok(Value::Object(JsObject::new(ObjectClass::String(s), Some(proto))))
}

fn from_char_code(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut units = Vec::with_capacity(args.len());
  for a in args {
    units.push(ev.to_uint32(a)? as u16);
  }
  Ok(Value::string(ops::string_from_utf16(&units)))
}

/// The string a method was called on. Boxed strings are unwrapped.
fn this_string(ev: &mut Evaluator<'_>, this: &Value, method: &str) -> Result<Rc<str>, VmError> {
  match this {
    Value::String(s) => Ok(s.clone()),
    Value::Undefined | Value::Null => Err(ev.type_error(format!(
      "String.prototype.{method} called on null or undefined"
    ))),
    Value::Object(o) => match o.class() {
      ObjectClass::String(s) => Ok(s),
      _ => ev.to_string(this),
    },
    other => ev.to_string(other),
  }
}

/// A position argument clamped to `0..=len`.
fn position(ev: &mut Evaluator<'_>, value: &Value, len: usize, default: usize) -> Result<usize, VmError> {
  if value.is_undefined() {
    return Ok(default);
  };
  Ok(ev.to_integer(value)?.clamp(0.0, len as f64) as usize)
}

/// A position argument where negative values count from the end.
fn relative(ev: &mut Evaluator<'_>, value: &Value, len: usize, default: usize) -> Result<usize, VmError> {
  if value.is_undefined() {
    return Ok(default);
  };
  let rel = ev.to_integer(value)?;
  Ok(if rel < 0.0 {
    (len as f64 + rel).max(0.0) as usize
  } else {
    rel.min(len as f64) as usize
  })
}

fn char_at(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "charAt")?;
  let i = ev.to_integer(&arg(args, 0))?;
  if i < 0.0 || i >= ops::utf16_len(&s) as f64 {
    return Ok(Value::string(""));
  };
  let i = i as usize;
  Ok(Value::string(ops::utf16_slice(&s, i, i + 1)))
}

fn char_code_at(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "charCodeAt")?;
  let i = ev.to_integer(&arg(args, 0))?;
  if i < 0.0 {
    return Ok(Value::Number(f64::NAN));
  };
  Ok(Value::Number(
    ops::utf16_unit_at(&s, i as usize).map_or(f64::NAN, f64::from),
  ))
}

fn index_of(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "indexOf")?;
  let needle = ev.to_string(&arg(args, 0))?;
  let from = position(ev, &arg(args, 1), ops::utf16_len(&s), 0)?;
  let start = ops::byte_offset(&s, from);
  let found = s[start..].find(&*needle).map(|i| ops::utf16_offset(&s, start + i));
  Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

fn last_index_of(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "lastIndexOf")?;
  let needle = ev.to_string(&arg(args, 0))?;
  let len = ops::utf16_len(&s);
  let from = match ev.to_number(&arg(args, 1))? {
    n if n.is_nan() => len,
    n => ops::to_integer(n).clamp(0.0, len as f64) as usize,
  };
  // The match may start at `from` at the latest.
  let end = (ops::byte_offset(&s, from) + needle.len()).min(s.len());
  let found = s
    .get(..end)
    .and_then(|h| h.rfind(&*needle))
    .map(|i| ops::utf16_offset(&s, i));
  Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

fn includes(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let found = index_of(ev, this, args)?;
  Ok(Value::Bool(found.as_number().is_some_and(|i| i >= 0.0)))
}

fn starts_with(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "startsWith")?;
  let needle = ev.to_string(&arg(args, 0))?;
  let from = position(ev, &arg(args, 1), ops::utf16_len(&s), 0)?;
  let units: Vec<u16> = s.encode_utf16().collect();
  let needle: Vec<u16> = needle.encode_utf16().collect();
  Ok(Value::Bool(units[from..].starts_with(&needle)))
}

fn ends_with(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "endsWith")?;
  let needle = ev.to_string(&arg(args, 0))?;
  let len = ops::utf16_len(&s);
  let end = position(ev, &arg(args, 1), len, len)?;
  let units: Vec<u16> = s.encode_utf16().collect();
  let needle: Vec<u16> = needle.encode_utf16().collect();
  Ok(Value::Bool(units[..end].ends_with(&needle)))
}

fn slice(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "slice")?;
  let len = ops::utf16_len(&s);
  let start = relative(ev, &arg(args, 0), len, 0)?;
  let end = relative(ev, &arg(args, 1), len, len)?;
  Ok(Value::string(ops::utf16_slice(&s, start, end.max(start))))
}

fn substring(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "substring")?;
  let len = ops::utf16_len(&s);
  let a = position(ev, &arg(args, 0), len, 0)?;
  let b = position(ev, &arg(args, 1), len, len)?;
  Ok(Value::string(ops::utf16_slice(&s, a.min(b), a.max(b))))
}

fn substr(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "substr")?;
  let len = ops::utf16_len(&s);
  let start = relative(ev, &arg(args, 0), len, 0)?;
  let count = position(ev, &arg(args, 1), len - start, len - start)?;
  Ok(Value::string(ops::utf16_slice(&s, start, start + count)))
}

fn to_upper_case(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "toUpperCase")?;
  Ok(Value::string(s.to_uppercase()))
}

fn to_lower_case(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "toLowerCase")?;
  Ok(Value::string(s.to_lowercase()))
}

fn is_trimmed(c: char) -> bool {
  is_whitespace(c) || is_line_terminator(c)
}

fn trim(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "trim")?;
  Ok(Value::string(s.trim_matches(is_trimmed)))
}

fn trim_start(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "trimStart")?;
  Ok(Value::string(s.trim_start_matches(is_trimmed)))
}

fn trim_end(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "trimEnd")?;
  Ok(Value::string(s.trim_end_matches(is_trimmed)))
}

fn split(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "split")?;
  let limit = match arg(args, 1) {
    Value::Undefined => u32::MAX as usize,
    other => ev.to_uint32(&other)? as usize,
  };
  let parts: Vec<Value> = match arg(args, 0) {
    Value::Undefined => vec![Value::String(s)],
    sep => {
      let sep = ev.to_string(&sep)?;
      if sep.is_empty() {
        let units: Vec<u16> = s.encode_utf16().collect();
        units
          .iter()
          .map(|u| Value::string(ops::string_from_utf16(&[*u])))
          .collect()
      } else {
        s.split(&*sep).map(Value::from).collect()
      }
    }
  };
  Ok(Value::Object(ev.new_array(parts.into_iter().take(limit))))
}

/// Expands `$$`, `$&`, `` $` `` and `$'` in a replacement string.
fn expand_replacement(template: &str, matched: &str, before: &str, after: &str) -> String {
  let mut out = String::with_capacity(template.len());
  let mut chars = template.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '$' {
      out.push(c);
      continue;
    };
    match chars.peek() {
      Some('$') => out.push('$'),
      Some('&') => out.push_str(matched),
      Some('`') => out.push_str(before),
      Some('\'') => out.push_str(after),
      _ => {
        out.push('$');
        continue;
      }
    };
    chars.next();
  }
  out
}

fn replace(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "replace")?;
  let pattern = ev.to_string(&arg(args, 0))?;
  let replacement = arg(args, 1);
  let Some(at) = s.find(&*pattern) else {
    return Ok(Value::String(s));
  };
  let (before, rest) = s.split_at(at);
  let after = &rest[pattern.len()..];
  let inserted: Rc<str> = if replacement.is_callable() {
    let offset = Value::Number(ops::utf16_offset(&s, at) as f64);
    let result = ev.call(
      &replacement,
      Value::Undefined,
      &[Value::String(pattern.clone()), offset, Value::String(s.clone())],
    )?;
    ev.to_string(&result)?
  } else {
    let template = ev.to_string(&replacement)?;
    expand_replacement(&template, &pattern, before, after).into()
  };
  Ok(Value::string(format!("{before}{inserted}{after}")))
}

fn concat(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut out = this_string(ev, &this, "concat")?.to_string();
  for a in args {
    out.push_str(&ev.to_string(a)?);
  }
  Ok(Value::string(out))
}

fn repeat(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let s = this_string(ev, &this, "repeat")?;
  let count = ev.to_integer(&arg(args, 0))?;
  if count < 0.0 || count.is_infinite() {
    return Err(ev.range_error(format!("Invalid count value: {}", ops::number_to_string(count))));
  };
  if (s.len() as f64) * count > (1u64 << 29) as f64 {
    return Err(ev.range_error("Invalid string length"));
  };
  Ok(Value::string(s.repeat(count as usize)))
}

fn value_of(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  match &this {
    Value::String(_) => Ok(this),
    Value::Object(o) => match o.class() {
      ObjectClass::String(s) => Ok(Value::String(s)),
      _ => Err(ev.type_error("String.prototype.valueOf requires that 'this' be a String")),
    },
    _ => Err(ev.type_error("String.prototype.valueOf requires that 'this' be a String")),
  }
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.string_prototype;
  method(realm, proto, "charAt", 1, char_at);
  method(realm, proto, "charCodeAt", 1, char_code_at);
  method(realm, proto, "indexOf", 1, index_of);
  method(realm, proto, "lastIndexOf", 1, last_index_of);
  method(realm, proto, "includes", 1, includes);
  method(realm, proto, "startsWith", 1, starts_with);
  method(realm, proto, "endsWith", 1, ends_with);
  method(realm, proto, "slice", 2, slice);
  method(realm, proto, "substring", 2, substring);
  method(realm, proto, "substr", 2, substr);
  method(realm, proto, "toUpperCase", 0, to_upper_case);
  method(realm, proto, "toLowerCase", 0, to_lower_case);
  method(realm, proto, "trim", 0, trim);
  method(realm, proto, "trimStart", 0, trim_start);
  method(realm, proto, "trimEnd", 0, trim_end);
  method(realm, proto, "split", 2, split);
  method(realm, proto, "replace", 2, replace);
  method(realm, proto, "concat", 1, concat);
  method(realm, proto, "repeat", 1, repeat);
  method(realm, proto, "toString", 0, value_of);
  method(realm, proto, "valueOf", 0, value_of);
}

pub fn constructor(realm: &Realm) -> Value {
  let ctor = realm.new_constructor("String", 1, call, construct, &realm.intrinsics.string_prototype);
  method(realm, &ctor, "fromCharCode", 1, from_char_code);
  Value::Object(ctor)
}

#[cfg(test)]
mod tests {
  use super::expand_replacement;

  #[test]
  fn test_expand_replacement() {
    assert_eq!(expand_replacement("[$&]", "b", "a", "c"), "[b]");
    assert_eq!(expand_replacement("$`|$'", "b", "a", "c"), "a|c");
    assert_eq!(expand_replacement("$$1 $x", "b", "a", "c"), "$1 $x");
  }
}
