//! `JSON`, and conversions between script values and `serde_json` values for hosts.

use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::realm::ErrorKind;
use crate::realm::Realm;
use crate::value::Value;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Map;
use serde_json::Number;
use serde_json::Serializer;

/// 2^53: integral values below this are written without a fraction.
const MAX_EXACT_INTEGER: f64 = 9007199254740992.0;

fn number_to_json(n: f64) -> serde_json::Value {
  if !n.is_finite() {
    return serde_json::Value::Null;
  };
  if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
    return serde_json::Value::Number(Number::from(n as i64));
  };
  Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

enum Replacer {
  None,
  Function(Value),
  Allowlist(Vec<String>),
}

struct Stringifier<'r> {
  replacer: &'r Replacer,
  // Objects being serialized, outermost first.
  stack: Vec<JsObject>,
}

impl Stringifier<'_> {
  /// Serializes `holder[key]`. `None` means the property is skipped.
  fn property(
    &mut self,
    ev: &mut Evaluator<'_>,
    holder: &JsObject,
    key: &str,
    mut value: Value,
  ) -> Result<Option<serde_json::Value>, VmError> {
    if let Value::Object(obj) = &value {
      let to_json = obj.get("toJSON");
      if to_json.is_callable() {
        value = ev.call(&to_json, value.clone(), &[Value::string(key)])?;
      };
    };
    if let Replacer::Function(f) = self.replacer {
      value = ev.call(f, Value::Object(holder.clone()), &[Value::string(key), value])?;
    };
    if let Value::Object(obj) = &value {
      match obj.class() {
        ObjectClass::Number(_) => value = Value::Number(ev.to_number(&value)?),
        ObjectClass::String(_) => value = Value::String(ev.to_string(&value)?),
        ObjectClass::Boolean(b) => value = Value::Bool(b),
        _ => {}
      };
    };
    Ok(Some(match value {
      Value::Undefined => return Ok(None),
      Value::Null => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(b),
      Value::Number(n) => number_to_json(n),
      Value::String(s) => serde_json::Value::String(s.to_string()),
      Value::Object(obj) if obj.is_callable() => return Ok(None),
      Value::Object(obj) => {
        if self.stack.iter().any(|o| o.ptr_eq(&obj)) {
          return Err(ev.type_error("Converting circular structure to JSON"));
        };
        self.stack.push(obj.clone());
        let out = if obj.is_array() {
          self.array(ev, &obj)
        } else {
          self.object(ev, &obj)
        };
        self.stack.pop();
        out?
      }
    }))
  }

  fn array(&mut self, ev: &mut Evaluator<'_>, arr: &JsObject) -> Result<serde_json::Value, VmError> {
    let mut out = Vec::new();
    for (i, v) in arr.array_elements().into_iter().enumerate() {
      let v = self.property(ev, arr, &i.to_string(), v)?;
      out.push(v.unwrap_or(serde_json::Value::Null));
    }
    Ok(serde_json::Value::Array(out))
  }

  fn object(&mut self, ev: &mut Evaluator<'_>, obj: &JsObject) -> Result<serde_json::Value, VmError> {
    let keys = match self.replacer {
      Replacer::Allowlist(keys) => keys.clone(),
      _ => obj.own_enumerable_keys(),
    };
    let mut out = Map::new();
    for key in keys {
      let v = obj.get(&key);
      if let Some(v) = self.property(ev, obj, &key, v)? {
        out.insert(key, v);
      };
    }
    Ok(serde_json::Value::Object(out))
  }
}

/// The indentation string for the `space` argument. Empty means compact output.
fn indent(ev: &mut Evaluator<'_>, space: &Value) -> Result<String, VmError> {
  let space = match space {
    Value::Object(o) if matches!(o.class(), ObjectClass::Number(_) | ObjectClass::String(_)) => {
      ev.to_primitive(space, crate::exec::Hint::Default)?
    }
    other => other.clone(),
  };
  Ok(match space {
    Value::Number(n) => " ".repeat(n.clamp(0.0, 10.0) as usize),
    Value::String(s) => s.chars().take(10).collect(),
    _ => String::new(),
  })
}

/// Writes a JSON tree the way `JSON.stringify` lays it out.
pub fn write_json(json: &serde_json::Value, indent: &str) -> String {
  if indent.is_empty() {
    return json.to_string();
  };
  let mut buf = Vec::new();
  let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
  // Writing into a Vec cannot fail, and serde_json only emits UTF-8.
  if json.serialize(&mut ser).is_err() {
    return json.to_string();
  };
  String::from_utf8(buf).unwrap_or_else(|_| json.to_string())
}

fn stringify(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let replacer = match arg(args, 1) {
    f if f.is_callable() => Replacer::Function(f),
    Value::Object(o) if o.is_array() => {
      let mut keys = Vec::new();
      for k in o.array_elements() {
        let k = match &k {
          Value::String(_) | Value::Number(_) => ev.to_string(&k)?.to_string(),
          _ => continue,
        };
        if !keys.contains(&k) {
          keys.push(k);
        };
      }
      Replacer::Allowlist(keys)
    }
    _ => Replacer::None,
  };
  let indent = indent(ev, &arg(args, 2))?;
  let holder = ev.new_object();
  let value = arg(args, 0);
  holder.set("", value.clone());
  let mut stringifier = Stringifier {
    replacer: &replacer,
    stack: Vec::new(),
  };
  Ok(match stringifier.property(ev, &holder, "", value)? {
    Some(json) => Value::string(write_json(&json, &indent)),
    None => Value::Undefined,
  })
}

/// Builds realm objects from a parsed JSON tree.
fn json_to_value(ev: &Evaluator<'_>, json: &serde_json::Value) -> Value {
  match json {
    serde_json::Value::Null => Value::Null,
    serde_json::Value::Bool(b) => Value::Bool(*b),
    serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
    serde_json::Value::String(s) => Value::string(s.as_str()),
    serde_json::Value::Array(items) => {
      Value::Object(ev.new_array(items.iter().map(|v| json_to_value(ev, v))))
    }
    serde_json::Value::Object(map) => {
      let obj = ev.new_object();
      for (k, v) in map {
        obj.set(k, json_to_value(ev, v));
      }
      Value::Object(obj)
    }
  }
}

/// Applies a `JSON.parse` reviver bottom-up.
fn revive(ev: &mut Evaluator<'_>, reviver: &Value, holder: &JsObject, key: &str) -> Result<Value, VmError> {
  let value = holder.get(key);
  if let Value::Object(obj) = &value {
    let keys = if obj.is_array() {
      (0..obj.array_length()).map(|i| i.to_string()).collect()
    } else {
      obj.own_enumerable_keys()
    };
    for k in keys {
      match revive(ev, reviver, obj, &k)? {
        Value::Undefined => {
          obj.delete(&k);
        }
        v => {
          obj.set(&k, v);
        }
      };
    }
  };
  ev.call(reviver, Value::Object(holder.clone()), &[Value::string(key), value])
}

fn parse(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let text = ev.to_string(&arg(args, 0))?;
  let json: serde_json::Value = serde_json::from_str(&text)
    .map_err(|e| ev.error(ErrorKind::SyntaxError, format!("Unexpected token in JSON: {e}")))?;
  let value = json_to_value(ev, &json);
  let reviver = arg(args, 1);
  if !reviver.is_callable() {
    return Ok(value);
  };
  let root = ev.new_object();
  root.set("", value);
  revive(ev, &reviver, &root, "")
}

pub fn create(realm: &Realm) -> Value {
  let json = realm.new_object();
  method(realm, &json, "parse", 2, parse);
  method(realm, &json, "stringify", 3, stringify);
  Value::Object(json)
}

/// Converts a value to JSON for a host, without calling into script code.
/// Functions and `undefined` become `null`; cycles are cut with `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
  fn convert(value: &Value, stack: &mut Vec<JsObject>) -> serde_json::Value {
    match value {
      Value::Undefined | Value::Null => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(*b),
      Value::Number(n) => number_to_json(*n),
      Value::String(s) => serde_json::Value::String(s.to_string()),
      Value::Object(obj) => {
        if obj.is_callable() || stack.iter().any(|o| o.ptr_eq(obj)) {
          return serde_json::Value::Null;
        };
        let out = match obj.class() {
          ObjectClass::Boolean(b) => return serde_json::Value::Bool(b),
          ObjectClass::Number(n) => return number_to_json(n),
          ObjectClass::String(s) => return serde_json::Value::String(s.to_string()),
          ObjectClass::Array => {
            stack.push(obj.clone());
            let items = obj.array_elements().iter().map(|v| convert(v, stack)).collect();
            serde_json::Value::Array(items)
          }
          _ => {
            stack.push(obj.clone());
            let mut map = Map::new();
            for key in obj.own_enumerable_keys() {
              let v = obj.get(&key);
              if v.is_undefined() || v.is_callable() {
                continue;
              };
              map.insert(key, convert(&v, stack));
            }
            serde_json::Value::Object(map)
          }
        };
        stack.pop();
        out
      }
    }
  }
  convert(value, &mut Vec::new())
}

impl Value {
  /// Builds a host value from JSON. Objects and arrays are linked to the standard prototypes when
  /// they enter a run.
  pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
      serde_json::Value::String(s) => Value::string(s.as_str()),
      serde_json::Value::Array(items) => {
        Value::Object(JsObject::new_array(items.iter().map(Value::from_json)))
      }
      serde_json::Value::Object(map) => {
        let obj = JsObject::new_object();
        for (k, v) in map {
          obj.set(k, Value::from_json(v));
        }
        Value::Object(obj)
      }
    }
  }

  /// See [`value_to_json`].
  pub fn to_json(&self) -> serde_json::Value {
    value_to_json(self)
  }
}

#[cfg(test)]
mod tests {
  use super::value_to_json;
  use super::write_json;
  use crate::object::JsObject;
  use crate::value::Value;
  use serde_json::json;

  #[test]
  fn test_value_json_conversion() {
    let json = json!({"b": [1, 2.5, null], "a": "x", "c": {"d": true}});
    let value = Value::from_json(&json);
    assert_eq!(value_to_json(&value), json);
  }

  #[test]
  fn test_value_to_json_cuts_cycles() {
    let obj = JsObject::new_object();
    obj.set("self", Value::Object(obj.clone()));
    obj.set("n", Value::Number(f64::NAN));
    assert_eq!(value_to_json(&Value::Object(obj)), json!({"self": null, "n": null}));
  }

  #[test]
  fn test_write_json_indents() {
    let json = json!({"a": [1, 2], "b": {}});
    assert_eq!(write_json(&json, ""), r#"{"a":[1,2],"b":{}}"#);
    assert_eq!(
      write_json(&json, "  "),
      "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}"
    );
  }
}
