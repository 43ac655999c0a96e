use crate::object::JsObject;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::rc::Rc;

/// A JavaScript value.
///
/// Objects (including functions) are shared handles; every other variant is copied by value.
#[derive(Clone, Default)]
pub enum Value {
  #[default]
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(Rc<str>),
  Object(JsObject),
}

impl Value {
  pub fn string(s: impl Into<Rc<str>>) -> Value {
    Value::String(s.into())
  }

  /// Reads a property without running script code. Only objects and strings have properties here;
  /// prototype methods of primitives are not visible.
  pub fn get(&self, key: &str) -> Value {
    match self {
      Value::Object(o) => o.get(key),
      Value::String(s) => crate::ops::string_own_property(s, key).unwrap_or_default(),
      _ => Value::Undefined,
    }
  }

  /// Writes an own property of an object. Returns false for primitives and rejected writes.
  pub fn set(&self, key: &str, value: Value) -> bool {
    match self {
      Value::Object(o) => o.set(key, value),
      _ => false,
    }
  }

  pub fn is_undefined(&self) -> bool {
    matches!(self, Value::Undefined)
  }

  pub fn is_nullish(&self) -> bool {
    matches!(self, Value::Undefined | Value::Null)
  }

  pub fn as_object(&self) -> Option<&JsObject> {
    match self {
      Value::Object(o) => Some(o),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn is_callable(&self) -> bool {
    self.as_object().is_some_and(|o| o.is_callable())
  }

  /// The result of the `typeof` operator.
  pub fn type_of(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Null => "object",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Object(o) if o.is_callable() => "function",
      Value::Object(_) => "object",
    }
  }
}

// Same-value comparison for primitives (except NaN != NaN) and identity for objects, i.e. `===`.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) => true,
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      _ => false,
    }
  }
}

impl Debug for Value {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => f.write_str("undefined"),
      Value::Null => f.write_str("null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Number(n) => write!(f, "{}", crate::ops::number_to_string(*n)),
      Value::String(s) => write!(f, "{s:?}"),
      Value::Object(o) => o.fmt(f),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::Number(value as f64)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.into())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value.into())
  }
}

impl From<JsObject> for Value {
  fn from(value: JsObject) -> Self {
    Value::Object(value)
  }
}
