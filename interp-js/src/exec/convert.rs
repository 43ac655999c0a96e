use super::Evaluator;
use crate::error::VmError;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::ops;
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// The preferred type for `ToPrimitive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
  Default,
  Number,
  String,
}

impl<'a> Evaluator<'a> {
  pub fn to_primitive(&mut self, value: &Value, hint: Hint) -> Result<Value, VmError> {
    let Value::Object(obj) = value else {
      return Ok(value.clone());
    };
    let order = match hint {
      Hint::String => ["toString", "valueOf"],
      Hint::Default | Hint::Number => ["valueOf", "toString"],
    };
    for name in order {
      let method = obj.get(name);
      if method.is_callable() {
        let result = self.call(&method, value.clone(), &[])?;
        if !matches!(result, Value::Object(_)) {
          return Ok(result);
        };
      };
    }
    Err(self.type_error("Cannot convert object to primitive value"))
  }

  pub fn to_number(&mut self, value: &Value) -> Result<f64, VmError> {
    Ok(match value {
      Value::Undefined => f64::NAN,
      Value::Null => 0.0,
      Value::Bool(b) => *b as u8 as f64,
      Value::Number(n) => *n,
      Value::String(s) => ops::string_to_number(s),
      Value::Object(_) => {
        let prim = self.to_primitive(value, Hint::Number)?;
        return self.to_number(&prim);
      }
    })
  }

  pub fn to_string(&mut self, value: &Value) -> Result<Rc<str>, VmError> {
    match value {
      Value::Object(_) => {
        let prim = self.to_primitive(value, Hint::String)?;
        Ok(ops::primitive_to_string(&prim))
      }
      other => Ok(ops::primitive_to_string(other)),
    }
  }

  pub fn to_property_key(&mut self, value: &Value) -> Result<String, VmError> {
    Ok(self.to_string(value)?.to_string())
  }

  pub fn to_int32(&mut self, value: &Value) -> Result<i32, VmError> {
    Ok(ops::to_int32(self.to_number(value)?))
  }

  pub fn to_uint32(&mut self, value: &Value) -> Result<u32, VmError> {
    Ok(ops::to_uint32(self.to_number(value)?))
  }

  /// `ToIntegerOrInfinity`.
  pub fn to_integer(&mut self, value: &Value) -> Result<f64, VmError> {
    Ok(ops::to_integer(self.to_number(value)?))
  }

  /// Boxes primitives; fails for `undefined` and `null`.
  pub fn to_object(&mut self, value: &Value) -> Result<JsObject, VmError> {
    let intrinsics = &self.realm.intrinsics;
    let (class, proto) = match value {
      Value::Object(o) => return Ok(o.clone()),
      Value::Undefined | Value::Null => {
        return Err(self.type_error("Cannot convert undefined or null to object"))
      }
      Value::Bool(b) => (ObjectClass::Boolean(*b), &intrinsics.boolean_prototype),
      Value::Number(n) => (ObjectClass::Number(*n), &intrinsics.number_prototype),
      Value::String(s) => (ObjectClass::String(s.clone()), &intrinsics.string_prototype),
    };
    Ok(JsObject::new(class, Some(proto.clone())))
  }

  /// Reads a property of any value. Primitives use their prototype's properties.
  pub fn get_property(&mut self, base: &Value, key: &str) -> Result<Value, VmError> {
    let intrinsics = &self.realm.intrinsics;
    Ok(match base {
      Value::Object(o) => o.get(key),
      Value::String(s) => match ops::string_own_property(s, key) {
        Some(v) => v,
        None => intrinsics.string_prototype.get(key),
      },
      Value::Number(_) => intrinsics.number_prototype.get(key),
      Value::Bool(_) => intrinsics.boolean_prototype.get(key),
      Value::Undefined | Value::Null => {
        return Err(self.type_error(format!(
          "Cannot read properties of {} (reading '{key}')",
          ops::primitive_to_string(base)
        )))
      }
    })
  }

  /// `==`.
  pub fn loose_equals(&mut self, a: &Value, b: &Value) -> Result<bool, VmError> {
    Ok(match (a, b) {
      (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
      (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
      (Value::Number(_), Value::String(s)) => ops::strict_equals(a, &Value::Number(ops::string_to_number(s))),
      (Value::String(s), Value::Number(_)) => ops::strict_equals(&Value::Number(ops::string_to_number(s)), b),
      (Value::Bool(x), _) => return self.loose_equals(&Value::Number(*x as u8 as f64), b),
      (_, Value::Bool(y)) => return self.loose_equals(a, &Value::Number(*y as u8 as f64)),
      (Value::Object(_), Value::Object(_)) => ops::strict_equals(a, b),
      (Value::Object(_), _) => {
        let prim = self.to_primitive(a, Hint::Default)?;
        return self.loose_equals(&prim, b);
      }
      (_, Value::Object(_)) => {
        let prim = self.to_primitive(b, Hint::Default)?;
        return self.loose_equals(a, &prim);
      }
      _ => ops::strict_equals(a, b),
    })
  }

  /// The abstract relational comparison. `None` means a NaN was involved.
  pub fn compare(&mut self, a: &Value, b: &Value) -> Result<Option<Ordering>, VmError> {
    let pa = self.to_primitive(a, Hint::Number)?;
    let pb = self.to_primitive(b, Hint::Number)?;
    if let (Value::String(x), Value::String(y)) = (&pa, &pb) {
      // Strings compare by UTF-16 code units.
      return Ok(Some(x.encode_utf16().cmp(y.encode_utf16())));
    };
    let x = self.to_number(&pa)?;
    let y = self.to_number(&pb)?;
    Ok(x.partial_cmp(&y))
  }
}
