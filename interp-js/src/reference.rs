use crate::error::AssignError;
use crate::object::JsObject;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
  Const,
  Let,
  Var,
}

/// A binding's storage. Closures that captured the same scope share the slot.
#[derive(Debug)]
pub struct ScopeSlot {
  pub kind: SlotKind,
  value: RefCell<Value>,
}

impl ScopeSlot {
  pub fn new(kind: SlotKind, value: Value) -> ScopeSlot {
    ScopeSlot {
      kind,
      value: RefCell::new(value),
    }
  }
}

/// Something that can be read and written: a binding in a scope, or a property on an object.
#[derive(Clone, Debug)]
pub enum VarRef {
  Slot(Rc<ScopeSlot>),
  Property { object: JsObject, key: String },
}

impl VarRef {
  pub fn slot(kind: SlotKind, value: Value) -> VarRef {
    VarRef::Slot(Rc::new(ScopeSlot::new(kind, value)))
  }

  pub fn property(object: JsObject, key: impl Into<String>) -> VarRef {
    VarRef::Property {
      object,
      key: key.into(),
    }
  }

  /// The declared kind, for scope slots.
  pub fn kind(&self) -> Option<SlotKind> {
    match self {
      VarRef::Slot(slot) => Some(slot.kind),
      VarRef::Property { .. } => None,
    }
  }

  pub fn get(&self) -> Value {
    match self {
      VarRef::Slot(slot) => slot.value.borrow().clone(),
      VarRef::Property { object, key } => object.get(key),
    }
  }

  /// Writes the value. Const slots reject the write based on their declared kind, whatever they hold.
  pub fn set(&self, value: Value) -> Result<(), AssignError> {
    match self {
      VarRef::Slot(slot) => {
        if slot.kind == SlotKind::Const {
          return Err(AssignError::Const);
        };
        *slot.value.borrow_mut() = value;
        Ok(())
      }
      VarRef::Property { object, key } => {
        if object.set(key, value) {
          Ok(())
        } else {
          Err(AssignError::InvalidArrayLength)
        }
      }
    }
  }

  /// Removes a property. Scope slots can't be deleted.
  pub fn delete(&self) -> bool {
    match self {
      VarRef::Slot(_) => false,
      VarRef::Property { object, key } => object.delete(key),
    }
  }

  /// Initializes a slot regardless of its kind. Only declarations use this.
  pub(crate) fn initialize(&self, value: Value) {
    match self {
      VarRef::Slot(slot) => *slot.value.borrow_mut() = value,
      VarRef::Property { object, key } => {
        object.set(key, value);
      }
    };
  }

  pub fn ptr_eq(&self, other: &VarRef) -> bool {
    match (self, other) {
      (VarRef::Slot(a), VarRef::Slot(b)) => Rc::ptr_eq(a, b),
      (
        VarRef::Property { object: a, key: ka },
        VarRef::Property { object: b, key: kb },
      ) => a.ptr_eq(b) && ka == kb,
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::SlotKind;
  use super::VarRef;
  use crate::error::AssignError;
  use crate::object::JsObject;
  use crate::object::ObjectClass;
  use crate::value::Value;

  #[test]
  fn test_const_check_uses_kind() {
    let c = VarRef::slot(SlotKind::Const, Value::Number(1.0));
    assert_eq!(c.set(Value::Number(2.0)), Err(AssignError::Const));
    assert_eq!(c.get(), Value::Number(1.0));

    // A mutable binding holding the text "const" is still mutable.
    let v = VarRef::slot(SlotKind::Let, Value::from("const"));
    assert_eq!(v.set(Value::Number(3.0)), Ok(()));
    assert_eq!(v.get(), Value::Number(3.0));
  }

  #[test]
  fn test_property_slot() {
    let obj = JsObject::new(ObjectClass::Ordinary, None);
    let r = VarRef::property(obj.clone(), "a");
    assert_eq!(r.get(), Value::Undefined);
    r.set(Value::Bool(true)).unwrap();
    assert_eq!(obj.get("a"), Value::Bool(true));
    assert!(r.delete());
    assert!(!obj.has_own("a"));
  }

  #[test]
  fn test_slots_are_shared() {
    let a = VarRef::slot(SlotKind::Var, Value::Null);
    let b = a.clone();
    b.set(Value::Number(7.0)).unwrap();
    assert_eq!(a.get(), Value::Number(7.0));
    assert!(a.ptr_eq(&b));
  }
}
