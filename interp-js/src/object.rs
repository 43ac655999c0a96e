use crate::function::Callable;
use crate::value::Value;
use ahash::HashMap;
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::rc::Rc;

/// What kind of object this is, and any internal state that goes with it.
#[derive(Clone)]
pub enum ObjectClass {
  Ordinary,
  Array,
  Function(Callable),
  Error,
  Arguments,
  Boolean(bool),
  Number(f64),
  String(Rc<str>),
}

impl ObjectClass {
  /// The tag used by `Object.prototype.toString`.
  pub fn tag(&self) -> &'static str {
    match self {
      ObjectClass::Ordinary => "Object",
      ObjectClass::Array => "Array",
      ObjectClass::Function(_) => "Function",
      ObjectClass::Error => "Error",
      ObjectClass::Arguments => "Arguments",
      ObjectClass::Boolean(_) => "Boolean",
      ObjectClass::Number(_) => "Number",
      ObjectClass::String(_) => "String",
    }
  }
}

#[derive(Clone, Debug)]
pub struct Property {
  pub value: Value,
  pub enumerable: bool,
}

impl Property {
  pub fn enumerable(value: Value) -> Property {
    Property {
      value,
      enumerable: true,
    }
  }

  pub fn hidden(value: Value) -> Property {
    Property {
      value,
      enumerable: false,
    }
  }
}

/// Returns the numeric value of `key` if it's a canonical array index such as `"0"` or `"17"`.
pub fn array_index(key: &str) -> Option<u32> {
  let bytes = key.as_bytes();
  if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(u8::is_ascii_digit) {
    return None;
  };
  if bytes.len() > 1 && bytes[0] == b'0' {
    return None;
  };
  key.parse::<u64>().ok().filter(|i| *i < u32::MAX as u64).map(|i| i as u32)
}

/// An insertion-ordered property map.
#[derive(Default)]
pub struct PropertyMap {
  entries: Vec<(String, Property)>,
  index: HashMap<String, usize>,
}

impl PropertyMap {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.index.contains_key(key)
  }

  pub fn get(&self, key: &str) -> Option<&Property> {
    self.index.get(key).map(|&i| &self.entries[i].1)
  }

  /// Inserts or replaces a property. A replaced property keeps its position.
  pub fn insert(&mut self, key: String, prop: Property) {
    match self.index.get(&key) {
      Some(&i) => self.entries[i].1 = prop,
      None => {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, prop));
      }
    };
  }

  /// Replaces the value of an existing property, or inserts an enumerable one.
  pub fn set_value(&mut self, key: &str, value: Value) {
    match self.index.get(key) {
      Some(&i) => self.entries[i].1.value = value,
      None => self.insert(key.to_string(), Property::enumerable(value)),
    };
  }

  pub fn remove(&mut self, key: &str) -> Option<Property> {
    let i = self.index.remove(key)?;
    let (_, prop) = self.entries.remove(i);
    for (_, pos) in self.index.iter_mut() {
      if *pos > i {
        *pos -= 1;
      };
    }
    Some(prop)
  }

  /// Keys in ECMAScript property order: array indices ascending, then other keys in insertion order.
  pub fn keys(&self) -> Vec<String> {
    let mut indices = Vec::new();
    let mut names = Vec::new();
    for (key, _) in self.entries.iter() {
      match array_index(key) {
        Some(i) => indices.push((i, key.clone())),
        None => names.push(key.clone()),
      };
    }
    indices.sort_by_key(|(i, _)| *i);
    indices.into_iter().map(|(_, k)| k).chain(names).collect()
  }

  pub fn enumerable_keys(&self) -> Vec<String> {
    self
      .keys()
      .into_iter()
      .filter(|k| self.get(k).is_some_and(|p| p.enumerable))
      .collect()
  }
}

pub struct ObjectData {
  pub class: ObjectClass,
  pub proto: Option<JsObject>,
  pub properties: PropertyMap,
  // Set for objects created by the host before a realm exists; cleared once linked to the realm's prototypes.
  pub(crate) unlinked: bool,
}

/// A shared handle to a heap object. Cloning the handle aliases the same object.
#[derive(Clone)]
pub struct JsObject(Rc<RefCell<ObjectData>>);

impl JsObject {
  pub fn new(class: ObjectClass, proto: Option<JsObject>) -> JsObject {
    let obj = JsObject(Rc::new(RefCell::new(ObjectData {
      class,
      proto,
      properties: PropertyMap::default(),
      unlinked: false,
    })));
    if obj.is_array() {
      obj.define("length", Value::Number(0.0), false);
    };
    obj
  }

  /// Creates an object without a prototype, to be linked to the standard prototypes when passed into a run.
  pub fn host(class: ObjectClass) -> JsObject {
    let obj = JsObject::new(class, None);
    obj.borrow_mut().unlinked = true;
    obj
  }

  pub fn ptr_eq(&self, other: &JsObject) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  pub fn borrow(&self) -> Ref<'_, ObjectData> {
    self.0.borrow()
  }

  pub fn borrow_mut(&self) -> RefMut<'_, ObjectData> {
    self.0.borrow_mut()
  }

  pub fn class(&self) -> ObjectClass {
    self.borrow().class.clone()
  }

  pub fn proto(&self) -> Option<JsObject> {
    self.borrow().proto.clone()
  }

  pub fn is_array(&self) -> bool {
    matches!(self.borrow().class, ObjectClass::Array)
  }

  pub fn is_callable(&self) -> bool {
    matches!(self.borrow().class, ObjectClass::Function(_))
  }

  pub fn callable(&self) -> Option<Callable> {
    match &self.borrow().class {
      ObjectClass::Function(c) => Some(c.clone()),
      _ => None,
    }
  }

  pub fn get_own(&self, key: &str) -> Option<Value> {
    let data = self.borrow();
    if let Some(p) = data.properties.get(key) {
      return Some(p.value.clone());
    };
    // Boxed strings expose their characters and length.
    if let ObjectClass::String(s) = &data.class {
      return crate::ops::string_own_property(s, key);
    };
    None
  }

  pub fn has_own(&self, key: &str) -> bool {
    self.get_own(key).is_some()
  }

  /// Reads a property, following the prototype chain.
  pub fn get(&self, key: &str) -> Value {
    let mut cur = self.clone();
    loop {
      if let Some(v) = cur.get_own(key) {
        return v;
      };
      match cur.proto() {
        Some(p) => cur = p,
        None => return Value::Undefined,
      };
    }
  }

  pub fn has_property(&self, key: &str) -> bool {
    let mut cur = self.clone();
    loop {
      if cur.has_own(key) {
        return true;
      };
      match cur.proto() {
        Some(p) => cur = p,
        None => return false,
      };
    }
  }

  /// Writes an own property, creating it if absent. Arrays keep `length` in sync.
  /// Returns false if the write was rejected (an invalid array length).
  pub fn set(&self, key: &str, value: Value) -> bool {
    if self.is_array() {
      if key == "length" {
        return self.set_array_length(&value);
      };
      if let Some(i) = array_index(key) {
        let len = self.array_length();
        self.borrow_mut().properties.set_value(key, value);
        if i as u64 >= len as u64 {
          self.borrow_mut().properties.set_value("length", Value::Number(i as f64 + 1.0));
        };
        return true;
      };
    };
    self.borrow_mut().properties.set_value(key, value);
    true
  }

  /// Creates or replaces an own property with the given enumerability.
  pub fn define(&self, key: &str, value: Value, enumerable: bool) {
    self
      .borrow_mut()
      .properties
      .insert(key.to_string(), Property { value, enumerable });
  }

  pub fn delete(&self, key: &str) -> bool {
    if self.is_array() && key == "length" {
      return false;
    };
    self.borrow_mut().properties.remove(key);
    true
  }

  pub fn own_keys(&self) -> Vec<String> {
    let data = self.borrow();
    let mut keys = match &data.class {
      ObjectClass::String(s) => (0..crate::ops::utf16_len(s)).map(|i| i.to_string()).collect(),
      _ => Vec::new(),
    };
    keys.extend(data.properties.keys());
    keys
  }

  pub fn own_enumerable_keys(&self) -> Vec<String> {
    let data = self.borrow();
    let mut keys = match &data.class {
      ObjectClass::String(s) => (0..crate::ops::utf16_len(s)).map(|i| i.to_string()).collect(),
      _ => Vec::new(),
    };
    keys.extend(data.properties.enumerable_keys());
    keys
  }

  pub fn array_length(&self) -> u32 {
    match self.borrow().properties.get("length").map(|p| &p.value) {
      Some(Value::Number(n)) => *n as u32,
      _ => 0,
    }
  }

  fn set_array_length(&self, value: &Value) -> bool {
    let new_len = match value {
      Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < u32::MAX as f64 => *n as u32,
      _ => return false,
    };
    let old_len = self.array_length();
    if new_len < old_len {
      let mut data = self.borrow_mut();
      let doomed: Vec<String> = data
        .properties
        .keys()
        .into_iter()
        .filter(|k| array_index(k).is_some_and(|i| i >= new_len))
        .collect();
      for k in doomed {
        data.properties.remove(&k);
      }
    };
    self
      .borrow_mut()
      .properties
      .insert("length".to_string(), Property::hidden(Value::Number(new_len as f64)));
    true
  }

  /// Appends to an array, updating its length.
  pub fn push(&self, value: Value) {
    let len = self.array_length();
    self.set(&len.to_string(), value);
  }

  /// Collects the elements `0..length` of an array-like object.
  pub fn array_elements(&self) -> Vec<Value> {
    let len = match self.get("length") {
      Value::Number(n) if n > 0.0 => n as u32,
      _ => 0,
    };
    (0..len).map(|i| self.get(&i.to_string())).collect()
  }
}

impl Debug for JsObject {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self.0.try_borrow() {
      Ok(data) => match &data.class {
        ObjectClass::Function(c) => write!(f, "[Function: {}]", c.name()),
        class => write!(f, "[object {}]", class.tag()),
      },
      Err(_) => f.write_str("[object]"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::array_index;
  use super::JsObject;
  use super::ObjectClass;
  use super::PropertyMap;
  use super::Property;
  use crate::value::Value;

  #[test]
  fn test_array_index() {
    assert_eq!(array_index("0"), Some(0));
    assert_eq!(array_index("42"), Some(42));
    assert_eq!(array_index("01"), None);
    assert_eq!(array_index("-1"), None);
    assert_eq!(array_index("4294967295"), None);
    assert_eq!(array_index("length"), None);
  }

  #[test]
  fn test_property_order() {
    let mut map = PropertyMap::default();
    map.insert("b".into(), Property::enumerable(Value::Null));
    map.insert("2".into(), Property::enumerable(Value::Null));
    map.insert("a".into(), Property::enumerable(Value::Null));
    map.insert("0".into(), Property::hidden(Value::Null));
    assert_eq!(map.keys(), vec!["0", "2", "b", "a"]);
    assert_eq!(map.enumerable_keys(), vec!["2", "b", "a"]);
    map.remove("b");
    map.set_value("a", Value::Bool(true));
    assert_eq!(map.keys(), vec!["0", "2", "a"]);
    assert_eq!(map.get("a").unwrap().value, Value::Bool(true));
  }

  #[test]
  fn test_array_length_tracking() {
    let arr = JsObject::new(ObjectClass::Array, None);
    arr.push(Value::Number(1.0));
    arr.set("4", Value::Number(5.0));
    assert_eq!(arr.array_length(), 5);
    assert!(arr.set("length", Value::Number(1.0)));
    assert_eq!(arr.array_length(), 1);
    assert!(!arr.has_own("4"));
    assert!(!arr.set("length", Value::Number(-1.0)));
    assert_eq!(arr.own_enumerable_keys(), vec!["0"]);
  }

  #[test]
  fn test_prototype_chain() {
    let proto = JsObject::new(ObjectClass::Ordinary, None);
    proto.set("inherited", Value::Number(1.0));
    let obj = JsObject::new(ObjectClass::Ordinary, Some(proto.clone()));
    assert_eq!(obj.get("inherited"), Value::Number(1.0));
    assert!(obj.has_property("inherited"));
    assert!(!obj.has_own("inherited"));
    obj.set("inherited", Value::Number(2.0));
    assert_eq!(proto.get("inherited"), Value::Number(1.0));
  }
}
