use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::ops;
use crate::realm::Realm;
use crate::value::Value;

fn construct(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  let value = arg(args, 0);
  if value.is_nullish() {
    return Ok(Value::Object(ev.new_object()));
  };
  Ok(Value::Object(ev.to_object(&value)?))
}

fn keys(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let obj = ev.to_object(&arg(args, 0))?;
  let keys = obj.own_enumerable_keys().into_iter().map(Value::from);
  Ok(Value::Object(ev.new_array(keys)))
}

fn get_own_property_names(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let obj = ev.to_object(&arg(args, 0))?;
  let keys = obj.own_keys().into_iter().map(Value::from);
  Ok(Value::Object(ev.new_array(keys)))
}

fn create(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let proto = match arg(args, 0) {
    Value::Object(o) => Some(o),
    Value::Null => None,
    other => {
      return Err(ev.type_error(format!(
        "Object prototype may only be an Object or null: {}",
        ops::inspect(&other)
      )))
    }
  };
  let obj = JsObject::new(ObjectClass::Ordinary, proto);
  // Only data descriptors: `value` and `enumerable`.
  if let Value::Object(props) = arg(args, 1) {
    for key in props.own_enumerable_keys() {
      let Value::Object(desc) = props.get(&key) else {
        return Err(ev.type_error(format!("Property description must be an object: {key}")));
      };
      obj.define(&key, desc.get("value"), ops::to_boolean(&desc.get("enumerable")));
    }
  };
  Ok(Value::Object(obj))
}

fn assign(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let target = ev.to_object(&arg(args, 0))?;
  for source in args.iter().skip(1) {
    if source.is_nullish() {
      continue;
    };
    let source = ev.to_object(source)?;
    for key in source.own_enumerable_keys() {
      if !target.set(&key, source.get(&key)) {
        return Err(ev.range_error("Invalid array length"));
      };
    }
  }
  Ok(Value::Object(target))
}

fn get_prototype_of(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let obj = ev.to_object(&arg(args, 0))?;
  Ok(obj.proto().map(Value::Object).unwrap_or(Value::Null))
}

// Properties are always writable, so freezing only returns its argument.
fn freeze(_ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  Ok(arg(args, 0))
}

fn has_own_property(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let key = ev.to_property_key(&arg(args, 0))?;
  let obj = ev.to_object(&this)?;
  Ok(Value::Bool(obj.has_own(&key)))
}

fn is_prototype_of(_ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (Value::Object(proto), Value::Object(obj)) = (this, arg(args, 0)) else {
    return Ok(Value::Bool(false));
  };
  let mut cur = obj.proto();
  while let Some(o) = cur {
    if o.ptr_eq(&proto) {
      return Ok(Value::Bool(true));
    };
    cur = o.proto();
  }
  Ok(Value::Bool(false))
}

fn to_string(_ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let tag = match &this {
    Value::Undefined => "Undefined",
    Value::Null => "Null",
    Value::Bool(_) => "Boolean",
    Value::Number(_) => "Number",
    Value::String(_) => "String",
    Value::Object(o) => o.borrow().class.tag(),
  };
  Ok(Value::string(format!("[object {tag}]")))
}

fn value_of(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  Ok(Value::Object(ev.to_object(&this)?))
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.object_prototype;
  method(realm, proto, "hasOwnProperty", 1, has_own_property);
  method(realm, proto, "isPrototypeOf", 1, is_prototype_of);
  method(realm, proto, "toString", 0, to_string);
  method(realm, proto, "valueOf", 0, value_of);
}

pub fn constructor(realm: &Realm) -> Value {
  let ctor = realm.new_constructor(
    "Object",
    1,
    |ev, _, args| construct(ev, args),
    construct,
    &realm.intrinsics.object_prototype,
  );
  method(realm, &ctor, "keys", 1, keys);
  method(realm, &ctor, "getOwnPropertyNames", 1, get_own_property_names);
  method(realm, &ctor, "create", 2, create);
  method(realm, &ctor, "assign", 2, assign);
  method(realm, &ctor, "getPrototypeOf", 1, get_prototype_of);
  method(realm, &ctor, "freeze", 1, freeze);
  Value::Object(ctor)
}
