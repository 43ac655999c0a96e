use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::ops::to_boolean;
use crate::realm::Realm;
use crate::value::Value;

fn construct(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  let proto = ev.realm().intrinsics.boolean_prototype.clone();
  Ok(Value::Object(JsObject::new(
    ObjectClass::Boolean(to_boolean(&arg(args, 0))),
    Some(proto),
  )))
}

fn this_boolean(ev: &Evaluator<'_>, this: &Value, method: &str) -> Result<bool, VmError> {
  match this {
    Value::Bool(b) => Ok(*b),
    Value::Object(o) => match o.class() {
      ObjectClass::Boolean(b) => Ok(b),
      _ => Err(ev.type_error(format!("Boolean.prototype.{method} requires that 'this' be a Boolean"))),
    },
    _ => Err(ev.type_error(format!("Boolean.prototype.{method} requires that 'this' be a Boolean"))),
  }
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.boolean_prototype;
  method(realm, proto, "toString", 0, |ev, this, _| {
    let b = this_boolean(ev, &this, "toString")?;
    Ok(Value::string(if b { "true" } else { "false" }))
  });
  method(realm, proto, "valueOf", 0, |ev, this, _| {
    Ok(Value::Bool(this_boolean(ev, &this, "valueOf")?))
  });
}

pub fn constructor(realm: &Realm) -> Value {
  Value::Object(realm.new_constructor(
    "Boolean",
    1,
    |_, _, args| Ok(Value::Bool(to_boolean(&arg(args, 0)))),
    construct,
    &realm.intrinsics.boolean_prototype,
  ))
}
