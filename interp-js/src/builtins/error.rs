use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::function::NativeConstruct;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::realm::ErrorKind;
use crate::realm::Realm;
use crate::value::Value;

fn create(ev: &mut Evaluator<'_>, kind: ErrorKind, args: &[Value]) -> Result<Value, VmError> {
  let proto = ev.realm().intrinsics.error_prototype(kind).clone();
  let err = JsObject::new(ObjectClass::Error, Some(proto));
  let message = arg(args, 0);
  if !message.is_undefined() {
    let message = ev.to_string(&message)?;
    err.define("message", Value::String(message), false);
  };
  Ok(Value::Object(err))
}

fn construct_fn(kind: ErrorKind) -> NativeConstruct {
  match kind {
    ErrorKind::Error => |ev, args| create(ev, ErrorKind::Error, args),
    ErrorKind::EvalError => |ev, args| create(ev, ErrorKind::EvalError, args),
    ErrorKind::RangeError => |ev, args| create(ev, ErrorKind::RangeError, args),
    ErrorKind::ReferenceError => |ev, args| create(ev, ErrorKind::ReferenceError, args),
    ErrorKind::SyntaxError => |ev, args| create(ev, ErrorKind::SyntaxError, args),
    ErrorKind::TypeError => |ev, args| create(ev, ErrorKind::TypeError, args),
    ErrorKind::URIError => |ev, args| create(ev, ErrorKind::URIError, args),
  }
}

fn to_string(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let Value::Object(obj) = &this else {
    return Err(ev.type_error("Error.prototype.toString requires that 'this' be an Object"));
  };
  let name = match obj.get("name") {
    Value::Undefined => "Error".into(),
    v => ev.to_string(&v)?,
  };
  let message = match obj.get("message") {
    Value::Undefined => "".into(),
    v => ev.to_string(&v)?,
  };
  Ok(Value::string(match (name.is_empty(), message.is_empty()) {
    (_, true) => name.to_string(),
    (true, false) => message.to_string(),
    (false, false) => format!("{name}: {message}"),
  }))
}

pub fn install(realm: &Realm) {
  for kind in ErrorKind::ALL {
    let proto = realm.intrinsics.error_prototype(kind);
    proto.define("name", Value::string(kind.name()), false);
    proto.define("message", Value::string(""), false);
  }
  method(
    realm,
    realm.intrinsics.error_prototype(ErrorKind::Error),
    "toString",
    0,
    to_string,
  );
}

pub fn constructor(realm: &Realm, kind: ErrorKind) -> Value {
  Value::Object(realm.new_constructor(
    kind.name(),
    1,
    move |ev, _, args| create(ev, kind, args),
    construct_fn(kind),
    realm.intrinsics.error_prototype(kind),
  ))
}
