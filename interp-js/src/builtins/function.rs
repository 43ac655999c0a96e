use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::function::define_function_props;
use crate::function::BoundFunction;
use crate::function::Callable;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::realm::Realm;
use crate::value::Value;
use std::rc::Rc;

fn require_callable(ev: &Evaluator<'_>, this: &Value, method: &str) -> Result<JsObject, VmError> {
  match this.as_object() {
    Some(o) if o.is_callable() => Ok(o.clone()),
    _ => Err(ev.type_error(format!("Function.prototype.{method} called on a non-function"))),
  }
}

fn call(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  require_callable(ev, &this, "call")?;
  let rest = args.get(1..).unwrap_or_default();
  ev.call(&this, arg(args, 0), rest)
}

fn apply(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  require_callable(ev, &this, "apply")?;
  let list = match arg(args, 1) {
    Value::Undefined | Value::Null => Vec::new(),
    Value::Object(o) => o.array_elements(),
    _ => return Err(ev.type_error("CreateListFromArrayLike called on non-object")),
  };
  ev.call(&this, arg(args, 0), &list)
}

fn bind(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let target = require_callable(ev, &this, "bind")?;
  let bound_args = args.get(1..).unwrap_or_default().to_vec();
  let target_name = target.get("name");
  let target_len = match target.get("length") {
    Value::Number(n) => n,
    _ => 0.0,
  };
  let length = (target_len - bound_args.len() as f64).max(0.0) as u32;
  let bound = BoundFunction {
    target,
    this: arg(args, 0),
    args: bound_args,
  };
  let obj = JsObject::new(
    ObjectClass::Function(Callable::Bound(Rc::new(bound))),
    Some(ev.realm().intrinsics.function_prototype.clone()),
  );
  let name = format!("bound {}", target_name.as_str().unwrap_or(""));
  define_function_props(&obj, &name, length);
  Ok(Value::Object(obj))
}

fn to_string(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let target = require_callable(ev, &this, "toString")?;
  let Some(callable) = target.callable() else {
    return Err(ev.type_error("Function.prototype.toString requires that 'this' be a Function"));
  };
  let name = callable.name();
  Ok(Value::string(match callable {
    Callable::Closure(closure) => {
      let params: Vec<&str> = closure
        .func
        .stx
        .parameters
        .iter()
        .map(|p| p.stx.name.as_str())
        .collect();
      format!("function {name}({}) {{ [code] }}", params.join(", "))
    }
    Callable::Native(_) | Callable::Bound(_) => format!("function {name}() {{ [native code] }}"),
  }))
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.function_prototype;
  define_function_props(proto, "", 0);
  method(realm, proto, "call", 1, call);
  method(realm, proto, "apply", 2, apply);
  method(realm, proto, "bind", 1, bind);
  method(realm, proto, "toString", 0, to_string);
}
