//! Timer registration. Callbacks are queued for the host and never fire during a run.

use super::arg;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::realm::Realm;
use crate::value::Value;

fn register(ev: &mut Evaluator<'_>, args: &[Value], repeat: bool) -> Result<Value, VmError> {
  let callback = arg(args, 0);
  if !callback.is_callable() {
    return Err(ev.type_error("The \"callback\" argument must be of type function"));
  };
  let delay = ev.to_number(&arg(args, 1))?;
  let delay = if delay.is_finite() && delay > 0.0 { delay } else { 0.0 };
  let extra = args.get(2..).unwrap_or_default().to_vec();
  let id = ev.realm_mut().timers.register(callback, delay, extra, repeat);
  tracing::debug!(id, delay, repeat, "timer registered");
  Ok(Value::Number(id as f64))
}

fn clear(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  if let Value::Number(id) = arg(args, 0) {
    ev.realm_mut().timers.clear(id as u32);
  };
  Ok(Value::Undefined)
}

pub fn set_timeout(realm: &Realm) -> Value {
  Value::Object(realm.new_function("setTimeout", 2, |ev, _, args| register(ev, args, false)))
}

pub fn set_interval(realm: &Realm) -> Value {
  Value::Object(realm.new_function("setInterval", 2, |ev, _, args| register(ev, args, true)))
}

pub fn clear_timeout(realm: &Realm) -> Value {
  Value::Object(realm.new_function("clearTimeout", 1, |ev, _, args| clear(ev, args)))
}

pub fn clear_interval(realm: &Realm) -> Value {
  Value::Object(realm.new_function("clearInterval", 1, |ev, _, args| clear(ev, args)))
}
