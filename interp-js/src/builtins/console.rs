use super::method;
use super::NativeMethod;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::ops::format_console_arg;
use crate::options::ConsoleLevel;
use crate::realm::Realm;
use crate::value::Value;

fn write(ev: &mut Evaluator<'_>, level: ConsoleLevel, args: &[Value]) -> Result<Value, VmError> {
  let line = args
    .iter()
    .map(format_console_arg)
    .collect::<Vec<_>>()
    .join(" ");
  ev.realm().console.write(level, &line);
  Ok(Value::Undefined)
}

pub fn create(realm: &Realm) -> Value {
  let console = realm.new_object();
  let methods: [(&str, NativeMethod); 5] = [
    ("log", |ev, _, args| write(ev, ConsoleLevel::Log, args)),
    ("info", |ev, _, args| write(ev, ConsoleLevel::Info, args)),
    ("debug", |ev, _, args| write(ev, ConsoleLevel::Debug, args)),
    ("warn", |ev, _, args| write(ev, ConsoleLevel::Warn, args)),
    ("error", |ev, _, args| write(ev, ConsoleLevel::Error, args)),
  ];
  for (name, f) in methods {
    method(realm, &console, name, 0, f);
  }
  Value::Object(console)
}
