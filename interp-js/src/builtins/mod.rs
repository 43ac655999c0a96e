//! The host binding table and the standard library objects it provides.

use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::realm::ErrorKind;
use crate::realm::Realm;
use crate::value::Value;
use once_cell::sync::Lazy;

mod array;
mod boolean;
mod console;
mod error;
mod function;
mod global;
pub mod json;
mod math;
mod number;
mod object;
mod string;
mod timers;

/// Creates a binding's value for a run.
pub type BindingFactory = fn(&Realm) -> Value;

pub type NativeMethod = fn(&mut Evaluator<'_>, Value, &[Value]) -> Result<Value, VmError>;

#[derive(Clone, Debug)]
pub struct HostBinding {
  pub name: String,
  pub factory: BindingFactory,
}

/// An immutable, ordered table of root-scope bindings. Each run instantiates every entry afresh.
#[derive(Clone, Debug, Default)]
pub struct HostBindings {
  entries: Vec<HostBinding>,
}

static STANDARD: Lazy<HostBindings> = Lazy::new(|| HostBindings::builder().with_standard().build());

impl HostBindings {
  /// The default table: console, timers, URI and number helpers, the standard constructors, `Math`
  /// and `JSON`.
  pub fn standard() -> &'static HostBindings {
    &STANDARD
  }

  pub fn builder() -> HostBindingsBuilder {
    HostBindingsBuilder::default()
  }

  pub fn iter(&self) -> impl Iterator<Item = &HostBinding> {
    self.entries.iter()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|e| e.name.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[derive(Default)]
pub struct HostBindingsBuilder {
  entries: Vec<HostBinding>,
}

impl HostBindingsBuilder {
  /// Appends the standard entries.
  pub fn with_standard(mut self) -> Self {
    let standard: &[(&str, BindingFactory)] = &[
      ("console", console::create),
      ("setTimeout", timers::set_timeout),
      ("setInterval", timers::set_interval),
      ("clearTimeout", timers::clear_timeout),
      ("clearInterval", timers::clear_interval),
      ("encodeURI", global::encode_uri),
      ("encodeURIComponent", global::encode_uri_component),
      ("decodeURI", global::decode_uri),
      ("decodeURIComponent", global::decode_uri_component),
      ("escape", global::escape),
      ("unescape", global::unescape),
      ("Infinity", |_| Value::Number(f64::INFINITY)),
      ("NaN", |_| Value::Number(f64::NAN)),
      ("undefined", |_| Value::Undefined),
      ("isFinite", global::is_finite),
      ("isNaN", global::is_nan),
      ("parseFloat", global::parse_float),
      ("parseInt", global::parse_int),
      ("Object", object::constructor),
      ("Boolean", boolean::constructor),
      ("Error", |realm| error::constructor(realm, ErrorKind::Error)),
      ("EvalError", |realm| error::constructor(realm, ErrorKind::EvalError)),
      ("RangeError", |realm| error::constructor(realm, ErrorKind::RangeError)),
      ("ReferenceError", |realm| error::constructor(realm, ErrorKind::ReferenceError)),
      ("SyntaxError", |realm| error::constructor(realm, ErrorKind::SyntaxError)),
      ("TypeError", |realm| error::constructor(realm, ErrorKind::TypeError)),
      ("URIError", |realm| error::constructor(realm, ErrorKind::URIError)),
      ("Number", number::constructor),
      ("Math", math::create),
      ("String", string::constructor),
      ("Array", array::constructor),
      ("JSON", json::create),
    ];
    for (name, factory) in standard {
      self = self.bind(name, *factory);
    }
    self
  }

  pub fn bind(mut self, name: &str, factory: BindingFactory) -> Self {
    self.entries.push(HostBinding {
      name: name.to_string(),
      factory,
    });
    self
  }

  pub fn build(self) -> HostBindings {
    HostBindings {
      entries: self.entries,
    }
  }
}

/// Installs the methods of the intrinsic prototypes.
pub(crate) fn install_prototypes(realm: &Realm) {
  object::install(realm);
  function::install(realm);
  array::install(realm);
  string::install(realm);
  number::install(realm);
  boolean::install(realm);
  error::install(realm);
}

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
  args.get(i).cloned().unwrap_or_default()
}

/// Defines a non-enumerable method.
pub(crate) fn method(realm: &Realm, target: &JsObject, name: &str, length: u32, f: NativeMethod) {
  target.define(name, Value::Object(realm.new_function(name, length, f)), false);
}

/// Defines a non-enumerable value.
pub(crate) fn constant(target: &JsObject, name: &str, value: impl Into<Value>) {
  target.define(name, value.into(), false);
}
