//! Running programs: realm setup, root scope seeding and result extraction.

use crate::completion::Completion;
use crate::error::IllegalCompletion;
use crate::error::RunError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::options::RuntimeOptions;
use crate::realm::Realm;
use crate::realm::Timer;
use crate::scope::Scope;
use crate::value::Value;
use parse_script_js::ast::node::Node;
use parse_script_js::ast::stx::TopLevel;
use parse_script_js::parse;
use std::rc::Rc;
use tracing::debug;
use tracing::debug_span;

/// Caller-supplied root bindings, in registration order.
pub type Globals = Vec<(String, Value)>;

/// Runs programs with a fixed configuration.
///
/// Every run gets a fresh realm and root scope. The realm of the most recent run is kept so the
/// host can drain its timers and call back into functions it produced.
pub struct Runtime {
  options: RuntimeOptions,
  realm: Option<Realm>,
}

impl Default for Runtime {
  fn default() -> Self {
    Runtime::new(RuntimeOptions::default())
  }
}

impl Runtime {
  pub fn new(options: RuntimeOptions) -> Runtime {
    Runtime {
      options,
      realm: None,
    }
  }

  pub fn options(&self) -> &RuntimeOptions {
    &self.options
  }

  /// Runs `source` and returns the final value of `module.exports`.
  pub fn run(&mut self, source: &str, extra_globals: Globals) -> Result<Value, RunError> {
    let (_, module) = self.execute(source, extra_globals)?;
    Ok(module.get("exports"))
  }

  /// Runs `source` and returns the completion value of its last value-producing statement.
  pub fn eval(&mut self, source: &str, extra_globals: Globals) -> Result<Value, RunError> {
    let (completion, _) = self.execute(source, extra_globals)?;
    Ok(completion.unwrap_or_default())
  }

  /// Calls a function value in the realm of the most recent run.
  pub fn call(&mut self, func: &Value, this: Value, args: &[Value]) -> Result<Value, RunError> {
    let options = &self.options;
    let realm = self.realm.get_or_insert_with(|| Realm::new(options));
    realm.adopt(func);
    realm.adopt(&this);
    for arg in args {
      realm.adopt(arg);
    }
    Ok(Evaluator::new(realm).call(func, this, args)?)
  }

  /// Removes and returns the timers registered so far, earliest first.
  pub fn take_timers(&mut self) -> Vec<Timer> {
    self.realm.as_mut().map(|r| r.timers.take()).unwrap_or_default()
  }

  fn execute(&mut self, source: &str, extra_globals: Globals) -> Result<(Option<Value>, JsObject), RunError> {
    let span = debug_span!("run", source_len = source.len());
    let _enter = span.enter();

    let program = parse(source)?;
    let realm = self.realm.insert(Realm::new(&self.options));
    let scope = Scope::root();
    seed_root(realm, &scope, &self.options, extra_globals);

    let module = realm.new_object();
    module.set("exports", Value::Object(realm.new_object()));
    for (name, value) in [("module", Value::Object(module.clone())), ("exports", module.get("exports"))] {
      if let Err(err) = scope.declare_const(name, value) {
        debug!(%err, "module binding skipped");
      };
    }

    let completion = eval_top_level(realm, &scope, &program)?;
    Ok((completion, module))
  }
}

/// Binds the host table, `this` and the caller's extras as constants, first registration winning.
fn seed_root(realm: &Realm, scope: &Rc<Scope>, options: &RuntimeOptions, extra_globals: Globals) {
  for binding in options.host_bindings().iter() {
    let value = (binding.factory)(realm);
    match scope.declare_const(&binding.name, value) {
      Ok(()) => debug!(name = binding.name.as_str(), "host binding registered"),
      Err(err) => debug!(%err, "host binding skipped"),
    };
  }
  if let Err(err) = scope.declare_const("this", Value::Undefined) {
    debug!(%err, "this binding skipped");
  };
  for (name, value) in extra_globals {
    realm.adopt(&value);
    match scope.declare_const(&name, value) {
      Ok(()) => debug!(name = name.as_str(), "extra global registered"),
      Err(err) => debug!(%err, "extra global skipped"),
    };
  }
}

fn eval_top_level(realm: &mut Realm, scope: &Rc<Scope>, program: &Node<TopLevel>) -> Result<Option<Value>, RunError> {
  let mut ev = Evaluator::new(realm);
  match ev.eval_program(scope, &program.stx.body)? {
    Completion::Normal(value) => Ok(value),
    Completion::Throw(value) => Err(RunError::Uncaught(value)),
    Completion::Return(_) => Err(RunError::IllegalCompletion(IllegalCompletion::Return)),
    Completion::Break(..) => Err(RunError::IllegalCompletion(IllegalCompletion::Break)),
    Completion::Continue(..) => Err(RunError::IllegalCompletion(IllegalCompletion::Continue)),
  }
}
