//! An embeddable tree-walking interpreter for script-mode ECMAScript.
//!
//! Source text is parsed by [`parse_script_js`] and evaluated directly over the syntax tree against
//! a chain of lexical scopes. A program communicates its result through `module.exports`:
//!
//! ```
//! use interp_js::Value;
//!
//! let exports = interp_js::run("module.exports = [1, 2, 3].map(function (x) { return x * 2 });")
//!   .unwrap();
//! assert_eq!(exports.to_json(), serde_json::json!([2, 4, 6]));
//! assert_eq!(exports.get("length"), Value::Number(3.0));
//! ```
//!
//! # Scopes and references
//!
//! A [`Scope`] maps names to [`VarRef`]s. `var` declarations bind in the nearest function scope,
//! `let` and `const` in the scope containing them, and a name can be declared at most once per
//! scope. Every assignment target resolves to a [`VarRef`] first: either a slot in a scope or a
//! property of an object.
//!
//! # Host bindings
//!
//! The root scope of each run is seeded from a [`HostBindings`] table (console, timers, the standard
//! constructors, `Math`, `JSON` and friends), then from the caller's extra globals. All of these are
//! constants, and the first registration of a name wins.
//!
//! # Failures
//!
//! Script errors are ordinary thrown values until they escape the program, at which point they
//! become [`RunError::Uncaught`]. Exceeding the configured call depth is not catchable and ends the
//! run with [`RunError::Termination`].

mod builtins;
mod completion;
mod error;
mod exec;
mod function;
mod hoist;
mod object;
mod ops;
mod options;
mod realm;
mod reference;
mod runtime;
mod scope;
mod value;

pub use crate::builtins::json::value_to_json;
pub use crate::builtins::json::write_json;
pub use crate::builtins::BindingFactory;
pub use crate::builtins::HostBinding;
pub use crate::builtins::HostBindings;
pub use crate::builtins::HostBindingsBuilder;
pub use crate::error::AssignError;
pub use crate::error::DeclareError;
pub use crate::error::IllegalCompletion;
pub use crate::error::RunError;
pub use crate::error::Termination;
pub use crate::error::TerminationReason;
pub use crate::error::VmError;
pub use crate::exec::Evaluator;
pub use crate::exec::Hint;
pub use crate::function::Callable;
pub use crate::object::JsObject;
pub use crate::object::ObjectClass;
pub use crate::ops::describe_thrown;
pub use crate::ops::inspect;
pub use crate::options::ConsoleLevel;
pub use crate::options::ConsoleSink;
pub use crate::options::RuntimeOptions;
pub use crate::options::DEFAULT_MAX_CALL_DEPTH;
pub use crate::realm::ErrorKind;
pub use crate::realm::Realm;
pub use crate::realm::Timer;
pub use crate::reference::ScopeSlot;
pub use crate::reference::SlotKind;
pub use crate::reference::VarRef;
pub use crate::runtime::Globals;
pub use crate::runtime::Runtime;
pub use crate::scope::Scope;
pub use crate::scope::ScopeKind;
pub use crate::value::Value;

/// Runs `source` with the standard bindings and returns `module.exports`.
pub fn run(source: &str) -> Result<Value, RunError> {
  run_with_globals(source, Globals::new())
}

/// Runs `source` with the standard bindings plus `extra_globals`, and returns `module.exports`.
pub fn run_with_globals(source: &str, extra_globals: Globals) -> Result<Value, RunError> {
  Runtime::default().run(source, extra_globals)
}
