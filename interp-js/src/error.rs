use crate::value::Value;
use parse_script_js::error::SyntaxError;
use std::fmt::Display;

/// Errors produced while evaluating script code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VmError {
  /// A JavaScript `throw` value. This is catchable from JS.
  #[error("uncaught exception")]
  Throw(Value),

  /// A non-catchable termination condition.
  #[error("{0}")]
  Termination(Termination),

  /// A stubbed/unfinished codepath.
  #[error("unimplemented: {0}")]
  Unimplemented(&'static str),
}

/// A non-catchable error that terminates execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
  pub reason: TerminationReason,
  // Names of the script functions active when execution terminated, innermost first.
  pub stack: Vec<String>,
}

impl Termination {
  pub fn new(reason: TerminationReason, stack: Vec<String>) -> Self {
    Self { reason, stack }
  }
}

impl Display for Termination {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{reason}", reason = self.reason)
  }
}

/// The reason execution terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
  StackOverflow,
}

impl Display for TerminationReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TerminationReason::StackOverflow => f.write_str("execution terminated: stack overflow"),
    }
  }
}

/// Why a `return`, `break` or `continue` escaped the program body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalCompletion {
  Return,
  Break,
  Continue,
}

impl Display for IllegalCompletion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      IllegalCompletion::Return => "illegal return statement",
      IllegalCompletion::Break => "illegal break statement",
      IllegalCompletion::Continue => "illegal continue statement",
    })
  }
}

/// The outcome of a failed `run`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
  #[error("syntax error: {0}")]
  Syntax(SyntaxError),

  /// A thrown value escaped the top level.
  #[error("uncaught {}", crate::ops::describe_thrown(.0))]
  Uncaught(Value),

  #[error("{0}")]
  Termination(Termination),

  #[error("unimplemented: {0}")]
  Unimplemented(&'static str),

  #[error("{0}")]
  IllegalCompletion(IllegalCompletion),
}

impl From<VmError> for RunError {
  fn from(err: VmError) -> Self {
    match err {
      VmError::Throw(value) => RunError::Uncaught(value),
      VmError::Termination(t) => RunError::Termination(t),
      VmError::Unimplemented(what) => RunError::Unimplemented(what),
    }
  }
}

impl From<SyntaxError> for RunError {
  fn from(err: SyntaxError) -> Self {
    RunError::Syntax(err)
  }
}

/// A declaration conflicted with an existing binding in the same scope. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclareError {
  #[error("identifier '{0}' has already been declared")]
  AlreadyDeclared(String),
}

/// A write through a variable reference was rejected. The stored value is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
  #[error("assignment to constant variable")]
  Const,
  #[error("invalid array length")]
  InvalidArrayLength,
}
