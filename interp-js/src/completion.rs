use crate::value::Value;

/// The outcome of executing a statement.
///
/// The "empty" completion value is modelled explicitly as `None` so statement lists can implement
/// `UpdateEmpty` (e.g. `1; if (true) {}` evaluates to `1`).
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
  Normal(Option<Value>),
  Throw(Value),
  Return(Value),
  Break(Option<String>, Option<Value>),
  Continue(Option<String>, Option<Value>),
}

impl Completion {
  pub fn empty() -> Self {
    Completion::Normal(None)
  }

  pub fn normal(value: Value) -> Self {
    Completion::Normal(Some(value))
  }

  pub fn is_abrupt(&self) -> bool {
    !matches!(self, Completion::Normal(_))
  }

  pub fn update_empty(self, value: Option<Value>) -> Self {
    match self {
      Completion::Normal(None) => Completion::Normal(value),
      Completion::Break(target, None) => Completion::Break(target, value),
      Completion::Continue(target, None) => Completion::Continue(target, value),
      other => other,
    }
  }
}

/// The labels attached to the statement being executed, for matching `break`/`continue` targets.
pub type LabelSet<'a> = &'a [&'a str];

/// Whether a loop should consume a `continue` aimed at `target`.
pub fn continues_here(target: &Option<String>, labels: LabelSet<'_>) -> bool {
  match target {
    None => true,
    Some(l) => labels.contains(&l.as_str()),
  }
}
