//! The tree-walking evaluator.

use crate::completion::continues_here;
use crate::completion::Completion;
use crate::completion::LabelSet;
use crate::error::VmError;
use crate::hoist;
use crate::object::JsObject;
use crate::ops::to_boolean;
use crate::realm::ErrorKind;
use crate::realm::Realm;
use crate::reference::SlotKind;
use crate::scope::Scope;
use crate::scope::ScopeKind;
use crate::value::Value;
use ahash::HashSet;
use ahash::HashSetExt;
use parse_script_js::ast::expr::Expr;
use parse_script_js::ast::stmt::CatchBlock;
use parse_script_js::ast::stmt::DoWhileStmt;
use parse_script_js::ast::stmt::ForInLhs;
use parse_script_js::ast::stmt::ForInStmt;
use parse_script_js::ast::stmt::ForTripleStmt;
use parse_script_js::ast::stmt::ForTripleStmtInit;
use parse_script_js::ast::stmt::IfStmt;
use parse_script_js::ast::stmt::LabelStmt;
use parse_script_js::ast::stmt::Stmt;
use parse_script_js::ast::stmt::SwitchStmt;
use parse_script_js::ast::stmt::TryStmt;
use parse_script_js::ast::stmt::VarDecl;
use parse_script_js::ast::stmt::VarDeclMode;
use parse_script_js::ast::stmt::WhileStmt;
use std::rc::Rc;
use tracing::debug;
use tracing::trace;

mod call;
mod convert;
mod expr;
mod stack;

pub use convert::Hint;

use stack::ensure_sufficient_stack;

/// Evaluates syntax trees against a realm.
///
/// Host functions receive an evaluator so they can call back into script code, convert values
/// and throw script errors.
pub struct Evaluator<'a> {
  realm: &'a mut Realm,
}

fn slot_kind(mode: VarDeclMode) -> SlotKind {
  match mode {
    VarDeclMode::Const => SlotKind::Const,
    VarDeclMode::Let => SlotKind::Let,
    VarDeclMode::Var => SlotKind::Var,
  }
}

/// Whether a loop body is a block that declares block scoped names, and so needs a fresh scope
/// per iteration.
fn body_needs_scope(body: &Stmt) -> bool {
  matches!(body, Stmt::Block(block) if hoist::has_lexical_decls(&block.stx.body))
}

/// Decides what a loop does after its body completes: `None` to keep iterating, or the completion
/// the loop itself finishes with.
fn after_iteration(
  completion: Completion,
  labels: LabelSet<'_>,
  last: &mut Option<Value>,
) -> Option<Completion> {
  match completion {
    Completion::Normal(v) => {
      if v.is_some() {
        *last = v;
      };
      None
    }
    Completion::Continue(target, v) if continues_here(&target, labels) => {
      if v.is_some() {
        *last = v;
      };
      None
    }
    Completion::Break(None, v) => Some(Completion::Normal(v.or_else(|| last.take()))),
    other => Some(other.update_empty(last.take())),
  }
}

impl<'a> Evaluator<'a> {
  pub fn new(realm: &'a mut Realm) -> Self {
    Self { realm }
  }

  pub fn realm(&self) -> &Realm {
    self.realm
  }

  pub fn realm_mut(&mut self) -> &mut Realm {
    self.realm
  }

  /// Creates a script error object of the given kind.
  pub fn error(&self, kind: ErrorKind, message: impl AsRef<str>) -> VmError {
    let err = self.realm.new_error(kind, message.as_ref());
    trace!(kind = kind.name(), message = message.as_ref(), "throwing");
    VmError::Throw(Value::Object(err))
  }

  pub fn type_error(&self, message: impl AsRef<str>) -> VmError {
    self.error(ErrorKind::TypeError, message)
  }

  pub fn range_error(&self, message: impl AsRef<str>) -> VmError {
    self.error(ErrorKind::RangeError, message)
  }

  pub fn reference_error(&self, message: impl AsRef<str>) -> VmError {
    self.error(ErrorKind::ReferenceError, message)
  }

  pub fn new_object(&self) -> JsObject {
    self.realm.new_object()
  }

  pub fn new_array(&self, elements: impl IntoIterator<Item = Value>) -> JsObject {
    self.realm.new_array(elements)
  }

  /// Runs a program body: hoisting, then its statements in order.
  pub(crate) fn eval_program(&mut self, scope: &Rc<Scope>, body: &[Stmt]) -> Result<Completion, VmError> {
    self.hoist_declarations(scope, body);
    self.eval_stmt_list(scope, body)
  }

  /// The pre-scan for a program or function body: `var` names first, then function declarations.
  pub(crate) fn hoist_declarations(&mut self, scope: &Rc<Scope>, body: &[Stmt]) {
    for name in hoist::var_names(body) {
      if let Err(err) = scope.declare_var(&name, Value::Undefined) {
        debug!(%err, "var hoisting skipped");
      };
    }
    self.hoist_functions(scope, body);
  }

  /// Binds the function declarations directly inside `body` in `scope`.
  fn hoist_functions(&mut self, scope: &Rc<Scope>, body: &[Stmt]) {
    for stmt in body {
      let Stmt::FunctionDecl(decl) = stmt else {
        continue;
      };
      let func = self.make_closure(Some(&decl.stx.name), &decl.stx.function, scope);
      if let Err(err) = scope.bind_var(&decl.stx.name, func) {
        debug!(%err, "function declaration skipped");
      };
    }
  }

  pub(crate) fn eval_stmt_list(
    &mut self,
    scope: &Rc<Scope>,
    stmts: &[Stmt],
  ) -> Result<Completion, VmError> {
    let mut last_value: Option<Value> = None;
    for stmt in stmts {
      let completion = self.eval_stmt(scope, stmt, &[])?.update_empty(last_value.take());
      match completion {
        Completion::Normal(v) => last_value = v,
        abrupt => return Ok(abrupt),
      };
    }
    Ok(Completion::Normal(last_value))
  }

  /// Executes one statement. Script throws become [`Completion::Throw`]; only non-catchable
  /// failures are returned as errors.
  pub(crate) fn eval_stmt(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &Stmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    match ensure_sufficient_stack(|| self.eval_stmt_inner(scope, stmt, labels)) {
      Err(VmError::Throw(value)) => Ok(Completion::Throw(value)),
      other => other,
    }
  }

  fn eval_stmt_inner(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &Stmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    match stmt {
      Stmt::Empty(_) => Ok(Completion::empty()),
      Stmt::Debugger(_) => {
        trace!("debugger statement");
        Ok(Completion::empty())
      }
      Stmt::Expr(stmt) => Ok(Completion::normal(self.eval_expr(scope, &stmt.stx.expr)?)),
      Stmt::VarDecl(decl) => {
        self.eval_var_decl(scope, &decl.stx)?;
        Ok(Completion::empty())
      }
      // Bound during hoisting.
      Stmt::FunctionDecl(_) => Ok(Completion::empty()),
      Stmt::Block(block) => self.eval_block(scope, &block.stx.body),
      Stmt::If(stmt) => self.eval_if(scope, &stmt.stx),
      Stmt::Label(stmt) => self.eval_label(scope, &stmt.stx, labels),
      Stmt::While(stmt) => self.eval_while(scope, &stmt.stx, labels),
      Stmt::DoWhile(stmt) => self.eval_do_while(scope, &stmt.stx, labels),
      Stmt::ForTriple(stmt) => self.eval_for_triple(scope, &stmt.stx, labels),
      Stmt::ForIn(stmt) => self.eval_for_in(scope, &stmt.stx, labels),
      Stmt::Switch(stmt) => self.eval_switch(scope, &stmt.stx),
      Stmt::Try(stmt) => self.eval_try(scope, &stmt.stx),
      Stmt::Throw(stmt) => {
        let value = self.eval_expr(scope, &stmt.stx.value)?;
        trace!(value = ?value, "throw statement");
        Ok(Completion::Throw(value))
      }
      Stmt::Return(stmt) => {
        let value = match &stmt.stx.value {
          Some(expr) => self.eval_expr(scope, expr)?,
          None => Value::Undefined,
        };
        Ok(Completion::Return(value))
      }
      Stmt::Break(stmt) => Ok(Completion::Break(stmt.stx.label.clone(), None)),
      Stmt::Continue(stmt) => Ok(Completion::Continue(stmt.stx.label.clone(), None)),
    }
  }

  fn eval_var_decl(&mut self, scope: &Rc<Scope>, decl: &VarDecl) -> Result<(), VmError> {
    for declarator in decl.declarators.iter() {
      let name = declarator.name.as_str();
      match decl.mode {
        // Already declared by hoisting; only the initializer runs here.
        VarDeclMode::Var => {
          let Some(init) = &declarator.initializer else {
            continue;
          };
          let value = self.eval_named_expr(scope, init, name)?;
          self.assign_name(scope, name, value)?;
        }
        mode => {
          let value = match &declarator.initializer {
            Some(init) => self.eval_named_expr(scope, init, name)?,
            None => Value::Undefined,
          };
          if let Err(err) = scope.declare(slot_kind(mode), name, value) {
            debug!(%err, "declaration skipped");
          };
        }
      };
    }
    Ok(())
  }

  fn eval_block(&mut self, scope: &Rc<Scope>, body: &[Stmt]) -> Result<Completion, VmError> {
    if scope.take_permeable() || !hoist::has_lexical_decls(body) {
      self.hoist_functions(scope, body);
      return self.eval_stmt_list(scope, body);
    };
    let inner = Scope::child(scope, ScopeKind::Block);
    self.hoist_functions(&inner, body);
    self.eval_stmt_list(&inner, body)
  }

  fn eval_if(&mut self, scope: &Rc<Scope>, stmt: &IfStmt) -> Result<Completion, VmError> {
    let test = self.eval_expr(scope, &stmt.test)?;
    let completion = if to_boolean(&test) {
      self.eval_stmt(scope, &stmt.consequent, &[])?
    } else if let Some(alt) = &stmt.alternate {
      self.eval_stmt(scope, alt, &[])?
    } else {
      Completion::empty()
    };
    Ok(completion.update_empty(Some(Value::Undefined)))
  }

  fn eval_label(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &LabelStmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    let mut set: Vec<&str> = labels.to_vec();
    set.push(&stmt.name);
    match self.eval_stmt(scope, &stmt.statement, &set)? {
      Completion::Break(Some(target), v) if target == stmt.name => Ok(Completion::Normal(v)),
      other => Ok(other),
    }
  }

  /// The scope an iteration's body runs in.
  fn iteration_scope(&self, scope: &Rc<Scope>, body: &Stmt) -> Rc<Scope> {
    if body_needs_scope(body) {
      Scope::permeable(scope, ScopeKind::Loop)
    } else {
      scope.clone()
    }
  }

  fn eval_while(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &WhileStmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    let mut last = None;
    loop {
      let test = self.eval_expr(scope, &stmt.condition)?;
      if !to_boolean(&test) {
        break;
      };
      let iter = self.iteration_scope(scope, &stmt.body);
      let completion = self.eval_stmt(&iter, &stmt.body, &[])?;
      if let Some(done) = after_iteration(completion, labels, &mut last) {
        return Ok(done);
      };
    }
    Ok(Completion::Normal(last))
  }

  fn eval_do_while(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &DoWhileStmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    let mut last = None;
    loop {
      let iter = self.iteration_scope(scope, &stmt.body);
      let completion = self.eval_stmt(&iter, &stmt.body, &[])?;
      if let Some(done) = after_iteration(completion, labels, &mut last) {
        return Ok(done);
      };
      let test = self.eval_expr(scope, &stmt.condition)?;
      if !to_boolean(&test) {
        break;
      };
    }
    Ok(Completion::Normal(last))
  }

  fn eval_for_triple(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &ForTripleStmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    let lexical_head = matches!(&stmt.init, ForTripleStmtInit::Decl(d) if d.stx.mode != VarDeclMode::Var);
    let head = if lexical_head {
      Scope::child(scope, ScopeKind::Loop)
    } else {
      scope.clone()
    };
    match &stmt.init {
      ForTripleStmtInit::None => {}
      ForTripleStmtInit::Expr(expr) => {
        self.eval_expr(&head, expr)?;
      }
      ForTripleStmtInit::Decl(decl) => self.eval_var_decl(&head, &decl.stx)?,
    };
    // Each iteration gets its own copies of the head's `let` bindings, so closures created in the
    // body see that iteration's values.
    let mut current = if lexical_head { head.copy_lets() } else { head };
    let mut last = None;
    loop {
      if let Some(cond) = &stmt.cond {
        let test = self.eval_expr(&current, cond)?;
        if !to_boolean(&test) {
          break;
        };
      };
      let iter = self.iteration_scope(&current, &stmt.body);
      let completion = self.eval_stmt(&iter, &stmt.body, &[])?;
      if let Some(done) = after_iteration(completion, labels, &mut last) {
        return Ok(done);
      };
      if lexical_head {
        current = current.copy_lets();
      };
      if let Some(post) = &stmt.post {
        self.eval_expr(&current, post)?;
      };
    }
    Ok(Completion::Normal(last))
  }

  /// Enumerable string keys of an object and its prototypes, nearest first. Keys shadowed by a
  /// nearer object are skipped, enumerable or not.
  pub(crate) fn for_in_keys(&self, obj: &JsObject) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let mut cur = Some(obj.clone());
    while let Some(o) = cur {
      let enumerable: HashSet<String> = o.own_enumerable_keys().into_iter().collect();
      for key in o.own_keys() {
        if seen.insert(key.clone()) && enumerable.contains(&key) {
          keys.push(key);
        };
      }
      cur = o.proto();
    }
    keys
  }

  fn eval_for_in(
    &mut self,
    scope: &Rc<Scope>,
    stmt: &ForInStmt,
    labels: LabelSet<'_>,
  ) -> Result<Completion, VmError> {
    let subject = self.eval_expr(scope, &stmt.rhs)?;
    if subject.is_nullish() {
      return Ok(Completion::empty());
    };
    let obj = self.to_object(&subject)?;
    let keys = self.for_in_keys(&obj);
    let mut last = None;
    for key in keys {
      // Deleted since the loop started.
      if !obj.has_property(&key) {
        continue;
      };
      let key = Value::string(key);
      let binding_scope = match &stmt.lhs {
        ForInLhs::Decl {
          mode: VarDeclMode::Var,
          name,
        } => {
          self.assign_name(scope, name, key)?;
          scope.clone()
        }
        ForInLhs::Decl { mode, name } => {
          let iter = Scope::child(scope, ScopeKind::Loop);
          if let Err(err) = iter.declare(slot_kind(*mode), name, key) {
            debug!(%err, "declaration skipped");
          };
          iter
        }
        ForInLhs::Assign(target) => {
          let reference = self.eval_reference(scope, target)?;
          self.put_value(scope, reference, key)?;
          scope.clone()
        }
      };
      let iter = self.iteration_scope(&binding_scope, &stmt.body);
      let completion = self.eval_stmt(&iter, &stmt.body, &[])?;
      if let Some(done) = after_iteration(completion, labels, &mut last) {
        return Ok(done);
      };
    }
    Ok(Completion::Normal(last))
  }

  fn eval_switch(&mut self, scope: &Rc<Scope>, stmt: &SwitchStmt) -> Result<Completion, VmError> {
    let discriminant = self.eval_expr(scope, &stmt.test)?;
    let needs_scope = stmt
      .branches
      .iter()
      .any(|b| hoist::has_lexical_decls(&b.stx.body));
    let inner = if needs_scope {
      Scope::child(scope, ScopeKind::Switch)
    } else {
      scope.clone()
    };
    for branch in stmt.branches.iter() {
      self.hoist_functions(&inner, &branch.stx.body);
    }

    let mut start = None;
    for (i, branch) in stmt.branches.iter().enumerate() {
      let Some(case) = &branch.stx.case else {
        continue;
      };
      let value = self.eval_expr(&inner, case)?;
      if crate::ops::strict_equals(&discriminant, &value) {
        start = Some(i);
        break;
      };
    }
    let start = start.or_else(|| stmt.branches.iter().position(|b| b.stx.case.is_none()));

    let mut last = None;
    if let Some(start) = start {
      for branch in stmt.branches[start..].iter() {
        match self.eval_stmt_list(&inner, &branch.stx.body)? {
          Completion::Normal(v) => {
            if v.is_some() {
              last = v;
            };
          }
          Completion::Break(None, v) => return Ok(Completion::Normal(v.or(last))),
          other => return Ok(other.update_empty(last)),
        };
      }
    };
    Ok(Completion::Normal(last))
  }

  fn eval_try(&mut self, scope: &Rc<Scope>, stmt: &TryStmt) -> Result<Completion, VmError> {
    // Terminations skip `catch` and `finally` entirely.
    let mut result = self.eval_block(scope, &stmt.wrapped.stx.body)?;
    if let Some(catch) = &stmt.catch {
      result = match result {
        Completion::Throw(thrown) => self.eval_catch(scope, &catch.stx, thrown)?,
        other => other,
      };
    };
    if let Some(finally) = &stmt.finally {
      let finally_result = self.eval_block(scope, &finally.stx.body)?;
      if finally_result.is_abrupt() {
        return Ok(finally_result);
      };
    };
    Ok(result.update_empty(Some(Value::Undefined)))
  }

  fn eval_catch(
    &mut self,
    scope: &Rc<Scope>,
    catch: &CatchBlock,
    thrown: Value,
  ) -> Result<Completion, VmError> {
    let inner = Scope::child(scope, ScopeKind::Block);
    if let Some(param) = &catch.parameter {
      if let Err(err) = inner.declare_let(param, thrown) {
        debug!(%err, "catch parameter skipped");
      };
    };
    self.hoist_functions(&inner, &catch.body);
    self.eval_stmt_list(&inner, &catch.body)
  }

  /// Evaluates an initializer, naming it after its binding if it's an anonymous function.
  pub(crate) fn eval_named_expr(
    &mut self,
    scope: &Rc<Scope>,
    expr: &Expr,
    name: &str,
  ) -> Result<Value, VmError> {
    match expr {
      Expr::Func(func) if func.stx.name.is_none() => {
        Ok(self.make_closure(Some(name), &func.stx.func, scope))
      }
      _ => self.eval_expr(scope, expr),
    }
  }
}
