use crate::error::DeclareError;
use crate::reference::SlotKind;
use crate::reference::VarRef;
use crate::value::Value;
use ahash::HashMap;
use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
  Function,
  Loop,
  Switch,
  Block,
}

/// A lexical environment.
///
/// The parent link is only ever followed outward for lookups. It's a strong `Rc` so that a closure
/// holding an inner scope keeps its whole chain alive; nothing ever points from a parent to its
/// children, so the chain itself can't form a cycle.
#[derive(Debug)]
pub struct Scope {
  kind: ScopeKind,
  parent: Option<Rc<Scope>>,
  bindings: RefCell<HashMap<String, VarRef>>,
  permeable: Cell<bool>,
  // Set on function and root scopes.
  this: Option<Value>,
}

impl Scope {
  fn new(kind: ScopeKind, parent: Option<Rc<Scope>>, permeable: bool, this: Option<Value>) -> Rc<Scope> {
    Rc::new(Scope {
      kind,
      parent,
      bindings: RefCell::new(HashMap::default()),
      permeable: Cell::new(permeable),
      this,
    })
  }

  /// The program's scope. It counts as a function scope for `var`, and `this` is undefined.
  pub fn root() -> Rc<Scope> {
    Scope::new(ScopeKind::Function, None, false, Some(Value::Undefined))
  }

  pub fn child(parent: &Rc<Scope>, kind: ScopeKind) -> Rc<Scope> {
    Scope::new(kind, Some(parent.clone()), false, None)
  }

  /// A scope whose first directly nested block runs in it instead of creating its own.
  pub fn permeable(parent: &Rc<Scope>, kind: ScopeKind) -> Rc<Scope> {
    Scope::new(kind, Some(parent.clone()), true, None)
  }

  /// A function activation.
  pub fn activation(parent: &Rc<Scope>, this: Value) -> Rc<Scope> {
    Scope::new(ScopeKind::Function, Some(parent.clone()), false, Some(this))
  }

  pub fn kind(&self) -> ScopeKind {
    self.kind
  }

  pub fn parent(&self) -> Option<&Rc<Scope>> {
    self.parent.as_ref()
  }

  pub fn is_permeable(&self) -> bool {
    self.permeable.get()
  }

  /// Claims this scope for a block entered directly inside it. Only the first claim succeeds.
  pub fn take_permeable(&self) -> bool {
    self.permeable.replace(false)
  }

  pub fn has_local(&self, name: &str) -> bool {
    self.bindings.borrow().contains_key(name)
  }

  pub fn local(&self, name: &str) -> Option<VarRef> {
    self.bindings.borrow().get(name).cloned()
  }

  /// Names bound directly in this scope, in no particular order.
  pub fn local_names(&self) -> Vec<String> {
    self.bindings.borrow().keys().cloned().collect()
  }

  /// Resolves a name through this scope and its ancestors.
  pub fn find(&self, name: &str) -> Option<VarRef> {
    let mut cur = self;
    loop {
      if let Some(r) = cur.local(name) {
        return Some(r);
      };
      cur = cur.parent.as_deref()?;
    }
  }

  pub fn lookup(&self, name: &str) -> Option<Value> {
    self.find(name).map(|r| r.get())
  }

  /// The nearest enclosing function scope, or the root.
  pub fn function_scope(&self) -> &Scope {
    let mut cur = self;
    while cur.kind != ScopeKind::Function {
      match cur.parent.as_deref() {
        Some(p) => cur = p,
        None => break,
      };
    }
    cur
  }

  pub fn root_scope(&self) -> &Scope {
    let mut cur = self;
    while let Some(p) = cur.parent.as_deref() {
      cur = p;
    }
    cur
  }

  /// The `this` of the nearest function activation.
  pub fn this_value(&self) -> Value {
    let mut cur = self;
    loop {
      if let Some(this) = &cur.this {
        return this.clone();
      };
      match cur.parent.as_deref() {
        Some(p) => cur = p,
        None => return Value::Undefined,
      };
    }
  }

  fn insert_new(&self, kind: SlotKind, name: &str, value: Value) -> Result<(), DeclareError> {
    let mut bindings = self.bindings.borrow_mut();
    if bindings.contains_key(name) {
      return Err(DeclareError::AlreadyDeclared(name.to_string()));
    };
    bindings.insert(name.to_string(), VarRef::slot(kind, value));
    Ok(())
  }

  pub fn declare_const(&self, name: &str, value: Value) -> Result<(), DeclareError> {
    self.insert_new(SlotKind::Const, name, value)
  }

  pub fn declare_let(&self, name: &str, value: Value) -> Result<(), DeclareError> {
    self.insert_new(SlotKind::Let, name, value)
  }

  /// Declares in the nearest function scope. Redeclaring a `var` there is a no-op success that keeps
  /// the current value; colliding with a `let` or `const` there fails.
  pub fn declare_var(&self, name: &str, value: Value) -> Result<(), DeclareError> {
    let target = self.function_scope();
    match target.local(name).and_then(|r| r.kind()) {
      Some(SlotKind::Var) => Ok(()),
      Some(_) => Err(DeclareError::AlreadyDeclared(name.to_string())),
      None => target.insert_new(SlotKind::Var, name, value),
    }
  }

  pub fn declare(&self, kind: SlotKind, name: &str, value: Value) -> Result<(), DeclareError> {
    match kind {
      SlotKind::Const => self.declare_const(name, value),
      SlotKind::Let => self.declare_let(name, value),
      SlotKind::Var => self.declare_var(name, value),
    }
  }

  /// Binds a `var`-like name directly in this scope, overwriting the value of an existing `var`.
  /// Parameters and hoisted function declarations bind this way, so a later declaration of the same
  /// name replaces an earlier one.
  pub fn bind_var(&self, name: &str, value: Value) -> Result<(), DeclareError> {
    match self.local(name) {
      Some(r) if r.kind() == Some(SlotKind::Var) => {
        r.initialize(value);
        Ok(())
      }
      Some(_) => Err(DeclareError::AlreadyDeclared(name.to_string())),
      None => self.insert_new(SlotKind::Var, name, value),
    }
  }

  /// Copies this scope's `let` bindings into a fresh sibling scope. Used to give each loop iteration
  /// its own bindings.
  pub fn copy_lets(&self) -> Rc<Scope> {
    let copy = Scope::new(self.kind, self.parent.clone(), false, None);
    for (name, r) in self.bindings.borrow().iter() {
      let copied = match r.kind() {
        Some(SlotKind::Let) => VarRef::slot(SlotKind::Let, r.get()),
        _ => r.clone(),
      };
      copy.bindings.borrow_mut().insert(name.clone(), copied);
    }
    copy
  }
}

#[cfg(test)]
mod tests {
  use super::Scope;
  use super::ScopeKind;
  use crate::error::DeclareError;
  use crate::value::Value;

  #[test]
  fn test_find_walks_outward() {
    let root = Scope::root();
    root.declare_let("a", Value::Number(1.0)).unwrap();
    let block = Scope::child(&root, ScopeKind::Block);
    let inner = Scope::child(&block, ScopeKind::Loop);
    assert_eq!(inner.lookup("a"), Some(Value::Number(1.0)));
    assert!(inner.find("missing").is_none());
  }

  #[test]
  fn test_var_binds_in_function_scope() {
    let root = Scope::root();
    let func = Scope::activation(&root, Value::Undefined);
    let block = Scope::child(&func, ScopeKind::Block);
    let lp = Scope::child(&block, ScopeKind::Loop);
    lp.declare_var("v", Value::Number(1.0)).unwrap();
    assert!(func.has_local("v"));
    assert!(!block.has_local("v"));
    assert!(!lp.has_local("v"));
    assert!(!root.has_local("v"));
  }

  #[test]
  fn test_var_redeclaration_keeps_value() {
    let root = Scope::root();
    root.declare_var("v", Value::Number(1.0)).unwrap();
    root.declare_var("v", Value::Undefined).unwrap();
    assert_eq!(root.lookup("v"), Some(Value::Number(1.0)));
  }

  #[test]
  fn test_redeclaration_fails_without_mutation() {
    let root = Scope::root();
    root.declare_const("c", Value::Number(1.0)).unwrap();
    assert_eq!(
      root.declare_let("c", Value::Number(2.0)),
      Err(DeclareError::AlreadyDeclared("c".into()))
    );
    assert!(root.declare_var("c", Value::Number(3.0)).is_err());
    assert!(root.declare_const("c", Value::Number(4.0)).is_err());
    assert_eq!(root.lookup("c"), Some(Value::Number(1.0)));

    root.declare_let("l", Value::Null).unwrap();
    assert!(root.declare_let("l", Value::Bool(true)).is_err());
    assert_eq!(root.lookup("l"), Some(Value::Null));
  }

  #[test]
  fn test_shadowing() {
    let root = Scope::root();
    root.declare_let("x", Value::Number(1.0)).unwrap();
    let block = Scope::child(&root, ScopeKind::Block);
    block.declare_let("x", Value::Number(2.0)).unwrap();
    assert_eq!(block.lookup("x"), Some(Value::Number(2.0)));
    assert_eq!(root.lookup("x"), Some(Value::Number(1.0)));
  }

  #[test]
  fn test_permeable_is_claimed_once() {
    let root = Scope::root();
    let body = Scope::permeable(&root, ScopeKind::Loop);
    assert!(body.is_permeable());
    assert!(body.take_permeable());
    assert!(!body.take_permeable());
  }

  #[test]
  fn test_this_resolves_through_activation() {
    let root = Scope::root();
    let func = Scope::activation(&root, Value::Number(5.0));
    let block = Scope::child(&func, ScopeKind::Block);
    assert_eq!(block.this_value(), Value::Number(5.0));
    assert_eq!(root.this_value(), Value::Undefined);
  }

  #[test]
  fn test_copy_lets_gives_fresh_slots() {
    let root = Scope::root();
    let head = Scope::child(&root, ScopeKind::Loop);
    head.declare_let("i", Value::Number(0.0)).unwrap();
    let next = head.copy_lets();
    next.find("i").unwrap().set(Value::Number(1.0)).unwrap();
    assert_eq!(head.lookup("i"), Some(Value::Number(0.0)));
    assert_eq!(next.lookup("i"), Some(Value::Number(1.0)));
  }
}
