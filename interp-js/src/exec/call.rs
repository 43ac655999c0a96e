use super::Evaluator;
use crate::completion::Completion;
use crate::error::Termination;
use crate::error::TerminationReason;
use crate::error::VmError;
use crate::function::define_function_props;
use crate::function::Callable;
use crate::function::Closure;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::realm::ErrorKind;
use crate::scope::Scope;
use crate::scope::ScopeKind;
use crate::value::Value;
use parse_script_js::ast::func::Func;
use parse_script_js::ast::node::Node;
use std::rc::Rc;
use tracing::trace;

impl<'a> Evaluator<'a> {
  /// Creates a function object for a script function closing over `scope`.
  pub(crate) fn make_closure(&mut self, name: Option<&str>, func: &Rc<Node<Func>>, scope: &Rc<Scope>) -> Value {
    let intrinsics = &self.realm.intrinsics;
    let closure = Closure {
      name: name.map(Rc::from),
      func: func.clone(),
      scope: scope.clone(),
    };
    let obj = JsObject::new(
      ObjectClass::Function(Callable::Closure(Rc::new(closure))),
      Some(intrinsics.function_prototype.clone()),
    );
    define_function_props(&obj, name.unwrap_or(""), func.stx.parameters.len() as u32);
    let prototype = JsObject::new(ObjectClass::Ordinary, Some(intrinsics.object_prototype.clone()));
    prototype.define("constructor", Value::Object(obj.clone()), false);
    obj.define("prototype", Value::Object(prototype), false);
    Value::Object(obj)
  }

  /// A function expression. A named one sees its own name as a constant binding.
  pub(crate) fn eval_func_expr(&mut self, scope: &Rc<Scope>, name: Option<&str>, func: &Rc<Node<Func>>) -> Value {
    let Some(name) = name else {
      return self.make_closure(None, func, scope);
    };
    let own = Scope::child(scope, ScopeKind::Block);
    let value = self.make_closure(Some(name), func, &own);
    if let Err(err) = own.declare_const(name, value.clone()) {
      tracing::debug!(%err, "function expression name skipped");
    };
    value
  }

  fn enter_call(&mut self, name: Rc<str>, argc: usize) -> Result<(), VmError> {
    if self.realm.call_stack.len() >= self.realm.max_call_depth {
      let stack = self.realm.stack_trace();
      tracing::warn!(depth = stack.len(), "call depth limit exceeded");
      return Err(VmError::Termination(Termination::new(
        TerminationReason::StackOverflow,
        stack,
      )));
    };
    trace!(name = %name, argc, "call");
    self.realm.call_stack.push(name);
    Ok(())
  }

  fn leave_call(&mut self) {
    self.realm.call_stack.pop();
  }

  /// Calls a function value with the given `this` and arguments.
  pub fn call(&mut self, callee: &Value, this: Value, args: &[Value]) -> Result<Value, VmError> {
    let Some(callable) = callee.as_object().and_then(JsObject::callable) else {
      return Err(self.type_error(format!(
        "{} is not a function",
        crate::ops::inspect(callee)
      )));
    };
    match callable {
      Callable::Native(native) => {
        self.enter_call(native.name.clone(), args.len())?;
        let result = (native.call)(self, this, args);
        self.leave_call();
        result
      }
      Callable::Closure(closure) => {
        self.enter_call(closure.name.clone().unwrap_or_else(|| "<anonymous>".into()), args.len())?;
        let result = self.call_closure(&closure, this, args);
        self.leave_call();
        result
      }
      Callable::Bound(bound) => {
        let mut all = bound.args.clone();
        all.extend_from_slice(args);
        self.call(&Value::Object(bound.target.clone()), bound.this.clone(), &all)
      }
    }
  }

  fn call_closure(&mut self, closure: &Closure, this: Value, args: &[Value]) -> Result<Value, VmError> {
    let func = &closure.func.stx;
    let activation = Scope::activation(&closure.scope, this);
    // Parameters are positional; later duplicates win.
    for (i, param) in func.parameters.iter().enumerate() {
      let value = args.get(i).cloned().unwrap_or_default();
      if let Err(err) = activation.bind_var(&param.stx.name, value) {
        tracing::debug!(%err, "parameter skipped");
      };
    }
    if !activation.has_local("arguments") {
      let arguments = JsObject::new(
        ObjectClass::Arguments,
        Some(self.realm.intrinsics.object_prototype.clone()),
      );
      for (i, arg) in args.iter().enumerate() {
        arguments.set(&i.to_string(), arg.clone());
      }
      arguments.define("length", Value::Number(args.len() as f64), false);
      if let Err(err) = activation.declare_var("arguments", Value::Object(arguments)) {
        tracing::debug!(%err, "arguments object skipped");
      };
    };
    self.hoist_declarations(&activation, &func.body);
    match self.eval_stmt_list(&activation, &func.body)? {
      Completion::Normal(_) => Ok(Value::Undefined),
      Completion::Return(value) => Ok(value),
      Completion::Throw(value) => Err(VmError::Throw(value)),
      Completion::Break(..) => Err(self.error(ErrorKind::SyntaxError, "Illegal break statement")),
      Completion::Continue(..) => Err(self.error(ErrorKind::SyntaxError, "Illegal continue statement")),
    }
  }

  /// `new callee(...args)`.
  pub fn construct(&mut self, callee: &Value, args: &[Value]) -> Result<Value, VmError> {
    let Some(callable) = callee.as_object().and_then(JsObject::callable) else {
      return Err(self.type_error(format!("{} is not a constructor", crate::ops::inspect(callee))));
    };
    match callable {
      Callable::Closure(closure) => {
        let proto = match self.get_property(callee, "prototype")? {
          Value::Object(proto) => proto,
          _ => self.realm.intrinsics.object_prototype.clone(),
        };
        let this = Value::Object(JsObject::new(ObjectClass::Ordinary, Some(proto)));
        self.enter_call(closure.name.clone().unwrap_or_else(|| "<anonymous>".into()), args.len())?;
        let result = self.call_closure(&closure, this.clone(), args);
        self.leave_call();
        match result? {
          result @ Value::Object(_) => Ok(result),
          _ => Ok(this),
        }
      }
      Callable::Native(native) => match native.construct {
        Some(construct) => {
          self.enter_call(native.name.clone(), args.len())?;
          let result = construct(self, args);
          self.leave_call();
          result
        }
        None => Err(self.type_error(format!("{} is not a constructor", native.name))),
      },
      Callable::Bound(bound) => {
        let mut all = bound.args.clone();
        all.extend_from_slice(args);
        self.construct(&Value::Object(bound.target.clone()), &all)
      }
    }
  }
}
