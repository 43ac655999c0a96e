use super::stack::ensure_sufficient_stack;
use super::Evaluator;
use super::Hint;
use crate::error::AssignError;
use crate::error::VmError;
use crate::object::JsObject;
use crate::ops;
use crate::reference::VarRef;
use crate::scope::Scope;
use crate::value::Value;
use parse_script_js::ast::expr::BinaryExpr;
use parse_script_js::ast::expr::CallExpr;
use parse_script_js::ast::expr::Expr;
use parse_script_js::ast::expr::LitArrElem;
use parse_script_js::ast::expr::LitArrExpr;
use parse_script_js::ast::expr::LitObjExpr;
use parse_script_js::ast::expr::ObjMemberKey;
use parse_script_js::ast::expr::UnaryExpr;
use parse_script_js::operator::OperatorName;
use std::cmp::Ordering;
use std::rc::Rc;

/// What an assignment target or `delete`/`typeof` operand resolves to.
pub(crate) enum Reference {
  Resolved(VarRef),
  /// A name with no binding anywhere in the scope chain.
  Unresolvable(String),
  /// A property of a primitive, including `undefined` and `null`.
  Primitive { base: Value, key: String },
}

/// A short rendering of a callee for error messages, e.g. `obj.method`.
fn describe_callee(expr: &Expr) -> String {
  match expr {
    Expr::Id(id) => id.stx.name.clone(),
    Expr::This(_) => "this".to_string(),
    Expr::Member(m) => format!("{}.{}", describe_callee(&m.stx.left), m.stx.right),
    Expr::ComputedMember(m) => format!("{}[...]", describe_callee(&m.stx.object)),
    Expr::Call(c) => format!("{}(...)", describe_callee(&c.stx.callee)),
    _ => "expression".to_string(),
  }
}

/// The numeric operators that apply ToNumber to both operands.
fn arithmetic(op: OperatorName) -> Option<fn(f64, f64) -> f64> {
  let f: fn(f64, f64) -> f64 = match op {
    OperatorName::Subtraction => |x, y| x - y,
    OperatorName::Multiplication => |x, y| x * y,
    OperatorName::Division => |x, y| x / y,
    OperatorName::Remainder => |x, y| x % y,
    OperatorName::Exponentiation => ops::exponentiate,
    _ => return None,
  };
  Some(f)
}

impl<'a> Evaluator<'a> {
  pub(crate) fn eval_expr(&mut self, scope: &Rc<Scope>, expr: &Expr) -> Result<Value, VmError> {
    ensure_sufficient_stack(|| self.eval_expr_inner(scope, expr))
  }

  fn eval_expr_inner(&mut self, scope: &Rc<Scope>, expr: &Expr) -> Result<Value, VmError> {
    match expr {
      Expr::LitNull(_) => Ok(Value::Null),
      Expr::LitBool(node) => Ok(Value::Bool(node.stx.value)),
      Expr::LitNum(node) => Ok(Value::Number(node.stx.value.0)),
      Expr::LitStr(node) => Ok(Value::string(node.stx.value.as_str())),
      Expr::LitArr(node) => self.eval_lit_arr(scope, &node.stx),
      Expr::LitObj(node) => self.eval_lit_obj(scope, &node.stx),
      Expr::Id(node) => match scope.find(&node.stx.name) {
        Some(r) => Ok(r.get()),
        None => Err(self.reference_error(format!("{} is not defined", node.stx.name))),
      },
      Expr::This(_) => Ok(scope.this_value()),
      Expr::Func(node) => Ok(self.eval_func_expr(scope, node.stx.name.as_deref(), &node.stx.func)),
      Expr::Member(node) => {
        let base = self.eval_expr(scope, &node.stx.left)?;
        self.get_property(&base, &node.stx.right)
      }
      Expr::ComputedMember(node) => {
        let base = self.eval_expr(scope, &node.stx.object)?;
        let key = self.eval_expr(scope, &node.stx.member)?;
        let key = self.to_property_key(&key)?;
        self.get_property(&base, &key)
      }
      Expr::Call(node) => self.eval_call(scope, &node.stx),
      Expr::Cond(node) => {
        let test = self.eval_expr(scope, &node.stx.test)?;
        if ops::to_boolean(&test) {
          self.eval_expr(scope, &node.stx.consequent)
        } else {
          self.eval_expr(scope, &node.stx.alternate)
        }
      }
      Expr::Unary(node) => self.eval_unary(scope, &node.stx),
      Expr::UnaryPostfix(node) => {
        let reference = self.eval_reference(scope, &node.stx.argument)?;
        let old = self.get_value(&reference)?;
        let old = self.to_number(&old)?;
        let new = match node.stx.operator {
          OperatorName::PostfixIncrement => old + 1.0,
          _ => old - 1.0,
        };
        self.put_value(scope, reference, Value::Number(new))?;
        Ok(Value::Number(old))
      }
      Expr::Binary(node) => self.eval_binary(scope, &node.stx),
    }
  }

  fn eval_lit_arr(&mut self, scope: &Rc<Scope>, lit: &LitArrExpr) -> Result<Value, VmError> {
    let arr = self.new_array([]);
    for (i, elem) in lit.elements.iter().enumerate() {
      match elem {
        LitArrElem::Single(expr) => {
          let value = self.eval_expr(scope, expr)?;
          arr.set(&i.to_string(), value);
        }
        // Holes still count towards the length.
        LitArrElem::Empty => {
          arr.set("length", Value::Number(i as f64 + 1.0));
        }
      };
    }
    Ok(Value::Object(arr))
  }

  fn eval_lit_obj(&mut self, scope: &Rc<Scope>, lit: &LitObjExpr) -> Result<Value, VmError> {
    let obj = self.new_object();
    for member in lit.members.iter() {
      let key = match &member.stx.key {
        ObjMemberKey::Name(name) => name.clone(),
        ObjMemberKey::Num(n) => ops::number_to_string(n.0),
      };
      let value = self.eval_named_expr(scope, &member.stx.value, &key)?;
      obj.set(&key, value);
    }
    Ok(Value::Object(obj))
  }

  /// Resolves an expression to something that can be read, written or deleted.
  pub(crate) fn eval_reference(&mut self, scope: &Rc<Scope>, expr: &Expr) -> Result<Reference, VmError> {
    match expr {
      Expr::Id(id) => Ok(match scope.find(&id.stx.name) {
        Some(r) => Reference::Resolved(r),
        None => Reference::Unresolvable(id.stx.name.clone()),
      }),
      Expr::Member(m) => {
        let base = self.eval_expr(scope, &m.stx.left)?;
        Ok(Self::property_reference(base, m.stx.right.clone()))
      }
      Expr::ComputedMember(m) => {
        let base = self.eval_expr(scope, &m.stx.object)?;
        let key = self.eval_expr(scope, &m.stx.member)?;
        let key = self.to_property_key(&key)?;
        Ok(Self::property_reference(base, key))
      }
      _ => Err(self.error(
        crate::realm::ErrorKind::SyntaxError,
        "Invalid left-hand side in assignment",
      )),
    }
  }

  fn property_reference(base: Value, key: String) -> Reference {
    match base {
      Value::Object(object) => Reference::Resolved(VarRef::property(object, key)),
      base => Reference::Primitive { base, key },
    }
  }

  pub(crate) fn get_value(&mut self, reference: &Reference) -> Result<Value, VmError> {
    match reference {
      Reference::Resolved(r) => Ok(r.get()),
      Reference::Unresolvable(name) => Err(self.reference_error(format!("{name} is not defined"))),
      Reference::Primitive { base, key } => self.get_property(base, key),
    }
  }

  pub(crate) fn put_value(
    &mut self,
    scope: &Rc<Scope>,
    reference: Reference,
    value: Value,
  ) -> Result<(), VmError> {
    match reference {
      Reference::Resolved(r) => r.set(value).map_err(|err| match err {
        AssignError::Const => self.type_error("Assignment to constant variable."),
        AssignError::InvalidArrayLength => self.range_error("Invalid array length"),
      }),
      // Sloppy mode: assigning an undeclared name creates a global.
      Reference::Unresolvable(name) => {
        if let Err(err) = scope.root_scope().declare_var(&name, value) {
          tracing::debug!(%err, "implicit global skipped");
        };
        Ok(())
      }
      Reference::Primitive { base, key } => {
        if base.is_nullish() {
          return Err(self.type_error(format!(
            "Cannot set properties of {} (setting '{key}')",
            ops::primitive_to_string(&base)
          )));
        };
        Ok(())
      }
    }
  }

  /// Assigns to a name the way `x = value` would.
  pub(crate) fn assign_name(&mut self, scope: &Rc<Scope>, name: &str, value: Value) -> Result<(), VmError> {
    let reference = match scope.find(name) {
      Some(r) => Reference::Resolved(r),
      None => Reference::Unresolvable(name.to_string()),
    };
    self.put_value(scope, reference, value)
  }

  fn eval_call(&mut self, scope: &Rc<Scope>, call: &CallExpr) -> Result<Value, VmError> {
    // Method calls pass their base object as `this`.
    let (callee, this) = match &call.callee {
      Expr::Member(m) => {
        let base = self.eval_expr(scope, &m.stx.left)?;
        (self.get_property(&base, &m.stx.right)?, base)
      }
      Expr::ComputedMember(m) => {
        let base = self.eval_expr(scope, &m.stx.object)?;
        let key = self.eval_expr(scope, &m.stx.member)?;
        let key = self.to_property_key(&key)?;
        (self.get_property(&base, &key)?, base)
      }
      other => (self.eval_expr(scope, other)?, Value::Undefined),
    };
    let args = self.eval_args(scope, &call.arguments)?;
    if !callee.is_callable() {
      return Err(self.type_error(format!("{} is not a function", describe_callee(&call.callee))));
    };
    self.call(&callee, this, &args)
  }

  fn eval_args(&mut self, scope: &Rc<Scope>, args: &[Expr]) -> Result<Vec<Value>, VmError> {
    args.iter().map(|a| self.eval_expr(scope, a)).collect()
  }

  fn eval_unary(&mut self, scope: &Rc<Scope>, expr: &UnaryExpr) -> Result<Value, VmError> {
    match expr.operator {
      OperatorName::New => {
        let (callee_expr, arg_exprs): (&Expr, &[Expr]) = match &expr.argument {
          Expr::Call(call) => (&call.stx.callee, &call.stx.arguments),
          other => (other, &[]),
        };
        let callee = self.eval_expr(scope, callee_expr)?;
        let args = self.eval_args(scope, arg_exprs)?;
        if !callee.as_object().and_then(JsObject::callable).is_some_and(|c| c.is_constructor()) {
          return Err(self.type_error(format!("{} is not a constructor", describe_callee(callee_expr))));
        };
        self.construct(&callee, &args)
      }
      OperatorName::Typeof => {
        // `typeof undeclared` doesn't throw.
        if let Expr::Id(id) = &expr.argument {
          if scope.find(&id.stx.name).is_none() {
            return Ok(Value::from("undefined"));
          };
        };
        let value = self.eval_expr(scope, &expr.argument)?;
        Ok(Value::from(value.type_of()))
      }
      OperatorName::Delete => match &expr.argument {
        Expr::Member(_) | Expr::ComputedMember(_) => {
          match self.eval_reference(scope, &expr.argument)? {
            Reference::Resolved(r) => Ok(Value::Bool(r.delete())),
            Reference::Primitive { base, key } if base.is_nullish() => Err(self.type_error(format!(
              "Cannot convert undefined or null to object (deleting '{key}')"
            ))),
            _ => Ok(Value::Bool(true)),
          }
        }
        // Bindings can't be deleted.
        Expr::Id(_) => Ok(Value::Bool(false)),
        other => {
          self.eval_expr(scope, other)?;
          Ok(Value::Bool(true))
        }
      },
      OperatorName::PrefixIncrement | OperatorName::PrefixDecrement => {
        let reference = self.eval_reference(scope, &expr.argument)?;
        let old = self.get_value(&reference)?;
        let old = self.to_number(&old)?;
        let new = if expr.operator == OperatorName::PrefixIncrement {
          old + 1.0
        } else {
          old - 1.0
        };
        self.put_value(scope, reference, Value::Number(new))?;
        Ok(Value::Number(new))
      }
      op => {
        let value = self.eval_expr(scope, &expr.argument)?;
        Ok(match op {
          OperatorName::Void => Value::Undefined,
          OperatorName::LogicalNot => Value::Bool(!ops::to_boolean(&value)),
          OperatorName::UnaryNegation => Value::Number(-self.to_number(&value)?),
          OperatorName::UnaryPlus => Value::Number(self.to_number(&value)?),
          OperatorName::BitwiseNot => Value::Number(!self.to_int32(&value)? as f64),
          _ => return Err(VmError::Unimplemented("unary operator")),
        })
      }
    }
  }

  fn eval_binary(&mut self, scope: &Rc<Scope>, expr: &BinaryExpr) -> Result<Value, VmError> {
    match expr.operator {
      OperatorName::Assignment => {
        let reference = self.eval_reference(scope, &expr.left)?;
        let value = match &expr.left {
          Expr::Id(id) => self.eval_named_expr(scope, &expr.right, &id.stx.name)?,
          _ => self.eval_expr(scope, &expr.right)?,
        };
        self.put_value(scope, reference, value.clone())?;
        Ok(value)
      }
      op if op.is_assignment() => {
        let reference = self.eval_reference(scope, &expr.left)?;
        let old = self.get_value(&reference)?;
        let right = self.eval_expr(scope, &expr.right)?;
        let Some(binary) = op.compound_assignment_operator() else {
          return Err(VmError::Unimplemented("assignment operator"));
        };
        let value = self.apply_binary(binary, &old, &right)?;
        self.put_value(scope, reference, value.clone())?;
        Ok(value)
      }
      OperatorName::LogicalAnd => {
        let left = self.eval_expr(scope, &expr.left)?;
        if !ops::to_boolean(&left) {
          return Ok(left);
        };
        self.eval_expr(scope, &expr.right)
      }
      OperatorName::LogicalOr => {
        let left = self.eval_expr(scope, &expr.left)?;
        if ops::to_boolean(&left) {
          return Ok(left);
        };
        self.eval_expr(scope, &expr.right)
      }
      OperatorName::Comma => {
        self.eval_expr(scope, &expr.left)?;
        self.eval_expr(scope, &expr.right)
      }
      op => {
        let left = self.eval_expr(scope, &expr.left)?;
        let right = self.eval_expr(scope, &expr.right)?;
        self.apply_binary(op, &left, &right)
      }
    }
  }

  /// Applies a non-short-circuiting binary operator to evaluated operands.
  pub fn apply_binary(&mut self, op: OperatorName, a: &Value, b: &Value) -> Result<Value, VmError> {
    if let Some(f) = arithmetic(op) {
      let x = self.to_number(a)?;
      let y = self.to_number(b)?;
      return Ok(Value::Number(f(x, y)));
    };

    Ok(match op {
      OperatorName::Addition => {
        let pa = self.to_primitive(a, Hint::Default)?;
        let pb = self.to_primitive(b, Hint::Default)?;
        if matches!(pa, Value::String(_)) || matches!(pb, Value::String(_)) {
          let mut s = self.to_string(&pa)?.to_string();
          s.push_str(&self.to_string(&pb)?);
          Value::string(s)
        } else {
          Value::Number(self.to_number(&pa)? + self.to_number(&pb)?)
        }
      }
      OperatorName::BitwiseAnd => Value::Number((self.to_int32(a)? & self.to_int32(b)?) as f64),
      OperatorName::BitwiseOr => Value::Number((self.to_int32(a)? | self.to_int32(b)?) as f64),
      OperatorName::BitwiseXor => Value::Number((self.to_int32(a)? ^ self.to_int32(b)?) as f64),
      OperatorName::BitwiseLeftShift => {
        let x = self.to_int32(a)?;
        let y = self.to_uint32(b)? & 31;
        Value::Number(x.wrapping_shl(y) as f64)
      }
      OperatorName::BitwiseRightShift => {
        let x = self.to_int32(a)?;
        let y = self.to_uint32(b)? & 31;
        Value::Number((x >> y) as f64)
      }
      OperatorName::BitwiseUnsignedRightShift => {
        let x = self.to_uint32(a)?;
        let y = self.to_uint32(b)? & 31;
        Value::Number((x >> y) as f64)
      }
      OperatorName::Equality => Value::Bool(self.loose_equals(a, b)?),
      OperatorName::Inequality => Value::Bool(!self.loose_equals(a, b)?),
      OperatorName::StrictEquality => Value::Bool(ops::strict_equals(a, b)),
      OperatorName::StrictInequality => Value::Bool(!ops::strict_equals(a, b)),
      OperatorName::LessThan => Value::Bool(self.compare(a, b)? == Some(Ordering::Less)),
      OperatorName::GreaterThan => Value::Bool(self.compare(a, b)? == Some(Ordering::Greater)),
      OperatorName::LessThanOrEqual => Value::Bool(matches!(
        self.compare(a, b)?,
        Some(Ordering::Less | Ordering::Equal)
      )),
      OperatorName::GreaterThanOrEqual => Value::Bool(matches!(
        self.compare(a, b)?,
        Some(Ordering::Greater | Ordering::Equal)
      )),
      OperatorName::In => {
        let Value::Object(obj) = b else {
          let key = self.to_string(a)?;
          return Err(self.type_error(format!(
            "Cannot use 'in' operator to search for '{key}' in {}",
            ops::primitive_to_string(b)
          )));
        };
        let key = self.to_property_key(a)?;
        Value::Bool(obj.has_property(&key))
      }
      OperatorName::Instanceof => Value::Bool(self.instance_of(a, b)?),
      _ => return Err(VmError::Unimplemented("binary operator")),
    })
  }

  fn instance_of(&mut self, value: &Value, ctor: &Value) -> Result<bool, VmError> {
    let Some(callable) = ctor.as_object().and_then(JsObject::callable) else {
      return Err(self.type_error("Right-hand side of 'instanceof' is not callable"));
    };
    if let crate::function::Callable::Bound(bound) = callable {
      return self.instance_of(value, &Value::Object(bound.target.clone()));
    };
    let Value::Object(obj) = value else {
      return Ok(false);
    };
    let Value::Object(proto) = self.get_property(ctor, "prototype")? else {
      return Err(self.type_error("Function has non-object prototype in instanceof check"));
    };
    let mut cur = obj.proto();
    while let Some(o) = cur {
      if o.ptr_eq(&proto) {
        return Ok(true);
      };
      cur = o.proto();
    }
    Ok(false)
  }
}
