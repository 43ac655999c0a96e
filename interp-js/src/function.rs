use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::scope::Scope;
use crate::value::Value;
use parse_script_js::ast::func::Func;
use parse_script_js::ast::node::Node;
use std::rc::Rc;

/// The signature of a host function: `(evaluator, this, args) -> result`.
pub type NativeCall = Rc<dyn Fn(&mut Evaluator<'_>, Value, &[Value]) -> Result<Value, VmError>>;

/// Constructs an object for `new F(...)`. Functions without one are not constructors.
pub type NativeConstruct = fn(&mut Evaluator<'_>, &[Value]) -> Result<Value, VmError>;

#[derive(Clone)]
pub struct NativeFunction {
  pub name: Rc<str>,
  pub call: NativeCall,
  pub construct: Option<NativeConstruct>,
}

/// A script function together with the scope it was created in.
pub struct Closure {
  pub name: Option<Rc<str>>,
  pub func: Rc<Node<Func>>,
  // Fixed at creation.
  pub scope: Rc<Scope>,
}

pub struct BoundFunction {
  pub target: JsObject,
  pub this: Value,
  pub args: Vec<Value>,
}

/// The internal function record of a callable object.
#[derive(Clone)]
pub enum Callable {
  Closure(Rc<Closure>),
  Native(NativeFunction),
  Bound(Rc<BoundFunction>),
}

impl Callable {
  pub fn name(&self) -> Rc<str> {
    match self {
      Callable::Closure(c) => c.name.clone().unwrap_or_else(|| "".into()),
      Callable::Native(n) => n.name.clone(),
      Callable::Bound(b) => match b.target.callable() {
        Some(target) => format!("bound {}", target.name()).into(),
        None => "bound ".into(),
      },
    }
  }

  pub fn is_constructor(&self) -> bool {
    match self {
      Callable::Closure(_) => true,
      Callable::Native(n) => n.construct.is_some(),
      Callable::Bound(b) => b.target.callable().is_some_and(|c| c.is_constructor()),
    }
  }
}

impl JsObject {
  /// Creates a host function object. It is linked to `Function.prototype` when it enters a run.
  ///
  /// ```
  /// use interp_js::JsObject;
  /// use interp_js::Value;
  ///
  /// let double = JsObject::native_function("double", 1, |_, _, args| {
  ///   Ok(Value::Number(args.first().and_then(Value::as_number).unwrap_or(f64::NAN) * 2.0))
  /// });
  /// assert!(double.is_callable());
  /// ```
  pub fn native_function(
    name: &str,
    length: u32,
    call: impl Fn(&mut Evaluator<'_>, Value, &[Value]) -> Result<Value, VmError> + 'static,
  ) -> JsObject {
    let obj = JsObject::host(ObjectClass::Function(Callable::Native(NativeFunction {
      name: name.into(),
      call: Rc::new(call),
      construct: None,
    })));
    define_function_props(&obj, name, length);
    obj
  }

  /// Creates an empty host object. It is linked to `Object.prototype` when it enters a run.
  pub fn new_object() -> JsObject {
    JsObject::host(ObjectClass::Ordinary)
  }

  /// Creates a host array. It is linked to `Array.prototype` when it enters a run.
  pub fn new_array(elements: impl IntoIterator<Item = Value>) -> JsObject {
    let arr = JsObject::host(ObjectClass::Array);
    for e in elements {
      arr.push(e);
    }
    arr
  }
}

pub(crate) fn define_function_props(obj: &JsObject, name: &str, length: u32) {
  obj.define("name", Value::string(name), false);
  obj.define("length", Value::Number(length as f64), false);
}
