use crate::builtins;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::function::define_function_props;
use crate::function::Callable;
use crate::function::NativeConstruct;
use crate::function::NativeFunction;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::options::ConsoleSink;
use crate::options::RuntimeOptions;
use crate::value::Value;
use std::hash::BuildHasher;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  Error,
  EvalError,
  RangeError,
  ReferenceError,
  SyntaxError,
  TypeError,
  URIError,
}

impl ErrorKind {
  pub const ALL: [ErrorKind; 7] = [
    ErrorKind::Error,
    ErrorKind::EvalError,
    ErrorKind::RangeError,
    ErrorKind::ReferenceError,
    ErrorKind::SyntaxError,
    ErrorKind::TypeError,
    ErrorKind::URIError,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ErrorKind::Error => "Error",
      ErrorKind::EvalError => "EvalError",
      ErrorKind::RangeError => "RangeError",
      ErrorKind::ReferenceError => "ReferenceError",
      ErrorKind::SyntaxError => "SyntaxError",
      ErrorKind::TypeError => "TypeError",
      ErrorKind::URIError => "URIError",
    }
  }
}

/// The prototypes every run starts with.
pub struct Intrinsics {
  pub object_prototype: JsObject,
  pub function_prototype: JsObject,
  pub array_prototype: JsObject,
  pub string_prototype: JsObject,
  pub number_prototype: JsObject,
  pub boolean_prototype: JsObject,
  // Indexed like `ErrorKind::ALL`.
  error_prototypes: Vec<JsObject>,
}

impl Intrinsics {
  fn new() -> Intrinsics {
    let object_prototype = JsObject::new(ObjectClass::Ordinary, None);
    let function_prototype = JsObject::new(
      ObjectClass::Function(Callable::Native(NativeFunction {
        name: "".into(),
        call: Rc::new(|_, _, _| Ok(Value::Undefined)),
        construct: None,
      })),
      Some(object_prototype.clone()),
    );
    let with_proto = |class| JsObject::new(class, Some(object_prototype.clone()));
    let array_prototype = with_proto(ObjectClass::Array);
    let string_prototype = with_proto(ObjectClass::String("".into()));
    let number_prototype = with_proto(ObjectClass::Number(0.0));
    let boolean_prototype = with_proto(ObjectClass::Boolean(false));
    let base_error = with_proto(ObjectClass::Ordinary);
    let error_prototypes = ErrorKind::ALL
      .iter()
      .map(|kind| match kind {
        ErrorKind::Error => base_error.clone(),
        _ => JsObject::new(ObjectClass::Ordinary, Some(base_error.clone())),
      })
      .collect();
    Intrinsics {
      object_prototype,
      function_prototype,
      array_prototype,
      string_prototype,
      number_prototype,
      boolean_prototype,
      error_prototypes,
    }
  }

  pub fn error_prototype(&self, kind: ErrorKind) -> &JsObject {
    let i = ErrorKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
    &self.error_prototypes[i]
  }
}

/// A callback registered with `setTimeout` or `setInterval`.
#[derive(Clone, Debug)]
pub struct Timer {
  pub id: u32,
  pub callback: Value,
  pub delay: f64,
  pub args: Vec<Value>,
  pub repeat: bool,
}

/// Timers registered by script code. Nothing here ever fires on its own.
#[derive(Debug, Default)]
pub struct TimerQueue {
  next_id: u32,
  pending: Vec<Timer>,
}

impl TimerQueue {
  pub fn register(&mut self, callback: Value, delay: f64, args: Vec<Value>, repeat: bool) -> u32 {
    self.next_id += 1;
    let id = self.next_id;
    self.pending.push(Timer {
      id,
      callback,
      delay,
      args,
      repeat,
    });
    id
  }

  pub fn clear(&mut self, id: u32) {
    self.pending.retain(|t| t.id != id);
  }

  pub fn len(&self) -> usize {
    self.pending.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty()
  }

  /// Removes and returns all pending timers, ordered by delay and then registration.
  pub fn take(&mut self) -> Vec<Timer> {
    let mut timers = std::mem::take(&mut self.pending);
    timers.sort_by(|a, b| a.delay.total_cmp(&b.delay).then(a.id.cmp(&b.id)));
    timers
  }
}

/// xorshift64*, enough for `Math.random`.
#[derive(Debug)]
pub struct Rng(u64);

impl Rng {
  pub fn new(seed: Option<u64>) -> Rng {
    let seed = seed.unwrap_or_else(|| BuildHasher::hash_one(&ahash::RandomState::new(), 0x5EED_u64));
    // Zero is a fixed point.
    Rng(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
  }

  pub fn next_f64(&mut self) -> f64 {
    let mut x = self.0;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    self.0 = x;
    let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
    // Top 53 bits as a fraction in [0, 1).
    (out >> 11) as f64 / (1u64 << 53) as f64
  }
}

/// The per-run state shared by all code in a run.
pub struct Realm {
  pub intrinsics: Intrinsics,
  pub timers: TimerQueue,
  pub rng: Rng,
  pub console: ConsoleSink,
  pub(crate) max_call_depth: usize,
  // Names of active calls, outermost first.
  pub(crate) call_stack: Vec<Rc<str>>,
}

impl Realm {
  pub fn new(options: &RuntimeOptions) -> Realm {
    let realm = Realm {
      intrinsics: Intrinsics::new(),
      timers: TimerQueue::default(),
      rng: Rng::new(options.random_seed),
      console: options.console.clone(),
      max_call_depth: options.max_call_depth,
      call_stack: Vec::new(),
    };
    builtins::install_prototypes(&realm);
    realm
  }

  pub fn new_object(&self) -> JsObject {
    JsObject::new(ObjectClass::Ordinary, Some(self.intrinsics.object_prototype.clone()))
  }

  pub fn new_array(&self, elements: impl IntoIterator<Item = Value>) -> JsObject {
    let arr = JsObject::new(ObjectClass::Array, Some(self.intrinsics.array_prototype.clone()));
    for e in elements {
      arr.push(e);
    }
    arr
  }

  pub fn new_error(&self, kind: ErrorKind, message: &str) -> JsObject {
    let err = JsObject::new(
      ObjectClass::Error,
      Some(self.intrinsics.error_prototype(kind).clone()),
    );
    err.define("message", Value::string(message), false);
    err
  }

  pub fn new_function(
    &self,
    name: &str,
    length: u32,
    call: impl Fn(&mut Evaluator<'_>, Value, &[Value]) -> Result<Value, VmError> + 'static,
  ) -> JsObject {
    self.make_native(name, length, Rc::new(call), None)
  }

  /// Creates a constructor wired to `prototype` in both directions.
  pub fn new_constructor(
    &self,
    name: &str,
    length: u32,
    call: impl Fn(&mut Evaluator<'_>, Value, &[Value]) -> Result<Value, VmError> + 'static,
    construct: NativeConstruct,
    prototype: &JsObject,
  ) -> JsObject {
    let ctor = self.make_native(name, length, Rc::new(call), Some(construct));
    ctor.define("prototype", Value::Object(prototype.clone()), false);
    prototype.define("constructor", Value::Object(ctor.clone()), false);
    ctor
  }

  fn make_native(
    &self,
    name: &str,
    length: u32,
    call: crate::function::NativeCall,
    construct: Option<NativeConstruct>,
  ) -> JsObject {
    let obj = JsObject::new(
      ObjectClass::Function(Callable::Native(NativeFunction {
        name: name.into(),
        call,
        construct,
      })),
      Some(self.intrinsics.function_prototype.clone()),
    );
    define_function_props(&obj, name, length);
    obj
  }

  /// Links objects the host created before this realm existed to this realm's prototypes.
  pub fn adopt(&self, value: &Value) {
    let Value::Object(obj) = value else {
      return;
    };
    let mut pending = vec![obj.clone()];
    while let Some(obj) = pending.pop() {
      {
        let mut data = obj.borrow_mut();
        if !data.unlinked {
          continue;
        };
        data.unlinked = false;
        if data.proto.is_none() {
          let proto = match &data.class {
            ObjectClass::Array => &self.intrinsics.array_prototype,
            ObjectClass::Function(_) => &self.intrinsics.function_prototype,
            ObjectClass::Error => self.intrinsics.error_prototype(ErrorKind::Error),
            ObjectClass::Boolean(_) => &self.intrinsics.boolean_prototype,
            ObjectClass::Number(_) => &self.intrinsics.number_prototype,
            ObjectClass::String(_) => &self.intrinsics.string_prototype,
            ObjectClass::Ordinary | ObjectClass::Arguments => &self.intrinsics.object_prototype,
          }
          .clone();
          data.proto = Some(proto);
        };
      }
      for key in obj.own_keys() {
        if let Some(Value::Object(child)) = obj.get_own(&key) {
          pending.push(child);
        };
      }
    }
  }

  /// Names of active calls, innermost first.
  pub fn stack_trace(&self) -> Vec<String> {
    self.call_stack.iter().rev().map(|n| n.to_string()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::Rng;
  use super::TimerQueue;
  use crate::value::Value;

  #[test]
  fn test_seeded_rng_is_deterministic() {
    let mut a = Rng::new(Some(42));
    let mut b = Rng::new(Some(42));
    for _ in 0..100 {
      let x = a.next_f64();
      assert_eq!(x, b.next_f64());
      assert!((0.0..1.0).contains(&x));
    }
  }

  #[test]
  fn test_timer_queue_order() {
    let mut q = TimerQueue::default();
    let slow = q.register(Value::Null, 100.0, vec![], false);
    let fast = q.register(Value::Null, 0.0, vec![], false);
    let cleared = q.register(Value::Null, 0.0, vec![], true);
    q.clear(cleared);
    let ids: Vec<u32> = q.take().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![fast, slow]);
    assert!(q.is_empty());
  }
}
