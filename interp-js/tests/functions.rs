use interp_js::{ConsoleSink, Globals, RunError, Runtime, RuntimeOptions, TerminationReason, Value};
use serde_json::json;

fn new_runtime() -> Runtime {
  Runtime::new(RuntimeOptions::default().with_console(ConsoleSink::Silent))
}

fn eval(source: &str) -> Value {
  new_runtime().eval(source, Globals::new()).unwrap()
}

fn eval_json(source: &str) -> serde_json::Value {
  eval(source).to_json()
}

#[test]
fn missing_arguments_are_undefined_and_extras_ignored() {
  let value = eval_json(
    r#"
      function f(a, b) { return [typeof a, typeof b, arguments.length]; }
      [f(1), f(1, 2, 3)]
    "#,
  );
  assert_eq!(value, json!([["number", "undefined", 1], ["number", "number", 3]]));
}

#[test]
fn arguments_object_holds_every_argument() {
  let value = eval_json(
    r#"
      function sum() {
        var total = 0;
        for (var i = 0; i < arguments.length; i++) total += arguments[i];
        return total;
      }
      sum(1, 2, 3, 4)
    "#,
  );
  assert_eq!(value, json!(10));
}

#[test]
fn method_calls_bind_this() {
  let value = eval_json(
    r#"
      var o = { x: 1, get: function () { return this.x; } };
      var detached = o.get;
      [o.get(), o["get"](), typeof (function () { return this; })()]
    "#,
  );
  assert_eq!(value, json!([1, 1, "undefined"]));
}

#[test]
fn constructors_and_prototypes() {
  let value = eval_json(
    r#"
      function Point(x, y) { this.x = x; this.y = y; }
      Point.prototype.sum = function () { return this.x + this.y; };
      var p = new Point(1, 2);
      [p.sum(), p instanceof Point, p.constructor === Point, Object.getPrototypeOf(p) === Point.prototype]
    "#,
  );
  assert_eq!(value, json!([3, true, true, true]));
}

#[test]
fn constructor_returning_an_object_wins() {
  let value = eval_json(
    r#"
      function A() { this.a = 1; return { b: 2 }; }
      function B() { this.a = 1; return 5; }
      [new A().b, new A().a === undefined, new B().a]
    "#,
  );
  assert_eq!(value, json!([2, true, 1]));
}

#[test]
fn new_without_arguments() {
  assert_eq!(eval("function C() { this.ok = true; } new C().ok"), Value::Bool(true));
}

#[test]
fn calling_a_non_function_is_a_type_error() {
  let value = eval_json(
    r#"
      var r = [];
      var o = {};
      try { o.missing(); } catch (e) { r.push(e.name + ": " + e.message); }
      try { var n = 1; n(); } catch (e) { r.push(e.message); }
      try { new o(); } catch (e) { r.push(e.message); }
      r
    "#,
  );
  assert_eq!(
    value,
    json!([
      "TypeError: o.missing is not a function",
      "n is not a function",
      "o is not a constructor"
    ])
  );
}

#[test]
fn call_apply_and_bind() {
  let value = eval_json(
    r#"
      function show(a, b) { return this.name + a + b; }
      var o = { name: "o" };
      var bound = show.bind(o, "x");
      [show.call(o, 1, 2), show.apply(o, [3, 4]), bound("y"), bound.name, bound.length]
    "#,
  );
  assert_eq!(value, json!(["o12", "o34", "oxy", "bound show", 1]));
}

#[test]
fn bound_constructors_and_instanceof() {
  let value = eval_json(
    r#"
      function P(x) { this.x = x; }
      var BP = P.bind(null, 9);
      var p = new BP();
      [p.x, p instanceof P, p instanceof BP]
    "#,
  );
  assert_eq!(value, json!([9, true, true]));
}

#[test]
fn function_properties() {
  let value = eval_json(
    r#"
      function named(a, b, c) {}
      var anon = function () {};
      var obj = { m: function () {} };
      [named.name, named.length, anon.name, obj.m.name, typeof named.prototype]
    "#,
  );
  assert_eq!(value, json!(["named", 3, "anon", "m", "object"]));
}

#[test]
fn recursion() {
  let value = eval("function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15)");
  assert_eq!(value, Value::Number(610.0));
}

#[test]
fn runaway_recursion_terminates_the_run() {
  let mut rt = Runtime::new(
    RuntimeOptions::default()
      .with_console(ConsoleSink::Silent)
      .with_max_call_depth(100),
  );
  let err = rt
    .run("function down(n) { return down(n + 1); } down(0);", Globals::new())
    .unwrap_err();
  let RunError::Termination(termination) = err else {
    panic!("expected termination, got {err:?}");
  };
  assert_eq!(termination.reason, TerminationReason::StackOverflow);
  assert_eq!(termination.stack.len(), 100);
  assert!(termination.stack.iter().all(|name| name == "down"));
}

#[test]
fn termination_is_not_catchable() {
  let mut rt = Runtime::new(
    RuntimeOptions::default()
      .with_console(ConsoleSink::Silent)
      .with_max_call_depth(50),
  );
  let err = rt
    .run(
      "var caught = false; function f() { f(); } try { f(); } catch (e) { caught = true; }",
      Globals::new(),
    )
    .unwrap_err();
  assert!(matches!(err, RunError::Termination(_)));
  assert_eq!(err.to_string(), "execution terminated: stack overflow");
}

#[test]
fn deep_recursion_within_the_default_limit() {
  let value = eval("function depth(n) { return n == 0 ? 0 : 1 + depth(n - 1); } depth(1500)");
  assert_eq!(value, Value::Number(1500.0));
}
