use interp_js::{ConsoleSink, Globals, IllegalCompletion, RunError, Runtime, RuntimeOptions, Value};
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
fn while_with_break_and_continue() {
  let value = eval_json(
    r#"
      var out = [];
      var i = 0;
      while (true) {
        i++;
        if (i % 2) continue;
        if (i > 6) break;
        out.push(i);
      }
      out
    "#,
  );
  assert_eq!(value, json!([2, 4, 6]));
}

#[test]
fn do_while_runs_at_least_once() {
  assert_eq!(eval("var n = 0; do { n++; } while (false); n"), Value::Number(1.0));
}

#[test]
fn labeled_continue_targets_outer_loop() {
  let value = eval_json(
    r#"
      var out = [];
      outer: for (var i = 0; i < 3; i++) {
        for (var j = 0; j < 3; j++) {
          if (j == 1) continue outer;
          out.push(i + ":" + j);
        }
      }
      out
    "#,
  );
  assert_eq!(value, json!(["0:0", "1:0", "2:0"]));
}

#[test]
fn labeled_break_leaves_nested_loops() {
  let value = eval_json(
    r#"
      var out = [];
      outer: while (true) {
        for (var j = 0; ; j++) {
          if (j == 2) break outer;
          out.push(j);
        }
      }
      out
    "#,
  );
  assert_eq!(value, json!([0, 1]));
}

#[test]
fn labeled_block_break() {
  let value = eval(
    r#"
      var r = "start";
      blk: { r = "in"; break blk; r = "after"; }
      r
    "#,
  );
  assert_eq!(value, Value::from("in"));
}

#[test]
fn switch_falls_through_and_uses_default() {
  let value = eval_json(
    r#"
      function f(x) {
        var out = [];
        switch (x) {
          case 1: out.push("one");
          case 2: out.push("two"); break;
          default: out.push("default");
          case 3: out.push("three");
        }
        return out.join(",");
      }
      [f(1), f(2), f(3), f(9)]
    "#,
  );
  assert_eq!(value, json!(["one,two", "two", "three", "default,three"]));
}

#[test]
fn switch_matches_strictly() {
  let value = eval(
    r#"
      var r;
      switch ("1") { case 1: r = "number"; break; case "1": r = "string"; break; }
      r
    "#,
  );
  assert_eq!(value, Value::from("string"));
}

#[test]
fn finally_runs_after_return() {
  let value = eval_json(
    r#"
      var log = [];
      function f() {
        try { log.push("try"); return "from try"; }
        finally { log.push("finally"); }
      }
      log.push(f());
      log
    "#,
  );
  assert_eq!(value, json!(["try", "finally", "from try"]));
}

#[test]
fn abrupt_finally_overrides() {
  assert_eq!(
    eval("function g() { try { return 1; } finally { return 2; } } g()"),
    Value::Number(2.0)
  );
  assert_eq!(
    eval("function h() { try { throw 1; } finally { return 'swallowed'; } } h()"),
    Value::from("swallowed")
  );
}

#[test]
fn throw_passes_through_finally() {
  let value = eval_json(
    r#"
      var log = [];
      try {
        try { throw new Error("boom"); }
        finally { log.push("cleanup"); }
      } catch (e) {
        log.push(e.message);
      }
      log
    "#,
  );
  assert_eq!(value, json!(["cleanup", "boom"]));
}

#[test]
fn thrown_values_cross_function_boundaries() {
  let value = eval_json(
    r#"
      function inner() { throw { code: 7 }; }
      function outer() { inner(); return "unreachable"; }
      var r;
      try { outer(); } catch (e) { r = e.code; }
      r
    "#,
  );
  assert_eq!(value, json!(7));
}

#[test]
fn for_in_orders_integer_keys_first() {
  let value = eval_json(
    r#"
      var o = { b: 1, a: 2, 2: "x", 1: "y" };
      var keys = [];
      for (var k in o) keys.push(k);
      keys
    "#,
  );
  assert_eq!(value, json!(["1", "2", "b", "a"]));
}

#[test]
fn for_in_sees_inherited_keys_and_skips_deleted() {
  let value = eval_json(
    r#"
      var proto = { inherited: 1 };
      var o = Object.create(proto);
      o.own = 1;
      o.gone = 1;
      var keys = [];
      for (var k in o) { delete o.gone; keys.push(k); }
      keys
    "#,
  );
  assert_eq!(value, json!(["own", "inherited"]));
}

#[test]
fn for_in_over_nullish_does_nothing() {
  assert_eq!(
    eval("var n = 0; for (var k in null) n++; for (var k in undefined) n++; n"),
    Value::Number(0.0)
  );
}

#[test]
fn for_in_let_binds_per_iteration() {
  let value = eval_json(
    r#"
      var fs = [];
      for (let k in { a: 1, b: 1 }) fs.push(function () { return k; });
      fs.map(function (f) { return f(); })
    "#,
  );
  assert_eq!(value, json!(["a", "b"]));
}

#[test]
fn for_in_assigns_to_member_targets() {
  let value = eval_json("var o = {}; for (o.last in { x: 1, y: 2 }); o.last");
  assert_eq!(value, json!("y"));
}

#[test]
fn completion_values() {
  assert_eq!(eval("1; 2; if (true) { 3 }"), Value::Number(3.0));
  assert_eq!(eval("var x = 1;"), Value::Undefined);
  assert_eq!(eval("for (var i = 0; i < 3; i++) i * 2"), Value::Number(4.0));
  assert_eq!(eval("5; if (false) 6;"), Value::Undefined);
}

#[test]
fn signals_escaping_the_program() {
  let err = new_runtime().run("return 1;", Globals::new()).unwrap_err();
  assert!(matches!(err, RunError::IllegalCompletion(IllegalCompletion::Return)));
  let err = new_runtime().run("break;", Globals::new()).unwrap_err();
  assert!(matches!(err, RunError::IllegalCompletion(IllegalCompletion::Break)));
}

#[test]
fn break_escaping_a_function_is_a_syntax_error() {
  let value = eval("var r; try { (function () { break; })(); } catch (e) { r = e.name; } r");
  assert_eq!(value, Value::from("SyntaxError"));
}
