use interp_js::ConsoleSink;
use interp_js::HostBindings;
use interp_js::JsObject;
use interp_js::RunError;
use interp_js::Runtime;
use interp_js::RuntimeOptions;
use interp_js::Value;
use serde_json::json;

fn capturing_runtime() -> (Runtime, std::rc::Rc<std::cell::RefCell<Vec<String>>>) {
  let (sink, lines) = ConsoleSink::capture();
  (Runtime::new(RuntimeOptions::default().with_console(sink)), lines)
}

fn globals(entries: Vec<(&str, Value)>) -> interp_js::Globals {
  entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn run_returns_module_exports() {
  let value = interp_js::run("module.exports = { sum: 1 + 2, list: [1, 'a'] };").unwrap();
  assert_eq!(value.to_json(), json!({"sum": 3, "list": [1, "a"]}));
}

#[test]
fn exports_alias_is_the_initial_exports_object() {
  let value = interp_js::run("exports.a = 1; exports.b = exports === module.exports;").unwrap();
  assert_eq!(value.to_json(), json!({"a": 1, "b": true}));
  let value = interp_js::run("exports.ignored = 1; module.exports = 'replaced';").unwrap();
  assert_eq!(value, Value::from("replaced"));
}

#[test]
fn program_without_exports_returns_empty_object() {
  let value = interp_js::run("var x = 1;").unwrap();
  assert_eq!(value.to_json(), json!({}));
}

#[test]
fn console_sees_hoisted_globals() {
  let (mut runtime, lines) = capturing_runtime();
  runtime
    .run("function f6(){ console.log(f.c) }; var f = { c: 1 }; f6();", Vec::new())
    .unwrap();
  assert_eq!(*lines.borrow(), vec!["1".to_string()]);
}

#[test]
fn this_is_undefined_at_the_root() {
  let value = interp_js::run("module.exports = [typeof this, (function () { return this; })() === undefined];");
  assert_eq!(value.unwrap().to_json(), json!(["undefined", true]));
}

#[test]
fn extra_globals_are_visible_and_constant() {
  let config = Value::from_json(&json!({"name": "svc", "ports": [80, 443]}));
  let value = interp_js::run_with_globals(
    r#"
      var r;
      try { config = 1; } catch (e) { r = e.name; }
      module.exports = {
        name: config.name.toUpperCase(),
        ports: config.ports.map(function (p) { return p + 1; }),
        isArray: Array.isArray(config.ports),
        r: r
      };
    "#,
    globals(vec![("config", config)]),
  )
  .unwrap();
  assert_eq!(
    value.to_json(),
    json!({"name": "SVC", "ports": [81, 444], "isArray": true, "r": "TypeError"})
  );
}

#[test]
fn first_registration_wins() {
  let (mut runtime, lines) = capturing_runtime();
  let value = runtime
    .run(
      "console.log(typeof console.log); module.exports = [twice, typeof this];",
      globals(vec![
        ("console", Value::from("shadowed")),
        ("twice", Value::from(1)),
        ("twice", Value::from(2)),
        ("this", Value::from("not this")),
      ]),
    )
    .unwrap();
  assert_eq!(*lines.borrow(), vec!["function".to_string()]);
  assert_eq!(value.to_json(), json!([1, "undefined"]));
}

#[test]
fn native_function_extras() {
  let double = JsObject::native_function("double", 1, |ev, _, args| {
    let n = ev.to_number(args.first().unwrap_or(&Value::Undefined))?;
    Ok(Value::Number(n * 2.0))
  });
  let value = interp_js::run_with_globals(
    "module.exports = [double(21), double('4'), double.name, typeof double.call, [1, 2].map(double)];",
    globals(vec![("double", Value::Object(double))]),
  )
  .unwrap();
  assert_eq!(value.to_json(), json!([42, 8, "double", "function", [2, 4]]));
}

#[test]
fn native_functions_can_throw_script_errors() {
  let strict = JsObject::native_function("strict", 0, |ev, _, _| Err(ev.range_error("nope")));
  let value = interp_js::run_with_globals(
    "var r; try { strict(); } catch (e) { r = [e instanceof RangeError, e.message]; } module.exports = r;",
    globals(vec![("strict", Value::Object(strict))]),
  )
  .unwrap();
  assert_eq!(value.to_json(), json!([true, "nope"]));
}

#[test]
fn custom_host_bindings_replace_the_standard_table() {
  let bindings = HostBindings::builder()
    .bind("answer", |_| Value::Number(42.0))
    .bind("answer", |_| Value::Number(0.0))
    .build();
  assert_eq!(bindings.names().collect::<Vec<_>>(), vec!["answer", "answer"]);
  let mut runtime = Runtime::new(RuntimeOptions::default().with_host_bindings(bindings));
  let value = runtime
    .run("module.exports = [answer, typeof console, typeof JSON];", Vec::new())
    .unwrap();
  assert_eq!(value.to_json(), json!([42, "undefined", "undefined"]));
}

#[test]
fn options_fall_back_to_the_standard_table() {
  let options = RuntimeOptions::default();
  assert!(std::ptr::eq(options.host_bindings(), HostBindings::standard()));
  let custom = HostBindings::builder().bind("only", |_| Value::Null).build();
  let options = options.with_host_bindings(custom);
  assert_eq!(options.host_bindings().names().collect::<Vec<_>>(), vec!["only"]);
}

#[test]
fn standard_table_lists_the_builtins() {
  let names: Vec<&str> = HostBindings::standard().names().collect();
  for name in ["console", "setTimeout", "parseInt", "Object", "Array", "Math", "JSON", "undefined"] {
    assert!(names.contains(&name), "missing {name}");
  }
}

#[test]
fn each_run_gets_a_fresh_realm() {
  let mut runtime = Runtime::default();
  runtime
    .run("var leaked = 1; Array.prototype.extra = 'x';", Vec::new())
    .unwrap();
  let value = runtime
    .run("module.exports = [typeof leaked, [].extra];", Vec::new())
    .unwrap();
  assert_eq!(value.to_json(), json!(["undefined", null]));
}

#[test]
fn timers_are_queued_for_the_host() {
  let (mut runtime, lines) = capturing_runtime();
  let exports = runtime
    .run(
      r#"
        var log = [];
        setTimeout(function (a, b) { log.push("late " + a + b); console.log("fired"); }, 50, "x", "y");
        setTimeout(function () { log.push("early"); }, 10);
        var cancelled = setTimeout(function () { log.push("never"); }, 0);
        clearTimeout(cancelled);
        log.push("sync");
        module.exports = log;
      "#,
      Vec::new(),
    )
    .unwrap();
  assert_eq!(exports.to_json(), json!(["sync"]));
  let timers = runtime.take_timers();
  assert_eq!(timers.iter().map(|t| t.delay).collect::<Vec<_>>(), vec![10.0, 50.0]);
  for timer in &timers {
    runtime.call(&timer.callback, Value::Undefined, &timer.args).unwrap();
  }
  assert_eq!(exports.to_json(), json!(["sync", "early", "late xy"]));
  assert_eq!(*lines.borrow(), vec!["fired".to_string()]);
  assert!(runtime.take_timers().is_empty());
}

#[test]
fn host_can_call_exported_functions() {
  let mut runtime = Runtime::default();
  let exports = runtime
    .run(
      "var count = 0; module.exports = { bump: function (by) { count += by; return count; } };",
      Vec::new(),
    )
    .unwrap();
  let bump = exports.get("bump");
  assert_eq!(runtime.call(&bump, exports.clone(), &[Value::from(2)]).unwrap(), Value::Number(2.0));
  assert_eq!(runtime.call(&bump, exports.clone(), &[Value::from(3)]).unwrap(), Value::Number(5.0));
  let err = runtime.call(&Value::from(1), Value::Undefined, &[]).unwrap_err();
  assert!(matches!(err, RunError::Uncaught(_)));
}

#[test]
fn syntax_errors_are_reported_before_running() {
  let (mut runtime, lines) = capturing_runtime();
  let err = runtime.run("console.log('ran'); var = ;", Vec::new()).unwrap_err();
  assert!(matches!(err, RunError::Syntax(_)), "{err}");
  assert!(lines.borrow().is_empty());
  let err = interp_js::run("class A {}").unwrap_err();
  assert!(matches!(err, RunError::Syntax(_)));
}

#[test]
fn uncaught_throws_surface_as_errors() {
  let err = interp_js::run("throw new Error('nope');").unwrap_err();
  assert_eq!(err.to_string(), "uncaught Error: nope");
  let err = interp_js::run("throw 42;").unwrap_err();
  let RunError::Uncaught(value) = err else {
    panic!("expected an uncaught value");
  };
  assert_eq!(value, Value::Number(42.0));
}

#[test]
fn value_conversions_for_hosts() {
  let value = interp_js::run(
    "var o = { f: function () {}, u: undefined, n: null, nested: { list: [1, undefined] } }; o.self = o; module.exports = o;",
  )
  .unwrap();
  assert_eq!(
    value.to_json(),
    json!({"n": null, "nested": {"list": [1, null]}, "self": null})
  );
  assert_eq!(value.get("nested").get("list").get("length"), Value::from(2));
  assert!(value.set("added", Value::from(true)));
  assert_eq!(value.get("added"), Value::Bool(true));
  assert_eq!(Value::from("abc").get("length"), Value::from(3));
  assert!(!Value::from(1).set("x", Value::Null));
}
