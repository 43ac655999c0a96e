use interp_js::ConsoleSink;
use interp_js::Globals;
use interp_js::Runtime;
use interp_js::RuntimeOptions;
use interp_js::Value;
use serde_json::json;

fn eval(source: &str) -> Value {
  Runtime::new(RuntimeOptions::default().with_console(ConsoleSink::Silent))
    .eval(source, Globals::new())
    .unwrap()
}

fn eval_str(source: &str) -> String {
  eval(source).as_str().map(str::to_string).unwrap()
}

#[test]
fn stringify_compact() {
  let out = eval_str(
    r#"JSON.stringify({ a: 1, b: "two", c: [true, null, 1.5], d: { e: -3 }, "q\"k": "\n" })"#,
  );
  assert_eq!(out, r#"{"a":1,"b":"two","c":[true,null,1.5],"d":{"e":-3},"q\"k":"\n"}"#);
}

#[test]
fn stringify_skips_undefined_and_functions() {
  let out = eval_str(
    r#"JSON.stringify({ a: undefined, f: function () {}, n: NaN, i: -Infinity, list: [undefined, function () {}], ok: 1 })"#,
  );
  assert_eq!(out, r#"{"n":null,"i":null,"list":[null,null],"ok":1}"#);
  let value = eval("[JSON.stringify(undefined), JSON.stringify(function () {})]");
  assert_eq!(value.to_json(), json!([null, null]));
}

#[test]
fn stringify_with_indent() {
  let out = eval_str(r#"JSON.stringify({ a: 1, b: [1, 2], c: {}, d: [] }, null, 2)"#);
  assert_eq!(
    out,
    "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ],\n  \"c\": {},\n  \"d\": []\n}"
  );
  let out = eval_str(r#"JSON.stringify([1], null, "--")"#);
  assert_eq!(out, "[\n--1\n]");
  let out = eval_str(r#"JSON.stringify({ a: 1 }, null, 20)"#);
  assert_eq!(out, "{\n          \"a\": 1\n}");
}

#[test]
fn stringify_to_json_and_boxed_primitives() {
  let out = eval_str(
    r#"
      var when = { toJSON: function (key) { return "at:" + key; } };
      JSON.stringify({ when: when, n: new Number(3), s: new String("x"), b: new Boolean(false) })
    "#,
  );
  assert_eq!(out, r#"{"when":"at:when","n":3,"s":"x","b":false}"#);
}

#[test]
fn stringify_replacers() {
  let out = eval_str(
    r#"
      JSON.stringify({ a: 1, b: 2, c: { a: 3, z: 4 } }, function (key, value) {
        return typeof value === "number" ? value * 10 : value;
      })
    "#,
  );
  assert_eq!(out, r#"{"a":10,"b":20,"c":{"a":30,"z":40}}"#);
  let out = eval_str(r#"JSON.stringify({ a: 1, b: 2, c: { a: 3, z: 4 } }, ["c", "a"])"#);
  assert_eq!(out, r#"{"c":{"a":3},"a":1}"#);
}

#[test]
fn stringify_rejects_cycles() {
  let value = eval(
    r#"
      var o = { name: "loop" };
      o.self = o;
      var r;
      try { JSON.stringify(o); } catch (e) { r = e.name + ": " + e.message; }
      var shared = { x: 1 };
      [r, JSON.stringify([shared, shared])]
    "#,
  );
  assert_eq!(
    value.to_json(),
    json!(["TypeError: Converting circular structure to JSON", r#"[{"x":1},{"x":1}]"#])
  );
}

#[test]
fn parse_builds_values() {
  let value = eval(
    r#"
      var v = JSON.parse('{"a": [1, 2.5, "x"], "b": {"c": null}, "d": true}');
      [v.a.length, v.a[1], v.b.c, v.d, Array.isArray(v.a), v.a.map(function (x) { return typeof x; })]
    "#,
  );
  assert_eq!(
    value.to_json(),
    json!([3, 2.5, null, true, true, ["number", "number", "string"]])
  );
}

#[test]
fn parse_errors_are_syntax_errors() {
  let value = eval(r#"var r; try { JSON.parse("{bad"); } catch (e) { r = e instanceof SyntaxError; } r"#);
  assert_eq!(value, Value::Bool(true));
}

#[test]
fn parse_with_reviver() {
  let value = eval(
    r#"
      var order = [];
      var v = JSON.parse('{"a": 1, "b": {"c": 2, "drop": 3}}', function (key, value) {
        order.push(key);
        if (key === "drop") return undefined;
        return typeof value === "number" ? value + 100 : value;
      });
      [v, order]
    "#,
  );
  assert_eq!(
    value.to_json(),
    json!([{"a": 101, "b": {"c": 102}}, ["a", "c", "drop", "b", ""]])
  );
}

#[test]
fn parse_then_stringify_round_trips_text() {
  let text = r#"{"list":[1,2,{"deep":["x"]}],"flag":false,"none":null}"#;
  let value = eval(&format!("JSON.stringify(JSON.parse('{text}'))"));
  assert_eq!(value.as_str(), Some(text));
}
