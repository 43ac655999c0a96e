use interp_js::{ConsoleSink, Globals, Runtime, RuntimeOptions, Value};
use serde_json::json;

fn eval(source: &str) -> Value {
  Runtime::new(RuntimeOptions::default().with_console(ConsoleSink::Silent))
    .eval(source, Globals::new())
    .unwrap()
}

fn eval_json(source: &str) -> serde_json::Value {
  eval(source).to_json()
}

#[test]
fn arithmetic_and_string_concatenation() {
  let value = eval_json(r#"[1 + 2, "1" + 2, 1 + "2", 5 - "2", "6" * "7", 7 % 3, -7 % 3, 2 ** 10, 1 / 4]"#);
  assert_eq!(value, json!([3, "12", "12", 3, 42, 1, -1, 1024, 0.25]));
}

#[test]
fn addition_uses_to_primitive() {
  let value = eval_json(
    r#"
      var o = { valueOf: function () { return 10; } };
      var s = { toString: function () { return "str"; } };
      [o + 1, s + "!", [1, 2] + "", {} + "", null + 1, undefined + 1, true + 1]
    "#,
  );
  assert_eq!(value, json!([11, "str!", "1,2", "[object Object]", 1, null, 2]));
}

#[test]
fn non_finite_arithmetic() {
  let value = eval_json("[typeof (0 / 0), 1 / 0 === Infinity, -1 / 0 === -Infinity, isNaN(0 / 0)]");
  assert_eq!(value, json!(["number", true, true, true]));
}

#[test]
fn bitwise_operators() {
  let value = eval_json("[5 & 3, 5 | 3, 5 ^ 3, ~5, 1 << 31, -16 >> 2, -16 >>> 28, 1 << 33]");
  assert_eq!(value, json!([1, 7, 6, -6, -2147483648, -4, 15, 2]));
}

#[test]
fn equality() {
  let value = eval_json(
    r#"
      var o = {};
      [1 == "1", 1 === "1", null == undefined, null === undefined, 0 == false, "" == 0,
       NaN == NaN, o == o, o === {}, "a" != "b", null == 0]
    "#,
  );
  assert_eq!(
    value,
    json!([true, false, true, false, true, true, false, true, false, true, false])
  );
}

#[test]
fn relational_comparison() {
  let value = eval_json(r#"["a" < "b", "10" < "9", 10 < 9, "10" < 9, 1 <= 1, NaN < 1, NaN >= 1, null >= 0]"#);
  assert_eq!(value, json!([true, true, false, false, true, false, false, true]));
}

#[test]
fn logical_operators_short_circuit() {
  let value = eval_json(
    r#"
      var calls = 0;
      function touch() { calls++; return "touched"; }
      var a = 0 && touch();
      var b = 1 || touch();
      var c = null || touch();
      var d = "x" && touch();
      [a, b, c, d, calls, !"", !!"0"]
    "#,
  );
  assert_eq!(value, json!([0, 1, "touched", "touched", 2, true, true]));
}

#[test]
fn update_and_compound_assignment() {
  let value = eval_json(
    r#"
      var i = 5;
      var a = i++;
      var b = ++i;
      var c = i--;
      var o = { n: 1 };
      o.n += 4;
      o["n"] *= 2;
      var s = "a";
      s += "b";
      var k = 3;
      k <<= 2;
      [a, b, c, i, o.n, s, k]
    "#,
  );
  assert_eq!(value, json!([5, 7, 7, 6, 10, "ab", 12]));
}

#[test]
fn typeof_values() {
  let value = eval_json(
    r#"[typeof 1, typeof "s", typeof true, typeof undefined, typeof null, typeof {},
        typeof [], typeof function () {}, typeof notDeclaredAnywhere, typeof Math.max]"#,
  );
  assert_eq!(
    value,
    json!(["number", "string", "boolean", "undefined", "object", "object", "object", "function", "undefined", "function"])
  );
}

#[test]
fn delete_operator() {
  let value = eval_json(
    r#"
      var o = { a: 1, b: 2 };
      var x = 1;
      var r1 = delete o.a;
      var r2 = delete o["missing"];
      var r3 = delete x;
      [r1, r2, r3, "a" in o, "b" in o, x]
    "#,
  );
  assert_eq!(value, json!([true, true, false, false, true, 1]));
}

#[test]
fn in_and_instanceof() {
  let value = eval_json(
    r#"
      function F() {}
      var f = new F();
      var arr = [1];
      ["toString" in {}, 0 in arr, 1 in arr, f instanceof F, f instanceof Object,
       arr instanceof Array, {} instanceof F, 1 instanceof F]
    "#,
  );
  assert_eq!(value, json!([true, true, false, true, true, true, false, false]));
}

#[test]
fn in_on_a_primitive_throws() {
  let value = eval(r#"var r; try { "a" in "abc"; } catch (e) { r = e.name; } r"#);
  assert_eq!(value, Value::from("TypeError"));
}

#[test]
fn void_comma_and_conditional() {
  let value = eval_json("[void 0 === undefined, (1, 2, 3), true ? 'yes' : 'no', 0 ? 'yes' : 'no']");
  assert_eq!(value, json!([true, 3, "yes", "no"]));
}

#[test]
fn string_primitives_have_length_and_indices() {
  let value = eval_json(r#"var s = "héllo"; [s.length, s[1], s.charAt(4), "x".y, s[10] === undefined]"#);
  assert_eq!(value, json!([5, "é", "o", null, true]));
}

#[test]
fn property_access_on_undefined_throws() {
  let value = eval(
    r#"
      var r;
      try { var u; u.field; } catch (e) { r = e.name + ": " + e.message; }
      r
    "#,
  );
  assert_eq!(
    value,
    Value::from("TypeError: Cannot read properties of undefined (reading 'field')")
  );
}

#[test]
fn array_length_writes() {
  let value = eval_json(
    r#"
      var a = [1, 2, 3, 4];
      a.length = 2;
      var b = [];
      b[4] = "x";
      var r;
      try { a.length = -1; } catch (e) { r = e.name; }
      [a, b.length, r, [1, , 3].length]
    "#,
  );
  assert_eq!(value, json!([[1, 2], 5, "RangeError", 3]));
}
