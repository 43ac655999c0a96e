use interp_js::ConsoleSink;
use interp_js::Globals;
use interp_js::Runtime;
use interp_js::RuntimeOptions;
use serde_json::json;

fn new_runtime() -> Runtime {
  Runtime::new(RuntimeOptions::default().with_console(ConsoleSink::Silent))
}

fn eval_json(source: &str) -> serde_json::Value {
  new_runtime().eval(source, Globals::new()).unwrap().to_json()
}

#[test]
fn string_methods() {
  let value = eval_json(
    r#"
      var s = "  Hello, World  ";
      var t = s.trim();
      [t, t.toUpperCase(), t.toLowerCase(), t.indexOf("o"), t.lastIndexOf("o"), t.includes("World"),
       t.startsWith("Hell"), t.endsWith("!"), t.slice(-5), t.slice(0, 5), t.substring(7, 2),
       t.substr(7, 3), t.charCodeAt(0), t.charAt(100), "ab".repeat(3), "a".concat(1, true)]
    "#,
  );
  assert_eq!(
    value,
    json!([
      "Hello, World",
      "HELLO, WORLD",
      "hello, world",
      4,
      8,
      true,
      true,
      false,
      "World",
      "Hello",
      "llo, ",
      "Wor",
      72,
      "",
      "ababab",
      "a1true"
    ])
  );
}

#[test]
fn string_split_and_replace() {
  let value = eval_json(
    r#"
      ["a,b,,c".split(","), "abc".split(""), "a b c".split(" ", 2), "abc".split(),
       "aXbXc".replace("X", "-"), "price".replace("ice", "[$&]"), "abc".replace("b", "$`$'"),
       "abc".replace("b", function (m, i, s) { return m.toUpperCase() + i + s.length; })]
    "#,
  );
  assert_eq!(
    value,
    json!([
      ["a", "b", "", "c"],
      ["a", "b", "c"],
      ["a", "b"],
      ["abc"],
      "a-bXc",
      "pr[ice]",
      "aacc",
      "aB13c"
    ])
  );
}

#[test]
fn string_positions_inside_surrogate_pairs() {
  let value = eval_json(
    r#"
      var s = "😀x";
      [s.startsWith("x", 1), s.startsWith("x", 2), s.endsWith("😀", 1), s.endsWith("😀", 2), s.length]
    "#,
  );
  assert_eq!(value, json!([false, true, false, true, 3]));
}

#[test]
fn string_from_char_code_and_constructor() {
  let value = eval_json(
    r#"
      var boxed = new String("xy");
      [String.fromCharCode(72, 105), String(12), String(null), typeof boxed, boxed.length, boxed + "!"]
    "#,
  );
  assert_eq!(value, json!(["Hi", "12", "null", "object", 2, "xy!"]));
}

#[test]
fn array_mutators() {
  let value = eval_json(
    r#"
      var a = [1, 2, 3];
      var pushed = a.push(4, 5);
      var popped = a.pop();
      var shifted = a.shift();
      var unshifted = a.unshift(0);
      var removed = a.splice(1, 2, "x", "y", "z");
      [a, pushed, popped, shifted, unshifted, removed, a.reverse()]
    "#,
  );
  assert_eq!(
    value,
    json!([
      [4, "z", "y", "x", 0],
      5,
      5,
      1,
      4,
      [2, 3],
      [4, "z", "y", "x", 0]
    ])
  );
}

#[test]
fn array_accessors() {
  let value = eval_json(
    r#"
      var a = [1, 2, 3, 2, NaN];
      [a.slice(1, -1), a.concat([6, [7]], 8), a.join("-"), [null, undefined, 1].join(),
       a.indexOf(2), a.lastIndexOf(2), a.indexOf(NaN), a.includes(NaN), a.indexOf(9),
       String([1, [2, 3]]), Array.isArray(a), Array.isArray("a")]
    "#,
  );
  assert_eq!(
    value,
    json!([
      [2, 3, 2],
      [1, 2, 3, 2, null, 6, [7], 8],
      "1-2-3-2-NaN",
      ",,1",
      1,
      3,
      -1,
      true,
      -1,
      "1,2,3",
      true,
      false
    ])
  );
}

#[test]
fn array_iteration_methods() {
  let value = eval_json(
    r#"
      var a = [1, 2, 3, 4];
      var seen = [];
      a.forEach(function (x, i) { seen.push(x * i); });
      [seen, a.map(function (x) { return x * x; }), a.filter(function (x) { return x % 2; }),
       a.some(function (x) { return x > 3; }), a.every(function (x) { return x > 3; }),
       a.reduce(function (acc, x) { return acc + x; }),
       a.reduce(function (acc, x) { return acc + x; }, "")]
    "#,
  );
  assert_eq!(
    value,
    json!([[0, 2, 6, 12], [1, 4, 9, 16], [1, 3], true, false, 10, "1234"])
  );
}

#[test]
fn reduce_of_empty_array_throws() {
  let value = eval_json(
    r#"
      var r;
      try { [].reduce(function (a, b) { return a + b; }); } catch (e) { r = e.name + ": " + e.message; }
      r
    "#,
  );
  assert_eq!(value, json!("TypeError: Reduce of empty array with no initial value"));
}

#[test]
fn array_sort() {
  let value = eval_json(
    r#"
      var people = [
        { name: "c", age: 30 }, { name: "a", age: 25 }, { name: "b", age: 30 }, { name: "d", age: 25 }
      ];
      people.sort(function (x, y) { return x.age - y.age; });
      [[10, 9, 1, 100].sort(), [3, undefined, 1, 2].sort(),
       [10, 9, 1, 100].sort(function (a, b) { return a - b; }),
       people.map(function (p) { return p.name; })]
    "#,
  );
  assert_eq!(
    value,
    json!([[1, 10, 100, 9], [1, 2, 3, null], [1, 9, 10, 100], ["a", "d", "c", "b"]])
  );
}

#[test]
fn array_constructor() {
  let value = eval_json(
    r#"
      var r;
      try { new Array(-1); } catch (e) { r = e.name; }
      [new Array(3).length, Array(1, 2), new Array("3"), r]
    "#,
  );
  assert_eq!(value, json!([3, [1, 2], ["3"], "RangeError"]));
}

#[test]
fn number_methods() {
  let value = eval_json(
    r#"
      [(1.005).toFixed(2), (2.5).toFixed(0), (1234.5678).toFixed(1), (255).toString(16),
       (255).toString(2), (-7.5).toString(), Number("  42 "), Number(""), Number("0x10"),
       Number(true), Number(null), Number.isInteger(5), Number.isInteger(5.5),
       Number.isSafeInteger(Math.pow(2, 53)), Number.MAX_SAFE_INTEGER, Number.isNaN("x"), isNaN("x")]
    "#,
  );
  assert_eq!(
    value,
    json!([
      "1.00",
      "3",
      "1234.6",
      "ff",
      "11111111",
      "-7.5",
      42,
      0,
      16,
      1,
      0,
      true,
      false,
      false,
      9007199254740991u64,
      false,
      true
    ])
  );
}

#[test]
fn number_method_range_errors() {
  let value = eval_json(
    r#"
      var errors = [];
      try { (1).toFixed(101); } catch (e) { errors.push(e.message); }
      try { (1).toString(1); } catch (e) { errors.push(e.message); }
      errors
    "#,
  );
  assert_eq!(
    value,
    json!([
      "toFixed() digits argument must be between 0 and 100",
      "toString() radix must be between 2 and 36"
    ])
  );
}

#[test]
fn global_number_parsing() {
  let value = eval_json(
    r#"
      [parseInt("42px"), parseInt("  -0x1F"), parseInt("101", 2), parseInt("z", 36), parseFloat("3.14abc"),
       parseFloat(".5"), isNaN(parseInt("abc")), isFinite("12"), isFinite(1 / 0)]
    "#,
  );
  assert_eq!(value, json!([42, -31, 5, 35, 3.14, 0.5, true, true, false]));
}

#[test]
fn uri_and_escape_functions() {
  let value = eval_json(
    r#"
      var r;
      try { decodeURIComponent("%"); } catch (e) { r = e.name; }
      [encodeURIComponent("a b&c/é"), encodeURI("http://x.y/a b?q=1&r=é"), decodeURIComponent("a%20b%26"),
       decodeURI("%41%2F"), escape("a b+é"), unescape("%u0107%20x"), r]
    "#,
  );
  assert_eq!(
    value,
    json!([
      "a%20b%26c%2F%C3%A9",
      "http://x.y/a%20b?q=1&r=%C3%A9",
      "a b&",
      "A%2F",
      "a%20b+%E9",
      "ć x",
      "URIError"
    ])
  );
}

#[test]
fn math_functions() {
  let value = eval_json(
    r#"
      [Math.abs(-3), Math.floor(-1.5), Math.ceil(1.2), Math.round(2.5), Math.round(-2.5), Math.trunc(-4.7),
       Math.sign(-3), Math.max(1, 5, 3), Math.min(), Math.max(1, NaN), Math.pow(2, 8), Math.sqrt(16),
       Math.hypot(3, 4), Math.PI > 3.14 && Math.PI < 3.15]
    "#,
  );
  assert_eq!(
    value,
    json!([3, -2, 2, 3, -2, -4, -1, 5, null, null, 256, 4, 5, true])
  );
}

#[test]
fn seeded_random_is_reproducible() {
  let source = "var xs = []; for (var i = 0; i < 5; i++) xs.push(Math.random()); xs";
  let options = || RuntimeOptions::default().with_random_seed(42);
  let a = Runtime::new(options()).eval(source, Globals::new()).unwrap().to_json();
  let b = Runtime::new(options()).eval(source, Globals::new()).unwrap().to_json();
  assert_eq!(a, b);
  for x in a.as_array().unwrap() {
    let x = x.as_f64().unwrap();
    assert!((0.0..1.0).contains(&x));
  }
}

#[test]
fn object_statics() {
  let value = eval_json(
    r#"
      var proto = { greet: function () { return "hi " + this.name; } };
      var o = Object.create(proto, { name: { value: "o", enumerable: true }, secret: { value: 1 } });
      var merged = Object.assign({ a: 1 }, { b: 2 }, null, { a: 3 });
      [Object.keys(o), Object.getOwnPropertyNames(o), o.greet(), Object.getPrototypeOf(o) === proto,
       merged, Object.keys("ab"), proto.isPrototypeOf(o), o.hasOwnProperty("greet"),
       Object.prototype.toString.call([]), Object.prototype.toString.call(null), Object.freeze(merged) === merged]
    "#,
  );
  assert_eq!(
    value,
    json!([
      ["name"],
      ["name", "secret"],
      "hi o",
      true,
      {"a": 3, "b": 2},
      ["0", "1"],
      true,
      false,
      "[object Array]",
      "[object Null]",
      true
    ])
  );
}

#[test]
fn object_create_rejects_primitive_prototype() {
  let value = eval_json(r#"var r; try { Object.create(1); } catch (e) { r = e.name; } r"#);
  assert_eq!(value, json!("TypeError"));
}

#[test]
fn error_objects() {
  let value = eval_json(
    r#"
      var e = new TypeError("bad");
      var plain = Error("plain");
      var bare = new RangeError();
      [e instanceof TypeError, e instanceof Error, e.name, e.message, String(e), plain.message,
       String(bare), e.hasOwnProperty("message"), bare.hasOwnProperty("message"),
       Object.prototype.toString.call(e)]
    "#,
  );
  assert_eq!(
    value,
    json!([
      true,
      true,
      "TypeError",
      "bad",
      "TypeError: bad",
      "plain",
      "RangeError",
      true,
      false,
      "[object Error]"
    ])
  );
}

#[test]
fn runtime_errors_are_catchable_error_objects() {
  let value = eval_json(
    r#"
      var caught = [];
      try { undefinedThing; } catch (e) { caught.push(e instanceof ReferenceError, e.message); }
      try { null.x; } catch (e) { caught.push(e instanceof TypeError); }
      caught
    "#,
  );
  assert_eq!(value, json!([true, "undefinedThing is not defined", true]));
}

#[test]
fn boolean_wrappers() {
  let value = eval_json(
    r#"
      var b = new Boolean(false);
      [Boolean(""), Boolean("0"), typeof b, b.valueOf(), (true).toString(), !!b]
    "#,
  );
  assert_eq!(value, json!([false, true, "object", false, "true", true]));
}

#[test]
fn console_output_is_captured() {
  let (sink, lines) = ConsoleSink::capture();
  let mut runtime = Runtime::new(RuntimeOptions::default().with_console(sink));
  runtime
    .run(
      r#"
        console.log("plain", 1, true, null, undefined);
        console.warn({ a: [1, "two"], "b c": { d: {} } });
        console.error(new TypeError("boom"));
        console.info(function named() {}, [1, 2]);
      "#,
      Globals::new(),
    )
    .unwrap();
  assert_eq!(
    *lines.borrow(),
    vec![
      "plain 1 true null undefined".to_string(),
      "{ a: [ 1, 'two' ], 'b c': { d: {} } }".to_string(),
      "TypeError: boom".to_string(),
      "[Function: named] [ 1, 2 ]".to_string(),
    ]
  );
}
