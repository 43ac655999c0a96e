use super::arg;
use super::constant;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::ops;
use crate::realm::Realm;
use crate::value::Value;

/// `Math.round`: halves round towards +Infinity.
fn round(x: f64) -> f64 {
  let floor = x.floor();
  let r = if x - floor >= 0.5 { floor + 1.0 } else { floor };
  if r == 0.0 && x.is_sign_negative() {
    -0.0
  } else {
    r
  }
}

fn sign(x: f64) -> f64 {
  if x.is_nan() || x == 0.0 {
    x
  } else {
    x.signum()
  }
}

fn numbers(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Vec<f64>, VmError> {
  args.iter().map(|a| ev.to_number(a)).collect()
}

fn max(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut acc = f64::NEG_INFINITY;
  for n in numbers(ev, args)? {
    if n.is_nan() {
      return Ok(Value::Number(f64::NAN));
    };
    if n > acc || (n == 0.0 && acc == 0.0 && acc.is_sign_negative()) {
      acc = n;
    };
  }
  Ok(Value::Number(acc))
}

fn min(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut acc = f64::INFINITY;
  for n in numbers(ev, args)? {
    if n.is_nan() {
      return Ok(Value::Number(f64::NAN));
    };
    if n < acc || (n == 0.0 && acc == 0.0 && n.is_sign_negative()) {
      acc = n;
    };
  }
  Ok(Value::Number(acc))
}

fn hypot(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  let ns = numbers(ev, args)?;
  if ns.iter().any(|n| n.is_infinite()) {
    return Ok(Value::Number(f64::INFINITY));
  };
  Ok(Value::Number(ns.into_iter().fold(0.0, f64::hypot)))
}

pub fn create(realm: &Realm) -> Value {
  let math = realm.new_object();
  for (name, value) in [
    ("E", std::f64::consts::E),
    ("LN10", std::f64::consts::LN_10),
    ("LN2", std::f64::consts::LN_2),
    ("LOG10E", std::f64::consts::LOG10_E),
    ("LOG2E", std::f64::consts::LOG2_E),
    ("PI", std::f64::consts::PI),
    ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ("SQRT2", std::f64::consts::SQRT_2),
  ] {
    constant(&math, name, value);
  }

  let unary: [(&str, fn(f64) -> f64); 19] = [
    ("abs", f64::abs),
    ("acos", f64::acos),
    ("asin", f64::asin),
    ("atan", f64::atan),
    ("ceil", f64::ceil),
    ("cos", f64::cos),
    ("exp", f64::exp),
    ("floor", f64::floor),
    ("log", f64::ln),
    ("round", round),
    ("sin", f64::sin),
    ("sqrt", f64::sqrt),
    ("tan", f64::tan),
    ("trunc", f64::trunc),
    ("sign", sign),
    ("cbrt", f64::cbrt),
    ("log2", f64::log2),
    ("log10", f64::log10),
    ("fround", |x| x as f32 as f64),
  ];
  for (name, f) in unary {
    let func = realm.new_function(name, 1, move |ev, _, args| {
      Ok(Value::Number(f(ev.to_number(&arg(args, 0))?)))
    });
    constant(&math, name, Value::Object(func));
  }

  let binary: [(&str, fn(f64, f64) -> f64); 2] = [("atan2", f64::atan2), ("pow", ops::exponentiate)];
  for (name, f) in binary {
    let func = realm.new_function(name, 2, move |ev, _, args| {
      let x = ev.to_number(&arg(args, 0))?;
      let y = ev.to_number(&arg(args, 1))?;
      Ok(Value::Number(f(x, y)))
    });
    constant(&math, name, Value::Object(func));
  }

  super::method(realm, &math, "max", 2, max);
  super::method(realm, &math, "min", 2, min);
  super::method(realm, &math, "hypot", 2, hypot);
  super::method(realm, &math, "random", 0, |ev, _, _| {
    Ok(Value::Number(ev.realm_mut().rng.next_f64()))
  });
  Value::Object(math)
}
