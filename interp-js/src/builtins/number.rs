use super::arg;
use super::constant;
use super::global;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::object::ObjectClass;
use crate::ops;
use crate::realm::Realm;
use crate::value::Value;

fn call(ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  match args.first() {
    None => Ok(Value::Number(0.0)),
    Some(v) => Ok(Value::Number(ev.to_number(v)?)),
  }
}

fn construct(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  let n = match args.first() {
    None => 0.0,
    Some(v) => ev.to_number(v)?,
  };
  let proto = ev.realm().intrinsics.number_prototype.clone();
  Ok(Value::Object(JsObject::new(ObjectClass::Number(n), Some(proto))))
}

fn this_number(ev: &Evaluator<'_>, this: &Value, method: &str) -> Result<f64, VmError> {
  match this {
    Value::Number(n) => Ok(*n),
    Value::Object(o) => match o.class() {
      ObjectClass::Number(n) => Ok(n),
      _ => Err(ev.type_error(format!("Number.prototype.{method} requires that 'this' be a Number"))),
    },
    _ => Err(ev.type_error(format!("Number.prototype.{method} requires that 'this' be a Number"))),
  }
}

/// Rounds a plain decimal string of digits to `digits` fraction digits, with ties away from zero.
fn round_decimal(exact: &str, digits: usize) -> String {
  let (int, frac) = exact.split_once('.').unwrap_or((exact, ""));
  let mut kept: Vec<u8> = int.bytes().collect();
  kept.extend(frac.bytes().chain(std::iter::repeat(b'0')).take(digits));
  let round_up = frac.as_bytes().get(digits).is_some_and(|d| *d >= b'5');
  if round_up {
    let mut i = kept.len();
    loop {
      if i == 0 {
        kept.insert(0, b'1');
        break;
      };
      i -= 1;
      if kept[i] == b'9' {
        kept[i] = b'0';
      } else {
        kept[i] += 1;
        break;
      };
    }
  };
  let split = kept.len() - digits;
  let mut out = String::from_utf8_lossy(&kept[..split]).into_owned();
  if digits > 0 {
    out.push('.');
    out.push_str(&String::from_utf8_lossy(&kept[split..]));
  };
  out
}

/// `Number.prototype.toFixed` for a finite value below 1e21.
pub fn to_fixed_string(x: f64, digits: usize) -> String {
  // 1100 fraction digits hold the exact decimal expansion of any f64.
  let exact = format!("{:.1100}", x.abs());
  let rounded = round_decimal(&exact, digits);
  if x < 0.0 {
    format!("-{rounded}")
  } else {
    rounded
  }
}

fn to_fixed(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let x = this_number(ev, &this, "toFixed")?;
  let digits = ev.to_integer(&arg(args, 0))?;
  if !(0.0..=100.0).contains(&digits) {
    return Err(ev.range_error("toFixed() digits argument must be between 0 and 100"));
  };
  if !x.is_finite() || x.abs() >= 1e21 {
    return Ok(Value::string(ops::number_to_string(x)));
  };
  Ok(Value::string(to_fixed_string(x, digits as usize)))
}

fn to_string(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let x = this_number(ev, &this, "toString")?;
  let radix = match arg(args, 0) {
    Value::Undefined => 10.0,
    other => ev.to_integer(&other)?,
  };
  if !(2.0..=36.0).contains(&radix) {
    return Err(ev.range_error("toString() radix must be between 2 and 36"));
  };
  Ok(Value::string(match radix as u32 {
    10 => ops::number_to_string(x),
    radix => ops::number_to_radix_string(x, radix),
  }))
}

fn value_of(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  Ok(Value::Number(this_number(ev, &this, "valueOf")?))
}

fn is_integer(n: &Value) -> bool {
  n.as_number().is_some_and(|n| n.is_finite() && n.trunc() == n)
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.number_prototype;
  method(realm, proto, "toFixed", 1, to_fixed);
  method(realm, proto, "toString", 1, to_string);
  method(realm, proto, "valueOf", 0, value_of);
}

pub fn constructor(realm: &Realm) -> Value {
  let ctor = realm.new_constructor("Number", 1, call, construct, &realm.intrinsics.number_prototype);
  constant(&ctor, "MAX_SAFE_INTEGER", 9007199254740991.0);
  constant(&ctor, "MIN_SAFE_INTEGER", -9007199254740991.0);
  constant(&ctor, "EPSILON", f64::EPSILON);
  constant(&ctor, "MAX_VALUE", f64::MAX);
  constant(&ctor, "MIN_VALUE", 5e-324);
  constant(&ctor, "POSITIVE_INFINITY", f64::INFINITY);
  constant(&ctor, "NEGATIVE_INFINITY", f64::NEG_INFINITY);
  constant(&ctor, "NaN", f64::NAN);
  constant(&ctor, "parseFloat", global::parse_float(realm));
  constant(&ctor, "parseInt", global::parse_int(realm));
  method(realm, &ctor, "isInteger", 1, |_, _, args| {
    Ok(Value::Bool(is_integer(&arg(args, 0))))
  });
  method(realm, &ctor, "isSafeInteger", 1, |_, _, args| {
    let n = arg(args, 0);
    Ok(Value::Bool(
      is_integer(&n) && n.as_number().is_some_and(|n| n.abs() <= 9007199254740991.0),
    ))
  });
  method(realm, &ctor, "isFinite", 1, |_, _, args| {
    Ok(Value::Bool(arg(args, 0).as_number().is_some_and(f64::is_finite)))
  });
  method(realm, &ctor, "isNaN", 1, |_, _, args| {
    Ok(Value::Bool(arg(args, 0).as_number().is_some_and(f64::is_nan)))
  });
  Value::Object(ctor)
}

#[cfg(test)]
mod tests {
  use super::to_fixed_string;

  #[test]
  fn test_to_fixed_rounds_ties_away_from_zero() {
    assert_eq!(to_fixed_string(0.5, 0), "1");
    assert_eq!(to_fixed_string(2.5, 0), "3");
    assert_eq!(to_fixed_string(-2.5, 0), "-3");
    assert_eq!(to_fixed_string(1.005, 2), "1.00");
    assert_eq!(to_fixed_string(1.45, 1), "1.4");
    assert_eq!(to_fixed_string(9.995, 2), "9.99");
    assert_eq!(to_fixed_string(99.5, 0), "100");
  }

  #[test]
  fn test_to_fixed_pads() {
    assert_eq!(to_fixed_string(3.0, 2), "3.00");
    assert_eq!(to_fixed_string(0.000001, 3), "0.000");
    assert_eq!(to_fixed_string(123.456, 1), "123.5");
    assert_eq!(to_fixed_string(-0.0000001, 2), "-0.00");
  }
}
