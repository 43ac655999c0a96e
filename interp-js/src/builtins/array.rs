use super::arg;
use super::method;
use crate::error::VmError;
use crate::exec::Evaluator;
use crate::object::JsObject;
use crate::ops;
use crate::realm::Realm;
use crate::value::Value;
use std::cmp::Ordering;

fn construct(ev: &mut Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  if let [Value::Number(len)] = args {
    let arr = ev.new_array([]);
    if !arr.set("length", Value::Number(*len)) {
      return Err(ev.range_error("Invalid array length"));
    };
    return Ok(Value::Object(arr));
  };
  Ok(Value::Object(ev.new_array(args.iter().cloned())))
}

fn is_array(_ev: &mut Evaluator<'_>, _this: Value, args: &[Value]) -> Result<Value, VmError> {
  Ok(Value::Bool(arg(args, 0).as_object().is_some_and(JsObject::is_array)))
}

fn length_of(ev: &mut Evaluator<'_>, obj: &JsObject) -> Result<usize, VmError> {
  let len = ev.to_integer(&obj.get("length"))?;
  Ok(len.clamp(0.0, u32::MAX as f64) as usize)
}

/// `this` as an object with its elements.
fn elements(ev: &mut Evaluator<'_>, this: &Value) -> Result<(JsObject, Vec<Value>), VmError> {
  let obj = ev.to_object(this)?;
  let len = length_of(ev, &obj)?;
  let values = (0..len).map(|i| obj.get(&i.to_string())).collect();
  Ok((obj, values))
}

/// Replaces the elements of an array-like with `values`.
fn store(ev: &mut Evaluator<'_>, obj: &JsObject, values: Vec<Value>) -> Result<(), VmError> {
  let old_len = length_of(ev, obj)?;
  let new_len = values.len();
  for (i, v) in values.into_iter().enumerate() {
    obj.set(&i.to_string(), v);
  }
  if !obj.is_array() {
    for i in new_len..old_len {
      obj.delete(&i.to_string());
    }
  };
  obj.set("length", Value::Number(new_len as f64));
  Ok(())
}

/// Resolves a relative index argument against a length, as `slice` and friends do.
fn relative_index(ev: &mut Evaluator<'_>, value: &Value, len: usize, default: usize) -> Result<usize, VmError> {
  if value.is_undefined() {
    return Ok(default);
  };
  let rel = ev.to_integer(value)?;
  Ok(if rel < 0.0 {
    (len as f64 + rel).max(0.0) as usize
  } else {
    rel.min(len as f64) as usize
  })
}

fn callback(ev: &Evaluator<'_>, args: &[Value]) -> Result<Value, VmError> {
  let f = arg(args, 0);
  if !f.is_callable() {
    return Err(ev.type_error(format!("{} is not a function", ops::inspect(&f))));
  };
  Ok(f)
}

fn push(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (obj, mut values) = elements(ev, &this)?;
  values.extend_from_slice(args);
  let len = values.len();
  store(ev, &obj, values)?;
  Ok(Value::Number(len as f64))
}

fn pop(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let (obj, mut values) = elements(ev, &this)?;
  let last = values.pop().unwrap_or_default();
  store(ev, &obj, values)?;
  Ok(last)
}

fn shift(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let (obj, mut values) = elements(ev, &this)?;
  if values.is_empty() {
    return Ok(Value::Undefined);
  };
  let first = values.remove(0);
  store(ev, &obj, values)?;
  Ok(first)
}

fn unshift(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (obj, values) = elements(ev, &this)?;
  let all: Vec<Value> = args.iter().cloned().chain(values).collect();
  let len = all.len();
  store(ev, &obj, all)?;
  Ok(Value::Number(len as f64))
}

fn slice(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, values) = elements(ev, &this)?;
  let start = relative_index(ev, &arg(args, 0), values.len(), 0)?;
  let end = relative_index(ev, &arg(args, 1), values.len(), values.len())?;
  let picked = values.get(start..end.max(start)).unwrap_or_default().to_vec();
  Ok(Value::Object(ev.new_array(picked)))
}

fn splice(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (obj, mut values) = elements(ev, &this)?;
  let len = values.len();
  let start = relative_index(ev, &arg(args, 0), len, 0)?;
  let delete_count = match args.len() {
    0 => 0,
    1 => len - start,
    _ => (ev.to_integer(&args[1])?.max(0.0) as usize).min(len - start),
  };
  let inserted = args.get(2..).unwrap_or_default().iter().cloned();
  let removed: Vec<Value> = values.splice(start..start + delete_count, inserted).collect();
  store(ev, &obj, values)?;
  Ok(Value::Object(ev.new_array(removed)))
}

fn concat(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, mut values) = elements(ev, &this)?;
  for a in args {
    match a {
      Value::Object(o) if o.is_array() => values.extend(o.array_elements()),
      other => values.push(other.clone()),
    };
  }
  Ok(Value::Object(ev.new_array(values)))
}

fn join(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, values) = elements(ev, &this)?;
  let sep = match arg(args, 0) {
    Value::Undefined => ",".into(),
    other => ev.to_string(&other)?,
  };
  let mut parts = Vec::with_capacity(values.len());
  for v in values.iter() {
    parts.push(match v {
      Value::Undefined | Value::Null => "".into(),
      other => ev.to_string(other)?,
    });
  }
  Ok(Value::string(parts.join(&*sep)))
}

fn to_string(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  join(ev, this, &[])
}

fn reverse(ev: &mut Evaluator<'_>, this: Value, _args: &[Value]) -> Result<Value, VmError> {
  let (obj, mut values) = elements(ev, &this)?;
  values.reverse();
  store(ev, &obj, values)?;
  Ok(Value::Object(obj))
}

fn index_of(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, values) = elements(ev, &this)?;
  let target = arg(args, 0);
  let start = relative_index(ev, &arg(args, 1), values.len(), 0)?;
  let found = values
    .iter()
    .enumerate()
    .skip(start)
    .find(|(_, v)| ops::strict_equals(v, &target));
  Ok(Value::Number(found.map_or(-1.0, |(i, _)| i as f64)))
}

fn last_index_of(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, values) = elements(ev, &this)?;
  let target = arg(args, 0);
  let found = values.iter().rposition(|v| ops::strict_equals(v, &target));
  Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

fn includes(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let (_, values) = elements(ev, &this)?;
  let target = arg(args, 0);
  // SameValueZero: NaN finds NaN.
  let nan = matches!(target, Value::Number(n) if n.is_nan());
  Ok(Value::Bool(values.iter().any(|v| {
    ops::strict_equals(v, &target) || (nan && matches!(v, Value::Number(n) if n.is_nan()))
  })))
}

/// Calls `f(element, index, array)` for each element, stopping early when `visit` says so.
fn each(
  ev: &mut Evaluator<'_>,
  this: &Value,
  args: &[Value],
  mut visit: impl FnMut(&Value, Value) -> bool,
) -> Result<(), VmError> {
  let f = callback(ev, args)?;
  let this_arg = arg(args, 1);
  let (obj, values) = elements(ev, this)?;
  for (i, v) in values.into_iter().enumerate() {
    let result = ev.call(
      &f,
      this_arg.clone(),
      &[v.clone(), Value::Number(i as f64), Value::Object(obj.clone())],
    )?;
    if !visit(&v, result) {
      break;
    };
  }
  Ok(())
}

fn for_each(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  each(ev, &this, args, |_, _| true)?;
  Ok(Value::Undefined)
}

fn map(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut out = Vec::new();
  each(ev, &this, args, |_, r| {
    out.push(r);
    true
  })?;
  Ok(Value::Object(ev.new_array(out)))
}

fn filter(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut out = Vec::new();
  each(ev, &this, args, |v, r| {
    if ops::to_boolean(&r) {
      out.push(v.clone());
    };
    true
  })?;
  Ok(Value::Object(ev.new_array(out)))
}

fn some(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut found = false;
  each(ev, &this, args, |_, r| {
    found = ops::to_boolean(&r);
    !found
  })?;
  Ok(Value::Bool(found))
}

fn every(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let mut all = true;
  each(ev, &this, args, |_, r| {
    all = ops::to_boolean(&r);
    all
  })?;
  Ok(Value::Bool(all))
}

fn reduce(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let f = callback(ev, args)?;
  let (obj, values) = elements(ev, &this)?;
  let mut iter = values.into_iter().enumerate();
  let mut acc = match args.get(1) {
    Some(initial) => initial.clone(),
    None => match iter.next() {
      Some((_, first)) => first,
      None => return Err(ev.type_error("Reduce of empty array with no initial value")),
    },
  };
  for (i, v) in iter {
    acc = ev.call(
      &f,
      Value::Undefined,
      &[acc, v, Value::Number(i as f64), Value::Object(obj.clone())],
    )?;
  }
  Ok(acc)
}

fn sort_compare(ev: &mut Evaluator<'_>, cmp: &Value, a: &Value, b: &Value) -> Result<Ordering, VmError> {
  // Undefined sorts last regardless of the comparator.
  match (a.is_undefined(), b.is_undefined()) {
    (true, true) => return Ok(Ordering::Equal),
    (true, false) => return Ok(Ordering::Greater),
    (false, true) => return Ok(Ordering::Less),
    _ => {}
  };
  if cmp.is_undefined() {
    let x = ev.to_string(a)?;
    let y = ev.to_string(b)?;
    return Ok(x.encode_utf16().cmp(y.encode_utf16()));
  };
  let r = ev.call(cmp, Value::Undefined, &[a.clone(), b.clone()])?;
  let r = ev.to_number(&r)?;
  Ok(if r < 0.0 {
    Ordering::Less
  } else if r > 0.0 {
    Ordering::Greater
  } else {
    Ordering::Equal
  })
}

/// A stable merge sort whose comparator can fail.
fn merge_sort(ev: &mut Evaluator<'_>, cmp: &Value, values: Vec<Value>) -> Result<Vec<Value>, VmError> {
  if values.len() <= 1 {
    return Ok(values);
  };
  let mut left = values;
  let right = left.split_off(left.len() / 2);
  let left = merge_sort(ev, cmp, left)?;
  let right = merge_sort(ev, cmp, right)?;
  let mut out = Vec::with_capacity(left.len() + right.len());
  let mut l = left.into_iter().peekable();
  let mut r = right.into_iter().peekable();
  while let (Some(a), Some(b)) = (l.peek(), r.peek()) {
    if sort_compare(ev, cmp, b, a)? == Ordering::Less {
      out.extend(r.next());
    } else {
      out.extend(l.next());
    };
  }
  out.extend(l);
  out.extend(r);
  Ok(out)
}

fn sort(ev: &mut Evaluator<'_>, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let cmp = arg(args, 0);
  if !cmp.is_undefined() && !cmp.is_callable() {
    return Err(ev.type_error("The comparison function must be either a function or undefined"));
  };
  let (obj, values) = elements(ev, &this)?;
  let sorted = merge_sort(ev, &cmp, values)?;
  store(ev, &obj, sorted)?;
  Ok(Value::Object(obj))
}

pub fn install(realm: &Realm) {
  let proto = &realm.intrinsics.array_prototype;
  method(realm, proto, "push", 1, push);
  method(realm, proto, "pop", 0, pop);
  method(realm, proto, "shift", 0, shift);
  method(realm, proto, "unshift", 1, unshift);
  method(realm, proto, "slice", 2, slice);
  method(realm, proto, "splice", 2, splice);
  method(realm, proto, "concat", 1, concat);
  method(realm, proto, "join", 1, join);
  method(realm, proto, "reverse", 0, reverse);
  method(realm, proto, "indexOf", 1, index_of);
  method(realm, proto, "lastIndexOf", 1, last_index_of);
  method(realm, proto, "includes", 1, includes);
  method(realm, proto, "forEach", 1, for_each);
  method(realm, proto, "map", 1, map);
  method(realm, proto, "filter", 1, filter);
  method(realm, proto, "reduce", 1, reduce);
  method(realm, proto, "some", 1, some);
  method(realm, proto, "every", 1, every);
  method(realm, proto, "sort", 1, sort);
  method(realm, proto, "toString", 0, to_string);
}

pub fn constructor(realm: &Realm) -> Value {
  let ctor = realm.new_constructor(
    "Array",
    1,
    |ev, _, args| construct(ev, args),
    construct,
    &realm.intrinsics.array_prototype,
  );
  method(realm, &ctor, "isArray", 1, is_array);
  Value::Object(ctor)
}
