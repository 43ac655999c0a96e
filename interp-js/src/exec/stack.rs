//! Native stack growth for deeply nested evaluation.

/// Runs `f`, first growing the native stack if it's running low.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
  const RED_ZONE: usize = 128 * 1024;
  const STACK_PER_RECURSION: usize = 1024 * 1024;

  stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
  f()
}
