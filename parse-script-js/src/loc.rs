use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A location within the source text expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  /// Returns the 1-based line and column of the start of this location.
  pub fn line_col(&self, source: &str) -> (usize, usize) {
    let upto = &source[..min(self.0, source.len())];
    let line = upto.matches('\n').count() + 1;
    let col = match upto.rfind('\n') {
      Some(nl) => upto[nl + 1..].chars().count() + 1,
      None => upto.chars().count() + 1,
    };
    (line, col)
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

#[cfg(test)]
mod tests {
  use super::Loc;

  #[test]
  fn test_add_covers_both() {
    assert_eq!(Loc(4, 6) + Loc(1, 2), Loc(1, 6));
    let mut l = Loc(3, 3);
    l += Loc(3, 9);
    assert_eq!(l, Loc(3, 9));
  }

  #[test]
  fn test_line_col() {
    let src = "a\nbc\n  d";
    assert_eq!(Loc(0, 1).line_col(src), (1, 1));
    assert_eq!(Loc(3, 4).line_col(src), (2, 2));
    assert_eq!(Loc(7, 8).line_col(src), (3, 3));
  }
}
