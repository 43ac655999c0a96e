use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentBitwiseAnd,
  AssignmentBitwiseLeftShift,
  AssignmentBitwiseOr,
  AssignmentBitwiseRightShift,
  AssignmentBitwiseUnsignedRightShift,
  AssignmentBitwiseXor,
  AssignmentDivision,
  AssignmentExponentiation,
  AssignmentMultiplication,
  AssignmentRemainder,
  AssignmentSubtraction,
  BitwiseAnd,
  BitwiseLeftShift,
  BitwiseNot,
  BitwiseOr,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  BitwiseXor,
  Call,
  Comma,
  ComputedMemberAccess,
  Conditional,
  ConditionalAlternate,
  Delete,
  Division,
  Equality,
  Exponentiation,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
  Void,
}

impl OperatorName {
  pub fn is_assignment(self) -> bool {
    matches!(
      self,
      OperatorName::Assignment
        | OperatorName::AssignmentAddition
        | OperatorName::AssignmentBitwiseAnd
        | OperatorName::AssignmentBitwiseLeftShift
        | OperatorName::AssignmentBitwiseOr
        | OperatorName::AssignmentBitwiseRightShift
        | OperatorName::AssignmentBitwiseUnsignedRightShift
        | OperatorName::AssignmentBitwiseXor
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentExponentiation
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction
    )
  }

  /// For a compound assignment such as `+=`, returns the binary operator applied before storing.
  pub fn compound_assignment_operator(self) -> Option<OperatorName> {
    Some(match self {
      OperatorName::AssignmentAddition => OperatorName::Addition,
      OperatorName::AssignmentBitwiseAnd => OperatorName::BitwiseAnd,
      OperatorName::AssignmentBitwiseLeftShift => OperatorName::BitwiseLeftShift,
      OperatorName::AssignmentBitwiseOr => OperatorName::BitwiseOr,
      OperatorName::AssignmentBitwiseRightShift => OperatorName::BitwiseRightShift,
      OperatorName::AssignmentBitwiseUnsignedRightShift => OperatorName::BitwiseUnsignedRightShift,
      OperatorName::AssignmentBitwiseXor => OperatorName::BitwiseXor,
      OperatorName::AssignmentDivision => OperatorName::Division,
      OperatorName::AssignmentExponentiation => OperatorName::Exponentiation,
      OperatorName::AssignmentMultiplication => OperatorName::Multiplication,
      OperatorName::AssignmentRemainder => OperatorName::Remainder,
      OperatorName::AssignmentSubtraction => OperatorName::Subtraction,
      _ => return None,
    })
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Associativity {
  Left,
  Right,
}

pub struct Operator {
  pub name: OperatorName,
  pub precedence: u8,
  pub associativity: Associativity,
}

const PRECEDENCE_LEVELS: &[&[(OperatorName, Associativity)]] = &[
  &[(OperatorName::Comma, Associativity::Left)],
  &[
    (OperatorName::Assignment, Associativity::Right),
    (OperatorName::AssignmentAddition, Associativity::Right),
    (OperatorName::AssignmentBitwiseAnd, Associativity::Right),
    (OperatorName::AssignmentBitwiseLeftShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseOr, Associativity::Right),
    (OperatorName::AssignmentBitwiseRightShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseUnsignedRightShift, Associativity::Right),
    (OperatorName::AssignmentBitwiseXor, Associativity::Right),
    (OperatorName::AssignmentDivision, Associativity::Right),
    (OperatorName::AssignmentExponentiation, Associativity::Right),
    (OperatorName::AssignmentMultiplication, Associativity::Right),
    (OperatorName::AssignmentRemainder, Associativity::Right),
    (OperatorName::AssignmentSubtraction, Associativity::Right),
    (OperatorName::Conditional, Associativity::Right),
    (OperatorName::ConditionalAlternate, Associativity::Right),
  ],
  &[(OperatorName::LogicalOr, Associativity::Left)],
  &[(OperatorName::LogicalAnd, Associativity::Left)],
  &[(OperatorName::BitwiseOr, Associativity::Left)],
  &[(OperatorName::BitwiseXor, Associativity::Left)],
  &[(OperatorName::BitwiseAnd, Associativity::Left)],
  &[
    (OperatorName::Equality, Associativity::Left),
    (OperatorName::Inequality, Associativity::Left),
    (OperatorName::StrictEquality, Associativity::Left),
    (OperatorName::StrictInequality, Associativity::Left),
  ],
  &[
    (OperatorName::GreaterThan, Associativity::Left),
    (OperatorName::GreaterThanOrEqual, Associativity::Left),
    (OperatorName::In, Associativity::Left),
    (OperatorName::Instanceof, Associativity::Left),
    (OperatorName::LessThan, Associativity::Left),
    (OperatorName::LessThanOrEqual, Associativity::Left),
  ],
  &[
    (OperatorName::BitwiseLeftShift, Associativity::Left),
    (OperatorName::BitwiseRightShift, Associativity::Left),
    (OperatorName::BitwiseUnsignedRightShift, Associativity::Left),
  ],
  &[
    (OperatorName::Addition, Associativity::Left),
    (OperatorName::Subtraction, Associativity::Left),
  ],
  &[
    (OperatorName::Division, Associativity::Left),
    (OperatorName::Multiplication, Associativity::Left),
    (OperatorName::Remainder, Associativity::Left),
  ],
  &[(OperatorName::Exponentiation, Associativity::Right)],
  &[
    (OperatorName::BitwiseNot, Associativity::Right),
    (OperatorName::Delete, Associativity::Right),
    (OperatorName::LogicalNot, Associativity::Right),
    (OperatorName::PrefixDecrement, Associativity::Right),
    (OperatorName::PrefixIncrement, Associativity::Right),
    (OperatorName::Typeof, Associativity::Right),
    (OperatorName::UnaryNegation, Associativity::Right),
    (OperatorName::UnaryPlus, Associativity::Right),
    (OperatorName::Void, Associativity::Right),
  ],
  &[
    (OperatorName::PostfixDecrement, Associativity::Left),
    (OperatorName::PostfixIncrement, Associativity::Left),
  ],
  &[(OperatorName::New, Associativity::Right)],
  &[
    (OperatorName::Call, Associativity::Left),
    (OperatorName::ComputedMemberAccess, Associativity::Left),
    (OperatorName::MemberAccess, Associativity::Left),
  ],
];

// Precedence starts at 1 so that 0 can be used as "accept nothing".
pub static OPERATORS: Lazy<HashMap<OperatorName, Operator>> = Lazy::new(|| {
  let mut map = HashMap::<OperatorName, Operator>::new();
  for (i, level) in PRECEDENCE_LEVELS.iter().enumerate() {
    for &(name, associativity) in level.iter() {
      map.insert(name, Operator {
        name,
        precedence: (i + 1) as u8,
        associativity,
      });
    }
  }
  map
});
