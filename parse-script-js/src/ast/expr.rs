use super::func::Func;
use super::node::Node;
use crate::loc::Loc;
use crate::num::JsNumber;
use crate::operator::OperatorName;
use derive_more::From;
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum Expr {
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  ComputedMember(Node<ComputedMemberExpr>),
  Cond(Node<CondExpr>),
  Func(Node<FuncExpr>),
  Id(Node<IdExpr>),
  Member(Node<MemberExpr>),
  This(Node<ThisExpr>),
  Unary(Node<UnaryExpr>),
  UnaryPostfix(Node<UnaryPostfixExpr>),

  LitArr(Node<LitArrExpr>),
  LitBool(Node<LitBoolExpr>),
  LitNull(Node<LitNullExpr>),
  LitNum(Node<LitNumExpr>),
  LitObj(Node<LitObjExpr>),
  LitStr(Node<LitStrExpr>),
}

impl Expr {
  pub fn loc(&self) -> Loc {
    match self {
      Expr::Binary(n) => n.loc,
      Expr::Call(n) => n.loc,
      Expr::ComputedMember(n) => n.loc,
      Expr::Cond(n) => n.loc,
      Expr::Func(n) => n.loc,
      Expr::Id(n) => n.loc,
      Expr::Member(n) => n.loc,
      Expr::This(n) => n.loc,
      Expr::Unary(n) => n.loc,
      Expr::UnaryPostfix(n) => n.loc,
      Expr::LitArr(n) => n.loc,
      Expr::LitBool(n) => n.loc,
      Expr::LitNull(n) => n.loc,
      Expr::LitNum(n) => n.loc,
      Expr::LitObj(n) => n.loc,
      Expr::LitStr(n) => n.loc,
    }
  }

  /// Whether this expression may appear on the left of an assignment or as the operand of `++`/`--`.
  pub fn is_assignment_target(&self) -> bool {
    matches!(self, Expr::Id(_) | Expr::Member(_) | Expr::ComputedMember(_))
  }
}

#[derive(Debug, Serialize)]
pub struct BinaryExpr {
  pub operator: OperatorName,
  pub left: Expr,
  pub right: Expr,
}

#[derive(Debug, Serialize)]
pub struct CallExpr {
  pub callee: Expr,
  pub arguments: Vec<Expr>,
}

#[derive(Debug, Serialize)]
pub struct ComputedMemberExpr {
  pub object: Expr,
  pub member: Expr,
}

#[derive(Debug, Serialize)]
pub struct CondExpr {
  pub test: Expr,
  pub consequent: Expr,
  pub alternate: Expr,
}

#[derive(Debug, Serialize)]
pub struct FuncExpr {
  // Only visible inside the function itself.
  pub name: Option<String>,
  pub func: Rc<Node<Func>>,
}

#[derive(Debug, Serialize)]
pub struct IdExpr {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MemberExpr {
  pub left: Expr,
  pub right: String,
}

#[derive(Debug, Serialize)]
pub struct ThisExpr {}

/// Prefix operators, including `new`. For `new`, the argument is always a `CallExpr`, with no arguments if the source omitted the parentheses.
#[derive(Debug, Serialize)]
pub struct UnaryExpr {
  pub operator: OperatorName,
  pub argument: Expr,
}

#[derive(Debug, Serialize)]
pub struct UnaryPostfixExpr {
  pub operator: OperatorName,
  pub argument: Expr,
}

#[derive(Debug, Serialize)]
pub enum LitArrElem {
  Single(Expr),
  // A hole, e.g. the middle of `[1,,2]`.
  Empty,
}

#[derive(Debug, Serialize)]
pub struct LitArrExpr {
  pub elements: Vec<LitArrElem>,
}

#[derive(Debug, Serialize)]
pub struct LitBoolExpr {
  pub value: bool,
}

#[derive(Debug, Serialize)]
pub struct LitNullExpr {}

#[derive(Debug, Serialize)]
pub struct LitNumExpr {
  pub value: JsNumber,
}

#[derive(Debug, Serialize)]
pub enum ObjMemberKey {
  Name(String),
  // Numeric keys are converted to property names by the consumer, e.g. `{ 0x10: 1 }` has key "16".
  Num(JsNumber),
}

#[derive(Debug, Serialize)]
pub struct ObjMember {
  pub key: ObjMemberKey,
  pub value: Expr,
}

#[derive(Debug, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<ObjMember>>,
}

#[derive(Debug, Serialize)]
pub struct LitStrExpr {
  pub value: String,
}
