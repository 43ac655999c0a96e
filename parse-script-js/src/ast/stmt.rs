use super::expr::Expr;
use super::func::Func;
use super::node::Node;
use crate::loc::Loc;
use derive_more::From;
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Break(Node<BreakStmt>),
  Continue(Node<ContinueStmt>),
  Debugger(Node<DebuggerStmt>),
  DoWhile(Node<DoWhileStmt>),
  Empty(Node<EmptyStmt>),
  Expr(Node<ExprStmt>),
  ForIn(Node<ForInStmt>),
  ForTriple(Node<ForTripleStmt>),
  If(Node<IfStmt>),
  Label(Node<LabelStmt>),
  Return(Node<ReturnStmt>),
  Switch(Node<SwitchStmt>),
  Throw(Node<ThrowStmt>),
  Try(Node<TryStmt>),
  While(Node<WhileStmt>),

  FunctionDecl(Node<FuncDecl>),
  VarDecl(Node<VarDecl>),
}

impl Stmt {
  pub fn loc(&self) -> Loc {
    match self {
      Stmt::Block(n) => n.loc,
      Stmt::Break(n) => n.loc,
      Stmt::Continue(n) => n.loc,
      Stmt::Debugger(n) => n.loc,
      Stmt::DoWhile(n) => n.loc,
      Stmt::Empty(n) => n.loc,
      Stmt::Expr(n) => n.loc,
      Stmt::ForIn(n) => n.loc,
      Stmt::ForTriple(n) => n.loc,
      Stmt::If(n) => n.loc,
      Stmt::Label(n) => n.loc,
      Stmt::Return(n) => n.loc,
      Stmt::Switch(n) => n.loc,
      Stmt::Throw(n) => n.loc,
      Stmt::Try(n) => n.loc,
      Stmt::While(n) => n.loc,
      Stmt::FunctionDecl(n) => n.loc,
      Stmt::VarDecl(n) => n.loc,
    }
  }

  /// Whether this statement directly declares a block-scoped binding (`let`, `const` or a function declaration).
  pub fn is_lexical_decl(&self) -> bool {
    match self {
      Stmt::FunctionDecl(_) => true,
      Stmt::VarDecl(decl) => decl.stx.mode != VarDeclMode::Var,
      _ => false,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct BlockStmt {
  pub body: Vec<Stmt>,
}

#[derive(Debug, Serialize)]
pub struct BreakStmt {
  pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContinueStmt {
  pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DebuggerStmt {}

#[derive(Debug, Serialize)]
pub struct DoWhileStmt {
  pub condition: Expr,
  pub body: Stmt,
}

#[derive(Debug, Serialize)]
pub struct EmptyStmt {}

#[derive(Debug, Serialize)]
pub struct ExprStmt {
  pub expr: Expr,
}

#[derive(Debug, Serialize)]
pub enum ForInLhs {
  Decl { mode: VarDeclMode, name: String },
  Assign(Expr),
}

#[derive(Debug, Serialize)]
pub struct ForInStmt {
  pub lhs: ForInLhs,
  pub rhs: Expr,
  pub body: Stmt,
}

#[derive(Debug, Serialize)]
pub enum ForTripleStmtInit {
  None,
  Expr(Expr),
  Decl(Node<VarDecl>),
}

#[derive(Debug, Serialize)]
pub struct ForTripleStmt {
  pub init: ForTripleStmtInit,
  pub cond: Option<Expr>,
  pub post: Option<Expr>,
  pub body: Stmt,
}

#[derive(Debug, Serialize)]
pub struct IfStmt {
  pub test: Expr,
  pub consequent: Stmt,
  pub alternate: Option<Stmt>,
}

#[derive(Debug, Serialize)]
pub struct LabelStmt {
  pub name: String,
  pub statement: Stmt,
}

#[derive(Debug, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Expr>,
}

#[derive(Debug, Serialize)]
pub struct SwitchBranch {
  // If None, it's `default`.
  pub case: Option<Expr>,
  pub body: Vec<Stmt>,
}

#[derive(Debug, Serialize)]
pub struct SwitchStmt {
  pub test: Expr,
  pub branches: Vec<Node<SwitchBranch>>,
}

#[derive(Debug, Serialize)]
pub struct ThrowStmt {
  pub value: Expr,
}

#[derive(Debug, Serialize)]
pub struct CatchBlock {
  pub parameter: Option<String>,
  pub body: Vec<Stmt>,
}

#[derive(Debug, Serialize)]
pub struct TryStmt {
  pub wrapped: Node<BlockStmt>,
  // At least one of these must be present.
  pub catch: Option<Node<CatchBlock>>,
  pub finally: Option<Node<BlockStmt>>,
}

#[derive(Debug, Serialize)]
pub struct WhileStmt {
  pub condition: Expr,
  pub body: Stmt,
}

#[derive(Debug, Serialize)]
pub struct FuncDecl {
  pub name: String,
  pub function: Rc<Node<Func>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum VarDeclMode {
  Const,
  Let,
  Var,
}

#[derive(Debug, Serialize)]
pub struct VarDeclarator {
  pub name: String,
  pub initializer: Option<Expr>,
}

#[derive(Debug, Serialize)]
pub struct VarDecl {
  pub mode: VarDeclMode,
  pub declarators: Vec<VarDeclarator>,
}
