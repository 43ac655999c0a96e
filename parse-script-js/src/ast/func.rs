use super::node::Node;
use super::stmt::Stmt;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ParamDecl {
  pub name: String,
}

/// The parameters and body shared by function declarations and function expressions.
///
/// Function values created at runtime hold this behind an `Rc`, so creating a closure never copies the body.
#[derive(Debug, Serialize)]
pub struct Func {
  pub parameters: Vec<Node<ParamDecl>>,
  pub body: Vec<Stmt>,
}
