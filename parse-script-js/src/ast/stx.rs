use super::stmt::Stmt;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TopLevel {
  pub body: Vec<Stmt>,
}
