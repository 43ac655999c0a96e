use super::Parser;
use crate::ast::node::Node;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn with_loc<S, F>(&mut self, f: F) -> SyntaxResult<Node<S>>
  where
    F: FnOnce(&mut Self) -> SyntaxResult<S>,
  {
    // Make sure the first token is buffered so the checkpoint knows where the node starts.
    self.peek();
    let start = self.checkpoint();
    let stx = f(self)?;
    Ok(Node::new(self.since_checkpoint(&start), stx))
  }

  pub fn repeat_while<S, F, W>(&mut self, w: W, f: F) -> SyntaxResult<Vec<S>>
  where
    F: Fn(&mut Self) -> SyntaxResult<S>,
    W: Fn(&mut Self) -> bool,
  {
    let mut nodes = Vec::new();
    while w(self) {
      nodes.push(f(self)?);
    }
    Ok(nodes)
  }

  pub fn repeat_until_tt<S, F>(&mut self, tt: TT, f: F) -> SyntaxResult<Vec<S>>
  where
    F: Fn(&mut Self) -> SyntaxResult<S>,
  {
    self.repeat_while(|p| p.peek().typ != tt, f)
  }

  /// Parse a list of items separated by a delimiter until `close`, which will also be consumed.
  /// Allows for a trailing delimiter.
  pub fn list_with_loc<S, F>(&mut self, delim: TT, close: TT, f: F) -> SyntaxResult<Vec<Node<S>>>
  where
    F: Fn(&mut Self) -> SyntaxResult<S>,
  {
    let mut nodes = Vec::new();
    while !self.consume_if(close).is_match() {
      nodes.push(self.with_loc(&f)?);
      // A missing delimiter is only allowed right before the close token.
      if !self.consume_if(delim).is_match() {
        self.require(close)?;
        break;
      };
    }
    Ok(nodes)
  }
}
