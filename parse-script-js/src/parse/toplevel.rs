use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_top_level(&mut self) -> SyntaxResult<Node<TopLevel>> {
    let ctx = ParseCtx::new();
    let body = self.repeat_until_tt(TT::EOF, |p| p.stmt(ctx))?;
    self.require(TT::EOF)?;
    Ok(Node::new(self.source_range(), TopLevel { body }))
  }
}
