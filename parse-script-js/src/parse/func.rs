use super::ParseCtx;
use super::Parser;
use crate::ast::func::Func;
use crate::ast::func::ParamDecl;
use crate::ast::node::Node;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses `(params) { body }` following the `function` keyword and optional name.
  pub fn func_signature_and_body(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Func>> {
    let ctx = ctx.with_in_allowed(true);
    self.with_loc(|p| {
      p.require(TT::ParenthesisOpen)?;
      let parameters = p.list_with_loc(TT::Comma, TT::ParenthesisClose, |p| {
        let name = p.id_name()?;
        Ok(ParamDecl { name })
      })?;
      p.require(TT::BraceOpen)?;
      let body = p.repeat_until_tt(TT::BraceClose, |p| p.stmt(ctx))?;
      p.require(TT::BraceClose)?;
      Ok(Func { parameters, body })
    })
  }
}
