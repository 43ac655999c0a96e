use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::ast::stmt::FuncDecl;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclMode;
use crate::ast::stmt::VarDeclarator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::parse::expr::Asi;
use crate::parse::ParseCtx;
use crate::parse::Parser;
use crate::token::TT;
use std::rc::Rc;

impl<'a> Parser<'a> {
  pub fn var_decl_mode(&mut self) -> SyntaxResult<VarDeclMode> {
    let t = self.consume();
    Ok(match t.typ {
      TT::KeywordConst => VarDeclMode::Const,
      TT::KeywordLet => VarDeclMode::Let,
      TT::KeywordVar => VarDeclMode::Var,
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("variable declaration"))),
    })
  }

  /// Parses a declaration such as `let a = 1, b`. The trailing semicolon is not consumed.
  /// In a `for` head, `ctx.in_allowed` is false so that initializers stop at `in`.
  pub fn var_decl(&mut self, ctx: ParseCtx, asi: &mut Asi) -> SyntaxResult<Node<VarDecl>> {
    self.with_loc(|p| {
      let mode = p.var_decl_mode()?;
      let mut declarators = Vec::new();
      loop {
        let name = p.id_name()?;
        let initializer = if p.consume_if(TT::Equals).is_match() {
          Some(p.expr_with_asi(ctx, [TT::Semicolon, TT::Comma], asi)?)
        } else {
          None
        };
        declarators.push(VarDeclarator { name, initializer });
        if asi.did_end_with_asi || !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      Ok(VarDecl { mode, declarators })
    })
  }

  pub fn func_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFunction)?;
      let name = p.id_name()?;
      let function: Node<Func> = p.func_signature_and_body(ctx)?;
      Ok(FuncDecl {
        name,
        function: Rc::new(function),
      })
    })
  }
}
