pub mod lit;

use super::ParseCtx;
use super::Parser;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ComputedMemberExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::FuncExpr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryPostfixExpr;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::loc::Loc;
use crate::operator::Associativity;
use crate::operator::OperatorName;
use crate::operator::OPERATORS;
use crate::parse::operator::MULTARY_OPERATOR_MAPPING;
use crate::parse::operator::UNARY_OPERATOR_MAPPING;
use crate::token::TT;
use lit::normalise_identifier;
use std::rc::Rc;

pub struct Asi {
  pub can_end_with_asi: bool,
  pub did_end_with_asi: bool,
}

impl Asi {
  pub fn can() -> Asi {
    Asi {
      can_end_with_asi: true,
      did_end_with_asi: false,
    }
  }

  pub fn no() -> Asi {
    Asi {
      can_end_with_asi: false,
      did_end_with_asi: false,
    }
  }
}

/// Whether a token can be used as a binding or reference name.
/// `let` is only a keyword at the start of a declaration.
pub fn is_valid_identifier(typ: TT) -> bool {
  matches!(typ, TT::Identifier | TT::KeywordLet)
}

fn unsupported_keyword(typ: TT) -> Option<&'static str> {
  Some(match typ {
    TT::KeywordClass => "class",
    TT::KeywordEnum => "enum",
    TT::KeywordExport => "export",
    TT::KeywordExtends => "extends",
    TT::KeywordImport => "import",
    TT::KeywordSuper => "super",
    TT::KeywordWith => "with",
    _ => return None,
  })
}

impl<'a> Parser<'a> {
  pub fn call_args(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Expr>> {
    let ctx = ctx.with_in_allowed(true);
    let mut args = Vec::new();
    while self.peek().typ != TT::ParenthesisClose {
      args.push(self.expr(ctx, [TT::Comma, TT::ParenthesisClose])?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    Ok(args)
  }

  pub fn expr<const N: usize>(&mut self, ctx: ParseCtx, terminators: [TT; N]) -> SyntaxResult<Expr> {
    self.expr_with_min_prec(ctx, 1, terminators, &mut Asi::no())
  }

  pub fn expr_with_asi<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Expr> {
    self.expr_with_min_prec(ctx, 1, terminators, asi)
  }

  pub fn grouping(&mut self, ctx: ParseCtx) -> SyntaxResult<Expr> {
    self.require(TT::ParenthesisOpen)?;
    let expr = self.expr(ctx.with_in_allowed(true), [TT::ParenthesisClose])?;
    self.require(TT::ParenthesisClose)?;
    Ok(expr)
  }

  pub fn func_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<FuncExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFunction)?;
      let name = if is_valid_identifier(p.peek().typ) {
        Some(p.id_name()?)
      } else {
        None
      };
      let func = p.func_signature_and_body(ctx)?;
      Ok(FuncExpr {
        name,
        func: Rc::new(func),
      })
    })
  }

  pub fn id_expr(&mut self) -> SyntaxResult<Node<IdExpr>> {
    self.with_loc(|p| {
      let name = p.id_name()?;
      Ok(IdExpr { name })
    })
  }

  /// Consumes an identifier token and returns its name with any unicode escapes decoded.
  pub fn id_name(&mut self) -> SyntaxResult<String> {
    let t = self.require_predicate(is_valid_identifier, "identifier")?;
    normalise_identifier(self.str(t.loc)).map_err(|typ| t.error(typ))
  }

  pub fn this_expr(&mut self) -> SyntaxResult<Node<ThisExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordThis)?;
      Ok(ThisExpr {})
    })
  }

  /// Parses `new Callee(args)`. The callee is a primary expression followed only by member accesses, so `new a.b.C()` constructs `a.b.C` and `new f()()` calls the constructed value.
  fn new_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<UnaryExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordNew)?;
      let call = p.with_loc(|p| {
        let mut callee = if p.peek().typ == TT::KeywordNew {
          p.new_expr(ctx)?.into()
        } else {
          p.primary_expr(ctx)?
        };
        loop {
          if p.consume_if(TT::Dot).is_match() {
            let right = p.member_name()?;
            callee = Node::new(callee.loc() + right.0, MemberExpr {
              left: callee,
              right: right.1,
            })
            .into();
          } else if p.consume_if(TT::BracketOpen).is_match() {
            let member = p.expr(ctx.with_in_allowed(true), [TT::BracketClose])?;
            let end = p.require(TT::BracketClose)?;
            callee = Node::new(callee.loc() + end.loc, ComputedMemberExpr {
              object: callee,
              member,
            })
            .into();
          } else {
            break;
          };
        }
        let arguments = if p.consume_if(TT::ParenthesisOpen).is_match() {
          let args = p.call_args(ctx)?;
          p.require(TT::ParenthesisClose)?;
          args
        } else {
          Vec::new()
        };
        Ok(CallExpr { callee, arguments })
      })?;
      Ok(UnaryExpr {
        operator: OperatorName::New,
        argument: call.into(),
      })
    })
  }

  fn member_name(&mut self) -> SyntaxResult<(Loc, String)> {
    let t = self.consume();
    match t.typ {
      TT::Identifier => {
        let name = normalise_identifier(self.str(t.loc)).map_err(|typ| t.error(typ))?;
        Ok((t.loc, name))
      }
      typ if KEYWORDS_MAPPING.contains_key(&typ) => Ok((t.loc, self.string(t.loc))),
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("member access property"))),
    }
  }

  fn primary_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Expr> {
    let t0 = self.peek();
    if is_valid_identifier(t0.typ) {
      return Ok(self.id_expr()?.into());
    };
    if let Some(what) = unsupported_keyword(t0.typ) {
      return Err(t0.error(SyntaxErrorType::UnsupportedSyntax(what)));
    };
    #[rustfmt::skip]
    let expr: Expr = match t0.typ {
      TT::BracketOpen => self.lit_arr(ctx)?.into(),
      TT::BraceOpen => self.lit_obj(ctx)?.into(),
      TT::KeywordFunction => self.func_expr(ctx)?.into(),
      TT::KeywordThis => self.this_expr()?.into(),
      TT::LiteralTrue | TT::LiteralFalse => self.lit_bool()?.into(),
      TT::LiteralNull => self.lit_null()?.into(),
      TT::LiteralNumber => self.lit_num()?.into(),
      TT::LiteralString => self.lit_str()?.into(),
      TT::ParenthesisOpen => self.grouping(ctx)?,
      TT::Slash | TT::SlashEquals => return Err(t0.error(SyntaxErrorType::UnsupportedSyntax("regular expression literal"))),
      TT::EOF => return Err(t0.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t0.error(SyntaxErrorType::ExpectedSyntax("expression operand"))),
    };
    Ok(expr)
  }

  fn expr_operand<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Expr> {
    let t0 = self.peek();
    if let Some(operator) = UNARY_OPERATOR_MAPPING.get(&t0.typ) {
      return Ok(
        self
          .with_loc(|p| {
            p.consume();
            let next_min_prec =
              operator.precedence + (operator.associativity == Associativity::Left) as u8;
            let operand = p.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
            if matches!(
              operator.name,
              OperatorName::PrefixDecrement | OperatorName::PrefixIncrement
            ) && !operand.is_assignment_target()
            {
              return Err(operand.loc().error(SyntaxErrorType::InvalidAssigmentTarget, None));
            };
            Ok(UnaryExpr {
              operator: operator.name,
              argument: operand,
            })
          })?
          .into(),
      );
    };
    if t0.typ == TT::KeywordNew {
      return Ok(self.new_expr(ctx)?.into());
    };
    self.primary_expr(ctx)
  }

  pub fn expr_with_min_prec<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Expr> {
    let mut left = self.expr_operand(ctx, terminators, asi)?;

    loop {
      let cp = self.checkpoint();
      let t = self.consume();

      if terminators.contains(&t.typ) || (t.typ == TT::KeywordIn && !ctx.in_allowed) {
        self.restore_checkpoint(cp);
        break;
      };

      match t.typ {
        // Automatic Semicolon Insertion rules: no newline between operand and postfix operator.
        TT::PlusPlus | TT::HyphenHyphen if !t.preceded_by_line_terminator => {
          let operator_name = if t.typ == TT::PlusPlus {
            OperatorName::PostfixIncrement
          } else {
            OperatorName::PostfixDecrement
          };
          let operator = &OPERATORS[&operator_name];
          if operator.precedence < min_prec {
            self.restore_checkpoint(cp);
            break;
          };
          if !left.is_assignment_target() {
            return Err(left.loc().error(SyntaxErrorType::InvalidAssigmentTarget, None));
          };
          left = Node::new(left.loc() + t.loc, UnaryPostfixExpr {
            operator: operator_name,
            argument: left,
          })
          .into();
          continue;
        }
        _ => {}
      };

      match MULTARY_OPERATOR_MAPPING.get(&t.typ) {
        None => {
          if asi.can_end_with_asi
            && (t.preceded_by_line_terminator || t.typ == TT::BraceClose || t.typ == TT::EOF)
          {
            // Automatic Semicolon Insertion.
            self.restore_checkpoint(cp);
            asi.did_end_with_asi = true;
            break;
          };
          if t.typ == TT::EOF {
            // Let the caller report which token it required.
            self.restore_checkpoint(cp);
            break;
          };
          return Err(t.error(SyntaxErrorType::ExpectedSyntax("expression operator")));
        }
        Some(operator) => {
          if operator.precedence < min_prec {
            self.restore_checkpoint(cp);
            break;
          };

          let next_min_prec =
            operator.precedence + (operator.associativity == Associativity::Left) as u8;

          left = match operator.name {
            OperatorName::Call => {
              let arguments = self.call_args(ctx)?;
              let end = self.require(TT::ParenthesisClose)?;
              Node::new(left.loc() + end.loc, CallExpr {
                callee: left,
                arguments,
              })
              .into()
            }
            OperatorName::ComputedMemberAccess => {
              let member = self.expr(ctx.with_in_allowed(true), [TT::BracketClose])?;
              let end = self.require(TT::BracketClose)?;
              Node::new(left.loc() + end.loc, ComputedMemberExpr {
                object: left,
                member,
              })
              .into()
            }
            OperatorName::Conditional => {
              let consequent = self.expr(ctx.with_in_allowed(true), [TT::Colon])?;
              self.require(TT::Colon)?;
              let alternate = self.expr_with_min_prec(
                ctx,
                OPERATORS[&OperatorName::ConditionalAlternate].precedence,
                terminators,
                asi,
              )?;
              Node::new(left.loc() + alternate.loc(), CondExpr {
                test: left,
                consequent,
                alternate,
              })
              .into()
            }
            OperatorName::MemberAccess => {
              let (right_loc, right) = self.member_name()?;
              Node::new(left.loc() + right_loc, MemberExpr { left, right }).into()
            }
            _ => {
              if operator.name.is_assignment() && !left.is_assignment_target() {
                return Err(left.loc().error(SyntaxErrorType::InvalidAssigmentTarget, None));
              };
              let right = self.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
              Node::new(left.loc() + right.loc(), BinaryExpr {
                operator: operator.name,
                left,
                right,
              })
              .into()
            }
          };
        }
      };
    }

    Ok(left)
  }
}
