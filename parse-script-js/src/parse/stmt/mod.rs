pub mod decl;

use super::expr::is_valid_identifier;
use super::expr::Asi;
use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::DebuggerStmt;
use crate::ast::stmt::DoWhileStmt;
use crate::ast::stmt::EmptyStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForInLhs;
use crate::ast::stmt::ForInStmt;
use crate::ast::stmt::ForTripleStmt;
use crate::ast::stmt::ForTripleStmtInit;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::LabelStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchBranch;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::ThrowStmt;
use crate::ast::stmt::TryStmt;
use crate::ast::stmt::WhileStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Consumes a `;`, or accepts its absence where automatic semicolon insertion applies.
  fn require_semicolon(&mut self, asi: &Asi) -> SyntaxResult<()> {
    if self.consume_if(TT::Semicolon).is_match() || asi.did_end_with_asi {
      return Ok(());
    };
    let t = self.peek();
    if t.preceded_by_line_terminator || matches!(t.typ, TT::BraceClose | TT::EOF) {
      return Ok(());
    };
    Err(t.error(SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon)))
  }

  /// Whether the next token can't continue a restricted production such as `return` or `break`.
  fn at_statement_end(&mut self) -> bool {
    let t = self.peek();
    t.preceded_by_line_terminator || matches!(t.typ, TT::Semicolon | TT::BraceClose | TT::EOF)
  }

  /// Whether `let` at the current position starts a declaration rather than being used as an identifier.
  fn is_let_decl(&mut self) -> bool {
    let (t0, t1) = self.peek_2();
    t0.typ == TT::KeywordLet && is_valid_identifier(t1.typ)
  }

  pub fn stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Stmt> {
    let (t0, t1) = self.peek_2();
    #[rustfmt::skip]
    let stmt: Stmt = match t0.typ {
      TT::BraceOpen => self.block_stmt(ctx)?.into(),
      TT::KeywordBreak => self.break_stmt()?.into(),
      TT::KeywordConst | TT::KeywordVar => self.var_stmt(ctx)?,
      TT::KeywordLet if is_valid_identifier(t1.typ) => self.var_stmt(ctx)?,
      TT::KeywordContinue => self.continue_stmt()?.into(),
      TT::KeywordDebugger => self.debugger_stmt()?.into(),
      TT::KeywordDo => self.do_while_stmt(ctx)?.into(),
      TT::KeywordFor => self.for_stmt(ctx)?,
      TT::KeywordFunction => self.func_decl(ctx)?.into(),
      TT::KeywordIf => self.if_stmt(ctx)?.into(),
      TT::KeywordReturn => self.return_stmt(ctx)?.into(),
      TT::KeywordSwitch => self.switch_stmt(ctx)?.into(),
      TT::KeywordThrow => self.throw_stmt(ctx)?.into(),
      TT::KeywordTry => self.try_stmt(ctx)?.into(),
      TT::KeywordWhile => self.while_stmt(ctx)?.into(),
      TT::Semicolon => self.empty_stmt()?.into(),
      TT::KeywordClass => return Err(t0.error(SyntaxErrorType::UnsupportedSyntax("class"))),
      TT::KeywordExport | TT::KeywordImport => return Err(t0.error(SyntaxErrorType::UnsupportedSyntax("modules"))),
      TT::KeywordWith => return Err(t0.error(SyntaxErrorType::UnsupportedSyntax("with"))),
      t if is_valid_identifier(t) && t1.typ == TT::Colon => self.label_stmt(ctx)?.into(),
      _ => self.expr_stmt(ctx)?.into(),
    };
    Ok(stmt)
  }

  fn var_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Stmt> {
    let mut asi = Asi::can();
    let mut decl = self.var_decl(ctx, &mut asi)?;
    self.require_semicolon(&asi)?;
    if let Some(t) = self.buf.get(self.next_tok_i.wrapping_sub(1)) {
      decl.loc.extend(t.loc);
    };
    Ok(decl.into())
  }

  pub fn block_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<BlockStmt>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let body = p.repeat_until_tt(TT::BraceClose, |p| p.stmt(ctx))?;
      p.require(TT::BraceClose)?;
      Ok(BlockStmt { body })
    })
  }

  fn label_name(&mut self) -> SyntaxResult<Option<String>> {
    let t = self.peek();
    if is_valid_identifier(t.typ) && !t.preceded_by_line_terminator {
      Ok(Some(self.id_name()?))
    } else {
      Ok(None)
    }
  }

  pub fn break_stmt(&mut self) -> SyntaxResult<Node<BreakStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordBreak)?;
      let label = p.label_name()?;
      p.require_semicolon(&Asi::no())?;
      Ok(BreakStmt { label })
    })
  }

  pub fn continue_stmt(&mut self) -> SyntaxResult<Node<ContinueStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordContinue)?;
      let label = p.label_name()?;
      p.require_semicolon(&Asi::no())?;
      Ok(ContinueStmt { label })
    })
  }

  pub fn debugger_stmt(&mut self) -> SyntaxResult<Node<DebuggerStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDebugger)?;
      p.require_semicolon(&Asi::no())?;
      Ok(DebuggerStmt {})
    })
  }

  pub fn do_while_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<DoWhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDo)?;
      let body = p.stmt(ctx)?;
      p.require(TT::KeywordWhile)?;
      let condition = p.grouping(ctx)?;
      // A semicolon is always inserted after the closing parenthesis if missing.
      let _ = p.consume_if(TT::Semicolon);
      Ok(DoWhileStmt { condition, body })
    })
  }

  pub fn empty_stmt(&mut self) -> SyntaxResult<Node<EmptyStmt>> {
    self.with_loc(|p| {
      p.require(TT::Semicolon)?;
      Ok(EmptyStmt {})
    })
  }

  pub fn expr_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ExprStmt>> {
    self.with_loc(|p| {
      let mut asi = Asi::can();
      let expr = p.expr_with_asi(ctx, [TT::Semicolon], &mut asi)?;
      p.require_semicolon(&asi)?;
      Ok(ExprStmt { expr })
    })
  }

  /// Parses both `for (init; cond; post)` and `for (lhs in rhs)`.
  pub fn for_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Stmt> {
    let head_ctx = ctx.with_in_allowed(false);
    let node = self.with_loc(|p| {
      p.require(TT::KeywordFor)?;
      p.require(TT::ParenthesisOpen)?;
      let t0 = p.peek();
      let is_decl = matches!(t0.typ, TT::KeywordVar | TT::KeywordConst) || p.is_let_decl();

      let init = if is_decl {
        // `for (var x in ...)` has a single declarator without an initializer.
        let cp = p.checkpoint();
        let mode = p.var_decl_mode()?;
        let name = p.id_name()?;
        if p.consume_if(TT::KeywordIn).is_match() {
          return p.for_in_rest(ctx, ForInLhs::Decl { mode, name });
        };
        p.restore_checkpoint(cp);
        ForTripleStmtInit::Decl(p.var_decl(head_ctx, &mut Asi::no())?)
      } else if t0.typ == TT::Semicolon {
        ForTripleStmtInit::None
      } else {
        let expr = p.expr(head_ctx, [TT::Semicolon])?;
        if p.peek().typ == TT::KeywordIn {
          if !expr.is_assignment_target() {
            return Err(expr.loc().error(SyntaxErrorType::InvalidAssigmentTarget, None));
          };
          p.consume();
          return p.for_in_rest(ctx, ForInLhs::Assign(expr));
        };
        ForTripleStmtInit::Expr(expr)
      };
      p.require(TT::Semicolon)?;
      let cond = if p.peek().typ == TT::Semicolon {
        None
      } else {
        Some(p.expr(ctx, [TT::Semicolon])?)
      };
      p.require(TT::Semicolon)?;
      let post = if p.peek().typ == TT::ParenthesisClose {
        None
      } else {
        Some(p.expr(ctx, [TT::ParenthesisClose])?)
      };
      p.require(TT::ParenthesisClose)?;
      let body = p.stmt(ctx)?;
      Ok(ForTripleStmt {
        init,
        cond,
        post,
        body,
      }
      .into())
    })?;
    Ok(for_stmt_into_stmt(node))
  }

  fn for_in_rest(&mut self, ctx: ParseCtx, lhs: ForInLhs) -> SyntaxResult<ForStmt> {
    let rhs = self.expr(ctx, [TT::ParenthesisClose])?;
    self.require(TT::ParenthesisClose)?;
    let body = self.stmt(ctx)?;
    Ok(ForInStmt { lhs, rhs, body }.into())
  }

  pub fn if_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<IfStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordIf)?;
      let test = p.grouping(ctx)?;
      let consequent = p.stmt(ctx)?;
      let alternate = p
        .consume_if(TT::KeywordElse)
        .and_then(|| p.stmt(ctx))?;
      Ok(IfStmt {
        test,
        consequent,
        alternate,
      })
    })
  }

  pub fn label_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LabelStmt>> {
    self.with_loc(|p| {
      let name = p.id_name()?;
      p.require(TT::Colon)?;
      let statement = p.stmt(ctx)?;
      Ok(LabelStmt { name, statement })
    })
  }

  pub fn return_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ReturnStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordReturn)?;
      let mut asi = Asi::can();
      let value = if p.at_statement_end() {
        None
      } else {
        Some(p.expr_with_asi(ctx, [TT::Semicolon], &mut asi)?)
      };
      p.require_semicolon(&asi)?;
      Ok(ReturnStmt { value })
    })
  }

  pub fn switch_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<SwitchStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordSwitch)?;
      let test = p.grouping(ctx)?;
      p.require(TT::BraceOpen)?;
      let branches = p.repeat_until_tt(TT::BraceClose, |p| {
        p.with_loc(|p| {
          let case = if p.consume_if(TT::KeywordDefault).is_match() {
            None
          } else {
            p.require(TT::KeywordCase)?;
            Some(p.expr(ctx, [TT::Colon])?)
          };
          p.require(TT::Colon)?;
          let body = p.repeat_while(
            |p| {
              !matches!(
                p.peek().typ,
                TT::KeywordCase | TT::KeywordDefault | TT::BraceClose | TT::EOF
              )
            },
            |p| p.stmt(ctx),
          )?;
          Ok(SwitchBranch { case, body })
        })
      })?;
      p.require(TT::BraceClose)?;
      Ok(SwitchStmt { test, branches })
    })
  }

  pub fn throw_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ThrowStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordThrow)?;
      if p.peek().preceded_by_line_terminator {
        return Err(start.error(SyntaxErrorType::LineTerminatorAfterThrow));
      };
      let mut asi = Asi::can();
      let value = p.expr_with_asi(ctx, [TT::Semicolon], &mut asi)?;
      p.require_semicolon(&asi)?;
      Ok(ThrowStmt { value })
    })
  }

  pub fn try_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<TryStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordTry)?;
      let wrapped = p.block_stmt(ctx)?;
      let catch = p.consume_if(TT::KeywordCatch).and_then(|| {
        p.with_loc(|p| {
          let parameter = p
            .consume_if(TT::ParenthesisOpen)
            .and_then(|| {
              let name = p.id_name()?;
              p.require(TT::ParenthesisClose)?;
              Ok(name)
            })?;
          let body = p.block_stmt(ctx)?;
          Ok(CatchBlock {
            parameter,
            body: body.stx.body,
          })
        })
      })?;
      let finally = p
        .consume_if(TT::KeywordFinally)
        .and_then(|| p.block_stmt(ctx))?;
      if catch.is_none() && finally.is_none() {
        return Err(start.error(SyntaxErrorType::TryStatementHasNoCatchOrFinally));
      };
      Ok(TryStmt {
        wrapped,
        catch,
        finally,
      })
    })
  }

  pub fn while_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<WhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordWhile)?;
      let condition = p.grouping(ctx)?;
      let body = p.stmt(ctx)?;
      Ok(WhileStmt { condition, body })
    })
  }
}

/// The two shapes a `for` statement can take, before being wrapped into a `Stmt`.
enum ForStmt {
  In(ForInStmt),
  Triple(ForTripleStmt),
}

impl From<ForInStmt> for ForStmt {
  fn from(value: ForInStmt) -> Self {
    ForStmt::In(value)
  }
}

impl From<ForTripleStmt> for ForStmt {
  fn from(value: ForTripleStmt) -> Self {
    ForStmt::Triple(value)
  }
}

fn for_stmt_into_stmt(node: Node<ForStmt>) -> Stmt {
  let loc = node.loc;
  match *node.stx {
    ForStmt::In(stx) => Node::new(loc, stx).into(),
    ForStmt::Triple(stx) => Node::new(loc, stx).into(),
  }
}

