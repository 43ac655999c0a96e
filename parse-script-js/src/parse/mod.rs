use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

pub mod drive;
pub mod expr;
pub mod func;
pub mod operator;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod toplevel;

// Almost every parse_* function takes this as a parameter. It should be received as a value, not a reference, and altered copies are made with the with_* methods instead of mutating and unwinding.
#[derive(Clone, Copy)]
pub struct ParseCtx {
  // False only directly inside a `for (...)` head before the first `;`, where `in` starts a for-in loop instead of being a binary operator.
  pub in_allowed: bool,
}

impl ParseCtx {
  pub fn new() -> ParseCtx {
    ParseCtx { in_allowed: true }
  }

  pub fn with_in_allowed(&self, in_allowed: bool) -> ParseCtx {
    ParseCtx { in_allowed, ..*self }
  }
}

impl Default for ParseCtx {
  fn default() -> Self {
    ParseCtx::new()
  }
}

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }

  pub fn and_then<R, F: FnOnce() -> SyntaxResult<R>>(self, f: F) -> SyntaxResult<Option<R>> {
    Ok(if self.matched { Some(f()?) } else { None })
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  // Tokens are lexed once and kept, so restoring a checkpoint never re-lexes.
  buf: Vec<Token>,
  next_tok_i: usize,
}

// Parsing functions are methods on Parser, spread across the submodules, rather than free functions taking `&mut Parser`.
impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
    }
  }

  pub fn source_range(&self) -> Loc {
    self.lexer.source_range()
  }

  pub fn str(&self, loc: Loc) -> &str {
    &self.lexer[loc]
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  /// The range from the start of the first token consumed after `checkpoint` to the end of the last consumed token.
  pub fn since_checkpoint(&self, checkpoint: &ParserCheckpoint) -> Loc {
    let start = match self.buf.get(checkpoint.next_tok_i) {
      Some(t) => t.loc.0,
      None => self.lexer.next(),
    };
    let end = match self.next_tok_i.checked_sub(1).and_then(|i| self.buf.get(i)) {
      Some(t) if self.next_tok_i > checkpoint.next_tok_i => t.loc.1,
      _ => start,
    };
    Loc(start, end)
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, keep: K) -> (bool, Token) {
    while self.buf.len() <= self.next_tok_i {
      let token = lex_next(&mut self.lexer);
      self.buf.push(token);
    }
    let t = self.buf[self.next_tok_i].clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume(&mut self) -> Token {
    self.forward(|_| true).1
  }

  pub fn peek(&mut self) -> Token {
    self.forward(|_| false).1
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let cp = self.checkpoint();
    let a = self.forward(|_| true);
    let b = self.forward(|_| true);
    self.restore_checkpoint(cp);
    (a.1, b.1)
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    let (matched, t) = self.forward(|t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    let t = self.consume();
    if t.typ != typ {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume();
    if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }
}
