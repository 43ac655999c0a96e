use super::Parser;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TT;

#[test]
fn test_parser() {
  let lexer = Lexer::new("let x = 1 / 2;");
  let mut p = Parser::new(lexer);
  // Initial state.
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  // Peek the first token.
  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the first token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the second token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 2);
  assert_eq!(p.buf.len(), 2);
  assert_eq!(t.typ, TT::Identifier);
  assert_eq!(p.since_checkpoint(&cp), Loc(0, 5));

  // Reset to a past point; buffered tokens are kept.
  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 2);
  let (a, b) = p.peek_2();
  assert_eq!((a.typ, b.typ), (TT::KeywordLet, TT::Identifier));
  assert_eq!(p.next_tok_i, 0);
}

#[test]
fn test_consume_if() {
  let mut p = Parser::new(Lexer::new("( )"));
  assert!(!p.consume_if(TT::BracketOpen).is_match());
  assert_eq!(p.consume_if(TT::ParenthesisOpen).match_loc(), Some(Loc(0, 1)));
  assert!(p.require(TT::BraceClose).is_err());
}
