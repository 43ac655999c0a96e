use crate::lex::lex_next;
use crate::lex::Lexer;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer);
    assert_eq!(t.typ, expected);
  }
  let t = lex_next(&mut lexer);
  assert_eq!(EOF, t.typ);
}

#[test]
fn test_lex_keywords() {
  check("function", [KeywordFunction]);
  check("instanceof", [KeywordInstanceof]);
  check("let const var", [KeywordLet, KeywordConst, KeywordVar]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("iffy", [Identifier]);
  check("$_x", [Identifier]);
  check("\\u0061bc", [Identifier]);
  check("caf\u{e9}", [Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralNumber]);
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929", [Dot, LiteralNumber]);
  check(".929.2..", [LiteralNumber, LiteralNumber, Dot, Dot]);
  check("1.5e+3", [LiteralNumber]);
  check("0xFF 0b10 0o17", [LiteralNumber, LiteralNumber, LiteralNumber]);
  check("1..toString", [LiteralNumber, Dot, Identifier]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("\"it's\"", [LiteralString]);
  check("'a\\'b'", [LiteralString]);
  check("'line\\\ncontinued'", [LiteralString]);
  check("'hello world\n'", [Invalid, Invalid]);
}

#[test]
fn test_lex_operators() {
  check(">>>= >>> >>= >=", [
    ChevronRightChevronRightChevronRightEquals,
    ChevronRightChevronRightChevronRight,
    ChevronRightChevronRightEquals,
    ChevronRightEquals,
  ]);
  check("a===b", [Identifier, EqualsEqualsEquals, Identifier]);
  check("x**=2", [Identifier, AsteriskAsteriskEquals, LiteralNumber]);
}

#[test]
fn test_lex_comments_and_line_terminators() {
  let mut lexer = Lexer::new("a // comment\nb /* x\n */ c /* y */ d");
  assert!(!lex_next(&mut lexer).preceded_by_line_terminator);
  let b = lex_next(&mut lexer);
  assert_eq!(b.typ, Identifier);
  assert!(b.preceded_by_line_terminator);
  let c = lex_next(&mut lexer);
  assert!(c.preceded_by_line_terminator);
  let d = lex_next(&mut lexer);
  assert_eq!(d.typ, Identifier);
  assert!(!d.preceded_by_line_terminator);
  assert_eq!(lex_next(&mut lexer).typ, EOF);
}
