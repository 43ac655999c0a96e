use crate::ast::expr::LitArrElem;
use crate::ast::expr::LitArrExpr;
use crate::ast::expr::LitBoolExpr;
use crate::ast::expr::LitNullExpr;
use crate::ast::expr::LitNumExpr;
use crate::ast::expr::LitObjExpr;
use crate::ast::expr::LitStrExpr;
use crate::ast::expr::ObjMember;
use crate::ast::expr::ObjMemberKey;
use crate::ast::node::Node;
use crate::char::is_line_terminator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::num::JsNumber;
use crate::parse::ParseCtx;
use crate::parse::Parser;
use crate::token::TT;
use std::iter::Peekable;
use std::str::Chars;

fn read_hex_digits(chars: &mut Peekable<Chars>, n: usize) -> Result<u32, SyntaxErrorType> {
  let mut value = 0u32;
  for _ in 0..n {
    let digit = chars
      .next()
      .and_then(|c| c.to_digit(16))
      .ok_or(SyntaxErrorType::InvalidCharacterEscape)?;
    value = value * 16 + digit;
  }
  Ok(value)
}

/// Reads the code unit or code point after `\u`, which has already been consumed.
fn read_unicode_escape(chars: &mut Peekable<Chars>) -> Result<u32, SyntaxErrorType> {
  if chars.peek() == Some(&'{') {
    chars.next();
    let mut value = 0u32;
    let mut len = 0;
    loop {
      match chars.next() {
        Some('}') if len > 0 => break,
        Some(c) => {
          let digit = c.to_digit(16).ok_or(SyntaxErrorType::InvalidCharacterEscape)?;
          value = value
            .checked_mul(16)
            .map(|v| v + digit)
            .filter(|v| *v <= 0x10FFFF)
            .ok_or(SyntaxErrorType::InvalidCharacterEscape)?;
          len += 1;
        }
        None => return Err(SyntaxErrorType::InvalidCharacterEscape),
      };
    }
    Ok(value)
  } else {
    read_hex_digits(chars, 4)
  }
}

// Strings are stored as UTF-8, so surrogate halves that don't form a pair become U+FFFD.
fn push_code_unit(out: &mut String, pending_high: &mut Option<u32>, unit: u32) {
  if let Some(high) = pending_high.take() {
    if (0xDC00..=0xDFFF).contains(&unit) {
      let cp = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
      out.push(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER));
      return;
    };
    out.push(char::REPLACEMENT_CHARACTER);
  };
  if (0xD800..=0xDBFF).contains(&unit) {
    *pending_high = Some(unit);
  } else {
    out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
  };
}

/// Decodes the contents of a string literal token, including its quotes.
pub fn normalise_literal_string(raw: &str) -> Result<String, SyntaxErrorType> {
  let inner = raw
    .get(1..raw.len().saturating_sub(1))
    .ok_or(SyntaxErrorType::ExpectedSyntax("string literal"))?;
  let mut out = String::with_capacity(inner.len());
  let mut pending_high: Option<u32> = None;
  let mut chars = inner.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '\\' {
      if is_line_terminator(c) && c != '\u{2028}' && c != '\u{2029}' {
        return Err(SyntaxErrorType::LineTerminatorInString);
      };
      if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
      };
      out.push(c);
      continue;
    };
    let Some(e) = chars.next() else {
      return Err(SyntaxErrorType::InvalidCharacterEscape);
    };
    let unit = match e {
      'b' => 0x08,
      'f' => 0x0c,
      'n' => 0x0a,
      'r' => 0x0d,
      't' => 0x09,
      'v' => 0x0b,
      'x' => read_hex_digits(&mut chars, 2)?,
      'u' => read_unicode_escape(&mut chars)?,
      '0'..='7' => {
        // Legacy octal escape of up to three digits, e.g. `\0`, `\101`.
        let mut value = e as u32 - '0' as u32;
        let max_len = if e <= '3' { 3 } else { 2 };
        for _ in 1..max_len {
          match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(d) => {
              value = value * 8 + d;
              chars.next();
            }
            None => break,
          };
        }
        value
      }
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        };
        continue;
      }
      c if is_line_terminator(c) => continue,
      c => c as u32,
    };
    push_code_unit(&mut out, &mut pending_high, unit);
  }
  if pending_high.is_some() {
    out.push(char::REPLACEMENT_CHARACTER);
  };
  Ok(out)
}

/// Decodes `\uXXXX` escapes in an identifier token.
pub fn normalise_identifier(raw: &str) -> Result<String, SyntaxErrorType> {
  if !raw.contains('\\') {
    return Ok(raw.to_string());
  };
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    };
    if chars.next() != Some('u') {
      return Err(SyntaxErrorType::InvalidCharacterEscape);
    };
    let cp = read_unicode_escape(&mut chars)?;
    out.push(char::from_u32(cp).ok_or(SyntaxErrorType::InvalidCharacterEscape)?);
  }
  Ok(out)
}

impl<'a> Parser<'a> {
  pub fn lit_arr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitArrExpr>> {
    let ctx = ctx.with_in_allowed(true);
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<LitArrElem>::new();
      loop {
        if p.consume_if(TT::BracketClose).is_match() {
          break;
        };
        if p.consume_if(TT::Comma).is_match() {
          elements.push(LitArrElem::Empty);
          continue;
        };
        let value = p.expr(ctx, [TT::Comma, TT::BracketClose])?;
        elements.push(LitArrElem::Single(value));
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BracketClose)?;
          break;
        };
      }
      Ok(LitArrExpr { elements })
    })
  }

  fn lit_obj_key(&mut self) -> SyntaxResult<ObjMemberKey> {
    let t = self.consume();
    Ok(match t.typ {
      TT::Identifier => ObjMemberKey::Name(
        normalise_identifier(self.str(t.loc)).map_err(|typ| t.error(typ))?,
      ),
      TT::LiteralString => ObjMemberKey::Name(
        normalise_literal_string(self.str(t.loc)).map_err(|typ| t.error(typ))?,
      ),
      TT::LiteralNumber => ObjMemberKey::Num(
        JsNumber::from_literal(self.str(t.loc))
          .ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralNumber))?,
      ),
      typ if KEYWORDS_MAPPING.contains_key(&typ) => ObjMemberKey::Name(self.string(t.loc)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("object literal key"))),
    })
  }

  pub fn lit_obj(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitObjExpr>> {
    let ctx = ctx.with_in_allowed(true);
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let members = p.list_with_loc(TT::Comma, TT::BraceClose, |p| {
        let (t0, t1) = p.peek_2();
        if t0.typ == TT::Identifier
          && matches!(p.str(t0.loc), "get" | "set")
          && !matches!(t1.typ, TT::Colon | TT::Comma | TT::BraceClose | TT::ParenthesisOpen)
        {
          return Err(t0.error(SyntaxErrorType::UnsupportedSyntax("getters and setters")));
        };
        let key = p.lit_obj_key()?;
        let colon = p.consume_if(TT::Colon);
        if !colon.is_match() {
          return Err(colon.error(SyntaxErrorType::RequiredTokenNotFound(TT::Colon)));
        };
        let value = p.expr(ctx, [TT::Comma, TT::BraceClose])?;
        Ok(ObjMember { key, value })
      })?;
      Ok(LitObjExpr { members })
    })
  }

  pub fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    self.with_loc(|p| {
      let t = p.require_predicate(
        |t| matches!(t, TT::LiteralTrue | TT::LiteralFalse),
        "boolean literal",
      )?;
      Ok(LitBoolExpr {
        value: t.typ == TT::LiteralTrue,
      })
    })
  }

  pub fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    self.with_loc(|p| {
      p.require(TT::LiteralNull)?;
      Ok(LitNullExpr {})
    })
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    self.with_loc(|p| {
      let t = p.require(TT::LiteralNumber)?;
      let value = JsNumber::from_literal(p.str(t.loc))
        .ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralNumber))?;
      Ok(LitNumExpr { value })
    })
  }

  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    self.with_loc(|p| {
      let t = p.require(TT::LiteralString)?;
      let value = normalise_literal_string(p.str(t.loc)).map_err(|typ| t.error(typ))?;
      Ok(LitStrExpr { value })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::normalise_identifier;
  use super::normalise_literal_string;
  use crate::error::SyntaxErrorType;

  #[test]
  fn test_normalise_literal_string() {
    assert_eq!(normalise_literal_string("'abc'").unwrap(), "abc");
    assert_eq!(normalise_literal_string(r#""a\tb\n""#).unwrap(), "a\tb\n");
    assert_eq!(normalise_literal_string(r"'\x41B\u{43}'").unwrap(), "ABC");
    assert_eq!(normalise_literal_string(r"'\uD83D\uDE00'").unwrap(), "\u{1F600}");
    assert_eq!(normalise_literal_string(r"'\uD83Dx'").unwrap(), "\u{FFFD}x");
    assert_eq!(normalise_literal_string(r"'\101\0'").unwrap(), "A\0");
    assert_eq!(normalise_literal_string("'a\\\nb'").unwrap(), "ab");
    assert_eq!(normalise_literal_string(r"'\q'").unwrap(), "q");
    assert_eq!(
      normalise_literal_string(r"'\xZZ'"),
      Err(SyntaxErrorType::InvalidCharacterEscape)
    );
  }

  #[test]
  fn test_normalise_identifier() {
    assert_eq!(normalise_identifier("abc").unwrap(), "abc");
    assert_eq!(normalise_identifier(r"\u0061bc").unwrap(), "abc");
    assert_eq!(normalise_identifier(r"\u{62}"), Ok("b".to_string()));
  }
}
