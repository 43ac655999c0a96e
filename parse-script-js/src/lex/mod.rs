use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::DIGIT_BIN;
use crate::char::DIGIT_HEX;
use crate::char::DIGIT_OCT;
use crate::char::ID_CONTINUE;
use crate::char::ID_CONTINUE_CHARSTR;
use crate::char::ID_START_CHARSTR;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr;
use memchr::memchr3;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
  anchored: bool,
}

impl PatternMatcher {
  pub fn new<D: AsRef<str>>(anchored: bool, patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let byte_syns: Vec<Vec<u8>> = syns.iter().map(|s| s.as_ref().as_bytes().to_vec()).collect();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(if anchored {
        StartKind::Anchored
      } else {
        StartKind::Unanchored
      })
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(byte_syns)
      // The pattern sets are static and known to be valid.
      .unwrap();
    PatternMatcher {
      patterns: tts,
      matcher,
      anchored,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> LexResult<(TT, Match)> {
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(if self.anchored {
        Anchored::Yes
      } else {
        Anchored::No
      }))
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
      .ok_or(LexNotFound)
  }
}

#[derive(Debug)]
struct LexNotFound;

type LexResult<T> = Result<T, LexNotFound>;

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
    }
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.end())
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek(&self, n: usize) -> LexResult<char> {
    self.peek_or_eof(n).ok_or(LexNotFound)
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  fn if_char(&self, c: char) -> Match {
    match self.source[self.next..].chars().next() {
      Some(first) if first == c => Match(c.len_utf8()),
      _ => Match(0),
    }
  }

  fn through_char_or_end(&self, c: char) -> Match {
    memchr(c as u8, self.source[self.next..].as_bytes())
      .map(|pos| Match(pos + 1))
      .unwrap_or_else(|| Match(self.remaining()))
  }

  fn while_not_3_chars(&self, a: char, b: char, c: char) -> Match {
    Match(
      memchr3(a as u8, b as u8, c as u8, self.source[self.next..].as_bytes())
        .unwrap_or(self.remaining()),
    )
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn drive_fallible(
    &mut self,
    preceded_by_line_terminator: bool,
    f: impl FnOnce(&mut Self) -> LexResult<TT>,
  ) -> Token {
    let cp = self.checkpoint();
    let typ = f(self).unwrap_or(TT::Invalid);
    if typ == TT::Invalid && self.next == cp.next {
      // Always make progress so the parser can report the offending character.
      if let Some(c) = self.peek_or_eof(0) {
        self.skip_expect(c.len_utf8());
      }
    }
    Token {
      loc: self.since_checkpoint(cp),
      typ,
      preceded_by_line_terminator,
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::AmpersandAmpersand, "&&");
  map.insert(TT::AmpersandEquals, "&=");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::AsteriskAsterisk, "**");
  map.insert(TT::AsteriskAsteriskEquals, "**=");
  map.insert(TT::AsteriskEquals, "*=");
  map.insert(TT::Bar, "|");
  map.insert(TT::BarBar, "||");
  map.insert(TT::BarEquals, "|=");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::Caret, "^");
  map.insert(TT::CaretEquals, "^=");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronLeft, "<<");
  map.insert(TT::ChevronLeftChevronLeftEquals, "<<=");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightChevronRight, ">>");
  map.insert(TT::ChevronRightChevronRightChevronRight, ">>>");
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, ">>>=");
  map.insert(TT::ChevronRightChevronRightEquals, ">>=");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::EqualsEqualsEquals, "===");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::ExclamationEqualsEquals, "!==");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::HyphenEquals, "-=");
  map.insert(TT::HyphenHyphen, "--");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Percent, "%");
  map.insert(TT::PercentEquals, "%=");
  map.insert(TT::Plus, "+");
  map.insert(TT::PlusEquals, "+=");
  map.insert(TT::PlusPlus, "++");
  map.insert(TT::Question, "?");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map.insert(TT::SlashEquals, "/=");
  map.insert(TT::Tilde, "~");
  map
});

pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordBreak, "break");
  map.insert(TT::KeywordCase, "case");
  map.insert(TT::KeywordCatch, "catch");
  map.insert(TT::KeywordClass, "class");
  map.insert(TT::KeywordConst, "const");
  map.insert(TT::KeywordContinue, "continue");
  map.insert(TT::KeywordDebugger, "debugger");
  map.insert(TT::KeywordDefault, "default");
  map.insert(TT::KeywordDelete, "delete");
  map.insert(TT::KeywordDo, "do");
  map.insert(TT::KeywordElse, "else");
  map.insert(TT::KeywordEnum, "enum");
  map.insert(TT::KeywordExport, "export");
  map.insert(TT::KeywordExtends, "extends");
  map.insert(TT::KeywordFinally, "finally");
  map.insert(TT::KeywordFor, "for");
  map.insert(TT::KeywordFunction, "function");
  map.insert(TT::KeywordIf, "if");
  map.insert(TT::KeywordImport, "import");
  map.insert(TT::KeywordIn, "in");
  map.insert(TT::KeywordInstanceof, "instanceof");
  map.insert(TT::KeywordLet, "let");
  map.insert(TT::KeywordNew, "new");
  map.insert(TT::KeywordReturn, "return");
  map.insert(TT::KeywordSuper, "super");
  map.insert(TT::KeywordSwitch, "switch");
  map.insert(TT::KeywordThis, "this");
  map.insert(TT::KeywordThrow, "throw");
  map.insert(TT::KeywordTry, "try");
  map.insert(TT::KeywordTypeof, "typeof");
  map.insert(TT::KeywordVar, "var");
  map.insert(TT::KeywordVoid, "void");
  map.insert(TT::KeywordWhile, "while");
  map.insert(TT::KeywordWith, "with");
  map.insert(TT::LiteralFalse, "false");
  map.insert(TT::LiteralNull, "null");
  map.insert(TT::LiteralTrue, "true");
  map
});

pub static KEYWORD_STRS: Lazy<HashMap<&'static str, TT>> = Lazy::new(|| {
  HashMap::<&'static str, TT>::from_iter(KEYWORDS_MAPPING.iter().map(|(&k, &v)| (v, k)))
});

#[rustfmt::skip]
static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  for (&k, &v) in KEYWORDS_MAPPING.iter() {
    patterns.push((k, v.into()));
    // Avoid accidentally matching an identifier starting with a keyword as a keyword.
    for c in ID_CONTINUE_CHARSTR.chars() {
      let mut v = v.to_string();
      v.push(c);
      if !KEYWORD_STRS.contains_key(v.as_str()) {
        patterns.push((TT::Identifier, v));
      }
    }
  }
  for c in ID_START_CHARSTR.chars() {
    patterns.push((TT::Identifier, c.to_string()));
  }
  patterns.push((TT::Identifier, "\\".into()));
  for c in "0123456789".chars() {
    patterns.push((TT::LiteralNumber, c.to_string()));
  }
  patterns.push((TT::LiteralNumberBin, "0b".into()));
  patterns.push((TT::LiteralNumberBin, "0B".into()));
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  patterns.push((TT::LiteralNumberOct, "0o".into()));
  patterns.push((TT::LiteralNumberOct, "0O".into()));
  // Prevent `.` immediately followed by a digit from being recognised as the `.` operator.
  for digit in '0'..='9' {
    patterns.push((TT::LiteralNumber, format!(".{}", digit)));
  }
  patterns.push((TT::LiteralString, "\"".into()));
  patterns.push((TT::LiteralString, "'".into()));

  PatternMatcher::new(true, patterns)
});

static ML_COMMENT: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(false, vec![
    (TT::CommentMultilineEnd, "*/"),
    (TT::LineTerminator, "\r"),
    (TT::LineTerminator, "\n"),
    (TT::LineTerminator, "\u{2028}"),
    (TT::LineTerminator, "\u{2029}"),
  ])
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(
    true,
    vec![
      (TT::LineTerminator, "\r"),
      (TT::LineTerminator, "\n"),
      (TT::LineTerminator, "\u{2028}"),
      (TT::LineTerminator, "\u{2029}"),
      (TT::Whitespace, "\x09"),
      (TT::Whitespace, "\x0b"),
      (TT::Whitespace, "\x0c"),
      (TT::Whitespace, "\x20"),
      (TT::Whitespace, "\u{00A0}"),
      (TT::Whitespace, "\u{1680}"),
      (TT::Whitespace, "\u{2000}"),
      (TT::Whitespace, "\u{2001}"),
      (TT::Whitespace, "\u{2002}"),
      (TT::Whitespace, "\u{2003}"),
      (TT::Whitespace, "\u{2004}"),
      (TT::Whitespace, "\u{2005}"),
      (TT::Whitespace, "\u{2006}"),
      (TT::Whitespace, "\u{2007}"),
      (TT::Whitespace, "\u{2008}"),
      (TT::Whitespace, "\u{2009}"),
      (TT::Whitespace, "\u{200A}"),
      (TT::Whitespace, "\u{202F}"),
      (TT::Whitespace, "\u{205F}"),
      (TT::Whitespace, "\u{3000}"),
      (TT::Whitespace, "\u{FEFF}"),
      (TT::CommentMultiline, "/*"),
      (TT::CommentSingle, "//"),
    ],
  )
});

/// Returns whether the comment includes a line terminator.
fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> bool {
  // Consume `/*`.
  lexer.skip_expect(2);
  let mut contains_newline = false;
  loop {
    let (tt, mat) = ML_COMMENT
      .find(lexer)
      // An unterminated comment runs to the end of the source.
      .unwrap_or((TT::EOF, Match(lexer.remaining())));
    lexer.consume(mat);
    match tt {
      TT::LineTerminator => contains_newline = true,
      _ => break,
    };
  }
  contains_newline
}

fn lex_single_comment(lexer: &mut Lexer<'_>) {
  lexer.skip_expect(2);
  // WARNING: Does not consider U+2028/U+2029 as comment terminators.
  lexer.consume(lexer.through_char_or_end('\n'));
}

fn lex_unicode_escape(lexer: &mut Lexer<'_>) -> LexResult<()> {
  // We're at '\', consume it.
  lexer.skip_expect(1);
  if lexer.peek(0)? != 'u' {
    return Err(LexNotFound);
  }
  lexer.skip_expect(1);
  if lexer.peek_or_eof(0) == Some('{') {
    lexer.skip_expect(1);
    if lexer.consume(lexer.while_chars(&DIGIT_HEX)).is_empty() || lexer.peek(0)? != '}' {
      return Err(LexNotFound);
    }
    lexer.skip_expect(1);
  } else {
    for _ in 0..4 {
      if !DIGIT_HEX.has(lexer.peek(0)?) {
        return Err(LexNotFound);
      }
      lexer.skip_expect(1);
    }
  }
  Ok(())
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let starter = lexer.peek(0)?;
  if starter == '\\' {
    lex_unicode_escape(lexer)?;
  } else {
    lexer.skip_expect(starter.len_utf8());
  }
  loop {
    lexer.consume(lexer.while_chars(&ID_CONTINUE));
    match lexer.peek_or_eof(0) {
      Some('\\') => lex_unicode_escape(lexer)?,
      // We assume a non-ASCII character is an identifier continue code point.
      Some(c) if !c.is_ascii() && !crate::char::is_whitespace(c) && !crate::char::is_line_terminator(c) => {
        lexer.skip_expect(c.len_utf8());
      }
      _ => break,
    }
  }
  Ok(TT::Identifier)
}

fn lex_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  lexer.consume(lexer.while_chars(&DIGIT));
  if !lexer.consume(lexer.if_char('.')).is_empty() {
    lexer.consume(lexer.while_chars(&DIGIT));
  }
  if matches!(lexer.peek_or_eof(0), Some('e' | 'E')) {
    lexer.skip_expect(1);
    if matches!(lexer.peek(0)?, '+' | '-') {
      lexer.skip_expect(1);
    }
    if lexer.consume(lexer.while_chars(&DIGIT)).is_empty() {
      return Ok(TT::Invalid);
    }
  }
  Ok(TT::LiteralNumber)
}

fn lex_radix_number(lexer: &mut Lexer<'_>, digits: &CharFilter) -> TT {
  lexer.skip_expect(2);
  if lexer.consume(lexer.while_chars(digits)).is_empty() {
    return TT::Invalid;
  }
  TT::LiteralNumber
}

fn lex_string(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let quote = lexer.peek(0)?;
  lexer.skip_expect(1);
  loop {
    lexer.consume(lexer.while_not_3_chars('\\', '\n', quote));
    match lexer.peek(0)? {
      '\\' => {
        lexer.skip_expect(1);
        let escaped = lexer.peek(0)?;
        lexer.skip_expect(escaped.len_utf8());
        if escaped == '\r' && lexer.peek_or_eof(0) == Some('\n') {
          lexer.skip_expect(1);
        }
      }
      '\n' => return Ok(TT::Invalid),
      _ => {
        lexer.skip_expect(1);
        break;
      }
    };
  }
  Ok(TT::LiteralString)
}

pub fn lex_next(lexer: &mut Lexer<'_>) -> Token {
  let mut preceded_by_line_terminator = false;
  while let Ok((tt, mat)) = INSIG.find(lexer) {
    match tt {
      TT::LineTerminator => {
        lexer.consume(mat);
        preceded_by_line_terminator = true;
      }
      TT::Whitespace => {
        lexer.consume(mat);
      }
      TT::CommentMultiline => {
        preceded_by_line_terminator |= lex_multiline_comment(lexer);
      }
      _ => {
        // A single-line comment always ends with a line terminator.
        preceded_by_line_terminator = true;
        lex_single_comment(lexer);
      }
    };
  }

  // EOF is different from Invalid, so we emit this specifically instead of letting drive_fallible return an Invalid.
  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
      preceded_by_line_terminator,
    };
  };

  lexer.drive_fallible(preceded_by_line_terminator, |lexer| {
    if lexer.peek_or_eof(0).is_some_and(|c| !c.is_ascii()) {
      return lex_identifier(lexer);
    }
    SIG.find(lexer).and_then(|(tt, mat)| match tt {
      TT::Identifier => lex_identifier(lexer),
      TT::LiteralNumber => lex_number(lexer),
      TT::LiteralNumberBin => Ok(lex_radix_number(lexer, &DIGIT_BIN)),
      TT::LiteralNumberHex => Ok(lex_radix_number(lexer, &DIGIT_HEX)),
      TT::LiteralNumberOct => Ok(lex_radix_number(lexer, &DIGIT_OCT)),
      TT::LiteralString => lex_string(lexer),
      typ => {
        lexer.consume(mat);
        Ok(typ)
      }
    })
  })
}
