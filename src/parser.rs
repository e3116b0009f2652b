//! Regular-expression parser.
//!
//! Recursive descent over the pattern bytes with the usual precedence:
//! repetition binds tighter than concatenation, which binds tighter than
//! alternation. Supported syntax: literals, escapes (`\n`, `\t`, `\r`,
//! `\xHH`, and identity escapes for metacharacters), `.`, character classes
//! `[a-z0-9]` / `[^...]` / the empty class `[]`, grouping `()`, `|`, and the
//! repetition operators `*`, `+`, `?`, `{m}`, `{m,}`, `{m,n}`.

use crate::error::Error;
use crate::range::{self, CharRange};

/// Abstract syntax tree of a regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// Matches nothing at all (the empty language), e.g. `[]`.
    Empty,
    /// Matches only the empty string, e.g. `()`.
    Epsilon,
    /// Matches any single byte in one of the (normalized) ranges.
    Class(Vec<CharRange>),
    Concat(Box<Ast>, Box<Ast>),
    Alt(Box<Ast>, Box<Ast>),
    Repeat {
        inner: Box<Ast>,
        min: u32,
        /// `None` means unbounded.
        max: Option<u32>,
    },
}

/// Parse a pattern into an AST.
pub fn parse(pattern: &str) -> Result<Ast, Error> {
    let mut p = Parser {
        input: pattern.as_bytes(),
        pos: 0,
    };
    let ast = p.alternation()?;
    match p.peek() {
        None => Ok(ast),
        Some(b')') => Err(Error::syntax(p.pos, "unmatched ')'")),
        Some(c) => Err(Error::syntax(p.pos, format!("unexpected '{}'", c as char))),
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn alternation(&mut self) -> Result<Ast, Error> {
        let mut node = self.concatenation()?;
        while self.peek() == Some(b'|') {
            self.bump();
            let rhs = self.concatenation()?;
            node = Ast::Alt(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn concatenation(&mut self) -> Result<Ast, Error> {
        let mut node: Option<Ast> = None;
        while !matches!(self.peek(), None | Some(b'|') | Some(b')')) {
            let factor = self.repetition()?;
            node = Some(match node {
                Some(lhs) => Ast::Concat(Box::new(lhs), Box::new(factor)),
                None => factor,
            });
        }
        // An empty branch, as in `a|` or `()`, matches the empty string.
        Ok(node.unwrap_or(Ast::Epsilon))
    }

    fn repetition(&mut self) -> Result<Ast, Error> {
        let mut node = self.atom()?;
        loop {
            let (min, max) = match self.peek() {
                Some(b'*') => (0, None),
                Some(b'+') => (1, None),
                Some(b'?') => (0, Some(1)),
                Some(b'{') => {
                    self.bump();
                    let bounds = self.bounds()?;
                    node = Ast::Repeat {
                        inner: Box::new(node),
                        min: bounds.0,
                        max: bounds.1,
                    };
                    continue;
                }
                _ => break,
            };
            self.bump();
            node = Ast::Repeat {
                inner: Box::new(node),
                min,
                max,
            };
        }
        Ok(node)
    }

    fn atom(&mut self) -> Result<Ast, Error> {
        let start = self.pos;
        let Some(b) = self.bump() else {
            return Err(Error::syntax(start, "unexpected end of pattern"));
        };
        match b {
            b'(' => {
                if self.peek() == Some(b')') {
                    self.bump();
                    return Ok(Ast::Epsilon);
                }
                let node = self.alternation()?;
                if self.bump() != Some(b')') {
                    return Err(Error::syntax(start, "unbalanced '('"));
                }
                Ok(node)
            }
            b'[' => self.class(start),
            b'.' => Ok(Ast::Class(vec![CharRange::full()])),
            b'\\' => {
                let byte = self.escape(start)?;
                Ok(Ast::Class(vec![CharRange::single(byte)]))
            }
            b'*' | b'+' | b'?' | b'{' => Err(Error::syntax(
                start,
                format!("'{}' with nothing to repeat", b as char),
            )),
            _ => Ok(Ast::Class(vec![CharRange::single(b)])),
        }
    }

    /// Resolve the byte after a backslash.
    fn escape(&mut self, start: usize) -> Result<u8, Error> {
        let Some(b) = self.bump() else {
            return Err(Error::syntax(start, "trailing backslash"));
        };
        match b {
            b'n' => Ok(b'\n'),
            b't' => Ok(b'\t'),
            b'r' => Ok(b'\r'),
            b'x' => {
                let hi = self.hex_digit()?;
                let lo = self.hex_digit()?;
                Ok(hi << 4 | lo)
            }
            _ => Ok(b),
        }
    }

    fn hex_digit(&mut self) -> Result<u8, Error> {
        let pos = self.pos;
        match self.bump() {
            Some(b @ b'0'..=b'9') => Ok(b - b'0'),
            Some(b @ b'a'..=b'f') => Ok(b - b'a' + 10),
            Some(b @ b'A'..=b'F') => Ok(b - b'A' + 10),
            _ => Err(Error::syntax(pos, "expected hex digit after '\\x'")),
        }
    }

    /// Parse a character class body; the opening `[` is already consumed.
    fn class(&mut self, start: usize) -> Result<Ast, Error> {
        let negate = self.peek() == Some(b'^');
        if negate {
            self.bump();
        }
        let mut ranges = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::syntax(start, "unterminated character class")),
                Some(b']') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let item_pos = self.pos;
                    let lo = self.class_byte()?;
                    // `a-z` forms a range unless the '-' directly precedes ']'.
                    if self.peek() == Some(b'-') && self.input.get(self.pos + 1) != Some(&b']') {
                        self.bump();
                        let hi = self.class_byte()?;
                        if hi < lo {
                            return Err(Error::syntax(item_pos, "invalid range in character class"));
                        }
                        ranges.push(CharRange::new(lo, hi));
                    } else {
                        ranges.push(CharRange::single(lo));
                    }
                }
            }
        }
        range::normalize(&mut ranges);
        if negate {
            ranges = range::complement(&ranges);
        }
        if ranges.is_empty() {
            // `[]`, or a negated class covering the whole alphabet.
            Ok(Ast::Empty)
        } else {
            Ok(Ast::Class(ranges))
        }
    }

    fn class_byte(&mut self) -> Result<u8, Error> {
        let pos = self.pos;
        match self.bump() {
            Some(b'\\') => self.escape(pos),
            Some(b) => Ok(b),
            None => Err(Error::syntax(pos, "unterminated character class")),
        }
    }

    /// Parse `m}` / `m,}` / `m,n}`; the opening `{` is already consumed.
    fn bounds(&mut self) -> Result<(u32, Option<u32>), Error> {
        let start = self.pos - 1;
        let min = self.number()?;
        let max = match self.peek() {
            Some(b',') => {
                self.bump();
                if self.peek() == Some(b'}') {
                    None
                } else {
                    Some(self.number()?)
                }
            }
            _ => Some(min),
        };
        if self.bump() != Some(b'}') {
            return Err(Error::syntax(start, "unterminated repetition bounds"));
        }
        if let Some(mx) = max {
            if mx < min {
                return Err(Error::syntax(start, "invalid repetition bounds"));
            }
        }
        Ok((min, max))
    }

    fn number(&mut self) -> Result<u32, Error> {
        let start = self.pos;
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            self.bump();
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u32))
                .ok_or_else(|| Error::syntax(start, "repetition count too large"))?;
            digits += 1;
        }
        if digits == 0 {
            return Err(Error::syntax(start, "expected a repetition count"));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(lo: u8, hi: u8) -> Ast {
        Ast::Class(vec![CharRange::new(lo, hi)])
    }

    #[test]
    fn test_precedence() {
        // ab|c* parses as (ab)|(c*)
        let ast = parse("ab|c*").unwrap();
        assert_eq!(
            ast,
            Ast::Alt(
                Box::new(Ast::Concat(
                    Box::new(class(b'a', b'a')),
                    Box::new(class(b'b', b'b'))
                )),
                Box::new(Ast::Repeat {
                    inner: Box::new(class(b'c', b'c')),
                    min: 0,
                    max: None,
                }),
            )
        );
    }

    #[test]
    fn test_class_ranges_normalized() {
        let ast = parse("[c-ea-b]").unwrap();
        assert_eq!(ast, class(b'a', b'e'));
    }

    #[test]
    fn test_negated_class() {
        let ast = parse("[^\\x00-`b-\\xff]").unwrap();
        assert_eq!(ast, class(b'a', b'a'));
    }

    #[test]
    fn test_empty_class_is_empty_language() {
        assert_eq!(parse("[]").unwrap(), Ast::Empty);
        assert_eq!(parse("[^\\x00-\\xff]").unwrap(), Ast::Empty);
    }

    #[test]
    fn test_empty_group_and_branch_are_epsilon() {
        assert_eq!(parse("()").unwrap(), Ast::Epsilon);
        assert_eq!(parse("").unwrap(), Ast::Epsilon);
        assert_eq!(
            parse("a|").unwrap(),
            Ast::Alt(Box::new(class(b'a', b'a')), Box::new(Ast::Epsilon))
        );
    }

    #[test]
    fn test_bounded_repetition() {
        assert_eq!(
            parse("a{2,5}").unwrap(),
            Ast::Repeat {
                inner: Box::new(class(b'a', b'a')),
                min: 2,
                max: Some(5),
            }
        );
        assert_eq!(
            parse("a{3}").unwrap(),
            Ast::Repeat {
                inner: Box::new(class(b'a', b'a')),
                min: 3,
                max: Some(3),
            }
        );
        assert_eq!(
            parse("a{3,}").unwrap(),
            Ast::Repeat {
                inner: Box::new(class(b'a', b'a')),
                min: 3,
                max: None,
            }
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse("\\x41").unwrap(), class(b'A', b'A'));
        assert_eq!(parse("\\n").unwrap(), class(b'\n', b'\n'));
        assert_eq!(parse("\\*").unwrap(), class(b'*', b'*'));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("(a"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("a)"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("[a"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("[z-a]"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("a{3,1}"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("*a"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("a\\"), Err(Error::Syntax { .. })));
        assert!(matches!(parse("a{x}"), Err(Error::Syntax { .. })));
    }
}
