//! # Type Expressions
//!
//! The textual form of a field type in a schema document:
//!
//! ```text
//! expr    ::= term postfix*
//! postfix ::= "?" | "[" "]"
//! term    ::= name ( "<" expr ">" )?
//! name    ::= (letter | "_") (letter | digit | "_")*
//! ```
//!
//! Only `optional` and `array` accept an angle-bracket argument. Postfix
//! operators bind left to right, so `number[]?` is an optional array and
//! `number?[]` is an array of optional numbers. Whitespace is allowed
//! between tokens.
//!
//! At most [`MAX_DEPTH`] wrappers may nest, in either spelling.
//!
//! Parsing yields an unresolved [`TypeExpr`]; names are mapped to
//! descriptors by [`TypeRegistry`](crate::TypeRegistry).

use std::fmt;
use std::str::FromStr;

use crate::error::ExprError;

/// Deepest wrapper nesting a parsed expression may have.
pub const MAX_DEPTH: usize = 64;

/// A parsed, unresolved type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A primitive, alias, or custom type name.
    Named(String),
    /// `optional<T>` or `T?`.
    Optional(Box<TypeExpr>),
    /// `array<T>` or `T[]`.
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    /// Parse a complete expression.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] for empty input, malformed syntax, trailing
    /// characters, a type argument on a non-wrapper name, or nesting past
    /// [`MAX_DEPTH`].
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let mut parser = Parser { text, pos: 0 };
        parser.skip_ws();
        if parser.peek().is_none() {
            return Err(ExprError::Empty);
        }
        let (expr, _) = parser.expr(0)?;
        parser.skip_ws();
        match parser.peek() {
            Some(found) => Err(ExprError::UnexpectedChar {
                offset: parser.pos,
                found,
            }),
            None => Ok(expr),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), ExprError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(ExprError::UnexpectedChar {
                offset: self.pos,
                found,
            }),
            None => Err(ExprError::UnexpectedEnd { expected }),
        }
    }

    /// `outer` counts the wrappers enclosing this expression; the returned
    /// depth counts the wrappers inside it.
    fn expr(&mut self, outer: usize) -> Result<(TypeExpr, usize), ExprError> {
        let (mut expr, mut depth) = self.term(outer)?;
        loop {
            self.skip_ws();
            let wrap: fn(Box<TypeExpr>) -> TypeExpr = match self.peek() {
                Some('?') => {
                    self.bump();
                    TypeExpr::Optional
                }
                Some('[') => {
                    self.bump();
                    self.expect(']', "']'")?;
                    TypeExpr::Array
                }
                _ => return Ok((expr, depth)),
            };
            depth += 1;
            check_depth(outer + depth)?;
            expr = wrap(Box::new(expr));
        }
    }

    fn term(&mut self, outer: usize) -> Result<(TypeExpr, usize), ExprError> {
        self.skip_ws();
        let name = self.name()?;
        self.skip_ws();
        if self.peek() != Some('<') {
            return Ok((TypeExpr::Named(name), 0));
        }
        let wrap: fn(Box<TypeExpr>) -> TypeExpr = match name.to_ascii_lowercase().as_str() {
            "optional" => TypeExpr::Optional,
            "array" => TypeExpr::Array,
            _ => return Err(ExprError::NotAWrapper { name }),
        };
        check_depth(outer + 1)?;
        self.bump();
        let (inner, depth) = self.expr(outer + 1)?;
        self.expect('>', "'>'")?;
        Ok((wrap(Box::new(inner)), depth + 1))
    }

    fn name(&mut self) -> Result<String, ExprError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            Some(found) => {
                return Err(ExprError::UnexpectedChar {
                    offset: start,
                    found,
                })
            }
            None => {
                return Err(ExprError::UnexpectedEnd {
                    expected: "a type name",
                })
            }
        }
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        Ok(self.text[start..self.pos].to_string())
    }
}

fn check_depth(depth: usize) -> Result<(), ExprError> {
    if depth > MAX_DEPTH {
        return Err(ExprError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(())
}
