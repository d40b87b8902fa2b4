//! Restricted arithmetic evaluator for textual scale factors.
//!
//! Descriptor files may give a scale factor as a formula such as
//! `"(1/LOG2_TO_DB20)"` or `"2**-4 * WDRC_UPDATE_RATE"`. This module evaluates
//! exactly that: numbers, the named [`SystemConstants`], a few math functions,
//! and the four arithmetic operators plus `**`. Nothing else is accepted.
//!
//! ## Grammar
//!
//! ```text
//! expr  ::= term ( ('+' | '-') term )*
//! term  ::= unary ( ('*' | '/') unary )*
//! unary ::= ('-' | '+') unary | power
//! power ::= atom ( '**' unary )?
//! atom  ::= number | ident | ident '(' args ')' | '(' expr ')'
//! args  ::= expr ( ',' expr )*
//! ```
//!
//! `**` binds tighter than unary minus on its left and is right-associative,
//! so `-2**2 == -4` and `2**3**2 == 512`. A leading `math.` on an identifier
//! is ignored.

use libm::{exp, fabs, log, log2, log10, pow, sqrt};

use crate::constants::SystemConstants;

/// Nesting depth limit for parentheses and unary operators.
const MAX_DEPTH: usize = 64;

/// Reason an expression was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprErrorKind {
    /// Input was empty or whitespace.
    Empty,
    /// A character that cannot start or continue any token.
    UnexpectedChar(char),
    /// Input ended where an operand was expected.
    UnexpectedEnd,
    /// A numeric literal could not be parsed.
    InvalidNumber,
    /// An identifier that is neither a known constant nor a function.
    UnknownIdentifier,
    /// A function called with the wrong number of arguments.
    WrongArity {
        /// Arguments the function takes.
        expected: usize,
        /// Arguments supplied.
        found: usize,
    },
    /// A `(` without matching `)`.
    UnclosedParen,
    /// Nesting deeper than the evaluator allows.
    TooDeep,
}

/// Error from [`evaluate`], with the byte position it was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprError {
    /// Byte offset into the expression.
    pub pos: usize,
    /// What went wrong.
    pub kind: ExprErrorKind,
}

impl core::fmt::Display for ExprError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ExprErrorKind::Empty => write!(f, "empty expression"),
            ExprErrorKind::UnexpectedChar(ch) => {
                write!(f, "unexpected character '{ch}' at position {}", self.pos)
            }
            ExprErrorKind::UnexpectedEnd => {
                write!(f, "unexpected end of expression at position {}", self.pos)
            }
            ExprErrorKind::InvalidNumber => write!(f, "invalid number at position {}", self.pos),
            ExprErrorKind::UnknownIdentifier => {
                write!(f, "unknown identifier at position {}", self.pos)
            }
            ExprErrorKind::WrongArity { expected, found } => write!(
                f,
                "function at position {} takes {expected} argument(s), found {found}",
                self.pos
            ),
            ExprErrorKind::UnclosedParen => {
                write!(f, "unclosed parenthesis at position {}", self.pos)
            }
            ExprErrorKind::TooDeep => write!(f, "expression nested too deeply"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExprError {}

/// Evaluate `input` against the named constants in `constants`.
///
/// # Example
///
/// ```rust
/// use fwparam_core::{SystemConstants, evaluate, DB20_TO_LOG2};
///
/// let sys = SystemConstants::DEFAULT;
/// let k = evaluate("(1/LOG2_TO_DB20)", &sys).unwrap();
/// assert!((k - DB20_TO_LOG2).abs() < 1e-15);
/// assert_eq!(evaluate("2**-4", &sys).unwrap(), 0.0625);
/// assert!(evaluate("__import__('os')", &sys).is_err());
/// ```
pub fn evaluate(input: &str, constants: &SystemConstants) -> Result<f64, ExprError> {
    let mut parser = Parser::new(input, constants);
    parser.skip_ws();
    if parser.peek().is_none() {
        return Err(parser.error(ExprErrorKind::Empty));
    }
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if let Some(ch) = parser.peek() {
        return Err(parser.error(ExprErrorKind::UnexpectedChar(ch)));
    }
    Ok(value)
}

/// Recursive descent parser that evaluates while it parses.
///
/// LL(1), single byte lookahead. Non-ASCII bytes are rejected as unexpected.
struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    constants: &'a SystemConstants,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, constants: &'a SystemConstants) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            depth: 0,
            constants,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).map(|&b| b as char)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_ws(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s.as_bytes())
    }

    fn error(&self, kind: ExprErrorKind) -> ExprError {
        ExprError {
            pos: self.pos,
            kind,
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(ExprErrorKind::TooDeep));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// `expr ::= term ( ('+' | '-') term )*`
    fn parse_expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.advance();
                    value += self.parse_term()?;
                }
                Some('-') => {
                    self.advance();
                    value -= self.parse_term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// `term ::= unary ( ('*' | '/') unary )*`
    fn parse_term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.parse_unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.advance();
                    value *= self.parse_unary()?;
                }
                Some('/') => {
                    self.advance();
                    value /= self.parse_unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// `unary ::= ('-' | '+') unary | power`
    fn parse_unary(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some('-') => {
                self.advance();
                self.enter()?;
                let value = -self.parse_unary()?;
                self.leave();
                Ok(value)
            }
            Some('+') => {
                self.advance();
                self.enter()?;
                let value = self.parse_unary()?;
                self.leave();
                Ok(value)
            }
            _ => self.parse_power(),
        }
    }

    /// `power ::= atom ( '**' unary )?`
    fn parse_power(&mut self) -> Result<f64, ExprError> {
        let base = self.parse_atom()?;
        self.skip_ws();
        if self.starts_with("**") {
            self.pos += 2;
            self.enter()?;
            let exponent = self.parse_unary()?;
            self.leave();
            return Ok(pow(base, exponent));
        }
        Ok(base)
    }

    /// `atom ::= number | ident | ident '(' args ')' | '(' expr ')'`
    fn parse_atom(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error(ExprErrorKind::UnexpectedEnd)),
            Some('(') => {
                let open = self.pos;
                self.advance();
                self.enter()?;
                let value = self.parse_expr()?;
                self.leave();
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err(ExprError {
                        pos: open,
                        kind: ExprErrorKind::UnclosedParen,
                    });
                }
                self.advance();
                Ok(value)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.parse_ident(),
            Some(ch) => Err(self.error(ExprErrorKind::UnexpectedChar(ch))),
        }
    }

    fn parse_number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                self.advance();
            } else if matches!(ch, 'e' | 'E') {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
        let text = core::str::from_utf8(&self.input[start..self.pos]).map_err(|_| ExprError {
            pos: start,
            kind: ExprErrorKind::InvalidNumber,
        })?;
        text.parse::<f64>().map_err(|_| ExprError {
            pos: start,
            kind: ExprErrorKind::InvalidNumber,
        })
    }

    fn parse_ident(&mut self) -> Result<f64, ExprError> {
        if self.starts_with("math.") {
            self.pos += 5;
        }
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        // Identifiers are ASCII by construction.
        let name = core::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();

        self.skip_ws();
        if self.peek() == Some('(') {
            return self.parse_call(name, start);
        }

        self.constants.lookup(name).ok_or(ExprError {
            pos: start,
            kind: ExprErrorKind::UnknownIdentifier,
        })
    }

    fn parse_call(&mut self, name: &str, name_pos: usize) -> Result<f64, ExprError> {
        let arity = match name {
            "sqrt" | "exp" | "log" | "log2" | "log10" | "abs" | "fabs" => 1,
            "pow" => 2,
            _ => {
                return Err(ExprError {
                    pos: name_pos,
                    kind: ExprErrorKind::UnknownIdentifier,
                });
            }
        };

        let open = self.pos;
        self.advance(); // consume '('
        self.enter()?;
        let mut args = [0.0f64; 2];
        let mut count = 0usize;
        loop {
            let value = self.parse_expr()?;
            if count < args.len() {
                args[count] = value;
            }
            count += 1;
            self.skip_ws();
            match self.peek() {
                Some(',') => self.advance(),
                Some(')') => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(ExprError {
                        pos: open,
                        kind: ExprErrorKind::UnclosedParen,
                    });
                }
            }
        }
        self.leave();

        if count != arity {
            return Err(ExprError {
                pos: name_pos,
                kind: ExprErrorKind::WrongArity {
                    expected: arity,
                    found: count,
                },
            });
        }

        let [a, b] = args;
        Ok(match name {
            "sqrt" => sqrt(a),
            "exp" => exp(a),
            "log" => log(a),
            "log2" => log2(a),
            "log10" => log10(a),
            "abs" | "fabs" => fabs(a),
            _ => pow(a, b),
        })
    }
}
