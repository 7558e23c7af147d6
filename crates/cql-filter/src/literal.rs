//! Literal classification.
//!
//! A literal token from a filter clause is one of:
//!
//! - a plain value (`1`, `'text'`, `2020-01-01T00:00:00Z`, `P1D`, an interval
//!   or WKT), stored with quotes stripped,
//! - a function call (`end(2020-01-01T00:00:00Z/P1D)`, `f()`),
//! - two of the above combined with `+`, `-`, `*` or `/`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{FilterError, FilterResult};
use crate::grammar;

static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{})$", grammar::interval())).expect("interval pattern is valid")
});

static ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| {
    let plain = grammar::plain_literal();
    Regex::new(&format!(
        "^(?P<left>{plain})(?P<op>{})(?P<right>{plain})$",
        grammar::OPERATOR
    ))
    .expect("arithmetic pattern is valid")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}$", grammar::STRING)).expect("string pattern is valid")
});

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<name>[a-zA-Z_]+)\((?P<argument>{})?\)$",
        grammar::call_argument()
    ))
    .expect("call pattern is valid")
});

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{})$", grammar::plain_literal())).expect("plain pattern is valid")
});

static POLYGON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}$", grammar::POLYGON)).expect("polygon pattern is valid")
});

static BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^(?:{}|{}|{}|{}|{}|{})$",
        grammar::interval(),
        grammar::TIME,
        grammar::NUMBER,
        grammar::BOOLEAN,
        grammar::DURATION,
        grammar::POLYGON
    ))
    .expect("bare pattern is valid")
});

/// Operator of an arithmetic literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Returns the operator for its character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Returns the operator character.
    pub fn as_char(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A classified literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Literal {
    /// A single value with quotes stripped and `''` unescaped.
    Plain { value: String },
    /// A function applied to an optional argument.
    FunctionCall {
        name: String,
        argument: Option<String>,
    },
    /// `left op right`, where neither side is itself arithmetic.
    Arithmetic {
        left: Box<Literal>,
        op: Operator,
        right: Box<Literal>,
    },
}

impl Literal {
    /// Creates a plain literal from already-stripped text.
    pub fn plain(value: impl Into<String>) -> Self {
        Literal::Plain {
            value: value.into(),
        }
    }

    /// Classifies a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidLiteral`] if the token matches no literal form.
    pub fn classify(token: &str) -> FilterResult<Literal> {
        // The `/` inside an interval would otherwise read as division.
        if INTERVAL.is_match(token) {
            return Ok(Literal::plain(token));
        }
        if let Some(caps) = ARITHMETIC.captures(token) {
            let op = caps
                .name("op")
                .and_then(|m| m.as_str().chars().next())
                .and_then(Operator::from_char)
                .ok_or_else(|| FilterError::invalid_literal(token))?;
            let left = Self::classify_operand(&caps["left"])?;
            let right = Self::classify_operand(&caps["right"])?;
            return Ok(Literal::Arithmetic {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }
        Self::classify_operand(token).or_else(|_| {
            if POLYGON.is_match(token) {
                Ok(Literal::plain(token))
            } else {
                Err(FilterError::invalid_literal(token))
            }
        })
    }

    fn classify_operand(token: &str) -> FilterResult<Literal> {
        if QUOTED.is_match(token) {
            return Ok(Literal::plain(strip_quotes(token)));
        }
        if let Some(caps) = CALL.captures(token) {
            return Ok(Literal::FunctionCall {
                name: caps["name"].to_string(),
                argument: caps.name("argument").map(|m| m.as_str().to_string()),
            });
        }
        if PLAIN.is_match(token) {
            return Ok(Literal::plain(token));
        }
        Err(FilterError::invalid_literal(token))
    }

    /// Returns the text of a plain literal.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Literal::Plain { value } => Some(value),
            _ => None,
        }
    }

    /// Returns true for arithmetic literals.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Literal::Arithmetic { .. })
    }
}

impl FromStr for Literal {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Literal::classify(s)
    }
}

/// Renders the literal back in query syntax, quoting text that would not
/// otherwise read as the same literal.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Plain { value } => {
                if BARE.is_match(value) {
                    f.write_str(value)
                } else {
                    write!(f, "'{}'", value.replace('\'', "''"))
                }
            }
            Literal::FunctionCall { name, argument } => {
                write!(f, "{name}({})", argument.as_deref().unwrap_or_default())
            }
            Literal::Arithmetic { left, op, right } => write!(f, "{left}{op}{right}"),
        }
    }
}

/// Removes surrounding single quotes and collapses `''` to `'`.
///
/// Text that is not quoted is returned unchanged.
pub fn strip_quotes(token: &str) -> String {
    match token
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => token.to_string(),
    }
}
