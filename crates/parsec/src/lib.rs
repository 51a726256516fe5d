//! A parser combinator library for (possibly ambiguous) grammars over token chains.
//!
//! Grammars are built by composing [Parser] values directly in rust code. Every
//! parser maps a position in a [token chain](lexer::Token) to a [ParseOutput]:
//! either a non-empty, ordered set of [candidates](ParseResult), or the single
//! most informative [ParseError].
//!
//! ```
//! # use parsec::{Lexer, LexerRule, Parser};
//! # use parsec::core::{seq, tok};
//! # use parsec::eval::{expect_eof, expect_single_result};
//! #[derive(Clone, Copy, PartialEq, Eq, Debug)]
//! enum Kind { Number, Space }
//!
//! let lexer = Lexer::new([
//!     LexerRule::keep(r"\d+", Kind::Number),
//!     LexerRule::skip(r"\s+", Kind::Space),
//! ]).unwrap();
//!
//! let tokens = lexer.parse("123 456").unwrap();
//! let (a, b) = expect_single_result(expect_eof(
//!     seq(tok(Kind::Number), tok(Kind::Number)).parse(&tokens),
//! )).unwrap();
//! assert_eq!((a.text.as_str(), b.text.as_str()), ("123", "456"));
//! ```
#![allow(internal_features)]
#![cfg_attr(feature = "nightly", feature(rustc_attrs))]
#![warn(clippy::style)]
#![warn(clippy::perf)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::{
    cmp::Ordering,
    fmt::{Display, Error, Formatter},
    rc::Rc,
};

use derive_where::derive_where;

pub mod ambiguous;
pub mod core;
pub mod eval;
pub mod lexer;
pub mod macros;
pub mod module;
pub mod monadic;
pub mod recovery;
pub mod recursive;
pub mod repeat;
pub mod trace;

pub use lexer::{
    Lexer, LexerBuilder, LexerError, LexerRule, Token, TokenCursor, TokenError, TokenPosition,
};

/// What went wrong in a [ParseError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A matcher could not consume the token at the position.
    Unconsumed,
    /// A [range](core::range) was built with `min > max`.
    InvalidRange,
    /// Produced by [fail](core::fail), [err](recovery::err) or [errd](recovery::errd).
    Custom,
    /// [expect_eof](eval::expect_eof) found no candidate reaching the end of the stream.
    NotAtEnd,
}

/// A recoverable failure of a single branch.
/// - A position of `None` is the end of the token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: Option<TokenPosition>,
    pub message: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        pos: Option<TokenPosition>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            pos,
            message: message.into(),
        }
    }

    pub fn unconsumed<K>(token: &TokenCursor<K>) -> Self {
        let message = match token {
            Some(t) => format!("Unable to consume token: {}", t.text),
            None => String::from("Unable to consume token: <END-OF-FILE>"),
        };
        Self::new(ParseErrorKind::Unconsumed, lexer::position(token), message)
    }

    pub fn invalid_range<K>(min: char, max: char, token: &TokenCursor<K>) -> Self {
        Self::new(
            ParseErrorKind::InvalidRange,
            lexer::position(token),
            format!("Invalid character range: {min}-{max}"),
        )
    }

    pub fn custom<K>(message: impl Into<String>, token: &TokenCursor<K>) -> Self {
        Self::new(ParseErrorKind::Custom, lexer::position(token), message)
    }

    /// Keeps the more informative of two errors, see [better_error].
    pub fn merge(self, other: Self) -> Self {
        if other.progress(&self) == Ordering::Greater {
            other
        } else {
            self
        }
    }

    /// Orders errors by how far into the stream they occurred, the end of the
    /// stream being furthest.
    fn progress(&self, other: &Self) -> Ordering {
        match (&self.pos, &other.pos) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.index.cmp(&b.index),
        }
    }
}

/// Picks the more informative of two errors.
/// - Any error beats no error.
/// - An error strictly further into the stream wins.
/// - On a tie the first (earliest seen) is kept.
pub fn better_error(e1: Option<ParseError>, e2: Option<ParseError>) -> Option<ParseError> {
    match (e1, e2) {
        (None, e) | (e, None) => e,
        (Some(e1), Some(e2)) => Some(e1.merge(e2)),
    }
}

/// A single successful interpretation of some span of tokens.
#[derive_where(Clone; T: Clone)]
#[derive_where(Debug; T: std::fmt::Debug, K: std::fmt::Debug)]
pub struct ParseResult<K, T> {
    /// The token the parse started at.
    pub first_token: TokenCursor<K>,
    /// The token after the last consumed, `None` when the stream was fully consumed.
    pub next_token: TokenCursor<K>,
    pub result: T,
}

impl<K, T> ParseResult<K, T> {
    /// A candidate that consumed no tokens.
    pub fn empty(token: &TokenCursor<K>, result: T) -> Self {
        Self {
            first_token: token.clone(),
            next_token: token.clone(),
            result,
        }
    }

    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> ParseResult<K, R> {
        ParseResult {
            first_token: self.first_token,
            next_token: self.next_token,
            result: f(self.result),
        }
    }
}

/// The result of a [Parser] computation.
/// - [Suc](ParseOutput::Suc) always holds at least one candidate, in the order
///   they were explored, and may carry an error from a branch that failed.
/// - [Err](ParseOutput::Err) holds exactly one error.
#[derive_where(Clone; T: Clone)]
#[derive_where(Debug; T: std::fmt::Debug, K: std::fmt::Debug)]
pub enum ParseOutput<K, T> {
    Suc {
        candidates: Vec<ParseResult<K, T>>,
        error: Option<ParseError>,
    },
    Err(ParseError),
}

impl<K, T> ParseOutput<K, T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutput::Suc { .. })
    }

    /// The carried error on success, or the failure.
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseOutput::Suc { error, .. } => error.as_ref(),
            ParseOutput::Err(e) => Some(e),
        }
    }

    /// The candidates, empty on failure.
    pub fn candidates(&self) -> &[ParseResult<K, T>] {
        match self {
            ParseOutput::Suc { candidates, .. } => candidates,
            ParseOutput::Err(_) => &[],
        }
    }

    /// Splits into candidates and error, the error of a failure is always `Some`.
    pub fn into_parts(self) -> (Vec<ParseResult<K, T>>, Option<ParseError>) {
        match self {
            ParseOutput::Suc { candidates, error } => (candidates, error),
            ParseOutput::Err(e) => (Vec::new(), Some(e)),
        }
    }

    /// Applies `f` to the value of every candidate.
    pub fn map<R>(self, f: impl Fn(T) -> R) -> ParseOutput<K, R> {
        match self {
            ParseOutput::Suc { candidates, error } => ParseOutput::Suc {
                candidates: candidates.into_iter().map(|c| c.map(&f)).collect(),
                error,
            },
            ParseOutput::Err(e) => ParseOutput::Err(e),
        }
    }

    /// Converts into a regular rust [`Result`], dropping any carried error.
    pub fn to_result(self) -> Result<Vec<ParseResult<K, T>>, ParseError> {
        match self {
            ParseOutput::Suc { candidates, .. } => Ok(candidates),
            ParseOutput::Err(e) => Err(e),
        }
    }
}

/// Builds the output of a fan-out: successful if any candidate survived.
/// - When nothing survived and no branch reported an error, the failure is
///   reported at the starting token.
pub fn result_or_error<K, T>(
    candidates: Vec<ParseResult<K, T>>,
    error: Option<ParseError>,
    start: &TokenCursor<K>,
) -> ParseOutput<K, T> {
    if candidates.is_empty() {
        ParseOutput::Err(error.unwrap_or_else(|| ParseError::unconsumed(start)))
    } else {
        ParseOutput::Suc { candidates, error }
    }
}

/// The core trait for defining parsers.
/// Implemented identically by matchers, combinators, rules and deferred
/// constructions.
#[cfg_attr(
    feature = "nightly",
    rustc_on_unimplemented(
        message = "`{Self}` is not a `Parser` so cannot be combined & used as one",
        label = "Not `Parser`",
    )
)]
pub trait Parser {
    /// The kind of the tokens consumed.
    type Kind;
    /// The value produced by each candidate.
    type Output: Clone;

    /// Parses from `token` (`None` being the end of the stream).
    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output>;

    /// Produces a representation of the parser for debugging & traces.
    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error>;
}

/// A type-erased [Parser].
pub type BoxedParser<K, T> = Box<dyn Parser<Kind = K, Output = T>>;

impl<P: Parser + ?Sized> Parser for &P {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        (**self).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        (**self).repr(f)
    }
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        (**self).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        (**self).repr(f)
    }
}

impl<P: Parser + ?Sized> Parser for Rc<P> {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        (**self).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        (**self).repr(f)
    }
}

/// A simple wrapper to allow the [Parser::repr] function to implement [Display]
pub struct Repr<T>(pub T);

impl<P: Parser + ?Sized> Display for Repr<&P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.repr(f)
    }
}
