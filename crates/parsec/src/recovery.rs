//! Combinators for better errors, and recovering from them.

use super::*;

/// On failure, replaces the error's message (keeping its position).
/// - Successes are untouched, including any error they carry.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug)]
pub struct err<P>(pub P, pub String)
where
    P: Parser;

impl<P: Parser> Parser for err<P> {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match self.0.parse(token) {
            ParseOutput::Err(e) => {
                ParseOutput::Err(ParseError::new(ParseErrorKind::Custom, e.pos, self.1.clone()))
            }
            success => success,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.0.repr(f)
    }
}

/// On failure, records the error as with [err] but succeeds with a zero-width
/// candidate carrying the default value, so parsing can continue past the
/// mistake.
/// - The recorded error is carried on the success for the caller to inspect.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug)]
pub struct errd<P>(pub P, pub String, pub P::Output)
where
    P: Parser;

impl<P: Parser> Parser for errd<P> {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match self.0.parse(token) {
            ParseOutput::Err(e) => ParseOutput::Suc {
                candidates: vec![ParseResult::empty(token, self.2.clone())],
                error: Some(ParseError::new(ParseErrorKind::Custom, e.pos, self.1.clone())),
            },
            success => success,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.0.repr(f)
    }
}
