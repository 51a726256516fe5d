//! Context-sensitive sequencing, where the next parser depends on a parsed value.

use super::*;

/// Applies `P`, then for every candidate builds the next parser from its value
/// and applies that from where the candidate ended.
/// - Fans out like [seq](crate::core::seq), producing the results of the
///   built parsers.
/// - A branch whose built parser fails is dropped, its error merged.
///
/// For example, a count followed by exactly that many names:
/// ```
/// # use std::rc::Rc;
/// # use parsec::{Lexer, Parser, Token, core::{apply, tok, lit}, repeat::list_n, monadic::combine};
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// # enum Kind { Number, Name, Comma, Space }
/// let lexer = Lexer::builder()
///     .keep(r"\d+", Kind::Number)
///     .keep(r"[a-z]+", Kind::Name)
///     .keep(",", Kind::Comma)
///     .skip(r"\s+", Kind::Space)
///     .build()
///     .unwrap();
///
/// let count = apply(tok(Kind::Number), |t: Rc<Token<Kind>>| t.text.parse::<usize>().unwrap_or(0));
/// let names = combine(count, |n| list_n(tok(Kind::Name), lit(","), n));
///
/// let out = names.parse(&lexer.parse("2 foo,bar").unwrap());
/// assert_eq!(out.candidates()[0].result.len(), 2);
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct combine<P, F>(pub P, pub F)
where
    P: Parser;

impl<P, F, Q> Parser for combine<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> Q,
    Q: Parser<Kind = P::Kind>,
{
    type Kind = P::Kind;
    type Output = Q::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let (firsts, mut error) = self.0.parse(token).into_parts();
        let mut candidates = Vec::new();
        for first in firsts {
            let next = (self.1)(first.result);
            let (outs, e) = next.parse(&first.next_token).into_parts();
            error = better_error(error, e);
            candidates.extend(outs.into_iter().map(|out| ParseResult {
                first_token: token.clone(),
                next_token: out.next_token,
                result: out.result,
            }));
        }
        result_or_error(candidates, error, token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} => <dynamic>", Repr(&self.0))
    }
}
