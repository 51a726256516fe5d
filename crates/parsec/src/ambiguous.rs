//! Grouping ambiguous candidates that share a span.

use super::*;
use rustc_hash::FxHashMap;

/// Groups the candidates of `P` by the token they end at, producing one
/// candidate per end position whose value is every interpretation of that span.
/// - Groups are ordered by the first candidate that reached each end position,
///   values within a group keep the order `P` produced them in.
/// ```text
/// P => [a1 @ t3, b @ t5, a2 @ t3] ==> [[a1, a2] @ t3, [b] @ t5]
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct amb<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for amb<P> {
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let (candidates, error) = match self.0.parse(token) {
            ParseOutput::Suc { candidates, error } => (candidates, error),
            ParseOutput::Err(e) => return ParseOutput::Err(e),
        };

        let mut groups: Vec<ParseResult<Self::Kind, Self::Output>> = Vec::new();
        let mut index: FxHashMap<Option<*const Token<Self::Kind>>, usize> = FxHashMap::default();
        for candidate in candidates {
            let end = candidate.next_token.as_ref().map(Rc::as_ptr);
            match index.get(&end) {
                Some(&i) => groups[i].result.push(candidate.result),
                None => {
                    index.insert(end, groups.len());
                    groups.push(candidate.map(|value| vec![value]));
                }
            }
        }

        ParseOutput::Suc {
            candidates: groups,
            error,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "amb({})", Repr(&self.0))
    }
}
