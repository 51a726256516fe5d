//! Running a grammar and extracting its result.

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("No result is returned.")]
    NoResult,
    #[error("Multiple results are returned.")]
    Ambiguous { count: usize },
}

/// Applies the grammar from the given token, the top-level entry point.
pub fn parse<P: Parser>(
    grammar: &P,
    token: &TokenCursor<P::Kind>,
) -> ParseOutput<P::Kind, P::Output> {
    grammar.parse(token)
}

/// Keeps only the candidates that consumed the entire token stream.
/// - Every candidate that stopped early contributes a
///   [NotAtEnd](ParseErrorKind::NotAtEnd) error at the token it stopped at,
///   the furthest of these is kept.
/// - That error is merged with the carried error, a carried error strictly
///   further into the stream wins, on a tie the not-at-end error is kept.
/// - Fails if no candidate reached the end.
pub fn expect_eof<K, T>(output: ParseOutput<K, T>) -> ParseOutput<K, T> {
    let (candidates, error) = match output {
        ParseOutput::Suc { candidates, error } => (candidates, error),
        failure => return failure,
    };

    let mut stopped = None;
    let mut complete = Vec::new();
    for candidate in candidates {
        match candidate.next_token.as_ref().map(not_at_end) {
            Some(e) => stopped = better_error(stopped, Some(e)),
            None => complete.push(candidate),
        }
    }

    let error = better_error(stopped, error);
    result_or_error(complete, error, &None)
}

fn not_at_end<K>(token: &Rc<Token<K>>) -> ParseError {
    ParseError::new(
        ParseErrorKind::NotAtEnd,
        Some(token.pos),
        format!(
            "The parser cannot reach the end of file, stops at \"{}\" at position {}.",
            token.text, token.pos
        ),
    )
}

/// Extracts the value of the only candidate.
pub fn expect_single_result<K, T>(output: ParseOutput<K, T>) -> Result<T, EvalError> {
    let mut candidates = output.to_result()?;
    match candidates.len() {
        0 => Err(EvalError::NoResult),
        1 => Ok(candidates.remove(0).result),
        count => Err(EvalError::Ambiguous { count }),
    }
}

/// Extracts the values of every candidate, in order.
pub fn expect_results<K, T>(output: ParseOutput<K, T>) -> Result<Vec<T>, EvalError> {
    Ok(output.to_result()?.into_iter().map(|c| c.result).collect())
}
