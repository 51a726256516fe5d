//! Repetition, separated lists and left-recursion folds.
//! - A repetition step that does not advance the position is discarded, so
//!   parsers that can match zero-width input cannot repeat forever.

use super::*;
use crate::{
    core::{apply, kright, seq, succ},
    lexer::same_token,
};
use std::fmt::Debug;

/// Appends a step's value to the run so far.
fn extend<K, T>(
    token: &TokenCursor<K>,
    mut run: Vec<T>,
    step: ParseResult<K, T>,
) -> ParseResult<K, Vec<T>> {
    run.push(step.result);
    ParseResult {
        first_token: token.clone(),
        next_token: step.next_token,
        result: run,
    }
}

/// Every achievable number of repetitions, shortest first.
/// ```text
/// []  [P]  [P P]  ...
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct repr<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for repr<P> {
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let mut error = None;
        let mut candidates = vec![ParseResult::empty(token, Vec::new())];

        // candidates grows as it is traversed, each step extends one earlier candidate
        let mut i = 0;
        while i < candidates.len() {
            let step_end = candidates[i].next_token.clone();
            let (outs, e) = self.0.parse(&step_end).into_parts();
            error = better_error(error, e);
            for out in outs {
                if !same_token(&out.next_token, &step_end) {
                    let run = candidates[i].result.clone();
                    candidates.push(extend(token, run, out));
                }
            }
            i += 1;
        }

        ParseOutput::Suc { candidates, error }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}*", Repr(&self.0))
    }
}

/// Every achievable number of repetitions, longest first.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct rep<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for rep<P> {
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match repr(&self.0).parse(token) {
            ParseOutput::Suc {
                mut candidates,
                error,
            } => {
                candidates.reverse();
                ParseOutput::Suc { candidates, error }
            }
            failure => failure,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}*", Repr(&self.0))
    }
}

/// Greedily repeats until no branch can advance, keeping only the longest runs.
/// - For a deterministic `P` this is exactly one candidate.
/// - If `P` is ambiguous, every branch that survived the final round is kept.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct rep_sc<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for rep_sc<P> {
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let mut error = None;
        let mut steps = vec![ParseResult::empty(token, Vec::new())];

        loop {
            let mut advanced = Vec::new();
            let mut stalled = Vec::new();
            for step in steps {
                let (outs, e) = self.0.parse(&step.next_token).into_parts();
                error = better_error(error, e);
                let mut outs: Vec<_> = outs
                    .into_iter()
                    .filter(|out| !same_token(&out.next_token, &step.next_token))
                    .collect();
                let Some(last) = outs.pop() else {
                    stalled.push(step);
                    continue;
                };
                for out in outs {
                    advanced.push(extend(token, step.result.clone(), out));
                }
                advanced.push(extend(token, step.result, last));
            }

            if advanced.is_empty() {
                return ParseOutput::Suc {
                    candidates: stalled,
                    error,
                };
            }
            steps = advanced;
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}*!", Repr(&self.0))
    }
}

/// Exactly `count` repetitions, failing if fewer can be parsed.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct rep_n<P>(pub P, pub usize)
where
    P: Parser;

impl<P: Parser> Parser for rep_n<P> {
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let mut error = None;
        let mut steps = vec![ParseResult::empty(token, Vec::with_capacity(self.1))];

        for _ in 0..self.1 {
            let mut advanced = Vec::new();
            for step in steps {
                let (mut outs, e) = self.0.parse(&step.next_token).into_parts();
                error = better_error(error, e);
                let Some(last) = outs.pop() else {
                    continue;
                };
                for out in outs {
                    advanced.push(extend(token, step.result.clone(), out));
                }
                advanced.push(extend(token, step.result, last));
            }

            if advanced.is_empty() {
                return result_or_error(advanced, error, token);
            }
            steps = advanced;
        }

        ParseOutput::Suc {
            candidates: steps,
            error,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}{{{}}}", Repr(&self.0), self.1)
    }
}

fn cons<T>((first, mut tail): (T, Vec<T>)) -> Vec<T> {
    tail.insert(0, first);
    tail
}

/// One or more `P` separated by `S`, every achievable length (longest first).
/// ```text
/// P (S P)*
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct list<P, S>(pub P, pub S)
where
    P: Parser,
    S: Parser<Kind = P::Kind>;

impl<P, S> Parser for list<P, S>
where
    P: Parser,
    S: Parser<Kind = P::Kind>,
{
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        apply(seq(&self.0, rep(kright(&self.1, &self.0))), cons).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} ({} {})*", Repr(&self.0), Repr(&self.1), Repr(&self.0))
    }
}

/// One or more `P` separated by `S`, only the longest list.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct list_sc<P, S>(pub P, pub S)
where
    P: Parser,
    S: Parser<Kind = P::Kind>;

impl<P, S> Parser for list_sc<P, S>
where
    P: Parser,
    S: Parser<Kind = P::Kind>,
{
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        apply(seq(&self.0, rep_sc(kright(&self.1, &self.0))), cons).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} ({} {})*!", Repr(&self.0), Repr(&self.1), Repr(&self.0))
    }
}

/// Exactly `count` of `P` separated by `S`.
/// - A count of zero succeeds with an empty list without consuming.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct list_n<P, S>(pub P, pub S, pub usize)
where
    P: Parser,
    S: Parser<Kind = P::Kind>;

impl<P, S> Parser for list_n<P, S>
where
    P: Parser,
    S: Parser<Kind = P::Kind>,
{
    type Kind = P::Kind;
    type Output = Vec<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match self.2 {
            0 => succ(Vec::new()).parse(token),
            1 => apply(&self.0, |value| vec![value]).parse(token),
            count => {
                apply(seq(&self.0, rep_n(kright(&self.1, &self.0), count - 1)), cons).parse(token)
            }
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "{} ({} {}){{{}}}",
            Repr(&self.0),
            Repr(&self.1),
            Repr(&self.0),
            self.2.saturating_sub(1)
        )
    }
}

fn fold<T, U>(combine: &impl Fn(T, U) -> T, (first, tail): (T, Vec<U>)) -> T {
    tail.into_iter().fold(first, combine)
}

/// Left recursion without recursive descent, for productions of the form:
/// ```text
/// A := A Q | P
/// ```
/// Parses one `P`, then every achievable number of `Q` ([rep]), folding the
/// values from the left with `F`.
#[allow(non_camel_case_types)]
#[derive_where(Clone; P: Clone, Q: Clone, F: Clone)]
#[derive_where(Debug; P: Debug, Q: Debug, F: Debug)]
pub struct lrec<P, Q, F>(pub P, pub Q, pub F)
where
    P: Parser,
    Q: Parser<Kind = P::Kind>,
    F: Fn(P::Output, Q::Output) -> P::Output;

impl<P, Q, F> Parser for lrec<P, Q, F>
where
    P: Parser,
    Q: Parser<Kind = P::Kind>,
    F: Fn(P::Output, Q::Output) -> P::Output,
{
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        apply(seq(&self.0, rep(&self.1)), |value| fold(&self.2, value)).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}*", Repr(&self.0), Repr(&self.1))
    }
}

/// As [lrec], but only the longest run of `Q` ([rep_sc]).
/// - Iterative, so long chains do not grow the stack.
#[allow(non_camel_case_types)]
#[derive_where(Clone; P: Clone, Q: Clone, F: Clone)]
#[derive_where(Debug; P: Debug, Q: Debug, F: Debug)]
pub struct lrec_sc<P, Q, F>(pub P, pub Q, pub F)
where
    P: Parser,
    Q: Parser<Kind = P::Kind>,
    F: Fn(P::Output, Q::Output) -> P::Output;

impl<P, Q, F> Parser for lrec_sc<P, Q, F>
where
    P: Parser,
    Q: Parser<Kind = P::Kind>,
    F: Fn(P::Output, Q::Output) -> P::Output,
{
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        apply(seq(&self.0, rep_sc(&self.1)), |value| fold(&self.2, value)).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}*!", Repr(&self.0), Repr(&self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{alt, lit, nil, opt, tok};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Number,
        Identifier,
        Comma,
        Space,
    }

    fn lex(input: &str) -> TokenCursor<Kind> {
        Lexer::builder()
            .keep(r"\d+", Kind::Number)
            .keep(r"[a-zA-Z]\w*", Kind::Identifier)
            .keep(r",", Kind::Comma)
            .skip(r"\s+", Kind::Space)
            .build()
            .unwrap()
            .parse(input)
            .unwrap()
    }

    fn texts<K>(tokens: &[Rc<Token<K>>]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    const NUMBER: tok<Kind> = tok(Kind::Number);

    #[test]
    fn repr_is_shortest_first() {
        let first = lex("123 456");
        let out = repr(NUMBER).parse(&first);
        let results: Vec<_> = out.candidates().iter().map(|c| texts(&c.result)).collect();
        assert_eq!(results, vec![vec![], vec!["123"], vec!["123", "456"]]);
        assert!(same_token(&out.candidates()[0].next_token, &first));
        assert!(out.candidates()[2].next_token.is_none());
    }

    #[test]
    fn rep_is_longest_first() {
        let first = lex("123 456");
        let out = rep(NUMBER).parse(&first);
        let results: Vec<_> = out.candidates().iter().map(|c| texts(&c.result)).collect();
        assert_eq!(results, vec![vec!["123", "456"], vec!["123"], vec![]]);
    }

    #[test]
    fn rep_sc_keeps_the_longest_run() {
        let first = lex("123 456");
        let out = rep_sc(NUMBER).parse(&first);
        let [candidate] = out.candidates() else {
            panic!("expected one candidate");
        };
        assert_eq!(texts(&candidate.result), vec!["123", "456"]);
        assert!(candidate.next_token.is_none());

        let out = rep_sc(tok(Kind::Identifier)).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert!(out.candidates()[0].result.is_empty());
        assert!(same_token(&out.candidates()[0].next_token, &first));
    }

    #[test]
    fn zero_width_steps_are_discarded() {
        let first = lex("123");
        let out = rep(nil()).parse(&first);
        assert_eq!(out.candidates().len(), 1);

        let out = rep_sc(opt(NUMBER)).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(out.candidates()[0].result.len(), 1);
    }

    #[test]
    fn rep_n_exact_counts() {
        let first = lex("123 456 789");
        for count in 0..=3 {
            let out = rep_n(NUMBER, count).parse(&first);
            assert_eq!(out.candidates().len(), 1);
            assert_eq!(out.candidates()[0].result.len(), count);
        }
        let out = rep_n(NUMBER, 2).parse(&first);
        assert_eq!(
            out.candidates()[0].next_token.as_ref().map(|t| t.text.as_str()),
            Some("789")
        );

        let out = rep_n(NUMBER, 4).parse(&first);
        assert!(!out.is_success());
        assert_eq!(out.error().map(|e| e.pos), Some(None));
    }

    #[test]
    fn rep_n_fans_out_over_ambiguity() {
        let first = lex("1 2");
        let out = rep_n(alt(NUMBER, NUMBER), 2).parse(&first);
        assert_eq!(out.candidates().len(), 4);
    }

    #[test]
    fn lists() {
        let first = lex("1, 2, 3");
        let comma = lit(",");

        let out = list(NUMBER, &comma).parse(&first);
        let lengths: Vec<_> = out.candidates().iter().map(|c| c.result.len()).collect();
        assert_eq!(lengths, vec![3, 2, 1]);

        let out = list_sc(NUMBER, &comma).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(texts(&out.candidates()[0].result), vec!["1", "2", "3"]);

        let out = list_n(NUMBER, &comma, 2).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(texts(&out.candidates()[0].result), vec!["1", "2"]);

        let out = list_n(NUMBER, &comma, 0).parse(&first);
        assert!(out.candidates()[0].result.is_empty());
        assert!(same_token(&out.candidates()[0].next_token, &first));

        assert!(!list_n(NUMBER, &comma, 4).parse(&first).is_success());
    }

    #[test]
    fn list_separators_must_be_followed() {
        let first = lex("1, 2,");
        let out = list_sc(NUMBER, lit(",")).parse(&first);
        assert_eq!(texts(&out.candidates()[0].result), vec!["1", "2"]);
        assert_eq!(
            out.candidates()[0].next_token.as_ref().map(|t| t.text.as_str()),
            Some(",")
        );
    }

    fn subtract(acc: i64, (_, rhs): (Rc<Token<Kind>>, Rc<Token<Kind>>)) -> i64 {
        acc - rhs.text.parse::<i64>().unwrap_or_default()
    }

    fn number() -> impl Parser<Kind = Kind, Output = i64> {
        apply(NUMBER, |t: Rc<Token<Kind>>| t.text.parse::<i64>().unwrap_or_default())
    }

    #[test]
    fn lrec_folds_from_the_left() {
        let first = Lexer::builder()
            .keep(r"\d+", Kind::Number)
            .keep(r"-", Kind::Comma)
            .build()
            .unwrap()
            .parse("10-3-2")
            .unwrap();

        let out = lrec_sc(number(), seq(lit("-"), NUMBER), subtract).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(out.candidates()[0].result, 5);

        let out = lrec(number(), seq(lit("-"), NUMBER), subtract).parse(&first);
        let values: Vec<_> = out.candidates().iter().map(|c| c.result).collect();
        assert_eq!(values, vec![5, 7, 10]);
    }

    #[test]
    fn lrec_sc_handles_long_chains() {
        let input = std::iter::repeat("1").take(50_000).collect::<Vec<_>>().join("-");
        let first = Lexer::builder()
            .keep(r"\d+", Kind::Number)
            .keep(r"-", Kind::Comma)
            .build()
            .unwrap()
            .parse(&input)
            .unwrap();

        let out = lrec_sc(number(), seq(lit("-"), NUMBER), subtract).parse(&first);
        assert_eq!(out.candidates()[0].result, 1 - 49_999);
    }
}
