//! The primitive matchers and structural combinators upon which others are built.
//! - Each has a type, (sometimes) a construction function and a [Parser] implementation.
//! - Combinators taking several sub-parsers explore all of them, use the `_sc`
//!   variants to commit to the first that succeeds.

use super::*;
use crate::lexer::same_token;
use std::{fmt::Debug, marker::PhantomData};

/// Always succeeds without consuming, producing `()`.
pub fn nil<K>() -> Nil<K> {
    Nil(PhantomData)
}

#[derive_where(Clone, Copy, Debug)]
pub struct Nil<K>(PhantomData<K>);

impl<K> Parser for Nil<K> {
    type Kind = K;
    type Output = ();

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, ()> {
        ParseOutput::Suc {
            candidates: vec![ParseResult::empty(token, ())],
            error: None,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "<nil>")
    }
}

/// Always succeeds without consuming, producing `value`.
pub fn succ<K, T: Clone>(value: T) -> Succ<K, T> {
    Succ {
        value,
        _marker: PhantomData,
    }
}

#[derive_where(Clone; T: Clone)]
#[derive_where(Debug; T: Debug)]
pub struct Succ<K, T> {
    value: T,
    _marker: PhantomData<K>,
}

impl<K, T: Clone> Parser for Succ<K, T> {
    type Kind = K;
    type Output = T;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        ParseOutput::Suc {
            candidates: vec![ParseResult::empty(token, self.value.clone())],
            error: None,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "<succ>")
    }
}

/// Always fails with `message` at the current position.
pub fn fail<K, T>(message: impl Into<String>) -> Fail<K, T> {
    Fail {
        message: message.into(),
        _marker: PhantomData,
    }
}

#[derive_where(Clone, Debug)]
pub struct Fail<K, T> {
    message: String,
    _marker: PhantomData<(K, T)>,
}

impl<K, T: Clone> Parser for Fail<K, T> {
    type Kind = K;
    type Output = T;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        ParseOutput::Err(ParseError::custom(self.message.clone(), token))
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "<fail: {}>", self.message)
    }
}

fn consume<K>(
    token: &TokenCursor<K>,
    matches: impl Fn(&Token<K>) -> bool,
) -> ParseOutput<K, Rc<Token<K>>> {
    match token {
        Some(t) if matches(t) => ParseOutput::Suc {
            candidates: vec![ParseResult {
                first_token: token.clone(),
                next_token: t.next.clone(),
                result: t.clone(),
            }],
            error: None,
        },
        _ => ParseOutput::Err(ParseError::unconsumed(token)),
    }
}

/// Matches a token whose text is exactly the literal.
pub fn lit<K>(text: impl Into<String>) -> Lit<K> {
    Lit {
        text: text.into(),
        _marker: PhantomData,
    }
}

#[derive_where(Clone, Debug)]
pub struct Lit<K> {
    text: String,
    _marker: PhantomData<K>,
}

impl<K> Parser for Lit<K> {
    type Kind = K;
    type Output = Rc<Token<K>>;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, Self::Output> {
        consume(token, |t| t.text == self.text)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{:?}", self.text)
    }
}

/// Matches a token of the given kind.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct tok<K>(pub K);

impl<K: PartialEq + Debug> Parser for tok<K> {
    type Kind = K;
    type Output = Rc<Token<K>>;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, Self::Output> {
        consume(token, |t| t.kind == self.0)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "<{:?}>", self.0)
    }
}

/// Matches a token that is exactly one character in `min..=max`.
/// - If `min > max` it always fails with an invalid range error, whatever the input.
pub fn range<K>(min: char, max: char) -> Range<K> {
    Range {
        min,
        max,
        _marker: PhantomData,
    }
}

#[derive_where(Clone, Copy, Debug)]
pub struct Range<K> {
    min: char,
    max: char,
    _marker: PhantomData<K>,
}

impl<K> Parser for Range<K> {
    type Kind = K;
    type Output = Rc<Token<K>>;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, Self::Output> {
        if self.min > self.max {
            return ParseOutput::Err(ParseError::invalid_range(self.min, self.max, token));
        }
        consume(token, |t| {
            let mut chars = t.text.chars();
            matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if (self.min..=self.max).contains(&c)
            )
        })
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "[{}-{}]", self.min, self.max)
    }
}

/// Applies a first [Parser], then the second from the end of every candidate
/// of the first, producing both results as a tuple.
/// - Fails only if every path fails, with the best error across them.
/// ```
/// # use parsec::{Lexer, Parser, core::{seq, lit}};
/// let lexer = Lexer::builder().keep(r"[a-z]", ()).build().unwrap();
/// let tokens = lexer.parse("ab").unwrap();
/// assert!(seq(lit("a"), lit("b")).parse(&tokens).is_success());
/// assert!(!seq(lit("b"), lit("a")).parse(&tokens).is_success());
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct seq<P1, P2>(pub P1, pub P2)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>;

impl<P1, P2> Parser for seq<P1, P2>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>,
{
    type Kind = P1::Kind;
    type Output = (P1::Output, P2::Output);

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let (firsts, mut error) = self.0.parse(token).into_parts();
        let mut candidates = Vec::new();
        for first in firsts {
            let (seconds, e) = self.1.parse(&first.next_token).into_parts();
            error = better_error(error, e);
            for second in seconds {
                candidates.push(ParseResult {
                    first_token: token.clone(),
                    next_token: second.next_token,
                    result: (first.result.clone(), second.result),
                });
            }
        }
        result_or_error(candidates, error, token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}", Repr(&self.0), Repr(&self.1))
    }
}

/// Applies `P1` then `P2`, keeping only the result of `P1`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct kleft<P1, P2>(pub P1, pub P2)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>;

impl<P1, P2> Parser for kleft<P1, P2>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>,
{
    type Kind = P1::Kind;
    type Output = P1::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        seq(&self.0, &self.1).parse(token).map(|(l, _)| l)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}", Repr(&self.0), Repr(&self.1))
    }
}

/// Applies `P1`, `P2` then `P3`, keeping only the result of `P2`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct kmid<P1, P2, P3>(pub P1, pub P2, pub P3)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>,
    P3: Parser<Kind = P1::Kind>;

impl<P1, P2, P3> Parser for kmid<P1, P2, P3>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>,
    P3: Parser<Kind = P1::Kind>,
{
    type Kind = P1::Kind;
    type Output = P2::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        seq(&self.0, seq(&self.1, &self.2))
            .parse(token)
            .map(|(_, (m, _))| m)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {} {}", Repr(&self.0), Repr(&self.1), Repr(&self.2))
    }
}

/// Applies `P1` then `P2`, keeping only the result of `P2`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct kright<P1, P2>(pub P1, pub P2)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>;

impl<P1, P2> Parser for kright<P1, P2>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind>,
{
    type Kind = P1::Kind;
    type Output = P2::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        seq(&self.0, &self.1).parse(token).map(|(_, r)| r)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}", Repr(&self.0), Repr(&self.1))
    }
}

/// Applies a provided function to the value of every candidate.
#[allow(non_camel_case_types)]
#[derive_where(Clone; P: Clone, F: Clone)]
#[derive_where(Debug; P: Debug, F: Debug)]
pub struct apply<P, F>(pub P, pub F)
where
    P: Parser;

impl<R, P, F> Parser for apply<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> R,
    R: Clone,
{
    type Kind = P::Kind;
    type Output = R;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, R> {
        self.0.parse(token).map(&self.1)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.0.repr(f)
    }
}

/// Like [apply], but the function also receives the span
/// `(first_token, next_token)` of the candidate.
#[allow(non_camel_case_types)]
#[derive_where(Clone; P: Clone, F: Clone)]
#[derive_where(Debug; P: Debug, F: Debug)]
pub struct apply_span<P, F>(pub P, pub F)
where
    P: Parser;

impl<R, P, F> Parser for apply_span<P, F>
where
    P: Parser,
    F: Fn(P::Output, (&TokenCursor<P::Kind>, &TokenCursor<P::Kind>)) -> R,
    R: Clone,
{
    type Kind = P::Kind;
    type Output = R;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, R> {
        match self.0.parse(token) {
            ParseOutput::Suc { candidates, error } => ParseOutput::Suc {
                candidates: candidates
                    .into_iter()
                    .map(|c| {
                        let result = (self.1)(c.result, (&c.first_token, &c.next_token));
                        ParseResult {
                            first_token: c.first_token,
                            next_token: c.next_token,
                            result,
                        }
                    })
                    .collect(),
                error,
            },
            ParseOutput::Err(e) => ParseOutput::Err(e),
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.0.repr(f)
    }
}

/// Applies both parsers from the same token, concatenating all candidates of
/// both (`P1`'s first).
/// - This is true ambiguity, both may succeed, even over the same span.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct alt<P1, P2>(pub P1, pub P2)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind, Output = P1::Output>;

impl<P1, P2> Parser for alt<P1, P2>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind, Output = P1::Output>,
{
    type Kind = P1::Kind;
    type Output = P1::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let (mut candidates, e1) = self.0.parse(token).into_parts();
        let (others, e2) = self.1.parse(token).into_parts();
        candidates.extend(others);
        result_or_error(candidates, better_error(e1, e2), token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({} | {})", Repr(&self.0), Repr(&self.1))
    }
}

/// Applies `P1`, and only if it fails applies `P2`.
/// - The error of a failed `P1` is still merged into the output of `P2`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct alt_sc<P1, P2>(pub P1, pub P2)
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind, Output = P1::Output>;

impl<P1, P2> Parser for alt_sc<P1, P2>
where
    P1: Parser,
    P2: Parser<Kind = P1::Kind, Output = P1::Output>,
{
    type Kind = P1::Kind;
    type Output = P1::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match self.0.parse(token) {
            ParseOutput::Err(e1) => match self.1.parse(token) {
                ParseOutput::Suc { candidates, error } => ParseOutput::Suc {
                    candidates,
                    error: better_error(Some(e1), error),
                },
                ParseOutput::Err(e2) => ParseOutput::Err(e1.merge(e2)),
            },
            success => success,
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({} / {})", Repr(&self.0), Repr(&self.1))
    }
}

/// Optionally applies `P`, producing both the matched candidates (as `Some`)
/// and a zero-width `None` candidate.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct opt<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for opt<P> {
    type Kind = P::Kind;
    type Output = Option<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        let (candidates, error) = self.0.parse(token).into_parts();
        let mut candidates: Vec<_> = candidates.into_iter().map(|c| c.map(Some)).collect();
        candidates.push(ParseResult::empty(token, None));
        ParseOutput::Suc { candidates, error }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}?", Repr(&self.0))
    }
}

/// Applies `P` if it succeeds, otherwise succeeds with `None`, never both.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct opt_sc<P>(pub P)
where
    P: Parser;

impl<P: Parser> Parser for opt_sc<P> {
    type Kind = P::Kind;
    type Output = Option<P::Output>;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        match self.0.parse(token) {
            ParseOutput::Err(e) => ParseOutput::Suc {
                candidates: vec![ParseResult::empty(token, None)],
                error: Some(e),
            },
            success => success.map(Some),
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}?!", Repr(&self.0))
    }
}

/// Whether a candidate consumed no tokens.
pub fn is_zero_width<K, T>(candidate: &ParseResult<K, T>) -> bool {
    same_token(&candidate.first_token, &candidate.next_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::position;

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
            .skip(r",", Kind::Comma)
            .skip(r"\s+", Kind::Space)
            .build()
            .unwrap()
            .parse(input)
            .unwrap()
    }

    fn next(token: &TokenCursor<Kind>) -> TokenCursor<Kind> {
        token.as_ref().and_then(|t| t.next.clone())
    }

    fn texts(output: &ParseOutput<Kind, Rc<Token<Kind>>>) -> Vec<&str> {
        output
            .candidates()
            .iter()
            .map(|c| c.result.text.as_str())
            .collect()
    }

    #[test]
    fn nil_and_succ_are_zero_width() {
        let first = lex("123");
        let out = succ(7).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(out.candidates()[0].result, 7);
        assert!(is_zero_width(&out.candidates()[0]));
        assert!(nil().parse(&first).is_success());
        assert!(nil::<Kind>().parse(&None).is_success());
    }

    #[test]
    fn fail_reports_message_at_position() {
        let first = lex("abc");
        let out = fail::<Kind, ()>("nope").parse(&first);
        let error = out.error().unwrap();
        assert_eq!(error.message, "nope");
        assert_eq!(error.kind, ParseErrorKind::Custom);
        assert_eq!(error.pos.map(|p| p.index), Some(0));
    }

    #[test]
    fn lit_matches_text() {
        let first = lex("123,456");
        let out = lit("123").parse(&first);
        assert_eq!(texts(&out), vec!["123"]);
        assert!(same_token(&out.candidates()[0].next_token, &next(&first)));

        let out = lit::<Kind>("456").parse(&first);
        assert_eq!(
            out.error().map(|e| e.message.as_str()),
            Some("Unable to consume token: 123")
        );
    }

    #[test]
    fn tok_matches_kind() {
        let first = lex("123,456");
        assert_eq!(texts(&tok(Kind::Number).parse(&first)), vec!["123"]);
        assert!(!tok(Kind::Identifier).parse(&first).is_success());
    }

    #[test]
    fn matchers_fail_at_end_of_stream() {
        let out = tok(Kind::Number).parse(&None);
        let error = out.error().unwrap();
        assert_eq!(error.pos, None);
        assert_eq!(error.message, "Unable to consume token: <END-OF-FILE>");
    }

    #[test]
    fn range_matches_single_characters() {
        let first = lex("b bc 9");
        assert_eq!(texts(&range('a', 'c').parse(&first)), vec!["b"]);
        assert!(!range('a', 'c').parse(&next(&first)).is_success());
        assert!(!range('a', 'c').parse(&next(&next(&first))).is_success());
    }

    #[test]
    fn inverted_range_is_invalid_regardless_of_input() {
        for input in ["b", "123", ""] {
            let out = range::<Kind>('z', 'a').parse(&lex(input));
            assert_eq!(out.error().map(|e| e.kind), Some(ParseErrorKind::InvalidRange));
        }
    }

    #[test]
    fn seq_threads_tokens() {
        let first = lex("123, 456");
        let out = seq(tok(Kind::Number), tok(Kind::Number)).parse(&first);
        let [candidate] = out.candidates() else {
            panic!("expected one candidate");
        };
        assert_eq!(candidate.result.0.text, "123");
        assert_eq!(candidate.result.1.text, "456");
        assert!(candidate.next_token.is_none());
        assert!(same_token(&candidate.first_token, &first));

        assert!(!seq(tok(Kind::Number), tok(Kind::Identifier)).parse(&first).is_success());
    }

    #[test]
    fn seq_reports_furthest_error() {
        let first = lex("123 456 abc");
        let out = seq(tok(Kind::Number), seq(tok(Kind::Number), tok(Kind::Number))).parse(&first);
        let error = out.error().unwrap();
        assert!(!out.is_success());
        assert_eq!(error.pos.map(|p| p.index), Some(8));
    }

    #[test]
    fn projections() {
        let first = lex("123,456,789");
        let number = tok(Kind::Number);

        let out = kleft(number, seq(number, number)).parse(&first);
        assert_eq!(texts(&out), vec!["123"]);
        assert!(out.candidates()[0].next_token.is_none());

        let out = kmid(number, number, number).parse(&first);
        assert_eq!(texts(&out), vec!["456"]);

        let out = kright(number, kright(number, number)).parse(&first);
        assert_eq!(texts(&out), vec!["789"]);
    }

    #[test]
    fn alt_keeps_every_branch() {
        let first = lex("123");
        let alt1 = alt(tok(Kind::Number), tok(Kind::Identifier));
        let alt2 = alt(tok(Kind::Identifier), tok(Kind::Number));
        let out = alt(alt1, alt2).parse(&first);
        assert_eq!(texts(&out), vec!["123", "123"]);
        assert!(out
            .candidates()
            .iter()
            .all(|c| same_token(&c.first_token, &first) && c.next_token.is_none()));
    }

    #[test]
    fn alt_sc_commits_to_first_success() {
        let first = lex("123,456");
        let alt1 = apply(alt(tok(Kind::Number), tok(Kind::Identifier)), |t: Rc<Token<Kind>>| {
            format!("alt1: {}", t.text)
        });
        let alt2 = apply(alt(tok(Kind::Identifier), tok(Kind::Number)), |t: Rc<Token<Kind>>| {
            format!("alt2: {}", t.text)
        });
        let out = alt_sc(&alt1, &alt2).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(out.candidates()[0].result, "alt1: 123");

        let ident = apply(tok(Kind::Identifier), |t: Rc<Token<Kind>>| format!("alt1: {}", t.text));
        let out = alt_sc(ident, &alt2).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert_eq!(out.candidates()[0].result, "alt2: 123");
        assert_eq!(out.error().map(|e| e.kind), Some(ParseErrorKind::Unconsumed));
    }

    #[test]
    fn opt_yields_both() {
        let first = lex("123,456");
        let out = opt(tok(Kind::Number)).parse(&first);
        let [matched, skipped] = out.candidates() else {
            panic!("expected two candidates");
        };
        assert_eq!(matched.result.as_ref().map(|t| t.text.as_str()), Some("123"));
        assert!(same_token(&matched.next_token, &next(&first)));
        assert!(skipped.result.is_none());
        assert!(is_zero_width(skipped));
    }

    #[test]
    fn opt_sc_yields_one() {
        let first = lex("123,456");
        let out = opt_sc(tok(Kind::Number)).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert!(out.candidates()[0].result.is_some());

        let out = opt_sc(tok(Kind::Identifier)).parse(&first);
        assert_eq!(out.candidates().len(), 1);
        assert!(out.candidates()[0].result.is_none());
        assert!(is_zero_width(&out.candidates()[0]));
    }

    #[test]
    fn apply_span_sees_the_span() {
        let first = lex("12 34");
        let out = apply_span(
            seq(tok(Kind::Number), tok(Kind::Number)),
            |_, (start, end): (&TokenCursor<Kind>, &TokenCursor<Kind>)| {
                (position(start).map(|p| p.index), end.is_none())
            },
        )
        .parse(&first);
        assert_eq!(out.candidates()[0].result, (Some(0), true));
    }
}
