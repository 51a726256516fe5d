//! Deferred construction and forward references, for recursive grammars.
//!
//! Rust values cannot refer to themselves, so a recursive production is
//! either deferred ([lazy], [lazy_cached]) or routed through a write-once
//! [Rule] slot that is filled after the parsers referencing it are built.

use super::*;
use once_cell::unsync::OnceCell;
use std::rc::Weak;

/// Builds the parser from the thunk on every call, so it always sees the
/// current state of any [Rule]s it refers to.
/// ```
/// # use parsec::{Lexer, Parser, BoxedParser, core::{alt, kmid, lit, apply}, recursive::lazy};
/// // nest ::= "x" | "(" nest ")"
/// fn nest() -> BoxedParser<(), usize> {
///     Box::new(alt(
///         apply(lit("x"), |_| 0),
///         apply(kmid(lit("("), lazy(nest), lit(")")), |depth: usize| depth + 1),
///     ))
/// }
///
/// let lexer = Lexer::builder().keep(r"[x()]", ()).build().unwrap();
/// let out = nest().parse(&lexer.parse("((x))").unwrap());
/// assert_eq!(out.candidates()[0].result, 2);
/// ```
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct lazy<F>(pub F);

impl<F, P> Parser for lazy<F>
where
    F: Fn() -> P,
    P: Parser,
{
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        (self.0)().parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "<lazy>")
    }
}

/// Like [lazy], but the parser is built on the first call and reused after.
pub fn lazy_cached<F, P>(thunk: F) -> LazyCached<F, P>
where
    F: Fn() -> P,
    P: Parser,
{
    LazyCached {
        thunk,
        parser: OnceCell::new(),
    }
}

pub struct LazyCached<F, P> {
    thunk: F,
    parser: OnceCell<P>,
}

impl<F, P> Parser for LazyCached<F, P>
where
    F: Fn() -> P,
    P: Parser,
{
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        self.parser.get_or_init(&self.thunk).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.parser.get() {
            Some(p) => p.repr(f),
            None => write!(f, "<lazy>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("the pattern of this rule has already been set")]
    AlreadySet,
}

type Slot<K, T> = OnceCell<BoxedParser<K, T>>;

/// Creates an empty [Rule].
pub fn rule<K, T>() -> Rule<K, T> {
    Rule {
        slot: Rc::new(OnceCell::new()),
    }
}

/// A write-once slot for a parser, usable in a grammar before its pattern is set.
/// - Clones share the slot.
/// - A pattern referring back to its own rule should do so through
///   [Rule::handle], a clone of the rule would keep the slot alive forever.
/// - Parsing through a rule whose pattern was never set is a bug in the
///   grammar, and panics.
/// ```
/// # use parsec::{Lexer, Parser, core::{alt, seq, lit, apply}, recursive::rule};
/// // ones ::= "1" ones | "1"
/// let ones = rule::<(), usize>();
/// ones.set_pattern(alt(
///     apply(seq(lit("1"), ones.handle()), |(_, n): (_, usize)| n + 1),
///     apply(lit("1"), |_| 1),
/// )).unwrap();
///
/// let lexer = Lexer::builder().keep("1", ()).build().unwrap();
/// let out = ones.parse(&lexer.parse("111").unwrap());
/// assert_eq!(out.candidates()[0].result, 3);
/// ```
#[derive_where(Clone)]
pub struct Rule<K, T> {
    slot: Rc<Slot<K, T>>,
}

impl<K, T> Rule<K, T> {
    /// Sets the pattern, failing if it was already set.
    pub fn set_pattern<P>(&self, pattern: P) -> Result<(), RuleError>
    where
        P: Parser<Kind = K, Output = T> + 'static,
    {
        self.slot
            .set(Box::new(pattern))
            .map_err(|_| RuleError::AlreadySet)
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    /// A reference to this rule that does not keep it alive.
    pub fn handle(&self) -> RuleHandle<K, T> {
        RuleHandle {
            slot: Rc::downgrade(&self.slot),
        }
    }
}

#[allow(clippy::panic)]
fn pattern<K, T>(slot: &Slot<K, T>) -> &BoxedParser<K, T> {
    match slot.get() {
        Some(p) => p,
        None => panic!("parsed through a rule whose pattern was never set"),
    }
}

impl<K, T: Clone> Parser for Rule<K, T> {
    type Kind = K;
    type Output = T;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        pattern(&self.slot).parse(token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.slot.get() {
            Some(p) => p.repr(f),
            None => write!(f, "<unset>"),
        }
    }
}

/// A weak reference to a [Rule], see [Rule::handle].
/// - Parsing through a handle after every clone of its rule was dropped panics.
#[derive_where(Clone)]
pub struct RuleHandle<K, T> {
    slot: Weak<Slot<K, T>>,
}

impl<K, T: Clone> Parser for RuleHandle<K, T> {
    type Kind = K;
    type Output = T;

    #[allow(clippy::panic)]
    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        // INV: a handle is only reachable from the rule's own pattern, unless
        //      leaked out of the grammar by the user.
        match self.slot.upgrade() {
            Some(slot) => pattern(&slot).parse(token),
            None => panic!("parsed through a handle to a rule that was dropped"),
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "...")
    }
}
