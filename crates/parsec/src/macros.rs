//! Helper macros for long chains of combinators.

/// Helper to combine deeply nested sequences, results nest to the right.
/// ```
/// # use parsec::{Lexer, Parser, seqs, core::lit};
/// // seq(P1, seq(P2, seq(P3, P4)))
/// // is equivalent to
/// let p = seqs!(lit::<()>("a"), lit("b"), lit("c"), lit("d"));
///
/// let lexer = Lexer::builder().keep(r"[a-z]", ()).build().unwrap();
/// let out = p.parse(&lexer.parse("abcd").unwrap());
/// let (a, (_, (_, d))) = &out.candidates()[0].result;
/// assert_eq!((a.text.as_str(), d.text.as_str()), ("a", "d"));
/// ```
#[macro_export]
macro_rules! seqs {
    ($p:expr $(,)?) => {
        $p
    };
    ($p:expr , $($ts:tt)+) => {
        $crate::core::seq($p, $crate::seqs!($($ts)+))
    };
}

/// Helper to combine deeply nested alternatives.
/// ```ignore
/// alt(P1, alt(P2, alt(P3, P4)))
/// // is equivalent to
/// alts!(P1, P2, P3, P4)
/// ```
#[macro_export]
macro_rules! alts {
    ($p:expr $(,)?) => {
        $p
    };
    ($p:expr , $($ts:tt)+) => {
        $crate::core::alt($p, $crate::alts!($($ts)+))
    };
}

/// Helper to chain context-sensitive steps, each function receiving the
/// value of the step before it.
/// ```ignore
/// combine(combine(P, F1), F2)
/// // is equivalent to
/// combines!(P, F1, F2)
/// ```
#[macro_export]
macro_rules! combines {
    ($p:expr $(,)?) => {
        $p
    };
    ($p:expr , $f:expr $(, $fs:expr)* $(,)?) => {
        $crate::combines!($crate::monadic::combine($p, $f) $(, $fs)*)
    };
}
