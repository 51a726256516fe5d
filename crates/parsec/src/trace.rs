//! Tracing for parsers.
//!
//! Wrapping a parser in [traced] outputs a human-readable trace on standard
//! error each time it is entered and exited, when the `trace-stderr` feature
//! flag is enabled. Otherwise [traced] is a pass-through.
//!
//! _These traces are not meant to be machine-readable!_
//! The format is subject to change without notice.

use super::*;

/// Receives the entry and exit of a [traced] parser.
/// - There is no means to return an error, a failure to output the trace
///   should not interrupt parsing.
pub trait ParserTrace {
    fn trace_enter<P: Parser>(label: &str, parser: &P, token: &TokenCursor<P::Kind>);

    fn trace_exit<K, T>(label: &str, output: &ParseOutput<K, T>);
}

/// Perform no tracing.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl ParserTrace for VoidTrace {
    fn trace_enter<P: Parser>(_label: &str, _parser: &P, _token: &TokenCursor<P::Kind>) {
        // Do nothing at all.
    }

    fn trace_exit<K, T>(_label: &str, _output: &ParseOutput<K, T>) {
        // Do nothing at all.
    }
}

/// Human-readable [ParserTrace] on standard error.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

fn describe<K>(token: &TokenCursor<K>) -> String {
    match token {
        Some(t) => format!("{:?} at {}", t.text, t.pos),
        None => String::from("<END-OF-FILE>"),
    }
}

impl ParserTrace for HumanReadableTrace {
    fn trace_enter<P: Parser>(label: &str, parser: &P, token: &TokenCursor<P::Kind>) {
        eprint!(
            "\
[{label}] enter
| ==> parser: {parser}
| ==> at: {at}
|\n",
            parser = Repr(parser),
            at = describe(token),
        );
    }

    fn trace_exit<K, T>(label: &str, output: &ParseOutput<K, T>) {
        let ends: Vec<_> = output
            .candidates()
            .iter()
            .map(|c| describe(&c.next_token))
            .collect();
        eprint!(
            "\
| ==> [{label}] exit with {count} candidate(s)\n",
            count = ends.len(),
        );
        for end in ends {
            eprintln!("|  |  stops before {end}");
        }
        if let Some(err) = output.error() {
            let at = match err.pos {
                Some(pos) => pos.to_string(),
                None => String::from("<END-OF-FILE>"),
            };
            eprint!(
                "\
|
| ==> !!! error at {at}: {err}
|  |  {err:?}\n",
            );
        }
        eprint!(
            "= note: this trace was output as a debugging aid \
             because `cfg(feature = \"trace-stderr\")`.\n\n"
        );
    }
}

#[cfg(feature = "trace-stderr")]
pub type DefaultTrace = HumanReadableTrace;

#[cfg(not(feature = "trace-stderr"))]
pub type DefaultTrace = VoidTrace;

/// Traces the entry and exit of `P` with [DefaultTrace], under a label.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub struct traced<P>(pub &'static str, pub P)
where
    P: Parser;

impl<P: Parser> Parser for traced<P> {
    type Kind = P::Kind;
    type Output = P::Output;

    fn parse(&self, token: &TokenCursor<Self::Kind>) -> ParseOutput<Self::Kind, Self::Output> {
        DefaultTrace::trace_enter(self.0, &self.1, token);
        let output = self.1.parse(token);
        DefaultTrace::trace_exit(self.0, &output);
        output
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.1.repr(f)
    }
}
