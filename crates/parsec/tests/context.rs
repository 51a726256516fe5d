//! Grammars whose shape depends on values parsed earlier, and recovering from errors.

use std::rc::Rc;

use parsec::{
    combines,
    core::{apply, fail, kright, lit, seq, tok},
    eval::{expect_eof, expect_single_result},
    monadic::combine,
    recovery::{err, errd},
    repeat::{list_n, rep_n},
    BoxedParser, Lexer, Parser, Token, TokenCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Number,
    Identifier,
    Comma,
    Semicolon,
    Space,
}

fn lex(input: &str) -> TokenCursor<Kind> {
    Lexer::builder()
        .keep(r"\d+", Kind::Number)
        .keep(r"[a-zA-Z]\w*", Kind::Identifier)
        .keep(",", Kind::Comma)
        .keep(";", Kind::Semicolon)
        .skip(r"\s+", Kind::Space)
        .build()
        .unwrap()
        .parse(input)
        .unwrap()
}

fn number() -> impl Parser<Kind = Kind, Output = usize> + Clone {
    apply(tok(Kind::Number), |t: Rc<Token<Kind>>| t.text.parse().unwrap_or(0))
}

fn name() -> impl Parser<Kind = Kind, Output = String> + Clone {
    apply(tok(Kind::Identifier), |t: Rc<Token<Kind>>| t.text.clone())
}

/// NAME_LIST ::= n:NUMBER NAME ("," NAME){n-1}
fn name_list() -> impl Parser<Kind = Kind, Output = Vec<String>> {
    combine(number(), |count: usize| -> BoxedParser<Kind, Vec<String>> {
        if count < 1 {
            Box::new(fail("The number of names must be at least 1."))
        } else {
            Box::new(list_n(name(), lit(","), count))
        }
    })
}

#[test]
fn zero_names_is_an_error() {
    let out = name_list().parse(&lex("0"));
    assert!(!out.is_success());
    assert_eq!(
        out.error().map(|e| e.message.as_str()),
        Some("The number of names must be at least 1.")
    );
}

#[test]
fn count_selects_the_list_length() {
    for (input, expected) in [
        ("1 a", vec!["a"]),
        ("2 a, b", vec!["a", "b"]),
        ("3 a, b, c", vec!["a", "b", "c"]),
    ] {
        let result = expect_single_result(expect_eof(name_list().parse(&lex(input))));
        assert_eq!(result, Ok(expected.into_iter().map(String::from).collect::<Vec<_>>()));
    }
}

#[test]
fn too_few_names_fails_at_end_of_file() {
    let out = name_list().parse(&lex("3 a, b"));
    assert!(!out.is_success());
    assert_eq!(out.error().and_then(|e| e.pos), None);
}

#[test]
fn extra_names_are_left_unconsumed() {
    let out = expect_eof(name_list().parse(&lex("1 a, b")));
    assert!(!out.is_success());
    assert_eq!(
        out.error().map(|e| e.message.as_str()),
        Some("The parser cannot reach the end of file, stops at \",\" at position 1:4.")
    );
}

#[test]
fn chained_steps() {
    // a count, that many names, then the names echoed back in order
    let p = combines!(
        number(),
        |count: usize| list_n(name(), lit(","), count),
        |names: Vec<String>| -> BoxedParser<Kind, usize> {
            let mut echo: BoxedParser<Kind, usize> = Box::new(apply(lit(";"), |_| 0));
            for expected in names.into_iter().rev() {
                echo = Box::new(apply(kright(lit(expected), echo), |n: usize| n + 1));
            }
            echo
        },
    );

    let value = expect_single_result(expect_eof(p.parse(&lex("2 x, y x y;"))));
    assert_eq!(value, Ok(2));
    assert!(!p.parse(&lex("2 x, y y x;")).is_success());
}

/// STATEMENTS ::= (NAME NUMBER ";"){count}
/// where a missing number is reported and replaced by zero.
fn statements(count: usize) -> impl Parser<Kind = Kind, Output = Vec<(String, usize)>> {
    let value = errd(number(), String::from("expected a number"), 0);
    let terminator = err(lit(";"), String::from("expected `;`"));
    let statement = apply(seq(name(), seq(value, terminator)), |(n, (v, _))| (n, v));
    rep_n(statement, count)
}

#[test]
fn recovered_errors_are_reported_alongside_results() {
    let first = lex("a 1; b; c 3;");
    let out = statements(3).parse(&first);
    let error = out.error().cloned().unwrap();
    let results = expect_single_result(expect_eof(out)).unwrap();

    assert_eq!(
        results,
        vec![
            (String::from("a"), 1),
            (String::from("b"), 0),
            (String::from("c"), 3)
        ]
    );
    assert_eq!(error.message, "expected a number");
    assert_eq!(error.pos.map(|p| (p.row_begin, p.column_begin)), Some((1, 7)));
}
