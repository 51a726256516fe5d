//! Tokenizing text into an immutable chain of [Token]s.
//!
//! A [Lexer] is configured with an ordered list of [LexerRule]s. At each offset
//! the rules are tried in the order declared, and the first to match a
//! non-empty prefix wins (this is not longest-match, so more specific patterns
//! must be declared before more general ones).

use std::{
    fmt::{Debug, Display, Formatter},
    rc::Rc,
};

use regex::Regex;

/// Where a token sits in the input.
/// - `index` is a byte offset.
/// - rows and columns are 1-based, columns count characters.
/// - the end is exclusive (the position just after the token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenPosition {
    pub index: usize,
    pub row_begin: usize,
    pub column_begin: usize,
    pub row_end: usize,
    pub column_end: usize,
}

impl Display for TokenPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row_begin, self.column_begin)
    }
}

/// A lexical unit, linked to the rest of the chain.
/// Tokens are never mutated after the chain is built, so any number of parse
/// branches can share positions in it.
pub struct Token<K> {
    pub kind: K,
    pub text: String,
    pub pos: TokenPosition,
    pub next: TokenCursor<K>,
}

/// A position in a token chain, `None` is the end of the stream.
pub type TokenCursor<K> = Option<Rc<Token<K>>>;

impl<K> Token<K> {
    /// Links tokens (in input order) into a chain, returning the head.
    pub fn chain(tokens: impl IntoIterator<Item = (K, String, TokenPosition)>) -> TokenCursor<K> {
        let tokens: Vec<_> = tokens.into_iter().collect();
        let mut next = None;
        for (kind, text, pos) in tokens.into_iter().rev() {
            next = Some(Rc::new(Token {
                kind,
                text,
                pos,
                next,
            }));
        }
        next
    }

    /// Iterates over this token and all that follow it.
    pub fn iter(self: &Rc<Self>) -> impl Iterator<Item = Rc<Token<K>>> {
        std::iter::successors(Some(self.clone()), |t| t.next.clone())
    }
}

// A long chain would otherwise be dropped recursively, one frame per token.
impl<K> Drop for Token<K> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(token) = next {
            match Rc::try_unwrap(token) {
                Ok(mut token) => next = token.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl<K: Debug> Debug for Token<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

/// The position of the token at a cursor, `None` at the end of the stream.
pub fn position<K>(token: &TokenCursor<K>) -> Option<TokenPosition> {
    token.as_ref().map(|t| t.pos)
}

/// Whether two cursors point at the same token of a chain.
pub fn same_token<K>(a: &TokenCursor<K>, b: &TokenCursor<K>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A rule matched against the input at the current offset.
/// - `pattern` is regular expression source, anchored at the offset.
/// - when `keep` is false the matched text is consumed but no token is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerRule<K> {
    pub keep: bool,
    pub pattern: String,
    pub kind: K,
}

impl<K> LexerRule<K> {
    pub fn keep(pattern: impl Into<String>, kind: K) -> Self {
        Self {
            keep: true,
            pattern: pattern.into(),
            kind,
        }
    }

    pub fn skip(pattern: impl Into<String>, kind: K) -> Self {
        Self {
            keep: false,
            pattern: pattern.into(),
            kind,
        }
    }
}

/// Building a [Lexer] failed.
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    #[error("invalid pattern `{pattern}` for lexer rule {index}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// No rule matched the remaining input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to tokenize the rest of the input: {rest}")]
pub struct TokenError {
    pub pos: TokenPosition,
    pub rest: String,
}

#[derive(Debug, Clone)]
struct CompiledRule<K> {
    keep: bool,
    regex: Regex,
    kind: K,
}

#[derive(Debug, Clone)]
pub struct Lexer<K> {
    rules: Vec<CompiledRule<K>>,
}

impl<K: Clone> Lexer<K> {
    pub fn new(rules: impl IntoIterator<Item = LexerRule<K>>) -> Result<Self, LexerError> {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, LexerRule { keep, pattern, kind })| {
                match Regex::new(&format!("^(?:{pattern})")) {
                    Ok(regex) => Ok(CompiledRule { keep, regex, kind }),
                    Err(source) => Err(LexerError::InvalidPattern {
                        index,
                        pattern,
                        source,
                    }),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    pub fn builder() -> LexerBuilder<K> {
        LexerBuilder { rules: Vec::new() }
    }

    /// Tokenizes the whole input, returning the head of the chain (`None` if
    /// no tokens were kept).
    /// - Fails without producing any tokens if some remaining input matches no rule.
    pub fn parse(&self, input: &str) -> Result<TokenCursor<K>, TokenError> {
        let mut tokens = Vec::new();
        let mut index = 0;
        let (mut row, mut column) = (1, 1);

        while index < input.len() {
            let rest = &input[index..];
            let matched = self.rules.iter().find_map(|rule| {
                rule.regex
                    .find(rest)
                    .filter(|m| !m.is_empty())
                    .map(|m| (rule, m.end()))
            });

            let Some((rule, len)) = matched else {
                return Err(TokenError {
                    pos: TokenPosition {
                        index,
                        row_begin: row,
                        column_begin: column,
                        row_end: row,
                        column_end: column,
                    },
                    rest: rest.to_owned(),
                });
            };

            let text = &rest[..len];
            let (row_end, column_end) = advance(row, column, text);
            if rule.keep {
                tokens.push((
                    rule.kind.clone(),
                    text.to_owned(),
                    TokenPosition {
                        index,
                        row_begin: row,
                        column_begin: column,
                        row_end,
                        column_end,
                    },
                ));
            }
            index += len;
            (row, column) = (row_end, column_end);
        }

        Ok(Token::chain(tokens))
    }
}

fn advance(mut row: usize, mut column: usize, text: &str) -> (usize, usize) {
    for c in text.chars() {
        if c == '\n' {
            row += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (row, column)
}

/// Declares [LexerRule]s in precedence order.
pub struct LexerBuilder<K> {
    rules: Vec<LexerRule<K>>,
}

impl<K: Clone> LexerBuilder<K> {
    pub fn keep(mut self, pattern: impl Into<String>, kind: K) -> Self {
        self.rules.push(LexerRule::keep(pattern, kind));
        self
    }

    pub fn skip(mut self, pattern: impl Into<String>, kind: K) -> Self {
        self.rules.push(LexerRule::skip(pattern, kind));
        self
    }

    pub fn build(self) -> Result<Lexer<K>, LexerError> {
        Lexer::new(self.rules)
    }
}
