//! Grammars of mutually recursive, named productions.
//!
//! Each production is defined by a function that receives a [ModuleView] of
//! the whole module, including productions defined after it, and builds the
//! parser for that production. References obtained through the view are
//! resolved by index when parsed, so productions can refer to each other (and
//! themselves) regardless of declaration order, without forming ownership
//! cycles.
//!
//! ```
//! # use std::rc::Rc;
//! # use parsec::{Lexer, Parser, Token, core::{alt, apply, kmid, lit, tok}, module::ModuleBuilder};
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! # enum Kind { Number, Symbol }
//! let module = ModuleBuilder::<Kind, i64>::new()
//!     .define("GROUP", |m| Box::new(kmid(lit("("), m.get("VALUE"), lit(")"))))
//!     .define("VALUE", |m| {
//!         Box::new(alt(
//!             apply(tok(Kind::Number), |t: Rc<Token<Kind>>| t.text.parse::<i64>().unwrap_or(0)),
//!             m.get("GROUP"),
//!         ))
//!     })
//!     .build();
//!
//! let lexer = Lexer::builder()
//!     .keep(r"\d+", Kind::Number)
//!     .keep(r"[()]", Kind::Symbol)
//!     .build()
//!     .unwrap();
//! let value = module.entry("VALUE").unwrap();
//! assert_eq!(value.parse(&lexer.parse("((42))").unwrap()).candidates()[0].result, 42);
//! ```

use super::*;
use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use std::rc::Weak;

type Definition<K, T> = Box<dyn Fn(&ModuleView<K, T>) -> BoxedParser<K, T>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    #[error("no production named `{0}` in this module")]
    UnknownProduction(String),
}

struct ModuleInner<K, T> {
    names: Vec<String>,
    indices: FxHashMap<String, usize>,
    definitions: Vec<Definition<K, T>>,
    /// Present when built with [ModuleBuilder::build_cached].
    cache: Option<Vec<OnceCell<BoxedParser<K, T>>>>,
}

impl<K, T: Clone> ModuleInner<K, T> {
    fn parse(self: &Rc<Self>, index: usize, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        let build = || (self.definitions[index])(&ModuleView { inner: Rc::downgrade(self) });
        match &self.cache {
            Some(cache) => cache[index].get_or_init(build).parse(token),
            None => build().parse(token),
        }
    }
}

/// Collects the named definitions of a module.
/// - Defining a name twice replaces the earlier definition.
pub struct ModuleBuilder<K, T> {
    names: Vec<String>,
    indices: FxHashMap<String, usize>,
    definitions: Vec<Definition<K, T>>,
}

impl<K, T> Default for ModuleBuilder<K, T> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            indices: FxHashMap::default(),
            definitions: Vec::new(),
        }
    }
}

impl<K, T> ModuleBuilder<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define<F>(mut self, name: impl Into<String>, definition: F) -> Self
    where
        F: Fn(&ModuleView<K, T>) -> BoxedParser<K, T> + 'static,
    {
        let name = name.into();
        match self.indices.get(&name) {
            Some(&index) => self.definitions[index] = Box::new(definition),
            None => {
                self.indices.insert(name.clone(), self.definitions.len());
                self.names.push(name);
                self.definitions.push(Box::new(definition));
            }
        }
        self
    }

    /// Builds a module whose productions are rebuilt from their definitions on
    /// every parse.
    pub fn build(self) -> ParserModule<K, T> {
        self.finish(false)
    }

    /// Builds a module whose productions are each built once, on first use.
    pub fn build_cached(self) -> ParserModule<K, T> {
        self.finish(true)
    }

    /// Builds the module, keeping only the `entry` production.
    pub fn build_entry(self, entry: &str) -> Result<ModuleParser<K, T>, ModuleError> {
        self.build().entry(entry)
    }

    fn finish(self, cached: bool) -> ParserModule<K, T> {
        let cache = cached.then(|| self.definitions.iter().map(|_| OnceCell::new()).collect());
        ParserModule {
            inner: Rc::new(ModuleInner {
                names: self.names,
                indices: self.indices,
                definitions: self.definitions,
                cache,
            }),
        }
    }
}

/// A built module, owning all of its productions.
#[derive_where(Clone)]
pub struct ParserModule<K, T> {
    inner: Rc<ModuleInner<K, T>>,
}

impl<K, T> ParserModule<K, T> {
    pub fn get(&self, name: &str) -> Option<ModuleParser<K, T>> {
        self.inner.indices.get(name).map(|&index| ModuleParser {
            inner: self.inner.clone(),
            index,
        })
    }

    pub fn entry(&self, name: &str) -> Result<ModuleParser<K, T>, ModuleError> {
        self.get(name)
            .ok_or_else(|| ModuleError::UnknownProduction(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.names.iter().map(String::as_str)
    }
}

/// A production of a module, keeping the whole module alive.
#[derive_where(Clone)]
pub struct ModuleParser<K, T> {
    inner: Rc<ModuleInner<K, T>>,
    index: usize,
}

impl<K, T: Clone> Parser for ModuleParser<K, T> {
    type Kind = K;
    type Output = T;

    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        self.inner.parse(self.index, token)
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.inner.names[self.index])
    }
}

/// The module as seen by its own definitions.
pub struct ModuleView<K, T> {
    inner: Weak<ModuleInner<K, T>>,
}

impl<K, T> ModuleView<K, T> {
    /// A reference to the named production.
    /// - Referring to a name that is not defined in the module is a bug in the
    ///   grammar, and panics. See [ModuleView::try_get].
    #[allow(clippy::panic)]
    pub fn get(&self, name: &str) -> ModuleRef<K, T> {
        match self.try_get(name) {
            Some(r) => r,
            None => panic!("no production named `{name}` in this module"),
        }
    }

    pub fn try_get(&self, name: &str) -> Option<ModuleRef<K, T>> {
        let inner = self.inner.upgrade()?;
        let index = *inner.indices.get(name)?;
        Some(ModuleRef {
            inner: self.inner.clone(),
            index,
        })
    }
}

/// A reference between productions of the same module.
#[derive_where(Clone)]
pub struct ModuleRef<K, T> {
    inner: Weak<ModuleInner<K, T>>,
    index: usize,
}

impl<K, T: Clone> Parser for ModuleRef<K, T> {
    type Kind = K;
    type Output = T;

    #[allow(clippy::panic)]
    fn parse(&self, token: &TokenCursor<K>) -> ParseOutput<K, T> {
        // INV: only reachable from a production being parsed, which holds the module.
        match self.inner.upgrade() {
            Some(inner) => inner.parse(self.index, token),
            None => panic!("parsed through a reference into a module that was dropped"),
        }
    }

    fn repr(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.inner.upgrade() {
            Some(inner) => write!(f, "{}", inner.names[self.index]),
            None => write!(f, "<dropped>"),
        }
    }
}
