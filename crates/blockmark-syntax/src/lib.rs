//! # blockmark-syntax
//!
//! Grammar-driven tokenizer for code block highlighting.
//!
//! Given a grammar name and some source text, the tokenizer returns a nested
//! token tree (see [`token`]). The editor engine turns that tree into
//! per-block decoration ranges; this crate knows nothing about documents.
//!
//! ## Architecture Overview
//!
//! ```text
//! (grammar name, text) → GrammarRegistry → Grammar → Matcher → Vec<Token>
//!                        (name + aliases)   (rules)   (greedy, then ordered)
//! ```
//!
//! - [`grammar`]: rule definitions and the [`GrammarBuilder`] that compiles
//!   them. The module docs describe how greedy, ordered, narrowed and
//!   nested rules interact.
//! - [`registry`]: the [`Tokenizer`] trait and [`GrammarRegistry`], its only
//!   production implementation.
//! - `languages`: built-in grammars for text, python, javascript,
//!   typescript, rust, json, bash, css and sql.
//!
//! ## Module Structure
//!
//! ```text
//! blockmark-syntax/
//! ├── lib.rs        # This file - public API
//! ├── token.rs      # Token tree and the text-preservation helpers
//! ├── grammar.rs    # Grammar, Rule, TokenRule, GrammarBuilder
//! ├── tokenize.rs   # Matcher: greedy pass then ordered passes
//! ├── registry.rs   # Tokenizer trait, GrammarRegistry
//! ├── error.rs      # GrammarError, TokenizeError
//! └── languages/    # Built-in grammars
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use blockmark_syntax::{GrammarRegistry, Token, Tokenizer};
//!
//! let registry = GrammarRegistry::with_builtin_languages().unwrap();
//! let tokens = registry.tokenize("x = 1", "python").unwrap();
//!
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::plain("x "),
//!         Token::typed("operator", "="),
//!         Token::plain(" "),
//!         Token::typed("number", "1"),
//!     ]
//! );
//! ```
//!
//! Unknown grammar names are an error, not a silent fallback; callers that
//! want plain text for unknown languages register an empty grammar with
//! [`Tokenizer::register_fallback_grammar`].

pub mod error;
pub mod grammar;
mod languages;
pub mod registry;
pub mod token;
mod tokenize;

pub use error::{GrammarError, TokenizeError};
pub use grammar::{Grammar, GrammarBuilder, TokenRule};
pub use registry::{GrammarRegistry, Tokenizer};
pub use token::{Token, TokenContent, TypedToken};
pub use tokenize::MAX_NESTING;
