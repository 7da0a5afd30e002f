//! # Grammar Registry
//!
//! Named grammars, looked up case-insensitively, plus the [`Tokenizer`] trait
//! the editor engine consumes. The engine never sees a [`GrammarRegistry`]
//! directly; it holds a `Box<dyn Tokenizer>` so tests can substitute a stub.

use std::collections::HashMap;

use crate::error::{GrammarError, TokenizeError};
use crate::grammar::Grammar;
use crate::languages;
use crate::token::Token;
use crate::tokenize::Matcher;

/// Turns source text into a token tree using a named grammar.
pub trait Tokenizer {
    /// Tokenizes `text` with the grammar registered under `grammar`.
    ///
    /// The returned stream must reproduce `text` exactly when its leaf text is
    /// concatenated. Empty text yields an empty stream.
    fn tokenize(&self, text: &str, grammar: &str) -> Result<Vec<Token>, TokenizeError>;

    fn has_grammar(&self, name: &str) -> bool;

    /// Registers an empty grammar under `name` unless one already exists.
    fn register_fallback_grammar(&mut self, name: &str);
}

/// A set of named grammars with aliases.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, Grammar>,
    aliases: HashMap<String, String>,
}

impl GrammarRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every built-in language and its aliases.
    pub fn with_builtin_languages() -> Result<Self, GrammarError> {
        let mut registry = Self::new();
        for language in languages::BUILTIN {
            registry.register(language.name, (language.grammar)()?);
            for alias in language.aliases {
                registry.alias(alias, language.name);
            }
        }
        log::debug!("Loaded {} built-in grammars", registry.grammars.len());
        Ok(registry)
    }

    /// Adds or replaces the grammar called `name`.
    pub fn register(&mut self, name: &str, grammar: Grammar) {
        self.grammars.insert(name.to_lowercase(), grammar);
    }

    /// Makes `alias` resolve to the grammar called `target`.
    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases
            .insert(alias.to_lowercase(), target.to_lowercase());
    }

    pub fn get(&self, name: &str) -> Option<&Grammar> {
        let name = name.to_lowercase();
        let name = self.aliases.get(&name).unwrap_or(&name);
        self.grammars.get(name)
    }

    /// Registered grammar names (aliases excluded), sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Tokenizer for GrammarRegistry {
    fn tokenize(&self, text: &str, grammar: &str) -> Result<Vec<Token>, TokenizeError> {
        let compiled = self
            .get(grammar)
            .ok_or_else(|| TokenizeError::UnknownGrammar(grammar.to_string()))?;
        Matcher::new(self).run(text, compiled, grammar, 0)
    }

    fn has_grammar(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn register_fallback_grammar(&mut self, name: &str) {
        if !self.has_grammar(name) {
            log::debug!("Registering empty fallback grammar '{name}'");
            self.register(name, Grammar::empty());
        }
    }
}
