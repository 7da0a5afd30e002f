//! # Update Coordinator
//!
//! Decides when decorations must be recomputed and publishes the result.
//!
//! - Selection-only changes never recompute.
//! - A document without code blocks keeps whatever table it had.
//! - Otherwise the table is rebuilt synchronously and swapped in, and the
//!   selection from before the rebuild is put back.
//!
//! The published table sits behind an [`Rc`]; readers holding an older
//! `Rc` keep a consistent snapshot while a new table replaces it.

use std::rc::Rc;

use blockmark_syntax::Tokenizer;

use crate::decorations::{
    DecorationRange, DecorationTable, DecorationWarning, Recomputation, recompute_decorations,
};
use crate::document::{BlockId, ChangeOrigin, Cmd, Document, TEXT_LANGUAGE};

pub struct UpdateCoordinator {
    tokenizer: Box<dyn Tokenizer>,
    table: Rc<DecorationTable>,
    warnings: Vec<DecorationWarning>,
    fallback: String,
    languages: Vec<String>,
    recomputations: u64,
    /// Document version the current table was built from.
    built_for: Option<u64>,
}

impl UpdateCoordinator {
    /// Takes ownership of the tokenizer and registers fallback grammars for
    /// `fallback` and every name in `languages` it lacks.
    pub fn new(tokenizer: Box<dyn Tokenizer>, fallback: &str, languages: Vec<String>) -> Self {
        let mut coordinator = Self {
            tokenizer,
            table: Rc::new(DecorationTable::new()),
            warnings: Vec::new(),
            fallback: fallback.to_string(),
            languages,
            recomputations: 0,
            built_for: None,
        };
        coordinator.ensure_fallback_grammars();
        coordinator
    }

    pub fn table(&self) -> Rc<DecorationTable> {
        Rc::clone(&self.table)
    }

    pub fn decorations_for(&self, block: BlockId) -> &[DecorationRange] {
        self.table.get(block)
    }

    /// Warnings from the most recent recomputation.
    pub fn warnings(&self) -> &[DecorationWarning] {
        &self.warnings
    }

    /// How many times the table has been rebuilt.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Reacts to a committed change.
    pub fn on_document_changed(&mut self, doc: &mut Document, origin: ChangeOrigin) {
        if origin == ChangeOrigin::Selection {
            return;
        }
        self.refresh(doc);
    }

    /// Recomputes if the document has code blocks, keeping the selection.
    pub fn refresh(&mut self, doc: &mut Document) {
        if !doc.has_code_block() {
            return;
        }

        let saved = doc.selection().cloned();
        let Recomputation { table, warnings } =
            recompute_decorations(doc, self.tokenizer.as_ref(), &self.fallback);
        self.table = Rc::new(table);
        self.warnings = warnings;
        self.recomputations += 1;
        self.built_for = Some(doc.version());

        if let Some(range) = saved
            && let Err(err) = doc.apply(Cmd::Select { range })
        {
            log::debug!("Could not restore selection after recompute: {err}");
        }
    }

    /// Like [`refresh`](Self::refresh), but skips the work when the table
    /// was already built from the document's current version.
    pub fn refresh_if_stale(&mut self, doc: &mut Document) {
        if self.built_for == Some(doc.version()) {
            log::trace!("Decorations already current at version {}", doc.version());
            return;
        }
        self.refresh(doc);
    }

    /// Replaces the configured language list and registers fallbacks for it.
    /// The next [`refresh_if_stale`](Self::refresh_if_stale) recomputes.
    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.languages = languages;
        self.ensure_fallback_grammars();
        self.built_for = None;
    }

    /// Registers empty grammars for `text`, the fallback name and every
    /// configured language the tokenizer does not know.
    pub fn ensure_fallback_grammars(&mut self) {
        let names = std::iter::once(TEXT_LANGUAGE)
            .chain(std::iter::once(self.fallback.as_str()))
            .chain(self.languages.iter().map(String::as_str));
        for name in names {
            if !self.tokenizer.has_grammar(name) {
                self.tokenizer.register_fallback_grammar(name);
            }
        }
    }
}
