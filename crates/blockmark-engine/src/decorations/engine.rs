use blockmark_syntax::{Token, TokenizeError, Tokenizer};
use thiserror::Error;

use super::flatten::flatten;
use super::range::DecorationTable;
use crate::document::{BlockId, Document, TEXT_LANGUAGE};

/// A problem met while decorating one block. None of these stop the rest of
/// the document from being decorated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecorationWarning {
    #[error("No grammar for '{language}' (block {block}), using '{fallback}'")]
    GrammarNotFound {
        block: BlockId,
        language: String,
        fallback: String,
    },

    #[error("Tokenizing block {block} failed, showing it as plain text: {source}")]
    TokenizeFailed {
        block: BlockId,
        #[source]
        source: TokenizeError,
    },

    #[error("Tokens for block {block} cover {covered} bytes of {expected}")]
    LengthMismatch {
        block: BlockId,
        expected: usize,
        covered: usize,
    },
}

/// The outcome of one pass over the document.
#[derive(Debug, Clone, Default)]
pub struct Recomputation {
    pub table: DecorationTable,
    pub warnings: Vec<DecorationWarning>,
}

/// Tokenizes every code block in `doc` and collects its highlight ranges.
///
/// Blocks whose language the tokenizer lacks are tokenized with `fallback`.
/// A tokenizer error leaves the block as one plain token. Either way the
/// block is reported in [`Recomputation::warnings`].
pub fn recompute_decorations(
    doc: &Document,
    tokenizer: &dyn Tokenizer,
    fallback: &str,
) -> Recomputation {
    let mut out = Recomputation::default();

    for (_, block) in doc.nodes_matching(|block| block.kind.is_code_block()) {
        let text = block.text();
        if text.is_empty() {
            continue;
        }

        let language = block.kind.language().unwrap_or(TEXT_LANGUAGE);
        let grammar = if tokenizer.has_grammar(language) {
            language
        } else {
            let warning = DecorationWarning::GrammarNotFound {
                block: block.id,
                language: language.to_string(),
                fallback: fallback.to_string(),
            };
            log::warn!("{warning}");
            out.warnings.push(warning);
            fallback
        };

        let tokens = match tokenizer.tokenize(&text, grammar) {
            Ok(tokens) => tokens,
            Err(source) => {
                let warning = DecorationWarning::TokenizeFailed {
                    block: block.id,
                    source,
                };
                log::warn!("{warning}");
                out.warnings.push(warning);
                vec![Token::plain(text.as_str())]
            }
        };

        let mut ranges = Vec::new();
        let covered = flatten(&tokens, block.id, 0, &mut ranges);
        if covered != text.len() {
            let warning = DecorationWarning::LengthMismatch {
                block: block.id,
                expected: text.len(),
                covered,
            };
            log::error!("{warning}");
            out.warnings.push(warning);
            continue;
        }
        if !ranges.is_empty() {
            out.table.insert(block.id, ranges);
        }
    }

    log::trace!(
        "Decorated {} code blocks with {} warnings",
        out.table.len(),
        out.warnings.len()
    );
    out
}
