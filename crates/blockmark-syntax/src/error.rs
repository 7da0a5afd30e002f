use thiserror::Error;

/// Failure to build a grammar from rule definitions.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("Invalid pattern for rule '{kind}': {source}")]
    InvalidPattern {
        kind: String,
        source: regex::Error,
    },
}

/// Failure while tokenizing a piece of text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unknown grammar: {0}")]
    UnknownGrammar(String),

    #[error("Grammar '{grammar}' nests deeper than {limit} levels")]
    NestingTooDeep { grammar: String, limit: usize },
}
