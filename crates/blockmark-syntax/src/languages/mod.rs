//! Built-in language grammars.
//!
//! Each language module exposes a `grammar()` constructor. Patterns follow
//! the usual Prism-style rule sets, rewritten for the `regex` crate: where a
//! rule needs context it cannot express (lookbehind, lookahead), the context
//! is matched and the emitted span is narrowed with a `token` group.

mod bash;
mod css;
mod javascript;
mod json;
mod python;
mod rust;
mod sql;

use crate::error::GrammarError;
use crate::grammar::Grammar;

/// A language shipped with the registry.
pub(crate) struct Language {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub grammar: fn() -> Result<Grammar, GrammarError>,
}

pub(crate) const BUILTIN: &[Language] = &[
    Language {
        name: "text",
        aliases: &["plain", "plaintext", "txt"],
        grammar: text,
    },
    Language {
        name: "python",
        aliases: &["py"],
        grammar: python::grammar,
    },
    Language {
        name: "javascript",
        aliases: &["js", "jsx"],
        grammar: javascript::grammar,
    },
    Language {
        name: "typescript",
        aliases: &["ts", "tsx"],
        grammar: javascript::typescript,
    },
    Language {
        name: "rust",
        aliases: &["rs"],
        grammar: rust::grammar,
    },
    Language {
        name: "json",
        aliases: &[],
        grammar: json::grammar,
    },
    Language {
        name: "bash",
        aliases: &["sh", "shell"],
        grammar: bash::grammar,
    },
    Language {
        name: "css",
        aliases: &[],
        grammar: css::grammar,
    },
    Language {
        name: "sql",
        aliases: &[],
        grammar: sql::grammar,
    },
];

fn text() -> Result<Grammar, GrammarError> {
    Ok(Grammar::empty())
}
