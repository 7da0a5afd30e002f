//! # Token Tree
//!
//! The tokenizer returns a *token tree*: a sequence of [`Token`]s where each
//! token is either untyped text ([`Token::Plain`]) or a typed span whose
//! content may itself be a nested stream.
//!
//! ## The Text-Preservation Contract
//!
//! Concatenating the leaf text of a token tree, in order, reproduces the
//! source exactly. Nothing is added, dropped or reordered:
//!
//! ```
//! use blockmark_syntax::{GrammarRegistry, Tokenizer, token};
//!
//! let registry = GrammarRegistry::with_builtin_languages().unwrap();
//! let source = "def f(x):\n    return x + 1  # inc\n";
//! let tokens = registry.tokenize(source, "python").unwrap();
//!
//! assert_eq!(token::stream_text(&tokens), source);
//! assert_eq!(token::stream_len(&tokens), source.len());
//! ```
//!
//! Consumers that convert tokens into offset ranges (the decoration engine)
//! rely on this contract: the running offset after walking a stream must equal
//! the length of the source.

/// One node of a token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text that no grammar rule claimed.
    Plain(String),
    /// A span recognized by a grammar rule.
    Typed(TypedToken),
}

/// A span tagged with the rule that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedToken {
    /// Rule name, e.g. `keyword`, `string`, `number`.
    pub kind: String,
    /// Extra tag carried alongside `kind` (e.g. `class-name` aliased as `type`).
    pub alias: Option<String>,
    pub content: TokenContent,
}

/// Content of a typed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenContent {
    /// Leaf text.
    Text(String),
    /// A single nested token.
    Token(Box<Token>),
    /// A nested stream, produced by rules with an `inside` grammar.
    Stream(Vec<Token>),
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Token::Plain(text.into())
    }

    pub fn typed(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Token::Typed(TypedToken {
            kind: kind.into(),
            alias: None,
            content: TokenContent::Text(text.into()),
        })
    }

    pub fn nested(kind: impl Into<String>, stream: Vec<Token>) -> Self {
        Token::Typed(TypedToken {
            kind: kind.into(),
            alias: None,
            content: TokenContent::Stream(stream),
        })
    }

    /// Byte length of all leaf text under this token.
    pub fn text_len(&self) -> usize {
        match self {
            Token::Plain(text) => text.len(),
            Token::Typed(typed) => typed.content.text_len(),
        }
    }

    /// Appends the leaf text of this token to `out`.
    pub fn push_text(&self, out: &mut String) {
        match self {
            Token::Plain(text) => out.push_str(text),
            Token::Typed(typed) => typed.content.push_text(out),
        }
    }

    /// The rule name, or `None` for plain text.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Token::Plain(_) => None,
            Token::Typed(typed) => Some(&typed.kind),
        }
    }
}

impl TypedToken {
    /// All tags this token contributes: its kind followed by its alias.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.kind.as_str()).chain(self.alias.as_deref())
    }
}

impl TokenContent {
    pub fn text_len(&self) -> usize {
        match self {
            TokenContent::Text(text) => text.len(),
            TokenContent::Token(token) => token.text_len(),
            TokenContent::Stream(stream) => stream_len(stream),
        }
    }

    pub fn push_text(&self, out: &mut String) {
        match self {
            TokenContent::Text(text) => out.push_str(text),
            TokenContent::Token(token) => token.push_text(out),
            TokenContent::Stream(stream) => {
                for token in stream {
                    token.push_text(out);
                }
            }
        }
    }
}

/// Total byte length of a stream's leaf text.
pub fn stream_len(stream: &[Token]) -> usize {
    stream.iter().map(Token::text_len).sum()
}

/// Reassembles the source text of a stream.
pub fn stream_text(stream: &[Token]) -> String {
    let mut out = String::with_capacity(stream_len(stream));
    for token in stream {
        token.push_text(&mut out);
    }
    out
}
