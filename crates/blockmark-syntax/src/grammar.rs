//! # Grammars
//!
//! A [`Grammar`] is an ordered list of [`Rule`]s. Each rule pairs a token kind
//! (`keyword`, `string`, ...) with a regular expression.
//!
//! ## Rule Semantics
//!
//! - **Greedy rules** (comments, strings) run first and compete leftmost-first
//!   over the raw text: at every position the earliest match wins, ties go to
//!   the rule declared first. This keeps `#` inside a Python string from
//!   starting a comment, and a quote inside a comment from opening a string.
//! - **Ordered rules** run afterwards, one at a time, and only split text that
//!   no earlier rule claimed.
//! - A pattern with a capture group named `token` emits only that group.
//!   The rest of the match stays plain text for later rules. This stands in
//!   for the lookbehind/lookahead assertions the `regex` crate does not have:
//!   `\bdef\s+(?P<token>\w+)` tags the function name but leaves `def` for the
//!   keyword rule.
//! - A rule with an `inside` grammar re-tokenizes its match, producing a
//!   nested stream (string interpolation, template literals).
//!
//! Grammars are assembled with [`GrammarBuilder`] and compiled once by
//! [`GrammarBuilder::build`].

use regex::Regex;

use crate::error::GrammarError;

/// A compiled, immutable grammar.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: Vec<Rule>,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) kind: String,
    pub(crate) alias: Option<String>,
    pub(crate) pattern: Regex,
    pub(crate) greedy: bool,
    pub(crate) narrowed: bool,
    pub(crate) inside: Option<Inside>,
}

/// Where a rule's match is re-tokenized.
#[derive(Debug, Clone)]
pub enum Inside {
    /// An anonymous grammar owned by the rule.
    Grammar(Box<Grammar>),
    /// A registered language, looked up at tokenize time (allows recursion).
    Language(String),
}

/// A match located by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hit {
    /// Start of the whole match, context included.
    pub start: usize,
    /// End of the whole match, context included.
    pub end: usize,
    /// The span that becomes the token.
    pub token: std::ops::Range<usize>,
}

impl Grammar {
    /// A grammar with no rules: everything tokenizes as plain text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Rule {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Finds the first non-empty token at or after byte `at`.
    pub(crate) fn find_at(&self, text: &str, mut at: usize) -> Option<Hit> {
        while at <= text.len() {
            let caps = self.pattern.captures_at(text, at)?;
            let whole = caps.get(0)?;
            let token = if self.narrowed {
                caps.name("token").map(|m| m.range())
            } else {
                Some(whole.range())
            };

            if let Some(token) = token
                && !token.is_empty()
            {
                return Some(Hit {
                    start: whole.start(),
                    end: whole.end(),
                    token,
                });
            }

            at = if whole.end() > at {
                whole.end()
            } else {
                next_char_boundary(text, at)?
            };
        }
        None
    }
}

fn next_char_boundary(text: &str, at: usize) -> Option<usize> {
    if at >= text.len() {
        return None;
    }
    (at + 1..=text.len()).find(|&i| text.is_char_boundary(i))
}

/// Uncompiled rule definition.
#[derive(Debug, Clone)]
pub struct TokenRule {
    kind: String,
    pattern: String,
    alias: Option<String>,
    greedy: bool,
    inside: Option<InsideSpec>,
}

#[derive(Debug, Clone)]
enum InsideSpec {
    Grammar(GrammarBuilder),
    Language(String),
}

impl TokenRule {
    pub fn new(kind: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            pattern: pattern.into(),
            alias: None,
            greedy: false,
            inside: None,
        }
    }

    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn inside(mut self, grammar: GrammarBuilder) -> Self {
        self.inside = Some(InsideSpec::Grammar(grammar));
        self
    }

    pub fn inside_language(mut self, language: impl Into<String>) -> Self {
        self.inside = Some(InsideSpec::Language(language.into()));
        self
    }

    fn compile(self) -> Result<Rule, GrammarError> {
        let pattern = Regex::new(&self.pattern).map_err(|source| GrammarError::InvalidPattern {
            kind: self.kind.clone(),
            source,
        })?;
        let narrowed = pattern.capture_names().any(|name| name == Some("token"));
        let inside = match self.inside {
            Some(InsideSpec::Grammar(builder)) => Some(Inside::Grammar(Box::new(builder.build()?))),
            Some(InsideSpec::Language(name)) => Some(Inside::Language(name)),
            None => None,
        };

        Ok(Rule {
            kind: self.kind,
            alias: self.alias,
            pattern,
            greedy: self.greedy,
            narrowed,
            inside,
        })
    }
}

/// Collects rule definitions and compiles them into a [`Grammar`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    rules: Vec<TokenRule>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: TokenRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Shorthand for an ordered rule with no options.
    pub fn token(self, kind: &str, pattern: &str) -> Self {
        self.rule(TokenRule::new(kind, pattern))
    }

    /// Inserts `rule` before the first rule of kind `before`, or appends it.
    pub fn insert_before(mut self, before: &str, rule: TokenRule) -> Self {
        match self.rules.iter().position(|r| r.kind == before) {
            Some(index) => self.rules.insert(index, rule),
            None => self.rules.push(rule),
        }
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let rules = self
            .rules
            .into_iter()
            .map(TokenRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Grammar { rules })
    }
}
