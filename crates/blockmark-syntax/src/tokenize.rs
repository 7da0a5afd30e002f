//! Grammar matching: turns text plus a [`Grammar`] into a token stream.

use crate::error::TokenizeError;
use crate::grammar::{Grammar, Hit, Inside, Rule};
use crate::registry::GrammarRegistry;
use crate::token::{Token, TokenContent, TypedToken};

/// Maximum nesting of `inside` grammars before tokenizing gives up.
pub const MAX_NESTING: usize = 8;

pub(crate) struct Matcher<'a> {
    registry: &'a GrammarRegistry,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(registry: &'a GrammarRegistry) -> Self {
        Self { registry }
    }

    pub(crate) fn run(
        &self,
        text: &str,
        grammar: &Grammar,
        name: &str,
        depth: usize,
    ) -> Result<Vec<Token>, TokenizeError> {
        if depth > MAX_NESTING {
            return Err(TokenizeError::NestingTooDeep {
                grammar: name.to_string(),
                limit: MAX_NESTING,
            });
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let (greedy, ordered): (Vec<&Rule>, Vec<&Rule>) =
            grammar.rules().iter().partition(|rule| rule.greedy);

        let mut stream = if greedy.is_empty() {
            vec![Token::plain(text)]
        } else {
            self.match_greedy(text, &greedy, name, depth)?
        };

        for rule in ordered {
            let mut next = Vec::with_capacity(stream.len());
            for token in stream {
                match token {
                    Token::Plain(plain) => self.split_plain(&plain, rule, name, depth, &mut next)?,
                    typed => next.push(typed),
                }
            }
            stream = next;
        }

        Ok(stream)
    }

    /// Leftmost-first scan over all greedy rules at once.
    ///
    /// Each rule's next hit is kept until the scan passes its start, so a
    /// rule is searched again only when a competing token swallowed its hit.
    fn match_greedy(
        &self,
        text: &str,
        rules: &[&Rule],
        name: &str,
        depth: usize,
    ) -> Result<Vec<Token>, TokenizeError> {
        let mut out = Vec::new();
        let mut plain_start = 0;
        let mut at = 0;
        // None: not searched yet. Some(None): no match left in the text.
        let mut pending: Vec<Option<Option<Hit>>> = vec![None; rules.len()];

        while at < text.len() {
            let mut best: Option<(usize, usize)> = None;
            for (index, rule) in rules.iter().enumerate() {
                let slot = &mut pending[index];
                let stale = match slot {
                    None => true,
                    Some(Some(hit)) => hit.start < at,
                    Some(None) => false,
                };
                if stale {
                    *slot = Some(rule.find_at(text, at));
                }
                if let Some(Some(hit)) = slot
                    && best.is_none_or(|(_, start)| hit.start < start)
                {
                    best = Some((index, hit.start));
                }
            }
            let Some((index, _)) = best else {
                break;
            };
            let Some(Some(hit)) = pending[index].take() else {
                break;
            };
            let rule = rules[index];

            if hit.token.start > plain_start {
                out.push(Token::plain(&text[plain_start..hit.token.start]));
            }
            out.push(self.typed(rule, &text[hit.token.clone()], name, depth)?);
            plain_start = hit.token.end;
            at = hit.end.max(hit.token.end);
        }

        if plain_start < text.len() {
            out.push(Token::plain(&text[plain_start..]));
        }
        Ok(out)
    }

    /// Splits one plain segment around every match of `rule`.
    fn split_plain(
        &self,
        text: &str,
        rule: &Rule,
        name: &str,
        depth: usize,
        out: &mut Vec<Token>,
    ) -> Result<(), TokenizeError> {
        let mut plain_start = 0;
        let mut at = 0;

        while let Some(hit) = rule.find_at(text, at) {
            if hit.token.start > plain_start {
                out.push(Token::plain(&text[plain_start..hit.token.start]));
            }
            out.push(self.typed(rule, &text[hit.token.clone()], name, depth)?);
            plain_start = hit.token.end;
            at = hit.end.max(hit.token.end);
        }

        if plain_start < text.len() {
            out.push(Token::plain(&text[plain_start..]));
        }
        Ok(())
    }

    fn typed(
        &self,
        rule: &Rule,
        text: &str,
        name: &str,
        depth: usize,
    ) -> Result<Token, TokenizeError> {
        let content = match &rule.inside {
            None => TokenContent::Text(text.to_string()),
            Some(Inside::Grammar(grammar)) => {
                TokenContent::Stream(self.run(text, grammar, name, depth + 1)?)
            }
            Some(Inside::Language(language)) => {
                let grammar = self
                    .registry
                    .get(language)
                    .ok_or_else(|| TokenizeError::UnknownGrammar(language.clone()))?;
                TokenContent::Stream(self.run(text, grammar, language, depth + 1)?)
            }
        };

        Ok(Token::Typed(TypedToken {
            kind: rule.kind.clone(),
            alias: rule.alias.clone(),
            content,
        }))
    }
}
