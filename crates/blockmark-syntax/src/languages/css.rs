use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("comment", r"/\*[\s\S]*?\*/").greedy())
        .rule(
            TokenRule::new("url", r#"(?i)\burl\((?:"[^"]*"|'[^']*'|[^"'\r\n()]*)\)"#)
                .greedy()
                .inside(
                    GrammarBuilder::new()
                        .token("function", r"(?i)^url")
                        .token("punctuation", r"^\(|\)$")
                        .token("string", r"(?s).+"),
                ),
        )
        .rule(TokenRule::new("string", r#""(?:\\.|[^\\"\r\n])*"|'(?:\\.|[^\\'\r\n])*'"#).greedy())
        .rule(
            TokenRule::new("atrule", r#"@[\w-]+(?:[^;{"']|"[^"]*"|'[^']*')*"#).inside(
                GrammarBuilder::new()
                    .token("rule", r"^@[\w-]+")
                    .token("keyword", r"\b(?:and|not|only|or)\b")
                    .token("punctuation", r"[(),:]"),
            ),
        )
        .token(
            "selector",
            r"(?:^|[{}\s])(?P<token>[^{}\s](?:[^{};\s]|\s+[^\s{])*?)\s*\{",
        )
        .token("property", r"(?:^|[^-\w])(?P<token>-{0,2}[a-zA-Z_][-\w]*)\s*:")
        .token("important", r"(?i)!important\b")
        .token("function", r"(?i)\b(?P<token>[-a-z0-9]+)\(")
        .rule(TokenRule::new("hexcode", r"#[\da-fA-F]{3,8}\b").alias("color"))
        .token("number", r"-?(?:\d+\.?\d*|\.\d+)(?:%|[a-zA-Z]+)?")
        .token("punctuation", r"[(){};:,]")
        .build()
}

#[cfg(test)]
mod tests {
    use crate::registry::{GrammarRegistry, Tokenizer};
    use crate::token::Token;

    #[test]
    fn rule_splits_into_selector_property_and_value() {
        let registry = GrammarRegistry::with_builtin_languages().unwrap();
        let tokens = registry.tokenize("a { color: #fff; }", "css").unwrap();
        assert_eq!(tokens[0], Token::typed("selector", "a"));
        assert!(tokens.contains(&Token::typed("property", "color")));
        assert!(tokens.iter().any(|t| t.kind() == Some("hexcode")));
    }
}
