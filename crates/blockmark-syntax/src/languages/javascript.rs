use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

const KEYWORDS: &str = r"\b(?:as|assert|async|await|break|case|catch|class|const|continue|debugger|default|delete|do|else|enum|export|extends|finally|for|from|function|get|if|implements|import|in|instanceof|interface|let|new|null|of|package|private|protected|public|return|set|static|super|switch|this|throw|try|typeof|undefined|var|void|while|with|yield)\b";

const NUMBER: &str = r"\b0[xX][\da-fA-F](?:_?[\da-fA-F])*n?\b|\b0[bB][01](?:_?[01])*n?\b|\b0[oO][0-7](?:_?[0-7])*n?\b|(?:\b\d+(?:_\d+)*\.?(?:\d+(?:_\d+)*)?|\B\.\d+(?:_\d+)*)(?:[eE][+-]?\d+(?:_\d+)*)?n?";

const OPERATOR: &str = r"--|\+\+|\*\*=?|=>|&&=?|\|\|=?|[!=]==|<<=?|>>>?=?|[-+*/%&|^!=<>]=?|\.{3}|\?\?=?|\?\.?|[~:]";

/// `` `text ${expr} text` ``; the expression re-enters `language`.
fn template_body(language: &str) -> GrammarBuilder {
    let interpolation = GrammarBuilder::new()
        .rule(TokenRule::new("interpolation-punctuation", r"^\$\{|\}$").alias("punctuation"))
        .rule(TokenRule::new("expression", r"(?s).+").inside_language(language));

    GrammarBuilder::new()
        .rule(TokenRule::new("template-punctuation", r"^`|`$").alias("string"))
        .rule(
            TokenRule::new("interpolation", r"\$\{(?:[^{}]|\{(?:[^{}]|\{[^{}]*\})*\})*\}")
                .inside(interpolation),
        )
        .token("string", r"(?s).+")
}

/// The JavaScript rule set. Template interpolations re-enter `language`, so
/// dialects built on top keep their own rules inside `${...}`.
fn builder(language: &str) -> GrammarBuilder {
    GrammarBuilder::new()
        .rule(TokenRule::new("comment", r"//.*|/\*[\s\S]*?(?:\*/|$)").greedy())
        .rule(
            TokenRule::new(
                "template-string",
                r"`(?:\\[\s\S]|\$\{(?:[^{}]|\{(?:[^{}]|\{[^{}]*\})*\})*\}|[^\\`])*`",
            )
            .greedy()
            .inside(template_body(language)),
        )
        .rule(TokenRule::new("string", r#""(?:\\.|[^\\"\r\n])*"|'(?:\\.|[^\\'\r\n])*'"#).greedy())
        .token(
            "class-name",
            r"\b(?:class|extends|implements|instanceof|interface|new)\s+(?P<token>[\w.$]+)",
        )
        .token("keyword", KEYWORDS)
        .token("boolean", r"\b(?:false|true)\b")
        .token(
            "function",
            r"(?P<token>#?[_$a-zA-Z][\w$]*)\s*(?:\.\s*(?:apply|bind|call)\s*)?\(",
        )
        .token("number", NUMBER)
        .token("operator", OPERATOR)
        .token("punctuation", r"[{}\[\];(),.]")
}

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    builder("javascript").build()
}

pub(super) fn typescript() -> Result<Grammar, GrammarError> {
    builder("typescript")
        .insert_before(
            "keyword",
            TokenRule::new(
                "keyword",
                r"\b(?:abstract|declare|is|keyof|module|namespace|override|readonly|require|satisfies|type)\b",
            ),
        )
        .insert_before(
            "keyword",
            TokenRule::new(
                "builtin",
                r"\b(?:Array|Function|Promise|any|boolean|console|never|number|string|symbol|unknown)\b",
            ),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use crate::registry::{GrammarRegistry, Tokenizer};
    use crate::token::{Token, TokenContent, stream_text};

    fn top_kinds(source: &str, language: &str) -> Vec<Option<String>> {
        let registry = GrammarRegistry::with_builtin_languages().unwrap();
        registry
            .tokenize(source, language)
            .unwrap()
            .iter()
            .map(|t| t.kind().map(str::to_string))
            .collect()
    }

    #[test]
    fn class_name_leaves_keyword_for_keyword_rule() {
        assert_eq!(
            top_kinds("class Foo", "js"),
            vec![Some("keyword".into()), None, Some("class-name".into())]
        );
    }

    #[test]
    fn template_interpolation_nests_expression() {
        let registry = GrammarRegistry::with_builtin_languages().unwrap();
        let source = "`a ${b + 1} c`";
        let tokens = registry.tokenize(source, "javascript").unwrap();
        assert_eq!(stream_text(&tokens), source);
        let Token::Typed(template) = &tokens[0] else {
            panic!("expected template token");
        };
        let TokenContent::Stream(body) = &template.content else {
            panic!("expected nested stream");
        };
        let kinds: Vec<_> = body.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some("template-punctuation"),
                Some("string"),
                Some("interpolation"),
                Some("string"),
                Some("template-punctuation"),
            ]
        );
    }

    #[test]
    fn typescript_adds_type_keywords() {
        let kinds = top_kinds("type Id = number", "ts");
        assert_eq!(kinds[0], Some("keyword".into()));
        assert_eq!(kinds.last().unwrap(), &Some("builtin".into()));
    }
}
