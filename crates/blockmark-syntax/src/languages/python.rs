use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

const KEYWORDS: &str = r"\b(?:and|as|assert|async|await|break|case|class|continue|def|del|elif|else|except|exec|finally|for|from|global|if|import|in|is|lambda|match|nonlocal|not|or|pass|print|raise|return|try|while|with|yield)\b";

const BUILTINS: &str = r"\b(?:__import__|abs|all|any|ascii|bin|bool|breakpoint|bytearray|bytes|callable|chr|classmethod|compile|complex|delattr|dict|dir|divmod|enumerate|eval|filter|float|format|frozenset|getattr|globals|hasattr|hash|help|hex|id|input|int|isinstance|issubclass|iter|len|list|locals|map|max|memoryview|min|next|object|oct|open|ord|pow|property|range|repr|reversed|round|set|setattr|slice|sorted|staticmethod|str|sum|super|tuple|type|vars|zip)\b";

const NUMBER: &str = r"(?i)\b0(?:b(?:_?[01])+|o(?:_?[0-7])+|x(?:_?[a-f0-9])+)\b|(?:\b\d+(?:_\d+)*(?:\.(?:\d+(?:_\d+)*)?)?|\B\.\d+(?:_\d+)*)(?:e[+-]?\d+(?:_\d+)*)?j?";

/// `{expr}` inside an f-string. `{{` and `}}` are literal braces.
fn interpolation() -> GrammarBuilder {
    GrammarBuilder::new()
        .token("format-spec", r"(?P<token>:[^:(){}]+)\}$")
        .token("conversion-option", r"(?P<token>![sra])[:}]")
        .token("punctuation", r"^\{|\}$")
        .rule(TokenRule::new("expression", r"(?s).+").inside_language("python"))
}

fn f_string_body() -> GrammarBuilder {
    GrammarBuilder::new()
        .token("string", r"\{\{|\}\}")
        .rule(TokenRule::new("interpolation", r"\{(?:[^{}]|\{[^{}]*\})*\}").inside(interpolation()))
        .token("string", r"(?s).+")
}

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("comment", r"#.*").greedy())
        .rule(
            TokenRule::new(
                "string-interpolation",
                r#"(?i)\b(?:f|fr|rf)(?:"""[\s\S]*?"""|'''[\s\S]*?'''|"(?:\\.|[^\\"\r\n])*"|'(?:\\.|[^\\'\r\n])*')"#,
            )
            .greedy()
            .inside(f_string_body()),
        )
        .rule(
            TokenRule::new(
                "string",
                r#"(?i)(?:\b(?:[rub]|br|rb))?(?:"""[\s\S]*?"""|'''[\s\S]*?'''|"(?:\\.|[^\\"\r\n])*"|'(?:\\.|[^\\'\r\n])*')"#,
            )
            .greedy(),
        )
        .token("function", r"\bdef[ \t]+(?P<token>[a-zA-Z_]\w*)\s*\(")
        .token("class-name", r"\bclass\s+(?P<token>\w+)")
        .rule(
            TokenRule::new("decorator", r"(?m)^[ \t]*(?P<token>@\w+(?:\.\w+)*)")
                .alias("annotation")
                .inside(GrammarBuilder::new().token("punctuation", r"\.")),
        )
        .token("keyword", KEYWORDS)
        .token("builtin", BUILTINS)
        .token("boolean", r"\b(?:False|None|True)\b")
        .token("number", NUMBER)
        .token("operator", r"[-+%=]=?|!=|:=|\*\*?=?|//?=?|<[<=>]?|>[=>]?|[&|^~]")
        .token("punctuation", r"[{}\[\];(),.:]")
        .build()
}

#[cfg(test)]
mod tests {
    use crate::registry::{GrammarRegistry, Tokenizer};
    use crate::token::{Token, TokenContent};

    fn kinds(source: &str) -> Vec<(Option<String>, String)> {
        let registry = GrammarRegistry::with_builtin_languages().unwrap();
        registry
            .tokenize(source, "python")
            .unwrap()
            .into_iter()
            .map(|token| {
                let mut text = String::new();
                token.push_text(&mut text);
                (token.kind().map(str::to_string), text)
            })
            .collect()
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let tokens = kinds("s = '#no' # yes");
        assert!(tokens.contains(&(Some("string".into()), "'#no'".into())));
        assert!(tokens.contains(&(Some("comment".into()), "# yes".into())));
    }

    #[test]
    fn def_splits_into_keyword_and_function() {
        let tokens = kinds("def run():");
        assert_eq!(tokens[0], (Some("keyword".into()), "def".into()));
        assert_eq!(tokens[2], (Some("function".into()), "run".into()));
    }

    #[test]
    fn f_string_interpolation_reenters_python() {
        let registry = GrammarRegistry::with_builtin_languages().unwrap();
        let tokens = registry.tokenize("f'{x + 1}'", "python").unwrap();
        let Token::Typed(outer) = &tokens[0] else {
            panic!("expected typed token, got {tokens:?}");
        };
        assert_eq!(outer.kind, "string-interpolation");
        let TokenContent::Stream(body) = &outer.content else {
            panic!("expected nested stream");
        };
        assert!(body.iter().any(|t| t.kind() == Some("interpolation")));
    }
}
