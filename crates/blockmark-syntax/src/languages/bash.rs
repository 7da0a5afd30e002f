use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

const BUILTINS: &str = r"\b(?:alias|bind|break|builtin|caller|cd|command|continue|declare|echo|enable|eval|exec|exit|export|getopts|hash|help|let|local|logout|mapfile|printf|pwd|read|readarray|readonly|return|set|shift|shopt|source|test|times|trap|type|typeset|ulimit|umask|unalias|unset)\b";

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("shebang", r"^#!\s*/.*").greedy().alias("important"))
        .rule(TokenRule::new("comment", r#"(?m)(?:^|[^"{\\$\w])(?P<token>#.*)"#).greedy())
        .rule(
            TokenRule::new("string", r#""(?:\\[\s\S]|[^"\\])*"|'[^']*'"#)
                .greedy()
                .inside(
                    GrammarBuilder::new()
                        .token("variable", r"\$\{[^}]*\}|\$(?:\w+|[#?*!@$])")
                        .token("string", r"(?s).+"),
                ),
        )
        .token("variable", r"\$\{[^}]*\}|\$(?:\w+|[#?*!@$])")
        .rule(TokenRule::new("function-name", r"\bfunction\s+(?P<token>\w+)").alias("function"))
        .token(
            "keyword",
            r"\b(?:case|do|done|elif|else|esac|fi|for|function|if|in|select|then|until|while)\b",
        )
        .token("builtin", BUILTINS)
        .token("boolean", r"\b(?:false|true)\b")
        .token("number", r"\b\d+(?:\.\d+)?\b")
        .token("operator", r"&&|\|\||[=!]=|<<<?|>>?|[|&<>=]")
        .token("punctuation", r"\$?\(\(?|\)\)?|\.\.|[{}\[\];\\]")
        .build()
}
