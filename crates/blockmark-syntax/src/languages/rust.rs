use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

const KEYWORDS: &str = r"\b(?:Self|abstract|as|async|await|become|box|break|const|continue|crate|do|dyn|else|enum|extern|final|fn|for|if|impl|in|let|loop|macro|match|mod|move|mut|override|priv|pub|ref|return|self|static|struct|super|trait|try|type|typeof|union|unsafe|unsized|use|virtual|where|while|yield)\b";

const NUMBER: &str = r"\b(?:0x[\dA-Fa-f](?:_?[\dA-Fa-f])*|0o[0-7](?:_?[0-7])*|0b[01](?:_?[01])*|(?:\d(?:_?\d)*)?\.?\d(?:_?\d)*(?:[Ee][+-]?\d+)?)(?:_?(?:f32|f64|[iu](?:8|16|32|64|128|size)?))?\b";

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("comment", r"//.*|/\*[\s\S]*?\*/").greedy())
        .rule(
            TokenRule::new(
                "string",
                r##"b?r#"[\s\S]*?"#|b?r"[^"]*"|b?"(?:\\[\s\S]|[^\\"])*""##,
            )
            .greedy(),
        )
        .rule(
            TokenRule::new(
                "char",
                r"b?'(?:\\(?:x[0-7][\da-fA-F]|u\{(?:[\da-fA-F]_*){1,6}\}|.)|[^\\\r\n\t'])'",
            )
            .greedy()
            .alias("string"),
        )
        .rule(
            TokenRule::new("attribute", r#"#!?\[(?:[^\[\]"]|"(?:\\[\s\S]|[^\\"])*")*\]"#)
                .greedy()
                .alias("attr-name"),
        )
        .rule(TokenRule::new("lifetime-annotation", r"'\w+").alias("symbol"))
        .rule(TokenRule::new("function-definition", r"\bfn\s+(?P<token>\w+)").alias("function"))
        .rule(
            TokenRule::new(
                "type-definition",
                r"\b(?:enum|struct|trait|type|union)\s+(?P<token>\w+)",
            )
            .alias("class-name"),
        )
        .token("keyword", KEYWORDS)
        .token("function", r"(?P<token>\b[a-z_]\w*)\s*(?:::\s*<|\()")
        .rule(TokenRule::new("macro", r"\b\w+!").alias("property"))
        .token("class-name", r"\b[A-Z]\w*\b|\b(?:bool|char|f32|f64|[iu](?:8|16|32|64|128|size)|str)\b")
        .token("number", NUMBER)
        .token("boolean", r"\b(?:false|true)\b")
        .token("punctuation", r"->|\.\.=|\.{1,3}|::|[{}\[\];(),:]")
        .token("operator", r"[-+*/%!^]=?|=[=>]?|&[&=]?|\|[|=]?|<<?=?|>>?=?|[@?]")
        .build()
}
