use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("property", r#"(?P<token>"(?:\\.|[^\\"\r\n])*")\s*:"#).greedy())
        .rule(TokenRule::new("string", r#""(?:\\.|[^\\"\r\n])*""#).greedy())
        .rule(TokenRule::new("comment", r"//.*|/\*[\s\S]*?(?:\*/|$)").greedy())
        .token("number", r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b")
        .token("punctuation", r"[{}\[\],]")
        .token("operator", r":")
        .token("boolean", r"\b(?:false|true)\b")
        .rule(TokenRule::new("null", r"\bnull\b").alias("keyword"))
        .build()
}
