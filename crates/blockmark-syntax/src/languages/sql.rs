use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, TokenRule};

const KEYWORDS: &str = r"(?i)\b(?:ADD|ALL|ALTER|AS|ASC|BEGIN|BY|CASE|CHECK|COMMIT|CONSTRAINT|CREATE|DEFAULT|DELETE|DESC|DISTINCT|DROP|ELSE|END|EXISTS|FOREIGN|FROM|FULL|GROUP|HAVING|IF|INDEX|INNER|INSERT|INTO|JOIN|KEY|LEFT|LIMIT|OFFSET|ON|ORDER|OUTER|PRIMARY|REFERENCES|RETURNING|RIGHT|ROLLBACK|SELECT|SET|TABLE|THEN|TRANSACTION|UNION|UNIQUE|UPDATE|VALUES|VIEW|WHEN|WHERE|WITH)\b";

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule(TokenRule::new("comment", r"--.*|/\*[\s\S]*?\*/").greedy())
        .rule(TokenRule::new("string", r#""(?:\\[\s\S]|[^"\\])*"|'(?:''|\\[\s\S]|[^'\\])*'"#).greedy())
        .rule(
            TokenRule::new("identifier", r"`(?:\\[\s\S]|``|[^`\\])+`")
                .greedy()
                .inside(GrammarBuilder::new().token("punctuation", r"^`|`$")),
        )
        .token("variable", r"@[\w.$]+")
        .token(
            "function",
            r"(?i)\b(?P<token>AVG|COUNT|FIRST|FORMAT|LAST|LCASE|LEN|MAX|MID|MIN|MOD|NOW|ROUND|SUM|UCASE)\s*\(",
        )
        .token("keyword", KEYWORDS)
        .token("boolean", r"(?i)\b(?:FALSE|NULL|TRUE)\b")
        .token("number", r"(?i)\b0x[\da-f]+\b|\b\d+(?:\.\d*)?|\B\.\d+\b")
        .token(
            "operator",
            r"(?i)[-+*/=%^~]|&&?|\|\|?|!=?|<(?:=>?|<|>)?|>[>=]?|\b(?:AND|BETWEEN|DIV|ILIKE|IN|IS|LIKE|NOT|OR|REGEXP|RLIKE|XOR)\b",
        )
        .token("punctuation", r"[;\[\]()`,.]")
        .build()
}
