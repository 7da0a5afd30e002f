//! Cross-language checks on the built-in grammars.

use blockmark_syntax::token::{stream_len, stream_text};
use blockmark_syntax::{
    GrammarBuilder, GrammarRegistry, MAX_NESTING, Token, TokenContent, TokenRule, TokenizeError,
    Tokenizer,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn registry() -> GrammarRegistry {
    GrammarRegistry::with_builtin_languages().expect("built-in grammars compile")
}

#[rstest]
#[case::python("python", "def f(x):\n    return f\"{x!r:>4}\" + 'ü'  # note\n")]
#[case::python_triple("py", "s = '''a\n#b\n'''\n@app.route('/')\nclass A(B): pass\n")]
#[case::javascript("js", "const a = `x ${b ? `${c}` : 'd'}`; // end\n/* multi\nline */ a?.b ?? 0x1Fn\n")]
#[case::typescript("ts", "interface P { id: number }\nlet q: Promise<string> = f<T>(1e3);\n")]
#[case::rust("rust", "#[derive(Debug)]\nstruct S<'a> { s: &'a str }\nfn main() { println!(\"{}\", b'x'); }\n")]
#[case::json("json", "{\"a\": [1, -2.5e3, true, null], \"b\": {\"c\": \"é\"}}\n")]
#[case::bash("bash", "#!/bin/sh\nfor f in *.md; do echo \"${f%.md} $1\"; done # loop\n")]
#[case::css("css", "@media (max-width: 600px) { a:hover, .b > c { background: url(\"x.png\") #fff !important; } }\n")]
#[case::sql("sql", "SELECT `id`, COUNT(*) FROM t WHERE name = 'O''Brien' -- who\n")]
#[case::text("text", "anything at all ```\n")]
#[case::unterminated("js", "let s = 'open\nand \"also /* never closed")]
fn tokens_reproduce_source(#[case] language: &str, #[case] source: &str) {
    let tokens = registry().tokenize(source, language).unwrap();
    assert_eq!(stream_text(&tokens), source);
    assert_eq!(stream_len(&tokens), source.len());
}

#[rstest]
#[case("python")]
#[case("javascript")]
#[case("rust")]
#[case("text")]
fn empty_source_gives_empty_stream(#[case] language: &str) {
    assert_eq!(registry().tokenize("", language).unwrap(), vec![]);
}

#[test]
fn python_assignment_offsets() {
    let tokens = registry().tokenize("x = 1", "python").unwrap();
    let mut offset = 0;
    let mut typed = Vec::new();
    for token in &tokens {
        let len = token.text_len();
        if let Some(kind) = token.kind() {
            typed.push((kind.to_string(), offset..offset + len));
        }
        offset += len;
    }
    assert_eq!(
        typed,
        vec![("operator".to_string(), 2..3), ("number".to_string(), 4..5)]
    );
}

#[test]
fn nested_f_strings_recurse_through_the_registry() {
    let source = "f\"{f'{x}'}\"";
    let tokens = registry().tokenize(source, "python").unwrap();
    assert_eq!(stream_text(&tokens), source);

    fn depth(tokens: &[Token]) -> usize {
        tokens
            .iter()
            .map(|token| match token {
                Token::Typed(typed) => match &typed.content {
                    TokenContent::Stream(inner) => 1 + depth(inner),
                    TokenContent::Token(inner) => 1 + depth(std::slice::from_ref(inner.as_ref())),
                    TokenContent::Text(_) => 1,
                },
                Token::Plain(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
    assert!(depth(&tokens) >= 5, "got {tokens:#?}");
}

#[test]
fn unknown_grammar_is_an_error() {
    assert_eq!(
        registry().tokenize("x", "brainfuck"),
        Err(TokenizeError::UnknownGrammar("brainfuck".into()))
    );
}

#[test]
fn aliases_resolve_case_insensitively() {
    let registry = registry();
    for name in ["PY", "Js", "TSX", "rs", "Shell", "plaintext"] {
        assert!(registry.has_grammar(name), "{name} should resolve");
    }
}

#[test]
fn self_recursive_grammar_hits_the_nesting_limit() {
    let mut registry = GrammarRegistry::new();
    registry.register(
        "loop",
        GrammarBuilder::new()
            .rule(TokenRule::new("again", r"(?s).+").inside_language("loop"))
            .build()
            .unwrap(),
    );
    assert_eq!(
        registry.tokenize("x", "loop"),
        Err(TokenizeError::NestingTooDeep {
            grammar: "loop".into(),
            limit: MAX_NESTING,
        })
    );
}
