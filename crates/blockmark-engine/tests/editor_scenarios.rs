use blockmark_engine::decorations::recompute_decorations;
use blockmark_engine::document::{Block, BlockKind, Document, Point, Range};
use blockmark_engine::{DecorationWarning, Editor, EditorOptions, Key, KeyEvent};
use blockmark_syntax::{GrammarRegistry, Tokenizer, token};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn registry() -> GrammarRegistry {
    let mut registry = GrammarRegistry::with_builtin_languages().unwrap();
    registry.register_fallback_grammar("text");
    registry
}

fn editor(doc: Document) -> Editor {
    Editor::new(doc, Box::new(registry()), EditorOptions::default())
}

fn type_keys(editor: &mut Editor, text: &str) {
    for c in text.chars() {
        let key = match c {
            '\n' => Key::Enter,
            '\u{8}' => Key::Backspace,
            c => Key::Char(c),
        };
        editor.on_key_down(KeyEvent::new(key));
    }
    editor.tick();
}

fn load_fixture(name: &str) -> Document {
    let json = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.json",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();
    Document::from_json(&json).unwrap()
}

// ============ End to end ============

#[test]
fn typing_a_python_fence_highlights_the_code() {
    let mut editor = editor(Document::default());

    type_keys(&mut editor, "```python\nx = 1");

    let block = editor.document().block_at(&[0]).unwrap();
    assert_eq!(block.kind, BlockKind::code_block("python"));
    assert_eq!(block.text(), "x = 1");
    let numbers: Vec<_> = editor
        .decorations_for(block.id)
        .iter()
        .filter(|range| range.has_tag("number"))
        .map(|range| (range.start, range.end))
        .collect();
    assert_eq!(numbers, vec![(4, 5)]);
}

// ============ Autoformat triggers ============

#[rstest]
#[case("# ", BlockKind::heading(1))]
#[case("## ", BlockKind::heading(2))]
#[case("> ", BlockKind::Quote)]
#[case("- ", BlockKind::ListItem)]
#[case("* ", BlockKind::ListItem)]
#[case("+ ", BlockKind::ListItem)]
#[case("1. ", BlockKind::ListItem)]
fn line_prefix_triggers(#[case] typed: &str, #[case] kind: BlockKind) {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, typed);
    type_keys(&mut editor, "done");

    let (_, block) = editor.document().current_block().unwrap();
    assert_eq!(block.kind, kind);
    assert_eq!(block.text(), "done");
}

#[rstest]
#[case("js", "js")]
#[case("", "text")]
fn fence_opener_on_enter(#[case] language: &str, #[case] expected: &str) {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, &format!("```{language}\n"));

    let block = editor.document().block_at(&[0]).unwrap();
    assert_eq!(block.kind, BlockKind::code_block(expected));
    assert_eq!(block.text(), "");
    assert_eq!(
        editor.document().selection(),
        Some(&Range::collapsed(Point::new(vec![0, 0], 0)))
    );
}

#[test]
fn space_after_backticks_is_just_a_space() {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, "``` ");
    let block = editor.document().block_at(&[0]).unwrap();
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(block.text(), "``` ");
}

#[test]
fn heading_backspace_at_start_becomes_paragraph() {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, "# Title");
    for _ in 0..5 {
        editor.on_key_down(KeyEvent::new(Key::Left));
    }
    type_keys(&mut editor, "\u{8}");

    let block = editor.document().block_at(&[0]).unwrap();
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(block.text(), "Title");
}

#[test]
fn empty_code_block_backspace_becomes_paragraph() {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, "```rust\n\u{8}");

    let block = editor.document().block_at(&[0]).unwrap();
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(block.text(), "");
}

#[test]
fn list_flow_enter_then_backspace_leaves_list() {
    let mut editor = editor(Document::default());
    type_keys(&mut editor, "- one\ntwo\n\u{8}three");

    let doc = editor.document();
    let kinds: Vec<_> = doc.blocks().map(|block| block.kind.clone()).collect();
    assert_eq!(kinds, vec![BlockKind::BulletList, BlockKind::Paragraph]);
    assert_eq!(doc.block_at(&[0]).unwrap().text(), "onetwo");
    assert_eq!(doc.block_at(&[1]).unwrap().text(), "three");
}

// ============ Decorations ============

#[test]
fn unknown_grammar_falls_back_with_one_warning() {
    let editor = editor(Document::new(vec![Block::code("klingon", "qapla'")]));

    assert_eq!(editor.warnings().len(), 1);
    assert!(matches!(
        &editor.warnings()[0],
        DecorationWarning::GrammarNotFound { language, fallback, .. }
            if language == "klingon" && fallback == "text"
    ));
}

#[rstest]
#[case("mixed_languages")]
#[case("unicode_and_unknown")]
fn fixture_ranges_are_valid_and_stable(#[case] name: &str) {
    let doc = load_fixture(name);
    let registry = registry();

    let first = recompute_decorations(&doc, &registry, "text");
    let second = recompute_decorations(&doc, &registry, "text");
    assert_eq!(first.table, second.table);

    for (_, block) in doc.nodes_matching(|block| block.kind.is_code_block()) {
        let text = block.text();
        if let Some(language) = block.kind.language().filter(|l| registry.has_grammar(l)) {
            let tokens = registry.tokenize(&text, language).unwrap();
            assert_eq!(token::stream_text(&tokens), text, "{language}");
        }
        for range in first.table.get(block.id) {
            assert!(range.start < range.end, "{range:?}");
            assert!(range.end <= text.len(), "{range:?}");
            assert!(text.is_char_boundary(range.start) && text.is_char_boundary(range.end));
        }
    }
}

#[test]
fn mixed_fixture_decorates_every_non_empty_code_block() {
    let doc = load_fixture("mixed_languages");
    let out = recompute_decorations(&doc, &registry(), "text");
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    assert_eq!(out.table.len(), 6);
}

#[test]
fn editing_one_block_keeps_other_ids_decorated() {
    let mut editor = editor(load_fixture("mixed_languages"));
    let json_id = editor.document().block_at(&[5]).unwrap().id;
    let before = editor.decorations_for(json_id).to_vec();

    editor
        .select(Range::collapsed(Point::new(vec![1, 0], 0)))
        .unwrap();
    type_keys(&mut editor, "# top\n");

    assert_eq!(editor.decorations_for(json_id), before.as_slice());
}
