// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blockmark_engine::document::{Block, BlockKind, Document};

const PYTHON: &str = "def handler(event, context):\n    name = event.get(\"name\", 'world')\n    # greet politely\n    return f\"hello {name.title()} #{len(name)}\"\n";
const JAVASCRIPT: &str = "export async function load(id) {\n  const res = await fetch(`/api/items/${id}?v=${1 + 2}`);\n  return res.ok ? res.json() : null; // fallback\n}\n";
const RUST: &str = "fn main() {\n    let values: Vec<u32> = (0..10).map(|x| x * 2).collect();\n    println!(\"{values:?}\");\n}\n";

/// A document with `sections` repetitions of a heading, a paragraph, a list
/// and three code blocks in different languages.
#[allow(dead_code)]
pub fn generate_document(sections: usize) -> Document {
    Document::new(generate_blocks(sections))
}

#[allow(dead_code)]
pub fn generate_blocks(sections: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    for section in 0..sections {
        blocks.push(Block::text_block(
            BlockKind::heading(2),
            format!("Section {section}"),
        ));
        blocks.push(Block::paragraph(
            "Some paragraph content with multiple sentences. Nothing to highlight here.",
        ));
        blocks.push(Block::container(
            BlockKind::BulletList,
            vec![
                Block::text_block(BlockKind::ListItem, "first"),
                Block::text_block(BlockKind::ListItem, "second"),
            ],
        ));
        blocks.push(Block::code("python", PYTHON.repeat(4)));
        blocks.push(Block::code("javascript", JAVASCRIPT.repeat(4)));
        blocks.push(Block::code("rust", RUST.repeat(4)));
    }
    blocks
}
