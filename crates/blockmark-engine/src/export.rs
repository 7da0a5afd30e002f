//! Markdown export.
//!
//! One-way: the document is written out as markdown, nothing reads it back.

use crate::document::{Block, BlockKind, Document, Leaf, Mark, Node, TEXT_LANGUAGE};

/// Renders `doc` as markdown, blocks separated by blank lines.
pub fn to_markdown(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        write_block(block, &mut out);
    }
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

fn write_block(block: &Block, out: &mut String) {
    match &block.kind {
        BlockKind::Paragraph => {
            out.push_str(&inline(block));
            out.push_str("\n\n");
        }
        BlockKind::Heading { level } => {
            out.push_str(&"#".repeat(usize::from(*level)));
            out.push(' ');
            out.push_str(&inline(block));
            out.push_str("\n\n");
        }
        BlockKind::Quote => {
            let mut body = String::new();
            if block.is_text_block() {
                body = inline(block);
            } else {
                for child in block.child_blocks() {
                    write_block(child, &mut body);
                }
            }
            out.push_str("> ");
            out.push_str(&body.trim_end_matches('\n').replace('\n', "\n> "));
            out.push_str("\n\n");
        }
        BlockKind::CodeBlock { language } => {
            out.push_str("```");
            if language != TEXT_LANGUAGE {
                out.push_str(language);
            }
            out.push('\n');
            out.push_str(&block.text());
            out.push_str("\n```\n\n");
        }
        BlockKind::BulletList | BlockKind::NumberedList => {
            for child in block.child_blocks() {
                write_block(child, out);
            }
            out.push('\n');
        }
        BlockKind::ListItem => {
            out.push_str("- ");
            out.push_str(&inline(block));
            out.push('\n');
        }
        BlockKind::Image { url } => {
            out.push_str(&format!("![]({url})\n\n"));
        }
    }
}

fn inline(block: &Block) -> String {
    block
        .children
        .iter()
        .map(|child| match child {
            Node::Leaf(leaf) => marked(leaf),
            Node::Block(inner) => inner.text(),
        })
        .collect()
}

fn marked(leaf: &Leaf) -> String {
    if leaf.text.is_empty() {
        return String::new();
    }
    let mut text = leaf.text.clone();
    for mark in &leaf.marks {
        text = match mark {
            Mark::Bold => format!("**{text}**"),
            Mark::Italic => format!("_{text}_"),
            Mark::InlineCode => format!("`{text}`"),
            Mark::Link(url) => format!("[{text}]({url})"),
        };
    }
    text
}
