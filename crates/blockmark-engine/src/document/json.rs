//! JSON persistence.
//!
//! A document is stored as an array of element nodes mirroring the tree:
//!
//! ```json
//! [
//!   {"type": "heading-one", "children": [{"text": "Notes"}]},
//!   {"type": "code-block", "language": "js", "children": [{"text": "let x = 1"}]},
//!   {"type": "paragraph", "children": [{"text": "done", "bold": true}]}
//! ]
//! ```
//!
//! Block ids are not stored; loading issues fresh ones.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::node::{Block, BlockKind, Leaf, Mark, Node};
use crate::error::DocumentError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonNode {
    Element(JsonElement),
    Text(JsonText),
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonElement {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    children: Vec<JsonNode>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonText {
    text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Document {
    /// Parses a JSON array of block nodes.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let nodes: Vec<JsonNode> = serde_json::from_str(json)?;
        let blocks = nodes
            .into_iter()
            .map(|node| match node {
                JsonNode::Element(element) => element_to_block(element),
                JsonNode::Text(text) => Block::new(BlockKind::Paragraph, vec![text_to_node(text)]),
            })
            .collect();
        Ok(Self::new(blocks))
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        let nodes: Vec<JsonNode> = self.blocks().map(block_to_element).collect();
        Ok(serde_json::to_string(&nodes)?)
    }

    /// Loads stored content: JSON when it parses, otherwise one paragraph
    /// holding the raw text. Empty content gives an empty document.
    pub fn from_content(content: &str) -> Self {
        if content.is_empty() {
            return Self::default();
        }
        match Self::from_json(content) {
            Ok(doc) => doc,
            Err(err) => {
                log::debug!("Content is not a JSON document ({err}), loading as plain text");
                Self::new(vec![Block::paragraph(content)])
            }
        }
    }
}

fn element_to_block(element: JsonElement) -> Block {
    let kind = match element.kind.as_deref() {
        None | Some("paragraph") => BlockKind::Paragraph,
        Some("heading-one") => BlockKind::heading(1),
        Some("heading-two") => BlockKind::heading(2),
        Some("heading-three") => BlockKind::heading(3),
        Some("bulleted-list") => BlockKind::BulletList,
        Some("numbered-list") => BlockKind::NumberedList,
        Some("list-item") => BlockKind::ListItem,
        Some("block-quote") => BlockKind::Quote,
        Some("code-block") => BlockKind::code_block(element.language.unwrap_or_default()),
        Some("image") => BlockKind::Image {
            url: element.url.unwrap_or_default(),
        },
        Some(other) => {
            log::warn!("Unknown block type '{other}', loading as paragraph");
            BlockKind::Paragraph
        }
    };
    let children = element
        .children
        .into_iter()
        .map(|child| match child {
            JsonNode::Element(inner) => Node::Block(element_to_block(inner)),
            JsonNode::Text(text) => text_to_node(text),
        })
        .collect();
    Block::new(kind, children)
}

fn text_to_node(text: JsonText) -> Node {
    let mut leaf = Leaf::new(text.text);
    if text.bold {
        leaf.marks.insert(Mark::Bold);
    }
    if text.italic {
        leaf.marks.insert(Mark::Italic);
    }
    if text.code {
        leaf.marks.insert(Mark::InlineCode);
    }
    if let Some(url) = text.link {
        leaf.marks.insert(Mark::Link(url));
    }
    Node::Leaf(leaf)
}

fn block_to_element(block: &Block) -> JsonNode {
    let (kind, language, url) = match &block.kind {
        BlockKind::Paragraph => ("paragraph", None, None),
        BlockKind::Heading { level: 1 } => ("heading-one", None, None),
        BlockKind::Heading { level: 2 } => ("heading-two", None, None),
        BlockKind::Heading { .. } => ("heading-three", None, None),
        BlockKind::BulletList => ("bulleted-list", None, None),
        BlockKind::NumberedList => ("numbered-list", None, None),
        BlockKind::ListItem => ("list-item", None, None),
        BlockKind::Quote => ("block-quote", None, None),
        BlockKind::CodeBlock { language } => ("code-block", Some(language.clone()), None),
        BlockKind::Image { url } => ("image", None, Some(url.clone())),
    };
    let children = block
        .children
        .iter()
        .map(|child| match child {
            Node::Block(inner) => block_to_element(inner),
            Node::Leaf(leaf) => JsonNode::Text(leaf_to_text(leaf)),
        })
        .collect();
    JsonNode::Element(JsonElement {
        kind: Some(kind.to_string()),
        language,
        url,
        children,
    })
}

fn leaf_to_text(leaf: &Leaf) -> JsonText {
    let mut text = JsonText {
        text: leaf.text.clone(),
        ..JsonText::default()
    };
    for mark in &leaf.marks {
        match mark {
            Mark::Bold => text.bold = true,
            Mark::Italic => text.italic = true,
            Mark::InlineCode => text.code = true,
            Mark::Link(url) => text.link = Some(url.clone()),
        }
    }
    text
}
