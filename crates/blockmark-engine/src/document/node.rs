use std::collections::BTreeSet;
use std::fmt;

/// Language recorded on a code block when none was given.
pub const TEXT_LANGUAGE: &str = "text";

/// Stable identity of a block, issued by the owning [`Document`](super::Document).
///
/// Ids are assigned in increasing order and never reused, so they survive
/// every structural edit that keeps the block alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Level 1 to 3.
    Heading {
        level: u8,
    },
    BulletList,
    NumberedList,
    ListItem,
    Quote,
    CodeBlock {
        language: String,
    },
    Image {
        url: String,
    },
}

impl BlockKind {
    /// A code block kind; an empty language becomes [`TEXT_LANGUAGE`].
    pub fn code_block(language: impl Into<String>) -> Self {
        BlockKind::CodeBlock {
            language: language.into(),
        }
        .normalized()
    }

    /// A heading kind, clamped to levels 1..=3.
    pub fn heading(level: u8) -> Self {
        BlockKind::Heading {
            level: level.clamp(1, 3),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::BulletList | BlockKind::NumberedList)
    }

    pub fn is_code_block(&self) -> bool {
        matches!(self, BlockKind::CodeBlock { .. })
    }

    /// Void blocks hold no editable text.
    pub fn is_void(&self) -> bool {
        matches!(self, BlockKind::Image { .. })
    }

    /// The code block language, if this is a code block.
    pub fn language(&self) -> Option<&str> {
        match self {
            BlockKind::CodeBlock { language } => Some(language),
            _ => None,
        }
    }

    /// True when both kinds are the same variant, ignoring payloads other
    /// than heading level.
    pub fn same_type(&self, other: &BlockKind) -> bool {
        match (self, other) {
            (BlockKind::Heading { level: a }, BlockKind::Heading { level: b }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    pub(crate) fn normalized(self) -> Self {
        match self {
            BlockKind::CodeBlock { language } if language.trim().is_empty() => {
                BlockKind::CodeBlock {
                    language: TEXT_LANGUAGE.to_string(),
                }
            }
            BlockKind::Heading { level } => BlockKind::heading(level),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    Bold,
    Italic,
    InlineCode,
    Link(String),
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaf {
    pub text: String,
    pub marks: BTreeSet<Mark>,
}

impl Leaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: BTreeSet::new(),
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.insert(mark);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Leaf(Leaf),
}

impl Node {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Block(_) => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Node::Leaf(leaf) => leaf.text.clone(),
            Node::Block(block) => block.text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub children: Vec<Node>,
}

impl Block {
    /// A block with an unassigned id; the document issues one on insertion.
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self {
            id: BlockId::default(),
            kind: kind.normalized(),
            children,
        }
    }

    /// A text block holding a single unmarked leaf.
    pub fn text_block(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Node::Leaf(Leaf::new(text))])
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text_block(BlockKind::Paragraph, text)
    }

    pub fn code(language: &str, text: impl Into<String>) -> Self {
        Self::text_block(BlockKind::code_block(language), text)
    }

    /// A block whose children are other blocks (lists, nested quotes).
    pub fn container(kind: BlockKind, blocks: Vec<Block>) -> Self {
        Self::new(kind, blocks.into_iter().map(Node::Block).collect())
    }

    /// A block holds text when all of its children are leaves.
    pub fn is_text_block(&self) -> bool {
        self.children.iter().all(|child| matches!(child, Node::Leaf(_)))
    }

    /// Concatenated text of every leaf below this block.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Leaf(leaf) => out.push_str(&leaf.text),
                Node::Block(block) => block.push_text(out),
            }
        }
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.children.iter().filter_map(Node::as_leaf)
    }

    pub fn child_blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(Node::as_block)
    }

    pub(crate) fn text_len(&self) -> usize {
        self.leaves().map(|leaf| leaf.text.len()).sum()
    }

    /// Maps a block offset to `(leaf index, offset in leaf)`. At a boundary
    /// between two leaves the earlier leaf wins.
    pub(crate) fn locate(&self, offset: usize) -> (usize, usize) {
        let mut start = 0;
        let mut last = (0, 0);
        for (index, child) in self.children.iter().enumerate() {
            if let Node::Leaf(leaf) = child {
                let end = start + leaf.text.len();
                if offset <= end {
                    return (index, offset - start);
                }
                last = (index, leaf.text.len());
                start = end;
            }
        }
        last
    }

    /// Block offset of a position inside leaf `index`.
    pub(crate) fn offset_of(&self, index: usize, leaf_offset: usize) -> usize {
        self.children[..index.min(self.children.len())]
            .iter()
            .filter_map(Node::as_leaf)
            .map(|leaf| leaf.text.len())
            .sum::<usize>()
            + leaf_offset
    }

    pub(crate) fn insert_text(&mut self, offset: usize, text: &str) {
        if self.children.is_empty() {
            self.children.push(Node::Leaf(Leaf::default()));
        }
        let (index, at) = self.locate(offset);
        if let Some(Node::Leaf(leaf)) = self.children.get_mut(index) {
            leaf.text.insert_str(at, text);
        }
    }

    /// Removes the text in `range` (block offsets), keeping leaf marks.
    pub(crate) fn delete_text(&mut self, range: std::ops::Range<usize>) {
        let mut start = 0;
        for child in &mut self.children {
            if let Node::Leaf(leaf) = child {
                let end = start + leaf.text.len();
                let from = range.start.clamp(start, end) - start;
                let to = range.end.clamp(start, end) - start;
                if from < to {
                    leaf.text.replace_range(from..to, "");
                }
                start = end;
            }
        }
    }

    /// Splits the leaves at `offset`, returning everything after it.
    pub(crate) fn split_leaves(&mut self, offset: usize) -> Vec<Node> {
        let (index, at) = self.locate(offset);
        let mut tail = self.children.split_off((index + 1).min(self.children.len()));
        if let Some(Node::Leaf(leaf)) = self.children.get_mut(index) {
            let rest = leaf.text.split_off(at);
            tail.insert(
                0,
                Node::Leaf(Leaf {
                    text: rest,
                    marks: leaf.marks.clone(),
                }),
            );
        }
        tail
    }

    /// Merges adjacent leaves with equal marks and drops empty ones,
    /// keeping at least one leaf.
    pub(crate) fn normalize_leaves(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            let Node::Leaf(leaf) = child else {
                merged.push(child);
                continue;
            };
            if let Some(Node::Leaf(previous)) = merged.last_mut()
                && (previous.marks == leaf.marks || leaf.text.is_empty())
            {
                previous.text.push_str(&leaf.text);
                continue;
            }
            if let Some(Node::Leaf(previous)) = merged.last_mut()
                && previous.text.is_empty()
            {
                *previous = leaf;
                continue;
            }
            merged.push(Node::Leaf(leaf));
        }
        if merged.is_empty() {
            merged.push(Node::Leaf(Leaf::default()));
        }
        self.children = merged;
    }
}
