use std::collections::{BTreeMap, BTreeSet};

use crate::document::BlockId;

/// A highlighted span of one block's text.
///
/// `start < end`, both byte offsets into the block's concatenated leaf text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationRange {
    pub block: BlockId,
    pub start: usize,
    pub end: usize,
    pub tags: BTreeSet<String>,
}

impl DecorationRange {
    pub fn new<'a>(
        block: BlockId,
        start: usize,
        end: usize,
        tags: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            block,
            start,
            end,
            tags: tags.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Decoration ranges keyed by block, in block id order.
///
/// Blocks without ranges have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationTable {
    ranges: BTreeMap<BlockId, Vec<DecorationRange>>,
}

impl DecorationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranges for `block`, empty when it has none.
    pub fn get(&self, block: BlockId) -> &[DecorationRange] {
        self.ranges.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn insert(&mut self, block: BlockId, ranges: Vec<DecorationRange>) {
        self.ranges.insert(block, ranges);
    }

    pub fn contains(&self, block: BlockId) -> bool {
        self.ranges.contains_key(&block)
    }

    /// Number of blocks with ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &[DecorationRange])> {
        self.ranges.iter().map(|(id, ranges)| (*id, ranges.as_slice()))
    }
}
