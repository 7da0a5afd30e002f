use super::commands::{Cmd, DeleteUnit};
use super::node::{Block, BlockId, BlockKind, Node};
use super::patch::{ChangeOrigin, Patch};
use super::point::{BlockPoint, BlockRange, Path, Point, Range, Selection};
use crate::error::DocumentError;

/// A block-structured document with a selection.
///
/// ## Tree Shape
///
/// The root holds an ordered list of blocks. A block holds either leaves
/// (a *text block*: paragraphs, headings, list items, code blocks) or other
/// blocks (lists, and quotes that nest). Positions are [`Point`]s: the path
/// of a leaf plus a byte offset into it.
///
/// ## Editing
///
/// All mutation goes through [`Document::apply`], which takes a [`Cmd`] and
/// returns a [`Patch`] describing the change. After every command the tree
/// is normalized:
///
/// - empty lists are removed
/// - text blocks keep at least one leaf, and adjacent leaves with equal marks
///   are merged
/// - the document keeps at least one block
///
/// Structural commands move blocks between parents, which changes paths. The
/// selection is therefore carried through each command as block id plus
/// offset and resolved back to a path afterwards.
///
/// ```
/// use blockmark_engine::document::{Block, BlockKind, Cmd, Document};
///
/// let mut doc = Document::new(vec![Block::paragraph("hello")]);
/// doc.apply(Cmd::InsertText { text: "> ".into() }).unwrap();
/// doc.apply(Cmd::SetKind { at: vec![0], kind: BlockKind::Quote }).unwrap();
///
/// assert_eq!(doc.blocks().next().unwrap().text(), "> hello");
/// assert_eq!(doc.version(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) children: Vec<Node>,
    pub(crate) selection: Option<Selection>,
    pub(crate) version: u64,
    pub(crate) next_id: u64,
}

/// What a command did, before normalization and selection resolution.
struct Edit {
    changed: Vec<BlockId>,
    selection: SelectionUpdate,
}

enum SelectionUpdate {
    Keep,
    Set(BlockRange),
}

impl Edit {
    fn none() -> Self {
        Self {
            changed: Vec::new(),
            selection: SelectionUpdate::Keep,
        }
    }

    fn keep(changed: Vec<BlockId>) -> Self {
        Self {
            changed,
            selection: SelectionUpdate::Keep,
        }
    }

    fn at(changed: Vec<BlockId>, point: BlockPoint) -> Self {
        Self {
            changed,
            selection: SelectionUpdate::Set(BlockRange::collapsed(point)),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Builds a document, issuing ids to every block and placing a collapsed
    /// selection at the start of the first text block.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self {
            children: Vec::with_capacity(blocks.len()),
            selection: None,
            version: 0,
            next_id: 1,
        };
        for mut block in blocks {
            doc.adopt(&mut block);
            doc.children.push(Node::Block(block));
        }
        doc.normalize();
        doc.selection = doc.first_point().map(Range::collapsed);
        doc
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Top-level blocks.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(Node::as_block)
    }

    /// Applies one command atomically.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, DocumentError> {
        if let Cmd::Select { range } = cmd {
            self.validate_point(&range.anchor)?;
            self.validate_point(&range.focus)?;
            self.selection = Some(range);
            return Ok(self.patch(ChangeOrigin::Selection, Vec::new()));
        }

        let saved = self
            .selection
            .as_ref()
            .and_then(|selection| self.block_range(selection));

        let edit = match cmd {
            Cmd::InsertText { text } => self.insert_text(&text)?,
            Cmd::DeleteBackward { unit } => self.delete_backward(unit)?,
            Cmd::DeleteRange { range } => {
                let (start, changed) = self.delete_range(&range)?;
                Edit::at(changed, start)
            }
            Cmd::SplitBlock => self.split_block()?,
            Cmd::SetKind { at, kind } => {
                let block = self.block_at_mut(&at).ok_or(DocumentError::InvalidPath(at))?;
                block.kind = kind.normalized();
                Edit::keep(vec![block.id])
            }
            Cmd::WrapNodes { at, kind } => self.wrap_nodes(&at, kind)?,
            Cmd::UnwrapNodes { at } => self.unwrap_nodes(&at)?,
            Cmd::LiftBlock { at } => self.lift_block(&at)?,
            Cmd::InsertBlock { at, block } => self.insert_block(&at, block)?,
            Cmd::RemoveBlock { at } => self.remove_block(&at, saved.as_ref())?,
            Cmd::Select { .. } => Edit::none(),
        };

        if edit.changed.is_empty() {
            return Ok(self.patch(ChangeOrigin::Selection, Vec::new()));
        }

        self.normalize();
        let target = match edit.selection {
            SelectionUpdate::Keep => saved,
            SelectionUpdate::Set(range) => Some(range),
        };
        self.selection = target.map(|range| self.resolve_range(range));
        self.version += 1;
        Ok(self.patch(ChangeOrigin::Content, edit.changed))
    }

    fn patch(&self, origin: ChangeOrigin, changed: Vec<BlockId>) -> Patch {
        Patch {
            origin,
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    // ---- queries ----

    pub fn block_at(&self, path: &[usize]) -> Option<&Block> {
        let (first, rest) = path.split_first()?;
        let mut block = self.children.get(*first)?.as_block()?;
        for &index in rest {
            block = block.children.get(index)?.as_block()?;
        }
        Some(block)
    }

    fn block_at_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        let (first, rest) = path.split_first()?;
        let mut block = self.children.get_mut(*first)?.as_block_mut()?;
        for &index in rest {
            block = block.children.get_mut(index)?.as_block_mut()?;
        }
        Some(block)
    }

    fn children_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            Some(&mut self.children)
        } else {
            self.block_at_mut(parent).map(|block| &mut block.children)
        }
    }

    /// The block with the given id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.find_path(id).and_then(|path| self.block_at(&path))
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        let path = self.find_path(id)?;
        self.block_at_mut(&path)
    }

    pub fn find_path(&self, id: BlockId) -> Option<Path> {
        self.walk()
            .into_iter()
            .find(|(_, block)| block.id == id)
            .map(|(path, _)| path)
    }

    /// Every block in document order, parents before children.
    pub fn walk(&self) -> Vec<(Path, &Block)> {
        fn visit<'a>(nodes: &'a [Node], prefix: &mut Path, out: &mut Vec<(Path, &'a Block)>) {
            for (index, node) in nodes.iter().enumerate() {
                if let Node::Block(block) = node {
                    prefix.push(index);
                    out.push((prefix.clone(), block));
                    visit(&block.children, prefix, out);
                    prefix.pop();
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.children, &mut Vec::new(), &mut out);
        out
    }

    /// Blocks satisfying `predicate`, in document order.
    pub fn nodes_matching(&self, predicate: impl Fn(&Block) -> bool) -> Vec<(Path, &Block)> {
        self.walk()
            .into_iter()
            .filter(|(_, block)| predicate(block))
            .collect()
    }

    pub fn has_code_block(&self) -> bool {
        self.walk().iter().any(|(_, block)| block.kind.is_code_block())
    }

    /// Text blocks that accept a cursor, in document order.
    pub fn text_blocks(&self) -> Vec<(Path, &Block)> {
        self.nodes_matching(|block| block.is_text_block() && !block.kind.is_void())
    }

    /// The nearest block containing `point`.
    pub fn above_block(&self, point: &Point) -> Option<(Path, &Block)> {
        let (_, parent) = point.path.split_last()?;
        let block = self.block_at(parent)?;
        Some((parent.to_vec(), block))
    }

    /// The block holding the selection anchor.
    pub fn current_block(&self) -> Option<(Path, &Block)> {
        self.above_block(&self.selection.as_ref()?.anchor)
    }

    /// First position inside the node at `path`.
    pub fn start_of(&self, path: &[usize]) -> Result<Point, DocumentError> {
        let mut block = self
            .block_at(path)
            .ok_or_else(|| DocumentError::InvalidPath(path.to_vec()))?;
        let mut out = path.to_vec();
        loop {
            match block.children.first() {
                Some(Node::Block(child)) => {
                    out.push(0);
                    block = child;
                }
                Some(Node::Leaf(_)) => {
                    out.push(0);
                    return Ok(Point::new(out, 0));
                }
                None => return Err(DocumentError::NotATextBlock(out)),
            }
        }
    }

    /// Last position inside the node at `path`.
    pub fn end_of(&self, path: &[usize]) -> Result<Point, DocumentError> {
        let mut block = self
            .block_at(path)
            .ok_or_else(|| DocumentError::InvalidPath(path.to_vec()))?;
        let mut out = path.to_vec();
        loop {
            let last = block.children.len().saturating_sub(1);
            match block.children.last() {
                Some(Node::Block(child)) => {
                    out.push(last);
                    block = child;
                }
                Some(Node::Leaf(leaf)) => {
                    out.push(last);
                    return Ok(Point::new(out, leaf.text.len()));
                }
                None => return Err(DocumentError::NotATextBlock(out)),
            }
        }
    }

    /// Text covered by `range`, leaves concatenated without separators.
    pub fn string_in_range(&self, range: &Range) -> String {
        let (start, end) = (range.start(), range.end());
        let mut out = String::new();
        for (path, block) in self.walk() {
            for (index, child) in block.children.iter().enumerate() {
                let Node::Leaf(leaf) = child else { continue };
                let mut leaf_path = path.clone();
                leaf_path.push(index);
                if leaf_path < start.path || leaf_path > end.path {
                    continue;
                }
                let from = if leaf_path == start.path { start.offset } else { 0 };
                let to = if leaf_path == end.path {
                    end.offset
                } else {
                    leaf.text.len()
                };
                if let Some(slice) = leaf.text.get(from.min(to)..to.min(leaf.text.len())) {
                    out.push_str(slice);
                }
            }
        }
        out
    }

    /// Converts a point into block id plus offset within the block's text.
    pub fn block_point(&self, point: &Point) -> Result<(BlockId, usize), DocumentError> {
        let bp = self.to_block_point(point)?;
        Ok((bp.block, bp.offset))
    }

    /// The point at `offset` in the text of block `id`.
    pub fn point_in_block(&self, id: BlockId, offset: usize) -> Option<Point> {
        self.resolve(BlockPoint { block: id, offset })
    }

    fn validate_point(&self, point: &Point) -> Result<(), DocumentError> {
        self.to_block_point(point).map(|_| ())
    }

    fn to_block_point(&self, point: &Point) -> Result<BlockPoint, DocumentError> {
        let invalid = || DocumentError::InvalidPath(point.path.clone());
        let (&index, parent) = point.path.split_last().ok_or_else(invalid)?;
        let block = self.block_at(parent).ok_or_else(invalid)?;
        let leaf = block
            .children
            .get(index)
            .and_then(Node::as_leaf)
            .ok_or_else(invalid)?;
        if point.offset > leaf.text.len() || !leaf.text.is_char_boundary(point.offset) {
            return Err(DocumentError::InvalidOffset {
                path: point.path.clone(),
                offset: point.offset,
            });
        }
        Ok(BlockPoint {
            block: block.id,
            offset: block.offset_of(index, point.offset),
        })
    }

    fn block_range(&self, range: &Range) -> Option<BlockRange> {
        Some(BlockRange {
            anchor: self.to_block_point(&range.anchor).ok()?,
            focus: self.to_block_point(&range.focus).ok()?,
        })
    }

    fn resolve(&self, point: BlockPoint) -> Option<Point> {
        let mut path = self.find_path(point.block)?;
        let block = self.block_at(&path)?;
        if !block.is_text_block() {
            return None;
        }
        let text = block.text();
        let mut offset = point.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let (index, leaf_offset) = block.locate(offset);
        path.push(index);
        Some(Point::new(path, leaf_offset))
    }

    fn resolve_range(&self, range: BlockRange) -> Range {
        let fallback = || self.first_point();
        let anchor = self.resolve(range.anchor).or_else(fallback);
        let focus = self.resolve(range.focus).or_else(fallback);
        match (anchor, focus) {
            (Some(anchor), Some(focus)) => Range::new(anchor, focus),
            _ => Range::collapsed(Point::new(vec![0, 0], 0)),
        }
    }

    fn first_point(&self) -> Option<Point> {
        let (path, _) = self.text_blocks().into_iter().next()?;
        self.start_of(&path).ok()
    }

    fn selection_point(&self) -> Result<(Selection, BlockPoint), DocumentError> {
        let selection = self.selection.clone().ok_or(DocumentError::NoSelection)?;
        let point = self.to_block_point(&selection.anchor)?;
        Ok((selection, point))
    }

    fn editable(&self, id: BlockId) -> Result<&Block, DocumentError> {
        let path = self.find_path(id).ok_or(DocumentError::InvalidPath(Vec::new()))?;
        match self.block_at(&path) {
            Some(block) if block.is_text_block() && !block.kind.is_void() => Ok(block),
            _ => Err(DocumentError::NotATextBlock(path)),
        }
    }

    // ---- commands ----

    fn insert_text(&mut self, text: &str) -> Result<Edit, DocumentError> {
        let (selection, mut point) = self.selection_point()?;
        let mut changed = Vec::new();
        if !selection.is_collapsed() {
            self.editable(self.to_block_point(selection.start())?.block)?;
            let (start, removed) = self.delete_range(&selection)?;
            point = start;
            changed = removed;
        }
        self.editable(point.block)?;
        if text.is_empty() {
            return Ok(Edit::at(changed, point));
        }

        if let Some(block) = self.block_mut(point.block) {
            block.insert_text(point.offset, text);
        }
        changed.push(point.block);
        Ok(Edit::at(
            changed,
            BlockPoint {
                block: point.block,
                offset: point.offset + text.len(),
            },
        ))
    }

    fn delete_backward(&mut self, unit: DeleteUnit) -> Result<Edit, DocumentError> {
        let (selection, point) = self.selection_point()?;
        if !selection.is_collapsed() {
            let (start, changed) = self.delete_range(&selection)?;
            return Ok(Edit::at(changed, start));
        }

        let text = self.editable(point.block)?.text();
        if point.offset > 0 {
            let start = previous_boundary(&text, point.offset, unit);
            if let Some(block) = self.block_mut(point.block) {
                block.delete_text(start..point.offset);
            }
            return Ok(Edit::at(
                vec![point.block],
                BlockPoint {
                    block: point.block,
                    offset: start,
                },
            ));
        }

        self.merge_into_previous(point.block)
    }

    /// Joins block `id` onto the end of the text block before it.
    fn merge_into_previous(&mut self, id: BlockId) -> Result<Edit, DocumentError> {
        let order = self.nodes_matching(Block::is_text_block);
        let Some(position) = order.iter().position(|(_, block)| block.id == id) else {
            return Err(DocumentError::InvalidPath(Vec::new()));
        };
        let Some((previous_path, previous)) = position.checked_sub(1).map(|i| &order[i]) else {
            return Ok(Edit::none());
        };
        let current_path = order[position].0.clone();

        if previous.kind.is_void() {
            let previous_path = previous_path.clone();
            self.remove_node(&previous_path);
            return Ok(Edit::keep(vec![id]));
        }

        let previous_id = previous.id;
        let join_at = previous.text_len();
        let leaves = self
            .block_at_mut(&current_path)
            .map(|block| std::mem::take(&mut block.children))
            .unwrap_or_default();
        if let Some(block) = self.block_mut(previous_id) {
            block.children.extend(leaves);
        }
        self.remove_node(&current_path);
        Ok(Edit::at(
            vec![previous_id, id],
            BlockPoint {
                block: previous_id,
                offset: join_at,
            },
        ))
    }

    fn delete_range(&mut self, range: &Range) -> Result<(BlockPoint, Vec<BlockId>), DocumentError> {
        let start = self.to_block_point(range.start())?;
        let end = self.to_block_point(range.end())?;

        if start.block == end.block {
            if let Some(block) = self.block_mut(start.block) {
                block.delete_text(start.offset..end.offset);
            }
            return Ok((start, vec![start.block]));
        }

        let order = self.nodes_matching(Block::is_text_block);
        let index_of = |id: BlockId| order.iter().position(|(_, block)| block.id == id);
        let (Some(first), Some(last)) = (index_of(start.block), index_of(end.block)) else {
            return Err(DocumentError::InvalidPath(range.start().path.clone()));
        };
        let doomed: Vec<(Path, BlockId)> = order[first + 1..=last]
            .iter()
            .map(|(path, block)| (path.clone(), block.id))
            .collect();

        let tail = self
            .block_mut(end.block)
            .map(|block| block.split_leaves(end.offset))
            .unwrap_or_default();
        if let Some(block) = self.block_mut(start.block) {
            let len = block.text_len();
            block.delete_text(start.offset..len);
            if !block.kind.is_void() {
                block.children.extend(tail);
            }
        }
        // Text blocks never contain each other, so removing back to front
        // keeps the remaining paths valid.
        for (path, _) in doomed.iter().rev() {
            self.remove_node(path);
        }

        let mut changed = vec![start.block];
        changed.extend(doomed.into_iter().map(|(_, id)| id));
        Ok((start, changed))
    }

    fn split_block(&mut self) -> Result<Edit, DocumentError> {
        let (selection, mut point) = self.selection_point()?;
        self.editable(point.block)?;
        let mut changed = Vec::new();
        if !selection.is_collapsed() {
            self.editable(self.to_block_point(selection.start())?.block)?;
            let (start, removed) = self.delete_range(&selection)?;
            point = start;
            changed = removed;
        }

        let path = self
            .find_path(point.block)
            .ok_or(DocumentError::InvalidPath(Vec::new()))?;
        let Some(block) = self.block_at_mut(&path) else {
            return Err(DocumentError::InvalidPath(path));
        };
        let tail = block.split_leaves(point.offset);
        let mut fresh = Block::new(block.kind.clone(), tail);
        fresh.id = self.issue_id();
        let fresh_id = fresh.id;

        let (parent, index) = split_path(&path)?;
        if let Some(siblings) = self.children_mut(parent) {
            siblings.insert(index + 1, Node::Block(fresh));
        }
        changed.extend([point.block, fresh_id]);
        Ok(Edit::at(
            changed,
            BlockPoint {
                block: fresh_id,
                offset: 0,
            },
        ))
    }

    fn wrap_nodes(&mut self, at: &[usize], kind: BlockKind) -> Result<Edit, DocumentError> {
        self.block_at(at)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        let (parent, index) = split_path(at)?;
        let id = self.issue_id();
        let siblings = self
            .children_mut(parent)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        let node = siblings.remove(index);
        let mut container = Block::new(kind, vec![node]);
        container.id = id;
        siblings.insert(index, Node::Block(container));
        Ok(Edit::keep(vec![id]))
    }

    fn unwrap_nodes(&mut self, at: &[usize]) -> Result<Edit, DocumentError> {
        let block = self
            .block_at(at)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        if block.children.iter().any(|child| matches!(child, Node::Leaf(_))) {
            return Err(DocumentError::NotAContainer(at.to_vec()));
        }
        let id = block.id;
        let (parent, index) = split_path(at)?;
        let siblings = self
            .children_mut(parent)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        if let Node::Block(container) = siblings.remove(index) {
            siblings.splice(index..index, container.children);
        }
        Ok(Edit::keep(vec![id]))
    }

    fn lift_block(&mut self, at: &[usize]) -> Result<Edit, DocumentError> {
        let block = self
            .block_at(at)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        if at.len() < 2 {
            return Err(DocumentError::NotNested(at.to_vec()));
        }
        let id = block.id;
        let (parent_path, index) = split_path(at)?;
        let (grandparent, parent_index) = split_path(parent_path)?;

        let Some(parent) = self.block_at_mut(parent_path) else {
            return Err(DocumentError::InvalidPath(parent_path.to_vec()));
        };
        let right = parent.children.split_off(index + 1);
        let lifted = parent.children.remove(index);
        let kind = parent.kind.clone();

        // Lifting the first item moves it in front of the parent, which keeps
        // the rest; lifting a later item splits the parent and the right half
        // becomes a new block.
        let mut moved = vec![lifted];
        let (from, to) = if parent.children.is_empty() {
            parent.children = right;
            if parent.children.is_empty() {
                (parent_index, parent_index + 1)
            } else {
                (parent_index, parent_index)
            }
        } else {
            if !right.is_empty() {
                let mut tail = Block::new(kind, right);
                tail.id = self.issue_id();
                moved.push(Node::Block(tail));
            }
            (parent_index + 1, parent_index + 1)
        };

        let Some(siblings) = self.children_mut(grandparent) else {
            return Err(DocumentError::InvalidPath(grandparent.to_vec()));
        };
        siblings.splice(from..to, moved);
        Ok(Edit::keep(vec![id]))
    }

    fn insert_block(&mut self, at: &[usize], mut block: Block) -> Result<Edit, DocumentError> {
        let (parent, index) = split_path(at)?;
        if let Some(container) = self.block_at(parent)
            && container.children.iter().any(|child| matches!(child, Node::Leaf(_)))
        {
            return Err(DocumentError::NotAContainer(parent.to_vec()));
        }
        let len = if parent.is_empty() {
            self.children.len()
        } else {
            self.block_at(parent)
                .ok_or_else(|| DocumentError::InvalidPath(parent.to_vec()))?
                .children
                .len()
        };
        if index > len {
            return Err(DocumentError::InvalidPath(at.to_vec()));
        }

        self.adopt(&mut block);
        let id = block.id;
        if let Some(siblings) = self.children_mut(parent) {
            siblings.insert(index, Node::Block(block));
        }
        Ok(Edit::keep(vec![id]))
    }

    fn remove_block(&mut self, at: &[usize], saved: Option<&BlockRange>) -> Result<Edit, DocumentError> {
        let block = self
            .block_at(at)
            .ok_or_else(|| DocumentError::InvalidPath(at.to_vec()))?;
        let id = block.id;

        let selection_inside = saved.is_some_and(|range| {
            self.find_path(range.anchor.block)
                .is_some_and(|path| path.starts_with(at))
        });
        let previous = self
            .text_blocks()
            .into_iter()
            .rev()
            .find(|(path, _)| path.as_slice() < at && !path.starts_with(at))
            .map(|(_, block)| BlockPoint {
                block: block.id,
                offset: block.text_len(),
            });

        self.remove_node(at);
        match (selection_inside, previous) {
            (true, Some(point)) => Ok(Edit::at(vec![id], point)),
            _ => Ok(Edit::keep(vec![id])),
        }
    }

    fn remove_node(&mut self, path: &[usize]) {
        if let Ok((parent, index)) = split_path(path)
            && let Some(siblings) = self.children_mut(parent)
            && index < siblings.len()
        {
            siblings.remove(index);
        }
    }

    // ---- ids and normalization ----

    fn issue_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Issues fresh ids to `block` and every block below it.
    fn adopt(&mut self, block: &mut Block) {
        block.id = self.issue_id();
        for child in &mut block.children {
            if let Node::Block(inner) = child {
                self.adopt(inner);
            }
        }
    }

    fn normalize(&mut self) {
        fn normalize_block(block: &mut Block) {
            for child in &mut block.children {
                if let Node::Block(inner) = child {
                    normalize_block(inner);
                }
            }
            block.children.retain(|child| !is_empty_list(child));
            if !block.kind.is_list() && block.is_text_block() {
                block.normalize_leaves();
            }
        }

        for child in &mut self.children {
            if let Node::Block(block) = child {
                normalize_block(block);
            }
        }
        self.children.retain(|child| !is_empty_list(child));

        let mut stray = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            if let Node::Leaf(_) = child {
                stray.push(index);
            }
        }
        for index in stray.into_iter().rev() {
            if let Node::Leaf(leaf) = self.children.remove(index) {
                let mut block = Block::new(BlockKind::Paragraph, vec![Node::Leaf(leaf)]);
                block.id = self.issue_id();
                self.children.insert(index, Node::Block(block));
            }
        }

        if self.children.is_empty() {
            let mut block = Block::paragraph("");
            block.id = self.issue_id();
            self.children.push(Node::Block(block));
        }
    }
}

/// Only lists are dropped when empty. Any other block with no children is a
/// text block and gets an empty leaf from `normalize_leaves`.
fn is_empty_list(node: &Node) -> bool {
    matches!(node, Node::Block(block) if block.kind.is_list() && block.children.is_empty())
}

fn split_path(path: &[usize]) -> Result<(&[usize], usize), DocumentError> {
    match path.split_last() {
        Some((&index, parent)) => Ok((parent, index)),
        None => Err(DocumentError::InvalidPath(Vec::new())),
    }
}

/// Start of the text removed by a backward deletion ending at `offset`.
fn previous_boundary(text: &str, offset: usize, unit: DeleteUnit) -> usize {
    let before = &text[..offset];
    match unit {
        DeleteUnit::Character => before.char_indices().next_back().map_or(0, |(i, _)| i),
        DeleteUnit::Word => {
            let mut chars = before.char_indices().rev().peekable();
            let mut start = offset;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_whitespace() {
                    break;
                }
                start = i;
                chars.next();
            }
            let mut took_word = false;
            while let Some(&(i, c)) = chars.peek() {
                if !(c.is_alphanumeric() || c == '_') {
                    break;
                }
                start = i;
                took_word = true;
                chars.next();
            }
            if !took_word
                && start == offset
                && let Some((i, _)) = chars.next()
            {
                start = i;
            }
            start
        }
        DeleteUnit::Line => match before.rfind('\n') {
            Some(i) if i + 1 == offset => i,
            Some(i) => i + 1,
            None => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Leaf, Mark};
    use pretty_assertions::assert_eq;

    fn caret(doc: &mut Document, path: Path, offset: usize) {
        doc.apply(Cmd::Select {
            range: Range::collapsed(Point::new(path, offset)),
        })
        .unwrap();
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.text_blocks()
            .into_iter()
            .map(|(_, block)| block.text())
            .collect()
    }

    fn list(items: &[&str]) -> Block {
        Block::container(
            BlockKind::BulletList,
            items
                .iter()
                .map(|text| Block::text_block(BlockKind::ListItem, *text))
                .collect(),
        )
    }

    // ============ Construction ============

    #[test]
    fn new_document_issues_unique_ids() {
        let doc = Document::new(vec![Block::paragraph("a"), list(&["b", "c"])]);
        let mut ids: Vec<_> = doc.walk().iter().map(|(_, block)| block.id).collect();
        let count = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|id| id.0 > 0));
    }

    #[test]
    fn empty_document_has_one_paragraph_and_a_caret() {
        let doc = Document::default();
        assert_eq!(texts(&doc), vec![""]);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![0, 0], 0)))
        );
    }

    // ============ Text commands ============

    #[test]
    fn insert_text_advances_caret() {
        let mut doc = Document::new(vec![Block::paragraph("ac")]);
        caret(&mut doc, vec![0, 0], 1);
        let patch = doc.apply(Cmd::InsertText { text: "b".into() }).unwrap();
        assert_eq!(texts(&doc), vec!["abc"]);
        assert_eq!(patch.origin, ChangeOrigin::Content);
        assert_eq!(
            patch.new_selection,
            Some(Range::collapsed(Point::new(vec![0, 0], 2)))
        );
    }

    #[test]
    fn insert_text_replaces_expanded_selection_across_blocks() {
        let mut doc = Document::new(vec![Block::paragraph("hello"), Block::paragraph("world")]);
        doc.apply(Cmd::Select {
            range: Range::new(Point::new(vec![0, 0], 2), Point::new(vec![1, 0], 3)),
        })
        .unwrap();
        doc.apply(Cmd::InsertText { text: "-".into() }).unwrap();
        assert_eq!(texts(&doc), vec!["he-ld"]);
    }

    #[test]
    fn select_rejects_offsets_inside_a_char() {
        let mut doc = Document::new(vec![Block::paragraph("é")]);
        let err = doc
            .apply(Cmd::Select {
                range: Range::collapsed(Point::new(vec![0, 0], 1)),
            })
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidOffset { offset: 1, .. }));
    }

    #[test]
    fn select_does_not_bump_version() {
        let mut doc = Document::new(vec![Block::paragraph("abc")]);
        caret(&mut doc, vec![0, 0], 2);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn delete_backward_removes_previous_char() {
        let mut doc = Document::new(vec![Block::paragraph("añb")]);
        caret(&mut doc, vec![0, 0], 3);
        doc.apply(Cmd::DeleteBackward {
            unit: DeleteUnit::Character,
        })
        .unwrap();
        assert_eq!(texts(&doc), vec!["ab"]);
        assert_eq!(doc.selection().unwrap().anchor.offset, 1);
    }

    #[test]
    fn delete_backward_by_word_and_line() {
        let mut doc = Document::new(vec![Block::paragraph("one\ntwo three  ")]);
        caret(&mut doc, vec![0, 0], 15);
        doc.apply(Cmd::DeleteBackward {
            unit: DeleteUnit::Word,
        })
        .unwrap();
        assert_eq!(texts(&doc), vec!["one\ntwo "]);
        doc.apply(Cmd::DeleteBackward {
            unit: DeleteUnit::Line,
        })
        .unwrap();
        assert_eq!(texts(&doc), vec!["one\n"]);
    }

    #[test]
    fn delete_backward_at_block_start_merges_into_previous() {
        let mut doc = Document::new(vec![Block::paragraph("ab"), list(&["cd"])]);
        caret(&mut doc, vec![1, 0, 0], 0);
        doc.apply(Cmd::DeleteBackward {
            unit: DeleteUnit::Character,
        })
        .unwrap();
        assert_eq!(texts(&doc), vec!["abcd"]);
        // The emptied list is normalized away.
        assert_eq!(doc.blocks().count(), 1);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![0, 0], 2)))
        );
    }

    #[test]
    fn delete_backward_at_document_start_is_a_no_op() {
        let mut doc = Document::new(vec![Block::paragraph("ab")]);
        let patch = doc
            .apply(Cmd::DeleteBackward {
                unit: DeleteUnit::Character,
            })
            .unwrap();
        assert!(patch.is_selection_only());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn split_block_keeps_kind_and_moves_caret() {
        let mut doc = Document::new(vec![Block::text_block(BlockKind::heading(2), "title")]);
        caret(&mut doc, vec![0, 0], 3);
        let patch = doc.apply(Cmd::SplitBlock).unwrap();
        assert_eq!(texts(&doc), vec!["tit", "le"]);
        assert_eq!(doc.block_at(&[1]).unwrap().kind, BlockKind::heading(2));
        assert_eq!(patch.changed.len(), 2);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![1, 0], 0)))
        );
    }

    #[test]
    fn marks_survive_insertion() {
        let mut doc = Document::new(vec![Block::new(
            BlockKind::Paragraph,
            vec![
                Node::Leaf(Leaf::new("a")),
                Node::Leaf(Leaf::new("b").with_mark(Mark::Bold)),
            ],
        )]);
        caret(&mut doc, vec![0, 1], 1);
        doc.apply(Cmd::InsertText { text: "c".into() }).unwrap();
        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(
            block.children[1],
            Node::Leaf(Leaf::new("bc").with_mark(Mark::Bold))
        );
    }

    // ============ Structural commands ============

    #[test]
    fn wrap_and_unwrap_round_trip() {
        let mut doc = Document::new(vec![Block::text_block(BlockKind::ListItem, "x")]);
        caret(&mut doc, vec![0, 0], 1);
        doc.apply(Cmd::WrapNodes {
            at: vec![0],
            kind: BlockKind::NumberedList,
        })
        .unwrap();
        assert_eq!(doc.block_at(&[0]).unwrap().kind, BlockKind::NumberedList);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![0, 0, 0], 1)))
        );

        doc.apply(Cmd::UnwrapNodes { at: vec![0] }).unwrap();
        assert_eq!(doc.block_at(&[0]).unwrap().kind, BlockKind::ListItem);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![0, 0], 1)))
        );
    }

    #[test]
    fn unwrap_rejects_text_blocks() {
        let mut doc = Document::new(vec![Block::paragraph("x")]);
        assert_eq!(
            doc.apply(Cmd::UnwrapNodes { at: vec![0] }),
            Err(DocumentError::NotAContainer(vec![0]))
        );
    }

    #[test]
    fn lift_only_item_replaces_list() {
        let mut doc = Document::new(vec![list(&["a"])]);
        doc.apply(Cmd::LiftBlock { at: vec![0, 0] }).unwrap();
        assert_eq!(doc.blocks().count(), 1);
        assert_eq!(doc.block_at(&[0]).unwrap().kind, BlockKind::ListItem);
    }

    #[test]
    fn lift_first_item_keeps_list_id() {
        let mut doc = Document::new(vec![list(&["a", "b"])]);
        let list_id = doc.block_at(&[0]).unwrap().id;
        doc.apply(Cmd::LiftBlock { at: vec![0, 0] }).unwrap();
        assert_eq!(doc.block_at(&[0]).unwrap().text(), "a");
        assert_eq!(doc.block_at(&[1]).unwrap().id, list_id);
        assert_eq!(doc.block_at(&[1]).unwrap().text(), "b");
    }

    #[test]
    fn lift_middle_item_splits_list() {
        let mut doc = Document::new(vec![list(&["a", "b", "c"])]);
        caret(&mut doc, vec![0, 1, 0], 1);
        doc.apply(Cmd::LiftBlock { at: vec![0, 1] }).unwrap();

        let kinds: Vec<_> = doc.blocks().map(|block| block.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::BulletList, BlockKind::ListItem, BlockKind::BulletList]
        );
        assert_eq!(texts(&doc), vec!["a", "b", "c"]);
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![1, 0], 1)))
        );
    }

    #[test]
    fn lift_top_level_block_is_an_error() {
        let mut doc = Document::new(vec![Block::paragraph("x")]);
        assert_eq!(
            doc.apply(Cmd::LiftBlock { at: vec![0] }),
            Err(DocumentError::NotNested(vec![0]))
        );
    }

    #[test]
    fn insert_and_remove_block() {
        let mut doc = Document::new(vec![Block::paragraph("a")]);
        doc.apply(Cmd::InsertBlock {
            at: vec![1],
            block: Block::code("", "x"),
        })
        .unwrap();
        assert!(doc.has_code_block());
        assert_eq!(
            doc.block_at(&[1]).unwrap().kind.language(),
            Some(crate::document::TEXT_LANGUAGE)
        );

        caret(&mut doc, vec![1, 0], 1);
        doc.apply(Cmd::RemoveBlock { at: vec![1] }).unwrap();
        assert!(!doc.has_code_block());
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![0, 0], 1)))
        );
    }

    #[test]
    fn insert_block_into_text_block_is_rejected() {
        let mut doc = Document::new(vec![Block::paragraph("a")]);
        let err = doc
            .apply(Cmd::InsertBlock {
                at: vec![0, 0],
                block: Block::paragraph("b"),
            })
            .unwrap_err();
        assert_eq!(err, DocumentError::NotAContainer(vec![0]));
        assert_eq!(texts(&doc), vec!["a"]);
    }

    #[test]
    fn removing_last_block_leaves_empty_paragraph() {
        let mut doc = Document::new(vec![Block::paragraph("a")]);
        doc.apply(Cmd::RemoveBlock { at: vec![0] }).unwrap();
        assert_eq!(texts(&doc), vec![""]);
        assert!(doc.selection().is_some());
    }

    // ============ Queries ============

    #[test]
    fn start_and_end_descend_into_containers() {
        let doc = Document::new(vec![list(&["ab", "cde"])]);
        assert_eq!(doc.start_of(&[0]).unwrap(), Point::new(vec![0, 0, 0], 0));
        assert_eq!(doc.end_of(&[0]).unwrap(), Point::new(vec![0, 1, 0], 3));
    }

    #[test]
    fn string_in_range_spans_blocks() {
        let doc = Document::new(vec![Block::paragraph("hello"), Block::paragraph("world")]);
        let range = Range::new(Point::new(vec![1, 0], 2), Point::new(vec![0, 0], 3));
        assert_eq!(doc.string_in_range(&range), "lowo");
    }

    #[test]
    fn above_block_and_find_path_agree() {
        let doc = Document::new(vec![Block::paragraph("a"), list(&["b"])]);
        let (path, block) = doc.above_block(&Point::new(vec![1, 0, 0], 0)).unwrap();
        assert_eq!(path, vec![1, 0]);
        assert_eq!(doc.find_path(block.id), Some(vec![1, 0]));
        assert_eq!(doc.block(block.id).unwrap().text(), "b");
    }

    #[test]
    fn previous_boundary_word_deletes_single_punctuation() {
        assert_eq!(previous_boundary("a.b,", 4, DeleteUnit::Word), 3);
        assert_eq!(previous_boundary("foo bar", 7, DeleteUnit::Word), 4);
        assert_eq!(previous_boundary("x\n", 2, DeleteUnit::Line), 1);
    }
}
