use super::node::{Block, BlockKind};
use super::point::{Path, Range};

/// How much text a backward deletion removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteUnit {
    #[default]
    Character,
    Word,
    Line,
}

/// An edit to a [`Document`](super::Document).
///
/// Text commands act at the current selection; structural commands take the
/// path of the block they operate on. Every command either commits fully or
/// fails with a [`DocumentError`](crate::DocumentError) and leaves the
/// document untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Replace the selection with `text`.
    InsertText { text: String },
    /// Delete backward from a collapsed selection, merging into the previous
    /// block at a block start. An expanded selection is deleted instead.
    DeleteBackward { unit: DeleteUnit },
    /// Delete everything between two points, joining the blocks at either end.
    DeleteRange { range: Range },
    /// Split the block at the selection; the cursor moves into the new block.
    SplitBlock,
    /// Retype the block at `at`.
    SetKind { at: Path, kind: BlockKind },
    /// Wrap the block at `at` in a new container of `kind`.
    WrapNodes { at: Path, kind: BlockKind },
    /// Replace the container at `at` with its children.
    UnwrapNodes { at: Path },
    /// Move the block at `at` out of its parent, splitting the parent around it.
    LiftBlock { at: Path },
    /// Insert `block` so that it ends up at `at`.
    InsertBlock { at: Path, block: Block },
    RemoveBlock { at: Path },
    Select { range: Range },
}

impl Cmd {
    /// Whether the command can change document content.
    pub fn edits_content(&self) -> bool {
        !matches!(self, Cmd::Select { .. })
    }
}
