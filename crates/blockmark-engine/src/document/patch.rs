use super::node::BlockId;
use super::point::Selection;

/// What kind of change a command made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Text or structure changed.
    Content,
    /// Only the selection moved.
    Selection,
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub origin: ChangeOrigin,
    /// Blocks whose text or kind changed, in no particular order.
    pub changed: Vec<BlockId>,
    pub new_selection: Option<Selection>,
    pub version: u64,
}

impl Patch {
    pub fn is_selection_only(&self) -> bool {
        self.origin == ChangeOrigin::Selection
    }
}
