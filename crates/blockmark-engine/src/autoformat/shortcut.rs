use crate::document::BlockKind;

/// A line prefix that retypes its block when followed by a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `#`
    Heading1,
    /// `##`
    Heading2,
    /// `>`
    Quote,
    /// `-`, `*` or `+`
    Bullet,
    /// `1.`
    Numbered,
}

impl Trigger {
    /// Matches the whole text between block start and cursor. Anything else,
    /// including a code fence, is not a trigger.
    pub fn parse(before: &str) -> Option<Self> {
        match before {
            "#" => Some(Trigger::Heading1),
            "##" => Some(Trigger::Heading2),
            ">" => Some(Trigger::Quote),
            "-" | "*" | "+" => Some(Trigger::Bullet),
            "1." => Some(Trigger::Numbered),
            _ => None,
        }
    }

    /// Kind the block itself takes.
    pub fn block_kind(self) -> BlockKind {
        match self {
            Trigger::Heading1 => BlockKind::heading(1),
            Trigger::Heading2 => BlockKind::heading(2),
            Trigger::Quote => BlockKind::Quote,
            Trigger::Bullet | Trigger::Numbered => BlockKind::ListItem,
        }
    }

    /// Container the block is wrapped in, for list triggers.
    pub fn wrapper(self) -> Option<BlockKind> {
        match self {
            Trigger::Bullet => Some(BlockKind::BulletList),
            Trigger::Numbered => Some(BlockKind::NumberedList),
            _ => None,
        }
    }
}
