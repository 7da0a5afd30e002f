//! Code fence detection.
//!
//! Two shapes turn a block into a code block:
//!
//! - a bare opener, the whole block being ```` ```lang ````
//! - a complete fence, opener, body and closing ```` ``` ```` on their own lines
//!
//! Nested fences are not recognized; the body ends at the first closing fence
//! that also ends the text.

use std::sync::OnceLock;

use regex::Regex;

use crate::document::{BlockKind, Cmd, Document, Range};
use crate::error::DocumentError;
use crate::scheduler::{Deferred, TaskQueue};

pub const BACKTICKS: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fence {
    Open { language: String },
    Complete { language: String, body: String },
}

fn opener() -> &'static Regex {
    static OPENER: OnceLock<Regex> = OnceLock::new();
    OPENER.get_or_init(|| Regex::new(r"^```(\w*)$").expect("Invalid fence opener regex"))
}

fn complete() -> &'static Regex {
    static COMPLETE: OnceLock<Regex> = OnceLock::new();
    COMPLETE.get_or_init(|| {
        Regex::new(r"^```(\w*)\s*\n([\s\S]*?)\n```\s*$").expect("Invalid complete fence regex")
    })
}

/// True when `text` is exactly a fence opener.
pub fn is_opener(text: &str) -> bool {
    opener().is_match(text)
}

pub fn detect(text: &str) -> Option<Fence> {
    if let Some(caps) = opener().captures(text) {
        return Some(Fence::Open {
            language: caps[1].to_string(),
        });
    }
    let caps = complete().captures(text)?;
    Some(Fence::Complete {
        language: caps[1].to_string(),
        body: caps[2].to_string(),
    })
}

/// Converts the block holding the cursor into a code block when its text is
/// a fence. Returns whether it did.
pub fn check_code_block_fence(
    doc: &mut Document,
    tasks: &mut TaskQueue,
) -> Result<bool, DocumentError> {
    let Some((path, block)) = doc.current_block() else {
        return Ok(false);
    };
    if block.kind.is_code_block() || block.kind.is_void() {
        return Ok(false);
    }
    let Some(fence) = detect(&block.text()) else {
        return Ok(false);
    };

    let whole = Range::new(doc.start_of(&path)?, doc.end_of(&path)?);
    doc.apply(Cmd::DeleteRange { range: whole })?;
    let language = match fence {
        Fence::Open { language } => language,
        Fence::Complete { language, body } => {
            doc.apply(Cmd::InsertText { text: body })?;
            language
        }
    };
    let kind = BlockKind::code_block(language);
    log::debug!("Code fence at {path:?} becomes {kind:?}");
    doc.apply(Cmd::SetKind { at: path, kind })?;
    tasks.push(Deferred::RecomputeDecorations);
    Ok(true)
}
