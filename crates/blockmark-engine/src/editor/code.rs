//! Tab handling inside code blocks.

use super::motion::line_start;
use crate::document::{BlockId, Cmd, Document, Point, Range};
use crate::error::DocumentError;

fn point(doc: &Document, id: BlockId, offset: usize) -> Result<Point, DocumentError> {
    doc.point_in_block(id, offset)
        .ok_or_else(|| DocumentError::InvalidOffset {
            path: doc.find_path(id).unwrap_or_default(),
            offset,
        })
}

/// Bytes of leading indentation `outdent` would remove from `line`.
fn outdent_len(line: &str, unit: &str) -> usize {
    if !unit.is_empty() && line.starts_with(unit) {
        unit.len()
    } else if line.starts_with('\t') {
        1
    } else {
        0
    }
}

/// Tab (and Shift+Tab when `outdent`) in a code block.
///
/// A collapsed selection inserts one indent unit, or removes one from the
/// start of the current line. An expanded selection within one block
/// re-indents every line it touches and selects the rewritten lines.
pub(super) fn tab(doc: &mut Document, unit: &str, outdent: bool) -> Result<(), DocumentError> {
    let Some(selection) = doc.selection().cloned() else {
        return Ok(());
    };

    if selection.is_collapsed() {
        if !outdent {
            doc.apply(Cmd::InsertText { text: unit.into() })?;
            return Ok(());
        }
        let (id, offset) = doc.block_point(&selection.anchor)?;
        let text = doc.block(id).map(|block| block.text()).unwrap_or_default();
        let start = line_start(&text, offset);
        let removed = outdent_len(&text[start..], unit);
        if removed == 0 {
            return Ok(());
        }
        let range = Range::new(point(doc, id, start)?, point(doc, id, start + removed)?);
        doc.apply(Cmd::DeleteRange { range })?;
        let caret = point(doc, id, offset.saturating_sub(removed).max(start))?;
        doc.apply(Cmd::Select {
            range: Range::collapsed(caret),
        })?;
        return Ok(());
    }

    let (start_id, from) = doc.block_point(selection.start())?;
    let (end_id, to) = doc.block_point(selection.end())?;
    if start_id != end_id {
        log::debug!("Tab over a selection spanning blocks ignored");
        return Ok(());
    }
    let text = doc.block(start_id).map(|block| block.text()).unwrap_or_default();
    let first_line = line_start(&text, from);
    let rewritten = text[first_line..to]
        .split('\n')
        .map(|line| {
            if outdent {
                line[outdent_len(line, unit)..].to_string()
            } else {
                format!("{unit}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let range = Range::new(point(doc, start_id, first_line)?, point(doc, start_id, to)?);
    doc.apply(Cmd::DeleteRange { range })?;
    doc.apply(Cmd::InsertText {
        text: rewritten.clone(),
    })?;

    let start = point(doc, start_id, first_line)?;
    let end = point(doc, start_id, first_line + rewritten.len())?;
    let range = if selection.is_backward() {
        Range::new(end, start)
    } else {
        Range::new(start, end)
    };
    doc.apply(Cmd::Select { range })?;
    Ok(())
}
