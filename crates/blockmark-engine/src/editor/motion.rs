//! Cursor motion over the text blocks of a document.

use crate::document::{BlockId, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

/// Byte offset of the start of the line holding `offset`.
pub(crate) fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

pub(crate) fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

fn column(text: &str, offset: usize) -> usize {
    text[line_start(text, offset)..offset].chars().count()
}

/// Offset `column` chars into the line starting at `start`, clamped to the
/// line end.
fn at_column(text: &str, start: usize, column: usize) -> usize {
    let end = line_end(text, start);
    text[start..end]
        .char_indices()
        .nth(column)
        .map_or(end, |(i, _)| start + i)
}

/// Where the cursor at `offset` in block `from` lands after `motion`.
pub(crate) fn target(
    doc: &Document,
    from: BlockId,
    offset: usize,
    motion: Motion,
) -> Option<(BlockId, usize)> {
    let blocks: Vec<(BlockId, String)> = doc
        .text_blocks()
        .into_iter()
        .map(|(_, block)| (block.id, block.text()))
        .collect();
    let index = blocks.iter().position(|(id, _)| *id == from)?;
    let text = &blocks[index].1;
    let previous = index.checked_sub(1).and_then(|i| blocks.get(i));
    let next = blocks.get(index + 1);

    let landed = match motion {
        Motion::Left if offset > 0 => {
            let start = text[..offset].char_indices().next_back().map_or(0, |(i, _)| i);
            (from, start)
        }
        Motion::Left => previous.map_or((from, 0), |(id, text)| (*id, text.len())),
        Motion::Right if offset < text.len() => {
            let step = text[offset..].chars().next().map_or(0, char::len_utf8);
            (from, offset + step)
        }
        Motion::Right => next.map_or((from, offset), |(id, _)| (*id, 0)),
        Motion::LineStart => (from, line_start(text, offset)),
        Motion::LineEnd => (from, line_end(text, offset)),
        Motion::Up => {
            let start = line_start(text, offset);
            let col = column(text, offset);
            if start > 0 {
                (from, at_column(text, line_start(text, start - 1), col))
            } else if let Some((id, text)) = previous {
                (*id, at_column(text, line_start(text, text.len()), col))
            } else {
                (from, 0)
            }
        }
        Motion::Down => {
            let end = line_end(text, offset);
            let col = column(text, offset);
            if end < text.len() {
                (from, at_column(text, end + 1, col))
            } else if let Some((id, text)) = next {
                (*id, at_column(text, 0, col))
            } else {
                (from, text.len())
            }
        }
    };
    Some(landed)
}
