//! Turns a document and its decorations into terminal lines.

use std::ops::Range;

use blockmark_engine::DecorationTable;
use blockmark_engine::decorations::segments;
use blockmark_engine::document::{Block, BlockId, BlockKind, Document, Mark, Path, Point};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme;

/// Where the caret and selection fall inside one block, in block offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub cursor: Option<usize>,
    pub selected: Option<Range<usize>>,
}

pub struct Rendered {
    pub lines: Vec<Line<'static>>,
    /// Index into `lines` of the line holding the caret.
    pub cursor_line: usize,
}

/// Renders every block of `doc` in document order.
pub fn document_lines(doc: &Document, table: &DecorationTable) -> Rendered {
    let overlays = Overlays::new(doc);
    let mut lines = Vec::new();
    let mut cursor_line = 0;

    for (path, block) in doc.walk() {
        if block.kind.is_list() || !block.is_text_block() {
            continue;
        }
        let (lead, marker) = prefix(doc, &path, block);

        if let BlockKind::Image { url } = &block.kind {
            lines.push(Line::from(vec![
                Span::raw(lead),
                Span::styled(format!("[image] {url}"), Style::default().fg(Color::Cyan)),
            ]));
            continue;
        }

        if let Some(language) = block.kind.language() {
            lines.push(Line::from(vec![
                Span::raw(lead.clone()),
                Span::styled(
                    format!("``` {language}"),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        let text = block.text();
        let overlay = overlays.for_block(block.id, text.len());
        if let Some(cursor) = overlay.cursor {
            cursor_line = lines.len() + text[..cursor].matches('\n').count();
        }

        let runs = if block.kind.is_code_block() {
            segments(&text, table.get(block.id))
                .into_iter()
                .map(|segment| (segment.start..segment.end, theme::style_for(&segment.tags)))
                .collect()
        } else {
            mark_runs(block)
        };

        let continuation = match block.kind {
            BlockKind::Quote | BlockKind::CodeBlock { .. } => format!("{lead}{marker}"),
            _ => format!("{lead}{}", " ".repeat(marker.chars().count())),
        };
        let marker_style = match block.kind {
            BlockKind::Heading { .. } => Style::default().add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::DarkGray),
        };
        for (index, spans) in styled_lines(&text, &runs, &overlay).into_iter().enumerate() {
            let head = if index == 0 {
                vec![Span::raw(lead.clone()), Span::styled(marker.clone(), marker_style)]
            } else {
                vec![Span::styled(continuation.clone(), marker_style)]
            };
            let mut line = Line::from([head, spans].concat());
            if matches!(block.kind, BlockKind::Heading { .. }) {
                line = line.style(Style::default().add_modifier(Modifier::BOLD));
            }
            lines.push(line);
        }
    }

    Rendered { lines, cursor_line }
}

/// Splits `text` into lines of styled spans. `runs` must cover the text in
/// order; the caret is drawn reversed and the selection on a grey background.
pub fn styled_lines(
    text: &str,
    runs: &[(Range<usize>, Style)],
    overlay: &Overlay,
) -> Vec<Vec<Span<'static>>> {
    let caret = Style::default().add_modifier(Modifier::REVERSED);
    let mut lines: Vec<Vec<Span<'static>>> = vec![Vec::new()];

    for (run, style) in runs {
        let mut cuts = vec![run.start, run.end];
        cuts.extend(
            text[run.clone()]
                .match_indices('\n')
                .flat_map(|(at, _)| [run.start + at, run.start + at + 1]),
        );
        if let Some(cursor) = overlay.cursor {
            let width = text[cursor..].chars().next().map_or(0, char::len_utf8);
            cuts.extend([cursor, cursor + width]);
        }
        if let Some(selected) = &overlay.selected {
            cuts.extend([selected.start, selected.end]);
        }
        cuts.retain(|at| (run.start..=run.end).contains(at));
        cuts.sort_unstable();
        cuts.dedup();

        for pair in cuts.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let piece = &text[from..to];
            if piece == "\n" {
                if overlay.cursor == Some(from)
                    && let Some(line) = lines.last_mut()
                {
                    line.push(Span::styled(" ", caret));
                }
                lines.push(Vec::new());
                continue;
            }
            let mut piece_style = *style;
            if overlay
                .selected
                .as_ref()
                .is_some_and(|selected| selected.contains(&from))
            {
                piece_style = piece_style.bg(Color::DarkGray);
            }
            if overlay.cursor == Some(from) {
                piece_style = piece_style.patch(caret);
            }
            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(piece.to_string(), piece_style));
            }
        }
    }

    if overlay.cursor == Some(text.len())
        && let Some(line) = lines.last_mut()
    {
        line.push(Span::styled(" ", caret));
    }
    lines
}

/// One run per leaf, styled by its marks.
fn mark_runs(block: &Block) -> Vec<(Range<usize>, Style)> {
    let mut start = 0;
    block
        .leaves()
        .map(|leaf| {
            let end = start + leaf.text.len();
            let style = leaf.marks.iter().fold(Style::default(), |style, mark| match mark {
                Mark::Bold => style.add_modifier(Modifier::BOLD),
                Mark::Italic => style.add_modifier(Modifier::ITALIC),
                Mark::InlineCode => style.fg(Color::Yellow),
                Mark::Link(_) => style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            });
            let run = (start..end, style);
            start = end;
            run
        })
        .collect()
}

/// Indentation contributed by ancestors, and the block's own marker.
fn prefix(doc: &Document, path: &Path, block: &Block) -> (String, String) {
    let mut lead = String::new();
    for depth in 1..path.len() {
        match doc.block_at(&path[..depth]).map(|ancestor| &ancestor.kind) {
            Some(BlockKind::Quote) => lead.push_str("│ "),
            Some(BlockKind::BulletList | BlockKind::NumberedList) if depth > 1 => {
                lead.push_str("  ")
            }
            _ => {}
        }
    }

    let marker = match &block.kind {
        BlockKind::Heading { level } => format!("{} ", "#".repeat(usize::from(*level))),
        BlockKind::Quote => "│ ".to_string(),
        BlockKind::ListItem => {
            let (index, parent) = path.split_last().map_or((0, &[][..]), |(i, p)| (*i, p));
            match doc.block_at(parent).map(|list| &list.kind) {
                Some(BlockKind::NumberedList) => format!("{}. ", index + 1),
                _ => "• ".to_string(),
            }
        }
        BlockKind::CodeBlock { .. } => "  ".to_string(),
        _ => String::new(),
    };
    (lead, marker)
}

/// The selection resolved against block ids and document order.
struct Overlays {
    order: Vec<BlockId>,
    focus: Option<(BlockId, usize)>,
    start: Option<(BlockId, usize)>,
    end: Option<(BlockId, usize)>,
}

impl Overlays {
    fn new(doc: &Document) -> Self {
        let order = doc.walk().into_iter().map(|(_, block)| block.id).collect();
        let resolve = |point: &Point| doc.block_point(point).ok();
        let selection = doc.selection();
        let expanded = selection.filter(|selection| !selection.is_collapsed());
        Self {
            order,
            focus: selection.and_then(|selection| resolve(&selection.focus)),
            start: expanded.and_then(|selection| resolve(selection.start())),
            end: expanded.and_then(|selection| resolve(selection.end())),
        }
    }

    fn position(&self, id: BlockId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    fn for_block(&self, id: BlockId, len: usize) -> Overlay {
        let cursor = self
            .focus
            .filter(|(block, _)| *block == id)
            .map(|(_, offset)| offset.min(len));
        let selected = match (self.start, self.end, self.position(id)) {
            (Some((first, from)), Some((last, to)), Some(here)) => {
                let (first, last) = (self.position(first), self.position(last));
                match (first, last) {
                    (Some(first), Some(last)) if (first..=last).contains(&here) => {
                        let from = if here == first { from } else { 0 };
                        let to = if here == last { to } else { len };
                        Some(from..to.min(len))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        Overlay { cursor, selected }
    }
}
