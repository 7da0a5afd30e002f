//! # Markdown Autoformat
//!
//! Wraps the document's text insertion and backward deletion so that typing
//! markdown line prefixes retypes the block instead of inserting text.
//!
//! ## Insertion
//!
//! | Current block | Input | Result |
//! |---------------|-------|--------|
//! | code block | anything | raw insert, decorations recomputed later |
//! | other | space after exactly `#` `##` `>` `-` `*` `+` `1.` | prefix removed, block retyped |
//! | other | anything else | raw insert |
//!
//! List triggers retype the block as a list item and wrap it in a list. Code
//! fences are never triggered by a space; they belong to Enter (see [`fence`]).
//!
//! ## Backward deletion
//!
//! With a collapsed selection, deletion at the start of a non-paragraph block
//! turns it back into a paragraph (lifting list items out of their list)
//! instead of merging it into the previous block. Code blocks also revert
//! when they hold nothing but whitespace.
//!
//! There is no state beyond the document itself: every decision is made from
//! the block kind, the cursor position and the typed text.

pub mod fence;
mod shortcut;

pub use fence::{Fence, check_code_block_fence};
pub use shortcut::Trigger;

use crate::document::{BlockKind, Cmd, DeleteUnit, Document, Range};
use crate::error::DocumentError;
use crate::scheduler::{Deferred, TaskQueue};

/// What a handler did with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Passed to the document unchanged.
    Forwarded,
    /// Raw insertion into a code block.
    CodeInsert,
    /// A line prefix retyped the block.
    Shortcut(Trigger),
    /// A block reverted to a paragraph.
    Reverted { from: BlockKind },
    /// A list item left its list and became a paragraph.
    LiftedListItem,
}

pub fn on_insert_text(
    doc: &mut Document,
    tasks: &mut TaskQueue,
    text: &str,
) -> Result<Transition, DocumentError> {
    let Some((path, block)) = doc.current_block() else {
        return forward_insert(doc, text);
    };

    if block.kind.is_code_block() {
        doc.apply(Cmd::InsertText { text: text.into() })?;
        tasks.push(Deferred::RecomputeDecorations);
        if let Some(selection) = doc.selection() {
            tasks.push(Deferred::RestoreSelection(selection.clone()));
        }
        return Ok(Transition::CodeInsert);
    }

    let Some(selection) = doc.selection().filter(|s| s.is_collapsed()).cloned() else {
        return forward_insert(doc, text);
    };
    if text != " " {
        return forward_insert(doc, text);
    }

    let prefix = Range::new(doc.start_of(&path)?, selection.anchor);
    let Some(trigger) = Trigger::parse(&doc.string_in_range(&prefix)) else {
        return forward_insert(doc, text);
    };

    log::debug!("Autoformat {trigger:?} at {path:?}");
    doc.apply(Cmd::DeleteRange { range: prefix })?;
    doc.apply(Cmd::SetKind {
        at: path.clone(),
        kind: trigger.block_kind(),
    })?;
    if let Some(list) = trigger.wrapper() {
        doc.apply(Cmd::WrapNodes { at: path, kind: list })?;
    }
    Ok(Transition::Shortcut(trigger))
}

pub fn on_delete_backward(
    doc: &mut Document,
    unit: DeleteUnit,
) -> Result<Transition, DocumentError> {
    let Some(selection) = doc.selection().filter(|s| s.is_collapsed()).cloned() else {
        return forward_delete(doc, unit);
    };
    let Some((path, block)) = doc.current_block() else {
        return forward_delete(doc, unit);
    };
    let kind = block.kind.clone();
    let id = block.id;
    let blank = block.text().trim().is_empty();
    let (_, offset) = doc.block_point(&selection.anchor)?;
    let at_start = offset == 0;

    let revert = match &kind {
        BlockKind::CodeBlock { .. } => at_start || blank,
        BlockKind::ListItem if at_start => {
            let in_list = path.len() >= 2
                && doc
                    .block_at(&path[..path.len() - 1])
                    .is_some_and(|parent| parent.kind.is_list());
            if in_list {
                doc.apply(Cmd::LiftBlock { at: path })?;
            }
            let lifted = doc
                .find_path(id)
                .ok_or(DocumentError::InvalidPath(Vec::new()))?;
            doc.apply(Cmd::SetKind {
                at: lifted,
                kind: BlockKind::Paragraph,
            })?;
            log::debug!("Lifted list item {id} out of its list");
            return Ok(Transition::LiftedListItem);
        }
        BlockKind::Paragraph => false,
        _ => at_start,
    };
    if !revert {
        return forward_delete(doc, unit);
    }

    log::debug!("Backspace reverts {kind:?} at {path:?} to paragraph");
    doc.apply(Cmd::SetKind {
        at: path,
        kind: BlockKind::Paragraph,
    })?;
    Ok(Transition::Reverted { from: kind })
}

fn forward_insert(doc: &mut Document, text: &str) -> Result<Transition, DocumentError> {
    doc.apply(Cmd::InsertText { text: text.into() })?;
    Ok(Transition::Forwarded)
}

fn forward_delete(doc: &mut Document, unit: DeleteUnit) -> Result<Transition, DocumentError> {
    doc.apply(Cmd::DeleteBackward { unit })?;
    Ok(Transition::Forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Point};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn typed(doc: &mut Document, tasks: &mut TaskQueue, text: &str) {
        for c in text.chars() {
            on_insert_text(doc, tasks, &c.to_string()).unwrap();
        }
    }

    fn caret(doc: &mut Document, path: Vec<usize>, offset: usize) {
        doc.apply(Cmd::Select {
            range: Range::collapsed(Point::new(path, offset)),
        })
        .unwrap();
    }

    #[rstest]
    #[case("#", BlockKind::heading(1), None)]
    #[case("##", BlockKind::heading(2), None)]
    #[case(">", BlockKind::Quote, None)]
    #[case("-", BlockKind::ListItem, Some(BlockKind::BulletList))]
    #[case("*", BlockKind::ListItem, Some(BlockKind::BulletList))]
    #[case("+", BlockKind::ListItem, Some(BlockKind::BulletList))]
    #[case("1.", BlockKind::ListItem, Some(BlockKind::NumberedList))]
    fn space_after_prefix_retypes_block(
        #[case] prefix: &str,
        #[case] kind: BlockKind,
        #[case] list: Option<BlockKind>,
    ) {
        let mut doc = Document::default();
        let mut tasks = TaskQueue::new();
        typed(&mut doc, &mut tasks, prefix);
        typed(&mut doc, &mut tasks, " ");

        let (path, block) = doc.current_block().unwrap();
        assert_eq!(block.kind, kind);
        assert_eq!(block.text(), "");
        match list {
            Some(list) => {
                assert_eq!(path, vec![0, 0]);
                assert_eq!(doc.block_at(&[0]).unwrap().kind, list);
            }
            None => assert_eq!(path, vec![0]),
        }
    }

    #[rstest]
    #[case("###")]
    #[case("```")]
    #[case("a#")]
    fn non_trigger_prefix_inserts_the_space(#[case] prefix: &str) {
        let mut doc = Document::default();
        let mut tasks = TaskQueue::new();
        typed(&mut doc, &mut tasks, prefix);
        typed(&mut doc, &mut tasks, " ");

        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.text(), format!("{prefix} "));
    }

    #[test]
    fn trigger_only_counts_text_before_the_cursor() {
        let mut doc = Document::new(vec![Block::paragraph("#title")]);
        let mut tasks = TaskQueue::new();
        caret(&mut doc, vec![0, 0], 1);
        typed(&mut doc, &mut tasks, " ");

        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::heading(1));
        assert_eq!(block.text(), "title");
    }

    #[test]
    fn code_block_insert_is_raw_and_schedules_work() {
        let mut doc = Document::new(vec![Block::code("python", "")]);
        let mut tasks = TaskQueue::new();
        typed(&mut doc, &mut tasks, "# ");

        assert_eq!(doc.block_at(&[0]).unwrap().text(), "# ");
        let pending = tasks.take_pending();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[2], Deferred::RecomputeDecorations);
        assert_eq!(
            pending[3],
            Deferred::RestoreSelection(Range::collapsed(Point::new(vec![0, 0], 2)))
        );
    }

    #[test]
    fn heading_backspace_at_start_reverts() {
        let mut doc = Document::new(vec![Block::text_block(BlockKind::heading(1), "Title")]);
        let transition = on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        assert_eq!(
            transition,
            Transition::Reverted {
                from: BlockKind::heading(1)
            }
        );
        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.text(), "Title");
    }

    #[test]
    fn heading_backspace_mid_text_deletes() {
        let mut doc = Document::new(vec![Block::text_block(BlockKind::heading(2), "Title")]);
        caret(&mut doc, vec![0, 0], 5);
        on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::heading(2));
        assert_eq!(block.text(), "Titl");
    }

    #[rstest]
    #[case("", 0)]
    #[case("  \n ", 3)]
    #[case("x = 1", 0)]
    fn code_block_reverts_when_blank_or_at_start(#[case] text: &str, #[case] offset: usize) {
        let mut doc = Document::new(vec![Block::code("js", text)]);
        caret(&mut doc, vec![0, 0], offset);
        on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.text(), text);
    }

    #[test]
    fn code_block_backspace_inside_text_deletes_a_char() {
        let mut doc = Document::new(vec![Block::code("js", "a\nb")]);
        caret(&mut doc, vec![0, 0], 2);
        on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        let block = doc.block_at(&[0]).unwrap();
        assert!(block.kind.is_code_block());
        assert_eq!(block.text(), "ab");
    }

    #[test]
    fn list_item_backspace_lifts_out_of_list() {
        let mut doc = Document::new(vec![Block::container(
            BlockKind::BulletList,
            vec![
                Block::text_block(BlockKind::ListItem, "a"),
                Block::text_block(BlockKind::ListItem, "b"),
            ],
        )]);
        caret(&mut doc, vec![0, 1, 0], 0);

        let transition = on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        assert_eq!(transition, Transition::LiftedListItem);
        let kinds: Vec<_> = doc.blocks().map(|block| block.kind.clone()).collect();
        assert_eq!(kinds, vec![BlockKind::BulletList, BlockKind::Paragraph]);
        assert_eq!(doc.block_at(&[1]).unwrap().text(), "b");
        assert_eq!(
            doc.selection(),
            Some(&Range::collapsed(Point::new(vec![1, 0], 0)))
        );
    }

    #[test]
    fn last_list_item_backspace_removes_list() {
        let mut doc = Document::default();
        let mut tasks = TaskQueue::new();
        typed(&mut doc, &mut tasks, "- ");
        on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        assert_eq!(doc.blocks().count(), 1);
        assert_eq!(doc.block_at(&[0]).unwrap().kind, BlockKind::Paragraph);
    }

    #[test]
    fn expanded_selection_is_forwarded() {
        let mut doc = Document::new(vec![Block::text_block(BlockKind::Quote, "quote")]);
        doc.apply(Cmd::Select {
            range: Range::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 2)),
        })
        .unwrap();
        let transition = on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();

        assert_eq!(transition, Transition::Forwarded);
        let block = doc.block_at(&[0]).unwrap();
        assert_eq!(block.kind, BlockKind::Quote);
        assert_eq!(block.text(), "ote");
    }

    #[test]
    fn paragraph_backspace_at_start_merges() {
        let mut doc = Document::new(vec![Block::paragraph("a"), Block::paragraph("b")]);
        caret(&mut doc, vec![1, 0], 0);
        on_delete_backward(&mut doc, DeleteUnit::Character).unwrap();
        assert_eq!(doc.block_at(&[0]).unwrap().text(), "ab");
    }
}
