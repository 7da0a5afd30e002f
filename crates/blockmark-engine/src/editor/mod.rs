//! # Editor
//!
//! The facade a front end talks to. It owns the [`Document`], the
//! [`UpdateCoordinator`] and the deferred [`TaskQueue`], and routes input
//! through the autoformat layer.
//!
//! ## Input Flow
//!
//! ```text
//! KeyEvent ─► on_key_down ─┬─ code block overrides (Tab, Enter)
//!                          ├─ autoformat::on_insert_text / on_delete_backward
//!                          └─ insert_break ─► fence check or split + deferred fence check
//!                                    │
//!                          Document::apply ─► Patch
//!                                    │
//!                          UpdateCoordinator::on_document_changed
//! ```
//!
//! Every handler compares the document version before and after it runs and
//! reports the change to the coordinator exactly once, so code blocks are
//! re-decorated synchronously after each content edit. Work queued by a
//! handler runs on the next [`Editor::tick`].
//!
//! ```
//! use blockmark_engine::{Editor, EditorOptions, Key, KeyEvent};
//! use blockmark_engine::document::{BlockKind, Document};
//! use blockmark_syntax::GrammarRegistry;
//!
//! let registry = GrammarRegistry::with_builtin_languages().unwrap();
//! let mut editor = Editor::new(Document::default(), Box::new(registry), EditorOptions::default());
//!
//! for c in "```python".chars() {
//!     editor.on_key_down(KeyEvent::new(Key::Char(c)));
//! }
//! editor.on_key_down(KeyEvent::new(Key::Enter));
//! editor.insert_text("x = 1").unwrap();
//! editor.tick();
//!
//! let block = editor.document().block_at(&[0]).unwrap();
//! assert_eq!(block.kind, BlockKind::code_block("python"));
//! assert!(editor
//!     .decorations_for(block.id)
//!     .iter()
//!     .any(|range| range.has_tag("number") && (range.start, range.end) == (4, 5)));
//! ```

mod code;
mod motion;

pub use motion::Motion;

use std::rc::Rc;

use blockmark_syntax::Tokenizer;

use crate::autoformat::{self, Transition, fence};
use crate::coordinator::UpdateCoordinator;
use crate::decorations::{DecorationRange, DecorationTable, DecorationWarning};
use crate::document::{
    Block, BlockId, BlockKind, ChangeOrigin, Cmd, DeleteUnit, Document, Range, TEXT_LANGUAGE,
};
use crate::error::DocumentError;
use crate::keys::{Key, KeyEvent};
use crate::scheduler::{Deferred, TaskQueue};

/// Editor behaviour a front end can configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Spaces inserted by Tab in a code block.
    pub indent_width: usize,
    /// Grammar used for code blocks whose language is unknown.
    pub fallback_grammar: String,
    /// Languages the front end offers; unknown ones get an empty grammar.
    pub languages: Vec<String>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            fallback_grammar: TEXT_LANGUAGE.to_string(),
            languages: Vec::new(),
        }
    }
}

pub struct Editor {
    doc: Document,
    coordinator: UpdateCoordinator,
    tasks: TaskQueue,
    indent: String,
}

impl Editor {
    /// Mounts `doc`: registers fallback grammars and decorates any code
    /// blocks it already has.
    pub fn new(mut doc: Document, tokenizer: Box<dyn Tokenizer>, options: EditorOptions) -> Self {
        let mut coordinator =
            UpdateCoordinator::new(tokenizer, &options.fallback_grammar, options.languages);
        coordinator.refresh(&mut doc);
        Self {
            doc,
            coordinator,
            tasks: TaskQueue::new(),
            indent: " ".repeat(options.indent_width),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn decorations_for(&self, block: BlockId) -> &[DecorationRange] {
        self.coordinator.decorations_for(block)
    }

    /// The published decoration table.
    pub fn decorations(&self) -> Rc<DecorationTable> {
        self.coordinator.table()
    }

    pub fn warnings(&self) -> &[DecorationWarning] {
        self.coordinator.warnings()
    }

    pub fn pending_tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Runs `edit` and reports whatever it changed to the coordinator.
    fn observed<T>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Result<T, DocumentError>,
    ) -> Result<T, DocumentError> {
        let version = self.doc.version();
        let result = edit(self);
        let origin = if self.doc.version() == version {
            ChangeOrigin::Selection
        } else {
            ChangeOrigin::Content
        };
        self.coordinator.on_document_changed(&mut self.doc, origin);
        result
    }

    fn in_code_block(&self) -> bool {
        self.doc
            .current_block()
            .is_some_and(|(_, block)| block.kind.is_code_block())
    }

    /// Handles a key press. Returns false for keys the editor does not
    /// consume, leaving them to the front end.
    pub fn on_key_down(&mut self, event: KeyEvent) -> bool {
        let KeyEvent { key, modifiers } = event;
        if (modifiers.ctrl || modifiers.alt) && !matches!(key, Key::Backspace) {
            return false;
        }

        let result = match key {
            Key::Char(c) => self.insert_text(&c.to_string()).map(|_| ()),
            Key::Enter => self.insert_break(),
            Key::Tab if self.in_code_block() => {
                let unit = self.indent.clone();
                self.observed(|editor| code::tab(&mut editor.doc, &unit, modifiers.shift))
            }
            Key::Tab => return false,
            Key::Backspace => {
                let unit = if modifiers.ctrl || modifiers.alt {
                    DeleteUnit::Word
                } else {
                    DeleteUnit::Character
                };
                self.delete_backward(unit).map(|_| ())
            }
            Key::Left => self.move_cursor(Motion::Left, modifiers.shift),
            Key::Right => self.move_cursor(Motion::Right, modifiers.shift),
            Key::Up => self.move_cursor(Motion::Up, modifiers.shift),
            Key::Down => self.move_cursor(Motion::Down, modifiers.shift),
            Key::Home => self.move_cursor(Motion::LineStart, modifiers.shift),
            Key::End => self.move_cursor(Motion::LineEnd, modifiers.shift),
            Key::Escape => return false,
        };
        if let Err(err) = result {
            log::warn!("{key:?} not applied: {err}");
        }
        true
    }

    pub fn insert_text(&mut self, text: &str) -> Result<Transition, DocumentError> {
        self.observed(|editor| autoformat::on_insert_text(&mut editor.doc, &mut editor.tasks, text))
    }

    pub fn delete_backward(&mut self, unit: DeleteUnit) -> Result<Transition, DocumentError> {
        self.observed(|editor| autoformat::on_delete_backward(&mut editor.doc, unit))
    }

    /// Enter. Inside a code block this inserts a newline. On a line that is
    /// exactly a fence opener it converts the block straight away. Otherwise
    /// it splits the block and queues a fence check of the result.
    pub fn insert_break(&mut self) -> Result<(), DocumentError> {
        self.observed(|editor| {
            let Some((_, block)) = editor.doc.current_block() else {
                return Err(DocumentError::NoSelection);
            };
            if block.kind.is_code_block() {
                editor.doc.apply(Cmd::InsertText { text: "\n".into() })?;
                return Ok(());
            }
            if fence::is_opener(&block.text()) {
                fence::check_code_block_fence(&mut editor.doc, &mut editor.tasks)?;
                return Ok(());
            }
            editor.doc.apply(Cmd::SplitBlock)?;
            editor.tasks.push(Deferred::CheckCodeFence);
            Ok(())
        })
    }

    /// Runs the tasks queued before this call. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let batch = self.tasks.take_pending();
        let count = batch.len();
        for task in batch {
            match task {
                Deferred::RecomputeDecorations => {
                    self.coordinator.refresh_if_stale(&mut self.doc)
                }
                Deferred::CheckCodeFence => {
                    let result = self.observed(|editor| {
                        fence::check_code_block_fence(&mut editor.doc, &mut editor.tasks)
                    });
                    if let Err(err) = result {
                        log::debug!("Deferred fence check skipped: {err}");
                    }
                }
                Deferred::RestoreSelection(range) => {
                    if let Err(err) = self.doc.apply(Cmd::Select { range }) {
                        log::debug!("Could not restore selection: {err}");
                    }
                }
            }
        }
        count
    }

    pub fn select(&mut self, range: Range) -> Result<(), DocumentError> {
        self.observed(|editor| editor.doc.apply(Cmd::Select { range }).map(|_| ()))
    }

    /// Moves the focus of the selection. Without `extend` the selection
    /// collapses onto the new position.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> Result<(), DocumentError> {
        let Some(selection) = self.doc.selection().cloned() else {
            return Ok(());
        };
        let (id, offset) = self.doc.block_point(&selection.focus)?;
        let Some(point) = motion::target(&self.doc, id, offset, motion)
            .and_then(|(id, offset)| self.doc.point_in_block(id, offset))
        else {
            return Ok(());
        };
        let range = if extend {
            Range::new(selection.anchor, point)
        } else {
            Range::collapsed(point)
        };
        self.select(range)
    }

    /// Replaces the configured languages, registering fallback grammars for
    /// any the tokenizer lacks.
    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.coordinator.set_languages(languages);
        self.tasks.push(Deferred::RecomputeDecorations);
    }

    /// Toggles the block holding the cursor to or from `kind`.
    ///
    /// The block is first lifted out of any list. An active kind then
    /// reverts to paragraph; a list kind makes the block a list item wrapped
    /// in a new list of that kind.
    pub fn toggle_block(&mut self, kind: BlockKind) -> Result<(), DocumentError> {
        self.observed(|editor| {
            let doc = &mut editor.doc;
            let (path, block) = doc.current_block().ok_or(DocumentError::NoSelection)?;
            let id = block.id;
            let active = (1..=path.len()).any(|depth| {
                doc.block_at(&path[..depth])
                    .is_some_and(|ancestor| ancestor.kind.same_type(&kind))
            });
            let in_list = path.len() >= 2
                && doc
                    .block_at(&path[..path.len() - 1])
                    .is_some_and(|parent| parent.kind.is_list());

            if in_list {
                doc.apply(Cmd::LiftBlock { at: path })?;
            }
            let at = doc
                .find_path(id)
                .ok_or(DocumentError::InvalidPath(Vec::new()))?;
            let new_kind = if active {
                BlockKind::Paragraph
            } else if kind.is_list() {
                BlockKind::ListItem
            } else {
                kind.clone()
            };
            doc.apply(Cmd::SetKind {
                at: at.clone(),
                kind: new_kind,
            })?;
            if !active && kind.is_list() {
                doc.apply(Cmd::WrapNodes { at, kind })?;
            }
            Ok(())
        })
    }

    /// Inserts an image block after the block holding the cursor.
    pub fn insert_image(&mut self, url: &str) -> Result<(), DocumentError> {
        self.observed(|editor| {
            let doc = &mut editor.doc;
            let (mut at, _) = doc.current_block().ok_or(DocumentError::NoSelection)?;
            if let Some(last) = at.last_mut() {
                *last += 1;
            }
            let image = Block::text_block(BlockKind::Image { url: url.into() }, "");
            doc.apply(Cmd::InsertBlock { at, block: image })?;
            Ok(())
        })
    }

    /// Plain text of the selection, one line per block.
    pub fn selected_text(&self) -> String {
        let Some(selection) = self.doc.selection() else {
            return String::new();
        };
        let (start, end) = (selection.start(), selection.end());
        let mut parts = Vec::new();
        for (path, _) in self.doc.text_blocks() {
            let (Ok(first), Ok(last)) = (self.doc.start_of(&path), self.doc.end_of(&path)) else {
                continue;
            };
            if last < *start || first > *end {
                continue;
            }
            let from = if first < *start { start.clone() } else { first };
            let to = if last > *end { end.clone() } else { last };
            parts.push(self.doc.string_in_range(&Range::new(from, to)));
        }
        parts.join("\n")
    }
}
