//! # blockmark-engine
//!
//! Editing core for blockmark: a block document, markdown autoformat on
//! top of it, and syntax decorations for code blocks.
//!
//! ## Module Structure
//!
//! ```text
//! blockmark-engine/
//! ├── document/      # Block tree, commands, patches, JSON persistence
//! ├── autoformat/    # Line-prefix shortcuts, backspace reverts, code fences
//! ├── decorations/   # Token trees → per-block highlight ranges
//! ├── coordinator.rs # When to recompute decorations
//! ├── scheduler.rs   # Deferred task queue
//! ├── editor/        # Facade: key handling, tick, toggles, cursor motion
//! ├── keys.rs        # Toolkit-neutral key events
//! ├── export.rs      # Markdown export
//! └── io.rs          # Load, save and export files
//! ```
//!
//! Front ends build an [`Editor`] around a [`document::Document`] and a
//! [`blockmark_syntax::Tokenizer`], feed it [`KeyEvent`]s, call
//! [`Editor::tick`] once per frame, and read decorations back per block.

pub mod autoformat;
pub mod coordinator;
pub mod decorations;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod io;
pub mod keys;
pub mod scheduler;

pub use coordinator::UpdateCoordinator;
pub use decorations::{DecorationRange, DecorationTable, DecorationWarning, segments};
pub use editor::{Editor, EditorOptions, Motion};
pub use error::DocumentError;
pub use keys::{Key, KeyEvent, Modifiers};
pub use scheduler::{Deferred, TaskQueue};
