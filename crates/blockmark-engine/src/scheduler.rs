//! Deferred work.
//!
//! Handlers that need something to happen after the current edit has been
//! observed push a [`Deferred`] task instead of doing it inline. The editor
//! drains the queue on [`Editor::tick`](crate::Editor::tick).

use std::collections::VecDeque;

use crate::document::Selection;

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Re-run the decoration engine over every code block.
    RecomputeDecorations,
    /// Look for a code fence in the block holding the cursor.
    CheckCodeFence,
    /// Put the selection back where a handler left it.
    RestoreSelection(Selection),
}

/// FIFO queue of deferred tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Deferred>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Deferred) {
        self.tasks.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes and returns everything queued so far. Tasks pushed while the
    /// caller works through the batch wait for the next call.
    pub fn take_pending(&mut self) -> Vec<Deferred> {
        self.tasks.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deferred> {
        self.tasks.iter()
    }
}
