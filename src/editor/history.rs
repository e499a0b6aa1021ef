//! Snapshot-based undo/redo.
//!
//! Every mutating editor operation records the full document *before* it changes
//! anything. Undo swaps the current document with the newest snapshot, redo swaps back.
//! Recording a new snapshot forks the timeline and clears the redo stack.

use crate::project::document::ProjectDocument;

/// One restorable document state and the edit that produced the state after it.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub label: String,
    pub snapshot: ProjectDocument,
}

/// Bounded undo/redo stacks of full-document snapshots.
#[derive(Clone, Debug)]
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl EditHistory {
    /// History keeping at most `max_depth` undo entries (at least one).
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record `snapshot` as the state before the edit named `label`.
    pub fn record(&mut self, label: &str, snapshot: ProjectDocument) {
        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            label: label.to_string(),
            snapshot,
        });
        if self.undo_stack.len() > self.max_depth {
            let overflow = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..overflow);
        }
        tracing::debug!(label, undo_depth = self.undo_stack.len(), "history entry recorded");
    }

    /// Step back: `current` moves onto the redo stack and the previous snapshot is returned.
    pub fn undo(&mut self, current: ProjectDocument) -> Option<ProjectDocument> {
        let entry = self.undo_stack.pop()?;
        tracing::debug!(label = %entry.label, undo_remaining = self.undo_stack.len(), "undo");
        self.redo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: ProjectDocument) -> Option<ProjectDocument> {
        let entry = self.redo_stack.pop()?;
        tracing::debug!(label = %entry.label, redo_remaining = self.redo_stack.len(), "redo");
        self.undo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the edit the next undo reverts.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/history.rs"]
mod tests;
