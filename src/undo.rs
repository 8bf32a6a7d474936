use crate::domain::AppState;
use std::collections::VecDeque;

/// Maximum number of snapshots kept for undo
pub const UNDO_STACK_LIMIT: usize = 20;

/// Bounded stack of whole-state snapshots; the oldest is dropped once full
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    snapshots: VecDeque<AppState>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot taken before a mutation
    pub fn push(&mut self, snapshot: AppState) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > UNDO_STACK_LIMIT {
            self.snapshots.pop_front();
        }
    }

    /// Take the most recent snapshot
    pub fn pop(&mut self) -> Option<AppState> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
