use std::collections::BTreeMap;

use core_document::Document;
use core_field::{CellKey, Piece};
use tracing::trace;

use crate::edit::HistoryEntry;

/// Default number of entries retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// Cells touched by an in-progress paint gesture. Nothing here reaches the
/// document until the gesture commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gesture {
    pub page: usize,
    /// Value chosen by the first brush stroke; later brush strokes reuse it.
    pub fill: Option<Piece>,
    pub strokes: BTreeMap<CellKey, Piece>,
}

impl Gesture {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            fill: None,
            strokes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Recording(Gesture),
}

pub struct UndoEngine {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    gesture: GestureState,
    max_depth: usize,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::with_depth(UNDO_HISTORY_MAX)
    }

    /// Engine keeping at most `max_depth` entries (at least one).
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            gesture: GestureState::Idle,
            max_depth: max_depth.max(1),
        }
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
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    /// Push an entry whose edit has already been applied.
    pub fn record(&mut self, entry: HistoryEntry) {
        trace!(target: "state.undo", kind = entry.edit.kind(), undo_depth = self.undo_stack.len() + 1, redo_depth = self.redo_stack.len(), "record");
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_depth {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", max = self.max_depth, "undo_stack_trimmed");
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Revert the newest entry and restore its `current_before`. Returns false
    /// when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document, current: &mut usize) -> bool {
        self.cancel_gesture();
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", kind = entry.edit.kind(), from_page = entry.edit.first_affected_page(), undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len() + 1, "undo_pop");
        entry.edit.revert(doc);
        *current = entry.current_before;
        self.redo_stack.push(entry);
        true
    }

    /// Re-apply the newest undone entry and restore its `current_after`.
    pub fn redo(&mut self, doc: &mut Document, current: &mut usize) -> bool {
        self.cancel_gesture();
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", kind = entry.edit.kind(), from_page = entry.edit.first_affected_page(), redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len() + 1, "redo_pop");
        entry.edit.apply(doc);
        *current = entry.current_after;
        self.undo_stack.push(entry);
        true
    }

    /// Start recording a gesture on `page`. A gesture already in progress is
    /// dropped.
    pub fn begin_gesture(&mut self, page: usize) {
        if matches!(self.gesture, GestureState::Recording(_)) {
            trace!(target: "state.undo", "gesture_replaced");
        }
        self.gesture = GestureState::Recording(Gesture::new(page));
        trace!(target: "state.undo", page, "gesture_begin");
    }

    pub fn gesture_mut(&mut self) -> Option<&mut Gesture> {
        match &mut self.gesture {
            GestureState::Recording(gesture) => Some(gesture),
            GestureState::Idle => None,
        }
    }

    /// Leave `Recording` and hand the buffered gesture to the caller.
    pub fn take_gesture(&mut self) -> Option<Gesture> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Recording(gesture) => {
                trace!(target: "state.undo", page = gesture.page, cells = gesture.strokes.len(), "gesture_end");
                Some(gesture)
            }
            GestureState::Idle => None,
        }
    }

    /// Drop any in-progress gesture without touching history.
    pub fn cancel_gesture(&mut self) {
        if let GestureState::Recording(gesture) = std::mem::take(&mut self.gesture) {
            trace!(target: "state.undo", page = gesture.page, cells = gesture.strokes.len(), "gesture_cancelled");
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture = GestureState::Idle;
    }
}
