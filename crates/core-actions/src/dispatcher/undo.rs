//! Undo / Redo handling.

use super::DispatchResult;
use core_state::EditorState;

pub(crate) fn handle_undo(state: &mut EditorState) -> DispatchResult {
    let before = state.page_count();
    if state.undo() {
        let after = state.page_count();
        tracing::trace!(target: "actions.dispatch", op = "undo", pages_changed = (before != after), "undo");
        if before != after {
            DispatchResult::pages_changed()
        } else {
            DispatchResult::dirty()
        }
    } else {
        DispatchResult::clean()
    }
}

pub(crate) fn handle_redo(state: &mut EditorState) -> DispatchResult {
    let before = state.page_count();
    if state.redo() {
        let after = state.page_count();
        tracing::trace!(target: "actions.dispatch", op = "redo", pages_changed = (before != after), "redo");
        if before != after {
            DispatchResult::pages_changed()
        } else {
            DispatchResult::dirty()
        }
    } else {
        DispatchResult::clean()
    }
}
