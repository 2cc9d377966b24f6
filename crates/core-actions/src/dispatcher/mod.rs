//! Dispatcher applying `Action` to mutable editor state.
//!
//! Sub-modules:
//! * `paint` - cell painting and gestures
//! * `page`  - page content, structure and navigation
//! * `undo`  - undo / redo dispatch

use crate::{Action, ActionObserver};
use core_state::{EditError, EditOutcome, EditorState};

mod page;
mod paint;
mod undo;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// The document changed.
    pub dirty: bool,
    pub quit: bool,
    /// The page count or order changed, so per-page views must be rebuilt.
    pub pages_changed: bool,
    /// The front end should print the current page.
    pub show: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            quit: false,
            pages_changed: false,
            show: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            quit: false,
            pages_changed: false,
            show: false,
        }
    }
    pub fn quit() -> Self {
        Self {
            quit: true,
            ..Self::clean()
        }
    }
    pub fn pages_changed() -> Self {
        Self {
            pages_changed: true,
            ..Self::dirty()
        }
    }
    pub fn show() -> Self {
        Self {
            show: true,
            ..Self::clean()
        }
    }

    fn from_outcome(outcome: EditOutcome) -> Self {
        match outcome {
            EditOutcome::Applied => Self::dirty(),
            EditOutcome::Unchanged | EditOutcome::Ignored => Self::clean(),
        }
    }
}

/// Apply an action to editor state. Errors leave the document untouched.
pub fn dispatch(
    action: Action,
    state: &mut EditorState,
    observers: &[Box<dyn ActionObserver>],
) -> Result<DispatchResult, EditError> {
    for obs in observers {
        obs.on_action(&action);
    }

    let result = match action {
        Action::Paint { .. }
        | Action::BeginGesture
        | Action::Stroke { .. }
        | Action::Brush { .. }
        | Action::CommitGesture
        | Action::CancelGesture => paint::handle_paint(action, state),
        Action::SetPiece(_)
        | Action::Infer(_)
        | Action::SetComment(_)
        | Action::SetFlag { .. } => page::handle_content(action, state),
        Action::InsertPage(_)
        | Action::RemovePage(_)
        | Action::MovePage { .. }
        | Action::NextPage
        | Action::BackPage
        | Action::GotoPage(_)
        | Action::Reset
        | Action::Import(_) => page::handle_structure(action, state),
        Action::Undo => Ok(undo::handle_undo(state)),
        Action::Redo => Ok(undo::handle_redo(state)),
        Action::Show => Ok(DispatchResult::show()),
        Action::Quit => Ok(DispatchResult::quit()),
    };
    if let Err(e) = &result {
        tracing::debug!(target: "actions.dispatch", error = %e, "action_failed");
    }
    result
}
