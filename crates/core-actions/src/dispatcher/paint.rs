use super::DispatchResult;
use crate::Action;
use core_state::{EditError, EditorState};

pub(crate) fn handle_paint(
    action: Action,
    state: &mut EditorState,
) -> Result<DispatchResult, EditError> {
    let outcome = match action {
        Action::Paint { key, piece } => state.paint(key, piece)?,
        Action::BeginGesture => state.begin_gesture()?,
        Action::Stroke { key, piece } => state.stroke(key, piece)?,
        Action::Brush { key, piece } => state.brush_stroke(key, piece)?,
        Action::CommitGesture => state.commit_gesture()?,
        Action::CancelGesture => {
            state.cancel_gesture();
            return Ok(DispatchResult::clean());
        }
        _ => unreachable!("non-paint action routed to paint handler"),
    };
    tracing::trace!(target: "actions.dispatch", ?outcome, "paint");
    Ok(DispatchResult::from_outcome(outcome))
}
