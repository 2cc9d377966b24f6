//! Page content, structure and navigation.

use super::DispatchResult;
use crate::Action;
use core_state::{EditError, EditOutcome, EditorState};

pub(crate) fn handle_content(
    action: Action,
    state: &mut EditorState,
) -> Result<DispatchResult, EditError> {
    let outcome = match action {
        Action::SetPiece(piece) => state.set_piece(piece)?,
        Action::Infer(indices) => state.commit_inference(&indices)?,
        Action::SetComment(comment) => state.set_comment(comment)?,
        Action::SetFlag { flag, on } => {
            let mut flags = state.current_page().flags();
            flags.set(flag, on);
            state.set_flags(flags)?
        }
        _ => unreachable!("non-content action routed to content handler"),
    };
    Ok(DispatchResult::from_outcome(outcome))
}

pub(crate) fn handle_structure(
    action: Action,
    state: &mut EditorState,
) -> Result<DispatchResult, EditError> {
    let outcome = match action {
        Action::InsertPage(index) => {
            let index = index.unwrap_or(state.current_index() + 1);
            state.insert_page(index)?
        }
        Action::RemovePage(index) => state.remove_page(index.unwrap_or(state.current_index()))?,
        Action::MovePage { from, to } => state.move_page(from, to)?,
        Action::NextPage => state.next_page()?,
        Action::BackPage => {
            state.back_page();
            return Ok(DispatchResult::clean());
        }
        Action::GotoPage(index) => {
            state.goto_page(index)?;
            return Ok(DispatchResult::clean());
        }
        Action::Reset => state.reset_document(),
        Action::Import(data) => state.import_encoding(&data)?,
        _ => unreachable!("non-structural action routed to page handler"),
    };
    tracing::trace!(target: "actions.dispatch", ?outcome, page = state.current_index(), pages = state.page_count(), "page");
    Ok(match outcome {
        EditOutcome::Applied => DispatchResult::pages_changed(),
        EditOutcome::Unchanged | EditOutcome::Ignored => DispatchResult::clean(),
    })
}
