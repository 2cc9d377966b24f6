use core_actions::{DispatchResult, dispatch, parse_script};
use core_document::PageFlags;
use core_field::{CellKey, Piece};
use core_state::{EditError, EditorState};
use pretty_assertions::assert_eq;

fn run(state: &mut EditorState, script: &str) -> anyhow::Result<Vec<DispatchResult>> {
    let mut results = Vec::new();
    for action in parse_script(script)? {
        results.push(dispatch(action, state, &[])?);
    }
    Ok(results)
}

fn key(x: usize, y: usize) -> CellKey {
    CellKey::at(x, y).unwrap()
}

#[test]
fn draw_a_short_sequence() {
    let mut state = EditorState::default();
    run(
        &mut state,
        "
        # bottom row, hole at the right
        begin
        stroke 0 0 X
        stroke 1 0 X
        stroke 2 0 X
        commit
        piece I spawn 4 0
        comment opener
        next
        ",
    )
    .unwrap();
    assert_eq!(state.page_count(), 2);
    assert_eq!(state.current_index(), 1);
    let field = state.current_field();
    assert_eq!(field.cell(key(2, 0)), Piece::Gray);
    assert_eq!(field.cell(key(4, 0)), Piece::I);
    assert_eq!(state.current_comment(), "opener");
    assert_eq!(state.undo_depth(), 4);
}

#[test]
fn structure_commands_report_page_changes() {
    let mut state = EditorState::default();
    let results = run(&mut state, "insert\nback\ngoto 1\nremove\nundo\nundo").unwrap();
    assert!(results[0].pages_changed);
    assert_eq!(results[1], DispatchResult::clean());
    assert!(results[3].pages_changed);
    assert!(results[4].pages_changed);
    assert!(results[5].pages_changed);
    assert_eq!(state.page_count(), 1);
}

#[test]
fn flags_toggle_individually() {
    let mut state = EditorState::default();
    run(&mut state, "flag mirror on\nflag lock off").unwrap();
    assert_eq!(state.current_page().flags(), PageFlags::MIRROR);
    run(&mut state, "flag lock on\nflag mirror off").unwrap();
    assert_eq!(state.current_page().flags(), PageFlags::LOCK);
}

#[test]
fn frozen_page_is_skipped_until_thawed() {
    let mut state = EditorState::default();
    let results = run(&mut state, "flag frozen on\npaint 0 0 T\ncomment nope").unwrap();
    assert!(!results[1].dirty);
    assert!(!results[2].dirty);
    run(&mut state, "flag frozen off\npaint 0 0 T").unwrap();
    assert_eq!(state.current_field().cell(key(0, 0)), Piece::T);
}

#[test]
fn edit_errors_surface_from_dispatch() {
    let mut state = EditorState::default();
    let err = run(&mut state, "remove").unwrap_err();
    assert_eq!(err.downcast_ref::<EditError>(), Some(&EditError::LastPage));
    let err = run(&mut state, "infer 0 0 1 0 2 0 5 5").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EditError>(),
        Some(EditError::NotATetromino(_))
    ));
}

#[test]
fn import_then_show() {
    let mut state = EditorState::default();
    let results = run(&mut state, "import v115@HhglIeglIehlAezhMeAgH\nshow").unwrap();
    assert!(results[0].pages_changed);
    assert!(results[1].show);
    assert_eq!(state.export_encoding(), "v115@HhglIeglIehlAezhMeAgH");
}
