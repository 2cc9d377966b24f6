use core_codec::{decode, encode};
use core_document::{Comment, Document, PageFlags};
use core_field::{CellKey, Piece, Placement, Rotation};
use core_state::{
    EditError, EditOutcome, EditorOptions, EditorState, GestureState, LockedPagePolicy,
};
use pretty_assertions::assert_eq;

fn key(x: usize, y: usize) -> CellKey {
    CellKey::at(x, y).unwrap()
}

#[test]
fn gesture_is_one_undo_step() {
    let mut state = EditorState::default();
    state.begin_gesture().unwrap();
    for x in 0..4 {
        state.stroke(key(x, 0), Piece::I).unwrap();
    }
    // Strokes are previewed but not yet in the document.
    assert_eq!(state.current_field().cell(key(3, 0)), Piece::I);
    assert!(state.document().page(0).unwrap().commands().is_empty());

    assert_eq!(state.commit_gesture().unwrap(), EditOutcome::Applied);
    assert_eq!(state.undo_depth(), 1);
    assert!(state.undo());
    assert_eq!(state.current_field().cell(key(0, 0)), Piece::Empty);
}

#[test]
fn painting_back_the_original_records_nothing() {
    let mut state = EditorState::default();
    state.begin_gesture().unwrap();
    state.stroke(key(5, 5), Piece::T).unwrap();
    state.stroke(key(5, 5), Piece::Empty).unwrap();
    assert_eq!(state.commit_gesture().unwrap(), EditOutcome::Unchanged);
    assert_eq!(state.undo_depth(), 0);
}

#[test]
fn brush_first_stroke_decides_paint_or_erase() {
    let mut state = EditorState::default();
    state.paint(key(0, 0), Piece::J).unwrap();
    state.paint(key(1, 0), Piece::J).unwrap();

    // Starting on a J cell with the J brush erases for the whole gesture.
    state.brush_stroke(key(0, 0), Piece::J).unwrap();
    state.brush_stroke(key(1, 0), Piece::J).unwrap();
    state.brush_stroke(key(2, 0), Piece::J).unwrap();
    state.commit_gesture().unwrap();
    let field = state.current_field();
    assert_eq!(field.cell(key(0, 0)), Piece::Empty);
    assert_eq!(field.cell(key(1, 0)), Piece::Empty);
    assert_eq!(field.cell(key(2, 0)), Piece::Empty);

    // Starting on an empty cell paints, even over existing J cells.
    state.brush_stroke(key(3, 0), Piece::J).unwrap();
    state.brush_stroke(key(3, 1), Piece::J).unwrap();
    state.commit_gesture().unwrap();
    assert_eq!(state.current_field().cell(key(3, 1)), Piece::J);
}

#[test]
fn navigation_cancels_gesture() {
    let mut state = EditorState::default();
    state.next_page().unwrap();
    state.stroke(key(0, 0), Piece::O).unwrap();
    assert!(matches!(state.gesture(), GestureState::Recording(_)));
    assert!(state.back_page());
    assert_eq!(state.gesture(), &GestureState::Idle);
    assert_eq!(state.commit_gesture().unwrap(), EditOutcome::Unchanged);
    assert_eq!(state.document().resolved_field(1).unwrap().cell(key(0, 0)), Piece::Empty);
}

#[test]
fn inserted_page_paint_round_trips_through_encoding() {
    let mut state = EditorState::default();
    state.insert_page(1).unwrap();
    assert_eq!(state.current_index(), 1);
    state.paint(key(5, 0), Piece::S).unwrap();

    let doc = decode(&state.export_encoding()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.resolved_field(1).unwrap().cell(key(5, 0)), Piece::S);
    assert_eq!(doc.resolved_field(0).unwrap().cell(key(5, 0)), Piece::Empty);
}

#[test]
fn inserting_before_a_page_keeps_its_field() {
    let mut state = EditorState::default();
    state.paint(key(0, 0), Piece::Gray).unwrap();
    state.next_page().unwrap();
    state.paint(key(9, 0), Piece::Gray).unwrap();
    let shown = state.document().resolved_field(1).unwrap();

    state.insert_page(0).unwrap();
    assert_eq!(state.page_count(), 3);
    assert!(state.document().resolved_field(0).unwrap().is_empty());
    assert_eq!(state.document().resolved_field(2).unwrap(), shown);
}

#[test]
fn next_page_appends_and_is_undoable() {
    let mut state = EditorState::default();
    assert_eq!(state.next_page().unwrap(), EditOutcome::Applied);
    assert_eq!((state.page_count(), state.current_index()), (2, 1));
    assert!(state.back_page());
    assert_eq!(state.next_page().unwrap(), EditOutcome::Unchanged);
    assert!(state.undo());
    assert_eq!((state.page_count(), state.current_index()), (1, 0));
}

#[test]
fn locked_piece_carries_to_next_page() {
    let mut state = EditorState::default();
    let t = Placement::new(Piece::T, Rotation::Spawn, 4, 0).unwrap();
    state.set_piece(Some(t)).unwrap();
    state.next_page().unwrap();
    assert_eq!(state.current_field().cell(key(4, 1)), Piece::T);
    state.back_page();
    state.set_flags(PageFlags::empty()).unwrap();
    state.goto_page(1).unwrap();
    assert_eq!(state.current_field().cell(key(4, 1)), Piece::Empty);
}

#[test]
fn inference_sets_the_piece() {
    let mut state = EditorState::default();
    // Flat S on the floor: (0,0) (1,0) (1,1) (2,1).
    state.commit_inference(&[0, 1, 11, 12]).unwrap();
    assert_eq!(state.current_page().piece().unwrap().piece(), Piece::S);
    assert!(matches!(
        state.commit_inference(&[0, 1, 2]),
        Err(EditError::NotATetromino(_))
    ));
    assert_eq!(state.undo_depth(), 1);
}

#[test]
fn quiz_flag_follows_comment() {
    let mut state = EditorState::default();
    state
        .set_comment(Comment::Explicit("#Q=[](T)SZ".into()))
        .unwrap();
    state.next_page().unwrap();
    assert!(state.current_flags().contains(PageFlags::QUIZ));
    assert_eq!(state.current_comment(), "#Q=[](T)SZ");
    // QUIZ is never stored, even when passed in.
    state.set_flags(PageFlags::LOCK | PageFlags::QUIZ).unwrap();
    assert!(!state.current_page().flags().contains(PageFlags::QUIZ));
}

#[test]
fn frozen_page_ignores_edits_by_default() {
    let mut state = EditorState::default();
    state.set_flags(PageFlags::LOCK | PageFlags::FROZEN).unwrap();
    let depth = state.undo_depth();
    assert_eq!(state.paint(key(0, 0), Piece::I).unwrap(), EditOutcome::Ignored);
    assert_eq!(
        state.set_comment(Comment::Explicit("x".into())).unwrap(),
        EditOutcome::Ignored
    );
    assert_eq!(state.undo_depth(), depth);
    // Thawing is always allowed.
    assert_eq!(state.set_flags(PageFlags::LOCK).unwrap(), EditOutcome::Applied);
    assert_eq!(state.paint(key(0, 0), Piece::I).unwrap(), EditOutcome::Applied);
}

#[test]
fn frozen_page_rejects_edits_under_reject_policy() {
    let options = EditorOptions {
        locked_pages: LockedPagePolicy::Reject,
        ..Default::default()
    };
    let mut state = EditorState::with_options(Document::new(), options);
    state.next_page().unwrap();
    state.set_flags(PageFlags::LOCK | PageFlags::FROZEN).unwrap();
    assert_eq!(state.paint(key(0, 0), Piece::I), Err(EditError::LockedPage(1)));
    assert_eq!(state.remove_page(1), Err(EditError::LockedPage(1)));
    // Other pages are unaffected.
    state.goto_page(0).unwrap();
    assert_eq!(state.paint(key(0, 0), Piece::I).unwrap(), EditOutcome::Applied);
}

#[test]
fn page_bounds_are_checked() {
    let mut state = EditorState::default();
    assert_eq!(state.remove_page(0), Err(EditError::LastPage));
    assert_eq!(
        state.goto_page(3),
        Err(EditError::PageOutOfRange { index: 3, count: 1 })
    );
    assert_eq!(
        state.insert_page(2),
        Err(EditError::PageOutOfRange { index: 2, count: 1 })
    );
    assert_eq!(state.move_page(0, 0).unwrap(), EditOutcome::Unchanged);
    assert!(matches!(
        state.import_encoding("garbage"),
        Err(EditError::Import(_))
    ));
    assert_eq!(encode(state.document()), "v115@vhAAgH");
}
