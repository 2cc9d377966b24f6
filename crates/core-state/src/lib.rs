//! Editor state: the document, the current page, undo history and auto-save.
//!
//! Every mutating operation goes through `EditorState`, which builds a
//! reversible [`Edit`], applies it, records it in the [`UndoEngine`] and then
//! writes the encoded document to the configured [`SnapshotStore`].
//!
//! Paint gestures:
//! - `begin_gesture` starts buffering strokes for the current page. Strokes
//!   never touch the document; `current_field` overlays them as a preview.
//! - `commit_gesture` turns the buffered cells into a single `Paint` entry.
//!   A gesture whose cells all end up where they started records nothing.
//! - Navigation, undo, redo and any other edit cancel an open gesture.
//!
//! Frozen pages refuse edits that target them. Whether a refused edit is a
//! silent no-op or an error is chosen by [`LockedPagePolicy`].

use core_codec::{DecodeError, decode, encode};
use core_document::{Comment, Document, Page, PageFlags};
use core_field::{CellKey, Field, InferenceError, Piece, Placement, PlacementError, infer_piece};
use tracing::{debug, trace, warn};

pub mod autosave;
pub mod edit;
pub mod undo;

pub use autosave::{FileStore, MemoryStore, SnapshotStore};
pub use edit::{CellChange, Edit, HistoryEntry, Rebase};
pub use undo::{Gesture, GestureState, UNDO_HISTORY_MAX, UndoEngine};

use edit::{preserve_fields, resolved_fields};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("page {index} out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("page {0} is frozen")]
    LockedPage(usize),
    #[error(transparent)]
    InvalidPlacement(#[from] PlacementError),
    #[error(transparent)]
    NotATetromino(#[from] InferenceError),
    #[error("the last page cannot be removed")]
    LastPage,
    #[error("import failed: {0}")]
    Import(#[from] DecodeError),
}

/// What happens to an edit that targets a frozen page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockedPagePolicy {
    /// Drop the edit and report `EditOutcome::Ignored`.
    #[default]
    Ignore,
    /// Fail with `EditError::LockedPage`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The document changed and an entry was recorded.
    Applied,
    /// The request was valid but left the document as it was.
    Unchanged,
    /// Refused because the page is frozen.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub history_depth: usize,
    pub locked_pages: LockedPagePolicy,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_depth: UNDO_HISTORY_MAX,
            locked_pages: LockedPagePolicy::Ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadSource {
    Url,
    Autosave,
    #[default]
    Default,
}

/// How `EditorState::load` found its document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub source: LoadSource,
    /// Set when URL data was given but did not decode.
    pub url_error: Option<DecodeError>,
    /// Set when the auto-save snapshot could not be read or decoded.
    pub autosave_error: Option<String>,
}

pub struct EditorState {
    doc: Document,
    current: usize,
    undo: UndoEngine,
    locked_pages: LockedPagePolicy,
    store: Option<Box<dyn SnapshotStore>>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorState {
    pub fn new(doc: Document) -> Self {
        Self::with_options(doc, EditorOptions::default())
    }

    pub fn with_options(doc: Document, options: EditorOptions) -> Self {
        Self {
            doc,
            current: 0,
            undo: UndoEngine::with_depth(options.history_depth),
            locked_pages: options.locked_pages,
            store: None,
        }
    }

    /// Open the editor on URL data, else the auto-save snapshot, else a new
    /// document. URL data that fails to decode falls back to a new document
    /// (the snapshot is left alone so it is not mistaken for the link).
    pub fn load(
        url_param: Option<&str>,
        store: Option<Box<dyn SnapshotStore>>,
        options: EditorOptions,
    ) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut doc = None;
        match url_param.filter(|p| !p.trim().is_empty()) {
            Some(param) => match decode(param) {
                Ok(d) => {
                    report.source = LoadSource::Url;
                    doc = Some(d);
                }
                Err(e) => {
                    warn!(target: "state.load", error = %e, "url_decode_failed");
                    report.url_error = Some(e);
                }
            },
            None => match store.as_ref().map(|s| s.load()) {
                Some(Ok(Some(data))) => match decode(&data) {
                    Ok(d) => {
                        report.source = LoadSource::Autosave;
                        doc = Some(d);
                    }
                    Err(e) => {
                        warn!(target: "state.load", error = %e, "autosave_decode_failed");
                        report.autosave_error = Some(e.to_string());
                    }
                },
                Some(Err(e)) => {
                    warn!(target: "state.load", error = %format!("{e:#}"), "autosave_read_failed");
                    report.autosave_error = Some(format!("{e:#}"));
                }
                Some(Ok(None)) | None => {}
            },
        }
        let mut state = Self::with_options(doc.unwrap_or_default(), options);
        state.store = store;
        debug!(target: "state.load", source = ?report.source, pages = state.page_count(), "loaded");
        (state, report)
    }

    pub fn set_store(&mut self, store: Option<Box<dyn SnapshotStore>>) {
        self.store = store;
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.doc.page(index)
    }

    pub fn current_page(&self) -> &Page {
        &self.doc.pages()[self.current]
    }

    /// Resolved field of the current page with any in-progress gesture
    /// strokes drawn over it.
    pub fn current_field(&self) -> Field {
        let mut field = self.doc.resolved_field(self.current).unwrap_or_default();
        if let GestureState::Recording(gesture) = self.undo.gesture()
            && gesture.page == self.current
        {
            for (key, piece) in &gesture.strokes {
                field.set_cell(*key, *piece);
            }
        }
        field
    }

    pub fn current_comment(&self) -> &str {
        self.doc.comment_text(self.current).unwrap_or("")
    }

    /// Stored flags of the current page plus the derived `QUIZ`.
    pub fn current_flags(&self) -> PageFlags {
        self.doc.flags(self.current).unwrap_or_default()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }
    pub fn gesture(&self) -> &GestureState {
        self.undo.gesture()
    }

    pub fn export_encoding(&self) -> String {
        encode(&self.doc)
    }

    // ------------------------------------------------------------------
    // History

    pub fn undo(&mut self) -> bool {
        let undone = self.undo.undo(&mut self.doc, &mut self.current);
        if undone {
            self.autosave();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.undo.redo(&mut self.doc, &mut self.current);
        if redone {
            self.autosave();
        }
        redone
    }

    /// Apply an edit and record it. Only the target and the new values are
    /// taken from `edit`: the recorded entry is rebuilt from the document, so
    /// `before` sides and `rebase` lists given by the caller are ignored.
    /// Paint values are minimized against the page's base field and changes
    /// that leave a cell as it was are dropped.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        match edit {
            Edit::Paint { page, changes } => {
                self.check_index(page)?;
                let Some(base) = self.doc.base_field(page) else {
                    return Ok(EditOutcome::Unchanged);
                };
                let cells: Vec<(CellKey, Piece)> = changes
                    .iter()
                    .map(|c| (c.key, c.after.unwrap_or_else(|| base.cell(c.key))))
                    .collect();
                self.paint_cells(page, &cells)
            }
            Edit::SetPiece { page, after, .. } => self.set_piece_at(page, after),
            Edit::SetComment { page, after, .. } => self.set_comment_at(page, after),
            Edit::SetFlags { page, after, .. } => self.set_flags_at(page, after),
            Edit::InsertPage { index, page, .. } => self.insert_page_with(index, page),
            Edit::RemovePage { index, .. } => self.remove_page(index),
            Edit::MovePage { from, to, .. } => self.move_page(from, to),
            Edit::Replace { after, .. } => Ok(self.replace(*after)),
        }
    }

    // ------------------------------------------------------------------
    // Painting

    /// Start a paint gesture on the current page.
    pub fn begin_gesture(&mut self) -> Result<EditOutcome, EditError> {
        if !self.guard(self.current, "paint")? {
            self.undo.cancel_gesture();
            return Ok(EditOutcome::Ignored);
        }
        self.undo.begin_gesture(self.current);
        Ok(EditOutcome::Unchanged)
    }

    /// Buffer `value` at `key` in the open gesture, opening one if needed.
    pub fn stroke(&mut self, key: CellKey, value: Piece) -> Result<EditOutcome, EditError> {
        if self.undo.gesture_mut().is_none() && self.begin_gesture()? == EditOutcome::Ignored {
            return Ok(EditOutcome::Ignored);
        }
        if let Some(gesture) = self.undo.gesture_mut() {
            gesture.strokes.insert(key, value);
        }
        Ok(EditOutcome::Unchanged)
    }

    /// Brush stroke: the first stroke of a gesture decides the fill. Touching
    /// a cell that already shows `brush` erases, anything else paints `brush`.
    pub fn brush_stroke(&mut self, key: CellKey, brush: Piece) -> Result<EditOutcome, EditError> {
        let shown = self.current_field().cell(key);
        if self.undo.gesture_mut().is_none() && self.begin_gesture()? == EditOutcome::Ignored {
            return Ok(EditOutcome::Ignored);
        }
        let fill = match self.undo.gesture_mut() {
            Some(gesture) => *gesture.fill.get_or_insert(if shown == brush {
                Piece::Empty
            } else {
                brush
            }),
            None => brush,
        };
        self.stroke(key, fill)
    }

    /// Record the open gesture as one `Paint` entry.
    pub fn commit_gesture(&mut self) -> Result<EditOutcome, EditError> {
        let Some(gesture) = self.undo.take_gesture() else {
            return Ok(EditOutcome::Unchanged);
        };
        self.check_index(gesture.page)?;
        let cells: Vec<(CellKey, Piece)> = gesture.strokes.into_iter().collect();
        self.paint_cells(gesture.page, &cells)
    }

    /// Record one `Paint` entry writing `cells` on `page`. Overrides equal to
    /// the base cell are dropped and cells already showing their value are
    /// skipped.
    fn paint_cells(
        &mut self,
        page: usize,
        cells: &[(CellKey, Piece)],
    ) -> Result<EditOutcome, EditError> {
        if !self.guard(page, "paint")? {
            return Ok(EditOutcome::Ignored);
        }
        let (Some(base), Some(stored)) = (self.doc.base_field(page), self.doc.page(page))
        else {
            return Ok(EditOutcome::Unchanged);
        };
        let mut changes: Vec<CellChange> = Vec::new();
        for (key, value) in cells {
            let after = (base.cell(*key) != *value).then_some(*value);
            match changes.iter_mut().find(|c| c.key == *key) {
                Some(change) => change.after = after,
                None => changes.push(CellChange {
                    key: *key,
                    before: stored.commands().get(*key),
                    after,
                }),
            }
        }
        changes.retain(|c| c.before != c.after);
        if changes.is_empty() {
            debug!(target: "state.edit", page, cells = cells.len(), "paint_no_op");
            return Ok(EditOutcome::Unchanged);
        }
        let edit = Edit::Paint { page, changes };
        edit.apply(&mut self.doc);
        self.commit(edit, self.current);
        Ok(EditOutcome::Applied)
    }

    pub fn cancel_gesture(&mut self) {
        self.undo.cancel_gesture();
    }

    /// Single-cell paint recorded as its own entry.
    pub fn paint(&mut self, key: CellKey, value: Piece) -> Result<EditOutcome, EditError> {
        if self.begin_gesture()? == EditOutcome::Ignored {
            return Ok(EditOutcome::Ignored);
        }
        self.stroke(key, value)?;
        self.commit_gesture()
    }

    // ------------------------------------------------------------------
    // Page content

    pub fn set_piece(&mut self, piece: Option<Placement>) -> Result<EditOutcome, EditError> {
        self.set_piece_at(self.current, piece)
    }

    /// Set the current page's piece from four playfield cells.
    pub fn commit_inference(&mut self, indices: &[usize]) -> Result<EditOutcome, EditError> {
        let placement = infer_piece(indices)?;
        self.set_piece(Some(placement))
    }

    pub fn set_comment(&mut self, comment: Comment) -> Result<EditOutcome, EditError> {
        self.set_comment_at(self.current, comment)
    }

    /// Replace the stored flags of the current page. Changing `FROZEN` itself
    /// is always allowed so a frozen page can be thawed.
    pub fn set_flags(&mut self, flags: PageFlags) -> Result<EditOutcome, EditError> {
        self.set_flags_at(self.current, flags)
    }

    fn set_piece_at(
        &mut self,
        page: usize,
        piece: Option<Placement>,
    ) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        self.check_index(page)?;
        let before = self.doc.pages()[page].piece();
        if before == piece {
            return Ok(EditOutcome::Unchanged);
        }
        self.guarded(Edit::SetPiece {
            page,
            before,
            after: piece,
        })
    }

    fn set_comment_at(&mut self, page: usize, comment: Comment) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        self.check_index(page)?;
        let before = self.doc.pages()[page].comment().clone();
        if before == comment {
            return Ok(EditOutcome::Unchanged);
        }
        self.guarded(Edit::SetComment {
            page,
            before,
            after: comment,
        })
    }

    fn set_flags_at(&mut self, page: usize, flags: PageFlags) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        self.check_index(page)?;
        let flags = flags - PageFlags::QUIZ;
        let before = self.doc.pages()[page].flags();
        if before == flags {
            return Ok(EditOutcome::Unchanged);
        }
        let edit = Edit::SetFlags {
            page,
            before,
            after: flags,
        };
        if (before ^ flags).contains(PageFlags::FROZEN) {
            edit.apply(&mut self.doc);
            self.commit(edit, self.current);
            return Ok(EditOutcome::Applied);
        }
        self.guarded(edit)
    }

    /// Apply and record a single-page content edit unless its page is frozen.
    fn guarded(&mut self, edit: Edit) -> Result<EditOutcome, EditError> {
        if !self.guard(edit.first_affected_page(), edit.kind())? {
            return Ok(EditOutcome::Ignored);
        }
        edit.apply(&mut self.doc);
        self.commit(edit, self.current);
        Ok(EditOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Page structure

    /// Insert an empty page at `index` and make it current. The page that
    /// used to be at `index` keeps showing the same field.
    pub fn insert_page(&mut self, index: usize) -> Result<EditOutcome, EditError> {
        self.insert_page_with(index, Page::new())
    }

    fn insert_page_with(&mut self, index: usize, page: Page) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        let count = self.page_count();
        if index > count {
            return Err(EditError::PageOutOfRange { index, count });
        }
        let before = resolved_fields(&self.doc);
        self.doc.insert_page(index, page.clone());
        let targets = before.get(index).cloned().map(|field| (index + 1, field));
        let rebase = preserve_fields(&mut self.doc, targets);
        self.commit(
            Edit::InsertPage {
                index,
                page,
                rebase,
            },
            index,
        );
        Ok(EditOutcome::Applied)
    }

    /// Remove the page at `index`. The page after it keeps showing the same
    /// field.
    pub fn remove_page(&mut self, index: usize) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        self.check_index(index)?;
        let count = self.page_count();
        if count == 1 {
            return Err(EditError::LastPage);
        }
        if !self.guard(index, "remove_page")? {
            return Ok(EditOutcome::Ignored);
        }
        let before = resolved_fields(&self.doc);
        let Some(page) = self.doc.remove_page(index) else {
            return Err(EditError::LastPage);
        };
        let targets = before.get(index + 1).cloned().map(|field| (index, field));
        let rebase = preserve_fields(&mut self.doc, targets);
        let current_after = after_removal(self.current, index, count - 1);
        self.commit(
            Edit::RemovePage {
                index,
                page,
                rebase,
            },
            current_after,
        );
        Ok(EditOutcome::Applied)
    }

    /// Move the page at `from` to `to`. Every page keeps showing the same
    /// field; the current page follows its content. A frozen page stays put.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(EditOutcome::Unchanged);
        }
        if !self.guard(from, "move_page")? {
            return Ok(EditOutcome::Ignored);
        }
        let count = self.page_count();
        let before = resolved_fields(&self.doc);
        let mut order: Vec<usize> = (0..count).collect();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.doc.move_page(from, to);
        let last = (from.max(to) + 1).min(count - 1);
        let targets: Vec<(usize, Field)> = (from.min(to)..=last)
            .map(|i| (i, before[order[i]].clone()))
            .collect();
        let rebase = preserve_fields(&mut self.doc, targets);
        let current_after = after_move(self.current, from, to);
        self.commit(Edit::MovePage { from, to, rebase }, current_after);
        Ok(EditOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Navigation

    /// Advance to the next page, appending a new one at the end.
    pub fn next_page(&mut self) -> Result<EditOutcome, EditError> {
        self.undo.cancel_gesture();
        if self.current + 1 < self.page_count() {
            self.current += 1;
            trace!(target: "state.edit", page = self.current, "navigate");
            return Ok(EditOutcome::Unchanged);
        }
        self.insert_page(self.page_count())
    }

    /// Step back one page. Returns false on the first page.
    pub fn back_page(&mut self) -> bool {
        self.undo.cancel_gesture();
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        trace!(target: "state.edit", page = self.current, "navigate");
        true
    }

    pub fn goto_page(&mut self, index: usize) -> Result<(), EditError> {
        self.check_index(index)?;
        self.undo.cancel_gesture();
        self.current = index;
        trace!(target: "state.edit", page = index, "navigate");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Whole document

    /// Replace the document with a single empty page (undoable).
    pub fn reset_document(&mut self) -> EditOutcome {
        self.replace(Document::new())
    }

    /// Replace the document with decoded `data` (undoable).
    pub fn import_encoding(&mut self, data: &str) -> Result<EditOutcome, EditError> {
        let doc = decode(data)?;
        Ok(self.replace(doc))
    }

    fn replace(&mut self, doc: Document) -> EditOutcome {
        self.undo.cancel_gesture();
        if doc == self.doc {
            return EditOutcome::Unchanged;
        }
        let edit = Edit::Replace {
            before: Box::new(self.doc.clone()),
            after: Box::new(doc),
        };
        edit.apply(&mut self.doc);
        self.commit(edit, 0);
        EditOutcome::Applied
    }

    // ------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        let count = self.page_count();
        if index < count {
            Ok(())
        } else {
            Err(EditError::PageOutOfRange { index, count })
        }
    }

    /// `Ok(true)` when `page` may be edited, `Ok(false)` when the edit should
    /// be dropped.
    fn guard(&self, page: usize, kind: &'static str) -> Result<bool, EditError> {
        let frozen = self.doc.page(page).is_some_and(Page::is_frozen);
        if !frozen {
            return Ok(true);
        }
        match self.locked_pages {
            LockedPagePolicy::Ignore => {
                debug!(target: "state.edit", page, kind, "edit_ignored_frozen_page");
                Ok(false)
            }
            LockedPagePolicy::Reject => Err(EditError::LockedPage(page)),
        }
    }

    /// Record an already applied edit, move to `current_after` and save.
    fn commit(&mut self, edit: Edit, current_after: usize) {
        let current_after = current_after.min(self.page_count() - 1);
        trace!(target: "state.edit", kind = edit.kind(), from_page = edit.first_affected_page(), current = current_after, "edit_applied");
        self.undo.record(HistoryEntry {
            edit,
            current_before: self.current,
            current_after,
        });
        self.current = current_after;
        self.autosave();
    }

    fn autosave(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let data = encode(&self.doc);
        match store.save(&data) {
            Ok(()) => trace!(target: "state.autosave", len = data.len(), "autosave_written"),
            Err(e) => warn!(target: "state.autosave", error = %format!("{e:#}"), "autosave_failed"),
        }
    }
}

fn after_removal(current: usize, removed: usize, remaining: usize) -> usize {
    let current = if current > removed { current - 1 } else { current };
    current.min(remaining.saturating_sub(1))
}

fn after_move(current: usize, from: usize, to: usize) -> usize {
    if current == from {
        to
    } else if from < current && current <= to {
        current - 1
    } else if to <= current && current < from {
        current + 1
    } else {
        current
    }
}
