//! Reversible document edits.
//!
//! Every history entry is one `Edit`. An edit carries both sides of the
//! change so that `apply` and `revert` are plain writes; nothing is recomputed
//! at undo time. Content edits touch a single page and later pages follow
//! through their base fields. Structural edits (insert, remove, move) would
//! change what later pages show, so they also carry a `rebase`: the pages
//! whose commands were recomputed to keep their resolved field, with both
//! command sets.

use core_document::{Commands, Comment, Document, Page, PageFlags};
use core_field::{CellKey, Field, Piece, Placement};

/// Override at one cell before and after an edit. `None` means the page has
/// no command there and shows its base field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub key: CellKey,
    pub before: Option<Piece>,
    pub after: Option<Piece>,
}

/// Commands of the page at `index` (in the post-edit page order) before and
/// after a structural edit rewrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebase {
    pub index: usize,
    pub before: Commands,
    pub after: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Paint {
        page: usize,
        changes: Vec<CellChange>,
    },
    SetPiece {
        page: usize,
        before: Option<Placement>,
        after: Option<Placement>,
    },
    SetComment {
        page: usize,
        before: Comment,
        after: Comment,
    },
    SetFlags {
        page: usize,
        before: PageFlags,
        after: PageFlags,
    },
    InsertPage {
        index: usize,
        page: Page,
        rebase: Vec<Rebase>,
    },
    RemovePage {
        index: usize,
        page: Page,
        rebase: Vec<Rebase>,
    },
    MovePage {
        from: usize,
        to: usize,
        rebase: Vec<Rebase>,
    },
    /// Whole-document swap (new document, import).
    Replace {
        before: Box<Document>,
        after: Box<Document>,
    },
}

/// An edit plus the current-page index on either side of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub edit: Edit,
    pub current_before: usize,
    pub current_after: usize,
}

impl Edit {
    /// Short name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Edit::Paint { .. } => "paint",
            Edit::SetPiece { .. } => "set_piece",
            Edit::SetComment { .. } => "set_comment",
            Edit::SetFlags { .. } => "set_flags",
            Edit::InsertPage { .. } => "insert_page",
            Edit::RemovePage { .. } => "remove_page",
            Edit::MovePage { .. } => "move_page",
            Edit::Replace { .. } => "replace",
        }
    }

    /// Lowest page index whose stored data or base field the edit changes.
    pub fn first_affected_page(&self) -> usize {
        match self {
            Edit::Paint { page, .. }
            | Edit::SetPiece { page, .. }
            | Edit::SetComment { page, .. }
            | Edit::SetFlags { page, .. } => *page,
            Edit::InsertPage { index, .. } | Edit::RemovePage { index, .. } => *index,
            Edit::MovePage { from, to, .. } => *from.min(to),
            Edit::Replace { .. } => 0,
        }
    }

    pub fn apply(&self, doc: &mut Document) {
        match self {
            Edit::Paint { page, changes } => {
                doc.edit_page(*page, |p| {
                    for change in changes {
                        p.put_command(change.key, change.after);
                    }
                });
            }
            Edit::SetPiece { page, after, .. } => {
                doc.edit_page(*page, |p| p.set_piece(*after));
            }
            Edit::SetComment { page, after, .. } => {
                doc.edit_page(*page, |p| p.replace_comment(after.clone()));
            }
            Edit::SetFlags { page, after, .. } => {
                doc.edit_page(*page, |p| p.set_flags(*after));
            }
            Edit::InsertPage {
                index,
                page,
                rebase,
            } => {
                doc.insert_page(*index, page.clone());
                write_rebase(doc, rebase, |r| &r.after);
            }
            Edit::RemovePage { index, rebase, .. } => {
                doc.remove_page(*index);
                write_rebase(doc, rebase, |r| &r.after);
            }
            Edit::MovePage { from, to, rebase } => {
                doc.move_page(*from, *to);
                write_rebase(doc, rebase, |r| &r.after);
            }
            Edit::Replace { after, .. } => *doc = (**after).clone(),
        }
    }

    pub fn revert(&self, doc: &mut Document) {
        match self {
            Edit::Paint { page, changes } => {
                doc.edit_page(*page, |p| {
                    for change in changes.iter().rev() {
                        p.put_command(change.key, change.before);
                    }
                });
            }
            Edit::SetPiece { page, before, .. } => {
                doc.edit_page(*page, |p| p.set_piece(*before));
            }
            Edit::SetComment { page, before, .. } => {
                doc.edit_page(*page, |p| p.replace_comment(before.clone()));
            }
            Edit::SetFlags { page, before, .. } => {
                doc.edit_page(*page, |p| p.set_flags(*before));
            }
            Edit::InsertPage { index, rebase, .. } => {
                write_rebase(doc, rebase, |r| &r.before);
                doc.remove_page(*index);
            }
            Edit::RemovePage {
                index,
                page,
                rebase,
            } => {
                write_rebase(doc, rebase, |r| &r.before);
                doc.insert_page(*index, page.clone());
            }
            Edit::MovePage { from, to, rebase } => {
                write_rebase(doc, rebase, |r| &r.before);
                doc.move_page(*to, *from);
            }
            Edit::Replace { before, .. } => *doc = (**before).clone(),
        }
    }
}

fn write_rebase(doc: &mut Document, rebase: &[Rebase], side: impl Fn(&Rebase) -> &Commands) {
    for r in rebase {
        let commands = side(r).clone();
        doc.edit_page(r.index, |p| p.replace_commands(commands));
    }
}

/// Resolved field of every page, in order.
pub(crate) fn resolved_fields(doc: &Document) -> Vec<Field> {
    (0..doc.page_count())
        .filter_map(|i| doc.resolved_field(i))
        .collect()
}

/// Rewrite the commands of each `(index, field)` target so that the page at
/// `index` resolves to `field` again. Targets must be in ascending order:
/// each rewrite can change the base of the pages after it.
pub(crate) fn preserve_fields(
    doc: &mut Document,
    targets: impl IntoIterator<Item = (usize, Field)>,
) -> Vec<Rebase> {
    let mut rebase = Vec::new();
    for (index, field) in targets {
        let Some(base) = doc.base_field(index) else {
            continue;
        };
        let after = Commands::diff(&base, &field);
        let Some(before) = doc.page(index).map(|p| p.commands().clone()) else {
            continue;
        };
        if before != after {
            doc.edit_page(index, |p| p.replace_commands(after.clone()));
            rebase.push(Rebase {
                index,
                before,
                after,
            });
        }
    }
    rebase
}
