//! Editor commands.
//!
//! An [`Action`] is one user-level command (paint a cell, turn a page, undo).
//! Front ends produce actions (the CLI from script lines via
//! [`ScriptParser`]) and hand them to [`dispatch`], which applies them to an
//! `EditorState`.

use core_document::{Comment, PageFlags};
use core_field::{CellKey, Piece, Placement};

mod dispatcher;
mod script;

pub use dispatcher::{DispatchResult, dispatch};
pub use script::{ParsedCommand, ScriptError, ScriptParser, parse_script};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Paint one cell as its own undo step.
    Paint { key: CellKey, piece: Piece },
    BeginGesture,
    /// Buffer an exact value in the open gesture.
    Stroke { key: CellKey, piece: Piece },
    /// Brush stroke; the first one in a gesture picks paint or erase.
    Brush { key: CellKey, piece: Piece },
    CommitGesture,
    CancelGesture,
    SetPiece(Option<Placement>),
    /// Set the piece from four playfield cell indices.
    Infer(Vec<usize>),
    SetComment(Comment),
    /// Turn one stored flag on or off, keeping the others.
    SetFlag { flag: PageFlags, on: bool },
    /// Insert an empty page at the index, or after the current page.
    InsertPage(Option<usize>),
    /// Remove the page at the index, or the current page.
    RemovePage(Option<usize>),
    MovePage { from: usize, to: usize },
    NextPage,
    BackPage,
    GotoPage(usize),
    Undo,
    Redo,
    Reset,
    Import(String),
    /// Ask the front end to print the current page.
    Show,
    Quit,
}

/// Hook notified before each action is applied.
pub trait ActionObserver {
    fn on_action(&self, action: &Action);
}
