//! A single step of the diagram.
//!
//! A page never stores a full field. It stores `Commands`, an overlay of cell
//! values against its *base* field (the settled field of the previous page,
//! or the document's initial field for page 0). The overlay is kept minimal:
//! a command whose value equals the base cell is never stored.

use std::collections::BTreeMap;

use core_field::{CellKey, Field, Piece, Placement};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PageFlags: u8 {
        /// The piece settles and full lines clear when the sequence advances.
        const LOCK   = 0b0000_0001;
        /// The settled field is mirrored horizontally.
        const MIRROR = 0b0000_0010;
        /// The sent line rises into the settled field.
        const RISE   = 0b0000_0100;
        /// The page's resolved comment is a `#Q=` quiz. Derived, never stored.
        const QUIZ   = 0b0000_1000;
        /// Editor-side protection: edits targeting the page are refused.
        const FROZEN = 0b0001_0000;
    }
}

impl Default for PageFlags {
    fn default() -> Self {
        PageFlags::LOCK
    }
}

/// Page comment. `Inherited` displays the most recent explicit comment of an
/// earlier page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Comment {
    #[default]
    Inherited,
    Explicit(String),
}

impl Comment {
    pub fn explicit_text(&self) -> Option<&str> {
        match self {
            Comment::Explicit(text) => Some(text),
            Comment::Inherited => None,
        }
    }
}

/// Sparse cell overlay keyed by `CellKey`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Commands(BTreeMap<CellKey, Piece>);

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal overlay turning `base` into `target`.
    pub fn diff(base: &Field, target: &Field) -> Self {
        Self(
            CellKey::all()
                .filter_map(|key| {
                    let value = target.cell(key);
                    (base.cell(key) != value).then_some((key, value))
                })
                .collect(),
        )
    }

    pub fn get(&self, key: CellKey) -> Option<Piece> {
        self.0.get(&key).copied()
    }

    /// Raw write without minimization: `Some` inserts, `None` removes.
    /// Returns the previous override.
    pub fn put(&mut self, key: CellKey, value: Option<Piece>) -> Option<Piece> {
        match value {
            Some(piece) => self.0.insert(key, piece),
            None => self.0.remove(&key),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellKey, Piece)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn apply_to(&self, field: &mut Field) {
        for (key, piece) in self.iter() {
            field.set_cell(key, piece);
        }
    }
}

impl FromIterator<(CellKey, Piece)> for Commands {
    fn from_iter<T: IntoIterator<Item = (CellKey, Piece)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    commands: Commands,
    piece: Option<Placement>,
    comment: Comment,
    flags: PageFlags,
    /// Colour-guide bit of a decoded later page. Page 0 uses
    /// `DocumentMeta::guide_color` instead.
    colorize: bool,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commands(mut self, commands: Commands) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_piece(mut self, piece: Option<Placement>) -> Self {
        self.piece = piece;
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_flags(mut self, flags: PageFlags) -> Self {
        self.flags = flags - PageFlags::QUIZ;
        self
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn piece(&self) -> Option<Placement> {
        self.piece
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    /// Stored flags. `QUIZ` is never set here; see `Document::flags`.
    pub fn flags(&self) -> PageFlags {
        self.flags
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.contains(PageFlags::FROZEN)
    }

    /// `base` with this page's overlay applied. Inputs are not mutated.
    pub fn resolved_field(&self, base: &Field) -> Field {
        let mut field = base.clone();
        self.commands.apply_to(&mut field);
        field
    }

    /// Paint `value` at `key`. When the base already shows `value` the
    /// override is dropped instead. Returns the previous override.
    pub fn set_command(&mut self, base: &Field, key: CellKey, value: Piece) -> Option<Piece> {
        if base.cell(key) == value {
            self.commands.put(key, None)
        } else {
            self.commands.put(key, Some(value))
        }
    }

    pub fn put_command(&mut self, key: CellKey, value: Option<Piece>) -> Option<Piece> {
        self.commands.put(key, value)
    }

    pub fn replace_commands(&mut self, commands: Commands) -> Commands {
        std::mem::replace(&mut self.commands, commands)
    }

    /// Replace the placement. Later pages are not touched here; they see the
    /// change through their base field.
    pub fn set_piece(&mut self, piece: Option<Placement>) -> Option<Placement> {
        std::mem::replace(&mut self.piece, piece)
    }

    pub fn set_comment(&mut self, text: impl Into<String>) -> Comment {
        self.replace_comment(Comment::Explicit(text.into()))
    }

    pub fn replace_comment(&mut self, comment: Comment) -> Comment {
        std::mem::replace(&mut self.comment, comment)
    }

    pub fn set_flags(&mut self, flags: PageFlags) -> PageFlags {
        std::mem::replace(&mut self.flags, flags - PageFlags::QUIZ)
    }

    /// The field handed to the next page: piece locked in, lines cleared,
    /// garbage risen and mirrored as the flags request. Non-lock pages pass
    /// `resolved` through unchanged.
    pub fn settle(&self, resolved: &Field) -> Field {
        let mut field = resolved.clone();
        if !self.flags.contains(PageFlags::LOCK) {
            return field;
        }
        if let Some(piece) = &self.piece {
            field.put(piece);
        }
        field.clear_lines();
        if self.flags.contains(PageFlags::RISE) {
            field.rise_garbage();
        }
        if self.flags.contains(PageFlags::MIRROR) {
            field.mirror();
        }
        field
    }
}
