//! Fumen text encoding.
//!
//! A document travels as `v115@` followed by base-64 digits: for every page a
//! field frame (run-length diff of the resolved field against the previous
//! page's settled field), a three-digit action word and, when the action
//! says so, an escaped comment. Consecutive unchanged frames collapse into a
//! repeat counter.
//!
//! [`encode`] always writes the 115 generation. [`decode`] also reads the
//! 110 generation (a 21-row playfield) and finds the data anywhere in its
//! input, so whole share URLs can be passed in.

mod action;
mod comment;
mod decoder;
mod encoder;
mod values;

pub use comment::MAX_ESCAPED_LEN;
pub use core_document::FormatVersion;
pub use decoder::decode;
pub use encoder::encode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("no fumen data found")]
    MissingPrefix,
    #[error("unsupported fumen version `{0}`")]
    UnsupportedVersion(String),
    #[error("fumen data is empty")]
    NoPages,
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },
    #[error("data ends early at digit {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("page {page}: field runs overflow the frame")]
    FrameOverflow { page: usize },
    #[error("page {page}: cell ({x}, {y}) decodes to {value}")]
    CellOutOfRange {
        page: usize,
        x: usize,
        y: i32,
        value: i32,
    },
    #[error("page {page}: {source}")]
    InvalidPlacement {
        page: usize,
        source: core_field::PlacementError,
    },
    #[error("comment contains a character outside the comment table")]
    InvalidComment,
}

/// Frame geometry of a format generation. Frames cover the playfield rows
/// `0..top` plus the sent line, top row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub top: usize,
}

impl Layout {
    pub(crate) fn of(version: FormatVersion) -> Self {
        match version {
            FormatVersion::V110 => Self { top: 21 },
            FormatVersion::V115 => Self { top: 23 },
        }
    }

    /// Cells in one frame.
    pub(crate) fn blocks(self) -> u32 {
        (self.top as u32 + 1) * 10
    }

    /// Field row of frame cell `i`; `-1` is the sent line.
    pub(crate) fn row_of(self, i: usize) -> i32 {
        self.top as i32 - (i / 10) as i32 - 1
    }
}
