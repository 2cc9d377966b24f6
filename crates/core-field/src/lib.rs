//! Board primitives shared by every other crate: cell values (`Piece`),
//! rotations, the fixed-size `Field` grid and tetromino `Placement`s.
//!
//! Coordinates follow the fumen convention: `x` grows to the right from 0 to
//! 9, `y` grows upward from the bottom playfield row (`y = 0`) to the top row
//! (`y = 22`). A separate one-row "sent line" sits below the playfield and
//! holds garbage that a rising page pushes in.

use std::fmt;

mod cell;
mod field;
mod inference;
mod placement;

pub use cell::{CellKey, CellType};
pub use field::{Field, FieldError, ShiftDirection};
pub use inference::{InferenceError, infer_piece};
pub use placement::{Placement, PlacementError};

/// Number of columns in the playfield (and in the sent line).
pub const FIELD_WIDTH: usize = 10;
/// Number of playfield rows (`y = 0..=22`).
pub const FIELD_HEIGHT: usize = 23;
/// Number of playfield cells addressable by linear index.
pub const FIELD_CELLS: usize = FIELD_WIDTH * FIELD_HEIGHT;

/// Value stored in a single cell. Discriminants are the fumen wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Piece {
    #[default]
    Empty = 0,
    I = 1,
    L = 2,
    O = 3,
    Z = 4,
    T = 5,
    J = 6,
    S = 7,
    Gray = 8,
}

impl Piece {
    /// The seven tetrominoes, in wire order.
    pub const MINOS: [Piece; 7] = [
        Piece::I,
        Piece::L,
        Piece::O,
        Piece::Z,
        Piece::T,
        Piece::J,
        Piece::S,
    ];

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn from_value(value: u8) -> Option<Piece> {
        Some(match value {
            0 => Piece::Empty,
            1 => Piece::I,
            2 => Piece::L,
            3 => Piece::O,
            4 => Piece::Z,
            5 => Piece::T,
            6 => Piece::J,
            7 => Piece::S,
            8 => Piece::Gray,
            _ => return None,
        })
    }

    /// True for the seven tetrominoes (everything except `Empty` and `Gray`).
    pub const fn is_mino(self) -> bool {
        !matches!(self, Piece::Empty | Piece::Gray)
    }

    /// Single-letter name used by the text renderer and the command parser.
    pub const fn letter(self) -> char {
        match self {
            Piece::Empty => '_',
            Piece::I => 'I',
            Piece::L => 'L',
            Piece::O => 'O',
            Piece::Z => 'Z',
            Piece::T => 'T',
            Piece::J => 'J',
            Piece::S => 'S',
            Piece::Gray => 'X',
        }
    }

    /// Inverse of [`Piece::letter`]; case-insensitive, `G` is accepted for gray.
    pub fn from_letter(letter: char) -> Option<Piece> {
        Some(match letter.to_ascii_uppercase() {
            '_' | 'E' => Piece::Empty,
            'I' => Piece::I,
            'L' => Piece::L,
            'O' => Piece::O,
            'Z' => Piece::Z,
            'T' => Piece::T,
            'J' => Piece::J,
            'S' => Piece::S,
            'X' | 'G' => Piece::Gray,
            _ => return None,
        })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Spawn,
    Right,
    Reverse,
    Left,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Spawn,
        Rotation::Right,
        Rotation::Reverse,
        Rotation::Left,
    ];

    pub fn from_name(name: &str) -> Option<Rotation> {
        Some(match name.to_ascii_lowercase().as_str() {
            "spawn" | "0" => Rotation::Spawn,
            "right" | "r" | "cw" => Rotation::Right,
            "reverse" | "2" | "180" => Rotation::Reverse,
            "left" | "l" | "ccw" => Rotation::Left,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Rotation::Spawn => "spawn",
            Rotation::Right => "right",
            Rotation::Reverse => "reverse",
            Rotation::Left => "left",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
