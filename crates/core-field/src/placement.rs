use crate::{FIELD_HEIGHT, FIELD_WIDTH, Field, Piece, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("{0:?} is not a tetromino")]
    NotAMino(Piece),
    #[error("{piece:?} {rotation} at ({x}, {y}) leaves the playfield")]
    OutOfField {
        piece: Piece,
        rotation: Rotation,
        x: i32,
        y: i32,
    },
}

/// A tetromino at a rotation centred on `(x, y)`.
///
/// Construction guarantees that all four blocks land inside the playfield, so
/// `indices` and `Field::put` never need to range-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    piece: Piece,
    rotation: Rotation,
    x: i32,
    y: i32,
}

impl Placement {
    pub fn new(piece: Piece, rotation: Rotation, x: i32, y: i32) -> Result<Self, PlacementError> {
        if !piece.is_mino() {
            return Err(PlacementError::NotAMino(piece));
        }
        let placement = Self {
            piece,
            rotation,
            x,
            y,
        };
        let inside = placement.blocks().iter().all(|&(bx, by)| {
            (0..FIELD_WIDTH as i32).contains(&bx) && (0..FIELD_HEIGHT as i32).contains(&by)
        });
        if !inside {
            return Err(PlacementError::OutOfField {
                piece,
                rotation,
                x,
                y,
            });
        }
        Ok(placement)
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }
    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Absolute `(x, y)` of the four blocks.
    pub fn blocks(&self) -> [(i32, i32); 4] {
        offsets(self.piece, self.rotation).map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Linear playfield indices of the four blocks.
    pub fn indices(&self) -> [usize; 4] {
        self.blocks()
            .map(|(x, y)| Field::index_of(x as usize, y as usize))
    }
}

/// Block offsets relative to the rotation centre.
pub(crate) fn offsets(piece: Piece, rotation: Rotation) -> [(i32, i32); 4] {
    let spawn = match piece {
        Piece::I => [(0, 0), (-1, 0), (1, 0), (2, 0)],
        Piece::T => [(0, 0), (-1, 0), (1, 0), (0, 1)],
        Piece::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
        Piece::L => [(0, 0), (-1, 0), (1, 0), (1, 1)],
        Piece::J => [(0, 0), (-1, 0), (1, 0), (-1, 1)],
        Piece::S => [(0, 0), (-1, 0), (0, 1), (1, 1)],
        Piece::Z => [(0, 0), (1, 0), (0, 1), (-1, 1)],
        Piece::Empty | Piece::Gray => return [(0, 0); 4],
    };
    spawn.map(|(x, y)| match rotation {
        Rotation::Spawn => (x, y),
        Rotation::Right => (y, -x),
        Rotation::Reverse => (-x, -y),
        Rotation::Left => (-y, x),
    })
}
