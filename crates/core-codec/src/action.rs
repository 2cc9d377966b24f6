//! The three-digit per-page action word: piece, rotation, position and the
//! page flag bits.

use core_field::{Piece, Rotation};

use crate::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Action {
    pub piece: Piece,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    pub rise: bool,
    pub mirror: bool,
    pub colorize: bool,
    pub comment: bool,
    pub lock: bool,
}

fn rotation_value(rotation: Rotation) -> u32 {
    match rotation {
        Rotation::Reverse => 0,
        Rotation::Right => 1,
        Rotation::Spawn => 2,
        Rotation::Left => 3,
    }
}

fn rotation_from_value(value: u32) -> Rotation {
    match value % 4 {
        0 => Rotation::Reverse,
        1 => Rotation::Right,
        2 => Rotation::Spawn,
        _ => Rotation::Left,
    }
}

/// Shift from the rotation centre to the position the format stores. The
/// format keeps its own centre for O, I, S and Z in some rotations.
fn centre_shift(piece: Piece, rotation: Rotation) -> (i32, i32) {
    match (piece, rotation) {
        (Piece::O, Rotation::Left) => (1, -1),
        (Piece::O, Rotation::Reverse) => (1, 0),
        (Piece::O, Rotation::Spawn) => (0, -1),
        (Piece::I, Rotation::Reverse) => (1, 0),
        (Piece::I, Rotation::Left) => (0, -1),
        (Piece::S, Rotation::Spawn) => (0, -1),
        (Piece::S, Rotation::Right) => (-1, 0),
        (Piece::Z, Rotation::Spawn) => (0, -1),
        (Piece::Z, Rotation::Left) => (1, 0),
        _ => (0, 0),
    }
}

/// Wall placements whose stored column would leave `0..10`, rewritten as the
/// rotation covering the same four cells.
fn wall_twin(piece: Piece, rotation: Rotation, x: i32, y: i32) -> (Rotation, i32, i32) {
    match (piece, rotation) {
        (Piece::O, Rotation::Left) if x == 9 => (Rotation::Spawn, x - 1, y),
        (Piece::O, Rotation::Reverse) if x == 9 => (Rotation::Spawn, x - 1, y - 1),
        (Piece::Z, Rotation::Left) if x == 9 => (Rotation::Right, x - 1, y),
        (Piece::S, Rotation::Right) if x == 0 => (Rotation::Left, x + 1, y),
        _ => (rotation, x, y),
    }
}

fn bit(value: &mut u32) -> bool {
    let set = *value % 2 == 1;
    *value /= 2;
    set
}

impl Action {
    pub(crate) fn pack(&self, layout: Layout) -> u32 {
        let (rotation, position) = if self.piece.is_mino() {
            let (rotation, x, y) = wall_twin(self.piece, self.rotation, self.x, self.y);
            let (dx, dy) = centre_shift(self.piece, rotation);
            let position = (layout.top as i32 - (y + dy) - 1) * 10 + x + dx;
            (rotation_value(rotation), position.max(0) as u32)
        } else {
            (0, 0)
        };
        let mut value = u32::from(!self.lock);
        for flag in [self.comment, self.colorize, self.mirror, self.rise] {
            value = value * 2 + u32::from(flag);
        }
        value = value * layout.blocks() + position;
        value = value * 4 + rotation;
        value * 8 + u32::from(self.piece.value())
    }

    pub(crate) fn unpack(mut value: u32, layout: Layout) -> Self {
        let piece = Piece::from_value((value % 8) as u8).unwrap_or(Piece::Empty);
        value /= 8;
        let rotation = rotation_from_value(value);
        value /= 4;
        let position = value % layout.blocks();
        value /= layout.blocks();
        let rise = bit(&mut value);
        let mirror = bit(&mut value);
        let colorize = bit(&mut value);
        let comment = bit(&mut value);
        let lock = !bit(&mut value);

        let (dx, dy) = centre_shift(piece, rotation);
        let x = (position % 10) as i32 - dx;
        let y = layout.top as i32 - (position / 10) as i32 - 1 - dy;
        Self {
            piece,
            rotation,
            x,
            y,
            rise,
            mirror,
            colorize,
            comment,
            lock,
        }
    }
}
