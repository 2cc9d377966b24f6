//! Piece inference: recognise which tetromino four painted cells form.
//!
//! Used by the editor's inference brush, where the user taps four cells and
//! the piece colour is chosen automatically once they form a valid shape.

use crate::placement::offsets;
use crate::{FIELD_CELLS, FIELD_WIDTH, Piece, Placement, Rotation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected 4 cells, got {0}")]
    WrongCount(usize),
    #[error("cell {0} listed twice")]
    Duplicate(usize),
    #[error("cell {0} is outside the playfield")]
    OutOfRange(usize),
    #[error("cells do not form a tetromino")]
    NoMatch,
}

/// Infer the placement covering exactly the four playfield `indices`.
///
/// Shapes are tried in `Piece::MINOS` order and, within a piece, in
/// `Rotation::ALL` order; the first match wins, so symmetric pieces report
/// their earliest equivalent rotation.
pub fn infer_piece(indices: &[usize]) -> Result<Placement, InferenceError> {
    if indices.len() != 4 {
        return Err(InferenceError::WrongCount(indices.len()));
    }
    let mut target = Vec::with_capacity(4);
    for &index in indices {
        if index >= FIELD_CELLS {
            return Err(InferenceError::OutOfRange(index));
        }
        let cell = ((index % FIELD_WIDTH) as i32, (index / FIELD_WIDTH) as i32);
        if target.contains(&cell) {
            return Err(InferenceError::Duplicate(index));
        }
        target.push(cell);
    }
    target.sort_by_key(|&(x, y)| (y, x));

    for piece in Piece::MINOS {
        for rotation in Rotation::ALL {
            let mut shape = offsets(piece, rotation).to_vec();
            shape.sort_by_key(|&(x, y)| (y, x));
            let (dx, dy) = (target[0].0 - shape[0].0, target[0].1 - shape[0].1);
            let matches = shape
                .iter()
                .zip(&target)
                .all(|(&(sx, sy), &(tx, ty))| sx + dx == tx && sy + dy == ty);
            if matches && let Ok(placement) = Placement::new(piece, rotation, dx, dy) {
                return Ok(placement);
            }
        }
    }
    Err(InferenceError::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    fn idx(cells: &[(usize, usize)]) -> Vec<usize> {
        cells.iter().map(|&(x, y)| Field::index_of(x, y)).collect()
    }

    #[test]
    fn infers_s_on_floor() {
        let placement = infer_piece(&idx(&[(7, 0), (8, 0), (8, 1), (9, 1)])).unwrap();
        assert_eq!(placement.piece(), Piece::S);
        let mut covered = placement.indices().to_vec();
        covered.sort();
        let mut expected = idx(&[(7, 0), (8, 0), (8, 1), (9, 1)]);
        expected.sort();
        assert_eq!(covered, expected);
    }

    #[test]
    fn infers_vertical_i() {
        let placement = infer_piece(&idx(&[(0, 0), (0, 1), (0, 2), (0, 3)])).unwrap();
        assert_eq!(placement.piece(), Piece::I);
        assert_eq!(placement.rotation(), Rotation::Right);
    }

    #[test]
    fn infers_each_mino_in_every_rotation() {
        for piece in Piece::MINOS {
            for rotation in Rotation::ALL {
                let source = Placement::new(piece, rotation, 4, 4).unwrap();
                let inferred = infer_piece(&source.indices()).unwrap();
                assert_eq!(inferred.piece(), piece);
                let mut a = inferred.indices().to_vec();
                let mut b = source.indices().to_vec();
                a.sort();
                b.sort();
                assert_eq!(a, b, "{piece:?} {rotation:?}");
            }
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(infer_piece(&[0, 1, 2]), Err(InferenceError::WrongCount(3)));
        assert_eq!(infer_piece(&[0, 1, 1, 2]), Err(InferenceError::Duplicate(1)));
        assert_eq!(
            infer_piece(&[0, 1, 2, FIELD_CELLS]),
            Err(InferenceError::OutOfRange(FIELD_CELLS))
        );
        // Four in a row split across two rows is not a tetromino.
        assert_eq!(
            infer_piece(&idx(&[(0, 0), (1, 0), (5, 1), (6, 1)])),
            Err(InferenceError::NoMatch)
        );
    }

    #[test]
    fn row_wrap_is_not_adjacent() {
        // (9,0) and (0,1) are consecutive indices but not neighbours.
        assert_eq!(
            infer_piece(&[8, 9, 10, 11]),
            Err(InferenceError::NoMatch)
        );
    }
}
