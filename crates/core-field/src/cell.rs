use crate::{FIELD_CELLS, FIELD_HEIGHT, FIELD_WIDTH, FieldError};

/// Which plane of the field a cell lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellType {
    /// Playfield cell, indexed `y * FIELD_WIDTH + x`.
    Block,
    /// Sent (garbage) line cell, indexed by `x`.
    SentBlock,
}

/// Range-checked address of a single cell.
///
/// Fields are private so every `CellKey` in circulation is valid, which lets
/// `Field::cell` and `Field::set_cell` stay infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    kind: CellType,
    index: usize,
}

impl CellKey {
    pub fn new(kind: CellType, index: usize) -> Result<Self, FieldError> {
        let len = match kind {
            CellType::Block => FIELD_CELLS,
            CellType::SentBlock => FIELD_WIDTH,
        };
        if index >= len {
            return Err(FieldError::OutOfRange { index, len });
        }
        Ok(Self { kind, index })
    }

    pub fn block(index: usize) -> Result<Self, FieldError> {
        Self::new(CellType::Block, index)
    }

    pub fn sent(x: usize) -> Result<Self, FieldError> {
        Self::new(CellType::SentBlock, x)
    }

    /// Playfield cell at `(x, y)`.
    pub fn at(x: usize, y: usize) -> Result<Self, FieldError> {
        if x >= FIELD_WIDTH || y >= FIELD_HEIGHT {
            return Err(FieldError::OutOfRange {
                index: y.saturating_mul(FIELD_WIDTH).saturating_add(x),
                len: FIELD_CELLS,
            });
        }
        Self::block(y * FIELD_WIDTH + x)
    }

    pub fn kind(&self) -> CellType {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Every key of both planes, playfield first.
    pub fn all() -> impl Iterator<Item = CellKey> {
        (0..FIELD_CELLS)
            .map(|index| CellKey {
                kind: CellType::Block,
                index,
            })
            .chain((0..FIELD_WIDTH).map(|index| CellKey {
                kind: CellType::SentBlock,
                index,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_check_range() {
        assert!(CellKey::block(FIELD_CELLS - 1).is_ok());
        assert!(CellKey::block(FIELD_CELLS).is_err());
        assert!(CellKey::sent(FIELD_WIDTH).is_err());
        assert!(CellKey::at(10, 0).is_err());
        assert!(CellKey::at(0, 23).is_err());
        assert_eq!(CellKey::at(5, 1).unwrap().index(), 15);
    }

    #[test]
    fn all_covers_both_planes() {
        assert_eq!(CellKey::all().count(), FIELD_CELLS + FIELD_WIDTH);
        assert_eq!(
            CellKey::all().last().map(|k| k.kind()),
            Some(CellType::SentBlock)
        );
    }
}
