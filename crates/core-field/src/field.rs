//! Fixed-size board grid.
//!
//! The playfield is stored row-major from the bottom row upward so that a
//! linear index is `y * FIELD_WIDTH + x`. The sent line is kept beside it
//! rather than as an extra row: nothing but `rise_garbage` ever moves cells
//! between the two planes.

use std::fmt;

use crate::{CellKey, CellType, FIELD_CELLS, FIELD_HEIGHT, FIELD_WIDTH, Piece, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("cell index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Direction for [`Field::shift_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    /// Rows move up; the top `count` rows are discarded and the bottom is filled.
    Up,
    /// Rows move down; the bottom `count` rows are discarded and the top is filled.
    Down,
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Field {
    cells: Vec<Piece>,
    sent: [Piece; FIELD_WIDTH],
}

impl Default for Field {
    fn default() -> Self {
        Self::empty()
    }
}

impl Field {
    pub fn empty() -> Self {
        Self {
            cells: vec![Piece::Empty; FIELD_CELLS],
            sent: [Piece::Empty; FIELD_WIDTH],
        }
    }

    /// Linear playfield index of `(x, y)`. Callers own the range contract.
    pub const fn index_of(x: usize, y: usize) -> usize {
        y * FIELD_WIDTH + x
    }

    pub fn get(&self, index: usize) -> Result<Piece, FieldError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(FieldError::OutOfRange {
                index,
                len: FIELD_CELLS,
            })
    }

    pub fn set(&mut self, index: usize, value: Piece) -> Result<(), FieldError> {
        let slot = self.cells.get_mut(index).ok_or(FieldError::OutOfRange {
            index,
            len: FIELD_CELLS,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn get_sent(&self, x: usize) -> Result<Piece, FieldError> {
        self.sent.get(x).copied().ok_or(FieldError::OutOfRange {
            index: x,
            len: FIELD_WIDTH,
        })
    }

    pub fn set_sent(&mut self, x: usize, value: Piece) -> Result<(), FieldError> {
        let slot = self.sent.get_mut(x).ok_or(FieldError::OutOfRange {
            index: x,
            len: FIELD_WIDTH,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn cell(&self, key: CellKey) -> Piece {
        match key.kind() {
            CellType::Block => self.cells[key.index()],
            CellType::SentBlock => self.sent[key.index()],
        }
    }

    pub fn set_cell(&mut self, key: CellKey, value: Piece) {
        match key.kind() {
            CellType::Block => self.cells[key.index()] = value,
            CellType::SentBlock => self.sent[key.index()] = value,
        }
    }

    pub fn cells(&self) -> &[Piece] {
        &self.cells
    }

    pub fn sent_line(&self) -> &[Piece] {
        &self.sent
    }

    /// True when neither the playfield nor the sent line holds a block.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().chain(self.sent.iter()).all(|p| *p == Piece::Empty)
    }

    /// Shift the playfield by `count` rows, discarding rows that fall off the
    /// edge in `direction` and filling vacated rows with `fill`.
    pub fn shift_rows(&mut self, count: usize, direction: ShiftDirection, fill: Piece) {
        let count = count.min(FIELD_HEIGHT);
        if count == 0 {
            return;
        }
        let span = count * FIELD_WIDTH;
        match direction {
            ShiftDirection::Down => {
                self.cells.drain(..span);
                self.cells.resize(FIELD_CELLS, fill);
            }
            ShiftDirection::Up => {
                self.cells.truncate(FIELD_CELLS - span);
                self.cells.splice(0..0, std::iter::repeat_n(fill, span));
            }
        }
    }

    /// Remove every full playfield row and let the rows above fall. Gray
    /// blocks count as filled. Returns the number of cleared rows.
    pub fn clear_lines(&mut self) -> usize {
        let mut kept = Vec::with_capacity(FIELD_CELLS);
        let mut cleared = 0;
        for row in self.cells.chunks(FIELD_WIDTH) {
            if row.iter().all(|p| *p != Piece::Empty) {
                cleared += 1;
            } else {
                kept.extend_from_slice(row);
            }
        }
        if cleared > 0 {
            kept.resize(FIELD_CELLS, Piece::Empty);
            self.cells = kept;
        }
        cleared
    }

    /// Push the sent line in as the new bottom row; the top row is lost.
    pub fn rise_garbage(&mut self) {
        self.shift_rows(1, ShiftDirection::Up, Piece::Empty);
        self.cells[..FIELD_WIDTH].copy_from_slice(&self.sent);
        self.sent = [Piece::Empty; FIELD_WIDTH];
    }

    /// Mirror every playfield row horizontally. The sent line is untouched.
    pub fn mirror(&mut self) {
        for row in self.cells.chunks_mut(FIELD_WIDTH) {
            row.reverse();
        }
    }

    /// Write the four blocks of `placement` with the placement's piece.
    pub fn put(&mut self, placement: &Placement) {
        for index in placement.indices() {
            self.cells[index] = placement.piece();
        }
    }

    fn highest_occupied_row(&self) -> Option<usize> {
        self.cells
            .chunks(FIELD_WIDTH)
            .rposition(|row| row.iter().any(|p| *p != Piece::Empty))
    }
}

impl fmt::Display for Field {
    /// Rows from the highest occupied row down to `y = 0`, a rule, then the
    /// sent line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top = self.highest_occupied_row().unwrap_or(0);
        for y in (0..=top).rev() {
            let row = &self.cells[y * FIELD_WIDTH..(y + 1) * FIELD_WIDTH];
            for piece in row {
                write!(f, "{}", piece.letter())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", "-".repeat(FIELD_WIDTH))?;
        for piece in &self.sent {
            write!(f, "{}", piece.letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Field")?;
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rotation;
    use pretty_assertions::assert_eq;

    fn fill_row(field: &mut Field, y: usize, piece: Piece) {
        for x in 0..FIELD_WIDTH {
            field.set(Field::index_of(x, y), piece).unwrap();
        }
    }

    #[test]
    fn get_and_set_check_range() {
        let mut field = Field::empty();
        field.set(Field::index_of(5, 0), Piece::S).unwrap();
        assert_eq!(field.get(5).unwrap(), Piece::S);
        assert_eq!(
            field.get(FIELD_CELLS),
            Err(FieldError::OutOfRange {
                index: FIELD_CELLS,
                len: FIELD_CELLS
            })
        );
        assert!(field.set(FIELD_CELLS + 3, Piece::I).is_err());
        assert!(field.set_sent(FIELD_WIDTH, Piece::Gray).is_err());
    }

    #[test]
    fn keyed_access_reaches_both_planes() {
        let mut field = Field::empty();
        field.set_cell(CellKey::at(2, 3).unwrap(), Piece::Z);
        field.set_cell(CellKey::sent(4).unwrap(), Piece::Gray);
        assert_eq!(field.get(Field::index_of(2, 3)).unwrap(), Piece::Z);
        assert_eq!(field.get_sent(4).unwrap(), Piece::Gray);
        assert_eq!(field.cell(CellKey::sent(4).unwrap()), Piece::Gray);
    }

    #[test]
    fn clone_is_independent() {
        let mut a = Field::empty();
        let b = a.clone();
        a.set(0, Piece::T).unwrap();
        assert_eq!(b.get(0).unwrap(), Piece::Empty);
        assert!(b.is_empty());
        assert!(!a.is_empty());
    }

    #[test]
    fn shift_down_discards_bottom_rows() {
        let mut field = Field::empty();
        fill_row(&mut field, 0, Piece::Gray);
        field.set(Field::index_of(3, 1), Piece::T).unwrap();
        field.shift_rows(1, ShiftDirection::Down, Piece::Empty);
        assert_eq!(field.get(Field::index_of(3, 0)).unwrap(), Piece::T);
        assert_eq!(field.get(Field::index_of(0, 0)).unwrap(), Piece::Empty);
    }

    #[test]
    fn shift_up_fills_bottom() {
        let mut field = Field::empty();
        field.set(Field::index_of(2, 0), Piece::J).unwrap();
        field.shift_rows(2, ShiftDirection::Up, Piece::Gray);
        assert_eq!(field.get(Field::index_of(2, 2)).unwrap(), Piece::J);
        assert_eq!(field.get(Field::index_of(2, 0)).unwrap(), Piece::Gray);
        assert_eq!(field.get(Field::index_of(9, 1)).unwrap(), Piece::Gray);
        assert_eq!(field.cells().len(), FIELD_CELLS);
    }

    #[test]
    fn clear_lines_drops_full_rows_including_gray() {
        let mut field = Field::empty();
        fill_row(&mut field, 0, Piece::Gray);
        fill_row(&mut field, 2, Piece::I);
        field.set(Field::index_of(4, 1), Piece::O).unwrap();
        field.set(Field::index_of(4, 3), Piece::Z).unwrap();
        assert_eq!(field.clear_lines(), 2);
        assert_eq!(field.get(Field::index_of(4, 0)).unwrap(), Piece::O);
        assert_eq!(field.get(Field::index_of(4, 1)).unwrap(), Piece::Z);
        assert_eq!(field.get(Field::index_of(0, 0)).unwrap(), Piece::Empty);
    }

    #[test]
    fn rise_pushes_sent_line_into_bottom_row() {
        let mut field = Field::empty();
        field.set(Field::index_of(0, 0), Piece::L).unwrap();
        for x in 1..FIELD_WIDTH {
            field.set_sent(x, Piece::Gray).unwrap();
        }
        field.rise_garbage();
        assert_eq!(field.get(Field::index_of(0, 1)).unwrap(), Piece::L);
        assert_eq!(field.get(Field::index_of(0, 0)).unwrap(), Piece::Empty);
        assert_eq!(field.get(Field::index_of(9, 0)).unwrap(), Piece::Gray);
        assert!(field.sent_line().iter().all(|p| *p == Piece::Empty));
    }

    #[test]
    fn mirror_reverses_rows() {
        let mut field = Field::empty();
        field.set(Field::index_of(0, 4), Piece::S).unwrap();
        field.set_sent(0, Piece::Gray).unwrap();
        field.mirror();
        assert_eq!(field.get(Field::index_of(9, 4)).unwrap(), Piece::S);
        assert_eq!(field.get_sent(0).unwrap(), Piece::Gray);
    }

    #[test]
    fn put_writes_piece_blocks() {
        let mut field = Field::empty();
        let t = Placement::new(Piece::T, Rotation::Spawn, 4, 0).unwrap();
        field.put(&t);
        for (x, y) in [(3, 0), (4, 0), (5, 0), (4, 1)] {
            assert_eq!(field.get(Field::index_of(x, y)).unwrap(), Piece::T);
        }
    }

    #[test]
    fn display_renders_occupied_rows() {
        let mut field = Field::empty();
        field.set(Field::index_of(0, 1), Piece::I).unwrap();
        field.set_sent(9, Piece::Gray).unwrap();
        let text = field.to_string();
        assert_eq!(
            text,
            "I_________\n__________\n----------\n_________X"
        );
    }
}
