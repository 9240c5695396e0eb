//! Grid shape mask: which cells exist, and which of them hold crowns.

use super::tile::Pos;
use thiserror::Error;

/// Kind of a grid cell, fixed for the lifetime of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Outside the playable footprint; never holds a tile.
    Void,
    /// Holds standard tiles.
    Normal,
    /// Holds a crown at construction.
    Special,
}

impl TryFrom<u8> for CellKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Void),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Special),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("layout has no cells")]
    Empty,
    #[error("layout row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell value {value} at ({row},{col})")]
    UnknownCell { value: u8, row: usize, col: usize },
    #[error("unknown board glyph {glyph:?} at ({row},{col})")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// Layout of the shipped level: tiles on a checkerboard, crowns on row 7.
pub const DEFAULT_LAYOUT: [[u8; 7]; 9] = [
    [1, 0, 1, 0, 1, 0, 1],
    [0, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 1],
    [0, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 1],
    [0, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 1],
    [0, 2, 0, 2, 0, 2, 0],
    [1, 0, 1, 0, 1, 0, 1],
];

/// Immutable `rows x cols` table of cell kinds, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMask {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
}

impl ShapeMask {
    /// Build from a table of `0 = Void`, `1 = Normal`, `2 = Special`.
    pub fn from_rows<R: AsRef<[u8]>>(table: &[R]) -> Result<Self, MaskError> {
        let kinds = table
            .iter()
            .enumerate()
            .map(|(row, values)| {
                values
                    .as_ref()
                    .iter()
                    .enumerate()
                    .map(|(col, &value)| {
                        CellKind::try_from(value)
                            .map_err(|value| MaskError::UnknownCell { value, row, col })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_kinds(kinds)
    }

    pub(crate) fn from_kinds(table: Vec<Vec<CellKind>>) -> Result<Self, MaskError> {
        let rows = table.len();
        let cols = table.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(MaskError::Empty);
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for (row, kinds) in table.into_iter().enumerate() {
            if kinds.len() != cols {
                return Err(MaskError::Ragged {
                    row,
                    expected: cols,
                    found: kinds.len(),
                });
            }
            cells.extend(kinds);
        }
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Kind of the cell at `pos`; out-of-range positions read as `Void`.
    #[inline]
    pub fn kind(&self, pos: Pos) -> CellKind {
        if self.contains(pos) {
            self.cells[self.index(pos)]
        } else {
            CellKind::Void
        }
    }

    #[inline]
    pub fn is_playable(&self, pos: Pos) -> bool {
        self.kind(pos) != CellKind::Void
    }

    /// Every grid position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Pos::new(row, col)))
    }

    pub fn playable_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&pos| self.is_playable(pos))
    }

    #[inline]
    pub(crate) fn index(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }
}

impl Default for ShapeMask {
    fn default() -> Self {
        Self::from_rows(&DEFAULT_LAYOUT).expect("built-in layout is valid")
    }
}
