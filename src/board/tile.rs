//! Tiles, tile kinds and grid coordinates.

use rand::Rng;
use std::fmt;

/// Grid coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shift by `(dr, dc)`; `None` if the result leaves a `rows x cols` grid.
    #[inline]
    pub fn offset(self, (dr, dc): (isize, isize), rows: usize, cols: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Self { row, col })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Matching category of a tile. Standard kinds are `0..kinds`; `CROWN` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKind(u8);

impl TileKind {
    /// Fewest standard kinds a board can be built with. Below this a match-free
    /// layout may not exist.
    pub const MIN_STANDARD: u8 = 3;
    /// Upper bound on the number of standard kinds (one per theme colour).
    pub const MAX_STANDARD: u8 = 6;

    /// The special "crown" kind. Never part of a match, never moved by gravity or shuffles.
    pub const CROWN: Self = Self(Self::MAX_STANDARD);

    pub const fn standard(index: u8) -> Self {
        debug_assert!(index < Self::MAX_STANDARD);
        Self(index)
    }

    /// Uniformly random standard kind out of the first `kinds`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, kinds: u8) -> Self {
        Self(rng.random_range(0..kinds.min(Self::MAX_STANDARD)))
    }

    #[inline]
    pub const fn is_crown(self) -> bool {
        self.0 == Self::CROWN.0
    }

    /// Colour/glyph index (0..6 for standard kinds, 6 for the crown).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Identity of a tile instance; unique for the lifetime of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(u32);

impl TileId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Always equal to the cell holding this tile.
    pub pos: Pos,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_offset_stays_in_grid() {
        let p = Pos::new(1, 1);
        assert_eq!(p.offset((-1, -1), 3, 3), Some(Pos::new(0, 0)));
        assert_eq!(p.offset((1, 1), 3, 3), Some(Pos::new(2, 2)));
        assert_eq!(p.offset((-2, 0), 3, 3), None);
        assert_eq!(p.offset((0, 2), 3, 3), None);
    }

    #[test]
    fn test_random_kind_is_never_crown() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let kind = TileKind::random(&mut rng, 6);
            assert!(!kind.is_crown());
            assert!(kind.index() < 6);
        }
    }

    #[test]
    fn test_random_kind_respects_kind_count() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!((0..200).all(|_| TileKind::random(&mut rng, 3).index() < 3));
    }
}
