//! Deadlock detection: could any single swap produce a match?

use super::Board;
use super::tile::{Pos, TileKind};

/// Swap partners: the eight unit steps around a tile.
pub const SWAP_DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

impl Board {
    /// True if swapping some pair of neighbouring standard tiles would create a match.
    pub fn has_possible_move(&self) -> bool {
        self.find_possible_move().is_some()
    }

    /// First swap, in row-major order, that would create a match.
    ///
    /// The swap is evaluated through a swapped lookup rather than by touching the table,
    /// so the board is left exactly as it was.
    pub fn find_possible_move(&self) -> Option<(Pos, Pos)> {
        let (rows, cols) = (self.rows(), self.cols());
        for a in self.mask().positions() {
            let Some(ka) = self.kind_at(a).filter(|k| !k.is_crown()) else {
                continue;
            };
            for direction in SWAP_DIRECTIONS {
                let Some(b) = a.offset(direction, rows, cols) else {
                    continue;
                };
                let Some(kb) = self.kind_at(b).filter(|k| !k.is_crown()) else {
                    continue;
                };
                let swapped = |pos: Pos| -> Option<TileKind> {
                    if pos == a {
                        Some(kb)
                    } else if pos == b {
                        Some(ka)
                    } else {
                        self.kind_at(pos)
                    }
                };
                if self.matches_through(a, &swapped) || self.matches_through(b, &swapped) {
                    log::trace!("possible move {a} <-> {b}");
                    return Some((a, b));
                }
            }
        }
        None
    }
}
