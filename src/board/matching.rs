//! Match detection over three fixed three-cell windows.
//!
//! The windows test type equality only; their cells are not neighbours of one another.
//! The vertical window skips a row on purpose: in the shipped layout tiles sit on
//! alternate rows, so `(0,0),(2,0),(4,0)` is the visually vertical run.

use super::Board;
use super::tile::{Pos, TileKind};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    DiagonalDownRight,
    DiagonalDownLeft,
    VerticalSkip,
}

impl Geometry {
    pub const ALL: [Self; 3] = [
        Self::DiagonalDownRight,
        Self::DiagonalDownLeft,
        Self::VerticalSkip,
    ];

    /// Window cells relative to the anchor (first cell).
    pub const fn offsets(self) -> [(isize, isize); 3] {
        match self {
            Self::DiagonalDownRight => [(0, 0), (1, 1), (2, 2)],
            Self::DiagonalDownLeft => [(0, 0), (1, -1), (2, -2)],
            Self::VerticalSkip => [(0, 0), (2, 0), (4, 0)],
        }
    }

    pub const fn arrow(self) -> char {
        match self {
            Self::DiagonalDownRight => '↘',
            Self::DiagonalDownLeft => '↙',
            Self::VerticalSkip => '↓',
        }
    }
}

/// Positions of every tile matched in one detection pass, deduplicated and row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet(BTreeSet<Pos>);

impl MatchSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.0.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Pos> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Board {
    /// Scan the whole grid with every geometry. Pure; safe to call repeatedly.
    pub fn find_matches(&self) -> MatchSet {
        let kind_at = |pos: Pos| self.kind_at(pos);
        let mut matched = BTreeSet::new();
        for anchor in self.mask().positions() {
            for geometry in Geometry::ALL {
                let Some(cells) = self.window(anchor, geometry) else {
                    continue;
                };
                if is_run(&cells, &kind_at) {
                    log::trace!(
                        "match {} kind {:?} at {} {} {}",
                        geometry.arrow(),
                        self.kind_at(anchor),
                        cells[0],
                        cells[1],
                        cells[2]
                    );
                    matched.extend(cells);
                }
            }
        }
        MatchSet(matched)
    }

    /// Whether any window containing `pos` (in any slot) is a run, reading kinds
    /// through `kind_at` instead of the table.
    pub(crate) fn matches_through<F>(&self, pos: Pos, kind_at: &F) -> bool
    where
        F: Fn(Pos) -> Option<TileKind>,
    {
        Geometry::ALL.into_iter().any(|geometry| {
            geometry.offsets().into_iter().any(|(dr, dc)| {
                pos.offset((-dr, -dc), self.rows(), self.cols())
                    .and_then(|anchor| self.window(anchor, geometry))
                    .is_some_and(|cells| is_run(&cells, kind_at))
            })
        })
    }

    /// The three cells of `geometry` anchored at `anchor`, if all are on the grid.
    fn window(&self, anchor: Pos, geometry: Geometry) -> Option<[Pos; 3]> {
        let mut cells = [anchor; 3];
        for (cell, offset) in cells.iter_mut().zip(geometry.offsets()) {
            *cell = anchor.offset(offset, self.rows(), self.cols())?;
        }
        Some(cells)
    }
}

fn is_run<F>(cells: &[Pos; 3], kind_at: &F) -> bool
where
    F: Fn(Pos) -> Option<TileKind>,
{
    let Some(first) = kind_at(cells[0]) else {
        return false;
    };
    !first.is_crown() && cells[1..].iter().all(|&pos| kind_at(pos) == Some(first))
}
