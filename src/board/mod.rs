//! Board state: the tile table over a shape mask, plus the operations that mutate it.
//!
//! Submodules each add one concern to [`Board`]: match detection, removal, gravity and
//! refill, reachability and shuffling.

mod events;
mod gravity;
mod mask;
mod matching;
mod reachability;
mod removal;
mod shuffle;
mod tile;

pub use events::{
    BoardEvent, DROP_IN_DURATION, FALL_DURATION, Presenter, SHUFFLE_MOVE_DURATION, SWAP_DURATION,
};
pub use mask::{CellKind, DEFAULT_LAYOUT, MaskError, ShapeMask};
pub use matching::{Geometry, MatchSet};
pub use reachability::SWAP_DIRECTIONS;
pub use removal::{CROWN_NEIGHBOURS, RemovalReport};
pub use tile::{Pos, Tile, TileId, TileKind};

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error("tile kinds must be in 3..=6, got {0}")]
    Kinds(u8),
}

fn check_kinds(kinds: u8) -> Result<u8, BoardError> {
    if (TileKind::MIN_STANDARD..=TileKind::MAX_STANDARD).contains(&kinds) {
        Ok(kinds)
    } else {
        Err(BoardError::Kinds(kinds))
    }
}

/// Mutable tile table. `cells[mask.index(pos)]` holds the tile at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    mask: ShapeMask,
    cells: Vec<Option<Tile>>,
    kinds: u8,
    next_id: u32,
}

impl Board {
    /// Populate every playable cell at random, re-rolling the whole board until no match
    /// is present. Crown cells get crowns.
    pub fn new<R: Rng + ?Sized>(
        mask: ShapeMask,
        kinds: u8,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        let mut board = Self::empty(mask, check_kinds(kinds)?);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            board.populate(rng);
            let matches = board.find_matches();
            if matches.is_empty() {
                break;
            }
            log::debug!(
                "initial layout has {} matched tiles, regenerating",
                matches.len()
            );
        }
        log::info!(
            "board {}x{} ready after {} attempt(s)",
            board.rows(),
            board.cols(),
            attempts
        );
        Ok(board)
    }

    fn empty(mask: ShapeMask, kinds: u8) -> Self {
        let cells = vec![None; mask.rows() * mask.cols()];
        Self {
            mask,
            cells,
            kinds,
            next_id: 0,
        }
    }

    fn populate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cells.fill(None);
        let slots: Vec<(Pos, CellKind)> = self
            .mask
            .playable_positions()
            .map(|pos| (pos, self.mask.kind(pos)))
            .collect();
        for (pos, cell) in slots {
            let kind = match cell {
                CellKind::Special => TileKind::CROWN,
                _ => TileKind::random(rng, self.kinds),
            };
            self.spawn(kind, pos);
        }
    }

    /// Build a board from a picture, one string per row:
    /// `0`-`5` standard tile, `*` crown (Special cell), `_` empty Normal cell,
    /// `.` Void. Whitespace is ignored.
    pub fn from_picture<S: AsRef<str>>(kinds: u8, rows: &[S]) -> Result<Self, BoardError> {
        let kinds = check_kinds(kinds)?;
        let mut table = Vec::with_capacity(rows.len());
        let mut tiles = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let mut cells = Vec::new();
            for (col, glyph) in line
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .enumerate()
            {
                let pos = Pos::new(row, col);
                let cell = match glyph {
                    '.' => CellKind::Void,
                    '_' => CellKind::Normal,
                    '*' => {
                        tiles.push((pos, TileKind::CROWN));
                        CellKind::Special
                    }
                    '0'..='5' => {
                        tiles.push((pos, TileKind::standard(glyph as u8 - b'0')));
                        CellKind::Normal
                    }
                    glyph => return Err(MaskError::UnknownGlyph { glyph, row, col }.into()),
                };
                cells.push(cell);
            }
            table.push(cells);
        }
        let mut board = Self::empty(ShapeMask::from_kinds(table)?, kinds);
        for (pos, kind) in tiles {
            board.spawn(kind, pos);
        }
        Ok(board)
    }

    /// Inverse of [`Board::from_picture`].
    pub fn picture(&self) -> Vec<String> {
        (0..self.rows())
            .map(|row| {
                (0..self.cols())
                    .map(|col| {
                        let pos = Pos::new(row, col);
                        match (self.mask.kind(pos), self.kind_at(pos)) {
                            (CellKind::Void, _) => '.',
                            (_, None) => '_',
                            (_, Some(kind)) if kind.is_crown() => '*',
                            (_, Some(kind)) => char::from(b'0' + kind.index()),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn mask(&self) -> &ShapeMask {
        &self.mask
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.mask.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.mask.cols()
    }

    /// Number of standard kinds refills draw from.
    #[inline]
    pub fn kinds(&self) -> u8 {
        self.kinds
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        if !self.mask.contains(pos) {
            return None;
        }
        self.cells[self.mask.index(pos)].as_ref()
    }

    #[inline]
    pub fn kind_at(&self, pos: Pos) -> Option<TileKind> {
        self.get(pos).map(|tile| tile.kind)
    }

    /// Live tiles, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    /// True when every playable cell holds a tile.
    pub fn is_full(&self) -> bool {
        self.mask
            .playable_positions()
            .all(|pos| self.get(pos).is_some())
    }

    /// Every tile sits in a playable cell and knows where it is.
    pub fn is_consistent(&self) -> bool {
        self.mask.positions().all(|pos| match self.get(pos) {
            Some(tile) => tile.pos == pos && self.mask.is_playable(pos),
            None => true,
        })
    }

    /// Exchange two tiles, keeping their stored positions in sync. Positions outside
    /// the grid leave the board untouched.
    pub fn swap(&mut self, a: Pos, b: Pos, presenter: &mut dyn Presenter) {
        if !self.mask.contains(a) || !self.mask.contains(b) {
            log::warn!("ignoring swap {} <-> {} outside the board", a, b);
            return;
        }
        let (ia, ib) = (self.mask.index(a), self.mask.index(b));
        self.cells.swap(ia, ib);
        for (at, from) in [(a, b), (b, a)] {
            if let Some(tile) = self.cells[self.mask.index(at)].as_mut() {
                tile.pos = at;
                presenter.animate_move(tile.id, from, at, SWAP_DURATION);
            }
        }
    }

    pub(crate) fn take(&mut self, pos: Pos) -> Option<Tile> {
        let index = self.mask.index(pos);
        self.cells[index].take()
    }

    pub(crate) fn place(&mut self, mut tile: Tile, pos: Pos) {
        debug_assert!(self.mask.is_playable(pos));
        let index = self.mask.index(pos);
        debug_assert!(self.cells[index].is_none());
        tile.pos = pos;
        self.cells[index] = Some(tile);
    }

    pub(crate) fn spawn(&mut self, kind: TileKind, pos: Pos) -> TileId {
        let id = TileId::new(self.next_id);
        self.next_id += 1;
        self.place(Tile { id, kind, pos }, pos);
        id
    }
}
