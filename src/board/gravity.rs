//! Gravity and refill.

use super::Board;
use super::events::{FALL_DURATION, Presenter};
use super::tile::{Pos, TileKind};
use rand::Rng;

impl Board {
    /// Let standard tiles fall to fill holes below them, column by column.
    ///
    /// Scans each column bottom-up; every empty playable cell takes the nearest standard
    /// tile above it. Void cells are skipped and crowns stay where they are, so a tile
    /// falls past them. Returns the number of tiles moved.
    pub fn compact(&mut self, presenter: &mut dyn Presenter) -> usize {
        let mut moved = 0;
        for col in 0..self.cols() {
            for row in (0..self.rows()).rev() {
                let hole = Pos::new(row, col);
                if !self.mask().is_playable(hole) || self.get(hole).is_some() {
                    continue;
                }
                let donor = (0..row)
                    .rev()
                    .map(|r| Pos::new(r, col))
                    .find(|&pos| self.kind_at(pos).is_some_and(|k| !k.is_crown()));
                let Some(from) = donor else {
                    continue;
                };
                if let Some(tile) = self.take(from) {
                    let id = tile.id;
                    self.place(tile, hole);
                    presenter.animate_move(id, from, hole, FALL_DURATION);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Spawn a random standard tile into every empty playable cell, row-major.
    /// Returns the number of tiles spawned.
    pub fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R, presenter: &mut dyn Presenter) -> usize {
        let holes: Vec<Pos> = self
            .mask()
            .playable_positions()
            .filter(|&pos| self.get(pos).is_none())
            .collect();
        for &pos in &holes {
            let kind = TileKind::random(rng, self.kinds());
            let id = self.spawn(kind, pos);
            presenter.animate_spawn(id, pos);
        }
        holes.len()
    }
}
