//! Deadlock recovery by reshuffling standard tiles.

use super::Board;
use super::events::{Presenter, SHUFFLE_MOVE_DURATION};
use super::tile::{Pos, Tile, TileId};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

impl Board {
    /// Permute standard tiles over the cells they occupy until the result holds no match.
    ///
    /// Crowns are never collected, so they keep their cells. Kinds are only moved, never
    /// re-rolled. No attempt cap: a match-free permutation exists for any realistic kind
    /// count. Returns the number of attempts.
    pub fn shuffle_until_valid<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        presenter: &mut dyn Presenter,
    ) -> u32 {
        let origins: HashMap<TileId, Pos> = self.tiles().map(|t| (t.id, t.pos)).collect();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            self.shuffle_once(rng);
            let matches = self.find_matches();
            if matches.is_empty() {
                break;
            }
            log::debug!(
                "shuffle attempt {} left {} matched tile(s), reshuffling",
                attempts,
                matches.len()
            );
        }
        log::info!("shuffle complete after {} attempt(s)", attempts);

        for tile in self.tiles() {
            match origins.get(&tile.id) {
                Some(&from) if from != tile.pos => {
                    presenter.animate_move(tile.id, from, tile.pos, SHUFFLE_MOVE_DURATION);
                }
                _ => {}
            }
        }
        attempts
    }

    fn shuffle_once<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let cells: Vec<Pos> = self
            .tiles()
            .filter(|t| !t.kind.is_crown())
            .map(|t| t.pos)
            .collect();
        let mut tiles: Vec<Tile> = cells.iter().filter_map(|&pos| self.take(pos)).collect();
        tiles.shuffle(rng);
        for (tile, pos) in tiles.into_iter().zip(cells) {
            self.place(tile, pos);
        }
    }
}
