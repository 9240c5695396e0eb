//! Removal of matched tiles and crown activation.

use super::Board;
use super::events::Presenter;
use super::matching::MatchSet;
use super::tile::{Pos, TileId};
use crate::session::Scorekeeper;

/// Cells around a removed tile whose crowns fire: two rows up/down and the four diagonals.
pub const CROWN_NEIGHBOURS: [(isize, isize); 6] =
    [(-2, 0), (2, 0), (-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Result of one removal pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Standard tiles destroyed.
    pub removed: u32,
    /// Crowns that fired, once each, in discovery order.
    pub activated: Vec<(TileId, Pos)>,
}

impl RemovalReport {
    #[inline]
    pub fn activations(&self) -> u32 {
        self.activated.len() as u32
    }
}

impl Board {
    /// Destroy every matched tile and fire each crown next to one of them exactly once.
    /// The scorekeeper hears the activation count, and only when it is non-zero.
    pub fn remove_matches(
        &mut self,
        matches: &MatchSet,
        scorer: &mut dyn Scorekeeper,
        presenter: &mut dyn Presenter,
    ) -> RemovalReport {
        let (rows, cols) = (self.rows(), self.cols());
        let mut crowns: Vec<Pos> = Vec::new();
        for pos in matches.iter() {
            for offset in CROWN_NEIGHBOURS {
                let Some(neighbour) = pos.offset(offset, rows, cols) else {
                    continue;
                };
                let is_crown = self.kind_at(neighbour).is_some_and(|k| k.is_crown());
                if is_crown && !crowns.contains(&neighbour) {
                    crowns.push(neighbour);
                }
            }
        }

        let mut report = RemovalReport::default();
        for pos in matches.iter() {
            if self.kind_at(pos).is_some_and(|k| k.is_crown()) {
                continue;
            }
            if let Some(tile) = self.take(pos) {
                presenter.animate_removal(tile.id, pos);
                report.removed += 1;
            }
        }

        for pos in crowns {
            if let Some(crown) = self.get(pos) {
                presenter.animate_activation(crown.id, pos);
                report.activated.push((crown.id, pos));
            }
        }
        if !report.activated.is_empty() {
            log::debug!("{} crown(s) activated", report.activated.len());
            scorer.on_special_activated(report.activations());
        }
        log::debug!("removed {} tile(s)", report.removed);
        report
    }
}
