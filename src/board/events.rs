//! Presentation hooks fired by board mutations.
//!
//! The board never waits on these; durations are hints for the host's animations.

use super::tile::{Pos, TileId};
use std::time::Duration;

/// Swap of two tiles (and its revert).
pub const SWAP_DURATION: Duration = Duration::from_millis(200);
/// One tile falling into a hole below it.
pub const FALL_DURATION: Duration = Duration::from_millis(150);
/// A refilled tile dropping in from above the grid.
pub const DROP_IN_DURATION: Duration = Duration::from_millis(250);
/// A tile sliding to its shuffled cell.
pub const SHUFFLE_MOVE_DURATION: Duration = Duration::from_millis(150);

/// Receiver for animation requests.
pub trait Presenter {
    fn animate_move(&mut self, id: TileId, from: Pos, to: Pos, duration: Duration);
    fn animate_removal(&mut self, id: TileId, at: Pos);
    fn animate_spawn(&mut self, id: TileId, at: Pos);
    /// A crown next to a removed tile fired.
    fn animate_activation(&mut self, id: TileId, at: Pos);
}

/// Recorded form of a [`Presenter`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    Moved {
        id: TileId,
        from: Pos,
        to: Pos,
        duration: Duration,
    },
    Removed {
        id: TileId,
        at: Pos,
    },
    Spawned {
        id: TileId,
        at: Pos,
    },
    Activated {
        id: TileId,
        at: Pos,
    },
}

impl Presenter for Vec<BoardEvent> {
    fn animate_move(&mut self, id: TileId, from: Pos, to: Pos, duration: Duration) {
        self.push(BoardEvent::Moved {
            id,
            from,
            to,
            duration,
        });
    }

    fn animate_removal(&mut self, id: TileId, at: Pos) {
        self.push(BoardEvent::Removed { id, at });
    }

    fn animate_spawn(&mut self, id: TileId, at: Pos) {
        self.push(BoardEvent::Spawned { id, at });
    }

    fn animate_activation(&mut self, id: TileId, at: Pos) {
        self.push(BoardEvent::Activated { id, at });
    }
}

/// Headless: drop every request.
impl Presenter for () {
    fn animate_move(&mut self, _: TileId, _: Pos, _: Pos, _: Duration) {}
    fn animate_removal(&mut self, _: TileId, _: Pos) {}
    fn animate_spawn(&mut self, _: TileId, _: Pos) {}
    fn animate_activation(&mut self, _: TileId, _: Pos) {}
}
