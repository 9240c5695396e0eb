//! Board engine for a diagonal tile-matching puzzle.
//!
//! [`board`] holds the tile table and every board operation, [`game`] drives a turn
//! through them step by step, and [`session`] keeps the crown and move counters.

pub mod board;
pub mod game;
pub mod session;

pub use board::{Board, BoardError, BoardEvent, Pos, Presenter, ShapeMask, TileKind};
pub use game::{Game, GameConfig, SwapRejected, TurnSummary};
pub use session::{Outcome, Scorekeeper, Session};
