//! Turn controller: swap, cascade resolution, deadlock check and shuffle as a step machine.
//!
//! The host calls [`Game::begin_swap`] when the player commits a swap, then
//! [`Game::advance`] repeatedly, waiting the returned delay between steps so its
//! animations can play. Every step leaves the board consistent.

use crate::board::{
    Board, BoardError, MatchSet, Pos, Presenter, SWAP_DIRECTIONS, SWAP_DURATION, ShapeMask, TileKind,
};
use crate::session::{Scorekeeper, Session};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use thiserror::Error;

/// Pause after matched tiles disappear.
const REMOVAL_PAUSE: Duration = Duration::from_millis(300);
/// Pause after tiles fall and new ones drop in.
const SETTLE_PAUSE: Duration = Duration::from_millis(300);
/// Pause after a shuffle.
const SHUFFLE_PAUSE: Duration = Duration::from_millis(300);
/// Consecutive shuffles one deadlock check may trigger before giving up until next turn.
const MAX_DEADLOCK_SHUFFLES: u32 = 8;

/// Engine settings derived from the command line.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Number of standard tile kinds (3..=6).
    pub kinds: u8,
    /// Crowns to activate to clear the board.
    pub crowns: u32,
    pub moves: u32,
    /// Fixed RNG seed; random (and logged) when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kinds: TileKind::MAX_STANDARD,
            crowns: 15,
            moves: 10,
            seed: None,
        }
    }
}

/// Why a swap request was refused. The host drops these silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapRejected {
    #[error("a turn is still resolving")]
    Busy,
    #[error("the session is over")]
    Finished,
    #[error("cannot swap {0} with itself")]
    SameCell(Pos),
    #[error("{0} is outside the board")]
    OutOfBounds(Pos),
    #[error("{0} holds no tile")]
    Unplayable(Pos),
    #[error("crown at {0} cannot be moved")]
    Crown(Pos),
    #[error("{a} and {b} are not neighbours")]
    NotAdjacent { a: Pos, b: Pos },
}

/// Where a turn is within resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    /// Tiles swapped; next step checks for a match or swaps back.
    Swapping { a: Pos, b: Pos },
    Resolving(ResolveStep),
    DeadlockCheck { shuffles: u32 },
    Shuffling { shuffles: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStep {
    /// Remove these matches; the first removal of a turn also spends the move.
    Remove { matches: MatchSet, charge_move: bool },
    /// Compact and refill.
    Settle,
    /// Look for cascade matches.
    Detect,
}

/// What one turn did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// The swap produced a match (otherwise it was reverted).
    pub matched: bool,
    /// Removal passes, including the first.
    pub cascades: u32,
    pub removed: u32,
    pub activated: u32,
    pub shuffles: u32,
}

pub struct Game {
    board: Board,
    session: Session,
    rng: StdRng,
    seed: u64,
    phase: TurnPhase,
    current: TurnSummary,
    last_turn: Option<TurnSummary>,
}

impl Game {
    pub fn new(config: &GameConfig) -> Result<Self, BoardError> {
        Self::with_mask(ShapeMask::default(), config)
    }

    /// Fails when `config.kinds` is outside 3..=6.
    pub fn with_mask(mask: ShapeMask, config: &GameConfig) -> Result<Self, BoardError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("new game, seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::new(mask, config.kinds, &mut rng)?;
        Ok(Self::from_parts(
            board,
            Session::new(config.crowns, config.moves),
            rng,
            seed,
        ))
    }

    /// Start from a prepared board (used with [`Board::from_picture`]).
    pub fn from_board(board: Board, session: Session, seed: u64) -> Self {
        Self::from_parts(board, session, StdRng::seed_from_u64(seed), seed)
    }

    fn from_parts(board: Board, session: Session, rng: StdRng, seed: u64) -> Self {
        let mut game = Self {
            board,
            session,
            rng,
            seed,
            phase: TurnPhase::Idle,
            current: TurnSummary::default(),
            last_turn: None,
        };
        let mut shuffles = 0;
        while shuffles < MAX_DEADLOCK_SHUFFLES && !game.board.has_possible_move() {
            log::info!("starting layout is deadlocked, shuffling");
            game.board.shuffle_until_valid(&mut game.rng, &mut ());
            shuffles += 1;
        }
        game
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Summary of the most recently completed turn.
    pub fn last_turn(&self) -> Option<TurnSummary> {
        self.last_turn
    }

    /// Matches the next step will remove, if that is what comes next.
    pub fn pending_removal(&self) -> Option<&MatchSet> {
        match &self.phase {
            TurnPhase::Resolving(ResolveStep::Remove { matches, .. }) => Some(matches),
            _ => None,
        }
    }

    /// Swaps are accepted only between turns and before the session ends.
    pub fn accepting_input(&self) -> bool {
        self.phase == TurnPhase::Idle && !self.session.is_finished()
    }

    /// A swap that would produce a match, if any.
    pub fn hint(&self) -> Option<(Pos, Pos)> {
        self.board.find_possible_move()
    }

    /// Validate and perform the player's swap, starting a turn.
    pub fn begin_swap(
        &mut self,
        a: Pos,
        b: Pos,
        presenter: &mut dyn Presenter,
    ) -> Result<(), SwapRejected> {
        if self.phase != TurnPhase::Idle {
            return Err(SwapRejected::Busy);
        }
        if self.session.is_finished() {
            return Err(SwapRejected::Finished);
        }
        if a == b {
            return Err(SwapRejected::SameCell(a));
        }
        for pos in [a, b] {
            if !self.board.mask().contains(pos) {
                return Err(SwapRejected::OutOfBounds(pos));
            }
            match self.board.kind_at(pos) {
                None => return Err(SwapRejected::Unplayable(pos)),
                Some(kind) if kind.is_crown() => return Err(SwapRejected::Crown(pos)),
                Some(_) => {}
            }
        }
        let (rows, cols) = (self.board.rows(), self.board.cols());
        if !SWAP_DIRECTIONS
            .into_iter()
            .any(|direction| a.offset(direction, rows, cols) == Some(b))
        {
            return Err(SwapRejected::NotAdjacent { a, b });
        }

        log::debug!("swap {} <-> {}", a, b);
        self.current = TurnSummary::default();
        self.board.swap(a, b, presenter);
        self.phase = TurnPhase::Swapping { a, b };
        Ok(())
    }

    /// Run one step of the current turn. Returns how long the host should let
    /// animations play before the next call, or `None` when idle.
    pub fn advance(&mut self, presenter: &mut dyn Presenter) -> Option<Duration> {
        match std::mem::replace(&mut self.phase, TurnPhase::Idle) {
            TurnPhase::Idle => None,
            TurnPhase::Swapping { a, b } => {
                let matches = self.board.find_matches();
                if matches.is_empty() {
                    log::debug!("swap {} <-> {} made no match, reverting", a, b);
                    self.board.swap(a, b, presenter);
                    self.finish_turn();
                    return Some(SWAP_DURATION);
                }
                self.current.matched = true;
                self.phase = TurnPhase::Resolving(ResolveStep::Remove {
                    matches,
                    charge_move: true,
                });
                Some(SWAP_DURATION)
            }
            TurnPhase::Resolving(ResolveStep::Remove {
                matches,
                charge_move,
            }) => {
                let report = self
                    .board
                    .remove_matches(&matches, &mut self.session, presenter);
                if charge_move {
                    self.session.on_move_consumed(1);
                }
                self.current.cascades += 1;
                self.current.removed += report.removed;
                self.current.activated += report.activations();
                self.phase = TurnPhase::Resolving(ResolveStep::Settle);
                Some(REMOVAL_PAUSE)
            }
            TurnPhase::Resolving(ResolveStep::Settle) => {
                let fallen = self.board.compact(presenter);
                let spawned = self.board.refill(&mut self.rng, presenter);
                log::trace!("{} tile(s) fell, {} spawned", fallen, spawned);
                self.phase = TurnPhase::Resolving(ResolveStep::Detect);
                Some(SETTLE_PAUSE)
            }
            TurnPhase::Resolving(ResolveStep::Detect) => {
                let matches = self.board.find_matches();
                self.phase = if matches.is_empty() {
                    TurnPhase::DeadlockCheck { shuffles: 0 }
                } else {
                    log::debug!("cascade: {} matched tile(s)", matches.len());
                    TurnPhase::Resolving(ResolveStep::Remove {
                        matches,
                        charge_move: false,
                    })
                };
                Some(Duration::ZERO)
            }
            TurnPhase::DeadlockCheck { shuffles } => {
                if self.board.has_possible_move() {
                    self.finish_turn();
                } else if shuffles >= MAX_DEADLOCK_SHUFFLES {
                    log::warn!("still deadlocked after {} shuffles", shuffles);
                    self.finish_turn();
                } else {
                    log::info!("no possible move left, shuffling");
                    self.phase = TurnPhase::Shuffling { shuffles };
                }
                Some(Duration::ZERO)
            }
            TurnPhase::Shuffling { shuffles } => {
                self.board.shuffle_until_valid(&mut self.rng, presenter);
                self.current.shuffles += 1;
                self.phase = TurnPhase::DeadlockCheck {
                    shuffles: shuffles + 1,
                };
                Some(SHUFFLE_PAUSE)
            }
        }
    }

    /// Swap and resolve the whole turn without pacing.
    pub fn play_turn(
        &mut self,
        a: Pos,
        b: Pos,
        presenter: &mut dyn Presenter,
    ) -> Result<TurnSummary, SwapRejected> {
        self.begin_swap(a, b, presenter)?;
        while self.advance(presenter).is_some() {}
        Ok(self.current)
    }

    fn finish_turn(&mut self) {
        log::info!(
            "turn done: matched={} cascades={} removed={} crowns={} shuffles={}",
            self.current.matched,
            self.current.cascades,
            self.current.removed,
            self.current.activated,
            self.current.shuffles
        );
        self.session.on_turn_resolved();
        self.last_turn = Some(self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardEvent, SHUFFLE_MOVE_DURATION};
    use crate::session::Outcome;

    fn game(rows: &[&str], session: Session) -> Game {
        Game::from_board(Board::from_picture(3, rows).unwrap(), session, 42)
    }

    /// A game whose next step is the end-of-turn deadlock check.
    fn at_deadlock_check(rows: &[&str], seed: u64) -> Game {
        Game {
            board: Board::from_picture(3, rows).unwrap(),
            session: Session::new(5, 5),
            rng: StdRng::seed_from_u64(seed),
            seed,
            phase: TurnPhase::DeadlockCheck { shuffles: 0 },
            current: TurnSummary::default(),
            last_turn: None,
        }
    }

    fn sorted_kinds(board: &Board) -> Vec<TileKind> {
        let mut kinds: Vec<TileKind> = board.tiles().map(|t| t.kind).collect();
        kinds.sort();
        kinds
    }

    #[test]
    fn test_new_game_is_idle_and_match_free() {
        let game = Game::new(&GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        })
        .unwrap();
        assert!(game.accepting_input());
        assert!(game.board().find_matches().is_empty());
        assert!(game.board().is_full());
    }

    #[test]
    fn test_non_matching_swap_reverts() {
        let mut game = game(&["012", "210", "120"], Session::new(5, 5));
        let before = game.board().clone();
        let mut events = Vec::new();
        let summary = game
            .play_turn(Pos::new(0, 0), Pos::new(0, 1), &mut events)
            .unwrap();
        assert!(!summary.matched);
        assert_eq!(game.board(), &before);
        assert_eq!(game.session().moves_left(), 5);
        assert_eq!(events.len(), 4);
        assert!(game.accepting_input());
    }

    #[test]
    fn test_matching_swap_resolves_and_costs_one_move() {
        // Swapping (1,1) and (1,2) puts a 0 on the main diagonal.
        let mut game = game(&["012", "210", "120"], Session::new(5, 5));
        let summary = game
            .play_turn(Pos::new(1, 1), Pos::new(1, 2), &mut ())
            .unwrap();
        assert!(summary.matched);
        assert!(summary.cascades >= 1);
        assert!(summary.removed >= 3);
        assert_eq!(game.session().moves_left(), 4);
        assert!(game.board().is_full());
        assert!(game.board().is_consistent());
        assert!(game.board().find_matches().is_empty());
        assert_eq!(game.phase(), &TurnPhase::Idle);
        assert_eq!(game.last_turn(), Some(summary));
    }

    #[test]
    fn test_crown_activation_is_scored() {
        // Swapping (1,1) and (1,2) completes the 0 anti-diagonal; the crown at (0,0)
        // touches (1,1) diagonally.
        let mut game = game(&["*20", "210", "012"], Session::new(1, 5));
        let summary = game
            .play_turn(Pos::new(1, 1), Pos::new(1, 2), &mut ())
            .unwrap();
        assert!(summary.activated >= 1);
        assert_eq!(game.session().outcome(), Some(Outcome::Cleared));
        assert!(!game.accepting_input());
    }

    #[test]
    fn test_rejects_invalid_swaps() {
        let mut game = game(&["01.", "1*0", "20_"], Session::new(5, 5));
        let p = Pos::new;
        assert_eq!(
            game.begin_swap(p(0, 0), p(0, 0), &mut ()),
            Err(SwapRejected::SameCell(p(0, 0)))
        );
        assert_eq!(
            game.begin_swap(p(0, 0), p(0, 3), &mut ()),
            Err(SwapRejected::OutOfBounds(p(0, 3)))
        );
        assert_eq!(
            game.begin_swap(p(0, 1), p(0, 2), &mut ()),
            Err(SwapRejected::Unplayable(p(0, 2)))
        );
        assert_eq!(
            game.begin_swap(p(1, 2), p(2, 2), &mut ()),
            Err(SwapRejected::Unplayable(p(2, 2)))
        );
        assert_eq!(
            game.begin_swap(p(0, 0), p(1, 1), &mut ()),
            Err(SwapRejected::Crown(p(1, 1)))
        );
        assert_eq!(
            game.begin_swap(p(0, 0), p(2, 1), &mut ()),
            Err(SwapRejected::NotAdjacent {
                a: p(0, 0),
                b: p(2, 1)
            })
        );
    }

    #[test]
    fn test_busy_while_resolving() {
        let mut game = game(&["012", "210", "120"], Session::new(5, 5));
        game.begin_swap(Pos::new(0, 0), Pos::new(0, 1), &mut ())
            .unwrap();
        assert!(!game.accepting_input());
        assert_eq!(
            game.begin_swap(Pos::new(1, 0), Pos::new(1, 1), &mut ()),
            Err(SwapRejected::Busy)
        );
        while game.advance(&mut ()).is_some() {}
        assert!(game.accepting_input());
    }

    #[test]
    fn test_removal_is_announced_before_it_happens() {
        let mut game = game(&["012", "210", "120"], Session::new(5, 5));
        game.begin_swap(Pos::new(1, 1), Pos::new(1, 2), &mut ())
            .unwrap();
        assert!(game.pending_removal().is_none());
        game.advance(&mut ());
        let pending = game.pending_removal().cloned().unwrap();
        assert!(pending.contains(Pos::new(0, 0)));
        let mut events = Vec::new();
        game.advance(&mut events);
        let removed: Vec<Pos> = events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::Removed { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(removed, pending.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_finished_session_refuses_swaps() {
        let mut game = game(&["012", "210", "120"], Session::new(5, 1));
        game.play_turn(Pos::new(1, 1), Pos::new(1, 2), &mut ())
            .unwrap();
        assert_eq!(game.session().outcome(), Some(Outcome::GameOver));
        assert_eq!(
            game.begin_swap(Pos::new(0, 0), Pos::new(0, 1), &mut ()),
            Err(SwapRejected::Finished)
        );
    }

    #[test]
    fn test_cascade_after_the_last_move_still_clears() {
        // Swapping the bottom pair matches rows 4, 6 and 8 beside the crown and spends
        // the only move. After the fall the 1s line up in the same rows and fire it again.
        let mut game = game(
            &["2.", "1.", "2.", "1.", "0.", "0*", "0.", "0.", "1."],
            Session::new(2, 1),
        );
        let summary = game
            .play_turn(Pos::new(7, 0), Pos::new(8, 0), &mut ())
            .unwrap();
        assert!(summary.cascades >= 2, "{summary:?}");
        assert!(summary.activated >= 2, "{summary:?}");
        assert_eq!(game.session().moves_left(), 0);
        assert_eq!(game.session().outcome(), Some(Outcome::Cleared));
    }

    #[test]
    fn test_rejects_unusable_kind_counts() {
        for kinds in [0, 1, 2, 7] {
            let config = GameConfig {
                kinds,
                seed: Some(1),
                ..GameConfig::default()
            };
            assert!(matches!(Game::new(&config), Err(BoardError::Kinds(k)) if k == kinds));
        }
    }

    #[test]
    fn test_deadlock_shuffles_up_to_the_cap() {
        // No window fits on a 2x2 grid, so every layout is deadlocked.
        let rows = ["01", "23"];
        let mut game = game(&rows, Session::new(5, 5));
        let start = sorted_kinds(&Board::from_picture(3, &rows).unwrap());
        // Construction already shuffled as far as it may and kept every tile.
        assert_eq!(sorted_kinds(game.board()), start);
        assert!(game.board().is_consistent());
        assert!(!game.board().has_possible_move());
        assert!(game.accepting_input());
        assert_eq!(game.last_turn(), None);

        game.phase = TurnPhase::DeadlockCheck { shuffles: 0 };
        let mut moved = 0;
        for n in 0..MAX_DEADLOCK_SHUFFLES {
            assert_eq!(game.phase(), &TurnPhase::DeadlockCheck { shuffles: n });
            assert!(!game.accepting_input());
            assert_eq!(game.advance(&mut ()), Some(Duration::ZERO));
            assert_eq!(game.phase(), &TurnPhase::Shuffling { shuffles: n });
            assert!(!game.accepting_input());
            assert_eq!(
                game.begin_swap(Pos::new(0, 0), Pos::new(0, 1), &mut ()),
                Err(SwapRejected::Busy)
            );

            let mut events = Vec::new();
            assert_eq!(game.advance(&mut events), Some(SHUFFLE_PAUSE));
            assert_eq!(game.current.shuffles, n + 1);
            for event in &events {
                let BoardEvent::Moved {
                    id, to, duration, ..
                } = event
                else {
                    panic!("shuffle announced {event:?}");
                };
                assert_eq!(*duration, SHUFFLE_MOVE_DURATION);
                assert_eq!(game.board().get(*to).map(|t| t.id), Some(*id));
            }
            moved += events.len();
            assert!(game.board().is_consistent());
            assert_eq!(sorted_kinds(game.board()), start);
        }
        assert!(moved > 0);

        assert_eq!(
            game.phase(),
            &TurnPhase::DeadlockCheck {
                shuffles: MAX_DEADLOCK_SHUFFLES
            }
        );
        assert!(!game.accepting_input());
        assert_eq!(game.advance(&mut ()), Some(Duration::ZERO));
        assert_eq!(game.phase(), &TurnPhase::Idle);
        assert_eq!(
            game.last_turn().map(|t| t.shuffles),
            Some(MAX_DEADLOCK_SHUFFLES)
        );
        assert!(game.accepting_input());
        assert_eq!(game.advance(&mut ()), None);
    }

    #[test]
    fn test_shuffle_that_frees_a_move_ends_the_turn() {
        // One column of three 0s and two 1s: no single swap puts the 0s in rows 0, 2
        // and 4, but some permutations leave such a swap open.
        let mut resolved = 0;
        for seed in 0..16 {
            let mut game = at_deadlock_check(&["0", "0", "1", "0", "1"], seed);
            assert!(!game.board().has_possible_move());
            let mut steps = 0;
            while game.advance(&mut ()).is_some() {
                steps += 1;
                assert!(steps < 100, "seed {seed}: turn never settled");
            }
            let shuffles = game.last_turn().map_or(0, |t| t.shuffles);
            assert!(shuffles >= 1, "seed {seed}");
            if shuffles < MAX_DEADLOCK_SHUFFLES {
                assert!(game.board().has_possible_move(), "seed {seed}");
                resolved += 1;
            }
            assert!(game.board().find_matches().is_empty());
            assert!(game.accepting_input());
        }
        assert!(resolved > 0);
    }
}
