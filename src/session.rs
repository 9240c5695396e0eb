//! Crown countdown and move budget for one play-through.

/// Receiver of the two counters a turn consumes.
pub trait Scorekeeper {
    /// `count` crowns fired in one removal pass.
    fn on_special_activated(&mut self, count: u32);
    /// A matching swap spent `count` moves.
    fn on_move_consumed(&mut self, count: u32);
    /// The turn's last cascade has settled.
    fn on_turn_resolved(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every required crown was activated.
    Cleared,
    /// Moves ran out with crowns still left.
    GameOver,
}

/// Counters start at the configured totals and only count down. Clearing the crowns
/// ends the session at once. Running out of moves only ends it when the turn that
/// spent the last move has resolved without clearing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    crowns_left: i64,
    moves_left: i64,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(crowns: u32, moves: u32) -> Self {
        Self {
            crowns_left: i64::from(crowns),
            moves_left: i64::from(moves),
            outcome: None,
        }
    }

    /// Crowns still to activate; zero once cleared.
    pub fn crowns_left(&self) -> u32 {
        u32::try_from(self.crowns_left.max(0)).unwrap_or(u32::MAX)
    }

    pub fn moves_left(&self) -> u32 {
        u32::try_from(self.moves_left.max(0)).unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            log::info!(
                "session finished: {:?} (crowns left {}, moves left {})",
                outcome,
                self.crowns_left(),
                self.moves_left()
            );
            self.outcome = Some(outcome);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(15, 10)
    }
}

impl Scorekeeper for Session {
    fn on_special_activated(&mut self, count: u32) {
        self.crowns_left -= i64::from(count);
        log::debug!("crowns left: {}", self.crowns_left);
        if self.crowns_left <= 0 {
            self.finish(Outcome::Cleared);
        }
    }

    fn on_move_consumed(&mut self, count: u32) {
        self.moves_left -= i64::from(count);
        log::debug!("moves left: {}", self.moves_left);
    }

    fn on_turn_resolved(&mut self) {
        if self.moves_left <= 0 && self.crowns_left > 0 {
            self.finish(Outcome::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crowns_clear_the_session() {
        let mut s = Session::new(3, 10);
        s.on_special_activated(2);
        assert_eq!(s.outcome(), None);
        s.on_special_activated(2);
        assert_eq!(s.outcome(), Some(Outcome::Cleared));
        assert_eq!(s.crowns_left(), 0);
    }

    #[test]
    fn test_running_out_of_moves() {
        let mut s = Session::new(3, 2);
        s.on_move_consumed(1);
        s.on_turn_resolved();
        assert!(!s.is_finished());
        s.on_move_consumed(1);
        assert!(!s.is_finished(), "cascades may still clear the crowns");
        s.on_turn_resolved();
        assert_eq!(s.outcome(), Some(Outcome::GameOver));
        assert_eq!(s.moves_left(), 0);
    }

    #[test]
    fn test_last_move_that_clears_is_a_win() {
        let mut s = Session::new(1, 1);
        s.on_special_activated(1);
        s.on_move_consumed(1);
        s.on_turn_resolved();
        assert_eq!(s.outcome(), Some(Outcome::Cleared));
    }

    #[test]
    fn test_cascade_after_last_move_can_still_clear() {
        let mut s = Session::new(2, 1);
        s.on_special_activated(1);
        s.on_move_consumed(1);
        s.on_special_activated(1);
        s.on_turn_resolved();
        assert_eq!(s.outcome(), Some(Outcome::Cleared));
    }

    #[test]
    fn test_cleared_session_stays_cleared() {
        let mut s = Session::new(1, 3);
        s.on_special_activated(1);
        s.on_move_consumed(5);
        s.on_turn_resolved();
        assert_eq!(s.outcome(), Some(Outcome::Cleared));
    }
}
