//! App: terminal init, main loop, turn pacing and key handling.

use crate::input::{Action, Step, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, Fade, View};
use crate::Args;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crownmatch::board::{Board, Pos, Presenter, SWAP_DURATION, TileId};
use crownmatch::game::{Game, GameConfig, SwapRejected, TurnPhase};
use ratatui::DefaultTerminal;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    /// Session over; the overlay offers restart or quit.
    Ended,
}

/// Presenter for the terminal: remembers which cells the last step lit up.
/// Moves are shown by redrawing, so only activations and spawns are kept.
#[derive(Debug, Default)]
struct Highlights {
    activated: HashSet<Pos>,
    spawned: HashSet<Pos>,
}

impl Highlights {
    fn clear(&mut self) {
        self.activated.clear();
        self.spawned.clear();
    }
}

impl Presenter for Highlights {
    fn animate_move(&mut self, _id: TileId, _from: Pos, _to: Pos, _duration: Duration) {}

    fn animate_removal(&mut self, _id: TileId, _at: Pos) {}

    fn animate_spawn(&mut self, _id: TileId, at: Pos) {
        self.spawned.insert(at);
    }

    fn animate_activation(&mut self, _id: TileId, at: Pos) {
        self.activated.insert(at);
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    no_animation: bool,
    frame_duration: Duration,
    game: Game,
    screen: Screen,
    cursor: Pos,
    selected: Option<Pos>,
    hint: Option<(Pos, Pos)>,
    highlights: Highlights,
    /// Earliest time the controller may take its next step.
    next_step_at: Instant,
    removal_fade: Fade,
    drop_in_fade: Fade,
}

impl App {
    pub fn new(args: &Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let game = Game::new(&config)?;
        let cursor = start_cursor(game.board());
        Ok(Self {
            config,
            theme,
            no_animation: args.no_animation,
            frame_duration: Duration::from_secs_f64(1.0 / args.frame_rate.max(1.0)),
            game,
            screen: Screen::Playing,
            cursor,
            selected: None,
            hint: None,
            highlights: Highlights::default(),
            next_step_at: Instant::now(),
            removal_fade: Fade::default(),
            drop_in_fade: Fade::default(),
        })
    }

    fn restart(&mut self) -> Result<()> {
        self.game = Game::new(&self.config)?;
        self.cursor = start_cursor(self.game.board());
        self.screen = Screen::Playing;
        self.selected = None;
        self.hint = None;
        self.highlights.clear();
        self.removal_fade.clear();
        self.drop_in_fade.clear();
        self.next_step_at = Instant::now();
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                let view = View {
                    game: &self.game,
                    theme: &self.theme,
                    screen: self.screen,
                    cursor: self.cursor,
                    selected: self.selected,
                    hint: self.hint,
                    activated: &self.highlights.activated,
                    spawned: &self.highlights.spawned,
                    total_crowns: self.config.crowns,
                    animate: !self.no_animation,
                };
                ui::draw(f, &view, &mut self.removal_fade, &mut self.drop_in_fade, now);
            })?;

            self.step_turn(now);

            let timeout = self.frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key_to_action(key) {
                        Action::Quit => return Ok(()),
                        Action::Restart => self.restart()?,
                        action if self.screen == Screen::Playing => self.apply_action(action),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Let the controller take its next step once the previous step's animations are over.
    fn step_turn(&mut self, now: Instant) {
        if *self.game.phase() == TurnPhase::Idle {
            if self.game.session().is_finished() && self.screen == Screen::Playing {
                self.screen = Screen::Ended;
                self.selected = None;
                self.hint = None;
            }
            return;
        }
        if now < self.next_step_at {
            return;
        }
        if !self.no_animation
            && self.game.pending_removal().is_some()
            && !self.removal_fade.is_done()
        {
            return;
        }

        self.highlights.clear();
        let delay = self.game.advance(&mut self.highlights);
        self.removal_fade.clear();
        self.drop_in_fade.clear();
        self.next_step_at = match delay {
            Some(delay) if !self.no_animation => now + delay,
            _ => now,
        };
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Move(step) => self.move_cursor(step),
            Action::Select => self.select(),
            Action::Hint => {
                self.hint = self.game.hint();
                if self.hint.is_none() {
                    log::debug!("hint requested but no move is available");
                }
            }
            Action::Restart | Action::Quit | Action::None => {}
        }
    }

    fn move_cursor(&mut self, step: Step) {
        if let Some(next) = next_playable(self.game.board(), self.cursor, step) {
            self.cursor = next;
        }
    }

    fn select(&mut self) {
        if !self.game.accepting_input() {
            return;
        }
        let cursor = self.cursor;
        let Some(selected) = self.selected else {
            self.selected = selectable(self.game.board(), cursor).then_some(cursor);
            return;
        };
        if selected == cursor {
            self.selected = None;
            return;
        }
        match self.game.begin_swap(selected, cursor, &mut self.highlights) {
            Ok(()) => {
                self.selected = None;
                self.hint = None;
                self.next_step_at = if self.no_animation {
                    Instant::now()
                } else {
                    Instant::now() + SWAP_DURATION
                };
            }
            Err(SwapRejected::NotAdjacent { .. }) => {
                self.selected = selectable(self.game.board(), cursor).then_some(cursor);
            }
            Err(e) => {
                log::debug!("swap rejected: {}", e);
                self.selected = None;
            }
        }
    }
}

/// Cells holding a standard tile can be picked up.
fn selectable(board: &Board, pos: Pos) -> bool {
    board.kind_at(pos).is_some_and(|k| !k.is_crown())
}

/// First playable cell from `from` in direction `step`, skipping Void cells.
fn next_playable(board: &Board, from: Pos, step: Step) -> Option<Pos> {
    let mut pos = from;
    loop {
        pos = pos.offset(step, board.rows(), board.cols())?;
        if board.mask().is_playable(pos) {
            return Some(pos);
        }
    }
}

/// Playable cell nearest the middle of the board.
fn start_cursor(board: &Board) -> Pos {
    let (mid_row, mid_col) = (board.rows() / 2, board.cols() / 2);
    board
        .mask()
        .playable_positions()
        .min_by_key(|p| p.row.abs_diff(mid_row) + p.col.abs_diff(mid_col))
        .unwrap_or(Pos::new(0, 0))
}
