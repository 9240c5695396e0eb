//! Layout and drawing: board, sidebar, removal and drop-in fades, end-of-session overlay.

use crate::app::Screen;
use crate::theme::Theme;
use crownmatch::board::{DROP_IN_DURATION, Pos};
use crownmatch::game::{Game, TurnSummary};
use crownmatch::session::Outcome;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each board cell is three terminal columns wide so the glyph sits centred.
const CELL_WIDTH: u16 = 3;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 30;
const SIDEBAR_HEIGHT: u16 = 22;

/// Fade of matched tiles before they are removed.
const REMOVAL_FADE_MS: u32 = 250;

const TILE_GLYPH: &str = "●";
const CROWN_GLYPH: &str = "♛";
const EMPTY_GLYPH: &str = "·";

/// Everything the renderer reads from the app for one frame.
pub struct View<'a> {
    pub game: &'a Game,
    pub theme: &'a Theme,
    pub screen: Screen,
    pub cursor: Pos,
    pub selected: Option<Pos>,
    pub hint: Option<(Pos, Pos)>,
    /// Crowns activated by the last step.
    pub activated: &'a HashSet<Pos>,
    /// Cells refilled by the last step.
    pub spawned: &'a HashSet<Pos>,
    pub total_crowns: u32,
    pub animate: bool,
}

/// A TachyonFX effect plus the time it was last processed (for the frame delta).
#[derive(Default)]
pub struct Fade {
    effect: Option<Effect>,
    last_processed: Option<Instant>,
}

impl Fade {
    pub fn clear(&mut self) {
        self.effect = None;
        self.last_processed = None;
    }

    /// True once the effect has been created and has run to completion.
    pub fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }

    /// Create the effect on first use, then advance and render it.
    fn run(&mut self, frame: &mut Frame, area: Rect, now: Instant, make: impl FnOnce() -> Effect) {
        let delta = self
            .last_processed
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
        self.last_processed = Some(now);
        let effect = self.effect.get_or_insert_with(make);
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
    }
}

/// Board (outer, with border) and sidebar rects, centred in `area`.
struct Regions {
    board_outer: Rect,
    board: Rect,
    sidebar: Rect,
}

fn board_pixel_size(rows: usize, cols: usize) -> (u16, u16) {
    (cols as u16 * CELL_WIDTH + 2, rows as u16 * CELL_HEIGHT + 2)
}

fn regions(area: Rect, rows: usize, cols: usize) -> Regions {
    let (bw, bh) = board_pixel_size(rows, cols);
    let total_w = bw + SIDEBAR_WIDTH;
    let total_h = bh.max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board_outer = Rect {
        height: bh.min(inner[0].height),
        ..inner[0]
    };
    let board = Rect {
        x: board_outer.x + 1,
        y: board_outer.y + 1,
        width: board_outer.width.saturating_sub(2),
        height: board_outer.height.saturating_sub(2),
    };
    Regions {
        board_outer,
        board,
        sidebar: inner[1],
    }
}

/// Terminal rect of one board cell, or `None` when it falls outside `board`.
fn cell_rect(board: Rect, pos: Pos) -> Option<Rect> {
    let x = board.x + u16::try_from(pos.col).ok()?.checked_mul(CELL_WIDTH)?;
    let y = board.y + u16::try_from(pos.row).ok()?.checked_mul(CELL_HEIGHT)?;
    (x + CELL_WIDTH <= board.x + board.width && y + CELL_HEIGHT <= board.y + board.height).then(
        || Rect {
            x,
            y,
            width: CELL_WIDTH,
            height: CELL_HEIGHT,
        },
    )
}

/// Buffer (x, y) positions covered by the given cells.
fn buffer_positions(board: Rect, cells: impl IntoIterator<Item = Pos>) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for rect in cells.into_iter().filter_map(|pos| cell_rect(board, pos)) {
        for x in rect.x..rect.x + rect.width {
            for y in rect.y..rect.y + rect.height {
                set.insert((x, y));
            }
        }
    }
    set
}

fn position_filter(set: HashSet<(u16, u16)>) -> CellFilter {
    CellFilter::PositionFn(ref_count(move |pos: Position| set.contains(&(pos.x, pos.y))))
}

pub fn draw(frame: &mut Frame, view: &View, removal: &mut Fade, drop_in: &mut Fade, now: Instant) {
    let board = view.game.board();
    let regions = regions(frame.area(), board.rows(), board.cols());
    draw_board(frame, view, &regions);
    draw_sidebar(frame, view, regions.sidebar);

    if view.animate {
        if let Some(matches) = view.game.pending_removal() {
            let bg = view.theme.bg;
            let set = buffer_positions(regions.board, matches.iter());
            removal.run(frame, regions.board, now, || {
                fx::fade_to(bg, bg, (REMOVAL_FADE_MS, Interpolation::Linear))
                    .with_filter(position_filter(set))
                    .with_area(regions.board)
            });
        }
        if !view.spawned.is_empty() {
            let bg = view.theme.bg;
            let set = buffer_positions(regions.board, view.spawned.iter().copied());
            let ms = DROP_IN_DURATION.as_millis() as u32;
            drop_in.run(frame, regions.board, now, || {
                fx::fade_from(bg, bg, (ms, Interpolation::Linear))
                    .with_filter(position_filter(set))
                    .with_area(regions.board)
            });
        }
    }

    if view.screen == Screen::Ended {
        draw_end_overlay(frame, view, regions.board_outer);
    }
}

fn draw_board(frame: &mut Frame, view: &View, regions: &Regions) {
    let theme = view.theme;
    let title = format!(" crownmatch  seed {} ", view.game.seed());
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .render(regions.board_outer, frame.buffer_mut());

    let board = view.game.board();
    let hinted = |pos: Pos| view.hint.is_some_and(|(a, b)| a == pos || b == pos);
    let buf = frame.buffer_mut();
    for pos in board.mask().positions() {
        let Some(rect) = cell_rect(regions.board, pos) else {
            continue;
        };
        let playable = board.mask().is_playable(pos);
        let (glyph, mut style) = match board.get(pos) {
            _ if !playable => (" ", Style::default().bg(theme.bg)),
            None => (EMPTY_GLYPH, Style::default().fg(theme.div_line).bg(theme.bg)),
            Some(tile) if tile.kind.is_crown() => (
                CROWN_GLYPH,
                Style::default()
                    .fg(theme.crown)
                    .bg(theme.bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Some(tile) => (
                TILE_GLYPH,
                Style::default()
                    .fg(theme.tile_color(tile.kind.index()))
                    .bg(theme.bg),
            ),
        };
        if view.activated.contains(&pos) {
            style = style.fg(theme.bg).bg(theme.crown);
        }
        if playable && hinted(pos) {
            style = style.bg(theme.inactive_fg);
        }
        if view.screen == Screen::Playing && pos == view.cursor {
            style = style.bg(theme.cursor_bg);
        }
        if view.selected == Some(pos) {
            style = style.bg(theme.selected_bg).add_modifier(Modifier::BOLD);
        }
        buf.set_string(rect.x, rect.y, format!(" {glyph} "), style);
    }
}

fn sidebar_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title),
        ))
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.game.session();
    let fg = Style::default().fg(theme.main_fg);
    let label = Style::default().fg(theme.title);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // crowns gauge
            Constraint::Length(3), // moves
            Constraint::Length(7), // last turn
            Constraint::Min(0),    // help
        ])
        .split(area);

    let total = view.total_crowns.max(1);
    let done = view.total_crowns.saturating_sub(session.crowns_left());
    let crowns_block = sidebar_block(theme, "Crowns");
    let crowns_inner = crowns_block.inner(chunks[0]);
    crowns_block.render(chunks[0], frame.buffer_mut());
    Gauge::default()
        .gauge_style(Style::default().fg(theme.crown).bg(theme.div_line))
        .ratio((f64::from(done) / f64::from(total)).min(1.0))
        .label(format!("{} left", session.crowns_left()))
        .render(crowns_inner, frame.buffer_mut());

    let moves_style = if session.moves_left() <= 2 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        fg
    };
    Paragraph::new(Line::from(Span::styled(
        session.moves_left().to_string(),
        moves_style,
    )))
    .alignment(Alignment::Center)
    .block(sidebar_block(theme, "Moves"))
    .render(chunks[1], frame.buffer_mut());

    let turn_lines = match view.game.last_turn() {
        Some(turn) => last_turn_lines(turn, label, fg),
        None => vec![Line::from(Span::styled("no turns yet", fg))],
    };
    Paragraph::new(turn_lines)
        .block(sidebar_block(theme, "Last turn"))
        .render(chunks[2], frame.buffer_mut());

    let help = [
        ("arrows hjkl", "move"),
        ("y u b n", "diagonal"),
        ("space enter", "select/swap"),
        ("?", "hint"),
        ("r", "restart"),
        ("q esc", "quit"),
    ];
    let help_lines: Vec<Line> = help
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>12} "), label),
                Span::styled(*what, Style::default().fg(theme.inactive_fg)),
            ])
        })
        .collect();
    Paragraph::new(help_lines)
        .block(sidebar_block(theme, "Keys"))
        .render(chunks[3], frame.buffer_mut());
}

fn last_turn_lines(turn: TurnSummary, label: Style, fg: Style) -> Vec<Line<'static>> {
    if !turn.matched {
        return vec![Line::from(Span::styled("no match, swapped back", fg))];
    }
    let row = |name: &'static str, value: u32| {
        Line::from(vec![
            Span::styled(format!("{name:<10}"), label),
            Span::styled(value.to_string(), fg),
        ])
    };
    vec![
        row("cascades", turn.cascades),
        row("removed", turn.removed),
        row("crowns", turn.activated),
        row("shuffles", turn.shuffles),
    ]
}

fn draw_end_overlay(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.game.session();
    let (title, colour) = match session.outcome() {
        Some(Outcome::Cleared) => (" Cleared! ", Color::Green),
        _ => (" Out of moves ", Color::Red),
    };
    let popup_w = 26u16.min(area.width);
    let popup_h = 8u16.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Black).bg(colour),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Crowns left: {} ", session.crowns_left()),
            fg,
        )),
        Line::from(Span::styled(
            format!(" Moves left: {} ", session.moves_left()),
            fg,
        )),
        Line::from(Span::styled(" R  Restart    Q  Quit ", fg)),
    ];
    let buf = frame.buffer_mut();
    for y in popup.y..popup.y + popup.height {
        for x in popup.x..popup.x + popup.width {
            buf[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: Rect = Rect {
        x: 10,
        y: 5,
        width: 21,
        height: 9,
    };

    #[test]
    fn test_cell_rect() {
        assert_eq!(
            cell_rect(BOARD, Pos::new(2, 3)),
            Some(Rect {
                x: 19,
                y: 7,
                width: 3,
                height: 1
            })
        );
        assert_eq!(cell_rect(BOARD, Pos::new(9, 0)), None);
        assert_eq!(cell_rect(BOARD, Pos::new(0, 7)), None);
    }

    #[test]
    fn test_buffer_positions_cover_whole_cells() {
        let set = buffer_positions(BOARD, [Pos::new(0, 0), Pos::new(8, 6)]);
        assert_eq!(set.len(), 6);
        assert!(set.contains(&(10, 5)) && set.contains(&(12, 5)));
        assert!(set.contains(&(28, 13)) && set.contains(&(30, 13)));
    }

    #[test]
    fn test_regions_fit_default_board() {
        let r = regions(Rect::new(0, 0, 120, 40), 9, 7);
        assert_eq!(r.board.width, 21);
        assert_eq!(r.board.height, 9);
        assert_eq!(r.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(r.sidebar.x, r.board_outer.x + r.board_outer.width);
    }
}
