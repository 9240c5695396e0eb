//! crownmatch: diagonal tile-matching puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use crownmatch::game::GameConfig;
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    // The terminal belongs to the UI, so logs only ever go to a file.
    let _logger = match &args.log_dir {
        Some(dir) => Some(start_logger(dir, &args.log_level)?),
        None => None,
    };
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("theme not loaded ({}), using defaults", e);
            let mut theme = theme::Theme::default();
            theme.apply_palette(args.palette);
            theme
        }
    };
    let config = GameConfig {
        kinds: args.kinds,
        crowns: args.crowns,
        moves: args.moves,
        seed: args.seed,
    };
    let mut app = App::new(&args, config, theme)?;
    let result = app.run();
    if let Err(e) = &result {
        log::error!("fatal error: {:#}", e);
    }
    result
}

fn start_logger(dir: &Path, level: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_file(FileSpec::default().directory(dir).basename("crownmatch"))
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .start()?;
    Ok(handle)
}

/// Diagonal tile-matching puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "crownmatch",
    version,
    about = "Swap neighbouring tiles to line up three along a diagonal; matches next to crowns activate them.",
    long_about = "crownmatch is a terminal tile-matching puzzle.\n\n\
        Swap a tile with any of its eight neighbours. Three tiles of one colour on a diagonal \
        (or in a column with one-cell gaps) are removed, tiles fall, and new ones drop in. \
        Removing a tile diagonally next to a crown, or two rows above or below it, activates \
        the crown. Activate enough crowns before your moves run out.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor     y u b n      Move diagonally\n  \
        Space / Enter  Select / swap   ?            Hint\n  R              Restart         Q / Esc      Quit"
)]
pub struct Args {
    /// RNG seed; a random one is picked (and logged) when not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Number of tile colours in play.
    #[arg(long, default_value_t = 6, value_name = "N", value_parser = clap::value_parser!(u8).range(3..=6))]
    pub kinds: u8,

    /// Crowns to activate to clear the board.
    #[arg(long, default_value_t = 15, value_name = "N")]
    pub crowns: u32,

    /// Moves available.
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub moves: u32,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip animation pauses and the removal fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value_t = 60.0, value_name = "RATE")]
    pub frame_rate: f64,

    /// Write a log file into this directory.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level or filter spec; RUST_LOG takes precedence.
    #[arg(long, default_value = "info", value_name = "SPEC")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
