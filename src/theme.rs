//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Board and UI colours. Defaults are One Dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Standard tile colours by kind index: green, yellow, red, blue, magenta, cyan.
    pub tiles: [Color; 6],
    pub crown: Color,
    /// Board background.
    pub bg: Color,
    /// Empty playable cells and borders.
    pub div_line: Color,
    pub main_fg: Color,
    pub title: Color,
    pub inactive_fg: Color,
    /// Cursor and selection backgrounds.
    pub cursor_bg: Color,
    pub selected_bg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hex values from onedark.theme.
    pub const fn onedark_default() -> Self {
        Self {
            tiles: [
                rgb(0x98C379), // mem_box
                rgb(0xE5C07B), // title
                rgb(0xE06C75), // cpu_end
                rgb(0x61AFEF), // cpu_box
                rgb(0xC678DD), // net_box
                rgb(0x56B6C2), // hi_fg
            ],
            crown: rgb(0xD19A66),
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
            cursor_bg: rgb(0x4B5263),
            selected_bg: rgb(0x2C5F8A),
        }
    }

    /// Load a btop-style theme file, or the One Dark defaults when `path` is absent or
    /// missing. `palette` then overrides the tile colours.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                log::info!("loaded theme from {}", p.display());
                Self::from_map(&parse_theme_file(&s))
            }
            Some(p) => {
                log::warn!("theme file {} not found, using defaults", p.display());
                Self::onedark_default()
            }
            None => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.tiles = [
                    rgb(0x00FF00),
                    rgb(0xFFFF00),
                    rgb(0xFF0000),
                    rgb(0x0088FF),
                    rgb(0xFF00FF),
                    rgb(0x00FFFF),
                ];
                self.crown = rgb(0xFFFFFF);
            }
            Palette::Colorblind => {
                // Tol's vibrant scheme; no red/green pair carries meaning alone.
                self.tiles = [
                    rgb(0x0077BB),
                    rgb(0xEE7733),
                    rgb(0x009988),
                    rgb(0xCC3311),
                    rgb(0xEE3377),
                    rgb(0xBBBB00),
                ];
                self.crown = rgb(0xFFFFFF);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            tiles: [
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.tiles[0]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.tiles[1]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.tiles[2]),
                get("cpu_box").unwrap_or(d.tiles[3]),
                get("net_box").unwrap_or(d.tiles[4]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.tiles[5]),
            ],
            crown: get("temp_mid").or_else(|| get("hi_fg")).unwrap_or(d.crown),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
            cursor_bg: get("selected_bg").unwrap_or(d.cursor_bg),
            selected_bg: get("proc_box").unwrap_or(d.selected_bg),
        }
    }

    #[inline]
    pub fn tile_color(&self, index: u8) -> Color {
        self.tiles[usize::from(index) % self.tiles.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let Some((_, value)) = stripped[end + 1..].split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
