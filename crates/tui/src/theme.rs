use std::{fs, path::PathBuf};

use ratatui::style::Color;
use rentour_core::config::APP_DIR;
use serde::Deserialize;

const THEME_FILE: &str = "theme.json";

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub on_accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            on_accent: Color::Black,
        }
    }
}

/// Optional colour overrides read from `<config_dir>/rentour/theme.json`.
#[derive(Debug, Default, Deserialize)]
struct ThemeFile {
    foreground: Option<String>,
    accent: Option<String>,
    muted: Option<String>,
    selection_background: Option<String>,
    selection_foreground: Option<String>,
    success: Option<String>,
    warning: Option<String>,
    danger: Option<String>,
}

pub fn theme_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(THEME_FILE))
}

/// Load the palette, falling back to defaults. Also returns a note for the
/// status bar.
pub fn load_theme() -> (Theme, String) {
    let Some(path) = theme_path().filter(|path| path.exists()) else {
        return (Theme::default(), "Using default palette".to_string());
    };
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) => {
            return (
                Theme::default(),
                format!("Failed to read {} ({err}); using default palette", path.display()),
            )
        }
    };
    match serde_json::from_str::<ThemeFile>(&data) {
        Ok(file) => {
            let (theme, applied) = apply(file);
            (
                theme,
                format!("Loaded theme from {} ({applied} colours)", path.display()),
            )
        }
        Err(err) => (
            Theme::default(),
            format!("Failed to parse {} ({err}); using default palette", path.display()),
        ),
    }
}

fn apply(file: ThemeFile) -> (Theme, usize) {
    let mut theme = Theme::default();
    let mut applied = 0;
    let mut set = |slot: &mut Color, raw: Option<String>| {
        if let Some(color) = raw.as_deref().and_then(parse_hex_color) {
            *slot = color;
            applied += 1;
        }
    };
    set(&mut theme.primary_fg, file.foreground);
    set(&mut theme.accent, file.accent);
    set(&mut theme.muted, file.muted);
    set(&mut theme.selection_bg, file.selection_background);
    let explicit_selection_fg = file.selection_foreground.is_some();
    set(&mut theme.selection_fg, file.selection_foreground);
    set(&mut theme.success, file.success);
    set(&mut theme.warning, file.warning);
    set(&mut theme.danger, file.danger);

    theme.on_accent = contrast_color(&theme.accent, Color::Black);
    if !explicit_selection_fg {
        theme.selection_fg = contrast_color(&theme.selection_bg, theme.selection_fg);
    }
    (theme, applied)
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn contrast_color(color: &Color, fallback: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let luminance = 0.299 * f64::from(*r) + 0.587 * f64::from(*g) + 0.114 * f64::from(*b);
            if luminance > 186.0 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => fallback,
    }
}
