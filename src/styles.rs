//! Theme and style helpers.
//!
//! A single global theme, picked at start-up from the config file (or
//! `NO_COLOR`), read by every renderer.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub const LIST_HIGHLIGHT_SYMBOL: &str = "» ";

static THEME: RwLock<Theme> = RwLock::new(Theme::dark());

pub fn init_theme(theme_type: ThemeType) {
    match THEME.write() {
        Ok(mut theme) => *theme = Theme::new(theme_type),
        Err(poisoned) => *poisoned.into_inner() = Theme::new(theme_type),
    }
}

pub fn theme() -> Theme {
    match THEME.read() {
        Ok(theme) => theme.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    #[default]
    Dark,
    Light,
    /// Modifiers only, no colors
    #[serde(alias = "no-color", alias = "no_color")]
    NoColor,
}

impl ThemeType {
    /// `NO_COLOR` wins over the configured theme.
    pub fn resolve(configured: ThemeType) -> ThemeType {
        match std::env::var_os("NO_COLOR") {
            Some(v) if !v.is_empty() => ThemeType::NoColor,
            _ => configured,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub theme_type: ThemeType,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_emphasis: Color,
    pub border: Color,
    pub border_focused: Color,
    pub highlight_bg: Color,
}

impl Theme {
    pub fn new(theme_type: ThemeType) -> Self {
        match theme_type {
            ThemeType::Dark => Self::dark(),
            ThemeType::Light => Self::light(),
            ThemeType::NoColor => Self::no_color(),
        }
    }

    pub const fn dark() -> Self {
        Self {
            theme_type: ThemeType::Dark,
            primary: Color::Cyan,
            secondary: Color::Magenta,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            text: Color::White,
            text_muted: Color::DarkGray,
            text_emphasis: Color::Yellow,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            highlight_bg: Color::DarkGray,
        }
    }

    pub const fn light() -> Self {
        Self {
            theme_type: ThemeType::Light,
            primary: Color::Blue,
            secondary: Color::Magenta,
            success: Color::Green,
            warning: Color::Rgb(180, 120, 0),
            error: Color::Red,
            text: Color::Black,
            text_muted: Color::DarkGray,
            text_emphasis: Color::Blue,
            border: Color::DarkGray,
            border_focused: Color::Blue,
            highlight_bg: Color::Gray,
        }
    }

    pub const fn no_color() -> Self {
        Self {
            theme_type: ThemeType::NoColor,
            primary: Color::Reset,
            secondary: Color::Reset,
            success: Color::Reset,
            warning: Color::Reset,
            error: Color::Reset,
            text: Color::Reset,
            text_muted: Color::Reset,
            text_emphasis: Color::Reset,
            border: Color::Reset,
            border_focused: Color::Reset,
            highlight_bg: Color::Reset,
        }
    }

    fn colored(&self, fg: Color, fallback: Modifier) -> Style {
        if self.theme_type == ThemeType::NoColor {
            Style::default().add_modifier(fallback)
        } else {
            Style::default().fg(fg)
        }
    }

    pub fn title_style(&self) -> Style {
        self.colored(self.primary, Modifier::BOLD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        self.colored(self.text, Modifier::empty())
    }

    pub fn muted_style(&self) -> Style {
        self.colored(self.text_muted, Modifier::DIM)
    }

    pub fn emphasis_style(&self) -> Style {
        self.colored(self.text_emphasis, Modifier::BOLD)
    }

    /// Prices and other figures.
    pub fn accent_style(&self) -> Style {
        self.colored(self.secondary, Modifier::BOLD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        self.colored(self.success, Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        self.colored(self.warning, Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        self.colored(self.error, Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        self.colored(self.border, Modifier::empty())
    }

    pub fn border_focused_style(&self) -> Style {
        self.colored(self.border_focused, Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        if self.theme_type == ThemeType::NoColor {
            return Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        Style::default()
            .fg(self.text_emphasis)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn disabled_style(&self) -> Style {
        self.colored(self.text_muted, Modifier::DIM)
    }
}
