use crate::error::AppError;
use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

/// A one-line status message under a form or list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Error(String),
}

impl Notice {
    pub fn error(err: &AppError) -> Self {
        Notice::Error(err.to_string())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Success(s) | Notice::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn style(&self) -> Style {
        let t = theme();
        match self {
            Notice::Info(_) => t.muted_style(),
            Notice::Success(_) => t.success_style(),
            Notice::Error(_) => t.error_style(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Paragraph::new(self.text()).style(self.style()).wrap(Wrap { trim: true }),
            area,
        );
    }
}
