use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Key-hint footer. `text` is "Label: keys | Label: keys".
pub struct Footer;

impl Footer {
    pub const HEIGHT: u16 = 2;

    pub fn render(frame: &mut Frame, area: Rect, text: &str) {
        let t = theme();
        let mut spans = Vec::new();
        for (i, part) in text.split(" | ").enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", t.muted_style()));
            }
            match part.split_once(": ") {
                Some((keys, label)) => {
                    spans.push(Span::styled(format!("{}: ", keys), t.emphasis_style()));
                    spans.push(Span::styled(label, t.text_style()));
                }
                None => spans.push(Span::styled(part, t.text_style())),
            }
        }

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(t.border_focused_style())
            .border_type(BorderType::Rounded);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), inner);
    }
}
