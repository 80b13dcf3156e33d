use crate::styles::theme;
use crate::utils::text_input::TextInput;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Bordered, labelled text input. Places the terminal cursor when focused.
pub struct InputField;

impl InputField {
    pub const HEIGHT: u16 = 3;

    pub fn render(frame: &mut Frame, area: Rect, input: &TextInput, label: &str, placeholder: &str, focused: bool) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(label)
            .border_style(if focused {
                t.border_focused_style()
            } else {
                t.border_style()
            });
        let inner = block.inner(area);

        let paragraph = if input.text().is_empty() {
            Paragraph::new(placeholder).style(t.disabled_style())
        } else {
            Paragraph::new(input.display_text()).style(t.text_style())
        };
        frame.render_widget(paragraph.block(block), area);

        if focused {
            let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
            let x = inner.x + offset.min(inner.width.saturating_sub(1));
            frame.set_cursor_position((x, inner.y));
        }
    }
}
