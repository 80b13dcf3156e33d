use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

/// Common header: screen title, current location path and who is signed in.
pub struct Header;

impl Header {
    pub const HEIGHT: u16 = 4;

    pub fn render(frame: &mut Frame, area: Rect, title: &str, path: &str, signed_in_as: Option<&str>) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(t.border_focused_style())
            .title(format!(" servicebay - {} ", title))
            .title_style(t.title_style())
            .title_alignment(Alignment::Center)
            .padding(Padding::new(1, 1, 0, 0));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(40)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(path).style(t.muted_style()).wrap(Wrap { trim: true }),
            columns[0],
        );
        if let Some(who) = signed_in_as {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Signed in as ", t.muted_style()),
                    Span::styled(who, t.emphasis_style()),
                ]))
                .alignment(Alignment::Right),
                columns[1],
            );
        }
    }
}
