//! Help Overlay Component
//!
//! Lists the active keybindings when the user presses the help key. Any key
//! closes it.

use crate::keymap::{KeyBinding, Keymap};
use crate::styles::theme;
use crate::utils::center_popup;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct HelpOverlay;

impl HelpOverlay {
    /// Bindings grouped by category, categories in first-seen order.
    pub fn grouped(keymap: &Keymap) -> Vec<(&'static str, Vec<KeyBinding>)> {
        let mut groups: Vec<(&'static str, Vec<KeyBinding>)> = Vec::new();
        for binding in keymap.all_bindings() {
            let category = binding.action.category();
            match groups.iter_mut().find(|(name, _)| *name == category) {
                Some((_, list)) => list.push(binding),
                None => groups.push((category, vec![binding])),
            }
        }
        groups
    }

    pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap, config_path: &str) {
        let t = theme();
        let popup_area = center_popup(area, 80, 85);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" Keyboard Shortcuts - {} ", keymap.preset.name()))
            .title_alignment(Alignment::Center)
            .title_style(t.title_style())
            .border_style(t.border_focused_style());
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(inner);

        let mut lines: Vec<Line> = Vec::new();
        for (category, bindings) in Self::grouped(keymap) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::styled(format!("  {}", category), t.accent_style()));
            for binding in bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("    {:12}", binding.display()), t.emphasis_style()),
                    Span::styled(binding.get_description().to_string(), t.text_style()),
                ]));
            }
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

        let footer = Paragraph::new(format!(
            "Edit keybindings in: {}\nPress any key to close",
            config_path
        ))
        .style(t.muted_style())
        .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Action;

    #[test]
    fn test_groups_keep_first_seen_order() {
        let keymap = Keymap {
            overrides: vec![KeyBinding::new("p", Action::ToggleTier)],
            ..Keymap::default()
        };
        let groups = HelpOverlay::grouped(&keymap);
        assert_eq!(groups[0].0, "Actions");
        assert_eq!(groups[0].1[0].key, "p");

        let mut names: Vec<&str> = groups.iter().map(|(n, _)| *n).collect();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
        assert!(names.contains(&"Navigation"));
    }
}
