//! Service category browser with name search.

use crate::catalog::{self, ServiceCategory};
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::input_field::InputField;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use crate::ui::Screen as ScreenId;
use crate::utils::{create_standard_layout, ListStateExt, TextInput};
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};

pub const NO_SERVICES: &str = "No services found.";

pub struct ServiceCategoriesScreen {
    search: TextInput,
    searching: bool,
    list_state: ListState,
}

impl Default for ServiceCategoriesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceCategoriesScreen {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            search: TextInput::new(),
            searching: false,
            list_state,
        }
    }

    pub fn results(&self) -> Vec<&'static ServiceCategory> {
        catalog::search(self.search.text())
    }

    fn open_selected(&self) -> ScreenAction {
        let results = self.results();
        match self.list_state.selected().and_then(|i| results.get(i)) {
            Some(category) => ScreenAction::Navigate(ScreenId::CategoryDetail(category.key)),
            None => ScreenAction::None,
        }
    }
}

impl Screen for ServiceCategoriesScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        let screen = ScreenId::ServiceCategories;
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(InputField::HEIGHT), Constraint::Min(0)])
            .split(content);
        InputField::render(
            frame,
            rows[0],
            &self.search,
            " Search ",
            "Search services...",
            self.searching,
        );

        let results = self.results();
        self.list_state.clamp_to(results.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.searching {
                t.border_style()
            } else {
                t.border_focused_style()
            })
            .title(" Select a Service ")
            .title_style(t.title_style());

        if results.is_empty() {
            frame.render_widget(
                Paragraph::new(NO_SERVICES).style(t.muted_style()).block(block),
                rows[1],
            );
        } else {
            let items: Vec<ListItem> = results
                .iter()
                .map(|c| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::raw(format!("{} ", c.icon)),
                            Span::styled(c.name, t.emphasis_style()),
                        ]),
                        Line::styled(format!("   {}", c.description), t.muted_style()),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(t.highlight_style())
                .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
            frame.render_stateful_widget(list, rows[1], &mut self.list_state);
        }

        let keymap = ctx.keymap();
        let hint = if self.searching {
            format!(
                "{}: Done | {}: Navigate",
                keymap.key_for(Action::Confirm),
                keymap.navigation_display()
            )
        } else {
            format!(
                "{}: Search | {}",
                keymap.key_for(Action::Search),
                keymap.footer_navigation()
            )
        };
        Footer::render(frame, footer, &hint);
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let action = ctx.action_for(&key);
        let total = self.results().len();

        if self.searching {
            match action {
                Some(Action::Confirm | Action::Cancel) => self.searching = false,
                Some(nav @ (Action::MoveUp | Action::MoveDown)) => {
                    self.list_state.navigate(nav, total);
                }
                Some(action) if action.allowed_while_typing() => {
                    self.search.handle_action(action);
                }
                _ => {
                    if self.search.handle_key(key) {
                        self.list_state.select_first_item(self.results().len());
                    }
                }
            }
            return Ok(ScreenAction::None);
        }

        let Some(action) = action else {
            return Ok(ScreenAction::None);
        };
        if self.list_state.navigate(action, total) {
            return Ok(ScreenAction::None);
        }
        Ok(match action {
            Action::Search => {
                self.searching = true;
                ScreenAction::None
            }
            Action::Confirm => self.open_selected(),
            Action::Cancel => ScreenAction::Navigate(ScreenId::Dashboard),
            Action::Help => ScreenAction::ShowHelp,
            Action::Quit => ScreenAction::Quit,
            _ => ScreenAction::None,
        })
    }

    fn is_input_focused(&self) -> bool {
        self.searching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryKey;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(screen: &mut ServiceCategoriesScreen, code: KeyCode) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), &ctx)
            .unwrap()
    }

    #[test]
    fn test_search_then_open() {
        let mut screen = ServiceCategoriesScreen::new();
        press(&mut screen, KeyCode::Char('/'));
        assert!(screen.is_input_focused());
        for c in "OIL".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        assert_eq!(screen.results().len(), 1);
        press(&mut screen, KeyCode::Enter);
        assert!(!screen.is_input_focused());
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::Navigate(ScreenId::CategoryDetail(CategoryKey::OilChange))
        ));
    }

    #[test]
    fn test_no_match_opens_nothing() {
        let mut screen = ServiceCategoriesScreen::new();
        press(&mut screen, KeyCode::Char('/'));
        for c in "zzz".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        press(&mut screen, KeyCode::Esc);
        assert!(screen.results().is_empty());
        assert!(matches!(press(&mut screen, KeyCode::Enter), ScreenAction::None));
    }

    #[test]
    fn test_escape_goes_back() {
        let mut screen = ServiceCategoriesScreen::new();
        assert!(matches!(
            press(&mut screen, KeyCode::Esc),
            ScreenAction::Navigate(ScreenId::Dashboard)
        ));
    }
}
