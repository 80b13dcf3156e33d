//! Shop list for one category with tier toggle and shop selection.

use crate::booking::{PricingTable, ShopPicker, Tier};
use crate::catalog::CategoryKey;
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::notice::Notice;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use crate::ui::Screen as ScreenId;
use crate::utils::{create_standard_layout, ListStateExt};
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap};

pub struct CategoryDetailScreen {
    picker: ShopPicker,
    list_state: ListState,
    notice: Option<Notice>,
}

impl CategoryDetailScreen {
    pub fn new(category: CategoryKey, pricing: PricingTable) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            picker: ShopPicker::new(category, pricing),
            list_state,
            notice: None,
        }
    }

    pub fn picker(&self) -> &ShopPicker {
        &self.picker
    }

    fn screen_id(&self) -> ScreenId {
        ScreenId::CategoryDetail(self.picker.category())
    }

    fn select_highlighted(&mut self) {
        let shops = self.picker.shops();
        if let Some(shop) = self.list_state.selected().and_then(|i| shops.get(i)) {
            self.picker.select_shop(&shop.id);
        }
    }

    fn toggle_tier(&mut self) {
        let next = self.picker.tier().toggled();
        self.notice = self.picker.select_tier(next).err().map(|e| Notice::error(&e));
    }

    fn proceed(&mut self) -> ScreenAction {
        match self.picker.proceed() {
            Some(draft) => ScreenAction::StartBooking(draft),
            None => {
                self.notice = Some(Notice::Info(self.picker.summary()));
                ScreenAction::None
            }
        }
    }
}

impl Screen for CategoryDetailScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let keymap = ctx.keymap();
        let category = self.picker.category();
        let screen = self.screen_id();
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(content);

        // Tier selector
        let tier = self.picker.tier();
        let chip = |label: &'static str, active: bool, enabled: bool| {
            if !enabled {
                Span::styled(format!(" {} ", label), t.disabled_style())
            } else if active {
                Span::styled(format!("[{}]", label), t.highlight_style())
            } else {
                Span::styled(format!(" {} ", label), t.text_style())
            }
        };
        let mut tier_line = vec![
            Span::styled("Tier: ", t.muted_style()),
            chip("Standard", tier == Tier::Standard, true),
            Span::raw(" "),
            chip("Premium", tier == Tier::Premium, self.picker.premium_available()),
            Span::styled(format!("   ({} to toggle)", keymap.key_for(Action::ToggleTier)), t.muted_style()),
        ];
        if let Some(summary) = category.tier_summary(tier == Tier::Premium) {
            tier_line.push(Span::styled(format!("   {}", summary), t.accent_style()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(tier_line)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(t.border_style()),
            ),
            rows[0],
        );

        // Shops
        let shops = self.picker.shops();
        self.list_state.clamp_to(shops.len());
        let selected_id = self.picker.selected_id();
        let items: Vec<ListItem> = shops
            .iter()
            .map(|shop| {
                let marker = if selected_id == Some(shop.id.as_str()) { "● " } else { "○ " };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(marker, t.accent_style()),
                        Span::styled(shop.name.clone(), t.emphasis_style()),
                        Span::styled(format!("  ${}", shop.price), t.success_style()),
                    ]),
                    Line::styled(
                        format!(
                            "    {:.1} km • ⭐ {:.1} • ETA {} min",
                            shop.distance_km, shop.rating, shop.eta_minutes
                        ),
                        t.muted_style(),
                    ),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(t.border_focused_style())
                    .title(format!(" {} {} - Nearby Shops ", category.category().icon, category.category().name))
                    .title_style(t.title_style()),
            )
            .highlight_style(t.highlight_style())
            .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(list, rows[1], &mut self.list_state);

        // Selection summary and proceed
        let proceed_style = if self.picker.can_proceed() {
            t.accent_style()
        } else {
            t.disabled_style()
        };
        let mut lines = vec![
            Line::styled(self.picker.summary(), t.text_style()),
            Line::styled(
                format!("{}: Proceed to Booking", keymap.key_for(Action::Submit)),
                proceed_style,
            ),
        ];
        if let Some(notice) = &self.notice {
            lines.push(Line::styled(notice.text().to_string(), notice.style()));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[2]);

        Footer::render(frame, footer, &keymap.footer_navigation());
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let Some(action) = ctx.action_for(&key) else {
            return Ok(ScreenAction::None);
        };
        if self.list_state.navigate(action, self.picker.shops().len()) {
            return Ok(ScreenAction::None);
        }
        Ok(match action {
            Action::Confirm => {
                self.select_highlighted();
                self.notice = None;
                ScreenAction::None
            }
            Action::ToggleTier | Action::MoveLeft | Action::MoveRight => {
                self.toggle_tier();
                ScreenAction::None
            }
            Action::Submit => self.proceed(),
            Action::Cancel => ScreenAction::Navigate(ScreenId::ServiceCategories),
            Action::Help => ScreenAction::ShowHelp,
            Action::Quit => ScreenAction::Quit,
            _ => ScreenAction::None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(screen: &mut CategoryDetailScreen, code: KeyCode, modifiers: KeyModifiers) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, modifiers)), &ctx)
            .unwrap()
    }

    #[test]
    fn test_proceed_needs_a_selection() {
        let mut screen = CategoryDetailScreen::new(CategoryKey::TyreChange, PricingTable::default());
        assert!(matches!(
            press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL),
            ScreenAction::None
        ));
        assert_eq!(
            screen.notice.as_ref().map(Notice::text),
            Some("Pick a shop to proceed.")
        );
    }

    #[test]
    fn test_select_toggle_and_proceed() {
        let mut screen = CategoryDetailScreen::new(CategoryKey::TyreChange, PricingTable::default());
        press(&mut screen, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut screen, KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(screen.picker().tier(), Tier::Premium);

        match press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL) {
            ScreenAction::StartBooking(draft) => {
                assert_eq!(draft.shop.id, "s1");
                assert_eq!(draft.shop.price, 150);
                assert_eq!(draft.tier, Tier::Premium);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_battery_premium_is_refused() {
        let mut screen = CategoryDetailScreen::new(CategoryKey::BatteryCheck, PricingTable::default());
        press(&mut screen, KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(screen.picker().tier(), Tier::Standard);
        assert!(screen.notice.as_ref().is_some_and(Notice::is_error));
    }
}
