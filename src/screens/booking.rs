//! Booking form for a chosen shop and tier.

use crate::booking::{BookingDraft, Checkout, CheckoutState, FormField};
use crate::catalog::CategoryKey;
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::input_field::InputField;
use crate::components::notice::Notice;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{Job, JobOutcome};
use crate::styles::theme;
use crate::ui::Screen as ScreenId;
use crate::utils::{center_popup, create_standard_layout, TextInput};
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

pub const NO_SHOP_SELECTED: &str = "No shop selected. Please choose one first.";

pub struct BookingScreen {
    checkout: Checkout,
    inputs: Vec<TextInput>,
    focus: usize,
}

impl BookingScreen {
    pub fn new(category: CategoryKey, draft: Option<BookingDraft>) -> Self {
        Self {
            checkout: Checkout::new(category, draft),
            inputs: FormField::ALL.iter().map(|_| TextInput::new()).collect(),
            focus: 0,
        }
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    fn focused_field(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    fn sync_focused(&mut self) {
        let field = self.focused_field();
        let value = self.inputs[self.focus].text().to_string();
        self.checkout.form.set(field, value);
    }

    fn back(&self) -> ScreenAction {
        ScreenAction::Navigate(ScreenId::CategoryDetail(self.checkout.category()))
    }

    fn submit(&mut self, ctx: &ScreenContext) -> ScreenAction {
        if self.checkout.is_submitting() {
            return ScreenAction::None;
        }
        match self.checkout.prepare(ctx.user) {
            Ok(booking) => ScreenAction::Run(Job::SubmitBooking(booking)),
            // The failure message is kept in the checkout state
            Err(_) => ScreenAction::None,
        }
    }

    fn render_recovery(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let t = theme();
        let popup = center_popup(area, 60, 40);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" Booking ")
            .title_style(t.title_style());
        let lines = vec![
            Line::styled(NO_SHOP_SELECTED, t.warning_style()),
            Line::from(""),
            Line::styled(
                format!(
                    "{}: Choose a shop",
                    ctx.keymap().key_for(Action::Confirm)
                ),
                t.accent_style(),
            ),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            popup,
        );
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, draft: &BookingDraft) {
        let t = theme();
        let mut constraints = vec![Constraint::Length(3)];
        constraints.extend(FormField::ALL.iter().map(|_| Constraint::Length(InputField::HEIGHT)));
        constraints.push(Constraint::Min(1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let summary = Line::from(vec![
            Span::styled(draft.shop.name.clone(), t.emphasis_style()),
            Span::styled(format!("  •  {}  •  ", draft.tier), t.muted_style()),
            Span::styled(format!("${}", draft.shop.price), t.success_style()),
            Span::styled(format!("  •  ETA {} min", draft.shop.eta_minutes), t.muted_style()),
        ]);
        frame.render_widget(
            Paragraph::new(summary).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(t.border_style())
                    .title(" Your Selection "),
            ),
            rows[0],
        );

        for (i, field) in FormField::ALL.iter().enumerate() {
            let label = if field.required() {
                format!(" {} * ", field.label())
            } else {
                format!(" {} ", field.label())
            };
            InputField::render(
                frame,
                rows[i + 1],
                &self.inputs[i],
                &label,
                field.placeholder(),
                i == self.focus && !self.checkout.is_submitting(),
            );
        }

        let status = rows[FormField::ALL.len() + 1];
        match self.checkout.state() {
            CheckoutState::Submitting => {
                frame.render_widget(Paragraph::new("Confirming booking...").style(t.muted_style()), status);
            }
            CheckoutState::Failed(message) => Notice::Error(message.clone()).render(frame, status),
            CheckoutState::Completed => {
                Notice::Success("Booking confirmed.".to_string()).render(frame, status);
            }
            CheckoutState::FormFilling => {}
        }
    }
}

impl Screen for BookingScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let screen = ScreenId::Booking(self.checkout.category());
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        match self.checkout.draft() {
            Some(draft) => {
                self.render_form(frame, content, draft);
                Footer::render(frame, footer, &ctx.keymap().footer_form());
            }
            None => {
                self.render_recovery(frame, content, ctx);
                Footer::render(
                    frame,
                    footer,
                    &format!("{}: Choose a shop", ctx.keymap().key_for(Action::Confirm)),
                );
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let action = ctx.action_for(&key);

        if self.checkout.needs_recovery() {
            return Ok(match action {
                Some(Action::Confirm | Action::Cancel) => self.back(),
                Some(Action::Quit) => ScreenAction::Quit,
                _ => ScreenAction::None,
            });
        }

        match action {
            Some(Action::NextField | Action::MoveDown) => {
                self.focus = (self.focus + 1) % self.inputs.len();
            }
            Some(Action::PrevField | Action::MoveUp) => {
                self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
            }
            Some(Action::Confirm) if self.focus + 1 < self.inputs.len() => {
                self.focus += 1;
            }
            Some(Action::Confirm | Action::Submit) => return Ok(self.submit(ctx)),
            Some(Action::Cancel) => return Ok(self.back()),
            _ if self.checkout.is_submitting() => {}
            Some(action) if action.allowed_while_typing() => {
                if self.inputs[self.focus].handle_action(action) {
                    self.sync_focused();
                }
            }
            _ => {
                if self.inputs[self.focus].handle_key(key) {
                    self.sync_focused();
                }
            }
        }
        Ok(ScreenAction::None)
    }

    fn is_input_focused(&self) -> bool {
        !self.checkout.needs_recovery()
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        if let JobOutcome::BookingSubmitted(result) = outcome {
            self.checkout.finish(result);
            if self.checkout.state() == &CheckoutState::Completed {
                return Ok(ScreenAction::Navigate(ScreenId::Bookings));
            }
        }
        Ok(ScreenAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use crate::booking::{PricingTable, ShopPicker, Tier};
    use crate::config::Config;
    use crate::error::{AppError, MISSING_SHOP_OR_USER};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn draft() -> BookingDraft {
        let mut picker = ShopPicker::new(CategoryKey::OilChange, PricingTable::default());
        picker.select_shop("o2");
        picker.select_tier(Tier::Premium).unwrap();
        picker.proceed().unwrap()
    }

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: Some("sam@example.com".to_string()),
        }
    }

    fn press(screen: &mut BookingScreen, user: Option<&User>, code: KeyCode, modifiers: KeyModifiers) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, user);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, modifiers)), &ctx)
            .unwrap()
    }

    fn fill(screen: &mut BookingScreen, values: &[&str]) {
        for value in values {
            for c in value.chars() {
                press(screen, None, KeyCode::Char(c), KeyModifiers::NONE);
            }
            press(screen, None, KeyCode::Tab, KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_recovery_routes_back_to_picker() {
        let mut screen = BookingScreen::new(CategoryKey::Balancing, None);
        assert!(screen.checkout().needs_recovery());
        assert!(matches!(
            press(&mut screen, None, KeyCode::Enter, KeyModifiers::NONE),
            ScreenAction::Navigate(ScreenId::CategoryDetail(CategoryKey::Balancing))
        ));
    }

    #[test]
    fn test_submit_builds_booking_from_typed_fields() {
        let mut screen = BookingScreen::new(CategoryKey::OilChange, Some(draft()));
        fill(&mut screen, &["2026-11-02", "10:30", "Maruti", "Swift", "TS09AB1234"]);

        let user = user();
        match press(&mut screen, Some(&user), KeyCode::Char('s'), KeyModifiers::CONTROL) {
            ScreenAction::Run(Job::SubmitBooking(booking)) => {
                assert_eq!(booking.user_id, "user-1");
                assert_eq!(booking.shop_id, "o2");
                assert_eq!(booking.price, 81);
                assert_eq!(booking.vehicle_model, "Swift");
                assert_eq!(booking.notes, "");
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(screen.checkout().is_submitting());
    }

    #[test]
    fn test_missing_user_blocks_submit() {
        let mut screen = BookingScreen::new(CategoryKey::OilChange, Some(draft()));
        fill(&mut screen, &["2026-11-02", "10:30", "Maruti", "Swift", "TS09AB1234"]);
        let action = press(&mut screen, None, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches!(action, ScreenAction::None));
        assert_eq!(screen.checkout().message(), Some(MISSING_SHOP_OR_USER));
    }

    #[test]
    fn test_success_navigates_and_failure_stays() {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);

        let mut screen = BookingScreen::new(CategoryKey::OilChange, Some(draft()));
        let action = screen
            .on_job_done(
                JobOutcome::BookingSubmitted(Err(AppError::ServerRejected("Slot taken".into()))),
                &ctx,
            )
            .unwrap();
        assert!(matches!(action, ScreenAction::None));
        assert_eq!(screen.checkout().message(), Some("Slot taken"));

        let action = screen
            .on_job_done(JobOutcome::BookingSubmitted(Ok(())), &ctx)
            .unwrap();
        assert!(matches!(action, ScreenAction::Navigate(ScreenId::Bookings)));
    }
}
