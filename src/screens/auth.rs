//! Sign-in and sign-up screen.
//!
//! One controller with two modes. A successful sign-in needs no navigation
//! of its own: the session store picks up the new session and the route
//! guard moves on to the dashboard.

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
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub const CREDENTIALS_REQUIRED: &str = "Email and password are required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    fn screen(self) -> ScreenId {
        match self {
            AuthMode::SignIn => ScreenId::SignIn,
            AuthMode::SignUp => ScreenId::SignUp,
        }
    }

    fn other(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthField {
    Email,
    Password,
}

pub struct AuthScreen {
    mode: AuthMode,
    email: TextInput,
    password: TextInput,
    focus: AuthField,
    submitting: bool,
    notice: Option<Notice>,
}

impl AuthScreen {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            email: TextInput::new(),
            password: TextInput::masked(),
            focus: AuthField::Email,
            submitting: false,
            notice: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }

    fn submit(&mut self) -> ScreenAction {
        if self.submitting {
            return ScreenAction::None;
        }
        let email = self.email.text().trim().to_string();
        let password = self.password.text().to_string();
        if email.is_empty() || password.is_empty() {
            self.notice = Some(Notice::Error(CREDENTIALS_REQUIRED.to_string()));
            return ScreenAction::None;
        }
        self.submitting = true;
        self.notice = None;
        let job = match self.mode {
            AuthMode::SignIn => Job::SignIn { email, password },
            AuthMode::SignUp => Job::SignUp { email, password },
        };
        ScreenAction::Run(job)
    }
}

impl Screen for AuthScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let screen = self.mode.screen();
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), None);

        let card = center_popup(content, 60, 80);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(format!(" {} ", self.mode.submit_label()))
            .title_style(t.title_style())
            .title_alignment(Alignment::Center);
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(InputField::HEIGHT),
                Constraint::Length(InputField::HEIGHT),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        InputField::render(frame, rows[0], &self.email, "Email", "you@example.com", self.focus == AuthField::Email);
        InputField::render(frame, rows[1], &self.password, "Password", "", self.focus == AuthField::Password);

        let status = if self.submitting {
            Paragraph::new("Please wait...").style(t.muted_style())
        } else {
            Paragraph::new(format!(
                "{}: {}",
                ctx.keymap().key_for(Action::Submit),
                self.mode.submit_label()
            ))
            .style(t.accent_style())
        };
        frame.render_widget(status, rows[2]);

        if let Some(notice) = &self.notice {
            notice.render(frame, rows[3]);
        }

        let switch_hint = match self.mode {
            AuthMode::SignIn => "Don't have an account? Sign Up",
            AuthMode::SignUp => "Already have an account? Sign In",
        };
        frame.render_widget(
            Paragraph::new(format!("{} ({})", switch_hint, ctx.keymap().key_for(Action::SwitchMode)))
                .style(t.muted_style())
                .alignment(Alignment::Center),
            rows[4],
        );

        Footer::render(frame, footer, &ctx.keymap().footer_form());
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        match ctx.action_for(&key) {
            Some(Action::NextField | Action::PrevField | Action::MoveUp | Action::MoveDown) => {
                self.toggle_focus();
            }
            Some(Action::Confirm) if self.focus == AuthField::Email => {
                self.focus = AuthField::Password;
            }
            Some(Action::Confirm | Action::Submit) => return Ok(self.submit()),
            Some(Action::SwitchMode) => {
                return Ok(ScreenAction::Navigate(self.mode.other().screen()));
            }
            Some(Action::Cancel) => return Ok(ScreenAction::Quit),
            Some(action) if action.allowed_while_typing() => {
                self.focused_input().handle_action(action);
            }
            _ => {
                self.focused_input().handle_key(key);
            }
        }
        Ok(ScreenAction::None)
    }

    fn is_input_focused(&self) -> bool {
        true
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        match outcome {
            JobOutcome::SignedIn(result) => {
                self.submitting = false;
                if let Err(e) = result {
                    self.notice = Some(Notice::error(&e));
                }
            }
            JobOutcome::SignedUp(result) => {
                self.submitting = false;
                self.notice = Some(match result {
                    Ok(outcome) => {
                        self.password.clear();
                        Notice::Success(outcome.message().to_string())
                    }
                    Err(e) => Notice::error(&e),
                });
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SignUpOutcome;
    use crate::config::Config;
    use crate::error::AppError;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(screen: &mut AuthScreen, code: KeyCode, modifiers: KeyModifiers) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, modifiers)), &ctx)
            .unwrap()
    }

    fn type_text(screen: &mut AuthScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_sign_in_requests_job_with_trimmed_email() {
        let mut screen = AuthScreen::new(AuthMode::SignIn);
        type_text(&mut screen, " quinn@example.com ");
        press(&mut screen, KeyCode::Tab, KeyModifiers::NONE);
        type_text(&mut screen, "hunter2q");

        let action = press(&mut screen, KeyCode::Enter, KeyModifiers::NONE);
        match action {
            ScreenAction::Run(Job::SignIn { email, password }) => {
                assert_eq!(email, "quinn@example.com");
                assert_eq!(password, "hunter2q");
            }
            other => panic!("unexpected action: {:?}", other),
        }

        // A second submit while the first is in flight is ignored
        assert!(matches!(
            press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL),
            ScreenAction::None
        ));
    }

    #[test]
    fn test_blank_credentials_are_not_sent() {
        let mut screen = AuthScreen::new(AuthMode::SignUp);
        let action = press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches!(action, ScreenAction::None));
        assert_eq!(screen.notice(), Some(&Notice::Error(CREDENTIALS_REQUIRED.to_string())));
    }

    #[test]
    fn test_sign_up_outcome_messages() {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        let mut screen = AuthScreen::new(AuthMode::SignUp);

        screen
            .on_job_done(JobOutcome::SignedUp(Ok(SignUpOutcome::default())), &ctx)
            .unwrap();
        assert_eq!(
            screen.notice().map(Notice::text),
            Some("Check your email for a confirmation link (if email confirmations are enabled).")
        );

        screen
            .on_job_done(
                JobOutcome::SignedUp(Err(AppError::ServerRejected("User already registered".into()))),
                &ctx,
            )
            .unwrap();
        assert!(screen.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn test_switch_mode_navigates() {
        let mut screen = AuthScreen::new(AuthMode::SignIn);
        let action = press(&mut screen, KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert!(matches!(action, ScreenAction::Navigate(ScreenId::SignUp)));
    }

    #[test]
    fn test_q_is_typed_not_quit() {
        let mut screen = AuthScreen::new(AuthMode::SignIn);
        let action = press(&mut screen, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(action, ScreenAction::None));
        assert_eq!(screen.email.text(), "q");
    }
}
