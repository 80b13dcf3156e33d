//! Task creation form.

use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::input_field::InputField;
use crate::components::notice::Notice;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{Job, JobOutcome, TaskComposer, TaskOutcome};
use crate::styles::theme;
use crate::ui::Screen as ScreenId;
use crate::utils::{create_standard_layout, TextInput};
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const FIELDS: [(&str, &str); 3] = [
    ("Task Name", "e.g., Inspect brake pads"),
    ("Description", "What needs to be done?"),
    ("Status", "e.g., PENDING"),
];

pub struct NewTaskScreen {
    composer: TaskComposer,
    inputs: [TextInput; 3],
    focus: usize,
}

impl Default for NewTaskScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl NewTaskScreen {
    pub fn new() -> Self {
        Self {
            composer: TaskComposer::new(),
            inputs: Default::default(),
            focus: 0,
        }
    }

    pub fn composer(&self) -> &TaskComposer {
        &self.composer
    }

    fn sync(&mut self) {
        self.composer.name = self.inputs[0].text().to_string();
        self.composer.description = self.inputs[1].text().to_string();
        self.composer.status = self.inputs[2].text().to_string();
    }

    fn submit(&mut self) -> ScreenAction {
        self.sync();
        match self.composer.prepare() {
            Some(task) => ScreenAction::Run(Job::CreateTask(task)),
            None => ScreenAction::None,
        }
    }

    fn add_another(&mut self) {
        self.composer.add_another();
        self.inputs = Default::default();
        self.focus = 0;
    }
}

impl Screen for NewTaskScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let keymap = ctx.keymap();
        let screen = ScreenId::NewTask;
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(InputField::HEIGHT),
                Constraint::Length(InputField::HEIGHT),
                Constraint::Length(InputField::HEIGHT),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(content);

        let editable = !self.composer.is_submitted() && !self.composer.is_submitting();
        for (i, (label, placeholder)) in FIELDS.iter().enumerate() {
            InputField::render(
                frame,
                rows[i],
                &self.inputs[i],
                &format!(" {} ", label),
                placeholder,
                editable && i == self.focus,
            );
        }

        if self.composer.is_submitting() {
            frame.render_widget(Paragraph::new("Saving task...").style(t.muted_style()), rows[3]);
        } else if let Some(outcome) = self.composer.outcome() {
            let notice = match outcome {
                TaskOutcome::Created => Notice::Success(outcome.message().to_string()),
                _ => Notice::Error(outcome.message().to_string()),
            };
            notice.render(frame, rows[3]);
        }

        let hint = if self.composer.is_submitted() {
            format!(
                "{}: Add another task | {}: Back",
                keymap.key_for(Action::Create),
                keymap.key_for(Action::Cancel)
            )
        } else {
            keymap.footer_form()
        };
        Footer::render(frame, footer, &hint);
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let action = ctx.action_for(&key);

        if self.composer.is_submitted() {
            return Ok(match action {
                Some(Action::Create | Action::Confirm) => {
                    self.add_another();
                    ScreenAction::None
                }
                Some(Action::Cancel) => ScreenAction::Navigate(ScreenId::Dashboard),
                Some(Action::Help) => ScreenAction::ShowHelp,
                Some(Action::Quit) => ScreenAction::Quit,
                _ => ScreenAction::None,
            });
        }

        match action {
            Some(Action::NextField | Action::MoveDown) => self.focus = (self.focus + 1) % FIELDS.len(),
            Some(Action::PrevField | Action::MoveUp) => {
                self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
            }
            Some(Action::Confirm) if self.focus + 1 < FIELDS.len() => self.focus += 1,
            Some(Action::Confirm | Action::Submit) => return Ok(self.submit()),
            Some(Action::Cancel) => return Ok(ScreenAction::Navigate(ScreenId::Dashboard)),
            _ if self.composer.is_submitting() => {}
            Some(action) if action.allowed_while_typing() => {
                self.inputs[self.focus].handle_action(action);
            }
            _ => {
                self.inputs[self.focus].handle_key(key);
            }
        }
        Ok(ScreenAction::None)
    }

    fn is_input_focused(&self) -> bool {
        !self.composer.is_submitted()
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        if let JobOutcome::TaskCreated(result) = outcome {
            self.composer.finish(result);
        }
        Ok(ScreenAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::services::task_form::{TASK_CREATED, TASK_FAILED, TASK_UNREACHABLE};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(screen: &mut NewTaskScreen, code: KeyCode, modifiers: KeyModifiers) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, modifiers)), &ctx)
            .unwrap()
    }

    fn done(screen: &mut NewTaskScreen, result: Result<(), AppError>) {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen.on_job_done(JobOutcome::TaskCreated(result), &ctx).unwrap();
    }

    fn type_text(screen: &mut NewTaskScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_submit_sends_typed_task() {
        let mut screen = NewTaskScreen::new();
        type_text(&mut screen, "Rotate tyres");
        press(&mut screen, KeyCode::Tab, KeyModifiers::NONE);
        type_text(&mut screen, "All four");
        press(&mut screen, KeyCode::Tab, KeyModifiers::NONE);
        type_text(&mut screen, "PENDING");

        match press(&mut screen, KeyCode::Enter, KeyModifiers::NONE) {
            ScreenAction::Run(Job::CreateTask(task)) => {
                assert_eq!(task.task_name, "Rotate tyres");
                assert_eq!(task.task_description, "All four");
                assert_eq!(task.task_status, "PENDING");
            }
            other => panic!("unexpected action: {:?}", other),
        }
        // In flight: a second submit is ignored
        assert!(matches!(
            press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL),
            ScreenAction::None
        ));
    }

    #[test]
    fn test_outcomes_and_add_another() {
        let mut screen = NewTaskScreen::new();
        type_text(&mut screen, "Wash");
        press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL);
        done(&mut screen, Err(AppError::Unreachable("connection refused".into())));
        assert_eq!(screen.composer().outcome().map(TaskOutcome::message), Some(TASK_UNREACHABLE));

        press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL);
        done(&mut screen, Err(AppError::from_status(500, "")));
        assert_eq!(screen.composer().outcome().map(TaskOutcome::message), Some(TASK_FAILED));

        press(&mut screen, KeyCode::Char('s'), KeyModifiers::CONTROL);
        done(&mut screen, Ok(()));
        assert_eq!(screen.composer().outcome().map(TaskOutcome::message), Some(TASK_CREATED));
        assert!(!screen.is_input_focused());

        press(&mut screen, KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(screen.composer().outcome().is_none());
        assert_eq!(screen.composer().name, "");
        assert!(screen.is_input_focused());
    }
}
