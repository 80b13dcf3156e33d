//! Task list, filtered by status on the server.

use crate::api::TaskFilter;
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{Job, JobOutcome, ListView, TaskList};
use crate::styles::theme;
use crate::ui::Screen as ScreenId;
use crate::utils::create_standard_layout;
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};

pub struct TasksScreen {
    list: TaskList,
    table_state: TableState,
}

impl Default for TasksScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TasksScreen {
    pub fn new() -> Self {
        Self {
            list: TaskList::new(),
            table_state: TableState::default(),
        }
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    /// Switch status and fetch its page. A response for the previous status
    /// that arrives later is dropped by the list.
    fn select(&mut self, filter: TaskFilter) -> ScreenAction {
        self.list.select(filter);
        self.table_state.select(Some(0));
        ScreenAction::Run(Job::LoadTasks(filter))
    }

    fn shift_filter(&mut self, step: isize) -> ScreenAction {
        let choices = TaskFilter::CHOICES;
        let current = choices
            .iter()
            .position(|f| *f == self.list.filter())
            .unwrap_or(0);
        let len = choices.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.select(choices[next])
    }
}

impl Screen for TasksScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let screen = ScreenId::Tasks;
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(content);

        let mut chips = vec![Span::styled("Status: ", t.muted_style())];
        for filter in TaskFilter::CHOICES {
            if filter == self.list.filter() {
                chips.push(Span::styled(format!("[{}]", filter), t.highlight_style()));
            } else {
                chips.push(Span::styled(format!(" {} ", filter), t.muted_style()));
            }
            chips.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(chips)), rows[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" Tasks ")
            .title_style(t.title_style());

        match self.list.view() {
            ListView::Loading => {
                frame.render_widget(Paragraph::new("Loading...").style(t.muted_style()).block(block), rows[1]);
            }
            ListView::Failed(message) => {
                frame.render_widget(Paragraph::new(message.to_string()).style(t.error_style()).block(block), rows[1]);
            }
            ListView::Empty(message) => {
                frame.render_widget(Paragraph::new(message).style(t.muted_style()).block(block), rows[1]);
            }
            ListView::Rows(tasks) => {
                let table_rows: Vec<Row> = tasks
                    .iter()
                    .map(|task| {
                        Row::new(vec![
                            task.task_name.clone(),
                            task.task_description.clone(),
                            task.task_status.clone(),
                        ])
                    })
                    .collect();
                let table = Table::new(
                    table_rows,
                    [Constraint::Length(28), Constraint::Min(30), Constraint::Length(14)],
                )
                .header(Row::new(vec!["Name", "Description", "Status"]).style(t.emphasis_style()))
                .row_highlight_style(t.highlight_style())
                .block(block);
                frame.render_stateful_widget(table, rows[1], &mut self.table_state);
            }
        }

        let keymap = ctx.keymap();
        Footer::render(
            frame,
            footer,
            &format!(
                "{}/{}: Status | {}: Reload | {}: Back",
                keymap.key_for(Action::MoveLeft),
                keymap.key_for(Action::MoveRight),
                keymap.key_for(Action::Refresh),
                keymap.key_for(Action::Cancel)
            ),
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let Some(action) = ctx.action_for(&key) else {
            return Ok(ScreenAction::None);
        };
        Ok(match action {
            Action::MoveLeft => self.shift_filter(-1),
            Action::MoveRight => self.shift_filter(1),
            Action::MoveUp => {
                self.table_state.select_previous();
                ScreenAction::None
            }
            Action::MoveDown => {
                self.table_state.select_next();
                ScreenAction::None
            }
            Action::Refresh => self.select(self.list.filter()),
            Action::Cancel => ScreenAction::Navigate(ScreenId::Dashboard),
            Action::Help => ScreenAction::ShowHelp,
            Action::Quit => ScreenAction::Quit,
            _ => ScreenAction::None,
        })
    }

    fn on_enter(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        Ok(self.select(self.list.filter()))
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        if let JobOutcome::TasksLoaded(filter, result) = outcome {
            self.list.apply(filter, result);
        }
        Ok(ScreenAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Task;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn task(name: &str) -> Task {
        Task {
            id: None,
            task_name: name.to_string(),
            task_description: String::new(),
            task_status: "PENDING".to_string(),
        }
    }

    #[test]
    fn test_switching_status_refetches_and_drops_stale_page() {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        let mut screen = TasksScreen::new();
        assert!(matches!(
            screen.on_enter(&ctx).unwrap(),
            ScreenAction::Run(Job::LoadTasks(TaskFilter::All))
        ));

        let action = screen
            .handle_event(Event::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)), &ctx)
            .unwrap();
        assert!(matches!(action, ScreenAction::Run(Job::LoadTasks(TaskFilter::Pending))));

        // The ALL page arrives late and is ignored
        screen
            .on_job_done(JobOutcome::TasksLoaded(TaskFilter::All, Ok(vec![task("old")])), &ctx)
            .unwrap();
        assert!(screen.list().is_loading());

        screen
            .on_job_done(JobOutcome::TasksLoaded(TaskFilter::Pending, Ok(Vec::new())), &ctx)
            .unwrap();
        assert_eq!(
            screen.list().view(),
            ListView::Empty("No tasks found for PENDING.".to_string())
        );
    }
}
