//! The signed-in user's bookings with category filter chips.

use crate::api::{BookingFilter, BookingRecord};
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{BookingList, Job, JobOutcome, ListView};
use crate::styles::theme;
use crate::ui::Screen as ScreenId;
use crate::utils::create_standard_layout;
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};

pub struct BookingsScreen {
    list: BookingList,
    table_state: TableState,
}

impl Default for BookingsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingsScreen {
    pub fn new() -> Self {
        Self {
            list: BookingList::new(),
            table_state: TableState::default(),
        }
    }

    pub fn list(&self) -> &BookingList {
        &self.list
    }

    fn reload(&mut self) -> ScreenAction {
        if self.list.is_loading() {
            return ScreenAction::None;
        }
        self.list.begin_load();
        ScreenAction::Run(Job::LoadBookings)
    }

    fn shift_filter(&mut self, step: isize) {
        let choices = BookingFilter::CHOICES;
        let current = choices
            .iter()
            .position(|f| *f == self.list.filter())
            .unwrap_or(0);
        let len = choices.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.list.set_filter(choices[next]);
        self.table_state.select(Some(0));
    }

    fn row(record: &BookingRecord) -> Row<'static> {
        let service = record
            .category()
            .map_or_else(|| record.service_type.clone(), |k| k.category().name.to_string());
        Row::new(vec![
            service,
            record.shop_name.clone(),
            record.tier.clone(),
            format!("${}", record.price),
            format!("{} {}", record.date, record.time),
            format!("{} {} ({})", record.vehicle_make, record.vehicle_model, record.registration),
            record.notes().unwrap_or("-").to_string(),
        ])
    }
}

impl Screen for BookingsScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let screen = ScreenId::Bookings;
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(content);

        // Filter chips and total
        let mut chips = Vec::new();
        for filter in BookingFilter::CHOICES {
            let label = match filter {
                BookingFilter::All => "ALL".to_string(),
                BookingFilter::Category(key) => key.category().name.to_string(),
            };
            if filter == self.list.filter() {
                chips.push(Span::styled(format!("[{}]", label), t.highlight_style()));
            } else {
                chips.push(Span::styled(format!(" {} ", label), t.muted_style()));
            }
            chips.push(Span::raw(" "));
        }
        if let Some(total) = self.list.total() {
            chips.push(Span::styled(format!("  {} total", total), t.accent_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(chips)), rows[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" My Bookings ")
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
            ListView::Rows(records) => {
                let table_rows: Vec<Row> = records.iter().map(|r| Self::row(r)).collect();
                let table = Table::new(
                    table_rows,
                    [
                        Constraint::Length(16),
                        Constraint::Length(22),
                        Constraint::Length(9),
                        Constraint::Length(7),
                        Constraint::Length(17),
                        Constraint::Min(20),
                        Constraint::Min(10),
                    ],
                )
                .header(
                    Row::new(vec!["Service", "Shop", "Tier", "Price", "When", "Vehicle", "Notes"])
                        .style(t.emphasis_style()),
                )
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
                "{}/{}: Filter | {}: Reload | {}: Back",
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
            Action::MoveLeft => {
                self.shift_filter(-1);
                ScreenAction::None
            }
            Action::MoveRight => {
                self.shift_filter(1);
                ScreenAction::None
            }
            Action::MoveUp => {
                self.table_state.select_previous();
                ScreenAction::None
            }
            Action::MoveDown => {
                self.table_state.select_next();
                ScreenAction::None
            }
            Action::Refresh => self.reload(),
            Action::Cancel => ScreenAction::Navigate(ScreenId::Dashboard),
            Action::Help => ScreenAction::ShowHelp,
            Action::Quit => ScreenAction::Quit,
            _ => ScreenAction::None,
        })
    }

    fn on_enter(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        self.list.begin_load();
        Ok(ScreenAction::Run(Job::LoadBookings))
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        if let JobOutcome::BookingsLoaded(result) = outcome {
            self.list.apply(result);
            self.table_state.select(Some(0));
        }
        Ok(ScreenAction::None)
    }
}
