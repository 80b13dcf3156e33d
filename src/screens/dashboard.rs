//! Dashboard: navigation hub and location detection.

use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::notice::Notice;
use crate::geo::Detection;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{Job, JobOutcome};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use crate::ui::Screen as ScreenId;
use crate::utils::{create_standard_layout, ListStateExt};
use anyhow::Result;
use crossterm::event::Event;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    DetectLocation,
    BrowseServices,
    MyBookings,
    NewTask,
    ViewTasks,
    SignOut,
}

impl MenuItem {
    pub const ALL: [MenuItem; 6] = [
        MenuItem::DetectLocation,
        MenuItem::BrowseServices,
        MenuItem::MyBookings,
        MenuItem::NewTask,
        MenuItem::ViewTasks,
        MenuItem::SignOut,
    ];

    pub fn text(&self) -> &'static str {
        match self {
            MenuItem::DetectLocation => "Detect My Location",
            MenuItem::BrowseServices => "Book a Service",
            MenuItem::MyBookings => "My Bookings",
            MenuItem::NewTask => "Create Task",
            MenuItem::ViewTasks => "View Tasks",
            MenuItem::SignOut => "Sign Out",
        }
    }

    fn target(&self) -> Option<ScreenId> {
        match self {
            MenuItem::BrowseServices => Some(ScreenId::ServiceCategories),
            MenuItem::MyBookings => Some(ScreenId::Bookings),
            MenuItem::NewTask => Some(ScreenId::NewTask),
            MenuItem::ViewTasks => Some(ScreenId::Tasks),
            MenuItem::DetectLocation | MenuItem::SignOut => None,
        }
    }
}

pub struct DashboardScreen {
    list_state: ListState,
    /// Loading gate for detection; a second trigger is ignored while set.
    detecting: bool,
    detection: Option<Detection>,
    notice: Option<Notice>,
    signing_out: bool,
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreen {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            list_state,
            detecting: false,
            detection: None,
            notice: None,
            signing_out: false,
        }
    }

    pub fn is_detecting(&self) -> bool {
        self.detecting
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }

    fn selected_item(&self) -> Option<MenuItem> {
        self.list_state
            .selected()
            .and_then(|i| MenuItem::ALL.get(i).copied())
    }

    fn activate(&mut self, item: MenuItem) -> ScreenAction {
        if let Some(screen) = item.target() {
            return ScreenAction::Navigate(screen);
        }
        match item {
            MenuItem::DetectLocation => {
                if self.detecting {
                    debug!("Detection already in flight");
                    return ScreenAction::None;
                }
                self.detecting = true;
                self.notice = None;
                ScreenAction::Run(Job::DetectLocation)
            }
            MenuItem::SignOut if !self.signing_out => {
                self.signing_out = true;
                ScreenAction::Run(Job::SignOut)
            }
            _ => ScreenAction::None,
        }
    }

    fn location_lines(&self) -> Vec<Line<'static>> {
        let t = theme();
        if self.detecting {
            return vec![Line::styled("Detecting location...", t.muted_style())];
        }
        match &self.detection {
            Some(detection) => {
                let mut lines = vec![
                    Line::styled("Your location", t.title_style()),
                    Line::from(""),
                    Line::styled(format!("📍 {}", detection.address), t.text_style()),
                ];
                if detection.substituted {
                    lines.push(Line::from(""));
                    lines.push(Line::styled(
                        format!(
                            "Reported position {} is outside the service area; showing {} instead.",
                            detection.reported, detection.resolved
                        ),
                        t.warning_style(),
                    ));
                }
                lines
            }
            None => vec![Line::styled(
                "Select \"Detect My Location\" to find the nearest service area.",
                t.muted_style(),
            )],
        }
    }
}

impl Screen for DashboardScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let (header, content, footer) = create_standard_layout(area, Header::HEIGHT, Footer::HEIGHT);
        let screen = ScreenId::Dashboard;
        Header::render(frame, header, &screen.title(), &screen.path(), ctx.user.map(|u| u.label()));

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(content);

        let items: Vec<ListItem> = MenuItem::ALL
            .iter()
            .map(|item| {
                let style = match item {
                    MenuItem::DetectLocation if self.detecting => t.disabled_style(),
                    MenuItem::SignOut => t.warning_style(),
                    _ => t.text_style(),
                };
                ListItem::new(item.text()).style(style)
            })
            .collect();
        let menu = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(t.border_focused_style())
                    .title(" Menu ")
                    .title_style(t.title_style()),
            )
            .highlight_style(t.highlight_style())
            .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(menu, columns[0], &mut self.list_state);

        let right = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(" Location ")
            .title_style(t.title_style())
            .padding(Padding::new(1, 1, 1, 1));
        let inner = right.inner(columns[1]);
        frame.render_widget(right, columns[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);
        frame.render_widget(
            Paragraph::new(self.location_lines()).wrap(Wrap { trim: true }),
            rows[0],
        );
        if let Some(notice) = &self.notice {
            notice.render(frame, rows[1]);
        }

        Footer::render(frame, footer, &ctx.keymap().footer_navigation());
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        let Some(action) = ctx.action_for(&key) else {
            return Ok(ScreenAction::None);
        };
        if self.list_state.navigate(action, MenuItem::ALL.len()) {
            return Ok(ScreenAction::None);
        }
        Ok(match action {
            Action::Confirm => match self.selected_item() {
                Some(item) => self.activate(item),
                None => ScreenAction::None,
            },
            Action::Refresh => self.activate(MenuItem::DetectLocation),
            Action::Help => ScreenAction::ShowHelp,
            Action::Quit => ScreenAction::Quit,
            _ => ScreenAction::None,
        })
    }

    fn on_job_done(&mut self, outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        match outcome {
            JobOutcome::Location(result) => {
                self.detecting = false;
                match result {
                    Ok(detection) => self.detection = Some(detection),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => self.notice = Some(Notice::error(&e)),
                }
            }
            JobOutcome::SignedOut(result) => {
                self.signing_out = false;
                if let Err(e) = result {
                    self.notice = Some(Notice::error(&e));
                }
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::geo::{Coordinate, ResolvedAddress};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(screen: &mut DashboardScreen, code: KeyCode) -> ScreenAction {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen
            .handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), &ctx)
            .unwrap()
    }

    fn done(screen: &mut DashboardScreen, outcome: JobOutcome) {
        let config = Config::default();
        let ctx = ScreenContext::new(&config, None);
        screen.on_job_done(outcome, &ctx).unwrap();
    }

    #[test]
    fn test_duplicate_detection_is_ignored() {
        let mut screen = DashboardScreen::new();
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::Run(Job::DetectLocation)
        ));
        assert!(screen.is_detecting());
        assert!(matches!(press(&mut screen, KeyCode::Enter), ScreenAction::None));
    }

    #[test]
    fn test_detection_result_clears_loading() {
        let mut screen = DashboardScreen::new();
        press(&mut screen, KeyCode::Enter);
        let point = Coordinate::new(17.44, 78.38);
        done(
            &mut screen,
            JobOutcome::Location(Ok(Detection {
                reported: point,
                resolved: point,
                substituted: false,
                address: ResolvedAddress::new("Gachibowli, Hyderabad"),
            })),
        );
        assert!(!screen.is_detecting());
        assert_eq!(
            screen.detection().map(|d| d.address.as_str()),
            Some("Gachibowli, Hyderabad")
        );
    }

    #[test]
    fn test_detection_error_is_shown_and_gate_reopens() {
        let mut screen = DashboardScreen::new();
        press(&mut screen, KeyCode::Enter);
        done(&mut screen, JobOutcome::Location(Err(AppError::CapabilityUnavailable)));
        assert!(!screen.is_detecting());
        assert_eq!(
            screen.notice.as_ref().map(Notice::text),
            Some("Geolocation is not supported on this device.")
        );
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::Run(Job::DetectLocation)
        ));
    }

    #[test]
    fn test_menu_navigation() {
        let mut screen = DashboardScreen::new();
        press(&mut screen, KeyCode::Down);
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::Navigate(ScreenId::ServiceCategories)
        ));
    }
}
