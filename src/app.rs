use crate::api::BackendClient;
use crate::auth::{GuardDecision, RouteGuard, SessionStore, SupabaseAuth, User};
use crate::booking::BookingDraft;
use crate::components::HelpOverlay;
use crate::config::Config;
use crate::geo::{CancelToken, Locator, NominatimGeocoder};
use crate::keymap::Action;
use crate::screens::{
    AuthMode, AuthScreen, BookingScreen, BookingsScreen, CategoryDetailScreen, DashboardScreen,
    NewTaskScreen, RenderContext, Screen, ScreenAction, ScreenContext, ServiceCategoriesScreen,
    TasksScreen,
};
use crate::services::{Job, JobOutcome, JobRunner};
use crate::styles::{init_theme, theme, ThemeType};
use crate::tui::Tui;
use crate::ui::Screen as ScreenId;
use crate::utils::path::format_path_for_display;
use crate::utils::{center_popup, get_config_path, get_session_path};
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind, KeyModifiers};
use ratatui::layout::Alignment;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

type Runner = JobRunner<SupabaseAuth, BackendClient, Locator, NominatimGeocoder>;

/// Main application state
pub struct App {
    config: Config,
    config_path: PathBuf,
    tui: Tui,
    runtime: Runtime,
    runner: Arc<Runner>,
    session: SessionStore,
    outcomes_tx: UnboundedSender<JobOutcome>,
    outcomes_rx: UnboundedReceiver<JobOutcome>,
    /// Screen the user asked for; the guard may show another one. Unset until
    /// the session resolves and picks the landing screen.
    requested: Option<ScreenId>,
    current: Option<(ScreenId, Box<dyn Screen>)>,
    /// Shop and tier carried from the picker into the booking form.
    draft: Option<BookingDraft>,
    /// Abandons an in-flight detection when the dashboard goes away.
    location_cancel: CancelToken,
    show_help: bool,
    should_quit: bool,
}

impl App {
    pub fn new() -> Result<Self> {
        let config_path = get_config_path();
        let config = Config::load(&config_path)?;
        init_theme(ThemeType::resolve(config.theme));

        for (key, err) in config.keymap.invalid_overrides() {
            warn!("Ignoring keybinding '{}': {}", key, err);
        }

        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let http = config.http_client()?;
        let auth = Arc::new(config.identity_provider(http.clone(), Some(get_session_path()))?);
        let backend = config.backend_client(http.clone())?;
        let resolver = config.resolver(http)?;
        info!("Backend: {}", backend.base_url());

        let session = SessionStore::spawn(Arc::clone(&auth), runtime.handle());
        let runner = Arc::new(JobRunner::new(auth, backend, resolver));
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            config_path,
            tui: Tui::new()?,
            runtime,
            runner,
            session,
            outcomes_tx,
            outcomes_rx,
            requested: None,
            current: None,
            draft: None,
            location_cancel: CancelToken::new(),
            show_help: false,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.tui.enter()?;

        loop {
            self.sync_route()?;
            self.draw()?;

            if self.should_quit {
                break;
            }

            if let Some(event) = self.tui.poll_event(Duration::from_millis(100))? {
                self.handle_event(event)?;
            }
            self.drain_outcomes()?;
        }

        self.location_cancel.cancel();
        self.tui.exit()?;
        Ok(())
    }

    /// Apply the route guard to the requested screen and switch to whatever
    /// it decides.
    fn sync_route(&mut self) -> Result<()> {
        let state = self.session.state();
        let requested = match self.requested.or_else(|| RouteGuard::landing(&state)) {
            Some(screen) => *self.requested.insert(screen),
            None => return Ok(()),
        };
        match RouteGuard::decide(&state, requested) {
            GuardDecision::Loading => Ok(()),
            GuardDecision::Redirect(target) => {
                debug!("Guard redirects {} to {}", requested, target);
                self.requested = Some(target);
                self.activate(target)
            }
            GuardDecision::Render(target) => self.activate(target),
        }
    }

    fn build_screen(&mut self, id: ScreenId) -> Box<dyn Screen> {
        match id {
            ScreenId::SignIn => Box::new(AuthScreen::new(AuthMode::SignIn)),
            ScreenId::SignUp => Box::new(AuthScreen::new(AuthMode::SignUp)),
            ScreenId::Dashboard => Box::new(DashboardScreen::new()),
            ScreenId::ServiceCategories => Box::new(ServiceCategoriesScreen::new()),
            ScreenId::CategoryDetail(key) => {
                Box::new(CategoryDetailScreen::new(key, self.config.pricing_table()))
            }
            ScreenId::Booking(key) => {
                let draft = self.draft.take().filter(|d| d.category == key);
                Box::new(BookingScreen::new(key, draft))
            }
            ScreenId::Bookings => Box::new(BookingsScreen::new()),
            ScreenId::NewTask => Box::new(NewTaskScreen::new()),
            ScreenId::Tasks => Box::new(TasksScreen::new()),
        }
    }

    fn activate(&mut self, id: ScreenId) -> Result<()> {
        if self.current.as_ref().is_some_and(|(current, _)| *current == id) {
            return Ok(());
        }
        let user = self.session.user();

        if let Some((previous, mut screen)) = self.current.take() {
            screen.on_exit(&ScreenContext::new(&self.config, user.as_ref()))?;
            if previous == ScreenId::Dashboard {
                self.location_cancel.cancel();
            }
        }
        if id == ScreenId::Dashboard {
            self.location_cancel = CancelToken::new();
        }

        info!("Entering {}", id);
        let mut screen = self.build_screen(id);
        let action = screen.on_enter(&ScreenContext::new(&self.config, user.as_ref()))?;
        self.current = Some((id, screen));
        self.apply(action)
    }

    fn apply(&mut self, action: ScreenAction) -> Result<()> {
        match action {
            ScreenAction::None => {}
            ScreenAction::Navigate(target) => self.requested = Some(target),
            ScreenAction::StartBooking(draft) => {
                self.requested = Some(ScreenId::Booking(draft.category));
                self.draft = Some(draft);
            }
            ScreenAction::Run(job) => self.spawn_job(job),
            ScreenAction::ShowHelp => self.show_help = true,
            ScreenAction::Quit => {
                self.location_cancel.cancel();
                self.should_quit = true;
            }
        }
        Ok(())
    }

    fn spawn_job(&self, job: Job) {
        let runner = Arc::clone(&self.runner);
        let tx = self.outcomes_tx.clone();
        let user: Option<User> = self.session.user();
        let cancel = if job.is_cancellable() {
            self.location_cancel.clone()
        } else {
            CancelToken::new()
        };
        debug!("Spawning job {}", job.name());
        self.runtime.spawn(async move {
            let outcome = runner.run(job, user, &cancel).await;
            if tx.send(outcome).is_err() {
                debug!("App closed before the job finished");
            }
        });
    }

    /// Hand finished jobs to the screen that is showing now.
    fn drain_outcomes(&mut self) -> Result<()> {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            let user = self.session.user();
            let action = match self.current.as_mut() {
                Some((_, screen)) => {
                    screen.on_job_done(outcome, &ScreenContext::new(&self.config, user.as_ref()))?
                }
                None => ScreenAction::None,
            };
            self.apply(action)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = &event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            if self.show_help {
                self.show_help = false;
                return Ok(());
            }

            let focused = self.current.as_ref().is_some_and(|(_, s)| s.is_input_focused());
            match self.config.keymap.get_action(key.code, key.modifiers) {
                Some(Action::Quit) if !focused || key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return self.apply(ScreenAction::Quit);
                }
                Some(Action::Help) if !focused => return self.apply(ScreenAction::ShowHelp),
                _ => {}
            }
        }

        let user = self.session.user();
        let action = match self.current.as_mut() {
            Some((_, screen)) => {
                screen.handle_event(event, &ScreenContext::new(&self.config, user.as_ref()))?
            }
            None => ScreenAction::None,
        };
        self.apply(action)
    }

    fn draw(&mut self) -> Result<()> {
        let user = self.session.user();
        let loading = self.session.is_pending() || self.current.is_none();
        let config_display = format_path_for_display(&self.config_path);
        let config = &self.config;
        let current = &mut self.current;
        let show_help = self.show_help;

        let mut render_error = None;
        self.tui.terminal_mut().draw(|frame| {
            let area = frame.area();
            match current.as_mut() {
                Some((_, screen)) if !loading => {
                    let ctx = RenderContext::new(config, user.as_ref());
                    if let Err(e) = screen.render(frame, area, &ctx) {
                        render_error = Some(e);
                    }
                    if show_help {
                        HelpOverlay::render(frame, area, &config.keymap, &config_display);
                    }
                }
                _ => {
                    let t = theme();
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(t.border_style());
                    frame.render_widget(
                        Paragraph::new("Loading...")
                            .style(t.muted_style())
                            .alignment(Alignment::Center)
                            .block(block),
                        center_popup(area, 30, 20),
                    );
                }
            }
        })?;

        if let Some(e) = render_error {
            error!("Render failed: {:#}", e);
            return Err(e);
        }
        Ok(())
    }
}
