//! Screen trait and associated types.
//!
//! Screens own their state, turn events into a [`ScreenAction`] and never
//! touch the network themselves: anything asynchronous is requested as a
//! [`Job`] and its [`JobOutcome`] comes back through [`Screen::on_job_done`].

use crate::auth::User;
use crate::booking::BookingDraft;
use crate::config::Config;
use crate::keymap::{Action, Keymap};
use crate::services::{Job, JobOutcome};
use crate::ui::Screen as ScreenId;
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::Frame;

/// Read-only resources for rendering.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    /// Signed-in user, if any.
    pub user: Option<&'a User>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a Config, user: Option<&'a User>) -> Self {
        Self { config, user }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.config.keymap
    }
}

/// Read-only resources for event handling.
pub struct ScreenContext<'a> {
    pub config: &'a Config,
    pub user: Option<&'a User>,
}

impl<'a> ScreenContext<'a> {
    pub fn new(config: &'a Config, user: Option<&'a User>) -> Self {
        Self { config, user }
    }

    /// Resolve a key press to an action. Releases and repeats of other
    /// kinds are ignored.
    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        self.config.keymap.get_action(key.code, key.modifiers)
    }
}

/// What a screen asks of the app after handling an event.
#[derive(Debug, Clone, Default)]
pub enum ScreenAction {
    /// Stay on the current screen.
    #[default]
    None,
    Navigate(ScreenId),
    /// Carry a chosen shop and tier into the booking form.
    StartBooking(BookingDraft),
    /// Run work in the background.
    Run(Job),
    ShowHelp,
    Quit,
}

/// Trait for screen controllers.
///
/// ```rust,ignore
/// impl Screen for MyScreen {
///     fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
///         Ok(())
///     }
///
///     fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
///         Ok(ScreenAction::Navigate(ScreenId::Dashboard))
///     }
/// }
/// ```
pub trait Screen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()>;

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction>;

    /// When true, printable keys go to the focused input instead of the keymap.
    fn is_input_focused(&self) -> bool {
        false
    }

    /// Called when the screen becomes current. May request initial data.
    fn on_enter(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }

    fn on_exit(&mut self, _ctx: &ScreenContext) -> Result<()> {
        Ok(())
    }

    /// A job this screen requested has finished.
    fn on_job_done(&mut self, _outcome: JobOutcome, _ctx: &ScreenContext) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }
}
