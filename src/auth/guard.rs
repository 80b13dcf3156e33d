//! Route guard: a pure function of the session state and the requested
//! screen.

use super::store::SessionState;
use crate::ui::Screen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The initial session fetch has not resolved yet.
    Loading,
    /// Show this screen instead of the requested one.
    Redirect(Screen),
    Render(Screen),
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(state: &SessionState, requested: Screen) -> GuardDecision {
        match state {
            SessionState::Pending => GuardDecision::Loading,
            SessionState::SignedOut if requested.requires_session() => {
                GuardDecision::Redirect(Screen::SignIn)
            }
            SessionState::SignedIn(_) if !requested.requires_session() => {
                GuardDecision::Redirect(Screen::Dashboard)
            }
            _ => GuardDecision::Render(requested),
        }
    }

    /// Where to land when nothing specific was requested. `None` until the
    /// initial session fetch resolves.
    pub fn landing(state: &SessionState) -> Option<Screen> {
        match state {
            SessionState::Pending => None,
            SessionState::SignedIn(_) => Some(Screen::Dashboard),
            SessionState::SignedOut => Some(Screen::SignIn),
        }
    }
}
