//! Identity: the provider seam, the session store and the route guard.

pub mod guard;
pub mod store;
pub mod supabase;

pub use guard::{GuardDecision, RouteGuard};
pub use store::{SessionState, SessionStore};
pub use supabase::SupabaseAuth;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// An authenticated session as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Result of a sign-up. Providers with email confirmation return neither a
/// session nor, sometimes, a user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignUpOutcome {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl SignUpOutcome {
    pub fn message(&self) -> &'static str {
        if self.user.is_some() || self.session.is_some() {
            "Signup successful — you can now sign in."
        } else {
            "Check your email for a confirmation link (if email confirmations are enabled)."
        }
    }
}

/// The identity provider as seen by the rest of the application.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Current session, refreshing or discarding a stale one.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, AppError>> + Send;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AppError>> + Send;

    fn sign_up(&self, email: &str, password: &str) -> impl Future<Output = Result<SignUpOutcome, AppError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Push-based session changes. The receiver sees every sign-in, sign-out
    /// and refresh.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// Mask a token for log output.
pub(crate) fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}
