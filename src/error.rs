//! Domain error taxonomy.
//!
//! Every failure a view can run into is one of these variants. The `Display`
//! text is the message shown to the user, so callers convert an error to a
//! string at the operation boundary and never let it escape the view.

use thiserror::Error;

/// Message shown when reverse geocoding returns a non-success status.
pub const GEOCODE_FAILED: &str = "Failed to fetch address.";
/// Message shown when a submission is attempted without a shop or a user.
pub const MISSING_SHOP_OR_USER: &str = "Missing shop selection or user.";
/// Fallback for position errors that carry no message of their own.
pub const POSITION_UNAVAILABLE: &str = "Permission denied or unable to get location.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The device exposes no way to obtain a position.
    #[error("Geolocation is not supported on this device.")]
    CapabilityUnavailable,

    /// The position request was refused, timed out or produced no fix.
    #[error("{0}")]
    PermissionOrPosition(String),

    /// A non-success HTTP status without a useful body, or a body that
    /// could not be decoded.
    #[error("{0}")]
    NetworkOrHttp(String),

    /// The request never got an HTTP answer.
    #[error("{0}")]
    Unreachable(String),

    /// An operation was attempted before its inputs were in place.
    #[error("{0}")]
    PreconditionNotMet(String),

    /// The server answered with a non-success status and a message.
    #[error("{0}")]
    ServerRejected(String),

    #[error("Operation cancelled.")]
    Cancelled,
}

impl AppError {
    pub fn position(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::PermissionOrPosition(POSITION_UNAVAILABLE.to_string())
        } else {
            Self::PermissionOrPosition(message)
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionNotMet(message.into())
    }

    /// Build the error for a non-2xx response.
    ///
    /// A non-empty body is surfaced verbatim, otherwise `HTTP <status>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            Self::NetworkOrHttp(format!("HTTP {}", status))
        } else {
            Self::ServerRejected(body.to_string())
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
