//! ServiceBay - book vehicle-service appointments from the terminal
//!
//! Sign in against a Supabase-compatible identity provider, detect your
//! location, pick a service category and a nearby shop, book it with the
//! booking backend, and track bookings and tasks.

pub mod api;
pub mod app;
pub mod auth;
pub mod booking;
pub mod catalog;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod geo;
pub mod keymap;
pub mod screens;
pub mod services;
pub mod styles;
pub mod tui;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::AppError;

pub use keymap::{Action, KeyBinding, Keymap, KeymapPreset};
