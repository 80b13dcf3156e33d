//! Screen controllers for the application.
//!
//! Each screen owns its state and handles both rendering and events. Work
//! that talks to the network is never done inline: a screen returns
//! `ScreenAction::Run(job)` and later receives the `JobOutcome` through
//! `on_job_done`.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                        App                             │
//! │   guard ─► current screen ─► ScreenAction              │
//! │                 ▲                 │ Run(job)            │
//! │                 │ on_job_done     ▼                     │
//! │                 └──────────── JobRunner (tokio)        │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod booking;
pub mod bookings;
pub mod category_detail;
pub mod dashboard;
pub mod new_task;
pub mod screen_trait;
pub mod service_categories;
pub mod tasks;

pub use auth::{AuthMode, AuthScreen};
pub use booking::BookingScreen;
pub use bookings::BookingsScreen;
pub use category_detail::CategoryDetailScreen;
pub use dashboard::DashboardScreen;
pub use new_task::NewTaskScreen;
pub use screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
pub use service_categories::ServiceCategoriesScreen;
pub use tasks::TasksScreen;
