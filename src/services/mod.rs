//! Application services layer.
//!
//! View models that sit between the screens and the backend client. They
//! hold no terminal state, so the CLI and the tests drive them directly.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              UI Layer (App, Screens)        │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//! ┌─────────────────────────────────────────────┐
//! │  Services: BookingList, TaskList,           │
//! │            TaskComposer, JobRunner          │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//! ┌─────────────────────────────────────────────┐
//! │  Infrastructure: BackendClient, Config      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod jobs;
pub mod records;
pub mod task_form;

pub use jobs::{Job, JobOutcome, JobRunner};
pub use records::{BookingList, ListView, LoadState, TaskList};
pub use task_form::{TaskComposer, TaskOutcome};
