//! View models for the bookings and tasks lists.
//!
//! Both lists distinguish loading, failure and an empty result. Bookings are
//! fetched once and filtered locally; tasks are refetched per status.

use crate::api::{BookingBackend, BookingFilter, BookingRecord, Task, TaskFilter};
use crate::auth::User;
use crate::error::AppError;
use tracing::{debug, warn};

pub const BOOKINGS_FALLBACK: &str = "Failed to load bookings.";
pub const TASKS_FALLBACK: &str = "Failed to load tasks.";
pub const NO_BOOKINGS: &str = "No bookings found.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Loaded(Vec<T>),
}

impl<T> LoadState<T> {
    fn from_result(result: Result<Vec<T>, AppError>, fallback: &str) -> Self {
        match result {
            Ok(items) => LoadState::Loaded(items),
            Err(e) => {
                let message = e.to_string();
                if message.trim().is_empty() {
                    LoadState::Failed(fallback.to_string())
                } else {
                    LoadState::Failed(message)
                }
            }
        }
    }
}

/// What a list view should draw.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, T> {
    Loading,
    Failed(&'a str),
    Empty(String),
    Rows(Vec<&'a T>),
}

#[derive(Debug, Clone)]
pub struct BookingList {
    state: LoadState<BookingRecord>,
    filter: BookingFilter,
}

impl Default for BookingList {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingList {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            filter: BookingFilter::All,
        }
    }

    pub fn filter(&self) -> BookingFilter {
        self.filter
    }

    /// Change the visible category. No refetch.
    pub fn set_filter(&mut self, filter: BookingFilter) {
        self.filter = filter;
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn apply(&mut self, result: Result<Vec<BookingRecord>, AppError>) {
        if let Err(e) = &result {
            warn!("Loading bookings failed: {}", e);
        }
        self.state = LoadState::from_result(result, BOOKINGS_FALLBACK);
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Count of the unfiltered fetch, once loaded.
    pub fn total(&self) -> Option<usize> {
        match &self.state {
            LoadState::Loaded(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn visible(&self) -> Vec<&BookingRecord> {
        match &self.state {
            LoadState::Loaded(items) => items.iter().filter(|r| self.filter.admits(r)).collect(),
            _ => Vec::new(),
        }
    }

    pub fn view(&self) -> ListView<'_, BookingRecord> {
        match &self.state {
            LoadState::Loading => ListView::Loading,
            LoadState::Failed(msg) => ListView::Failed(msg),
            LoadState::Loaded(_) => {
                let rows = self.visible();
                if rows.is_empty() {
                    ListView::Empty(NO_BOOKINGS.to_string())
                } else {
                    ListView::Rows(rows)
                }
            }
        }
    }

    /// Fetch every booking of `user`. Without a user nothing is requested
    /// and the list is simply empty.
    pub async fn load<B: BookingBackend>(&mut self, backend: &B, user: Option<&User>) {
        let Some(user) = user else {
            debug!("No user; skipping bookings fetch");
            self.state = LoadState::Loaded(Vec::new());
            return;
        };
        self.begin_load();
        let result = backend.filter_bookings(BookingFilter::All, &user.id).await;
        self.apply(result);
    }
}

#[derive(Debug, Clone)]
pub struct TaskList {
    state: LoadState<Task>,
    filter: TaskFilter,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            filter: TaskFilter::All,
        }
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    /// Switch status. The caller fetches the new page.
    pub fn select(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.state = LoadState::Loading;
    }

    pub fn apply(&mut self, filter: TaskFilter, result: Result<Vec<Task>, AppError>) {
        if filter != self.filter {
            // A newer selection superseded this response.
            debug!("Dropping stale task page for {}", filter);
            return;
        }
        if let Err(e) = &result {
            warn!("Loading tasks failed: {}", e);
        }
        self.state = LoadState::from_result(result, TASKS_FALLBACK);
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn total(&self) -> Option<usize> {
        match &self.state {
            LoadState::Loaded(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn view(&self) -> ListView<'_, Task> {
        match &self.state {
            LoadState::Loading => ListView::Loading,
            LoadState::Failed(msg) => ListView::Failed(msg),
            LoadState::Loaded(items) if items.is_empty() => {
                ListView::Empty(format!("No tasks found for {}.", self.filter))
            }
            LoadState::Loaded(items) => ListView::Rows(items.iter().collect()),
        }
    }

    pub async fn load<B: BookingBackend>(&mut self, backend: &B, filter: TaskFilter) {
        self.select(filter);
        let result = backend.filter_tasks(filter).await;
        self.apply(filter, result);
    }
}
