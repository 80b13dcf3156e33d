//! New-task form.

use crate::api::{BookingBackend, NewTask};
use crate::error::AppError;
use tracing::{info, warn};

pub const TASK_CREATED: &str = "Task created successfully!";
pub const TASK_FAILED: &str = "Failed to create task!";
pub const TASK_UNREACHABLE: &str = "Error connecting to backend!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Created,
    /// The backend answered with a non-success status.
    Rejected,
    /// The backend could not be reached.
    Unreachable,
}

impl TaskOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            TaskOutcome::Created => TASK_CREATED,
            TaskOutcome::Rejected => TASK_FAILED,
            TaskOutcome::Unreachable => TASK_UNREACHABLE,
        }
    }

    pub fn from_result(result: &Result<(), AppError>) -> Self {
        match result {
            Ok(()) => TaskOutcome::Created,
            Err(AppError::Unreachable(_)) => TaskOutcome::Unreachable,
            Err(_) => TaskOutcome::Rejected,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskComposer {
    pub name: String,
    pub description: String,
    pub status: String,
    outcome: Option<TaskOutcome>,
    submitting: bool,
}

impl TaskComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<&TaskOutcome> {
        self.outcome.as_ref()
    }

    /// A task was created; the view offers "add another".
    pub fn is_submitted(&self) -> bool {
        self.outcome == Some(TaskOutcome::Created)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Body to send, or `None` while a request is in flight.
    pub fn prepare(&mut self) -> Option<NewTask> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.outcome = None;
        Some(NewTask {
            task_name: self.name.clone(),
            task_description: self.description.clone(),
            task_status: self.status.clone(),
        })
    }

    pub fn finish(&mut self, result: Result<(), AppError>) {
        let outcome = TaskOutcome::from_result(&result);
        match &result {
            Ok(()) => info!("Task '{}' saved", self.name),
            Err(e) => warn!("Task '{}' not saved: {}", self.name, e),
        }
        self.submitting = false;
        self.outcome = Some(outcome);
    }

    /// Clear the message and the fields for the next task.
    pub fn add_another(&mut self) {
        *self = Self::default();
    }

    pub async fn submit<B: BookingBackend>(&mut self, backend: &B) -> Option<TaskOutcome> {
        let task = self.prepare()?;
        let result = backend.create_task(&task).await;
        self.finish(result);
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(TaskOutcome::from_result(&Ok(())).message(), "Task created successfully!");
        assert_eq!(
            TaskOutcome::from_result(&Err(AppError::from_status(500, ""))).message(),
            "Failed to create task!"
        );
        assert_eq!(
            TaskOutcome::from_result(&Err(AppError::Unreachable("refused".into()))).message(),
            "Error connecting to backend!"
        );
    }

    #[test]
    fn test_add_another_resets() {
        let mut composer = TaskComposer::new();
        composer.name = "Wash".into();
        assert!(composer.prepare().is_some());
        assert!(composer.prepare().is_none());
        composer.finish(Ok(()));
        assert!(composer.is_submitted());

        composer.add_another();
        assert!(composer.outcome().is_none());
        assert!(composer.name.is_empty());
    }
}
