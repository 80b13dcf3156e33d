//! Background work requested by the screens.
//!
//! A screen returns a [`Job`]; the app runs it on the runtime through a
//! [`JobRunner`] and hands the [`JobOutcome`] back to whichever screen is
//! showing when it completes.

use crate::api::{BookingBackend, BookingFilter, BookingRecord, NewBooking, NewTask, Task, TaskFilter};
use crate::auth::{IdentityProvider, SignUpOutcome, User};
use crate::error::AppError;
use crate::geo::{CancelToken, Detection, GeolocationResolver, LocationProvider, ReverseGeocoder};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    DetectLocation,
    SubmitBooking(NewBooking),
    /// Every booking of the signed-in user.
    LoadBookings,
    LoadTasks(TaskFilter),
    CreateTask(NewTask),
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::SignIn { .. } => "sign-in",
            Job::SignUp { .. } => "sign-up",
            Job::SignOut => "sign-out",
            Job::DetectLocation => "detect-location",
            Job::SubmitBooking(_) => "submit-booking",
            Job::LoadBookings => "load-bookings",
            Job::LoadTasks(_) => "load-tasks",
            Job::CreateTask(_) => "create-task",
        }
    }

    /// Jobs that a cancel token can abandon.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Job::DetectLocation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    SignedIn(Result<(), AppError>),
    SignedUp(Result<SignUpOutcome, AppError>),
    SignedOut(Result<(), AppError>),
    Location(Result<Detection, AppError>),
    BookingSubmitted(Result<(), AppError>),
    BookingsLoaded(Result<Vec<BookingRecord>, AppError>),
    TasksLoaded(TaskFilter, Result<Vec<Task>, AppError>),
    TaskCreated(Result<(), AppError>),
}

pub struct JobRunner<P, B, L, G> {
    auth: Arc<P>,
    backend: B,
    resolver: GeolocationResolver<L, G>,
}

impl<P, B, L, G> JobRunner<P, B, L, G>
where
    P: IdentityProvider,
    B: BookingBackend,
    L: LocationProvider,
    G: ReverseGeocoder,
{
    pub fn new(auth: Arc<P>, backend: B, resolver: GeolocationResolver<L, G>) -> Self {
        Self {
            auth,
            backend,
            resolver,
        }
    }

    pub fn auth(&self) -> &Arc<P> {
        &self.auth
    }

    pub async fn run(&self, job: Job, user: Option<User>, cancel: &CancelToken) -> JobOutcome {
        debug!("Running job {}", job.name());
        match job {
            Job::SignIn { email, password } => JobOutcome::SignedIn(
                self.auth
                    .sign_in_with_password(&email, &password)
                    .await
                    .map(|_| ()),
            ),
            Job::SignUp { email, password } => {
                JobOutcome::SignedUp(self.auth.sign_up(&email, &password).await)
            }
            Job::SignOut => JobOutcome::SignedOut(self.auth.sign_out().await),
            Job::DetectLocation => JobOutcome::Location(self.resolver.detect_location(cancel).await),
            Job::SubmitBooking(booking) => {
                JobOutcome::BookingSubmitted(self.backend.create_booking(&booking).await)
            }
            Job::LoadBookings => match user {
                Some(user) => JobOutcome::BookingsLoaded(
                    self.backend.filter_bookings(BookingFilter::All, &user.id).await,
                ),
                None => {
                    debug!("No user; bookings list stays empty");
                    JobOutcome::BookingsLoaded(Ok(Vec::new()))
                }
            },
            Job::LoadTasks(filter) => {
                JobOutcome::TasksLoaded(filter, self.backend.filter_tasks(filter).await)
            }
            Job::CreateTask(task) => JobOutcome::TaskCreated(self.backend.create_task(&task).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::geo::fence::{HYDERABAD, HYDERABAD_CENTER};
    use crate::geo::{Coordinate, Locator, ResolvedAddress};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;

    struct NoAuth {
        sender: watch::Sender<Option<Session>>,
    }

    impl IdentityProvider for NoAuth {
        async fn get_session(&self) -> Result<Option<Session>, AppError> {
            Ok(None)
        }

        async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<Session, AppError> {
            Err(AppError::ServerRejected("Invalid login credentials".to_string()))
        }

        async fn sign_up(&self, _email: &str, _password: &str) -> Result<SignUpOutcome, AppError> {
            Ok(SignUpOutcome::default())
        }

        async fn sign_out(&self) -> Result<(), AppError> {
            Ok(())
        }

        fn subscribe(&self) -> watch::Receiver<Option<Session>> {
            self.sender.subscribe()
        }
    }

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl BookingBackend for CountingBackend {
        async fn create_booking(&self, _booking: &NewBooking) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn filter_bookings(&self, _filter: BookingFilter, _user_id: &str) -> Result<Vec<BookingRecord>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn create_task(&self, _task: &NewTask) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn filter_tasks(&self, _filter: TaskFilter) -> Result<Vec<Task>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct EchoGeocoder;

    impl ReverseGeocoder for EchoGeocoder {
        async fn reverse(&self, point: Coordinate) -> Result<ResolvedAddress, AppError> {
            Ok(ResolvedAddress::new(format!("at {}", point)))
        }
    }

    fn runner(locator: Locator) -> JobRunner<NoAuth, CountingBackend, Locator, EchoGeocoder> {
        let (sender, _) = watch::channel(None);
        JobRunner::new(
            Arc::new(NoAuth { sender }),
            CountingBackend::default(),
            GeolocationResolver::new(locator, EchoGeocoder, HYDERABAD, HYDERABAD_CENTER),
        )
    }

    #[tokio::test]
    async fn test_bookings_without_user_make_no_request() {
        let runner = runner(Locator::Unavailable);
        let outcome = runner.run(Job::LoadBookings, None, &CancelToken::new()).await;
        assert_eq!(outcome, JobOutcome::BookingsLoaded(Ok(Vec::new())));
        assert_eq!(runner.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_task_page_carries_its_filter() {
        let runner = runner(Locator::Unavailable);
        let outcome = runner
            .run(Job::LoadTasks(TaskFilter::Pending), None, &CancelToken::new())
            .await;
        assert_eq!(outcome, JobOutcome::TasksLoaded(TaskFilter::Pending, Ok(Vec::new())));
    }

    #[tokio::test]
    async fn test_cancelled_detection() {
        let runner = runner(Locator::Fixed(HYDERABAD_CENTER));
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = runner.run(Job::DetectLocation, None, &cancel).await;
        assert_eq!(outcome, JobOutcome::Location(Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_sign_in_error_is_passed_through() {
        let runner = runner(Locator::Unavailable);
        let outcome = runner
            .run(
                Job::SignIn {
                    email: "a@b.c".to_string(),
                    password: "x".to_string(),
                },
                None,
                &CancelToken::new(),
            )
            .await;
        assert_eq!(
            outcome,
            JobOutcome::SignedIn(Err(AppError::ServerRejected("Invalid login credentials".to_string())))
        );
    }

    #[test]
    fn test_only_detection_is_cancellable() {
        assert!(Job::DetectLocation.is_cancellable());
        assert!(!Job::LoadBookings.is_cancellable());
    }
}
