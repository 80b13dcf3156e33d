//! Client for the booking/task REST backend.

pub mod models;

pub use models::{BookingFilter, BookingRecord, NewBooking, NewTask, Task, TaskFilter};

use crate::error::AppError;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, error, info};

/// Persistence operations the views depend on.
pub trait BookingBackend: Send + Sync {
    fn create_booking(&self, booking: &NewBooking) -> impl Future<Output = Result<(), AppError>> + Send;

    fn filter_bookings(
        &self,
        filter: BookingFilter,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<BookingRecord>, AppError>> + Send;

    fn create_task(&self, task: &NewTask) -> impl Future<Output = Result<(), AppError>> + Send;

    fn filter_tasks(&self, filter: TaskFilter) -> impl Future<Output = Result<Vec<Task>, AppError>> + Send;
}

/// HTTP implementation of [`BookingBackend`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(http_client: Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow::anyhow!("Invalid backend URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid backend URL '{}': not a base URL", base_url);
        }
        Ok(Self { http_client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<Response, AppError> {
        info!("POST {}", url);
        self.http_client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("POST {} failed: {}", url, e);
                AppError::Unreachable(format!("Failed to reach backend: {}", e))
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        info!("GET {}", url);
        let response = self
            .http_client
            .get(url.clone())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("GET {} failed: {}", url, e);
                AppError::Unreachable(format!("Failed to reach backend: {}", e))
            })?;
        let response = ensure_success(response).await?;
        response.json::<T>().await.map_err(|e| {
            error!("GET {}: undecodable body: {}", url, e);
            AppError::NetworkOrHttp(format!("Unexpected response from backend: {}", e))
        })
    }
}

/// Pass 2xx responses through; turn anything else into an error carrying the
/// body text, or `HTTP <status>` when there is none.
async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Backend returned {}: {}", status.as_u16(), body.trim());
    Err(AppError::from_status(status.as_u16(), &body))
}

impl BookingBackend for BackendClient {
    async fn create_booking(&self, booking: &NewBooking) -> Result<(), AppError> {
        let url = self.endpoint(&["createBooking"]);
        debug!(
            "Booking {} at {} for {} {}",
            booking.service_type, booking.shop_id, booking.date, booking.time
        );
        let response = self.post_json(url, booking).await?;
        ensure_success(response).await?;
        info!("Booking created for shop {}", booking.shop_id);
        Ok(())
    }

    async fn filter_bookings(&self, filter: BookingFilter, user_id: &str) -> Result<Vec<BookingRecord>, AppError> {
        let mut url = self.endpoint(&["filterBookings", filter.path_segment()]);
        url.query_pairs_mut().append_pair("userId", user_id);
        let records: Vec<BookingRecord> = self.get_json(url).await?;
        debug!("Fetched {} bookings ({})", records.len(), filter);
        Ok(records)
    }

    async fn create_task(&self, task: &NewTask) -> Result<(), AppError> {
        let url = self.endpoint(&["createTask"]);
        let response = self.post_json(url, task).await?;
        ensure_success(response).await?;
        info!("Task '{}' created", task.task_name);
        Ok(())
    }

    // Tasks share the bookings filter route and carry no user scope.
    async fn filter_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let url = self.endpoint(&["filterBookings", filter.path_segment()]);
        let tasks: Vec<Task> = self.get_json(url).await?;
        debug!("Fetched {} tasks ({})", tasks.len(), filter);
        Ok(tasks)
    }
}
