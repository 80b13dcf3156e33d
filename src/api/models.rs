//! Wire types for the booking backend.

use crate::booking::Tier;
use crate::catalog::CategoryKey;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body of `POST /createBooking`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: String,
    pub service_type: CategoryKey,
    pub tier: Tier,
    pub shop_id: String,
    pub shop_name: String,
    pub price: u32,
    pub eta_minutes: u32,
    pub date: String,
    pub time: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub registration: String,
    pub notes: String,
}

/// A booking as read back from the backend.
///
/// `service_type` and `tier` stay strings so records written by other
/// clients still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    pub service_type: String,
    pub tier: String,
    pub shop_id: String,
    pub shop_name: String,
    pub price: u32,
    pub eta_minutes: u32,
    pub date: String,
    pub time: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub registration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl BookingRecord {
    pub fn category(&self) -> Option<CategoryKey> {
        self.service_type.parse().ok()
    }

    /// Notes, if any were written.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Identity for list rendering; falls back to a composite when the
    /// backend sent no id.
    pub fn display_key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}-{}-{}-{}", self.user_id, self.shop_id, self.date, self.time),
        }
    }

    /// True when every field submitted in `booking` came back unchanged.
    pub fn matches(&self, booking: &NewBooking) -> bool {
        self.user_id == booking.user_id
            && self.service_type == booking.service_type.as_str()
            && self.tier == booking.tier.as_str()
            && self.shop_id == booking.shop_id
            && self.shop_name == booking.shop_name
            && self.price == booking.price
            && self.eta_minutes == booking.eta_minutes
            && self.date == booking.date
            && self.time == booking.time
            && self.vehicle_make == booking.vehicle_make
            && self.vehicle_model == booking.vehicle_model
            && self.registration == booking.registration
            && self.notes.as_deref().unwrap_or_default() == booking.notes
    }
}

/// Body of `POST /createTask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub task_name: String,
    pub task_description: String,
    pub task_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub task_description: String,
    #[serde(default)]
    pub task_status: String,
}

/// Category filter for the bookings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingFilter {
    #[default]
    All,
    Category(CategoryKey),
}

impl BookingFilter {
    pub const CHOICES: [BookingFilter; 6] = [
        BookingFilter::All,
        BookingFilter::Category(CategoryKey::TyreChange),
        BookingFilter::Category(CategoryKey::WheelAlignment),
        BookingFilter::Category(CategoryKey::Balancing),
        BookingFilter::Category(CategoryKey::OilChange),
        BookingFilter::Category(CategoryKey::BatteryCheck),
    ];

    /// Path segment under `/filterBookings/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            BookingFilter::All => "all",
            BookingFilter::Category(key) => key.as_str(),
        }
    }

    pub fn admits(&self, record: &BookingRecord) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Category(key) => record.service_type == key.as_str(),
        }
    }
}

impl fmt::Display for BookingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingFilter::All => f.write_str("ALL"),
            BookingFilter::Category(key) => write!(f, "{}", key),
        }
    }
}

impl FromStr for BookingFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(BookingFilter::All);
        }
        Ok(BookingFilter::Category(s.parse()?))
    }
}

/// Status filter for the tasks list. Filtering happens server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl TaskFilter {
    pub const CHOICES: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::InProgress,
        TaskFilter::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "ALL",
            TaskFilter::Pending => "PENDING",
            TaskFilter::InProgress => "IN_PROGRESS",
            TaskFilter::Completed => "COMPLETED",
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase().replace('-', "_");
        TaskFilter::CHOICES
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| anyhow!("Unknown task status '{}'. Expected ALL, PENDING, IN_PROGRESS or COMPLETED", s))
    }
}
