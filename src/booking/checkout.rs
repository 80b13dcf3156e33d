//! Booking form and submission.

use super::flow::BookingDraft;
use crate::api::{BookingBackend, NewBooking};
use crate::auth::User;
use crate::catalog::CategoryKey;
use crate::error::{AppError, MISSING_SHOP_OR_USER};
use tracing::{info, warn};

/// Shown when a failure carries no message of its own.
pub const SUBMIT_FALLBACK: &str = "Failed to confirm booking.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Time,
    VehicleMake,
    VehicleModel,
    Registration,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Date,
        FormField::Time,
        FormField::VehicleMake,
        FormField::VehicleModel,
        FormField::Registration,
        FormField::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Date => "Date",
            FormField::Time => "Time",
            FormField::VehicleMake => "Vehicle Make",
            FormField::VehicleModel => "Vehicle Model",
            FormField::Registration => "Registration Number",
            FormField::Notes => "Notes",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::Date => "YYYY-MM-DD",
            FormField::Time => "HH:MM",
            FormField::VehicleMake => "e.g., Toyota",
            FormField::VehicleModel => "e.g., Corolla",
            FormField::Registration => "e.g., ABC-1234",
            FormField::Notes => "Any specific requests?",
        }
    }

    pub fn required(&self) -> bool {
        !matches!(self, FormField::Notes)
    }
}

/// Values typed into the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub date: String,
    pub time: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub registration: String,
    pub notes: String,
}

impl BookingForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::VehicleMake => &self.vehicle_make,
            FormField::VehicleModel => &self.vehicle_model,
            FormField::Registration => &self.registration,
            FormField::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Date => self.date = value,
            FormField::Time => self.time = value,
            FormField::VehicleMake => self.vehicle_make = value,
            FormField::VehicleModel => self.vehicle_model = value,
            FormField::Registration => self.registration = value,
            FormField::Notes => self.notes = value,
        }
    }

    /// Required fields left blank.
    pub fn missing(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|f| f.required() && self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    FormFilling,
    Submitting,
    Completed,
    /// Submission failed; the form is kept for a retry.
    Failed(String),
}

/// Checkout for one category. Built with the draft handed over by the
/// picker, or without one when the screen was reached directly.
#[derive(Debug, Clone)]
pub struct Checkout {
    category: CategoryKey,
    draft: Option<BookingDraft>,
    pub form: BookingForm,
    state: CheckoutState,
}

impl Checkout {
    pub fn new(category: CategoryKey, draft: Option<BookingDraft>) -> Self {
        // A draft for another category is as good as none.
        let draft = draft.filter(|d| d.category == category);
        Self {
            category,
            draft,
            form: BookingForm::default(),
            state: CheckoutState::FormFilling,
        }
    }

    pub fn category(&self) -> CategoryKey {
        self.category
    }

    pub fn draft(&self) -> Option<&BookingDraft> {
        self.draft.as_ref()
    }

    /// No shop was handed over; the view offers a way back to the picker.
    pub fn needs_recovery(&self) -> bool {
        self.draft.is_none()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == CheckoutState::Submitting
    }

    pub fn message(&self) -> Option<&str> {
        match &self.state {
            CheckoutState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Check preconditions and build the request body. Moves to
    /// `Submitting` on success; on failure the state records the message
    /// and nothing is sent.
    pub fn prepare(&mut self, user: Option<&User>) -> Result<NewBooking, AppError> {
        if self.is_submitting() {
            return Err(AppError::precondition("A booking is already being submitted."));
        }
        let result = self.build(user);
        match &result {
            Ok(_) => self.state = CheckoutState::Submitting,
            Err(e) => self.state = CheckoutState::Failed(e.to_string()),
        }
        result
    }

    fn build(&self, user: Option<&User>) -> Result<NewBooking, AppError> {
        let (Some(draft), Some(user)) = (self.draft.as_ref(), user) else {
            return Err(AppError::precondition(MISSING_SHOP_OR_USER));
        };
        let missing = self.form.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(FormField::label).collect();
            return Err(AppError::precondition(format!(
                "Please fill in: {}.",
                names.join(", ")
            )));
        }

        Ok(NewBooking {
            user_id: user.id.clone(),
            service_type: self.category,
            tier: draft.tier,
            shop_id: draft.shop.id.clone(),
            shop_name: draft.shop.name.clone(),
            price: draft.shop.price,
            eta_minutes: draft.shop.eta_minutes,
            date: self.form.date.clone(),
            time: self.form.time.clone(),
            vehicle_make: self.form.vehicle_make.clone(),
            vehicle_model: self.form.vehicle_model.clone(),
            registration: self.form.registration.clone(),
            notes: self.form.notes.clone(),
        })
    }

    /// Record the backend's answer for a prepared submission.
    pub fn finish(&mut self, outcome: Result<(), AppError>) {
        self.state = match outcome {
            Ok(()) => {
                info!("{} booking confirmed", self.category);
                CheckoutState::Completed
            }
            Err(e) => {
                warn!("{} booking failed: {}", self.category, e);
                let message = e.to_string();
                if message.trim().is_empty() {
                    CheckoutState::Failed(SUBMIT_FALLBACK.to_string())
                } else {
                    CheckoutState::Failed(message)
                }
            }
        };
    }

    /// Prepare, send and finish in one go.
    pub async fn submit<B: BookingBackend>(&mut self, backend: &B, user: Option<&User>) -> Result<(), AppError> {
        let booking = self.prepare(user)?;
        let outcome = backend.create_booking(&booking).await;
        self.finish(outcome.clone());
        outcome
    }
}
