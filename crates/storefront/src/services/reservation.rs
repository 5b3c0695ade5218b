//! Table reservations.

use std::ops::RangeInclusive;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{ApiError, BackendClient, ReservationRequest};

/// Shown when the backend refuses a booking without saying why.
pub const RESERVATION_FAILED_FALLBACK: &str = "Failed to make reservation";

/// Party sizes offered on the form.
pub const GUEST_RANGE: RangeInclusive<u8> = 1..=8;

/// Party size preselected on the form.
pub const DEFAULT_GUESTS: u8 = 2;

/// First and last bookable slot, in minutes after midnight.
const FIRST_SLOT: u16 = 11 * 60;
const LAST_SLOT: u16 = 22 * 60;
const SLOT_STEP: usize = 30;

/// Bookable times, `"11:00 AM"` through `"10:00 PM"` every 30 minutes.
#[must_use]
pub fn time_slots() -> Vec<String> {
    (FIRST_SLOT..=LAST_SLOT)
        .step_by(SLOT_STEP)
        .map(|minutes| {
            let (hour, minute) = (minutes / 60, minutes % 60);
            let suffix = if hour >= 12 { "PM" } else { "AM" };
            let hour12 = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{hour12}:{minute:02} {suffix}")
        })
        .collect()
}

/// Errors from booking a table.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Reservation failed: {0}")]
    Backend(#[source] ApiError),
}

impl ReservationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(problems) => problems.join(" "),
            Self::Backend(err) => err.user_message(RESERVATION_FAILED_FALLBACK),
        }
    }
}

/// Reservation form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default = "default_guests")]
    pub guests: u8,
    #[serde(default)]
    pub special_requests: String,
}

const fn default_guests() -> u8 {
    DEFAULT_GUESTS
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            date: String::new(),
            time: String::new(),
            guests: DEFAULT_GUESTS,
            special_requests: String::new(),
        }
    }
}

impl ReservationForm {
    /// Check the fields before contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Validation`] listing every problem.
    pub fn validate(&self) -> Result<(), ReservationError> {
        let mut problems: Vec<String> = [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Date", &self.date),
            ("Time", &self.time),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| format!("{label} is required."))
        .collect();

        if !self.time.trim().is_empty() && !time_slots().iter().any(|s| s == self.time.trim()) {
            problems.push("Please choose one of the listed times.".to_string());
        }
        if !GUEST_RANGE.contains(&self.guests) {
            problems.push(format!(
                "Party size must be between {} and {}.",
                GUEST_RANGE.start(),
                GUEST_RANGE.end()
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ReservationError::Validation(problems))
        }
    }

    fn to_request(&self) -> ReservationRequest {
        ReservationRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            guests: self.guests.to_string(),
            special_requests: self.special_requests.trim().to_string(),
        }
    }
}

/// Book a table.
///
/// # Errors
///
/// Returns a validation or backend error.
#[instrument(skip_all, fields(date = %form.date, time = %form.time, guests = form.guests))]
pub async fn make_reservation(
    backend: &BackendClient,
    token: Option<&secrecy::SecretString>,
    form: &ReservationForm,
) -> Result<(), ReservationError> {
    form.validate()?;
    backend
        .create_reservation(token, &form.to_request())
        .await
        .map_err(ReservationError::Backend)?;
    info!("Reservation submitted");
    Ok(())
}
