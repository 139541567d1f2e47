use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;

/// A rentable vehicle as listed by the fleet backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// Daily rate in minor currency units.
    pub daily_rate_minor: i32,
    pub currency: String,
    pub location: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// A reservation as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: String,
    pub vehicle_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub pickup_location: String,
    pub return_location: String,
    pub status: BookingStatus,
    pub total_minor: i32,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: String,
    pub vehicle_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub pickup_location: String,
    pub return_location: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: Masked<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Masked(password.into()),
        }
    }
}

/// Response of `POST /api/auth/login`. The token is absent when the backend
/// declines the credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub username: String,
    pub role: String,
    pub token: Option<String>,
}
