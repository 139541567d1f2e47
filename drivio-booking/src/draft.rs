use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivio_shared::{Masked, Vehicle};

/// Customer contact details captured on the second wizard step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
}

/// Card details captured on the payment step. Captured and forwarded only;
/// nothing is processed client-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCard {
    pub card_number: Masked<String>,
    pub card_holder: String,
    /// MM/YY as entered.
    pub expiry: String,
    pub cvv: Masked<String>,
}

/// The in-progress booking assembled across wizard steps. Fields hold the
/// raw user input; the step validators do the parsing. Discarded on success
/// or reset, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    pub vehicle_id: Option<Uuid>,
    pub pickup_date: String,
    pub return_date: String,
    pub pickup_location: String,
    pub return_location: String,
    pub customer: CustomerDetails,
    pub payment: PaymentCard,
}

impl BookingDraft {
    pub fn parsed_pickup_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.pickup_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_return_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.return_date.trim(), "%Y-%m-%d").ok()
    }

    /// Whole rental days between pickup and return. None until both dates
    /// parse and the return is strictly after the pickup.
    pub fn rental_days(&self) -> Option<i64> {
        let pickup = self.parsed_pickup_date()?;
        let ret = self.parsed_return_date()?;
        let days = (ret - pickup).num_days();
        (days > 0).then_some(days)
    }

    /// Price estimate for display: rental days times the vehicle's daily
    /// rate, in minor units. Not authoritative; the backend prices the
    /// actual booking.
    pub fn quote(&self, vehicle: &Vehicle) -> Option<i64> {
        Some(self.rental_days()? * i64::from(vehicle.daily_rate_minor))
    }
}
