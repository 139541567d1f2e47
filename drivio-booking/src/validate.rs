use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::draft::BookingDraft;
use crate::wizard::WizardStep;

/// A single field-keyed validation failure, rendered inline next to the
/// field. An empty list means the step is valid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])+(?:\.[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])+)+$",
    )
    .expect("invalid email regex")
});

// Permissive international form; digit count is checked separately.
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]*[0-9]$").expect("invalid phone regex"));

static EXPIRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("invalid expiry regex"));

static CVV_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3,4}$").expect("invalid cvv regex"));

fn is_valid_email(email: &str) -> bool {
    // RFC 5321 length limit
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

fn is_valid_phone(phone: &str) -> bool {
    if !PHONE_REGEX.is_match(phone) {
        return false;
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&digits)
}

fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let caps = EXPIRY_REGEX.captures(expiry)?;
    let month: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;
    Some((2000 + year, month))
}

/// Validate the given step's slice of the draft against the current date.
pub fn validate_step(step: WizardStep, draft: &BookingDraft) -> Vec<FieldError> {
    validate_step_at(step, draft, Utc::now().date_naive())
}

/// As [`validate_step`], with an explicit reference date for the
/// not-in-the-past rules.
pub fn validate_step_at(step: WizardStep, draft: &BookingDraft, today: NaiveDate) -> Vec<FieldError> {
    match step {
        WizardStep::Dates => validate_dates_at(draft, today),
        WizardStep::CustomerInfo => validate_customer(draft),
        WizardStep::Payment => validate_payment_at(draft, today),
        // No inputs of its own.
        WizardStep::Confirmation => Vec::new(),
    }
}

pub fn validate_dates_at(draft: &BookingDraft, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.vehicle_id.is_none() {
        errors.push(FieldError::new("vehicle_id", "Select a vehicle first"));
    }

    if draft.pickup_date.trim().is_empty() {
        errors.push(FieldError::new("pickup_date", "Pickup date is required"));
    } else if draft.parsed_pickup_date().is_none() {
        errors.push(FieldError::new("pickup_date", "Pickup date is not a valid date"));
    } else if let Some(pickup) = draft.parsed_pickup_date() {
        if pickup < today {
            errors.push(FieldError::new("pickup_date", "Pickup date cannot be in the past"));
        }
    }

    if draft.return_date.trim().is_empty() {
        errors.push(FieldError::new("return_date", "Return date is required"));
    } else if draft.parsed_return_date().is_none() {
        errors.push(FieldError::new("return_date", "Return date is not a valid date"));
    }

    if let (Some(pickup), Some(ret)) = (draft.parsed_pickup_date(), draft.parsed_return_date()) {
        if ret <= pickup {
            errors.push(FieldError::new(
                "return_date",
                "Return date must be after the pickup date",
            ));
        }
    }

    if draft.pickup_location.trim().is_empty() {
        errors.push(FieldError::new("pickup_location", "Pickup location is required"));
    }
    if draft.return_location.trim().is_empty() {
        errors.push(FieldError::new("return_location", "Return location is required"));
    }

    errors
}

pub fn validate_customer(draft: &BookingDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let customer = &draft.customer;

    if customer.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "Full name is required"));
    }

    if customer.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(customer.email.trim()) {
        errors.push(FieldError::new("email", "Email address is not valid"));
    }

    if customer.phone.trim().is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if !is_valid_phone(customer.phone.trim()) {
        errors.push(FieldError::new("phone", "Phone number is not valid"));
    }

    if customer.license_number.trim().is_empty() {
        errors.push(FieldError::new("license_number", "Driving licence number is required"));
    }

    errors
}

pub fn validate_payment_at(draft: &BookingDraft, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let payment = &draft.payment;

    let digits: String = payment
        .card_number
        .0
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        errors.push(FieldError::new("card_number", "Card number is required"));
    } else if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("card_number", "Card number must be 13 to 19 digits"));
    }

    if payment.card_holder.trim().is_empty() {
        errors.push(FieldError::new("card_holder", "Card holder name is required"));
    }

    if payment.expiry.trim().is_empty() {
        errors.push(FieldError::new("expiry", "Expiry date is required"));
    } else {
        match parse_expiry(payment.expiry.trim()) {
            // A card is valid through the end of its expiry month.
            Some((year, month)) if (year, month) < (today.year(), today.month()) => {
                errors.push(FieldError::new("expiry", "Card has expired"));
            }
            Some(_) => {}
            None => errors.push(FieldError::new("expiry", "Expiry must be in MM/YY format")),
        }
    }

    let cvv = payment.cvv.0.trim();
    if cvv.is_empty() {
        errors.push(FieldError::new("cvv", "Security code is required"));
    } else if !CVV_REGEX.is_match(cvv) {
        errors.push(FieldError::new("cvv", "Security code must be 3 or 4 digits"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivio_shared::Masked;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn valid_dates_draft() -> BookingDraft {
        let mut draft = BookingDraft::default();
        draft.vehicle_id = Some(Uuid::new_v4());
        draft.pickup_date = "2025-06-01".to_string();
        draft.return_date = "2025-06-03".to_string();
        draft.pickup_location = "Austin Downtown".to_string();
        draft.return_location = "Austin Airport".to_string();
        draft
    }

    fn has_error(errors: &[FieldError], field: &str) -> bool {
        errors.iter().any(|e| e.field == field)
    }

    #[test]
    fn valid_dates_pass() {
        assert!(validate_dates_at(&valid_dates_draft(), today()).is_empty());
    }

    #[test]
    fn missing_dates_are_field_keyed() {
        let errors = validate_dates_at(&BookingDraft::default(), today());
        assert!(has_error(&errors, "pickup_date"));
        assert!(has_error(&errors, "return_date"));
        assert!(has_error(&errors, "pickup_location"));
        assert!(has_error(&errors, "vehicle_id"));
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let mut draft = valid_dates_draft();
        draft.pickup_date = "01/06/2025".to_string();
        let errors = validate_dates_at(&draft, today());
        assert!(has_error(&errors, "pickup_date"));
    }

    #[test]
    fn return_not_after_pickup_is_a_date_order_error() {
        let mut draft = valid_dates_draft();
        draft.return_date = draft.pickup_date.clone();
        let errors = validate_dates_at(&draft, today());
        assert!(has_error(&errors, "return_date"));
    }

    #[test]
    fn pickup_in_the_past_is_rejected() {
        let mut draft = valid_dates_draft();
        draft.pickup_date = "2025-05-19".to_string();
        let errors = validate_dates_at(&draft, today());
        assert!(has_error(&errors, "pickup_date"));
    }

    #[test]
    fn customer_info_checks_formats() {
        let mut draft = BookingDraft::default();
        draft.customer.full_name = "Ada Lovelace".to_string();
        draft.customer.email = "ada@example.com".to_string();
        draft.customer.phone = "+1 (512) 555-0142".to_string();
        draft.customer.license_number = "TX-4415-88".to_string();
        assert!(validate_customer(&draft).is_empty());

        draft.customer.email = "not-an-address".to_string();
        draft.customer.phone = "12".to_string();
        let errors = validate_customer(&draft);
        assert!(has_error(&errors, "email"));
        assert!(has_error(&errors, "phone"));
    }

    #[test]
    fn payment_accepts_spaced_card_numbers() {
        let mut draft = BookingDraft::default();
        draft.payment.card_number = Masked("4111 1111 1111 1111".to_string());
        draft.payment.card_holder = "Ada Lovelace".to_string();
        draft.payment.expiry = "12/30".to_string();
        draft.payment.cvv = Masked("123".to_string());
        assert!(validate_payment_at(&draft, today()).is_empty());
    }

    #[test]
    fn payment_rejects_short_card_and_bad_cvv() {
        let mut draft = BookingDraft::default();
        draft.payment.card_number = Masked("4111".to_string());
        draft.payment.card_holder = "Ada Lovelace".to_string();
        draft.payment.expiry = "12/30".to_string();
        draft.payment.cvv = Masked("12".to_string());

        let errors = validate_payment_at(&draft, today());
        assert!(has_error(&errors, "card_number"));
        assert!(has_error(&errors, "cvv"));
    }

    #[test]
    fn expiry_is_valid_through_its_own_month() {
        let mut draft = BookingDraft::default();
        draft.payment.card_number = Masked("4111111111111111".to_string());
        draft.payment.card_holder = "Ada Lovelace".to_string();
        draft.payment.cvv = Masked("123".to_string());

        draft.payment.expiry = "05/25".to_string();
        assert!(validate_payment_at(&draft, today()).is_empty());

        draft.payment.expiry = "04/25".to_string();
        let errors = validate_payment_at(&draft, today());
        assert!(has_error(&errors, "expiry"));

        draft.payment.expiry = "13/25".to_string();
        let errors = validate_payment_at(&draft, today());
        assert!(has_error(&errors, "expiry"));
    }

    #[test]
    fn confirmation_step_has_no_inputs() {
        assert!(validate_step_at(WizardStep::Confirmation, &BookingDraft::default(), today()).is_empty());
    }
}
