use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use drivio_booking::{BookingWizard, MockBookingApi, SubmissionStatus, WizardStep};
use drivio_core::cancel::CancelSignal;
use drivio_core::ApiError;
use drivio_shared::Masked;

fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn fill_whole_draft(wizard: &mut BookingWizard, vehicle_id: Uuid) {
    let draft = wizard.draft_mut();
    draft.vehicle_id = Some(vehicle_id);
    draft.pickup_date = date_in(14);
    draft.return_date = date_in(16);
    draft.pickup_location = "Berlin Hauptbahnhof".to_string();
    draft.return_location = "Berlin Tegel".to_string();
    draft.customer.full_name = "Grace Hopper".to_string();
    draft.customer.email = "grace@example.com".to_string();
    draft.customer.phone = "+49 30 901820".to_string();
    draft.customer.license_number = "B-7722-19".to_string();
    draft.payment.card_number = Masked("4111 1111 1111 1111".to_string());
    draft.payment.card_holder = "Grace Hopper".to_string();
    draft.payment.expiry = "12/30".to_string();
    draft.payment.cvv = Masked("123".to_string());
}

#[tokio::test]
async fn full_flow_from_dates_to_confirmation() {
    let api = Arc::new(MockBookingApi::confirming());
    let mut wizard = BookingWizard::new(api.clone(), "customer-42");
    let vehicle_id = Uuid::new_v4();
    fill_whole_draft(&mut wizard, vehicle_id);

    assert_eq!(wizard.advance().unwrap().current_step, WizardStep::CustomerInfo);
    assert_eq!(wizard.advance().unwrap().current_step, WizardStep::Payment);
    assert_eq!(wizard.advance().unwrap().current_step, WizardStep::Payment);
    assert!(wizard.can_submit());

    let result = wizard.submit(&CancelSignal::none()).await.unwrap();
    assert_eq!(result.status, SubmissionStatus::Success);
    assert!(result.booking_id.is_some());
    assert_eq!(wizard.state().current_step, WizardStep::Confirmation);

    let request = api.last_request().unwrap();
    assert_eq!(request.customer_id, "customer-42");
    assert_eq!(request.vehicle_id, vehicle_id);
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn transient_failure_then_manual_resubmission() {
    let api = Arc::new(MockBookingApi::failing(ApiError::Network(
        "connection reset".to_string(),
    )));
    let mut wizard = BookingWizard::new(api.clone(), "customer-42");
    fill_whole_draft(&mut wizard, Uuid::new_v4());
    wizard.advance().unwrap();
    wizard.advance().unwrap();
    wizard.advance().unwrap();

    let first = wizard.submit(&CancelSignal::none()).await.unwrap();
    assert_eq!(first.status, SubmissionStatus::Failure);
    assert!(first.retryable);
    assert_eq!(wizard.state().current_step, WizardStep::Payment);

    // no built-in retry: the user resubmits the intact draft by hand
    api.set_failure(None);
    let second = wizard.submit(&CancelSignal::none()).await.unwrap();
    assert_eq!(second.status, SubmissionStatus::Success);
    assert_eq!(api.calls(), 2);
}
