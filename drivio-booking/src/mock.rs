use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use drivio_core::api::BookingApi;
use drivio_core::cancel::CancelSignal;
use drivio_core::{ApiError, ApiResult};
use drivio_shared::{Booking, BookingStatus, CreateBookingRequest};

/// In-memory stand-in for the booking backend, scripted to either confirm
/// bookings or fail with a fixed error. Records the requests it saw so
/// tests can assert the one-call-per-submit property.
pub struct MockBookingApi {
    calls: AtomicUsize,
    last_request: Mutex<Option<CreateBookingRequest>>,
    fail_with: Mutex<Option<ApiError>>,
}

impl MockBookingApi {
    /// A backend that confirms every booking.
    pub fn confirming() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            fail_with: Mutex::new(None),
        }
    }

    /// A backend that fails every booking with the given error.
    pub fn failing(error: ApiError) -> Self {
        let mock = Self::confirming();
        *mock.fail_with.lock().unwrap() = Some(error);
        mock
    }

    /// Change the scripted failure; None switches back to confirming.
    pub fn set_failure(&self, error: Option<ApiError>) {
        *self.fail_with.lock().unwrap() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CreateBookingRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingApi for MockBookingApi {
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        cancel: &CancelSignal,
    ) -> ApiResult<Booking> {
        // A cancelled call never reaches the backend.
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }

        let now = Utc::now();
        let days = (request.return_date - request.pickup_date).num_days().max(1) as i32;
        Ok(Booking {
            id: Uuid::new_v4(),
            customer_id: request.customer_id.clone(),
            vehicle_id: request.vehicle_id,
            pickup_date: request.pickup_date,
            return_date: request.return_date,
            pickup_location: request.pickup_location.clone(),
            return_location: request.return_location.clone(),
            status: BookingStatus::Confirmed,
            total_minor: days * 4_500,
            currency: "USD".to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}
