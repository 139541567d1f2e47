use async_trait::async_trait;
use uuid::Uuid;

use drivio_shared::{Booking, CreateBookingRequest, Credentials, Vehicle};

use crate::cancel::CancelSignal;
use crate::session::Session;
use crate::ApiResult;

/// Booking endpoint of the rental backend.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Create a booking. Exactly one request is issued per invocation; a
    /// fired signal abandons the call with [`crate::ApiError::Cancelled`]
    /// and no state may be mutated afterwards.
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        cancel: &CancelSignal,
    ) -> ApiResult<Booking>;
}

/// Vehicle catalog endpoints, consumed to populate the draft's vehicle
/// reference.
#[async_trait]
pub trait VehicleApi: Send + Sync {
    async fn list_vehicles(&self) -> ApiResult<Vec<Vehicle>>;

    async fn get_vehicle(&self, id: Uuid) -> ApiResult<Vehicle>;
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session>;

    /// Activate a freshly registered account.
    async fn activate_account(&self, token: &str) -> ApiResult<()>;
}
