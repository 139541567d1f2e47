use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use drivio_core::api::{AuthApi, BookingApi, VehicleApi};
use drivio_core::cancel::CancelSignal;
use drivio_core::session::Session;
use drivio_core::{ApiError, ApiResult, AuthError};
use drivio_shared::{Booking, CreateBookingRequest, Credentials, LoginResponse, Vehicle};

use crate::config::ClientConfig;
use crate::session::SessionState;

/// Error body shape the backend speaks.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed implementation of the backend seams. Authenticated calls
/// carry the bearer token from the shared [`SessionState`]; a 401/403 reply
/// clears that state, which is how token expiry is detected client-side.
pub struct RestApiClient {
    base_url: String,
    http: Client,
    session: Arc<SessionState>,
}

impl RestApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionState>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Option<String> {
        self.session.get().map(|s| s.token)
    }

    /// Map a non-2xx response onto the error taxonomy. Auth rejections also
    /// drop the stored session so the caller lands back on login.
    async fn error_for(&self, response: Response) -> ApiError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "authenticated request rejected");
            return ApiError::Auth(self.session.on_auth_failure());
        }
        classify_status(status.as_u16(), message)
    }

    async fn decode<T: for<'de> Deserialize<'de>>(&self, response: Response) -> ApiResult<T> {
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Network(format!("malformed response: {e}")))
    }
}

/// 4xx needs user correction; anything else non-2xx is a retryable server
/// fault. Auth statuses are intercepted before this.
fn classify_status(status: u16, message: String) -> ApiError {
    match status {
        400..=499 => ApiError::Rejected { message },
        _ => ApiError::Server { status, message },
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

#[async_trait]
impl BookingApi for RestApiClient {
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        cancel: &CancelSignal,
    ) -> ApiResult<Booking> {
        debug!(vehicle_id = %request.vehicle_id, "POST /api/bookings");
        let mut call = self.http.post(self.url("/api/bookings")).json(request);
        if let Some(token) = self.bearer() {
            call = call.bearer_auth(token);
        }

        // Racing against the signal: losing means the embedding page went
        // away and no wizard state may change afterwards.
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = call.send() => result.map_err(transport_error)?,
        };
        self.decode(response).await
    }
}

#[async_trait]
impl VehicleApi for RestApiClient {
    async fn list_vehicles(&self) -> ApiResult<Vec<Vehicle>> {
        debug!("GET /api/vehicles");
        let response = self
            .http
            .get(self.url("/api/vehicles"))
            .send()
            .await
            .map_err(transport_error)?;
        self.decode(response).await
    }

    async fn get_vehicle(&self, id: Uuid) -> ApiResult<Vehicle> {
        debug!(%id, "GET /api/vehicles/{id}");
        let response = self
            .http
            .get(self.url(&format!("/api/vehicles/{id}")))
            .send()
            .await
            .map_err(transport_error)?;
        self.decode(response).await
    }
}

#[async_trait]
impl AuthApi for RestApiClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        debug!(username = %credentials.username, "POST /api/auth/login");
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(transport_error)?;

        // A 401 here means the credentials were declined, not that a held
        // session expired.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth(AuthError::InvalidCredentials));
        }

        let body: LoginResponse = self.decode(response).await?;
        match body.token {
            Some(token) if body.authenticated => Ok(Session {
                token,
                username: body.username,
                role: body.role,
            }),
            _ => Err(ApiError::Auth(AuthError::InvalidCredentials)),
        }
    }

    async fn activate_account(&self, token: &str) -> ApiResult<()> {
        debug!("POST /api/customers/activate");
        let response = self
            .http
            .post(self.url("/api/customers/activate"))
            .query(&[("token", token)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        Ok(())
    }
}
