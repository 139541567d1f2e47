use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivio_core::api::BookingApi;
use drivio_core::cancel::CancelSignal;
use drivio_core::{ApiError, AuthError};
use drivio_shared::CreateBookingRequest;

use crate::draft::BookingDraft;
use crate::validate::{validate_step, FieldError};

/// The four wizard steps, in flow order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    Dates,
    CustomerInfo,
    Payment,
    Confirmation,
}

impl WizardStep {
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Dates => Some(WizardStep::CustomerInfo),
            WizardStep::CustomerInfo => Some(WizardStep::Payment),
            WizardStep::Payment => Some(WizardStep::Confirmation),
            WizardStep::Confirmation => None,
        }
    }

    pub fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Dates => None,
            WizardStep::CustomerInfo => Some(WizardStep::Dates),
            WizardStep::Payment => Some(WizardStep::CustomerInfo),
            WizardStep::Confirmation => Some(WizardStep::Payment),
        }
    }
}

/// Snapshot of where the flow stands: the active step, the steps already
/// passed, and any field errors recorded per step. A step can only be
/// current when every step before it is completed.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub completed: Vec<WizardStep>,
    pub errors: HashMap<WizardStep, Vec<FieldError>>,
}

impl WizardState {
    fn new() -> Self {
        Self {
            current_step: WizardStep::Dates,
            completed: Vec::new(),
            errors: HashMap::new(),
        }
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn step_errors(&self, step: WizardStep) -> &[FieldError] {
        self.errors.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }

    fn mark_completed(&mut self, step: WizardStep) {
        if !self.completed.contains(&step) {
            self.completed.push(step);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Success,
    Failure,
}

/// Outcome of a single submission attempt. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResult {
    pub status: SubmissionStatus,
    pub booking_id: Option<Uuid>,
    pub error_message: Option<String>,
    /// Whether resubmitting without changing anything can succeed.
    pub retryable: bool,
}

impl BookingResult {
    fn success(booking_id: Uuid) -> Self {
        Self {
            status: SubmissionStatus::Success,
            booking_id: Some(booking_id),
            error_message: None,
            retryable: false,
        }
    }

    fn failure(message: String, retryable: bool) -> Self {
        Self {
            status: SubmissionStatus::Failure,
            booking_id: None,
            error_message: Some(message),
            retryable,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("booking flow already confirmed")]
    AlreadyConfirmed,

    #[error("no step before {0:?}")]
    NoPreviousStep(WizardStep),

    #[error("step {step:?} has not been completed yet")]
    StepNotReachable { step: WizardStep },

    #[error("payment step not completed")]
    SubmitNotReady,

    #[error("authentication failed: {0}")]
    Auth(AuthError),

    #[error("submission cancelled")]
    Cancelled,
}

/// Owns the multi-step booking flow: one draft, one state, one backend seam.
/// Steps advance Dates → CustomerInfo → Payment, each gated by its
/// validator; Confirmation is entered only by a successful submission.
pub struct BookingWizard {
    customer_id: String,
    draft: BookingDraft,
    state: WizardState,
    api: Arc<dyn BookingApi>,
}

impl BookingWizard {
    /// `customer_id` identifies the authenticated customer; the embedding
    /// app sources it from the session.
    pub fn new(api: Arc<dyn BookingApi>, customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            draft: BookingDraft::default(),
            state: WizardState::new(),
            api,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    /// Mutable access for the form layer; values are checked on advance.
    pub fn draft_mut(&mut self) -> &mut BookingDraft {
        &mut self.draft
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Validate the active step and move forward. A failed validation keeps
    /// the step and records its field errors. A validated Payment step is
    /// marked completed but stays put: the step after it is entered through
    /// [`submit`](Self::submit), not here.
    pub fn advance(&mut self) -> Result<&WizardState, WizardError> {
        let step = self.state.current_step;
        if step == WizardStep::Confirmation {
            return Err(WizardError::AlreadyConfirmed);
        }

        let errors = validate_step(step, &self.draft);
        if !errors.is_empty() {
            self.state.errors.insert(step, errors);
            return Ok(&self.state);
        }

        self.state.errors.remove(&step);
        self.state.mark_completed(step);
        if step != WizardStep::Payment {
            if let Some(next) = step.next() {
                tracing::info!(from = ?step, to = ?next, "wizard step advanced");
                self.state.current_step = next;
            }
        }
        Ok(&self.state)
    }

    /// Move to the previous step. Entered data is kept.
    pub fn go_back(&mut self) -> Result<&WizardState, WizardError> {
        let step = self.state.current_step;
        if step == WizardStep::Confirmation {
            return Err(WizardError::AlreadyConfirmed);
        }
        let prev = step.prev().ok_or(WizardError::NoPreviousStep(step))?;
        self.state.current_step = prev;
        Ok(&self.state)
    }

    /// Jump to an already completed step, or stay on the current one.
    pub fn go_to(&mut self, step: WizardStep) -> Result<&WizardState, WizardError> {
        if self.state.current_step == WizardStep::Confirmation {
            return Err(WizardError::AlreadyConfirmed);
        }
        if step == self.state.current_step {
            return Ok(&self.state);
        }
        if step == WizardStep::Confirmation || !self.state.is_completed(step) {
            return Err(WizardError::StepNotReachable { step });
        }
        self.state.current_step = step;
        Ok(&self.state)
    }

    /// Whether the flow is ready for submission: on Payment with the step
    /// validated.
    pub fn can_submit(&self) -> bool {
        self.state.current_step == WizardStep::Payment
            && self.state.is_completed(WizardStep::Payment)
    }

    /// Send the assembled booking to the backend. Exactly one API call per
    /// invocation. Success moves the flow to Confirmation; a backend
    /// rejection or transient failure keeps it on Payment so the user can
    /// correct or resubmit. Auth failures are surfaced as errors, not
    /// results: the caller redirects to login.
    pub async fn submit(&mut self, cancel: &CancelSignal) -> Result<BookingResult, WizardError> {
        if !self.can_submit() {
            return Err(WizardError::SubmitNotReady);
        }
        let request = self.build_request().ok_or(WizardError::SubmitNotReady)?;

        match self.api.create_booking(&request, cancel).await {
            Ok(booking) => {
                tracing::info!(booking_id = %booking.id, "booking confirmed");
                self.state.current_step = WizardStep::Confirmation;
                self.state.mark_completed(WizardStep::Confirmation);
                Ok(BookingResult::success(booking.id))
            }
            Err(ApiError::Auth(err)) => {
                // A session problem is not a payment problem: it must not
                // surface as a field error on this step.
                tracing::warn!(error = %err, "booking submission rejected for auth");
                Err(WizardError::Auth(err))
            }
            Err(ApiError::Cancelled) => Err(WizardError::Cancelled),
            Err(ApiError::Rejected { message }) => {
                tracing::warn!(%message, "booking rejected by backend");
                Ok(BookingResult::failure(message, false))
            }
            Err(err) => {
                tracing::warn!(error = %err, "booking submission failed");
                Ok(BookingResult::failure(err.to_string(), err.is_retryable()))
            }
        }
    }

    /// Throw the draft away and start over on an empty Dates step.
    pub fn reset(&mut self) {
        self.draft = BookingDraft::default();
        self.state = WizardState::new();
    }

    fn build_request(&self) -> Option<CreateBookingRequest> {
        Some(CreateBookingRequest {
            customer_id: self.customer_id.clone(),
            vehicle_id: self.draft.vehicle_id?,
            pickup_date: self.draft.parsed_pickup_date()?,
            return_date: self.draft.parsed_return_date()?,
            pickup_location: self.draft.pickup_location.trim().to_string(),
            return_location: self.draft.return_location.trim().to_string(),
        })
    }
}
