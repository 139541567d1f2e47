pub mod draft;
pub mod mock;
pub mod validate;
pub mod wizard;

pub use draft::{BookingDraft, CustomerDetails, PaymentCard};
pub use mock::MockBookingApi;
pub use validate::{validate_step, FieldError};
pub use wizard::{
    BookingResult, BookingWizard, SubmissionStatus, WizardError, WizardState, WizardStep,
};
