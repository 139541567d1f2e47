pub mod models;
pub mod pii;

pub use models::{
    Booking, BookingStatus, CreateBookingRequest, Credentials, LoginResponse, Vehicle,
};
pub use pii::Masked;
