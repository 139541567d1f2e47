use serde::{Deserialize, Serialize};

/// The client-held record of an authenticated user for the current visit.
/// Created at login, dropped at logout or once the backend rejects the token.
/// There is no refresh path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: String,
}
