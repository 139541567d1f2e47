pub mod api;
pub mod cancel;
pub mod session;

/// Failure taxonomy for calls against the rental backend. Validation errors
/// never appear here: the step validators resolve those locally before a
/// request is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 4xx other than auth. The request itself was rejected; the user has to
    /// correct their input before trying again.
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    /// Transport-level failure. The request may never have reached the backend.
    #[error("network failure: {0}")]
    Network(String),
    /// 5xx from the backend.
    #[error("server failure (status {status}): {message}")]
    Server { status: u16, message: String },
    /// The call was abandoned through its [`cancel::CancelSignal`].
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether resubmitting the same request can succeed without the user
    /// changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("session expired")]
    SessionExpired,
    #[error("not authenticated")]
    NotAuthenticated,
}

pub type ApiResult<T> = Result<T, ApiError>;
