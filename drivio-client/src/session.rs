use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use drivio_core::api::AuthApi;
use drivio_core::session::Session;
use drivio_core::{ApiResult, AuthError};
use drivio_shared::Credentials;

/// The shared cell holding the current session. The HTTP client reads the
/// bearer token from here and clears it when the backend rejects it; the
/// [`SessionStore`] drives login and logout against the same cell.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Mutex<Option<Session>>,
}

impl SessionState {
    pub fn get(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    pub fn set(&self, session: Session) {
        *self.current.lock().unwrap() = Some(session);
    }

    pub fn clear(&self) -> bool {
        self.current.lock().unwrap().take().is_some()
    }

    /// Called when an authenticated request came back 401/403. Clears the
    /// cell and names the failure: an expired session if one was held,
    /// otherwise a call that required login in the first place.
    pub fn on_auth_failure(&self) -> AuthError {
        if self.clear() {
            warn!("session rejected by backend, clearing");
            AuthError::SessionExpired
        } else {
            AuthError::NotAuthenticated
        }
    }
}

/// Holds the authenticated user for the lifetime of the process, the
/// analogue of a browser tab. Created at login, cleared at logout; an
/// expired token shows up as an auth failure on the next call and empties
/// the store, at which point the page-level code redirects to login.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    state: Arc<SessionState>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthApi>, state: Arc<SessionState>) -> Self {
        Self { auth, state }
    }

    /// The cell to hand to the HTTP client so both sides observe the same
    /// session.
    pub fn state(&self) -> Arc<SessionState> {
        self.state.clone()
    }

    /// Exchange credentials for a session and store it. A failed login
    /// leaves the store empty.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let session = self.auth.login(credentials).await?;
        info!(username = %session.username, role = %session.role, "logged in");
        self.state.set(session.clone());
        Ok(session)
    }

    pub fn logout(&self) {
        if self.state.clear() {
            info!("logged out");
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.get().is_some()
    }

    /// Account activation shares the auth error-handling path.
    pub async fn activate_account(&self, token: &str) -> ApiResult<()> {
        self.auth.activate_account(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drivio_core::ApiError;

    struct ScriptedAuthApi;

    #[async_trait]
    impl AuthApi for ScriptedAuthApi {
        async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
            if credentials.username == "grace" && credentials.password.0 == "hopper" {
                Ok(Session {
                    token: "tok-1".to_string(),
                    username: "grace".to_string(),
                    role: "CUSTOMER".to_string(),
                })
            } else {
                Err(ApiError::Auth(AuthError::InvalidCredentials))
            }
        }

        async fn activate_account(&self, token: &str) -> ApiResult<()> {
            if token == "activation-token" {
                Ok(())
            } else {
                Err(ApiError::Rejected {
                    message: "unknown activation token".to_string(),
                })
            }
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(ScriptedAuthApi), Arc::new(SessionState::default()))
    }

    #[tokio::test]
    async fn login_stores_the_session() {
        let store = store();
        let session = store.login(&Credentials::new("grace", "hopper")).await.unwrap();
        assert_eq!(session.role, "CUSTOMER");
        assert!(store.is_authenticated());
        assert_eq!(store.session().unwrap().token, "tok-1");
    }

    #[tokio::test]
    async fn invalid_credentials_leave_the_store_empty() {
        let store = store();
        let result = store.login(&Credentials::new("grace", "wrong")).await;
        assert!(matches!(
            result,
            Err(ApiError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let store = store();
        store.login(&Credentials::new("grace", "hopper")).await.unwrap();
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn auth_failure_names_expiry_only_when_a_session_was_held() {
        let store = store();
        assert_eq!(store.state().on_auth_failure(), AuthError::NotAuthenticated);

        store.login(&Credentials::new("grace", "hopper")).await.unwrap();
        assert_eq!(store.state().on_auth_failure(), AuthError::SessionExpired);
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn activation_shares_the_auth_error_path() {
        let store = store();
        assert!(store.activate_account("activation-token").await.is_ok());
        assert!(matches!(
            store.activate_account("stale").await,
            Err(ApiError::Rejected { .. })
        ));
    }
}
