//! Signed-in user context.
//!
//! The login response is kept verbatim under [`SESSION_KEY`]; everything
//! else (role checks, the `X-User-Role` header) is derived from it.

use serde::Deserialize;

use crate::api::{ApiError, AuthApi};
use crate::domain::session::{Credentials, SessionUser, UserRole};
use crate::forms::login::LoginForm;
use crate::services::{ServiceError, ServiceResult};
use crate::storage::errors::StorageError;
use crate::storage::{LocalStorage, SESSION_KEY};

pub const ADMIN_LANDING: &str = "/admin-notifications";
pub const HOME_LANDING: &str = "/";

pub trait SessionContext {
    fn current_user(&self) -> Option<SessionUser>;

    fn logout(&self) -> ServiceResult<()>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn role(&self) -> Option<UserRole> {
        self.current_user().map(|user| user.role)
    }

    fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_admin())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub user: SessionUser,
    /// View to open after signing in.
    pub landing: &'static str,
}

#[derive(Deserialize)]
struct LoginErrorBody {
    error: Option<String>,
}

/// Session backed by a [`LocalStorage`].
#[derive(Clone, Debug)]
pub struct StoredSession<S> {
    storage: S,
}

impl<S: LocalStorage> StoredSession<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Signs in and stores the returned user.
    pub fn login<A>(&self, api: &A, form: LoginForm) -> ServiceResult<LoginOutcome>
    where
        A: AuthApi + ?Sized,
    {
        let credentials = Credentials::try_from(form)?;

        let user = api.login(&credentials).map_err(|e| {
            log::warn!("Login failed for {}: {e}", credentials.email);
            ServiceError::Rejected(login_error_message(&e))
        })?;

        let serialized = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set_item(SESSION_KEY, &serialized)?;

        let landing = if user.is_admin() {
            ADMIN_LANDING
        } else {
            HOME_LANDING
        };
        Ok(LoginOutcome { user, landing })
    }
}

impl<S: LocalStorage> SessionContext for StoredSession<S> {
    fn current_user(&self) -> Option<SessionUser> {
        let raw = match self.storage.get_item(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::error!("Failed to read session: {e}");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("Ignoring unreadable session: {e}"))
            .ok()
    }

    fn logout(&self) -> ServiceResult<()> {
        self.storage.remove_item(SESSION_KEY)?;
        Ok(())
    }
}

fn login_error_message(err: &ApiError) -> String {
    err.body()
        .and_then(|body| serde_json::from_str::<LoginErrorBody>(body).ok())
        .and_then(|body| body.error)
        .unwrap_or_else(|| "Login failed".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::api::mock::MockBookingApi;
    use crate::storage::InMemoryStorage;

    fn form() -> LoginForm {
        LoginForm {
            email: "admin@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    fn user(role: &str) -> SessionUser {
        SessionUser {
            role: UserRole::from(role.to_string()),
            id: Some(1),
            name: Some("Maria".to_string()),
            email: Some("admin@example.com".to_string()),
            extra: Map::new(),
        }
    }

    #[test]
    fn admin_login_lands_on_notifications() {
        let mut api = MockBookingApi::new();
        api.expect_login()
            .withf(|c| c.email == "admin@example.com" && c.password == "secret")
            .returning(|_| Ok(user("ADMIN")));
        let session = StoredSession::new(InMemoryStorage::new());

        let outcome = session.login(&api, form()).unwrap();

        assert_eq!(outcome.landing, ADMIN_LANDING);
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.role(), Some(UserRole::Admin));
    }

    #[test]
    fn customer_login_lands_on_home() {
        let mut api = MockBookingApi::new();
        api.expect_login().returning(|_| Ok(user("CUSTOMER")));
        let session = StoredSession::new(InMemoryStorage::new());

        let outcome = session.login(&api, form()).unwrap();

        assert_eq!(outcome.landing, HOME_LANDING);
        assert!(!session.is_admin());
    }

    #[test]
    fn login_failure_surfaces_server_error() {
        let mut api = MockBookingApi::new();
        api.expect_login().returning(|_| {
            Err(ApiError::Status {
                status: 401,
                body: r#"{"error": "Invalid credentials"}"#.to_string(),
            })
        });
        let session = StoredSession::new(InMemoryStorage::new());

        let err = session.login(&api, form()).unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_failure_without_body_uses_default_message() {
        let mut api = MockBookingApi::new();
        api.expect_login()
            .returning(|_| Err(ApiError::Transport("refused".into())));
        let session = StoredSession::new(InMemoryStorage::new());

        let err = session.login(&api, form()).unwrap_err();

        assert_eq!(err.user_message(), "Login failed");
    }

    #[test]
    fn logout_forgets_user() {
        let storage = InMemoryStorage::new();
        storage
            .set_item(SESSION_KEY, r#"{"role": "ADMIN", "hubId": 4}"#)
            .unwrap();
        let session = StoredSession::new(&storage);

        assert_eq!(
            session.current_user().unwrap().extra.get("hubId"),
            Some(&serde_json::json!(4))
        );
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(session.role(), None);
    }

    #[test]
    fn unreadable_session_counts_as_signed_out() {
        let storage = InMemoryStorage::new();
        storage.set_item(SESSION_KEY, "not json").unwrap();

        assert!(!StoredSession::new(&storage).is_authenticated());
    }
}
