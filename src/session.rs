//! The logged-in user and their token, kept in sync with the local store.
//!
//! A `Session` is created once per command by [`Session::init`], which
//! rehydrates from the persisted token. Every state change goes through this
//! type so the store and the client's bearer token never disagree.

use crate::api::{ApiClient, Transport};
use crate::error::ApiError;
use crate::forms::{LoginForm, PasswordForm, ProfileForm, SignupForm};
use crate::models::{Role, User};
use crate::storage::{LocalStore, AUTH_TOKEN_KEY};

pub const LOGIN_REQUIRED: &str = "Please log in first.";
pub const ADMIN_REQUIRED: &str = "This action requires an admin account.";

/// Why a command may not run for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("{}", LOGIN_REQUIRED)]
    NotLoggedIn,
    #[error("{}", ADMIN_REQUIRED)]
    NotAdmin,
}

pub struct Session<T: Transport> {
    client: ApiClient<T>,
    store: LocalStore,
    user: Option<User>,
}

impl<T: Transport> Session<T> {
    /// Restore the session from the stored token. A token the backend rejects
    /// is dropped and the session starts logged out; that is not an error.
    pub fn init(mut client: ApiClient<T>, store: LocalStore) -> Result<Self, ApiError> {
        let token = store.get(AUTH_TOKEN_KEY)?;
        client.set_token(token.clone());
        let mut session = Self { client, store, user: None };

        if token.is_none() {
            return Ok(session);
        }
        match session.client.me() {
            Ok(user) => {
                tracing::debug!(user = %user.email, "session restored");
                session.user = Some(user);
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token rejected, clearing session");
                session.clear()?;
            }
        }
        Ok(session)
    }

    pub fn login(&mut self, form: LoginForm) -> Result<&User, ApiError> {
        let form = form.validate()?;
        let auth = self.client.login(&form)?;
        self.establish(auth.token, auth.user)
    }

    pub fn signup(&mut self, form: SignupForm) -> Result<&User, ApiError> {
        let form = form.validate()?;
        let auth = self.client.register(&form)?;
        self.establish(auth.token, auth.user)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        if let Some(user) = &self.user {
            tracing::info!(user = %user.email, "logged out");
        }
        self.clear()
    }

    pub fn update_profile(&mut self, form: ProfileForm) -> Result<&User, ApiError> {
        self.require_auth()?;
        let update = form.validate()?.validate()?;
        let user = self.client.update_me(&update)?;
        tracing::info!(user = %user.email, "profile updated");
        Ok(&*self.user.insert(user))
    }

    pub fn change_password(&mut self, form: PasswordForm) -> Result<(), ApiError> {
        self.require_auth()?;
        let update = form.validate()?.validate()?;
        let user = self.client.update_me(&update)?;
        tracing::info!(user = %user.email, "password changed");
        self.user = Some(user);
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.client.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn require_auth(&self) -> Result<&User, AccessError> {
        self.user.as_ref().ok_or(AccessError::NotLoggedIn)
    }

    pub fn require_admin(&self) -> Result<&User, AccessError> {
        let user = self.require_auth()?;
        if user.role == Role::Admin {
            Ok(user)
        } else {
            Err(AccessError::NotAdmin)
        }
    }

    fn establish(&mut self, token: String, user: User) -> Result<&User, ApiError> {
        self.store.set(AUTH_TOKEN_KEY, &token)?;
        self.client.set_token(Some(token));
        tracing::info!(user = %user.email, role = %user.role, "logged in");
        Ok(&*self.user.insert(user))
    }

    fn clear(&mut self) -> Result<(), ApiError> {
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.client.set_token(None);
        self.user = None;
        Ok(())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Status {
            status: match err {
                AccessError::NotLoggedIn => 401,
                AccessError::NotAdmin => 403,
            },
            message: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::api::Method;
    use crate::validation::FORM_KEY;

    fn fresh(backend: &FakeBackend) -> Session<FakeBackend> {
        let store = LocalStore::open_in_memory().unwrap();
        Session::init(ApiClient::new(backend.clone()), store).unwrap()
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm { email: email.into(), password: password.into() }
    }

    #[test]
    fn test_init_without_token_is_logged_out() {
        let backend = FakeBackend::new();
        let session = fresh(&backend);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_login_persists_token_and_sets_user() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut session = fresh(&backend);

        let user = session.login(login_form("asha@college.edu", "secret1")).unwrap();
        assert_eq!(user.name, "Asha");
        assert!(session.is_authenticated());
        assert!(!session.is_admin());

        let stored = session.store.get(AUTH_TOKEN_KEY).unwrap();
        assert!(stored.is_some());
        assert_eq!(stored.as_deref(), session.token());
    }

    #[test]
    fn test_login_failure_leaves_state_untouched() {
        let backend = FakeBackend::new();
        let mut session = fresh(&backend);
        let err = session.login(login_form("asha@college.edu", "wrong")).unwrap_err();
        assert_eq!(err.user_message("Login failed. Please check your credentials."), "Invalid credentials");
        assert!(!session.is_authenticated());
        assert_eq!(session.store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_invalid_login_form_makes_no_request() {
        let backend = FakeBackend::new();
        let mut session = fresh(&backend);
        let err = session.login(login_form("not-an-email", "")).unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert!(errors.get("email").is_some());
                assert!(errors.get("password").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_logout_clears_token_and_user() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut session = fresh(&backend);
        session.login(login_form("asha@college.edu", "secret1")).unwrap();

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_init_hydrates_from_stored_token() {
        let backend = FakeBackend::new();
        let token = backend.add_user("tpo@college.edu", "admin123", "TPO", Role::Admin);
        let store = LocalStore::open_in_memory().unwrap();
        store.set(AUTH_TOKEN_KEY, &token).unwrap();

        let session = Session::init(ApiClient::new(backend.clone()), store).unwrap();
        assert!(session.is_admin());
        assert_eq!(session.token(), Some(token.as_str()));
        let sent = backend.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].path, "/auth/me");
    }

    #[test]
    fn test_init_with_rejected_token_clears_store() {
        let backend = FakeBackend::new();
        let token = backend.add_user("tpo@college.edu", "admin123", "TPO", Role::Admin);
        backend.expire_tokens();
        let store = LocalStore::open_in_memory().unwrap();
        store.set(AUTH_TOKEN_KEY, &token).unwrap();

        let session = Session::init(ApiClient::new(backend), store).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_signup_logs_in_new_user() {
        let backend = FakeBackend::new();
        let mut session = fresh(&backend);
        let form = SignupForm {
            name: "Ravi".into(),
            email: "ravi@college.edu".into(),
            password: "hunter22".into(),
            rollno: "21EC07".into(),
            role: Role::Student,
        };
        session.signup(form.clone()).unwrap();
        assert_eq!(session.user().map(|u| u.rollno.as_str()), Some("21EC07"));

        let err = fresh(&backend).signup(form).unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_profile_update_replaces_user() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut session = fresh(&backend);
        session.login(login_form("asha@college.edu", "secret1")).unwrap();

        session
            .update_profile(ProfileForm { name: "Asha K".into(), email: "asha.k@college.edu".into() })
            .unwrap();
        assert_eq!(session.user().unwrap().email, "asha.k@college.edu");
    }

    #[test]
    fn test_change_password_then_login_with_new_one() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut session = fresh(&backend);
        session.login(login_form("asha@college.edu", "secret1")).unwrap();

        let same = PasswordForm { password: "secret1".into(), new_password: "secret1".into() };
        assert!(matches!(session.change_password(same), Err(ApiError::Validation(_))));

        let wrong = PasswordForm { password: "nope12".into(), new_password: "secret2".into() };
        let err = session.change_password(wrong).unwrap_err();
        assert_eq!(err.user_message("Failed to change password."), "Current password is incorrect");

        session
            .change_password(PasswordForm { password: "secret1".into(), new_password: "secret2".into() })
            .unwrap();
        session.logout().unwrap();
        assert!(session.login(login_form("asha@college.edu", "secret1")).is_err());
        assert!(session.login(login_form("asha@college.edu", "secret2")).is_ok());
    }

    #[test]
    fn test_guards() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        backend.add_user("tpo@college.edu", "admin123", "TPO", Role::Admin);
        let mut session = fresh(&backend);

        assert_eq!(session.require_auth().unwrap_err(), AccessError::NotLoggedIn);
        let err = session
            .update_profile(ProfileForm { name: "X".into(), email: "x@college.edu".into() })
            .unwrap_err();
        assert_eq!(err.user_message("Failed to update profile."), LOGIN_REQUIRED);

        session.login(login_form("asha@college.edu", "secret1")).unwrap();
        assert!(session.require_auth().is_ok());
        assert_eq!(session.require_admin().unwrap_err(), AccessError::NotAdmin);

        session.logout().unwrap();
        session.login(login_form("tpo@college.edu", "admin123")).unwrap();
        assert_eq!(session.require_admin().unwrap().name, "TPO");
    }

    #[test]
    fn test_empty_profile_update_is_rejected_locally() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut session = fresh(&backend);
        session.login(login_form("asha@college.edu", "secret1")).unwrap();
        let before = backend.requests().len();

        let err = session
            .update_profile(ProfileForm { name: " ".into(), email: "".into() })
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert!(errors.get("name").is_some());
                assert!(errors.get(FORM_KEY).is_none());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(backend.requests().len(), before);
    }
}
