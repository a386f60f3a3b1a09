use serde::Deserialize;

use super::{ApiClient, Transport};
use crate::error::ApiError;
use crate::forms::{LoginForm, SignupForm, UserUpdate};
use crate::models::User;

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

/// `GET /auth/me` has been seen both bare and wrapped in `{ user }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeResponse {
    Wrapped(UserEnvelope),
    Bare(User),
}

impl<T: Transport> ApiClient<T> {
    pub fn register(&self, form: &SignupForm) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register".to_string(), form)
    }

    pub fn login(&self, form: &LoginForm) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login".to_string(), form)
    }

    pub fn me(&self) -> Result<User, ApiError> {
        match self.get::<MeResponse>("/auth/me".to_string())? {
            MeResponse::Wrapped(envelope) => Ok(envelope.user),
            MeResponse::Bare(user) => Ok(user),
        }
    }

    /// Returns the updated user.
    pub fn update_me(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.put("/auth/me".to_string(), update)?;
        Ok(envelope.user)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::FakeBackend;
    use super::*;
    use crate::api::Method;
    use crate::models::Role;
    use serde_json::json;

    #[test]
    fn test_login_returns_token_and_user() {
        let backend = FakeBackend::new();
        backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let client = ApiClient::new(backend.clone());

        let resp = client
            .login(&LoginForm { email: "asha@college.edu".into(), password: "secret1".into() })
            .unwrap();
        assert_eq!(resp.user.name, "Asha");
        assert!(!resp.token.is_empty());

        let sent = backend.requests().pop().unwrap();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "/auth/login");
        assert_eq!(sent.body, Some(json!({ "email": "asha@college.edu", "password": "secret1" })));
    }

    #[test]
    fn test_login_bad_credentials_surfaces_backend_message() {
        let backend = FakeBackend::new();
        let client = ApiClient::new(backend);
        let err = client
            .login(&LoginForm { email: "nobody@college.edu".into(), password: "x".into() })
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message("Login failed."), "Invalid credentials");
    }

    #[test]
    fn test_me_accepts_bare_and_wrapped_user() {
        let user = json!({ "_id": "u9", "name": "Meera", "email": "m@college.edu", "rollno": "22ME4", "role": "student" });

        let backend = FakeBackend::new();
        backend.respond_with(Method::Get, "/auth/me", user.clone());
        assert_eq!(ApiClient::new(backend.clone()).me().unwrap().id, "u9");

        backend.respond_with(Method::Get, "/auth/me", json!({ "user": user }));
        assert_eq!(ApiClient::new(backend).me().unwrap().name, "Meera");
    }

    #[test]
    fn test_update_me_sends_only_present_fields() {
        let backend = FakeBackend::new();
        let token = backend.add_user("asha@college.edu", "secret1", "Asha", Role::Student);
        let mut client = ApiClient::new(backend.clone());
        client.set_token(Some(token));

        let user = client
            .update_me(&UserUpdate { name: Some("Asha K".into()), ..UserUpdate::default() })
            .unwrap();
        assert_eq!(user.name, "Asha K");
        assert_eq!(backend.requests().pop().unwrap().body, Some(json!({ "name": "Asha K" })));
    }
}
