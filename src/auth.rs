//! Admin authentication.
//!
//! There is a single admin account. Logging in with its email hands back a
//! bearer token that protected routes check through an [`Authenticator`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub trait Authenticator: Send + Sync + 'static {
    fn verify(&self, token: &str) -> bool;

    /// Exchange credentials for a bearer token.
    fn issue(&self, email: &str) -> Option<String>;
}

/// Accepts the configured admin email, compared case-insensitively, as both
/// credential and token.
#[derive(Clone, Debug)]
pub struct AdminEmailAuthenticator {
    email: String,
}

impl AdminEmailAuthenticator {
    pub fn new(email: &str) -> Self { Self { email: email.trim().to_lowercase() } }
}

impl Authenticator for AdminEmailAuthenticator {
    fn verify(&self, token: &str) -> bool {
        !self.email.is_empty() && token.trim().to_lowercase() == self.email
    }

    fn issue(&self, email: &str) -> Option<String> {
        self.verify(email).then(|| self.email.clone())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    /// Shown on the dashboard only; never checked.
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,
    #[error("Missing or invalid bearer token")]
    Unauthorized,
}

pub fn login(auth: &dyn Authenticator, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
    let token = auth.issue(&request.email).ok_or(AuthError::InvalidCredentials)?;
    tracing::info!(email = %token, "admin logged in");
    Ok(LoginResponse { email: token.clone(), token, logged_in_at: Utc::now() })
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_admin_email() {
        let auth = AdminEmailAuthenticator::new("Owner@Jibreel.shop");
        assert!(auth.verify("owner@jibreel.shop"));
        assert!(auth.verify(" OWNER@jibreel.shop "));
        assert!(!auth.verify("someone@else.com"));
        assert!(!auth.verify(""));
    }

    #[test]
    fn test_blank_admin_email_accepts_nothing() {
        let auth = AdminEmailAuthenticator::new("  ");
        assert!(!auth.verify(""));
        assert!(!auth.verify("  "));
    }

    #[test]
    fn test_login() {
        let auth = AdminEmailAuthenticator::new("owner@jibreel.shop");
        let ok = login(&auth, &LoginRequest { email: "Owner@jibreel.shop".into() }).unwrap();
        assert_eq!(ok.token, "owner@jibreel.shop");
        assert!(auth.verify(&ok.token));

        let err = login(&auth, &LoginRequest { email: "intruder@x.com".into() }).unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }
}
