//! Cookie-session auth: credential validation, login/signup/logout and the
//! session probe that guards protected operations.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::api::NotesApi;
use crate::error::{Error, Result};
use crate::models::AuthUser;

/// Minimum password length accepted at signup.
pub const MIN_SIGNUP_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// Email/password pair that passed client-side validation.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Check the form before anything touches the network. The email is
    /// trimmed; the password is sent exactly as typed.
    pub fn validate(email: &str, password: &str, mode: AuthMode) -> Result<Self> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::Validation("Email is required.".to_string()));
        }
        match mode {
            AuthMode::Login if password.is_empty() => {
                return Err(Error::Validation("Password is required.".to_string()));
            }
            AuthMode::Signup if password.encode_utf16().count() < MIN_SIGNUP_PASSWORD_LEN => {
                return Err(Error::Validation(format!(
                    "Password must be at least {MIN_SIGNUP_PASSWORD_LEN} characters."
                )));
            }
            _ => {}
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    Unauthenticated,
}

/// Storage for the session cookie header between process runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_cookies(&self) -> Result<Option<String>>;
    fn save_cookies(&self, cookie_header: &str) -> Result<()>;
    fn clear_cookies(&self) -> Result<()>;
}

/// Process-local store, for sessions that should not outlive the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    cookies: Arc<Mutex<Option<String>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load_cookies(&self) -> Result<Option<String>> {
        Ok(self
            .cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_cookies(&self, cookie_header: &str) -> Result<()> {
        *self.cookies.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(cookie_header.to_string());
        Ok(())
    }

    fn clear_cookies(&self) -> Result<()> {
        *self.cookies.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Backend API plus the store that keeps its cookies.
#[derive(Debug, Clone)]
pub struct AuthSession<S: SessionPersistence> {
    api: NotesApi,
    store: S,
    signed_out: Arc<AtomicBool>,
}

impl<S: SessionPersistence> AuthSession<S> {
    /// Wrap `api`, seeding its cookie jar from `store`.
    pub fn new(api: NotesApi, store: S) -> Result<Self> {
        if let Some(cookie_header) = store.load_cookies()? {
            api.http().restore_cookies(&cookie_header);
        }
        Ok(Self {
            api,
            store,
            signed_out: Arc::new(AtomicBool::new(false)),
        })
    }

    pub const fn api(&self) -> &NotesApi {
        &self.api
    }

    pub async fn status(&self) -> AuthStatus {
        if self.api.probe_session().await {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }

    /// Fail with [`Error::Unauthenticated`] unless the probe succeeds.
    pub async fn require_session(&self) -> Result<()> {
        match self.status().await {
            AuthStatus::Authenticated => Ok(()),
            AuthStatus::Unauthenticated => Err(Error::Unauthenticated),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        let credentials = Credentials::validate(email, password, AuthMode::Login)?;
        let user = self.api.login(&credentials).await?;
        self.signed_out.store(false, Ordering::SeqCst);
        self.persist()?;
        Ok(user)
    }

    /// Create the account, then sign in with the same credentials.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        let credentials = Credentials::validate(email, password, AuthMode::Signup)?;
        self.api.signup(&credentials).await?;
        let user = self.api.login(&credentials).await?;
        self.signed_out.store(false, Ordering::SeqCst);
        self.persist()?;
        Ok(user)
    }

    /// Ask the backend to drop the session cookies, then forget the local
    /// copy regardless of the outcome.
    pub async fn logout(&self) -> Result<()> {
        self.signed_out.store(true, Ordering::SeqCst);
        if let Err(error) = self.api.logout().await {
            tracing::warn!("Logout request failed: {}", error);
        }
        self.store.clear_cookies()
    }

    /// Write the jar's current cookies to the store. After [`Self::logout`]
    /// the store is cleared instead.
    pub fn persist(&self) -> Result<()> {
        if self.signed_out.load(Ordering::SeqCst) {
            return self.store.clear_cookies();
        }
        match self.api.http().cookie_header() {
            Some(cookie_header) => self.store.save_cookies(&cookie_header),
            None => self.store.clear_cookies(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(result: Result<Credentials>) -> String {
        match result {
            Err(Error::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_email_is_rejected_first() {
        let message = validation_message(Credentials::validate("   ", "", AuthMode::Login));
        assert_eq!(message, "Email is required.");
    }

    #[test]
    fn empty_password_is_rejected_for_login() {
        let message =
            validation_message(Credentials::validate("test@example.com", "", AuthMode::Login));
        assert_eq!(message, "Password is required.");
    }

    #[test]
    fn short_password_is_rejected_for_signup() {
        let message = validation_message(Credentials::validate(
            "test@example.com",
            "short",
            AuthMode::Signup,
        ));
        assert_eq!(message, "Password must be at least 8 characters.");
    }

    #[test]
    fn signup_password_length_counts_utf16_units() {
        let credentials = Credentials::validate(
            "test@example.com",
            "\u{1F600}\u{1F600}\u{1F600}\u{1F600}",
            AuthMode::Signup,
        );
        assert!(credentials.is_ok());

        let message = validation_message(Credentials::validate(
            "test@example.com",
            "ab\u{1F600}\u{1F600}c",
            AuthMode::Signup,
        ));
        assert_eq!(message, "Password must be at least 8 characters.");
    }

    #[test]
    fn login_accepts_any_non_empty_password() {
        let credentials =
            Credentials::validate(" test@example.com ", "x", AuthMode::Login).unwrap();
        assert_eq!(credentials.email(), "test@example.com");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials =
            Credentials::validate("test@example.com", "secret-password", AuthMode::Login)
                .unwrap();
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret-password"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::default();
        assert_eq!(store.load_cookies().unwrap(), None);
        store.save_cookies("access_token=abc").unwrap();
        assert_eq!(
            store.load_cookies().unwrap().as_deref(),
            Some("access_token=abc")
        );
        store.clear_cookies().unwrap();
        assert_eq!(store.load_cookies().unwrap(), None);
    }
}
