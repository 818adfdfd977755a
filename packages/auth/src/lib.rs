#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mock two-step login.
//!
//! Step one checks a username/password pair and yields a [`PendingLogin`].
//! Step two checks the authenticator code and yields a [`Session`], which
//! callers pass explicitly to anything that needs to know who is acting.
//! Both steps wait a short, fixed time to mimic a remote identity service.
//!
//! Credentials are demo values, not secrets.

pub mod store;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartpms_property_models::User;
use uuid::Uuid;

pub use store::SessionStore;

/// Latency of the password check.
pub const PASSWORD_LATENCY: Duration = Duration::from_millis(800);

/// Latency of the TOTP check.
pub const TOTP_LATENCY: Duration = Duration::from_millis(600);

/// Demo username/password pairs.
const CREDENTIALS: &[(&str, &str)] = &[
    ("account_manager_01", "demo1234"),
    ("system_admin", "admin1234"),
];

/// The only code the mock authenticator accepts.
const VALID_TOTP: &str = "123456";

/// Errors during login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Username/password pair not recognized.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticator code rejected.
    #[error("Incorrect verification code")]
    InvalidTotp,

    /// Credentials were valid but no user record exists for them.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// The login challenge was never issued or has already been used.
    #[error("Unknown or expired login challenge")]
    UnknownChallenge,
}

/// A login that passed the password step and awaits its TOTP code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    /// Identifies this challenge between the two steps.
    pub challenge_id: Uuid,
    /// Who is logging in.
    pub username: String,
    /// When the password step succeeded.
    pub issued_at: DateTime<Utc>,
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token for this session.
    pub token: Uuid,
    /// The logged-in user.
    pub user: User,
    /// When the session was created.
    pub issued_at: DateTime<Utc>,
}

/// Runs the two login steps with configurable latency.
#[derive(Debug, Clone, Copy)]
pub struct Authenticator {
    password_latency: Duration,
    totp_latency: Duration,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self {
            password_latency: PASSWORD_LATENCY,
            totp_latency: TOTP_LATENCY,
        }
    }
}

impl Authenticator {
    /// An authenticator with the given step latencies.
    #[must_use]
    pub const fn with_latency(password: Duration, totp: Duration) -> Self {
        Self {
            password_latency: password,
            totp_latency: totp,
        }
    }

    /// An authenticator that answers immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::with_latency(Duration::ZERO, Duration::ZERO)
    }

    /// Checks a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the pair is not one of
    /// the demo accounts.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<PendingLogin, AuthError> {
        tokio::time::sleep(self.password_latency).await;

        if !CREDENTIALS
            .iter()
            .any(|(u, p)| *u == username && *p == password)
        {
            log::warn!("Rejected password for {username}");
            return Err(AuthError::InvalidCredentials);
        }

        log::debug!("Password accepted for {username}, awaiting TOTP");
        Ok(PendingLogin {
            challenge_id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at: Utc::now(),
        })
    }

    /// Checks the authenticator code for a pending login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTotp`] for a wrong code and
    /// [`AuthError::UnknownUser`] if the user record is missing.
    pub async fn verify_totp(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> Result<Session, AuthError> {
        tokio::time::sleep(self.totp_latency).await;

        if code.trim() != VALID_TOTP {
            log::warn!("Rejected TOTP for {}", pending.username);
            return Err(AuthError::InvalidTotp);
        }

        let user = smartpms_fixtures::user_by_username(&pending.username)
            .ok_or_else(|| AuthError::UnknownUser(pending.username.clone()))?;

        log::info!("{} logged in as {}", user.username, user.role);
        Ok(Session {
            token: Uuid::new_v4(),
            user,
            issued_at: Utc::now(),
        })
    }

    /// Runs both steps back to back.
    ///
    /// # Errors
    ///
    /// Returns whichever [`AuthError`] the failing step produced.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<Session, AuthError> {
        let pending = self.verify_password(username, password).await?;
        self.verify_totp(&pending, code).await
    }
}

#[cfg(test)]
mod tests {
    use smartpms_property_models::UserRole;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn account_manager_login() {
        let auth = Authenticator::default();
        let start = tokio::time::Instant::now();
        let session = auth
            .login("account_manager_01", "demo1234", "123456")
            .await
            .unwrap();
        assert_eq!(session.user.role, UserRole::AccountManager);
        assert!(start.elapsed() >= PASSWORD_LATENCY + TOTP_LATENCY);
    }

    #[tokio::test]
    async fn admin_login() {
        let session = Authenticator::instant()
            .login("system_admin", "admin1234", "123456")
            .await
            .unwrap();
        assert_eq!(session.user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn passwords_are_not_interchangeable() {
        let auth = Authenticator::instant();
        assert_eq!(
            auth.verify_password("system_admin", "demo1234").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.verify_password("someone_else", "demo1234").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn wrong_totp_is_rejected() {
        let auth = Authenticator::instant();
        let pending = auth
            .verify_password("account_manager_01", "demo1234")
            .await
            .unwrap();
        assert_eq!(
            auth.verify_totp(&pending, "000000").await,
            Err(AuthError::InvalidTotp)
        );
        assert!(auth.verify_totp(&pending, "123456").await.is_ok());
    }

    #[tokio::test]
    async fn sessions_get_distinct_tokens() {
        let auth = Authenticator::instant();
        let a = auth.login("system_admin", "admin1234", "123456").await.unwrap();
        let b = auth.login("system_admin", "admin1234", "123456").await.unwrap();
        assert_ne!(a.token, b.token);
    }
}
