//! In-memory bookkeeping of pending logins and live sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{AuthError, PendingLogin, Session};

/// How long a password step stays valid without its TOTP step.
pub const PENDING_TTL: TimeDelta = TimeDelta::minutes(5);

/// How long a session lasts after login.
pub const SESSION_TTL: TimeDelta = TimeDelta::hours(12);

/// Pending login challenges and active sessions, keyed by id.
///
/// Entries older than [`PENDING_TTL`] / [`SESSION_TTL`] are treated as
/// absent and dropped by [`SessionStore::purge_expired`].
#[derive(Debug, Default)]
pub struct SessionStore {
    pending: BTreeMap<Uuid, PendingLogin>,
    sessions: BTreeMap<Uuid, Session>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers a login that passed the password step.
    pub fn insert_pending(&mut self, pending: PendingLogin) {
        self.pending.insert(pending.challenge_id, pending);
    }

    /// Removes and returns a pending login. Whoever takes it owns the
    /// challenge; put it back with [`Self::insert_pending`] to allow
    /// another attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownChallenge`] if no such challenge exists
    /// or it has expired.
    pub fn take_pending(
        &mut self,
        challenge_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<PendingLogin, AuthError> {
        self.pending
            .remove(&challenge_id)
            .filter(|p| now - p.issued_at <= PENDING_TTL)
            .ok_or(AuthError::UnknownChallenge)
    }

    /// Stores a completed login.
    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.token, session);
    }

    /// Resolves a bearer token. Expired sessions resolve to `None`.
    #[must_use]
    pub fn session(&self, token: Uuid, now: DateTime<Utc>) -> Option<&Session> {
        self.sessions
            .get(&token)
            .filter(|s| now - s.issued_at <= SESSION_TTL)
    }

    /// Ends a session. Returns whether it existed.
    pub fn remove(&mut self, token: Uuid) -> bool {
        self.sessions.remove(&token).is_some()
    }

    /// Drops expired challenges and sessions. Returns how many entries
    /// were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.pending.len() + self.sessions.len();
        self.pending.retain(|_, p| now - p.issued_at <= PENDING_TTL);
        self.sessions.retain(|_, s| now - s.issued_at <= SESSION_TTL);
        let removed = before - self.pending.len() - self.sessions.len();
        if removed > 0 {
            log::debug!("Purged {removed} expired login entries");
        }
        removed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
