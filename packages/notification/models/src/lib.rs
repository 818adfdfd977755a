#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Notification types.
//!
//! Producers (the impact runner, the PMS client) build a [`Notification`]
//! and hand it back to the caller, which decides where it goes. The
//! in-memory [`NotificationLog`] keeps them newest-first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Visual severity of a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Informational.
    Info,
    /// Needs operator attention.
    Alert,
    /// An operation completed.
    Success,
}

/// A single system notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique id.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl Notification {
    /// Creates a notification stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Most notifications a [`NotificationLog`] keeps. Older entries are
/// dropped as new ones arrive.
pub const MAX_ENTRIES: usize = 200;

/// Notifications, newest first, at most [`MAX_ENTRIES`] of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a notification in front of all existing ones.
    pub fn push(&mut self, notification: Notification) {
        log::debug!(
            "notification [{}] {}: {}",
            notification.kind,
            notification.title,
            notification.message
        );
        self.entries.insert(0, notification);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Number of notifications held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every notification.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_newest_first() {
        let mut log = NotificationLog::new();
        log.push(Notification::new(NotificationKind::Info, "first", ""));
        log.push(Notification::new(NotificationKind::Success, "second", ""));

        let titles: Vec<&str> = log.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = NotificationLog::new();
        log.push(Notification::new(NotificationKind::Alert, "a", "b"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn oldest_entries_fall_off_past_the_cap() {
        let mut log = NotificationLog::new();
        for i in 0..=MAX_ENTRIES {
            log.push(Notification::new(NotificationKind::Info, i.to_string(), ""));
        }

        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.iter().next().unwrap().title, MAX_ENTRIES.to_string());
        assert_eq!(log.iter().last().unwrap().title, "1");
    }

    #[test]
    fn ids_are_unique() {
        let a = Notification::new(NotificationKind::Info, "a", "");
        let b = Notification::new(NotificationKind::Info, "a", "");
        assert_ne!(a.id, b.id);
    }
}
