#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mock users, properties, and external events.
//!
//! Each `.toml` file in `packages/fixtures/data/` is baked into the binary at
//! compile time via [`include_str!`]. They stand in for the user store, the
//! property directory, and the event crawler feed.

use serde::Deserialize;
use smartpms_event_models::ExternalEvent;
use smartpms_property_models::{Property, User};

const USERS_TOML: &str = include_str!("../data/users.toml");
const PROPERTIES_TOML: &str = include_str!("../data/properties.toml");
const EVENTS_TOML: &str = include_str!("../data/events.toml");

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct PropertiesFile {
    properties: Vec<Property>,
}

#[derive(Deserialize)]
struct EventsFile {
    events: Vec<ExternalEvent>,
}

fn parse<T: for<'de> Deserialize<'de>>(name: &str, contents: &str) -> T {
    toml::from_str(contents).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
}

/// Returns all mock users.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn users() -> Vec<User> {
    parse::<UsersFile>("users", USERS_TOML).users
}

/// Looks up a mock user by login name.
#[must_use]
pub fn user_by_username(username: &str) -> Option<User> {
    users().into_iter().find(|u| u.username == username)
}

/// Returns the mock property directory.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn properties() -> Vec<Property> {
    parse::<PropertiesFile>("properties", PROPERTIES_TOML).properties
}

/// Returns the mock external events.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn events() -> Vec<ExternalEvent> {
    parse::<EventsFile>("events", EVENTS_TOML).events
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use smartpms_event_models::EventScale;
    use smartpms_property_models::{UserRole, visible_properties};

    use super::*;

    #[test]
    fn loads_users() {
        let users = users();
        assert_eq!(users.len(), 2);
        let am = user_by_username("account_manager_01").unwrap();
        assert_eq!(am.role, UserRole::AccountManager);
        assert_eq!(am.managed_property_ids, vec!["p1", "p2"]);
        let admin = user_by_username("system_admin").unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(user_by_username("nobody").is_none());
    }

    #[test]
    fn loads_properties_with_rooms() {
        let properties = properties();
        let ids: Vec<&str> = properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(properties[0].rooms.len(), 2);
        assert_eq!(properties[0].rooms[1].base_price, 5800);
        assert_eq!(properties[2].rooms[0].name, "Zen Cabin");
        assert!(properties.iter().all(|p| p.location.is_valid()));
    }

    #[test]
    fn loads_events() {
        let events = events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].scale, EventScale::High);
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        assert_eq!(events[1].venue, "Nangang Exhibition Center");
        assert!(events.iter().all(|e| e.source == "Crawler-01"));
    }

    #[test]
    fn account_manager_sees_two_properties() {
        let am = user_by_username("account_manager_01").unwrap();
        let properties = properties();
        assert_eq!(visible_properties(&am, &properties).len(), 2);
    }
}
