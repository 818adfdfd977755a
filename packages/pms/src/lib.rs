#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property Management System synchronization.
//!
//! The PMS is the system of record for room inventory and pricing. Every
//! client implements [`PmsClient`]; the only implementation shipped here is
//! [`SimulatedPms`], which generates mock data behind fixed latencies.

pub mod calendar;
pub mod simulated;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smartpms_notification_models::Notification;
use smartpms_property_models::Property;
use smartpms_rate_models::RateCalendar;

pub use simulated::SimulatedPms;

/// Errors that can occur while talking to a PMS.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PmsError {
    /// The same kind of operation is still in flight.
    #[error("PMS {operation} already in progress")]
    Busy {
        /// Which operation was rejected.
        operation: &'static str,
    },

    /// The calendar passed in belongs to a different property.
    #[error("calendar belongs to property {found}, expected {expected}")]
    PropertyMismatch {
        /// Property being synced.
        expected: String,
        /// Property the calendar belongs to.
        found: String,
    },
}

/// How much to pull from the PMS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchMode {
    /// Only fill days the local calendar lacks.
    #[default]
    Incremental,
    /// Replace the local calendar with the PMS copy.
    Force,
}

/// Result of a fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The calendar after the fetch.
    pub calendar: RateCalendar,
    /// Operator notification describing what happened.
    pub notification: Notification,
}

/// A Property Management System connection.
#[async_trait]
pub trait PmsClient: Send + Sync {
    /// Returns the PMS calendar for `property` starting at `start`, as
    /// loaded when a property is first opened.
    fn initial_calendar(&self, property: &Property, start: NaiveDate) -> RateCalendar;

    /// Pulls rates for `property` and merges them into `current`
    /// according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`PmsError`] if a fetch is already running or `current`
    /// belongs to another property.
    async fn fetch(
        &self,
        property: &Property,
        current: &RateCalendar,
        mode: FetchMode,
    ) -> Result<FetchOutcome, PmsError>;

    /// Pushes the local calendar for `property` to the PMS.
    ///
    /// # Errors
    ///
    /// Returns [`PmsError`] if a push is already running or `calendar`
    /// belongs to another property.
    async fn push(
        &self,
        property: &Property,
        calendar: &RateCalendar,
    ) -> Result<Notification, PmsError>;
}

fn ensure_same_property(property: &Property, calendar: &RateCalendar) -> Result<(), PmsError> {
    if property.id == calendar.property_id {
        Ok(())
    } else {
        Err(PmsError::PropertyMismatch {
            expected: property.id.clone(),
            found: calendar.property_id.clone(),
        })
    }
}
