#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! External event types.
//!
//! Events are produced by an upstream ingestion step (ticketing and social
//! platform crawlers) and are immutable from this system's point of view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smartpms_property_models::GeoPoint;
use strum_macros::{AsRefStr, Display, EnumString};

/// Expected crowd impact of an event.
///
/// Variants are ordered by impact, so `EventScale::Low < EventScale::High`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EventScale {
    /// Local or niche event.
    Low,
    /// Regional draw.
    Medium,
    /// Citywide draw (stadium concerts, major expos).
    High,
}

impl EventScale {
    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// An external event that may affect nearby properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEvent {
    /// Event identifier (e.g. `"e1"`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Day the event takes place.
    pub date: NaiveDate,
    /// Venue name.
    pub venue: String,
    /// Venue location.
    pub location: GeoPoint,
    /// Impact classification.
    pub scale: EventScale,
    /// Provenance tag of the crawler or feed that produced the event.
    pub source: String,
}
