#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Impact rule engine configuration and result types.
//!
//! These are the inputs and outputs of `smartpms_impact::evaluate_impact`.
//! They carry no behavior beyond small accessors so that API and CLI layers
//! can depend on them without pulling in the engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smartpms_event_models::EventScale;
use strum_macros::{AsRefStr, Display, EnumString};

/// Radius used when none is configured, in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Lower bound of the operator radius control, in kilometers.
pub const MIN_OPERATOR_RADIUS_KM: f64 = 1.0;

/// Upper bound of the operator radius control, in kilometers.
pub const MAX_OPERATOR_RADIUS_KM: f64 = 20.0;

/// How distances between events and properties are measured.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DistanceModel {
    /// Euclidean distance in degree space scaled by 111 km per degree.
    ///
    /// Only accurate for short distances near the equator, but this is the
    /// classification the dashboard has always used.
    #[default]
    Planar,
    /// Great-circle distance on a spherical earth.
    ///
    /// More accurate, but classifies pairs near the threshold differently
    /// from [`DistanceModel::Planar`].
    Haversine,
}

/// Rule engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ImpactConfig {
    /// A pair is affected when its distance is at most this many
    /// kilometers. Any value is accepted; non-positive or NaN radii simply
    /// match nothing.
    pub radius_km: f64,
    /// Distance measure.
    pub distance_model: DistanceModel,
    /// Only consider events at or above this scale. `None` considers all.
    pub min_scale: Option<EventScale>,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            distance_model: DistanceModel::Planar,
            min_scale: None,
        }
    }
}

impl ImpactConfig {
    /// Default settings with the given radius.
    #[must_use]
    pub fn with_radius(radius_km: f64) -> Self {
        Self {
            radius_km,
            ..Self::default()
        }
    }

    /// Same settings with a different distance model.
    #[must_use]
    pub const fn distance_model(mut self, model: DistanceModel) -> Self {
        self.distance_model = model;
        self
    }

    /// Same settings restricted to events at or above `scale`.
    #[must_use]
    pub const fn min_scale(mut self, scale: Option<EventScale>) -> Self {
        self.min_scale = scale;
        self
    }

    /// Whether an event of `scale` takes part in the evaluation.
    #[must_use]
    pub fn includes_scale(&self, scale: EventScale) -> bool {
        self.min_scale.is_none_or(|min| scale >= min)
    }

    /// Clamps the radius to the operator control range (`1..=20` km).
    #[must_use]
    pub fn clamped_to_operator_range(mut self) -> Self {
        self.radius_km = self
            .radius_km
            .clamp(MIN_OPERATOR_RADIUS_KM, MAX_OPERATOR_RADIUS_KM);
        self
    }
}

/// One affected (event, property) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMatch {
    /// Event id.
    pub event_id: String,
    /// Event display name.
    pub event_name: String,
    /// Day of the event.
    pub event_date: NaiveDate,
    /// Property id.
    pub property_id: String,
    /// Property display name.
    pub property_name: String,
    /// Computed distance in kilometers.
    pub distance_km: f64,
}

/// Output of one impact evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Affected pairs, event-major then property-minor.
    pub matches: Vec<ImpactMatch>,
    /// Number of affected pairs.
    pub affected_count: usize,
}

impl ImpactResult {
    /// Builds a result from ordered matches.
    #[must_use]
    pub fn from_matches(matches: Vec<ImpactMatch>) -> Self {
        let affected_count = matches.len();
        Self {
            matches,
            affected_count,
        }
    }

    /// Whether nothing was affected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.affected_count == 0
    }

    /// Distinct affected property ids, sorted.
    #[must_use]
    pub fn affected_property_ids(&self) -> BTreeSet<&str> {
        self.matches.iter().map(|m| m.property_id.as_str()).collect()
    }
}
