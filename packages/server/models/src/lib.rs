#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SmartPMS server.
//!
//! These types are serialized to JSON for the REST API. Domain types
//! (properties, events, calendars, notifications) are returned as-is; the
//! types here cover request bodies and the envelopes around them.

use serde::{Deserialize, Serialize};
use smartpms_event_models::EventScale;
use smartpms_impact_models::{DistanceModel, ImpactConfig, ImpactResult};
use smartpms_notification_models::Notification;
use smartpms_property_models::User;
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Response of `POST /api/auth/login`: the challenge to answer with a
/// TOTP code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    /// Challenge id to send back to `/api/auth/verify`.
    pub challenge_id: Uuid,
}

/// Body of `POST /api/auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Challenge id from the login step.
    pub challenge_id: Uuid,
    /// Six-digit authenticator code.
    pub code: String,
}

/// Response of `POST /api/auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Bearer token for subsequent requests.
    pub token: Uuid,
    /// The logged-in user.
    pub user: User,
}

/// Body of `POST /api/impact`. Omitted fields fall back to the server's
/// configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRequest {
    /// Radius in kilometers.
    pub radius_km: Option<f64>,
    /// Distance model.
    pub distance_model: Option<DistanceModel>,
    /// Minimum event scale.
    pub min_scale: Option<EventScale>,
    /// Close affected days in the rate calendars.
    #[serde(default)]
    pub apply_stop_sell: bool,
}

impl ImpactRequest {
    /// Overlays this request on `defaults`.
    #[must_use]
    pub fn config(&self, defaults: ImpactConfig) -> ImpactConfig {
        ImpactConfig {
            radius_km: self.radius_km.unwrap_or(defaults.radius_km),
            distance_model: self.distance_model.unwrap_or(defaults.distance_model),
            min_scale: self.min_scale.or(defaults.min_scale),
        }
    }
}

/// Response of `POST /api/impact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResponse {
    /// Engine output.
    pub result: ImpactResult,
    /// The notification that was logged for this evaluation.
    pub notification: Notification,
    /// Properties whose calendars were changed by stop-sell, if requested.
    pub stop_sell_property_ids: Vec<String>,
}

/// Query parameters of `POST /api/properties/{id}/pms/fetch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmsFetchParams {
    /// Replace local data instead of filling gaps.
    pub force: Option<bool>,
}
