#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property directory types and role-based access.
//!
//! A [`Property`] is a lodging with a fixed location and an ordered list of
//! [`RoomType`]s. A [`User`] sees either every property (administrators) or
//! only the ones they manage (account managers); see
//! [`visible_properties`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point. No range checking is done here; see
    /// [`GeoPoint::is_valid`].
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    /// (latitude in `[-90, 90]`, longitude in `[-180, 180]`).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A bookable room category at a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    /// Room type identifier (e.g. `"r1"`).
    pub id: String,
    /// Display name (e.g. `"Deluxe Double"`).
    pub name: String,
    /// Nightly base price in the property's currency.
    pub base_price: u32,
}

/// A managed lodging property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property identifier (e.g. `"p1"`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// District label used for grouping in the dashboard.
    pub district: String,
    /// Where the property is.
    pub location: GeoPoint,
    /// Room types in display order.
    #[serde(default)]
    pub rooms: Vec<RoomType>,
}

/// Access role of a dashboard user.
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
pub enum UserRole {
    /// Sees and manages every property.
    Admin,
    /// Account manager, restricted to `managed_property_ids`.
    #[serde(rename = "AM")]
    #[strum(serialize = "AM")]
    AccountManager,
}

/// A dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Access role.
    pub role: UserRole,
    /// Properties this user manages. Ignored for [`UserRole::Admin`].
    #[serde(default)]
    pub managed_property_ids: Vec<String>,
}

impl User {
    /// Whether this user may see the property with the given id.
    #[must_use]
    pub fn can_access(&self, property_id: &str) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::AccountManager => {
                self.managed_property_ids.iter().any(|id| id == property_id)
            }
        }
    }
}

/// Returns the properties `user` is allowed to see, preserving directory
/// order.
#[must_use]
pub fn visible_properties<'a>(user: &User, properties: &'a [Property]) -> Vec<&'a Property> {
    properties.iter().filter(|p| user.can_access(&p.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: &str) -> Property {
        Property {
            id: id.to_string(),
            name: format!("Property {id}"),
            district: "Xinyi".to_string(),
            location: GeoPoint::new(25.0, 121.5),
            rooms: Vec::new(),
        }
    }

    fn user(role: UserRole, managed: &[&str]) -> User {
        User {
            id: "u1".to_string(),
            username: "someone".to_string(),
            role,
            managed_property_ids: managed.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn admin_sees_everything() {
        let properties = vec![property("p1"), property("p2"), property("p3")];
        let admin = user(UserRole::Admin, &[]);
        let visible = visible_properties(&admin, &properties);
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn account_manager_sees_only_managed_in_directory_order() {
        let properties = vec![property("p1"), property("p2"), property("p3")];
        let am = user(UserRole::AccountManager, &["p3", "p1"]);
        let ids: Vec<&str> = visible_properties(&am, &properties)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn point_validity() {
        assert!(GeoPoint::new(25.033, 121.5654).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 121.0).is_valid());
        assert!(!GeoPoint::new(25.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn role_names() {
        assert_eq!(UserRole::AccountManager.to_string(), "AM");
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(
            serde_json::to_string(&UserRole::AccountManager).unwrap(),
            "\"AM\""
        );
    }

    #[test]
    fn point_accepts_short_field_names() {
        let point: GeoPoint = serde_json::from_str(r#"{"lat": 25.1, "lng": 121.7}"#).unwrap();
        assert!((point.latitude - 25.1).abs() < f64::EPSILON);
        assert!((point.longitude - 121.7).abs() < f64::EPSILON);
    }
}
