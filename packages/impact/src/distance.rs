//! Distance measures between two [`GeoPoint`]s, in kilometers.

use geo::{Distance, Haversine, Point};
use smartpms_impact_models::DistanceModel;
use smartpms_property_models::GeoPoint;

/// Kilometers per degree used by the planar approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Euclidean distance in degree space, scaled by [`KM_PER_DEGREE`].
///
/// Not a great-circle distance: it ignores the shrinking of longitude
/// degrees away from the equator. Kept exact so that classifications match
/// what operators have always seen.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn planar_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = a.latitude - b.latitude;
    let d_lng = a.longitude - b.longitude;
    (d_lat * d_lat + d_lng * d_lng).sqrt() * KM_PER_DEGREE
}

/// Great-circle distance on a sphere of mean earth radius.
#[must_use]
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let from = Point::new(a.longitude, a.latitude);
    let to = Point::new(b.longitude, b.latitude);
    Haversine.distance(from, to) / 1000.0
}

/// Distance between `a` and `b` under `model`.
#[must_use]
pub fn distance_km(model: DistanceModel, a: &GeoPoint, b: &GeoPoint) -> f64 {
    match model {
        DistanceModel::Planar => planar_km(a, b),
        DistanceModel::Haversine => haversine_km(a, b),
    }
}
