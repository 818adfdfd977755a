#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event impact rule engine.
//!
//! [`evaluate_impact`] cross-references external events against property
//! locations and reports every (event, property) pair within the configured
//! radius. It is a pure function of its inputs. Everything around it lives
//! in submodules:
//!
//! - [`notify`] turns a result into the operator notification,
//! - [`stop_sell`] closes the affected days in rate calendars,
//! - [`runner`] wraps evaluation in simulated latency and a single
//!   in-flight gate,
//! - [`config`] loads engine settings from TOML.

pub mod config;
pub mod distance;
pub mod notify;
pub mod runner;
pub mod stop_sell;

use smartpms_event_models::ExternalEvent;
use smartpms_impact_models::{ImpactConfig, ImpactMatch, ImpactResult};
use smartpms_property_models::Property;

pub use config::{ConfigError, load_config};
pub use runner::{ImpactError, ImpactOutcome, ImpactRunner};

/// Finds every (event, property) pair within `config.radius_km`.
///
/// Pairs are visited event-major, property-minor, and the result keeps that
/// order. A pair is affected when its distance is `<=` the radius. Events
/// below `config.min_scale` are skipped.
///
/// Records with a non-finite or out-of-range location never match; they are
/// logged and the rest of the batch is still evaluated. Empty inputs and
/// non-positive radii yield an empty result.
#[must_use]
pub fn evaluate_impact(
    events: &[ExternalEvent],
    properties: &[Property],
    config: &ImpactConfig,
) -> ImpactResult {
    for property in properties.iter().filter(|p| !p.location.is_valid()) {
        log::warn!(
            "Property {} has an invalid location {:?}, it will not be matched",
            property.id,
            property.location
        );
    }

    let mut matches = Vec::new();

    for event in events {
        if !config.includes_scale(event.scale) {
            continue;
        }
        if !event.location.is_valid() {
            log::warn!(
                "Event {} has an invalid location {:?}, it will not be matched",
                event.id,
                event.location
            );
            continue;
        }

        for property in properties.iter().filter(|p| p.location.is_valid()) {
            let distance_km =
                distance::distance_km(config.distance_model, &event.location, &property.location);

            if distance_km <= config.radius_km {
                matches.push(ImpactMatch {
                    event_id: event.id.clone(),
                    event_name: event.name.clone(),
                    event_date: event.date,
                    property_id: property.id.clone(),
                    property_name: property.name.clone(),
                    distance_km,
                });
            }
        }
    }

    log::debug!(
        "Impact evaluation: {} events x {} properties, radius {} km ({}), {} affected",
        events.len(),
        properties.len(),
        config.radius_km,
        config.distance_model,
        matches.len()
    );

    ImpactResult::from_matches(matches)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use smartpms_event_models::{EventScale, ExternalEvent};
    use smartpms_property_models::{GeoPoint, Property};

    pub fn event(id: &str, lat: f64, lng: f64, scale: EventScale) -> ExternalEvent {
        ExternalEvent {
            id: id.to_string(),
            name: format!("Event {id}"),
            date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
            venue: "Venue".to_string(),
            location: GeoPoint::new(lat, lng),
            scale,
            source: "Crawler-01".to_string(),
        }
    }

    pub fn property(id: &str, lat: f64, lng: f64) -> Property {
        Property {
            id: id.to_string(),
            name: format!("Property {id}"),
            district: "Xinyi".to_string(),
            location: GeoPoint::new(lat, lng),
            rooms: Vec::new(),
        }
    }

    pub fn arena() -> ExternalEvent {
        event("e1", 25.0511, 121.5505, EventScale::High)
    }
}

#[cfg(test)]
mod tests {
    use smartpms_event_models::EventScale;
    use smartpms_impact_models::DistanceModel;

    use super::test_support::{arena, event, property};
    use super::*;

    fn pairs(result: &ImpactResult) -> Vec<(&str, &str)> {
        result
            .matches
            .iter()
            .map(|m| (m.event_id.as_str(), m.property_id.as_str()))
            .collect()
    }

    #[test]
    fn nearby_property_is_affected() {
        let result = evaluate_impact(
            &[arena()],
            &[property("p1", 25.0330, 121.5654)],
            &ImpactConfig::with_radius(5.0),
        );
        assert_eq!(result.affected_count, 1);
        assert!((result.matches[0].distance_km - 2.60).abs() < 0.01);
    }

    #[test]
    fn distant_property_is_not_affected() {
        let result = evaluate_impact(
            &[arena()],
            &[property("p3", 25.1360, 121.5064)],
            &ImpactConfig::with_radius(5.0),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn zero_radius_matches_nothing_that_is_apart() {
        let properties = [
            property("p1", 25.0330, 121.5654),
            property("p2", 25.1276, 121.7392),
        ];
        let result = evaluate_impact(&[arena()], &properties, &ImpactConfig::with_radius(0.0));
        assert!(result.is_empty());

        let result = evaluate_impact(&[arena()], &properties, &ImpactConfig::with_radius(-3.0));
        assert!(result.is_empty());
    }

    #[test]
    fn all_pairs_in_event_major_order() {
        let events = [
            event("e1", 25.05, 121.55, EventScale::High),
            event("e2", 25.06, 121.56, EventScale::Low),
        ];
        let properties = [
            property("p1", 25.05, 121.55),
            property("p2", 25.051, 121.551),
            property("p3", 25.052, 121.552),
        ];
        let result = evaluate_impact(&events, &properties, &ImpactConfig::with_radius(20.0));
        assert_eq!(result.affected_count, 6);
        assert_eq!(
            pairs(&result),
            vec![
                ("e1", "p1"),
                ("e1", "p2"),
                ("e1", "p3"),
                ("e2", "p1"),
                ("e2", "p2"),
                ("e2", "p3"),
            ]
        );
    }

    #[test]
    fn order_follows_input_order_when_sparse() {
        let events = [
            event("far", 0.0, 0.0, EventScale::High),
            event("near", 25.05, 121.55, EventScale::High),
        ];
        let properties = [
            property("p3", 25.06, 121.56),
            property("p1", 40.0, 10.0),
            property("p2", 25.05, 121.55),
        ];
        let result = evaluate_impact(&events, &properties, &ImpactConfig::with_radius(5.0));
        assert_eq!(pairs(&result), vec![("near", "p3"), ("near", "p2")]);
    }

    #[test]
    fn empty_inputs_yield_empty_results() {
        let properties = [property("p1", 25.0330, 121.5654)];
        for radius in [0.0, 5.0, 1_000.0, f64::INFINITY] {
            let config = ImpactConfig::with_radius(radius);
            assert!(evaluate_impact(&[], &properties, &config).is_empty());
            assert!(evaluate_impact(&[arena()], &[], &config).is_empty());
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        let e = arena();
        let p = property("p1", 25.0330, 121.5654);
        let exact = distance::planar_km(&e.location, &p.location);

        let result = evaluate_impact(&[e.clone()], &[p.clone()], &ImpactConfig::with_radius(exact));
        assert_eq!(result.affected_count, 1);

        let just_below = exact - 1e-9;
        let result = evaluate_impact(&[e], &[p], &ImpactConfig::with_radius(just_below));
        assert!(result.is_empty());
    }

    #[test]
    fn deterministic() {
        let events = [arena(), event("e2", 25.0569, 121.6174, EventScale::Medium)];
        let properties = [
            property("p1", 25.0330, 121.5654),
            property("p2", 25.1276, 121.7392),
            property("p3", 25.1360, 121.5064),
        ];
        let config = ImpactConfig::with_radius(8.0);
        let first = evaluate_impact(&events, &properties, &config);
        let second = evaluate_impact(&events, &properties, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn count_is_monotonic_in_radius() {
        let events = [arena(), event("e2", 25.0569, 121.6174, EventScale::Medium)];
        let properties = [
            property("p1", 25.0330, 121.5654),
            property("p2", 25.1276, 121.7392),
            property("p3", 25.1360, 121.5064),
        ];
        let mut previous = 0;
        for radius in 0..=30 {
            let count =
                evaluate_impact(&events, &properties, &ImpactConfig::with_radius(f64::from(radius)))
                    .affected_count;
            assert!(count >= previous, "radius {radius}: {count} < {previous}");
            previous = count;
        }
        assert_eq!(previous, 6);
    }

    #[test]
    fn invalid_locations_fail_closed() {
        let events = [
            event("nan", f64::NAN, 121.5505, EventScale::High),
            arena(),
        ];
        let properties = [
            property("inf", 25.0330, f64::INFINITY),
            property("off-globe", 125.0, 121.5),
            property("p1", 25.0330, 121.5654),
        ];
        let result = evaluate_impact(
            &events,
            &properties,
            &ImpactConfig::with_radius(f64::INFINITY),
        );
        assert_eq!(pairs(&result), vec![("e1", "p1")]);
    }

    #[test]
    fn nan_radius_matches_nothing() {
        let result = evaluate_impact(
            &[arena()],
            &[property("p1", 25.0511, 121.5505)],
            &ImpactConfig::with_radius(f64::NAN),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn min_scale_filters_events_and_keeps_order() {
        let events = [
            event("low", 25.05, 121.55, EventScale::Low),
            event("high-a", 25.05, 121.55, EventScale::High),
            event("medium", 25.05, 121.55, EventScale::Medium),
            event("high-b", 25.05, 121.55, EventScale::High),
        ];
        let properties = [property("p1", 25.05, 121.55)];

        let config = ImpactConfig::with_radius(1.0).min_scale(Some(EventScale::High));
        let result = evaluate_impact(&events, &properties, &config);
        assert_eq!(pairs(&result), vec![("high-a", "p1"), ("high-b", "p1")]);

        let config = ImpactConfig::with_radius(1.0).min_scale(Some(EventScale::Medium));
        assert_eq!(evaluate_impact(&events, &properties, &config).affected_count, 3);
    }

    #[test]
    fn haversine_model_can_flip_a_borderline_pair() {
        // ~2.60 km planar, ~2.51 km great-circle.
        let e = arena();
        let p = property("p1", 25.0330, 121.5654);
        let config = ImpactConfig::with_radius(2.55);

        assert!(evaluate_impact(&[e.clone()], &[p.clone()], &config).is_empty());

        let config = config.distance_model(DistanceModel::Haversine);
        assert_eq!(evaluate_impact(&[e], &[p], &config).affected_count, 1);
    }
}
