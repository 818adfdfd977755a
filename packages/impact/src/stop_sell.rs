//! Applies an impact result to rate calendars.

use smartpms_impact_models::ImpactResult;
use smartpms_rate_models::{RateCalendar, RateCommand};

/// Closes the event day in the calendar of every affected property.
///
/// Returns one calendar per input calendar, in the same order. Calendars of
/// unaffected properties come back unchanged. Event days outside a
/// calendar's window are skipped.
#[must_use]
pub fn apply_stop_sell(result: &ImpactResult, calendars: &[RateCalendar]) -> Vec<RateCalendar> {
    calendars
        .iter()
        .map(|calendar| {
            result
                .matches
                .iter()
                .filter(|m| m.property_id == calendar.property_id)
                .fold(calendar.clone(), |current, m| {
                    match current.apply(RateCommand::StopSell { date: m.event_date }) {
                        Ok(next) => {
                            log::info!(
                                "Stop-sell {} on {} ({} is {:.2} km away)",
                                m.property_id,
                                m.event_date,
                                m.event_name,
                                m.distance_km
                            );
                            next
                        }
                        Err(e) => {
                            log::debug!("Skipping stop-sell: {e}");
                            current
                        }
                    }
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use smartpms_impact_models::ImpactConfig;
    use smartpms_rate_models::{RateData, RateSource, RateStatus};

    use super::*;
    use crate::evaluate_impact;
    use crate::test_support::{arena, property};

    fn calendar(property_id: &str, start: NaiveDate, days: u64) -> RateCalendar {
        let days = (0..days)
            .map(|i| RateData {
                date: start + Days::new(i),
                price: 3200,
                status: RateStatus::Open,
                source: RateSource::Original,
                inventory: 2,
                original_price: 3200,
            })
            .collect();
        RateCalendar::new(property_id, days)
    }

    #[test]
    fn closes_only_affected_property_on_event_day() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
        let event_day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let result = evaluate_impact(
            &[arena()],
            &[property("p1", 25.0330, 121.5654), property("p3", 25.1360, 121.5064)],
            &ImpactConfig::with_radius(5.0),
        );
        let calendars = vec![calendar("p1", start, 14), calendar("p3", start, 14)];

        let updated = apply_stop_sell(&result, &calendars);

        assert_eq!(updated.len(), 2);
        let p1 = &updated[0];
        assert_eq!(p1.closed_days(), 1);
        let cell = p1.get(event_day).unwrap();
        assert_eq!(cell.status, RateStatus::Closed);
        assert_eq!(cell.source, RateSource::EventStopSell);
        assert_eq!(cell.inventory, 0);

        assert_eq!(updated[1], calendars[1]);
        assert_eq!(calendars[0].closed_days(), 0);
    }

    #[test]
    fn event_outside_window_is_skipped() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let result = evaluate_impact(
            &[arena()],
            &[property("p1", 25.0330, 121.5654)],
            &ImpactConfig::with_radius(5.0),
        );
        let calendars = vec![calendar("p1", start, 14)];
        assert_eq!(apply_stop_sell(&result, &calendars), calendars);
    }
}
