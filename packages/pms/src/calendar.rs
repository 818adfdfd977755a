//! Mock rate calendar generation.

use chrono::{Days, NaiveDate};
use rand::Rng;
use smartpms_rate_models::{RateCalendar, RateData, RateSource, RateStatus};

/// Days covered by a calendar window.
pub const WINDOW_DAYS: u64 = 14;

/// Price the PMS reports before any variation.
pub const BASE_PRICE: u32 = 3200;

/// Upper bound (exclusive) of the random surcharge on top of [`BASE_PRICE`].
const PRICE_JITTER: u32 = 500;

/// Day offset pre-seeded with a manual override.
const MANUAL_OVERRIDE_DAY: u64 = 2;

/// Price of the pre-seeded manual override.
const MANUAL_OVERRIDE_PRICE: u32 = 4500;

/// Day offset pre-seeded as closed by an event.
const STOP_SELL_DAY: u64 = 5;

/// Builds a [`WINDOW_DAYS`]-day calendar starting at `start`.
///
/// Every window carries one manual override (day 2) and one event
/// stop-sell (day 5) so that all rate sources are represented.
#[must_use]
pub fn generate_calendar<R: Rng + ?Sized>(
    property_id: &str,
    start: NaiveDate,
    rng: &mut R,
) -> RateCalendar {
    let days = (0..WINDOW_DAYS)
        .filter_map(|offset| {
            let date = start.checked_add_days(Days::new(offset))?;
            let mut cell = original_cell(date, rng);

            match offset {
                MANUAL_OVERRIDE_DAY => {
                    cell.source = RateSource::Manual;
                    cell.price = MANUAL_OVERRIDE_PRICE;
                }
                STOP_SELL_DAY => {
                    cell.source = RateSource::EventStopSell;
                    cell.status = RateStatus::Closed;
                    cell.inventory = 0;
                }
                _ => {}
            }

            Some(cell)
        })
        .collect();

    RateCalendar::new(property_id, days)
}

/// Adds PMS cells for any day of the window starting at `start` that
/// `current` lacks. Existing cells are kept as they are.
///
/// Returns the new calendar and how many days were filled.
#[must_use]
pub fn fill_missing_days<R: Rng + ?Sized>(
    current: &RateCalendar,
    start: NaiveDate,
    rng: &mut R,
) -> (RateCalendar, usize) {
    let mut days = current.days.clone();
    let mut filled = 0;

    for offset in 0..WINDOW_DAYS {
        let Some(date) = start.checked_add_days(Days::new(offset)) else {
            break;
        };
        if !current.contains(date) {
            days.push(original_cell(date, rng));
            filled += 1;
        }
    }

    (RateCalendar::new(current.property_id.clone(), days), filled)
}

fn original_cell<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> RateData {
    RateData {
        date,
        price: BASE_PRICE + rng.gen_range(0..PRICE_JITTER),
        status: RateStatus::Open,
        source: RateSource::Original,
        inventory: rng.gen_range(1..=5),
        original_price: BASE_PRICE,
    }
}
