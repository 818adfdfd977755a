#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rate calendar types.
//!
//! A [`RateCalendar`] holds one [`RateData`] cell per day for a property.
//! Calendars are never edited in place: every change goes through
//! [`RateCalendar::apply`], which addresses a cell by date and returns a new
//! calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Where a rate cell's current value came from.
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
pub enum RateSource {
    /// Value as delivered by the PMS.
    Original,
    /// Operator override.
    Manual,
    /// Closed automatically by the event impact rule engine.
    EventStopSell,
}

/// Whether a day is bookable.
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
pub enum RateStatus {
    /// Open for new bookings.
    Open,
    /// Closed to new bookings.
    Closed,
}

impl RateStatus {
    /// Returns the other status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

/// Price and availability for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateData {
    /// The day this cell covers.
    pub date: NaiveDate,
    /// Current nightly price.
    pub price: u32,
    /// Bookability.
    pub status: RateStatus,
    /// Provenance of the current value.
    pub source: RateSource,
    /// Rooms left to sell.
    pub inventory: u32,
    /// Price as originally delivered by the PMS.
    pub original_price: u32,
}

/// A single change to a [`RateCalendar`], addressed by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateCommand {
    /// Flip open/closed. Marks the cell as a manual override.
    ToggleStatus {
        /// Target day.
        date: NaiveDate,
    },
    /// Override the price. Marks the cell as a manual override.
    SetPrice {
        /// Target day.
        date: NaiveDate,
        /// New nightly price.
        price: u32,
    },
    /// Close the day because of a nearby event.
    StopSell {
        /// Target day.
        date: NaiveDate,
    },
}

impl RateCommand {
    /// The day this command targets.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::ToggleStatus { date } | Self::SetPrice { date, .. } | Self::StopSell { date } => {
                *date
            }
        }
    }
}

/// Errors from applying a [`RateCommand`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    /// The calendar has no cell for the requested day.
    #[error("no rate for {date} in calendar of property {property_id}")]
    DateNotFound {
        /// Property whose calendar was addressed.
        property_id: String,
        /// Requested day.
        date: NaiveDate,
    },
}

/// Per-day rates for one property, ordered by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCalendar {
    /// Owning property.
    pub property_id: String,
    /// Cells in ascending date order.
    pub days: Vec<RateData>,
}

impl RateCalendar {
    /// Creates a calendar, sorting `days` by date.
    #[must_use]
    pub fn new(property_id: impl Into<String>, mut days: Vec<RateData>) -> Self {
        days.sort_by_key(|d| d.date);
        Self {
            property_id: property_id.into(),
            days,
        }
    }

    /// Looks up the cell for `date`.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&RateData> {
        self.position(date).map(|i| &self.days[i])
    }

    /// Whether `date` falls inside this calendar.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_some()
    }

    fn position(&self, date: NaiveDate) -> Option<usize> {
        self.days.binary_search_by_key(&date, |d| d.date).ok()
    }

    /// Returns a new calendar with `command` applied.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::DateNotFound`] if the calendar has no cell for
    /// the command's date.
    pub fn apply(&self, command: RateCommand) -> Result<Self, RateError> {
        let idx = self
            .position(command.date())
            .ok_or_else(|| RateError::DateNotFound {
                property_id: self.property_id.clone(),
                date: command.date(),
            })?;

        let mut next = self.clone();
        let cell = &mut next.days[idx];

        match command {
            RateCommand::ToggleStatus { .. } => {
                cell.status = cell.status.toggled();
                cell.source = RateSource::Manual;
            }
            RateCommand::SetPrice { price, .. } => {
                cell.price = price;
                cell.source = RateSource::Manual;
            }
            RateCommand::StopSell { .. } => {
                cell.status = RateStatus::Closed;
                cell.inventory = 0;
                cell.source = RateSource::EventStopSell;
            }
        }

        Ok(next)
    }

    /// Returns this calendar extended with every cell of `other` whose
    /// date it lacks. Cells already present are kept as they are.
    #[must_use]
    pub fn with_missing_days_from(&self, other: &Self) -> Self {
        let mut days = self.days.clone();
        days.extend(other.days.iter().filter(|d| !self.contains(d.date)).cloned());
        Self::new(self.property_id.clone(), days)
    }

    /// Number of closed days.
    #[must_use]
    pub fn closed_days(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.status == RateStatus::Closed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, n).unwrap()
    }

    fn calendar() -> RateCalendar {
        let days = (1..=3)
            .rev()
            .map(|n| RateData {
                date: day(n),
                price: 3200,
                status: RateStatus::Open,
                source: RateSource::Original,
                inventory: 3,
                original_price: 3200,
            })
            .collect();
        RateCalendar::new("p1", days)
    }

    #[test]
    fn new_sorts_by_date() {
        let cal = calendar();
        let dates: Vec<NaiveDate> = cal.days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn toggle_marks_manual_and_leaves_original_untouched() {
        let cal = calendar();
        let next = cal.apply(RateCommand::ToggleStatus { date: day(2) }).unwrap();

        let cell = next.get(day(2)).unwrap();
        assert_eq!(cell.status, RateStatus::Closed);
        assert_eq!(cell.source, RateSource::Manual);
        assert_eq!(cal.get(day(2)).unwrap().status, RateStatus::Open);
        assert_eq!(cal.get(day(2)).unwrap().source, RateSource::Original);

        let back = next.apply(RateCommand::ToggleStatus { date: day(2) }).unwrap();
        assert_eq!(back.get(day(2)).unwrap().status, RateStatus::Open);
        assert_eq!(back.get(day(2)).unwrap().source, RateSource::Manual);
    }

    #[test]
    fn set_price_keeps_original_price() {
        let next = calendar()
            .apply(RateCommand::SetPrice {
                date: day(1),
                price: 4500,
            })
            .unwrap();
        let cell = next.get(day(1)).unwrap();
        assert_eq!(cell.price, 4500);
        assert_eq!(cell.original_price, 3200);
        assert_eq!(cell.source, RateSource::Manual);
    }

    #[test]
    fn stop_sell_closes_and_zeroes_inventory() {
        let next = calendar()
            .apply(RateCommand::StopSell { date: day(3) })
            .unwrap();
        let cell = next.get(day(3)).unwrap();
        assert_eq!(cell.status, RateStatus::Closed);
        assert_eq!(cell.inventory, 0);
        assert_eq!(cell.source, RateSource::EventStopSell);
        assert_eq!(next.closed_days(), 1);
    }

    #[test]
    fn merging_keeps_existing_cells() {
        let local = calendar()
            .apply(RateCommand::SetPrice {
                date: day(2),
                price: 9999,
            })
            .unwrap();
        let mut remote_days = calendar().days;
        remote_days.push(RateData {
            date: day(4),
            ..remote_days[0].clone()
        });
        let remote = RateCalendar::new("p1", remote_days);

        let merged = local.with_missing_days_from(&remote);
        assert_eq!(merged.days.len(), 4);
        assert_eq!(merged.get(day(2)).unwrap().price, 9999);
        assert_eq!(merged.get(day(4)).unwrap().source, RateSource::Original);
        assert_eq!(merged.days[3].date, day(4));
    }

    #[test]
    fn unknown_date_is_an_error() {
        let err = calendar()
            .apply(RateCommand::ToggleStatus { date: day(20) })
            .unwrap_err();
        assert_eq!(
            err,
            RateError::DateNotFound {
                property_id: "p1".to_string(),
                date: day(20),
            }
        );
    }

    #[test]
    fn command_wire_format() {
        let cmd: RateCommand = serde_json::from_value(serde_json::json!({
            "type": "SET_PRICE",
            "date": "2024-12-01",
            "price": 4000,
        }))
        .unwrap();
        assert_eq!(
            cmd,
            RateCommand::SetPrice {
                date: day(1),
                price: 4000
            }
        );
    }
}
