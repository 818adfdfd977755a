//! A PMS that lives entirely in memory.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use smartpms_inflight::InFlight;
use smartpms_notification_models::{Notification, NotificationKind};
use smartpms_property_models::Property;
use smartpms_rate_models::RateCalendar;

use crate::calendar::{fill_missing_days, generate_calendar};
use crate::{FetchMode, FetchOutcome, PmsClient, PmsError, ensure_same_property};

/// Latency of a fetch.
pub const FETCH_LATENCY: Duration = Duration::from_millis(1500);

/// Latency of a push.
pub const PUSH_LATENCY: Duration = Duration::from_millis(2000);

/// Simulated PMS with fixed latencies and one fetch plus one push allowed
/// in flight at a time.
#[derive(Debug)]
pub struct SimulatedPms {
    fetch_gate: InFlight,
    push_gate: InFlight,
    fetch_latency: Duration,
    push_latency: Duration,
    rng: Mutex<StdRng>,
}

impl Default for SimulatedPms {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl SimulatedPms {
    /// A simulated PMS whose generated data is reproducible for `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            fetch_gate: InFlight::new("PMS fetch"),
            push_gate: InFlight::new("PMS push"),
            fetch_latency: FETCH_LATENCY,
            push_latency: PUSH_LATENCY,
            rng: Mutex::new(rng),
        }
    }

    /// Overrides both latencies.
    #[must_use]
    pub const fn latency(mut self, fetch: Duration, push: Duration) -> Self {
        self.fetch_latency = fetch;
        self.push_latency = push;
        self
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.fetch_gate.is_busy()
    }

    /// Whether a push is in flight.
    #[must_use]
    pub fn is_pushing(&self) -> bool {
        self.push_gate.is_busy()
    }
}

#[async_trait]
impl PmsClient for SimulatedPms {
    fn initial_calendar(&self, property: &Property, start: NaiveDate) -> RateCalendar {
        let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        generate_calendar(&property.id, start, &mut *rng)
    }

    async fn fetch(
        &self,
        property: &Property,
        current: &RateCalendar,
        mode: FetchMode,
    ) -> Result<FetchOutcome, PmsError> {
        ensure_same_property(property, current)?;
        let _guard = self
            .fetch_gate
            .try_begin()
            .ok_or(PmsError::Busy { operation: "fetch" })?;

        log::info!("Fetching rates for {} from PMS ({mode:?})", property.id);
        tokio::time::sleep(self.fetch_latency).await;

        let start = current
            .days
            .first()
            .map_or_else(|| Utc::now().date_naive(), |d| d.date);

        let outcome = {
            let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match mode {
                FetchMode::Force => FetchOutcome {
                    calendar: generate_calendar(&property.id, start, &mut *rng),
                    notification: Notification::new(
                        NotificationKind::Success,
                        "Full PMS Sync Complete",
                        "All local data has been overwritten by PMS master.",
                    ),
                },
                FetchMode::Incremental => {
                    let (calendar, filled) = fill_missing_days(current, start, &mut *rng);
                    FetchOutcome {
                        calendar,
                        notification: Notification::new(
                            NotificationKind::Success,
                            "Inventory Incremental Update",
                            format!("Updated {filled} missing days from PMS data source."),
                        ),
                    }
                }
            }
        };

        log::info!("PMS fetch for {} complete", property.id);
        Ok(outcome)
    }

    async fn push(
        &self,
        property: &Property,
        calendar: &RateCalendar,
    ) -> Result<Notification, PmsError> {
        ensure_same_property(property, calendar)?;
        let _guard = self
            .push_gate
            .try_begin()
            .ok_or(PmsError::Busy { operation: "push" })?;

        log::info!(
            "Pushing {} days for {} to PMS",
            calendar.days.len(),
            property.id
        );
        tokio::time::sleep(self.push_latency).await;

        Ok(Notification::new(
            NotificationKind::Success,
            "PMS Sync Success",
            format!(
                "Successfully synchronized rates for {} to remote PMS server.",
                property.name
            ),
        ))
    }
}
