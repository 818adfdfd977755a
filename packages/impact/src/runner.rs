//! Asynchronous invocation of the rule engine.
//!
//! The evaluation itself is synchronous and cheap. [`ImpactRunner`] adds
//! the fixed latency the dashboard has always shown before results appear,
//! and refuses to start a second evaluation while one is outstanding.

use std::time::Duration;

use smartpms_event_models::ExternalEvent;
use smartpms_impact_models::{ImpactConfig, ImpactResult};
use smartpms_inflight::InFlight;
use smartpms_notification_models::Notification;
use smartpms_property_models::Property;

use crate::evaluate_impact;
use crate::notify::impact_notification;

/// Latency applied before an evaluation result is delivered.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1800);

/// Errors from [`ImpactRunner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ImpactError {
    /// Another evaluation has not finished yet.
    #[error("an impact analysis is already running")]
    AlreadyRunning,
}

/// A finished evaluation and the notification announcing it.
#[derive(Debug, Clone)]
pub struct ImpactOutcome {
    /// Engine output.
    pub result: ImpactResult,
    /// Exactly one notification per evaluation.
    pub notification: Notification,
}

/// Runs evaluations one at a time behind a simulated latency.
#[derive(Debug, Clone)]
pub struct ImpactRunner {
    gate: InFlight,
    latency: Duration,
}

impl Default for ImpactRunner {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl ImpactRunner {
    /// Creates a runner that waits `latency` before delivering a result.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            gate: InFlight::new("impact analysis"),
            latency,
        }
    }

    /// Whether an evaluation is outstanding.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.gate.is_busy()
    }

    /// Evaluates `events` against `properties`.
    ///
    /// The caller is responsible for restricting `properties` to what the
    /// current user may see.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::AlreadyRunning`] without waiting if another
    /// evaluation started through this runner (or a clone of it) has not
    /// finished.
    pub async fn run(
        &self,
        events: &[ExternalEvent],
        properties: &[Property],
        config: &ImpactConfig,
    ) -> Result<ImpactOutcome, ImpactError> {
        let _guard = self.gate.try_begin().ok_or(ImpactError::AlreadyRunning)?;

        log::info!(
            "Running impact analysis over {} events and {} properties (radius {} km)",
            events.len(),
            properties.len(),
            config.radius_km
        );

        tokio::time::sleep(self.latency).await;

        let result = evaluate_impact(events, properties, config);
        let notification = impact_notification(&result);

        log::info!("Impact analysis complete: {} affected", result.affected_count);

        Ok(ImpactOutcome {
            result,
            notification,
        })
    }
}
