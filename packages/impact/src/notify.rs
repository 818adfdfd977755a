//! Operator notification for a finished impact evaluation.

use smartpms_impact_models::ImpactResult;
use smartpms_notification_models::{Notification, NotificationKind};

/// Title used for every impact notification.
pub const IMPACT_TITLE: &str = "Rule Engine: Impact Analysis Complete";

/// Builds the single notification emitted after an evaluation.
///
/// A non-empty result is an [`NotificationKind::Alert`] announcing the
/// stop-sell. An empty result still produces a notification so that every
/// evaluation is acknowledged, but as [`NotificationKind::Info`] and
/// without claiming that anything was closed.
#[must_use]
pub fn impact_notification(result: &ImpactResult) -> Notification {
    if result.is_empty() {
        Notification::new(
            NotificationKind::Info,
            IMPACT_TITLE,
            "Detected 0 properties within range of external events. Stop-sell not triggered.",
        )
    } else {
        Notification::new(
            NotificationKind::Alert,
            IMPACT_TITLE,
            format!(
                "Detected {} properties within range of high-scale events. \
                 Triggering Auto Stop-Sell.",
                result.affected_count
            ),
        )
    }
}
