#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Busy flag for operations that must not overlap.
//!
//! Impact analysis and PMS syncs may only have one invocation outstanding
//! at a time. Callers take an [`InFlightGuard`] from [`InFlight::try_begin`]
//! before starting; a second attempt while the guard is alive gets `None`.
//! Dropping the guard (including on panic or future cancellation) clears
//! the flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared busy flag. Clones refer to the same flag.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl InFlight {
    /// Creates an idle gate. `name` is only used in log output.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Marks the gate busy, or returns `None` if it already is.
    #[must_use]
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            log::trace!("{}: started", self.name);
            Some(InFlightGuard {
                name: self.name,
                busy: Arc::clone(&self.busy),
            })
        } else {
            log::debug!("{}: rejected, already in flight", self.name);
            None
        }
    }

    /// Whether an operation is currently outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the gate busy until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        log::trace!("{}: finished", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_until_guard_drops() {
        let gate = InFlight::new("test");
        assert!(!gate.is_busy());

        let guard = gate.try_begin().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn clones_share_the_flag() {
        let gate = InFlight::new("test");
        let other = gate.clone();
        let _guard = gate.try_begin().unwrap();
        assert!(other.is_busy());
        assert!(other.try_begin().is_none());
    }
}
