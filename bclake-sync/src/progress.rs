//! Progress events for sync runs.
//!
//! The orchestrator pushes events into a channel and never waits on the
//! consumer. A reporter without a channel, or whose receiver is gone, drops
//! events silently.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// A progress update. `percent` covers the whole run, from 0 to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub message: String,
    pub percent: f64,
}

/// Sends progress events, optionally mapped into one unit's share of a run.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
    completed_units: usize,
    total_units: usize,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ProgressReporter {
    /// A reporter and the receiving end of its events.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
                completed_units: 0,
                total_units: 1,
            },
            receiver,
        )
    }

    /// A reporter that discards everything.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            completed_units: 0,
            total_units: 1,
        }
    }

    /// Reporter for one unit of a run of `total_units`, after `completed_units`
    /// have finished.
    ///
    /// Unit progress `p` maps to `(completed_units * 100 + p) / total_units`.
    pub fn for_unit(&self, completed_units: usize, total_units: usize) -> Self {
        Self {
            sender: self.sender.clone(),
            completed_units,
            total_units: total_units.max(1),
        }
    }

    /// Reports `percent` of the current unit (or of the run when unscaled).
    pub fn report(&self, message: impl Into<String>, percent: f64) {
        let Some(sender) = &self.sender else {
            return;
        };

        let event = ProgressEvent {
            message: message.into(),
            percent: self.overall(percent),
        };
        trace!(percent = event.percent, message = %event.message, "Progress");

        // A closed receiver means nobody is listening.
        let _ = sender.send(event);
    }

    fn overall(&self, unit_percent: f64) -> f64 {
        let unit_percent = unit_percent.clamp(0.0, 100.0);
        let overall =
            (self.completed_units as f64 * 100.0 + unit_percent) / self.total_units as f64;
        overall.min(100.0)
    }
}
