use chrono::{DateTime, TimeDelta, Utc};

use crate::schedule::Evaluation;

/// Per-entity notification latch.
///
/// `Armed` fires once when an upcoming start comes within the threshold and
/// becomes `Notified`; it re-arms when the start moves back out of the
/// threshold, while the event runs, or when alerting is switched off.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AlertState {
    #[default]
    Armed,
    Notified,
}

impl AlertState {
    /// Feeds one evaluation into the latch. Returns `true` when a
    /// notification should be raised now.
    pub fn observe(
        &mut self,
        now: DateTime<Utc>,
        evaluation: &Evaluation,
        threshold: TimeDelta,
        enabled: bool,
    ) -> bool {
        let Evaluation::Upcoming { starts_at } = *evaluation else {
            *self = AlertState::Armed;
            return false;
        };
        let remaining = starts_at - now;
        if remaining > threshold {
            *self = AlertState::Armed;
            return false;
        }
        if enabled && remaining > TimeDelta::zero() && *self == AlertState::Armed {
            *self = AlertState::Notified;
            return true;
        }
        false
    }

    pub fn disable(&mut self) {
        *self = AlertState::Armed;
    }

    pub fn is_notified(&self) -> bool {
        matches!(self, AlertState::Notified)
    }
}
