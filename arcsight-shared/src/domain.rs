use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{EventDto, SlotDto};
use crate::schedule::TimeWindow;

pub const UNKNOWN_EVENT: &str = "Unknown";

/// Identity of a tracked event: the same event on a different map is a
/// different entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub name: String,
    pub map: String,
}

impl EventKey {
    pub fn new(name: impl Into<String>, map: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map: map.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.map.is_empty() {
            self.name.fmt(f)
        } else {
            write!(f, "{}@{}", self.name, self.map)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub key: EventKey,
    pub windows: Vec<TimeWindow>,
}

impl EventRecord {
    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn map(&self) -> &str {
        &self.key.map
    }
}

/// Parses one slot, `None` when either end is missing or malformed.
pub fn window_from_slot(slot: &SlotDto) -> Option<TimeWindow> {
    let (Some(start), Some(end)) = (slot.start.as_deref(), slot.end.as_deref()) else {
        return None;
    };
    match TimeWindow::parse(start, end) {
        Ok(w) => Some(w),
        Err(e) => {
            debug!(error=%e, start, end, "skipping malformed time slot");
            None
        }
    }
}

impl From<EventDto> for EventRecord {
    fn from(dto: EventDto) -> Self {
        let key = EventKey::new(
            dto.name.unwrap_or_else(|| UNKNOWN_EVENT.to_string()),
            dto.map.unwrap_or_default(),
        );
        let windows = dto
            .times
            .unwrap_or_default()
            .iter()
            .filter_map(window_from_slot)
            .collect();
        EventRecord { key, windows }
    }
}
