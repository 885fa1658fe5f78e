use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

// Event timers. Field names match case-insensitively in practice, so the
// capitalised spellings are accepted too. A field of the wrong JSON type
// reads as missing instead of failing the whole payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotDto {
    #[serde(default, alias = "Start", deserialize_with = "lenient_string")]
    pub start: Option<String>,
    #[serde(default, alias = "End", deserialize_with = "lenient_string")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDto {
    #[serde(default, alias = "Name", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, alias = "Map", deserialize_with = "lenient_string")]
    pub map: Option<String>,
    #[serde(default, alias = "Times", deserialize_with = "lenient_slots")]
    pub times: Option<Vec<SlotDto>>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_slots<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<SlotDto>>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(d)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SlotDto>(item) {
                Ok(slot) => Some(slot),
                Err(e) => {
                    debug!(error=%e, "skipping non-object time slot");
                    None
                }
            })
            .collect(),
    ))
}

/// The timers endpoint answers either `{"data": [...]}` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EventTimersResp {
    Wrapped {
        #[serde(alias = "Data")]
        data: Vec<Value>,
    },
    Bare(Vec<Value>),
    Other(Value),
}

impl EventTimersResp {
    /// Decodes each entry on its own; entries that are not objects are
    /// dropped.
    pub fn into_events(self) -> Vec<EventDto> {
        let items = match self {
            EventTimersResp::Wrapped { data } | EventTimersResp::Bare(data) => data,
            EventTimersResp::Other(v) => {
                let kind = match v {
                    Value::Object(_) => "object",
                    Value::Null => "null",
                    _ => "scalar",
                };
                warn!(kind, "unexpected event timers payload; no events");
                return Vec::new();
            }
        };
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<EventDto>(item) {
                Ok(ev) => Some(ev),
                Err(e) => {
                    debug!(error=%e, "skipping malformed event entry");
                    None
                }
            })
            .collect()
    }
}

// Releases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDto {
    pub tag_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAssetDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAssetDto {
    pub name: String,
    pub browser_download_url: String,
}
