//! Minimal REST client helpers for the event timers API, the release host
//! and the banner message file.

use super::*;
use crate::domain::EventRecord;
use once_cell::sync::Lazy;
use std::time::Duration;

pub use reqwest::StatusCode;

pub const USER_AGENT: &str = concat!("ARC-Sight/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

fn mk_client() -> reqwest::Client {
    HTTP_CLIENT.clone()
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, RestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(res)
}

async fn handle_json<T: for<'de> serde::Deserialize<'de>>(
    res: reqwest::Response,
) -> Result<T, RestError> {
    check_status(res)
        .await?
        .json::<T>()
        .await
        .map_err(|e| RestError::Serde(e.to_string()))
}

/// Fetches the current schedule. Malformed slots are already dropped from
/// the returned records.
pub async fn event_timers(url: &str) -> Result<Vec<EventRecord>, RestError> {
    let res = mk_client()
        .get(url)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    let resp: EventTimersResp = handle_json(res).await?;
    Ok(resp
        .into_events()
        .into_iter()
        .map(EventRecord::from)
        .collect())
}

pub async fn latest_release(url: &str) -> Result<ReleaseDto, RestError> {
    let res = mk_client()
        .get(url)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

/// Raw banner file; `cache_bust` is appended as `?t=` so CDN copies stay fresh.
pub async fn banner_text(url: &str, cache_bust: i64) -> Result<String, RestError> {
    let sep = if url.contains('?') { '&' } else { '?' };
    let res = mk_client()
        .get(format!("{url}{sep}t={cache_bust}"))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    check_status(res)
        .await?
        .text()
        .await
        .map_err(|e| RestError::Http(e.to_string()))
}
