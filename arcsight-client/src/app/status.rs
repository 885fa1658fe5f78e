use std::fmt::Write;
use std::path::PathBuf;

use arcsight_shared::api::{endpoints, rest};
use arcsight_shared::banner;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::AppError;
use crate::board::Board;
use crate::config::Settings;
use crate::i18n::{self, Translations};
use crate::render;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), AppError> {
    let (cfg_path, cfg) = Settings::find_and_load(config_path)?;
    info!(path=?cfg_path.display(), "loaded config");
    let i18n = Translations::load(&i18n::languages_dir(&cfg), &cfg.language);
    let report = report(&cfg, &i18n, Utc::now(), Some(endpoints::BANNER_URL)).await?;
    print!("{report}");
    Ok(())
}

/// Fetches the schedule once and renders every tab at `now`. The banner is
/// best-effort; a schedule failure is an error.
pub async fn report(
    cfg: &Settings,
    i18n: &Translations,
    now: DateTime<Utc>,
    banner_url: Option<&str>,
) -> Result<String, AppError> {
    let records = rest::event_timers(&cfg.api_url)
        .await
        .map_err(|e| AppError::Http(format!("event timers: {e}")))?;
    let mut board = Board::new();
    board.merge(records);
    board.refresh(now, cfg, i18n);

    let mut out = render::board_text(&board);
    if board.is_empty() {
        out.push_str("no events\n");
    }
    if let Some(url) = banner_url {
        match rest::banner_text(url, now.timestamp()).await {
            Ok(raw) => {
                if let Some(msg) = banner::pick_message(&raw, &cfg.language) {
                    let _ = writeln!(out, "{} {msg}", i18n.note_header());
                }
            }
            Err(e) => warn!(error=%e, "banner fetch failed"),
        }
    }
    Ok(out)
}
