use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arcsight_shared::EventRecord;
use arcsight_shared::api::{endpoints, rest};
use arcsight_shared::banner;
use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::board::Board;
use crate::config::{self, Settings, SettingsHandle};
use crate::i18n::{self, Translations};
use crate::instance::{self, InstanceLock};
use crate::platform::{self, APP_NAME, Platform};
use crate::{AppError, render, update};

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Data pushed from the poller to the main loop.
#[derive(Debug)]
pub enum PollUpdate {
    Events(Vec<EventRecord>),
    Banner(Option<String>),
}

/// Entry point for the long-running agent.
pub async fn run(config_path: Option<PathBuf>) -> Result<(), AppError> {
    let (cfg_path, cfg) = Settings::find_and_load(config_path)?;
    info!(path=?cfg_path.display(), "loaded config");
    info!(hotkey=%cfg.hotkey, vk=cfg.hotkey.vk_code(), "overlay hotkey");

    let lock = InstanceLock::acquire(&instance::default_lock_path())?;
    debug!(path=?lock.path().display(), "single instance ensured");

    let plat = platform::detect();
    plat.initialize_process();
    #[cfg(target_os = "windows")]
    info!("platform selected: windows");
    #[cfg(not(target_os = "windows"))]
    info!("platform selected: linux");

    let settings = SettingsHandle::new(cfg);
    let cancel = CancellationToken::new();

    tokio::spawn(announce_update(cancel.child_token(), plat.clone()));

    let (tx, rx) = mpsc::channel(8);
    let poller = tokio::spawn(poll_loop(cancel.child_token(), settings.subscribe(), tx));
    let reloader = tokio::spawn(reload_on_hangup(
        cancel.child_token(),
        cfg_path,
        settings.clone(),
    ));

    let mut handle = tokio::spawn(main_loop(
        cancel.child_token(),
        settings.subscribe(),
        rx,
        plat,
    ));

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received; requesting main loop to stop");
            cancel.cancel();
        }
        res = &mut handle => {
            cancel.cancel();
            match res {
                Ok(Ok(())) => info!("main loop finished"),
                Ok(Err(e)) => error!(error=%e, "main loop failed"),
                Err(e) => error!(error=%e, "main loop task join error"),
            }
        }
    }

    if !handle.is_finished() {
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
    }
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, poller).await;
    reloader.abort();
    drop(lock);
    Ok(())
}

async fn announce_update(cancel: CancellationToken, platform: Arc<dyn Platform>) {
    let found = tokio::select! {
        _ = cancel.cancelled() => return,
        res = update::check_for_update(endpoints::GITHUB_API) => res,
    };
    match found {
        Ok(Some(u)) => {
            let body = format!("Version {} is available: {}", u.version, u.page_url);
            platform
                .notify(&format!("{APP_NAME} update"), &body, false)
                .await;
        }
        Ok(None) => {}
        Err(e) => warn!(error=%e, "update check failed"),
    }
}

/// Fetches the schedule and banner every [`POLL_INTERVAL`] and whenever the
/// settings change.
pub async fn poll_loop(
    cancel: CancellationToken,
    mut settings: watch::Receiver<Arc<Settings>>,
    tx: mpsc::Sender<PollUpdate>,
) {
    poll_loop_with(cancel, &mut settings, tx, Some(endpoints::BANNER_URL)).await
}

async fn poll_loop_with(
    cancel: CancellationToken,
    settings: &mut watch::Receiver<Arc<Settings>>,
    tx: mpsc::Sender<PollUpdate>,
    banner_url: Option<&str>,
) {
    loop {
        let cfg = settings.borrow_and_update().clone();
        for update in fetch_once(&cfg, banner_url).await {
            if tx.send(update).await.is_err() {
                debug!("poller: receiver closed; exiting");
                return;
            }
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(POLL_INTERVAL) => {}
            changed = settings.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!("poller: settings changed; refreshing now");
            }
        }
    }
    debug!("poller stopped");
}

async fn fetch_once(cfg: &Settings, banner_url: Option<&str>) -> Vec<PollUpdate> {
    let mut out = Vec::with_capacity(2);
    match rest::event_timers(&cfg.api_url).await {
        Ok(records) => {
            debug!(count = records.len(), "fetched event timers");
            out.push(PollUpdate::Events(records));
        }
        Err(e) => warn!(error=%e, url=%cfg.api_url, "event timers fetch failed; keeping last data"),
    }
    if let Some(url) = banner_url {
        match rest::banner_text(url, Utc::now().timestamp()).await {
            Ok(raw) => out.push(PollUpdate::Banner(banner::pick_message(
                &raw,
                &cfg.language,
            ))),
            Err(e) => debug!(error=%e, "banner fetch failed"),
        }
    }
    out
}

async fn main_loop(
    cancel: CancellationToken,
    mut settings: watch::Receiver<Arc<Settings>>,
    mut updates: mpsc::Receiver<PollUpdate>,
    platform: Arc<dyn Platform>,
) -> Result<(), AppError> {
    let mut cfg = settings.borrow_and_update().clone();
    let mut strings = Translations::load(&i18n::languages_dir(&cfg), &cfg.language);
    let mut board = Board::new();
    let mut banner: Option<String> = None;
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = settings.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = settings.borrow_and_update().clone();
                if next.language != cfg.language || next.languages_dir != cfg.languages_dir {
                    strings = Translations::load(&i18n::languages_dir(&next), &next.language);
                }
                cfg = next;
                board.clear();
                banner = None;
                info!(language=%cfg.language, notify_minutes=cfg.notify_minutes, "settings reloaded");
            }
            update = updates.recv() => {
                match update {
                    Some(PollUpdate::Events(records)) => board.merge(records),
                    Some(PollUpdate::Banner(msg)) => {
                        if msg != banner {
                            if let Some(m) = &msg {
                                info!("{} {m}", strings.note_header());
                            }
                            banner = msg;
                        }
                    }
                    None => {
                        debug!("poller channel closed");
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                for notice in board.tick(Utc::now(), &cfg, &strings) {
                    platform.notify(&notice.title, &notice.body, cfg.sound_enabled).await;
                }
            }
        }
    }

    if !board.is_empty() {
        debug!("final board:\n{}", render::board_text(&board));
    }
    Ok(())
}

/// Re-reads the config file on SIGHUP and swaps it in.
async fn reload_on_hangup(cancel: CancellationToken, path: PathBuf, settings: SettingsHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut hup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error=%e, "cannot listen for SIGHUP; config reload disabled");
                return;
            }
        };
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = hup.recv() => {
                    info!("reload: received SIGHUP");
                    reload(&path, &settings);
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (&path, &settings);
        cancel.cancelled().await;
    }
}

#[cfg_attr(not(unix), allow(dead_code))]
fn reload(path: &Path, settings: &SettingsHandle) {
    match config::load_config(path) {
        Ok(next) if *settings.current() == next => debug!("reload: settings unchanged"),
        Ok(next) => settings.replace(next),
        Err(e) => warn!(error=%e, "reload failed; keeping current settings"),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let (Ok(mut sigint), Ok(mut sigterm)) = (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) else {
            warn!("cannot listen for SIGINT/SIGTERM; falling back to Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigint.recv() => {
                info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown: received Ctrl+C");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_swaps_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::CONFIG_FILE_NAME);
        config::save_config(&path, &Settings::default()).unwrap();

        let handle = SettingsHandle::new(Settings::default());
        let mut rx = handle.subscribe();
        reload(&path, &handle);
        assert!(!rx.has_changed().unwrap());

        std::fs::write(&path, "notify_minutes=9\n").unwrap();
        reload(&path, &handle);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().notify_minutes, 9);

        std::fs::remove_file(&path).unwrap();
        reload(&path, &handle);
        assert_eq!(handle.current().notify_minutes, 9);
    }

    #[tokio::test]
    async fn poller_stops_when_cancelled() {
        let cancel = CancellationToken::new();
        let mut cfg = Settings::default();
        // nothing listens here; the fetch fails fast and the loop waits
        cfg.api_url = "http://127.0.0.1:9/timers".into();
        let handle = SettingsHandle::new(cfg);
        let mut rx = handle.subscribe();
        let (tx, _updates) = mpsc::channel(1);
        let c = cancel.clone();
        let task = tokio::spawn(async move { poll_loop_with(c, &mut rx, tx, None).await });
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(15), task)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
