use std::path::{Path, PathBuf};
use std::sync::Arc;

use arcsight_shared::EventKey;
use arcsight_shared::api::endpoints;
use chrono::TimeDelta;
use directories::ProjectDirs;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::AppError;
use crate::hotkey::Hotkey;

pub const ENV_CONFIG: &str = "ARCSIGHT_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.ini";

pub const KEY_HOTKEY: &str = "hotkey";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_NOTIFY_MINUTES: &str = "notify_minutes";
pub const KEY_SOUND_ENABLED: &str = "sound_enabled";
pub const KEY_SHOW_LOCAL_TIME: &str = "show_local_time";
pub const KEY_ALERTS: &str = "alerts";
pub const KEY_API_URL: &str = "api_url";
pub const KEY_LANGUAGES_DIR: &str = "languages_dir";

pub const KNOWN_KEYS: &[&str] = &[
    KEY_HOTKEY,
    KEY_LANGUAGE,
    KEY_NOTIFY_MINUTES,
    KEY_SOUND_ENABLED,
    KEY_SHOW_LOCAL_TIME,
    KEY_ALERTS,
    KEY_API_URL,
    KEY_LANGUAGES_DIR,
];

const DEFAULT_NOTIFY_MINUTES: u32 = 5;
const MAX_NOTIFY_MINUTES: u32 = 24 * 60;
const WILDCARD: &str = "*";

/// Which events raise a notification. `name@map`, `name` alone for any map,
/// `*` on either side as a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSelector {
    name: String,
    map: Option<String>,
}

impl AlertSelector {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (name, map) = match raw.split_once('@') {
            Some((n, m)) => (n.trim(), Some(m.trim())),
            None => (raw, None),
        };
        let map = map.filter(|m| *m != WILDCARD).map(str::to_string);
        Some(Self {
            name: name.to_string(),
            map,
        })
    }

    pub fn matches(&self, key: &EventKey) -> bool {
        let name_ok = self.name == WILDCARD || self.name.eq_ignore_ascii_case(&key.name);
        let map_ok = self
            .map
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(&key.map));
        name_ok && map_ok
    }
}

impl std::fmt::Display for AlertSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.map {
            Some(m) => write!(f, "{}@{}", self.name, m),
            None => self.name.fmt(f),
        }
    }
}

/// Immutable application settings. Reloading builds a new value and swaps
/// it through [`SettingsHandle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hotkey: Hotkey,
    pub language: String,
    pub notify_minutes: u32,
    pub sound_enabled: bool,
    pub show_local_time: bool,
    pub alerts: Vec<AlertSelector>,
    pub api_url: String,
    pub languages_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey: Hotkey::default(),
            language: "en".to_string(),
            notify_minutes: DEFAULT_NOTIFY_MINUTES,
            sound_enabled: true,
            show_local_time: false,
            alerts: Vec::new(),
            api_url: endpoints::EVENT_TIMERS_URL.to_string(),
            languages_dir: None,
        }
    }
}

impl Settings {
    pub fn notify_threshold(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.notify_minutes))
    }

    pub fn alert_enabled(&self, key: &EventKey) -> bool {
        self.alerts.iter().any(|s| s.matches(key))
    }

    /// Parses the flat `key=value` format. Unknown keys, comments and
    /// `[section]` lines are ignored; malformed values keep their default.
    pub fn parse(text: &str) -> Self {
        let mut cfg = Settings::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(['#', ';', '[']) {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                debug!(line, "config: ignoring line without '='");
                continue;
            };
            if let Err(e) = cfg.apply(key.trim(), value.trim()) {
                warn!(error=%e, "config: keeping default");
            }
        }
        cfg
    }

    /// Sets one key from its textual value.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let invalid = |what: &str| AppError::Config(format!("invalid {key} {value:?}: {what}"));
        match key.to_ascii_lowercase().as_str() {
            KEY_HOTKEY => {
                self.hotkey = value.parse().map_err(|e| invalid(&format!("{e}")))?;
            }
            KEY_LANGUAGE => {
                if value.is_empty() {
                    return Err(invalid("empty"));
                }
                self.language = value.to_ascii_lowercase();
            }
            KEY_NOTIFY_MINUTES => {
                let minutes: u32 = value.parse().map_err(|_| invalid("not a number"))?;
                if minutes > MAX_NOTIFY_MINUTES {
                    return Err(invalid("more than a day"));
                }
                self.notify_minutes = minutes;
            }
            KEY_SOUND_ENABLED => {
                self.sound_enabled = parse_bool(value).ok_or_else(|| invalid("not a boolean"))?;
            }
            KEY_SHOW_LOCAL_TIME => {
                self.show_local_time = parse_bool(value).ok_or_else(|| invalid("not a boolean"))?;
            }
            KEY_ALERTS => {
                self.alerts = value.split(',').filter_map(AlertSelector::parse).collect();
            }
            KEY_API_URL => {
                let url = url::Url::parse(value).map_err(|e| invalid(&e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(invalid("expected http or https"));
                }
                self.api_url = value.to_string();
            }
            KEY_LANGUAGES_DIR => {
                self.languages_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            other => {
                debug!(key = other, "config: ignoring unknown key");
            }
        }
        Ok(())
    }

    pub fn to_ini(&self) -> String {
        let alerts: Vec<String> = self.alerts.iter().map(|a| a.to_string()).collect();
        let mut out = String::new();
        let mut push = |k: &str, v: &str| {
            out.push_str(k);
            out.push('=');
            out.push_str(v);
            out.push('\n');
        };
        push(KEY_HOTKEY, &self.hotkey.to_string());
        push(KEY_LANGUAGE, &self.language);
        push(KEY_NOTIFY_MINUTES, &self.notify_minutes.to_string());
        push(KEY_SOUND_ENABLED, &self.sound_enabled.to_string());
        push(KEY_SHOW_LOCAL_TIME, &self.show_local_time.to_string());
        push(KEY_ALERTS, &alerts.join(","));
        push(KEY_API_URL, &self.api_url);
        if let Some(dir) = &self.languages_dir {
            push(KEY_LANGUAGES_DIR, &dir.display().to_string());
        }
        out
    }

    /// Resolves the config path and loads it, writing defaults when missing.
    pub fn find_and_load(cli_value: Option<PathBuf>) -> Result<(PathBuf, Settings), AppError> {
        let path = resolve_config_path(cli_value)?;
        let cfg = load_or_init(&path)?;
        Ok((path, cfg))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "rodafux", "ARC-Sight")
}

pub fn resolve_config_path(cli_value: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(p) = cli_value {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(p));
    }
    default_config_path().ok_or_else(|| AppError::Config("could not determine config dir".into()))
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

pub fn load_config(path: &Path) -> Result<Settings, AppError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {} failed: {e}", path.display())))?;
    Ok(Settings::parse(&data))
}

/// Loads `path`, or writes and returns the defaults when it does not exist.
pub fn load_or_init(path: &Path) -> Result<Settings, AppError> {
    if path.exists() {
        return load_config(path);
    }
    let cfg = Settings::default();
    if let Err(e) = save_config(path, &cfg) {
        warn!(error=%e, "could not write default config");
    }
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Settings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, cfg.to_ini())
        .map_err(|e| AppError::Config(format!("write {} failed: {e}", path.display())))
}

/// Shared handle to the current settings: one writer swaps, readers take
/// cheap snapshots or wait for changes.
#[derive(Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<Arc<Settings>>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(settings));
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Arc<Settings> {
        self.tx.borrow().clone()
    }

    pub fn replace(&self, settings: Settings) {
        self.tx.send_replace(Arc::new(settings));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Settings>> {
        self.tx.subscribe()
    }
}
