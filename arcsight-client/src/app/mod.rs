//! Command implementations behind the CLI.

pub mod agent;
pub mod status;

use std::path::{Path, PathBuf};

use crate::AppError;
use crate::config::{self, KNOWN_KEYS, Settings};
use crate::i18n;

pub fn config_show(config_path: Option<PathBuf>) -> Result<(), AppError> {
    let (path, cfg) = Settings::find_and_load(config_path)?;
    println!("# {}", path.display());
    print!("{}", cfg.to_ini());
    Ok(())
}

pub fn config_set(config_path: Option<PathBuf>, key: &str, value: &str) -> Result<(), AppError> {
    let path = config::resolve_config_path(config_path)?;
    let cfg = set_value(&path, key, value)?;
    println!("{key}={}", value.trim());
    tracing::info!(path=?path.display(), key, "config updated");
    if key.eq_ignore_ascii_case(config::KEY_HOTKEY) {
        println!("hotkey is now {}", cfg.hotkey);
    }
    Ok(())
}

/// Loads `path` (or defaults), applies one key and writes the file back.
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<Settings, AppError> {
    let key = key.trim().to_ascii_lowercase();
    if !KNOWN_KEYS.contains(&key.as_str()) {
        return Err(AppError::Config(format!(
            "unknown key {key:?}; expected one of {}",
            KNOWN_KEYS.join(", ")
        )));
    }
    let mut cfg = config::load_or_init(path)?;
    cfg.apply(&key, value.trim())?;
    config::save_config(path, &cfg)?;
    Ok(cfg)
}

pub fn languages(config_path: Option<PathBuf>) -> Result<(), AppError> {
    let (_, cfg) = Settings::find_and_load(config_path)?;
    let dir = i18n::languages_dir(&cfg);
    let found = i18n::available(&dir);
    if found.is_empty() {
        println!("no translation files in {}", dir.display());
        return Ok(());
    }
    for (code, name) in found {
        let marker = if code == cfg.language { '*' } else { ' ' };
        println!("{marker} {code:<4} {name}");
    }
    Ok(())
}
