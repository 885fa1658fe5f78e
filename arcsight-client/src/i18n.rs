use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tinytemplate::TinyTemplate;
use tracing::{debug, warn};

use crate::config::{Settings, project_dirs};

pub const SECTION_UI: &str = "UI";
pub const SECTION_TABS: &str = "TABS";
pub const SECTION_MAPS: &str = "MAPS";

const FALLBACK_LANGUAGE: &str = "en";
const FALLBACK_NOTIFY_MESSAGE: &str = "STARTING IN {minutes} MIN - {map_name}";
const FALLBACK_NOTE_HEADER: &str = "NOTE :";
/// Keys found before any `[section]` header.
const FLAT: &str = "";

/// String table loaded from `lang_<code>.ini`.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    language: String,
    sections: HashMap<String, HashMap<String, String>>,
}

fn normalize_key(key: &str) -> String {
    key.trim().replace([' ', '-'], "_").to_lowercase()
}

fn lang_file(dir: &Path, code: &str) -> PathBuf {
    dir.join(format!("lang_{}.ini", code.to_lowercase()))
}

/// `languages/` next to the executable when present, otherwise the data dir.
pub fn languages_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.languages_dir {
        return dir.clone();
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("languages")));
    if let Some(dir) = beside_exe.filter(|d| d.is_dir()) {
        return dir;
    }
    project_dirs()
        .map(|pd| pd.data_dir().join("languages"))
        .unwrap_or_else(|| PathBuf::from("languages"))
}

impl Translations {
    pub fn parse(language: &str, text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current = FLAT.to_string();
        for line in text.lines() {
            let line = line.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || line.starts_with(['#', ';']) {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = name.trim().to_uppercase();
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                sections
                    .entry(current.clone())
                    .or_default()
                    .insert(normalize_key(k), v.trim().to_string());
            }
        }
        Self {
            language: language.to_lowercase(),
            sections,
        }
    }

    /// Loads `lang_<language>.ini` from `dir`, falling back to English and
    /// then to an empty table.
    pub fn load(dir: &Path, language: &str) -> Self {
        for code in [language, FALLBACK_LANGUAGE] {
            let path = lang_file(dir, code);
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(path=?path.display(), "loaded translations");
                    return Self::parse(language, &text);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => warn!(error=%e, path=?path.display(), "failed to read translations"),
            }
        }
        debug!(language, dir=?dir.display(), "no translation file; using built-in strings");
        Self {
            language: language.to_lowercase(),
            sections: HashMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lookup(&self, key: &str, section: &str) -> Option<&str> {
        let k = normalize_key(key);
        if k.is_empty() {
            return None;
        }
        [section, FLAT]
            .iter()
            .filter_map(|s| self.sections.get(*s))
            .find_map(|table| table.get(&k))
            .map(String::as_str)
    }

    /// Translated text, or the key upper-cased when missing.
    pub fn get(&self, key: &str, section: &str) -> String {
        match self.lookup(key, section) {
            Some(v) => v.to_string(),
            None => key.to_uppercase(),
        }
    }

    pub fn timer_prefix(&self, active: bool) -> String {
        let key = if active { "ends_in" } else { "starts_in" };
        if let Some(v) = self.lookup(key, SECTION_UI) {
            return v.to_string();
        }
        let (starts, ends) = match self.language.as_str() {
            "fr" => ("DÉBUT DANS", "FIN DANS"),
            "de" => ("START IN", "ENDET IN"),
            "es" => ("INICIA EN", "TERMINA EN"),
            "it" => ("INIZIA TRA", "TERMINA TRA"),
            _ => ("STARTS IN", "ENDS IN"),
        };
        if active { ends } else { starts }.to_string()
    }

    pub fn note_header(&self) -> String {
        self.lookup("note_header", SECTION_UI)
            .unwrap_or(FALLBACK_NOTE_HEADER)
            .to_string()
    }

    /// Notification body from the `notify_message` template.
    pub fn notify_message(&self, minutes: i64, map_name: &str) -> String {
        #[derive(Serialize)]
        struct Ctx<'a> {
            minutes: i64,
            map_name: &'a str,
        }
        let ctx = Ctx { minutes, map_name };
        let pattern = self
            .lookup("notify_message", SECTION_UI)
            .unwrap_or(FALLBACK_NOTIFY_MESSAGE);
        render(pattern, &ctx)
            .or_else(|e| {
                warn!(error=%e, "notify_message template invalid; using default");
                render(FALLBACK_NOTIFY_MESSAGE, &ctx)
            })
            .unwrap_or_else(|_| format!("{minutes} MIN - {map_name}"))
    }
}

fn render<C: Serialize>(pattern: &str, ctx: &C) -> Result<String, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("msg", pattern)?;
    tt.render("msg", ctx)
}

/// `(code, display name)` for every `lang_*.ini` in `dir`, sorted by code.
pub fn available(dir: &Path) -> Vec<(String, String)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<(String, String)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let file = e.file_name().to_string_lossy().to_string();
            let code = file.strip_prefix("lang_")?.strip_suffix(".ini")?.to_string();
            let name = std::fs::read_to_string(e.path())
                .ok()
                .and_then(|text| {
                    Translations::parse(&code, &text)
                        .lookup("language_name", FLAT)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| code.to_uppercase());
            Some((code, name))
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FR: &str = "\u{feff}language_name = Français\n[UI]\nnotify_message = DÉBUT DANS {minutes} MIN - {map_name}\nnote_header = NOTE IMPORTANTE :\n[TABS]\nnight raid = Raid nocturne\n[MAPS]\nBlue Gate = Portail bleu\n";

    #[test]
    fn section_then_flat_then_uppercase_key() {
        let t = Translations::parse("fr", FR);
        assert_eq!(t.get("Night Raid", SECTION_TABS), "Raid nocturne");
        assert_eq!(t.get("Blue-Gate", SECTION_MAPS), "Portail bleu");
        assert_eq!(t.get("language_name", SECTION_UI), "Français");
        assert_eq!(t.get("Harvester", SECTION_TABS), "HARVESTER");
        assert_eq!(t.get("", SECTION_UI), "");
    }

    #[test]
    fn renders_notification_template() {
        let t = Translations::parse("fr", FR);
        assert_eq!(t.notify_message(4, "Dam"), "DÉBUT DANS 4 MIN - Dam");
        let empty = Translations::default();
        assert_eq!(
            empty.notify_message(5, "Spaceport"),
            "STARTING IN 5 MIN - Spaceport"
        );
    }

    #[test]
    fn broken_template_falls_back() {
        let t = Translations::parse("en", "[UI]\nnotify_message = STARTS {soon}\n");
        assert_eq!(t.notify_message(3, "Dam"), "STARTING IN 3 MIN - Dam");
    }

    #[test]
    fn builtin_prefixes_per_language() {
        assert_eq!(Translations::parse("de", "").timer_prefix(true), "ENDET IN");
        assert_eq!(Translations::parse("xx", "").timer_prefix(false), "STARTS IN");
        let custom = Translations::parse("en", "[UI]\nstarts_in=SOON\n");
        assert_eq!(custom.timer_prefix(false), "SOON");
        assert_eq!(Translations::default().note_header(), "NOTE :");
    }

    #[test]
    fn loads_with_english_fallback_and_lists_languages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lang_en.ini"),
            "language_name=English\n[UI]\nalert_button_label=ALERT\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("lang_fr.ini"), FR).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let it = Translations::load(dir.path(), "it");
        assert_eq!(it.get("alert_button_label", SECTION_UI), "ALERT");
        assert_eq!(it.language(), "it");

        let fr = Translations::load(dir.path(), "FR");
        assert_eq!(fr.note_header(), "NOTE IMPORTANTE :");

        assert_eq!(
            available(dir.path()),
            vec![
                ("en".to_string(), "English".to_string()),
                ("fr".to_string(), "Français".to_string()),
            ]
        );
    }
}
