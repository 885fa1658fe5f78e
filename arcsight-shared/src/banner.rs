/// Language used when the requested one has no message.
pub const FALLBACK_LANGUAGE: &str = "EN";

/// Picks the banner line for `language` out of a `LANG=message` file,
/// falling back to English. Keys match case-insensitively; surrounding
/// quotes are stripped.
pub fn pick_message(raw: &str, language: &str) -> Option<String> {
    let lookup = |wanted: &str| {
        raw.lines()
            .filter_map(|line| line.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.trim())
    };
    let value = lookup(language.trim()).or_else(|| lookup(FALLBACK_LANGUAGE))?;
    let value = value.trim_matches('"').trim_matches('\'').trim();
    (!value.is_empty()).then(|| value.to_string())
}
