pub const EVENT_TIMERS_URL: &str = "https://metaforge.app/api/arc-raiders/event-timers";
pub const GITHUB_API: &str = "https://api.github.com";
pub const RELEASE_REPO: &str = "rodafux/ARC-Sight";
pub const BANNER_URL: &str =
    "https://raw.githubusercontent.com/rodafux/ARC-Sight/Release/src/in_overlay_msg.ini";

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

pub fn latest_release(base: &str, repo: &str) -> String {
    base_join(base, &format!("repos/{}/releases/latest", repo))
}

pub fn release_page(repo: &str) -> String {
    format!("https://github.com/{}/releases", repo)
}
