use std::fmt::Write;

use chrono::TimeDelta;

use crate::board::{Board, CardView, Tier};

pub const IDLE_TEXT: &str = "--:--";

/// `"2h 5m"`-style text when an hour or more is left, `"MM:SS"` below that.
pub fn format_remaining(remaining: Option<TimeDelta>) -> String {
    let Some(remaining) = remaining else {
        return IDLE_TEXT.to_string();
    };
    let total = remaining.num_seconds().max(0);
    let (hours, rest) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

fn tier_marker(tier: Tier) -> &'static str {
    match tier {
        Tier::Active => "*",
        Tier::Imminent => "!",
        Tier::Normal => " ",
        Tier::Idle => "-",
    }
}

pub fn card_line(view: &CardView) -> String {
    let mut line = format!(
        "{} {:<12} {:>8}  {} / {}",
        tier_marker(view.tier),
        view.prefix,
        view.text,
        view.title,
        view.map
    );
    if let Some(local) = &view.local_start {
        let _ = write!(line, "  ({local})");
    }
    if view.alert_enabled {
        line.push_str("  [alert]");
    }
    line
}

/// Plain-text dump of every tab, used by the `status` command.
pub fn board_text(board: &Board) -> String {
    let mut out = String::new();
    for tab in board.tabs() {
        let _ = writeln!(out, "[{}]", tab.header);
        for view in board.sorted_views(&tab) {
            let _ = writeln!(out, "  {}", card_line(view));
        }
    }
    out
}
