//! Daily recurring time windows and the evaluator that turns them into a
//! countdown target.
//!
//! Windows are anchored to the UTC calendar day of `now`. A window whose end
//! is not after its start wraps past midnight, so `10:00-10:00` covers a full
//! day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTimeError {
    #[error("expected HH:MM, got {0:?}")]
    Shape(String),
    #[error("invalid number in {0:?}")]
    Number(String),
    #[error("time out of range: {0:?}")]
    Range(String),
}

/// Time of day as minutes since midnight. `24:00` is accepted as the end of the day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if minute >= 60 || hour > 24 {
            return None;
        }
        let total = hour * 60 + minute;
        (total <= MINUTES_PER_DAY).then_some(Self(total))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

fn parse_field(raw: &str, field: &str) -> Result<u16, ParseTimeError> {
    let field = field.trim();
    let digits = field.strip_prefix('+').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseTimeError::Number(raw.to_string()));
    }
    digits
        .parse()
        .map_err(|_| ParseTimeError::Range(raw.to_string()))
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseTimeError::Shape(s.to_string()));
        };
        let hour = parse_field(s, h)?;
        let minute = parse_field(s, m)?;
        TimeOfDay::from_hm(hour, minute).ok_or_else(|| ParseTimeError::Range(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ParseTimeError> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    /// Whether the window crosses midnight. Equal endpoints count as wrapping.
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Start and end anchored to the UTC day that begins at `midnight`.
    fn anchor(&self, midnight: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = midnight + TimeDelta::minutes(i64::from(self.start.minutes()));
        let mut end = midnight + TimeDelta::minutes(i64::from(self.end.minutes()));
        if end <= start {
            end += TimeDelta::days(1);
        }
        (start, end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Active { ends_at: DateTime<Utc> },
    Upcoming { starts_at: DateTime<Utc> },
    /// No usable window.
    Idle,
}

impl Evaluation {
    pub fn is_active(&self) -> bool {
        matches!(self, Evaluation::Active { .. })
    }

    pub fn target(&self) -> Option<DateTime<Utc>> {
        match *self {
            Evaluation::Active { ends_at } => Some(ends_at),
            Evaluation::Upcoming { starts_at } => Some(starts_at),
            Evaluation::Idle => None,
        }
    }

    /// Time left until the target, `None` when idle.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.target().map(|t| t - now)
    }
}

/// Decides whether any window is running at `now`, and otherwise when the
/// next one starts.
///
/// Windows are scanned in order and the first active one wins, checking the
/// window anchored today before the copy anchored yesterday (which catches a
/// wrapping window that began before midnight). Overlapping windows are not
/// deduplicated.
pub fn evaluate(now: DateTime<Utc>, windows: &[TimeWindow]) -> Evaluation {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let day = TimeDelta::days(1);
    let mut next_start: Option<DateTime<Utc>> = None;

    for window in windows {
        let (start, end) = window.anchor(midnight);
        if start <= now && now < end {
            return Evaluation::Active { ends_at: end };
        }
        let (prev_start, prev_end) = (start - day, end - day);
        if prev_start <= now && now < prev_end {
            return Evaluation::Active { ends_at: prev_end };
        }
        let candidate = if start > now { start } else { start + day };
        // strict comparison keeps the first window on ties
        if next_start.is_none_or(|best| candidate < best) {
            next_start = Some(candidate);
        }
    }

    match next_start {
        Some(starts_at) => Evaluation::Upcoming { starts_at },
        None => Evaluation::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    fn w(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    #[test]
    fn parses_hour_minute() {
        assert_eq!("08:05".parse::<TimeOfDay>().unwrap().minutes(), 8 * 60 + 5);
        assert_eq!("8:5".parse::<TimeOfDay>().unwrap().minutes(), 8 * 60 + 5);
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap().minutes(), 1440);
        assert_eq!(" 07 : 30 ".parse::<TimeOfDay>().unwrap().to_string(), "07:30");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["bad", "", "10", "10:00:00", "ab:10", "10:", "-1:00", "25:00", "10:60", "24:01"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn active_inside_plain_window() {
        let got = evaluate(at(8, 30), &[w("08:00", "09:00")]);
        assert_eq!(got, Evaluation::Active { ends_at: at(9, 0) });
    }

    #[test]
    fn end_is_exclusive() {
        let got = evaluate(at(9, 0), &[w("08:00", "09:00")]);
        assert_eq!(
            got,
            Evaluation::Upcoming {
                starts_at: at(8, 0) + TimeDelta::days(1)
            }
        );
    }

    #[test]
    fn upcoming_later_today() {
        let got = evaluate(at(7, 0), &[w("08:00", "09:00")]);
        assert_eq!(got, Evaluation::Upcoming { starts_at: at(8, 0) });
    }

    #[test]
    fn wrapping_window_seen_from_after_midnight() {
        let windows = [w("08:00", "09:00"), w("23:00", "01:00")];
        let got = evaluate(at(0, 30), &windows);
        assert_eq!(got, Evaluation::Active { ends_at: at(1, 0) });
    }

    #[test]
    fn wrapping_window_seen_from_before_midnight() {
        let got = evaluate(at(23, 30), &[w("23:00", "01:00")]);
        assert_eq!(
            got,
            Evaluation::Active {
                ends_at: at(1, 0) + TimeDelta::days(1)
            }
        );
    }

    #[test]
    fn equal_endpoints_cover_a_full_day() {
        let window = w("10:00", "10:00");
        assert!(window.wraps());
        let got = evaluate(at(10, 0), &[window]);
        assert_eq!(
            got,
            Evaluation::Active {
                ends_at: at(10, 0) + TimeDelta::days(1)
            }
        );
        // one minute earlier the copy anchored yesterday is still running
        let got = evaluate(at(9, 59), &[window]);
        assert_eq!(got, Evaluation::Active { ends_at: at(10, 0) });
    }

    #[test]
    fn earliest_start_wins() {
        let windows = [w("20:00", "21:00"), w("12:00", "13:00"), w("06:00", "07:00")];
        let got = evaluate(at(10, 0), &windows);
        assert_eq!(got, Evaluation::Upcoming { starts_at: at(12, 0) });
    }

    #[test]
    fn overlapping_windows_report_first_in_order() {
        let windows = [w("10:00", "12:00"), w("09:00", "11:00")];
        let got = evaluate(at(10, 30), &windows);
        assert_eq!(got, Evaluation::Active { ends_at: at(12, 0) });
    }

    #[test]
    fn end_of_day_window() {
        let got = evaluate(at(22, 0), &[w("21:00", "24:00")]);
        assert_eq!(
            got,
            Evaluation::Active {
                ends_at: at(0, 0) + TimeDelta::days(1)
            }
        );
    }

    #[test]
    fn no_windows_is_idle() {
        assert_eq!(evaluate(at(12, 0), &[]), Evaluation::Idle);
        assert_eq!(Evaluation::Idle.remaining(at(12, 0)), None);
    }
}
