use arcsight_shared::schedule::{Evaluation, TimeOfDay, TimeWindow, evaluate};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

fn tod(minutes: u16) -> TimeOfDay {
    TimeOfDay::from_hm(minutes / 60, minutes % 60).unwrap()
}

fn minute_of_day() -> impl Strategy<Value = u16> {
    0u16..1440
}

proptest! {
    #[test]
    fn inside_plain_window_is_active_until_end(
        start in 0u16..1439,
        len in 1u16..1440,
        offset in 0u16..1440,
    ) {
        let end = (start + len).min(1439);
        prop_assume!(end > start);
        let inside = start + offset % (end - start);
        let now = day_start() + TimeDelta::minutes(i64::from(inside));
        let got = evaluate(now, &[TimeWindow::new(tod(start), tod(end))]);
        prop_assert_eq!(
            got,
            Evaluation::Active { ends_at: day_start() + TimeDelta::minutes(i64::from(end)) }
        );
    }

    #[test]
    fn wrapping_window_is_active_on_both_sides_of_midnight(
        start in 1u16..1440,
        end in 0u16..1440,
        after_start in any::<bool>(),
        pick in 0u16..1440,
    ) {
        prop_assume!(end <= start);
        let window = TimeWindow::new(tod(start), tod(end));
        let (now_min, expected_end) = if after_start || end == 0 {
            let now_min = start + pick % (1440 - start);
            (now_min, day_start() + TimeDelta::days(1) + TimeDelta::minutes(i64::from(end)))
        } else {
            (pick % end, day_start() + TimeDelta::minutes(i64::from(end)))
        };
        let now = day_start() + TimeDelta::minutes(i64::from(now_min));
        prop_assert_eq!(evaluate(now, &[window]), Evaluation::Active { ends_at: expected_end });
    }

    #[test]
    fn before_start_is_upcoming_today(start in 1u16..1439, end_gap in 1u16..1440, before in 1u16..1440) {
        let end = (start + end_gap).min(1439);
        prop_assume!(end > start);
        let now_min = start.saturating_sub(before);
        prop_assume!(now_min < start);
        let now = day_start() + TimeDelta::minutes(i64::from(now_min));
        let got = evaluate(now, &[TimeWindow::new(tod(start), tod(end))]);
        prop_assert_eq!(
            got,
            Evaluation::Upcoming { starts_at: day_start() + TimeDelta::minutes(i64::from(start)) }
        );
    }

    #[test]
    fn target_is_never_in_the_past_or_beyond_a_day(
        windows in prop::collection::vec((minute_of_day(), minute_of_day()), 1..6),
        now_secs in 0i64..86_400,
    ) {
        let windows: Vec<TimeWindow> =
            windows.into_iter().map(|(s, e)| TimeWindow::new(tod(s), tod(e))).collect();
        let now = day_start() + TimeDelta::seconds(now_secs);
        let got = evaluate(now, &windows);
        let target = got.target().expect("non-empty input always has a target");
        prop_assert!(target > now);
        prop_assert!(target - now <= TimeDelta::days(1));
    }
}
