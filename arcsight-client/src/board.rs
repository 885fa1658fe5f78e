//! Tracked events grouped into tabs, with per-card countdown state.
//!
//! Cards live once in the board and tabs refer to them, so alert state is
//! shared between the `ALL` tab and the per-event tab.

use std::collections::HashMap;

use arcsight_shared::{AlertState, EventKey, EventRecord, Evaluation, evaluate};
use chrono::{DateTime, Local, TimeDelta, Utc};
use tracing::{debug, info};

use crate::config::Settings;
use crate::i18n::{SECTION_MAPS, SECTION_TABS, Translations};
use crate::render::format_remaining;

pub const ALL_TAB: &str = "ALL";

/// Urgency used to colour a card.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    Active,
    /// Upcoming and within the notification threshold.
    Imminent,
    Normal,
    Idle,
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub key: EventKey,
    pub title: String,
    pub map: String,
    pub evaluation: Evaluation,
    pub remaining: Option<TimeDelta>,
    pub text: String,
    pub prefix: String,
    pub tier: Tier,
    pub local_start: Option<String>,
    pub alert_enabled: bool,
}

impl CardView {
    fn idle(key: EventKey) -> Self {
        Self {
            title: key.name.clone(),
            map: key.map.clone(),
            key,
            evaluation: Evaluation::Idle,
            remaining: None,
            text: format_remaining(None),
            prefix: String::new(),
            tier: Tier::Idle,
            local_start: None,
            alert_enabled: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Card {
    record: EventRecord,
    alert: AlertState,
    view: CardView,
}

/// A notification the caller should raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotice {
    pub key: EventKey,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub header: String,
    members: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct Board {
    cards: Vec<Card>,
    index: HashMap<EventKey, usize>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.index.clear();
    }

    /// Replaces the schedule of known events and appends new ones. Events
    /// missing from `records` stay on the board.
    pub fn merge(&mut self, records: Vec<EventRecord>) {
        let mut added = 0usize;
        for record in records {
            match self.index.get(&record.key) {
                Some(&i) => self.cards[i].record = record,
                None => {
                    self.index.insert(record.key.clone(), self.cards.len());
                    self.cards.push(Card {
                        view: CardView::idle(record.key.clone()),
                        record,
                        alert: AlertState::default(),
                    });
                    added += 1;
                }
            }
        }
        debug!(total = self.cards.len(), added, "board merged");
    }

    /// Re-evaluates every card at `now` and returns the notifications that
    /// became due.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        settings: &Settings,
        i18n: &Translations,
    ) -> Vec<AlertNotice> {
        self.evaluate_cards(now, settings, i18n, true)
    }

    /// Rebuilds the views at `now` without touching alert state.
    pub fn refresh(&mut self, now: DateTime<Utc>, settings: &Settings, i18n: &Translations) {
        self.evaluate_cards(now, settings, i18n, false);
    }

    fn evaluate_cards(
        &mut self,
        now: DateTime<Utc>,
        settings: &Settings,
        i18n: &Translations,
        latch: bool,
    ) -> Vec<AlertNotice> {
        let threshold = settings.notify_threshold();
        let mut notices = Vec::new();
        for card in &mut self.cards {
            let evaluation = evaluate(now, &card.record.windows);
            let enabled = settings.alert_enabled(&card.record.key);
            let mut fire = false;
            if latch {
                if !enabled {
                    card.alert.disable();
                }
                fire = card.alert.observe(now, &evaluation, threshold, enabled);
            }
            card.view = build_view(
                &card.record,
                evaluation,
                now,
                threshold,
                enabled,
                settings,
                i18n,
            );
            if fire {
                let minutes = card.view.remaining.map_or(0, |r| r.num_minutes());
                let notice = AlertNotice {
                    key: card.record.key.clone(),
                    title: card.view.title.clone(),
                    body: i18n.notify_message(minutes, &card.view.map),
                };
                info!(event=%notice.key, minutes, "event starting soon");
                notices.push(notice);
            }
        }
        notices
    }

    pub fn view(&self, key: &EventKey) -> Option<&CardView> {
        self.index.get(key).map(|&i| &self.cards[i].view)
    }

    /// `ALL` first, then one tab per event name in name order.
    pub fn tabs(&self) -> Vec<Tab> {
        if self.cards.is_empty() {
            return Vec::new();
        }
        let mut order: Vec<usize> = (0..self.cards.len()).collect();
        order.sort_by(|&a, &b| self.cards[a].record.name().cmp(self.cards[b].record.name()));

        let mut named: Vec<Tab> = Vec::new();
        let mut last_name: Option<&str> = None;
        for i in order {
            let name = self.cards[i].record.name();
            match named.last_mut() {
                Some(tab) if last_name == Some(name) => tab.members.push(i),
                _ => named.push(Tab {
                    header: self.cards[i].view.title.clone(),
                    members: vec![i],
                }),
            }
            last_name = Some(name);
        }

        let mut tabs = Vec::with_capacity(named.len() + 1);
        tabs.push(Tab {
            header: ALL_TAB.to_string(),
            members: (0..self.cards.len()).collect(),
        });
        tabs.extend(named);
        tabs
    }

    /// Cards of `tab`: running events first, then by target time, idle last.
    pub fn sorted_views(&self, tab: &Tab) -> Vec<&CardView> {
        let mut views: Vec<&CardView> = tab
            .members
            .iter()
            .map(|&i| &self.cards[i].view)
            .collect();
        views.sort_by_key(|v| {
            let target = v.evaluation.target();
            (!v.evaluation.is_active(), target.is_none(), target)
        });
        views
    }
}

fn build_view(
    record: &EventRecord,
    evaluation: Evaluation,
    now: DateTime<Utc>,
    threshold: TimeDelta,
    alert_enabled: bool,
    settings: &Settings,
    i18n: &Translations,
) -> CardView {
    let remaining = evaluation.remaining(now);
    let (tier, prefix) = match evaluation {
        Evaluation::Active { .. } => (Tier::Active, i18n.timer_prefix(true)),
        Evaluation::Upcoming { .. } if remaining.is_some_and(|r| r <= threshold) => {
            (Tier::Imminent, i18n.timer_prefix(false))
        }
        Evaluation::Upcoming { .. } => (Tier::Normal, i18n.timer_prefix(false)),
        Evaluation::Idle => (Tier::Idle, String::new()),
    };
    let local_start = match evaluation {
        Evaluation::Upcoming { starts_at } if settings.show_local_time => Some(
            starts_at
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string(),
        ),
        _ => None,
    };
    CardView {
        key: record.key.clone(),
        title: i18n.get(record.name(), SECTION_TABS),
        map: i18n.get(record.map(), SECTION_MAPS),
        evaluation,
        remaining,
        text: format_remaining(remaining),
        prefix,
        tier,
        local_start,
        alert_enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcsight_shared::TimeWindow;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    fn record(name: &str, map: &str, windows: &[(&str, &str)]) -> EventRecord {
        EventRecord {
            key: EventKey::new(name, map),
            windows: windows
                .iter()
                .map(|(s, e)| TimeWindow::parse(s, e).unwrap())
                .collect(),
        }
    }

    fn settings(alerts: &str) -> Settings {
        let mut s = Settings::default();
        s.apply("alerts", alerts).unwrap();
        s
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            record("Night Raid", "Dam", &[("12:04", "13:00")]),
            record("Harvester", "Spaceport", &[("11:00", "12:30")]),
            record("Night Raid", "Blue Gate", &[("18:00", "19:00")]),
            record("Empty", "Dam", &[]),
        ]
    }

    #[test]
    fn groups_tabs_by_event_name() {
        let mut board = Board::new();
        board.merge(sample());
        board.tick(at(12, 0), &Settings::default(), &Translations::default());

        let tabs = board.tabs();
        let headers: Vec<&str> = tabs.iter().map(|t| t.header.as_str()).collect();
        assert_eq!(headers, ["ALL", "EMPTY", "HARVESTER", "NIGHT RAID"]);
        assert_eq!(board.sorted_views(&tabs[0]).len(), 4);
        assert_eq!(board.sorted_views(&tabs[3]).len(), 2);
    }

    #[test]
    fn orders_active_then_soonest_then_idle() {
        let mut board = Board::new();
        board.merge(sample());
        board.tick(at(12, 0), &Settings::default(), &Translations::default());

        let tabs = board.tabs();
        let order: Vec<String> = board
            .sorted_views(&tabs[0])
            .iter()
            .map(|v| v.key.to_string())
            .collect();
        assert_eq!(
            order,
            [
                "Harvester@Spaceport",
                "Night Raid@Dam",
                "Night Raid@Blue Gate",
                "Empty@Dam"
            ]
        );
        let harvester = board.view(&EventKey::new("Harvester", "Spaceport")).unwrap();
        assert_eq!(harvester.tier, Tier::Active);
        assert_eq!(harvester.text, "30:00");
        assert_eq!(harvester.prefix, "ENDS IN");
        let raid = board.view(&EventKey::new("Night Raid", "Dam")).unwrap();
        assert_eq!(raid.tier, Tier::Imminent);
        let idle = board.view(&EventKey::new("Empty", "Dam")).unwrap();
        assert_eq!((idle.tier, idle.text.as_str()), (Tier::Idle, "--:--"));
    }

    #[test]
    fn notifies_once_per_card() {
        let mut board = Board::new();
        board.merge(sample());
        let cfg = settings("Night Raid@*");
        let i18n = Translations::default();

        let first = board.tick(at(12, 0), &cfg, &i18n);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].key, EventKey::new("Night Raid", "Dam"));
        assert_eq!(first[0].title, "NIGHT RAID");
        assert_eq!(first[0].body, "STARTING IN 4 MIN - DAM");

        assert!(board.tick(at(12, 3), &cfg, &i18n).is_empty());
    }

    #[test]
    fn refresh_keeps_alert_state() {
        let mut board = Board::new();
        board.merge(sample());
        let cfg = settings("*");
        let i18n = Translations::default();
        assert_eq!(board.tick(at(12, 0), &cfg, &i18n).len(), 1);

        board.merge(sample());
        assert_eq!(board.len(), 4);
        assert!(board.tick(at(12, 1), &cfg, &i18n).is_empty());
    }

    #[test]
    fn disabling_alert_rearms() {
        let mut board = Board::new();
        board.merge(sample());
        let i18n = Translations::default();
        assert_eq!(board.tick(at(12, 0), &settings("*"), &i18n).len(), 1);
        assert!(board.tick(at(12, 1), &Settings::default(), &i18n).is_empty());
        assert_eq!(board.tick(at(12, 2), &settings("*"), &i18n).len(), 1);
    }

    #[test]
    fn refresh_leaves_alerts_armed() {
        let mut board = Board::new();
        board.merge(sample());
        let cfg = settings("*");
        let i18n = Translations::default();

        board.refresh(at(12, 0), &cfg, &i18n);
        let raid = board.view(&EventKey::new("Night Raid", "Dam")).unwrap();
        assert_eq!(raid.tier, Tier::Imminent);
        assert!(raid.alert_enabled);

        assert_eq!(board.tick(at(12, 1), &cfg, &i18n).len(), 1);
    }

    #[test]
    fn local_start_only_when_enabled_and_upcoming() {
        let mut board = Board::new();
        board.merge(sample());
        let mut cfg = Settings::default();
        cfg.show_local_time = true;
        board.tick(at(12, 0), &cfg, &Translations::default());
        let raid = board.view(&EventKey::new("Night Raid", "Dam")).unwrap();
        assert!(raid.local_start.is_some());
        let harvester = board.view(&EventKey::new("Harvester", "Spaceport")).unwrap();
        assert!(harvester.local_start.is_none());
    }
}
