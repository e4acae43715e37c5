use crate::monitor::threshold::Threshold;
use crate::monitor::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub type EntityKey = String;

/// A timestamped observation for a vehicle or a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub entity_key: EntityKey,
    pub timestamp: Option<NaiveDateTime>,
}

impl Event {
    pub fn new(entity_key: impl Into<EntityKey>, timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            entity_key: entity_key.into(),
            timestamp,
        }
    }

    /// Builds an event from a raw cell; unparseable input leaves the timestamp empty.
    pub fn from_raw(entity_key: impl Into<EntityKey>, raw: Option<&str>) -> Self {
        Self::new(entity_key, raw.and_then(parse_timestamp))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRecord {
    pub entity_key: EntityKey,
    pub last_seen: NaiveDateTime,
}

impl AlertRecord {
    pub fn last_seen_date(&self) -> String {
        self.last_seen.format("%Y-%m-%d").to_string()
    }
}

/// Most recent valid timestamp per entity. Entities without any valid
/// timestamp are left out.
pub fn latest_per_entity<'a, I>(events: I) -> BTreeMap<EntityKey, NaiveDateTime>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut latest: BTreeMap<EntityKey, NaiveDateTime> = BTreeMap::new();
    for event in events {
        let Some(ts) = event.timestamp else {
            continue;
        };
        latest
            .entry(event.entity_key.clone())
            .and_modify(|seen| {
                if ts > *seen {
                    *seen = ts;
                }
            })
            .or_insert(ts);
    }
    latest
}

/// Entities whose latest timestamp is strictly older than `now - threshold`,
/// ordered by `last_seen` ascending and then by key.
pub fn flag_overdue(
    latest: &BTreeMap<EntityKey, NaiveDateTime>,
    now: NaiveDateTime,
    threshold: Threshold,
) -> Vec<AlertRecord> {
    let Some(cutoff) = threshold.cutoff(now) else {
        return Vec::new();
    };

    let mut alerts: Vec<AlertRecord> = latest
        .iter()
        .filter(|(_, last_seen)| **last_seen < cutoff)
        .map(|(key, last_seen)| AlertRecord {
            entity_key: key.clone(),
            last_seen: *last_seen,
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.last_seen
            .cmp(&b.last_seen)
            .then_with(|| a.entity_key.cmp(&b.entity_key))
    });
    alerts
}

fn is_recent(event: &Event, cutoff: Option<NaiveDateTime>) -> bool {
    match (event.timestamp, cutoff) {
        (Some(ts), Some(cutoff)) => ts > cutoff,
        // Window reaches before the representable range: every valid event is inside it.
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Number of events strictly newer than `now - window`.
pub fn count_recent<'a, I>(events: I, now: NaiveDateTime, window: Threshold) -> usize
where
    I: IntoIterator<Item = &'a Event>,
{
    let cutoff = window.cutoff(now);
    events
        .into_iter()
        .filter(|event| is_recent(event, cutoff))
        .count()
}

/// Recent event counts per entity, largest first, ties by key.
pub fn count_recent_per_entity<'a, I>(
    events: I,
    now: NaiveDateTime,
    window: Threshold,
) -> Vec<(EntityKey, usize)>
where
    I: IntoIterator<Item = &'a Event>,
{
    let cutoff = window.cutoff(now);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in events.into_iter().filter(|event| is_recent(event, cutoff)) {
        *counts.entry(event.entity_key.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(EntityKey, usize)> = counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn ev(key: &str, raw: &str) -> Event {
        Event::from_raw(key, Some(raw))
    }

    #[test]
    fn test_latest_per_entity_takes_max() {
        let events = vec![
            ev("V1", "2025-06-20"),
            ev("V1", "2025-06-18"),
            ev("V2", "2025-06-01"),
        ];

        let latest = latest_per_entity(&events);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["V1"], day(2025, 6, 20));
        assert_eq!(latest["V2"], day(2025, 6, 1));
    }

    #[test]
    fn test_unparseable_only_entity_is_absent() {
        let events = vec![
            ev("V1", "2025-06-20"),
            ev("V3", "yesterday-ish"),
            Event::from_raw("V4", None),
            ev("V1", "garbage"),
        ];

        let latest = latest_per_entity(&events);
        assert_eq!(latest.len(), 1);
        assert!(!latest.contains_key("V3"));
        assert!(!latest.contains_key("V4"));
        assert_eq!(latest["V1"], day(2025, 6, 20));
    }

    #[test]
    fn test_latest_is_order_independent() {
        let events = vec![
            ev("A", "2025-01-03"),
            ev("B", "2025-02-01"),
            ev("A", "2025-01-09"),
            ev("B", "bad"),
            ev("A", "2025-01-01"),
        ];
        let expected = latest_per_entity(&events);

        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(latest_per_entity(&reversed), expected);

        let mut rotated = events.clone();
        rotated.rotate_left(2);
        assert_eq!(latest_per_entity(&rotated), expected);

        assert_eq!(latest_per_entity(&events), expected);
    }

    #[test]
    fn test_flag_overdue_boundary_is_strict() {
        let now = day(2025, 6, 24);
        let threshold = Threshold::days(3).unwrap();
        let cutoff = now - Duration::days(3);

        let mut latest = BTreeMap::new();
        latest.insert("AT_BOUNDARY".to_string(), cutoff);
        latest.insert(
            "JUST_OLDER".to_string(),
            cutoff - Duration::microseconds(1),
        );

        let alerts = flag_overdue(&latest, now, threshold);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].entity_key, "JUST_OLDER");
    }

    #[test]
    fn test_missed_wash_scenario() {
        let events = vec![
            ev("V1", "2025-06-20"),
            ev("V1", "2025-06-18"),
            ev("V2", "2025-06-01"),
        ];
        let latest = latest_per_entity(&events);

        let alerts = flag_overdue(&latest, day(2025, 6, 24), Threshold::days(3).unwrap());

        // 2025-06-20 is before the 2025-06-21 cutoff, so V1 is overdue as well.
        let keys: Vec<&str> = alerts.iter().map(|a| a.entity_key.as_str()).collect();
        assert_eq!(keys, vec!["V2", "V1"]);
        assert_eq!(alerts[0].last_seen_date(), "2025-06-01");
        assert_eq!(alerts[1].last_seen_date(), "2025-06-20");
    }

    #[test]
    fn test_refill_gap_scenario() {
        let now = day(2025, 7, 31);
        let events = vec![
            Event::new("Burleigh", Some(now - Duration::days(31))),
            Event::new("Yatala", Some(now - Duration::days(29))),
            Event::new("Yatala", Some(now - Duration::days(60))),
        ];

        let alerts = flag_overdue(
            &latest_per_entity(&events),
            now,
            Threshold::days(30).unwrap(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].entity_key, "Burleigh");
    }

    #[test]
    fn test_flagged_keys_round_trip_to_latest() {
        let events = vec![
            Event::new("V1", Some(day(2025, 1, 1) + Duration::microseconds(123))),
            ev("V2", "2025-03-04 05:06:07.891"),
            ev("V3", "2025-06-23"),
        ];
        let latest = latest_per_entity(&events);

        let alerts = flag_overdue(&latest, day(2025, 6, 24), Threshold::days(3).unwrap());
        assert_eq!(alerts.len(), 2);
        for alert in &alerts {
            assert_eq!(latest[&alert.entity_key], alert.last_seen);
        }
    }

    #[test]
    fn test_flag_overdue_empty() {
        let alerts = flag_overdue(&BTreeMap::new(), day(2025, 6, 24), Threshold::days(3).unwrap());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_flag_overdue_ties_ordered_by_key() {
        let mut latest = BTreeMap::new();
        latest.insert("b".to_string(), day(2025, 1, 1));
        latest.insert("a".to_string(), day(2025, 1, 1));

        let alerts = flag_overdue(&latest, day(2025, 6, 1), Threshold::days(1).unwrap());
        let keys: Vec<&str> = alerts.iter().map(|a| a.entity_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_count_recent_empty_is_zero() {
        let events: Vec<Event> = Vec::new();
        assert_eq!(count_recent(&events, day(2025, 6, 24), Threshold::days(7).unwrap()), 0);
    }

    #[test]
    fn test_count_recent_is_strict_and_skips_invalid() {
        let now = day(2025, 6, 24);
        let events = vec![
            ev("V1", "2025-06-17"), // exactly now - 7d, excluded
            ev("V1", "2025-06-17 00:00:01"),
            ev("V2", "2025-06-23"),
            ev("V2", "nope"),
            ev("V3", "2025-05-01"),
        ];

        assert_eq!(count_recent(&events, now, Threshold::days(7).unwrap()), 2);
    }

    #[test]
    fn test_offset_and_naive_cells_share_one_frame() {
        use chrono::TimeZone;

        let washed = day(2025, 6, 24) + Duration::hours(9);
        let zoned = chrono::Local
            .from_local_datetime(&washed)
            .earliest()
            .unwrap()
            .to_rfc3339();
        let events = vec![ev("NAIVE", "2025-06-24 09:00:00"), ev("ZONED", &zoned)];

        let now = washed + Duration::minutes(30);
        let window = Threshold::try_from(Duration::hours(5)).unwrap();

        let latest = latest_per_entity(&events);
        assert_eq!(latest["NAIVE"], latest["ZONED"]);
        assert_eq!(count_recent(&events, now, window), 2);
        assert!(flag_overdue(&latest, now, window).is_empty());
    }

    #[test]
    fn test_window_reaching_before_min_counts_every_valid_event() {
        let now = NaiveDateTime::MIN + Duration::days(1);
        let window = Threshold::days(7).unwrap();
        let events = vec![
            Event::new("V1", Some(NaiveDateTime::MIN)),
            Event::new("V1", Some(now)),
            Event::new("V2", Some(now - Duration::hours(1))),
            Event::new("V3", None),
        ];

        assert_eq!(count_recent(&events, now, window), 3);
        assert_eq!(
            count_recent_per_entity(&events, now, window),
            vec![("V1".to_string(), 2), ("V2".to_string(), 1)]
        );
        assert!(flag_overdue(&latest_per_entity(&events), now, window).is_empty());
    }

    #[test]
    fn test_count_recent_per_entity_sorted() {
        let now = day(2025, 6, 24);
        let events = vec![
            ev("V2", "2025-06-20"),
            ev("V1", "2025-06-21"),
            ev("V2", "2025-06-22"),
            ev("V3", "2025-06-22"),
            ev("V4", "2025-01-01"),
        ];

        let counts = count_recent_per_entity(&events, now, Threshold::days(7).unwrap());
        assert_eq!(
            counts,
            vec![
                ("V2".to_string(), 2),
                ("V1".to_string(), 1),
                ("V3".to_string(), 1),
            ]
        );
    }
}
