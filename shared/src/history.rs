//! Unified ride history: merges the on-device store snapshot with the last
//! successful server fetch into one display list.
//!
//! The two sources arrive independently and use unrelated id spaces, so the
//! merge is a full recompute over both snapshots each time either one
//! changes. No deduplication is attempted across sources.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::RemoteRide;
use crate::ride_store::StoredRide;

/// Display-only union over the two history sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryItem {
    Local(StoredRide),
    Remote(RemoteRide),
}

impl HistoryItem {
    pub fn is_local(&self) -> bool {
        matches!(self, HistoryItem::Local(_))
    }

    /// Combined timestamp, when the record carries one.
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            HistoryItem::Local(r) => r.date.as_deref(),
            HistoryItem::Remote(r) => Some(r.date.as_str()),
        }
    }

    /// (date, time) sort key. `None` when the timestamp is missing.
    pub fn sort_key(&self) -> Option<(&str, &str)> {
        self.timestamp().map(split_timestamp)
    }

    pub fn date_part(&self) -> Option<&str> {
        self.sort_key().map(|(date, _)| date)
    }

    pub fn time_part(&self) -> Option<&str> {
        self.sort_key().map(|(_, time)| time)
    }

    pub fn origin(&self) -> &str {
        match self {
            HistoryItem::Local(r) => &r.origin,
            HistoryItem::Remote(r) => &r.origin,
        }
    }

    pub fn destination(&self) -> &str {
        match self {
            HistoryItem::Local(r) => &r.destination,
            HistoryItem::Remote(r) => &r.destination,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            HistoryItem::Local(r) => r.distance,
            HistoryItem::Remote(r) => r.distance,
        }
    }

    pub fn duration(&self) -> &str {
        match self {
            HistoryItem::Local(r) => &r.duration,
            HistoryItem::Remote(r) => &r.duration,
        }
    }

    pub fn driver_name(&self) -> &str {
        match self {
            HistoryItem::Local(r) => &r.driver_name,
            HistoryItem::Remote(r) => &r.driver.name,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            HistoryItem::Local(r) => r.value,
            HistoryItem::Remote(r) => r.value,
        }
    }

    pub fn display_id(&self) -> String {
        match self {
            HistoryItem::Local(r) => format!("local-{}", r.id),
            HistoryItem::Remote(r) => r.id.clone(),
        }
    }
}

/// Splits a combined timestamp like `2024-12-11T10:00:00` into its date and
/// time parts. A space separator is accepted as well; a string with neither
/// separator is all date and no time.
pub fn split_timestamp(timestamp: &str) -> (&str, &str) {
    timestamp
        .split_once('T')
        .or_else(|| timestamp.split_once(' '))
        .unwrap_or((timestamp, ""))
}

/// Most recent first: descending by date part, then by time part. Items with
/// no timestamp sort after everything that has one. ISO-style timestamps make
/// the lexicographic comparison equivalent to a chronological one.
pub fn compare_by_recency(a: &HistoryItem, b: &HistoryItem) -> Ordering {
    match (a.sort_key(), b.sort_key()) {
        (Some(key_a), Some(key_b)) => key_b.cmp(&key_a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Produces the unified display list: local records first, then remote
/// entries, stably sorted most-recent-first. Pure; the same snapshots always
/// yield the same list, with ties kept in input order.
pub fn merge_history(local: &[StoredRide], remote: &[RemoteRide]) -> Vec<HistoryItem> {
    let mut items: Vec<HistoryItem> = local
        .iter()
        .cloned()
        .map(HistoryItem::Local)
        .chain(remote.iter().cloned().map(HistoryItem::Remote))
        .collect();

    items.sort_by(compare_by_recency);
    items
}

/// Case-insensitive driver-name filter applied to a remote history response.
pub fn filter_by_driver_name(rides: Vec<RemoteRide>, driver_name: &str) -> Vec<RemoteRide> {
    let folded = driver_name.to_lowercase();
    rides
        .into_iter()
        .filter(|ride| ride.driver.name.to_lowercase() == folded)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DriverRef;
    use proptest::prelude::*;

    fn remote(id: &str, date: &str, driver: &str) -> RemoteRide {
        RemoteRide {
            id: id.into(),
            date: date.into(),
            origin: "Origin A".into(),
            destination: "Destination B".into(),
            distance: 3.2,
            duration: "12 mins".into(),
            driver: DriverRef {
                id: "1".into(),
                name: driver.into(),
            },
            value: 50.05,
        }
    }

    fn local(id: u64, date: Option<&str>) -> StoredRide {
        StoredRide {
            id,
            customer_id: "CT01".into(),
            date: date.map(Into::into),
            origin: "Origin A".into(),
            destination: "Destination B".into(),
            distance: 3.2,
            duration: "12 mins".into(),
            driver_id: "1".into(),
            driver_name: "Homer Simpson".into(),
            value: 50.05,
        }
    }

    #[test]
    fn test_split_timestamp() {
        assert_eq!(
            split_timestamp("2024-12-11T10:00:00"),
            ("2024-12-11", "10:00:00")
        );
        assert_eq!(
            split_timestamp("2024-12-11 10:00:00"),
            ("2024-12-11", "10:00:00")
        );
        assert_eq!(split_timestamp("2024-12-11"), ("2024-12-11", ""));
    }

    #[test]
    fn test_sorted_most_recent_date_first() {
        let remote_rides = vec![
            remote("a", "2024-12-10T09:00:00", "Homer Simpson"),
            remote("b", "2024-12-11T08:00:00", "Homer Simpson"),
        ];
        let merged = merge_history(&[], &remote_rides);

        assert_eq!(merged[0].display_id(), "b");
        assert_eq!(merged[1].display_id(), "a");
    }

    #[test]
    fn test_equal_dates_sorted_by_time() {
        let remote_rides = vec![
            remote("early", "2024-12-11T08:00:00", "Homer Simpson"),
            remote("late", "2024-12-11T22:15:00", "Homer Simpson"),
        ];
        let merged = merge_history(&[], &remote_rides);

        assert_eq!(merged[0].display_id(), "late");
        assert_eq!(merged[1].display_id(), "early");
    }

    #[test]
    fn test_missing_dates_sort_last() {
        let locals = vec![local(1, None)];
        let remote_rides = vec![remote("a", "2020-01-01T00:00:00", "Homer Simpson")];
        let merged = merge_history(&locals, &remote_rides);

        assert_eq!(merged[0].display_id(), "a");
        assert!(merged[1].is_local());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let locals = vec![local(1, Some("2024-12-11T10:00:00")), local(2, None)];
        let remote_rides = vec![
            remote("a", "2024-12-11T10:00:00", "Homer Simpson"),
            remote("b", "2024-12-12T07:30:00", "James Bond"),
        ];

        let first = merge_history(&locals, &remote_rides);
        let second = merge_history(&locals, &remote_rides);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_input_order() {
        // same timestamp on both sides: local precedes remote because local
        // records are concatenated first
        let locals = vec![local(1, Some("2024-12-11T10:00:00"))];
        let remote_rides = vec![remote("a", "2024-12-11T10:00:00", "Homer Simpson")];
        let merged = merge_history(&locals, &remote_rides);

        assert!(merged[0].is_local());
        assert!(!merged[1].is_local());
    }

    #[test]
    fn test_no_deduplication_across_sources() {
        let locals = vec![local(1, Some("2024-12-11T10:00:00"))];
        let remote_rides = vec![remote("1", "2024-12-11T10:00:00", "Homer Simpson")];
        assert_eq!(merge_history(&locals, &remote_rides).len(), 2);
    }

    #[test]
    fn test_driver_filter_is_case_insensitive() {
        let rides = vec![
            remote("a", "2024-12-11T10:00:00", "Homer Simpson"),
            remote("b", "2024-12-11T11:00:00", "James Bond"),
        ];
        let filtered = filter_by_driver_name(rides, "homer simpson");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
    }

    prop_compose! {
        fn arb_timestamp()(
            year in 2020u32..2030,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
        ) -> String {
            format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:00")
        }
    }

    proptest! {
        #[test]
        fn prop_merge_is_deterministic(dates in prop::collection::vec(arb_timestamp(), 0..12)) {
            let remote_rides: Vec<RemoteRide> = dates
                .iter()
                .enumerate()
                .map(|(i, date)| remote(&format!("r{i}"), date, "Homer Simpson"))
                .collect();
            let locals = vec![local(1, None), local(2, Some("2024-06-01T12:00:00"))];

            let first = merge_history(&locals, &remote_rides);
            let second = merge_history(&locals, &remote_rides);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_sorted_descending_with_nulls_last(dates in prop::collection::vec(arb_timestamp(), 0..12)) {
            let remote_rides: Vec<RemoteRide> = dates
                .iter()
                .enumerate()
                .map(|(i, date)| remote(&format!("r{i}"), date, "Homer Simpson"))
                .collect();
            let locals = vec![local(1, None)];

            let merged = merge_history(&locals, &remote_rides);
            for pair in merged.windows(2) {
                match (pair[0].sort_key(), pair[1].sort_key()) {
                    (Some(a), Some(b)) => prop_assert!(a >= b),
                    (Some(_), None) => {}
                    (None, None) => {}
                    (None, Some(_)) => prop_assert!(false, "dated item after undated item"),
                }
            }
        }
    }
}
