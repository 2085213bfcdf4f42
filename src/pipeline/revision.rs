//! As-of reconstruction over append-only forecast revision logs.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{DeliverySlot, ForecastRecord, SlotTime};

use super::align::SeriesValues;

/// Parameters of a historical snapshot: the forecast as it stood at
/// `cutoff` on the day `days_ahead` before delivery. `days_ahead = 0`
/// means same day, before cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSpec {
    pub days_ahead: u32,
    pub cutoff: SlotTime,
}

impl SnapshotSpec {
    pub fn new(days_ahead: u32, cutoff: SlotTime) -> Self {
        Self { days_ahead, cutoff }
    }

    /// The latest instant a revision may carry and still be visible in
    /// this snapshot for `slot`.
    pub fn target_instant(&self, slot: DeliverySlot) -> DateTime<Utc> {
        let date = slot.date - Duration::days(i64::from(self.days_ahead));
        Utc.from_utc_datetime(&date.and_time(self.cutoff.naive()))
    }

    /// Selects the applicable revision for `slot`: the latest revisioned
    /// record issued on or before the target instant. Records without a
    /// revision stamp never participate, so a baseline-only record set has
    /// no historical variant. Ties on the stamp go to the record stored
    /// last (implementation-defined, matching log append order).
    pub fn resolve(&self, slot: DeliverySlot, revisions: &[ForecastRecord]) -> Option<f64> {
        let target = self.target_instant(slot);
        let mut best: Option<(DateTime<Utc>, Option<f64>)> = None;
        for record in revisions {
            let Some(stamp) = record.revision else { continue };
            if stamp > target {
                continue;
            }
            if best.map_or(true, |(current, _)| stamp >= current) {
                best = Some((stamp, record.value));
            }
        }
        best.and_then(|(_, value)| value)
    }
}

/// Resolves a whole revision log against a set of delivery slots, producing
/// one optional snapshot value per slot.
pub fn resolve_series(spec: SnapshotSpec, slots: &[DeliverySlot], log: &[ForecastRecord]) -> SeriesValues {
    let mut by_slot: HashMap<DeliverySlot, Vec<ForecastRecord>> = HashMap::new();
    for record in log {
        by_slot.entry(record.slot).or_default().push(*record);
    }
    slots
        .iter()
        .map(|&slot| {
            let value = by_slot
                .get(&slot)
                .and_then(|revisions| spec.resolve(slot, revisions));
            (slot, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(date: &str, time: &str) -> DeliverySlot {
        DeliverySlot::parse(date, time).unwrap()
    }

    fn stamp(s: &str) -> DateTime<Utc> {
        crate::domain::parse_revision_instant(s).unwrap()
    }

    fn record(slot: DeliverySlot, value: f64, revision: Option<DateTime<Utc>>) -> ForecastRecord {
        ForecastRecord {
            slot,
            value: Some(value),
            revision,
        }
    }

    #[test]
    fn picks_latest_revision_at_or_before_target() {
        // Delivery 2024-01-05 12:00, two days ahead at midnight:
        // target is 2024-01-03T00:00, so the 01-02 23:00 revision wins.
        let delivery = slot("20240105", "12");
        let spec = SnapshotSpec::new(2, SlotTime::new(0, 0).unwrap());
        assert_eq!(
            spec.target_instant(delivery),
            stamp("2024-01-03 00:00")
        );

        let revisions = vec![
            record(delivery, 90.0, Some(stamp("2024-01-01 10:00"))),
            record(delivery, 95.0, Some(stamp("2024-01-02 23:00"))),
            record(delivery, 99.0, Some(stamp("2024-01-04 08:00"))),
        ];
        assert_eq!(spec.resolve(delivery, &revisions), Some(95.0));
    }

    #[test]
    fn no_qualifying_revision_is_none_not_a_fallback() {
        let delivery = slot("20240105", "12");
        let spec = SnapshotSpec::new(2, SlotTime::new(0, 0).unwrap());
        let revisions = vec![record(delivery, 99.0, Some(stamp("2024-01-04 08:00")))];
        assert_eq!(spec.resolve(delivery, &revisions), None);
    }

    #[test]
    fn baseline_only_records_have_no_historical_variant() {
        let delivery = slot("20240105", "12");
        let spec = SnapshotSpec::new(1, SlotTime::new(9, 0).unwrap());
        let revisions = vec![record(delivery, 101.0, None), record(delivery, 102.0, None)];
        assert_eq!(spec.resolve(delivery, &revisions), None);
    }

    #[test]
    fn zero_days_ahead_means_same_day_before_cutoff() {
        let delivery = slot("20240105", "12");
        let spec = SnapshotSpec::new(0, SlotTime::new(9, 0).unwrap());
        let revisions = vec![
            record(delivery, 90.0, Some(stamp("2024-01-05 08:59"))),
            record(delivery, 95.0, Some(stamp("2024-01-05 09:01"))),
        ];
        assert_eq!(spec.resolve(delivery, &revisions), Some(90.0));
    }

    #[test]
    fn stamp_ties_go_to_latest_stored_record() {
        let delivery = slot("20240105", "12");
        let spec = SnapshotSpec::new(1, SlotTime::new(12, 0).unwrap());
        let tie = stamp("2024-01-04 06:00");
        let revisions = vec![record(delivery, 1.0, Some(tie)), record(delivery, 2.0, Some(tie))];
        assert_eq!(spec.resolve(delivery, &revisions), Some(2.0));
    }

    #[test]
    fn resolve_series_keys_every_requested_slot() {
        let d1 = slot("20240105", "12");
        let d2 = slot("20240105", "13");
        let spec = SnapshotSpec::new(1, SlotTime::new(0, 0).unwrap());
        let log = vec![record(d1, 88.0, Some(stamp("2024-01-03 20:00")))];

        let resolved = resolve_series(spec, &[d1, d2], &log);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&d1], Some(88.0));
        assert_eq!(resolved[&d2], None);
    }
}
