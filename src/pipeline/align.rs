//! Joins actuals and forecast series into one row per delivery slot.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::{compact_date, ActualObservation, DeliverySlot, ForecastRecord, ForecastSource, SeriesKey};

/// Per-slot values of a single series, keyed for exact-slot lookup.
pub type SeriesValues = HashMap<DeliverySlot, Option<f64>>;

/// Builds the slot lookup for a baseline fetch. A duplicate slot keeps the
/// record stored last.
pub fn baseline_values(records: &[ForecastRecord]) -> SeriesValues {
    records.iter().map(|r| (r.slot, r.value)).collect()
}

/// One row of the unified timeline: the actual load for a delivery slot plus
/// every selected forecast series at that slot. Unselected sources are
/// absent from `values` entirely, keeping payloads proportional to the
/// selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub slot: DeliverySlot,
    /// Missing actuals are zero-filled; downstream of this point the chart
    /// contract cannot distinguish "no reading" from zero load.
    pub actual: f64,
    pub values: BTreeMap<SeriesKey, Option<f64>>,
}

impl AlignedRow {
    pub fn value(&self, key: SeriesKey) -> Option<f64> {
        self.values.get(&key).copied().flatten()
    }
}

impl Serialize for AlignedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 4))?;
        map.serialize_entry("date", &compact_date(self.slot.date))?;
        map.serialize_entry("time", &self.slot.time.to_string())?;
        map.serialize_entry("datetime", &self.slot.instant())?;
        map.serialize_entry("load_act", &self.actual)?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The forecast series participating in one alignment pass, each keyed by
/// slot.
#[derive(Debug, Default)]
pub struct AlignmentInput {
    pub baseline: Vec<(ForecastSource, SeriesValues)>,
    pub historical: Vec<(ForecastSource, SeriesValues)>,
}

/// Produces one row per actuals slot, in actuals order. The actuals window
/// defines the timeline: forecast-only slots are dropped.
pub fn align(actuals: &[ActualObservation], input: &AlignmentInput) -> Vec<AlignedRow> {
    actuals
        .iter()
        .map(|actual| {
            let mut values = BTreeMap::new();
            for (source, series) in &input.baseline {
                values.insert(
                    SeriesKey::Baseline(*source),
                    series.get(&actual.slot).copied().flatten(),
                );
            }
            for (source, series) in &input.historical {
                values.insert(
                    SeriesKey::Historical(*source),
                    series.get(&actual.slot).copied().flatten(),
                );
            }
            AlignedRow {
                slot: actual.slot,
                actual: actual.value.unwrap_or(0.0),
                values,
            }
        })
        .collect()
}
