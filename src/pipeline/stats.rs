//! Accuracy scoring over aligned series.
//!
//! RMSE and MAPE are computed over valid pairs only: both values present
//! and finite, and for MAPE additionally a non-zero actual. Zero valid
//! pairs yield `NaN` - the "insufficient data" signal, propagated to the
//! caller and rendered as `null` in JSON, never an error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::domain::SeriesKey;

use super::align::AlignedRow;

/// Accuracy figures for one series over the requested window.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStatistics {
    #[serde(rename = "overallRMSE")]
    pub overall_rmse: f64,
    #[serde(rename = "overallMAPE")]
    pub overall_mape: f64,
    #[serde(rename = "dailyRMSE")]
    pub daily_rmse: BTreeMap<NaiveDate, f64>,
    #[serde(rename = "dailyMAPE")]
    pub daily_mape: BTreeMap<NaiveDate, f64>,
}

/// One entry per scored series key.
pub type StatisticsReport = BTreeMap<SeriesKey, SeriesStatistics>;

/// Root mean square error over valid pairs.
pub fn rmse<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, Option<f64>)>,
{
    let (sum, count) = pairs
        .into_iter()
        .filter_map(|(actual, predicted)| {
            let predicted = predicted?;
            (actual.is_finite() && predicted.is_finite()).then(|| (actual - predicted).powi(2))
        })
        .fold((0.0, 0u64), |(sum, count), sq| (sum + sq, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        (sum / count as f64).sqrt()
    }
}

/// Mean absolute percentage error over valid pairs, excluding zero actuals.
pub fn mape<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, Option<f64>)>,
{
    let (sum, count) = pairs
        .into_iter()
        .filter_map(|(actual, predicted)| {
            let predicted = predicted?;
            (actual.is_finite() && predicted.is_finite() && actual != 0.0)
                .then(|| ((actual - predicted) / actual).abs())
        })
        .fold((0.0, 0u64), |(sum, count), pct| (sum + pct, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64 * 100.0
    }
}

/// Scores every requested series key, overall and per calendar day. The
/// daily grouping uses the slot's date component, not a date re-derived
/// from the instant.
pub fn compute_statistics(rows: &[AlignedRow], keys: &[SeriesKey]) -> StatisticsReport {
    let by_day: BTreeMap<NaiveDate, Vec<&AlignedRow>> = rows
        .iter()
        .map(|row| (row.slot.date, row))
        .into_group_map()
        .into_iter()
        .collect();

    keys.iter()
        .map(|&key| {
            let statistics = SeriesStatistics {
                overall_rmse: rmse(series_pairs(rows, key)),
                overall_mape: mape(series_pairs(rows, key)),
                daily_rmse: by_day
                    .iter()
                    .map(|(&date, day)| (date, rmse(day.iter().map(|r| (r.actual, r.value(key))))))
                    .collect(),
                daily_mape: by_day
                    .iter()
                    .map(|(&date, day)| (date, mape(day.iter().map(|r| (r.actual, r.value(key))))))
                    .collect(),
            };
            (key, statistics)
        })
        .collect()
}

fn series_pairs(rows: &[AlignedRow], key: SeriesKey) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
    rows.iter().map(move |row| (row.actual, row.value(key)))
}
