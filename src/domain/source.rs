//! The closed set of forecast sources and the series keys derived from it.
//!
//! Source identifiers used to be free-form object keys in the dashboard
//! contract; they are an enumerated type here so an unknown identifier is a
//! request-validation error instead of a silent null series.

use serde::{Serialize, Serializer};
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

/// Identifier of the actuals series. Accepted in a selection but never
/// scored as a forecast.
pub const ACTUALS_SERIES: &str = "load_act";

/// The four upstream forecasting methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
pub enum ForecastSource {
    #[strum(serialize = "d_load_fcst")]
    D,
    #[strum(serialize = "j_load_fcst")]
    J,
    #[strum(serialize = "mm_load_fcst")]
    Mm,
    #[strum(serialize = "mw_load_fcst")]
    Mw,
}

impl ForecastSource {
    /// Baseline table holding the current forecast per slot.
    pub fn table(&self) -> &'static str {
        match self {
            Self::D => "d_load_fcst",
            Self::J => "j_load_fcst",
            Self::Mm => "mm_load_fcst",
            Self::Mw => "mw_load_fcst",
        }
    }

    /// Append-only log holding every revision ever issued.
    pub fn revision_table(&self) -> &'static str {
        match self {
            Self::D => "d_load_fcst_full",
            Self::J => "j_load_fcst_full",
            Self::Mm => "mm_load_fcst_full",
            Self::Mw => "mw_load_fcst_full",
        }
    }
}

/// Rejection for identifiers outside the closed source set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown forecast source {0:?}")]
pub struct UnknownForecastSource(pub String);

/// One scored series: a source's current forecast, or its reconstructed
/// as-of snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    Baseline(ForecastSource),
    Historical(ForecastSource),
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline(source) => write!(f, "{source}"),
            Self::Historical(source) => write!(f, "historical_{source}"),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The forecast sources a caller selected, deduplicated, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSelection {
    sources: Vec<ForecastSource>,
}

impl SourceSelection {
    /// Validates raw identifiers against the closed set. `load_act` is
    /// tolerated (the actuals trace is always present in rows); anything
    /// else unknown rejects the whole request.
    pub fn parse<S: AsRef<str>>(ids: &[S]) -> Result<Self, UnknownForecastSource> {
        let mut sources = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if id == ACTUALS_SERIES {
                continue;
            }
            let source = id
                .parse::<ForecastSource>()
                .map_err(|_| UnknownForecastSource(id.to_string()))?;
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        Ok(Self { sources })
    }

    /// Every known source, for endpoints that do not take a selection.
    pub fn all() -> Self {
        Self {
            sources: ForecastSource::iter().collect(),
        }
    }

    pub fn sources(&self) -> &[ForecastSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The series keys to score for this selection.
    pub fn series_keys(&self, with_historical: bool) -> Vec<SeriesKey> {
        let mut keys: Vec<SeriesKey> = self.sources.iter().map(|&s| SeriesKey::Baseline(s)).collect();
        if with_historical {
            keys.extend(self.sources.iter().map(|&s| SeriesKey::Historical(s)));
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_identifiers_round_trip() {
        for source in ForecastSource::iter() {
            assert_eq!(source.to_string().parse::<ForecastSource>().unwrap(), source);
            assert_eq!(source.table(), source.to_string());
            assert!(source.revision_table().ends_with("_full"));
        }
    }

    #[test]
    fn selection_rejects_unknown_identifiers() {
        let err = SourceSelection::parse(&["d_load_fcst", "x_load_fcst"]).unwrap_err();
        assert_eq!(err, UnknownForecastSource("x_load_fcst".to_string()));
    }

    #[test]
    fn selection_tolerates_actuals_and_duplicates() {
        let sel = SourceSelection::parse(&["load_act", "d_load_fcst", "d_load_fcst", "j_load_fcst"]).unwrap();
        assert_eq!(sel.sources(), &[ForecastSource::D, ForecastSource::J]);
    }

    #[test]
    fn series_keys_include_historical_variants_on_demand() {
        let sel = SourceSelection::parse(&["d_load_fcst"]).unwrap();
        assert_eq!(sel.series_keys(false), vec![SeriesKey::Baseline(ForecastSource::D)]);
        assert_eq!(
            sel.series_keys(true),
            vec![
                SeriesKey::Baseline(ForecastSource::D),
                SeriesKey::Historical(ForecastSource::D)
            ]
        );
    }

    #[test]
    fn series_key_display_matches_wire_names() {
        assert_eq!(SeriesKey::Baseline(ForecastSource::Mm).to_string(), "mm_load_fcst");
        assert_eq!(
            SeriesKey::Historical(ForecastSource::Mw).to_string(),
            "historical_mw_load_fcst"
        );
    }
}
