//! The forecast pipeline: range-bounded fetch, snapshot resolution,
//! alignment, accuracy scoring.
//!
//! This is the one canonical implementation of the fetch+align+score flow;
//! historical mode and source selection are configuration of this pipeline,
//! not parallel code paths.

pub mod align;
pub mod revision;
pub mod stats;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::domain::{
    ActualObservation, DeliverySlot, ForecastRecord, ForecastSource, SlotTime, SourceSelection,
    UnknownForecastSource,
};
use crate::repo::Repositories;

use align::{align, baseline_values, AlignmentInput};
use revision::{resolve_series, SnapshotSpec};
use stats::{compute_statistics, StatisticsReport};

pub use align::AlignedRow;

/// Inclusive calendar-date window resolved from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Read access to the externally-owned load tables. The pipeline never
/// writes. Implementations must return actuals ordered by delivery slot and
/// revision logs in storage order.
#[async_trait]
pub trait LoadStore: Send + Sync {
    async fn fetch_actuals(&self, range: DateRange) -> Result<Vec<ActualObservation>>;
    async fn fetch_baseline(&self, source: ForecastSource, range: DateRange) -> Result<Vec<ForecastRecord>>;
    async fn fetch_revisions(&self, source: ForecastSource, range: DateRange) -> Result<Vec<ForecastRecord>>;
}

/// The service contract for one processing request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub date_range: DateRange,
    pub selected_forecasts: Vec<String>,
    #[serde(default)]
    pub show_historical_data: bool,
    #[serde(default)]
    pub historical_days_ahead: Option<u32>,
    /// `"HH:MM"` cutoff for the as-of snapshot.
    #[serde(default)]
    pub historical_time: Option<String>,
}

/// Statistics either computed or degraded. A degraded result never discards
/// the aligned rows already produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatisticsOutcome {
    Ready(StatisticsReport),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub aligned_rows: Vec<AlignedRow>,
    pub statistics: StatisticsOutcome,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    UnknownSource(#[from] UnknownForecastSource),

    #[error("invalid historical cutoff time {0:?}")]
    InvalidCutoff(String),

    #[error("fetch failed: {0}")]
    Fetch(#[source] anyhow::Error),
}

/// Snapshot parameters applied when a historical request omits them.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotDefaults {
    pub days_ahead: u32,
    pub cutoff: SlotTime,
}

pub struct ForecastPipeline {
    store: Arc<dyn LoadStore>,
    defaults: SnapshotDefaults,
}

impl ForecastPipeline {
    pub fn new(store: Arc<dyn LoadStore>, defaults: SnapshotDefaults) -> Self {
        Self { store, defaults }
    }

    /// Runs the full pipeline for one request: validate, fetch, resolve
    /// snapshots, align, score. Fetch errors fail the whole request;
    /// statistics failure degrades the response instead.
    pub async fn process(&self, request: ProcessRequest) -> Result<ProcessResponse, PipelineError> {
        let selection = SourceSelection::parse(&request.selected_forecasts)?;

        let snapshot = if request.show_historical_data {
            let days_ahead = request.historical_days_ahead.unwrap_or(self.defaults.days_ahead);
            let cutoff = match request.historical_time.as_deref() {
                Some(raw) => SlotTime::parse_hh_mm(raw)
                    .map_err(|_| PipelineError::InvalidCutoff(raw.to_string()))?,
                None => self.defaults.cutoff,
            };
            Some(SnapshotSpec::new(days_ahead, cutoff))
        } else {
            None
        };

        let rows = self.fetch_aligned(request.date_range, &selection, snapshot).await?;

        let keys = selection.series_keys(snapshot.is_some());
        let statistics = match catch_unwind(AssertUnwindSafe(|| compute_statistics(&rows, &keys))) {
            Ok(report) => StatisticsOutcome::Ready(report),
            Err(_) => {
                error!("statistics computation failed, returning rows without scores");
                StatisticsOutcome::Failed {
                    error: "statistics computation failed".to_string(),
                }
            }
        };

        info!(rows = rows.len(), series = keys.len(), "forecast request processed");
        Ok(ProcessResponse {
            aligned_rows: rows,
            statistics,
        })
    }

    /// Baseline-only alignment for the paged data endpoint.
    pub async fn baseline_rows(
        &self,
        range: DateRange,
        selection: &SourceSelection,
    ) -> Result<Vec<AlignedRow>, PipelineError> {
        self.fetch_aligned(range, selection, None).await
    }

    async fn fetch_aligned(
        &self,
        range: DateRange,
        selection: &SourceSelection,
        snapshot: Option<SnapshotSpec>,
    ) -> Result<Vec<AlignedRow>, PipelineError> {
        let store = self.store.as_ref();

        // Fan out one fetch per series and join before aligning: a partial
        // row set would corrupt the shared slot key space, so any fetch
        // error fails the request.
        let actuals_fut = store.fetch_actuals(range);
        let baselines_fut = try_join_all(selection.sources().iter().map(|&source| async move {
            let records = store.fetch_baseline(source, range).await?;
            Ok::<_, anyhow::Error>((source, records))
        }));
        let revisions_fut = async {
            if snapshot.is_none() {
                return Ok(Vec::new());
            }
            try_join_all(selection.sources().iter().map(|&source| async move {
                let log = store.fetch_revisions(source, range).await?;
                Ok::<_, anyhow::Error>((source, log))
            }))
            .await
        };

        let (actuals, baselines, revision_logs) =
            futures::try_join!(actuals_fut, baselines_fut, revisions_fut).map_err(PipelineError::Fetch)?;

        let slots: Vec<DeliverySlot> = actuals.iter().map(|a| a.slot).collect();
        let mut input = AlignmentInput::default();
        for (source, records) in &baselines {
            input.baseline.push((*source, baseline_values(records)));
        }
        if let Some(spec) = snapshot {
            for (source, log) in &revision_logs {
                input.historical.push((*source, resolve_series(spec, &slots, log)));
            }
        }

        debug!(
            rows = actuals.len(),
            sources = selection.sources().len(),
            historical = snapshot.is_some(),
            "aligning forecast series"
        );
        Ok(align(&actuals, &input))
    }
}

/// Shared per-process state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub pipeline: Arc<ForecastPipeline>,
    pub repos: Arc<Repositories>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let repos = Arc::new(Repositories::new(&cfg).await?);

        let cutoff = SlotTime::parse_hh_mm(&cfg.forecast.default_cutoff)
            .map_err(|e| anyhow::anyhow!("invalid forecast.default_cutoff: {e}"))?;
        let defaults = SnapshotDefaults {
            days_ahead: cfg.forecast.default_days_ahead,
            cutoff,
        };

        let pipeline = Arc::new(ForecastPipeline::new(repos.clone() as Arc<dyn LoadStore>, defaults));

        Ok(Self {
            cfg,
            pipeline,
            repos,
        })
    }
}
