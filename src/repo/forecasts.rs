//! Repository for the per-method forecast tables and their append-only
//! revision logs.

use anyhow::{Context, Result};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use crate::domain::{
    coerce_value, compact_date, parse_revision_instant, DeliverySlot, ForecastRecord, ForecastSource,
};
use crate::pipeline::DateRange;

#[derive(Debug, FromRow)]
struct ForecastRow {
    date: String,
    time: String,
    load_fcst: String,
    revision: Option<String>,
}

/// Repository for forecast records across the closed source set
pub struct ForecastRepository {
    pool: SqlitePool,
}

impl ForecastRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Fetch the current baseline forecasts of one source within an
    /// inclusive date window.
    pub async fn find_range(
        &self,
        source: ForecastSource,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ForecastRecord>> {
        self.fetch(source.table(), range, limit).await
    }

    /// Fetch the full revision log of one source within an inclusive date
    /// window (keyed by delivery date; revision stamps may lie outside it).
    pub async fn find_revisions(
        &self,
        source: ForecastSource,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ForecastRecord>> {
        self.fetch(source.revision_table(), range, limit).await
    }

    async fn fetch(&self, table: &str, range: DateRange, limit: i64) -> Result<Vec<ForecastRecord>> {
        // table names come from the closed ForecastSource set, never from
        // request input
        let sql = format!(
            "SELECT date, time, load_fcst, revision \
             FROM {table} \
             WHERE date >= ? AND date <= ? \
             ORDER BY date, time, id \
             LIMIT ?"
        );
        let rows: Vec<ForecastRow> = sqlx::query_as(&sql)
            .bind(compact_date(range.from))
            .bind(compact_date(range.to))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to fetch forecasts from {table}"))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let slot = match DeliverySlot::parse(&row.date, &row.time) {
                Ok(slot) => slot,
                Err(e) => {
                    warn!(error = %e, table, date = %row.date, time = %row.time, "skipping malformed forecast record");
                    continue;
                }
            };
            let revision = match row.revision.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                None => None,
                Some(raw) => match parse_revision_instant(raw) {
                    Ok(stamp) => Some(stamp),
                    Err(e) => {
                        warn!(error = %e, table, "skipping record with malformed revision stamp");
                        continue;
                    }
                },
            };
            records.push(ForecastRecord {
                slot,
                value: coerce_value(&row.load_fcst),
                revision,
            });
        }

        debug!(count = records.len(), table, "fetched forecast records");
        Ok(records)
    }
}
