//! Repository for the metered load table.

use anyhow::{Context, Result};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use crate::domain::{coerce_value, compact_date, ActualObservation, DeliverySlot};
use crate::pipeline::DateRange;

#[derive(Debug, FromRow)]
struct LoadActRow {
    date: String,
    time: String,
    load_act: String,
}

/// Repository for actual load observations
pub struct ActualsRepository {
    pool: SqlitePool,
}

impl ActualsRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Fetch actual observations within an inclusive date window, ordered
    /// by delivery slot. Rows with unparseable slots are logged and
    /// skipped; unparseable values become `None`.
    pub async fn find_range(&self, range: DateRange, limit: i64) -> Result<Vec<ActualObservation>> {
        let rows: Vec<LoadActRow> = sqlx::query_as(
            r#"
            SELECT date, time, load_act
            FROM load_act
            WHERE date >= ? AND date <= ?
            ORDER BY date, time
            LIMIT ?
            "#,
        )
        .bind(compact_date(range.from))
        .bind(compact_date(range.to))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch load actuals")?;

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            match DeliverySlot::parse(&row.date, &row.time) {
                Ok(slot) => observations.push(ActualObservation {
                    slot,
                    value: coerce_value(&row.load_act),
                }),
                Err(e) => warn!(error = %e, date = %row.date, time = %row.time, "skipping malformed actual"),
            }
        }
        // text "time" sorts lexicographically; slot order is canonical
        observations.sort_by_key(|o| o.slot);

        debug!(count = observations.len(), "fetched load actuals");
        Ok(observations)
    }
}
