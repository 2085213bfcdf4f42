use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::domain::{ActualObservation, ForecastRecord, ForecastSource};
use crate::pipeline::{DateRange, LoadStore};

pub mod actuals;
pub mod forecasts;
pub mod sqlite;

pub use actuals::ActualsRepository;
pub use forecasts::ForecastRepository;

/// Container for data access objects backed by the shared pool.
pub struct Repositories {
    pub db: sqlite::SqliteRepo,
    fetch_limit: i64,
}

impl Repositories {
    pub async fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            db: sqlite::SqliteRepo::connect(&cfg.db.url).await?,
            fetch_limit: cfg.forecast.fetch_limit,
        })
    }
}

#[async_trait]
impl LoadStore for Repositories {
    async fn fetch_actuals(&self, range: DateRange) -> Result<Vec<ActualObservation>> {
        self.db.actuals().find_range(range, self.fetch_limit).await
    }

    async fn fetch_baseline(
        &self,
        source: ForecastSource,
        range: DateRange,
    ) -> Result<Vec<ForecastRecord>> {
        self.db.forecasts().find_range(source, range, self.fetch_limit).await
    }

    async fn fetch_revisions(
        &self,
        source: ForecastSource,
        range: DateRange,
    ) -> Result<Vec<ForecastRecord>> {
        self.db.forecasts().find_revisions(source, range, self.fetch_limit).await
    }
}
