use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use super::actuals::ActualsRepository;
use super::forecasts::ForecastRepository;

pub struct SqliteRepo {
    pub pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Get an actuals repository
    pub fn actuals(&self) -> ActualsRepository {
        ActualsRepository::new(&self.pool)
    }

    /// Get a forecast repository
    pub fn forecasts(&self) -> ForecastRepository {
        ForecastRepository::new(&self.pool)
    }
}
