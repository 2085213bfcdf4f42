//! Externally-owned records as they exist after boundary normalization.

use chrono::{DateTime, Utc};

use super::slot::DeliverySlot;

/// One metered load reading. Source of truth; never revised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActualObservation {
    pub slot: DeliverySlot,
    /// `None` when the stored text failed numeric coercion.
    pub value: Option<f64>,
}

/// One forecast value for a delivery slot, possibly one of several
/// revisions issued at different times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRecord {
    pub slot: DeliverySlot,
    pub value: Option<f64>,
    /// Issue time of this revision. `None` marks the unconditional
    /// baseline record.
    pub revision: Option<DateTime<Utc>>,
}

/// Coerces a text-encoded number from the upstream tables. Failure is data
/// absence, not an error.
pub fn coerce_value(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}
