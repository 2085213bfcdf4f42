pub mod record;
pub mod slot;
pub mod source;

pub use record::{coerce_value, ActualObservation, ForecastRecord};
pub use slot::{compact_date, parse_revision_instant, parse_slot_date, DeliverySlot, SlotTime, TimestampError};
pub use source::{ForecastSource, SeriesKey, SourceSelection, UnknownForecastSource, ACTUALS_SERIES};
