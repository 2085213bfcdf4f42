//! Canonical timestamp construction for delivery slots.
//!
//! The upstream tables encode dates as 8-digit `YYYYMMDD` strings and times
//! in two encodings: hour-only (`"9"`) and `HHMM` (`"0930"`). Every instant
//! used for comparison in the pipeline is built here, once, at the ingestion
//! boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt;
use thiserror::Error;

/// Errors raised while normalizing date/time encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("malformed date {0:?}: expected 8-digit YYYYMMDD")]
    MalformedDate(String),

    #[error("malformed time {0:?}: expected H, HH, HMM or HHMM within 00:00-23:59")]
    MalformedTime(String),

    #[error("malformed revision stamp {0:?}")]
    MalformedRevision(String),
}

/// Minute-resolution time of day within a delivery date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimestampError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimestampError::MalformedTime(format!("{hour:02}{minute:02}")))
    }

    /// Parses the two table encodings: 1-2 digits are an hour, 3-4 digits
    /// are `HMM`/`HHMM`. Anything else is malformed.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        let malformed = || TimestampError::MalformedTime(raw.to_string());
        let s = raw.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        match s.len() {
            1 | 2 => {
                let hour = s.parse().map_err(|_| malformed())?;
                Self::new(hour, 0).map_err(|_| malformed())
            }
            3 | 4 => {
                let (h, m) = s.split_at(s.len() - 2);
                let hour = h.parse().map_err(|_| malformed())?;
                let minute = m.parse().map_err(|_| malformed())?;
                Self::new(hour, minute).map_err(|_| malformed())
            }
            _ => Err(malformed()),
        }
    }

    /// Parses the `"HH:MM"` form used by the as-of cutoff parameter.
    pub fn parse_hh_mm(raw: &str) -> Result<Self, TimestampError> {
        let malformed = || TimestampError::MalformedTime(raw.to_string());
        let (h, m) = raw.trim().split_once(':').ok_or_else(malformed)?;
        let hour = h.parse().map_err(|_| malformed())?;
        let minute = m.parse().map_err(|_| malformed())?;
        Self::new(hour, minute).map_err(|_| malformed())
    }

    pub fn naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// One delivery slot on the shared timeline. Key for all joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeliverySlot {
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl DeliverySlot {
    pub fn parse(date: &str, time: &str) -> Result<Self, TimestampError> {
        Ok(Self {
            date: parse_slot_date(date)?,
            time: SlotTime::parse(time)?,
        })
    }

    /// The canonical UTC instant of this slot. Every comparison against a
    /// revision stamp goes through here.
    pub fn instant(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(self.time.naive()))
    }
}

impl fmt::Display for DeliverySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Parses an 8-digit `YYYYMMDD` date string.
pub fn parse_slot_date(raw: &str) -> Result<NaiveDate, TimestampError> {
    let s = raw.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::MalformedDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| TimestampError::MalformedDate(raw.to_string()))
}

/// Renders a date back to the upstream 8-digit encoding.
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Revision stamps arrive as text in a handful of encodings (RFC 3339,
/// `YYYY-MM-DD HH:MM[:SS]`, 12-digit `YYYYMMDDHHMM`). Normalized here once;
/// naive stamps are taken as UTC.
pub fn parse_revision_instant(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y%m%d%H%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(TimestampError::MalformedRevision(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("9", 9, 0)]
    #[case("09", 9, 0)]
    #[case("0", 0, 0)]
    #[case("23", 23, 0)]
    #[case("930", 9, 30)]
    #[case("0930", 9, 30)]
    #[case("2359", 23, 59)]
    fn slot_time_accepts_both_encodings(#[case] raw: &str, #[case] hour: u32, #[case] minute: u32) {
        assert_eq!(SlotTime::parse(raw).unwrap(), SlotTime::new(hour, minute).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("24")]
    #[case("0960")]
    #[case("2400")]
    #[case("12345")]
    #[case("9a")]
    #[case("-1")]
    fn slot_time_rejects_malformed(#[case] raw: &str) {
        assert!(matches!(SlotTime::parse(raw), Err(TimestampError::MalformedTime(_))));
    }

    #[test]
    fn cutoff_time_parses_hh_mm() {
        assert_eq!(SlotTime::parse_hh_mm("09:00").unwrap(), SlotTime::new(9, 0).unwrap());
        assert_eq!(SlotTime::parse_hh_mm("0:5").unwrap(), SlotTime::new(0, 5).unwrap());
        assert!(SlotTime::parse_hh_mm("0900").is_err());
        assert!(SlotTime::parse_hh_mm("25:00").is_err());
    }

    #[test]
    fn slot_date_requires_eight_digits() {
        assert_eq!(
            parse_slot_date("20240105").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert!(parse_slot_date("2024015").is_err());
        assert!(parse_slot_date("2024-01-05").is_err());
        assert!(parse_slot_date("20241301").is_err());
    }

    #[test]
    fn slot_instant_is_utc() {
        let slot = DeliverySlot::parse("20240105", "1230").unwrap();
        assert_eq!(slot.instant().to_rfc3339(), "2024-01-05T12:30:00+00:00");
    }

    #[test]
    fn compact_date_round_trips() {
        let date = parse_slot_date("20240229").unwrap();
        assert_eq!(compact_date(date), "20240229");
    }

    #[rstest]
    #[case("2024-01-02T23:00:00Z")]
    #[case("2024-01-02T23:00:00+00:00")]
    #[case("2024-01-02 23:00:00")]
    #[case("2024-01-02 23:00")]
    #[case("202401022300")]
    fn revision_stamp_encodings_normalize_identically(#[case] raw: &str) {
        let ts = parse_revision_instant(raw).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-02T23:00:00+00:00");
    }

    #[test]
    fn revision_stamp_rejects_garbage() {
        assert!(parse_revision_instant("yesterday").is_err());
        assert!(parse_revision_instant("").is_err());
    }
}
