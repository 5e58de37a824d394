//! APG Imbalance API Payload
//!
//! ## Overview
//!
//! Austrian Power Grid publishes the control-area imbalance once per minute.
//! A window request returns one row per minute:
//!
//! ```text
//! { "ResponseData": {
//!     "Description": "...",
//!     "ValueColumns": [ { "InternalName": "..." } ],
//!     "ValueRows": [
//!       { "DF": "06.05.2025", "TF": "12:30", "DT": "06.05.2025", "TT": "12:31",
//!         "V": [ { "V": 123.45, "E": false, "M": false } ] } ] } }
//! ```
//!
//! Only the first value of a row is used. Rows whose first value is absent
//! (the current, not yet settled minute) are skipped.
//!
//! ## Time
//!
//! Row dates are `DD.MM.YYYY` and times `HH:MM`. Window bounds in the
//! request path are `YYYY-MM-DDTHHMMSS`. All of them are read and written
//! as UTC.

use chrono::{NaiveDateTime, TimeZone, Utc};
use gridguard_core::{RawObservation, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public endpoint for one-minute imbalance data
pub const BASE_URL: &str = "https://transparency.apg.at/api/v1/DRZ/Data/German/PT1M";

/// Query parameters the endpoint expects alongside the window path
pub const DEFAULT_QUERY: [(&str, &str); 2] = [
    ("p_drzMode", "CurrentBalancingState"),
    ("resolution", "PT1M"),
];

const ROW_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const API_DATE_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// Payload decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid imbalance payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Millisecond timestamp outside chrono's representable range
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(Timestamp),
}

/// Top-level response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceResponse {
    #[serde(rename = "ResponseData")]
    pub response_data: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "ValueColumns")]
    pub value_columns: Vec<ValueColumn>,
    #[serde(rename = "ValueRows")]
    pub value_rows: Vec<ValueRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueColumn {
    #[serde(rename = "InternalName")]
    pub internal_name: String,
}

/// One minute of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    /// Date from, `DD.MM.YYYY`
    #[serde(rename = "DF")]
    pub date_from: String,
    /// Time from, `HH:MM`
    #[serde(rename = "TF")]
    pub time_from: String,
    #[serde(rename = "DT")]
    pub date_to: String,
    #[serde(rename = "TT")]
    pub time_to: String,
    #[serde(rename = "V")]
    pub values: Vec<ValueItem>,
}

/// A cell; `V` is null for minutes not yet published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueItem {
    #[serde(rename = "V", default)]
    pub value: Option<f64>,
    /// Flags delivered with the value, passed through untouched
    #[serde(rename = "E")]
    pub e: bool,
    #[serde(rename = "M")]
    pub m: bool,
}

impl ValueRow {
    /// Start of the row's minute; `None` if the date or time is malformed
    pub fn timestamp(&self) -> Option<Timestamp> {
        parse_row_time(&self.date_from, &self.time_from)
    }

    /// End of the row's minute
    pub fn end_timestamp(&self) -> Option<Timestamp> {
        parse_row_time(&self.date_to, &self.time_to)
    }

    /// `TF` as minutes since midnight
    pub fn minutes_from(&self) -> Option<u32> {
        minutes_of_day(&self.time_from)
    }

    /// `TT` as minutes since midnight
    pub fn minutes_to(&self) -> Option<u32> {
        minutes_of_day(&self.time_to)
    }

    /// First value of the row, if published
    pub fn value(&self) -> Option<f64> {
        self.values.first().and_then(|item| item.value)
    }
}

/// Parse a response body
pub fn decode(body: &str) -> Result<ImbalanceResponse, DecodeError> {
    Ok(serde_json::from_str(body)?)
}

/// Turn published rows into ingress records for `key`
///
/// Rows without a value are dropped here. A row whose time cannot be
/// parsed is kept with no timestamp, so the engine rejects it visibly
/// instead of it vanishing.
pub fn extract_observations(response: &ImbalanceResponse, key: &str) -> Vec<RawObservation> {
    response
        .response_data
        .value_rows
        .iter()
        .filter_map(|row| {
            let value = row.value()?;
            Some(RawObservation::new(key, row.timestamp(), Some(value)))
        })
        .collect()
}

/// Format a timestamp the way the request path expects
///
/// ```rust
/// use gridguard_connectors::apg::format_api_date;
///
/// // 2025-05-06T12:30:00Z
/// assert_eq!(format_api_date(1_746_534_600_000).unwrap(), "2025-05-06T123000");
/// ```
pub fn format_api_date(timestamp: Timestamp) -> Result<String, DecodeError> {
    let millis =
        i64::try_from(timestamp).map_err(|_| DecodeError::TimestampOutOfRange(timestamp))?;
    let datetime = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(DecodeError::TimestampOutOfRange(timestamp))?;

    Ok(datetime.format(API_DATE_FORMAT).to_string())
}

/// `<start>/<end>` path segment for a window request
pub fn window_path(start: Timestamp, end: Timestamp) -> Result<String, DecodeError> {
    Ok(format!("{}/{}", format_api_date(start)?, format_api_date(end)?))
}

fn parse_row_time(date: &str, time: &str) -> Option<Timestamp> {
    let naive =
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), ROW_TIME_FORMAT).ok()?;
    let millis = Utc.from_utc_datetime(&naive).timestamp_millis();
    Timestamp::try_from(millis).ok()
}

fn minutes_of_day(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}
