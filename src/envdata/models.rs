use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Closed interval of Unix seconds.
///
/// `from <= to` is expected but not enforced; the env-server rejects
/// ranges shorter than one second with `400 Bad Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    #[must_use]
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Range ending now and reaching `span` into the past, or `None` if
    /// the start falls outside the representable date range.
    #[must_use]
    pub fn last(span: Duration) -> Option<Self> {
        let now = Utc::now();
        let from = now.checked_sub_signed(span)?;
        Some(Self {
            from: from.timestamp(),
            to: now.timestamp(),
        })
    }

    /// Length of the range, saturating at the `i64` bounds.
    #[must_use]
    pub fn span_secs(&self) -> i64 {
        self.to.saturating_sub(self.from)
    }

    /// Aggregation the server applies to a query over this range; `None`
    /// when the server would reject the range.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        Resolution::for_span(self.span_secs())
    }
}

/// Server-side bucketing of samples, chosen from the queried span so a
/// response stays around a thousand points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Raw,
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl Resolution {
    const DAY: i64 = 24 * 60 * 60;
    const YEAR: i64 = 365 * Self::DAY;

    const RAW_LIMIT: i64 = Self::DAY * 7 / 2;
    const HOURLY_LIMIT: i64 = Self::DAY * 40;
    const DAILY_LIMIT: i64 = Self::YEAR * 27 / 10;
    const MONTHLY_LIMIT: i64 = Self::YEAR * 83;

    /// Bucketing for a span. Spans under one second are answered with
    /// `400 Bad Request` and have no resolution.
    #[must_use]
    pub fn for_span(span_secs: i64) -> Option<Self> {
        match span_secs {
            s if s < 1 => None,
            s if s < Self::RAW_LIMIT => Some(Self::Raw),
            s if s < Self::HOURLY_LIMIT => Some(Self::Hourly),
            s if s < Self::DAILY_LIMIT => Some(Self::Daily),
            s if s < Self::MONTHLY_LIMIT => Some(Self::Monthly),
            _ => Some(Self::Yearly),
        }
    }
}

/// One logical time-series: a location/sensor pair over a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    pub location: String,
    pub sensor: String,
    pub range: TimeRange,
}

impl SeriesQuery {
    pub fn new(location: impl Into<String>, sensor: impl Into<String>, range: TimeRange) -> Self {
        Self {
            location: location.into(),
            sensor: sensor.into(),
            range,
        }
    }

    /// Legend label for the series this query produces.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.location, self.sensor)
    }
}

/// Body of `POST /api/v0/get_data`
#[derive(Debug, Clone, Serialize)]
pub struct GetDataRequest<'a> {
    pub unix_timestamp_from: i64,
    pub unix_timestamp_to: i64,
    pub location: &'a str,
    pub sensor: &'a str,
}

impl<'a> From<&'a SeriesQuery> for GetDataRequest<'a> {
    fn from(query: &'a SeriesQuery) -> Self {
        Self {
            unix_timestamp_from: query.range.from,
            unix_timestamp_to: query.range.to,
            location: &query.location,
            sensor: &query.sensor,
        }
    }
}

/// A single sample returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct DataPoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Wire shape of a sample: `{"ts": ..., "value": ...}`.
#[derive(Debug, Clone, Deserialize)]
struct RawMeasurement {
    ts: RawTimestamp,
    value: f64,
}

/// `ts` is integer seconds, but the env-server formats bucket starts as
/// RFC 3339 strings (`2024-01-01T00:00:00Z`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Unix(i64),
    Fractional(f64),
    Text(String),
}

impl TryFrom<RawMeasurement> for DataPoint {
    type Error = String;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        let timestamp = match raw.ts {
            RawTimestamp::Unix(secs) => secs,
            // Truncate sub-second precision
            RawTimestamp::Fractional(secs) => secs as i64,
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map_err(|e| format!("invalid ts {text:?}: {e}"))?
                .timestamp(),
        };

        Ok(Self {
            timestamp,
            value: raw.value,
        })
    }
}

/// Body of `PUT /api/v0/location`
#[derive(Debug, Clone, Serialize)]
pub struct LocationInput<'a> {
    pub location: &'a str,
}

/// Body of `PUT /api/v0/sensor`
#[derive(Debug, Clone, Serialize)]
pub struct SensorInput<'a> {
    pub sensor: &'a str,
}

/// A sample to ingest, body of `PUT /api/v0/data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub unix_timestamp: i64,
    pub location: String,
    pub sensor: String,
    pub value: f32,
}
