//! Command-line interface definitions and argument parsers.

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::envdata::{SeriesQuery, TimeRange};

/// Span plotted when neither `--from` nor `--last` is given.
const DEFAULT_SPAN_SECS: i64 = 24 * 60 * 60;

#[derive(Parser)]
#[command(name = "env-plot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query an env-server and chart its sensor data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// env-server URL (overrides ENV_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known locations
    Locations,

    /// List known sensor types
    Sensors,

    /// Fetch one or more series and write a chart document
    Plot {
        /// Series to plot as LOCATION:SENSOR (repeatable)
        #[arg(short, long = "series", required = true, value_parser = parse_series_spec)]
        series: Vec<SeriesSpec>,
        /// Start of the range. Supports: "now", RFC 3339, Unix timestamp
        #[arg(long, value_parser = parse_time, conflicts_with = "last")]
        from: Option<i64>,
        /// End of the range (default: now)
        #[arg(long, value_parser = parse_time, conflicts_with = "last")]
        to: Option<i64>,
        /// Range ending now (e.g., 30m, 12h, 7d, 4w)
        #[arg(short, long, value_parser = parse_duration)]
        last: Option<Duration>,
        /// Chart document path (overrides CHART_OUTPUT_PATH)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also export the plotted points as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Register a new location
    AddLocation {
        name: String,
    },

    /// Register a new sensor type
    AddSensor {
        name: String,
    },

    /// Submit a single reading
    Push {
        #[arg(long)]
        location: String,
        #[arg(long)]
        sensor: String,
        #[arg(long)]
        value: f32,
        /// Sample time (default: now). Supports: "now", RFC 3339, Unix timestamp
        #[arg(short, long, value_parser = parse_time)]
        time: Option<i64>,
    },

    /// Check that the server is reachable
    Ping,
}

/// A `LOCATION:SENSOR` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    pub location: String,
    pub sensor: String,
}

impl SeriesSpec {
    #[must_use]
    pub fn into_query(self, range: TimeRange) -> SeriesQuery {
        SeriesQuery::new(self.location, self.sensor, range)
    }
}

/// Parse `LOCATION:SENSOR`. The split is on the last colon so location
/// names may contain one.
pub fn parse_series_spec(s: &str) -> Result<SeriesSpec, String> {
    let (location, sensor) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected LOCATION:SENSOR, got {s:?}"))?;

    if location.is_empty() || sensor.is_empty() {
        return Err(format!("expected LOCATION:SENSOR, got {s:?}"));
    }

    Ok(SeriesSpec {
        location: location.to_string(),
        sensor: sensor.to_string(),
    })
}

/// Parse a point in time into Unix seconds.
pub fn parse_time(s: &str) -> Result<i64, String> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().timestamp());
    }

    if let Ok(secs) = s.parse::<i64>() {
        return Ok(secs);
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp())
        .map_err(|_| format!("invalid time {s:?}: expected \"now\", RFC 3339 or Unix seconds"))
}

/// Parse a span such as `30m`, `12h`, `7d` or `4w`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.char_indices().last().map_or(0, |(i, _)| i);
    let (amount, unit) = s.split_at(split);

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid duration {s:?}: expected e.g. 7d"))?;
    if amount <= 0 {
        return Err(format!("invalid duration {s:?}: must be positive"));
    }

    let span = match unit {
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => return Err(format!("invalid duration unit in {s:?}: use m, h, d or w")),
    };

    span.ok_or_else(|| format!("invalid duration {s:?}: too large"))
}

/// Resolve the plot range from the mutually exclusive time flags.
///
/// # Errors
///
/// Returns an error if `last` reaches before the earliest representable date.
pub fn resolve_range(
    from: Option<i64>,
    to: Option<i64>,
    last: Option<Duration>,
) -> Result<TimeRange, String> {
    if let Some(span) = last {
        return TimeRange::last(span)
            .ok_or_else(|| format!("--last {}s reaches too far into the past", span.num_seconds()));
    }

    let to = to.unwrap_or_else(|| Utc::now().timestamp());
    let from = from.unwrap_or(to.saturating_sub(DEFAULT_SPAN_SECS));
    Ok(TimeRange::new(from, to))
}
