use serde::Serialize;
use std::io::Write;

use crate::chart::assembler::ChartSeries;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    series: &'a str,
    timestamp: i64,
    value: f64,
}

/// Write every point of every series as `series,timestamp,value` rows,
/// with a header, in legend then point order.
///
/// # Errors
///
/// Returns `AppError::Csv` if a row cannot be written and `AppError::Export`
/// if the final flush fails.
pub fn export_csv<W: Write>(series: &[ChartSeries], writer: W) -> AppResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut rows = 0usize;
    for s in series {
        for point in &s.points {
            csv_writer.serialize(CsvRow {
                series: &s.label,
                timestamp: point.x,
                value: point.y,
            })?;
            rows += 1;
        }
    }

    // Header is only emitted by `serialize`, so an empty chart needs it explicitly
    if rows == 0 {
        csv_writer.write_record(["series", "timestamp", "value"])?;
    }

    csv_writer
        .flush()
        .map_err(|e| AppError::Export(format!("Failed to flush CSV output: {e}")))?;

    tracing::debug!(series = series.len(), rows, "CSV exported");
    Ok(())
}
