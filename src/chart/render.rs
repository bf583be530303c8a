//! Chart renderers.
//!
//! The assembler only needs something that redraws a list of series; what
//! "drawing" means is up to the implementation.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::assembler::{ChartPoint, ChartSeries};
use crate::error::AppResult;

pub trait Renderer {
    /// Redraw the whole chart from `series`, in legend order.
    ///
    /// # Errors
    ///
    /// Implementation specific, e.g. an unwritable output file.
    fn redraw(&mut self, series: &[ChartSeries]) -> AppResult<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn redraw(&mut self, series: &[ChartSeries]) -> AppResult<()> {
        (**self).redraw(series)
    }
}

/// Emits one structured log event per series.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn redraw(&mut self, series: &[ChartSeries]) -> AppResult<()> {
        if series.is_empty() {
            tracing::info!("Chart is empty");
        }

        for s in series {
            let first = s.points.first().map(|p| p.x);
            let last = s.points.last().map(|p| p.x);
            tracing::info!(
                label = %s.label,
                color = %s.color,
                points = s.points.len(),
                first = ?first,
                last = ?last,
                "Series"
            );
        }
        Ok(())
    }
}

/// Chart document consumed by Chart.js-style front-ends.
#[derive(Debug, Serialize)]
pub struct ChartDocument<'a> {
    pub datasets: Vec<Dataset<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset<'a> {
    pub label: &'a str,
    pub border_color: &'a str,
    pub data: &'a [ChartPoint],
}

impl<'a> ChartDocument<'a> {
    #[must_use]
    pub fn from_series(series: &'a [ChartSeries]) -> Self {
        Self {
            datasets: series
                .iter()
                .map(|s| Dataset {
                    label: &s.label,
                    border_color: s.color.as_str(),
                    data: &s.points,
                })
                .collect(),
        }
    }
}

/// Rewrites a chart document file on every redraw.
#[derive(Debug)]
pub struct ChartFileRenderer {
    path: PathBuf,
}

impl ChartFileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Renderer for ChartFileRenderer {
    fn redraw(&mut self, series: &[ChartSeries]) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(&ChartDocument::from_series(series))?;
        fs::write(&self.path, json)?;

        tracing::debug!(
            path = %self.path.display(),
            series = series.len(),
            "Chart document written"
        );
        Ok(())
    }
}
