use serde::Serialize;

use crate::chart::palette::{color_for, Color};
use crate::chart::render::Renderer;
use crate::envdata::{DataPoint, SeriesQuery};
use crate::error::AppResult;

/// A point in chart coordinates: x is Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: i64,
    pub y: f64,
}

impl From<DataPoint> for ChartPoint {
    fn from(point: DataPoint) -> Self {
        Self {
            x: point.timestamp,
            y: point.value,
        }
    }
}

/// One labeled, colored line on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
    pub color: Color,
}

/// The ordered series list. Order is legend order and drives color
/// assignment.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    series: Vec<ChartSeries>,
}

impl ChartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Builds series from fetched points and keeps the renderer in sync with
/// the chart state.
pub struct ChartAssembler<R> {
    state: ChartState,
    renderer: R,
}

impl<R: Renderer> ChartAssembler<R> {
    pub fn new(state: ChartState, renderer: R) -> Self {
        Self { state, renderer }
    }

    #[must_use]
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Append a series for `query` built from `points`, then redraw.
    ///
    /// Points keep their input order. The series is kept even if the redraw
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns whatever the renderer reports.
    pub fn add_series(&mut self, query: &SeriesQuery, points: Vec<DataPoint>) -> AppResult<()> {
        let series = ChartSeries {
            label: query.label(),
            points: points.into_iter().map(ChartPoint::from).collect(),
            color: color_for(self.state.series.len()),
        };

        tracing::debug!(
            label = %series.label,
            points = series.points.len(),
            color = %series.color,
            "Series added"
        );

        self.state.series.push(series);
        self.renderer.redraw(&self.state.series)
    }

    /// Drop every series, then redraw.
    ///
    /// # Errors
    ///
    /// Returns whatever the renderer reports.
    pub fn clear(&mut self) -> AppResult<()> {
        let removed = self.state.series.len();
        self.state.series.clear();
        tracing::debug!(removed, "Chart cleared");
        self.renderer.redraw(&self.state.series)
    }
}
