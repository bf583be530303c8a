//! Dashboard controller.
//!
//! Plays the role of the page's event handlers: it turns user actions into
//! client calls and chart mutations, and owns the failure policy. A failed
//! fetch is logged and degrades only the action that issued it; the chart
//! is left untouched and nothing panics.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

use crate::chart::{ChartAssembler, ChartState, Renderer};
use crate::common::AppState;
use crate::envdata::{DataPoint, SeriesQuery};
use crate::error::{AppError, AppResult};
use crate::services::cache::{self, CatalogKind};

/// What happened to one "add plot" action.
#[derive(Debug)]
pub enum PlotOutcome {
    /// A series was appended. `points == 0` means the server had no data.
    /// `redraw_error` is set when the series is in the chart state but the
    /// renderer failed to show it.
    Added {
        label: String,
        points: usize,
        redraw_error: Option<AppError>,
    },
    /// The fetch failed and the chart was not modified.
    Failed(AppError),
}

impl PlotOutcome {
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }

    /// Added and drawn.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Added { redraw_error: None, .. })
    }
}

pub struct Dashboard<R> {
    state: AppState,
    chart: ChartAssembler<R>,
}

impl<R: Renderer> Dashboard<R> {
    pub fn new(state: AppState, chart: ChartAssembler<R>) -> Self {
        Self { state, chart }
    }

    #[must_use]
    pub fn chart(&self) -> &ChartState {
        self.chart.state()
    }

    #[must_use]
    pub fn assembler(&self) -> &ChartAssembler<R> {
        &self.chart
    }

    /// Locations for the selection list, or `None` if they could not be
    /// fetched.
    pub async fn refresh_locations(&self) -> Option<Arc<Vec<String>>> {
        self.refresh_catalog(CatalogKind::Locations).await
    }

    /// Sensor types for the selection list, or `None` if they could not be
    /// fetched.
    pub async fn refresh_sensors(&self) -> Option<Arc<Vec<String>>> {
        self.refresh_catalog(CatalogKind::Sensors).await
    }

    async fn refresh_catalog(&self, kind: CatalogKind) -> Option<Arc<Vec<String>>> {
        if let Some(cached) = cache::get_cached(&self.state.catalog_cache, kind).await {
            return Some(cached);
        }

        let result = match kind {
            CatalogKind::Locations => self.state.client.list_locations().await,
            CatalogKind::Sensors => self.state.client.list_sensors().await,
        };

        match result {
            Ok(entries) => {
                Some(cache::store_cached(&self.state.catalog_cache, kind, entries).await)
            }
            Err(e) => {
                tracing::error!(error = %e, catalog = kind.as_str(), "Failed to fetch catalog");
                None
            }
        }
    }

    /// Fetch one series and append it to the chart.
    pub async fn add_plot(&mut self, query: SeriesQuery) -> PlotOutcome {
        let result = self.state.client.fetch_series(&query).await;
        apply_fetch(&mut self.chart, &query, result)
    }

    /// Fetch several series at once.
    ///
    /// Series are appended as their responses arrive, so legend order (and
    /// color) follows arrival order, not the order of `queries`. The
    /// returned outcomes are in that same arrival order.
    pub async fn add_plots(&mut self, queries: Vec<SeriesQuery>) -> Vec<(SeriesQuery, PlotOutcome)> {
        let client = &self.state.client;
        let chart = &mut self.chart;

        let mut pending: FuturesUnordered<_> = queries
            .into_iter()
            .map(move |query| async move {
                let result = client.fetch_series(&query).await;
                (query, result)
            })
            .collect();

        let mut outcomes = Vec::new();
        while let Some((query, result)) = pending.next().await {
            let outcome = apply_fetch(chart, &query, result);
            outcomes.push((query, outcome));
        }

        outcomes
    }

    /// Remove every series from the chart.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error; the chart is empty either way.
    pub fn clear(&mut self) -> AppResult<()> {
        self.chart.clear()
    }

    /// Create a location on the server and drop the cached listing.
    ///
    /// # Errors
    ///
    /// Propagates the client error; the cache is left alone on failure.
    pub async fn register_location(&self, name: &str) -> AppResult<()> {
        self.state.client.create_location(name).await?;
        cache::invalidate(&self.state.catalog_cache, CatalogKind::Locations).await;
        Ok(())
    }

    /// Create a sensor type on the server and drop the cached listing.
    ///
    /// # Errors
    ///
    /// Propagates the client error; the cache is left alone on failure.
    pub async fn register_sensor(&self, name: &str) -> AppResult<()> {
        self.state.client.create_sensor(name).await?;
        cache::invalidate(&self.state.catalog_cache, CatalogKind::Sensors).await;
        Ok(())
    }
}

fn apply_fetch<R: Renderer>(
    chart: &mut ChartAssembler<R>,
    query: &SeriesQuery,
    result: AppResult<Vec<DataPoint>>,
) -> PlotOutcome {
    let points = match result {
        Ok(points) => points,
        Err(e) => {
            tracing::error!(
                error = %e,
                location = %query.location,
                sensor = %query.sensor,
                "Failed to fetch series"
            );
            return PlotOutcome::Failed(e);
        }
    };

    let label = query.label();
    let count = points.len();

    // The series is already in the state when redraw runs
    let redraw_error = chart.add_series(query, points).err();
    if let Some(e) = &redraw_error {
        tracing::error!(error = %e, label = %label, "Failed to redraw chart");
    }

    PlotOutcome::Added {
        label,
        points: count,
        redraw_error,
    }
}
