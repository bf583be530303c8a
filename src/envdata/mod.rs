//! Typed access to the env-server HTTP JSON API.

pub mod client;
pub mod models;

pub use client::EnvDataClient;
pub use models::{DataPoint, Reading, Resolution, SeriesQuery, TimeRange};
