use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::envdata::models::{
    DataPoint, GetDataRequest, LocationInput, Reading, SensorInput, SeriesQuery,
};
use crate::error::{AppError, AppResult};

/// Prefix of every versioned endpoint on the env-server.
const API_PREFIX: &str = "/api/v0";

/// Characters of a failed response body kept for the log line.
const BODY_PREVIEW_CHARS: usize = 500;

pub struct EnvDataClient {
    http_client: Client,
    base_url: String,
}

impl EnvDataClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.api_base_url.clone(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// List location identifiers known to the server.
    ///
    /// # Errors
    ///
    /// `AppError::Network` on transport failure, `AppError::Api` on a non-2xx
    /// status, `AppError::Decode` if the body is not a JSON array of strings.
    pub async fn list_locations(&self) -> AppResult<Vec<String>> {
        let url = self.endpoint("/locations");
        let response = send(self.http_client.get(&url)).await?;
        decode_json(response, "locations").await
    }

    /// List sensor-type identifiers known to the server.
    ///
    /// # Errors
    ///
    /// Same failure model as [`Self::list_locations`].
    pub async fn list_sensors(&self) -> AppResult<Vec<String>> {
        let url = self.endpoint("/sensors");
        let response = send(self.http_client.get(&url)).await?;
        decode_json(response, "sensors").await
    }

    /// Fetch the samples of one location/sensor pair over a time range.
    ///
    /// Points are returned in server order.
    ///
    /// # Errors
    ///
    /// Same failure model as [`Self::list_locations`].
    pub async fn fetch_series(&self, query: &SeriesQuery) -> AppResult<Vec<DataPoint>> {
        let url = self.endpoint("/get_data");
        let body = GetDataRequest::from(query);

        tracing::debug!(
            location = %query.location,
            sensor = %query.sensor,
            from = query.range.from,
            to = query.range.to,
            "Fetching series"
        );

        let response = send(self.http_client.post(&url).json(&body)).await?;
        decode_json(response, "get_data").await
    }

    /// Register a new location.
    ///
    /// # Errors
    ///
    /// `AppError::Network` or `AppError::Api`. The server answers 404 when
    /// the insert fails, e.g. for a duplicate name.
    pub async fn create_location(&self, name: &str) -> AppResult<()> {
        let url = self.endpoint("/location");
        send(self.http_client.put(&url).json(&LocationInput { location: name })).await?;
        tracing::info!(location = %name, "Location created");
        Ok(())
    }

    /// Register a new sensor type.
    ///
    /// # Errors
    ///
    /// See [`Self::create_location`].
    pub async fn create_sensor(&self, name: &str) -> AppResult<()> {
        let url = self.endpoint("/sensor");
        send(self.http_client.put(&url).json(&SensorInput { sensor: name })).await?;
        tracing::info!(sensor = %name, "Sensor created");
        Ok(())
    }

    /// Store one sample. Location and sensor must already exist.
    ///
    /// # Errors
    ///
    /// See [`Self::create_location`].
    pub async fn submit_reading(&self, reading: &Reading) -> AppResult<()> {
        let url = self.endpoint("/data");
        send(self.http_client.put(&url).json(reading)).await?;
        tracing::debug!(
            location = %reading.location,
            sensor = %reading.sensor,
            ts = reading.unix_timestamp,
            "Reading submitted"
        );
        Ok(())
    }

    /// Check that the server is up; returns its banner.
    ///
    /// # Errors
    ///
    /// `AppError::Network` or `AppError::Api`.
    pub async fn ping(&self) -> AppResult<String> {
        let response = send(self.http_client.get(format!("{}/", self.base_url))).await?;
        Ok(response.text().await?)
    }
}

/// Send a request and turn non-success statuses into `AppError::Api`.
async fn send(request: RequestBuilder) -> AppResult<Response> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = status.as_u16(),
            url = %url,
            body_preview = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
            "env-server returned an error status"
        );
        return Err(AppError::Api { status });
    }

    Ok(response)
}

async fn decode_json<T: DeserializeOwned>(response: Response, what: &str) -> AppResult<T> {
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            endpoint = what,
            body_preview = %text.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
            "Failed to parse env-server response"
        );
        AppError::Decode(format!("{what}: {e}"))
    })
}
