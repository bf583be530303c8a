//! Shared helpers: an in-process mock env-server and a recording renderer.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use env_plot::chart::{ChartSeries, Renderer};
use env_plot::common::AppState;
use env_plot::config::Config;
use env_plot::error::AppResult;

pub const BANNER: &str = "Hello, sensory-time-seriesy world!";

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({ "error": "mock failure" }),
        }
    }
}

/// A request the mock received: path plus JSON body (`Null` for GETs).
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub body: Value,
}

#[derive(Debug)]
pub struct MockEnvServer {
    pub locations: Reply,
    pub sensors: Reply,
    /// Reply for `get_data`, by requested location; `default_series` otherwise.
    pub series: HashMap<String, Reply>,
    pub default_series: Reply,
    /// Delay before answering `get_data`, by requested location.
    pub delays: HashMap<String, Duration>,
    /// Raw body for `get_data` that bypasses JSON encoding.
    pub raw_series_body: Option<String>,
    pub put_status: StatusCode,
}

impl Default for MockEnvServer {
    fn default() -> Self {
        Self {
            locations: Reply::ok(json!(["bathroom-social", "bedroom"])),
            sensors: Reply::ok(json!(["temperature", "humidity"])),
            series: HashMap::new(),
            default_series: Reply::ok(json!([
                { "ts": 100, "value": 21.5 },
                { "ts": 200, "value": 21.7 }
            ])),
            delays: HashMap::new(),
            raw_series_body: None,
            put_status: StatusCode::OK,
        }
    }
}

struct Shared {
    config: MockEnvServer,
    recorded: Mutex<Vec<Recorded>>,
}

impl Shared {
    fn record(&self, path: &str, body: Value) {
        self.recorded.lock().unwrap().push(Recorded {
            path: path.to_string(),
            body,
        });
    }
}

pub struct MockHandle {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl MockHandle {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.shared.recorded.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.recorded().iter().filter(|r| r.path == path).count()
    }

    pub fn config(&self) -> Config {
        Config::default().with_api_base_url(&self.base_url)
    }

    pub fn app_state(&self) -> AppState {
        AppState::from_config(self.config())
    }
}

impl MockEnvServer {
    pub async fn spawn(self) -> MockHandle {
        let shared = Arc::new(Shared {
            config: self,
            recorded: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", get(banner))
            .route("/api/v0/locations", get(locations))
            .route("/api/v0/sensors", get(sensors))
            .route("/api/v0/get_data", post(get_data))
            .route("/api/v0/location", put(put_location))
            .route("/api/v0/sensor", put(put_sensor))
            .route("/api/v0/data", put(put_data))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockHandle {
            base_url: format!("http://{addr}"),
            shared,
        }
    }
}

fn respond(reply: &Reply) -> (StatusCode, Json<Value>) {
    (reply.status, Json(reply.body.clone()))
}

async fn banner(State(s): State<Arc<Shared>>) -> &'static str {
    s.record("/", Value::Null);
    BANNER
}

async fn locations(State(s): State<Arc<Shared>>) -> (StatusCode, Json<Value>) {
    s.record("/api/v0/locations", Value::Null);
    respond(&s.config.locations)
}

async fn sensors(State(s): State<Arc<Shared>>) -> (StatusCode, Json<Value>) {
    s.record("/api/v0/sensors", Value::Null);
    respond(&s.config.sensors)
}

async fn get_data(
    State(s): State<Arc<Shared>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    s.record("/api/v0/get_data", body.clone());

    let location = body["location"].as_str().unwrap_or_default().to_string();
    if let Some(delay) = s.config.delays.get(&location) {
        tokio::time::sleep(*delay).await;
    }

    if let Some(raw) = &s.config.raw_series_body {
        return (StatusCode::OK, raw.clone());
    }

    let reply = s.config.series.get(&location).unwrap_or(&s.config.default_series);
    (reply.status, reply.body.to_string())
}

async fn put_location(State(s): State<Arc<Shared>>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    s.record("/api/v0/location", body);
    (s.config.put_status, "Ok")
}

async fn put_sensor(State(s): State<Arc<Shared>>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    s.record("/api/v0/sensor", body);
    (s.config.put_status, "Ok")
}

async fn put_data(State(s): State<Arc<Shared>>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    s.record("/api/v0/data", body);
    (s.config.put_status, "Ok")
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Remembers the labels of every redraw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub redraws: Vec<Vec<String>>,
}

impl Renderer for RecordingRenderer {
    fn redraw(&mut self, series: &[ChartSeries]) -> AppResult<()> {
        self.redraws
            .push(series.iter().map(|s| s.label.clone()).collect());
        Ok(())
    }
}
