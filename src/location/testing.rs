//! Test doubles shared by the location and server tests.

use super::providers::ReverseGeocoder;
use super::resolver::StatusSink;
use super::types::{Coordinate, LocalityResult};
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Geocoder that answers from a script and records every call.
#[derive(Default)]
pub struct ScriptedGeocoder {
    answers: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Option<Coordinate>>>,
}

impl ScriptedGeocoder {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Option<Coordinate>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse_geocode(&self, coordinate: Option<Coordinate>) -> LocalityResult {
        self.calls.lock().unwrap().push(coordinate);
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or_default();
        LocalityResult::new(answer)
    }
}

/// Geocoder that takes `delay` to answer, like a slow network.
pub struct SlowGeocoder {
    delay: Duration,
    answer: String,
}

impl SlowGeocoder {
    pub fn new(delay: Duration, answer: &str) -> Self {
        Self { delay, answer: answer.to_string() }
    }
}

#[async_trait]
impl ReverseGeocoder for SlowGeocoder {
    async fn reverse_geocode(&self, _coordinate: Option<Coordinate>) -> LocalityResult {
        tokio::time::sleep(self.delay).await;
        LocalityResult::new(self.answer.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Start,
    Finish(String),
}

#[derive(Default)]
pub struct RecordingStatus {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatus {
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn start(&self) {
        self.events.lock().unwrap().push(StatusEvent::Start);
    }

    fn finish(&self, locality: &LocalityResult) {
        self.events
            .lock()
            .unwrap()
            .push(StatusEvent::Finish(locality.display_text.clone()));
    }
}

// ─── Local stand-in for the BigDataCloud endpoint ───────────────

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

pub struct MockGeocodingService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockGeocodingService {
    /// Serve `body` with `status` for every request on a random local port.
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { status, body, requests: requests.clone() };
        let app = Router::new()
            .route("/data/reverse-geocode-client", get(mock_reverse_geocode))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/data/reverse-geocode-client", self.addr)
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

async fn mock_reverse_geocode(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params);
    (state.status, [(header::CONTENT_TYPE, "application/json")], state.body).into_response()
}
