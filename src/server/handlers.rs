use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::location::{LocationResolver, Outcome, ReportedPosition, Resolution, ResolutionState};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/locate ─────────────────────────────────────────────

/// The browser's geolocation outcome, reported as query parameters.
#[derive(Deserialize)]
pub struct LocateQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub accuracy: Option<f64>,
    pub geolocation: Option<String>,
}

pub async fn locate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQuery>,
) -> Result<Json<Resolution>, ApiError> {
    let start = Instant::now();

    let outcome = params
        .geolocation
        .as_deref()
        .map(str::parse::<Outcome>)
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let device = ReportedPosition::from_report(outcome, params.lat, params.lon, params.accuracy);

    let busy = state
        .field
        .try_begin()
        .ok_or_else(|| api_error(StatusCode::CONFLICT, "A location lookup is already in progress"))?;

    let resolution = LocationResolver::new(&device, state.geocoder.as_ref())
        .with_config(&state.config)
        .resolve(&busy)
        .await;

    log::info!(
        "GET /api/locate {:?} -> '{}' via {} ({:.1}ms)",
        device,
        resolution.locality,
        resolution.source,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(resolution))
}

// ─── GET /api/state ──────────────────────────────────────────────

pub async fn field_state(State(state): State<Arc<AppState>>) -> Json<ResolutionState> {
    Json(state.field.state())
}

#[cfg(test)]
mod tests {
    use crate::config::LocatorConfig;
    use crate::location::testing::{ScriptedGeocoder, SlowGeocoder};
    use crate::location::ReverseGeocoder;
    use crate::server::build_router;
    use crate::server::state::{AddressField, AppState};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    async fn serve(answers: &[&str]) -> (String, Arc<AppState>) {
        serve_with(Box::new(ScriptedGeocoder::new(answers))).await
    }

    async fn serve_with(geocoder: Box<dyn ReverseGeocoder>) -> (String, Arc<AppState>) {
        let state = Arc::new(AppState {
            geocoder,
            config: LocatorConfig::default(),
            field: AddressField::default(),
        });
        let app = build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base, state)
    }

    async fn get(url: String) -> (u16, serde_json::Value) {
        tokio::task::spawn_blocking(move || {
            let response = match ureq::get(&url).call() {
                Ok(r) => r,
                Err(ureq::Error::Status(_, r)) => r,
                Err(e) => panic!("request failed: {}", e),
            };
            let status = response.status();
            (status, response.into_json().unwrap())
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_locate_precise_fix() {
        let (base, state) = serve(&["Fort-de-France, Martinique"]).await;

        let (status, body) = get(format!("{}/api/locate?lat=14.61&lon=-61.05&accuracy=30", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["display_text"], "Fort-de-France, Martinique");
        assert_eq!(body["source"], "device");
        assert!(body.get("fallback").is_none());

        let (_, field) = get(format!("{}/api/state", base)).await;
        assert_eq!(field["state"], "resolved");
        assert_eq!(field["locality"]["display_text"], "Fort-de-France, Martinique");
        assert!(!state.field.state().is_busy());
    }

    #[tokio::test]
    async fn test_locate_denied_falls_back() {
        let (base, _state) = serve(&["Pointe-à-Pitre, Guadeloupe"]).await;

        let (status, body) = get(format!("{}/api/locate?geolocation=denied", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["source"], "network_origin");
        assert_eq!(body["fallback"]["reason"], "acquisition_failed");
    }

    #[tokio::test]
    async fn test_locate_rejects_unknown_outcome() {
        let (base, state) = serve(&[]).await;

        let (status, body) = get(format!("{}/api/locate?geolocation=maybe", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], 400);
        assert!(!state.field.state().is_busy());
    }

    #[tokio::test]
    async fn test_locate_refused_while_busy() {
        let (base, state) = serve(&["Cayenne"]).await;
        let _busy = state.field.try_begin().unwrap();

        let (status, _) = get(format!("{}/api/locate", base)).await;
        assert_eq!(status, 409);
    }

    #[tokio::test]
    async fn test_client_disconnect_does_not_leave_field_busy() {
        let (base, state) = serve_with(Box::new(SlowGeocoder::new(Duration::from_millis(500), "Cayenne"))).await;
        let addr = base.trim_start_matches("http://").to_string();

        let mut stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
        stream
            .write_all(b"GET /api/locate?geolocation=denied HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(stream);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!state.field.state().is_busy());
        assert!(state.field.try_begin().is_some(), "a new trigger must be accepted");
    }
}
