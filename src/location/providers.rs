//! Reverse-geocoding provider: BigDataCloud client-side reverse geocode.
//!
//! With a coordinate the service reverse geocodes it; without one it
//! resolves the caller's network origin (IP) server-side. Either way the
//! answer is reduced to a single comma-joined locality line.

use super::types::{Coordinate, LocalityResult, LocationError};
use crate::config::LocatorConfig;
use async_trait::async_trait;
use serde::Deserialize;

/// Translates an optional coordinate into a locality. Implementations never
/// fail: every error degrades to an empty [`LocalityResult`].
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// `None` asks for resolution from the request's network origin.
    async fn reverse_geocode(&self, coordinate: Option<Coordinate>) -> LocalityResult;
}

// ─── Payload ────────────────────────────────────────────────────

/// The subset of the BigDataCloud payload used for display.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub principal_subdivision: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Build "city, region, country" with city → locality → subdivision
/// precedence for the head. No head means no text at all. Region and
/// country are appended whenever present, even if the head is the region.
pub fn compose_display_text(r: &GeocodeResponse) -> String {
    let region = non_empty(&r.principal_subdivision);
    let head = match non_empty(&r.city).or_else(|| non_empty(&r.locality)).or(region) {
        Some(h) => h,
        None => return String::new(),
    };

    let mut parts = vec![head];
    if let Some(region) = region {
        parts.push(region);
    }
    if let Some(country) = non_empty(&r.country_name) {
        parts.push(country);
    }
    parts.join(", ")
}

// ─── BigDataCloud client ────────────────────────────────────────

#[derive(Clone)]
pub struct BigDataCloudClient {
    agent: ureq::Agent,
    endpoint: String,
    language: String,
}

impl BigDataCloudClient {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> Self {
        Self::from_config(&LocatorConfig {
            endpoint: endpoint.into(),
            language: language.into(),
            ..LocatorConfig::default()
        })
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(&config.user_agent);
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        }
    }

    /// One blocking request. Accuracy is never sent.
    pub fn fetch(&self, coordinate: Option<Coordinate>) -> Result<GeocodeResponse, LocationError> {
        let mut request = self
            .agent
            .get(&self.endpoint)
            .query("localityLanguage", &self.language);
        if let Some(c) = coordinate {
            request = request
                .query("latitude", &c.latitude.to_string())
                .query("longitude", &c.longitude.to_string());
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => LocationError::Network(format!("HTTP {}", code)),
            other => LocationError::Network(other.to_string()),
        })?;

        response
            .into_json()
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))
    }

    /// Blocking lookup that swallows every error into an empty result.
    pub fn lookup(&self, coordinate: Option<Coordinate>) -> LocalityResult {
        match self.fetch(coordinate) {
            Ok(r) => LocalityResult::new(compose_display_text(&r)),
            Err(e) => {
                log::warn!("Reverse geocoding via {} failed: {}", self.endpoint, e);
                LocalityResult::empty()
            }
        }
    }
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudClient {
    async fn reverse_geocode(&self, coordinate: Option<Coordinate>) -> LocalityResult {
        let client = self.clone();
        match tokio::task::spawn_blocking(move || client.lookup(coordinate)).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Reverse geocoding task aborted: {}", e);
                LocalityResult::empty()
            }
        }
    }
}
