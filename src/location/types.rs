//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Accuracy radius above which a device fix is considered too imprecise (5 km).
pub const DEFAULT_ACCURACY_THRESHOLD_M: f64 = 5000.0;

/// A device-reported position. Consumed once per resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters within which the true position is expected to lie.
    pub accuracy_m: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self { latitude, longitude, accuracy_m }
    }
}

/// Human-readable locality, e.g. "Paris, Île-de-France, France".
/// Empty when nothing could be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityResult {
    pub display_text: String,
}

impl LocalityResult {
    pub fn new(display_text: impl Into<String>) -> Self {
        Self { display_text: display_text.into() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.display_text.is_empty()
    }
}

impl fmt::Display for LocalityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text)
    }
}

/// The address field's state as seen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "locality", rename_all = "snake_case")]
pub enum ResolutionState {
    #[default]
    Idle,
    Resolving,
    Resolved(LocalityResult),
}

impl ResolutionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Resolving)
    }
}

/// Acquisition parameters handed to the device geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the capability may return. Zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Which request produced the terminal locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalitySource {
    /// Reverse geocoded from the device coordinate.
    Device,
    /// Resolved by the geocoding service from the request's origin IP.
    NetworkOrigin,
}

impl fmt::Display for LocalitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::NetworkOrigin => write!(f, "IP"),
        }
    }
}

/// Why the resolver fell back to the network-origin lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    CapabilityUnavailable,
    AcquisitionFailed { error: LocationError },
    Imprecise { accuracy_m: f64 },
    EmptyResult,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityUnavailable => write!(f, "no geolocation capability"),
            Self::AcquisitionFailed { error } => write!(f, "{}", error),
            Self::Imprecise { accuracy_m } => write!(f, "position too imprecise ({:.0} m)", accuracy_m),
            Self::EmptyResult => write!(f, "no locality for the device coordinate"),
        }
    }
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    #[serde(flatten)]
    pub locality: LocalityResult,
    pub source: LocalitySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

/// Location resolution errors. Handled inside the resolver; never surfaced
/// to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LocationError {
    #[error("Geolocation is not available on this device")]
    CapabilityUnavailable,
    #[error("Geolocation permission denied")]
    PermissionDenied,
    #[error("Position acquisition timed out")]
    AcquisitionTimeout,
    #[error("Position unavailable")]
    PositionUnavailable,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}
