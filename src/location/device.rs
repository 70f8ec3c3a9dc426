//! Device geolocation capability.
//!
//! The resolver only needs "is there a capability" and "give me a fresh
//! position". Outcomes observed elsewhere (CLI flags, a browser's report)
//! are replayed through [`ReportedPosition`].

use super::types::{Coordinate, LocationError, PositionOptions};
use async_trait::async_trait;
use std::str::FromStr;

#[async_trait]
pub trait Geolocator: Send + Sync {
    fn is_available(&self) -> bool;

    async fn current_position(&self, opts: &PositionOptions) -> Result<Coordinate, LocationError>;
}

/// An acquisition outcome that is already known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportedPosition {
    /// The device has no geolocation capability at all.
    Unsupported,
    Fix(Coordinate),
    Denied,
    TimedOut,
    Unavailable,
}

#[async_trait]
impl Geolocator for ReportedPosition {
    fn is_available(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    async fn current_position(&self, _opts: &PositionOptions) -> Result<Coordinate, LocationError> {
        match *self {
            Self::Fix(c) => Ok(c),
            Self::Unsupported => Err(LocationError::CapabilityUnavailable),
            Self::Denied => Err(LocationError::PermissionDenied),
            Self::TimedOut => Err(LocationError::AcquisitionTimeout),
            Self::Unavailable => Err(LocationError::PositionUnavailable),
        }
    }
}

/// Outcome names as reported by a browser or typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Unsupported,
    Denied,
    Timeout,
    Unavailable,
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" | "success" => Ok(Self::Ok),
            "unsupported" | "none" => Ok(Self::Unsupported),
            "denied" | "permission_denied" => Ok(Self::Denied),
            "timeout" => Ok(Self::Timeout),
            "unavailable" | "position_unavailable" => Ok(Self::Unavailable),
            _ => Err(format!(
                "Unknown geolocation outcome '{}'. Use ok, unsupported, denied, timeout or unavailable.",
                s
            )),
        }
    }
}

impl ReportedPosition {
    /// Combine a reported outcome with optional coordinates. `Ok` without a
    /// full fix is treated as an unavailable position.
    pub fn from_report(
        outcome: Option<Outcome>,
        lat: Option<f64>,
        lon: Option<f64>,
        accuracy_m: Option<f64>,
    ) -> Self {
        let fix = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon, accuracy_m.unwrap_or(0.0))),
            _ => None,
        };
        let outcome = outcome.unwrap_or(if fix.is_some() { Outcome::Ok } else { Outcome::Unsupported });

        match (outcome, fix) {
            (Outcome::Ok, Some(c)) => Self::Fix(c),
            (Outcome::Ok, None) => Self::Unavailable,
            (Outcome::Unsupported, _) => Self::Unsupported,
            (Outcome::Denied, _) => Self::Denied,
            (Outcome::Timeout, _) => Self::TimedOut,
            (Outcome::Unavailable, _) => Self::Unavailable,
        }
    }
}

/// Enforces [`PositionOptions::timeout`] on a capability that may not.
pub struct Timed<G> {
    inner: G,
}

impl<G: Geolocator> Timed<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: Geolocator> Geolocator for Timed<G> {
    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    async fn current_position(&self, opts: &PositionOptions) -> Result<Coordinate, LocationError> {
        match tokio::time::timeout(opts.timeout, self.inner.current_position(opts)).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::AcquisitionTimeout),
        }
    }
}
