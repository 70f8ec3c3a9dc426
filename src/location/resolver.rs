//! Location resolver — orchestrates the fallback chain.
//!
//! No capability           → IP lookup
//! Acquisition failure     → IP lookup
//! Accuracy > threshold    → IP lookup (coordinate discarded)
//! Coordinate lookup empty → IP lookup
//! Otherwise               → coordinate lookup

use super::device::Geolocator;
use super::providers::ReverseGeocoder;
use super::types::{
    FallbackReason, LocalityResult, LocalitySource, PositionOptions, Resolution,
    DEFAULT_ACCURACY_THRESHOLD_M,
};
use crate::config::LocatorConfig;

/// Receives the busy/idle transitions of one resolution.
pub trait StatusSink: Send + Sync {
    /// Called once, before any work.
    fn start(&self);
    /// Called once, with the terminal locality.
    fn finish(&self, locality: &LocalityResult);
}

/// A sink for callers that only want the returned [`Resolution`].
pub struct Silent;

impl StatusSink for Silent {
    fn start(&self) {}
    fn finish(&self, _locality: &LocalityResult) {}
}

/// Resolver for a single trigger. Holds no state between invocations.
pub struct LocationResolver<'a> {
    device: &'a dyn Geolocator,
    geocoder: &'a dyn ReverseGeocoder,
    position: PositionOptions,
    accuracy_threshold_m: f64,
}

impl<'a> LocationResolver<'a> {
    pub fn new(device: &'a dyn Geolocator, geocoder: &'a dyn ReverseGeocoder) -> Self {
        Self {
            device,
            geocoder,
            position: PositionOptions::default(),
            accuracy_threshold_m: DEFAULT_ACCURACY_THRESHOLD_M,
        }
    }

    pub fn with_config(mut self, config: &LocatorConfig) -> Self {
        self.position = config.position_options();
        self.accuracy_threshold_m = config.accuracy_threshold_m;
        self
    }

    pub fn with_accuracy_threshold(mut self, meters: f64) -> Self {
        self.accuracy_threshold_m = meters;
        self
    }

    /// Run one resolution. `status` sees exactly one `start` and one `finish`.
    pub async fn resolve(&self, status: &dyn StatusSink) -> Resolution {
        status.start();
        let resolution = self.run().await;
        status.finish(&resolution.locality);
        resolution
    }

    async fn run(&self) -> Resolution {
        if !self.device.is_available() {
            return self.from_network_origin(FallbackReason::CapabilityUnavailable).await;
        }

        let coordinate = match self.device.current_position(&self.position).await {
            Ok(c) => c,
            Err(error) => {
                return self.from_network_origin(FallbackReason::AcquisitionFailed { error }).await;
            }
        };
        log::debug!(
            "Device fix {:.5}, {:.5} (±{:.0} m)",
            coordinate.latitude, coordinate.longitude, coordinate.accuracy_m
        );

        if coordinate.accuracy_m > self.accuracy_threshold_m {
            return self
                .from_network_origin(FallbackReason::Imprecise { accuracy_m: coordinate.accuracy_m })
                .await;
        }

        let locality = self.geocoder.reverse_geocode(Some(coordinate)).await;
        if !locality.is_empty() {
            return Resolution {
                locality,
                source: LocalitySource::Device,
                fallback: None,
            };
        }

        // An empty answer for a precise fix may just be a remote spot with no
        // named locality; the IP lookup is a best-effort second chance.
        self.from_network_origin(FallbackReason::EmptyResult).await
    }

    async fn from_network_origin(&self, reason: FallbackReason) -> Resolution {
        match reason {
            FallbackReason::EmptyResult => log::warn!("Falling back to IP lookup: {}", reason),
            _ => log::info!("Falling back to IP lookup: {}", reason),
        }
        let locality = self.geocoder.reverse_geocode(None).await;
        Resolution {
            locality,
            source: LocalitySource::NetworkOrigin,
            fallback: Some(reason),
        }
    }
}
