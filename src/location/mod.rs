//! Location subsystem for the address field.
//!
//! Provides the device geolocation seam, the BigDataCloud reverse-geocoding
//! client and the resolver that chooses between coordinate and IP lookups.

pub mod device;
pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{Geolocator, Outcome, ReportedPosition, Timed};
pub use providers::{compose_display_text, BigDataCloudClient, GeocodeResponse, ReverseGeocoder};
pub use resolver::{LocationResolver, Silent, StatusSink};
pub use types::{
    Coordinate, FallbackReason, LocalityResult, LocalitySource, LocationError, PositionOptions,
    Resolution, ResolutionState,
};
