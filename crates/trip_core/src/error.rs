//! Error types shared across the crate.
//!
//! None of these are fatal to a running simulation: routing and geocoding
//! errors are absorbed into degraded results by their callers, booking errors
//! are surfaced to the user, and transition errors mark a stale or illegal
//! event that is dropped.

use thiserror::Error;

use crate::tracking::TripStatus;

/// Failure talking to the routing service.
#[derive(Debug, Error)]
pub enum RouteError {
    #[cfg(any(feature = "osrm", feature = "nominatim"))]
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service answered with code '{0}'")]
    Api(String),
    #[error("malformed routing payload: {0}")]
    Malformed(String),
    #[error("routing service unavailable: {0}")]
    Unavailable(String),
}

/// Failure talking to the geocoding service.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[cfg(any(feature = "osrm", feature = "nominatim"))]
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed geocoding payload: {0}")]
    Malformed(String),
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
}

/// A route needs at least an origin and a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a route needs at least 2 points, got {0}")]
pub struct RouteBuildError(pub usize);

/// Status changes only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: TripStatus,
    pub to: TripStatus,
}

/// User-facing booking failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Cannot book expert in water! Please select a valid location on land.")]
    OverWater,
    #[error("Unable to get current location. Please enable location access.")]
    LocationUnavailable,
    #[error("Geolocation is not supported on this device.")]
    GeolocationUnsupported,
}

/// Configuration could not be decoded.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid tracking params: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tracking params: {0}")]
    Invalid(String),
}
