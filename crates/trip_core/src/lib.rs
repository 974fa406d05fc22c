pub mod booking;
pub mod clock;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod location;
pub mod map;
pub mod pricing;
pub mod providers;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;
pub mod tracking;
pub mod view;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
