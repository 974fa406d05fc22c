//! Scenario setup: tunables and the world a tracking run needs.

mod build;
mod params;

pub use build::{build_tracking_world, insert_route_provider, NextSessionId};
pub use params::{TrackingParams, DEFAULT_PICKUP};
