//! Test helpers for common test setup and utilities.
//!
//! Canned collaborators (route providers, geocoders) and a ready-made world
//! so unit and integration tests do not repeat the same setup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy_ecs::prelude::World;

use crate::error::{GeocodeError, RouteError};
use crate::geo::Coordinate;
use crate::geocoding::Geocoder;
use crate::location::ResolvedLocation;
use crate::map::{MapLogHandle, RecordingMapSurface};
use crate::routing::{Route, RouteProvider};
use crate::scenario::{build_tracking_world, insert_route_provider, TrackingParams};

/// Pickup used across tests (Bengaluru city centre).
pub const TEST_PICKUP: Coordinate = Coordinate::new(12.9716, 77.5946);

/// World with every tracking resource, a recording map and the offline
/// fallback router. Returns the map log handle for assertions.
pub fn create_test_world(params: TrackingParams) -> (World, MapLogHandle) {
    let surface = RecordingMapSurface::new();
    let log = surface.log();
    let mut world = World::new();
    build_tracking_world(&mut world, params, Box::new(surface));
    (world, log)
}

/// Same as [`create_test_world`] but with an explicit route provider.
pub fn create_test_world_with_routes(
    params: TrackingParams,
    routes: Box<dyn RouteProvider>,
) -> (World, MapLogHandle) {
    let (mut world, log) = create_test_world(params);
    insert_route_provider(&mut world, routes);
    (world, log)
}

/// Route provider whose every call fails, as an unreachable service would.
/// Counts calls so tests can check caching and retries.
#[derive(Debug, Clone, Default)]
pub struct FailingRouteProvider {
    calls: Arc<AtomicUsize>,
}

impl FailingRouteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for FailingRouteProvider {
    fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<Option<Route>, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RouteError::Unavailable("routing service unreachable".to_string()))
    }
}

/// Route provider that answers but never has a route.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRouteProvider;

impl RouteProvider for EmptyRouteProvider {
    fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<Option<Route>, RouteError> {
        Ok(None)
    }
}

/// Route provider returning one fixed route for any request.
#[derive(Debug, Clone)]
pub struct StaticRouteProvider {
    route: Route,
    calls: Arc<AtomicUsize>,
}

impl StaticRouteProvider {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for StaticRouteProvider {
    fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<Option<Route>, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.route.clone()))
    }
}

/// Geocoder with canned search results and an optional reverse answer.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    results: Vec<ResolvedLocation>,
    reverse: Option<ResolvedLocation>,
}

impl StaticGeocoder {
    pub fn new(results: Vec<ResolvedLocation>) -> Self {
        Self {
            results,
            reverse: None,
        }
    }

    pub fn with_reverse(mut self, location: ResolvedLocation) -> Self {
        self.reverse = Some(location);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn search(&self, _query: &str, limit: usize) -> Result<Vec<ResolvedLocation>, GeocodeError> {
        Ok(self.results.iter().take(limit).cloned().collect())
    }

    fn reverse(&self, _coordinate: Coordinate) -> Result<Option<ResolvedLocation>, GeocodeError> {
        Ok(self.reverse.clone())
    }
}

/// Geocoder that is always unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    fn search(&self, _query: &str, _limit: usize) -> Result<Vec<ResolvedLocation>, GeocodeError> {
        Err(GeocodeError::Unavailable("geocoder unreachable".to_string()))
    }

    fn reverse(&self, _coordinate: Coordinate) -> Result<Option<ResolvedLocation>, GeocodeError> {
        Err(GeocodeError::Unavailable("geocoder unreachable".to_string()))
    }
}
