#![allow(dead_code)]

use bevy_ecs::prelude::World;
use trip_core::map::{MapLogHandle, RecordingMapSurface};
use trip_core::routing::{FallbackRouteProvider, RouteProvider};
use trip_core::scenario::{build_tracking_world, insert_route_provider, TrackingParams};

/// Helper that populates the ECS world with all resources a tracking run reads.
pub struct TestWorldBuilder {
    params: TrackingParams,
    routes: Box<dyn RouteProvider>,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            params: TrackingParams::default().with_seed(42),
            routes: Box::new(FallbackRouteProvider::default()),
        }
    }
}

impl TestWorldBuilder {
    /// Create a new builder with default params and the offline router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    /// Override the step timer period.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.params = self.params.with_tick_ms(tick_ms);
        self
    }

    /// Replace all params.
    pub fn with_params(mut self, params: TrackingParams) -> Self {
        self.params = params;
        self
    }

    /// Choose the routing backend to insert.
    pub fn with_route_provider(mut self, routes: impl RouteProvider + 'static) -> Self {
        self.routes = Box::new(routes);
        self
    }

    /// Build the ECS world. Returns the log of the recording map surface.
    pub fn build(self) -> (World, MapLogHandle) {
        let surface = RecordingMapSurface::new();
        let log = surface.log();
        let mut world = World::new();
        build_tracking_world(&mut world, self.params, Box::new(surface));
        insert_route_provider(&mut world, self.routes);
        (world, log)
    }
}
