use bevy_ecs::prelude::{Resource, World};

use crate::clock::SimulationClock;
use crate::map::{MapSurface, MapSurfaceResource};
use crate::routing::{build_route_provider, RouteProvider, RouteProviderResource};
use crate::scenario::params::TrackingParams;
use crate::telemetry::TrackingTelemetry;
use crate::tracking::SessionId;

/// Hands out session ids. A world never reuses one, so events left over from
/// an earlier session can always be told apart from the live one.
#[derive(Debug, Default, Resource)]
pub struct NextSessionId(u64);

impl NextSessionId {
    pub fn allocate(&mut self) -> SessionId {
        self.0 += 1;
        SessionId(self.0)
    }
}

/// Insert every resource a tracking run reads: clock, params, route provider,
/// map surface, telemetry and the session counter. The route provider is built
/// from `params.route_provider`; use [`insert_route_provider`] to override it.
pub fn build_tracking_world(world: &mut World, params: TrackingParams, map: Box<dyn MapSurface>) {
    let routes = build_route_provider(&params.route_provider);
    log::debug!(
        "building tracking world: tick {} ms, matching delay {} ms, provider {:?}",
        params.tick_ms,
        params.matching_delay_ms,
        params.route_provider
    );

    world.insert_resource(SimulationClock::default());
    world.insert_resource(RouteProviderResource(routes));
    world.insert_resource(MapSurfaceResource(map));
    world.insert_resource(TrackingTelemetry::default());
    world.insert_resource(NextSessionId::default());
    world.insert_resource(params);
}

/// Replace the route provider of an already built world.
pub fn insert_route_provider(world: &mut World, provider: Box<dyn RouteProvider>) {
    world.insert_resource(RouteProviderResource(provider));
}
