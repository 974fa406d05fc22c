//! Owning handle for one tracking screen.
//!
//! [`TrackingView`] bundles the world and schedule a tracking run needs and
//! tears the session down when dropped, so timers and the map surface are
//! released on every exit path.

use bevy_ecs::prelude::{Schedule, World};

use crate::booking::TripRequest;
use crate::clock::SimulationClock;
use crate::map::MapSurface;
use crate::routing::RouteProvider;
use crate::runner::{
    cancel_trip, run_next_event, run_until, run_until_empty, start_tracking, teardown,
    tracking_schedule,
};
use crate::scenario::{build_tracking_world, insert_route_provider, TrackingParams};
use crate::telemetry::TrackingTelemetry;
use crate::tracking::{SessionId, TrackingSession, TrackingSnapshot, TripStatus};

pub struct TrackingView {
    world: World,
    schedule: Schedule,
}

impl TrackingView {
    /// Build the world from `params` (route provider included) and start
    /// tracking `request`.
    pub fn open(params: TrackingParams, map: Box<dyn MapSurface>, request: &TripRequest) -> Self {
        let mut world = World::new();
        build_tracking_world(&mut world, params, map);
        Self::start(world, request)
    }

    /// Like [`TrackingView::open`] with an explicit route provider.
    pub fn open_with_routes(
        params: TrackingParams,
        map: Box<dyn MapSurface>,
        routes: Box<dyn RouteProvider>,
        request: &TripRequest,
    ) -> Self {
        let mut world = World::new();
        build_tracking_world(&mut world, params, map);
        insert_route_provider(&mut world, routes);
        Self::start(world, request)
    }

    fn start(mut world: World, request: &TripRequest) -> Self {
        start_tracking(&mut world, request);
        Self {
            world,
            schedule: tracking_schedule(),
        }
    }

    pub fn session(&self) -> Option<&TrackingSession> {
        self.world.get_resource::<TrackingSession>()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session().map(TrackingSession::id)
    }

    pub fn status(&self) -> Option<TripStatus> {
        self.session().map(TrackingSession::status)
    }

    pub fn snapshot(&self) -> Option<TrackingSnapshot> {
        self.session().map(TrackingSession::snapshot)
    }

    pub fn telemetry(&self) -> Option<&TrackingTelemetry> {
        self.world.get_resource::<TrackingTelemetry>()
    }

    pub fn now_ms(&self) -> u64 {
        self.world
            .get_resource::<SimulationClock>()
            .map_or(0, SimulationClock::now)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Handle the next pending event.
    pub fn step(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Handle every event due at or before `until_ms`.
    pub fn run_until(&mut self, until_ms: u64) -> usize {
        run_until(&mut self.world, &mut self.schedule, until_ms)
    }

    /// Handle events until nothing is pending or `max_steps` were run.
    pub fn run_to_end(&mut self, max_steps: usize) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, max_steps)
    }

    /// Replace the live session with a new one for `request`.
    pub fn restart(&mut self, request: &TripRequest) -> SessionId {
        start_tracking(&mut self.world, request)
    }

    pub fn cancel(&mut self, confirmed: bool) -> bool {
        cancel_trip(&mut self.world, confirmed)
    }
}

impl Drop for TrackingView {
    fn drop(&mut self) {
        teardown(&mut self.world);
    }
}
