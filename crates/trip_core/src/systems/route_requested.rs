use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::map::MapSurfaceResource;
use crate::routing::{fetch_route, RouteProviderResource};
use crate::scenario::TrackingParams;
use crate::telemetry::TrackingTelemetry;
use crate::tracking::TrackingSession;

use super::owning_session;

/// Resolve the provider's route to the pickup, draw it, and start the step
/// timer. Routing failures never surface here; `fetch_route` degrades.
pub fn route_requested_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<TrackingParams>,
    routes: Res<RouteProviderResource>,
    session: Option<ResMut<TrackingSession>>,
    mut map: Option<ResMut<MapSurfaceResource>>,
    mut telemetry: Option<ResMut<TrackingTelemetry>>,
) {
    if event.0.kind != EventKind::RouteRequested {
        return;
    }
    let Some(mut session) = owning_session(&event, session, telemetry.as_deref_mut()) else {
        return;
    };

    let route = fetch_route(routes.0.as_ref(), session.provider_start(), session.pickup());
    let source = route.source();
    if let Err(err) = session.attach_route(route) {
        log::debug!("ignoring route for session {:?}: {}", session.id(), err);
        return;
    }

    if let Some(map) = map.as_deref_mut() {
        let line = session
            .route()
            .map(|route| map.0.draw_polyline(route.points()));
        session.route_line = line;
    }
    log::debug!(
        "session {:?}: route attached ({:?}, {} points)",
        session.id(),
        source,
        session.route().map_or(0, |route| route.len())
    );

    // One step timer per session.
    clock.cancel(session.id(), EventKind::StepTick);
    clock.schedule_in(params.tick_ms, EventKind::StepTick, session.id());
}
