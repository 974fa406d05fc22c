//! Tracking runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. Session lifecycle (start, cancel, teardown) also
//! lives here since it spans the clock, the map and the session resource.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::booking::TripRequest;
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::map::{MapSurfaceResource, MarkerKind};
use crate::scenario::{NextSessionId, TrackingParams};
use crate::systems::{
    provider_matched::provider_matched_system, route_requested::route_requested_system,
    step_tick::step_tick_system, trip_completed::trip_completed_system,
};
use crate::telemetry::{SessionEnd, TrackingTelemetry};
use crate::tracking::{SessionId, TrackingSession, TripStatus};

fn is_provider_matched(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ProviderMatched)
        .unwrap_or(false)
}

fn is_route_requested(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RouteRequested)
        .unwrap_or(false)
}

fn is_step_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::StepTick)
        .unwrap_or(false)
}

fn is_trip_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::TripCompleted)
        .unwrap_or(false)
}

/// Runs one step: pops the next event, inserts it as [CurrentEvent], then runs
/// the schedule. Returns `false` if the world has no clock or nothing is pending.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let Some(mut clock) = world.get_resource_mut::<SimulationClock>() else {
        return false;
    };
    let Some(event) = clock.pop_next() else {
        return false;
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs every event due at or before `until_ms`. Returns the number of steps.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let due = world
            .get_resource::<SimulationClock>()
            .and_then(|c| c.next_event_time())
            .is_some_and(|ts| ts <= until_ms);
        if !due || !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Builds the tracking schedule: one system per event kind, gated on the
/// current event so only the matching system runs.
pub fn tracking_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        provider_matched_system.run_if(is_provider_matched),
        route_requested_system.run_if(is_route_requested),
        step_tick_system.run_if(is_step_tick),
        trip_completed_system.run_if(is_trip_completed),
    ));
    schedule
}

/// Open a tracking session for a confirmed trip.
///
/// Any previous session is discarded first: its timers are cancelled and its
/// markers and polyline removed. The new session starts in `searching`, the
/// pickup marker is placed, the viewport is fitted around pickup and the
/// provider's start, and the matching delay starts running.
pub fn start_tracking(world: &mut World, request: &TripRequest) -> SessionId {
    end_active_session(world, SessionEnd::Cancelled);

    let params = world
        .get_resource::<TrackingParams>()
        .cloned()
        .unwrap_or_default();
    let id = world
        .get_resource_or_insert_with(NextSessionId::default)
        .allocate();

    let mut session = TrackingSession::new(
        id,
        request.pickup,
        request.fare,
        params.provider_start_offset_deg,
        params.average_speed_kmh,
    );
    if let Some(mut map) = world.get_resource_mut::<MapSurfaceResource>() {
        let marker = map
            .0
            .place_marker(MarkerKind::Pickup, request.pickup, Some("Pickup"));
        map.0
            .fit_bounds(&[request.pickup, session.provider_start()], params.fit_padding_px);
        session.pickup_marker = Some(marker);
    }
    world.insert_resource(session);

    let now = {
        let mut clock = world.get_resource_or_insert_with(SimulationClock::default);
        clock.schedule_in(params.matching_delay_ms, EventKind::ProviderMatched, id);
        clock.now()
    };
    if let Some(mut telemetry) = world.get_resource_mut::<TrackingTelemetry>() {
        telemetry.record_status(now, id, TripStatus::Searching);
    }
    log::info!(
        "session {:?}: tracking fare {} at {}",
        id,
        request.fare,
        request.pickup
    );
    id
}

/// User asked to cancel. Nothing happens unless the cancel was `confirmed`;
/// a confirmed cancel discards the live session and every timer it owns.
/// Returns whether a session was discarded.
pub fn cancel_trip(world: &mut World, confirmed: bool) -> bool {
    if !confirmed {
        log::debug!("cancel not confirmed; keeping session");
        return false;
    }
    end_active_session(world, SessionEnd::Cancelled).is_some()
}

/// Tracking view is going away: stop every timer, clear the live session and
/// release the map surface. Safe to call more than once.
pub fn teardown(world: &mut World) {
    end_active_session(world, SessionEnd::TornDown);
    if let Some(mut map) = world.get_resource_mut::<MapSurfaceResource>() {
        map.0.release();
    }
    world.remove_resource::<CurrentEvent>();
}

/// Remove the live session, cancel its timers and clear what it drew.
/// Sessions that already completed keep their `Completed` end record.
fn end_active_session(world: &mut World, end: SessionEnd) -> Option<SessionId> {
    let session = world.remove_resource::<TrackingSession>()?;
    let id = session.id();

    let dropped = world
        .get_resource_mut::<SimulationClock>()
        .map_or(0, |mut clock| clock.cancel_session(id));
    if let Some(mut map) = world.get_resource_mut::<MapSurfaceResource>() {
        for marker in [session.pickup_marker, session.provider_marker]
            .into_iter()
            .flatten()
        {
            map.0.remove_marker(marker);
        }
        if let Some(line) = session.route_line {
            map.0.remove_polyline(line);
        }
    }
    if !session.status().is_terminal() {
        if let Some(mut telemetry) = world.get_resource_mut::<TrackingTelemetry>() {
            telemetry.record_end(id, end);
        }
    }
    log::info!(
        "session {:?}: ended ({:?}) in {:?}, {} timers cancelled",
        id,
        end,
        session.status(),
        dropped
    );
    Some(id)
}
