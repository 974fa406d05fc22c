use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::map::MapSurfaceResource;
use crate::scenario::TrackingParams;
use crate::telemetry::TrackingTelemetry;
use crate::tracking::{StepOutcome, TrackingSession, TripStatus};

use super::owning_session;

/// One step of the animation timer. The next tick is only scheduled after
/// this one has mutated the session, so ticks never overlap.
pub fn step_tick_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<TrackingParams>,
    session: Option<ResMut<TrackingSession>>,
    mut map: Option<ResMut<MapSurfaceResource>>,
    mut telemetry: Option<ResMut<TrackingTelemetry>>,
) {
    if event.0.kind != EventKind::StepTick {
        return;
    }
    let Some(mut session) = owning_session(&event, session, telemetry.as_deref_mut()) else {
        return;
    };
    let id = session.id();
    let now = clock.now();

    match session.advance() {
        StepOutcome::Moved {
            position,
            eta_minutes,
            arriving,
        } => {
            if let Some(map) = map.as_deref_mut() {
                if let Some(marker) = session.provider_marker {
                    map.0.move_marker(marker, position);
                }
                map.0.pan_to(position);
            }
            if let Some(telemetry) = telemetry.as_deref_mut() {
                if let Some(eta) = eta_minutes {
                    telemetry.record_eta(now, id, eta, position);
                }
                if arriving {
                    telemetry.record_status(now, id, TripStatus::Arriving);
                }
            }
            clock.schedule_in(params.tick_ms, EventKind::StepTick, id);
        }
        StepOutcome::Arrived { complete } => {
            log::info!("session {:?}: provider arrived at pickup", id);
            if complete && clock.pending(id, EventKind::TripCompleted) == 0 {
                clock.schedule_in(params.completion_delay_ms, EventKind::TripCompleted, id);
            }
        }
        StepOutcome::Idle => {}
    }
}
