use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::telemetry::{SessionEnd, TrackingTelemetry};
use crate::tracking::{TrackingSession, TripStatus};

use super::owning_session;

/// Completion delay elapsed: mark the trip completed and stop every timer the
/// session still owns.
pub fn trip_completed_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    session: Option<ResMut<TrackingSession>>,
    mut telemetry: Option<ResMut<TrackingTelemetry>>,
) {
    if event.0.kind != EventKind::TripCompleted {
        return;
    }
    let Some(mut session) = owning_session(&event, session, telemetry.as_deref_mut()) else {
        return;
    };

    if let Err(err) = session.complete() {
        log::debug!("ignoring completion: {}", err);
        return;
    }

    let id = session.id();
    let dropped = clock.cancel_session(id);
    if dropped > 0 {
        log::debug!("session {:?}: cancelled {} pending timers", id, dropped);
    }
    if let Some(telemetry) = telemetry.as_deref_mut() {
        telemetry.record_status(clock.now(), id, TripStatus::Completed);
        telemetry.record_end(id, SessionEnd::Completed);
    }
}
