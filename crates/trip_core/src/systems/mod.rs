pub mod provider_matched;
pub mod route_requested;
pub mod step_tick;
pub mod trip_completed;

use bevy_ecs::prelude::ResMut;

use crate::clock::CurrentEvent;
use crate::telemetry::TrackingTelemetry;
use crate::tracking::TrackingSession;

/// Liveness guard: the session the event was scheduled for, if it is still
/// the live one. Anything else is counted as stale and dropped.
pub(crate) fn owning_session<'w>(
    event: &CurrentEvent,
    session: Option<ResMut<'w, TrackingSession>>,
    telemetry: Option<&mut TrackingTelemetry>,
) -> Option<ResMut<'w, TrackingSession>> {
    match session {
        Some(session) if session.id() == event.0.session => Some(session),
        _ => {
            log::debug!(
                "dropping {:?} for session {:?}: not the live session",
                event.0.kind,
                event.0.session
            );
            if let Some(telemetry) = telemetry {
                telemetry.stale_events = telemetry.stale_events.saturating_add(1);
            }
            None
        }
    }
}
