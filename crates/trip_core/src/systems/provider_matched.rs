use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::map::{MapSurfaceResource, MarkerKind};
use crate::telemetry::TrackingTelemetry;
use crate::tracking::{AssignedProvider, TrackingSession, TripStatus};

use super::owning_session;

/// Matching delay elapsed: assign the mock provider, show it at its start
/// position and ask for a route to the pickup.
pub fn provider_matched_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    session: Option<ResMut<TrackingSession>>,
    mut map: Option<ResMut<MapSurfaceResource>>,
    mut telemetry: Option<ResMut<TrackingTelemetry>>,
) {
    if event.0.kind != EventKind::ProviderMatched {
        return;
    }
    let Some(mut session) = owning_session(&event, session, telemetry.as_deref_mut()) else {
        return;
    };

    let provider = AssignedProvider::mock();
    let label = provider.name.clone();
    let eta = match session.assign_provider(provider) {
        Ok(eta) => eta,
        Err(err) => {
            log::debug!("ignoring provider match: {}", err);
            return;
        }
    };
    log::info!(
        "session {:?}: provider assigned, initial ETA {} min",
        session.id(),
        eta
    );

    if let Some(map) = map.as_deref_mut() {
        let marker = map.0.place_marker(
            MarkerKind::AssignedProvider,
            session.provider_start(),
            Some(label.as_str()),
        );
        session.provider_marker = Some(marker);
    }
    if let Some(telemetry) = telemetry.as_deref_mut() {
        telemetry.record_status(clock.now(), session.id(), TripStatus::ExpertAssigned);
    }

    clock.schedule_in(0, EventKind::RouteRequested, session.id());
}
