//! Telemetry: an in-memory trail of what tracking did, for observers and tests.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::geo::Coordinate;
use crate::tracking::{SessionId, TripStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusChange {
    pub at_ms: u64,
    pub session: SessionId,
    pub status: TripStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EtaSample {
    pub at_ms: u64,
    pub session: SessionId,
    pub eta_minutes: u32,
    pub position: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEnd {
    Completed,
    Cancelled,
    TornDown,
}

/// Collects tracking telemetry. Insert as a resource to record a run.
#[derive(Debug, Default, Resource, Serialize)]
pub struct TrackingTelemetry {
    pub status_changes: Vec<StatusChange>,
    pub eta_samples: Vec<EtaSample>,
    pub ended: Vec<(SessionId, SessionEnd)>,
    /// Events dropped because their session was gone or already finished.
    pub stale_events: u64,
}

impl TrackingTelemetry {
    pub fn record_status(&mut self, at_ms: u64, session: SessionId, status: TripStatus) {
        self.status_changes.push(StatusChange {
            at_ms,
            session,
            status,
        });
    }

    pub fn record_eta(
        &mut self,
        at_ms: u64,
        session: SessionId,
        eta_minutes: u32,
        position: Coordinate,
    ) {
        self.eta_samples.push(EtaSample {
            at_ms,
            session,
            eta_minutes,
            position,
        });
    }

    pub fn record_end(&mut self, session: SessionId, end: SessionEnd) {
        self.ended.push((session, end));
    }

    /// Status sequence of one session, in order.
    pub fn statuses_for(&self, session: SessionId) -> Vec<TripStatus> {
        self.status_changes
            .iter()
            .filter(|c| c.session == session)
            .map(|c| c.status)
            .collect()
    }

    /// ETA values of one session, in tick order.
    pub fn etas_for(&self, session: SessionId) -> Vec<u32> {
        self.eta_samples
            .iter()
            .filter(|s| s.session == session)
            .map(|s| s.eta_minutes)
            .collect()
    }
}
