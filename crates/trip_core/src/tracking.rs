//! Trip tracking state machine.
//!
//! [`TrackingSession`] is the single live aggregate for a confirmed trip. All
//! status changes go through one monotonic transition check, and the per-tick
//! mutation is [`TrackingSession::advance`]. Timers live in the clock, map
//! handles are stored here so the session can clean up after itself.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::geo::{distance_meters, eta_minutes, Coordinate};
use crate::map::{MarkerId, PolylineId};
use crate::routing::Route;

/// Identity of one tracking session; every timer event carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Searching,
    ExpertAssigned,
    Arriving,
    /// Reserved for a dispatch phase the simulation does not run.
    InProgress,
    Completed,
}

impl TripStatus {
    fn rank(self) -> u8 {
        match self {
            TripStatus::Searching => 0,
            TripStatus::ExpertAssigned => 1,
            TripStatus::Arriving => 2,
            TripStatus::InProgress => 3,
            TripStatus::Completed => 4,
        }
    }

    /// Only strictly later statuses are reachable.
    pub fn can_transition_to(self, next: TripStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn is_terminal(self) -> bool {
        self == TripStatus::Completed
    }

    /// Provider is on the way (or about to arrive).
    pub fn is_en_route(self) -> bool {
        matches!(self, TripStatus::ExpertAssigned | TripStatus::Arriving)
    }
}

/// Mock identity of the assigned provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedProvider {
    pub name: String,
    pub phone: String,
    pub vehicle_number: String,
    pub rating: f32,
}

impl AssignedProvider {
    pub fn mock() -> Self {
        Self {
            name: "Rajesh Kumar".to_string(),
            phone: "+91 98765 43210".to_string(),
            vehicle_number: "KA-01-AB-1234".to_string(),
            rating: 4.8,
        }
    }
}

/// What one call to [`TrackingSession::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Provider moved to `position`. `eta_minutes` is `None` on the step
    /// that lands on the last route point, which leaves ETA and status as
    /// they were. `arriving` is set when this step switched the status to
    /// [`TripStatus::Arriving`].
    Moved {
        position: Coordinate,
        eta_minutes: Option<u32>,
        arriving: bool,
    },
    /// Cursor is at the end of the route. `complete` tells whether the trip
    /// should now be scheduled for completion.
    Arrived { complete: bool },
    /// Nothing to do: no route yet, or the trip is already completed.
    Idle,
}

/// Serializable view of a session for observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub session: SessionId,
    pub status: TripStatus,
    pub eta_minutes: Option<u32>,
    pub provider: Option<AssignedProvider>,
    pub cursor: usize,
    pub route_len: Option<usize>,
    pub fare: u32,
}

/// The live aggregate for one confirmed trip.
#[derive(Debug, Clone, Resource)]
pub struct TrackingSession {
    id: SessionId,
    status: TripStatus,
    pickup: Coordinate,
    provider_start: Coordinate,
    fare: u32,
    average_speed_kmh: f64,
    provider: Option<AssignedProvider>,
    eta_minutes: Option<u32>,
    route: Option<Route>,
    cursor: usize,
    pub(crate) pickup_marker: Option<MarkerId>,
    pub(crate) provider_marker: Option<MarkerId>,
    pub(crate) route_line: Option<PolylineId>,
}

impl TrackingSession {
    /// New session in [`TripStatus::Searching`]. The provider will start
    /// `start_offset_deg` south and west of the pickup.
    pub fn new(
        id: SessionId,
        pickup: Coordinate,
        fare: u32,
        start_offset_deg: f64,
        average_speed_kmh: f64,
    ) -> Self {
        Self {
            id,
            status: TripStatus::Searching,
            pickup,
            provider_start: pickup.offset(-start_offset_deg, -start_offset_deg),
            fare,
            average_speed_kmh,
            provider: None,
            eta_minutes: None,
            route: None,
            cursor: 0,
            pickup_marker: None,
            provider_marker: None,
            route_line: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> TripStatus {
        self.status
    }

    pub fn pickup(&self) -> Coordinate {
        self.pickup
    }

    pub fn provider_start(&self) -> Coordinate {
        self.provider_start
    }

    pub fn fare(&self) -> u32 {
        self.fare
    }

    pub fn provider(&self) -> Option<&AssignedProvider> {
        self.provider.as_ref()
    }

    pub fn eta_minutes(&self) -> Option<u32> {
        self.eta_minutes
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once the cursor has walked past the last route point.
    pub fn is_arrived(&self) -> bool {
        self.route
            .as_ref()
            .is_some_and(|route| self.cursor >= route.len())
    }

    fn transition_to(&mut self, next: TripStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        log::info!("session {:?}: {:?} -> {:?}", self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    /// Assign the provider and compute the first ETA from the straight-line
    /// distance between the provider's start and the pickup.
    pub fn assign_provider(&mut self, provider: AssignedProvider) -> Result<u32, TransitionError> {
        self.transition_to(TripStatus::ExpertAssigned)?;
        let distance_km = distance_meters(self.provider_start, self.pickup) / 1000.0;
        let eta = eta_minutes(distance_km, self.average_speed_kmh);
        self.provider = Some(provider);
        self.eta_minutes = Some(eta);
        Ok(eta)
    }

    /// Attach the resolved route and rewind the cursor. Only valid while the
    /// provider is en route and before any route was attached.
    pub fn attach_route(&mut self, route: Route) -> Result<(), TransitionError> {
        if !self.status.is_en_route() || self.route.is_some() {
            return Err(TransitionError {
                from: self.status,
                to: self.status,
            });
        }
        self.route = Some(route);
        self.cursor = 0;
        Ok(())
    }

    /// One step of the animation.
    ///
    /// While points remain: report `route[cursor]`, then move the cursor on.
    /// Before the last point the ETA is recomputed from the remaining route
    /// length and the status flips to `Arriving` once it drops to a minute or
    /// less. At the end of the route, report arrival without touching any
    /// state.
    pub fn advance(&mut self) -> StepOutcome {
        if self.status.is_terminal() {
            return StepOutcome::Idle;
        }
        let Some(route) = self.route.as_ref() else {
            return StepOutcome::Idle;
        };

        let Some(position) = route.get(self.cursor) else {
            return StepOutcome::Arrived {
                complete: self.status.is_en_route(),
            };
        };

        let mut eta = None;
        let mut arriving = false;
        if self.cursor + 1 < route.len() {
            let remaining_km = route.remaining_meters(self.cursor) / 1000.0;
            let minutes = eta_minutes(remaining_km, self.average_speed_kmh);
            self.eta_minutes = Some(minutes);
            eta = Some(minutes);
            arriving = minutes <= 1
                && self.status == TripStatus::ExpertAssigned
                && self.transition_to(TripStatus::Arriving).is_ok();
        }

        self.cursor += 1;
        StepOutcome::Moved {
            position,
            eta_minutes: eta,
            arriving,
        }
    }

    /// Final transition after the completion delay.
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        if !self.status.is_en_route() {
            return Err(TransitionError {
                from: self.status,
                to: TripStatus::Completed,
            });
        }
        self.transition_to(TripStatus::Completed)
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            session: self.id,
            status: self.status,
            eta_minutes: self.eta_minutes,
            provider: self.provider.clone(),
            cursor: self.cursor,
            route_len: self.route.as_ref().map(Route::len),
            fare: self.fare,
        }
    }
}
