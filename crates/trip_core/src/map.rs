//! Map surface capability: the narrow set of drawing commands the engine issues.
//!
//! Rendering is somebody else's problem. Booking and tracking only place,
//! move and remove markers, draw one polyline, and steer the viewport.
//! [`RecordingMapSurface`] keeps a shared log of every command so tests can
//! assert on what would have been drawn.

use std::sync::{Arc, Mutex, MutexGuard};

use bevy_ecs::prelude::Resource;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolylineId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Pickup,
    /// One of the synthesized nearby providers shown while booking.
    NearbyProvider,
    /// The provider assigned to the live trip.
    AssignedProvider,
}

pub trait MapSurface: Send + Sync {
    fn place_marker(&mut self, kind: MarkerKind, position: Coordinate, label: Option<&str>)
        -> MarkerId;
    fn move_marker(&mut self, marker: MarkerId, position: Coordinate);
    fn remove_marker(&mut self, marker: MarkerId);
    fn draw_polyline(&mut self, points: &[Coordinate]) -> PolylineId;
    fn remove_polyline(&mut self, polyline: PolylineId);
    /// Fit the viewport around `points`, keeping `padding_px` clear at the edges.
    fn fit_bounds(&mut self, points: &[Coordinate], padding_px: u32);
    fn pan_to(&mut self, position: Coordinate);
    /// Tear the surface down. Further commands are ignored.
    fn release(&mut self);
}

/// ECS resource wrapping a boxed map surface.
#[derive(Resource)]
pub struct MapSurfaceResource(pub Box<dyn MapSurface>);

#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    PlaceMarker {
        id: MarkerId,
        kind: MarkerKind,
        position: Coordinate,
        label: Option<String>,
    },
    MoveMarker {
        id: MarkerId,
        position: Coordinate,
    },
    RemoveMarker(MarkerId),
    DrawPolyline {
        id: PolylineId,
        points: usize,
    },
    RemovePolyline(PolylineId),
    FitBounds {
        points: usize,
        padding_px: u32,
    },
    PanTo(Coordinate),
    Release,
}

/// Everything a [`RecordingMapSurface`] was asked to do, plus the live markers.
#[derive(Debug, Default)]
pub struct MapLog {
    pub commands: Vec<MapCommand>,
    pub markers: Vec<(MarkerId, MarkerKind, Coordinate)>,
    pub polylines: Vec<PolylineId>,
    pub released: bool,
}

impl MapLog {
    pub fn markers_of(&self, kind: MarkerKind) -> Vec<Coordinate> {
        self.markers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, position)| *position)
            .collect()
    }

    pub fn move_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MapCommand::MoveMarker { .. }))
            .count()
    }
}

/// Shared handle to a [`MapLog`]; clone it before boxing the surface.
#[derive(Debug, Clone, Default)]
pub struct MapLogHandle(Arc<Mutex<MapLog>>);

impl MapLogHandle {
    /// Lock the log. A poisoned lock still yields the data.
    pub fn lock(&self) -> MutexGuard<'_, MapLog> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-memory surface that records commands instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingMapSurface {
    log: MapLogHandle,
    next_id: u64,
}

impl RecordingMapSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MapLogHandle {
        self.log.clone()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&self, command: MapCommand) -> Option<MutexGuard<'_, MapLog>> {
        let mut log = self.log.lock();
        if log.released {
            return None;
        }
        log.commands.push(command);
        Some(log)
    }
}

impl MapSurface for RecordingMapSurface {
    fn place_marker(
        &mut self,
        kind: MarkerKind,
        position: Coordinate,
        label: Option<&str>,
    ) -> MarkerId {
        let id = MarkerId(self.next_id());
        let command = MapCommand::PlaceMarker {
            id,
            kind,
            position,
            label: label.map(str::to_string),
        };
        if let Some(mut log) = self.record(command) {
            log.markers.push((id, kind, position));
        }
        id
    }

    fn move_marker(&mut self, marker: MarkerId, position: Coordinate) {
        if let Some(mut log) = self.record(MapCommand::MoveMarker {
            id: marker,
            position,
        }) {
            if let Some(entry) = log.markers.iter_mut().find(|(id, _, _)| *id == marker) {
                entry.2 = position;
            }
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if let Some(mut log) = self.record(MapCommand::RemoveMarker(marker)) {
            log.markers.retain(|(id, _, _)| *id != marker);
        }
    }

    fn draw_polyline(&mut self, points: &[Coordinate]) -> PolylineId {
        let id = PolylineId(self.next_id());
        if let Some(mut log) = self.record(MapCommand::DrawPolyline {
            id,
            points: points.len(),
        }) {
            log.polylines.push(id);
        }
        id
    }

    fn remove_polyline(&mut self, polyline: PolylineId) {
        if let Some(mut log) = self.record(MapCommand::RemovePolyline(polyline)) {
            log.polylines.retain(|id| *id != polyline);
        }
    }

    fn fit_bounds(&mut self, points: &[Coordinate], padding_px: u32) {
        self.record(MapCommand::FitBounds {
            points: points.len(),
            padding_px,
        });
    }

    fn pan_to(&mut self, position: Coordinate) {
        self.record(MapCommand::PanTo(position));
    }

    fn release(&mut self) {
        if let Some(mut log) = self.record(MapCommand::Release) {
            log.markers.clear();
            log.polylines.clear();
            log.released = true;
        }
    }
}
