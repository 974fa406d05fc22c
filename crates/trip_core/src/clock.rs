//! Discrete-event clock. Every timer in the engine is an event in here.
//!
//! The matching delay, the step timer and the completion delay are all
//! scheduled events tagged with the session that owns them, so cancelling a
//! session's timers is one [`SimulationClock::cancel_session`] call. Events
//! at the same timestamp pop in scheduling order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::tracking::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Matching delay elapsed; a provider gets assigned.
    ProviderMatched,
    /// Resolve the route from the provider's start to pickup.
    RouteRequested,
    /// One step of the animation timer.
    StepTick,
    /// Completion delay elapsed.
    TripCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub session: SessionId,
    seq: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being handled by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    /// Current simulation time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule at an absolute time. Times in the past are clamped to now.
    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, session: SessionId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: timestamp.max(self.now),
            kind,
            session,
            seq,
        });
    }

    /// Schedule `delay_ms` after now.
    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, session: SessionId) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, session);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Number of pending events of `kind` owned by `session`.
    pub fn pending(&self, session: SessionId, kind: EventKind) -> usize {
        self.events
            .iter()
            .filter(|e| e.session == session && e.kind == kind)
            .count()
    }

    /// Drop every pending event owned by `session`. Returns how many were dropped.
    pub fn cancel_session(&mut self, session: SessionId) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.session != session);
        before - self.events.len()
    }

    /// Drop pending events of one kind owned by `session`.
    pub fn cancel(&mut self, session: SessionId, kind: EventKind) -> usize {
        let before = self.events.len();
        self.events
            .retain(|e| !(e.session == session && e.kind == kind));
        before - self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SessionId = SessionId(1);
    const B: SessionId = SessionId(2);

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::StepTick, A);
        clock.schedule_at(5, EventKind::ProviderMatched, A);
        clock.schedule_at(20, EventKind::TripCompleted, A);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn past_timestamps_are_clamped_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(50, EventKind::ProviderMatched, A);
        clock.pop_next().expect("first event");

        clock.schedule_at(10, EventKind::StepTick, A);
        assert_eq!(clock.next_event_time(), Some(50));
        let late = clock.pop_next().expect("late event");
        assert_eq!(late.timestamp, 50);
        assert_eq!(clock.now(), 50);
    }

    #[test]
    fn same_timestamp_pops_in_scheduling_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(7, EventKind::StepTick, A);
        clock.schedule_at(7, EventKind::RouteRequested, A);
        clock.schedule_at(7, EventKind::ProviderMatched, B);

        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::StepTick,
                EventKind::RouteRequested,
                EventKind::ProviderMatched
            ]
        );
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::StepTick, A);
        clock.pop_next();
        clock.schedule_in(50, EventKind::StepTick, A);
        assert_eq!(clock.next_event_time(), Some(150));
    }

    #[test]
    fn cancel_session_only_touches_that_session() {
        let mut clock = SimulationClock::default();
        clock.schedule_in(1, EventKind::StepTick, A);
        clock.schedule_in(2, EventKind::ProviderMatched, A);
        clock.schedule_in(3, EventKind::StepTick, B);

        assert_eq!(clock.pending(A, EventKind::StepTick), 1);
        assert_eq!(clock.cancel_session(A), 2);
        assert_eq!(clock.len(), 1);
        assert_eq!(clock.pending(B, EventKind::StepTick), 1);
        assert_eq!(clock.cancel(B, EventKind::StepTick), 1);
        assert!(clock.is_empty());
    }
}
