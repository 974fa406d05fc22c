mod support;

use support::schedule::ScheduleRunner;
use support::world::TestWorldBuilder;
use trip_core::booking::TripRequest;
use trip_core::geo::{curved_offset, Coordinate};
use trip_core::map::MapCommand;
use trip_core::routing::{
    fetch_route, generate_fallback_route, CachedRouteProvider, Route, RouteProvider, RouteSource,
};
use trip_core::runner::start_tracking;
use trip_core::telemetry::TrackingTelemetry;
use trip_core::test_helpers::{
    EmptyRouteProvider, FailingRouteProvider, StaticRouteProvider, TEST_PICKUP,
};
use trip_core::tracking::{TrackingSession, TripStatus};

#[test]
fn routing_failure_yields_31_point_fallback() {
    support::init_logging();
    let routes = FailingRouteProvider::new();
    let (mut world, log) = TestWorldBuilder::new()
        .with_route_provider(routes.clone())
        .build();
    let mut runner = ScheduleRunner::new();
    start_tracking(&mut world, &TripRequest::default());
    runner.run_until(&mut world, 2_000);

    let session = world.resource::<TrackingSession>();
    let route = session.route().expect("route attached");
    assert_eq!(route.len(), 31);
    assert_eq!(route.source(), RouteSource::Fallback);
    assert!(route.origin().approx_eq(&session.provider_start(), 1e-9));
    assert!(route.destination().approx_eq(&TEST_PICKUP, 1e-9));
    assert_eq!(routes.calls(), 1);
    assert!(log
        .lock()
        .commands
        .iter()
        .any(|c| matches!(c, MapCommand::DrawPolyline { points: 31, .. })));

    runner.run_full(&mut world);
    assert_eq!(
        world.resource::<TrackingSession>().status(),
        TripStatus::Completed
    );
}

#[test]
fn empty_answer_uses_the_direct_path() {
    let (mut world, _) = TestWorldBuilder::new()
        .with_route_provider(EmptyRouteProvider)
        .build();
    let mut runner = ScheduleRunner::new();
    start_tracking(&mut world, &TripRequest::default());
    runner.run_full(&mut world);

    let session = world.resource::<TrackingSession>();
    let route = session.route().expect("route");
    assert_eq!(route.len(), 2);
    assert_eq!(route.source(), RouteSource::Direct);
    // Only the first tick updates the ETA; landing on the pickup keeps it.
    assert_eq!(session.status(), TripStatus::Completed);
    assert_eq!(session.eta_minutes(), Some(12));
}

#[test]
fn direct_route_completes_without_arriving() {
    let (mut world, log) = TestWorldBuilder::new()
        .with_route_provider(EmptyRouteProvider)
        .build();
    let mut runner = ScheduleRunner::new();
    let id = start_tracking(&mut world, &TripRequest::default());
    runner.run_full(&mut world);

    let telemetry = world.resource::<TrackingTelemetry>();
    assert_eq!(
        telemetry.statuses_for(id),
        vec![
            TripStatus::Searching,
            TripStatus::ExpertAssigned,
            TripStatus::Completed
        ]
    );
    assert_eq!(telemetry.etas_for(id), vec![12]);
    assert_eq!(log.lock().move_count(), 2);
}

#[test]
fn routed_geometry_is_walked_point_by_point() {
    let start = TEST_PICKUP.offset(-0.05, -0.05);
    let points = vec![
        start,
        Coordinate::new(12.94, 77.55),
        Coordinate::new(12.96, 77.58),
        TEST_PICKUP,
    ];
    let route = Route::new(points.clone(), RouteSource::Routed).expect("route");
    let routes = StaticRouteProvider::new(route);
    let (mut world, log) = TestWorldBuilder::new()
        .with_route_provider(routes.clone())
        .build();
    let mut runner = ScheduleRunner::new();
    start_tracking(&mut world, &TripRequest::default());
    runner.run_full(&mut world);

    let moved: Vec<Coordinate> = log
        .lock()
        .commands
        .iter()
        .filter_map(|c| match c {
            MapCommand::MoveMarker { position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(moved, points);
    assert_eq!(routes.calls(), 1);
}

#[test]
fn fallback_curve_starts_and_ends_on_the_endpoints() {
    let start = Coordinate::new(12.9216, 77.5446);
    let route = generate_fallback_route(start, TEST_PICKUP, 30);
    assert_eq!(route.len(), 31);
    assert!(route.origin().approx_eq(&start, 1e-9));
    assert!(route.destination().approx_eq(&TEST_PICKUP, 1e-9));
    assert!(curved_offset(0.0).abs() < 1e-12);
    assert!(curved_offset(1.0).abs() < 1e-12);
}

#[test]
fn cache_does_not_remember_failures() {
    let failing = FailingRouteProvider::new();
    let cached = CachedRouteProvider::new(Box::new(failing.clone()), 8);
    let start = TEST_PICKUP.offset(-0.05, -0.05);

    let first = fetch_route(&cached, start, TEST_PICKUP);
    let second = fetch_route(&cached, start, TEST_PICKUP);
    assert_eq!(first.source(), RouteSource::Fallback);
    assert_eq!(first, second);
    assert_eq!(failing.calls(), 2);
    assert_eq!(cached.cached_len(), 0);

    let fixed = StaticRouteProvider::new(Route::direct(start, TEST_PICKUP));
    let cached = CachedRouteProvider::new(Box::new(fixed.clone()), 8);
    for _ in 0..3 {
        assert!(cached.route(start, TEST_PICKUP).expect("route").is_some());
    }
    assert_eq!(fixed.calls(), 1);
}
