//! Book a pickup at the default location and print the tracking timeline.
//!
//! Run with: RUST_LOG=info cargo run -p trip_core --example tracking_run

use trip_core::booking::BookingFlow;
use trip_core::map::RecordingMapSurface;
use trip_core::scenario::TrackingParams;
use trip_core::test_helpers::{StaticGeocoder, TEST_PICKUP};
use trip_core::view::TrackingView;

fn main() {
    env_logger::init();

    let params = TrackingParams::default().with_seed(123);

    let mut booking = BookingFlow::new(Box::new(RecordingMapSurface::new()), &params);
    booking
        .use_current_location(&StaticGeocoder::default(), Ok(TEST_PICKUP))
        .expect("pickup on land");
    println!("--- Booking ---");
    for provider in booking.providers() {
        println!("  {} at {}", provider.display_name, provider.position);
    }
    let request = booking.confirm_booking().expect("pickup selected");
    println!("Fare: {}  Pickup: {}", request.fare, request.pickup);

    let mut view = TrackingView::open(params, Box::new(RecordingMapSurface::new()), &request);
    let steps = view.run_to_end(10_000);

    println!("\n--- Tracking ({} steps, {} ms) ---", steps, view.now_ms());
    if let Some(telemetry) = view.telemetry() {
        for change in &telemetry.status_changes {
            println!("  {:>6} ms  {:?}", change.at_ms, change.status);
        }
        let etas: Vec<String> = telemetry
            .eta_samples
            .iter()
            .map(|s| s.eta_minutes.to_string())
            .collect();
        println!("ETA per tick (min): {}", etas.join(" "));
    }
    if let Some(snapshot) = view.snapshot() {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("\nFinal snapshot:\n{}", json),
            Err(err) => eprintln!("snapshot not serializable: {}", err),
        }
    }
}
