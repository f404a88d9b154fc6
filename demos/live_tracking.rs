//! Example of a live tracking session with noise filtering.
//!
//! Run with: cargo run --example live_tracking

use life_tracker::{
    format_clock_secs, to_gpx, PositionSample, SessionTracker, SettingsUpdate, TrackerEvent,
    TrackingSettings,
};

fn main() {
    println!("Live Tracking Example\n");

    let mut tracker = SessionTracker::new(TrackingSettings::default());
    let events = tracker.subscribe();

    let start = match tracker.start() {
        Ok(t) => t,
        Err(e) => {
            println!("Could not start: {}", e);
            return;
        }
    };

    // A short walk along Broadway, one fix every 10 seconds
    let fixes = vec![
        PositionSample::new(40.7128, -74.0060, 8.0, start),
        PositionSample::new(40.71281, -74.00601, 6.0, start + 10_000), // jitter
        PositionSample::new(40.7134, -74.0055, 150.0, start + 20_000), // poor fix
        PositionSample::new(40.7136, -74.0054, 7.0, start + 30_000),
        PositionSample::new(40.7144, -74.0048, 9.0, start + 40_000).with_altitude(14.0),
        PositionSample::new(f64::NAN, -74.0048, 9.0, start + 45_000), // malformed
        PositionSample::new(40.7152, -74.0042, 5.0, start + 50_000),
    ];

    for fix in fixes {
        match tracker.accept_sample(fix) {
            Ok(accepted) => println!(
                "  + accepted: {} points, {:.1} m total (+{:.1} m)",
                accepted.point_count, accepted.total_distance, accepted.distance_delta
            ),
            Err(e) => println!("  - rejected ({:?}): {}", e.kind(), e),
        }
    }

    // Tighten the noise filter mid-session
    let settings = tracker.update_settings(&SettingsUpdate {
        minimum_distance: Some(20.0),
        ..Default::default()
    });
    println!("\nMinimum distance now {} m", settings.minimum_distance);

    let status = tracker.status(start + 60_000);
    println!(
        "Elapsed {}  distance {:.0} m  avg {:.1} km/h",
        format_clock_secs(status.elapsed_secs),
        status.distance,
        status.average_speed_kmh
    );

    let session = match tracker.stop() {
        Ok(session) => session,
        Err(e) => {
            println!("Could not stop: {}", e);
            return;
        }
    };

    let published: Vec<_> = events.try_iter().collect();
    let accepted = published
        .iter()
        .filter(|e| matches!(e, TrackerEvent::SampleAccepted(_)))
        .count();
    println!("\nObserver saw {} events ({} accepted samples)", published.len(), accepted);

    println!(
        "Session {}: {} points, {:.0} m, {:.1} km/h",
        session.id,
        session.points.len(),
        session.distance,
        session.average_speed_kmh
    );

    if let Some(bounds) = session.bounds() {
        let center = bounds.center();
        println!(
            "Closed: {}  bounds lat {:.4}..{:.4}, lng {:.4}..{:.4}, center ({:.4}, {:.4})",
            session.is_closed(),
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lng,
            bounds.max_lng,
            center.latitude,
            center.longitude
        );
    }

    match to_gpx(&session) {
        Ok(gpx) => println!("\nGPX export ({} bytes):\n{}", gpx.len(), gpx),
        Err(e) => println!("\nExport failed: {}", e),
    }
}
