//! # Life Tracker
//!
//! GPS life-logging engine: live session tracking and daily timeline
//! reconstruction from raw position samples.
//!
//! This library provides:
//! - A session tracker that filters noisy fixes and accumulates distance
//! - Spatio-temporal clustering of dwell periods
//! - Movement segmentation with transport-mode classification
//! - Place discovery and visit detection
//! - A grouped, time-ordered daily timeline
//! - GPX/CSV/JSON export and lifetime statistics
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel timeline computation with rayon
//! - **`serde`** - Serialize/deserialize all data and config types, JSON export
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use life_tracker::{compute_timeline, DaySummary, Place, PositionSample};
//!
//! // A day's samples, as loaded from storage
//! let samples: Vec<PositionSample> = (0..=30)
//!     .map(|i| PositionSample::new(51.5074, -0.1278, 12.0, i * 60_000))
//!     .collect();
//! let home = Place::new("home", "Home", 51.5074, -0.1278).with_category("home");
//!
//! let groups = compute_timeline(&samples, &[home]);
//! let summary = DaySummary::from_groups(&groups);
//! assert_eq!(summary.places_visited, 1);
//! ```

// Geographic math shared by every component
pub mod geo_utils;
pub use geo_utils::{distance, haversine_distance, polyline_length, EARTH_RADIUS_METERS};

pub mod error;
pub use error::{ErrorKind, ExportError, TrackerError};

// Live tracking
pub mod tracker;
pub use tracker::{
    Clock, SampleAccepted, Session, SessionTracker, SettingsUpdate, SharedTracker, SystemClock,
    TrackerEvent, TrackingSettings, TrackingStatus,
};

// Batch timeline pipeline
pub mod clustering;
pub use clustering::{cluster_samples, Cluster, ClusterConfig, SpatioTemporalClusterer};

pub mod movement;
pub use movement::{detect_movements, MovementConfig, MovementEvent, TransportMode};

pub mod places;
pub use places::{
    detect_place_visits, detect_places, tally_visits, Place, PlaceConfig, PlaceVisitEvent,
    DEFAULT_PLACE_RADIUS,
};
#[cfg(feature = "parallel")]
pub use places::detect_place_visits_parallel;

pub mod timeline;
pub use timeline::{
    assemble_events, compute_timeline, compute_timeline_with_config, format_clock_secs,
    format_duration_ms, group_events, DaySummary, TimelineConfig, TimelineEvent, TimelineGroup,
};
#[cfg(feature = "parallel")]
pub use timeline::compute_timeline_parallel;

// Output
pub mod export;
pub use export::{export_filename, export_session, to_csv, to_gpx, ExportFormat};
#[cfg(feature = "serde")]
pub use export::to_json;

pub mod stats;
pub use stats::TrackingStatistics;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("LifeTrackerRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use life_tracker::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points; `None` for empty input.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// One raw position reading.
///
/// Samples are immutable values; the optional fields are whatever the
/// location provider reported.
///
/// # Example
/// ```
/// use life_tracker::PositionSample;
///
/// let fix = PositionSample::new(51.5074, -0.1278, 8.0, 1_700_000_000_000)
///     .with_altitude(35.0)
///     .with_speed(1.4);
/// assert!(fix.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// 1-sigma accuracy radius, meters
    pub accuracy: f64,
    /// Meters above sea level
    #[cfg_attr(feature = "serde", serde(default))]
    pub altitude: Option<f64>,
    /// Degrees clockwise from true north
    #[cfg_attr(feature = "serde", serde(default))]
    pub heading: Option<f64>,
    /// Device-reported speed, m/s
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            altitude: None,
            heading: None,
            speed: None,
            timestamp,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Finite, in-range coordinates and a finite, non-negative accuracy.
    pub fn is_valid(&self) -> bool {
        self.point().is_valid() && self.accuracy.is_finite() && self.accuracy >= 0.0
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};
    use std::sync::Arc;

    /// Outcome of feeding one sample to the tracker.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiSampleResult {
        pub accepted: bool,
        /// Why the sample was dropped (None when accepted)
        pub rejection: Option<ErrorKind>,
        pub message: Option<String>,
        pub total_distance: f64,
        pub point_count: u32,
    }

    /// Live tracker handle for mobile. All calls are serialized internally.
    #[derive(uniffi::Object)]
    pub struct FfiSessionTracker {
        inner: SharedTracker,
    }

    #[uniffi::export]
    impl FfiSessionTracker {
        #[uniffi::constructor]
        pub fn new(settings: TrackingSettings) -> Arc<Self> {
            init_logging();
            info!("[LifeTrackerRust] Tracker created: {:?}", settings);
            Arc::new(Self {
                inner: SharedTracker::new(SessionTracker::new(settings)),
            })
        }

        /// Start tracking. Returns the start time, or None if already tracking.
        pub fn start(&self) -> Option<i64> {
            self.inner.start().ok()
        }

        /// Stop tracking. Returns the finalized session, or None if idle.
        pub fn stop(&self) -> Option<Session> {
            self.inner.stop().ok()
        }

        pub fn accept_sample(&self, sample: PositionSample) -> FfiSampleResult {
            match self.inner.accept_sample(sample) {
                Ok(accepted) => FfiSampleResult {
                    accepted: true,
                    rejection: None,
                    message: None,
                    total_distance: accepted.total_distance,
                    point_count: accepted.point_count as u32,
                },
                Err(e) => {
                    let status = self.inner.status(0);
                    FfiSampleResult {
                        accepted: false,
                        rejection: Some(e.kind()),
                        message: Some(e.to_string()),
                        total_distance: status.distance,
                        point_count: status.point_count,
                    }
                }
            }
        }

        pub fn is_tracking(&self) -> bool {
            self.inner.is_tracking()
        }

        pub fn current_settings(&self) -> TrackingSettings {
            self.inner.current_settings()
        }

        pub fn update_settings(&self, update: SettingsUpdate) -> TrackingSettings {
            self.inner.update_settings(&update)
        }

        pub fn status(&self, now_ms: i64) -> TrackingStatus {
            self.inner.status(now_ms)
        }

        pub fn current_session(&self) -> Option<Session> {
            self.inner.current_session()
        }
    }

    /// Timeline entry flattened for the FFI: exactly one of the two is set.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiTimelineEvent {
        pub timestamp: i64,
        pub movement: Option<MovementEvent>,
        pub place_visit: Option<PlaceVisitEvent>,
    }

    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiTimelineGroup {
        pub start_time: i64,
        pub end_time: i64,
        pub events: Vec<FfiTimelineEvent>,
    }

    /// A computed day: grouped events plus totals.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiDayTimeline {
        pub groups: Vec<FfiTimelineGroup>,
        pub summary: DaySummary,
    }

    impl From<TimelineGroup> for FfiTimelineGroup {
        fn from(group: TimelineGroup) -> Self {
            let events = group
                .events
                .into_iter()
                .map(|event| {
                    let timestamp = event.timestamp();
                    match event {
                        TimelineEvent::Movement(m) => FfiTimelineEvent {
                            timestamp,
                            movement: Some(m),
                            place_visit: None,
                        },
                        TimelineEvent::PlaceVisit(v) => FfiTimelineEvent {
                            timestamp,
                            movement: None,
                            place_visit: Some(v),
                        },
                    }
                })
                .collect();
            FfiTimelineGroup {
                start_time: group.start_time,
                end_time: group.end_time,
                events,
            }
        }
    }

    /// Compute a day's timeline from stored samples and known places.
    #[uniffi::export]
    pub fn ffi_compute_timeline(
        samples: Vec<PositionSample>,
        known_places: Vec<Place>,
        config: TimelineConfig,
    ) -> FfiDayTimeline {
        init_logging();
        info!(
            "[LifeTrackerRust] compute_timeline called with {} samples, {} known places",
            samples.len(),
            known_places.len()
        );

        let start = std::time::Instant::now();
        let groups = compute_timeline_parallel(&samples, &known_places, &config);
        let summary = DaySummary::from_groups(&groups);

        info!(
            "[LifeTrackerRust] {} groups, {} visits, {} movements in {:?}",
            groups.len(),
            summary.places_visited,
            summary.movement_count,
            start.elapsed()
        );

        FfiDayTimeline {
            groups: groups.into_iter().map(FfiTimelineGroup::from).collect(),
            summary,
        }
    }

    /// Places with visit counts bumped by the given visits.
    #[uniffi::export]
    pub fn ffi_tally_visits(places: Vec<Place>, visits: Vec<PlaceVisitEvent>) -> Vec<Place> {
        tally_visits(&places, &visits)
    }

    /// Export a session; None if the format is unknown or the session is empty.
    #[uniffi::export]
    pub fn ffi_export_session(session: Session, format: ExportFormat) -> Option<String> {
        init_logging();
        match export_session(&session, format) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("[LifeTrackerRust] Export failed: {}", e);
                None
            }
        }
    }

    #[uniffi::export]
    pub fn ffi_tracking_statistics(sessions: Vec<Session>) -> TrackingStatistics {
        TrackingStatistics::from_sessions(&sessions)
    }

    #[uniffi::export]
    pub fn ffi_format_duration(duration_ms: i64) -> String {
        format_duration_ms(duration_ms)
    }

    /// Get default tracker settings.
    #[uniffi::export]
    pub fn default_tracking_settings() -> TrackingSettings {
        init_logging();
        info!("[LifeTrackerRust] default_tracking_settings called - Rust is active!");
        TrackingSettings::default()
    }

    /// Get default timeline configuration.
    #[uniffi::export]
    pub fn default_timeline_config() -> TimelineConfig {
        TimelineConfig::default()
    }
}

#[cfg(feature = "ffi")]
pub use ffi::*;

// ============================================================================
// Tests
// ============================================================================
