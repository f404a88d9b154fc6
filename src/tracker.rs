//! # Live Session Tracking
//!
//! Consumes raw position samples one at a time and accumulates the active
//! tracking [`Session`]: accepted points, cumulative distance, and on stop the
//! final duration and average speed.
//!
//! ## State machine
//!
//! ```text
//!   Idle --start()--> Active --stop()--> Idle
//! ```
//!
//! `start()` while active and `stop()` while idle are no-ops reported as
//! [`TrackerError::AlreadyTracking`] / [`TrackerError::NotTracking`].
//!
//! ## Sample filtering
//!
//! While active, [`SessionTracker::accept_sample`] drops
//! 1. malformed samples (non-finite coordinates, going back in time),
//! 2. readings whose accuracy radius exceeds `max_accuracy` (100 m),
//! 3. readings closer than `minimum_distance` (5 m) to the last accepted one.
//!
//! Everything else is appended and its distance from the previous accepted
//! sample is added to the session total.
//!
//! ## Example
//!
//! ```rust
//! use life_tracker::{PositionSample, SessionTracker, TrackingSettings};
//!
//! let mut tracker = SessionTracker::new(TrackingSettings::default());
//! tracker.start().unwrap();
//!
//! tracker.accept_sample(PositionSample::new(40.7128, -74.0060, 10.0, 0)).unwrap();
//! tracker.accept_sample(PositionSample::new(40.7138, -74.0060, 10.0, 60_000)).unwrap();
//!
//! let session = tracker.stop().unwrap();
//! assert_eq!(session.points.len(), 2);
//! assert!((session.distance - 111.2).abs() < 0.5);
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::error::TrackerError;
use crate::geo_utils::haversine_distance;
use crate::{Bounds, PositionSample};

// ============================================================================
// Settings
// ============================================================================

/// Tracker configuration.
///
/// `update_interval_ms`, `high_accuracy`, `max_age_ms` and `timeout_ms` are
/// hints for the location provider and pass through untouched; the tracker
/// itself only enforces `minimum_distance` and `max_accuracy`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackingSettings {
    /// Sampling interval hint for the provider. Default: 10,000 ms
    pub update_interval_ms: u64,
    /// Request high-accuracy fixes from the provider. Default: true
    pub high_accuracy: bool,
    /// Maximum age of a cached fix the provider may return. Default: 30,000 ms
    pub max_age_ms: u64,
    /// Provider timeout for a single fix. Default: 60,000 ms
    pub timeout_ms: u64,
    /// Samples closer than this to the last accepted one are dropped. Default: 5.0 m
    pub minimum_distance: f64,
    /// Samples with a worse accuracy radius are dropped. Default: 100.0 m
    pub max_accuracy: f64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: 10_000,
            high_accuracy: true,
            max_age_ms: 30_000,
            timeout_ms: 60_000,
            minimum_distance: 5.0,
            max_accuracy: 100.0,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SettingsUpdate {
    pub update_interval_ms: Option<u64>,
    pub high_accuracy: Option<bool>,
    pub max_age_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub minimum_distance: Option<f64>,
    pub max_accuracy: Option<f64>,
}

impl TrackingSettings {
    /// Merge a partial update into these settings.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(v) = update.update_interval_ms {
            self.update_interval_ms = v;
        }
        if let Some(v) = update.high_accuracy {
            self.high_accuracy = v;
        }
        if let Some(v) = update.max_age_ms {
            self.max_age_ms = v;
        }
        if let Some(v) = update.timeout_ms {
            self.timeout_ms = v;
        }
        if let Some(v) = update.minimum_distance {
            self.minimum_distance = v;
        }
        if let Some(v) = update.max_accuracy {
            self.max_accuracy = v;
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// One continuous tracking interval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Session {
    /// Session identifier (start time in ms, as a string)
    pub id: String,
    /// Tracking start, ms since epoch
    pub start_time: i64,
    /// Tracking stop, ms since epoch (`None` while active)
    pub end_time: Option<i64>,
    /// Accepted samples in arrival order
    pub points: Vec<PositionSample>,
    /// Cumulative distance between consecutive accepted samples, meters
    pub distance: f64,
    /// Wall-clock duration, seconds (finalized on stop)
    pub duration_secs: f64,
    /// `distance / duration * 3.6`, km/h (finalized on stop)
    pub average_speed_kmh: f64,
}

impl Session {
    fn new(start_time: i64) -> Self {
        Self {
            id: start_time.to_string(),
            start_time,
            end_time: None,
            points: Vec::new(),
            distance: 0.0,
            duration_secs: 0.0,
            average_speed_kmh: 0.0,
        }
    }

    /// Whether the session has been closed by `stop()`.
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Bounding box of the accepted points, for map rendering.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<_> = self.points.iter().map(PositionSample::point).collect();
        Bounds::from_points(&points)
    }

    fn finalize(&mut self, end_time: i64) {
        self.end_time = Some(end_time);
        self.duration_secs = (end_time - self.start_time) as f64 / 1000.0;
        self.average_speed_kmh = average_speed_kmh(self.distance, self.duration_secs);
    }
}

/// Average speed in km/h; 0 when the duration is not positive.
pub fn average_speed_kmh(distance_m: f64, duration_secs: f64) -> f64 {
    if duration_secs > 0.0 {
        distance_m / duration_secs * 3.6
    } else {
        0.0
    }
}

/// Result of an accepted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleAccepted {
    /// Distance added by this sample (0 for the first one), meters
    pub distance_delta: f64,
    /// Session distance after this sample, meters
    pub total_distance: f64,
    /// Number of points in the session after this sample
    pub point_count: usize,
}

/// Live view of the tracker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackingStatus {
    pub is_tracking: bool,
    pub point_count: u32,
    pub distance: f64,
    pub elapsed_secs: f64,
    pub average_speed_kmh: f64,
}

/// Notifications published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Started { start_time: i64 },
    SampleAccepted(PositionSample),
    Stopped(Session),
}

// ============================================================================
// Clock
// ============================================================================

/// Source of "now" for session start/stop times.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Wall clock (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Session Tracker
// ============================================================================

/// Live tracking state machine. At most one session is active at a time.
pub struct SessionTracker {
    settings: TrackingSettings,
    clock: Box<dyn Clock>,
    session: Option<Session>,
    last_position: Option<PositionSample>,
    subscribers: Vec<Sender<TrackerEvent>>,
}

impl SessionTracker {
    /// Create an idle tracker using the system clock.
    pub fn new(settings: TrackingSettings) -> Self {
        Self::with_clock(settings, Box::new(SystemClock))
    }

    /// Create an idle tracker with a custom clock.
    pub fn with_clock(settings: TrackingSettings, clock: Box<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            session: None,
            last_position: None,
            subscribers: Vec::new(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if tracking.
    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Last accepted sample of the active session.
    pub fn last_position(&self) -> Option<&PositionSample> {
        self.last_position.as_ref()
    }

    pub fn current_settings(&self) -> TrackingSettings {
        self.settings.clone()
    }

    /// Merge a partial update and return the resulting settings.
    ///
    /// Allowed while tracking; applies from the next sample on and never
    /// touches points already accepted.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> TrackingSettings {
        self.settings.apply(update);
        debug!("Settings updated: {:?}", self.settings);
        self.settings.clone()
    }

    /// Register an observer. Events are delivered in order; dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<TrackerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Idle -> Active. Starts an empty session stamped with the clock's now.
    pub fn start(&mut self) -> Result<i64, TrackerError> {
        if self.session.is_some() {
            debug!("start() ignored: tracking already active");
            return Err(TrackerError::AlreadyTracking);
        }

        let start_time = self.clock.now_ms();
        self.session = Some(Session::new(start_time));
        self.last_position = None;
        info!("Tracking started at {}", start_time);

        self.publish(TrackerEvent::Started { start_time });
        Ok(start_time)
    }

    /// Active -> Idle. Finalizes and hands back the closed session.
    pub fn stop(&mut self) -> Result<Session, TrackerError> {
        let mut session = self.session.take().ok_or_else(|| {
            debug!("stop() ignored: tracking not active");
            TrackerError::NotTracking
        })?;
        self.last_position = None;

        session.finalize(self.clock.now_ms());
        info!(
            "Tracking stopped: {} points, {:.0} m in {:.0} s ({:.1} km/h)",
            session.points.len(),
            session.distance,
            session.duration_secs,
            session.average_speed_kmh
        );

        self.publish(TrackerEvent::Stopped(session.clone()));
        Ok(session)
    }

    /// Feed one raw sample into the active session.
    ///
    /// Rejections leave the session untouched; the error tells the caller
    /// whether the sample was malformed, noise, or arrived while idle.
    pub fn accept_sample(&mut self, sample: PositionSample) -> Result<SampleAccepted, TrackerError> {
        let session = self.session.as_mut().ok_or(TrackerError::NotTracking)?;

        if !sample.is_valid() {
            return Err(TrackerError::invalid(format!(
                "non-finite or out-of-range fix ({}, {}, accuracy {})",
                sample.latitude, sample.longitude, sample.accuracy
            )));
        }

        if sample.accuracy > self.settings.max_accuracy {
            debug!("Low accuracy reading ignored: {} m", sample.accuracy);
            return Err(TrackerError::LowAccuracy {
                accuracy: sample.accuracy,
                limit: self.settings.max_accuracy,
            });
        }

        let mut distance_delta = 0.0;
        if let Some(prev) = &self.last_position {
            if sample.timestamp < prev.timestamp {
                return Err(TrackerError::invalid(format!(
                    "timestamp {} precedes last accepted {}",
                    sample.timestamp, prev.timestamp
                )));
            }

            let d = haversine_distance(&prev.point(), &sample.point());
            if d < self.settings.minimum_distance {
                debug!("Movement too small, ignored: {:.2} m", d);
                return Err(TrackerError::BelowMinimumDistance {
                    distance: d,
                    minimum: self.settings.minimum_distance,
                });
            }
            distance_delta = d;
        }

        session.points.push(sample.clone());
        session.distance += distance_delta;
        let accepted = SampleAccepted {
            distance_delta,
            total_distance: session.distance,
            point_count: session.points.len(),
        };

        self.last_position = Some(sample.clone());
        self.publish(TrackerEvent::SampleAccepted(sample));
        Ok(accepted)
    }

    /// Live statistics at `now_ms` (zeroed when idle).
    pub fn status(&self, now_ms: i64) -> TrackingStatus {
        match &self.session {
            Some(session) => {
                let elapsed_secs = ((now_ms - session.start_time) as f64 / 1000.0).max(0.0);
                TrackingStatus {
                    is_tracking: true,
                    point_count: session.points.len() as u32,
                    distance: session.distance,
                    elapsed_secs,
                    average_speed_kmh: average_speed_kmh(session.distance, elapsed_secs),
                }
            }
            None => TrackingStatus {
                is_tracking: false,
                point_count: 0,
                distance: 0.0,
                elapsed_secs: 0.0,
                average_speed_kmh: 0.0,
            },
        }
    }

    fn publish(&mut self, event: TrackerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(TrackingSettings::default())
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Cloneable, thread-safe handle serializing all access to one tracker.
#[derive(Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<SessionTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: SessionTracker) -> Self {
        Self { inner: Arc::new(Mutex::new(tracker)) }
    }

    // A panic inside a tracker call cannot leave a half-applied sample behind
    fn lock(&self) -> MutexGuard<'_, SessionTracker> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start(&self) -> Result<i64, TrackerError> {
        self.lock().start()
    }

    pub fn stop(&self) -> Result<Session, TrackerError> {
        self.lock().stop()
    }

    pub fn accept_sample(&self, sample: PositionSample) -> Result<SampleAccepted, TrackerError> {
        self.lock().accept_sample(sample)
    }

    pub fn is_tracking(&self) -> bool {
        self.lock().is_tracking()
    }

    pub fn current_settings(&self) -> TrackingSettings {
        self.lock().current_settings()
    }

    pub fn update_settings(&self, update: &SettingsUpdate) -> TrackingSettings {
        self.lock().update_settings(update)
    }

    pub fn subscribe(&self) -> Receiver<TrackerEvent> {
        self.lock().subscribe()
    }

    pub fn status(&self, now_ms: i64) -> TrackingStatus {
        self.lock().status(now_ms)
    }

    /// Snapshot of the active session.
    pub fn current_session(&self) -> Option<Session> {
        self.lock().current_session().cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geo_utils::polyline_length;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock the test advances by hand.
    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        fn set(&self, ms: i64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn tracker_at(start: i64) -> (SessionTracker, ManualClock) {
        let clock = ManualClock::default();
        clock.set(start);
        let tracker = SessionTracker::with_clock(TrackingSettings::default(), Box::new(clock.clone()));
        (tracker, clock)
    }

    fn sample(lat: f64, lng: f64, t: i64) -> PositionSample {
        PositionSample::new(lat, lng, 10.0, t)
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let (mut tracker, clock) = tracker_at(1_000);
        assert!(!tracker.is_tracking());

        assert_eq!(tracker.start(), Ok(1_000));
        assert!(tracker.is_tracking());

        tracker.accept_sample(sample(40.7128, -74.0060, 1_000)).unwrap();
        tracker.accept_sample(sample(40.7228, -74.0060, 61_000)).unwrap();

        clock.set(121_000);
        let session = tracker.stop().unwrap();
        assert!(!tracker.is_tracking());
        assert_eq!(session.id, "1000");
        assert_eq!(session.end_time, Some(121_000));
        assert_eq!(session.duration_secs, 120.0);
        assert!(session.is_closed());
        let bounds = session.bounds().unwrap();
        assert_eq!((bounds.min_lat, bounds.max_lat), (40.7128, 40.7228));
        assert_eq!((bounds.min_lng, bounds.max_lng), (-74.0060, -74.0060));
        let expected = session.distance / 120.0 * 3.6;
        assert!((session.average_speed_kmh - expected).abs() < 1e-9);
    }

    #[test]
    fn test_double_start_is_noop() {
        let (mut tracker, clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();

        clock.set(5_000);
        let err = tracker.start().unwrap_err();
        assert_eq!(err, TrackerError::AlreadyTracking);
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);

        // The first session survives
        let session = tracker.current_session().unwrap();
        assert_eq!(session.start_time, 0);
        assert_eq!(session.points.len(), 1);
    }

    #[test]
    fn test_double_stop_is_noop() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        assert!(tracker.stop().is_ok());
        assert_eq!(tracker.stop().unwrap_err(), TrackerError::NotTracking);
    }

    #[test]
    fn test_sample_while_idle() {
        let (mut tracker, _clock) = tracker_at(0);
        let err = tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap_err();
        assert_eq!(err, TrackerError::NotTracking);
    }

    #[test]
    fn test_zero_duration_speed() {
        let (mut tracker, _clock) = tracker_at(500);
        tracker.start().unwrap();
        let session = tracker.stop().unwrap();
        assert_eq!(session.duration_secs, 0.0);
        assert_eq!(session.average_speed_kmh, 0.0);
    }

    #[test]
    fn test_low_accuracy_rejected() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();

        let noisy = PositionSample::new(40.01, -74.0, 150.0, 1_000);
        let err = tracker.accept_sample(noisy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Noise);
        assert!(matches!(err, TrackerError::LowAccuracy { .. }));

        let session = tracker.current_session().unwrap();
        assert_eq!(session.points.len(), 1);
        assert_eq!(session.distance, 0.0);
    }

    #[test]
    fn test_accuracy_at_limit_accepted() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        assert!(tracker.accept_sample(PositionSample::new(40.0, -74.0, 100.0, 0)).is_ok());
    }

    #[test]
    fn test_minimum_distance_rejected() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();

        // ~2.2 m north
        let err = tracker.accept_sample(sample(40.00002, -74.0, 1_000)).unwrap_err();
        assert!(matches!(err, TrackerError::BelowMinimumDistance { .. }));
        assert_eq!(err.kind(), ErrorKind::Noise);
        assert_eq!(tracker.current_session().unwrap().points.len(), 1);
    }

    #[test]
    fn test_invalid_sample_rejected() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();

        let err = tracker.accept_sample(sample(f64::NAN, -74.0, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = tracker.accept_sample(sample(40.0, f64::INFINITY, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(tracker.current_session().unwrap().points.is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 10_000)).unwrap();

        let err = tracker.accept_sample(sample(40.01, -74.0, 5_000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_distance_is_sum_of_accepted_pairs() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();

        let raw = vec![
            sample(40.7128, -74.0060, 0),
            PositionSample::new(40.7500, -74.0060, 500.0, 5_000), // noise
            sample(40.7130, -74.0060, 10_000),
            sample(40.71301, -74.0060, 15_000), // ~1 m, too close
            sample(40.7140, -74.0050, 20_000),
            sample(40.7160, -74.0040, 30_000),
        ];
        for s in raw {
            let _ = tracker.accept_sample(s);
        }

        let session = tracker.current_session().unwrap();
        assert_eq!(session.points.len(), 4);

        let pts: Vec<_> = session.points.iter().map(PositionSample::point).collect();
        assert!((session.distance - polyline_length(&pts)).abs() < 1e-9);
    }

    #[test]
    fn test_settings_update_applies_to_next_sample() {
        let (mut tracker, _clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();
        tracker.accept_sample(sample(40.0001, -74.0, 1_000)).unwrap(); // ~11 m

        let updated = tracker.update_settings(&SettingsUpdate {
            minimum_distance: Some(50.0),
            ..Default::default()
        });
        assert_eq!(updated.minimum_distance, 50.0);
        assert_eq!(updated.update_interval_ms, 10_000);

        // Already accepted points are unaffected
        assert_eq!(tracker.current_session().unwrap().points.len(), 2);

        let err = tracker.accept_sample(sample(40.0002, -74.0, 2_000)).unwrap_err();
        assert!(matches!(err, TrackerError::BelowMinimumDistance { minimum, .. } if minimum == 50.0));
    }

    #[test]
    fn test_restart_resets_accumulator() {
        let (mut tracker, clock) = tracker_at(0);
        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();
        tracker.accept_sample(sample(40.01, -74.0, 1_000)).unwrap();
        clock.set(2_000);
        tracker.stop().unwrap();

        clock.set(10_000);
        tracker.start().unwrap();
        assert!(tracker.last_position().is_none());
        // Far from the previous session's last point, but nothing to compare against
        let accepted = tracker.accept_sample(sample(41.0, -74.0, 10_000)).unwrap();
        assert_eq!(accepted.distance_delta, 0.0);
        assert_eq!(accepted.point_count, 1);
    }

    #[test]
    fn test_subscriber_receives_events() {
        let (mut tracker, clock) = tracker_at(0);
        let rx = tracker.subscribe();

        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();
        clock.set(1_000);
        let session = tracker.stop().unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], TrackerEvent::Started { start_time: 0 });
        assert!(matches!(events[1], TrackerEvent::SampleAccepted(_)));
        assert_eq!(events[2], TrackerEvent::Stopped(session));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (mut tracker, _clock) = tracker_at(0);
        drop(tracker.subscribe());
        tracker.start().unwrap();
        assert!(tracker.subscribers.is_empty());
    }

    #[test]
    fn test_status() {
        let (mut tracker, _clock) = tracker_at(0);
        assert!(!tracker.status(0).is_tracking);

        tracker.start().unwrap();
        tracker.accept_sample(sample(40.0, -74.0, 0)).unwrap();
        tracker.accept_sample(sample(40.001, -74.0, 30_000)).unwrap();

        let status = tracker.status(36_000);
        assert!(status.is_tracking);
        assert_eq!(status.point_count, 2);
        assert_eq!(status.elapsed_secs, 36.0);
        assert!((status.average_speed_kmh - status.distance / 36.0 * 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_shared_tracker_across_threads() {
        let shared = SharedTracker::new(SessionTracker::default());
        shared.start().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let t = shared.clone();
                std::thread::spawn(move || t.accept_sample(sample(40.0 + i as f64 * 0.01, -74.0, 0)))
            })
            .collect();
        let accepted = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(accepted, 4);
        assert_eq!(shared.current_session().unwrap().points.len(), 4);
        assert!(shared.stop().is_ok());
        assert!(!shared.is_tracking());
    }
}
