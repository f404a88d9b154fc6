//! # Daily Timeline
//!
//! Batch pipeline turning one day's raw samples into a grouped, ordered
//! list of movement and place-visit events:
//!
//! ```text
//! samples --sort--> clusters --> places --> visits ---\
//!            \                                         +--> events --> groups
//!             `---------------> movements ------------/
//! ```
//!
//! The pipeline is a pure function of its inputs and never touches live
//! tracking state, so it can run on any thread alongside a
//! [`SessionTracker`](crate::SessionTracker).

use std::time::Instant;

use log::{info, warn};

use crate::clustering::{cluster_samples, ClusterConfig};
use crate::movement::{detect_movements, MovementConfig, MovementEvent};
use crate::places::{detect_place_visits, detect_places, Place, PlaceConfig, PlaceVisitEvent};
use crate::PositionSample;

/// Configuration for the whole timeline pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TimelineConfig {
    pub cluster: ClusterConfig,
    pub movement: MovementConfig,
    pub places: PlaceConfig,
    /// Gap after which a new group starts (ms). Default: 7,200,000 (2 h)
    pub group_interval_ms: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            movement: MovementConfig::default(),
            places: PlaceConfig::default(),
            group_interval_ms: 2 * 60 * 60 * 1000,
        }
    }
}

/// One entry on the timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum TimelineEvent {
    Movement(MovementEvent),
    PlaceVisit(PlaceVisitEvent),
}

impl TimelineEvent {
    /// Ordering key: start time for movements, arrival for visits.
    pub fn timestamp(&self) -> i64 {
        match self {
            TimelineEvent::Movement(m) => m.start_time,
            TimelineEvent::PlaceVisit(v) => v.arrival_time,
        }
    }

    pub fn as_movement(&self) -> Option<&MovementEvent> {
        match self {
            TimelineEvent::Movement(m) => Some(m),
            TimelineEvent::PlaceVisit(_) => None,
        }
    }

    pub fn as_place_visit(&self) -> Option<&PlaceVisitEvent> {
        match self {
            TimelineEvent::PlaceVisit(v) => Some(v),
            TimelineEvent::Movement(_) => None,
        }
    }
}

/// A run of events with no gap longer than the grouping interval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineGroup {
    /// Timestamp of the first event
    pub start_time: i64,
    /// Latest event timestamp seen so far (not the event's end)
    pub end_time: i64,
    pub events: Vec<TimelineEvent>,
}

// ============================================================================
// Assembly
// ============================================================================

/// Merge movements and visits into one list ordered by timestamp.
///
/// The sort is stable and movements go in first, so on equal timestamps a
/// movement precedes a visit, and each kind keeps its input order.
pub fn assemble_events(
    movements: Vec<MovementEvent>,
    visits: Vec<PlaceVisitEvent>,
) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = movements
        .into_iter()
        .map(TimelineEvent::Movement)
        .chain(visits.into_iter().map(TimelineEvent::PlaceVisit))
        .collect();
    events.sort_by_key(TimelineEvent::timestamp);
    events
}

/// Bucket time-ordered events.
///
/// A new group starts when an event's timestamp is more than `interval_ms`
/// after the current group's `end_time`; a gap of exactly `interval_ms`
/// stays in the group.
pub fn group_events(events: Vec<TimelineEvent>, interval_ms: i64) -> Vec<TimelineGroup> {
    let mut groups: Vec<TimelineGroup> = Vec::new();

    for event in events {
        let ts = event.timestamp();
        match groups.last_mut() {
            Some(group) if ts - group.end_time <= interval_ms => {
                group.end_time = group.end_time.max(ts);
                group.events.push(event);
            }
            _ => groups.push(TimelineGroup {
                start_time: ts,
                end_time: ts,
                events: vec![event],
            }),
        }
    }

    groups
}

// ============================================================================
// Pipeline
// ============================================================================

/// Drop malformed samples and sort a copy by timestamp (stable).
fn prepare_samples(samples: &[PositionSample]) -> Vec<PositionSample> {
    let mut valid: Vec<PositionSample> = samples.iter().filter(|s| s.is_valid()).cloned().collect();

    let dropped = samples.len() - valid.len();
    if dropped > 0 {
        warn!("Dropped {} malformed samples before timeline computation", dropped);
    }

    valid.sort_by_key(|s| s.timestamp);
    valid
}

/// Compute the grouped timeline for one day's samples with default settings.
///
/// `known_places` come from the caller's store; they are matched against
/// dwell clusters and never modified.
///
/// # Example
///
/// ```rust
/// use life_tracker::{compute_timeline, PositionSample};
///
/// // 20 minutes at one spot
/// let samples: Vec<_> = (0..=20)
///     .map(|i| PositionSample::new(40.7128, -74.0060, 10.0, i * 60_000))
///     .collect();
///
/// let groups = compute_timeline(&samples, &[]);
/// assert_eq!(groups.len(), 1);
/// let visit = groups[0].events[0].as_place_visit().unwrap();
/// assert_eq!(visit.duration_ms, 20 * 60_000);
/// assert!(visit.place.is_temporary);
/// ```
pub fn compute_timeline(samples: &[PositionSample], known_places: &[Place]) -> Vec<TimelineGroup> {
    compute_timeline_with_config(samples, known_places, &TimelineConfig::default())
}

/// [`compute_timeline`] with explicit thresholds.
pub fn compute_timeline_with_config(
    samples: &[PositionSample],
    known_places: &[Place],
    config: &TimelineConfig,
) -> Vec<TimelineGroup> {
    let start = Instant::now();
    let samples = prepare_samples(samples);

    let clusters = cluster_samples(&samples, &config.cluster);
    let places = detect_places(&clusters, known_places, &config.places);
    let visits = detect_place_visits(&samples, &places, &config.places);
    let movements = detect_movements(&samples, &config.movement);

    info!(
        "Timeline: {} samples -> {} clusters, {} places, {} visits, {} movements",
        samples.len(),
        clusters.len(),
        places.len(),
        visits.len(),
        movements.len()
    );

    let groups = group_events(assemble_events(movements, visits), config.group_interval_ms);
    info!("Timeline grouped into {} groups in {:?}", groups.len(), start.elapsed());
    groups
}

/// Same result as [`compute_timeline_with_config`], running movement
/// segmentation and place detection concurrently with rayon.
#[cfg(feature = "parallel")]
pub fn compute_timeline_parallel(
    samples: &[PositionSample],
    known_places: &[Place],
    config: &TimelineConfig,
) -> Vec<TimelineGroup> {
    use crate::places::detect_place_visits_parallel;

    let start = Instant::now();
    let samples = prepare_samples(samples);

    let (movements, visits) = rayon::join(
        || detect_movements(&samples, &config.movement),
        || {
            let clusters = cluster_samples(&samples, &config.cluster);
            let places = detect_places(&clusters, known_places, &config.places);
            detect_place_visits_parallel(&samples, &places, &config.places)
        },
    );

    info!(
        "Timeline (parallel): {} samples -> {} visits, {} movements",
        samples.len(),
        visits.len(),
        movements.len()
    );

    let groups = group_events(assemble_events(movements, visits), config.group_interval_ms);
    info!("Timeline grouped into {} groups in {:?}", groups.len(), start.elapsed());
    groups
}

// ============================================================================
// Summary & Formatting
// ============================================================================

/// Totals shown above a day's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct DaySummary {
    /// Sum of movement distances, meters
    pub total_distance: f64,
    /// Sum of movement durations, ms
    pub total_movement_ms: i64,
    pub movement_count: u32,
    pub places_visited: u32,
}

impl DaySummary {
    pub fn from_groups(groups: &[TimelineGroup]) -> Self {
        let mut summary = DaySummary::default();
        for event in groups.iter().flat_map(|g| &g.events) {
            match event {
                TimelineEvent::Movement(m) => {
                    summary.total_distance += m.distance;
                    summary.total_movement_ms += m.duration_ms;
                    summary.movement_count += 1;
                }
                TimelineEvent::PlaceVisit(_) => summary.places_visited += 1,
            }
        }
        summary
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance / 1000.0
    }
}

/// Human-readable duration: `"2h 5m"`, `"12m"` or `"40s"`.
///
/// ```rust
/// use life_tracker::format_duration_ms;
///
/// assert_eq!(format_duration_ms(7_500_000), "2h 5m");
/// assert_eq!(format_duration_ms(720_000), "12m");
/// assert_eq!(format_duration_ms(40_000), "40s");
/// ```
pub fn format_duration_ms(duration_ms: i64) -> String {
    let seconds = duration_ms.max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

/// Stopwatch format `HH:MM:SS` for a live session.
pub fn format_clock_secs(secs: f64) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

// ============================================================================
// Tests
// ============================================================================
