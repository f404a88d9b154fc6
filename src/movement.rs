//! # Movement Segmentation
//!
//! Scans consecutive sample pairs, computes instantaneous speed, and merges
//! contiguous above-threshold pairs into movement episodes.
//!
//! A pair with `speed > 1 km/h` extends (or opens) the current episode; a
//! pair at or below the threshold closes it. Pairs with zero or negative
//! elapsed time carry no speed information and are skipped without
//! extending or closing anything. Episodes lasting 60 s or less are dropped.

use log::debug;

use crate::geo_utils::haversine_distance;
use crate::tracker::average_speed_kmh;
use crate::PositionSample;

/// Speed-derived classification of a movement episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TransportMode {
    Walking,
    Cycling,
    Driving,
    FastTransport,
}

impl TransportMode {
    /// Classify an average speed. Lower bounds are inclusive:
    /// exactly 5.0 km/h is cycling, exactly 25.0 is driving, exactly 50.0 is
    /// fast transport.
    ///
    /// ```rust
    /// use life_tracker::TransportMode;
    ///
    /// assert_eq!(TransportMode::from_speed_kmh(4.99), TransportMode::Walking);
    /// assert_eq!(TransportMode::from_speed_kmh(5.0), TransportMode::Cycling);
    /// assert_eq!(TransportMode::from_speed_kmh(25.0), TransportMode::Driving);
    /// assert_eq!(TransportMode::from_speed_kmh(50.0), TransportMode::FastTransport);
    /// ```
    pub fn from_speed_kmh(speed_kmh: f64) -> Self {
        if speed_kmh < 5.0 {
            TransportMode::Walking
        } else if speed_kmh < 25.0 {
            TransportMode::Cycling
        } else if speed_kmh < 50.0 {
            TransportMode::Driving
        } else {
            TransportMode::FastTransport
        }
    }

    /// Stable identifier (`"walking"`, ..., `"fast-transport"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::Driving => "driving",
            TransportMode::FastTransport => "fast-transport",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walking => "Walking",
            TransportMode::Cycling => "Cycling",
            TransportMode::Driving => "Driving",
            TransportMode::FastTransport => "Fast Transport",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for movement detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MovementConfig {
    /// Pairs faster than this count as moving (km/h). Default: 1.0
    pub speed_threshold_kmh: f64,
    /// Episodes must last strictly longer than this (ms). Default: 60,000
    pub min_duration_ms: i64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed_threshold_kmh: 1.0,
            min_duration_ms: 60_000,
        }
    }
}

/// A merged movement episode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MovementEvent {
    pub start_time: i64,
    pub end_time: i64,
    pub start_location: PositionSample,
    pub end_location: PositionSample,
    /// Sum of pairwise distances, meters
    pub distance: f64,
    /// `end_time - start_time`, ms
    pub duration_ms: i64,
    /// Cumulative distance over duration, km/h
    pub average_speed_kmh: f64,
    pub transport_mode: TransportMode,
}

impl MovementEvent {
    fn open(prev: &PositionSample, curr: &PositionSample, distance: f64) -> Self {
        let mut event = Self {
            start_time: prev.timestamp,
            end_time: prev.timestamp,
            start_location: prev.clone(),
            end_location: prev.clone(),
            distance: 0.0,
            duration_ms: 0,
            average_speed_kmh: 0.0,
            transport_mode: TransportMode::Walking,
        };
        event.extend(curr, distance);
        event
    }

    fn extend(&mut self, curr: &PositionSample, distance: f64) {
        self.end_time = curr.timestamp;
        self.end_location = curr.clone();
        self.distance += distance;
        self.duration_ms = self.end_time - self.start_time;
        self.average_speed_kmh = average_speed_kmh(self.distance, self.duration_ms as f64 / 1000.0);
        self.transport_mode = TransportMode::from_speed_kmh(self.average_speed_kmh);
    }
}

/// Detect movement episodes in a timestamp-sorted sample sequence.
///
/// # Example
///
/// ```rust
/// use life_tracker::{detect_movements, MovementConfig, PositionSample, TransportMode};
///
/// // ~222 m every 2 minutes: 6.7 km/h
/// let samples = vec![
///     PositionSample::new(40.7128, -74.0060, 10.0, 0),
///     PositionSample::new(40.7148, -74.0060, 10.0, 120_000),
///     PositionSample::new(40.7168, -74.0060, 10.0, 240_000),
/// ];
///
/// let movements = detect_movements(&samples, &MovementConfig::default());
/// assert_eq!(movements.len(), 1);
/// assert_eq!(movements[0].duration_ms, 240_000);
/// assert_eq!(movements[0].transport_mode, TransportMode::Cycling);
/// ```
pub fn detect_movements(samples: &[PositionSample], config: &MovementConfig) -> Vec<MovementEvent> {
    let mut movements = Vec::new();
    let mut current: Option<MovementEvent> = None;

    for pair in samples.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        let elapsed_ms = curr.timestamp - prev.timestamp;
        if elapsed_ms <= 0 {
            debug!("Skipping pair with {} ms elapsed at {}", elapsed_ms, curr.timestamp);
            continue;
        }

        let dist = haversine_distance(&prev.point(), &curr.point());
        let speed_kmh = dist / (elapsed_ms as f64 / 1000.0) * 3.6;

        if speed_kmh > config.speed_threshold_kmh {
            match current.as_mut() {
                Some(movement) => movement.extend(curr, dist),
                None => current = Some(MovementEvent::open(prev, curr, dist)),
            }
        } else if let Some(movement) = current.take() {
            flush(movement, config, &mut movements);
        }
    }

    if let Some(movement) = current.take() {
        flush(movement, config, &mut movements);
    }

    movements
}

fn flush(movement: MovementEvent, config: &MovementConfig, out: &mut Vec<MovementEvent>) {
    if movement.duration_ms > config.min_duration_ms {
        out.push(movement);
    } else {
        debug!(
            "Dropping short movement at {} ({} ms)",
            movement.start_time, movement.duration_ms
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
