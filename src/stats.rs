//! Aggregate statistics over stored sessions.
//!
//! Totals are kept in meters and seconds; convert with the `*_km` /
//! `*_hours` helpers only when displaying them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::tracker::Session;

/// Lifetime totals across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackingStatistics {
    /// Sum of session distances, meters
    pub total_distance: f64,
    /// Sum of session durations, seconds
    pub total_duration_secs: f64,
    /// Distinct UTC calendar days on which a session started
    pub tracking_days: u32,
    /// Highest device-reported speed, km/h (0 if no sample carries speed)
    pub top_speed_kmh: f64,
    pub total_sessions: u32,
    pub total_points: u32,
}

impl TrackingStatistics {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let mut days = HashSet::new();
        let mut stats = TrackingStatistics::default();

        for session in sessions {
            stats.total_distance += session.distance;
            stats.total_duration_secs += session.duration_secs;
            stats.total_sessions += 1;
            stats.total_points += session.points.len() as u32;

            if let Some(start) = DateTime::<Utc>::from_timestamp_millis(session.start_time) {
                days.insert(start.date_naive());
            }

            stats.top_speed_kmh = session
                .points
                .iter()
                .filter_map(|p| p.speed)
                .filter(|v| v.is_finite())
                .map(|mps| mps * 3.6)
                .fold(stats.top_speed_kmh, f64::max);
        }

        stats.tracking_days = days.len() as u32;
        stats
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance / 1000.0
    }

    pub fn total_duration_hours(&self) -> f64 {
        self.total_duration_secs / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PositionSample;

    const DAY: i64 = 86_400_000;
    // 2024-03-15T08:00:00Z
    const T0: i64 = 1_710_489_600_000;

    fn session(start_time: i64, distance: f64, duration_secs: f64, speeds: &[Option<f64>]) -> Session {
        let points = speeds
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let p = PositionSample::new(40.0, -74.0, 5.0, start_time + i as i64 * 1000);
                match v {
                    Some(mps) => p.with_speed(*mps),
                    None => p,
                }
            })
            .collect();
        Session {
            id: start_time.to_string(),
            start_time,
            end_time: Some(start_time + (duration_secs * 1000.0) as i64),
            points,
            distance,
            duration_secs,
            average_speed_kmh: 0.0,
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(TrackingStatistics::from_sessions(&[]), TrackingStatistics::default());
    }

    #[test]
    fn test_totals() {
        let sessions = vec![
            session(T0, 1500.0, 1800.0, &[Some(2.0), None]),
            // same UTC day, later
            session(T0 + 3_600_000, 500.0, 1800.0, &[Some(10.0)]),
            session(T0 + DAY, 3000.0, 3600.0, &[None, None, Some(5.0)]),
        ];
        let stats = TrackingStatistics::from_sessions(&sessions);

        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_points, 6);
        assert_eq!(stats.tracking_days, 2);
        assert!((stats.total_distance_km() - 5.0).abs() < 1e-9);
        assert!((stats.total_duration_hours() - 2.0).abs() < 1e-9);
        assert!((stats.top_speed_kmh - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_speed_reported() {
        let stats = TrackingStatistics::from_sessions(&[session(T0, 10.0, 60.0, &[None, None])]);
        assert_eq!(stats.top_speed_kmh, 0.0);
    }
}
