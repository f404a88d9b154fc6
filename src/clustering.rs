//! # Spatio-Temporal Clustering
//!
//! Groups a time-ordered sample sequence into runs of samples that stay
//! close to each other in space AND in time.
//!
//! ## Algorithm
//! Single forward scan with a running centroid:
//! 1. No open cluster: open one with the sample as its only member.
//! 2. Otherwise compare the sample against the cluster's center (distance)
//!    and the cluster's last timestamp (gap).
//! 3. `distance <= 50 m` and `gap <= 10 min`: join, update the centroid.
//! 4. Either threshold exceeded: close the cluster (kept only with 2+
//!    members) and open a new one with the sample.
//!
//! Membership checks are O(1): the centroid is maintained from running
//! latitude/longitude sums, so processing a sample never looks at older
//! members.

use log::debug;

use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, PositionSample};

/// Configuration for clustering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClusterConfig {
    /// Max distance from the cluster center to join (meters). Default: 50.0
    pub distance_threshold: f64,
    /// Max gap since the cluster's last sample to join (ms). Default: 600,000 (10 min)
    pub time_threshold_ms: i64,
    /// Clusters with fewer members are discarded. Default: 2
    pub min_members: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 50.0,
            time_threshold_ms: 10 * 60 * 1000,
            min_members: 2,
        }
    }
}

/// A maximal run of samples close in space and time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    /// Arithmetic mean of member latitudes/longitudes
    pub center: GpsPoint,
    /// Members in scan order
    pub members: Vec<PositionSample>,
    /// Timestamp of the first member (ms)
    pub start_time: i64,
    /// Timestamp of the last member (ms)
    pub end_time: i64,
}

impl Cluster {
    /// `end_time - start_time` in ms.
    pub fn duration_ms(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// The open cluster plus the running sums behind its centroid.
#[derive(Debug, Clone)]
struct OpenCluster {
    cluster: Cluster,
    sum_lat: f64,
    sum_lng: f64,
}

impl OpenCluster {
    fn new(sample: PositionSample) -> Self {
        Self {
            sum_lat: sample.latitude,
            sum_lng: sample.longitude,
            cluster: Cluster {
                center: sample.point(),
                start_time: sample.timestamp,
                end_time: sample.timestamp,
                members: vec![sample],
            },
        }
    }

    fn push(&mut self, sample: PositionSample) {
        self.sum_lat += sample.latitude;
        self.sum_lng += sample.longitude;
        self.cluster.end_time = sample.timestamp;
        self.cluster.members.push(sample);

        let n = self.cluster.members.len() as f64;
        self.cluster.center = GpsPoint::new(self.sum_lat / n, self.sum_lng / n);
    }
}

/// Incremental clusterer: feed samples in timestamp order with [`push`],
/// collect closed clusters as they are emitted, and [`finish`] at the end.
///
/// [`push`]: SpatioTemporalClusterer::push
/// [`finish`]: SpatioTemporalClusterer::finish
#[derive(Debug, Clone)]
pub struct SpatioTemporalClusterer {
    config: ClusterConfig,
    current: Option<OpenCluster>,
}

impl SpatioTemporalClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config, current: None }
    }

    /// Add the next sample. Returns the cluster this sample closed, if any.
    pub fn push(&mut self, sample: PositionSample) -> Option<Cluster> {
        let Some(open) = self.current.as_mut() else {
            self.current = Some(OpenCluster::new(sample));
            return None;
        };

        let d = haversine_distance(&open.cluster.center, &sample.point());
        let gap = sample.timestamp - open.cluster.end_time;

        if d <= self.config.distance_threshold && gap <= self.config.time_threshold_ms {
            open.push(sample);
            return None;
        }

        debug!(
            "Cluster break at {}: {:.1} m from center, {} ms gap",
            sample.timestamp, d, gap
        );
        let closed = self.current.replace(OpenCluster::new(sample));
        closed.and_then(|c| self.keep(c))
    }

    /// Close the open cluster at end of input.
    pub fn finish(&mut self) -> Option<Cluster> {
        self.current.take().and_then(|c| self.keep(c))
    }

    /// The cluster currently being built, if any.
    pub fn current(&self) -> Option<&Cluster> {
        self.current.as_ref().map(|c| &c.cluster)
    }

    fn keep(&self, open: OpenCluster) -> Option<Cluster> {
        if open.cluster.members.len() >= self.config.min_members as usize {
            Some(open.cluster)
        } else {
            None
        }
    }
}

/// Cluster a timestamp-sorted sample sequence.
///
/// # Example
///
/// ```rust
/// use life_tracker::{cluster_samples, ClusterConfig, PositionSample};
///
/// let samples = vec![
///     PositionSample::new(40.7128, -74.0060, 10.0, 0),
///     PositionSample::new(40.7128, -74.0060, 10.0, 600_000),
/// ];
///
/// let clusters = cluster_samples(&samples, &ClusterConfig::default());
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].members.len(), 2);
/// assert_eq!(clusters[0].duration_ms(), 600_000);
/// ```
pub fn cluster_samples(samples: &[PositionSample], config: &ClusterConfig) -> Vec<Cluster> {
    let mut clusterer = SpatioTemporalClusterer::new(config.clone());
    let mut clusters: Vec<Cluster> = samples
        .iter()
        .filter_map(|s| clusterer.push(s.clone()))
        .collect();
    clusters.extend(clusterer.finish());
    clusters
}

// ============================================================================
// Tests
// ============================================================================
