//! # Places and Visits
//!
//! Two steps of the daily timeline:
//!
//! 1. **Place discovery** ([`detect_places`]): clusters whose dwell exceeds
//!    10 minutes become candidate places. A candidate within 100 m of a
//!    known place reuses that place; otherwise a temporary place is
//!    synthesized from the cluster center.
//! 2. **Visit detection** ([`detect_place_visits`]): for each place, the
//!    samples within its radius define one visit window (first to last
//!    timestamp). Windows longer than 5 minutes are emitted. Places with
//!    overlapping radii may claim the same samples.
//!
//! Both steps index points in an R-tree and only run the exact haversine
//! check on the candidates inside each place's search box.

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::clustering::Cluster;
use crate::geo_utils::{haversine_distance, search_envelopes};
use crate::{GpsPoint, PositionSample};

/// Radius assigned to places that don't carry one.
pub const DEFAULT_PLACE_RADIUS: f64 = 100.0;

#[cfg(feature = "serde")]
fn default_radius() -> f64 {
    DEFAULT_PLACE_RADIUS
}

#[cfg(feature = "serde")]
fn default_category() -> String {
    "unknown".to_string()
}

/// A known or discovered place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Place {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form category ("home", "work", ..., "unknown")
    #[cfg_attr(feature = "serde", serde(default = "default_category"))]
    pub category: String,
    /// Visit radius in meters. Default: 100.0
    #[cfg_attr(feature = "serde", serde(default = "default_radius"))]
    pub radius: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub visit_count: u32,
    /// Synthesized from a cluster rather than loaded from the store
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_temporary: bool,
}

impl Place {
    /// A known place with the default radius and no visits.
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            category: "unknown".to_string(),
            radius: DEFAULT_PLACE_RADIUS,
            visit_count: 0,
            is_temporary: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Temporary place named after its coordinates.
    pub fn from_cluster(cluster: &Cluster, radius: f64) -> Self {
        let center = cluster.center;
        Self {
            id: format!("temp_{}", cluster.start_time),
            name: format!("Place at {:.4}, {:.4}", center.latitude, center.longitude),
            latitude: center.latitude,
            longitude: center.longitude,
            category: "unknown".to_string(),
            radius,
            visit_count: 0,
            is_temporary: true,
        }
    }

    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Radius used for visit detection: a missing (zero, negative or
    /// non-finite) radius falls back to [`DEFAULT_PLACE_RADIUS`].
    pub fn effective_radius(&self) -> f64 {
        if self.radius.is_finite() && self.radius > 0.0 {
            self.radius
        } else {
            DEFAULT_PLACE_RADIUS
        }
    }
}

/// Configuration for place discovery and visit detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PlaceConfig {
    /// Clusters must dwell strictly longer than this to become places (ms). Default: 600,000
    pub min_dwell_ms: i64,
    /// A cluster center this close to an existing place reuses it (meters). Default: 100.0
    pub match_radius: f64,
    /// Radius given to synthesized places (meters). Default: 100.0
    pub default_radius: f64,
    /// Visits must last strictly longer than this (ms). Default: 300,000
    pub min_visit_ms: i64,
}

impl Default for PlaceConfig {
    fn default() -> Self {
        Self {
            min_dwell_ms: 10 * 60 * 1000,
            match_radius: 100.0,
            default_radius: DEFAULT_PLACE_RADIUS,
            min_visit_ms: 5 * 60 * 1000,
        }
    }
}

/// A dwell at a place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PlaceVisitEvent {
    /// Same as `arrival_time`; the event's position on the timeline
    pub timestamp: i64,
    pub place: Place,
    pub arrival_time: i64,
    pub departure_time: i64,
    /// `departure_time - arrival_time`, ms
    pub duration_ms: i64,
    /// Samples within the place radius
    pub location_count: u32,
}

// =============================================================================
// R-tree Indexed Point for Spatial Queries
// =============================================================================

/// A coordinate tagged with its index in the source slice.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl IndexedPoint {
    fn new(idx: usize, point: GpsPoint) -> Self {
        Self { idx, lat: point.latitude, lng: point.longitude }
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// Indices of all points in `tree` within `radius` meters of `center`.
fn within_radius(tree: &RTree<IndexedPoint>, center: GpsPoint, radius: f64) -> Vec<usize> {
    let mut found = Vec::new();
    for (min, max) in search_envelopes(&center, radius) {
        let search_bounds = AABB::from_corners(min, max);
        found.extend(
            tree.locate_in_envelope_intersecting(&search_bounds)
                .filter(|p| haversine_distance(&center, &GpsPoint::new(p.lat, p.lng)) <= radius)
                .map(|p| p.idx),
        );
    }
    found
}

// =============================================================================
// Place Discovery
// =============================================================================

/// Combine known places with places discovered from dwell clusters.
///
/// Returns the known places (unchanged, in input order) followed by newly
/// synthesized temporary places. A cluster matching a known place, or a
/// temporary place already synthesized for an earlier cluster, adds nothing.
/// When several places are in range, the first in list order wins.
///
/// # Example
///
/// ```rust
/// use life_tracker::{cluster_samples, detect_places, ClusterConfig, Place, PlaceConfig, PositionSample};
///
/// let samples: Vec<_> = (0..12)
///     .map(|i| PositionSample::new(40.7128, -74.0060, 10.0, i * 60_000))
///     .collect();
/// let clusters = cluster_samples(&samples, &ClusterConfig::default());
///
/// // No known places: one temporary place appears
/// let places = detect_places(&clusters, &[], &PlaceConfig::default());
/// assert_eq!(places.len(), 1);
/// assert!(places[0].is_temporary);
/// assert_eq!(places[0].name, "Place at 40.7128, -74.0060");
///
/// // Known place nearby: reused, nothing new
/// let home = Place::new("home", "Home", 40.7130, -74.0060);
/// let places = detect_places(&clusters, &[home], &PlaceConfig::default());
/// assert_eq!(places.len(), 1);
/// assert_eq!(places[0].id, "home");
/// ```
pub fn detect_places(clusters: &[Cluster], known_places: &[Place], config: &PlaceConfig) -> Vec<Place> {
    let mut places: Vec<Place> = known_places.to_vec();
    let mut tree = RTree::bulk_load(
        places
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint::new(idx, p.point()))
            .collect(),
    );

    for cluster in clusters {
        if cluster.duration_ms() <= config.min_dwell_ms {
            continue;
        }

        let existing = within_radius(&tree, cluster.center, config.match_radius)
            .into_iter()
            .min();
        match existing {
            Some(idx) => debug!(
                "Cluster at {} matches place {}",
                cluster.start_time, places[idx].id
            ),
            None => {
                let place = Place::from_cluster(cluster, config.default_radius);
                debug!("New place {} ({})", place.id, place.name);
                tree.insert(IndexedPoint::new(places.len(), place.point()));
                places.push(place);
            }
        }
    }

    places
}

// =============================================================================
// Visit Detection
// =============================================================================

fn build_sample_tree(samples: &[PositionSample]) -> RTree<IndexedPoint> {
    RTree::bulk_load(
        samples
            .iter()
            .enumerate()
            .map(|(idx, s)| IndexedPoint::new(idx, s.point()))
            .collect(),
    )
}

fn visit_for_place(
    place: &Place,
    samples: &[PositionSample],
    tree: &RTree<IndexedPoint>,
    config: &PlaceConfig,
) -> Option<PlaceVisitEvent> {
    let mut count = 0u32;
    let mut arrival = i64::MAX;
    let mut departure = i64::MIN;

    for idx in within_radius(tree, place.point(), place.effective_radius()) {
        let t = samples[idx].timestamp;
        arrival = arrival.min(t);
        departure = departure.max(t);
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let duration_ms = departure - arrival;
    if duration_ms <= config.min_visit_ms {
        return None;
    }

    Some(PlaceVisitEvent {
        timestamp: arrival,
        place: place.clone(),
        arrival_time: arrival,
        departure_time: departure,
        duration_ms,
        location_count: count,
    })
}

/// Detect one visit per place from the samples inside its radius.
///
/// Visits are returned in place order.
pub fn detect_place_visits(
    samples: &[PositionSample],
    places: &[Place],
    config: &PlaceConfig,
) -> Vec<PlaceVisitEvent> {
    if samples.is_empty() {
        return vec![];
    }
    let tree = build_sample_tree(samples);

    places
        .iter()
        .filter_map(|place| visit_for_place(place, samples, &tree, config))
        .collect()
}

/// Same as [`detect_place_visits`], evaluating places in parallel with rayon.
#[cfg(feature = "parallel")]
pub fn detect_place_visits_parallel(
    samples: &[PositionSample],
    places: &[Place],
    config: &PlaceConfig,
) -> Vec<PlaceVisitEvent> {
    use rayon::prelude::*;

    if samples.is_empty() {
        return vec![];
    }
    let tree = build_sample_tree(samples);

    places
        .par_iter()
        .filter_map(|place| visit_for_place(place, samples, &tree, config))
        .collect()
}

/// Places with `visit_count` incremented by their number of visits, for the
/// caller to persist.
pub fn tally_visits(places: &[Place], visits: &[PlaceVisitEvent]) -> Vec<Place> {
    places
        .iter()
        .map(|place| {
            let n = visits.iter().filter(|v| v.place.id == place.id).count() as u32;
            Place { visit_count: place.visit_count + n, ..place.clone() }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{cluster_samples, ClusterConfig};

    const MIN: i64 = 60_000;
    const SEC: i64 = 1_000;

    fn s(lat: f64, lng: f64, t: i64) -> PositionSample {
        PositionSample::new(lat, lng, 10.0, t)
    }

    fn dwell(lat: f64, lng: f64, from: i64, minutes: i64) -> Vec<PositionSample> {
        (0..=minutes).map(|m| s(lat, lng, from + m * MIN)).collect()
    }

    #[test]
    fn test_visit_ten_minutes_emitted() {
        let samples = vec![s(40.7128, -74.0060, 0), s(40.7128, -74.0060, 10 * MIN)];
        let place = Place::new("p", "P", 40.7128, -74.0060);
        let visits = detect_place_visits(&samples, &[place], &PlaceConfig::default());

        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].duration_ms, 10 * MIN);
        assert_eq!(visits[0].location_count, 2);
        assert_eq!(visits[0].timestamp, visits[0].arrival_time);
    }

    #[test]
    fn test_visit_exactly_five_minutes_not_emitted() {
        let place = Place::new("p", "P", 40.7128, -74.0060);

        let samples = vec![s(40.7128, -74.0060, 0), s(40.7128, -74.0060, 5 * MIN)];
        assert!(detect_place_visits(&samples, &[place.clone()], &PlaceConfig::default()).is_empty());

        let samples = vec![s(40.7128, -74.0060, 0), s(40.7128, -74.0060, 5 * MIN + SEC)];
        assert_eq!(detect_place_visits(&samples, &[place], &PlaceConfig::default()).len(), 1);
    }

    #[test]
    fn test_samples_outside_radius_ignored() {
        let place = Place::new("p", "P", 40.7128, -74.0060);
        let mut samples = dwell(40.7128, -74.0060, 0, 3);
        samples.push(s(40.7228, -74.0060, 30 * MIN)); // ~1.1 km away
        assert!(detect_place_visits(&samples, &[place], &PlaceConfig::default()).is_empty());
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        // 0.0008 deg of latitude is ~89 m
        let place = Place::new("p", "P", 40.7128, -74.0060).with_radius(90.0);
        let samples = vec![s(40.7128, -74.0060, 0), s(40.7136, -74.0060, 6 * MIN)];
        assert_eq!(detect_place_visits(&samples, &[place.clone()], &PlaceConfig::default()).len(), 1);

        let tight = place.with_radius(80.0);
        assert!(detect_place_visits(&samples, &[tight], &PlaceConfig::default()).is_empty());
    }

    #[test]
    fn test_overlapping_places_share_samples() {
        let a = Place::new("a", "A", 40.7128, -74.0060);
        let b = Place::new("b", "B", 40.7130, -74.0060);
        let samples = dwell(40.7129, -74.0060, 0, 10);
        let visits = detect_place_visits(&samples, &[a, b], &PlaceConfig::default());
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].place.id, "a");
        assert_eq!(visits[1].place.id, "b");
    }

    #[test]
    fn test_detect_places_dwell_threshold() {
        // 10 minutes exactly is not enough, 11 is
        let ten = cluster_samples(&dwell(40.7128, -74.0060, 0, 10), &ClusterConfig::default());
        assert!(detect_places(&ten, &[], &PlaceConfig::default()).is_empty());

        let eleven = cluster_samples(&dwell(40.7128, -74.0060, 0, 11), &ClusterConfig::default());
        let places = detect_places(&eleven, &[], &PlaceConfig::default());
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "temp_0");
        assert_eq!(places[0].category, "unknown");
        assert_eq!(places[0].radius, DEFAULT_PLACE_RADIUS);
    }

    #[test]
    fn test_detect_places_reuses_known() {
        let clusters = cluster_samples(&dwell(40.7128, -74.0060, 0, 20), &ClusterConfig::default());
        let known = vec![
            Place::new("far", "Far", 41.0, -74.0),
            Place::new("first", "First", 40.7129, -74.0060),
            Place::new("second", "Second", 40.7127, -74.0060),
        ];
        let places = detect_places(&clusters, &known, &PlaceConfig::default());
        // Nothing synthesized, known list unchanged
        assert_eq!(places, known);
    }

    #[test]
    fn test_revisit_reuses_temporary_place() {
        let mut samples = dwell(40.7128, -74.0060, 0, 20);
        samples.extend(dwell(40.7300, -74.0060, 30 * MIN, 20));
        samples.extend(dwell(40.7128, -74.0060, 60 * MIN, 20));
        let clusters = cluster_samples(&samples, &ClusterConfig::default());
        assert_eq!(clusters.len(), 3);

        let places = detect_places(&clusters, &[], &PlaceConfig::default());
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "temp_0");
        assert_eq!(places[1].id, format!("temp_{}", 30 * MIN));
    }

    #[test]
    fn test_tally_visits() {
        let home = Place::new("home", "Home", 40.7128, -74.0060);
        let work = Place::new("work", "Work", 40.7500, -73.9900);
        let samples = dwell(40.7128, -74.0060, 0, 10);
        let visits = detect_place_visits(&samples, &[home.clone(), work.clone()], &PlaceConfig::default());

        let tallied = tally_visits(&[home, work], &visits);
        assert_eq!(tallied[0].visit_count, 1);
        assert_eq!(tallied[1].visit_count, 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let places: Vec<_> = (0..20)
            .map(|i| Place::new(format!("p{i}"), "P", 40.70 + i as f64 * 0.002, -74.0))
            .collect();
        let samples: Vec<_> = (0..200)
            .map(|i| s(40.70 + (i / 10) as f64 * 0.002, -74.0, i as i64 * MIN))
            .collect();

        let seq = detect_place_visits(&samples, &places, &PlaceConfig::default());
        let par = detect_place_visits_parallel(&samples, &places, &PlaceConfig::default());
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 20);
    }

    #[test]
    fn test_visit_across_antimeridian() {
        // ~21 m apart, on opposite sides of 180 degrees
        let fiji = Place::new("fiji", "Fiji", -17.0, 179.9999);
        let samples = vec![s(-17.0, -179.9999, 0), s(-17.0, -179.9999, 10 * MIN)];

        let visits = detect_place_visits(&samples, &[fiji], &PlaceConfig::default());
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].place.id, "fiji");
        assert_eq!(visits[0].location_count, 2);
    }

    #[test]
    fn test_detect_places_reuses_known_across_antimeridian() {
        let clusters = cluster_samples(&dwell(-17.0, -179.9999, 0, 15), &ClusterConfig::default());
        assert_eq!(clusters.len(), 1);

        let known = vec![Place::new("fiji", "Fiji", -17.0, 179.9999)];
        let places = detect_places(&clusters, &known, &PlaceConfig::default());
        assert_eq!(places, known);
    }

    #[test]
    fn test_visit_near_pole() {
        // Same latitude, opposite meridians: ~22 m across the pole
        let station = Place::new("station", "Station", 89.9999, 0.0);
        let samples = vec![s(89.9999, 180.0, 0), s(89.9999, -90.0, 10 * MIN)];

        let visits = detect_place_visits(&samples, &[station], &PlaceConfig::default());
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].location_count, 2);
    }

    #[test]
    fn test_missing_radius_uses_default() {
        let zero = Place::new("p", "P", 40.7128, -74.0060).with_radius(0.0);
        let nan = zero.clone().with_radius(f64::NAN);
        assert_eq!(zero.effective_radius(), DEFAULT_PLACE_RADIUS);
        assert_eq!(nan.effective_radius(), DEFAULT_PLACE_RADIUS);
        assert_eq!(zero.clone().with_radius(40.0).effective_radius(), 40.0);

        // ~44 m from the place
        let samples = vec![s(40.7132, -74.0060, 0), s(40.7132, -74.0060, 10 * MIN)];
        assert_eq!(detect_place_visits(&samples, &[zero], &PlaceConfig::default()).len(), 1);
        assert_eq!(detect_place_visits(&samples, &[nan], &PlaceConfig::default()).len(), 1);
    }
}
