//! # Geographic Utilities
//!
//! Core geographic computation utilities shared by every component of the
//! tracker and the timeline pipeline.
//!
//! All distances in this crate go through [`distance`]; no component is
//! allowed to use a different formula, otherwise cluster radii, place radii
//! and session distances would disagree with each other.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance`] | Great-circle distance between two lat/lng pairs |
//! | [`haversine_distance`] | Same, for two [`GpsPoint`]s |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`compute_bounds`] | Bounding box of a GPS track |
//! | [`compute_center`] | Arithmetic centroid of a GPS track |
//! | [`search_envelopes`] | Conservative lat/lng boxes around a point, for R-tree queries |
//!
//! ## Example
//!
//! ```rust
//! use life_tracker::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(40.7128, -74.0060),
//!     GpsPoint::new(40.7138, -74.0060),
//!     GpsPoint::new(40.7148, -74.0060),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!((length - 222.4).abs() < 1.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances use the haversine formula on a sphere of radius 6,371,000 m.
//! `geo::Haversine` uses the IUGG mean radius (6,371,008.8 m) instead, which
//! is why the formula is spelled out here rather than delegated.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)

use geo::{Centroid, MultiPoint, Point};
use crate::{Bounds, GpsPoint};

/// Sphere radius used for every distance computation, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude on the sphere above.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in meters between `(lat1, lon1)` and `(lat2, lon2)`.
///
/// Pure and symmetric; zero for identical points. NaN inputs produce NaN,
/// so callers validate coordinates upstream.
///
/// # Example
///
/// ```rust
/// use life_tracker::geo_utils::distance;
///
/// let d = distance(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d - 343_500.0).abs() < 1000.0); // London to Paris
/// assert_eq!(distance(40.0, -74.0, 40.0, -74.0), 0.0);
/// ```
#[inline]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Calculate the great-circle distance between two GPS points.
///
/// Thin wrapper around [`distance`].
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    distance(p1.latitude, p1.longitude, p2.latitude, p2.longitude)
}

/// Calculate the total length of a polyline (GPS track) in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Lat/lng boxes that together contain every point within `radius_meters`
/// of `center`, each as `([min_lng, min_lat], [max_lng, max_lat])`.
///
/// Used to pre-filter R-tree candidates; the exact [`distance`] check still
/// has to run on whatever the boxes return. The 5% padding covers the gap
/// between a great circle and a parallel at the radii this crate uses
/// (tens to hundreds of meters).
///
/// A box crossing the antimeridian is split in two. A box reaching a pole
/// spans every longitude.
pub fn search_envelopes(center: &GpsPoint, radius_meters: f64) -> Vec<([f64; 2], [f64; 2])> {
    let lat_deg = radius_meters * 1.05 / METERS_PER_DEGREE;
    let min_lat = center.latitude - lat_deg;
    let max_lat = center.latitude + lat_deg;

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return vec![([-180.0, min_lat.max(-90.0)], [180.0, max_lat.min(90.0)])];
    }

    // Parallels shrink toward the poles: size the box for its widest latitude
    let widest = min_lat.abs().max(max_lat.abs());
    let cos_lat = widest.to_radians().cos().max(1e-12);
    let lng_deg = lat_deg / cos_lat;
    if lng_deg >= 180.0 {
        return vec![([-180.0, min_lat], [180.0, max_lat])];
    }

    let min_lng = center.longitude - lng_deg;
    let max_lng = center.longitude + lng_deg;

    if min_lng < -180.0 {
        vec![
            ([min_lng + 360.0, min_lat], [180.0, max_lat]),
            ([-180.0, min_lat], [max_lng, max_lat]),
        ]
    } else if max_lng > 180.0 {
        vec![
            ([min_lng, min_lat], [180.0, max_lat]),
            ([-180.0, min_lat], [max_lng - 360.0, max_lat]),
        ]
    } else {
        vec![([min_lng, min_lat], [max_lng, max_lat])]
    }
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a GPS track.
///
/// For empty input, returns a bounds with MIN/MAX values that contain nothing.
pub fn compute_bounds(points: &[GpsPoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

// =============================================================================
// Center/Centroid Functions
// =============================================================================

/// Compute the centroid of a GPS track as the arithmetic mean of latitudes
/// and of longitudes.
///
/// This is the same simplification the clusterer uses for its running
/// center: not geodesically exact, but the error is negligible at the
/// 50-100 m scales involved. Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use life_tracker::{GpsPoint, geo_utils};
///
/// let track = vec![
///     GpsPoint::new(51.50, -0.10),
///     GpsPoint::new(51.52, -0.12),
/// ];
///
/// let center = geo_utils::compute_center(&track).unwrap();
/// assert!((center.latitude - 51.51).abs() < 1e-9);
/// assert!((center.longitude - (-0.11)).abs() < 1e-9);
/// ```
pub fn compute_center(points: &[GpsPoint]) -> Option<GpsPoint> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect();

    multi.centroid().map(|c| GpsPoint::new(c.y(), c.x()))
}

// =============================================================================
// Unit Tests
// =============================================================================
