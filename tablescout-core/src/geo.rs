//! Spherical geometry for distance ranking and map-viewport fitting.
//!
//! Coordinates are [`geo::Coord`] values in degrees with `x` holding the
//! longitude and `y` the latitude, matching the rest of the workspace.
//! All functions here are pure and hold no state; they are safe to call
//! concurrently from any number of threads.

use geo::Coord;
use thiserror::Error;

/// Mean Earth radius in kilometres used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's equatorial circumference in metres.
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_016.686;

/// Zoom headroom a map widget should subtract from
/// [`GeoCluster::zoom`] so the fitted cluster sits comfortably inside
/// the viewport rather than touching its edges.
pub const MAP_FIT_ZOOM_BUFFER: f64 = 1.0;

/// Largest zoom level [`fit_cluster`] will report; degenerate clusters
/// (a single point, or coincident points) would otherwise produce an
/// infinite zoom.
pub const MAX_FIT_ZOOM: f64 = 22.0;

/// Errors returned by the cluster computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeoError {
    /// The supplied point list was empty. Callers must not treat a
    /// degenerate cluster as a valid single point, so this is an error
    /// rather than a sentinel value.
    #[error("cluster computation requires at least one coordinate")]
    EmptyCluster,
}

/// A transient map-fit result: where to centre the viewport and how far
/// to zoom so every point in a cluster is visible.
///
/// Computed on demand by [`fit_cluster`] and discarded; it has no
/// independent lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCluster {
    /// Mean position of the cluster on the sphere.
    pub centroid: Coord<f64>,
    /// Zoom level at which the whole cluster is visible. Subtract
    /// [`MAP_FIT_ZOOM_BUFFER`] before applying to a viewport.
    pub zoom: f64,
    /// Maximum pairwise distance between cluster points in kilometres.
    pub diameter_km: f64,
}

/// Clamps a latitude/longitude pair into valid ranges and returns it as
/// a coordinate.
///
/// Latitude is clamped to `[-90, 90]` and longitude to `[-180, 180]`.
/// Malformed input is corrected rather than rejected.
#[must_use]
pub fn clamp_coordinate(lat: f64, lng: f64) -> Coord<f64> {
    Coord {
        x: lng.clamp(-180.0, 180.0),
        y: lat.clamp(-90.0, 90.0),
    }
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Uses the Haversine formula with [`EARTH_RADIUS_KM`]. Symmetric in
/// its arguments and zero for identical inputs. Antipodal wraparound is
/// not handled.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tablescout_core::geo::distance_km;
///
/// let a = Coord { x: -73.0, y: 40.0 };
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "Haversine distance is inherently floating-point"
)]
pub fn distance_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lng = (b.x - a.x).to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lng = (d_lng / 2.0).sin();

    let h = half_lat * half_lat
        + a.y.to_radians().cos() * b.y.to_radians().cos() * half_lng * half_lng;
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle
}

/// Mean position of a set of coordinates on the sphere.
///
/// Each point is converted to Cartesian space, the components are
/// averaged, and the mean is converted back to degrees. Averaging the
/// raw latitude/longitude values would be wrong near the antimeridian
/// and the poles.
///
/// # Errors
///
/// Returns [`GeoError::EmptyCluster`] when `points` is empty.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "unit-sphere averaging is floating-point; point counts are far below 2^52"
)]
pub fn centroid(points: &[Coord<f64>]) -> Result<Coord<f64>, GeoError> {
    if points.is_empty() {
        return Err(GeoError::EmptyCluster);
    }

    let mut sum_x = 0.0_f64;
    let mut sum_y = 0.0_f64;
    let mut sum_z = 0.0_f64;
    for point in points {
        let lat = point.y.to_radians();
        let lng = point.x.to_radians();
        sum_x += EARTH_RADIUS_KM * lat.cos() * lng.cos();
        sum_y += EARTH_RADIUS_KM * lat.cos() * lng.sin();
        sum_z += EARTH_RADIUS_KM * lat.sin();
    }

    let count = points.len() as f64;
    let mean_x = sum_x / count;
    let mean_y = sum_y / count;
    let mean_z = sum_z / count;

    let lat = mean_z.atan2(mean_x.hypot(mean_y)).to_degrees();
    let lng = mean_y.atan2(mean_x).to_degrees();
    Ok(Coord { x: lng, y: lat })
}

/// Maximum pairwise distance between the given coordinates in
/// kilometres.
///
/// O(n²) over all point pairs. A single point yields `0.0`.
///
/// # Errors
///
/// Returns [`GeoError::EmptyCluster`] when `points` is empty.
pub fn cluster_diameter_km(points: &[Coord<f64>]) -> Result<f64, GeoError> {
    if points.is_empty() {
        return Err(GeoError::EmptyCluster);
    }

    let mut max_distance = 0.0_f64;
    for (i, reference) in points.iter().enumerate() {
        for comparison in points.iter().skip(i + 1) {
            max_distance = max_distance.max(distance_km(*reference, *comparison));
        }
    }
    Ok(max_distance)
}

/// Zoom level at which a viewport centred on `center` spans
/// `diameter_m` metres.
///
/// Computed as `log2(|C × cos(lat)| / diameter_m)` where `C` is
/// [`EARTH_CIRCUMFERENCE_METERS`] and `lat` is the centre latitude in
/// radians. Inverse of [`search_area_diameter_m`].
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "zoom projection maths is inherently floating-point"
)]
pub fn zoom_level_for_diameter(center: Coord<f64>, diameter_m: f64) -> f64 {
    ((EARTH_CIRCUMFERENCE_METERS * center.y.to_radians().cos()).abs() / diameter_m).log2()
}

/// Diameter in metres of the map area visible at `zoom` when centred on
/// `center`.
///
/// Callers use this as the live-map requery threshold: a viewport pan
/// shorter than the current search radius does not warrant a new
/// discovery round-trip. Inverse of [`zoom_level_for_diameter`].
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "zoom projection maths is inherently floating-point"
)]
pub fn search_area_diameter_m(center: Coord<f64>, zoom: f64) -> f64 {
    ((EARTH_CIRCUMFERENCE_METERS * center.y.to_radians().cos()) / 2.0_f64.powf(zoom)).abs()
}

/// Computes the viewport needed to display every point in a cluster.
///
/// The reported zoom is capped at [`MAX_FIT_ZOOM`] so single-point and
/// coincident-point clusters remain usable.
///
/// # Errors
///
/// Returns [`GeoError::EmptyCluster`] when `points` is empty.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tablescout_core::geo::fit_cluster;
///
/// let points = [
///     Coord { x: -73.0, y: 40.0 },
///     Coord { x: -73.1, y: 40.1 },
/// ];
/// let cluster = fit_cluster(&points)?;
/// assert!(cluster.diameter_km > 0.0);
/// # Ok::<(), tablescout_core::geo::GeoError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "converting the cluster diameter to metres"
)]
pub fn fit_cluster(points: &[Coord<f64>]) -> Result<GeoCluster, GeoError> {
    let diameter_km = cluster_diameter_km(points)?;
    let center = centroid(points)?;
    let zoom = zoom_level_for_diameter(center, diameter_km * 1000.0).min(MAX_FIT_ZOOM);
    Ok(GeoCluster {
        centroid: center,
        zoom,
        diameter_km,
    })
}
