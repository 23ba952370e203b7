use meridian_types::cartesian;
use meridian_types::geo::{Projection, WebMercator};
use meridian_types::{GeoPoint, Point2};
use std::fmt::{Display, Formatter};

/// Result of a measurement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Measurement {
    /// Path length in meters.
    Distance(f64),
    /// Area in square meters.
    Area(f64),
}

impl Measurement {
    /// Measured value in meters or square meters.
    pub fn value(&self) -> f64 {
        match self {
            Measurement::Distance(v) | Measurement::Area(v) => *v,
        }
    }

    /// Human-readable value with units.
    pub fn readout(&self) -> String {
        match self {
            Measurement::Distance(meters) => format_distance(*meters),
            Measurement::Area(square_meters) => format_area(*square_meters),
        }
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.readout())
    }
}

/// Formats a distance: whole meters below 1 km, kilometers with two decimals otherwise.
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{} m", meters.round())
    } else {
        format!("{:.2} km", meters / 1_000.0)
    }
}

/// Formats an area: whole square meters below 1 ha, hectares below 1 km², square kilometers otherwise. Hectares and
/// square kilometers have two decimals.
pub fn format_area(square_meters: f64) -> String {
    if square_meters < 10_000.0 {
        format!("{} m²", square_meters.round())
    } else if square_meters < 1_000_000.0 {
        format!("{:.2} ha", square_meters / 10_000.0)
    } else {
        format!("{:.2} km²", square_meters / 1_000_000.0)
    }
}

/// Great-circle length of the path through the points on a sphere with the given radius.
pub fn path_length(points: &[GeoPoint], radius: f64) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].distance(&w[1], radius))
        .sum()
}

/// Ground area of the ring through the points, in square meters.
///
/// The ring is projected into the Web Mercator plane and measured with the shoelace formula. Mercator inflates
/// areas by the square of its scale factor, so the plane area is divided by that factor at the mean latitude of the
/// ring. Rings with less than 3 points have zero area.
pub fn ring_area(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let projection = WebMercator::default();
    let projected: Vec<Point2> = points
        .iter()
        .filter_map(|p| projection.project(p))
        .collect();

    let mean_lat = points.iter().map(GeoPoint::lat).sum::<f64>() / points.len() as f64;
    let scale = projection.scale_factor(mean_lat);

    cartesian::area(&projected) / (scale * scale)
}
