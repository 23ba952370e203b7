use crate::cartesian::Point2;
use crate::geo::{Datum, GeoPoint, Projection};
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

/// Spherical Web Mercator (EPSG:3857). Map-plane units are projected meters.
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a new projection for the datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }

    /// Linear scale factor of the projection at the given latitude (in degrees). Lengths measured in the map
    /// plane are this many times longer than on the ground.
    pub fn scale_factor(&self, lat: f64) -> f64 {
        1.0 / lat.to_radians().cos()
    }
}

impl Projection for WebMercator {
    type InPoint = GeoPoint;
    type OutPoint = Point2;

    fn project(&self, input: &GeoPoint) -> Option<Point2> {
        let x = self.datum.semimajor() * input.lon_rad();
        let y = self.datum.semimajor() * (FRAC_PI_4 + input.lat_rad() / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2) -> Option<GeoPoint> {
        let lat = 2.0 * (input.y() / self.datum.semimajor()).exp().atan() - FRAC_PI_2;
        let lon = input.x() / self.datum.semimajor();

        let point = GeoPoint::latlon(lat.to_degrees(), lon.to_degrees());
        if point.lat().is_finite() && point.lon().is_finite() {
            Some(point)
        } else {
            None
        }
    }
}
