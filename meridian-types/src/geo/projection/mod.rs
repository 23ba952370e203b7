mod web_mercator;

#[cfg(feature = "geodesy")]
mod geodesy;

pub use web_mercator::WebMercator;

#[cfg(feature = "geodesy")]
pub use self::geodesy::GeodesyProjection;

/// Conversion between geographic points and map-plane points.
///
/// Both directions return `None` when the result is not a finite point.
pub trait Projection {
    /// Type of the geographic point.
    type InPoint;
    /// Type of the map-plane point.
    type OutPoint;

    /// Projects a geographic point into the map plane.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Converts a map-plane point back into geographic coordinates.
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}
