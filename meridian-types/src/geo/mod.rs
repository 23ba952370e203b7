//! Geometries in geographic coordinates (latitude and longitude) (see [`GeoPoint`]) and conversion between
//! geographic and map-plane coordinates (see [`Projection`]).

mod datum;
mod point;
mod projection;

pub use datum::Datum;
pub use point::GeoPoint;
#[cfg(feature = "geodesy")]
pub use projection::GeodesyProjection;
pub use projection::{Projection, WebMercator};
