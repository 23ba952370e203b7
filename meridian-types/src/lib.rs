//! Geometry utilities used by the `meridian` vector workbench.
//!
//! The crate contains the small amount of geometry the workbench needs and nothing more:
//!
//! * [`GeoPoint`] and [`Point2`] for geographic and map-plane coordinates,
//! * [`Rect`] bounding boxes,
//! * planar and great-circle measurements (see [`cartesian`] and [`geo`] modules),
//! * [`GeometryKind`] classification of GeoJSON geometry types,
//! * a best-effort [`reproject`](reproject::reproject) heuristic that brings projected GeoJSON data back to
//!   longitude/latitude using an ordered list of candidate reference systems.
//!
//! This is not a general projection library. There is no EPSG lookup, no topology repair and no spatial index.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod cartesian;
pub mod coords;
pub mod error;
pub mod geo;
mod geometry_kind;
pub mod reproject;

pub use cartesian::{Point2, Rect};
pub use geo::GeoPoint;
pub use geometry_kind::GeometryKind;
