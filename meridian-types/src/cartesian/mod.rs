//! Geometries in map-plane (cartesian) coordinates.

mod contour;
mod point;
mod rect;

pub use contour::{area, area_signed, length, Winding};
pub use point::Point2;
pub use rect::Rect;
