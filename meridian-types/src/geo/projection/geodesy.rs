use crate::cartesian::Point2;
use crate::error::MeridianTypesError;
use crate::geo::{GeoPoint, Projection};
use geodesy::prelude::*;

/// Projection backed by a [`geodesy`] operator definition, e.g.
/// `tmerc lon_0=30 k_0=1 x_0=500000 ellps=GRS80`.
pub struct GeodesyProjection {
    context: Minimal,
    op: OpHandle,
}

impl GeodesyProjection {
    /// Instantiates the operator. Fails if the definition is not understood by `geodesy`.
    pub fn new(definition: &str) -> Result<Self, MeridianTypesError> {
        let mut context = Minimal::new();
        let op = context
            .op(definition)
            .map_err(|err| MeridianTypesError::Projection {
                definition: definition.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self { context, op })
    }
}

impl Projection for GeodesyProjection {
    type InPoint = GeoPoint;
    type OutPoint = Point2;

    fn project(&self, input: &GeoPoint) -> Option<Point2> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(Point2::new(data[0].0[0], data[0].0[1]))
    }

    fn unproject(&self, input: &Point2) -> Option<GeoPoint> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        let point = GeoPoint::latlon(data[0].0[1].to_degrees(), data[0].0[0].to_degrees());
        if point.lat().is_finite() && point.lon().is_finite() {
            Some(point)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    #[test]
    fn transverse_mercator_round_trip() {
        let projection = GeodesyProjection::new("tmerc lon_0=30 k_0=1 x_0=500000 ellps=GRS80")
            .expect("invalid definition");
        let point = latlon!(41.0, 28.9);
        let projected = projection.project(&point).expect("projection failed");
        assert!(projected.x() < 500_000.0);
        assert!(projected.y() > 4_000_000.0);

        let back = projection.unproject(&projected).expect("unprojection failed");
        assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-6);
        assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-6);
    }

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let projection = GeodesyProjection::new("tmerc lon_0=30 k_0=1 x_0=500000 ellps=GRS80")
            .expect("invalid definition");
        let projected = projection
            .project(&latlon!(40.0, 30.0))
            .expect("projection failed");
        assert_abs_diff_eq!(projected.x(), 500_000.0, epsilon = 1e-3);
    }

    #[test]
    fn invalid_definition() {
        assert!(GeodesyProjection::new("no_such_operator foo=bar").is_err());
    }
}
