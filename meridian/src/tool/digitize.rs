use crate::error::WorkbenchError;
use geojson::{Geometry, Value};
use meridian_types::{GeoPoint, GeometryKind};

/// Minimum number of clicked points needed to build a geometry of the kind.
pub fn min_points(kind: GeometryKind) -> usize {
    match kind {
        GeometryKind::Point => 1,
        GeometryKind::Line => 2,
        GeometryKind::Polygon => 3,
        GeometryKind::Unknown => usize::MAX,
    }
}

/// Builds a geometry of the kind from clicked points.
///
/// A single point makes a `Point`, several points of a point layer a `MultiPoint`. Polygon rings are closed by
/// repeating the first point.
pub fn build_geometry(kind: GeometryKind, points: &[GeoPoint]) -> Result<Geometry, WorkbenchError> {
    if kind == GeometryKind::Unknown {
        return Err(WorkbenchError::Input(
            "cannot digitize into a layer of unknown geometry type".to_string(),
        ));
    }

    let required = min_points(kind);
    if points.len() < required {
        return Err(WorkbenchError::InsufficientPoints {
            required,
            got: points.len(),
        });
    }

    let positions: Vec<Vec<f64>> = points.iter().map(GeoPoint::to_position).collect();
    let value = match kind {
        GeometryKind::Point if positions.len() == 1 => Value::Point(positions[0].clone()),
        GeometryKind::Point => Value::MultiPoint(positions),
        GeometryKind::Line => Value::LineString(positions),
        _ => {
            let mut ring = positions;
            if let Some(first) = ring.first().cloned() {
                if ring.last() != Some(&first) {
                    ring.push(first);
                }
            }
            Value::Polygon(vec![ring])
        }
    };

    Ok(Geometry::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use meridian_types::latlon;

    #[test]
    fn point() {
        let geometry = build_geometry(GeometryKind::Point, &[latlon!(41.0, 29.0)]).expect("failed");
        assert_eq!(geometry.value, Value::Point(vec![29.0, 41.0]));

        let geometry = build_geometry(
            GeometryKind::Point,
            &[latlon!(41.0, 29.0), latlon!(42.0, 30.0)],
        )
        .expect("failed");
        assert_matches!(geometry.value, Value::MultiPoint(points) if points.len() == 2);
    }

    #[test]
    fn line() {
        assert_matches!(
            build_geometry(GeometryKind::Line, &[latlon!(41.0, 29.0)]),
            Err(WorkbenchError::InsufficientPoints {
                required: 2,
                got: 1
            })
        );

        let geometry = build_geometry(
            GeometryKind::Line,
            &[latlon!(41.0, 29.0), latlon!(42.0, 30.0)],
        )
        .expect("failed");
        assert_eq!(
            geometry.value,
            Value::LineString(vec![vec![29.0, 41.0], vec![30.0, 42.0]])
        );
    }

    #[test]
    fn polygon_ring_is_closed() {
        let points = [latlon!(0.0, 0.0), latlon!(0.0, 1.0), latlon!(1.0, 1.0)];
        let geometry = build_geometry(GeometryKind::Polygon, &points).expect("failed");
        let Value::Polygon(rings) = geometry.value else {
            panic!("polygon expected");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0].first(), rings[0].last());
        assert_eq!(
            GeometryKind::of(&build_geometry(GeometryKind::Polygon, &points).expect("failed")),
            GeometryKind::Polygon
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_matches!(
            build_geometry(GeometryKind::Unknown, &[latlon!(0.0, 0.0)]),
            Err(WorkbenchError::Input(_))
        );
    }
}
