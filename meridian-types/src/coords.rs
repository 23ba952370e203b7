//! Helpers for walking the coordinates of [`geojson`] geometries.

use crate::cartesian::{Point2, Rect};
use geojson::{Feature, Geometry, JsonObject, Position, Value};

/// GeoJSON type name of the geometry value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Creates a feature with the given geometry and properties and no id, bbox or foreign members.
pub fn new_feature(geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// First (innermost, depth-first) position of the geometry.
pub fn first_position(geometry: &Geometry) -> Option<&Position> {
    first_value_position(&geometry.value)
}

fn first_value_position(value: &Value) -> Option<&Position> {
    match value {
        Value::Point(p) => Some(p),
        Value::MultiPoint(points) | Value::LineString(points) => points.first(),
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.first()?.first(),
        Value::MultiPolygon(polygons) => polygons.first()?.first()?.first(),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .find_map(|g| first_value_position(&g.value)),
    }
}

/// Visits every position of the geometry depth-first.
pub fn for_each_position(value: &Value, f: &mut impl FnMut(&Position)) {
    match value {
        Value::Point(p) => f(p),
        Value::MultiPoint(points) | Value::LineString(points) => points.iter().for_each(f),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(f)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(f),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .for_each(|g| for_each_position(&g.value, &mut *f)),
    }
}

/// Creates a copy of the geometry value with every position replaced by the result of `f`. If `f` fails for any
/// position, the whole conversion fails.
pub fn try_map_positions(
    value: &Value,
    f: &mut impl FnMut(&Position) -> Option<Position>,
) -> Option<Value> {
    let mut map_line =
        |line: &Vec<Position>| -> Option<Vec<Position>> { line.iter().map(&mut *f).collect() };

    Some(match value {
        Value::Point(p) => Value::Point(f(p)?),
        Value::MultiPoint(points) => Value::MultiPoint(map_line(points)?),
        Value::LineString(points) => Value::LineString(map_line(points)?),
        Value::MultiLineString(lines) => {
            Value::MultiLineString(lines.iter().map(&mut map_line).collect::<Option<_>>()?)
        }
        Value::Polygon(rings) => Value::Polygon(rings.iter().map(&mut map_line).collect::<Option<_>>()?),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(&mut map_line).collect::<Option<_>>())
                .collect::<Option<_>>()?,
        ),
        Value::GeometryCollection(geometries) => Value::GeometryCollection(
            geometries
                .iter()
                .map(|g| {
                    Some(Geometry {
                        bbox: None,
                        value: try_map_positions(&g.value, &mut *f)?,
                        foreign_members: g.foreign_members.clone(),
                    })
                })
                .collect::<Option<_>>()?,
        ),
    })
}

/// Converts a GeoJSON position into a 2d point. Extra dimensions are ignored.
pub fn to_point(position: &Position) -> Option<Point2> {
    match position.as_slice() {
        [x, y, ..] => Some(Point2::new(*x, *y)),
        _ => None,
    }
}

/// Bounding rect of all positions of the geometry. Returns `None` for empty geometries.
pub fn bounds(geometry: &Geometry) -> Option<Rect> {
    let mut rect: Option<Rect> = None;
    for_each_position(&geometry.value, &mut |p| {
        if let Some(point) = to_point(p) {
            let point_rect = Rect::from_point(&point);
            rect = Some(match rect {
                Some(r) => r.merge(point_rect),
                None => point_rect,
            });
        }
    });

    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon() -> Geometry {
        Geometry::new(Value::Polygon(vec![vec![
            vec![1.0, 2.0],
            vec![3.0, 2.0],
            vec![3.0, 5.0],
            vec![1.0, 2.0],
        ]]))
    }

    #[test]
    fn first_position_is_innermost() {
        assert_eq!(first_position(&polygon()), Some(&vec![1.0, 2.0]));

        let empty = Geometry::new(Value::MultiPolygon(vec![]));
        assert_eq!(first_position(&empty), None);

        let collection = Geometry::new(Value::GeometryCollection(vec![
            Geometry::new(Value::LineString(vec![])),
            Geometry::new(Value::Point(vec![7.0, 8.0])),
        ]));
        assert_eq!(first_position(&collection), Some(&vec![7.0, 8.0]));
    }

    #[test]
    fn map_positions_keeps_structure() {
        let mapped = try_map_positions(&polygon().value, &mut |p| {
            Some(vec![p[0] * 10.0, p[1] * 10.0])
        })
        .expect("mapping failed");

        assert_eq!(
            mapped,
            Value::Polygon(vec![vec![
                vec![10.0, 20.0],
                vec![30.0, 20.0],
                vec![30.0, 50.0],
                vec![10.0, 20.0],
            ]])
        );
    }

    #[test]
    fn map_positions_fails_as_a_whole() {
        let mut count = 0;
        let mapped = try_map_positions(&polygon().value, &mut |p| {
            count += 1;
            (count < 3).then(|| p.clone())
        });
        assert!(mapped.is_none());
    }

    #[test]
    fn geometry_bounds() {
        assert_eq!(bounds(&polygon()), Some(Rect::new(1.0, 2.0, 3.0, 5.0)));
        assert_eq!(bounds(&Geometry::new(Value::LineString(vec![]))), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(type_name(&polygon().value), "Polygon");
        assert_eq!(type_name(&Value::MultiPoint(vec![])), "MultiPoint");
    }
}
