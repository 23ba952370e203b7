use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use meridian_types::coords::new_feature;

/// Converts an arbitrary GeoJSON-like document into a feature collection.
///
/// Accepted inputs are:
/// * a `FeatureCollection`,
/// * a single `Feature`,
/// * a bare geometry object,
/// * an array of features,
/// * an array of feature collections, of which only the first one is used.
///
/// Anything else produces an empty collection. Features without `properties` (or with `null` properties) get an
/// empty properties map, features without `geometry` get a `null` one. Members of a collection or an array that
/// cannot be read as features are skipped. The function never fails.
pub fn normalize(raw: JsonValue) -> FeatureCollection {
    normalize_with_report(raw).collection
}

/// Feature collection produced by [`normalize_with_report`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Features that could be read.
    pub collection: FeatureCollection,
    /// Number of collection or array members that were skipped because they are not valid features.
    pub skipped: usize,
}

impl Normalized {
    /// True if the input listed features but none of them could be read.
    pub fn is_unreadable(&self) -> bool {
        self.collection.features.is_empty() && self.skipped > 0
    }
}

/// Same as [`normalize`], but also counts the skipped features.
pub fn normalize_with_report(raw: JsonValue) -> Normalized {
    let mut skipped = 0;
    let collection = match raw {
        JsonValue::Object(object) => normalize_object(object, &mut skipped),
        JsonValue::Array(items) => normalize_sequence(items, &mut skipped),
        other => {
            log::debug!("Cannot normalize a JSON {} value", json_type(&other));
            empty_collection()
        }
    };

    if skipped > 0 {
        log::info!(
            "Skipped {skipped} invalid features, {} features kept",
            collection.features.len()
        );
    }

    Normalized {
        collection,
        skipped,
    }
}

/// Converts an already parsed GeoJSON document into a feature collection. See [`normalize`].
pub fn normalize_geojson(geojson: GeoJson) -> FeatureCollection {
    match geojson {
        GeoJson::FeatureCollection(mut collection) => {
            collection.features.iter_mut().for_each(ensure_properties);
            collection
        }
        GeoJson::Feature(mut feature) => {
            ensure_properties(&mut feature);
            collection_of(vec![feature])
        }
        GeoJson::Geometry(geometry) => {
            collection_of(vec![new_feature(Some(geometry), Default::default())])
        }
    }
}

fn normalize_object(mut object: JsonObject, skipped: &mut usize) -> FeatureCollection {
    if object.get("type").and_then(JsonValue::as_str) == Some("FeatureCollection") {
        let Some(JsonValue::Array(items)) = object.remove("features") else {
            log::debug!("Feature collection has no features array");
            return empty_collection();
        };

        let features = items
            .into_iter()
            .filter_map(|mut item| {
                // Members of a collection are features even if they do not say so.
                if let JsonValue::Object(member) = &mut item {
                    member
                        .entry("type")
                        .or_insert_with(|| JsonValue::from("Feature"));
                }
                read_feature(item, skipped)
            })
            .collect();

        return collection_of(features);
    }

    match parse_object(object) {
        Ok(geojson) => normalize_geojson(geojson),
        Err(err) => {
            log::debug!("Input is not a GeoJSON object: {err}");
            empty_collection()
        }
    }
}

fn normalize_sequence(items: Vec<JsonValue>, skipped: &mut usize) -> FeatureCollection {
    let first_is_collection = items
        .first()
        .is_some_and(|item| type_of(item) == Some("FeatureCollection"));

    if first_is_collection {
        return match items.into_iter().next() {
            Some(JsonValue::Object(object)) => normalize_object(object, skipped),
            _ => empty_collection(),
        };
    }

    let features = items
        .into_iter()
        .filter_map(|item| read_feature(item, skipped))
        .collect();

    collection_of(features)
}

fn read_feature(item: JsonValue, skipped: &mut usize) -> Option<Feature> {
    let feature = match item {
        JsonValue::Object(object) => match parse_object(object) {
            Ok(GeoJson::Feature(mut feature)) => {
                ensure_properties(&mut feature);
                Some(feature)
            }
            Ok(other) => {
                log::warn!("Skipping {} where a feature is expected", geojson_type(&other));
                None
            }
            Err(err) => {
                log::warn!("Skipping invalid feature: {err}");
                None
            }
        },
        other => {
            log::warn!("Skipping JSON {} where a feature is expected", json_type(&other));
            None
        }
    };

    if feature.is_none() {
        *skipped += 1;
    }

    feature
}

fn parse_object(mut object: JsonObject) -> Result<GeoJson, geojson::Error> {
    prepare(&mut object);
    GeoJson::try_from(object)
}

/// Fills in members the GeoJSON parser requires but real-world files omit, and drops the ones it cannot read.
fn prepare(object: &mut JsonObject) {
    if object.get("type").and_then(JsonValue::as_str) != Some("Feature") {
        return;
    }

    object.entry("geometry").or_insert(JsonValue::Null);

    // Only string and number ids are valid; exports often write `"id": null`.
    if object
        .get("id")
        .is_some_and(|id| !id.is_string() && !id.is_number())
    {
        object.remove("id");
    }
}

fn ensure_properties(feature: &mut Feature) {
    feature.properties.get_or_insert_with(Default::default);
}

fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn empty_collection() -> FeatureCollection {
    collection_of(vec![])
}

fn type_of(value: &JsonValue) -> Option<&str> {
    value.get("type")?.as_str()
}

fn geojson_type(geojson: &GeoJson) -> &'static str {
    match geojson {
        GeoJson::Geometry(_) => "Geometry",
        GeoJson::Feature(_) => "Feature",
        GeoJson::FeatureCollection(_) => "FeatureCollection",
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value;
    use serde_json::json;

    fn point_feature(x: f64, name: &str) -> JsonValue {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [x, 41.0] },
            "properties": { "name": name }
        })
    }

    fn names(collection: &FeatureCollection) -> Vec<String> {
        collection
            .features
            .iter()
            .map(|f| crate::feature::property_value(f, "name"))
            .collect()
    }

    #[test]
    fn feature_collection() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [point_feature(28.0, "a"), point_feature(29.0, "b")]
        });
        assert_eq!(names(&normalize(raw)), ["a", "b"]);
    }

    #[test]
    fn single_feature() {
        let collection = normalize(point_feature(28.0, "a"));
        assert_eq!(names(&collection), ["a"]);
    }

    #[test]
    fn bare_geometry() {
        let collection = normalize(json!({ "type": "LineString", "coordinates": [[0, 0], [1, 1]] }));
        assert_eq!(collection.features.len(), 1);
        assert_matches::assert_matches!(
            collection.features[0].geometry.as_ref().map(|g| &g.value),
            Some(Value::LineString(_))
        );
        assert_eq!(collection.features[0].properties, Some(JsonObject::new()));
    }

    #[test]
    fn feature_sequence() {
        let raw = json!([point_feature(28.0, "a"), 5, point_feature(29.0, "b")]);
        assert_eq!(names(&normalize(raw)), ["a", "b"]);
    }

    #[test]
    fn collection_sequence_takes_first() {
        let raw = json!([
            { "type": "FeatureCollection", "features": [point_feature(28.0, "first")] },
            { "type": "FeatureCollection", "features": [point_feature(29.0, "second")] }
        ]);
        assert_eq!(names(&normalize(raw)), ["first"]);
    }

    #[test]
    fn unsupported_shapes_are_empty() {
        for raw in [
            json!(null),
            json!(42),
            json!("FeatureCollection"),
            json!({ "type": "Topology" }),
            json!({ "features": [] }),
            json!([]),
        ] {
            assert!(normalize(raw).features.is_empty());
        }
    }

    #[test]
    fn missing_properties_and_geometry() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] } },
                { "type": "Feature", "geometry": null, "properties": null },
                { "type": "Feature" }
            ]
        });
        let collection = normalize(raw);
        assert_eq!(collection.features.len(), 3);
        for feature in &collection.features {
            assert_eq!(feature.properties, Some(JsonObject::new()));
        }
        assert!(collection.features[2].geometry.is_none());
    }

    #[test]
    fn null_feature_id_is_dropped() {
        let mut first = point_feature(28.0, "a");
        first["id"] = JsonValue::Null;
        let mut second = point_feature(29.0, "b");
        second["id"] = json!("road-2");

        let raw = json!({ "type": "FeatureCollection", "features": [first, second] });
        let collection = normalize(raw);
        assert_eq!(names(&collection), ["a", "b"]);
        assert_eq!(collection.features[0].id, None);
        assert_eq!(
            collection.features[1].id,
            Some(geojson::feature::Id::String("road-2".to_string()))
        );
    }

    #[test]
    fn malformed_feature_is_skipped() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                point_feature(28.0, "a"),
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": "oops" }, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Curve", "coordinates": [] } },
                7,
                point_feature(29.0, "b")
            ]
        });

        let normalized = normalize_with_report(raw);
        assert_eq!(names(&normalized.collection), ["a", "b"]);
        assert_eq!(normalized.skipped, 3);
        assert!(!normalized.is_unreadable());
    }

    #[test]
    fn collection_member_without_type() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                { "geometry": { "type": "Point", "coordinates": [28.0, 41.0] }, "properties": { "name": "a" } },
                point_feature(29.0, "b")
            ]
        });

        let normalized = normalize_with_report(raw);
        assert_eq!(names(&normalized.collection), ["a", "b"]);
        assert_eq!(normalized.skipped, 0);
    }

    #[test]
    fn unreadable_collection() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "geometry": { "type": "Point", "coordinates": "x" } }]
        });
        let normalized = normalize_with_report(raw);
        assert!(normalized.collection.features.is_empty());
        assert!(normalized.is_unreadable());

        let empty = normalize_with_report(json!({ "type": "FeatureCollection", "features": [] }));
        assert!(!empty.is_unreadable());
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            json!({ "type": "FeatureCollection", "features": [point_feature(28.0, "a")] }),
            point_feature(28.0, "a"),
            json!({ "type": "Point", "coordinates": [1, 2] }),
            json!([point_feature(28.0, "a"), point_feature(29.0, "b")]),
            json!([{ "type": "FeatureCollection", "features": [{ "type": "Feature" }] }]),
            json!(17),
        ];

        for raw in inputs {
            let once = normalize(raw);
            let twice = normalize(serde_json::to_value(&once).expect("serialization failed"));
            assert_eq!(once, twice);
        }
    }
}
