//! Best-effort reprojection of projected GeoJSON data into longitude/latitude.
//!
//! GeoJSON is expected to be in longitude/latitude, but files exported from regional GIS systems are often written
//! in a local metric grid without any CRS information. This module guesses: if the data [looks projected](looks_projected),
//! every candidate from an ordered list is tried, and the first one that brings the first coordinate inside
//! `[-180, 180] x [-90, 90]` wins. If none does, the input is returned unchanged.
//!
//! This is a heuristic, not a CRS solver. Candidates are plain data ([`CrsCandidate`]), so new regional grids can be
//! added through configuration.

use crate::coords::{first_position, try_map_positions};
use crate::geo::GeoPoint;
use crate::Point2;
use geojson::{Feature, FeatureCollection, Geometry};
use serde::{Deserialize, Serialize};

/// Candidate source reference system for [`reproject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsCandidate {
    /// Human-readable name, used in logs.
    pub name: String,
    /// `geodesy` operator definition converting from geographic to projected coordinates.
    pub definition: String,
}

impl CrsCandidate {
    /// Creates a new candidate.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }

    /// Default candidate list: a 3-degree transverse Mercator zone centered on 30°E and UTM zone 35N, both on the
    /// GRS80 ellipsoid.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("TM30", "tmerc lon_0=30 k_0=1 x_0=500000 ellps=GRS80"),
            Self::new("UTM35N", "tmerc lon_0=27 k_0=0.9996 x_0=500000 ellps=GRS80"),
        ]
    }

    #[cfg(feature = "geodesy")]
    fn unprojector(&self) -> Option<impl Fn(&Point2) -> Option<GeoPoint>> {
        use crate::geo::{GeodesyProjection, Projection};

        match GeodesyProjection::new(&self.definition) {
            Ok(projection) => Some(move |p: &Point2| projection.unproject(p)),
            Err(err) => {
                log::warn!("Skipping reprojection candidate {}: {err}", self.name);
                None
            }
        }
    }

    #[cfg(not(feature = "geodesy"))]
    fn unprojector(&self) -> Option<impl Fn(&Point2) -> Option<GeoPoint>> {
        log::debug!(
            "Reprojection candidate {} is unavailable without geodesy support",
            self.name
        );
        None::<fn(&Point2) -> Option<GeoPoint>>
    }
}

fn first_collection_position(collection: &FeatureCollection) -> Option<Point2> {
    collection
        .features
        .first()?
        .geometry
        .as_ref()
        .and_then(first_position)
        .and_then(crate::coords::to_point)
}

/// Returns true if the first coordinate of the collection lies outside the longitude/latitude range
/// (`|x| > 180` or `|y| > 90`).
pub fn looks_projected(collection: &FeatureCollection) -> bool {
    first_collection_position(collection)
        .map(|p| p.x().abs() > 180.0 || p.y().abs() > 90.0)
        .unwrap_or(false)
}

/// Tries every candidate in order and returns the collection converted with the first one producing a valid
/// longitude/latitude first coordinate. If no candidate fits, the input is returned unchanged.
///
/// The caller is expected to check [`looks_projected`] first; this function does not.
pub fn reproject(collection: FeatureCollection, candidates: &[CrsCandidate]) -> FeatureCollection {
    for candidate in candidates {
        let Some(unproject) = candidate.unprojector() else {
            continue;
        };

        let Some(converted) = convert_collection(&collection, &unproject) else {
            log::debug!("Candidate {} failed to convert coordinates", candidate.name);
            continue;
        };

        let valid = first_collection_position(&converted)
            .map(|p| GeoPoint::lonlat(p.x(), p.y()).is_valid())
            .unwrap_or(false);
        if valid {
            log::info!("Reprojected collection from {}", candidate.name);
            return converted;
        }

        log::debug!(
            "Candidate {} produced coordinates out of range",
            candidate.name
        );
    }

    log::warn!("No reprojection candidate matched, keeping original coordinates");
    collection
}

fn convert_collection(
    collection: &FeatureCollection,
    unproject: &impl Fn(&Point2) -> Option<GeoPoint>,
) -> Option<FeatureCollection> {
    let mut convert_position = |position: &Vec<f64>| -> Option<Vec<f64>> {
        let point = crate::coords::to_point(position)?;
        let geo = unproject(&point)?;
        let mut converted = geo.to_position();
        converted.extend_from_slice(&position[2..]);
        Some(converted)
    };

    let features = collection
        .features
        .iter()
        .map(|feature| {
            let geometry = match &feature.geometry {
                Some(geometry) => Some(Geometry {
                    bbox: None,
                    value: try_map_positions(&geometry.value, &mut convert_position)?,
                    foreign_members: geometry.foreign_members.clone(),
                }),
                None => None,
            };

            Some(Feature {
                bbox: None,
                geometry,
                id: feature.id.clone(),
                properties: feature.properties.clone(),
                foreign_members: feature.foreign_members.clone(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(FeatureCollection {
        bbox: None,
        features,
        foreign_members: collection.foreign_members.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::new_feature;
    use geojson::Value;

    fn collection_of(value: Value) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: vec![new_feature(Some(Geometry::new(value)), Default::default())],
            foreign_members: None,
        }
    }

    #[test]
    fn projected_detection() {
        assert!(looks_projected(&collection_of(Value::Point(vec![
            600_000.0,
            4_500_000.0
        ]))));
        assert!(!looks_projected(&collection_of(Value::Point(vec![
            28.9, 41.0
        ]))));
        assert!(looks_projected(&collection_of(Value::LineString(vec![
            vec![10.0, 95.0],
            vec![10.0, 10.0],
        ]))));

        let empty = FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        };
        assert!(!looks_projected(&empty));
    }

    #[cfg(feature = "geodesy")]
    #[test]
    fn reprojects_with_first_fitting_candidate() {
        use approx::assert_abs_diff_eq;

        let input = collection_of(Value::LineString(vec![
            vec![600_000.0, 4_500_000.0],
            vec![601_000.0, 4_501_000.0, 12.5],
        ]));
        let output = reproject(input, &CrsCandidate::defaults());
        assert!(!looks_projected(&output));

        let Some(Value::LineString(points)) = output.features[0].geometry.as_ref().map(|g| &g.value)
        else {
            panic!("geometry type changed");
        };
        assert_abs_diff_eq!(points[0][0], 31.18, epsilon = 0.05);
        assert_abs_diff_eq!(points[0][1], 40.64, epsilon = 0.05);
        assert_eq!(points[1].len(), 3);
        assert_eq!(points[1][2], 12.5);
    }

    #[test]
    fn unmatched_input_is_returned_unchanged() {
        let input = collection_of(Value::Point(vec![1e12, 1e12]));
        let output = reproject(input.clone(), &CrsCandidate::defaults());
        assert_eq!(output, input);

        let output = reproject(input.clone(), &[]);
        assert_eq!(output, input);
    }

    #[test]
    fn broken_candidates_are_skipped() {
        let input = collection_of(Value::Point(vec![1e12, 1e12]));
        let candidates = vec![CrsCandidate::new("broken", "not_an_operator")];
        assert_eq!(reproject(input.clone(), &candidates), input);
    }
}
