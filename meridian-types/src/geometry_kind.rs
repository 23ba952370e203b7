use serde::{Deserialize, Serialize};

/// Coarse classification of a layer's geometry.
///
/// A layer is either supplied with an explicit kind, or the kind is inferred once from the type name of its first
/// feature's geometry. Multi-variants classify the same as their singular counterparts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// `Point` and `MultiPoint`.
    Point,
    /// `LineString` and `MultiLineString`.
    Line,
    /// `Polygon` and `MultiPolygon`.
    Polygon,
    /// Anything else, including empty collections and geometry collections.
    #[default]
    Unknown,
}

impl GeometryKind {
    /// Classifies a GeoJSON geometry type name by substring match.
    ///
    /// ```
    /// use meridian_types::GeometryKind;
    ///
    /// assert_eq!(GeometryKind::from_type_name("MultiLineString"), GeometryKind::Line);
    /// assert_eq!(GeometryKind::from_type_name("GeometryCollection"), GeometryKind::Unknown);
    /// ```
    pub fn from_type_name(type_name: &str) -> Self {
        if type_name.contains("Point") {
            Self::Point
        } else if type_name.contains("LineString") {
            Self::Line
        } else if type_name.contains("Polygon") {
            Self::Polygon
        } else {
            Self::Unknown
        }
    }

    /// Classifies a geometry value.
    pub fn of(geometry: &geojson::Geometry) -> Self {
        Self::from_type_name(crate::coords::type_name(&geometry.value))
    }

    /// Classifies a collection by its first feature. Collections whose first feature has no geometry are
    /// [`GeometryKind::Unknown`].
    pub fn detect(collection: &geojson::FeatureCollection) -> Self {
        collection
            .features
            .first()
            .and_then(|f| f.geometry.as_ref())
            .map(Self::of)
            .unwrap_or_default()
    }

    /// Lowercase name of the kind, as used in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
