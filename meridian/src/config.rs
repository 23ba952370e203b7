//! Session configuration.

use crate::color::Color;
use crate::error::WorkbenchError;
use crate::layer::Style;
use meridian_types::reproject::CrsCandidate;
use serde::{Deserialize, Serialize};

const DEFAULT_EARTH_RADIUS: f64 = 6_371_000.0;

/// Configuration of a [`Workbench`](crate::Workbench) session.
///
/// Every field has a default, so a configuration file only needs to list the values it changes:
///
/// ```
/// use meridian::WorkbenchConfig;
///
/// let config = WorkbenchConfig::from_json(r#"{ "importedGroup": "Uploads" }"#).unwrap();
/// assert_eq!(config.imported_group(), "Uploads");
/// assert_eq!(config.general_group(), "General");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkbenchConfig {
    default_style: Style,
    imported_group: String,
    general_group: String,
    geojson_import_color: Color,
    shapefile_import_color: Color,
    reprojection_candidates: Vec<CrsCandidate>,
    earth_radius: f64,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            default_style: Style::default(),
            imported_group: "Imported".to_string(),
            general_group: "General".to_string(),
            geojson_import_color: Color::BLUE,
            shapefile_import_color: Color::GREEN,
            reprojection_candidates: CrsCandidate::defaults(),
            earth_radius: DEFAULT_EARTH_RADIUS,
        }
    }
}

impl WorkbenchConfig {
    /// Parses configuration from a JSON document. Missing fields take default values.
    pub fn from_json(json: &str) -> Result<Self, WorkbenchError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.default_style = self.default_style.normalized();
        if !(self.earth_radius.is_finite() && self.earth_radius > 0.0) {
            log::warn!(
                "Invalid earth radius {}, using {DEFAULT_EARTH_RADIUS}",
                self.earth_radius
            );
            self.earth_radius = DEFAULT_EARTH_RADIUS;
        }
        self
    }

    /// Style used for layers that do not specify their own.
    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    /// Sets style used for layers that do not specify their own.
    pub fn with_default_style(mut self, style: Style) -> Self {
        self.default_style = style.normalized();
        self
    }

    /// Group of imported and newly created layers.
    pub fn imported_group(&self) -> &str {
        &self.imported_group
    }

    /// Sets group of imported and newly created layers.
    pub fn with_imported_group(mut self, name: impl Into<String>) -> Self {
        self.imported_group = name.into();
        self
    }

    /// Group of dataset layers without an explicit group.
    pub fn general_group(&self) -> &str {
        &self.general_group
    }

    /// Sets group of dataset layers without an explicit group.
    pub fn with_general_group(mut self, name: impl Into<String>) -> Self {
        self.general_group = name.into();
        self
    }

    /// Line color of imported GeoJSON layers.
    pub fn geojson_import_color(&self) -> Color {
        self.geojson_import_color
    }

    /// Line color of imported shapefile layers.
    pub fn shapefile_import_color(&self) -> Color {
        self.shapefile_import_color
    }

    /// Sets line colors of imported GeoJSON and shapefile layers.
    pub fn with_import_colors(mut self, geojson: Color, shapefile: Color) -> Self {
        self.geojson_import_color = geojson;
        self.shapefile_import_color = shapefile;
        self
    }

    /// Ordered reprojection candidates tried for projected input.
    pub fn reprojection_candidates(&self) -> &[CrsCandidate] {
        &self.reprojection_candidates
    }

    /// Sets reprojection candidates.
    pub fn with_reprojection_candidates(mut self, candidates: Vec<CrsCandidate>) -> Self {
        self.reprojection_candidates = candidates;
        self
    }

    /// Sphere radius used for great-circle distances, in meters.
    pub fn earth_radius(&self) -> f64 {
        self.earth_radius
    }

    /// Sets sphere radius used for great-circle distances. Non-positive values are ignored.
    pub fn with_earth_radius(mut self, radius: f64) -> Self {
        self.earth_radius = radius;
        self.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.imported_group(), "Imported");
        assert_eq!(config.general_group(), "General");
        assert_eq!(config.default_style(), &Style::default());
        assert_eq!(config.reprojection_candidates().len(), 2);
        assert_eq!(config.shapefile_import_color(), Color::GREEN);
    }

    #[test]
    fn partial_json() {
        let config = WorkbenchConfig::from_json(
            r##"{
                "generalGroup": "Base",
                "defaultStyle": { "lineColor": "#16a34a", "weight": 0 },
                "reprojectionCandidates": [{ "name": "UTM36N", "definition": "utm zone=36" }],
                "earthRadius": -1
            }"##,
        )
        .expect("invalid config");

        assert_eq!(config.general_group(), "Base");
        assert_eq!(config.imported_group(), "Imported");
        assert_eq!(config.default_style().line_color(), Color::GREEN);
        assert_eq!(config.default_style().weight(), 1.0);
        assert_eq!(
            config.reprojection_candidates(),
            &[CrsCandidate::new("UTM36N", "utm zone=36")]
        );
        assert_eq!(config.earth_radius(), DEFAULT_EARTH_RADIUS);
    }

    #[test]
    fn invalid_json() {
        assert!(WorkbenchConfig::from_json("{ \"earthRadius\": \"far\" }").is_err());
    }
}
