//! Layers and their storage.
//!
//! A [`Layer`] owns a feature collection, a [`Style`] and an index from feature id to the position of the feature
//! in the collection. Layers live in the [`LayerStore`], which also keeps the [`GroupRegistry`] in sync with them.

mod group_registry;
mod layer_store;
mod style;

pub use group_registry::GroupRegistry;
pub use layer_store::LayerStore;
pub use style::{DashPattern, MarkerStyle, PathStyle, Style};

use crate::color::Color;
use crate::feature::{self, Fid};
use crate::query;
use geojson::{Feature, FeatureCollection};
use meridian_types::{coords, GeometryKind, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable identifier of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Creates a new id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String representation of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Definition of a layer to be created: identity, placement and optional style overrides.
///
/// The serialized form matches entries of a dataset manifest:
/// `{id, name, group?, geom?, color?, fillColor?, fillOpacity?, weight?, dash?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    /// Layer id.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Group name. If not set, the layer goes to the imported or general group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Geometry kind. If not set, it is inferred from the first feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom: Option<GeometryKind>,
    /// Line color. Values that are not valid colors are ignored.
    #[serde(
        default,
        deserialize_with = "crate::color::lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Color>,
    /// Fill color. Defaults to the line color.
    #[serde(
        default,
        deserialize_with = "crate::color::lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub fill_color: Option<Color>,
    /// Fill opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Line weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Dash pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<DashPattern>,
}

impl LayerDefinition {
    /// Creates a definition with the given id and name and nothing else specified.
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group: None,
            geom: None,
            color: None,
            fill_color: None,
            fill_opacity: None,
            weight: None,
            dash: None,
        }
    }

    /// Sets the group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the geometry kind.
    pub fn with_geom(mut self, geom: GeometryKind) -> Self {
        self.geom = Some(geom);
        self
    }

    /// Sets the line color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Resolves the style of the layer: explicit values from the definition, the rest from `default`. Fill color
    /// falls back to the line color when only the latter is given.
    pub fn style(&self, default: &Style) -> Style {
        let line_color = self.color.unwrap_or(default.line_color());
        let fill_color = self
            .fill_color
            .or(self.color)
            .unwrap_or(default.fill_color());

        Style::new(
            line_color,
            fill_color,
            self.fill_opacity.unwrap_or(default.fill_opacity()),
            self.weight.unwrap_or(default.weight()),
            self.dash.unwrap_or(default.dash()),
        )
    }
}

/// A named, styled collection of features sharing one geometry kind.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    kind: GeometryKind,
    features: FeatureCollection,
    style: Style,
    fid_index: BTreeMap<Fid, usize>,
    next_fid: Fid,
    is_imported: bool,
    is_visible: bool,
}

impl Layer {
    /// Creates a layer from a normalized collection, assigning ids to features that lack one.
    pub(crate) fn new(
        definition: &LayerDefinition,
        mut features: FeatureCollection,
        style: Style,
        is_imported: bool,
    ) -> Self {
        let (fid_index, next_fid) = assign_fids(&mut features.features);
        let kind = definition
            .geom
            .unwrap_or_else(|| GeometryKind::detect(&features));

        log::debug!(
            "Indexed {} features of layer {}, next fid is {next_fid}",
            fid_index.len(),
            definition.id
        );

        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            kind,
            features,
            style,
            fid_index,
            next_fid,
            is_imported,
            is_visible: true,
        }
    }

    /// Layer id.
    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry kind of the layer.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Current style.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Returns true if the layer was created by an import or as a new empty layer.
    pub fn is_imported(&self) -> bool {
        self.is_imported
    }

    /// Returns true if the layer is shown on the map.
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// The feature collection of the layer.
    pub fn collection(&self) -> &FeatureCollection {
        &self.features
    }

    /// Features of the layer in insertion order.
    pub fn features(&self) -> &[Feature] {
        &self.features.features
    }

    /// Feature with the given id.
    pub fn feature(&self, fid: Fid) -> Option<&Feature> {
        self.fid_index
            .get(&fid)
            .and_then(|&index| self.features.features.get(index))
    }

    /// Ids of all features, in ascending order.
    pub fn fids(&self) -> impl Iterator<Item = Fid> + '_ {
        self.fid_index.keys().copied()
    }

    /// Id that the next appended feature will get.
    pub fn next_fid(&self) -> Fid {
        self.next_fid
    }

    /// Union of user-visible property names over all features, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        query::columns(self.features())
    }

    /// Bounding rect of all feature geometries. `None` if the layer has no geometry.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::merge_all(
            self.features()
                .iter()
                .filter_map(|f| f.geometry.as_ref())
                .filter_map(coords::bounds),
        )
    }

    /// Bounding rect of a single feature.
    pub fn feature_bounds(&self, fid: Fid) -> Option<Rect> {
        self.feature(fid)?.geometry.as_ref().and_then(coords::bounds)
    }

    pub(crate) fn set_style(&mut self, style: Style) {
        self.style = style.normalized();
    }

    pub(crate) fn set_visible(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
    }

    pub(crate) fn push_feature(&mut self, mut feature: Feature) -> Fid {
        let fid = self.next_fid;
        feature::set_fid(&mut feature, fid);

        if self.kind == GeometryKind::Unknown {
            if let Some(geometry) = &feature.geometry {
                self.kind = GeometryKind::of(geometry);
            }
        }

        self.fid_index.insert(fid, self.features.features.len());
        self.features.features.push(feature);
        self.next_fid += 1;

        fid
    }

    pub(crate) fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features.features
    }
}

/// Assigns ids to features without a valid one. Pre-existing ids are kept unless they repeat an earlier one; new ids
/// continue after the largest pre-existing id. Returns the index and the next free id.
fn assign_fids(features: &mut [Feature]) -> (BTreeMap<Fid, usize>, Fid) {
    let mut next_fid = features
        .iter()
        .filter_map(feature::fid)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0);

    let mut index = BTreeMap::new();
    for (position, f) in features.iter_mut().enumerate() {
        let fid = match feature::fid(f) {
            Some(fid) if !index.contains_key(&fid) => fid,
            existing => {
                if let Some(duplicate) = existing {
                    log::debug!("Duplicate fid {duplicate} replaced with {next_fid}");
                }
                let fid = next_fid;
                feature::set_fid(f, fid);
                next_fid += 1;
                fid
            }
        };
        index.insert(fid, position);
    }

    (index, next_fid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::normalize;
    use serde_json::json;

    fn layer(raw: serde_json::Value) -> Layer {
        Layer::new(
            &LayerDefinition::new("l", "Layer"),
            normalize(raw),
            Style::default(),
            false,
        )
    }

    fn feature(properties: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [28.9, 41.0] },
            "properties": properties
        })
    }

    #[test]
    fn fids_start_at_zero() {
        let layer = layer(json!([feature(json!({})), feature(json!({})), feature(json!({}))]));
        assert_eq!(layer.fids().collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(layer.next_fid(), 3);
        assert_eq!(layer.kind(), GeometryKind::Point);
    }

    #[test]
    fn existing_fids_are_preserved() {
        let layer = layer(json!([
            feature(json!({"_fid": 10})),
            feature(json!({})),
            feature(json!({"_fid": 4})),
            feature(json!({"_fid": 4})),
        ]));
        let fids: Vec<_> = layer
            .features()
            .iter()
            .map(|f| feature::fid(f).expect("no fid"))
            .collect();
        assert_eq!(fids, [10, 11, 4, 12]);
        assert_eq!(layer.next_fid(), 13);
        assert_eq!(layer.feature(12), Some(&layer.features()[3]));
    }

    #[test]
    fn reindexing_is_stable() {
        let first = layer(json!([feature(json!({"a": 1})), feature(json!({"a": 2}))]));
        let second = Layer::new(
            &LayerDefinition::new("l2", "Copy"),
            first.collection().clone(),
            Style::default(),
            false,
        );
        assert_eq!(first.collection(), second.collection());
    }

    #[test]
    fn appended_fids_grow() {
        let mut layer = layer(json!({"type": "FeatureCollection", "features": []}));
        assert_eq!(layer.kind(), GeometryKind::Unknown);

        let raw = normalize(feature(json!({"_fid": 100})));
        let fid = layer.push_feature(raw.features[0].clone());
        assert_eq!(fid, 0);
        assert_eq!(layer.kind(), GeometryKind::Point);
        assert_eq!(layer.push_feature(raw.features[0].clone()), 1);
    }

    #[test]
    fn definition_style() {
        let default = Style::default();
        let style = LayerDefinition::new("a", "A")
            .with_color(Color::GREEN)
            .style(&default);
        assert_eq!(style.line_color(), Color::GREEN);
        assert_eq!(style.fill_color(), Color::GREEN);
        assert_eq!(style.fill_opacity(), 0.2);
        assert_eq!(style.weight(), 2.0);

        let style = LayerDefinition::new("a", "A").style(&default);
        assert_eq!(style, default);
    }

    #[test]
    fn definition_from_manifest_json() {
        let definition: LayerDefinition = serde_json::from_value(json!({
            "id": "roads",
            "name": "Roads",
            "geom": "line",
            "fillColor": "#16a34a",
            "dash": "dot"
        }))
        .expect("invalid definition");
        assert_eq!(definition.id, LayerId::new("roads"));
        assert_eq!(definition.geom, Some(GeometryKind::Line));
        assert_eq!(definition.fill_color, Some(Color::GREEN));
        assert_eq!(definition.dash, Some(DashPattern::Dot));
        assert_eq!(definition.group, None);
    }

    #[test]
    fn bounds() {
        let layer = layer(json!([
            feature(json!({})),
            {
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [[28.0, 40.0], [29.5, 41.5]] },
                "properties": {}
            }
        ]));
        assert_eq!(layer.bounds(), Some(Rect::new(28.0, 40.0, 29.5, 41.5)));
        assert!(layer.feature_bounds(0).expect("no bounds").is_point());
        assert_eq!(layer.feature_bounds(5), None);
    }
}
