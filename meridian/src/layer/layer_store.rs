use crate::config::WorkbenchConfig;
use crate::error::WorkbenchError;
use crate::feature::{self, normalize, normalize_geojson, Fid, FID_PROPERTY};
use crate::layer::{GroupRegistry, Layer, LayerDefinition, LayerId, Style};
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};
use meridian_types::Rect;

/// Owner of all layers of a session and of the groups they are organized in.
///
/// Layers are kept in creation order. Every layer in the store is a member of exactly one group of the
/// [`GroupRegistry`].
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    groups: GroupRegistry,
    default_style: Style,
    imported_group: String,
    general_group: String,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new(&WorkbenchConfig::default())
    }
}

impl LayerStore {
    /// Creates an empty store using the style and group defaults of the configuration.
    pub fn new(config: &WorkbenchConfig) -> Self {
        Self {
            layers: vec![],
            groups: GroupRegistry::new(),
            default_style: *config.default_style(),
            imported_group: config.imported_group().to_string(),
            general_group: config.general_group().to_string(),
        }
    }

    /// Normalizes `raw` GeoJSON input and creates a layer of it. See [`LayerStore::create_layer_from_collection`].
    pub fn create_layer(
        &mut self,
        definition: &LayerDefinition,
        raw: JsonValue,
        is_imported: bool,
    ) -> LayerId {
        self.create_layer_from_collection(definition, normalize(raw), is_imported)
    }

    /// Creates a layer from a feature collection.
    ///
    /// Style values not given in the definition are taken from the default style. The layer is put into the group
    /// of the definition or, if none is given, into the imported or general group. Features without an id get one.
    ///
    /// A layer with the same id that already exists is replaced.
    pub fn create_layer_from_collection(
        &mut self,
        definition: &LayerDefinition,
        collection: FeatureCollection,
        is_imported: bool,
    ) -> LayerId {
        if self.remove_layer(&definition.id).is_some() {
            log::warn!("Layer {} already existed and was replaced", definition.id);
        }

        let collection = normalize_geojson(GeoJson::FeatureCollection(collection));
        let style = definition.style(&self.default_style);
        let layer = Layer::new(definition, collection, style, is_imported);

        let group = match &definition.group {
            Some(group) => group.as_str(),
            None if is_imported => self.imported_group.as_str(),
            None => self.general_group.as_str(),
        };
        self.groups.move_layer(layer.id(), group);

        log::info!(
            "Created {} layer {} ({}) with {} features in group {group}",
            layer.kind(),
            layer.id(),
            layer.name(),
            layer.features().len()
        );

        let id = layer.id().clone();
        self.layers.push(layer);
        id
    }

    /// Removes the layer and its group membership. Returns the removed layer, or `None` if there was no such layer.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id() == id)?;
        self.groups.remove_layer(id);
        let layer = self.layers.remove(index);
        log::info!("Removed layer {id}");

        Some(layer)
    }

    /// Replaces the style of the layer. Returns `false` and does nothing if the layer does not exist.
    pub fn restyle(&mut self, id: &LayerId, style: Style) -> bool {
        match self.layer_mut(id) {
            Ok(layer) => {
                layer.set_style(style);
                true
            }
            Err(_) => {
                log::debug!("Cannot restyle missing layer {id}");
                false
            }
        }
    }

    /// Restores the default style of the layer. Returns `false` if the layer does not exist.
    pub fn reset_style(&mut self, id: &LayerId) -> bool {
        self.restyle(id, self.default_style)
    }

    /// Appends the feature to the layer, giving it the next free id. Any id the feature already has is overwritten.
    pub fn append_feature(&mut self, id: &LayerId, feature: Feature) -> Result<Fid, WorkbenchError> {
        let layer = self.layer_mut(id)?;
        let fid = layer.push_feature(feature);
        log::debug!("Appended feature {fid} to layer {id}");

        Ok(fid)
    }

    /// Property names of the layer's features except the feature id, in first-seen order. `None` if there is no such
    /// layer.
    pub fn query_columns(&self, id: &LayerId) -> Option<Vec<String>> {
        self.layer(id).map(Layer::columns)
    }

    /// Adds a property with the `default` value to every feature of the layer that does not have it yet. Returns the
    /// number of features changed.
    pub fn add_field(
        &mut self,
        id: &LayerId,
        name: &str,
        default: JsonValue,
    ) -> Result<usize, WorkbenchError> {
        let name = name.trim();
        if name.is_empty() || name == FID_PROPERTY {
            return Err(WorkbenchError::Input(format!(
                "'{name}' cannot be used as a field name"
            )));
        }

        let layer = self.layer_mut(id)?;
        let mut changed = 0;
        for f in layer.features_mut() {
            let properties = f.properties.get_or_insert_with(Default::default);
            if !properties.contains_key(name) {
                properties.insert(name.to_string(), default.clone());
                changed += 1;
            }
        }

        log::debug!("Added field {name} to {changed} features of layer {id}");
        Ok(changed)
    }

    /// Moves the layer to the end of the `group`, creating the group if needed.
    pub fn move_layer(&mut self, id: &LayerId, group: &str) -> Result<(), WorkbenchError> {
        if self.layer(id).is_none() {
            return Err(WorkbenchError::LayerNotFound(id.clone()));
        }
        self.groups.move_layer(id, group);

        Ok(())
    }

    /// Creates an empty group if it does not exist.
    pub fn ensure_group(&mut self, name: &str) {
        self.groups.ensure(name);
    }

    /// Deletes an empty group. See [`GroupRegistry::delete_group`].
    pub fn delete_group(&mut self, name: &str) -> Result<(), WorkbenchError> {
        self.groups.delete_group(name)
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, id: &LayerId, is_visible: bool) -> Result<(), WorkbenchError> {
        self.layer_mut(id)?.set_visible(is_visible);
        Ok(())
    }

    /// Hides all layers of the group if any of them is visible, otherwise shows all of them. Returns the new
    /// visibility.
    pub fn toggle_group(&mut self, name: &str) -> Result<bool, WorkbenchError> {
        if !self.groups.contains(name) {
            return Err(WorkbenchError::GroupNotFound(name.to_string()));
        }

        let members = self.groups.members(name).to_vec();
        let any_visible = members
            .iter()
            .filter_map(|id| self.layer(id))
            .any(Layer::is_visible);

        for id in &members {
            if let Ok(layer) = self.layer_mut(id) {
                layer.set_visible(!any_visible);
            }
        }

        Ok(!any_visible)
    }

    /// Layer with the given id.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Feature of the layer with the given id.
    pub fn feature(&self, id: &LayerId, fid: Fid) -> Option<&Feature> {
        self.layer(id)?.feature(fid)
    }

    /// `key: value` popup lines of the feature.
    pub fn feature_summary(&self, id: &LayerId, fid: Fid) -> Option<String> {
        self.feature(id, fid).map(feature::summary)
    }

    /// All layers in creation order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the store has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Groups of the layers.
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Group the layer belongs to.
    pub fn group_of(&self, id: &LayerId) -> Option<&str> {
        self.groups.group_of(id)
    }

    /// Bounding rect of all layers with geometry.
    pub fn all_bounds(&self) -> Option<Rect> {
        Rect::merge_all(self.layers.iter().filter_map(Layer::bounds))
    }

    /// Default style of new layers.
    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    /// Removes all layers and groups.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.groups.clear();
    }

    fn layer_mut(&mut self, id: &LayerId) -> Result<&mut Layer, WorkbenchError> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| WorkbenchError::LayerNotFound(id.clone()))
    }
}
