use crate::config::WorkbenchConfig;
use crate::data_provider::{self, DatasetSource, ManifestEntry, ShapefileDecoder};
use crate::error::WorkbenchError;
use crate::feature::{self, Fid, Normalized};
use crate::layer::{GroupRegistry, Layer, LayerDefinition, LayerId, LayerStore, Style};
use crate::messenger::{DummyMessenger, Messenger};
use crate::query::{export_file_name, AttributeTable};
use crate::render::RenderSurface;
use crate::selection::{AttributeView, FeatureKey};
use crate::tool::{Measurement, Tool, ToolOutcome, ToolSession};
use geojson::{Feature, FeatureCollection, JsonValue};
use meridian_types::reproject::{looks_projected, reproject};
use meridian_types::{GeoPoint, GeometryKind, Rect};

const MIN_POINT_ZOOM: f64 = 16.0;

/// A workbench session: layers and groups, the attribute view and the active map tool.
///
/// The workbench can work without a rendering surface. When one is attached with [`Workbench::with_surface`], it is
/// kept in sync with the layers of the session.
pub struct Workbench {
    config: WorkbenchConfig,
    store: LayerStore,
    imported: Vec<LayerId>,
    next_local_id: u64,
    tools: ToolSession,
    attributes: AttributeView,
    surface: Option<Box<dyn RenderSurface>>,
    messenger: Box<dyn Messenger>,
    did_initial_fit: bool,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(WorkbenchConfig::default())
    }
}

/// Outcome of a finished map tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Finished {
    /// Final value of a measurement.
    Measurement(Measurement),
    /// A digitized feature appended to its layer.
    Feature(FeatureKey),
}

/// CSV export of an attribute table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested file name.
    pub file_name: String,
    /// CSV text.
    pub contents: String,
}

/// File of a dataset that failed to load.
#[derive(Debug)]
pub struct LoadFailure {
    /// File name from the manifest.
    pub file: String,
    /// Reason of the failure.
    pub error: WorkbenchError,
}

/// Result of loading a dataset: layers that were created and files that failed.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Ids of the created layers, in manifest order.
    pub loaded: Vec<LayerId>,
    /// Files that could not be loaded.
    pub failures: Vec<LoadFailure>,
}

impl BatchReport {
    /// Returns true if every file was loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Status line describing the report, e.g. `Loaded 3 layers, 1 failed: roads.geojson`.
    pub fn message(&self) -> String {
        let loaded = format!("Loaded {} layers", self.loaded.len());
        if self.failures.is_empty() {
            return loaded;
        }

        let files: Vec<&str> = self.failures.iter().map(|f| f.file.as_str()).collect();
        format!(
            "{loaded}, {} failed: {}",
            self.failures.len(),
            files.join(", ")
        )
    }
}

impl Workbench {
    /// Creates an empty session.
    pub fn new(config: WorkbenchConfig) -> Self {
        Self {
            store: LayerStore::new(&config),
            tools: ToolSession::new(config.earth_radius()),
            config,
            imported: vec![],
            next_local_id: 1,
            attributes: AttributeView::new(),
            surface: None,
            messenger: Box::new(DummyMessenger),
            did_initial_fit: false,
        }
    }

    /// Attaches a rendering surface.
    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Sets the receiver of status messages.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Box::new(messenger);
        self
    }

    /// Configuration of the session.
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Layers of the session.
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Layer with the given id.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.store.layer(id)
    }

    /// Groups and their layers in display order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[LayerId])> + '_ {
        self.store.groups().iter()
    }

    /// Group registry of the session.
    pub fn group_registry(&self) -> &GroupRegistry {
        self.store.groups()
    }

    /// Group the layer belongs to.
    pub fn group_of(&self, id: &LayerId) -> Option<&str> {
        self.store.group_of(id)
    }

    /// Ids of layers created by imports or as new empty layers.
    pub fn imported(&self) -> &[LayerId] {
        &self.imported
    }

    /// Creates a layer from raw GeoJSON input. Projected coordinates are converted to longitude/latitude if one of
    /// the configured reprojection candidates fits.
    pub fn create_layer(
        &mut self,
        definition: &LayerDefinition,
        raw: JsonValue,
        is_imported: bool,
    ) -> LayerId {
        let collection = self.prepare(feature::normalize(raw));
        self.insert_layer(definition, collection, is_imported)
    }

    /// Parses a GeoJSON file and creates an imported layer named after the file.
    pub fn import_geojson(
        &mut self,
        file_name: &str,
        contents: &[u8],
    ) -> Result<LayerId, WorkbenchError> {
        let raw = match data_provider::parse_dataset(contents) {
            Ok(raw) => raw,
            Err(err) => {
                self.messenger
                    .status(&format!("Cannot read GeoJSON {file_name}"));
                return Err(err);
            }
        };

        let normalized = match readable_features(raw, file_name) {
            Ok(normalized) => normalized,
            Err(err) => {
                self.messenger
                    .status(&format!("No readable features in {file_name}"));
                return Err(err);
            }
        };

        let collection = self.prepare(normalized.collection);
        let color = self.config.geojson_import_color();
        Ok(self.import_collection(file_name, collection, color, normalized.skipped))
    }

    /// Decodes a zipped shapefile with the `decoder` and creates an imported layer named after the file.
    pub fn import_shapefile(
        &mut self,
        file_name: &str,
        archive: &[u8],
        decoder: &dyn ShapefileDecoder,
    ) -> Result<LayerId, WorkbenchError> {
        let collection = match decoder.decode(archive) {
            Ok(collection) => collection,
            Err(err) => {
                self.messenger
                    .status(&format!("Cannot read shapefile archive {file_name}"));
                return Err(err);
            }
        };

        let collection = self.prepare(collection);
        let color = self.config.shapefile_import_color();
        Ok(self.import_collection(file_name, collection, color, 0))
    }

    /// Creates an empty layer of the given geometry kind in the imported group, to be filled by digitizing.
    pub fn create_empty_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
    ) -> Result<LayerId, WorkbenchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkbenchError::Input("layer name is empty".to_string()));
        }
        if kind == GeometryKind::Unknown {
            return Err(WorkbenchError::Input(
                "new layer must have point, line or polygon geometry".to_string(),
            ));
        }

        let id = self.local_id("edit");
        let definition = LayerDefinition::new(id, name)
            .with_group(self.config.imported_group())
            .with_geom(kind);
        let collection = feature::normalize(JsonValue::Null);

        let id = self.insert_layer(&definition, collection, true);
        self.imported.push(id.clone());
        self.messenger
            .status(&format!("Created {kind} layer {name}"));

        Ok(id)
    }

    /// Removes the layer. Returns false if there was no such layer.
    pub fn remove_layer(&mut self, id: &LayerId) -> bool {
        if self.store.remove_layer(id).is_none() {
            return false;
        }

        self.imported.retain(|i| i != id);
        self.discard_layer_state(id);
        if let Some(surface) = &mut self.surface {
            surface.remove_layer(id);
        }

        true
    }

    /// Removes all imported and newly created layers. Returns the number of removed layers.
    pub fn clear_imports(&mut self) -> usize {
        let imported = std::mem::take(&mut self.imported);
        let removed = imported.iter().filter(|id| self.remove_layer(id)).count();

        self.messenger
            .status(&format!("Removed {removed} imported layers"));
        removed
    }

    /// Removes all layers and groups and cancels the active tool.
    pub fn reset(&mut self) {
        let ids: Vec<LayerId> = self.store.layers().map(|l| l.id().clone()).collect();
        if let Some(surface) = &mut self.surface {
            for id in &ids {
                surface.remove_layer(id);
            }
        }

        self.store.clear();
        self.imported.clear();
        self.tools.cancel();
        self.attributes.close();
        self.did_initial_fit = false;
        log::info!("Session reset, {} layers removed", ids.len());
    }

    /// Replaces the style of the layer. Returns false if there is no such layer.
    pub fn restyle(&mut self, id: &LayerId, style: Style) -> bool {
        self.store.restyle(id, style) && self.sync_style(id)
    }

    /// Restores the default style of the layer. Returns false if there is no such layer.
    pub fn reset_style(&mut self, id: &LayerId) -> bool {
        self.store.reset_style(id) && self.sync_style(id)
    }

    /// Appends a feature to the layer. See [`LayerStore::append_feature`].
    pub fn append_feature(&mut self, id: &LayerId, feature: Feature) -> Result<Fid, WorkbenchError> {
        let fid = self.store.append_feature(id, feature)?;
        self.sync_layer(id);

        Ok(fid)
    }

    /// Property names of the layer's features. See [`LayerStore::query_columns`].
    pub fn query_columns(&self, id: &LayerId) -> Option<Vec<String>> {
        self.store.query_columns(id)
    }

    /// Adds a field with a default value to the features of the layer. See [`LayerStore::add_field`].
    pub fn add_field(
        &mut self,
        id: &LayerId,
        name: &str,
        default: JsonValue,
    ) -> Result<usize, WorkbenchError> {
        self.store.add_field(id, name, default)
    }

    /// Creates an empty group.
    pub fn ensure_group(&mut self, name: &str) -> Result<(), WorkbenchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkbenchError::Input("group name is empty".to_string()));
        }

        self.store.ensure_group(name);
        Ok(())
    }

    /// Moves the layer to the end of the group.
    pub fn move_layer(&mut self, id: &LayerId, group: &str) -> Result<(), WorkbenchError> {
        self.store.move_layer(id, group)
    }

    /// Deletes an empty group.
    pub fn delete_group(&mut self, name: &str) -> Result<(), WorkbenchError> {
        let result = self.store.delete_group(name);
        if let Err(WorkbenchError::GroupNotEmpty { layers, .. }) = &result {
            self.messenger.status(&format!(
                "Group {name} cannot be deleted: it still has {layers} layer(s)"
            ));
        }

        result
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, id: &LayerId, is_visible: bool) -> Result<(), WorkbenchError> {
        self.store.set_visible(id, is_visible)?;
        if let Some(surface) = &mut self.surface {
            surface.set_visible(id, is_visible);
        }

        Ok(())
    }

    /// Hides all layers of the group if any is visible, shows them all otherwise. Returns the new visibility.
    pub fn toggle_group(&mut self, name: &str) -> Result<bool, WorkbenchError> {
        let is_visible = self.store.toggle_group(name)?;
        if let Some(surface) = &mut self.surface {
            for id in self.store.groups().members(name) {
                surface.set_visible(id, is_visible);
            }
        }

        Ok(is_visible)
    }

    /// Loads all files of the manifest concurrently and creates layers for those that loaded, in manifest order.
    /// Failures are collected in the report and do not affect other files.
    pub async fn load_dataset(
        &mut self,
        source: &dyn DatasetSource,
        entries: &[ManifestEntry],
    ) -> BatchReport {
        let results = data_provider::fetch_all(source, entries).await;

        let mut report = BatchReport::default();
        for (entry, result) in entries.iter().zip(results) {
            match result.and_then(|raw| readable_features(raw, &entry.file)) {
                Ok(normalized) => {
                    let collection = self.prepare(normalized.collection);
                    let id = self.insert_layer(&entry.definition, collection, false);
                    report.loaded.push(id);
                }
                Err(error) => {
                    log::warn!("Failed to load {}: {error}", entry.file);
                    report.failures.push(LoadFailure {
                        file: entry.file.clone(),
                        error,
                    });
                }
            }
        }

        self.messenger.status(&report.message());
        report
    }

    /// Loads the manifest file from the source and then all the files it lists. See [`Workbench::load_dataset`].
    pub async fn load_manifest(
        &mut self,
        source: &dyn DatasetSource,
        manifest_file: &str,
    ) -> Result<BatchReport, WorkbenchError> {
        let entries = match data_provider::load_manifest(source, manifest_file).await {
            Ok(entries) => entries,
            Err(err) => {
                self.messenger
                    .status(&format!("Cannot read manifest {manifest_file}"));
                return Err(err);
            }
        };

        Ok(self.load_dataset(source, &entries).await)
    }

    /// Bounds of the layer as shown on the map.
    pub fn layer_bounds(&self, id: &LayerId) -> Option<Rect> {
        self.surface
            .as_ref()
            .and_then(|s| s.bounds(id))
            .or_else(|| self.store.layer(id)?.bounds())
    }

    /// Bounds of all layers.
    pub fn all_bounds(&self) -> Option<Rect> {
        Rect::merge_all(self.store.layers().filter_map(|l| self.layer_bounds(l.id())))
    }

    /// Bounds of a feature.
    pub fn feature_bounds(&self, id: &LayerId, fid: Fid) -> Option<Rect> {
        self.store.layer(id)?.feature_bounds(fid)
    }

    /// Moves the view to the layer. Returns false if there is nothing to zoom to.
    pub fn zoom_to_layer(&mut self, id: &LayerId) -> bool {
        let bounds = self.layer_bounds(id);
        self.zoom_to(bounds)
    }

    /// Moves the view to show all layers. Returns false if there is nothing to zoom to.
    pub fn zoom_to_all(&mut self) -> bool {
        let bounds = self.all_bounds();
        self.zoom_to(bounds)
    }

    /// Moves the view to the feature. Returns false if there is nothing to zoom to.
    pub fn zoom_to_feature(&mut self, id: &LayerId, fid: Fid) -> bool {
        let bounds = self.feature_bounds(id, fid);
        self.zoom_to(bounds)
    }

    /// Popup text of the feature.
    pub fn feature_summary(&self, id: &LayerId, fid: Fid) -> Option<String> {
        self.store.feature_summary(id, fid)
    }

    /// Attribute view state.
    pub fn attribute_view(&self) -> &AttributeView {
        &self.attributes
    }

    /// Opens the attribute view for the layer.
    pub fn open_attributes(&mut self, id: &LayerId) -> Result<(), WorkbenchError> {
        if self.store.layer(id).is_none() {
            return Err(WorkbenchError::LayerNotFound(id.clone()));
        }

        self.attributes.open(id.clone());
        Ok(())
    }

    /// Closes the attribute view.
    pub fn close_attributes(&mut self) {
        self.attributes.close();
    }

    /// Sets the attribute filter expression.
    pub fn set_filter(&mut self, expression: &str) {
        self.attributes.set_filter(expression);
    }

    /// Filtered attribute table of the active layer.
    pub fn attribute_table(&self) -> Option<AttributeTable> {
        let layer = self.store.layer(self.attributes.active_layer()?)?;
        Some(self.attributes.table(layer))
    }

    /// Header of the attribute view, e.g. `Roads • 2/10 records`.
    pub fn attribute_summary(&self) -> Option<String> {
        let layer = self.store.layer(self.attributes.active_layer()?)?;
        Some(self.attributes.summary(layer))
    }

    /// Selects a feature clicked on the map or in the table. Only features of the active attribute layer can be
    /// selected. Returns true if the feature was selected.
    pub fn select_feature(&mut self, id: &LayerId, fid: Fid) -> bool {
        self.store.feature(id, fid).is_some() && self.attributes.select(id, fid)
    }

    /// Clears the selected feature.
    pub fn clear_selection(&mut self) {
        self.attributes.clear_selection();
    }

    /// CSV export of the layer's attributes with the current filter applied.
    pub fn export_attributes(&self, id: &LayerId) -> Result<CsvExport, WorkbenchError> {
        let layer = self
            .store
            .layer(id)
            .ok_or_else(|| WorkbenchError::LayerNotFound(id.clone()))?;

        Ok(CsvExport {
            file_name: export_file_name(layer.name()),
            contents: self.attributes.table(layer).to_csv()?,
        })
    }

    /// Tool session.
    pub fn tools(&self) -> &ToolSession {
        &self.tools
    }

    /// Activates a map tool, cancelling the one that was active. Digitizing requires an existing layer with a known
    /// geometry kind.
    pub fn start_tool(&mut self, tool: Tool) -> Result<(), WorkbenchError> {
        if let Tool::Digitize { layer, kind } = &tool {
            let target = self
                .store
                .layer(layer)
                .ok_or_else(|| WorkbenchError::LayerNotFound(layer.clone()))?;
            if *kind != target.kind() || *kind == GeometryKind::Unknown {
                return Err(WorkbenchError::Input(format!(
                    "cannot draw {kind} features into {} layer {}",
                    target.kind(),
                    target.name()
                )));
            }
        }

        self.messenger.status(&format!("Tool: {tool}"));
        self.tools.start(tool);
        Ok(())
    }

    /// Starts digitizing into the layer, using the geometry kind of the layer.
    pub fn start_digitizing(&mut self, id: &LayerId) -> Result<(), WorkbenchError> {
        let kind = self
            .store
            .layer(id)
            .map(Layer::kind)
            .ok_or_else(|| WorkbenchError::LayerNotFound(id.clone()))?;
        self.start_tool(Tool::Digitize {
            layer: id.clone(),
            kind,
        })
    }

    /// Adds a clicked point to the active tool.
    pub fn add_point(&mut self, point: GeoPoint) -> Result<(), WorkbenchError> {
        self.tools.add_point(point)?;
        if let Some(readout) = self.tools.readout() {
            self.messenger.status(&readout);
        }

        Ok(())
    }

    /// Updates the pointer position of the active tool.
    pub fn move_pointer(&mut self, point: GeoPoint) {
        self.tools.move_pointer(point);
    }

    /// Finishes the active tool. A digitized feature is appended to its layer.
    pub fn finish_tool(&mut self) -> Result<Finished, WorkbenchError> {
        match self.tools.finish()? {
            ToolOutcome::Measurement(measurement) => {
                self.messenger
                    .status(&format!("Result: {}", measurement.readout()));
                Ok(Finished::Measurement(measurement))
            }
            ToolOutcome::Feature { layer, geometry } => {
                let new_feature =
                    meridian_types::coords::new_feature(Some(geometry), Default::default());
                let fid = self.append_feature(&layer, new_feature)?;
                self.messenger
                    .status(&format!("Added feature {fid} to {layer}"));
                Ok(Finished::Feature(FeatureKey { layer, fid }))
            }
        }
    }

    /// Cancels the active tool, discarding its points.
    pub fn cancel_tool(&mut self) -> Option<Tool> {
        let cancelled = self.tools.cancel();
        if let Some(tool) = &cancelled {
            self.messenger.status(&format!("Cancelled {tool}"));
        }
        cancelled
    }

    fn prepare(&self, collection: FeatureCollection) -> FeatureCollection {
        if looks_projected(&collection) {
            log::info!("Input looks projected, trying to reproject");
            reproject(collection, self.config.reprojection_candidates())
        } else {
            collection
        }
    }

    fn import_collection(
        &mut self,
        file_name: &str,
        collection: FeatureCollection,
        color: crate::color::Color,
        skipped: usize,
    ) -> LayerId {
        let definition = LayerDefinition::new(self.local_id("import"), file_name)
            .with_group(self.config.imported_group())
            .with_color(color);
        let feature_count = collection.features.len();

        let id = self.insert_layer(&definition, collection, true);
        self.imported.push(id.clone());
        if skipped > 0 {
            self.messenger.status(&format!(
                "Imported {file_name}: {feature_count} features, {skipped} invalid skipped"
            ));
        } else {
            self.messenger
                .status(&format!("Imported {file_name}: {feature_count} features"));
        }

        id
    }

    fn insert_layer(
        &mut self,
        definition: &LayerDefinition,
        collection: FeatureCollection,
        is_imported: bool,
    ) -> LayerId {
        if self.store.layer(&definition.id).is_some() {
            self.discard_layer_state(&definition.id);
        }

        let id = self
            .store
            .create_layer_from_collection(definition, collection, is_imported);

        self.sync_layer(&id);
        if !self.did_initial_fit {
            if let Some(bounds) = self.layer_bounds(&id).filter(Rect::is_valid) {
                self.did_initial_fit = true;
                self.zoom_to(Some(bounds));
            }
        }

        id
    }

    /// Closes the attribute view of the layer and cancels digitizing into it. Used when the layer is removed or
    /// replaced.
    fn discard_layer_state(&mut self, id: &LayerId) {
        self.attributes.forget(id);

        let is_target = matches!(
            self.tools.active_tool(),
            Some(Tool::Digitize { layer, .. }) if layer == id
        );
        if is_target {
            self.tools.cancel();
            self.messenger
                .status(&format!("Cancelled digitizing into {id}"));
        }
    }

    fn local_id(&mut self, prefix: &str) -> LayerId {
        loop {
            let id = LayerId::new(format!("{prefix}_{}", self.next_local_id));
            self.next_local_id += 1;
            if self.store.layer(&id).is_none() {
                return id;
            }
        }
    }

    fn sync_layer(&mut self, id: &LayerId) {
        if let (Some(surface), Some(layer)) = (&mut self.surface, self.store.layer(id)) {
            surface.add_layer(layer);
        }
    }

    fn sync_style(&mut self, id: &LayerId) -> bool {
        if let (Some(surface), Some(layer)) = (&mut self.surface, self.store.layer(id)) {
            surface.update_style(id, layer.style());
        }
        true
    }

    fn zoom_to(&mut self, bounds: Option<Rect>) -> bool {
        let (Some(surface), Some(bounds)) = (&mut self.surface, bounds) else {
            return false;
        };

        if bounds.is_point() {
            let center = bounds.center();
            let zoom = surface.current_zoom().max(MIN_POINT_ZOOM);
            surface.set_view(GeoPoint::lonlat(center.x(), center.y()), zoom);
        } else {
            surface.fit_bounds(bounds);
        }

        true
    }
}

/// Normalizes the file contents, failing if the file lists features but none of them can be read.
fn readable_features(raw: JsonValue, file_name: &str) -> Result<Normalized, WorkbenchError> {
    let normalized = feature::normalize_with_report(raw);
    if normalized.is_unreadable() {
        return Err(WorkbenchError::Input(format!(
            "none of the {} features in {file_name} can be read",
            normalized.skipped
        )));
    }

    Ok(normalized)
}
