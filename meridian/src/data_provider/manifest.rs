use crate::data_provider::DatasetSource;
use crate::error::WorkbenchError;
use crate::layer::LayerDefinition;
use futures::future::join_all;
use geojson::JsonValue;
use serde::{Deserialize, Serialize};

/// Entry of a dataset manifest: a layer definition and the file with its data.
///
/// Serialized as a flat object: `{id, file, name, group?, geom?, color?, fillColor?, fillOpacity?, weight?, dash?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Name of the GeoJSON file, resolved by a [`DatasetSource`].
    pub file: String,
    /// Definition of the layer created from the file.
    #[serde(flatten)]
    pub definition: LayerDefinition,
}

/// Parses a manifest: a JSON array of entries.
pub fn parse_manifest(contents: &[u8]) -> Result<Vec<ManifestEntry>, WorkbenchError> {
    Ok(serde_json::from_slice(contents)?)
}

/// Parses the contents of a dataset file as JSON.
pub fn parse_dataset(contents: &[u8]) -> Result<JsonValue, WorkbenchError> {
    serde_json::from_slice(contents).map_err(|err| WorkbenchError::Input(err.to_string()))
}

/// Loads and parses the manifest file from the source.
pub async fn load_manifest(
    source: &dyn DatasetSource,
    manifest_file: &str,
) -> Result<Vec<ManifestEntry>, WorkbenchError> {
    let contents = source.load(manifest_file).await?;
    let entries = parse_manifest(&contents)?;
    log::info!("Manifest {manifest_file} lists {} layers", entries.len());

    Ok(entries)
}

/// Loads and parses the files of all entries concurrently. Results are in the order of `entries`; a failure of one
/// file does not affect the others.
pub async fn fetch_all(
    source: &dyn DatasetSource,
    entries: &[ManifestEntry],
) -> Vec<Result<JsonValue, WorkbenchError>> {
    join_all(entries.iter().map(|entry| async move {
        let contents = source.load(&entry.file).await?;
        parse_dataset(&contents)
    }))
    .await
}
