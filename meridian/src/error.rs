//! Error types used by the crate.

use crate::feature::Fid;
use crate::layer::LayerId;
use thiserror::Error;

/// Workbench error type.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    /// Malformed or unsupported input. The import is abandoned and no state is changed.
    #[error("invalid input: {0}")]
    Input(String),
    /// Layer with the given id does not exist.
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),
    /// Feature with the given id does not exist in the layer.
    #[error("feature {fid} not found in layer {layer}")]
    FeatureNotFound {
        /// Layer that was searched.
        layer: LayerId,
        /// Requested feature id.
        fid: Fid,
    },
    /// Group with the given name does not exist.
    #[error("group not found: {0}")]
    GroupNotFound(String),
    /// Group cannot be deleted while it still has layers.
    #[error("group '{name}' still contains {layers} layer(s)")]
    GroupNotEmpty {
        /// Group name.
        name: String,
        /// Number of layers in the group.
        layers: usize,
    },
    /// Operation requires an active tool.
    #[error("no active tool")]
    NoActiveTool,
    /// Not enough points were collected to finish the tool.
    #[error("at least {required} point(s) are required, got {got}")]
    InsufficientPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points collected.
        got: usize,
    },
    /// Error reading data from the file system.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    /// Error loading data over the network.
    #[error("failed to load data: {0}")]
    Network(String),
    /// Error decoding JSON.
    #[error("failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Error writing CSV.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(feature = "url")]
impl From<reqwest::Error> for WorkbenchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}
