//! Meridian is the state engine of a vector map workbench. It keeps the layers of a session, answers attribute
//! queries and measures things on the map, while leaving map display and widgets to the application.
//!
//! # Quick start
//!
//! ```no_run
//! use meridian::{Workbench, WorkbenchConfig};
//! use meridian::layer::LayerDefinition;
//! use serde_json::json;
//!
//! let mut workbench = Workbench::new(WorkbenchConfig::default());
//! let roads = workbench.create_layer(
//!     &LayerDefinition::new("roads", "Roads"),
//!     json!({
//!         "type": "Feature",
//!         "geometry": { "type": "LineString", "coordinates": [[28.97, 41.0], [29.02, 41.04]] },
//!         "properties": { "name": "Main street" }
//!     }),
//!     false,
//! );
//!
//! workbench.open_attributes(&roads).unwrap();
//! workbench.set_filter("name=main");
//! println!("{}", workbench.attribute_summary().unwrap());
//! ```
//!
//! # Main components
//!
//! * [`feature`] normalizes arbitrary GeoJSON-like input into a feature collection and gives every feature a stable
//!   id (`fid`),
//! * [`LayerStore`](layer::LayerStore) owns the [`layers`](layer) of the session and the
//!   [`groups`](layer::GroupRegistry) they are organized in,
//! * [`query`] filters attributes and exports them as CSV,
//! * [`tool`] measures distances and areas and digitizes new features,
//! * [`data_provider`] loads datasets listed in a manifest from files or over HTTP.
//!
//! [`Workbench`] ties these together into a single session object. It does not need a map to work: a
//! [`RenderSurface`](render::RenderSurface) can be attached to have the map follow the layers, and a [`Messenger`]
//! receives human-readable status messages.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
mod config;
pub mod data_provider;
pub mod error;
pub mod feature;
pub mod layer;
mod messenger;
pub mod query;
pub mod render;
pub mod selection;
pub mod tool;
mod workbench;

pub use color::Color;
pub use config::WorkbenchConfig;
pub use error::WorkbenchError;
pub use messenger::{DummyMessenger, LogMessenger, Messenger};
pub use workbench::{BatchReport, CsvExport, Finished, LoadFailure, Workbench};

// Reexport meridian_types
pub use meridian_types;
