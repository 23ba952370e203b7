//! Interface of the map rendering surface.

use crate::layer::{Layer, LayerId, Style};
use meridian_types::{GeoPoint, Rect};

/// Map surface that displays layers.
///
/// The workbench drives the surface but does not depend on any specific implementation. Rects and points are in
/// longitude/latitude.
pub trait RenderSurface {
    /// Adds the layer to the map, or replaces it if a layer with the same id is shown already.
    fn add_layer(&mut self, layer: &Layer);
    /// Removes the layer from the map.
    fn remove_layer(&mut self, id: &LayerId);
    /// Applies a new style to the layer.
    fn update_style(&mut self, id: &LayerId, style: &Style);
    /// Shows or hides the layer.
    fn set_visible(&mut self, id: &LayerId, is_visible: bool) {
        let _ = (id, is_visible);
    }
    /// Rendered bounds of the layer, if the surface knows them better than the feature geometry does.
    fn bounds(&self, id: &LayerId) -> Option<Rect> {
        let _ = id;
        None
    }
    /// Current zoom level.
    fn current_zoom(&self) -> f64;
    /// Changes the view so that the rect is visible.
    fn fit_bounds(&mut self, bounds: Rect);
    /// Centers the view at the point with the given zoom.
    fn set_view(&mut self, center: GeoPoint, zoom: f64);
}
