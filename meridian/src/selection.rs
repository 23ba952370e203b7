//! State of the attribute view: the active layer, the filter and the selected feature.

use crate::feature::Fid;
use crate::layer::{Layer, LayerId};
use crate::query::{AttributeTable, Filter};

/// Reference to a feature of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    /// Layer id.
    pub layer: LayerId,
    /// Feature id within the layer.
    pub fid: Fid,
}

/// Attribute view state.
///
/// There is at most one active layer and at most one selected feature, which always belongs to the active layer.
/// Closing the view or switching the layer clears the selection.
#[derive(Debug, Clone, Default)]
pub struct AttributeView {
    active: Option<LayerId>,
    filter_text: String,
    filter: Filter,
    selected: Option<FeatureKey>,
}

impl AttributeView {
    /// Creates a closed view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the view for the layer. Opening a different layer than the active one clears the selection.
    pub fn open(&mut self, layer: LayerId) {
        if self.active.as_ref() != Some(&layer) {
            self.selected = None;
        }
        self.active = Some(layer);
    }

    /// Closes the view and clears the selection.
    pub fn close(&mut self) {
        self.active = None;
        self.selected = None;
    }

    /// Returns true if the view is open.
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Active layer.
    pub fn active_layer(&self) -> Option<&LayerId> {
        self.active.as_ref()
    }

    /// Sets the filter expression. See [`Filter`].
    pub fn set_filter(&mut self, expression: &str) {
        self.filter_text = expression.to_string();
        self.filter = Filter::parse(expression);
    }

    /// Filter expression as entered.
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Parsed filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Selects a feature. Features of layers other than the active one are ignored. Returns true if the feature was
    /// selected.
    pub fn select(&mut self, layer: &LayerId, fid: Fid) -> bool {
        if self.active.as_ref() != Some(layer) {
            return false;
        }

        self.selected = Some(FeatureKey {
            layer: layer.clone(),
            fid,
        });
        true
    }

    /// Clears the selected feature.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Selected feature.
    pub fn selected(&self) -> Option<&FeatureKey> {
        self.selected.as_ref()
    }

    /// Forgets about the layer if it is active. Used when the layer is removed.
    pub fn forget(&mut self, layer: &LayerId) {
        if self.active.as_ref() == Some(layer) {
            self.close();
        }
    }

    /// Attribute table of the layer with the current filter applied.
    pub fn table(&self, layer: &Layer) -> AttributeTable {
        AttributeTable::new(layer.features(), &self.filter)
    }

    /// Header line of the view: `<name> • <rows>/<total> records`.
    pub fn summary(&self, layer: &Layer) -> String {
        let table = self.table(layer);
        format!(
            "{} • {}/{} records",
            layer.name(),
            table.len(),
            table.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LayerId {
        LayerId::new(s)
    }

    #[test]
    fn selection_belongs_to_active_layer() {
        let mut view = AttributeView::new();
        assert!(!view.select(&id("a"), 1));

        view.open(id("a"));
        assert!(view.select(&id("a"), 1));
        assert!(!view.select(&id("b"), 2));
        assert_eq!(view.selected(), Some(&FeatureKey { layer: id("a"), fid: 1 }));

        view.open(id("a"));
        assert!(view.selected().is_some());

        view.open(id("b"));
        assert_eq!(view.selected(), None);
        assert_eq!(view.active_layer(), Some(&id("b")));
    }

    #[test]
    fn close_clears_everything() {
        let mut view = AttributeView::new();
        view.open(id("a"));
        view.select(&id("a"), 0);
        view.close();
        assert!(!view.is_open());
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn forget_only_active_layer() {
        let mut view = AttributeView::new();
        view.open(id("a"));
        view.forget(&id("b"));
        assert!(view.is_open());
        view.forget(&id("a"));
        assert!(!view.is_open());
    }

    #[test]
    fn filter_text_is_kept() {
        let mut view = AttributeView::new();
        view.set_filter(" Name=Main ");
        assert_eq!(view.filter_text(), " Name=Main ");
        assert_eq!(
            view.filter(),
            &Filter::Column {
                column: "Name".into(),
                value: "main".into()
            }
        );
    }
}
