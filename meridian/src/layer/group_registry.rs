use crate::error::WorkbenchError;
use crate::layer::LayerId;
use std::collections::HashMap;

/// Named, ordered buckets of layers.
///
/// Every layer belongs to at most one group. The registry keeps an index from layer to its owning group, so moving
/// a layer only touches the group it is actually in.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    order: Vec<String>,
    members: HashMap<String, Vec<LayerId>>,
    owner: HashMap<LayerId, String>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the group if it does not exist yet. New groups are appended to the display order.
    pub fn ensure(&mut self, name: &str) {
        if !self.members.contains_key(name) {
            log::debug!("Created group {name}");
            self.order.push(name.to_string());
            self.members.insert(name.to_string(), vec![]);
        }
    }

    /// Puts the layer at the end of the `group`, removing it from the group it was in before.
    pub fn move_layer(&mut self, layer: &LayerId, group: &str) {
        self.detach(layer);
        self.ensure(group);

        if let Some(members) = self.members.get_mut(group) {
            members.push(layer.clone());
        }
        self.owner.insert(layer.clone(), group.to_string());
    }

    /// Removes the layer from its group. The group itself stays, even if it becomes empty.
    pub fn remove_layer(&mut self, layer: &LayerId) {
        self.detach(layer);
    }

    /// Deletes an empty group.
    ///
    /// Fails with [`WorkbenchError::GroupNotEmpty`] if the group still has layers, and with
    /// [`WorkbenchError::GroupNotFound`] if there is no such group. The registry is not changed on failure.
    pub fn delete_group(&mut self, name: &str) -> Result<(), WorkbenchError> {
        let members = self
            .members
            .get(name)
            .ok_or_else(|| WorkbenchError::GroupNotFound(name.to_string()))?;

        if !members.is_empty() {
            return Err(WorkbenchError::GroupNotEmpty {
                name: name.to_string(),
                layers: members.len(),
            });
        }

        self.members.remove(name);
        self.order.retain(|n| n != name);
        log::debug!("Deleted group {name}");

        Ok(())
    }

    /// Layers of the group in display order. Empty if the group does not exist.
    pub fn members(&self, name: &str) -> &[LayerId] {
        self.members.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name of the group the layer belongs to.
    pub fn group_of(&self, layer: &LayerId) -> Option<&str> {
        self.owner.get(layer).map(String::as_str)
    }

    /// Returns true if there is a group with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Iterates over groups and their layers in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LayerId])> + '_ {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.members(name)))
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Removes all groups.
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
        self.owner.clear();
    }

    fn detach(&mut self, layer: &LayerId) {
        if let Some(previous) = self.owner.remove(layer) {
            if let Some(members) = self.members.get_mut(&previous) {
                members.retain(|id| id != layer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn id(s: &str) -> LayerId {
        LayerId::new(s)
    }

    fn total_members(registry: &GroupRegistry) -> usize {
        registry.iter().map(|(_, layers)| layers.len()).sum()
    }

    #[test]
    fn ensure_is_idempotent() {
        let mut registry = GroupRegistry::new();
        registry.ensure("Roads");
        registry.ensure("Water");
        registry.ensure("Roads");

        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Roads", "Water"]);
    }

    #[test]
    fn move_keeps_single_membership() {
        let mut registry = GroupRegistry::new();
        registry.move_layer(&id("a"), "One");
        registry.move_layer(&id("b"), "One");
        registry.move_layer(&id("c"), "Two");
        assert_eq!(total_members(&registry), 3);

        registry.move_layer(&id("a"), "Two");
        assert_eq!(registry.members("One"), [id("b")]);
        assert_eq!(registry.members("Two"), [id("c"), id("a")]);
        assert_eq!(registry.group_of(&id("a")), Some("Two"));
        assert_eq!(total_members(&registry), 3);

        registry.move_layer(&id("a"), "Three");
        assert_eq!(registry.members("Two"), [id("c")]);
        assert_eq!(registry.members("Three"), [id("a")]);
        assert_eq!(total_members(&registry), 3);
    }

    #[test]
    fn move_to_same_group_appends() {
        let mut registry = GroupRegistry::new();
        registry.move_layer(&id("a"), "One");
        registry.move_layer(&id("b"), "One");
        registry.move_layer(&id("a"), "One");
        assert_eq!(registry.members("One"), [id("b"), id("a")]);
    }

    #[test]
    fn delete_non_empty_group_fails() {
        let mut registry = GroupRegistry::new();
        registry.move_layer(&id("a"), "One");

        assert_matches!(
            registry.delete_group("One"),
            Err(WorkbenchError::GroupNotEmpty { layers: 1, .. })
        );
        assert!(registry.contains("One"));
        assert_eq!(registry.members("One"), [id("a")]);
    }

    #[test]
    fn delete_empty_group() {
        let mut registry = GroupRegistry::new();
        registry.move_layer(&id("a"), "One");
        registry.move_layer(&id("a"), "Two");

        assert_matches!(registry.delete_group("One"), Ok(()));
        assert!(!registry.contains("One"));
        assert_eq!(registry.len(), 1);
        assert_matches!(
            registry.delete_group("One"),
            Err(WorkbenchError::GroupNotFound(_))
        );
    }

    #[test]
    fn remove_layer_keeps_group() {
        let mut registry = GroupRegistry::new();
        registry.move_layer(&id("a"), "One");
        registry.remove_layer(&id("a"));
        registry.remove_layer(&id("missing"));

        assert!(registry.contains("One"));
        assert!(registry.members("One").is_empty());
        assert_eq!(registry.group_of(&id("a")), None);
    }
}
