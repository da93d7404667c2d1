//! Flat, id-addressed component registry of one surface.

use std::collections::BTreeMap;
use surface_protocol::{ComponentDescriptor, ComponentId};

/// Components registered on a surface, keyed by id.
///
/// Ordered by id so iteration (and anything derived from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRegistry {
    components: BTreeMap<ComponentId, ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a descriptor. Returns the one it replaced.
    pub fn upsert(&mut self, descriptor: ComponentDescriptor) -> Option<ComponentDescriptor> {
        self.components.insert(descriptor.id.clone(), descriptor)
    }

    /// Upsert every descriptor in order; later duplicates win.
    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = ComponentDescriptor>) {
        for descriptor in descriptors {
            self.upsert(descriptor);
        }
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.components.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.values()
    }
}
