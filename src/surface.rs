//! Surfaces and the surface registry.

use crate::config::DanglingReferencePolicy;
use crate::data_store::DataStore;
use crate::error::BuildError;
use crate::registry::ComponentRegistry;
use crate::tree::TreeBuilder;
use std::collections::BTreeMap;
use surface_protocol::{ComponentId, RenderNode, SurfaceId};
use tracing::{debug, info, warn};

/// One independently rendered UI region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub(crate) id: SurfaceId,
    pub(crate) root_component_id: Option<ComponentId>,
    pub(crate) styles: BTreeMap<String, String>,
    pub(crate) components: ComponentRegistry,
    pub(crate) data_model: DataStore,
    pub(crate) component_tree: Option<RenderNode>,
}

impl Surface {
    pub fn new(id: impl Into<SurfaceId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root component id set by the last `beginRendering`.
    pub fn root_component_id(&self) -> Option<&str> {
        self.root_component_id.as_deref()
    }

    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn data_model(&self) -> &DataStore {
        &self.data_model
    }

    /// Render tree from the last successful rebuild.
    ///
    /// `None` before a root is known, while the root component is missing,
    /// and after a failed rebuild.
    pub fn component_tree(&self) -> Option<&RenderNode> {
        self.component_tree.as_ref()
    }

    /// Recompute the render tree from the current root, components and data.
    ///
    /// On error the tree is cleared and the error returned; the surface stays
    /// usable and the next successful rebuild restores a tree.
    pub fn rebuild(&mut self, dangling_references: DanglingReferencePolicy) -> Result<(), BuildError> {
        let Some(root_id) = self.root_component_id.as_deref() else {
            self.component_tree = None;
            return Ok(());
        };

        let built = TreeBuilder::new(&self.components, &self.data_model)
            .with_dangling_references(dangling_references)
            .build(root_id);

        match built {
            Ok(tree) => {
                debug!(
                    "Rebuilt surface '{}': {} nodes",
                    self.id,
                    tree.as_ref().map_or(0, RenderNode::node_count)
                );
                self.component_tree = tree;
                Ok(())
            }
            Err(err) => {
                warn!("Rebuild of surface '{}' failed: {}", self.id, err);
                self.component_tree = None;
                Err(err)
            }
        }
    }
}

/// All live surfaces, keyed by surface id.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: BTreeMap<SurfaceId, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    /// Fetch a surface, creating an empty one on first use.
    pub fn get_or_create(&mut self, id: &str) -> &mut Surface {
        self.surfaces.entry(id.to_string()).or_insert_with(|| {
            info!("Creating surface '{}'", id);
            Surface::new(id)
        })
    }

    pub fn remove(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.surfaces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Surface)> {
        self.surfaces.iter().map(|(id, surface)| (id.as_str(), surface))
    }
}
