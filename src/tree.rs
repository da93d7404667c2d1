//! Render tree builder.
//!
//! Turns (root id, component registry, data model) into a `RenderNode` tree:
//!
//! ```text
//! root ── children: explicitList ──► [a, b]
//!   │
//!   └── children: template(/days) ──► day:0  (dataContextPath /days/0)
//!                                      └── template(activities) ──► act:0:0 (/days/0/activities/0)
//!                                                                    act:0:1 (/days/0/activities/1)
//!                                     day:1  (/days/1)
//!                                      └── ...                      act:1:0 (/days/1/activities/0)
//! ```
//!
//! Every template boundary appends `:index` to generated ids and moves the
//! data context to the element path. Bindings are stored unresolved; inside a
//! data context they are trimmed with [`trim_in_data_context`].
//!
//! Cycle detection walks an immutable chain of ancestor frames owned by the
//! recursion itself, so sibling subtrees never see each other's ids.

use crate::config::DanglingReferencePolicy;
use crate::data_store::DataStore;
use crate::error::BuildError;
use crate::path::{resolve_path, trim_in_data_context};
use crate::registry::ComponentRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use surface_protocol::{ComponentDescriptor, PropertyValue, RenderNode, ResolvedValue, Template};
use tracing::debug;

/// One component on the active build path.
struct Ancestry<'a> {
    id: &'a str,
    parent: Option<&'a Ancestry<'a>>,
}

impl Ancestry<'_> {
    fn contains(&self, id: &str) -> bool {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.id == id {
                return true;
            }
            frame = current.parent;
        }
        false
    }
}

/// Position of the build inside the tree.
#[derive(Clone, Copy)]
struct Scope<'a> {
    data_context_path: &'a str,
    id_suffix: &'a str,
    ancestry: Option<&'a Ancestry<'a>>,
}

impl Scope<'_> {
    fn in_data_context(&self) -> bool {
        !self.data_context_path.is_empty()
    }

    fn is_on_path(&self, id: &str) -> bool {
        self.ancestry.is_some_and(|frame| frame.contains(id))
    }
}

/// Builds render trees from one surface's components and data.
pub struct TreeBuilder<'a> {
    components: &'a ComponentRegistry,
    data: &'a DataStore,
    dangling_references: DanglingReferencePolicy,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(components: &'a ComponentRegistry, data: &'a DataStore) -> Self {
        Self {
            components,
            data,
            dangling_references: DanglingReferencePolicy::default(),
        }
    }

    pub fn with_dangling_references(mut self, policy: DanglingReferencePolicy) -> Self {
        self.dangling_references = policy;
        self
    }

    /// Build the tree rooted at `root_id`.
    ///
    /// Returns `Ok(None)` when the root component is not registered yet.
    ///
    /// # Errors
    /// Fails on a component reference cycle, or on a reference to an unknown
    /// component when the policy is [`DanglingReferencePolicy::Fail`]. No
    /// partial tree is returned in either case.
    pub fn build(&self, root_id: &str) -> Result<Option<RenderNode>, BuildError> {
        let Some(descriptor) = self.components.get(root_id) else {
            debug!("Root component '{}' is not registered yet", root_id);
            return Ok(None);
        };

        let scope = Scope {
            data_context_path: "",
            id_suffix: "",
            ancestry: None,
        };
        self.build_node(descriptor, scope).map(Some)
    }

    fn build_node(
        &self,
        descriptor: &ComponentDescriptor,
        scope: Scope<'_>,
    ) -> Result<RenderNode, BuildError> {
        let frame = Ancestry {
            id: &descriptor.id,
            parent: scope.ancestry,
        };
        let inner = Scope {
            ancestry: Some(&frame),
            ..scope
        };

        let mut properties = BTreeMap::new();
        for (key, value) in &descriptor.properties {
            let resolved = self.resolve_property(value, &descriptor.id, inner)?;
            properties.insert(key.clone(), resolved);
        }

        Ok(RenderNode {
            id: format!("{}{}", descriptor.id, scope.id_suffix),
            component_type: descriptor.component_type.clone(),
            data_context_path: scope.data_context_path.to_string(),
            weight: descriptor.weight,
            properties,
        })
    }

    /// Build the component `id` referenced from `owner`.
    fn build_reference(
        &self,
        id: &str,
        owner: &str,
        scope: Scope<'_>,
    ) -> Result<Option<RenderNode>, BuildError> {
        if scope.is_on_path(id) {
            return Err(BuildError::CircularDependency {
                component_id: id.to_string(),
            });
        }

        match (self.components.get(id), self.dangling_references) {
            (Some(descriptor), _) => self.build_node(descriptor, scope).map(Some),
            (None, DanglingReferencePolicy::Omit) => {
                debug!("Omitting unknown component '{}' referenced by '{}'", id, owner);
                Ok(None)
            }
            (None, DanglingReferencePolicy::Fail) => Err(BuildError::DanglingReference {
                component_id: id.to_string(),
                referenced_by: owner.to_string(),
            }),
        }
    }

    fn resolve_property(
        &self,
        value: &PropertyValue,
        owner: &str,
        scope: Scope<'_>,
    ) -> Result<ResolvedValue, BuildError> {
        Ok(match value {
            PropertyValue::Literal(value) => ResolvedValue::Literal(value.clone()),
            PropertyValue::Binding(binding) if scope.in_data_context() => {
                ResolvedValue::Binding(binding.with_path(trim_in_data_context(&binding.path)))
            }
            PropertyValue::Binding(binding) => ResolvedValue::Binding(binding.clone()),
            PropertyValue::Child(id) => match self.build_reference(id, owner, scope)? {
                Some(node) => ResolvedValue::Node(Box::new(node)),
                None => ResolvedValue::Literal(Value::Null),
            },
            PropertyValue::ExplicitList(ids) => {
                let mut nodes = Vec::with_capacity(ids.len());
                for id in ids {
                    nodes.extend(self.build_reference(id, owner, scope)?);
                }
                ResolvedValue::Nodes(nodes)
            }
            PropertyValue::Template(template) => {
                ResolvedValue::Nodes(self.expand_template(template, owner, scope)?)
            }
            PropertyValue::List(items) => ResolvedValue::List(
                items
                    .iter()
                    .map(|item| self.resolve_property(item, owner, scope))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyValue::Map(entries) => {
                let mut resolved = BTreeMap::new();
                for (key, item) in entries {
                    resolved.insert(key.clone(), self.resolve_property(item, owner, scope)?);
                }
                ResolvedValue::Map(resolved)
            }
        })
    }

    /// One node per element of the bound array; nothing if it is not an array.
    fn expand_template(
        &self,
        template: &Template,
        owner: &str,
        scope: Scope<'_>,
    ) -> Result<Vec<RenderNode>, BuildError> {
        let array_path = resolve_path(&template.data_binding, scope.data_context_path);
        let Some(Value::Array(items)) = self.data.get(&array_path) else {
            debug!(
                "Template '{}' in '{}': no array at {}, expanding to nothing",
                template.component_id, owner, array_path
            );
            return Ok(Vec::new());
        };

        let mut nodes = Vec::with_capacity(items.len());
        for index in 0..items.len() {
            let data_context_path = format!("{array_path}/{index}");
            let id_suffix = format!("{}:{index}", scope.id_suffix);
            let element_scope = Scope {
                data_context_path: &data_context_path,
                id_suffix: &id_suffix,
                ancestry: scope.ancestry,
            };
            nodes.extend(self.build_reference(&template.component_id, owner, element_scope)?);
        }
        Ok(nodes)
    }
}
