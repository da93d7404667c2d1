//! Message dispatcher.
//!
//! `ModelProcessor` applies protocol messages to per-surface state and keeps
//! every surface's render tree in sync with its components and data:
//!
//! ```text
//! beginRendering   ──► set root, styles      ──► rebuild
//! surfaceUpdate    ──► upsert components     ──► rebuild (if a root is set)
//! dataModelUpdate  ──► set path / replace    ──► rebuild
//! deleteSurface    ──► drop the surface
//! ```
//!
//! Processing is synchronous and single-threaded; every mutating call takes
//! `&mut self`.

use crate::config::{ConfigLoader, ProcessorConfig, StyleScope};
use crate::error::{BuildError, ProcessError};
use crate::path::CURRENT_ELEMENT;
use crate::surface::{Surface, SurfaceRegistry};
use serde_json::Value;
use std::collections::BTreeMap;
use surface_protocol::{ComponentDescriptor, ComponentId, Message, RenderNode, DEFAULT_SURFACE_ID};
use tracing::{debug, info};

/// Reactive model processor for declarative UI surfaces.
#[derive(Debug, Clone, Default)]
pub struct ModelProcessor {
    surfaces: SurfaceRegistry,
    styles: BTreeMap<String, String>,
    config: ProcessorConfig,
}

impl ModelProcessor {
    /// Processor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Processor configured from `SURFACE_MODEL_CONFIG` or `config/processor.yaml`.
    ///
    /// # Errors
    /// Fails if a configuration file is named but cannot be read or parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ConfigLoader::from_env().load()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Apply `messages` strictly in order.
    ///
    /// # Errors
    /// Stops at the first message whose rebuild fails. Effects of earlier
    /// messages (and the state change of the failing one) remain applied;
    /// the failing surface has no tree.
    pub fn process_messages(
        &mut self,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<(), ProcessError> {
        for message in messages {
            debug!("Processing {} for surface '{}'", message.kind(), message.surface_id());
            self.process_message(message)?;
        }
        Ok(())
    }

    /// Decode a JSON array of message envelopes (or a single one) and apply it.
    ///
    /// # Errors
    /// Nothing is applied when decoding fails; otherwise as
    /// [`process_messages`](Self::process_messages).
    pub fn process_json(&mut self, json: &str) -> Result<(), ProcessError> {
        let messages = Message::decode_batch(json)?;
        self.process_messages(messages)
    }

    fn process_message(&mut self, message: Message) -> Result<(), ProcessError> {
        match message {
            Message::BeginRendering {
                surface_id,
                root,
                styles,
            } => self.begin_rendering(&surface_id, root, styles.unwrap_or_default())?,
            Message::SurfaceUpdate {
                surface_id,
                components,
            } => self.surface_update(&surface_id, components)?,
            Message::DataModelUpdate {
                surface_id,
                path,
                contents,
            } => self.data_model_update(&surface_id, path.as_deref(), contents)?,
            Message::DeleteSurface { surface_id } => self.delete_surface(&surface_id),
        }
        Ok(())
    }

    fn begin_rendering(
        &mut self,
        surface_id: &str,
        root: ComponentId,
        styles: BTreeMap<String, String>,
    ) -> Result<(), BuildError> {
        if self.config.style_scope == StyleScope::Global {
            self.styles
                .extend(styles.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        let policy = self.config.dangling_references;
        let surface = self.surfaces.get_or_create(surface_id);
        surface.root_component_id = Some(root);
        surface.styles = styles;
        surface.rebuild(policy)
    }

    fn surface_update(
        &mut self,
        surface_id: &str,
        components: Vec<ComponentDescriptor>,
    ) -> Result<(), BuildError> {
        let policy = self.config.dangling_references;
        let surface = self.surfaces.get_or_create(surface_id);
        surface.components.extend(components);

        if surface.root_component_id.is_none() {
            return Ok(());
        }
        surface.rebuild(policy)
    }

    fn data_model_update(
        &mut self,
        surface_id: &str,
        path: Option<&str>,
        contents: Value,
    ) -> Result<(), BuildError> {
        let policy = self.config.dangling_references;
        let surface = self.surfaces.get_or_create(surface_id);
        match path {
            Some(path) => surface.data_model.set(path, contents),
            None => surface.data_model.replace_root(contents),
        }
        surface.rebuild(policy)
    }

    fn delete_surface(&mut self, surface_id: &str) {
        if self.surfaces.remove(surface_id).is_some() {
            info!("Deleted surface '{}'", surface_id);
        } else {
            debug!("deleteSurface for unknown surface '{}' ignored", surface_id);
        }
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn surface(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    /// Drop every surface. Process-wide styles are kept.
    pub fn clear_surfaces(&mut self) {
        info!("Clearing {} surfaces", self.surfaces.len());
        self.surfaces.clear();
    }

    /// Styles merged from every `beginRendering` (scope `global` only).
    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    /// Read the data model of `surface_id` (default `@default`) at `path`.
    pub fn data_by_path(&self, path: &str, surface_id: Option<&str>) -> Option<&Value> {
        self.surface(surface_id.unwrap_or(DEFAULT_SURFACE_ID))?
            .data_model
            .get(path)
    }

    /// Write `value` at `path` and rebuild the surface, creating it if needed.
    ///
    /// # Errors
    /// Returns the rebuild error; the value is written regardless.
    pub fn set_data_by_path(
        &mut self,
        path: &str,
        value: Value,
        surface_id: Option<&str>,
    ) -> Result<(), BuildError> {
        let policy = self.config.dangling_references;
        let surface = self
            .surfaces
            .get_or_create(surface_id.unwrap_or(DEFAULT_SURFACE_ID));
        surface.data_model.set(path, value);
        surface.rebuild(policy)
    }

    /// Combine a binding path with a data context path.
    pub fn resolve_path(&self, path: &str, base: &str) -> String {
        crate::path::resolve_path(path, base)
    }

    /// Read data relative to a render node's data context.
    ///
    /// `"."` and `""` address the node's own context. Absolute paths ignore
    /// the context, and that includes template bindings written as
    /// `/item/name`, which the tree stores as `/name`. Use `./name` (stored
    /// as `name`) to read a field of the current element.
    pub fn data_for_node(
        &self,
        node: &RenderNode,
        path: &str,
        surface_id: Option<&str>,
    ) -> Option<&Value> {
        self.data_by_path(&node_data_path(node, path), surface_id)
    }

    /// Write data relative to a render node's data context and rebuild.
    ///
    /// # Errors
    /// As [`set_data_by_path`](Self::set_data_by_path).
    pub fn set_data_for_node(
        &mut self,
        node: &RenderNode,
        path: &str,
        value: Value,
        surface_id: Option<&str>,
    ) -> Result<(), BuildError> {
        let path = node_data_path(node, path);
        self.set_data_by_path(&path, value, surface_id)
    }
}

fn node_data_path(node: &RenderNode, path: &str) -> String {
    if path.is_empty() || path == CURRENT_ELEMENT {
        return node.data_context_path.clone();
    }
    crate::path::resolve_path(path, &node.data_context_path)
}
