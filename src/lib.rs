//! Surface Model - reactive model processor for declarative UI surfaces.
//!
//! A host feeds protocol messages into a [`ModelProcessor`]; the processor
//! keeps, per surface:
//! - `ComponentRegistry` - flat, id-addressed component descriptors
//! - `DataStore` - the JSON-like data model, addressed by paths
//! - a render tree (`RenderNode`) rebuilt after every mutation
//!
//! # Architecture
//!
//! ```text
//! Message ──► ModelProcessor
//!               └── SurfaceRegistry: { surfaceId -> Surface }
//!                     ├── root_component_id, styles
//!                     ├── components: ComponentRegistry
//!                     ├── data_model: DataStore
//!                     └── component_tree ◄── TreeBuilder(root, components, data)
//! ```
//!
//! Bindings stay unresolved in the tree; a renderer reads values with
//! [`ModelProcessor::data_for_node`] using each node's `data_context_path`.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use surface_model::{ComponentDescriptor, Message, ModelProcessor};
//!
//! let mut processor = ModelProcessor::new();
//! processor
//!     .process_messages([
//!         Message::surface_update(vec![
//!             ComponentDescriptor::new("list", "List").with_property(
//!                 "children",
//!                 json!({ "template": { "componentId": "row", "dataBinding": "/items" } }),
//!             ),
//!             ComponentDescriptor::new("row", "Text")
//!                 .with_property("text", json!({ "path": "./name" })),
//!         ]),
//!         Message::data_model_update(Some("/items"), json!([{ "name": "A" }, { "name": "B" }])),
//!         Message::begin_rendering("list"),
//!     ])
//!     .unwrap();
//!
//! let tree = processor.surface("@default").unwrap().component_tree().unwrap();
//! let rows = tree.children("children");
//! assert_eq!(rows[1].id, "row:1");
//! assert_eq!(processor.data_for_node(&rows[1], "name", None), Some(&json!("B")));
//! ```

pub mod config;
pub mod data_store;
mod error;
pub mod path;
pub mod processor;
pub mod registry;
pub mod surface;
pub mod tree;

// Re-exports
pub use config::{ConfigLoader, DanglingReferencePolicy, ProcessorConfig, StyleScope};
pub use data_store::DataStore;
pub use error::{BuildError, ProcessError};
pub use path::resolve_path;
pub use processor::ModelProcessor;
pub use registry::ComponentRegistry;
pub use surface::{Surface, SurfaceRegistry};
pub use tree::TreeBuilder;

pub use surface_protocol::{
    Binding, ComponentDescriptor, ComponentId, Message, PropertyValue, ProtocolError, RenderNode,
    ResolvedValue, SurfaceId, Template, DEFAULT_SURFACE_ID,
};
