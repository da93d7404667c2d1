//! Surface Protocol - wire and render-tree types for declarative UI surfaces.
//!
//! This crate defines the data exchanged with the model processor:
//! - `Message` - one inbound protocol message (begin rendering, surface update,
//!   data model update, delete surface)
//! - `ComponentDescriptor` - a flat, id-addressed component with a type tag
//!   and a classified property bag
//! - `PropertyValue` - literal / binding / explicit list / child / template
//! - `RenderNode` - the materialized, binding-preserving render tree
//!
//! # Architecture
//!
//! ```text
//! JSON envelope ──► Message ──► (surface-model processor) ──► RenderNode
//!                    │
//!                    └── SurfaceUpdate.components: [ComponentDescriptor]
//!                            └── properties: { name -> PropertyValue }
//! ```
//!
//! Property shapes are classified once, at decode time, so consumers match
//! on `PropertyValue` instead of probing JSON objects.
//!
//! # Example
//!
//! ```
//! use surface_protocol::{Message, PropertyValue};
//!
//! let json = r#"{
//!     "surfaceUpdate": {
//!         "components": [
//!             { "id": "title", "component": { "Text": { "text": { "path": "/title" } } } }
//!         ]
//!     }
//! }"#;
//!
//! let message: Message = serde_json::from_str(json).unwrap();
//! let Message::SurfaceUpdate { surface_id, components } = message else {
//!     panic!("expected a surface update");
//! };
//! assert_eq!(surface_id, "@default");
//! assert_eq!(components[0].component_type, "Text");
//! assert!(matches!(components[0].properties["text"], PropertyValue::Binding(_)));
//! ```

mod component;
mod error;
mod message;
mod render;

// Re-exports
pub use component::{Binding, ComponentDescriptor, ComponentId, PropertyValue, Template};
pub use error::ProtocolError;
pub use message::{Message, SurfaceId, DEFAULT_SURFACE_ID};
pub use render::{RenderNode, ResolvedValue};
