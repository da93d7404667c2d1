//! Shared fixtures for the processor integration tests.
//!
//! Run with logs: RUST_LOG=surface_model=debug cargo test -- --nocapture

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Once;
use surface_model::{ComponentDescriptor, ModelProcessor, RenderNode, DEFAULT_SURFACE_ID};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "surface_model=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub fn text(id: &str, path: &str) -> ComponentDescriptor {
    ComponentDescriptor::new(id, "Text").with_property("text", json!({ "path": path }))
}

pub fn literal_text(id: &str, value: &str) -> ComponentDescriptor {
    ComponentDescriptor::new(id, "Text").with_property("text", json!({ "literalString": value }))
}

pub fn column(id: &str, children: &[&str]) -> ComponentDescriptor {
    ComponentDescriptor::new(id, "Column")
        .with_property("children", json!({ "explicitList": children }))
}

pub fn card(id: &str, child: &str) -> ComponentDescriptor {
    ComponentDescriptor::new(id, "Card").with_property("child", json!(child))
}

pub fn list(id: &str, component_id: &str, data_binding: &str) -> ComponentDescriptor {
    ComponentDescriptor::new(id, "List").with_property(
        "children",
        json!({ "template": { "componentId": component_id, "dataBinding": data_binding } }),
    )
}

/// Render tree of a surface, panicking with context when there is none.
pub fn tree<'a>(processor: &'a ModelProcessor, surface_id: Option<&str>) -> &'a RenderNode {
    let id = surface_id.unwrap_or(DEFAULT_SURFACE_ID);
    processor
        .surface(id)
        .unwrap_or_else(|| panic!("surface '{id}' does not exist"))
        .component_tree()
        .unwrap_or_else(|| panic!("surface '{id}' has no render tree"))
}

/// `(id, dataContextPath)` of every node in the tree, depth first.
pub fn ids_and_contexts(tree: &RenderNode) -> Vec<(String, String)> {
    let mut out = Vec::new();
    tree.walk(&mut |node| out.push((node.id.clone(), node.data_context_path.clone())));
    out
}

pub fn itinerary() -> Value {
    json!({
        "days": [
            {
                "title": "Day 1",
                "activities": [{ "name": "Museum" }, { "name": "Dinner" }]
            },
            {
                "title": "Day 2",
                "activities": [{ "name": "Hike" }]
            }
        ]
    })
}
