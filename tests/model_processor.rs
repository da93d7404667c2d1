//! End-to-end message processing tests.
//!
//! Run: cargo test --test model_processor

mod helpers;

use helpers::{card, column, ids_and_contexts, init_tracing, list, literal_text, text, tree};
use pretty_assertions::assert_eq;
use serde_json::json;
use surface_model::{
    BuildError, ComponentDescriptor, Message, ModelProcessor, ProcessError, ResolvedValue,
    DEFAULT_SURFACE_ID,
};

fn processor() -> ModelProcessor {
    init_tracing();
    ModelProcessor::new()
}

// =============================================================================
// Initialization and surface lifecycle
// =============================================================================

#[test]
fn test_starts_with_no_surfaces() {
    let processor = processor();
    assert!(processor.surfaces().is_empty());
    assert!(processor.styles().is_empty());
}

#[test]
fn test_clear_surfaces() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::begin_rendering("root"),
            Message::begin_rendering("root").on_surface("other"),
        ])
        .unwrap();
    assert_eq!(processor.surfaces().len(), 2);

    processor.clear_surfaces();
    assert!(processor.surfaces().is_empty());
}

#[test]
fn test_begin_rendering_creates_default_surface() {
    let mut processor = processor();
    processor
        .process_json(r#"[{ "beginRendering": { "root": "root", "styles": { "primaryColor": "blue" } } }]"#)
        .unwrap();

    let surface = processor.surface(DEFAULT_SURFACE_ID).unwrap();
    assert_eq!(surface.root_component_id(), Some("root"));
    assert_eq!(surface.styles()["primaryColor"], "blue");
    assert_eq!(processor.styles()["primaryColor"], "blue");
}

#[test]
fn test_surface_update_adds_components() {
    let mut processor = processor();
    processor
        .process_json(
            r#"[{
                "surfaceUpdate": {
                    "surfaceId": "@default",
                    "components": [
                        { "id": "comp1", "component": { "Text": { "text": { "literalString": "Hi" } } } }
                    ]
                }
            }]"#,
        )
        .unwrap();

    let surface = processor.surface(DEFAULT_SURFACE_ID).unwrap();
    let component = surface.components().get("comp1").unwrap();
    assert_eq!(component.component_type, "Text");
}

#[test]
fn test_delete_surface() {
    let mut processor = processor();
    processor
        .process_messages([Message::begin_rendering("root").on_surface("to-delete")])
        .unwrap();
    assert!(processor.surfaces().contains("to-delete"));

    processor
        .process_json(r#"{ "deleteSurface": { "surfaceId": "to-delete" } }"#)
        .unwrap();
    assert!(!processor.surfaces().contains("to-delete"));

    // Unknown surfaces are ignored.
    processor
        .process_messages([Message::delete_surface("never-existed")])
        .unwrap();
}

// =============================================================================
// Data model
// =============================================================================

#[test]
fn test_update_at_path_is_stored_verbatim() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(Some("/user"), json!({ "name": "Alice" })),
            Message::data_model_update(Some("/items"), json!([{ "id": 1 }, { "id": 2 }])),
        ])
        .unwrap();

    assert_eq!(processor.data_by_path("/user/name", None), Some(&json!("Alice")));
    assert_eq!(
        processor.data_by_path("/items", None),
        Some(&json!([{ "id": 1 }, { "id": 2 }]))
    );
}

#[test]
fn test_path_less_update_replaces_model() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(Some("/old"), json!(1)),
            Message::data_model_update(None, json!({ "user": { "name": "Bob" } })),
        ])
        .unwrap();

    assert_eq!(processor.data_by_path("/old", None), None);
    assert_eq!(processor.data_by_path("/user", None), Some(&json!({ "name": "Bob" })));
}

#[test]
fn test_root_key_value_normalization() {
    let mut processor = processor();
    processor
        .process_json(
            r#"[{
                "dataModelUpdate": {
                    "contents": [
                        { "key": "title", "value_string": "My Title" },
                        { "key": "items", "value_string": "[{\"id\":1},{\"id\":2}]" }
                    ]
                }
            }]"#,
        )
        .unwrap();

    assert_eq!(processor.data_by_path("/title", None), Some(&json!("My Title")));
    assert_eq!(
        processor.data_by_path("/items", None),
        Some(&json!([{ "id": 1 }, { "id": 2 }]))
    );
}

#[test]
fn test_invalid_json_falls_back_to_raw_string() {
    let mut processor = processor();
    let malformed = r#"[{"id": 1}, {"id": 2}"#;
    processor
        .process_messages([Message::data_model_update(
            None,
            json!([{ "key": "items", "value_string": malformed }]),
        )])
        .unwrap();

    assert_eq!(processor.data_by_path("/items", None), Some(&json!(malformed)));
}

#[test]
fn test_nested_value_maps_at_root() {
    let mut processor = processor();
    processor
        .process_messages([Message::data_model_update(
            None,
            json!([{
                "key": "users",
                "valueMap": [{
                    "key": "user1",
                    "valueMap": [
                        { "key": "firstName", "valueString": "Alice" },
                        { "key": "age", "valueNumber": 30 },
                        { "key": "admin", "valueBoolean": false }
                    ]
                }]
            }]),
        )])
        .unwrap();

    assert_eq!(
        processor.data_by_path("/users/user1", None),
        Some(&json!({ "firstName": "Alice", "age": 30, "admin": false }))
    );
}

#[test]
fn test_set_data_creates_nested_structures() {
    let mut processor = processor();
    processor.set_data_by_path("/a/b/c", json!("value"), None).unwrap();
    assert_eq!(processor.data_by_path("/a/b/c", None), Some(&json!("value")));
    assert_eq!(processor.data_by_path("a.b.c", None), Some(&json!("value")));
}

#[test]
fn test_resolve_path() {
    let processor = processor();
    assert_eq!(processor.resolve_path("/a/b/c", "/value"), "/a/b/c");
    assert_eq!(processor.resolve_path("a/b/c", "/value/"), "/value/a/b/c");
    assert_eq!(processor.resolve_path("a/b/c", "/value"), "/value/a/b/c");
}

// =============================================================================
// Render tree
// =============================================================================

#[test]
fn test_simple_parent_child_tree() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::surface_update(vec![column("root", &["child"]), literal_text("child", "Hello")]),
            Message::begin_rendering("root"),
        ])
        .unwrap();

    let root = tree(&processor, None);
    assert_eq!(root.id, "root");
    assert_eq!(root.component_type, "Column");
    let children = root.children("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, "child");
    assert_eq!(children[0].component_type, "Text");
}

#[test]
fn test_circular_dependency_is_reported_and_tree_cleared() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::surface_update(vec![card("a", "x"), literal_text("x", "ok")]),
            Message::begin_rendering("a"),
        ])
        .unwrap();
    assert_eq!(tree(&processor, None).node_count(), 2);

    let err = processor
        .process_messages([Message::surface_update(vec![card("a", "b"), card("b", "a")])])
        .unwrap_err();

    assert!(matches!(
        err,
        ProcessError::Build(BuildError::CircularDependency { ref component_id }) if component_id == "a"
    ));
    assert_eq!(err.to_string(), r#"Circular dependency for component "a"."#);
    assert!(processor
        .surface(DEFAULT_SURFACE_ID)
        .unwrap()
        .component_tree()
        .is_none());

    // Breaking the cycle restores the tree.
    processor
        .process_messages([Message::surface_update(vec![card("b", "x")])])
        .unwrap();
    assert_eq!(tree(&processor, None).node_count(), 3);
}

#[test]
fn test_template_expansion() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(Some("/items"), json!([{ "name": "A" }, { "name": "B" }])),
            Message::surface_update(vec![list("root", "item", "/items"), text("item", "/item/name")]),
            Message::begin_rendering("root"),
        ])
        .unwrap();

    let children = tree(&processor, None).children("children");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id, "item:0");
    assert_eq!(children[0].data_context_path, "/items/0");
    assert_eq!(children[1].id, "item:1");
    assert_eq!(children[1].data_context_path, "/items/1");
    assert_eq!(
        children[0]
            .property("text")
            .and_then(ResolvedValue::as_binding)
            .map(|binding| binding.path.as_str()),
        Some("/name")
    );
}

#[test]
fn test_template_self_heals_when_data_arrives() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::surface_update(vec![list("root", "item", "/items"), text("item", "./name")]),
            Message::begin_rendering("root"),
        ])
        .unwrap();
    assert!(tree(&processor, None).children("children").is_empty());

    processor
        .process_messages([Message::data_model_update(
            Some("/items"),
            json!([{ "name": "A" }, { "name": "B" }]),
        )])
        .unwrap();
    let children = tree(&processor, None).children("children");
    assert_eq!(children.len(), 2);
    assert_eq!(children[1].id, "item:1");

    processor
        .set_data_by_path("/items/2", json!({ "name": "C" }), None)
        .unwrap();
    assert_eq!(tree(&processor, None).children("children").len(), 3);
}

#[test]
fn test_trimmed_relative_bindings() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(Some("/items"), json!([{ "name": "A" }])),
            Message::surface_update(vec![
                list("root", "row", "/items"),
                ComponentDescriptor::new("row", "Row")
                    .with_property("whole", json!({ "path": "/item" }))
                    .with_property("name", json!({ "path": "./name" })),
            ]),
            Message::begin_rendering("root"),
        ])
        .unwrap();

    let row = &tree(&processor, None).children("children")[0];
    let path = |key: &str| {
        row.property(key)
            .and_then(ResolvedValue::as_binding)
            .map(|binding| binding.path.clone())
    };
    assert_eq!(path("whole").as_deref(), Some("."));
    assert_eq!(path("name").as_deref(), Some("name"));

    assert_eq!(processor.data_for_node(row, "name", None), Some(&json!("A")));
    assert_eq!(processor.data_for_node(row, ".", None), Some(&json!({ "name": "A" })));
}

#[test]
fn test_primitive_array_elements_bind_with_dot() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(
                None,
                json!([{ "key": "tags", "valueString": r#"["travel","paris","guide"]"# }]),
            ),
            Message::surface_update(vec![
                ComponentDescriptor::new("root", "Row").with_property(
                    "children",
                    json!({ "template": { "componentId": "tag", "dataBinding": "/tags" } }),
                ),
                text("tag", "."),
            ]),
            Message::begin_rendering("root"),
        ])
        .unwrap();

    let tags = tree(&processor, None).children("children");
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0].data_context_path, "/tags/0");
    assert_eq!(
        serde_json::to_value(tags[0].property("text").unwrap()).unwrap(),
        json!({ "path": "." })
    );
    assert_eq!(processor.data_for_node(&tags[1], ".", None), Some(&json!("paris")));
}

#[test]
fn test_nested_templates_with_layered_contexts() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(None, helpers::itinerary()),
            Message::surface_update(vec![
                list("root", "day-card", "/days"),
                column("day-card", &["day-title", "activity-list"]),
                text("day-title", "/item/title"),
                list("activity-list", "activity-text", "activities"),
                text("activity-text", "./name"),
            ]),
            Message::begin_rendering("root"),
        ])
        .unwrap();

    let root = tree(&processor, None);
    let activities: Vec<_> = ids_and_contexts(root)
        .into_iter()
        .filter(|(id, _)| id.starts_with("activity-text"))
        .collect();
    assert_eq!(
        activities,
        vec![
            ("activity-text:0:0".to_string(), "/days/0/activities/0".to_string()),
            ("activity-text:0:1".to_string(), "/days/0/activities/1".to_string()),
            ("activity-text:1:0".to_string(), "/days/1/activities/0".to_string()),
        ]
    );

    let dinner = root.find("activity-text:0:1").unwrap();
    assert_eq!(processor.data_for_node(dinner, "name", None), Some(&json!("Dinner")));
    let title = root.find("day-title:1").unwrap();
    assert_eq!(processor.data_for_node(title, "title", None), Some(&json!("Day 2")));
}

#[test]
fn test_rebuild_is_stable() {
    let mut processor = processor();
    let messages = vec![
        Message::data_model_update(Some("/items"), json!([{ "name": "A" }, { "name": "B" }])),
        Message::surface_update(vec![list("root", "item", "/items"), text("item", "./name")]),
        Message::begin_rendering("root"),
    ];
    processor.process_messages(messages.clone()).unwrap();
    let first = serde_json::to_value(tree(&processor, None)).unwrap();

    processor.process_messages(messages).unwrap();
    let second = serde_json::to_value(tree(&processor, None)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["properties"]["children"][1]["id"], json!("item:1"));
    assert_eq!(first["properties"]["children"][1]["dataContextPath"], json!("/items/1"));
}

// =============================================================================
// Multiple surfaces
// =============================================================================

#[test]
fn test_surfaces_are_isolated() {
    let mut processor = processor();
    processor
        .process_messages([
            Message::data_model_update(Some("/name"), json!("Alice")).on_surface("s1"),
            Message::data_model_update(Some("/name"), json!("Bob")).on_surface("s2"),
            Message::surface_update(vec![text("root", "/name")]).on_surface("s1"),
            Message::surface_update(vec![literal_text("root", "static")]).on_surface("s2"),
            Message::begin_rendering("root").on_surface("s1"),
            Message::begin_rendering("root").on_surface("s2"),
        ])
        .unwrap();

    assert_eq!(processor.data_by_path("/name", Some("s1")), Some(&json!("Alice")));
    assert_eq!(processor.data_by_path("/name", Some("s2")), Some(&json!("Bob")));
    assert_eq!(processor.data_by_path("/name", None), None);

    let s1 = tree(&processor, Some("s1"));
    let s2 = tree(&processor, Some("s2"));
    assert!(s1.property("text").unwrap().as_binding().is_some());
    assert!(s2.property("text").unwrap().as_literal().is_some());

    processor
        .process_messages([Message::delete_surface("s1")])
        .unwrap();
    assert!(processor.surface("s1").is_none());
    assert_eq!(processor.data_by_path("/name", Some("s2")), Some(&json!("Bob")));
}

#[test]
fn test_error_stops_batch_but_keeps_earlier_effects() {
    let mut processor = processor();
    let err = processor
        .process_messages([
            Message::data_model_update(Some("/before"), json!(1)),
            Message::surface_update(vec![card("loop", "loop")]),
            Message::begin_rendering("loop"),
            Message::data_model_update(Some("/after"), json!(2)),
        ])
        .unwrap_err();

    assert_eq!(err.code(), "CIRCULAR_DEPENDENCY");
    assert_eq!(processor.data_by_path("/before", None), Some(&json!(1)));
    assert_eq!(processor.data_by_path("/after", None), None);
}

#[test]
fn test_malformed_envelope_is_a_protocol_error() {
    let mut processor = processor();
    let err = processor
        .process_json(r#"[{ "beginRendering": { "root": "a" } }, { "surfaceId": "x" }]"#)
        .unwrap_err();

    assert!(matches!(err, ProcessError::Protocol(_)));
    assert!(processor.surfaces().is_empty());
}
