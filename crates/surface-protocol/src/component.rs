//! Component descriptors and their classified property bags.
//!
//! On the wire a component looks like:
//!
//! ```text
//! { "id": "title", "weight": 1, "component": { "Text": { "text": { "path": "/title" } } } }
//! ```
//!
//! The single key under `component` is the type tag; its value is the
//! property bag. Each property is classified into a [`PropertyValue`] when the
//! descriptor is decoded.

use crate::error::ProtocolError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identifier of a component within its surface.
pub type ComponentId = String;

const PATH_KEY: &str = "path";
const EXPLICIT_LIST_KEY: &str = "explicitList";
const TEMPLATE_KEY: &str = "template";
const CHILD_KEY: &str = "child";
const CHILD_KEY_SUFFIX: &str = "Child";

/// An unresolved reference from a property to a location in the data model.
///
/// Serializes as `{ "path": "...", ...extra }`. Sibling fields such as a
/// `literalString` fallback are carried untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Slash-delimited data model path, absolute or relative.
    pub path: String,
    /// Any other fields that travelled with the binding.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Binding {
    /// Create a binding with no extra fields.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Same binding pointing somewhere else.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extra: self.extra.clone(),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        let path = map.get(PATH_KEY)?.as_str()?;
        let extra = map
            .iter()
            .filter(|(key, _)| key.as_str() != PATH_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            path: path.to_owned(),
            extra,
        })
    }
}

/// A list template: one instance of `component_id` per element of the array
/// found at `data_binding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Component instantiated for every array element.
    pub component_id: ComponentId,
    /// Path of the array, resolved against the current data context.
    pub data_binding: String,
}

impl Template {
    /// Create a template.
    pub fn new(component_id: impl Into<ComponentId>, data_binding: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            data_binding: data_binding.into(),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        let template = map.get(TEMPLATE_KEY)?.as_object()?;
        Some(Self {
            component_id: template.get("componentId")?.as_str()?.to_owned(),
            data_binding: template.get("dataBinding")?.as_str()?.to_owned(),
        })
    }
}

/// One entry of a component's property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Passed through to the render tree unchanged.
    Literal(Value),
    /// `{ "path": "..." }`
    Binding(Binding),
    /// `{ "explicitList": ["a", "b"] }`
    ExplicitList(Vec<ComponentId>),
    /// A component id under `child` (or any `*Child` key).
    Child(ComponentId),
    /// `{ "template": { "componentId": "...", "dataBinding": "..." } }`
    Template(Template),
    /// An array holding at least one structural element.
    List(Vec<PropertyValue>),
    /// An object holding at least one structural member.
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Classify a value found under the property `key`.
    pub fn from_property(key: &str, value: Value) -> Self {
        Self::classify(Some(key), value)
    }

    /// Classify a value with no enclosing key (e.g. an array element).
    pub fn from_json(value: Value) -> Self {
        Self::classify(None, value)
    }

    /// Whether this value needs no work when building the render tree.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Convert back to the wire representation.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Binding(binding) => {
                let mut map: Map<String, Value> = binding
                    .extra
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                map.insert(PATH_KEY.to_owned(), Value::String(binding.path.clone()));
                Value::Object(map)
            }
            Self::ExplicitList(ids) => {
                let ids = ids.iter().cloned().map(Value::String).collect();
                let mut map = Map::new();
                map.insert(EXPLICIT_LIST_KEY.to_owned(), Value::Array(ids));
                Value::Object(map)
            }
            Self::Child(id) => Value::String(id.clone()),
            Self::Template(template) => {
                let mut inner = Map::new();
                inner.insert(
                    "componentId".to_owned(),
                    Value::String(template.component_id.clone()),
                );
                inner.insert(
                    "dataBinding".to_owned(),
                    Value::String(template.data_binding.clone()),
                );
                let mut map = Map::new();
                map.insert(TEMPLATE_KEY.to_owned(), Value::Object(inner));
                Value::Object(map)
            }
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    fn classify(key: Option<&str>, value: Value) -> Self {
        if !is_structural(key, &value) {
            return Self::Literal(value);
        }

        match value {
            Value::String(id) => Self::Child(id),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => {
                if let Some(ids) = explicit_list(&map) {
                    return Self::ExplicitList(ids);
                }
                if let Some(template) = Template::from_object(&map) {
                    return Self::Template(template);
                }
                if let Some(binding) = Binding::from_object(&map) {
                    return Self::Binding(binding);
                }
                Self::Map(
                    map.into_iter()
                        .map(|(key, value)| {
                            let classified = Self::classify(Some(&key), value);
                            (key, classified)
                        })
                        .collect(),
                )
            }
            other => Self::Literal(other),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

fn is_child_key(key: &str) -> bool {
    key == CHILD_KEY || key.ends_with(CHILD_KEY_SUFFIX)
}

fn explicit_list(map: &Map<String, Value>) -> Option<Vec<ComponentId>> {
    map.get(EXPLICIT_LIST_KEY)?
        .as_array()?
        .iter()
        .map(|id| id.as_str().map(str::to_owned))
        .collect()
}

/// Whether `value` (found under `key`) contains anything the tree builder
/// must act on.
fn is_structural(key: Option<&str>, value: &Value) -> bool {
    match value {
        Value::String(_) => key.is_some_and(is_child_key),
        Value::Array(items) => items.iter().any(|item| is_structural(None, item)),
        Value::Object(map) => {
            explicit_list(map).is_some()
                || Template::from_object(map).is_some()
                || Binding::from_object(map).is_some()
                || map
                    .iter()
                    .any(|(key, value)| is_structural(Some(key), value))
        }
        _ => false,
    }
}

/// A component as registered on a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponent", into = "RawComponent")]
pub struct ComponentDescriptor {
    /// Unique id within the surface.
    pub id: ComponentId,
    /// Opaque type tag (`Text`, `Column`, ...).
    pub component_type: String,
    /// Classified property bag.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Layout weight hint, passed through to the render tree.
    pub weight: Option<f64>,
}

impl ComponentDescriptor {
    /// Create a descriptor with an empty property bag.
    pub fn new(id: impl Into<ComponentId>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            properties: BTreeMap::new(),
            weight: None,
        }
    }

    /// Add a property, classifying the raw JSON value.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        let classified = PropertyValue::from_property(&key, value);
        self.properties.insert(key, classified);
        self
    }

    /// Set the layout weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Decode a descriptor from its wire JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON does not have the descriptor shape or the
    /// `component` object does not name exactly one type.
    pub fn from_json(value: Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Wire form of [`ComponentDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawComponent {
    id: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(alias = "componentProperties")]
    component: Map<String, Value>,
}

impl TryFrom<RawComponent> for ComponentDescriptor {
    type Error = ProtocolError;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        if raw.component.len() != 1 {
            return Err(ProtocolError::ComponentTypeTag {
                found: raw.component.len(),
                id: raw.id,
            });
        }

        let Some((component_type, bag)) = raw.component.into_iter().next() else {
            return Err(ProtocolError::ComponentTypeTag { id: raw.id, found: 0 });
        };

        let properties = match bag {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| {
                    let classified = PropertyValue::from_property(&key, value);
                    (key, classified)
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Ok(Self {
            id: raw.id,
            component_type,
            properties,
            weight: raw.weight,
        })
    }
}

impl From<ComponentDescriptor> for RawComponent {
    fn from(descriptor: ComponentDescriptor) -> Self {
        let bag: Map<String, Value> = descriptor
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        let mut component = Map::new();
        component.insert(descriptor.component_type, Value::Object(bag));
        Self {
            id: descriptor.id,
            weight: descriptor.weight,
            component,
        }
    }
}
