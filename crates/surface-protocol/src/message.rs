//! Inbound protocol messages.
//!
//! Each message on the wire is an envelope with an optional outer
//! `surfaceId` and exactly one payload key:
//!
//! ```text
//! { surfaceId?, beginRendering:  { root, styles? } }
//! { surfaceId?, surfaceUpdate:   { components: [...] } }
//! { surfaceId?, dataModelUpdate: { path?, contents } }
//! {             deleteSurface:   { surfaceId } }
//! ```
//!
//! Older producers put `surfaceId` inside the payload instead; that form is
//! accepted when no outer id is given.

use crate::component::{ComponentDescriptor, ComponentId};
use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identifier of a surface.
pub type SurfaceId = String;

/// Surface used when a message names none.
pub const DEFAULT_SURFACE_ID: &str = "@default";

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum Message {
    /// Set the surface root (and optionally its styles) and render.
    BeginRendering {
        surface_id: SurfaceId,
        root: ComponentId,
        styles: Option<BTreeMap<String, String>>,
    },
    /// Insert or overwrite component descriptors by id.
    SurfaceUpdate {
        surface_id: SurfaceId,
        components: Vec<ComponentDescriptor>,
    },
    /// Write `contents` at `path`, or replace the whole model when `path` is absent.
    DataModelUpdate {
        surface_id: SurfaceId,
        path: Option<String>,
        contents: Value,
    },
    /// Remove a surface entirely.
    DeleteSurface { surface_id: SurfaceId },
}

impl Message {
    /// `beginRendering` on the default surface.
    pub fn begin_rendering(root: impl Into<ComponentId>) -> Self {
        Self::BeginRendering {
            surface_id: DEFAULT_SURFACE_ID.to_owned(),
            root: root.into(),
            styles: None,
        }
    }

    /// `surfaceUpdate` on the default surface.
    pub fn surface_update(components: Vec<ComponentDescriptor>) -> Self {
        Self::SurfaceUpdate {
            surface_id: DEFAULT_SURFACE_ID.to_owned(),
            components,
        }
    }

    /// `dataModelUpdate` on the default surface.
    pub fn data_model_update(path: Option<&str>, contents: Value) -> Self {
        Self::DataModelUpdate {
            surface_id: DEFAULT_SURFACE_ID.to_owned(),
            path: path.map(str::to_owned),
            contents,
        }
    }

    /// `deleteSurface` for the given surface.
    pub fn delete_surface(surface_id: impl Into<SurfaceId>) -> Self {
        Self::DeleteSurface {
            surface_id: surface_id.into(),
        }
    }

    /// Retarget this message at another surface.
    pub fn on_surface(mut self, target: impl Into<SurfaceId>) -> Self {
        match &mut self {
            Self::BeginRendering { surface_id, .. }
            | Self::SurfaceUpdate { surface_id, .. }
            | Self::DataModelUpdate { surface_id, .. }
            | Self::DeleteSurface { surface_id } => *surface_id = target.into(),
        }
        self
    }

    /// Surface this message targets.
    pub fn surface_id(&self) -> &str {
        match self {
            Self::BeginRendering { surface_id, .. }
            | Self::SurfaceUpdate { surface_id, .. }
            | Self::DataModelUpdate { surface_id, .. }
            | Self::DeleteSurface { surface_id } => surface_id,
        }
    }

    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeginRendering { .. } => "beginRendering",
            Self::SurfaceUpdate { .. } => "surfaceUpdate",
            Self::DataModelUpdate { .. } => "dataModelUpdate",
            Self::DeleteSurface { .. } => "deleteSurface",
        }
    }

    /// Decode a JSON array of envelopes, or a single envelope.
    ///
    /// # Errors
    /// Returns an error if the input is not JSON or any envelope is malformed.
    pub fn decode_batch(json: &str) -> Result<Vec<Self>, ProtocolError> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(ProtocolError::from))
                .collect(),
            single => Ok(vec![serde_json::from_value(single)?]),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface_id: Option<SurfaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    begin_rendering: Option<BeginRenderingPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface_update: Option<SurfaceUpdatePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_model_update: Option<DataModelUpdatePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_surface: Option<DeleteSurfacePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeginRenderingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface_id: Option<SurfaceId>,
    root: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    styles: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurfaceUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface_id: Option<SurfaceId>,
    #[serde(default)]
    components: Vec<ComponentDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataModelUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface_id: Option<SurfaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default)]
    contents: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSurfacePayload {
    surface_id: SurfaceId,
}

impl TryFrom<Envelope> for Message {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope {
            surface_id: outer,
            begin_rendering,
            surface_update,
            data_model_update,
            delete_surface,
        } = envelope;

        // Outer id wins; the payload-level id is the legacy fallback.
        let target = |inner: Option<SurfaceId>| {
            outer
                .clone()
                .or(inner)
                .unwrap_or_else(|| DEFAULT_SURFACE_ID.to_owned())
        };

        match (begin_rendering, surface_update, data_model_update, delete_surface) {
            (Some(payload), None, None, None) => Ok(Self::BeginRendering {
                surface_id: target(payload.surface_id),
                root: payload.root,
                styles: payload.styles,
            }),
            (None, Some(payload), None, None) => Ok(Self::SurfaceUpdate {
                surface_id: target(payload.surface_id),
                components: payload.components,
            }),
            (None, None, Some(payload), None) => Ok(Self::DataModelUpdate {
                surface_id: target(payload.surface_id),
                path: payload.path,
                contents: payload.contents,
            }),
            (None, None, None, Some(payload)) => Ok(Self::DeleteSurface {
                surface_id: payload.surface_id,
            }),
            (None, None, None, None) => Err(ProtocolError::MissingPayload),
            (begin, update, data, delete) => Err(ProtocolError::MultiplePayloads {
                count: [
                    begin.is_some(),
                    update.is_some(),
                    data.is_some(),
                    delete.is_some(),
                ]
                .into_iter()
                .filter(|present| *present)
                .count(),
            }),
        }
    }
}

impl From<Message> for Envelope {
    fn from(message: Message) -> Self {
        match message {
            Message::BeginRendering {
                surface_id,
                root,
                styles,
            } => Self {
                surface_id: Some(surface_id),
                begin_rendering: Some(BeginRenderingPayload {
                    surface_id: None,
                    root,
                    styles,
                }),
                ..Self::default()
            },
            Message::SurfaceUpdate {
                surface_id,
                components,
            } => Self {
                surface_id: Some(surface_id),
                surface_update: Some(SurfaceUpdatePayload {
                    surface_id: None,
                    components,
                }),
                ..Self::default()
            },
            Message::DataModelUpdate {
                surface_id,
                path,
                contents,
            } => Self {
                surface_id: Some(surface_id),
                data_model_update: Some(DataModelUpdatePayload {
                    surface_id: None,
                    path,
                    contents,
                }),
                ..Self::default()
            },
            Message::DeleteSurface { surface_id } => Self {
                delete_surface: Some(DeleteSurfacePayload { surface_id }),
                ..Self::default()
            },
        }
    }
}
