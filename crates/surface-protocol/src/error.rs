//! Protocol decoding errors.

use thiserror::Error;

/// Errors raised while decoding protocol messages and component descriptors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The envelope names none of the known message kinds.
    #[error(
        "Message carries no payload (expected one of beginRendering, surfaceUpdate, dataModelUpdate, deleteSurface)"
    )]
    MissingPayload,

    /// The envelope names more than one message kind.
    #[error("Message carries {count} payloads; exactly one is allowed")]
    MultiplePayloads {
        /// Number of payload kinds present.
        count: usize,
    },

    /// A component's `component` object must hold exactly one type tag.
    #[error("Component \"{id}\" must name exactly one type, found {found}")]
    ComponentTypeTag {
        /// Component id from the descriptor.
        id: String,
        /// Number of keys found in the `component` object.
        found: usize,
    },

    /// The input was not valid JSON or did not match the message shape.
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPayload => "MISSING_PAYLOAD",
            Self::MultiplePayloads { .. } => "MULTIPLE_PAYLOADS",
            Self::ComponentTypeTag { .. } => "COMPONENT_TYPE_TAG",
            Self::Json(_) => "MALFORMED_MESSAGE",
        }
    }
}
