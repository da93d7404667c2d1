//! Error types for tree building and message processing.

use surface_protocol::{ComponentId, ProtocolError};
use thiserror::Error;

/// Structural errors that abort a render tree rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A component id recurred on the active build path.
    #[error("Circular dependency for component \"{component_id}\".")]
    CircularDependency {
        /// Id that was revisited.
        component_id: ComponentId,
    },

    /// A child reference names a component that is not registered.
    #[error("Dangling reference: component \"{referenced_by}\" references unknown component \"{component_id}\".")]
    DanglingReference {
        /// Missing component id.
        component_id: ComponentId,
        /// Component holding the reference.
        referenced_by: ComponentId,
    },
}

impl BuildError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            Self::DanglingReference { .. } => "DANGLING_REFERENCE",
        }
    }

    /// Component id the error is about.
    pub fn component_id(&self) -> &str {
        match self {
            Self::CircularDependency { component_id }
            | Self::DanglingReference { component_id, .. } => component_id,
        }
    }
}

/// Errors surfaced by the message dispatcher.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ProcessError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Build(err) => err.code(),
            Self::Protocol(err) => err.code(),
        }
    }
}
