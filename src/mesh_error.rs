//! ModelError: unified error type for geomodel public APIs
//!
//! Every fallible operation of the crate (topology edits, unique-vertex
//! updates, adapters and the native serializer) reports through this enum so
//! callers can match on the failure class without inspecting strings.

use crate::topology::component_id::{ComponentId, ComponentKind};
use crate::model::ModelKind;
use thiserror::Error;

/// Unified error type for geomodel operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A relation was requested between components whose dimensions are not adjacent.
    #[error(
        "relation {higher} ({higher_dim}D) -> {lower} ({lower_dim}D) does not connect adjacent dimensions"
    )]
    DimensionMismatch {
        higher: ComponentId,
        lower: ComponentId,
        higher_dim: u8,
        lower_dim: u8,
    },
    /// The identifier does not name a live component of this model.
    #[error("unknown component identifier `{0}`")]
    UnknownIdentifier(ComponentId),
    /// The unique vertex was never allocated or has been retired.
    #[error("unknown unique vertex `{0}`")]
    UnknownUniqueVertex(u32),
    /// The model kind cannot hold this component kind (e.g. a Block in a Section).
    #[error("{model:?} models cannot hold {kind:?} components")]
    UnsupportedComponent { kind: ComponentKind, model: ModelKind },
    /// A mesh payload violates its own structural rules.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    /// A model invariant does not hold (reported by `Model::validate`).
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// A persisted native file is structurally inconsistent.
    #[error("corrupt native file: {0}")]
    CorruptFormat(String),
    /// A persisted native file was written by a newer format version.
    #[error("native format version {found} is not supported (newest supported: {supported})")]
    VersionMismatch { found: u32, supported: u32 },
    /// No adapter is registered for the requested extension, or the adapter
    /// does not handle a variant of its format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// An adapter could not resolve a consistent model from its input.
    #[error("geometry import failed: {0}")]
    GeometryImport(String),
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}
