//! Model and surface I/O.
//!
//! Adapters implement the object-safe [`ModelReader`], [`ModelWriter`],
//! [`SurfaceReader`] and [`SurfaceWriter`] traits and are looked up by
//! lowercase file extension in a [`FormatRegistry`]. The free functions
//! [`load_brep`], [`save_brep`], ... dispatch through the default registry:
//!
//! | extension | content  | read | write |
//! |-----------|----------|------|-------|
//! | `brep`    | BRep     | yes  | yes   |
//! | `sect`    | Section  | yes  | yes   |
//! | `surf`    | surface  | yes  | yes   |
//! | `msh`     | BRep     | yes  | yes   |
//! | `svg`     | Section  | yes  |       |
//! | `ply`     | surface  | yes  |       |
//! | `vtp`     | surface  | yes  |       |
//!
//! Readers build into private staging state and only hand back a model after
//! it validates, so a failed import never leaks a partial model.

pub mod gmsh;
pub mod native;
pub mod ply;
pub mod registry;
pub mod svg;
pub mod vtp;
mod xml;

pub use registry::FormatRegistry;

use crate::mesh::PolygonalSurface;
use crate::mesh_error::ModelError;
use crate::model::{Model, ModelKind};
use std::io::{Read, Write};
use std::path::Path;

/// Decodes a model from a byte stream.
pub trait ModelReader: Send + Sync {
    /// Kind of model produced by this reader.
    fn model_kind(&self) -> ModelKind;

    fn read(&self, reader: &mut dyn Read) -> Result<Model, ModelError>;
}

/// Encodes a model into a byte stream.
pub trait ModelWriter: Send + Sync {
    /// Kind of model accepted by this writer.
    fn model_kind(&self) -> ModelKind;

    fn write(&self, writer: &mut dyn Write, model: &Model) -> Result<(), ModelError>;
}

pub trait SurfaceReader: Send + Sync {
    fn read(&self, reader: &mut dyn Read) -> Result<PolygonalSurface, ModelError>;
}

pub trait SurfaceWriter: Send + Sync {
    fn write(&self, writer: &mut dyn Write, surface: &PolygonalSurface) -> Result<(), ModelError>;
}

/// Loads a BRep, dispatching on the file extension.
pub fn load_brep(path: impl AsRef<Path>) -> Result<Model, ModelError> {
    FormatRegistry::global().load_model(ModelKind::BRep, path.as_ref())
}

/// Loads a Section, dispatching on the file extension.
pub fn load_section(path: impl AsRef<Path>) -> Result<Model, ModelError> {
    FormatRegistry::global().load_model(ModelKind::Section, path.as_ref())
}

/// Loads a polygonal surface, dispatching on the file extension.
pub fn load_surface(path: impl AsRef<Path>) -> Result<PolygonalSurface, ModelError> {
    FormatRegistry::global().load_surface(path.as_ref())
}

pub fn save_brep(model: &Model, path: impl AsRef<Path>) -> Result<(), ModelError> {
    FormatRegistry::global().save_model(ModelKind::BRep, model, path.as_ref())
}

pub fn save_section(model: &Model, path: impl AsRef<Path>) -> Result<(), ModelError> {
    FormatRegistry::global().save_model(ModelKind::Section, model, path.as_ref())
}

pub fn save_surface(surface: &PolygonalSurface, path: impl AsRef<Path>) -> Result<(), ModelError> {
    FormatRegistry::global().save_surface(surface, path.as_ref())
}

/// Parses one whitespace-separated token, naming `what` in the error.
/// Converts a numeric value read from a file into a vertex or offset index.
///
/// Negative, fractional and out-of-range values are import errors.
pub(crate) fn as_index(value: f64, what: &str) -> Result<u32, ModelError> {
    if !(0.0..=u32::MAX as f64).contains(&value) || value.fract() != 0.0 {
        return Err(ModelError::GeometryImport(format!("invalid {what}: {value}")));
    }
    Ok(value as u32)
}

pub(crate) fn parse_token<T: std::str::FromStr>(
    token: Option<&str>,
    what: &str,
) -> Result<T, ModelError> {
    let raw = token.ok_or_else(|| ModelError::GeometryImport(format!("missing {what}")))?;
    raw.parse::<T>()
        .map_err(|_| ModelError::GeometryImport(format!("invalid {what}: {raw}")))
}
