//! Native persistence of models and surfaces.
//!
//! Models are stored as one JSON document:
//!
//! ```text
//! {
//!   "format": "geomodel",
//!   "version": 2,
//!   "kind": "BRep",
//!   "unique_vertex_count": 131,
//!   "components": [
//!     { "id": 0, "kind": "Corner", "dimension": 0, "name": null,
//!       "mesh": { "type": "point_set", "points": [[0.0, 0.0, 0.0]] },
//!       "boundaries": [], "incidences": [8, 9, 10],
//!       "unique_vertices": [0] },
//!     ...
//!   ]
//! }
//! ```
//!
//! Component ids are file-local indices and unique vertices are renumbered
//! `0..unique_vertex_count` keeping their relative order, so two saves of the
//! same model produce the same bytes. Loading restores the identities exactly
//! as numbered in the file, so a model whose identities have no gap reloads
//! with the same ones.
//!
//! Unknown fields are ignored and optional fields fall back to their defaults;
//! documents from older versions are migrated one version at a time before
//! decoding.

use crate::io::{ModelReader, ModelWriter, SurfaceReader, SurfaceWriter};
use crate::mesh::{MeshEntity, PolygonalSurface};
use crate::mesh_error::ModelError;
use crate::model::{Model, ModelKind};
use crate::topology::component_id::{ComponentId, ComponentKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{Read, Write};

pub const MODEL_FORMAT: &str = "geomodel";
pub const SURFACE_FORMAT: &str = "geomodel-surface";
/// Newest native format version this crate reads and the one it writes.
pub const NATIVE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct NativeModel {
    format: String,
    version: u32,
    kind: ModelKind,
    #[serde(default)]
    unique_vertex_count: u32,
    #[serde(default)]
    components: Vec<NativeComponent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NativeComponent {
    id: u64,
    kind: ComponentKind,
    dimension: u8,
    #[serde(default)]
    name: Option<String>,
    mesh: MeshEntity,
    #[serde(default)]
    boundaries: Vec<u64>,
    #[serde(default)]
    incidences: Vec<u64>,
    unique_vertices: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NativeSurface {
    format: String,
    version: u32,
    mesh: PolygonalSurface,
}

fn corrupt(msg: impl Into<String>) -> ModelError {
    ModelError::CorruptFormat(msg.into())
}

fn decode_error(err: serde_json::Error) -> ModelError {
    if err.is_io() {
        ModelError::Io(err.to_string())
    } else {
        corrupt(err.to_string())
    }
}

fn encode_error(err: serde_json::Error) -> ModelError {
    ModelError::Io(err.to_string())
}

/// Reads the header fields shared by every native document.
fn check_header(doc: &Value, expected_format: &str) -> Result<u32, ModelError> {
    let format = doc
        .get("format")
        .and_then(Value::as_str)
        .ok_or_else(|| corrupt("missing format header"))?;
    if format != expected_format {
        return Err(corrupt(format!(
            "expected a `{expected_format}` document, found `{format}`"
        )));
    }
    let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| corrupt("missing format version"))? as u32;
    if version > NATIVE_VERSION {
        return Err(ModelError::VersionMismatch {
            found: version,
            supported: NATIVE_VERSION,
        });
    }
    if version == 0 {
        return Err(corrupt("format version 0 does not exist"));
    }
    Ok(version)
}

/// Brings a model document up to [`NATIVE_VERSION`].
fn migrate(mut doc: Value, mut version: u32) -> Result<Value, ModelError> {
    while version < NATIVE_VERSION {
        doc = match version {
            1 => migrate_v1(doc)?,
            _ => return Err(corrupt(format!("no migration from version {version}"))),
        };
        version += 1;
        log::info!("migrated native model document to version {version}");
    }
    Ok(doc)
}

/// Version 1 named the vertex table `vertices` and did not store the
/// unique vertex count.
fn migrate_v1(mut doc: Value) -> Result<Value, ModelError> {
    let mut count = 0u64;
    let components = doc
        .get_mut("components")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| corrupt("missing components"))?;
    for component in components.iter_mut() {
        let object = component
            .as_object_mut()
            .ok_or_else(|| corrupt("component is not an object"))?;
        if let Some(table) = object.remove("vertices") {
            if let Some(max) = table.as_array().and_then(|t| t.iter().filter_map(Value::as_u64).max()) {
                count = count.max(max + 1);
            }
            object.insert("unique_vertices".into(), table);
        }
    }
    if let Some(object) = doc.as_object_mut() {
        object.insert("unique_vertex_count".into(), Value::from(count));
        object.insert("version".into(), Value::from(2u32));
    }
    Ok(doc)
}

/// Reads models written by [`NativeModelWriter`].
#[derive(Debug, Clone, Copy)]
pub struct NativeModelReader {
    kind: ModelKind,
}

impl NativeModelReader {
    pub fn new(kind: ModelKind) -> Self {
        Self { kind }
    }
}

impl ModelReader for NativeModelReader {
    fn model_kind(&self) -> ModelKind {
        self.kind
    }

    fn read(&self, reader: &mut dyn Read) -> Result<Model, ModelError> {
        let doc: Value = serde_json::from_reader(reader).map_err(decode_error)?;
        let version = check_header(&doc, MODEL_FORMAT)?;
        let doc = migrate(doc, version)?;
        let native: NativeModel = serde_json::from_value(doc).map_err(decode_error)?;
        if native.kind != self.kind {
            return Err(corrupt(format!(
                "document holds a {:?} model, expected {:?}",
                native.kind, self.kind
            )));
        }
        let model = build_model(native)?;
        log::debug!(
            "loaded native {:?}: {} corners, {} lines, {} surfaces, {} blocks",
            model.kind(),
            model.nb_corners(),
            model.nb_lines(),
            model.nb_surfaces(),
            model.nb_blocks()
        );
        Ok(model)
    }
}

fn check_component(native: &NativeComponent) -> Result<(), ModelError> {
    if native.kind.dimension() != native.dimension || native.mesh.kind() != native.kind {
        return Err(corrupt(format!(
            "component {} declares {:?} of dimension {} with a {:?} mesh",
            native.id,
            native.kind,
            native.dimension,
            native.mesh.kind()
        )));
    }
    if native.unique_vertices.len() != native.mesh.nb_vertices() {
        return Err(corrupt(format!(
            "component {} has {} mesh vertices but a vertex table of {}",
            native.id,
            native.mesh.nb_vertices(),
            native.unique_vertices.len()
        )));
    }
    Ok(())
}

fn build_model(native: NativeModel) -> Result<Model, ModelError> {
    let mut model = Model::new(native.kind);
    let count = native.unique_vertex_count;

    let mut ids: HashMap<u64, ComponentId> = HashMap::with_capacity(native.components.len());
    let mut kinds: HashMap<u64, ComponentKind> = HashMap::with_capacity(native.components.len());
    let nb_mesh_vertices: usize = native
        .components
        .iter()
        .map(|c| c.mesh.nb_vertices())
        .sum();
    if count as usize > nb_mesh_vertices {
        return Err(corrupt(format!(
            "{count} unique vertices declared for {nb_mesh_vertices} mesh vertices"
        )));
    }
    for component in &native.components {
        check_component(component)?;
        if let Some(uid) = component.unique_vertices.iter().find(|u| **u >= count) {
            return Err(corrupt(format!(
                "component {} refers to unique vertex {uid} out of {count}",
                component.id
            )));
        }
        if kinds.insert(component.id, component.kind).is_some() {
            return Err(corrupt(format!("duplicate component id {}", component.id)));
        }
    }

    // relations must be listed on both sides
    let by_id: HashMap<u64, &NativeComponent> =
        native.components.iter().map(|c| (c.id, c)).collect();
    for component in &native.components {
        for lower in &component.boundaries {
            let Some(lower_component) = by_id.get(lower) else {
                return Err(corrupt(format!(
                    "component {} has dangling boundary {lower}",
                    component.id
                )));
            };
            if !lower_component.incidences.contains(&component.id) {
                return Err(corrupt(format!(
                    "boundary {lower} of {} is not listed among its incidences",
                    component.id
                )));
            }
        }
        for higher in &component.incidences {
            let Some(higher_kind) = kinds.get(higher) else {
                return Err(corrupt(format!(
                    "component {} has dangling incidence {higher}",
                    component.id
                )));
            };
            if higher_kind.dimension() != component.dimension + 1 {
                return Err(corrupt(format!(
                    "incidence {higher} of {} joins non-adjacent dimensions",
                    component.id
                )));
            }
            if !by_id[higher].boundaries.contains(&component.id) {
                return Err(corrupt(format!(
                    "incidence {higher} of {} is not listed among its boundaries",
                    component.id
                )));
            }
        }
    }

    for component in &native.components {
        let id = model
            .add_component_with_unique_vertices(
                component.mesh.clone(),
                component.name.clone(),
                &component.unique_vertices,
            )
            .map_err(|e| corrupt(format!("component {}: {e}", component.id)))?;
        ids.insert(component.id, id);
    }
    for component in &native.components {
        let higher = ids[&component.id];
        for lower in &component.boundaries {
            model
                .add_relation(higher, ids[lower])
                .map_err(|e| corrupt(e.to_string()))?;
        }
    }
    if model.nb_unique_vertices() != count as usize {
        return Err(corrupt(format!(
            "{count} unique vertices declared but {} are used",
            model.nb_unique_vertices()
        )));
    }

    model
        .validate()
        .map_err(|e| corrupt(format!("loaded model is invalid: {e}")))?;
    Ok(model)
}

/// Writes models in the native format.
#[derive(Debug, Clone, Copy)]
pub struct NativeModelWriter {
    kind: ModelKind,
}

impl NativeModelWriter {
    pub fn new(kind: ModelKind) -> Self {
        Self { kind }
    }
}

impl ModelWriter for NativeModelWriter {
    fn model_kind(&self) -> ModelKind {
        self.kind
    }

    fn write(&self, writer: &mut dyn Write, model: &Model) -> Result<(), ModelError> {
        let native = to_native(model)?;
        serde_json::to_writer(writer, &native).map_err(encode_error)
    }
}

fn to_native(model: &Model) -> Result<NativeModel, ModelError> {
    let local: HashMap<ComponentId, u64> = model
        .components()
        .enumerate()
        .map(|(i, c)| (c.id(), i as u64))
        .collect();
    // compact numbering that keeps the order of the live identities
    let renumbering: HashMap<u32, u32> = model
        .unique_vertices()
        .enumerate()
        .map(|(rank, uid)| (uid, rank as u32))
        .collect();

    let mut components = Vec::with_capacity(local.len());
    for component in model.components() {
        let id = component.id();
        let relation_ids = |ids: &[ComponentId]| -> Vec<u64> {
            let mut out: Vec<u64> = ids.iter().filter_map(|c| local.get(c).copied()).collect();
            out.sort_unstable();
            out
        };
        let unique_vertices = model
            .component_unique_vertices(id)?
            .into_iter()
            .map(|uid| {
                renumbering.get(&uid).copied().ok_or_else(|| {
                    ModelError::InvalidModel(format!("unique vertex {uid} is not live"))
                })
            })
            .collect::<Result<_, _>>()?;
        components.push(NativeComponent {
            id: local[&id],
            kind: component.kind(),
            dimension: component.kind().dimension(),
            name: component.name().map(str::to_owned),
            mesh: component.mesh().clone(),
            boundaries: relation_ids(model.boundaries(id)?),
            incidences: relation_ids(model.incidences(id)?),
            unique_vertices,
        });
    }

    Ok(NativeModel {
        format: MODEL_FORMAT.into(),
        version: NATIVE_VERSION,
        kind: model.kind(),
        unique_vertex_count: renumbering.len() as u32,
        components,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSurfaceReader;

impl SurfaceReader for NativeSurfaceReader {
    fn read(&self, reader: &mut dyn Read) -> Result<PolygonalSurface, ModelError> {
        let doc: Value = serde_json::from_reader(reader).map_err(decode_error)?;
        check_header(&doc, SURFACE_FORMAT)?;
        let native: NativeSurface = serde_json::from_value(doc).map_err(decode_error)?;
        native.mesh.check().map_err(|e| corrupt(e.to_string()))?;
        Ok(native.mesh)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSurfaceWriter;

impl SurfaceWriter for NativeSurfaceWriter {
    fn write(&self, writer: &mut dyn Write, surface: &PolygonalSurface) -> Result<(), ModelError> {
        let native = NativeSurface {
            format: SURFACE_FORMAT.into(),
            version: NATIVE_VERSION,
            mesh: surface.clone(),
        };
        serde_json::to_writer(writer, &native).map_err(encode_error)
    }
}
