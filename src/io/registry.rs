//! Extension-based lookup of readers and writers.

use crate::io::gmsh::{GmshReader, GmshWriter};
use crate::io::native::{
    NativeModelReader, NativeModelWriter, NativeSurfaceReader, NativeSurfaceWriter,
};
use crate::io::ply::PlyReader;
use crate::io::svg::SvgReader;
use crate::io::vtp::VtpReader;
use crate::io::{ModelReader, ModelWriter, SurfaceReader, SurfaceWriter};
use crate::mesh::PolygonalSurface;
use crate::mesh_error::ModelError;
use crate::model::{Model, ModelKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

static DEFAULT_REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

/// Adapters keyed by lowercase extension (without the dot).
#[derive(Default)]
pub struct FormatRegistry {
    brep_readers: HashMap<String, Box<dyn ModelReader>>,
    section_readers: HashMap<String, Box<dyn ModelReader>>,
    brep_writers: HashMap<String, Box<dyn ModelWriter>>,
    section_writers: HashMap<String, Box<dyn ModelWriter>>,
    surface_readers: HashMap<String, Box<dyn SurfaceReader>>,
    surface_writers: HashMap<String, Box<dyn SurfaceWriter>>,
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<_> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("brep_readers", &sorted_keys(&self.brep_readers))
            .field("section_readers", &sorted_keys(&self.section_readers))
            .field("brep_writers", &sorted_keys(&self.brep_writers))
            .field("section_writers", &sorted_keys(&self.section_writers))
            .field("surface_readers", &sorted_keys(&self.surface_readers))
            .field("surface_writers", &sorted_keys(&self.surface_writers))
            .finish()
    }
}

fn extension_of(path: &Path) -> Result<String, ModelError> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            ModelError::UnsupportedFormat(format!("no file extension in {}", path.display()))
        })
}

fn check_kind(expected: ModelKind, model: &Model) -> Result<(), ModelError> {
    if model.kind() != expected {
        return Err(ModelError::InvalidModel(format!(
            "expected a {expected:?} model, got a {:?} model",
            model.kind()
        )));
    }
    Ok(())
}

impl FormatRegistry {
    /// Registry without any adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the native formats and every bundled adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_model_reader("brep", NativeModelReader::new(ModelKind::BRep));
        registry.register_model_writer("brep", NativeModelWriter::new(ModelKind::BRep));
        registry.register_model_reader("sect", NativeModelReader::new(ModelKind::Section));
        registry.register_model_writer("sect", NativeModelWriter::new(ModelKind::Section));
        registry.register_surface_reader("surf", NativeSurfaceReader);
        registry.register_surface_writer("surf", NativeSurfaceWriter);
        registry.register_model_reader("msh", GmshReader::default());
        registry.register_model_writer("msh", GmshWriter);
        registry.register_model_reader("svg", SvgReader::default());
        registry.register_surface_reader("ply", PlyReader);
        registry.register_surface_reader("vtp", VtpReader);
        registry
    }

    /// Lazily built registry used by the crate-level load/save functions.
    pub fn global() -> &'static FormatRegistry {
        &DEFAULT_REGISTRY
    }

    /// Registers a model reader under `extension` for the kind it produces.
    pub fn register_model_reader(&mut self, extension: &str, reader: impl ModelReader + 'static) {
        let map = match reader.model_kind() {
            ModelKind::BRep => &mut self.brep_readers,
            ModelKind::Section => &mut self.section_readers,
        };
        map.insert(extension.to_ascii_lowercase(), Box::new(reader));
    }

    pub fn register_model_writer(&mut self, extension: &str, writer: impl ModelWriter + 'static) {
        let map = match writer.model_kind() {
            ModelKind::BRep => &mut self.brep_writers,
            ModelKind::Section => &mut self.section_writers,
        };
        map.insert(extension.to_ascii_lowercase(), Box::new(writer));
    }

    pub fn register_surface_reader(&mut self, extension: &str, reader: impl SurfaceReader + 'static) {
        self.surface_readers
            .insert(extension.to_ascii_lowercase(), Box::new(reader));
    }

    pub fn register_surface_writer(&mut self, extension: &str, writer: impl SurfaceWriter + 'static) {
        self.surface_writers
            .insert(extension.to_ascii_lowercase(), Box::new(writer));
    }

    pub fn model_reader(&self, kind: ModelKind, extension: &str) -> Result<&dyn ModelReader, ModelError> {
        let map = match kind {
            ModelKind::BRep => &self.brep_readers,
            ModelKind::Section => &self.section_readers,
        };
        map.get(&extension.to_ascii_lowercase())
            .map(Box::as_ref)
            .ok_or_else(|| {
                ModelError::UnsupportedFormat(format!("no {kind:?} reader for `.{extension}`"))
            })
    }

    pub fn model_writer(&self, kind: ModelKind, extension: &str) -> Result<&dyn ModelWriter, ModelError> {
        let map = match kind {
            ModelKind::BRep => &self.brep_writers,
            ModelKind::Section => &self.section_writers,
        };
        map.get(&extension.to_ascii_lowercase())
            .map(Box::as_ref)
            .ok_or_else(|| {
                ModelError::UnsupportedFormat(format!("no {kind:?} writer for `.{extension}`"))
            })
    }

    pub fn brep_reader(&self, extension: &str) -> Result<&dyn ModelReader, ModelError> {
        self.model_reader(ModelKind::BRep, extension)
    }

    pub fn section_reader(&self, extension: &str) -> Result<&dyn ModelReader, ModelError> {
        self.model_reader(ModelKind::Section, extension)
    }

    pub fn surface_reader(&self, extension: &str) -> Result<&dyn SurfaceReader, ModelError> {
        self.surface_readers
            .get(&extension.to_ascii_lowercase())
            .map(Box::as_ref)
            .ok_or_else(|| {
                ModelError::UnsupportedFormat(format!("no surface reader for `.{extension}`"))
            })
    }

    pub fn surface_writer(&self, extension: &str) -> Result<&dyn SurfaceWriter, ModelError> {
        self.surface_writers
            .get(&extension.to_ascii_lowercase())
            .map(Box::as_ref)
            .ok_or_else(|| {
                ModelError::UnsupportedFormat(format!("no surface writer for `.{extension}`"))
            })
    }

    pub fn load_model(&self, kind: ModelKind, path: &Path) -> Result<Model, ModelError> {
        let reader = self.model_reader(kind, &extension_of(path)?)?;
        log::info!("loading {kind:?} from {}", path.display());
        let mut file = BufReader::new(File::open(path)?);
        let model = reader.read(&mut file)?;
        check_kind(kind, &model)?;
        Ok(model)
    }

    pub fn save_model(&self, kind: ModelKind, model: &Model, path: &Path) -> Result<(), ModelError> {
        check_kind(kind, model)?;
        let writer = self.model_writer(kind, &extension_of(path)?)?;
        log::info!("saving {kind:?} to {}", path.display());
        let mut file = BufWriter::new(File::create(path)?);
        writer.write(&mut file, model)?;
        file.flush()?;
        Ok(())
    }

    pub fn load_surface(&self, path: &Path) -> Result<PolygonalSurface, ModelError> {
        let reader = self.surface_reader(&extension_of(path)?)?;
        log::info!("loading surface from {}", path.display());
        let mut file = BufReader::new(File::open(path)?);
        reader.read(&mut file)
    }

    pub fn save_surface(&self, surface: &PolygonalSurface, path: &Path) -> Result<(), ModelError> {
        let writer = self.surface_writer(&extension_of(path)?)?;
        log::info!("saving surface to {}", path.display());
        let mut file = BufWriter::new(File::create(path)?);
        writer.write(&mut file, surface)?;
        file.flush()?;
        Ok(())
    }
}
