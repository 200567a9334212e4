//! Boundary-representation models.
//!
//! A [`Model`] owns typed components (corners, lines, surfaces and, for
//! BReps, blocks), the boundary/incidence relations between them and the
//! registry unifying mesh vertices shared across components.
//!
//! ```rust
//! use geomodel::mesh::EdgedCurve;
//! use geomodel::model::Model;
//! use geomodel::topology::ComponentMeshVertex;
//!
//! let mut model = Model::section();
//! let a = model.add_corner([0.0, 0.0, 0.0]).unwrap();
//! let b = model.add_corner([1.0, 0.0, 0.0]).unwrap();
//! let line = model
//!     .add_line(EdgedCurve::polyline(vec![[0.0; 3], [1.0, 0.0, 0.0]]))
//!     .unwrap();
//! model.add_relation(line, a).unwrap();
//! model.add_relation(line, b).unwrap();
//! let ua = model.unique_vertex(ComponentMeshVertex::new(a, 0)).unwrap();
//! model
//!     .set_unique_vertex(ComponentMeshVertex::new(line, 0), ua)
//!     .unwrap();
//! assert_eq!(model.nb_incidences(a).unwrap(), 1);
//! assert_eq!(model.component_mesh_vertices(ua).unwrap().len(), 2);
//! assert!(model.is_valid());
//! ```

pub mod component;
mod validation;

pub use component::Component;

use crate::debug_invariants::DebugInvariants;
use crate::geometry::BoundingBox;
use crate::mesh::{EdgedCurve, MeshEntity, Point, PointSet, PolygonalSurface, PolyhedralSolid};
use crate::mesh_error::ModelError;
use crate::topology::component_id::{ComponentId, ComponentKind, ComponentMeshVertex};
use crate::topology::relations::TopologyGraph;
use crate::topology::unique_vertices::{UniqueVertexId, UniqueVertexRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Solid (3D) or section (2D) model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    BRep,
    Section,
}

impl ModelKind {
    /// Highest component kind the model can hold.
    pub fn top_kind(self) -> ComponentKind {
        match self {
            ModelKind::BRep => ComponentKind::Block,
            ModelKind::Section => ComponentKind::Surface,
        }
    }

    pub fn supports(self, kind: ComponentKind) -> bool {
        kind <= self.top_kind()
    }

    /// Component kinds held by this model kind, lowest dimension first.
    pub fn component_kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(move |k| self.supports(*k))
    }
}

#[derive(Clone, Debug)]
pub struct Model {
    kind: ModelKind,
    /// One map per dimension; ids are monotonic so key order is creation order.
    components: [BTreeMap<ComponentId, Component>; 4],
    graph: TopologyGraph,
    unique_vertices: UniqueVertexRegistry,
}

impl Model {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            components: Default::default(),
            graph: TopologyGraph::new(),
            unique_vertices: UniqueVertexRegistry::new(),
        }
    }

    pub fn brep() -> Self {
        Self::new(ModelKind::BRep)
    }

    pub fn section() -> Self {
        Self::new(ModelKind::Section)
    }

    #[inline]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    // --- component creation -------------------------------------------------

    /// Adds a component carrying `mesh`; its kind is derived from the mesh variant.
    ///
    /// Every mesh vertex receives a fresh unique vertex.
    pub fn add_component(&mut self, mesh: impl Into<MeshEntity>) -> Result<ComponentId, ModelError> {
        self.insert_component(mesh.into(), None, None)
    }

    pub fn add_named_component(
        &mut self,
        mesh: impl Into<MeshEntity>,
        name: impl Into<String>,
    ) -> Result<ComponentId, ModelError> {
        self.insert_component(mesh.into(), Some(name.into()), None)
    }

    /// Adds a component whose mesh vertices take the identities `unique_vertices`
    /// instead of fresh ones. Used by readers to number identities themselves.
    pub(crate) fn add_component_with_unique_vertices(
        &mut self,
        mesh: impl Into<MeshEntity>,
        name: Option<String>,
        unique_vertices: &[UniqueVertexId],
    ) -> Result<ComponentId, ModelError> {
        self.insert_component(mesh.into(), name, Some(unique_vertices))
    }

    pub fn add_corner(&mut self, point: Point) -> Result<ComponentId, ModelError> {
        self.add_component(PointSet::single(point))
    }

    pub fn add_line(&mut self, mesh: EdgedCurve) -> Result<ComponentId, ModelError> {
        self.add_component(mesh)
    }

    pub fn add_surface(&mut self, mesh: PolygonalSurface) -> Result<ComponentId, ModelError> {
        self.add_component(mesh)
    }

    pub fn add_block(&mut self, mesh: PolyhedralSolid) -> Result<ComponentId, ModelError> {
        self.add_component(mesh)
    }

    fn insert_component(
        &mut self,
        mesh: MeshEntity,
        name: Option<String>,
        unique_vertices: Option<&[UniqueVertexId]>,
    ) -> Result<ComponentId, ModelError> {
        let kind = mesh.kind();
        if !self.kind.supports(kind) {
            return Err(ModelError::UnsupportedComponent {
                kind,
                model: self.kind,
            });
        }
        if kind == ComponentKind::Corner && mesh.nb_vertices() != 1 {
            return Err(ModelError::InvalidMesh(format!(
                "a corner needs exactly one vertex, got {}",
                mesh.nb_vertices()
            )));
        }
        mesh.check()?;
        if let Some(uids) = unique_vertices {
            if uids.len() != mesh.nb_vertices() {
                return Err(ModelError::InvalidMesh(format!(
                    "{} unique vertices given for {} mesh vertices",
                    uids.len(),
                    mesh.nb_vertices()
                )));
            }
        }

        let id = ComponentId::allocate();
        match unique_vertices {
            Some(uids) => self.unique_vertices.register_component_with(id, uids)?,
            None => self.unique_vertices.register_component(id, mesh.nb_vertices()),
        }
        self.graph.register(id, kind);
        self.components[kind.dimension() as usize].insert(id, Component::new(id, mesh, name));
        log::trace!("added {kind:?} {id}");

        crate::debug_invariants!(self.validate_invariants(), "add_component");
        Ok(id)
    }

    /// Removes a component with its relations and vertex memberships.
    ///
    /// Any later query naming `id` fails with [`ModelError::UnknownIdentifier`].
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, ModelError> {
        let kind = self.graph.remove_component(id)?;
        self.unique_vertices.unregister_component(id);
        let component = self.components[kind.dimension() as usize]
            .remove(&id)
            .ok_or(ModelError::UnknownIdentifier(id))?;
        log::trace!("removed {kind:?} {id}");

        crate::debug_invariants!(self.validate_invariants(), "remove_component");
        Ok(component)
    }

    pub fn set_component_name(
        &mut self,
        id: ComponentId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        let kind = self.graph.kind(id)?;
        self.components[kind.dimension() as usize]
            .get_mut(&id)
            .ok_or(ModelError::UnknownIdentifier(id))?
            .set_name(Some(name.into()));
        Ok(())
    }

    // --- relations ------------------------------------------------------------

    /// Records that `lower` bounds `higher`.
    pub fn add_relation(&mut self, higher: ComponentId, lower: ComponentId) -> Result<(), ModelError> {
        self.graph.add_relation(higher, lower)
    }

    /// Removes a relation, returning whether it existed.
    pub fn remove_relation(
        &mut self,
        higher: ComponentId,
        lower: ComponentId,
    ) -> Result<bool, ModelError> {
        self.graph.kind(higher)?;
        self.graph.kind(lower)?;
        Ok(self.graph.remove_relation(higher, lower))
    }

    pub fn boundaries(&self, id: ComponentId) -> Result<&[ComponentId], ModelError> {
        self.graph.boundaries(id)
    }

    pub fn incidences(&self, id: ComponentId) -> Result<&[ComponentId], ModelError> {
        self.graph.incidences(id)
    }

    pub fn nb_boundaries(&self, id: ComponentId) -> Result<usize, ModelError> {
        self.graph.nb_boundaries(id)
    }

    pub fn nb_incidences(&self, id: ComponentId) -> Result<usize, ModelError> {
        self.graph.nb_incidences(id)
    }

    // --- counts & iteration -----------------------------------------------------

    pub fn nb_components(&self, kind: ComponentKind) -> usize {
        self.components[kind.dimension() as usize].len()
    }

    pub fn nb_corners(&self) -> usize {
        self.nb_components(ComponentKind::Corner)
    }

    pub fn nb_lines(&self) -> usize {
        self.nb_components(ComponentKind::Line)
    }

    pub fn nb_surfaces(&self) -> usize {
        self.nb_components(ComponentKind::Surface)
    }

    pub fn nb_blocks(&self) -> usize {
        self.nb_components(ComponentKind::Block)
    }

    /// Components of `kind` in creation order.
    pub fn components_of(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> + '_ {
        self.components[kind.dimension() as usize].values()
    }

    pub fn corners(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components_of(ComponentKind::Corner)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components_of(ComponentKind::Line)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components_of(ComponentKind::Surface)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components_of(ComponentKind::Block)
    }

    /// Every component, lowest dimension first, creation order within a kind.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.iter().flat_map(BTreeMap::values)
    }

    pub fn component(&self, id: ComponentId) -> Result<&Component, ModelError> {
        let kind = self.graph.kind(id)?;
        self.components[kind.dimension() as usize]
            .get(&id)
            .ok_or(ModelError::UnknownIdentifier(id))
    }

    // --- geometry ---------------------------------------------------------------

    /// Whether `line` is a closed loop: the two ends of its edge chain share a
    /// unique vertex, or the chain has no free end at all.
    ///
    /// Always `false` for components that are not lines.
    pub fn is_closed(&self, line: ComponentId) -> Result<bool, ModelError> {
        let Some(curve) = self.component(line)?.mesh().as_edged_curve() else {
            return Ok(false);
        };
        if curve.nb_edges() == 0 {
            return Ok(false);
        }
        Ok(match curve.end_vertices().as_slice() {
            [] => true,
            [first, last] => {
                let first = self.unique_vertex(ComponentMeshVertex::new(line, *first));
                let last = self.unique_vertex(ComponentMeshVertex::new(line, *last));
                first.is_some() && first == last
            }
            _ => false,
        })
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for component in self.components() {
            bbox.add_box(&component.mesh().bounding_box());
        }
        bbox
    }

    // --- unique vertices -------------------------------------------------------

    pub fn nb_unique_vertices(&self) -> usize {
        self.unique_vertices.nb_unique_vertices()
    }

    /// Live unique vertices in increasing order.
    pub fn unique_vertices(&self) -> impl Iterator<Item = UniqueVertexId> + '_ {
        self.unique_vertices.unique_vertices()
    }

    pub fn unique_vertex(&self, cmv: ComponentMeshVertex) -> Option<UniqueVertexId> {
        self.unique_vertices.unique_vertex(cmv)
    }

    /// Unique vertex of every mesh vertex of `id`, in local vertex order.
    pub fn component_unique_vertices(
        &self,
        id: ComponentId,
    ) -> Result<Vec<UniqueVertexId>, ModelError> {
        let component = self.component(id)?;
        (0..component.mesh().nb_vertices() as u32)
            .map(|v| {
                self.unique_vertex(ComponentMeshVertex::new(id, v))
                    .ok_or_else(|| {
                        ModelError::InvalidModel(format!("vertex {v} of {id} has no unique vertex"))
                    })
            })
            .collect()
    }

    pub fn component_mesh_vertices(
        &self,
        uid: UniqueVertexId,
    ) -> Result<&[ComponentMeshVertex], ModelError> {
        self.unique_vertices.component_mesh_vertices(uid)
    }

    /// Members of `uid` belonging to components of `kind`.
    pub fn component_mesh_vertices_of_kind(
        &self,
        uid: UniqueVertexId,
        kind: ComponentKind,
    ) -> Result<Vec<ComponentMeshVertex>, ModelError> {
        Ok(self
            .component_mesh_vertices(uid)?
            .iter()
            .filter(|cmv| self.graph.kind(cmv.component).ok() == Some(kind))
            .copied()
            .collect())
    }

    /// Allocates a unique vertex with no member yet.
    ///
    /// Assign it with [`Model::set_unique_vertex`] before adding or removing
    /// a component: debug builds validate the model after those mutations.
    pub fn create_unique_vertex(&mut self) -> UniqueVertexId {
        self.unique_vertices.create_unique_vertex()
    }

    /// Allocates `count` unique vertices numbered sequentially from the returned one.
    pub fn create_unique_vertices(&mut self, count: usize) -> UniqueVertexId {
        self.unique_vertices.create_unique_vertices(count)
    }

    pub fn set_unique_vertex(
        &mut self,
        cmv: ComponentMeshVertex,
        uid: UniqueVertexId,
    ) -> Result<(), ModelError> {
        let nb_vertices = self.component(cmv.component)?.mesh().nb_vertices();
        if cmv.vertex as usize >= nb_vertices {
            return Err(ModelError::InvalidMesh(format!(
                "vertex {} is out of range for {} ({nb_vertices} vertices)",
                cmv.vertex, cmv.component
            )));
        }
        self.unique_vertices.set_unique_vertex(cmv, uid)
    }

    /// Unions two unique vertices; the lower-numbered one survives and is returned.
    pub fn merge_unique_vertices(
        &mut self,
        a: UniqueVertexId,
        b: UniqueVertexId,
    ) -> Result<UniqueVertexId, ModelError> {
        self.unique_vertices.merge(a, b)
    }

    // --- validation ------------------------------------------------------------

    /// Returns the first violated model invariant, if any.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.validate_invariants()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub(crate) fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub(crate) fn registry(&self) -> &UniqueVertexRegistry {
        &self.unique_vertices
    }
}
