//! A model component: identifier, kind, optional name and mesh.

use crate::mesh::MeshEntity;
use crate::topology::component_id::{ComponentId, ComponentKind};

/// Component owned by a [`Model`](crate::model::Model).
///
/// The kind is always that of the mesh variant; components are only built by
/// the model so the two cannot disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    id: ComponentId,
    name: Option<String>,
    mesh: MeshEntity,
}

impl Component {
    pub(crate) fn new(id: ComponentId, mesh: MeshEntity, name: Option<String>) -> Self {
        Self { id, name, mesh }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ComponentKind {
        self.mesh.kind()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn mesh(&self) -> &MeshEntity {
        &self.mesh
    }

    /// Consumes the component, returning its mesh.
    pub fn into_mesh(self) -> MeshEntity {
        self.mesh
    }
}
