//! Global identities for mesh vertices shared across components.
//!
//! Every local vertex of every registered component maps to exactly one
//! *unique vertex*. Two local vertices that denote the same physical point
//! (a corner and the end of the line it bounds, for instance) share an
//! identity. The registry is an arena of slots forming a union-find forest:
//! roots carry the member lists, merged slots point to their survivor.

use crate::mesh_error::ModelError;
use crate::topology::component_id::{ComponentId, ComponentMeshVertex};
use std::collections::HashMap;

/// Sequential identifier of a unique vertex.
pub type UniqueVertexId = u32;

#[derive(Clone, Debug)]
enum Slot {
    Root { members: Vec<ComponentMeshVertex> },
    Merged { parent: UniqueVertexId },
    Vacant,
}

/// Arena-backed union-find over component mesh vertices.
#[derive(Clone, Debug, Default)]
pub struct UniqueVertexRegistry {
    slots: Vec<Slot>,
    /// component -> identity of each local vertex (may point at a merged slot)
    mapping: HashMap<ComponentId, Vec<UniqueVertexId>>,
    nb_live: usize,
}

impl UniqueVertexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `nb_vertices` local vertices of `component`, each with a fresh identity.
    ///
    /// Registering a component twice replaces its previous memberships.
    pub fn register_component(&mut self, component: ComponentId, nb_vertices: usize) {
        if self.mapping.contains_key(&component) {
            self.unregister_component(component);
        }
        let mut ids = Vec::with_capacity(nb_vertices);
        for v in 0..nb_vertices {
            let uid = self.push_root(vec![ComponentMeshVertex::new(component, v as u32)]);
            ids.push(uid);
        }
        self.mapping.insert(component, ids);
    }

    /// Registers the local vertices of `component` with the given identities,
    /// `ids[v]` being the identity of local vertex `v`.
    ///
    /// Identities that are not allocated yet (or vacant) are claimed, so a fresh
    /// registry filled this way numbers its identities exactly as `ids` do.
    pub(crate) fn register_component_with(
        &mut self,
        component: ComponentId,
        ids: &[UniqueVertexId],
    ) -> Result<(), ModelError> {
        if self.mapping.contains_key(&component) {
            self.unregister_component(component);
        }
        let mut mapped = Vec::with_capacity(ids.len());
        for (v, uid) in ids.iter().enumerate() {
            let cmv = ComponentMeshVertex::new(component, v as u32);
            let index = *uid as usize;
            if index >= self.slots.len() {
                self.slots.resize(index + 1, Slot::Vacant);
            }
            let root = if matches!(self.slots[index], Slot::Vacant) {
                self.slots[index] = Slot::Root { members: Vec::new() };
                self.nb_live += 1;
                *uid
            } else {
                self.find_compress(*uid)
                    .ok_or(ModelError::UnknownUniqueVertex(*uid))?
            };
            if let Slot::Root { members } = &mut self.slots[root as usize] {
                members.push(cmv);
            }
            mapped.push(root);
        }
        self.mapping.insert(component, mapped);
        Ok(())
    }

    /// Drops every membership of `component`; identities left empty are retired.
    pub fn unregister_component(&mut self, component: ComponentId) {
        let Some(ids) = self.mapping.remove(&component) else {
            return;
        };
        for (v, uid) in ids.into_iter().enumerate() {
            let cmv = ComponentMeshVertex::new(component, v as u32);
            if let Some(root) = self.find(uid) {
                self.detach(root, cmv);
            }
        }
    }

    /// Allocates an identity with no member yet.
    pub fn create_unique_vertex(&mut self) -> UniqueVertexId {
        self.push_root(Vec::new())
    }

    /// Allocates `count` memberless identities and returns the first one;
    /// the others follow sequentially.
    pub fn create_unique_vertices(&mut self, count: usize) -> UniqueVertexId {
        let first = self.slots.len() as UniqueVertexId;
        for _ in 0..count {
            self.push_root(Vec::new());
        }
        first
    }

    /// Moves `cmv` to identity `uid`.
    ///
    /// The previous identity of `cmv` is retired if this leaves it empty.
    pub fn set_unique_vertex(
        &mut self,
        cmv: ComponentMeshVertex,
        uid: UniqueVertexId,
    ) -> Result<(), ModelError> {
        let target = self
            .find_compress(uid)
            .ok_or(ModelError::UnknownUniqueVertex(uid))?;
        let current = self.local_slot(cmv)?;
        let old_root = self.find(current);
        if old_root == Some(target) {
            return Ok(());
        }
        if let Some(old) = old_root {
            self.detach(old, cmv);
        }
        if let Slot::Root { members } = &mut self.slots[target as usize] {
            members.push(cmv);
        }
        if let Some(ids) = self.mapping.get_mut(&cmv.component) {
            ids[cmv.vertex as usize] = target;
        }
        Ok(())
    }

    /// Identity of a local vertex, resolved through merges.
    pub fn unique_vertex(&self, cmv: ComponentMeshVertex) -> Option<UniqueVertexId> {
        let uid = *self
            .mapping
            .get(&cmv.component)?
            .get(cmv.vertex as usize)?;
        self.find(uid)
    }

    /// Resolves a possibly merged identity to its surviving root.
    ///
    /// Returns `None` for identities that were never allocated or have been retired.
    pub fn find(&self, mut uid: UniqueVertexId) -> Option<UniqueVertexId> {
        loop {
            match self.slots.get(uid as usize)? {
                Slot::Root { .. } => return Some(uid),
                Slot::Merged { parent } => uid = *parent,
                Slot::Vacant => return None,
            }
        }
    }

    fn find_compress(&mut self, uid: UniqueVertexId) -> Option<UniqueVertexId> {
        let root = self.find(uid)?;
        let mut cur = uid;
        while cur != root {
            let Slot::Merged { parent } = self.slots[cur as usize] else {
                break;
            };
            self.slots[cur as usize] = Slot::Merged { parent: root };
            cur = parent;
        }
        Some(root)
    }

    /// Unions the identities of `a` and `b`; the lower-numbered root survives.
    ///
    /// Merging an identity with itself (or twice) changes nothing.
    ///
    /// # Example
    /// ```rust
    /// use geomodel::topology::component_id::ComponentId;
    /// use geomodel::topology::unique_vertices::UniqueVertexRegistry;
    /// let mut reg = UniqueVertexRegistry::new();
    /// reg.register_component(ComponentId::allocate(), 3);
    /// assert_eq!(reg.merge(2, 0).unwrap(), 0);
    /// assert_eq!(reg.merge(0, 2).unwrap(), 0);
    /// assert_eq!(reg.nb_unique_vertices(), 2);
    /// ```
    pub fn merge(
        &mut self,
        a: UniqueVertexId,
        b: UniqueVertexId,
    ) -> Result<UniqueVertexId, ModelError> {
        let ra = self
            .find_compress(a)
            .ok_or(ModelError::UnknownUniqueVertex(a))?;
        let rb = self
            .find_compress(b)
            .ok_or(ModelError::UnknownUniqueVertex(b))?;
        if ra == rb {
            return Ok(ra);
        }
        let (survivor, absorbed) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let moved = match std::mem::replace(
            &mut self.slots[absorbed as usize],
            Slot::Merged { parent: survivor },
        ) {
            Slot::Root { members } => members,
            _ => Vec::new(),
        };
        if let Slot::Root { members } = &mut self.slots[survivor as usize] {
            members.extend(moved);
        }
        self.nb_live -= 1;
        log::trace!("merged unique vertex {absorbed} into {survivor}");
        Ok(survivor)
    }

    /// Local vertices sharing the identity `uid`.
    pub fn component_mesh_vertices(
        &self,
        uid: UniqueVertexId,
    ) -> Result<&[ComponentMeshVertex], ModelError> {
        let root = self.find(uid).ok_or(ModelError::UnknownUniqueVertex(uid))?;
        match &self.slots[root as usize] {
            Slot::Root { members } => Ok(members),
            _ => Err(ModelError::UnknownUniqueVertex(uid)),
        }
    }

    /// Number of live identities.
    #[inline]
    pub fn nb_unique_vertices(&self) -> usize {
        self.nb_live
    }

    /// Live identities in increasing order.
    pub fn unique_vertices(&self) -> impl Iterator<Item = UniqueVertexId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Slot::Root { .. }))
            .map(|(i, _)| i as UniqueVertexId)
    }

    /// Number of local vertices registered for `component`.
    pub fn nb_component_vertices(&self, component: ComponentId) -> Option<usize> {
        self.mapping.get(&component).map(Vec::len)
    }

    /// Checks that members and mapping agree, and that no live identity is empty.
    pub fn check(&self) -> Result<(), String> {
        for (uid, slot) in self.slots.iter().enumerate() {
            let Slot::Root { members } = slot else {
                continue;
            };
            if members.is_empty() {
                return Err(format!("unique vertex {uid} has no component vertex"));
            }
            for cmv in members {
                if self.unique_vertex(*cmv) != Some(uid as UniqueVertexId) {
                    return Err(format!(
                        "vertex {} of {} is listed by unique vertex {uid} but maps elsewhere",
                        cmv.vertex, cmv.component
                    ));
                }
            }
        }
        for (component, ids) in &self.mapping {
            for (v, uid) in ids.iter().enumerate() {
                if self.find(*uid).is_none() {
                    return Err(format!(
                        "vertex {v} of {component} maps to retired unique vertex {uid}"
                    ));
                }
            }
        }
        Ok(())
    }

    fn push_root(&mut self, members: Vec<ComponentMeshVertex>) -> UniqueVertexId {
        let uid = self.slots.len() as UniqueVertexId;
        self.slots.push(Slot::Root { members });
        self.nb_live += 1;
        uid
    }

    fn local_slot(&self, cmv: ComponentMeshVertex) -> Result<UniqueVertexId, ModelError> {
        let ids = self
            .mapping
            .get(&cmv.component)
            .ok_or(ModelError::UnknownIdentifier(cmv.component))?;
        ids.get(cmv.vertex as usize).copied().ok_or_else(|| {
            ModelError::InvalidMesh(format!(
                "vertex {} is out of range for {} ({} vertices)",
                cmv.vertex,
                cmv.component,
                ids.len()
            ))
        })
    }

    fn detach(&mut self, root: UniqueVertexId, cmv: ComponentMeshVertex) {
        let emptied = match &mut self.slots[root as usize] {
            Slot::Root { members } => {
                members.retain(|m| *m != cmv);
                members.is_empty()
            }
            _ => false,
        };
        if emptied {
            self.slots[root as usize] = Slot::Vacant;
            self.nb_live -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_identities_per_vertex() {
        let c = ComponentId::allocate();
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component(c, 4);
        assert_eq!(reg.nb_unique_vertices(), 4);
        let ids: Vec<_> = (0..4)
            .map(|v| reg.unique_vertex(ComponentMeshVertex::new(c, v)).unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(reg.check().is_ok());
    }

    #[test]
    fn merge_keeps_lower_and_is_idempotent() {
        let (a, b) = (ComponentId::allocate(), ComponentId::allocate());
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component(a, 1);
        reg.register_component(b, 2);
        assert_eq!(reg.merge(2, 0).unwrap(), 0);
        assert_eq!(reg.merge(2, 0).unwrap(), 0);
        assert_eq!(reg.nb_unique_vertices(), 2);
        assert_eq!(reg.find(2), Some(0));
        let members = reg.component_mesh_vertices(2).unwrap();
        assert_eq!(
            members,
            &[ComponentMeshVertex::new(a, 0), ComponentMeshVertex::new(b, 1)]
        );
        assert!(reg.check().is_ok());
    }

    #[test]
    fn chained_merges_resolve() {
        let c = ComponentId::allocate();
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component(c, 5);
        reg.merge(3, 4).unwrap();
        reg.merge(2, 3).unwrap();
        reg.merge(1, 4).unwrap();
        assert_eq!(reg.find(4), Some(1));
        assert_eq!(reg.component_mesh_vertices(4).unwrap().len(), 4);
        assert_eq!(reg.unique_vertices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn set_unique_vertex_retires_empty_identity() {
        let c = ComponentId::allocate();
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component(c, 2);
        let shared = reg.create_unique_vertex();
        assert_eq!(shared, 2);
        reg.set_unique_vertex(ComponentMeshVertex::new(c, 0), shared)
            .unwrap();
        reg.set_unique_vertex(ComponentMeshVertex::new(c, 1), shared)
            .unwrap();
        assert_eq!(reg.nb_unique_vertices(), 1);
        assert_eq!(reg.find(0), None);
        assert_eq!(
            reg.component_mesh_vertices(0),
            Err(ModelError::UnknownUniqueVertex(0))
        );
        assert!(reg.check().is_ok());
    }

    #[test]
    fn unregister_retires_sole_members() {
        let (a, b) = (ComponentId::allocate(), ComponentId::allocate());
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component(a, 1);
        reg.register_component(b, 2);
        reg.merge(0, 1).unwrap();
        reg.unregister_component(b);
        assert_eq!(reg.nb_unique_vertices(), 1);
        assert_eq!(
            reg.component_mesh_vertices(0).unwrap(),
            &[ComponentMeshVertex::new(a, 0)]
        );
        assert_eq!(reg.unique_vertex(ComponentMeshVertex::new(b, 0)), None);
    }

    #[test]
    fn explicit_identities_are_kept() {
        let (a, b) = (ComponentId::allocate(), ComponentId::allocate());
        let mut reg = UniqueVertexRegistry::new();
        reg.register_component_with(a, &[1]).unwrap();
        reg.register_component_with(b, &[0, 2, 1]).unwrap();
        assert_eq!(reg.unique_vertices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(reg.nb_unique_vertices(), 3);
        assert_eq!(
            reg.component_mesh_vertices(1).unwrap(),
            &[ComponentMeshVertex::new(a, 0), ComponentMeshVertex::new(b, 2)]
        );
        assert_eq!(reg.unique_vertex(ComponentMeshVertex::new(b, 1)), Some(2));
        assert!(reg.check().is_ok());
    }

    #[test]
    fn unknown_identity_errors() {
        let mut reg = UniqueVertexRegistry::new();
        assert_eq!(reg.merge(0, 1), Err(ModelError::UnknownUniqueVertex(0)));
        let c = ComponentId::allocate();
        let uid = reg.create_unique_vertex();
        assert_eq!(
            reg.set_unique_vertex(ComponentMeshVertex::new(c, 0), uid),
            Err(ModelError::UnknownIdentifier(c))
        );
        // a memberless identity is not a valid final state
        assert!(reg.check().is_err());
    }
}
