//! Boundary/incidence relation store between model components.
//!
//! [`TopologyGraph`] keeps two mirrored adjacency maps keyed by
//! [`ComponentId`]: the *boundaries* of a component (arrows towards the
//! dimension below) and its *incidences* (arrows from the dimension above).
//! Both views are updated together by every mutator so a lookup in either
//! direction is a single hash lookup.

use crate::mesh_error::ModelError;
use crate::topology::component_id::{ComponentId, ComponentKind};
use std::collections::HashMap;

/// Directed relation store: `higher -> lower` means "lower bounds higher".
#[derive(Clone, Debug, Default)]
pub struct TopologyGraph {
    /// Kind of every registered component.
    kinds: HashMap<ComponentId, ComponentKind>,
    /// Outgoing adjacency: component -> lower-dimension components bounding it.
    boundaries: HashMap<ComponentId, Vec<ComponentId>>,
    /// Incoming adjacency: component -> higher-dimension components it bounds.
    incidences: HashMap<ComponentId, Vec<ComponentId>>,
}

impl TopologyGraph {
    /// Creates a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `id` known to the graph with the given kind.
    ///
    /// Registering an already known identifier keeps its existing relations.
    pub fn register(&mut self, id: ComponentId, kind: ComponentKind) {
        self.kinds.insert(id, kind);
        self.boundaries.entry(id).or_default();
        self.incidences.entry(id).or_default();
    }

    /// Whether `id` is registered.
    #[inline]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.kinds.contains_key(&id)
    }

    /// Kind of a registered component.
    pub fn kind(&self, id: ComponentId) -> Result<ComponentKind, ModelError> {
        self.kinds
            .get(&id)
            .copied()
            .ok_or(ModelError::UnknownIdentifier(id))
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Adds the relation "`lower` bounds `higher`".
    ///
    /// Fails with [`ModelError::DimensionMismatch`] unless `higher` is exactly
    /// one dimension above `lower`. Adding an existing relation is a no-op.
    ///
    /// # Example
    /// ```rust
    /// use geomodel::topology::component_id::{ComponentId, ComponentKind};
    /// use geomodel::topology::relations::TopologyGraph;
    /// let (corner, line) = (ComponentId::allocate(), ComponentId::allocate());
    /// let mut graph = TopologyGraph::new();
    /// graph.register(corner, ComponentKind::Corner);
    /// graph.register(line, ComponentKind::Line);
    /// graph.add_relation(line, corner).unwrap();
    /// graph.add_relation(line, corner).unwrap();
    /// assert_eq!(graph.nb_boundaries(line).unwrap(), 1);
    /// assert!(graph.add_relation(corner, line).is_err());
    /// ```
    pub fn add_relation(&mut self, higher: ComponentId, lower: ComponentId) -> Result<(), ModelError> {
        let higher_kind = self.kind(higher)?;
        let lower_kind = self.kind(lower)?;
        if higher_kind.dimension() != lower_kind.dimension() + 1 {
            return Err(ModelError::DimensionMismatch {
                higher,
                lower,
                higher_dim: higher_kind.dimension(),
                lower_dim: lower_kind.dimension(),
            });
        }
        if self.has_relation(higher, lower) {
            return Ok(());
        }

        self.boundaries.entry(higher).or_default().push(lower);
        self.incidences.entry(lower).or_default().push(higher);

        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
        Ok(())
    }

    /// Removes the relation between `higher` and `lower`, returning whether it existed.
    pub fn remove_relation(&mut self, higher: ComponentId, lower: ComponentId) -> bool {
        let removed = match self.boundaries.get_mut(&higher) {
            Some(outs) => {
                let before = outs.len();
                outs.retain(|l| *l != lower);
                before != outs.len()
            }
            None => false,
        };
        if removed {
            if let Some(ins) = self.incidences.get_mut(&lower) {
                ins.retain(|h| *h != higher);
            }
        }
        removed
    }

    #[inline]
    pub fn has_relation(&self, higher: ComponentId, lower: ComponentId) -> bool {
        self.boundaries
            .get(&higher)
            .is_some_and(|v| v.contains(&lower))
    }

    /// Components bounding `id`, in insertion order.
    pub fn boundaries(&self, id: ComponentId) -> Result<&[ComponentId], ModelError> {
        self.boundaries
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(ModelError::UnknownIdentifier(id))
    }

    /// Components bounded by `id`, in insertion order.
    pub fn incidences(&self, id: ComponentId) -> Result<&[ComponentId], ModelError> {
        self.incidences
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(ModelError::UnknownIdentifier(id))
    }

    pub fn nb_boundaries(&self, id: ComponentId) -> Result<usize, ModelError> {
        self.boundaries(id).map(<[_]>::len)
    }

    pub fn nb_incidences(&self, id: ComponentId) -> Result<usize, ModelError> {
        self.incidences(id).map(<[_]>::len)
    }

    /// Removes `id` and every relation mentioning it.
    ///
    /// Returns the kind the component was registered with.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<ComponentKind, ModelError> {
        let kind = self
            .kinds
            .remove(&id)
            .ok_or(ModelError::UnknownIdentifier(id))?;
        for lower in self.boundaries.remove(&id).unwrap_or_default() {
            if let Some(ins) = self.incidences.get_mut(&lower) {
                ins.retain(|h| *h != id);
            }
        }
        for higher in self.incidences.remove(&id).unwrap_or_default() {
            if let Some(outs) = self.boundaries.get_mut(&higher) {
                outs.retain(|l| *l != id);
            }
        }

        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
        Ok(kind)
    }

    /// Iterates over every relation as `(higher, lower)`.
    pub fn relations(&self) -> impl Iterator<Item = (ComponentId, ComponentId)> + '_ {
        self.boundaries
            .iter()
            .flat_map(|(h, lows)| lows.iter().map(move |l| (*h, *l)))
    }

    /// Checks mirror consistency, returning the first broken relation.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (higher, lows) in &self.boundaries {
            for lower in lows {
                let mirrored = self
                    .incidences
                    .get(lower)
                    .is_some_and(|ins| ins.contains(higher));
                if !mirrored {
                    return Err(format!(
                        "boundary {lower} of {higher} is missing from its incidences"
                    ));
                }
            }
        }
        for (lower, highs) in &self.incidences {
            for higher in highs {
                let mirrored = self
                    .boundaries
                    .get(higher)
                    .is_some_and(|outs| outs.contains(lower));
                if !mirrored {
                    return Err(format!(
                        "incidence {higher} of {lower} is missing from its boundaries"
                    ));
                }
            }
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    pub fn debug_assert_consistent(&self) {
        if let Err(msg) = self.check_consistency() {
            debug_assert!(false, "relation mirror broken: {msg}");
        }
    }
}
