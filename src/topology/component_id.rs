//! `ComponentId`: a strong, zero-cost handle for model components
//!
//! Every component of a model (corner, line, surface, block) is addressed by
//! an opaque identifier. `ComponentId` wraps a nonzero `u64` so that 0 stays
//! reserved as an invalid value and `Option<ComponentId>` costs nothing.
//!
//! Identifiers are drawn from a process-wide monotonic counter: they are
//! never reused, identifiers from two different models never alias, and
//! sorting by identifier yields creation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque component identifier.
///
/// `repr(transparent)` keeps the same layout as `u64`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentId(NonZeroU64);

impl ComponentId {
    /// Allocates a fresh identifier, distinct from every identifier handed
    /// out before in this process.
    pub fn allocate() -> Self {
        let raw = NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 allocations to wrap.
        ComponentId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MAX))
    }

    /// Returns the inner `u64` value of this identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentId").field(&self.get()).finish()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.get())
    }
}

/// The four kinds of model components, ordered by topological dimension.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// 0D component: a single point.
    Corner,
    /// 1D component: a polyline made of edges.
    Line,
    /// 2D component: a polygonal surface.
    Surface,
    /// 3D component: a polyhedral solid.
    Block,
}

impl ComponentKind {
    /// All kinds, lowest dimension first.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Corner,
        ComponentKind::Line,
        ComponentKind::Surface,
        ComponentKind::Block,
    ];

    /// Topological dimension of the kind.
    pub const fn dimension(self) -> u8 {
        match self {
            ComponentKind::Corner => 0,
            ComponentKind::Line => 1,
            ComponentKind::Surface => 2,
            ComponentKind::Block => 3,
        }
    }

    /// Kind with the given dimension, if any.
    pub fn from_dimension(dimension: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dimension() == dimension)
    }

    /// Kind whose components bound this one (one dimension lower).
    pub fn boundary_kind(self) -> Option<Self> {
        self.dimension()
            .checked_sub(1)
            .and_then(Self::from_dimension)
    }

    /// Kind whose components this one bounds (one dimension higher).
    pub fn incidence_kind(self) -> Option<Self> {
        Self::from_dimension(self.dimension() + 1)
    }
}

/// A mesh-local vertex of a given component.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ComponentMeshVertex {
    /// Owning component.
    pub component: ComponentId,
    /// Vertex index inside the component mesh.
    pub vertex: u32,
}

impl ComponentMeshVertex {
    pub fn new(component: ComponentId, vertex: u32) -> Self {
        Self { component, vertex }
    }
}
