//! Model invariant checks.
//!
//! Checks run in a fixed order and stop at the first violation:
//! 1. relation mirrors agree (boundaries vs incidences)
//! 2. each component is supported by the model kind, registered with the
//!    graph under its own kind, and its mesh is structurally valid
//! 3. corners carry exactly one vertex and have no boundary
//! 4. every relation joins adjacent dimensions
//! 5. top-dimension components have no incidence
//! 6. every mesh vertex maps to a live unique vertex and every live unique
//!    vertex has members

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::ModelError;
use crate::model::Model;
use crate::topology::component_id::ComponentKind;

impl DebugInvariants for Model {
    fn debug_assert_invariants(&self) {
        if let Err(e) = self.validate_invariants() {
            debug_assert!(false, "model invalid: {e}");
        }
    }

    fn validate_invariants(&self) -> Result<(), ModelError> {
        let graph = self.graph();
        graph
            .check_consistency()
            .map_err(ModelError::InvalidModel)?;

        let nb_components: usize = ComponentKind::ALL
            .into_iter()
            .map(|k| self.nb_components(k))
            .sum();
        if nb_components != graph.len() {
            return Err(ModelError::InvalidModel(format!(
                "{nb_components} components but {} registered in the relation graph",
                graph.len()
            )));
        }

        let top = self.kind().top_kind();
        for component in self.components() {
            let id = component.id();
            let kind = component.kind();
            if !self.kind().supports(kind) {
                return Err(ModelError::InvalidModel(format!(
                    "{kind:?} {id} in a {:?} model",
                    self.kind()
                )));
            }
            if graph.kind(id)? != kind {
                return Err(ModelError::InvalidModel(format!(
                    "{id} is registered with a different kind than its mesh"
                )));
            }
            component
                .mesh()
                .check()
                .map_err(|e| ModelError::InvalidModel(format!("mesh of {id}: {e}")))?;

            if kind == ComponentKind::Corner {
                if component.mesh().nb_vertices() != 1 {
                    return Err(ModelError::InvalidModel(format!(
                        "corner {id} has {} vertices",
                        component.mesh().nb_vertices()
                    )));
                }
                if graph.nb_boundaries(id)? != 0 {
                    return Err(ModelError::InvalidModel(format!(
                        "corner {id} has boundaries"
                    )));
                }
            }
            for lower in graph.boundaries(id)? {
                let lower_kind = graph.kind(*lower)?;
                if kind.dimension() != lower_kind.dimension() + 1 {
                    return Err(ModelError::InvalidModel(format!(
                        "relation {id} -> {lower} joins dimensions {} and {}",
                        kind.dimension(),
                        lower_kind.dimension()
                    )));
                }
            }
            if kind == top && graph.nb_incidences(id)? != 0 {
                return Err(ModelError::InvalidModel(format!(
                    "top-dimension {kind:?} {id} has incidences"
                )));
            }

            let registered = self.registry().nb_component_vertices(id).unwrap_or(0);
            if registered != component.mesh().nb_vertices() {
                return Err(ModelError::InvalidModel(format!(
                    "{id} has {} mesh vertices but {registered} registered vertices",
                    component.mesh().nb_vertices()
                )));
            }
        }

        self.registry()
            .check()
            .map_err(ModelError::InvalidModel)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::EdgedCurve;
    use crate::mesh_error::ModelError;
    use crate::model::Model;

    #[test]
    fn dangling_unique_vertex_is_reported() {
        let mut model = Model::section();
        model.add_corner([0.0; 3]).unwrap();
        assert!(model.is_valid());
        model.create_unique_vertex();
        assert!(matches!(model.validate(), Err(ModelError::InvalidModel(_))));
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
    #[should_panic(expected = "[invariants] add_component")]
    fn dangling_unique_vertex_panics_on_next_insertion() {
        let mut model = Model::section();
        model.create_unique_vertex();
        model.add_corner([0.0; 3]).unwrap();
    }

    #[test]
    fn relations_keep_model_valid() {
        let mut model = Model::brep();
        let c = model.add_corner([0.0; 3]).unwrap();
        let l = model
            .add_line(EdgedCurve::polyline(vec![[0.0; 3], [1.0, 0.0, 0.0]]))
            .unwrap();
        model.add_relation(l, c).unwrap();
        assert!(model.validate().is_ok());
        model.remove_component(c).unwrap();
        assert!(model.validate().is_ok());
        assert_eq!(model.nb_boundaries(l).unwrap(), 0);
    }
}
