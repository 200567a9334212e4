use geomodel::mesh::{EdgedCurve, PolygonalSurface};
use geomodel::mesh_error::ModelError;
use geomodel::model::Model;
use geomodel::topology::{ComponentId, ComponentMeshVertex};
use proptest::prelude::*;

/// Section with `n` corners, `n` lines and 2 surfaces, no relations.
fn loose_section(n: usize) -> (Model, Vec<ComponentId>, Vec<ComponentId>, Vec<ComponentId>) {
    let mut model = Model::section();
    let corners = (0..n)
        .map(|i| model.add_corner([i as f64, 0.0, 0.0]).unwrap())
        .collect();
    let lines = (0..n)
        .map(|i| {
            let y = i as f64;
            model
                .add_line(EdgedCurve::polyline(vec![[0.0, y, 0.0], [1.0, y, 0.0], [2.0, y, 0.0]]))
                .unwrap()
        })
        .collect();
    let surfaces = (0..2)
        .map(|_| {
            model
                .add_surface(PolygonalSurface::from_polygons(
                    vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                    &[[0u32, 1, 2]],
                ))
                .unwrap()
        })
        .collect();
    (model, corners, lines, surfaces)
}

proptest! {
    #[test]
    fn relations_stay_symmetric(
        ops in prop::collection::vec((any::<bool>(), 0usize..4, 0usize..4, any::<bool>()), 0..40)
    ) {
        let (mut model, corners, lines, surfaces) = loose_section(4);
        for (add, a, b, upper) in ops {
            let (higher, lower) = if upper {
                (surfaces[a % 2], lines[b])
            } else {
                (lines[a], corners[b])
            };
            if add {
                model.add_relation(higher, lower).unwrap();
            } else {
                model.remove_relation(higher, lower).unwrap();
            }
        }
        for c in model.components() {
            for b in model.boundaries(c.id()).unwrap() {
                prop_assert!(model.incidences(*b).unwrap().contains(&c.id()));
            }
            for i in model.incidences(c.id()).unwrap() {
                prop_assert!(model.boundaries(*i).unwrap().contains(&c.id()));
            }
        }
        prop_assert!(model.is_valid());
    }

    #[test]
    fn merges_are_idempotent(pairs in prop::collection::vec((0usize..12, 0usize..12), 1..20)) {
        let (mut model, _, lines, _) = loose_section(4);
        let cmvs: Vec<_> = lines
            .iter()
            .flat_map(|l| (0..3).map(move |v| ComponentMeshVertex::new(*l, v)))
            .collect();
        for (a, b) in &pairs {
            let ua = model.unique_vertex(cmvs[*a]).unwrap();
            let ub = model.unique_vertex(cmvs[*b]).unwrap();
            let survivor = model.merge_unique_vertices(ua, ub).unwrap();
            prop_assert_eq!(survivor, ua.min(ub));

            let classes: Vec<_> = model
                .unique_vertices()
                .map(|u| model.component_mesh_vertices(u).unwrap().to_vec())
                .collect();
            let nb = model.nb_unique_vertices();
            // merging again changes nothing
            prop_assert_eq!(model.merge_unique_vertices(ua, ub).unwrap(), survivor);
            prop_assert_eq!(model.nb_unique_vertices(), nb);
            let again: Vec<_> = model
                .unique_vertices()
                .map(|u| model.component_mesh_vertices(u).unwrap().to_vec())
                .collect();
            prop_assert_eq!(again, classes);
            prop_assert_eq!(model.unique_vertex(cmvs[*a]), model.unique_vertex(cmvs[*b]));
        }
        let total: usize = model
            .unique_vertices()
            .map(|u| model.component_mesh_vertices(u).unwrap().len())
            .sum();
        prop_assert_eq!(total, 4 + cmvs.len());
        prop_assert!(model.is_valid());
    }
}

#[test]
fn removal_cascades_and_retires_identifier() {
    let mut model = Model::section();
    let a = model.add_corner([0.0, 0.0, 0.0]).unwrap();
    let b = model.add_corner([1.0, 0.0, 0.0]).unwrap();
    let line = model
        .add_line(EdgedCurve::polyline(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]))
        .unwrap();
    model.add_relation(line, a).unwrap();
    model.add_relation(line, b).unwrap();
    let ua = model.unique_vertex(ComponentMeshVertex::new(a, 0)).unwrap();
    model
        .set_unique_vertex(ComponentMeshVertex::new(line, 0), ua)
        .unwrap();

    let removed = model.remove_component(line).unwrap();
    assert_eq!(removed.id(), line);
    assert_eq!(model.nb_incidences(a).unwrap(), 0);
    assert_eq!(model.nb_incidences(b).unwrap(), 0);
    assert_eq!(
        model.component_mesh_vertices(ua).unwrap(),
        &[ComponentMeshVertex::new(a, 0)]
    );
    assert_eq!(model.nb_unique_vertices(), 2);

    assert_eq!(model.boundaries(line), Err(ModelError::UnknownIdentifier(line)));
    assert_eq!(
        model.add_relation(line, a),
        Err(ModelError::UnknownIdentifier(line))
    );
    assert!(matches!(
        model.remove_component(line),
        Err(ModelError::UnknownIdentifier(_))
    ));
    assert!(model.is_valid());
}

#[test]
fn relations_respect_dimensions() {
    let (mut model, corners, lines, surfaces) = loose_section(2);
    assert!(matches!(
        model.add_relation(surfaces[0], corners[0]),
        Err(ModelError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        model.add_relation(corners[0], lines[0]),
        Err(ModelError::DimensionMismatch { .. })
    ));
    // sections have no blocks
    assert!(matches!(
        model.add_block(geomodel::mesh::PolyhedralSolid::default()),
        Err(ModelError::UnsupportedComponent { .. })
    ));
    assert!(model.is_valid());
}
