#![allow(dead_code)]
//! Generators for the scenario files used by the integration tests.

use geomodel::mesh::PolygonalSurface;
use geomodel::model::Model;
use geomodel::topology::{ComponentId, ComponentKind};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Per-component fingerprint independent of identifier values:
/// `(kind dimension, name, nb vertices, nb elements, boundaries, incidences)`
/// where relations are given as `(dimension, position within kind)`.
pub type ComponentSignature = (u8, Option<String>, usize, usize, Vec<(u8, usize)>, Vec<(u8, usize)>);

pub fn signature(model: &Model) -> Vec<ComponentSignature> {
    let mut position: HashMap<ComponentId, (u8, usize)> = HashMap::new();
    for kind in ComponentKind::ALL {
        for (i, c) in model.components_of(kind).enumerate() {
            position.insert(c.id(), (kind.dimension(), i));
        }
    }
    let positions = |ids: &[ComponentId]| {
        let mut out: Vec<_> = ids.iter().map(|id| position[id]).collect();
        out.sort_unstable();
        out
    };
    model
        .components()
        .map(|c| {
            (
                c.kind().dimension(),
                c.name().map(str::to_owned),
                c.mesh().nb_vertices(),
                c.mesh().nb_elements(),
                positions(model.boundaries(c.id()).unwrap()),
                positions(model.incidences(c.id()).unwrap()),
            )
        })
        .collect()
}

/// Sorted sizes of every unique-vertex equivalence class.
pub fn class_sizes(model: &Model) -> Vec<usize> {
    let mut sizes: Vec<usize> = model
        .unique_vertices()
        .map(|uid| model.component_mesh_vertices(uid).unwrap().len())
        .collect();
    sizes.sort_unstable();
    sizes
}

/// Members of every unique vertex as `(dimension, position within kind, local vertex)`.
pub fn members(model: &Model) -> Vec<(u32, Vec<(u8, usize, u32)>)> {
    let mut position: HashMap<ComponentId, (u8, usize)> = HashMap::new();
    for kind in ComponentKind::ALL {
        for (i, c) in model.components_of(kind).enumerate() {
            position.insert(c.id(), (kind.dimension(), i));
        }
    }
    model
        .unique_vertices()
        .map(|uid| {
            let mut class: Vec<_> = model
                .component_mesh_vertices(uid)
                .unwrap()
                .iter()
                .map(|cmv| {
                    let (dim, i) = position[&cmv.component];
                    (dim, i, cmv.vertex)
                })
                .collect();
            class.sort_unstable();
            (uid, class)
        })
        .collect()
}

/// Fresh path in the system temp directory.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("geomodel-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

/// Gmsh nodes keyed by position; positions are given in eighths of the unit cube.
#[derive(Default)]
struct MshNodes {
    ids: HashMap<[i64; 3], usize>,
    points: Vec<[f64; 3]>,
}

impl MshNodes {
    fn at(&mut self, p: [f64; 3]) -> usize {
        let key = p.map(|c| (c * 2.0).round() as i64);
        *self.ids.entry(key).or_insert_with(|| {
            self.points.push(p.map(|c| c / 8.0));
            self.points.len()
        })
    }
}

fn on_face(axis: usize, side: f64, u: f64, v: f64) -> [f64; 3] {
    match axis {
        0 => [side, u, v],
        1 => [u, side, v],
        _ => [u, v, side],
    }
}

fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, (a[2] + b[2]) / 2.0]
}

/// Tetrahedralized unit cube in Gmsh 2.2 format.
///
/// - 8 point entities and 12 edges of 4 segments (5 nodes each).
/// - 6 faces on a 4 x 4 grid where the 4 central cells are split around a
///   centre node: 29 nodes and 40 triangles per face.
/// - One volume of 131 nodes and 364 tetrahedra. The boundary is coned from
///   the cube centre, each face pyramid is re-coned from an inner node
///   (+16 tetrahedra per face), and on the two faces normal to x a 3 x 4 cell
///   patch is re-coned once more (+14 each).
///
/// There is no `$Entities` section, so relations have to be inferred from
/// shared nodes.
pub fn cube_msh_v2() -> String {
    let mut nodes = MshNodes::default();
    // (type, entity, nodes)
    let mut elements: Vec<(u32, usize, Vec<usize>)> = Vec::new();
    let ends = [0.0, 8.0];

    let mut entity = 0;
    for &z in &ends {
        for &y in &ends {
            for &x in &ends {
                entity += 1;
                elements.push((15, entity, vec![nodes.at([x, y, z])]));
            }
        }
    }
    entity = 0;
    for axis in 0..3 {
        for &a in &ends {
            for &b in &ends {
                entity += 1;
                let at = |t: f64| match axis {
                    0 => [t, a, b],
                    1 => [a, t, b],
                    _ => [a, b, t],
                };
                for t in 0..4 {
                    let (t0, t1) = (2.0 * t as f64, 2.0 * t as f64 + 2.0);
                    elements.push((1, entity, vec![nodes.at(at(t0)), nodes.at(at(t1))]));
                }
            }
        }
    }

    let centre = nodes.at([4.0, 4.0, 4.0]);
    let mut tets: Vec<Vec<usize>> = Vec::new();
    entity = 0;
    for axis in 0..3 {
        for &side in &ends {
            entity += 1;
            let f = |u: f64, v: f64| on_face(axis, side, u, v);
            let apex = midpoint([4.0; 3], f(4.0, 4.0));
            let patch = (axis == 0).then(|| midpoint(apex, f(3.0, 4.0)));
            let inner = nodes.at(apex);
            let patch_apex = patch.map(|p| nodes.at(p));

            for j in 0..4 {
                for i in 0..4 {
                    let (u, v) = (2.0 * i as f64, 2.0 * j as f64);
                    let [a, b, c, d] =
                        [f(u, v), f(u + 2.0, v), f(u + 2.0, v + 2.0), f(u, v + 2.0)]
                            .map(|p| nodes.at(p));
                    let triangles = if (1..3).contains(&i) && (1..3).contains(&j) {
                        let m = nodes.at(f(u + 1.0, v + 1.0));
                        vec![[a, b, m], [b, c, m], [c, d, m], [d, a, m]]
                    } else {
                        vec![[a, b, c], [a, c, d]]
                    };
                    let cone = match patch_apex {
                        Some(q) if i < 3 => q,
                        _ => inner,
                    };
                    for t in triangles {
                        elements.push((2, entity, t.to_vec()));
                        tets.push(vec![cone, t[0], t[1], t[2]]);
                    }
                }
            }

            // boundary segments of the face and of the re-coned patch
            let segments = |width: usize, height: usize| {
                let (w, h) = (2.0 * width as f64, 2.0 * height as f64);
                let mut out = Vec::new();
                for k in 0..width {
                    let u = 2.0 * k as f64;
                    out.push((f(u, 0.0), f(u + 2.0, 0.0)));
                    out.push((f(u, h), f(u + 2.0, h)));
                }
                for k in 0..height {
                    let v = 2.0 * k as f64;
                    out.push((f(0.0, v), f(0.0, v + 2.0)));
                    out.push((f(w, v), f(w, v + 2.0)));
                }
                out
            };
            for (p, q) in segments(4, 4) {
                tets.push(vec![centre, inner, nodes.at(p), nodes.at(q)]);
            }
            if let Some(q_apex) = patch_apex {
                for (p, q) in segments(3, 4) {
                    tets.push(vec![inner, q_apex, nodes.at(p), nodes.at(q)]);
                }
            }
        }
    }
    elements.extend(tets.into_iter().map(|t| (4, 1, t)));

    let mut out = String::from("$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n");
    writeln!(out, "{}", nodes.points.len()).unwrap();
    for (i, p) in nodes.points.iter().enumerate() {
        writeln!(out, "{} {} {} {}", i + 1, p[0], p[1], p[2]).unwrap();
    }
    out.push_str("$EndNodes\n$Elements\n");
    writeln!(out, "{}", elements.len()).unwrap();
    for (id, (ty, entity, nodes)) in elements.iter().enumerate() {
        write!(out, "{} {ty} 2 {entity} {entity}", id + 1).unwrap();
        for v in nodes {
            write!(out, " {v}").unwrap();
        }
        out.push('\n');
    }
    out.push_str("$EndElements\n");
    out
}

/// 27 disjoint closed rectangles plus a square drawn as four open segments.
pub fn section_svg() -> String {
    let mut out = String::from(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="100">
<g id="rectangles">
"#,
    );
    for row in 0..3 {
        for col in 0..9 {
            let (x, y) = (col as f64 * 20.0, row as f64 * 20.0);
            writeln!(out, r#"  <path d="M {x} {y} h 12 v 8 h -12 z"/>"#).unwrap();
        }
    }
    out.push_str(
        r#"</g>
<g id="loop">
  <path d="M 200 0 L 250 0"/>
  <path d="M250,0 250,50"/>
  <path d="m 250 50 l -25 0 l -25 0"/>
  <path d="M 200 50 V 0"/>
</g>
</svg>
"#,
    );
    out
}

/// Triangulated `nx * ny` grid in the `z = 0` plane.
pub fn grid_surface(nx: usize, ny: usize) -> PolygonalSurface {
    let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            points.push([i as f64, j as f64, 0.0]);
        }
    }
    let v = |i: usize, j: usize| (i + (nx + 1) * j) as u32;
    let mut triangles = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            triangles.push([v(i, j), v(i + 1, j), v(i + 1, j + 1)]);
            triangles.push([v(i, j), v(i + 1, j + 1), v(i, j + 1)]);
        }
    }
    PolygonalSurface::from_polygons(points, &triangles)
}

/// Closed triangulated shell: two poles and `rings` rings of `segments`
/// vertices, so `nb_polygons == 2 * nb_vertices - 4`.
pub fn closed_shell(segments: usize, rings: usize) -> PolygonalSurface {
    use std::f64::consts::PI;
    let mut points = vec![[0.0, 0.0, 1.0]];
    for r in 0..rings {
        let theta = PI * (r + 1) as f64 / (rings + 1) as f64;
        for s in 0..segments {
            let phi = 2.0 * PI * s as f64 / segments as f64;
            points.push([theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()]);
        }
    }
    let south = points.len() as u32;
    points.push([0.0, 0.0, -1.0]);

    let v = |r: usize, s: usize| (1 + r * segments + s % segments) as u32;
    let mut triangles = Vec::with_capacity(2 * segments * rings);
    for s in 0..segments {
        triangles.push([0, v(0, s), v(0, s + 1)]);
        triangles.push([south, v(rings - 1, s + 1), v(rings - 1, s)]);
    }
    for r in 0..rings - 1 {
        for s in 0..segments {
            triangles.push([v(r, s), v(r + 1, s), v(r + 1, s + 1)]);
            triangles.push([v(r, s), v(r + 1, s + 1), v(r, s + 1)]);
        }
    }
    PolygonalSurface::from_polygons(points, &triangles)
}

/// Strip of `sizes.len()` polygons glued along vertical edges; polygon `i`
/// has `sizes[i]` vertices, the extra ones bending its bottom side.
pub fn polygon_strip(sizes: &[usize]) -> PolygonalSurface {
    let mut surface = PolygonalSurface::default();
    let mut left = [surface.add_point([0.0, 0.0, 0.0]), surface.add_point([0.0, 1.0, 0.0])];
    for (i, size) in sizes.iter().enumerate() {
        let x = i as f64;
        let extra = size - 4;
        let mut polygon = vec![left[0]];
        for k in 1..=extra {
            let t = k as f64 / (extra + 1) as f64;
            polygon.push(surface.add_point([x + t, -0.5 * (t * (1.0 - t)), 0.0]));
        }
        let right = [
            surface.add_point([x + 1.0, 0.0, 0.0]),
            surface.add_point([x + 1.0, 1.0, 0.0]),
        ];
        polygon.extend([right[0], right[1], left[1]]);
        surface.add_polygon(&polygon);
        left = right;
    }
    surface
}

/// `n * n` grid mixing polygon shapes, cells taken in row order: the first
/// `nb_split` are split in 4 triangles around a centre vertex, the next
/// `nb_diagonal` in 2 triangles, the rest stay quadrangles.
pub fn mixed_grid(n: usize, nb_split: usize, nb_diagonal: usize) -> PolygonalSurface {
    let mut surface = PolygonalSurface::default();
    for j in 0..=n {
        for i in 0..=n {
            surface.add_point([i as f64, j as f64, 0.0]);
        }
    }
    let v = |i: usize, j: usize| (i + (n + 1) * j) as u32;
    for j in 0..n {
        for i in 0..n {
            let cell = i + n * j;
            let [a, b, c, d] = [v(i, j), v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)];
            if cell < nb_split {
                let m = surface.add_point([i as f64 + 0.5, j as f64 + 0.5, 0.0]);
                for polygon in [[a, b, m], [b, c, m], [c, d, m], [d, a, m]] {
                    surface.add_polygon(&polygon);
                }
            } else if cell < nb_split + nb_diagonal {
                surface.add_polygon(&[a, b, c]);
                surface.add_polygon(&[a, c, d]);
            } else {
                surface.add_polygon(&[a, b, c, d]);
            }
        }
    }
    surface
}

pub fn ply_ascii(surface: &PolygonalSurface) -> Vec<u8> {
    let mut out = format!(
        "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nelement face {}\nproperty list uchar int vertex_indices\nend_header\n",
        surface.nb_vertices(),
        surface.nb_polygons()
    );
    for p in &surface.points {
        writeln!(out, "{} {} {}", p[0], p[1], p[2]).unwrap();
    }
    for polygon in surface.polygons() {
        write!(out, "{}", polygon.len()).unwrap();
        for v in polygon {
            write!(out, " {v}").unwrap();
        }
        out.push('\n');
    }
    out.into_bytes()
}

pub fn ply_binary_le(surface: &PolygonalSurface) -> Vec<u8> {
    let mut out = format!(
        "ply\nformat binary_little_endian 1.0\nelement vertex {}\nproperty double x\nproperty double y\nproperty double z\nelement face {}\nproperty list uchar uint vertex_indices\nend_header\n",
        surface.nb_vertices(),
        surface.nb_polygons()
    )
    .into_bytes();
    for p in &surface.points {
        for c in p {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }
    for polygon in surface.polygons() {
        out.push(polygon.len() as u8);
        for v in polygon {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

fn vtp_arrays(surface: &PolygonalSurface) -> (Vec<f64>, Vec<u32>, Vec<u32>) {
    let coords = surface.points.iter().flatten().copied().collect();
    let mut connectivity = Vec::new();
    let mut offsets = Vec::new();
    for polygon in surface.polygons() {
        connectivity.extend_from_slice(polygon);
        offsets.push(connectivity.len() as u32);
    }
    (coords, connectivity, offsets)
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(T::to_string).collect::<Vec<_>>().join(" ")
}

pub fn vtp_ascii(surface: &PolygonalSurface) -> String {
    let (coords, connectivity, offsets) = vtp_arrays(surface);
    format!(
        r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="0.1" byte_order="LittleEndian">
  <PolyData>
    <Piece NumberOfPoints="{}" NumberOfPolys="{}">
      <Points>
        <DataArray type="Float64" NumberOfComponents="3" format="ascii">{}</DataArray>
      </Points>
      <Polys>
        <DataArray type="UInt32" Name="connectivity" format="ascii">{}</DataArray>
        <DataArray type="UInt32" Name="offsets" format="ascii">{}</DataArray>
      </Polys>
    </Piece>
  </PolyData>
</VTKFile>
"#,
        surface.nb_vertices(),
        surface.nb_polygons(),
        join(&coords),
        join(&connectivity),
        join(&offsets)
    )
}

/// Appended base64 data with `UInt64` headers, header and data encoded as
/// one stream.
pub fn vtp_appended(surface: &PolygonalSurface) -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let (coords, connectivity, offsets) = vtp_arrays(surface);
    let encode = |data: Vec<u8>| {
        let mut block = (data.len() as u64).to_le_bytes().to_vec();
        block.extend(data);
        STANDARD.encode(block)
    };
    let points = encode(coords.iter().flat_map(|c| c.to_le_bytes()).collect());
    let conn = encode(connectivity.iter().flat_map(|c| c.to_le_bytes()).collect());
    let offs = encode(offsets.iter().flat_map(|c| c.to_le_bytes()).collect());
    format!(
        r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="1.0" byte_order="LittleEndian" header_type="UInt64">
  <PolyData>
    <Piece NumberOfPoints="{}" NumberOfPolys="{}">
      <Points>
        <DataArray type="Float64" NumberOfComponents="3" format="appended" offset="0"/>
      </Points>
      <Polys>
        <DataArray type="UInt32" Name="connectivity" format="appended" offset="{}"/>
        <DataArray type="UInt32" Name="offsets" format="appended" offset="{}"/>
      </Polys>
    </Piece>
  </PolyData>
  <AppendedData encoding="base64">
   _{points}{conn}{offs}
  </AppendedData>
</VTKFile>
"#,
        surface.nb_vertices(),
        surface.nb_polygons(),
        points.len(),
        points.len() + conn.len()
    )
}
