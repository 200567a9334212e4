//! Gmsh `.msh` reader and writer for BRep models.
//!
//! # Supported format
//! - ASCII `.msh` versions **2.x** and **4.x** (read), **4.1** (write).
//! - Element types: 1 (line), 2 (triangle), 3 (quad), 4 (tet), 5 (hex),
//!   6 (prism), 7 (pyramid), 15 (point).
//! - `$PhysicalNames` become component names.
//! - v4 `$Entities` give the boundary relations; without them (v2 files) a
//!   lower-dimension component bounds a higher one when every one of its
//!   nodes is also used by the higher component.
//!
//! Every elementary entity carrying elements becomes one component, nodes are
//! deduplicated inside each component and a node shared by several
//! components maps to one unique vertex.
//!
//! # Limitations
//! - Binary files are not supported.
//! - Higher-order elements are not supported.

use crate::io::{ModelReader, ModelWriter, parse_token};
use crate::mesh::{
    CellType, EdgedCurve, MeshEntity, PointSet, PolygonalSurface, PolyhedralSolid, Polyhedron,
};
use crate::mesh_error::ModelError;
use crate::model::{Model, ModelKind};
use crate::topology::component_id::{ComponentId, ComponentKind};
use crate::topology::unique_vertices::UniqueVertexId;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Read, Write};

/// Optional settings for Gmsh import.
#[derive(Debug, Clone, Copy)]
pub struct GmshReadOptions {
    /// Infer relations from shared nodes even when the file has `$Entities`.
    pub infer_relations: bool,
    /// Name components after their physical group.
    pub physical_names: bool,
}

impl Default for GmshReadOptions {
    fn default() -> Self {
        Self {
            infer_relations: false,
            physical_names: true,
        }
    }
}

/// Gmsh `.msh` reader producing BRep models.
#[derive(Debug, Default, Clone)]
pub struct GmshReader {
    pub options: GmshReadOptions,
}

/// Gmsh `.msh` 4.1 writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct GmshWriter;

fn parse_error(msg: impl Into<String>) -> ModelError {
    ModelError::GeometryImport(msg.into())
}

/// Whitespace token stream over the body of one section.
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            inner: body.split_whitespace(),
        }
    }

    fn next<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, ModelError> {
        parse_token(self.inner.next(), what)
    }

    fn skip(&mut self, count: usize) -> Result<(), ModelError> {
        for _ in 0..count {
            self.inner
                .next()
                .ok_or_else(|| parse_error("unexpected end of section"))?;
        }
        Ok(())
    }
}

/// `(dimension, elementary tag)`
type EntityKey = (u8, i64);

#[derive(Debug, Default)]
struct EntityInfo {
    physical_tags: Vec<i64>,
    boundaries: Vec<i64>,
}

#[derive(Debug, Default)]
struct ElementGroup {
    cells: Vec<(CellType, Vec<u64>)>,
    physical: Option<i64>,
}

#[derive(Debug, Default)]
struct MshContents {
    major: u32,
    minor: u32,
    physical_names: HashMap<(u8, i64), String>,
    entities: Option<BTreeMap<EntityKey, EntityInfo>>,
    nodes: HashMap<u64, [f64; 3]>,
    groups: BTreeMap<EntityKey, ElementGroup>,
}

/// Splits the file into `(section name, body)` pairs.
fn sections(contents: &str) -> Result<Vec<(&str, &str)>, ModelError> {
    let mut out = Vec::new();
    let mut rest = contents;
    while let Some(start) = rest.find('$') {
        let after = &rest[start + 1..];
        let name_end = after
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after.len());
        let name = &after[..name_end];
        let end_tag = format!("$End{name}");
        let body_start = name_end;
        let end = after[body_start..]
            .find(&end_tag)
            .ok_or_else(|| parse_error(format!("missing {end_tag}")))?;
        out.push((name, &after[body_start..body_start + end]));
        rest = &after[body_start + end + end_tag.len()..];
    }
    Ok(out)
}

impl MshContents {
    fn parse(contents: &str) -> Result<Self, ModelError> {
        let mut msh = MshContents::default();
        let mut seen_format = false;
        for (name, body) in sections(contents)? {
            match name {
                "MeshFormat" => {
                    msh.parse_format(body)?;
                    seen_format = true;
                }
                _ if !seen_format => {
                    return Err(parse_error(format!("${name} before $MeshFormat")));
                }
                "PhysicalNames" => msh.parse_physical_names(body)?,
                "Entities" => msh.parse_entities(body)?,
                "Nodes" if msh.major >= 4 => msh.parse_nodes_v4(body)?,
                "Nodes" => msh.parse_nodes_v2(body)?,
                "Elements" if msh.major >= 4 => msh.parse_elements_v4(body)?,
                "Elements" => msh.parse_elements_v2(body)?,
                other => log::debug!("skipping gmsh section ${other}"),
            }
        }
        if !seen_format {
            return Err(parse_error("missing $MeshFormat"));
        }
        Ok(msh)
    }

    fn parse_format(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let version: String = tokens.next("mesh format version")?;
        let file_type: u32 = tokens.next("mesh format type")?;
        if file_type != 0 {
            return Err(ModelError::UnsupportedFormat(
                "binary .msh files are not supported".into(),
            ));
        }
        let mut parts = version.split('.');
        self.major = parse_token(parts.next(), "mesh format version")?;
        self.minor = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
        if !matches!(self.major, 2 | 4) {
            return Err(ModelError::UnsupportedFormat(format!(
                "unsupported gmsh version: {version}"
            )));
        }
        log::debug!("reading gmsh {}.{} file", self.major, self.minor);
        Ok(())
    }

    fn parse_physical_names(&mut self, body: &str) -> Result<(), ModelError> {
        let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
        let count: usize = parse_token(lines.next(), "physical name count")?;
        for _ in 0..count {
            let line = lines
                .next()
                .ok_or_else(|| parse_error("unexpected end of physical names"))?;
            let mut parts = line.splitn(3, char::is_whitespace);
            let dim: u8 = parse_token(parts.next(), "physical dimension")?;
            let tag: i64 = parse_token(parts.next(), "physical tag")?;
            let name = parts
                .next()
                .map(|n| n.trim().trim_matches('"').to_string())
                .ok_or_else(|| parse_error("missing physical name"))?;
            self.physical_names.insert((dim, tag), name);
        }
        Ok(())
    }

    fn parse_entities(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let mut counts = [0usize; 4];
        for count in &mut counts {
            *count = tokens.next("entity count")?;
        }
        let mut entities = BTreeMap::new();
        for (dim, count) in counts.into_iter().enumerate() {
            for _ in 0..count {
                let tag: i64 = tokens.next("entity tag")?;
                // points carry a position in 4.1, a box before that
                let coords = if dim == 0 && self.minor >= 1 { 3 } else { 6 };
                tokens.skip(coords)?;
                let nb_physicals: usize = tokens.next("physical tag count")?;
                let physical_tags = (0..nb_physicals)
                    .map(|_| tokens.next::<i64>("physical tag"))
                    .collect::<Result<Vec<_>, _>>()?;
                let boundaries = if dim > 0 {
                    let nb_bounds: usize = tokens.next("bounding entity count")?;
                    (0..nb_bounds)
                        .map(|_| tokens.next::<i64>("bounding entity").map(i64::abs))
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    Vec::new()
                };
                entities.insert(
                    (dim as u8, tag),
                    EntityInfo {
                        physical_tags,
                        boundaries,
                    },
                );
            }
        }
        self.entities = Some(entities);
        Ok(())
    }

    fn parse_nodes_v2(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let count: usize = tokens.next("node count")?;
        for _ in 0..count {
            let tag: u64 = tokens.next("node id")?;
            let x = tokens.next("x coordinate")?;
            let y = tokens.next("y coordinate")?;
            let z = tokens.next("z coordinate")?;
            self.nodes.insert(tag, [x, y, z]);
        }
        Ok(())
    }

    fn parse_nodes_v4(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let nb_blocks: usize = tokens.next("node block count")?;
        tokens.skip(3)?;
        for _ in 0..nb_blocks {
            let _dim: u8 = tokens.next("node block dimension")?;
            let _tag: i64 = tokens.next("node block entity")?;
            let parametric: u8 = tokens.next("parametric flag")?;
            let count: usize = tokens.next("node block size")?;
            if parametric != 0 {
                return Err(ModelError::UnsupportedFormat(
                    "parametric node blocks are not supported".into(),
                ));
            }
            let tags = (0..count)
                .map(|_| tokens.next::<u64>("node id"))
                .collect::<Result<Vec<_>, _>>()?;
            for tag in tags {
                let x = tokens.next("x coordinate")?;
                let y = tokens.next("y coordinate")?;
                let z = tokens.next("z coordinate")?;
                self.nodes.insert(tag, [x, y, z]);
            }
        }
        Ok(())
    }

    fn parse_elements_v2(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let count: usize = tokens.next("element count")?;
        for _ in 0..count {
            let _id: u64 = tokens.next("element id")?;
            let code: u32 = tokens.next("element type")?;
            let cell = CellType::from_gmsh_code(code)
                .ok_or_else(|| parse_error(format!("unsupported element type: {code}")))?;
            let nb_tags: usize = tokens.next("element tag count")?;
            let tags = (0..nb_tags)
                .map(|_| tokens.next::<i64>("element tag"))
                .collect::<Result<Vec<_>, _>>()?;
            let nodes = (0..cell.nb_vertices())
                .map(|_| tokens.next::<u64>("element node id"))
                .collect::<Result<Vec<_>, _>>()?;
            let physical = tags.first().copied();
            let elementary = tags.get(1).copied().or(physical).unwrap_or(0);
            let group = self.groups.entry((cell.dimension(), elementary)).or_default();
            group.physical = group.physical.or(physical);
            group.cells.push((cell, nodes));
        }
        Ok(())
    }

    fn parse_elements_v4(&mut self, body: &str) -> Result<(), ModelError> {
        let mut tokens = Tokens::new(body);
        let nb_blocks: usize = tokens.next("element block count")?;
        tokens.skip(3)?;
        for _ in 0..nb_blocks {
            let dim: u8 = tokens.next("element block dimension")?;
            let tag: i64 = tokens.next("element block entity")?;
            let code: u32 = tokens.next("element type")?;
            let count: usize = tokens.next("element block size")?;
            let cell = CellType::from_gmsh_code(code)
                .ok_or_else(|| parse_error(format!("unsupported element type: {code}")))?;
            if cell.dimension() != dim {
                return Err(parse_error(format!(
                    "element type {code} in a block of dimension {dim}"
                )));
            }
            let physical = self
                .entities
                .as_ref()
                .and_then(|e| e.get(&(dim, tag)))
                .and_then(|info| info.physical_tags.first().copied());
            let group = self.groups.entry((dim, tag)).or_default();
            group.physical = group.physical.or(physical);
            for _ in 0..count {
                let _id: u64 = tokens.next("element id")?;
                let nodes = (0..cell.nb_vertices())
                    .map(|_| tokens.next::<u64>("element node id"))
                    .collect::<Result<Vec<_>, _>>()?;
                group.cells.push((cell, nodes));
            }
        }
        Ok(())
    }
}

/// Mesh of one entity with its nodes deduplicated.
fn build_mesh(
    key: EntityKey,
    group: &ElementGroup,
    nodes: &HashMap<u64, [f64; 3]>,
) -> Result<(MeshEntity, Vec<u64>), ModelError> {
    let mut local: HashMap<u64, u32> = HashMap::new();
    let mut node_tags: Vec<u64> = Vec::new();
    let mut points = Vec::new();
    let mut cells: Vec<(CellType, Vec<u32>)> = Vec::with_capacity(group.cells.len());
    for (cell, tags) in &group.cells {
        if cell.dimension() != key.0 {
            return Err(parse_error(format!(
                "{cell:?} element in entity {key:?} of dimension {}",
                key.0
            )));
        }
        let mut vertices = Vec::with_capacity(tags.len());
        for tag in tags {
            let v = match local.get(tag) {
                Some(v) => *v,
                None => {
                    let xyz = nodes
                        .get(tag)
                        .ok_or_else(|| parse_error(format!("element refers to unknown node {tag}")))?;
                    let v = points.len() as u32;
                    points.push(*xyz);
                    node_tags.push(*tag);
                    local.insert(*tag, v);
                    v
                }
            };
            vertices.push(v);
        }
        cells.push((*cell, vertices));
    }

    let mesh = match key.0 {
        0 => {
            if points.len() != 1 {
                return Err(parse_error(format!(
                    "point entity {} uses {} nodes",
                    key.1,
                    points.len()
                )));
            }
            MeshEntity::PointSet(PointSet::new(points))
        }
        1 => {
            let edges = cells.into_iter().map(|(_, v)| [v[0], v[1]]).collect();
            MeshEntity::EdgedCurve(EdgedCurve::new(points, edges))
        }
        2 => {
            let mut surface = PolygonalSurface::new(points);
            for (_, v) in &cells {
                surface.add_polygon(v);
            }
            MeshEntity::PolygonalSurface(surface)
        }
        _ => {
            let mut solid = PolyhedralSolid::new(points);
            for (cell, v) in cells {
                solid.add_polyhedron(Polyhedron::from_cell(cell, v));
            }
            MeshEntity::PolyhedralSolid(solid)
        }
    };
    Ok((mesh, node_tags))
}

/// Lower components bound higher ones whose unique vertices include all of theirs.
fn infer_relations(model: &mut Model) -> Result<(), ModelError> {
    let mut vertex_sets: HashMap<ComponentId, HashSet<UniqueVertexId>> = HashMap::new();
    for component in model.components() {
        let uids = model.component_unique_vertices(component.id())?;
        vertex_sets.insert(component.id(), uids.into_iter().collect());
    }
    let mut relations = Vec::new();
    for kind in [ComponentKind::Corner, ComponentKind::Line, ComponentKind::Surface] {
        let Some(higher_kind) = kind.incidence_kind() else {
            continue;
        };
        for lower in model.components_of(kind) {
            let lower_set = &vertex_sets[&lower.id()];
            if lower_set.is_empty() {
                continue;
            }
            for higher in model.components_of(higher_kind) {
                if lower_set.is_subset(&vertex_sets[&higher.id()]) {
                    relations.push((higher.id(), lower.id()));
                }
            }
        }
    }
    for (higher, lower) in relations {
        model.add_relation(higher, lower)?;
    }
    Ok(())
}

impl ModelReader for GmshReader {
    fn model_kind(&self) -> ModelKind {
        ModelKind::BRep
    }

    fn read(&self, reader: &mut dyn Read) -> Result<Model, ModelError> {
        self.read_with_options(reader, self.options)
    }
}

impl GmshReader {
    pub fn with_options(options: GmshReadOptions) -> Self {
        Self { options }
    }

    /// Read a model with explicit import options.
    pub fn read_with_options(
        &self,
        reader: &mut dyn Read,
        options: GmshReadOptions,
    ) -> Result<Model, ModelError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        let msh = MshContents::parse(&contents)?;

        let mut model = Model::brep();
        let mut components: HashMap<EntityKey, ComponentId> = HashMap::new();
        let mut first_by_node: HashMap<u64, UniqueVertexId> = HashMap::new();
        for (key, group) in &msh.groups {
            let (mesh, node_tags) = build_mesh(*key, group, &msh.nodes)?;
            let name = group
                .physical
                .filter(|_| options.physical_names)
                .and_then(|tag| msh.physical_names.get(&(key.0, tag)));
            // nodes are numbered in order of first use
            let unique_vertices: Vec<UniqueVertexId> = node_tags
                .iter()
                .map(|tag| {
                    let next = first_by_node.len() as UniqueVertexId;
                    *first_by_node.entry(*tag).or_insert(next)
                })
                .collect();
            let id =
                model.add_component_with_unique_vertices(mesh, name.cloned(), &unique_vertices)?;
            components.insert(*key, id);
        }

        match (&msh.entities, options.infer_relations) {
            (Some(entities), false) => {
                for (key, info) in entities {
                    let Some(higher) = components.get(key) else {
                        log::warn!("gmsh entity {key:?} has no element, skipped");
                        continue;
                    };
                    for tag in &info.boundaries {
                        match components.get(&(key.0 - 1, *tag)) {
                            Some(lower) => model.add_relation(*higher, *lower)?,
                            None => log::warn!(
                                "boundary {tag} of gmsh entity {key:?} has no element, skipped"
                            ),
                        }
                    }
                }
            }
            _ => infer_relations(&mut model)?,
        }

        model
            .validate()
            .map_err(|e| parse_error(format!("imported model is inconsistent: {e}")))?;
        log::info!(
            "gmsh import: {} corners, {} lines, {} surfaces, {} blocks, {} unique vertices",
            model.nb_corners(),
            model.nb_lines(),
            model.nb_surfaces(),
            model.nb_blocks(),
            model.nb_unique_vertices()
        );
        Ok(model)
    }
}

// --- writer -------------------------------------------------------------------

fn write_error(msg: impl Into<String>) -> ModelError {
    ModelError::UnsupportedFormat(msg.into())
}

/// Element blocks of one component: `(gmsh type, node tags per element)`.
fn element_blocks(
    mesh: &MeshEntity,
    node_of: &[u64],
) -> Result<Vec<(CellType, Vec<Vec<u64>>)>, ModelError> {
    let tags = |vs: &[u32]| vs.iter().map(|v| node_of[*v as usize]).collect::<Vec<_>>();
    let mut blocks: BTreeMap<CellType, Vec<Vec<u64>>> = BTreeMap::new();
    match mesh {
        MeshEntity::PointSet(_) => {
            blocks.insert(CellType::Vertex, vec![tags(&[0u32][..])]);
        }
        MeshEntity::EdgedCurve(curve) => {
            blocks.insert(
                CellType::Segment,
                curve.edges.iter().map(|e| tags(&e[..])).collect(),
            );
        }
        MeshEntity::PolygonalSurface(surface) => {
            for polygon in surface.polygons() {
                let cell = match polygon.len() {
                    3 => CellType::Triangle,
                    4 => CellType::Quadrilateral,
                    n => return Err(write_error(format!("gmsh cannot store {n}-gons"))),
                };
                blocks.entry(cell).or_default().push(tags(polygon));
            }
        }
        MeshEntity::PolyhedralSolid(solid) => {
            for polyhedron in &solid.polyhedra {
                let cell = polyhedron.cell_type().ok_or_else(|| {
                    write_error("gmsh only stores tetrahedra, pyramids, prisms and hexahedra")
                })?;
                blocks.entry(cell).or_default().push(tags(&polyhedron.vertices[..]));
            }
        }
    }
    Ok(blocks.into_iter().collect())
}

impl ModelWriter for GmshWriter {
    fn model_kind(&self) -> ModelKind {
        ModelKind::BRep
    }

    fn write(&self, writer: &mut dyn Write, model: &Model) -> Result<(), ModelError> {
        // entity tags: 1-based creation order within each kind
        let mut entity_tag: HashMap<ComponentId, usize> = HashMap::new();
        for kind in ComponentKind::ALL {
            for (i, c) in model.components_of(kind).enumerate() {
                entity_tag.insert(c.id(), i + 1);
            }
        }

        // node tags: one per unique vertex, in first-appearance order
        let mut node_tag: HashMap<UniqueVertexId, u64> = HashMap::new();
        let mut node_blocks = Vec::new();
        let mut component_nodes: HashMap<ComponentId, Vec<u64>> = HashMap::new();
        for component in model.components() {
            let mut block = Vec::new();
            let mut tags = Vec::with_capacity(component.mesh().nb_vertices());
            for (v, uid) in model
                .component_unique_vertices(component.id())?
                .into_iter()
                .enumerate()
            {
                let next = node_tag.len() as u64 + 1;
                let tag = *node_tag.entry(uid).or_insert(next);
                if tag == next {
                    block.push((tag, component.mesh().points()[v]));
                }
                tags.push(tag);
            }
            component_nodes.insert(component.id(), tags);
            node_blocks.push((component.kind(), entity_tag[&component.id()], block));
        }
        let nb_nodes = node_tag.len();

        let mut out = String::new();
        out.push_str("$MeshFormat\n4.1 0 8\n$EndMeshFormat\n");

        let named: Vec<_> = model.components().filter(|c| c.name().is_some()).collect();
        if !named.is_empty() {
            out.push_str(&format!("$PhysicalNames\n{}\n", named.len()));
            for c in &named {
                out.push_str(&format!(
                    "{} {} \"{}\"\n",
                    c.kind().dimension(),
                    entity_tag[&c.id()],
                    c.name().unwrap_or_default()
                ));
            }
            out.push_str("$EndPhysicalNames\n");
        }

        out.push_str("$Entities\n");
        out.push_str(&format!(
            "{} {} {} {}\n",
            model.nb_corners(),
            model.nb_lines(),
            model.nb_surfaces(),
            model.nb_blocks()
        ));
        for component in model.components() {
            let tag = entity_tag[&component.id()];
            let physicals = if component.name().is_some() {
                format!("1 {tag}")
            } else {
                "0".to_string()
            };
            let bbox = component.mesh().bounding_box();
            if component.kind() == ComponentKind::Corner {
                let p = component.mesh().points()[0];
                out.push_str(&format!("{tag} {} {} {} {physicals}\n", p[0], p[1], p[2]));
            } else {
                let bounds = model.boundaries(component.id())?;
                out.push_str(&format!(
                    "{tag} {} {} {physicals} {} {}\n",
                    bbox.min.iter().join(" "),
                    bbox.max.iter().join(" "),
                    bounds.len(),
                    bounds.iter().map(|b| entity_tag[b]).join(" ")
                ));
            }
        }
        out.push_str("$EndEntities\n");

        out.push_str(&format!(
            "$Nodes\n{} {nb_nodes} 1 {nb_nodes}\n",
            node_blocks.len()
        ));
        for (kind, tag, block) in &node_blocks {
            out.push_str(&format!("{} {tag} 0 {}\n", kind.dimension(), block.len()));
            for (node, _) in block {
                out.push_str(&format!("{node}\n"));
            }
            for (_, p) in block {
                out.push_str(&format!("{} {} {}\n", p[0], p[1], p[2]));
            }
        }
        out.push_str("$EndNodes\n");

        let mut element_sections = Vec::new();
        for component in model.components() {
            let blocks = element_blocks(component.mesh(), &component_nodes[&component.id()])?;
            for (cell, elements) in blocks {
                element_sections.push((component.kind(), entity_tag[&component.id()], cell, elements));
            }
        }
        let nb_elements: usize = element_sections.iter().map(|s| s.3.len()).sum();
        out.push_str(&format!(
            "$Elements\n{} {nb_elements} 1 {nb_elements}\n",
            element_sections.len()
        ));
        let mut element_id = 0usize;
        for (kind, tag, cell, elements) in &element_sections {
            out.push_str(&format!(
                "{} {tag} {} {}\n",
                kind.dimension(),
                cell.gmsh_code(),
                elements.len()
            ));
            for nodes in elements {
                element_id += 1;
                out.push_str(&format!("{element_id} {}\n", nodes.iter().join(" ")));
            }
        }
        out.push_str("$EndElements\n");

        writer.write_all(out.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRIANGLES_V2: &str = "\
$MeshFormat
2.2 0 8
$EndMeshFormat
$PhysicalNames
1
2 5 \"plate\"
$EndPhysicalNames
$Nodes
4
1 0 0 0
2 1 0 0
3 1 1 0
4 0 1 0
$EndNodes
$Elements
8
1 15 2 0 1 1
2 15 2 0 2 2
3 15 2 0 3 3
4 15 2 0 4 4
5 1 2 0 1 1 2
6 1 2 0 2 2 3
7 2 2 5 1 1 2 3
8 2 2 5 1 1 3 4
$EndElements
";

    fn read(text: &str) -> Result<Model, ModelError> {
        GmshReader::default().read(&mut text.as_bytes())
    }

    #[test]
    fn v2_with_inferred_relations() {
        let model = read(TWO_TRIANGLES_V2).unwrap();
        assert_eq!(model.nb_corners(), 4);
        assert_eq!(model.nb_lines(), 2);
        assert_eq!(model.nb_surfaces(), 1);
        assert_eq!(model.nb_unique_vertices(), 4);
        let surface = model.surfaces().next().unwrap();
        assert_eq!(surface.name(), Some("plate"));
        assert_eq!(surface.mesh().nb_vertices(), 4);
        assert_eq!(surface.mesh().nb_elements(), 2);
        assert_eq!(model.nb_boundaries(surface.id()).unwrap(), 2);
        for line in model.lines() {
            assert_eq!(model.nb_boundaries(line.id()).unwrap(), 2);
        }
        let corner4 = model.corners().last().unwrap();
        assert_eq!(model.nb_incidences(corner4.id()).unwrap(), 0);
        // one identity per node, numbered from zero
        assert_eq!(model.unique_vertices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn physical_names_can_be_ignored() {
        let reader = GmshReader::with_options(GmshReadOptions {
            physical_names: false,
            ..Default::default()
        });
        let model = reader.read(&mut TWO_TRIANGLES_V2.as_bytes()).unwrap();
        assert!(model.components().all(|c| c.name().is_none()));
    }

    #[test]
    fn export_reimport_keeps_relations() {
        let model = read(TWO_TRIANGLES_V2).unwrap();
        let mut bytes = Vec::new();
        GmshWriter.write(&mut bytes, &model).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("$MeshFormat\n4.1 0 8\n"));
        let back = read(&text).unwrap();
        assert_eq!(back.nb_corners(), 4);
        assert_eq!(back.nb_lines(), 2);
        assert_eq!(back.nb_surfaces(), 1);
        assert_eq!(back.nb_unique_vertices(), 4);
        let surface = back.surfaces().next().unwrap();
        assert_eq!(surface.name(), Some("plate"));
        assert_eq!(back.nb_boundaries(surface.id()).unwrap(), 2);
    }

    #[test]
    fn unknown_node_is_an_import_error() {
        let broken = TWO_TRIANGLES_V2.replace("8 2 2 5 1 1 3 4", "8 2 2 5 1 1 3 9");
        assert!(matches!(read(&broken), Err(ModelError::GeometryImport(_))));
    }

    #[test]
    fn binary_and_unknown_versions_rejected() {
        let binary = TWO_TRIANGLES_V2.replace("2.2 0 8", "2.2 1 8");
        assert!(matches!(read(&binary), Err(ModelError::UnsupportedFormat(_))));
        let v3 = TWO_TRIANGLES_V2.replace("2.2 0 8", "3.0 0 8");
        assert!(matches!(read(&v3), Err(ModelError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_end_tag() {
        let truncated = TWO_TRIANGLES_V2.replace("$EndNodes\n", "");
        assert!(read(&truncated).is_err());
    }
}
