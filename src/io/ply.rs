//! PLY reader producing polygonal surfaces.
//!
//! # Supported format
//! - `ascii 1.0`, `binary_little_endian 1.0` and `binary_big_endian 1.0`.
//! - `vertex` elements with `x`, `y` (and optionally `z`) properties.
//! - `face` elements with a `vertex_indices` (or `vertex_index`) list.
//! - Any other element or property is parsed and ignored.

use crate::io::{SurfaceReader, as_index};
use crate::mesh::PolygonalSurface;
use crate::mesh_error::ModelError;
use std::io::Read;

#[derive(Debug, Default, Clone, Copy)]
pub struct PlyReader;

fn import_error(msg: impl Into<String>) -> ModelError {
    ModelError::GeometryImport(msg.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl Scalar {
    fn parse(name: &str) -> Result<Self, ModelError> {
        Ok(match name {
            "char" | "int8" => Scalar::I8,
            "uchar" | "uint8" => Scalar::U8,
            "short" | "int16" => Scalar::I16,
            "ushort" | "uint16" => Scalar::U16,
            "int" | "int32" => Scalar::I32,
            "uint" | "uint32" => Scalar::U32,
            "float" | "float32" => Scalar::F32,
            "double" | "float64" => Scalar::F64,
            other => return Err(import_error(format!("unknown PLY type `{other}`"))),
        })
    }

    fn size(self) -> usize {
        match self {
            Scalar::I8 | Scalar::U8 => 1,
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }
}

#[derive(Debug, Clone)]
enum Property {
    Scalar { name: String, ty: Scalar },
    List { name: String, count: Scalar, item: Scalar },
}

impl Property {
    fn name(&self) -> &str {
        match self {
            Property::Scalar { name, .. } | Property::List { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
}

/// Splits the raw file into the parsed header and the body bytes.
fn parse_header(bytes: &[u8]) -> Result<(Header, &[u8]), ModelError> {
    const END: &[u8] = b"end_header";
    let end = bytes
        .windows(END.len())
        .position(|w| w == END)
        .ok_or_else(|| import_error("missing end_header"))?;
    let mut body_start = end + END.len();
    // the header ends with the line break following end_header
    if bytes.get(body_start) == Some(&b'\r') {
        body_start += 1;
    }
    if bytes.get(body_start) == Some(&b'\n') {
        body_start += 1;
    }
    let text = std::str::from_utf8(&bytes[..end])
        .map_err(|_| import_error("PLY header is not valid text"))?;

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("ply") {
        return Err(import_error("missing `ply` magic"));
    }
    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();
    for line in lines {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("format") => {
                encoding = Some(match parts.next() {
                    Some("ascii") => Encoding::Ascii,
                    Some("binary_little_endian") => Encoding::BinaryLittleEndian,
                    Some("binary_big_endian") => Encoding::BinaryBigEndian,
                    other => {
                        return Err(ModelError::UnsupportedFormat(format!(
                            "PLY format {other:?}"
                        )));
                    }
                });
            }
            Some("element") => {
                let name = parts
                    .next()
                    .ok_or_else(|| import_error("element without name"))?;
                let count = crate::io::parse_token(parts.next(), "element count")?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| import_error("property before any element"))?;
                let first = parts
                    .next()
                    .ok_or_else(|| import_error("property without type"))?;
                let property = if first == "list" {
                    let count = Scalar::parse(parts.next().unwrap_or_default())?;
                    let item = Scalar::parse(parts.next().unwrap_or_default())?;
                    let name = parts
                        .next()
                        .ok_or_else(|| import_error("list property without name"))?;
                    Property::List {
                        name: name.to_string(),
                        count,
                        item,
                    }
                } else {
                    let ty = Scalar::parse(first)?;
                    let name = parts
                        .next()
                        .ok_or_else(|| import_error("property without name"))?;
                    Property::Scalar {
                        name: name.to_string(),
                        ty,
                    }
                };
                element.properties.push(property);
            }
            Some("comment") | Some("obj_info") => {}
            Some(other) => log::debug!("ignoring PLY header line `{other}`"),
            None => {}
        }
    }
    let encoding = encoding.ok_or_else(|| import_error("missing PLY format line"))?;
    Ok((
        Header { encoding, elements },
        &bytes[body_start..],
    ))
}

/// Source of scalar values in file order.
trait ValueSource {
    fn value(&mut self, ty: Scalar) -> Result<f64, ModelError>;
}

struct AsciiSource<'a> {
    tokens: std::str::SplitWhitespace<'a>,
}

impl ValueSource for AsciiSource<'_> {
    fn value(&mut self, _ty: Scalar) -> Result<f64, ModelError> {
        crate::io::parse_token(self.tokens.next(), "PLY value")
    }
}

struct BinarySource<'a> {
    bytes: &'a [u8],
    big_endian: bool,
}

impl ValueSource for BinarySource<'_> {
    fn value(&mut self, ty: Scalar) -> Result<f64, ModelError> {
        let size = ty.size();
        if self.bytes.len() < size {
            return Err(import_error("unexpected end of PLY body"));
        }
        let (raw, rest) = self.bytes.split_at(size);
        self.bytes = rest;
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(raw);
        if self.big_endian {
            buf[..size].reverse();
        }
        // buf now holds the value in little-endian order
        Ok(match ty {
            Scalar::I8 => i8::from_le_bytes([buf[0]]) as f64,
            Scalar::U8 => buf[0] as f64,
            Scalar::I16 => i16::from_le_bytes([buf[0], buf[1]]) as f64,
            Scalar::U16 => u16::from_le_bytes([buf[0], buf[1]]) as f64,
            Scalar::I32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Scalar::U32 => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Scalar::F32 => f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Scalar::F64 => f64::from_le_bytes(buf),
        })
    }
}

fn read_body(header: &Header, source: &mut dyn ValueSource) -> Result<PolygonalSurface, ModelError> {
    let mut surface = PolygonalSurface::default();
    let mut polygon = Vec::new();
    for element in &header.elements {
        let axis = |name: &str| element.properties.iter().position(|p| p.name() == name);
        let xyz = [axis("x"), axis("y"), axis("z")];
        let is_vertex = element.name == "vertex";
        if is_vertex && (xyz[0].is_none() || xyz[1].is_none()) {
            return Err(import_error("vertex element without x/y properties"));
        }
        let is_face = element.name == "face";
        for _ in 0..element.count {
            let mut point = [0.0; 3];
            for (p, property) in element.properties.iter().enumerate() {
                match property {
                    Property::Scalar { ty, .. } => {
                        let value = source.value(*ty)?;
                        if let Some(axis) = xyz.iter().position(|a| *a == Some(p)) {
                            point[axis] = value;
                        }
                    }
                    Property::List { name, count, item } => {
                        let n = as_index(source.value(*count)?, "PLY list length")?;
                        polygon.clear();
                        for _ in 0..n {
                            polygon.push(source.value(*item)?);
                        }
                        if is_face && (name == "vertex_indices" || name == "vertex_index") {
                            let vertices = polygon
                                .iter()
                                .map(|v| as_index(*v, "PLY face vertex"))
                                .collect::<Result<Vec<u32>, _>>()?;
                            surface.add_polygon(&vertices);
                        }
                    }
                }
            }
            if is_vertex {
                surface.add_point(point);
            }
        }
    }
    Ok(surface)
}

impl SurfaceReader for PlyReader {
    fn read(&self, reader: &mut dyn Read) -> Result<PolygonalSurface, ModelError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let (header, body) = parse_header(&bytes)?;
        let surface = match header.encoding {
            Encoding::Ascii => {
                let text = std::str::from_utf8(body)
                    .map_err(|_| import_error("ASCII PLY body is not valid text"))?;
                let mut source = AsciiSource {
                    tokens: text.split_whitespace(),
                };
                read_body(&header, &mut source)?
            }
            Encoding::BinaryLittleEndian | Encoding::BinaryBigEndian => {
                let mut source = BinarySource {
                    bytes: body,
                    big_endian: header.encoding == Encoding::BinaryBigEndian,
                };
                read_body(&header, &mut source)?
            }
        };
        surface
            .check()
            .map_err(|e| import_error(format!("PLY surface is inconsistent: {e}")))?;
        log::info!(
            "ply import: {} vertices, {} polygons",
            surface.nb_vertices(),
            surface.nb_polygons()
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "ply
format ascii 1.0
comment two triangles
element vertex 4
property float x
property float y
property float z
property uchar red
element face 2
property list uchar int vertex_indices
end_header
0 0 0 255
1 0 0 0
1 1 0 0
0 1 0 0
3 0 1 2
3 0 2 3
";

    #[test]
    fn ascii_square() {
        let surface = PlyReader.read(&mut SQUARE.as_bytes()).unwrap();
        assert_eq!(surface.nb_vertices(), 4);
        assert_eq!(surface.nb_polygons(), 2);
        assert_eq!(surface.polygon_vertices(1), &[0, 2, 3]);
        assert_eq!(surface.point(2), Some([1.0, 1.0, 0.0]));
    }

    #[test]
    fn invalid_face_indices_rejected() {
        for face in ["3 -1 1 2", "3 0 1.5 2", "-3 0 1 2", "3 0 1 4294967296"] {
            let broken = SQUARE.replace("3 0 2 3", face);
            assert!(
                matches!(
                    PlyReader.read(&mut broken.as_bytes()),
                    Err(ModelError::GeometryImport(_))
                ),
                "{face}"
            );
        }
    }

    #[test]
    fn binary_big_endian_quad() {
        let mut bytes = b"ply\nformat binary_big_endian 1.0\nelement vertex 4\n\
property double x\nproperty double y\nproperty double z\n\
element face 1\nproperty list uchar uint vertex_indices\nend_header\n"
            .to_vec();
        for p in [[0.0, 0.0, 1.0], [2.0, 0.0, 1.0], [2.0, 2.0, 1.0], [0.0, 2.0, 1.0]] {
            for c in p {
                bytes.extend_from_slice(&f64::to_be_bytes(c));
            }
        }
        bytes.push(4);
        for v in [0u32, 1, 2, 3] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let surface = PlyReader.read(&mut bytes.as_slice()).unwrap();
        assert_eq!(surface.nb_vertices(), 4);
        assert_eq!(surface.nb_polygons(), 1);
        assert_eq!(surface.point(2), Some([2.0, 2.0, 1.0]));
        assert_eq!(surface.polygon_vertices(0), &[0, 1, 2, 3]);
    }

    #[test]
    fn out_of_range_face_rejected() {
        let broken = SQUARE.replace("3 0 2 3\n", "3 0 2 7\n");
        let err = PlyReader.read(&mut broken.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelError::GeometryImport(_)));
    }

    #[test]
    fn truncated_binary_body() {
        let bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 1\n\
property float x\nproperty float y\nend_header\n\x00\x00"
            .to_vec();
        assert!(PlyReader.read(&mut bytes.as_slice()).is_err());
    }
}
