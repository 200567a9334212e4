//! VTK XML PolyData (`.vtp`) reader producing polygonal surfaces.
//!
//! # Supported format
//! - `ascii`, inline `binary` (base64) and `appended` (base64 encoding)
//!   data arrays.
//! - `UInt32` and `UInt64` block headers, `LittleEndian` byte order.
//! - `Points` plus `Polys` (`connectivity`/`offsets`); several pieces are
//!   concatenated into one surface.
//!
//! # Limitations
//! - Compressed files (`compressor` attribute) are not supported.
//! - Raw (non base64) appended data is not supported.

use crate::io::{SurfaceReader, as_index};
use crate::io::xml::{find_child, parse_document, parse_numbers, read_text};
use crate::mesh::PolygonalSurface;
use crate::mesh_error::ModelError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use roxmltree::Node;
use std::io::Read;

#[derive(Debug, Default, Clone, Copy)]
pub struct VtpReader;

fn import_error(msg: impl Into<String>) -> ModelError {
    ModelError::GeometryImport(msg.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderType {
    UInt32,
    UInt64,
}

impl HeaderType {
    fn size(self) -> usize {
        match self {
            HeaderType::UInt32 => 4,
            HeaderType::UInt64 => 8,
        }
    }

    fn read(self, bytes: &[u8]) -> Result<usize, ModelError> {
        let size = self.size();
        if bytes.len() < size {
            return Err(import_error("truncated data array header"));
        }
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(&bytes[..size]);
        let nb_bytes = u64::from_le_bytes(buf);
        usize::try_from(nb_bytes).map_err(|_| too_large(nb_bytes))
    }
}

fn too_large(nb_bytes: impl std::fmt::Display) -> ModelError {
    import_error(format!("data array of {nb_bytes} bytes is too large"))
}

/// Number of base64 characters encoding `bytes` bytes.
fn encoded_len(bytes: usize) -> Result<usize, ModelError> {
    bytes
        .div_ceil(3)
        .checked_mul(4)
        .ok_or_else(|| too_large(bytes))
}

fn decode(text: &str) -> Result<Vec<u8>, ModelError> {
    STANDARD
        .decode(text)
        .map_err(|e| import_error(format!("invalid base64 data: {e}")))
}

/// Decodes one base64 data block (size header followed by data) at the start
/// of `text`, returning the raw data bytes.
///
/// Writers either encode the header and the data separately (the header
/// chunk then ends with padding) or as a single stream.
fn decode_block(text: &str, header: HeaderType) -> Result<Vec<u8>, ModelError> {
    let header_chars = encoded_len(header.size())?;
    let chunk = text
        .get(..header_chars)
        .ok_or_else(|| import_error("truncated data array header"))?;
    let decoded = decode(chunk)?;
    let nb_bytes = header.read(&decoded)?;
    if chunk.ends_with('=') && decoded.len() == header.size() {
        let end = encoded_len(nb_bytes)?
            .checked_add(header_chars)
            .ok_or_else(|| too_large(nb_bytes))?;
        let data = text
            .get(header_chars..end)
            .ok_or_else(|| import_error("truncated base64 data array"))?;
        let mut bytes = decode(data)?;
        if bytes.len() < nb_bytes {
            return Err(import_error("truncated base64 data array"));
        }
        bytes.truncate(nb_bytes);
        Ok(bytes)
    } else {
        let total = header
            .size()
            .checked_add(nb_bytes)
            .ok_or_else(|| too_large(nb_bytes))?;
        let data = text
            .get(..encoded_len(total)?)
            .ok_or_else(|| import_error("truncated base64 data array"))?;
        let mut bytes = decode(data)?;
        if bytes.len() < total {
            return Err(import_error("truncated base64 data array"));
        }
        bytes.truncate(total);
        Ok(bytes.split_off(header.size()))
    }
}

/// Converts raw little-endian bytes of VTK type `ty` to values.
fn values_from_bytes(bytes: &[u8], ty: &str) -> Result<Vec<f64>, ModelError> {
    macro_rules! convert {
        ($t:ty) => {{
            const SIZE: usize = std::mem::size_of::<$t>();
            if bytes.len() % SIZE != 0 {
                return Err(import_error(format!(
                    "{} bytes do not hold whole {ty} values",
                    bytes.len()
                )));
            }
            bytes
                .chunks_exact(SIZE)
                .map(|c| {
                    let mut buf = [0u8; SIZE];
                    buf.copy_from_slice(c);
                    <$t>::from_le_bytes(buf) as f64
                })
                .collect()
        }};
    }
    Ok(match ty {
        "Int8" => convert!(i8),
        "UInt8" => convert!(u8),
        "Int16" => convert!(i16),
        "UInt16" => convert!(u16),
        "Int32" => convert!(i32),
        "UInt32" => convert!(u32),
        "Int64" => convert!(i64),
        "UInt64" => convert!(u64),
        "Float32" => convert!(f32),
        "Float64" => convert!(f64),
        other => return Err(import_error(format!("unsupported VTK data type `{other}`"))),
    })
}

struct VtpContext {
    header: HeaderType,
    /// Base64 text following the `_` marker of `<AppendedData>`.
    appended: Option<String>,
}

impl VtpContext {
    fn data_array(&self, node: Node) -> Result<Vec<f64>, ModelError> {
        let ty = node.attribute("type").unwrap_or("Float32");
        let format = node.attribute("format").unwrap_or("ascii");
        match format {
            "ascii" => parse_numbers::<f64>(node.text().unwrap_or(""), "VTK value"),
            "binary" => {
                let text: String = node
                    .text()
                    .unwrap_or("")
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                values_from_bytes(&decode_block(&text, self.header)?, ty)
            }
            "appended" => {
                let appended = self
                    .appended
                    .as_deref()
                    .ok_or_else(|| import_error("appended data array without <AppendedData>"))?;
                let offset: usize = crate::io::parse_token(node.attribute("offset"), "appended offset")?;
                let text = appended
                    .get(offset..)
                    .ok_or_else(|| import_error(format!("appended offset {offset} out of range")))?;
                values_from_bytes(&decode_block(text, self.header)?, ty)
            }
            other => Err(import_error(format!("unsupported data array format `{other}`"))),
        }
    }

    fn named_array(&self, parent: Node, name: &str) -> Result<Vec<f64>, ModelError> {
        let node = parent
            .children()
            .find(|n| n.has_tag_name("DataArray") && n.attribute("Name") == Some(name))
            .ok_or_else(|| import_error(format!("missing `{name}` data array")))?;
        self.data_array(node)
    }
}

impl SurfaceReader for VtpReader {
    fn read(&self, reader: &mut dyn Read) -> Result<PolygonalSurface, ModelError> {
        let input = read_text(reader)?;
        let doc = parse_document(&input)?;
        let root = doc.root_element();
        if !root.has_tag_name("VTKFile") {
            return Err(import_error("missing <VTKFile> root"));
        }
        if root.attribute("type").is_some_and(|t| t != "PolyData") {
            return Err(ModelError::UnsupportedFormat(format!(
                "VTK file of type {:?}",
                root.attribute("type")
            )));
        }
        if let Some(compressor) = root.attribute("compressor") {
            return Err(ModelError::UnsupportedFormat(format!(
                "compressed VTK data ({compressor})"
            )));
        }
        if root.attribute("byte_order").is_some_and(|o| o != "LittleEndian") {
            return Err(ModelError::UnsupportedFormat(
                "only LittleEndian VTK files are supported".into(),
            ));
        }
        let header = match root.attribute("header_type").unwrap_or("UInt32") {
            "UInt32" => HeaderType::UInt32,
            "UInt64" => HeaderType::UInt64,
            other => {
                return Err(ModelError::UnsupportedFormat(format!(
                    "VTK header type {other}"
                )));
            }
        };
        let appended = match find_child(root, "AppendedData") {
            Some(node) => {
                if node.attribute("encoding").is_some_and(|e| e != "base64") {
                    return Err(ModelError::UnsupportedFormat(
                        "raw appended VTK data".into(),
                    ));
                }
                let text = node.text().unwrap_or("");
                let start = text
                    .find('_')
                    .ok_or_else(|| import_error("<AppendedData> without `_` marker"))?;
                Some(
                    text[start + 1..]
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect(),
                )
            }
            None => None,
        };
        let context = VtpContext { header, appended };

        let poly_data =
            find_child(root, "PolyData").ok_or_else(|| import_error("missing <PolyData>"))?;
        let mut surface = PolygonalSurface::default();
        for piece in poly_data.children().filter(|n| n.has_tag_name("Piece")) {
            let base = u32::try_from(surface.nb_vertices())
                .map_err(|_| import_error("too many vertices"))?;
            let points_node =
                find_child(piece, "Points").ok_or_else(|| import_error("piece without <Points>"))?;
            let array = points_node
                .children()
                .find(|n| n.has_tag_name("DataArray"))
                .ok_or_else(|| import_error("<Points> without data array"))?;
            let components: usize = array
                .attribute("NumberOfComponents")
                .and_then(|n| n.parse().ok())
                .unwrap_or(3);
            if components == 0 || components > 3 {
                return Err(import_error(format!(
                    "points with {components} components"
                )));
            }
            let coords = context.data_array(array)?;
            for chunk in coords.chunks(components) {
                let mut point = [0.0; 3];
                point[..chunk.len()].copy_from_slice(chunk);
                surface.add_point(point);
            }

            if let Some(polys) = find_child(piece, "Polys") {
                let connectivity = context.named_array(polys, "connectivity")?;
                let offsets = context.named_array(polys, "offsets")?;
                let mut start = 0usize;
                let mut polygon = Vec::new();
                for offset in offsets {
                    let end = as_index(offset, "polygon offset")? as usize;
                    let vertices = connectivity
                        .get(start..end)
                        .ok_or_else(|| import_error("polygon offsets exceed connectivity"))?;
                    polygon.clear();
                    for v in vertices {
                        let vertex = base
                            .checked_add(as_index(*v, "polygon vertex")?)
                            .ok_or_else(|| import_error("polygon vertex index overflows"))?;
                        polygon.push(vertex);
                    }
                    surface.add_polygon(&polygon);
                    start = end;
                }
            }
        }
        surface
            .check()
            .map_err(|e| import_error(format!("VTP surface is inconsistent: {e}")))?;
        log::info!(
            "vtp import: {} vertices, {} polygons",
            surface.nb_vertices(),
            surface.nb_polygons()
        );
        Ok(surface)
    }
}
