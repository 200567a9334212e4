//! Small helpers shared by the XML based readers (SVG, VTP).

use crate::mesh_error::ModelError;
use roxmltree::{Document, Node};
use std::io::Read;
use std::str::FromStr;

pub(crate) fn read_text(reader: &mut dyn Read) -> Result<String, ModelError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(input)
}

pub(crate) fn parse_document(input: &str) -> Result<Document<'_>, ModelError> {
    Document::parse(input)
        .map_err(|err| ModelError::GeometryImport(format!("XML parse error: {err}")))
}

/// First descendant of `node` with the given local tag name.
pub(crate) fn find_child<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| n.has_tag_name(tag))
}

/// Whitespace separated numbers.
pub(crate) fn parse_numbers<T: FromStr>(text: &str, what: &str) -> Result<Vec<T>, ModelError> {
    text.split_whitespace()
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| ModelError::GeometryImport(format!("invalid {what}: {v}")))
        })
        .collect()
}
