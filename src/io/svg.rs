//! SVG reader producing Section models.
//!
//! Every `<path>` element (at any group depth) is read with the straight
//! segment commands `M L H V Z` in absolute and relative form, including
//! implicit line-to after a move-to. Each subpath becomes one line. Line
//! endpoints closer than the tolerance share a corner, so a subpath closed
//! with `Z` ends up with a single corner and its two end vertices share that
//! corner's unique vertex.
//!
//! Transforms and curve commands are not supported.

use crate::geometry::{BoundingBox, Tolerance, colocate};
use crate::io::ModelReader;
use crate::io::xml::{parse_document, read_text};
use crate::mesh::{EdgedCurve, Point, PointSet};
use crate::mesh_error::ModelError;
use crate::model::{Model, ModelKind};
use crate::topology::component_id::ComponentId;
use crate::topology::unique_vertices::UniqueVertexId;
use std::io::Read;

/// Optional settings for SVG import.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgReadOptions {
    /// Distance under which line endpoints share a corner.
    pub tolerance: Tolerance,
}

#[derive(Debug, Default, Clone)]
pub struct SvgReader {
    pub options: SvgReadOptions,
}

fn import_error(msg: impl Into<String>) -> ModelError {
    ModelError::GeometryImport(msg.into())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(d: &str) -> Result<Vec<Token>, ModelError> {
    let chars: Vec<char> = d.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if "MmLlHhVvZz".contains(c) {
            tokens.push(Token::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
            let start = i;
            i += 1;
            let mut seen_dot = c == '.';
            let mut seen_exp = false;
            while i < chars.len() {
                let n = chars[i];
                if n.is_ascii_digit() {
                    i += 1;
                } else if n == '.' && !seen_dot && !seen_exp {
                    seen_dot = true;
                    i += 1;
                } else if (n == 'e' || n == 'E') && !seen_exp {
                    seen_exp = true;
                    i += 1;
                    if i < chars.len() && (chars[i] == '-' || chars[i] == '+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| import_error(format!("invalid number in path data: {text}")))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() {
            return Err(import_error(format!("unsupported path command `{c}`")));
        } else {
            return Err(import_error(format!("unexpected character `{c}` in path data")));
        }
    }
    Ok(tokens)
}

/// One polyline extracted from a path.
#[derive(Debug, Clone, PartialEq)]
struct Subpath {
    points: Vec<Point>,
}

#[derive(Debug, Default)]
struct PathParser {
    subpaths: Vec<Subpath>,
    current: Vec<Point>,
    position: [f64; 2],
    start: [f64; 2],
}

impl PathParser {
    fn finish_open(&mut self) {
        match self.current.len() {
            0 => {}
            1 => log::warn!("ignoring lone move-to at {:?}", self.current[0]),
            _ => self.subpaths.push(Subpath {
                points: std::mem::take(&mut self.current),
            }),
        }
        self.current.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.finish_open();
        self.position = [x, y];
        self.start = [x, y];
        self.current.push([x, y, 0.0]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.current.is_empty() {
            // drawing after a close restarts from the subpath start
            self.current.push([self.position[0], self.position[1], 0.0]);
        }
        self.position = [x, y];
        self.current.push([x, y, 0.0]);
    }

    fn close(&mut self) -> Result<(), ModelError> {
        if self.current.is_empty() {
            return Ok(());
        }
        if self.current.len() < 3 {
            return Err(import_error(format!(
                "closed path with only {} vertices",
                self.current.len()
            )));
        }
        let front = self.current[0];
        self.current.push(front);
        self.subpaths.push(Subpath {
            points: std::mem::take(&mut self.current),
        });
        self.position = self.start;
        Ok(())
    }

    fn parse(mut self, d: &str) -> Result<Vec<Subpath>, ModelError> {
        let tokens = tokenize(d)?;
        let mut i = 0;
        let mut command: Option<char> = None;
        let number = |i: &mut usize| -> Result<f64, ModelError> {
            match tokens.get(*i) {
                Some(Token::Number(v)) => {
                    *i += 1;
                    Ok(*v)
                }
                _ => Err(import_error("path command is missing a coordinate")),
            }
        };
        while i < tokens.len() {
            let cmd = match tokens[i] {
                Token::Command(c) => {
                    i += 1;
                    c
                }
                Token::Number(_) => match command {
                    // implicit repetition; move-to continues as line-to
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some(c) if c != 'Z' && c != 'z' => c,
                    _ => return Err(import_error("path data does not start with a command")),
                },
            };
            let [px, py] = self.position;
            match cmd {
                'M' => {
                    let (x, y) = (number(&mut i)?, number(&mut i)?);
                    self.move_to(x, y);
                }
                'm' => {
                    let (dx, dy) = (number(&mut i)?, number(&mut i)?);
                    self.move_to(px + dx, py + dy);
                }
                'L' => {
                    let (x, y) = (number(&mut i)?, number(&mut i)?);
                    self.line_to(x, y);
                }
                'l' => {
                    let (dx, dy) = (number(&mut i)?, number(&mut i)?);
                    self.line_to(px + dx, py + dy);
                }
                'H' => {
                    let x = number(&mut i)?;
                    self.line_to(x, py);
                }
                'h' => {
                    let dx = number(&mut i)?;
                    self.line_to(px + dx, py);
                }
                'V' => {
                    let y = number(&mut i)?;
                    self.line_to(px, y);
                }
                'v' => {
                    let dy = number(&mut i)?;
                    self.line_to(px, py + dy);
                }
                'Z' | 'z' => self.close()?,
                other => return Err(import_error(format!("unsupported path command `{other}`"))),
            }
            command = Some(cmd);
        }
        self.finish_open();
        Ok(self.subpaths)
    }
}

impl ModelReader for SvgReader {
    fn model_kind(&self) -> ModelKind {
        ModelKind::Section
    }

    fn read(&self, reader: &mut dyn Read) -> Result<Model, ModelError> {
        self.read_with_options(reader, self.options)
    }
}

impl SvgReader {
    pub fn with_options(options: SvgReadOptions) -> Self {
        Self { options }
    }

    /// Read a section with explicit import options.
    pub fn read_with_options(
        &self,
        reader: &mut dyn Read,
        options: SvgReadOptions,
    ) -> Result<Model, ModelError> {
        let input = read_text(reader)?;
        let doc = parse_document(&input)?;
        let mut lines = Vec::new();
        for path in doc.descendants().filter(|n| n.has_tag_name("path")) {
            let Some(d) = path.attribute("d") else {
                log::warn!("skipping <path> without `d` attribute");
                continue;
            };
            lines.extend(PathParser::default().parse(d)?);
        }
        build_section(lines, options.tolerance)
    }
}

fn build_section(lines: Vec<Subpath>, tolerance: Tolerance) -> Result<Model, ModelError> {
    let bbox = BoundingBox::from_points(lines.iter().flat_map(|l| l.points.iter()));
    let epsilon = tolerance.resolve(&bbox);

    let mut endpoints = Vec::with_capacity(2 * lines.len());
    for line in &lines {
        let (Some(front), Some(back)) = (line.points.first(), line.points.last()) else {
            continue;
        };
        endpoints.push(*front);
        endpoints.push(*back);
    }
    let colocated = colocate(&endpoints, epsilon);

    // corner `k` owns unique vertex `k`, interior line vertices follow
    let mut model = Model::section();
    let mut corners: Vec<ComponentId> = Vec::with_capacity(colocated.nb_unique_points());
    for (k, point) in colocated.unique_points.iter().enumerate() {
        let uid = k as UniqueVertexId;
        corners.push(model.add_component_with_unique_vertices(
            PointSet::single(*point),
            None,
            &[uid],
        )?);
    }
    let mut next = corners.len() as UniqueVertexId;
    for (i, subpath) in lines.into_iter().enumerate() {
        let (front, back) = (
            colocated.colocated_mapping[2 * i],
            colocated.colocated_mapping[2 * i + 1],
        );
        let nb_interior = subpath.points.len().saturating_sub(2) as UniqueVertexId;
        let unique_vertices: Vec<UniqueVertexId> = std::iter::once(front as UniqueVertexId)
            .chain(next..next + nb_interior)
            .chain(std::iter::once(back as UniqueVertexId))
            .collect();
        next += nb_interior;
        let line = model.add_component_with_unique_vertices(
            EdgedCurve::polyline(subpath.points),
            None,
            &unique_vertices,
        )?;
        model.add_relation(line, corners[front])?;
        model.add_relation(line, corners[back])?;
    }

    model
        .validate()
        .map_err(|e| import_error(format!("imported section is inconsistent: {e}")))?;
    log::info!(
        "svg import: {} corners, {} lines (epsilon {epsilon:e})",
        model.nb_corners(),
        model.nb_lines()
    );
    Ok(model)
}
