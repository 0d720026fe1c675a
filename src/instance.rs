//! Module for parsing and representing TSPLIB instances.
//!
//! This module reads the TSPLIB text format: `KEY : value` header lines
//! followed by data sections. Only node coordinates and explicit edge weights
//! are retained; the remaining sections are read past and dropped.

use crate::distance::{explicit_weight, EdgeWeightFormat, EdgeWeightType, Scalar};
use crate::error::{DistanceError, ParseError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

/// Problem type of every instance this crate converts.
pub const SYMMETRIC_TSP: &str = "TSP";

/// A parsed TSPLIB instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TspInstance {
    /// Name of the instance (NAME keyword)
    pub name: String,
    /// Problem type (TSP, ATSP, CVRP, ...)
    pub problem_type: String,
    /// Comment lines, joined with a single space
    pub comment: String,
    /// Number of nodes
    pub dimension: usize,
    pub edge_weight_type: EdgeWeightType,
    pub edge_weight_format: Option<EdgeWeightFormat>,
    /// TWOD_COORDS or THREED_COORDS, when declared
    pub node_coord_type: Option<String>,
    pub display_data_type: Option<String>,
    /// Node coordinates by 1-based node index, exactly as written in the file
    pub node_coords: BTreeMap<usize, Vec<Scalar>>,
    /// Raw EDGE_WEIGHT_SECTION stream
    pub edge_weights: Vec<Scalar>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Section {
    None,
    NodeCoords,
    EdgeWeights,
    Ignored,
}

impl TspInstance {
    /// Parse an instance from a TSPLIB file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let file = File::open(&path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse an instance from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut name = String::new();
        let mut problem_type: Option<String> = None;
        let mut comments: Vec<String> = Vec::new();
        let mut dimension: Option<usize> = None;
        let mut edge_weight_type: Option<EdgeWeightType> = None;
        let mut edge_weight_format: Option<EdgeWeightFormat> = None;
        let mut node_coord_type: Option<String> = None;
        let mut display_data_type: Option<String> = None;
        let mut node_coords: BTreeMap<usize, Vec<Scalar>> = BTreeMap::new();
        let mut edge_weights: Vec<Scalar> = Vec::new();

        let mut section = Section::None;

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let (key, value) = split_keyword(line);

                if key.ends_with("_SECTION") {
                    section = match key {
                        "NODE_COORD_SECTION" => Section::NodeCoords,
                        "EDGE_WEIGHT_SECTION" => Section::EdgeWeights,
                        "DISPLAY_DATA_SECTION" | "FIXED_EDGES_SECTION" | "DEPOT_SECTION"
                        | "DEMAND_SECTION" | "EDGE_DATA_SECTION" | "TOUR_SECTION" => Section::Ignored,
                        other => {
                            return Err(ParseError::malformed(line_no, format!("unknown section {}", other)))
                        }
                    };
                    continue;
                }

                section = Section::None;
                match key {
                    "NAME" => name = value.to_string(),
                    "TYPE" => problem_type = Some(value.to_string()),
                    "COMMENT" => comments.push(value.to_string()),
                    "DIMENSION" => {
                        let n: usize = value
                            .parse()
                            .map_err(|_| ParseError::malformed(line_no, "invalid DIMENSION"))?;
                        if n == 0 {
                            return Err(ParseError::malformed(line_no, "DIMENSION must be positive"));
                        }
                        dimension = Some(n);
                    }
                    "EDGE_WEIGHT_TYPE" => {
                        edge_weight_type = Some(value.parse().map_err(|value| ParseError::Unsupported {
                            keyword: "EDGE_WEIGHT_TYPE",
                            value,
                        })?);
                    }
                    "EDGE_WEIGHT_FORMAT" => {
                        edge_weight_format = Some(value.parse().map_err(|value| ParseError::Unsupported {
                            keyword: "EDGE_WEIGHT_FORMAT",
                            value,
                        })?);
                    }
                    "NODE_COORD_TYPE" => node_coord_type = Some(value.to_string()),
                    "DISPLAY_DATA_TYPE" => display_data_type = Some(value.to_string()),
                    "CAPACITY" | "EDGE_DATA_FORMAT" => {}
                    other => {
                        return Err(ParseError::malformed(line_no, format!("unknown keyword {}", other)))
                    }
                }
                continue;
            }

            match section {
                Section::NodeCoords => {
                    let mut parts = line.split_whitespace();
                    let id: usize = parts
                        .next()
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(|| ParseError::malformed(line_no, "invalid node id"))?;
                    let coords = parts
                        .map(|p| p.parse::<Scalar>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| ParseError::malformed(line_no, e))?;
                    match declared_arity(node_coord_type.as_deref()) {
                        Some(arity) if coords.len() != arity => {
                            let coord_type = node_coord_type.as_deref().unwrap_or_default();
                            return Err(ParseError::malformed(
                                line_no,
                                format!("expected {} coordinates for {}", arity, coord_type),
                            ));
                        }
                        None if coords.len() != 2 && coords.len() != 3 => {
                            return Err(ParseError::malformed(line_no, "expected 2 or 3 coordinates"));
                        }
                        _ => {}
                    }
                    if node_coords.insert(id, coords).is_some() {
                        return Err(ParseError::malformed(line_no, format!("duplicate node {}", id)));
                    }
                }
                Section::EdgeWeights => {
                    for token in line.split_whitespace() {
                        let weight = token.parse::<Scalar>().map_err(|e| ParseError::malformed(line_no, e))?;
                        edge_weights.push(weight);
                    }
                }
                Section::Ignored => {}
                Section::None => {
                    return Err(ParseError::malformed(line_no, "data outside of a section"));
                }
            }
        }

        let dimension = dimension.ok_or(ParseError::MissingKeyword("DIMENSION"))?;
        let edge_weight_type = edge_weight_type.ok_or(ParseError::MissingKeyword("EDGE_WEIGHT_TYPE"))?;

        if edge_weight_type == EdgeWeightType::Explicit {
            match edge_weight_format {
                None => return Err(ParseError::MissingKeyword("EDGE_WEIGHT_FORMAT")),
                Some(EdgeWeightFormat::Function) => {
                    return Err(ParseError::Unsupported {
                        keyword: "EDGE_WEIGHT_FORMAT",
                        value: "FUNCTION with EXPLICIT weights".to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        if let Some(&id) = node_coords.keys().find(|&&id| id == 0 || id > dimension) {
            return Err(ParseError::Malformed {
                line: 0,
                message: format!("node {} outside 1..={}", id, dimension),
            });
        }

        // DIMENSION sizes every later allocation, so it must be backed by data
        if edge_weight_type == EdgeWeightType::Explicit {
            if dimension - 1 > edge_weights.len() {
                return Err(ParseError::malformed(
                    0,
                    format!("DIMENSION {} exceeds the {} explicit weights", dimension, edge_weights.len()),
                ));
            }
        } else {
            let last = node_coords.keys().next_back().copied().unwrap_or(0);
            if last < dimension {
                return Err(ParseError::malformed(
                    0,
                    format!("DIMENSION {} but the last node coordinate is {}", dimension, last),
                ));
            }
        }

        Ok(TspInstance {
            name,
            problem_type: problem_type.unwrap_or_else(|| SYMMETRIC_TSP.to_string()),
            comment: comments.join(" "),
            dimension,
            edge_weight_type,
            edge_weight_format,
            node_coord_type,
            display_data_type,
            node_coords,
            edge_weights,
        })
    }

    /// Read only the NAME keyword of a TSPLIB file, skipping every data line
    pub fn read_name<P: AsRef<Path>>(path: P) -> Result<Option<String>, ParseError> {
        let reader = BufReader::new(File::open(path)?);
        let mut name = None;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line == "EOF" {
                break;
            }
            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                if let ("NAME", value) = split_keyword(line) {
                    name = Some(value.to_string());
                }
            }
        }
        Ok(name)
    }

    /// Whether this is a symmetric TSP instance
    pub fn is_symmetric_tsp(&self) -> bool {
        self.problem_type == SYMMETRIC_TSP
    }

    /// 1-based node indices
    pub fn nodes(&self) -> RangeInclusive<usize> {
        1..=self.dimension
    }

    /// Get the distance between two 1-based nodes, as the edge-weight type defines it
    pub fn distance(&self, i: usize, j: usize) -> Result<Scalar, DistanceError> {
        let n = self.dimension;
        for node in [i, j] {
            if node == 0 || node > n {
                return Err(DistanceError::NodeOutOfRange(node, n));
            }
        }

        match self.edge_weight_type {
            EdgeWeightType::Explicit => {
                let format = self.edge_weight_format.unwrap_or(EdgeWeightFormat::FullMatrix);
                explicit_weight(format, &self.edge_weights, n, i, j)
            }
            weight_type => {
                let needed = weight_type.coordinate_dimensions().unwrap_or(0);
                let a = self.point(i, needed)?;
                let b = self.point(j, needed)?;
                Ok(Scalar::Int(weight_type.coordinate_distance(&a[..needed], &b[..needed])))
            }
        }
    }

    fn point(&self, node: usize, needed: usize) -> Result<[f64; 3], DistanceError> {
        match self.node_coords.get(&node) {
            Some(coords) if coords.len() >= needed => {
                let mut point = [0.0; 3];
                for (slot, c) in point.iter_mut().zip(coords) {
                    *slot = c.as_f64();
                }
                Ok(point)
            }
            _ => Err(DistanceError::MissingCoordinates(node)),
        }
    }

    /// Get a short summary of the instance
    pub fn summary(&self) -> InstanceSummary {
        InstanceSummary {
            name: self.name.clone(),
            problem_type: self.problem_type.clone(),
            dimension: self.dimension,
            edge_weight_type: self.edge_weight_type,
            edge_weight_format: self.edge_weight_format,
            node_coord_type: self.node_coord_type.clone(),
            num_coords: self.node_coords.len(),
            num_edge_weights: self.edge_weights.len(),
            matrix_entries: self.dimension.saturating_mul(self.dimension - 1) / 2,
        }
    }
}

impl FromStr for TspInstance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// Split a keyword line on `:`, or on the first whitespace when there is no colon
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => match line.split_once(char::is_whitespace) {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, ""),
        },
    }
}

fn declared_arity(node_coord_type: Option<&str>) -> Option<usize> {
    match node_coord_type {
        Some("TWOD_COORDS") => Some(2),
        Some("THREED_COORDS") => Some(3),
        _ => None,
    }
}

/// Summary about a TSPLIB instance
#[derive(Debug, Clone)]
pub struct InstanceSummary {
    pub name: String,
    pub problem_type: String,
    pub dimension: usize,
    pub edge_weight_type: EdgeWeightType,
    pub edge_weight_format: Option<EdgeWeightFormat>,
    pub node_coord_type: Option<String>,
    pub num_coords: usize,
    pub num_edge_weights: usize,
    pub matrix_entries: usize,
}

impl std::fmt::Display for InstanceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Type: {}", self.problem_type)?;
        writeln!(f, "  Nodes: {}", self.dimension)?;
        writeln!(f, "  Edge weight type: {}", self.edge_weight_type)?;
        if let Some(format) = self.edge_weight_format {
            writeln!(f, "  Edge weight format: {}", format)?;
        }
        if let Some(coord_type) = &self.node_coord_type {
            writeln!(f, "  Node coordinate type: {}", coord_type)?;
        }
        writeln!(f, "  Coordinates: {}", self.num_coords)?;
        writeln!(f, "  Explicit weights: {}", self.num_edge_weights)?;
        write!(f, "  Matrix entries: {}", self.matrix_entries)
    }
}
