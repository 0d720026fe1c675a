//! JSON output document: assembly and writing.
//!
//! The document is an explicit projection of the instance. Only the fields
//! listed on [`OutputDocument`] are emitted; raw edge-weight data, display
//! data and any depot/demand sections are dropped.

use crate::distance::{EdgeWeightFormat, EdgeWeightType, Scalar};
use crate::error::ConvertError;
use crate::instance::{TspInstance, SYMMETRIC_TSP};
use crate::matrix::TriangularMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Self-contained JSON record for one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub name: String,
    pub comment: String,
    /// Always `TSP`
    #[serde(rename = "type")]
    pub problem_type: String,
    pub dimension: usize,
    pub edge_weight_type: EdgeWeightType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_weight_format: Option<EdgeWeightFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_coord_section: Option<BTreeMap<usize, Vec<Scalar>>>,
    /// Absent (not null) when the cost is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_known_cost: Option<Scalar>,
    /// Absent when the distances were not requested for this instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances_matrix: Option<TriangularMatrix>,
}

impl OutputDocument {
    /// Combine instance metadata, the distance matrix and the best known cost.
    pub fn assemble(instance: TspInstance, matrix: Option<TriangularMatrix>, best_known_cost: Option<Scalar>) -> Self {
        let node_coord_section = if instance.node_coords.is_empty() {
            None
        } else {
            Some(instance.node_coords)
        };

        OutputDocument {
            name: instance.name,
            comment: instance.comment,
            problem_type: SYMMETRIC_TSP.to_string(),
            dimension: instance.dimension,
            edge_weight_type: instance.edge_weight_type,
            display_data_type: instance.display_data_type,
            edge_weight_format: instance.edge_weight_format,
            node_coord_section,
            best_known_cost,
            distances_matrix: matrix,
        }
    }

    /// Serialize into `path`, going through a temporary sibling file so that an
    /// interrupted write never leaves a truncated document behind.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<(), ConvertError> {
        let tmp_path = temporary_path(path);
        let result = self.write_file(&tmp_path, pretty).and_then(|_| fs::rename(&tmp_path, path));
        result.map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            ConvertError::OutputWrite { path: path.to_path_buf(), source }
        })
    }

    fn write_file(&self, path: &Path, pretty: bool) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    /// Read a document back, e.g. to verify a conversion
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Output file name for an instance: its NAME, or the source file stem when
/// the NAME is empty. Path separators are replaced so the file always lands
/// directly in the output directory.
pub fn output_file_name(instance_name: &str, source_stem: &str) -> String {
    let base = if instance_name.trim().is_empty() { source_stem } else { instance_name.trim() };
    let safe: String = base
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.json", safe)
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
