//! Batch conversion of a benchmark directory.
//!
//! Every `.tsp` file of the source directory is parsed, its distance matrix
//! extracted, its best known cost looked up and the resulting document written
//! to the output directory. A failing instance is recorded in the
//! [`BatchReport`] and the batch moves on; only an unreadable source directory,
//! an output directory that cannot be created or a broken solutions file stop
//! the run, and they do so before anything is written.

use crate::distance::EdgeWeightType;
use crate::document::{output_file_name, OutputDocument};
use crate::error::{BatchError, ConvertError, ErrorKind};
use crate::instance::TspInstance;
use crate::matrix::TriangularMatrix;
use crate::solutions::{SolutionTable, DEFAULT_SOLUTIONS_FILE};

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Directory containing the original `.tsp` files and the solutions file
pub const DEFAULT_SRC_DIR: &str = "./benchmarks/original";
/// Directory receiving the converted documents
pub const DEFAULT_OUT_DIR: &str = "./benchmarks/json";
/// Instances above this many nodes are written without distances unless explicit
pub const DEFAULT_DISTANCES_THRESHOLD: usize = 15000;

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory containing the instance files
    pub src_dir: PathBuf,
    /// Output directory
    pub out_dir: PathBuf,
    /// Solutions listing, resolved against `src_dir` when relative
    pub solutions_file: PathBuf,
    /// Include the distances matrix in the documents
    pub include_distances: bool,
    /// Node count beyond which distances are left out regardless of `include_distances`
    pub distances_threshold: usize,
    /// Pretty-print the JSON
    pub pretty: bool,
    /// Convert files in parallel
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            src_dir: PathBuf::from(DEFAULT_SRC_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            solutions_file: PathBuf::from(DEFAULT_SOLUTIONS_FILE),
            include_distances: true,
            distances_threshold: DEFAULT_DISTANCES_THRESHOLD,
            pretty: false,
            parallel: false,
        }
    }
}

impl BatchConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(src_dir: P, out_dir: Q) -> Self {
        BatchConfig { src_dir: src_dir.into(), out_dir: out_dir.into(), ..Default::default() }
    }

    pub fn solutions_path(&self) -> PathBuf {
        self.src_dir.join(&self.solutions_file)
    }

    /// Explicit instances always carry their matrix since it replaces the raw edge-weight section.
    pub fn includes_distances(&self, instance: &TspInstance) -> bool {
        (self.include_distances && instance.dimension <= self.distances_threshold)
            || instance.edge_weight_type == EdgeWeightType::Explicit
    }
}

/// A successfully written document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedInstance {
    pub file: String,
    pub instance: String,
    pub output: PathBuf,
    pub dimension: usize,
    pub with_distances: bool,
    pub with_best_known_cost: bool,
}

/// A file that parsed but is not a symmetric TSP instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInstance {
    pub file: String,
    pub instance: String,
    pub reason: String,
}

/// A file whose conversion failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedInstance {
    pub file: String,
    pub instance: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of converting one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Converted(ConvertedInstance),
    Skipped(SkippedInstance),
    Failed(FailedInstance),
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Converted(c) => &c.file,
            FileOutcome::Skipped(s) => &s.file,
            FileOutcome::Failed(f) => &f.file,
        }
    }
}

/// Converts instances with a shared, read-only solution table
pub struct BatchConverter {
    config: BatchConfig,
    solutions: SolutionTable,
    files: Vec<PathBuf>,
}

impl BatchConverter {
    pub fn new(config: BatchConfig, solutions: SolutionTable) -> Self {
        BatchConverter { config, solutions, files: Vec::new() }
    }

    /// List the source directory and load the solutions table.
    pub fn open(config: BatchConfig) -> Result<Self, BatchError> {
        let files = collect_instance_files(&config.src_dir)
            .map_err(|source| BatchError::SourceDirectory { path: config.src_dir.clone(), source })?;
        log::info!("Found {} TSP instances in {:?}", files.len(), config.src_dir);

        let solutions = SolutionTable::load(config.solutions_path())?;
        log::info!("Loaded solutions file ({} best known costs)", solutions.len());

        Ok(BatchConverter { config, solutions, files })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Instance files found by [`open`](Self::open), sorted by name
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn run(&self) -> Result<BatchReport, BatchError> {
        self.run_with_progress(|_| {})
    }

    /// Convert every listed file, calling `on_file` after each one.
    pub fn run_with_progress<F>(&self, on_file: F) -> Result<BatchReport, BatchError>
    where
        F: Fn(&FileOutcome) + Send + Sync,
    {
        std::fs::create_dir_all(&self.config.out_dir)
            .map_err(|source| BatchError::OutputDirectory { path: self.config.out_dir.clone(), source })?;

        log::info!(
            "Started converting {} TSP instances in {:?} to JSON...",
            self.files.len(),
            self.config.src_dir
        );

        let outputs = reserve_output_names(&self.files);
        let convert = |(path, output): (&PathBuf, &OutputName)| {
            let outcome = self.convert_file_as(path, Some(output));
            on_file(&outcome);
            outcome
        };
        let outcomes: Vec<FileOutcome> = if self.config.parallel {
            self.files.par_iter().zip(outputs.par_iter()).map(convert).collect()
        } else {
            self.files.iter().zip(outputs.iter()).map(convert).collect()
        };

        let report = BatchReport::from_outcomes(outcomes);
        log::info!(
            "Done converting TSP instances in {:?}: {} converted, {} skipped, {} failed, results written in {:?}",
            self.config.src_dir,
            report.converted.len(),
            report.skipped.len(),
            report.failed.len(),
            self.config.out_dir
        );
        Ok(report)
    }

    /// Convert one instance file into the output directory. Never panics on bad
    /// input: every problem ends up in the returned outcome.
    pub fn convert_file(&self, path: &Path) -> FileOutcome {
        self.convert_file_as(path, None)
    }

    fn convert_file_as(&self, path: &Path, reserved: Option<&OutputName>) -> FileOutcome {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

        log::debug!("Converting TSP instance {} to JSON format...", file);

        let instance = match TspInstance::from_file(path) {
            Ok(instance) => instance,
            Err(e) => return failed(file, None, e.into()),
        };

        if !instance.is_symmetric_tsp() {
            log::info!("Skipping {}: type {} is not a symmetric TSP", file, instance.problem_type);
            return FileOutcome::Skipped(SkippedInstance {
                file,
                reason: format!("unsupported problem type {}", instance.problem_type),
                instance: instance.name,
            });
        }

        let output_name = match reserved {
            None => output_file_name(&instance.name, &stem),
            Some(OutputName::Reserved(name)) => name.clone(),
            Some(OutputName::Taken { name, holder }) => {
                let error = ConvertError::OutputConflict { path: self.config.out_dir.join(name), holder: holder.clone() };
                return failed(file, Some(instance.name), error);
            }
        };

        let name = instance.name.clone();
        match self.convert_instance(instance, &output_name) {
            Ok(mut converted) => {
                log::info!("Done converting TSP instance {}, result saved in {:?}", name, converted.output);
                converted.file = file;
                FileOutcome::Converted(converted)
            }
            Err(e) => failed(file, Some(name), e),
        }
    }

    /// Extract, assemble and write one parsed instance as `out_dir/output_name`.
    pub fn convert_instance(&self, instance: TspInstance, output_name: &str) -> Result<ConvertedInstance, ConvertError> {
        let matrix = if self.config.includes_distances(&instance) {
            Some(TriangularMatrix::extract(&instance)?)
        } else {
            log::info!("Leaving out distances of {} (dimension {})", instance.name, instance.dimension);
            None
        };

        let best_known_cost = self.solutions.lookup(&instance.name);
        if best_known_cost.is_none() {
            log::debug!("No best known cost for {}", instance.name);
        }

        let output = self.config.out_dir.join(output_name);
        let converted = ConvertedInstance {
            file: String::new(),
            instance: instance.name.clone(),
            output: output.clone(),
            dimension: instance.dimension,
            with_distances: matrix.is_some(),
            with_best_known_cost: best_known_cost.is_some(),
        };

        let document = OutputDocument::assemble(instance, matrix, best_known_cost);
        document.write_to(&output, self.config.pretty)?;

        Ok(converted)
    }
}

/// Output file name settled for a listed file before conversion starts
#[derive(Debug, Clone, PartialEq)]
enum OutputName {
    Reserved(String),
    /// Another file, earlier in name order, already holds `name`
    Taken { name: String, holder: String },
}

/// Decide every output name up front, in file order, so that parallel runs
/// write the same files as sequential ones.
///
/// A file normally writes `<NAME>.json`. When several files share a NAME, each
/// of them writes `<file stem>.json` instead; a name still claimed twice after
/// that stays with the first file and the others fail.
fn reserve_output_names(files: &[PathBuf]) -> Vec<OutputName> {
    let stems: Vec<String> = files
        .iter()
        .map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default())
        .collect();
    let preferred: Vec<String> = files
        .iter()
        .zip(&stems)
        .map(|(path, stem)| {
            let name = TspInstance::read_name(path).ok().flatten().unwrap_or_default();
            output_file_name(&name, stem)
        })
        .collect();

    let mut claims: HashMap<&str, usize> = HashMap::new();
    for name in &preferred {
        *claims.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut holders: HashMap<String, String> = HashMap::new();
    files
        .iter()
        .zip(stems.iter().zip(&preferred))
        .map(|(path, (stem, name))| {
            let name = if claims[name.as_str()] > 1 {
                let fallback = output_file_name("", stem);
                log::warn!("{:?} shares its output name {}, writing {} instead", path, name, fallback);
                fallback
            } else {
                name.clone()
            };
            let file = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            match holders.get(&name) {
                Some(holder) => OutputName::Taken { name, holder: holder.clone() },
                None => {
                    holders.insert(name.clone(), file);
                    OutputName::Reserved(name)
                }
            }
        })
        .collect()
}

fn failed(file: String, instance: Option<String>, error: ConvertError) -> FileOutcome {
    log::warn!("Failed to convert TSP instance {} with error {}", file, error);
    FileOutcome::Failed(FailedInstance { file, instance, kind: error.kind(), message: error.to_string() })
}

/// Convert every instance of `src_dir` into `out_dir` with default settings
pub fn convert_all<P: AsRef<Path>, Q: AsRef<Path>>(src_dir: P, out_dir: Q) -> Result<BatchReport, BatchError> {
    let config = BatchConfig::new(src_dir.as_ref(), out_dir.as_ref());
    BatchConverter::open(config)?.run()
}

/// Collect the `.tsp` files of a directory, sorted by file name
pub fn collect_instance_files<P: AsRef<Path>>(dir: P) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|e| e == "tsp").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Summary of a batch run, ordered by file name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub converted: Vec<ConvertedInstance>,
    pub skipped: Vec<SkippedInstance>,
    pub failed: Vec<FailedInstance>,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    file: &'a str,
    instance: &'a str,
    status: &'a str,
    detail: String,
}

impl BatchReport {
    pub fn from_outcomes<I: IntoIterator<Item = FileOutcome>>(outcomes: I) -> Self {
        let mut outcomes: Vec<FileOutcome> = outcomes.into_iter().collect();
        outcomes.sort_by(|a, b| a.file().cmp(b.file()));

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Converted(c) => report.converted.push(c),
                FileOutcome::Skipped(s) => report.skipped.push(s),
                FileOutcome::Failed(f) => report.failed.push(f),
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Export one row per file to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> csv::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for c in &self.converted {
            writer.serialize(ReportRow {
                file: &c.file,
                instance: &c.instance,
                status: "converted",
                detail: c.output.display().to_string(),
            })?;
        }
        for s in &self.skipped {
            writer.serialize(ReportRow { file: &s.file, instance: &s.instance, status: "skipped", detail: s.reason.clone() })?;
        }
        for f in &self.failed {
            writer.serialize(ReportRow {
                file: &f.file,
                instance: f.instance.as_deref().unwrap_or(""),
                status: "failed",
                detail: format!("{}: {}", f.kind, f.message),
            })?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       TSPLIB to JSON Conversion\n");
        report.push_str("========================================\n\n");
        report.push_str(&format!(
            "Files: {}  Converted: {}  Skipped: {}  Failed: {}\n",
            self.total(),
            self.converted.len(),
            self.skipped.len(),
            self.failed.len()
        ));

        if !self.converted.is_empty() {
            report.push_str("\nConverted:\n");
            for c in &self.converted {
                let mut notes = Vec::new();
                if !c.with_distances {
                    notes.push("no distances");
                }
                if !c.with_best_known_cost {
                    notes.push("unknown best cost");
                }
                let notes = if notes.is_empty() { String::new() } else { format!(" ({})", notes.join(", ")) };
                report.push_str(&format!("  {:<20} n={:<8}{}\n", c.instance, c.dimension, notes));
            }
        }

        if !self.skipped.is_empty() {
            report.push_str("\nSkipped:\n");
            for s in &self.skipped {
                report.push_str(&format!("  {}: {}\n", s.file, s.reason));
            }
        }

        if !self.failed.is_empty() {
            report.push_str("\nFailed:\n");
            for f in &self.failed {
                report.push_str(&format!("  {}: [{}] {}\n", f.file, f.kind, f.message));
            }
        }

        report
    }
}
