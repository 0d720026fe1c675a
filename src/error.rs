//! Error types for parsing, distance computation, solution tables and batch conversion.
//!
//! Per-instance errors ([`ParseError`], [`DistanceError`], [`ConvertError`]) are caught
//! by the batch converter and recorded in its report. [`SolutionError`] and
//! [`BatchError`] abort a whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading a TSPLIB instance file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read instance file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("missing required keyword {0}")]
    MissingKeyword(&'static str),

    #[error("unsupported {keyword}: '{value}'")]
    Unsupported { keyword: &'static str, value: String },
}

impl ParseError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        ParseError::Malformed { line, message: message.into() }
    }
}

/// Failure of the distance function for a specific node pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    #[error("node {0} is outside 1..={1}")]
    NodeOutOfRange(usize, usize),

    #[error("no coordinates for node {0}")]
    MissingCoordinates(usize),

    #[error("explicit weight #{index} is missing ({available} values parsed)")]
    MissingWeight { index: usize, available: usize },
}

/// Failure while loading the best-known-solution table.
#[derive(Debug, Error)]
pub enum SolutionError {
    #[error("solutions file {0} does not exist")]
    NotFound(PathBuf),

    #[error("solutions file line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("cannot read solutions file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for SolutionError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SolutionError::Io(io),
            other => SolutionError::Parse { line, message: format!("{:?}", other) },
        }
    }
}

/// Failure converting one instance. Never propagates past the batch boundary.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("distance computation failed for pair ({i}, {j}): {source}")]
    Distance {
        i: usize,
        j: usize,
        #[source]
        source: DistanceError,
    },

    #[error("cannot write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is already reserved for {holder}")]
    OutputConflict { path: PathBuf, holder: String },
}

/// Coarse classification of a [`ConvertError`] used in batch reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    Parse,
    DistanceComputation,
    OutputWrite,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Parse => "ParseError",
            ErrorKind::DistanceComputation => "DistanceComputationError",
            ErrorKind::OutputWrite => "OutputWriteError",
        };
        f.write_str(name)
    }
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Parse(_) => ErrorKind::Parse,
            ConvertError::Distance { .. } => ErrorKind::DistanceComputation,
            ConvertError::OutputWrite { .. } | ConvertError::OutputConflict { .. } => ErrorKind::OutputWrite,
        }
    }
}

/// Fatal batch failure: nothing has been written when one of these is returned.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot read source directory {path}: {source}")]
    SourceDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Solutions(#[from] SolutionError),
}
