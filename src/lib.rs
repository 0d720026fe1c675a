//! TSPLIB to JSON converter library
//!
//! Converts symmetric TSPLIB instances into self-contained JSON documents that
//! embed the node coordinates, the upper-triangular distance matrix and the
//! best known tour cost, so that solvers written in any language can consume
//! pre-computed distances without a TSPLIB parser.
//!
//! # Features
//!
//! - TSPLIB parser for EUC_2D/3D, MAX, MAN, CEIL_2D, GEO, ATT and explicit matrices
//! - Best known solutions table (`solutions` file)
//! - Upper-triangular distance matrix extraction
//! - Batch conversion of a benchmark directory with per-file error reporting
//!
//! # Example
//!
//! ```no_run
//! use tsplib_json::instance::TspInstance;
//! use tsplib_json::matrix::TriangularMatrix;
//! use tsplib_json::document::OutputDocument;
//!
//! let instance = TspInstance::from_file("burma14.tsp").unwrap();
//! let matrix = TriangularMatrix::extract(&instance).unwrap();
//! let document = OutputDocument::assemble(instance, Some(matrix), None);
//!
//! println!("{}", serde_json::to_string(&document).unwrap());
//! ```

pub mod batch;
pub mod distance;
pub mod document;
pub mod error;
pub mod instance;
pub mod matrix;
pub mod solutions;

pub use batch::{convert_all, BatchConfig, BatchConverter, BatchReport};
pub use document::OutputDocument;
pub use instance::TspInstance;
pub use matrix::TriangularMatrix;
pub use solutions::SolutionTable;
