//! Best-known tour costs for TSPLIB instances.
//!
//! The listing is the `solutions` file shipped with TSPLIB: one `name : cost`
//! record per line. `#` comment lines and blank lines are skipped; any other
//! malformed line aborts the load.

use crate::distance::Scalar;
use crate::error::SolutionError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Name of the solutions listing inside a benchmark directory.
pub const DEFAULT_SOLUTIONS_FILE: &str = "solutions";

/// Best known tour cost by instance name. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionTable {
    best_known: HashMap<String, Scalar>,
}

impl SolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a solutions file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SolutionError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SolutionError::NotFound(path.to_path_buf()),
            _ => SolutionError::Io(e),
        })?;
        let table = Self::from_reader(file)?;
        log::debug!("Loaded {} best known costs from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SolutionError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b':')
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut table = SolutionTable::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            if record.len() != 2 {
                return Err(SolutionError::Parse {
                    line,
                    message: format!("expected 'name : cost', got {} fields", record.len()),
                });
            }

            let name = &record[0];
            if name.is_empty() {
                return Err(SolutionError::Parse { line, message: "empty instance name".to_string() });
            }
            let cost: Scalar = record[1]
                .parse()
                .map_err(|message| SolutionError::Parse { line, message })?;

            table.set_best_known(name, cost);
        }

        Ok(table)
    }

    /// Set best known cost for an instance
    pub fn set_best_known(&mut self, instance_name: &str, cost: Scalar) {
        self.best_known.insert(instance_name.to_string(), cost);
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, instance_name: &str) -> Option<Scalar> {
        self.best_known.get(instance_name).copied()
    }

    pub fn len(&self) -> usize {
        self.best_known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_shipped_solutions() {
        let table = SolutionTable::from_reader(include_str!("../benchmarks/original/solutions").as_bytes()).unwrap();
        assert_eq!(table.lookup("burma14"), Some(Scalar::Int(3323)));
        assert_eq!(table.lookup("a280"), Some(Scalar::Int(2579)));
        assert_eq!(table.lookup("Burma14"), None);
        assert_eq!(table.lookup("burma"), None);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# header\n\nberlin52 : 7542\n   \n# trailing\nst70:675.5\n";
        let table = SolutionTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("berlin52"), Some(Scalar::Int(7542)));
        assert_eq!(table.lookup("st70"), Some(Scalar::Real(675.5)));
    }

    #[test]
    fn test_malformed_cost_aborts() {
        let text = "berlin52 : 7542\nbad : seven\neil51 : 426\n";
        match SolutionTable::from_reader(text.as_bytes()) {
            Err(SolutionError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }

        let text = "berlin52 7542\n";
        assert!(matches!(
            SolutionTable::from_reader(text.as_bytes()),
            Err(SolutionError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SOLUTIONS_FILE);
        assert!(matches!(SolutionTable::load(&path), Err(SolutionError::NotFound(p)) if p == path));
    }
}
