//! Upper-triangular distance matrix extraction.

use crate::distance::Scalar;
use crate::error::ConvertError;
use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};

/// Distances strictly above the diagonal, stored as ragged rows.
///
/// Row `k` (0-based) holds `d(k+1, j)` for `j = k+2..=N` in increasing `j`,
/// so row lengths run `N-1, N-2, ..., 0` and the last row is always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriangularMatrix {
    rows: Vec<Vec<Scalar>>,
}

impl TriangularMatrix {
    /// Compute the matrix from the instance distance function.
    ///
    /// The diagonal and the lower triangle are never evaluated. The first
    /// failing pair aborts extraction; no default value is substituted.
    pub fn extract(instance: &TspInstance) -> Result<Self, ConvertError> {
        let n = instance.dimension;
        log::debug!(
            "Collecting distances for {}, dimension={}, distance type={}",
            instance.name,
            n,
            instance.edge_weight_type
        );

        let mut rows = Vec::with_capacity(n);
        for i in instance.nodes() {
            let row = (i + 1..=n)
                .map(|j| instance.distance(i, j).map_err(|source| ConvertError::Distance { i, j, source }))
                .collect::<Result<Vec<_>, _>>()?;
            log::trace!("{}: row {} has {} entries", instance.name, i, row.len());
            rows.push(row);
        }

        Ok(TriangularMatrix { rows })
    }

    /// Number of nodes (and rows)
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Distance between 1-based nodes, read back from the triangle
    pub fn get(&self, i: usize, j: usize) -> Option<Scalar> {
        let n = self.dimension();
        if i == 0 || j == 0 || i > n || j > n {
            return None;
        }
        if i == j {
            return Some(Scalar::Int(0));
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.rows[lo - 1].get(hi - lo - 1).copied()
    }

    /// Total number of stored entries, `N * (N - 1) / 2`
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DistanceError;

    const BURMA14: &str = include_str!("../benchmarks/original/burma14.tsp");

    fn euc(points: &[(i64, i64)]) -> TspInstance {
        let mut text = format!(
            "NAME: pts\nTYPE: TSP\nDIMENSION: {}\nEDGE_WEIGHT_TYPE: EUC_2D\nNODE_COORD_SECTION\n",
            points.len()
        );
        for (k, (x, y)) in points.iter().enumerate() {
            text.push_str(&format!("{} {} {}\n", k + 1, x, y));
        }
        text.push_str("EOF\n");
        text.parse().unwrap()
    }

    #[test]
    fn test_row_lengths() {
        let instance: TspInstance = BURMA14.parse().unwrap();
        let matrix = TriangularMatrix::extract(&instance).unwrap();

        assert_eq!(matrix.dimension(), 14);
        for (k, row) in matrix.rows().iter().enumerate() {
            assert_eq!(row.len(), 14 - k - 1);
        }
        assert_eq!(matrix.len(), 91);
        assert_eq!(matrix.rows()[12], vec![Scalar::Int(247)]);
        assert!(matrix.rows()[13].is_empty());
        assert_eq!(
            matrix.rows()[0][..4],
            [Scalar::Int(153), Scalar::Int(510), Scalar::Int(706), Scalar::Int(966)]
        );
    }

    #[test]
    fn test_entries_match_distance_function() {
        let instance: TspInstance = BURMA14.parse().unwrap();
        let matrix = TriangularMatrix::extract(&instance).unwrap();

        for i in 1..=14 {
            for j in i + 1..=14 {
                let expected = instance.distance(i, j).unwrap();
                assert_eq!(matrix.rows()[i - 1][j - i - 1], expected);
                assert_eq!(matrix.get(j, i), Some(expected));
            }
        }
        assert_eq!(matrix.get(3, 3), Some(Scalar::Int(0)));
        assert_eq!(matrix.get(0, 3), None);
        assert_eq!(matrix.get(1, 15), None);
    }

    #[test]
    fn test_single_node() {
        let matrix = TriangularMatrix::extract(&euc(&[(4, 4)])).unwrap();
        assert_eq!(matrix.dimension(), 1);
        assert!(matrix.rows()[0].is_empty());
        assert!(matrix.is_empty());
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[]]");
    }

    #[test]
    fn test_small_euclidean() {
        let matrix = TriangularMatrix::extract(&euc(&[(0, 0), (3, 4), (6, 8)])).unwrap();
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[5,10],[5],[]]");
    }

    #[test]
    fn test_failing_pair_is_reported() {
        let text = "NAME: gap\nTYPE: TSP\nDIMENSION: 3\nEDGE_WEIGHT_TYPE: EUC_2D\nNODE_COORD_SECTION\n1 0 0\n3 3 4\nEOF\n";
        let instance: TspInstance = text.parse().unwrap();
        match TriangularMatrix::extract(&instance) {
            Err(ConvertError::Distance { i, j, source }) => {
                assert_eq!((i, j), (1, 2));
                assert_eq!(source, DistanceError::MissingCoordinates(2));
            }
            other => panic!("expected distance error, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_reals_are_preserved() {
        let text = "NAME: r3\nTYPE: TSP\nDIMENSION: 3\nEDGE_WEIGHT_TYPE: EXPLICIT\nEDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW\nEDGE_WEIGHT_SECTION\n0\n1.5 0\n2 2.25 0\nEOF\n";
        let instance: TspInstance = text.parse().unwrap();
        let matrix = TriangularMatrix::extract(&instance).unwrap();
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[1.5,2],[2.25],[]]");
    }
}
