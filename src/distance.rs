//! TSPLIB edge-weight types and distance functions.
//!
//! Every coordinate-based function rounds the way TSPLIB defines it, so the
//! values produced here are the integral distances published alongside the
//! benchmark instances. Explicit weights keep whatever lexical kind the
//! source file used.

use crate::error::DistanceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A number read from (or written to) an instance, keeping integer vs real.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Real(f64),
}

impl Scalar {
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Real(v) => v,
        }
    }
}

impl FromStr for Scalar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Scalar::Int(v));
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Scalar::Real(v)),
            _ => Err(format!("invalid number '{}'", s)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Real(v) => write!(f, "{}", v),
        }
    }
}

/// Formula selecting how inter-node distances are derived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeWeightType {
    #[serde(rename = "EXPLICIT")]
    Explicit,
    #[serde(rename = "EUC_2D")]
    Euc2d,
    #[serde(rename = "EUC_3D")]
    Euc3d,
    #[serde(rename = "MAX_2D")]
    Max2d,
    #[serde(rename = "MAX_3D")]
    Max3d,
    #[serde(rename = "MAN_2D")]
    Man2d,
    #[serde(rename = "MAN_3D")]
    Man3d,
    #[serde(rename = "CEIL_2D")]
    Ceil2d,
    #[serde(rename = "GEO")]
    Geo,
    #[serde(rename = "ATT")]
    Att,
}

impl EdgeWeightType {
    pub fn name(self) -> &'static str {
        match self {
            EdgeWeightType::Explicit => "EXPLICIT",
            EdgeWeightType::Euc2d => "EUC_2D",
            EdgeWeightType::Euc3d => "EUC_3D",
            EdgeWeightType::Max2d => "MAX_2D",
            EdgeWeightType::Max3d => "MAX_3D",
            EdgeWeightType::Man2d => "MAN_2D",
            EdgeWeightType::Man3d => "MAN_3D",
            EdgeWeightType::Ceil2d => "CEIL_2D",
            EdgeWeightType::Geo => "GEO",
            EdgeWeightType::Att => "ATT",
        }
    }

    /// Number of coordinate components the formula reads, `None` for explicit weights.
    pub fn coordinate_dimensions(self) -> Option<usize> {
        match self {
            EdgeWeightType::Explicit => None,
            EdgeWeightType::Euc3d | EdgeWeightType::Max3d | EdgeWeightType::Man3d => Some(3),
            _ => Some(2),
        }
    }

    /// Distance between two coordinate vectors. Both slices must carry at least
    /// [`coordinate_dimensions`](Self::coordinate_dimensions) components.
    pub fn coordinate_distance(self, a: &[f64], b: &[f64]) -> i64 {
        match self {
            EdgeWeightType::Euc2d | EdgeWeightType::Euc3d => nint(euclidean(a, b)),
            EdgeWeightType::Ceil2d => euclidean(a, b).ceil() as i64,
            EdgeWeightType::Max2d | EdgeWeightType::Max3d => a
                .iter()
                .zip(b)
                .map(|(x, y)| nint((x - y).abs()))
                .max()
                .unwrap_or(0),
            EdgeWeightType::Man2d | EdgeWeightType::Man3d => {
                nint(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum())
            }
            EdgeWeightType::Geo => geo(a, b),
            EdgeWeightType::Att => att(a, b),
            EdgeWeightType::Explicit => 0,
        }
    }
}

impl fmt::Display for EdgeWeightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeWeightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "EXPLICIT" => EdgeWeightType::Explicit,
            "EUC_2D" => EdgeWeightType::Euc2d,
            "EUC_3D" => EdgeWeightType::Euc3d,
            "MAX_2D" => EdgeWeightType::Max2d,
            "MAX_3D" => EdgeWeightType::Max3d,
            "MAN_2D" => EdgeWeightType::Man2d,
            "MAN_3D" => EdgeWeightType::Man3d,
            "CEIL_2D" => EdgeWeightType::Ceil2d,
            "GEO" => EdgeWeightType::Geo,
            "ATT" => EdgeWeightType::Att,
            other => return Err(other.to_string()),
        })
    }
}

/// Layout of an EDGE_WEIGHT_SECTION.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeWeightFormat {
    Function,
    FullMatrix,
    UpperRow,
    LowerRow,
    UpperDiagRow,
    LowerDiagRow,
    UpperCol,
    LowerCol,
    UpperDiagCol,
    LowerDiagCol,
}

impl EdgeWeightFormat {
    pub fn name(self) -> &'static str {
        match self {
            EdgeWeightFormat::Function => "FUNCTION",
            EdgeWeightFormat::FullMatrix => "FULL_MATRIX",
            EdgeWeightFormat::UpperRow => "UPPER_ROW",
            EdgeWeightFormat::LowerRow => "LOWER_ROW",
            EdgeWeightFormat::UpperDiagRow => "UPPER_DIAG_ROW",
            EdgeWeightFormat::LowerDiagRow => "LOWER_DIAG_ROW",
            EdgeWeightFormat::UpperCol => "UPPER_COL",
            EdgeWeightFormat::LowerCol => "LOWER_COL",
            EdgeWeightFormat::UpperDiagCol => "UPPER_DIAG_COL",
            EdgeWeightFormat::LowerDiagCol => "LOWER_DIAG_COL",
        }
    }

    /// Position of the (0-based) pair `(a, b)` inside the weight stream of an
    /// `n`-node instance. `None` means the pair is on a diagonal the format
    /// does not store, whose weight is zero.
    ///
    /// Column-wise formats are the transposes of the row-wise ones, which for a
    /// symmetric instance is the same stream with the roles of the two triangles
    /// swapped.
    pub fn weight_index(self, n: usize, a: usize, b: usize) -> Option<usize> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        match self {
            EdgeWeightFormat::Function => None,
            EdgeWeightFormat::FullMatrix => Some(a * n + b),
            EdgeWeightFormat::UpperRow | EdgeWeightFormat::LowerCol => {
                (lo != hi).then(|| lo * (n - 1) - lo * lo.saturating_sub(1) / 2 + (hi - lo - 1))
            }
            EdgeWeightFormat::LowerRow | EdgeWeightFormat::UpperCol => {
                (lo != hi).then(|| hi * (hi - 1) / 2 + lo)
            }
            EdgeWeightFormat::UpperDiagRow | EdgeWeightFormat::LowerDiagCol => {
                Some(lo * n - lo * lo.saturating_sub(1) / 2 + (hi - lo))
            }
            EdgeWeightFormat::LowerDiagRow | EdgeWeightFormat::UpperDiagCol => {
                Some(hi * (hi + 1) / 2 + lo)
            }
        }
    }

    /// Number of weights a complete section holds for `n` nodes.
    pub fn expected_len(self, n: usize) -> usize {
        match self {
            EdgeWeightFormat::Function => 0,
            EdgeWeightFormat::FullMatrix => n * n,
            EdgeWeightFormat::UpperRow
            | EdgeWeightFormat::LowerRow
            | EdgeWeightFormat::UpperCol
            | EdgeWeightFormat::LowerCol => n * n.saturating_sub(1) / 2,
            _ => n * (n + 1) / 2,
        }
    }
}

impl fmt::Display for EdgeWeightFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeWeightFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "FUNCTION" => EdgeWeightFormat::Function,
            "FULL_MATRIX" => EdgeWeightFormat::FullMatrix,
            "UPPER_ROW" => EdgeWeightFormat::UpperRow,
            "LOWER_ROW" => EdgeWeightFormat::LowerRow,
            "UPPER_DIAG_ROW" => EdgeWeightFormat::UpperDiagRow,
            "LOWER_DIAG_ROW" => EdgeWeightFormat::LowerDiagRow,
            "UPPER_COL" => EdgeWeightFormat::UpperCol,
            "LOWER_COL" => EdgeWeightFormat::LowerCol,
            "UPPER_DIAG_COL" => EdgeWeightFormat::UpperDiagCol,
            "LOWER_DIAG_COL" => EdgeWeightFormat::LowerDiagCol,
            other => return Err(other.to_string()),
        })
    }
}

/// Looks up an explicit weight for the 1-based pair `(i, j)`.
pub fn explicit_weight(
    format: EdgeWeightFormat,
    weights: &[Scalar],
    n: usize,
    i: usize,
    j: usize,
) -> Result<Scalar, DistanceError> {
    match format.weight_index(n, i - 1, j - 1) {
        None => Ok(Scalar::Int(0)),
        Some(index) => weights
            .get(index)
            .copied()
            .ok_or(DistanceError::MissingWeight { index, available: weights.len() }),
    }
}

/// TSPLIB `nint`: round half up.
#[inline]
fn nint(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

#[inline]
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

const GEO_PI: f64 = 3.141592;
const EARTH_RADIUS: f64 = 6378.388;

/// Converts a `DDD.MM` coordinate into radians.
#[inline]
fn geo_radians(x: f64) -> f64 {
    let deg = x.trunc();
    let min = x - deg;
    GEO_PI * (deg + 5.0 * min / 3.0) / 180.0
}

fn geo(a: &[f64], b: &[f64]) -> i64 {
    let (lat_a, lon_a) = (geo_radians(a[0]), geo_radians(a[1]));
    let (lat_b, lon_b) = (geo_radians(b[0]), geo_radians(b[1]));
    let q1 = (lon_a - lon_b).cos();
    let q2 = (lat_a - lat_b).cos();
    let q3 = (lat_a + lat_b).cos();
    let arg = (0.5 * ((1.0 + q1) * q2 - (1.0 - q1) * q3)).clamp(-1.0, 1.0);
    (EARTH_RADIUS * arg.acos() + 1.0) as i64
}

/// Pseudo-Euclidean distance used by the `att` instances.
fn att(a: &[f64], b: &[f64]) -> i64 {
    let xd = a[0] - b[0];
    let yd = a[1] - b[1];
    let r = ((xd * xd + yd * yd) / 10.0).sqrt();
    let t = nint(r);
    if (t as f64) < r {
        t + 1
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_keeps_lexical_kind() {
        assert_eq!("42".parse::<Scalar>().unwrap(), Scalar::Int(42));
        assert_eq!("-7".parse::<Scalar>().unwrap(), Scalar::Int(-7));
        assert_eq!("16.47".parse::<Scalar>().unwrap(), Scalar::Real(16.47));
        assert_eq!("1e3".parse::<Scalar>().unwrap(), Scalar::Real(1000.0));
        assert!("abc".parse::<Scalar>().is_err());
        assert!("NaN".parse::<Scalar>().is_err());

        assert_eq!(serde_json::to_string(&Scalar::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Scalar::Real(2.5)).unwrap(), "2.5");
    }

    #[test]
    fn test_euclidean_rounding() {
        let t = EdgeWeightType::Euc2d;
        assert_eq!(t.coordinate_distance(&[0.0, 0.0], &[3.0, 4.0]), 5);
        // sqrt(2) = 1.414 -> 1, sqrt(2.25 + 0) = 1.5 -> 2
        assert_eq!(t.coordinate_distance(&[0.0, 0.0], &[1.0, 1.0]), 1);
        assert_eq!(t.coordinate_distance(&[0.0, 0.0], &[1.5, 0.0]), 2);
        assert_eq!(EdgeWeightType::Ceil2d.coordinate_distance(&[0.0, 0.0], &[1.0, 1.0]), 2);
        assert_eq!(EdgeWeightType::Euc3d.coordinate_distance(&[0.0, 0.0, 0.0], &[2.0, 3.0, 6.0]), 7);
    }

    #[test]
    fn test_max_and_manhattan() {
        assert_eq!(EdgeWeightType::Max2d.coordinate_distance(&[0.0, 0.0], &[3.0, -7.0]), 7);
        assert_eq!(EdgeWeightType::Man2d.coordinate_distance(&[0.0, 0.0], &[3.0, -7.0]), 10);
        assert_eq!(EdgeWeightType::Man3d.coordinate_distance(&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0]), 3);
    }

    #[test]
    fn test_geo_burma14_pair() {
        // nodes 13 and 14 of burma14
        let d = EdgeWeightType::Geo.coordinate_distance(&[19.41, 97.13], &[20.09, 94.55]);
        assert_eq!(d, 247);
        let d = EdgeWeightType::Geo.coordinate_distance(&[16.47, 96.10], &[16.47, 94.44]);
        assert_eq!(d, 153);
    }

    #[test]
    fn test_att_rounds_up() {
        // r = sqrt(1000 / 10) = 10 exactly
        assert_eq!(EdgeWeightType::Att.coordinate_distance(&[0.0, 0.0], &[10.0, 30.0]), 10);
        // r = sqrt(20 / 10) = 1.414, nint = 1 < r
        assert_eq!(EdgeWeightType::Att.coordinate_distance(&[0.0, 0.0], &[2.0, 4.0]), 2);
    }

    #[test]
    fn test_weight_index_layouts() {
        // 4 nodes, upper row: (0,1)(0,2)(0,3)(1,2)(1,3)(2,3)
        let f = EdgeWeightFormat::UpperRow;
        assert_eq!(f.weight_index(4, 0, 1), Some(0));
        assert_eq!(f.weight_index(4, 0, 3), Some(2));
        assert_eq!(f.weight_index(4, 1, 2), Some(3));
        assert_eq!(f.weight_index(4, 3, 2), Some(5));
        assert_eq!(f.weight_index(4, 2, 2), None);

        // lower row: (1,0)(2,0)(2,1)(3,0)(3,1)(3,2)
        let f = EdgeWeightFormat::LowerRow;
        assert_eq!(f.weight_index(4, 1, 0), Some(0));
        assert_eq!(f.weight_index(4, 0, 2), Some(1));
        assert_eq!(f.weight_index(4, 3, 2), Some(5));

        // upper diag row: (0,0)(0,1)(0,2)(0,3)(1,1)(1,2)(1,3)(2,2)(2,3)(3,3)
        let f = EdgeWeightFormat::UpperDiagRow;
        assert_eq!(f.weight_index(4, 0, 0), Some(0));
        assert_eq!(f.weight_index(4, 1, 1), Some(4));
        assert_eq!(f.weight_index(4, 1, 3), Some(6));
        assert_eq!(f.weight_index(4, 3, 3), Some(9));

        // lower diag row: (0,0)(1,0)(1,1)(2,0)(2,1)(2,2)(3,0)...
        let f = EdgeWeightFormat::LowerDiagRow;
        assert_eq!(f.weight_index(4, 2, 1), Some(4));
        assert_eq!(f.weight_index(4, 3, 0), Some(6));
        assert_eq!(f.weight_index(4, 3, 3), Some(9));

        assert_eq!(EdgeWeightFormat::FullMatrix.weight_index(4, 2, 1), Some(9));
    }

    #[test]
    fn test_weight_index_column_layouts() {
        // upper col: (0,1)(0,2)(1,2)(0,3)(1,3)(2,3)
        let f = EdgeWeightFormat::UpperCol;
        assert_eq!(f.weight_index(4, 0, 1), Some(0));
        assert_eq!(f.weight_index(4, 1, 2), Some(2));
        assert_eq!(f.weight_index(4, 3, 2), Some(5));
        assert_eq!(f.weight_index(4, 1, 1), None);

        // lower col: (1,0)(2,0)(3,0)(2,1)(3,1)(3,2)
        let f = EdgeWeightFormat::LowerCol;
        assert_eq!(f.weight_index(4, 3, 0), Some(2));
        assert_eq!(f.weight_index(4, 1, 2), Some(3));
        assert_eq!(f.weight_index(4, 3, 2), Some(5));
        assert_eq!(f.weight_index(4, 0, 0), None);

        // upper diag col: (0,0)(0,1)(1,1)(0,2)(1,2)(2,2)(0,3)...
        let f = EdgeWeightFormat::UpperDiagCol;
        assert_eq!(f.weight_index(4, 1, 1), Some(2));
        assert_eq!(f.weight_index(4, 2, 1), Some(4));
        assert_eq!(f.weight_index(4, 0, 3), Some(6));

        // lower diag col: (0,0)(1,0)(2,0)(3,0)(1,1)(2,1)(3,1)(2,2)(3,2)(3,3)
        let f = EdgeWeightFormat::LowerDiagCol;
        assert_eq!(f.weight_index(4, 3, 0), Some(3));
        assert_eq!(f.weight_index(4, 1, 2), Some(5));
        assert_eq!(f.weight_index(4, 3, 2), Some(8));
        assert_eq!(f.weight_index(4, 3, 3), Some(9));
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(EdgeWeightFormat::FullMatrix.expected_len(5), 25);
        assert_eq!(EdgeWeightFormat::UpperRow.expected_len(5), 10);
        assert_eq!(EdgeWeightFormat::LowerDiagRow.expected_len(5), 15);
        assert_eq!(EdgeWeightFormat::UpperRow.expected_len(1), 0);
    }

    #[test]
    fn test_explicit_weight_reports_missing_value() {
        let weights = vec![Scalar::Int(1), Scalar::Int(2)];
        assert_eq!(explicit_weight(EdgeWeightFormat::UpperRow, &weights, 3, 1, 3), Ok(Scalar::Int(2)));
        assert_eq!(explicit_weight(EdgeWeightFormat::UpperRow, &weights, 3, 2, 2), Ok(Scalar::Int(0)));
        assert_eq!(
            explicit_weight(EdgeWeightFormat::UpperRow, &weights, 3, 2, 3),
            Err(DistanceError::MissingWeight { index: 2, available: 2 })
        );
    }

    #[test]
    fn test_names_round_trip() {
        for name in ["EUC_2D", "GEO", "ATT", "CEIL_2D", "EXPLICIT", "MAN_3D"] {
            let t: EdgeWeightType = name.parse().unwrap();
            assert_eq!(t.name(), name);
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", name));
        }
        let f: EdgeWeightFormat = "UPPER_DIAG_ROW".parse().unwrap();
        assert_eq!(serde_json::to_string(&f).unwrap(), "\"UPPER_DIAG_ROW\"");
    }
}
