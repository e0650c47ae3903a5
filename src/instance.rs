//! Distance matrix representation and loading.
//!
//! A [`DistanceMatrix`] is the only problem input the solvers consume: a square,
//! non-negative, symmetric grid of travel costs between `n >= 2` locations.
//! It is validated once on construction so every solver can borrow it without
//! re-checking. This module also holds the single tour cost function and the
//! CSV/JSON loaders used by the command line tool.

use crate::error::{Result, TspError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Relative tolerance used when checking `d[i][j] == d[j][i]`
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Validated n×n travel cost matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    /// Number of locations
    dimension: usize,
    /// Row-major weights, `weights[i][j]` is the cost of travelling from i to j
    weights: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build a matrix from rows, checking shape, weights and symmetry.
    pub fn new(weights: Vec<Vec<f64>>) -> Result<Self> {
        let n = weights.len();
        if n == 0 {
            return Err(TspError::EmptyMatrix);
        }

        for (row, values) in weights.iter().enumerate() {
            if values.len() != n {
                return Err(TspError::NotSquare {
                    row,
                    expected: n,
                    found: values.len(),
                });
            }
        }

        if n < 2 {
            return Err(TspError::TooFewCities(n));
        }

        for (row, values) in weights.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(TspError::InvalidWeight { row, col, value });
                }
            }
        }

        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (weights[i][j], weights[j][i]);
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(TspError::Asymmetric { row: i, col: j });
                }
            }
        }

        Ok(DistanceMatrix {
            dimension: n,
            weights,
        })
    }

    /// Same as [`DistanceMatrix::new`] but borrowing the rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::new(rows.to_vec())
    }

    /// Euclidean distance matrix between 2D points
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self> {
        let n = points.len();
        let mut weights = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dx = points[i].0 - points[j].0;
                    let dy = points[i].1 - points[j].1;
                    weights[i][j] = (dx * dx + dy * dy).sqrt();
                }
            }
        }

        Self::new(weights)
    }

    /// Load a matrix from a file, picking the format from its extension
    /// (`.json` for JSON, anything else is read as CSV).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_json = path
            .as_ref()
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_csv_file(path)
        }
    }

    /// Load a matrix stored as a JSON array of rows.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let rows: Vec<Vec<f64>> = serde_json::from_reader(BufReader::new(file))?;
        Self::new(rows)
    }

    /// Load a matrix stored as CSV.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse CSV data into a matrix.
    ///
    /// A header row and a leading label column are detected and skipped, the
    /// way spreadsheet exports usually carry them. Blank cells read as zero.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            records.push(record.iter().map(str::to_string).collect());
        }

        let is_text = |c: &String| !c.is_empty() && c.parse::<f64>().is_err();

        // Header: some textual cell, or a numeric label row with no corner cell.
        // A blank corner on its own is just an empty diagonal entry.
        let header = match records.first() {
            Some(first) => {
                let textual = first.iter().any(is_text);
                let missing_corner = records
                    .get(1)
                    .map(|next| first.len() + 1 == next.len())
                    .unwrap_or(false);
                textual || missing_corner
            }
            None => false,
        };
        let skip_rows = usize::from(header);
        let data = &records[skip_rows..];

        // Label column: a textual first cell, or one column more than there are rows
        let skip_cols = match data.first() {
            Some(first) => {
                let textual = first.first().map(is_text).unwrap_or(false);
                let extra_column = data.iter().all(|r| r.len() == data.len() + 1);
                usize::from(textual || extra_column)
            }
            None => 0,
        };

        let mut rows = Vec::with_capacity(data.len());
        for (r, record) in data.iter().enumerate() {
            let mut row = Vec::with_capacity(record.len().saturating_sub(skip_cols));
            for (c, cell) in record.iter().enumerate().skip(skip_cols) {
                let (file_row, file_col) = (r + skip_rows + 1, c + 1);
                if cell.is_empty() {
                    log::warn!("Cell ({}, {}) is empty, reading it as 0", file_row, file_col);
                    row.push(0.0);
                    continue;
                }
                let value = cell.parse::<f64>().map_err(|_| TspError::Parse {
                    row: file_row,
                    col: file_col,
                    value: cell.clone(),
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        let matrix = Self::new(rows)?;
        log::info!("Read {0}x{0} distance matrix", matrix.dimension);
        Ok(matrix)
    }

    /// Number of locations
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Travel cost from `i` to `j`
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.weights[i][j]
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Cost of the closed tour visiting `cities` in order and returning to
    /// the first one. This is the one cost function every solver uses.
    pub fn tour_cost(&self, cities: &[usize]) -> f64 {
        let n = cities.len();
        (0..n)
            .map(|k| self.distance(cities[k], cities[(k + 1) % n]))
            .sum()
    }

    /// Summary statistics over the off-diagonal weights
    pub fn statistics(&self) -> MatrixStatistics {
        let n = self.dimension;
        let mut min = f64::INFINITY;
        let mut max: f64 = 0.0;
        let mut total = 0.0;
        let mut count = 0usize;

        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                min = min.min(d);
                max = max.max(d);
                total += d;
                count += 1;
            }
        }

        MatrixStatistics {
            dimension: n,
            min_distance: min,
            avg_distance: total / count as f64,
            max_distance: max,
        }
    }
}

impl<'de> Deserialize<'de> for DistanceMatrix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            weights: Vec<Vec<f64>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        DistanceMatrix::new(raw.weights).map_err(serde::de::Error::custom)
    }
}

/// Statistics about a distance matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixStatistics {
    pub dimension: usize,
    pub min_distance: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for MatrixStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cities: {}", self.dimension)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
