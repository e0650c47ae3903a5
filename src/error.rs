//! Error types for the TSP solvers.
//!
//! Input problems (a malformed distance matrix) and configuration problems
//! (bad tunables, unknown move selectors) are reported before any route is
//! generated. I/O and parse failures only come from the loaders and the
//! experiment runner.

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, TspError>;

/// Everything that can go wrong while loading a matrix or running a solver
#[derive(Error, Debug)]
pub enum TspError {
    /// The matrix has no rows at all
    #[error("Distance matrix is empty")]
    EmptyMatrix,

    /// A row does not have as many columns as the matrix has rows
    #[error("Distance matrix must be square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Fewer than two locations
    #[error("A tour needs at least 2 cities, got {0}")]
    TooFewCities(usize),

    /// Negative, NaN or infinite weight
    #[error("Invalid weight {value} at ({row}, {col}): weights must be finite and non-negative")]
    InvalidWeight { row: usize, col: usize, value: f64 },

    /// `d[i][j] != d[j][i]`
    #[error("Distance matrix is not symmetric at ({row}, {col})")]
    Asymmetric { row: usize, col: usize },

    /// A tunable is out of its admissible range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Move selector string not recognised
    #[error("Unknown move kind '{0}' (expected swap, insert, reverse or random)")]
    UnknownMoveKind(String),

    /// Too many cities for exhaustive enumeration
    #[error("Instance with {cities} cities is too large for exhaustive search (max {max})")]
    InstanceTooLarge { cities: usize, max: usize },

    /// A matrix cell could not be read as a number
    #[error("Cannot parse '{value}' at row {row}, column {col} as a number")]
    Parse {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TspError {
    /// True for errors describing an unusable distance matrix
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyMatrix
                | Self::NotSquare { .. }
                | Self::TooFewCities(_)
                | Self::InvalidWeight { .. }
                | Self::Asymmetric { .. }
        )
    }

    /// True for errors describing unusable solver parameters
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::UnknownMoveKind(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_groups() {
        assert!(TspError::EmptyMatrix.is_input_error());
        assert!(TspError::NotSquare { row: 0, expected: 3, found: 4 }.is_input_error());
        assert!(!TspError::EmptyMatrix.is_config_error());

        assert!(TspError::UnknownMoveKind("shuffle".into()).is_config_error());
        assert!(TspError::InvalidConfig("x".into()).is_config_error());
        assert!(!TspError::InvalidConfig("x".into()).is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = TspError::NotSquare { row: 1, expected: 3, found: 4 };
        assert_eq!(
            err.to_string(),
            "Distance matrix must be square: row 1 has 4 columns, expected 3"
        );
        assert_eq!(
            TspError::TooFewCities(1).to_string(),
            "A tour needs at least 2 cities, got 1"
        );
    }
}
