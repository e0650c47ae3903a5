//! Heuristics module for the TSP.
//!
//! This module exports the four search strategies, the nearest-neighbour
//! baseline, and the [`Solver`] trait they all implement.

pub mod construction;
pub mod hill_climbing;
pub mod simulated_annealing;
pub mod tabu_search;
pub mod aco;

pub use construction::*;
pub use hill_climbing::*;
pub use simulated_annealing::*;
pub use tabu_search::*;
pub use aco::*;

use crate::context::SearchContext;
use crate::error::Result;
use crate::instance::DistanceMatrix;
use crate::solution::Solution;

/// Common entry point of every strategy
pub trait Solver: Send + Sync {
    /// Run the strategy on a validated matrix.
    ///
    /// Fails only on invalid configuration; the matrix is already known to be usable.
    fn solve(&self, matrix: &DistanceMatrix, ctx: &mut SearchContext) -> Result<Solution>;

    fn name(&self) -> &str;

    /// Validate raw rows, then solve. Invalid input fails before any route is built.
    fn solve_rows(&self, rows: &[Vec<f64>], ctx: &mut SearchContext) -> Result<Solution> {
        let matrix = DistanceMatrix::from_rows(rows)?;
        self.solve(&matrix, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::BruteForce;

    #[test]
    fn test_non_square_rejected_by_every_solver() {
        let rows = vec![vec![0.0; 4]; 3];
        let solvers: Vec<Box<dyn Solver>> = vec![
            Box::new(HillClimbing::default()),
            Box::new(SimulatedAnnealing::default()),
            Box::new(TabuSearch::default()),
            Box::new(AntColonyOptimization::default()),
            Box::new(NearestNeighbour::default()),
            Box::new(BruteForce::default()),
        ];

        for solver in &solvers {
            let err = solver
                .solve_rows(&rows, &mut SearchContext::seeded(0))
                .unwrap_err();
            assert!(err.is_input_error(), "{} accepted a 3x4 matrix", solver.name());
            assert!(matches!(err, crate::error::TspError::NotSquare { row: 0, expected: 3, found: 4 }));
        }
    }

    #[test]
    fn test_single_city_rejected() {
        let rows = vec![vec![0.0]];
        let err = TabuSearch::default()
            .solve_rows(&rows, &mut SearchContext::seeded(0))
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
