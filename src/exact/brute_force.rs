//! Exhaustive search for small TSP instances.
//!
//! City 0 is fixed as the first city and every ordering of the remaining
//! cities is explored depth-first. Partial tours that already cost at least
//! as much as the best complete tour are cut, which keeps the result exact
//! while skipping most of the (n-1)! leaves.

use crate::context::SearchContext;
use crate::error::{Result, TspError};
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::solution::{Route, Solution};
use serde::{Deserialize, Serialize};

/// Brute-force solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForce {
    /// Largest instance accepted
    pub max_cities: usize,
}

impl Default for BruteForce {
    fn default() -> Self {
        BruteForce { max_cities: 10 }
    }
}

impl BruteForce {
    pub fn new(max_cities: usize) -> Self {
        BruteForce { max_cities }
    }
}

/// Depth-first search state
struct Search<'a> {
    matrix: &'a DistanceMatrix,
    partial: Vec<usize>,
    visited: Vec<bool>,
    best_tour: Vec<usize>,
    best_cost: f64,
    tours_evaluated: usize,
}

impl<'a> Search<'a> {
    fn new(matrix: &'a DistanceMatrix) -> Self {
        let n = matrix.dimension();
        let mut visited = vec![false; n];
        visited[0] = true;
        Search {
            matrix,
            partial: vec![0],
            visited,
            best_tour: Vec::new(),
            best_cost: f64::INFINITY,
            tours_evaluated: 0,
        }
    }

    fn extend(&mut self, cost_so_far: f64) {
        let n = self.matrix.dimension();
        let last = self.partial[self.partial.len() - 1];

        if self.partial.len() == n {
            self.tours_evaluated += 1;
            let total = cost_so_far + self.matrix.distance(last, 0);
            if total < self.best_cost {
                self.best_cost = total;
                self.best_tour = self.partial.clone();
            }
            return;
        }

        for next in 1..n {
            if self.visited[next] {
                continue;
            }
            let cost = cost_so_far + self.matrix.distance(last, next);
            if cost >= self.best_cost {
                continue;
            }

            self.visited[next] = true;
            self.partial.push(next);
            self.extend(cost);
            self.partial.pop();
            self.visited[next] = false;
        }
    }
}

impl Solver for BruteForce {
    fn solve(&self, matrix: &DistanceMatrix, _ctx: &mut SearchContext) -> Result<Solution> {
        let n = matrix.dimension();
        if n > self.max_cities {
            return Err(TspError::InstanceTooLarge {
                cities: n,
                max: self.max_cities,
            });
        }

        let start = std::time::Instant::now();
        let mut search = Search::new(matrix);
        search.extend(0.0);

        let route = Route::new(matrix, search.best_tour);
        log::info!(
            "Brute force evaluated {} complete tours. Optimal cost: {:.2}",
            search.tours_evaluated,
            route.cost()
        );

        let mut solution = Solution::new(route, self.name());
        solution.iterations = search.tours_evaluated;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "BruteForce"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_city_optimum() {
        let matrix = DistanceMatrix::new(vec![
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 0.0, 4.0, 5.0],
            vec![2.0, 4.0, 0.0, 6.0],
            vec![3.0, 5.0, 6.0, 0.0],
        ])
        .unwrap();
        let solution = BruteForce::default().solve(&matrix, &mut SearchContext::seeded(0)).unwrap();
        assert_eq!(solution.cost(), 14.0);
        assert_eq!(solution.tour()[0], 0);
        assert!(solution.route.is_permutation_of(4));
    }

    #[test]
    fn test_square_corners() {
        // Unit square listed with crossing diagonals first
        let matrix = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]).unwrap();
        let solution = BruteForce::default().solve(&matrix, &mut SearchContext::seeded(0)).unwrap();
        assert!((solution.cost() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_cities() {
        let matrix = DistanceMatrix::new(vec![vec![0.0, 3.0], vec![3.0, 0.0]]).unwrap();
        let solution = BruteForce::default().solve(&matrix, &mut SearchContext::seeded(0)).unwrap();
        assert_eq!(solution.tour(), &[0, 1]);
        assert_eq!(solution.cost(), 6.0);
    }

    #[test]
    fn test_rejects_large_instance() {
        let points: Vec<(f64, f64)> = (0..11).map(|k| (k as f64, 0.0)).collect();
        let matrix = DistanceMatrix::from_points(&points).unwrap();
        let err = BruteForce::default()
            .solve(&matrix, &mut SearchContext::seeded(0))
            .unwrap_err();
        assert!(matches!(err, TspError::InstanceTooLarge { cities: 11, max: 10 }));
    }
}
