//! Hill Climbing for the TSP.
//!
//! Starts from a random route and repeatedly samples a single random
//! neighbour with a fixed operator, moving to it only when it is strictly
//! cheaper. Stops after `max_iterations` samples or `max_stagnation`
//! consecutive non-improving samples, whichever comes first.

use crate::context::SearchContext;
use crate::error::Result;
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::moves::{distinct_positions, Move, MoveKind};
use crate::solution::{Route, Solution};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Hill Climbing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbing {
    /// Operator used to generate neighbours
    pub move_kind: MoveKind,
    /// Maximum number of sampled neighbours
    pub max_iterations: usize,
    /// Maximum consecutive samples without improvement
    pub max_stagnation: usize,
}

impl HillClimbing {
    pub fn new(move_kind: MoveKind) -> Self {
        HillClimbing {
            move_kind,
            ..Default::default()
        }
    }

    pub fn with_params(move_kind: MoveKind, max_iterations: usize, max_stagnation: usize) -> Self {
        HillClimbing {
            move_kind,
            max_iterations,
            max_stagnation,
        }
    }

    /// Sample one neighbour of `route`.
    ///
    /// Swap and Reverse draw two distinct positions; Insert may draw the same
    /// position twice, which yields an unchanged copy.
    fn neighbor<R: Rng + ?Sized>(&self, route: &Route, matrix: &DistanceMatrix, rng: &mut R) -> Route {
        let n = route.len();
        let (i, j) = match self.move_kind {
            MoveKind::Insert => (rng.gen_range(0..n), rng.gen_range(0..n)),
            MoveKind::Swap | MoveKind::Reverse => distinct_positions(rng, n),
        };
        Move::new(self.move_kind, i, j).apply(route, matrix)
    }
}

impl Default for HillClimbing {
    fn default() -> Self {
        HillClimbing {
            move_kind: MoveKind::Swap,
            max_iterations: 1000,
            max_stagnation: 100,
        }
    }
}

impl Solver for HillClimbing {
    fn solve(&self, matrix: &DistanceMatrix, ctx: &mut SearchContext) -> Result<Solution> {
        let start = std::time::Instant::now();
        let rng = ctx.rng();

        let mut current = Route::random(matrix, rng);
        log::info!(
            "Starting Hill Climbing with {}. Initial cost: {:.2}",
            self.move_kind,
            current.cost()
        );

        let mut history = Vec::new();
        let mut iteration = 0;
        let mut stagnation = 0;

        while iteration < self.max_iterations && stagnation < self.max_stagnation {
            let candidate = self.neighbor(&current, matrix, rng);

            if candidate.cost() < current.cost() {
                current = candidate;
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            history.push(current.cost());
            iteration += 1;
        }

        log::info!(
            "Hill Climbing with {} finished after {} iterations. Best cost: {:.2}",
            self.move_kind,
            iteration,
            current.cost()
        );

        let mut solution = Solution::new(current, self.name());
        solution.iterations = iteration;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.best_cost_history = history;
        Ok(solution)
    }

    fn name(&self) -> &str {
        "HillClimbing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::BruteForce;

    fn four_cities() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 0.0, 4.0, 5.0],
            vec![2.0, 4.0, 0.0, 6.0],
            vec![3.0, 5.0, 6.0, 0.0],
        ]
    }

    fn circle(n: usize) -> (DistanceMatrix, f64) {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let a = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                (10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        let matrix = DistanceMatrix::from_points(&points).unwrap();
        let perimeter = (0..n).map(|k| matrix.distance(k, (k + 1) % n)).sum();
        (matrix, perimeter)
    }

    #[test]
    fn test_four_city_reaches_optimum() {
        let matrix = DistanceMatrix::new(four_cities()).unwrap();
        let optimum = BruteForce::default()
            .solve(&matrix, &mut SearchContext::seeded(0))
            .unwrap()
            .cost();

        let hc = HillClimbing::with_params(MoveKind::Reverse, 500, 100);
        for seed in 0..20 {
            let solution = hc.solve(&matrix, &mut SearchContext::seeded(seed)).unwrap();
            assert!(solution.route.is_permutation_of(4));
            assert!((solution.cost() - optimum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reverse_finds_convex_hull_tour() {
        // On points in convex position every 2-opt local optimum is the hull order
        let (matrix, perimeter) = circle(7);
        let hc = HillClimbing::with_params(MoveKind::Reverse, 100_000, 2000);
        for seed in 0..5 {
            let solution = hc.solve(&matrix, &mut SearchContext::seeded(seed)).unwrap();
            assert!((solution.cost() - perimeter).abs() < 1e-6);
        }
    }

    #[test]
    fn test_never_worse_than_initial_route() {
        let (matrix, _) = circle(12);
        for kind in MoveKind::ALL {
            for seed in 0..5 {
                // The initial route is the first thing drawn from the context
                let initial = Route::random(&matrix, SearchContext::seeded(seed).rng());
                let hc = HillClimbing::with_params(kind, 300, 50);
                let solution = hc.solve(&matrix, &mut SearchContext::seeded(seed)).unwrap();

                assert!(solution.cost() <= initial.cost());
                assert!(solution
                    .best_cost_history
                    .windows(2)
                    .all(|w| w[1] <= w[0]));
            }
        }
    }

    #[test]
    fn test_stops_on_stagnation() {
        let matrix = DistanceMatrix::new(four_cities()).unwrap();
        // Every tour of this instance costs the same, so nothing ever improves
        let hc = HillClimbing::with_params(MoveKind::Swap, 10_000, 25);
        let solution = hc.solve(&matrix, &mut SearchContext::seeded(9)).unwrap();
        assert_eq!(solution.iterations, 25);
    }

    #[test]
    fn test_zero_iterations_returns_initial_route() {
        let (matrix, _) = circle(6);
        let hc = HillClimbing::with_params(MoveKind::Insert, 0, 10);
        let initial = Route::random(&matrix, SearchContext::seeded(4).rng());
        let solution = hc.solve(&matrix, &mut SearchContext::seeded(4)).unwrap();
        assert_eq!(solution.route, initial);
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn test_two_cities() {
        let matrix = DistanceMatrix::new(vec![vec![0.0, 2.5], vec![2.5, 0.0]]).unwrap();
        for kind in MoveKind::ALL {
            let solution = HillClimbing::with_params(kind, 50, 10)
                .solve(&matrix, &mut SearchContext::seeded(1))
                .unwrap();
            assert!(solution.route.is_permutation_of(2));
            assert_eq!(solution.cost(), 5.0);
        }
    }

}
