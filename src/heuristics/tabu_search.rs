//! Tabu Search for the TSP.
//!
//! Local search with memory to avoid cycling. Every round scans the full
//! neighbourhood of the current route (all ordered position pairs `i != j`)
//! for one operator, fixed for the whole run, and moves to the cheapest
//! admissible candidate even when it is worse than the current route. A
//! candidate is admissible when its move is not in the tabu list, or when it
//! beats the best route found so far (aspiration).

use crate::context::SearchContext;
use crate::error::Result;
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::moves::{Move, MoveKind, MoveSelector};
use crate::solution::{Route, Solution};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded FIFO memory of recently applied moves
#[derive(Debug, Clone)]
pub struct TabuList {
    moves: VecDeque<Move>,
    capacity: usize,
}

impl TabuList {
    pub fn new(capacity: usize) -> Self {
        TabuList {
            moves: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a move, evicting the oldest entries beyond capacity
    pub fn push(&mut self, mv: Move) {
        self.moves.push_back(mv);
        while self.moves.len() > self.capacity {
            self.moves.pop_front();
        }
    }

    /// Whether an equivalent move is currently recorded
    pub fn contains(&self, mv: &Move) -> bool {
        self.moves.iter().any(|m| m.is_equivalent(mv))
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Tabu Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuSearch {
    /// Operator for the run; `Random` is resolved once at the start
    pub move_selector: MoveSelector,
    /// Tabu tenure (number of recent moves remembered)
    pub tabu_list_length: usize,
    /// Maximum consecutive rounds without a new best route
    pub max_iterations_without_improvement: usize,
    /// Maximum rounds
    pub max_iterations: usize,
}

impl TabuSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(
        move_selector: MoveSelector,
        tabu_list_length: usize,
        max_iterations_without_improvement: usize,
        max_iterations: usize,
    ) -> Self {
        TabuSearch {
            move_selector,
            tabu_list_length,
            max_iterations_without_improvement,
            max_iterations,
        }
    }

    /// Cheapest admissible candidate in the full neighbourhood of `current`
    fn best_admissible(
        &self,
        kind: MoveKind,
        current: &Route,
        best_cost: f64,
        tabu: &TabuList,
        matrix: &DistanceMatrix,
    ) -> Option<(Route, Move)> {
        let n = current.len();
        let mut chosen: Option<(Route, Move)> = None;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }

                let mv = Move::new(kind, i, j);
                let candidate = mv.apply(current, matrix);
                let aspiration = candidate.cost() < best_cost;

                if tabu.contains(&mv) && !aspiration {
                    continue;
                }

                let better = chosen
                    .as_ref()
                    .map_or(true, |(route, _)| candidate.cost() < route.cost());
                if better {
                    chosen = Some((candidate, mv));
                }
            }
        }

        chosen
    }
}

impl Default for TabuSearch {
    fn default() -> Self {
        TabuSearch {
            move_selector: MoveSelector::Random,
            tabu_list_length: 10,
            max_iterations_without_improvement: 100,
            max_iterations: 1000,
        }
    }
}

impl Solver for TabuSearch {
    fn solve(&self, matrix: &DistanceMatrix, ctx: &mut SearchContext) -> Result<Solution> {
        let start = std::time::Instant::now();
        let rng = ctx.rng();

        let mut current = Route::random(matrix, rng);
        let mut best = current.clone();
        let kind = self.move_selector.resolve(rng);
        let mut tabu = TabuList::new(self.tabu_list_length);
        log::info!(
            "Starting Tabu Search with {} (tenure {}). Initial cost: {:.2}",
            kind,
            self.tabu_list_length,
            current.cost()
        );

        let mut history = Vec::new();
        let mut total_iterations = 0;
        let mut iterations_without_improvement = 0;

        while total_iterations < self.max_iterations
            && iterations_without_improvement < self.max_iterations_without_improvement
        {
            match self.best_admissible(kind, &current, best.cost(), &tabu, matrix) {
                Some((candidate, mv)) => {
                    current = candidate;
                    tabu.push(mv);

                    if current.cost() < best.cost() {
                        best = current.clone();
                        iterations_without_improvement = 0;
                    } else {
                        iterations_without_improvement += 1;
                    }
                }
                None => {
                    log::debug!("Round {}: every candidate is tabu", total_iterations);
                    iterations_without_improvement += 1;
                }
            }

            history.push(best.cost());
            total_iterations += 1;
        }

        log::info!(
            "Tabu Search finished after {} rounds. Best cost: {:.2}",
            total_iterations,
            best.cost()
        );

        let mut solution = Solution::new(best, self.name());
        solution.iterations = total_iterations;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.best_cost_history = history;
        Ok(solution)
    }

    fn name(&self) -> &str {
        "TabuSearch"
    }
}
