//! Simulated Annealing for the TSP.
//!
//! Metaheuristic that accepts worse solutions with decreasing probability.
//! At every temperature level `solutions_per_temperature` neighbours are
//! sampled; an improving neighbour is always accepted, a worse one with
//! probability `exp(-dE / T)` (Metropolis criterion). The temperature then
//! cools geometrically, and the run stops after `max_iterations` levels or
//! once the temperature has frozen below [`MIN_TEMPERATURE`].

use crate::context::SearchContext;
use crate::error::{Result, TspError};
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::moves::{distinct_positions, Move, MoveKind, MoveSelector};
use crate::solution::{Route, Solution};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Temperature below which the schedule is considered frozen
pub const MIN_TEMPERATURE: f64 = 1e-4;

/// Simulated Annealing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedAnnealing {
    /// Initial temperature
    pub initial_temperature: f64,
    /// Geometric cooling factor in (0, 1)
    pub cooling_rate: f64,
    /// Neighbours sampled per temperature level
    pub solutions_per_temperature: usize,
    /// Maximum number of temperature levels
    pub max_iterations: usize,
    /// Operator used for each neighbour; `Random` picks one per neighbour
    pub move_selector: MoveSelector,
}

impl SimulatedAnnealing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(
        initial_temperature: f64,
        cooling_rate: f64,
        solutions_per_temperature: usize,
        max_iterations: usize,
        move_selector: MoveSelector,
    ) -> Self {
        SimulatedAnnealing {
            initial_temperature,
            cooling_rate,
            solutions_per_temperature,
            max_iterations,
            move_selector,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(TspError::InvalidConfig(format!(
                "initial temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(TspError::InvalidConfig(format!(
                "cooling rate must lie in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.solutions_per_temperature == 0 {
            return Err(TspError::InvalidConfig(
                "solutions per temperature must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sample a neighbour at two distinct random positions
    fn neighbor<R: Rng + ?Sized>(&self, route: &Route, matrix: &DistanceMatrix, rng: &mut R) -> Route {
        let (i, j) = distinct_positions(rng, route.len());
        let kind: MoveKind = self.move_selector.resolve(rng);
        Move::new(kind, i, j).apply(route, matrix)
    }
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        SimulatedAnnealing {
            initial_temperature: 1000.0,
            cooling_rate: 0.995,
            solutions_per_temperature: 100,
            max_iterations: 1000,
            move_selector: MoveSelector::Random,
        }
    }
}

/// Metropolis acceptance test for a non-improving move
fn accept_worse<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    // Underflows to 0 as the temperature freezes, rejecting every worse move
    let probability = (-delta / temperature).exp();
    rng.gen::<f64>() < probability
}

impl Solver for SimulatedAnnealing {
    fn solve(&self, matrix: &DistanceMatrix, ctx: &mut SearchContext) -> Result<Solution> {
        self.validate()?;
        let start = std::time::Instant::now();
        let rng = ctx.rng();

        let mut current = Route::random(matrix, rng);
        let mut best = current.clone();
        let mut temperature = self.initial_temperature;
        log::info!(
            "Starting Simulated Annealing ({}), T0 = {}, initial cost: {:.2}",
            self.move_selector,
            temperature,
            current.cost()
        );

        let mut history = Vec::new();
        let mut iteration = 0;

        while iteration < self.max_iterations && temperature > MIN_TEMPERATURE {
            for _ in 0..self.solutions_per_temperature {
                let candidate = self.neighbor(&current, matrix, rng);
                let delta = candidate.cost() - current.cost();

                if delta < 0.0 {
                    current = candidate;
                    if current.cost() < best.cost() {
                        best = current.clone();
                    }
                } else if accept_worse(delta, temperature, rng) {
                    current = candidate;
                }
            }

            temperature *= self.cooling_rate;
            history.push(best.cost());
            iteration += 1;
        }

        if temperature <= MIN_TEMPERATURE {
            log::debug!("Temperature frozen after {} levels", iteration);
        }
        log::info!(
            "Simulated Annealing finished after {} levels. Best cost: {:.2}",
            iteration,
            best.cost()
        );

        let mut solution = Solution::new(best, self.name());
        solution.iterations = iteration;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.best_cost_history = history;
        Ok(solution)
    }

    fn name(&self) -> &str {
        "SimulatedAnnealing"
    }
}
