//! Ant Colony Optimization for the TSP.
//!
//! This module implements an elitist Ant System: every round each ant builds
//! a full tour with roulette-wheel selection biased by pheromone and inverse
//! distance, all trails evaporate, every ant deposits on its own tour and the
//! best tour found so far receives an extra elitist deposit.

use crate::context::SearchContext;
use crate::error::{Result, TspError};
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::solution::{Route, Solution};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Added to every distance before inverting it
const HEURISTIC_EPSILON: f64 = 1e-10;

/// Smallest tour cost used as a deposit divisor
const MIN_DEPOSIT_COST: f64 = 1e-10;

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ACOConfig {
    /// Number of ants per round
    pub num_ants: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub rho: f64,
    /// Number of rounds
    pub max_iterations: usize,
    /// Pheromone deposit factor
    pub q: f64,
    /// Initial pheromone level on every edge
    pub initial_pheromone: f64,
    /// Floor applied after evaporation
    pub min_pheromone: f64,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 20,
            alpha: 1.0,
            beta: 5.0,
            rho: 0.5,
            max_iterations: 100,
            q: 100.0,
            initial_pheromone: 1.0,
            min_pheromone: 0.001,
        }
    }
}

impl ACOConfig {
    pub fn with_params(num_ants: usize, alpha: f64, beta: f64, rho: f64, max_iterations: usize) -> Self {
        ACOConfig {
            num_ants,
            alpha,
            beta,
            rho,
            max_iterations,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_ants == 0 {
            return Err(TspError::InvalidConfig("number of ants must be at least 1".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(TspError::InvalidConfig("max iterations must be at least 1".to_string()));
        }
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) || !(self.beta >= 0.0 && self.beta.is_finite()) {
            return Err(TspError::InvalidConfig(format!(
                "alpha and beta must be non-negative, got alpha={} beta={}",
                self.alpha, self.beta
            )));
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(TspError::InvalidConfig(format!(
                "evaporation rate must lie in [0, 1], got {}",
                self.rho
            )));
        }
        for (name, value) in [
            ("q", self.q),
            ("initial pheromone", self.initial_pheromone),
            ("min pheromone", self.min_pheromone),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TspError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Symmetric per-edge pheromone levels. The diagonal stays at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    levels: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    pub fn new(dimension: usize, initial: f64) -> Self {
        let mut levels = vec![vec![initial; dimension]; dimension];
        for (i, row) in levels.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        PheromoneMatrix { levels }
    }

    pub fn dimension(&self) -> usize {
        self.levels.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.levels[i][j]
    }

    /// Scale every off-diagonal entry by `1 - rho`, then clamp it to `floor`
    pub fn evaporate(&mut self, rho: f64, floor: f64) {
        for (i, row) in self.levels.iter_mut().enumerate() {
            for (j, level) in row.iter_mut().enumerate() {
                if i != j {
                    *level = (*level * (1.0 - rho)).max(floor);
                }
            }
        }
    }

    /// Add `amount` to both directions of every edge of the closed tour
    pub fn deposit(&mut self, cities: &[usize], amount: f64) {
        let n = cities.len();
        for k in 0..n {
            let from = cities[k];
            let to = cities[(k + 1) % n];
            self.levels[from][to] += amount;
            self.levels[to][from] += amount;
        }
    }
}

/// Ant Colony Optimization solver
#[derive(Debug, Clone, Default)]
pub struct AntColonyOptimization {
    config: ACOConfig,
}

impl AntColonyOptimization {
    pub fn new(config: ACOConfig) -> Self {
        AntColonyOptimization { config }
    }

    pub fn config(&self) -> &ACOConfig {
        &self.config
    }

    /// Unnormalised roulette weight of moving along an edge
    fn attractiveness(&self, pheromone: f64, distance: f64) -> f64 {
        let eta = 1.0 / (distance + HEURISTIC_EPSILON);
        pheromone.powf(self.config.alpha) * eta.powf(self.config.beta)
    }

    /// Build one closed tour from a uniformly random start city
    fn construct_tour<R: Rng + ?Sized>(
        &self,
        matrix: &DistanceMatrix,
        pheromone: &PheromoneMatrix,
        rng: &mut R,
    ) -> Vec<usize> {
        let n = matrix.dimension();
        let start = rng.gen_range(0..n);
        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        tour.push(start);
        visited[start] = true;

        let mut current = start;
        while tour.len() < n {
            let candidates: Vec<usize> = (0..n).filter(|&c| !visited[c]).collect();
            let next = self.select_next(current, &candidates, matrix, pheromone, rng);
            tour.push(next);
            visited[next] = true;
            current = next;
        }

        tour
    }

    /// Roulette-wheel choice among the unvisited `candidates` (never empty)
    fn select_next<R: Rng + ?Sized>(
        &self,
        current: usize,
        candidates: &[usize],
        matrix: &DistanceMatrix,
        pheromone: &PheromoneMatrix,
        rng: &mut R,
    ) -> usize {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&c| self.attractiveness(pheromone.get(current, c), matrix.distance(current, c)))
            .collect();
        let total: f64 = weights.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            return strongest(candidates, &weights);
        }

        let threshold = rng.gen::<f64>();
        let mut cumulative = 0.0;
        for (&city, &weight) in candidates.iter().zip(&weights) {
            cumulative += weight / total;
            if threshold <= cumulative {
                return city;
            }
        }

        // Rounding left the cumulative sum just short of the threshold
        candidates[candidates.len() - 1]
    }

    fn update_pheromone(&self, pheromone: &mut PheromoneMatrix, ants: &[Route], best: &Route) {
        pheromone.evaporate(self.config.rho, self.config.min_pheromone);

        for ant in ants {
            pheromone.deposit(ant.cities(), self.config.q / ant.cost().max(MIN_DEPOSIT_COST));
        }

        let elitist = 2.0 * self.config.q / best.cost().max(MIN_DEPOSIT_COST);
        pheromone.deposit(best.cities(), elitist);
    }
}

/// Highest-weight candidate, lowest position on ties
fn strongest(candidates: &[usize], weights: &[f64]) -> usize {
    let mut chosen = 0;
    for (k, &weight) in weights.iter().enumerate().skip(1) {
        if weight > weights[chosen] {
            chosen = k;
        }
    }
    candidates[chosen]
}

impl Solver for AntColonyOptimization {
    fn solve(&self, matrix: &DistanceMatrix, ctx: &mut SearchContext) -> Result<Solution> {
        self.config.validate()?;
        let start = std::time::Instant::now();
        let rng = ctx.rng();
        let n = matrix.dimension();

        log::info!(
            "Starting ACO with {} ants (alpha={}, beta={}, rho={}) on {} cities",
            self.config.num_ants,
            self.config.alpha,
            self.config.beta,
            self.config.rho,
            n
        );

        let mut pheromone = PheromoneMatrix::new(n, self.config.initial_pheromone);
        let mut best_global: Option<Route> = None;
        let mut history = Vec::with_capacity(self.config.max_iterations);

        for iteration in 0..self.config.max_iterations {
            let ants: Vec<Route> = (0..self.config.num_ants)
                .map(|_| {
                    let tour = self.construct_tour(matrix, &pheromone, rng);
                    Route::new(matrix, tour)
                })
                .collect();

            let iteration_best = ants
                .iter()
                .reduce(|a, b| if b.cost() < a.cost() { b } else { a });

            if let Some(candidate) = iteration_best {
                let improved = best_global
                    .as_ref()
                    .map_or(true, |best| candidate.cost() < best.cost());
                if improved {
                    log::debug!("Iteration {}: new best cost {:.2}", iteration, candidate.cost());
                    best_global = Some(candidate.clone());
                }
            }

            if let Some(best) = &best_global {
                self.update_pheromone(&mut pheromone, &ants, best);
                history.push(best.cost());
            }
        }

        let best = best_global
            .ok_or_else(|| TspError::InvalidConfig("no ant completed a tour".to_string()))?;

        log::info!(
            "ACO finished after {} iterations. Best cost: {:.2}",
            self.config.max_iterations,
            best.cost()
        );

        let mut solution = Solution::new(best, self.name());
        solution.iterations = self.config.max_iterations;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.best_cost_history = history;
        Ok(solution)
    }

    fn name(&self) -> &str {
        "ACO"
    }
}
