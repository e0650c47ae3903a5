//! Benchmarking and experimentation module.
//!
//! Runs every configuration of an [`ExperimentPlan`] several times on one
//! distance matrix, records one flat [`ResultData`] row per run, and derives
//! per-configuration statistics, CSV exports and a text report.

use crate::context::SearchContext;
use crate::error::{Result, TspError};
use crate::exact::BruteForce;
use crate::heuristics::{
    ACOConfig, AntColonyOptimization, HillClimbing, NearestNeighbour, SimulatedAnnealing, Solver,
    TabuSearch,
};
use crate::instance::DistanceMatrix;
use crate::moves::{MoveKind, MoveSelector};

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One solver configuration inside an experiment plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum AlgorithmConfig {
    HillClimbing(HillClimbing),
    SimulatedAnnealing(SimulatedAnnealing),
    TabuSearch(TabuSearch),
    Aco(ACOConfig),
    NearestNeighbour(NearestNeighbour),
    BruteForce(BruteForce),
}

impl AlgorithmConfig {
    /// Short method name, as written in the `method` column
    pub fn method(&self) -> &'static str {
        match self {
            AlgorithmConfig::HillClimbing(_) => "HC",
            AlgorithmConfig::SimulatedAnnealing(_) => "SA",
            AlgorithmConfig::TabuSearch(_) => "TS",
            AlgorithmConfig::Aco(_) => "ACO",
            AlgorithmConfig::NearestNeighbour(_) => "NN",
            AlgorithmConfig::BruteForce(_) => "Exact",
        }
    }

    /// Method name plus the tunables that distinguish this configuration
    pub fn label(&self) -> String {
        match self {
            AlgorithmConfig::HillClimbing(hc) => format!(
                "HC({}, iter={}, stag={})",
                hc.move_kind, hc.max_iterations, hc.max_stagnation
            ),
            AlgorithmConfig::SimulatedAnnealing(sa) => format!(
                "SA({}, T0={}, rate={}, spt={}, iter={})",
                sa.move_selector,
                sa.initial_temperature,
                sa.cooling_rate,
                sa.solutions_per_temperature,
                sa.max_iterations
            ),
            AlgorithmConfig::TabuSearch(ts) => format!(
                "TS({}, tenure={}, noimp={}, iter={})",
                ts.move_selector,
                ts.tabu_list_length,
                ts.max_iterations_without_improvement,
                ts.max_iterations
            ),
            AlgorithmConfig::Aco(aco) => format!(
                "ACO(m={}, a={}, b={}, rho={}, iter={})",
                aco.num_ants, aco.alpha, aco.beta, aco.rho, aco.max_iterations
            ),
            AlgorithmConfig::NearestNeighbour(nn) => format!("NN(start={})", nn.start_city),
            AlgorithmConfig::BruteForce(_) => "Exact".to_string(),
        }
    }

    pub fn solver(&self) -> Box<dyn Solver> {
        match self {
            AlgorithmConfig::HillClimbing(hc) => Box::new(hc.clone()),
            AlgorithmConfig::SimulatedAnnealing(sa) => Box::new(sa.clone()),
            AlgorithmConfig::TabuSearch(ts) => Box::new(ts.clone()),
            AlgorithmConfig::Aco(config) => Box::new(AntColonyOptimization::new(config.clone())),
            AlgorithmConfig::NearestNeighbour(nn) => Box::new(nn.clone()),
            AlgorithmConfig::BruteForce(bf) => Box::new(bf.clone()),
        }
    }

    /// Result row with the parameter columns of this configuration filled in
    fn empty_row(&self) -> ResultData {
        let mut row = ResultData {
            method: self.method().to_string(),
            configuration: self.label(),
            ..Default::default()
        };

        match self {
            AlgorithmConfig::HillClimbing(hc) => {
                row.move_kind = Some(hc.move_kind.to_string());
                row.max_iterations = Some(hc.max_iterations);
                row.max_stagnation = Some(hc.max_stagnation);
            }
            AlgorithmConfig::SimulatedAnnealing(sa) => {
                row.move_kind = Some(sa.move_selector.to_string());
                row.max_iterations = Some(sa.max_iterations);
                row.initial_temperature = Some(sa.initial_temperature);
                row.cooling_rate = Some(sa.cooling_rate);
                row.solutions_per_temperature = Some(sa.solutions_per_temperature);
            }
            AlgorithmConfig::TabuSearch(ts) => {
                row.move_kind = Some(ts.move_selector.to_string());
                row.max_iterations = Some(ts.max_iterations);
                row.tabu_list_length = Some(ts.tabu_list_length);
                row.max_iterations_without_improvement = Some(ts.max_iterations_without_improvement);
            }
            AlgorithmConfig::Aco(aco) => {
                row.max_iterations = Some(aco.max_iterations);
                row.num_ants = Some(aco.num_ants);
                row.alpha = Some(aco.alpha);
                row.beta = Some(aco.beta);
                row.rho = Some(aco.rho);
            }
            AlgorithmConfig::NearestNeighbour(_) | AlgorithmConfig::BruteForce(_) => {}
        }

        row
    }

    /// Deterministic methods give the same answer on every run
    pub fn is_deterministic(&self) -> bool {
        matches!(
            self,
            AlgorithmConfig::NearestNeighbour(_) | AlgorithmConfig::BruteForce(_)
        )
    }
}

/// A batch of solver configurations, each run `runs` times
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Runs per stochastic configuration
    pub runs: usize,
    /// Root seed; every run forks its own context from it. Entropy when absent.
    pub seed: Option<u64>,
    /// Run the repetitions of one configuration on the rayon pool
    pub parallel: bool,
    pub algorithms: Vec<AlgorithmConfig>,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        ExperimentPlan {
            runs: 10,
            seed: None,
            parallel: true,
            algorithms: vec![
                AlgorithmConfig::NearestNeighbour(NearestNeighbour::default()),
                AlgorithmConfig::HillClimbing(HillClimbing::default()),
                AlgorithmConfig::SimulatedAnnealing(SimulatedAnnealing::default()),
                AlgorithmConfig::TabuSearch(TabuSearch::default()),
                AlgorithmConfig::Aco(ACOConfig::default()),
            ],
        }
    }
}

impl ExperimentPlan {
    /// Load a plan written as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let plan: ExperimentPlan = serde_json::from_reader(std::io::BufReader::new(file))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(TspError::InvalidConfig("experiment needs at least 1 run".to_string()));
        }
        if self.algorithms.is_empty() {
            return Err(TspError::InvalidConfig("experiment plan lists no algorithms".to_string()));
        }
        Ok(())
    }

    /// Default parameter grid: every Hill Climbing operator, a range of
    /// cooling rates, tabu tenures and colony sizes.
    pub fn parameter_sweep() -> Self {
        let mut algorithms = vec![AlgorithmConfig::NearestNeighbour(NearestNeighbour::default())];

        for kind in MoveKind::ALL {
            algorithms.push(AlgorithmConfig::HillClimbing(HillClimbing::new(kind)));
        }

        for cooling_rate in [0.9, 0.95, 0.99, 0.995] {
            algorithms.push(AlgorithmConfig::SimulatedAnnealing(SimulatedAnnealing {
                cooling_rate,
                ..Default::default()
            }));
        }

        for tabu_list_length in [5, 10, 20] {
            algorithms.push(AlgorithmConfig::TabuSearch(TabuSearch::with_params(
                MoveSelector::Fixed(MoveKind::Reverse),
                tabu_list_length,
                100,
                1000,
            )));
        }

        for num_ants in [10, 20, 50] {
            algorithms.push(AlgorithmConfig::Aco(ACOConfig {
                num_ants,
                ..Default::default()
            }));
        }

        ExperimentPlan {
            algorithms,
            ..Default::default()
        }
    }

    /// Total number of solver runs this plan performs
    pub fn total_runs(&self) -> usize {
        self.algorithms
            .iter()
            .map(|a| if a.is_deterministic() { 1 } else { self.runs })
            .sum()
    }
}

/// One solver run, flattened for CSV export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultData {
    pub method: String,
    pub configuration: String,
    pub move_kind: Option<String>,
    pub max_iterations: Option<usize>,
    // Hill Climbing
    pub max_stagnation: Option<usize>,
    // Simulated Annealing
    pub solutions_per_temperature: Option<usize>,
    pub initial_temperature: Option<f64>,
    pub cooling_rate: Option<f64>,
    // Tabu Search
    pub tabu_list_length: Option<usize>,
    pub max_iterations_without_improvement: Option<usize>,
    // Ant Colony Optimization
    pub num_ants: Option<usize>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub rho: Option<f64>,
    // Scores
    pub run: usize,
    pub seed: u64,
    pub route_cost: f64,
    pub execution_time_ms: f64,
    pub iterations: usize,
}

/// Aggregated statistics for one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub method: String,
    pub configuration: String,
    /// Number of completed runs
    pub num_runs: usize,
    pub avg_cost: f64,
    pub best_cost: f64,
    pub worst_cost: f64,
    /// Population standard deviation of cost
    pub std_cost: f64,
    /// Average time in milliseconds
    pub avg_time_ms: f64,
    pub avg_iterations: f64,
}

/// Benchmarking engine
pub struct Benchmark {
    plan: ExperimentPlan,
    results: Vec<ResultData>,
}

impl Benchmark {
    pub fn new(plan: ExperimentPlan) -> Self {
        Benchmark {
            plan,
            results: Vec::new(),
        }
    }

    pub fn plan(&self) -> &ExperimentPlan {
        &self.plan
    }

    /// Run the whole plan on `matrix`
    pub fn run(&mut self, matrix: &DistanceMatrix) -> Result<usize> {
        self.run_with(matrix, |_| {})
    }

    /// Run the whole plan, calling `on_run` after every completed run.
    ///
    /// A configuration whose runs fail is logged and skipped; the number of
    /// failed runs is returned.
    pub fn run_with<F>(&mut self, matrix: &DistanceMatrix, on_run: F) -> Result<usize>
    where
        F: Fn(&ResultData) + Sync,
    {
        self.plan.validate()?;
        let root = match self.plan.seed {
            Some(seed) => SearchContext::seeded(seed),
            None => SearchContext::from_entropy(),
        };
        log::info!(
            "Running {} configurations x {} runs on {} cities (seed {})",
            self.plan.algorithms.len(),
            self.plan.runs,
            matrix.dimension(),
            root.seed()
        );

        let mut failed = 0;
        for (index, algorithm) in self.plan.algorithms.iter().enumerate() {
            let runs = if algorithm.is_deterministic() { 1 } else { self.plan.runs };
            let solver = algorithm.solver();
            let base = (index * self.plan.runs) as u64;

            let run_once = |run: usize| -> Result<ResultData> {
                let mut ctx = root.fork(base + run as u64);
                let solution = solver.solve(matrix, &mut ctx)?;
                let mut row = algorithm.empty_row();
                row.run = run;
                row.seed = ctx.seed();
                row.route_cost = solution.cost();
                row.execution_time_ms = solution.computation_time * 1000.0;
                row.iterations = solution.iterations;
                on_run(&row);
                Ok(row)
            };

            let outcomes: Vec<Result<ResultData>> = if self.plan.parallel {
                (0..runs).into_par_iter().map(run_once).collect()
            } else {
                (0..runs).map(run_once).collect()
            };

            for outcome in outcomes {
                match outcome {
                    Ok(row) => self.results.push(row),
                    Err(e) => {
                        log::error!("{} failed: {}", algorithm.label(), e);
                        failed += 1;
                    }
                }
            }
        }

        Ok(failed)
    }

    /// Compute statistics for each configuration, best average cost first
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut groups: HashMap<&str, Vec<&ResultData>> = HashMap::new();
        for result in &self.results {
            groups.entry(result.configuration.as_str()).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = groups
            .into_values()
            .map(|results| {
                let count = results.len() as f64;
                let costs: Vec<f64> = results.iter().map(|r| r.route_cost).collect();

                let avg_cost = costs.iter().sum::<f64>() / count;
                let best_cost = costs.iter().cloned().fold(f64::INFINITY, f64::min);
                let worst_cost = costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let variance = costs.iter().map(|c| (c - avg_cost).powi(2)).sum::<f64>() / count;

                AlgorithmStatistics {
                    method: results[0].method.clone(),
                    configuration: results[0].configuration.clone(),
                    num_runs: results.len(),
                    avg_cost,
                    best_cost,
                    worst_cost,
                    std_cost: variance.sqrt(),
                    avg_time_ms: results.iter().map(|r| r.execution_time_ms).sum::<f64>() / count,
                    avg_iterations: results.iter().map(|r| r.iterations as f64).sum::<f64>() / count,
                }
            })
            .collect();

        statistics.sort_by_key(|s| (OrderedFloat(s.avg_cost), s.configuration.clone()));
        statistics
    }

    /// Export one row per run to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("          TSP Benchmark Report\n");
        report.push_str("========================================\n\n");

        let stats = self.compute_statistics();

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(104).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<48} {:>6} {:>12} {:>12} {:>12} {:>10}\n",
            "Configuration", "Runs", "Avg Cost", "Best Cost", "Std Dev", "Avg ms"
        ));
        report.push_str("-".repeat(104).as_str());
        report.push('\n');

        for stat in &stats {
            report.push_str(&format!(
                "{:<48} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>10.2}\n",
                stat.configuration,
                stat.num_runs,
                stat.avg_cost,
                stat.best_cost,
                stat.std_cost,
                stat.avg_time_ms
            ));
        }

        report.push_str("-".repeat(104).as_str());
        report.push('\n');

        let best = self
            .results
            .iter()
            .min_by_key(|r| OrderedFloat(r.route_cost));
        if let Some(best) = best {
            report.push_str(&format!(
                "\nBest route cost: {:.2} ({}, run {}, seed {})\n",
                best.route_cost, best.configuration, best.run, best.seed
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[ResultData] {
        &self.results
    }
}
