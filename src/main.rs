//! TSP Metaheuristics - Command Line Interface
//!
//! Solve a symmetric TSP given as a distance matrix, sweep solver parameters,
//! or inspect a matrix.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tsp_metaheuristics::benchmark::{Benchmark, ExperimentPlan};
use tsp_metaheuristics::context::SearchContext;
use tsp_metaheuristics::error::Result;
use tsp_metaheuristics::exact::BruteForce;
use tsp_metaheuristics::heuristics::{
    ACOConfig, AntColonyOptimization, HillClimbing, NearestNeighbour, SimulatedAnnealing, Solver,
    TabuSearch,
};
use tsp_metaheuristics::instance::DistanceMatrix;
use tsp_metaheuristics::moves::{MoveKind, MoveSelector};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-metaheuristics")]
#[command(version = "1.0")]
#[command(about = "Symmetric TSP solver: Hill Climbing, Simulated Annealing, Tabu Search and ACO")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a distance matrix with one algorithm
    Solve {
        /// Distance matrix (.csv or .json)
        #[arg(short, long)]
        matrix: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "sa")]
        algorithm: Algorithm,

        #[command(flatten)]
        params: SolverParams,

        /// Random seed (entropy when absent)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output solution to JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full tour
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run repeated experiments over a parameter grid
    Sweep {
        /// Distance matrix (.csv or .json)
        #[arg(short, long)]
        matrix: PathBuf,

        /// Experiment plan (JSON); the default parameter sweep when absent
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Runs per configuration, overrides the plan
        #[arg(short, long)]
        runs: Option<usize>,

        /// Root seed, overrides the plan
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Analyze a distance matrix
    Analyze {
        /// Distance matrix (.csv or .json)
        #[arg(short, long)]
        matrix: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Hill Climbing
    Hc,
    /// Simulated Annealing
    Sa,
    /// Tabu Search
    Tabu,
    /// Ant Colony Optimization
    Aco,
    /// Nearest Neighbour construction
    Nn,
    /// Exhaustive search (small instances only)
    Exact,
}

/// Per-algorithm tunables; unset flags keep the solver defaults
#[derive(clap::Args, Debug, Default)]
struct SolverParams {
    /// Move kind: swap, insert, reverse (or random for sa/tabu)
    #[arg(long)]
    move_kind: Option<String>,

    /// Iteration limit (hc, sa, tabu, aco)
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Hill Climbing stagnation limit
    #[arg(long)]
    max_stagnation: Option<usize>,

    /// Simulated Annealing initial temperature
    #[arg(long)]
    initial_temperature: Option<f64>,

    /// Simulated Annealing cooling rate
    #[arg(long)]
    cooling_rate: Option<f64>,

    /// Simulated Annealing neighbours per temperature
    #[arg(long)]
    solutions_per_temperature: Option<usize>,

    /// Tabu tenure
    #[arg(long)]
    tabu_list_length: Option<usize>,

    /// Tabu rounds without improvement
    #[arg(long)]
    max_no_improve: Option<usize>,

    /// Number of ants
    #[arg(long)]
    num_ants: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Heuristic importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate
    #[arg(long)]
    rho: Option<f64>,

    /// Nearest Neighbour start city
    #[arg(long)]
    start_city: Option<usize>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { matrix, algorithm, params, seed, output, verbose } => {
            solve_matrix(&matrix, algorithm, &params, seed, output, verbose)
        }

        Commands::Sweep { matrix, plan, runs, seed, output } => {
            run_sweep(&matrix, plan, runs, seed, &output)
        }

        Commands::Analyze { matrix } => analyze_matrix(&matrix),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_matrix(path: &Path) -> Result<DistanceMatrix> {
    println!("Loading distance matrix from {:?}...", path);
    DistanceMatrix::from_file(path)
}

/// Build the selected solver, applying the flags that were set
fn build_solver(algorithm: Algorithm, params: &SolverParams) -> Result<Box<dyn Solver>> {
    let solver: Box<dyn Solver> = match algorithm {
        Algorithm::Hc => {
            let mut hc = HillClimbing::default();
            if let Some(kind) = &params.move_kind {
                hc.move_kind = kind.parse::<MoveKind>()?;
            }
            if let Some(v) = params.max_iterations {
                hc.max_iterations = v;
            }
            if let Some(v) = params.max_stagnation {
                hc.max_stagnation = v;
            }
            Box::new(hc)
        }

        Algorithm::Sa => {
            let mut sa = SimulatedAnnealing::default();
            if let Some(kind) = &params.move_kind {
                sa.move_selector = kind.parse::<MoveSelector>()?;
            }
            if let Some(v) = params.max_iterations {
                sa.max_iterations = v;
            }
            if let Some(v) = params.initial_temperature {
                sa.initial_temperature = v;
            }
            if let Some(v) = params.cooling_rate {
                sa.cooling_rate = v;
            }
            if let Some(v) = params.solutions_per_temperature {
                sa.solutions_per_temperature = v;
            }
            Box::new(sa)
        }

        Algorithm::Tabu => {
            let mut ts = TabuSearch::default();
            if let Some(kind) = &params.move_kind {
                ts.move_selector = kind.parse::<MoveSelector>()?;
            }
            if let Some(v) = params.max_iterations {
                ts.max_iterations = v;
            }
            if let Some(v) = params.tabu_list_length {
                ts.tabu_list_length = v;
            }
            if let Some(v) = params.max_no_improve {
                ts.max_iterations_without_improvement = v;
            }
            Box::new(ts)
        }

        Algorithm::Aco => {
            let mut config = ACOConfig::default();
            if let Some(v) = params.max_iterations {
                config.max_iterations = v;
            }
            if let Some(v) = params.num_ants {
                config.num_ants = v;
            }
            if let Some(v) = params.alpha {
                config.alpha = v;
            }
            if let Some(v) = params.beta {
                config.beta = v;
            }
            if let Some(v) = params.rho {
                config.rho = v;
            }
            Box::new(AntColonyOptimization::new(config))
        }

        Algorithm::Nn => Box::new(NearestNeighbour::new(params.start_city.unwrap_or(0))),

        Algorithm::Exact => Box::new(BruteForce::default()),
    };

    Ok(solver)
}

fn solve_matrix(
    path: &Path,
    algorithm: Algorithm,
    params: &SolverParams,
    seed: Option<u64>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let matrix = load_matrix(path)?;
    let solver = build_solver(algorithm, params)?;

    let mut ctx = match seed {
        Some(seed) => SearchContext::seeded(seed),
        None => SearchContext::from_entropy(),
    };

    println!("Solving {} cities with {}...", matrix.dimension(), solver.name());
    let solution = solver.solve(&matrix, &mut ctx)?;

    println!("\n========== Results ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("Cost: {:.2}", solution.cost());
    println!("Time: {:.4}s", solution.computation_time);
    println!("Iterations: {}", solution.iterations);
    println!("Seed: {}", ctx.seed());

    if verbose {
        println!("\n{}", solution.route);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    Ok(())
}

fn run_sweep(
    path: &Path,
    plan_path: Option<PathBuf>,
    runs: Option<usize>,
    seed: Option<u64>,
    output: &Path,
) -> Result<()> {
    let matrix = load_matrix(path)?;

    let mut plan = match plan_path {
        Some(plan_path) => ExperimentPlan::from_json_file(plan_path)?,
        None => ExperimentPlan::parameter_sweep(),
    };
    if let Some(runs) = runs {
        plan.runs = runs;
    }
    if seed.is_some() {
        plan.seed = seed;
    }
    plan.validate()?;

    std::fs::create_dir_all(output)?;

    let total = plan.total_runs();
    println!(
        "Running {} configurations ({} runs) on {} cities...",
        plan.algorithms.len(),
        total,
        matrix.dimension()
    );

    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);

    let mut benchmark = Benchmark::new(plan);
    let failed = benchmark.run_with(&matrix, |row| {
        progress.set_message(row.method.clone());
        progress.inc(1);
    })?;
    progress.finish_with_message("done");

    if failed > 0 {
        log::error!("{} runs failed, see the log above", failed);
    }

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_matrix(path: &Path) -> Result<()> {
    let matrix = load_matrix(path)?;

    println!("========== Matrix Analysis ==========\n");
    println!("{}", matrix.statistics());

    let mut ctx = SearchContext::seeded(0);
    let nn = NearestNeighbour::default().solve(&matrix, &mut ctx)?;

    println!("\nQuick Solution Estimates:");
    println!("  Nearest Neighbour: {:.2}", nn.cost());

    let exact = BruteForce::default();
    if matrix.dimension() <= exact.max_cities {
        let optimum = exact.solve(&matrix, &mut ctx)?;
        println!("  Optimum (brute force): {:.2}", optimum.cost());
        println!(
            "  Nearest Neighbour gap: {:.2}%",
            (nn.cost() - optimum.cost()) / optimum.cost().max(f64::MIN_POSITIVE) * 100.0
        );
    }

    Ok(())
}
