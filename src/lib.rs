//! TSP Metaheuristics Library
//!
//! Solvers for the symmetric Traveling Salesman Problem over a distance matrix.
//!
//! # Features
//!
//! - Validated distance matrices loaded from CSV or JSON
//! - Immutable Swap, Insert and Reverse (2-opt) moves
//! - Hill Climbing, Simulated Annealing, Tabu Search and Ant Colony Optimization
//! - Nearest-neighbour baseline and brute-force optimum for small instances
//! - Repeated, parallel experiment runs with CSV export and statistics
//!
//! # Example
//!
//! ```no_run
//! use tsp_metaheuristics::context::SearchContext;
//! use tsp_metaheuristics::heuristics::{SimulatedAnnealing, Solver};
//! use tsp_metaheuristics::instance::DistanceMatrix;
//!
//! // Load instance
//! let matrix = DistanceMatrix::from_file("cities.csv").unwrap();
//!
//! // Anneal with a reproducible seed
//! let mut ctx = SearchContext::seeded(42);
//! let solution = SimulatedAnnealing::default().solve(&matrix, &mut ctx).unwrap();
//!
//! println!("Solution cost: {:.2}", solution.cost());
//! ```

pub mod error;
pub mod instance;
pub mod context;
pub mod solution;
pub mod moves;
pub mod heuristics;
pub mod exact;
pub mod benchmark;

pub use context::SearchContext;
pub use error::{Result, TspError};
pub use heuristics::Solver;
pub use instance::DistanceMatrix;
pub use moves::{MoveKind, MoveSelector};
pub use solution::{Route, Solution};
