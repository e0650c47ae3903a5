//! Route and solution representation.
//!
//! A [`Route`] is a permutation of `0..n` together with the cost of the closed
//! tour it describes. Routes are plain values: move operators build new routes
//! instead of mutating existing ones, so a solver's current route and its
//! candidate never share storage.

use crate::instance::DistanceMatrix;
use rand::prelude::*;
use serde::Serialize;

/// A closed tour over every city, with its cached cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    cities: Vec<usize>,
    cost: f64,
}

impl Route {
    /// Create a route from a city order, computing its cost.
    pub fn new(matrix: &DistanceMatrix, cities: Vec<usize>) -> Self {
        debug_assert_eq!(cities.len(), matrix.dimension());
        let cost = matrix.tour_cost(&cities);
        Route { cities, cost }
    }

    /// Uniformly random permutation of all cities (Fisher-Yates shuffle).
    pub fn random<R: Rng + ?Sized>(matrix: &DistanceMatrix, rng: &mut R) -> Self {
        let mut cities: Vec<usize> = (0..matrix.dimension()).collect();
        cities.shuffle(rng);
        Self::new(matrix, cities)
    }

    /// Cities in visiting order
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Total cost of the closed tour
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn into_cities(self) -> Vec<usize> {
        self.cities
    }

    /// Position of a city in the tour
    pub fn position(&self, city: usize) -> Option<usize> {
        self.cities.iter().position(|&c| c == city)
    }

    /// Check that every city in `0..n` appears exactly once
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.cities.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &city in &self.cities {
            if city >= n || seen[city] {
                return false;
            }
            seen[city] = true;
        }
        true
    }

    /// Same tour started `k` positions later
    pub fn rotated(&self, matrix: &DistanceMatrix, k: usize) -> Route {
        let mut cities = self.cities.clone();
        if !cities.is_empty() {
            let shift = k % cities.len();
            cities.rotate_left(shift);
        }
        Route::new(matrix, cities)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order: Vec<String> = self.cities.iter().map(|c| c.to_string()).collect();
        write!(f, "Route: {} (Cost: {:.2})", order.join(" -> "), self.cost)
    }
}

/// Best route found by a solver run, plus run metadata
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    /// Best route found
    pub route: Route,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Number of iterations performed
    pub iterations: usize,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Best known cost after each iteration
    #[serde(skip)]
    pub best_cost_history: Vec<f64>,
}

impl Solution {
    pub fn new(route: Route, algorithm: &str) -> Self {
        Solution {
            route,
            algorithm: algorithm.to_string(),
            iterations: 0,
            computation_time: 0.0,
            best_cost_history: Vec::new(),
        }
    }

    /// Cost of the best route
    pub fn cost(&self) -> f64 {
        self.route.cost()
    }

    /// City order of the best route
    pub fn tour(&self) -> &[usize] {
        self.route.cities()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost())?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Tour: {:?}", self.tour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn square() -> DistanceMatrix {
        DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_route_cost() {
        let matrix = square();
        let route = Route::new(&matrix, vec![0, 1, 2, 3]);
        assert!((route.cost() - 4.0).abs() < 1e-10);
        assert_eq!(route.position(2), Some(2));
        assert!(route.is_permutation_of(4));
    }

    #[test]
    fn test_clone_is_independent() {
        let matrix = square();
        let route = Route::new(&matrix, vec![0, 1, 2, 3]);
        let mut cities = route.clone().into_cities();
        cities.swap(0, 1);
        assert_eq!(route.cities(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_is_permutation_rejects_duplicates() {
        let matrix = square();
        let route = Route::new(&matrix, vec![0, 1, 1, 3]);
        assert!(!route.is_permutation_of(4));
        assert!(!route.is_permutation_of(5));
    }

    #[test]
    fn test_solution_display() {
        let matrix = square();
        let mut solution = Solution::new(Route::new(&matrix, vec![0, 1, 2, 3]), "test");
        solution.iterations = 3;
        let text = solution.to_string();
        assert!(text.contains("Solution (test)"));
        assert!(text.contains("Cost: 4.00"));
    }

    fn random_matrix(n: usize, seed: u64) -> DistanceMatrix {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        DistanceMatrix::from_points(&points).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_random_route_is_permutation(n in 2usize..40, seed in any::<u64>()) {
            let matrix = random_matrix(n, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
            let route = Route::random(&matrix, &mut rng);
            prop_assert!(route.is_permutation_of(n));
            prop_assert!((route.cost() - matrix.tour_cost(route.cities())).abs() < 1e-9);
        }

        #[test]
        fn prop_cost_invariant_under_rotation(n in 2usize..30, k in 0usize..60, seed in any::<u64>()) {
            let matrix = random_matrix(n, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xABCD);
            let route = Route::random(&matrix, &mut rng);
            let rotated = route.rotated(&matrix, k);
            prop_assert!(rotated.is_permutation_of(n));
            prop_assert!((rotated.cost() - route.cost()).abs() < 1e-9);
        }
    }
}
