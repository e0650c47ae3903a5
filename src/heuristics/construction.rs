//! Nearest-neighbour construction, used as a deterministic baseline.

use crate::context::SearchContext;
use crate::error::{Result, TspError};
use crate::heuristics::Solver;
use crate::instance::DistanceMatrix;
use crate::solution::{Route, Solution};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Nearest Neighbour Heuristic
///
/// Builds a tour by repeatedly visiting the nearest unvisited city,
/// breaking ties by the lowest city index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearestNeighbour {
    pub start_city: usize,
}

impl NearestNeighbour {
    pub fn new(start_city: usize) -> Self {
        NearestNeighbour { start_city }
    }

    fn find_nearest(&self, matrix: &DistanceMatrix, current: usize, visited: &[bool]) -> Option<usize> {
        (0..matrix.dimension())
            .filter(|&c| !visited[c])
            .min_by_key(|&c| (OrderedFloat(matrix.distance(current, c)), c))
    }

    /// The greedy tour as a city sequence
    pub fn construct(&self, matrix: &DistanceMatrix) -> Result<Vec<usize>> {
        let n = matrix.dimension();
        if self.start_city >= n {
            return Err(TspError::InvalidConfig(format!(
                "start city {} is out of range for {} cities",
                self.start_city, n
            )));
        }

        let mut tour = vec![self.start_city];
        let mut visited = vec![false; n];
        visited[self.start_city] = true;

        let mut current = self.start_city;
        while let Some(next) = self.find_nearest(matrix, current, &visited) {
            tour.push(next);
            visited[next] = true;
            current = next;
        }

        Ok(tour)
    }
}

impl Solver for NearestNeighbour {
    fn solve(&self, matrix: &DistanceMatrix, _ctx: &mut SearchContext) -> Result<Solution> {
        let start = std::time::Instant::now();
        let tour = self.construct(matrix)?;
        let route = Route::new(matrix, tour);
        log::info!(
            "Nearest neighbour from city {}: cost {:.2}",
            self.start_city,
            route.cost()
        );

        let mut solution = Solution::new(route, self.name());
        solution.iterations = matrix.dimension() - 1;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "NearestNeighbour"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> DistanceMatrix {
        // Cities on a line at 0, 1, 3, 6
        DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (6.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_nearest_neighbour_order() {
        let tour = NearestNeighbour::new(0).construct(&line()).unwrap();
        assert_eq!(tour, vec![0, 1, 2, 3]);

        let tour = NearestNeighbour::new(2).construct(&line()).unwrap();
        assert_eq!(tour, vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let matrix = DistanceMatrix::new(vec![
            vec![0.0, 2.0, 2.0, 2.0],
            vec![2.0, 0.0, 1.0, 1.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![2.0, 1.0, 1.0, 0.0],
        ])
        .unwrap();
        let tour = NearestNeighbour::new(0).construct(&matrix).unwrap();
        assert_eq!(tour, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_solution_cost_closes_tour() {
        let solution = NearestNeighbour::default()
            .solve(&line(), &mut SearchContext::seeded(0))
            .unwrap();
        assert!(solution.route.is_permutation_of(4));
        assert_eq!(solution.cost(), 12.0);
        assert_eq!(solution.algorithm, "NearestNeighbour");
    }

    #[test]
    fn test_start_city_out_of_range() {
        let err = NearestNeighbour::new(4)
            .solve(&line(), &mut SearchContext::seeded(0))
            .unwrap_err();
        assert!(err.is_config_error());
    }
}
