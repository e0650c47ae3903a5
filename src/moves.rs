//! Neighbourhood moves shared by the local search strategies.
//!
//! Three operators, each parameterised by two positions in the route:
//! - Swap: exchange the cities at positions `i` and `j`
//! - Insert: remove the city at `i` and reinsert it at `j`
//! - Reverse: reverse the segment between `min(i, j)` and `max(i, j)` (2-opt)
//!
//! Operators never modify their input; they return a fresh [`Route`] whose
//! cost is recomputed from scratch.

use crate::error::TspError;
use crate::instance::DistanceMatrix;
use crate::solution::Route;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A concrete neighbourhood operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum MoveKind {
    Swap,
    Insert,
    Reverse,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Swap, MoveKind::Insert, MoveKind::Reverse];

    /// Swap and Reverse give the same result for `(i, j)` and `(j, i)`
    pub fn is_symmetric(self) -> bool {
        matches!(self, MoveKind::Swap | MoveKind::Reverse)
    }

    pub fn name(self) -> &'static str {
        match self {
            MoveKind::Swap => "swap",
            MoveKind::Insert => "insert",
            MoveKind::Reverse => "reverse",
        }
    }

    /// Pick one of the three kinds uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MoveKind {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match MoveSelector::from_str(s)? {
            MoveSelector::Fixed(kind) => Ok(kind),
            MoveSelector::Random => Err(TspError::InvalidConfig(
                "a concrete move kind (swap, insert or reverse) is required here".to_string(),
            )),
        }
    }
}

impl TryFrom<String> for MoveKind {
    type Error = TspError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Operator choice for solvers that also accept "random"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MoveSelector {
    Fixed(MoveKind),
    Random,
}

impl MoveSelector {
    /// Concrete kind for one move: the fixed kind, or a uniform pick
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> MoveKind {
        match self {
            MoveSelector::Fixed(kind) => kind,
            MoveSelector::Random => MoveKind::random(rng),
        }
    }
}

impl From<MoveKind> for MoveSelector {
    fn from(kind: MoveKind) -> Self {
        MoveSelector::Fixed(kind)
    }
}

impl std::fmt::Display for MoveSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveSelector::Fixed(kind) => kind.fmt(f),
            MoveSelector::Random => f.write_str("random"),
        }
    }
}

impl FromStr for MoveSelector {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swap" => Ok(MoveSelector::Fixed(MoveKind::Swap)),
            "insert" | "relocate" => Ok(MoveSelector::Fixed(MoveKind::Insert)),
            "reverse" | "revert" | "2-opt" | "2opt" => Ok(MoveSelector::Fixed(MoveKind::Reverse)),
            "random" => Ok(MoveSelector::Random),
            _ => Err(TspError::UnknownMoveKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for MoveSelector {
    type Error = TspError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MoveSelector> for String {
    fn from(selector: MoveSelector) -> Self {
        selector.to_string()
    }
}

/// One application of an operator at two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub kind: MoveKind,
    pub i: usize,
    pub j: usize,
}

impl Move {
    pub fn new(kind: MoveKind, i: usize, j: usize) -> Self {
        Move { kind, i, j }
    }

    /// Apply this move to `route`, producing a new route.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not a position of `route`.
    pub fn apply(&self, route: &Route, matrix: &DistanceMatrix) -> Route {
        let cities = match self.kind {
            MoveKind::Swap => swap(route.cities(), self.i, self.j),
            MoveKind::Insert => insert(route.cities(), self.i, self.j),
            MoveKind::Reverse => reverse(route.cities(), self.i, self.j),
        };
        Route::new(matrix, cities)
    }

    /// Whether two moves count as the same move for tabu purposes.
    ///
    /// Insert compares the ordered pair, Swap and Reverse the unordered pair,
    /// since `(i, j)` and `(j, i)` produce the same route for those two.
    pub fn is_equivalent(&self, other: &Move) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.kind.is_symmetric() {
            (self.i.min(self.j), self.i.max(self.j)) == (other.i.min(other.j), other.i.max(other.j))
        } else {
            (self.i, self.j) == (other.i, other.j)
        }
    }
}

/// Exchange the cities at positions `i` and `j`
pub fn swap(cities: &[usize], i: usize, j: usize) -> Vec<usize> {
    let mut out = cities.to_vec();
    out.swap(i, j);
    out
}

/// Move the city at position `i` so that it ends up at position `j`
pub fn insert(cities: &[usize], i: usize, j: usize) -> Vec<usize> {
    let mut out = cities.to_vec();
    if i != j {
        let city = out.remove(i);
        out.insert(j, city);
    }
    out
}

/// Reverse the inclusive segment between positions `i` and `j`
pub fn reverse(cities: &[usize], i: usize, j: usize) -> Vec<usize> {
    let mut out = cities.to_vec();
    let (lo, hi) = (i.min(j), i.max(j));
    out[lo..=hi].reverse();
    out
}

/// Two distinct positions in `0..n`, resampling `j` on collision.
///
/// `n` must be at least 2.
pub fn distinct_positions<R: Rng + ?Sized>(rng: &mut R, n: usize) -> (usize, usize) {
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n);
    while j == i {
        j = rng.gen_range(0..n);
    }
    (i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix(n: usize) -> DistanceMatrix {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let a = k as f64 * 0.7;
                (a.cos() * 10.0 + k as f64, a.sin() * 10.0)
            })
            .collect();
        DistanceMatrix::from_points(&points).unwrap()
    }

    #[test]
    fn test_swap() {
        assert_eq!(swap(&[0, 1, 2, 3, 4], 1, 3), vec![0, 3, 2, 1, 4]);
    }

    #[test]
    fn test_insert_forward_and_backward() {
        // remove position 1 (city 1), reinsert at position 3
        assert_eq!(insert(&[0, 1, 2, 3, 4], 1, 3), vec![0, 2, 3, 1, 4]);
        // remove position 3 (city 3), reinsert at position 0
        assert_eq!(insert(&[0, 1, 2, 3, 4], 3, 0), vec![3, 0, 1, 2, 4]);
        assert_eq!(insert(&[0, 1, 2, 3, 4], 0, 4), vec![1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_insert_same_position_is_noop() {
        let m = matrix(5);
        let route = Route::new(&m, vec![4, 2, 0, 1, 3]);
        for i in 0..5 {
            let moved = Move::new(MoveKind::Insert, i, i).apply(&route, &m);
            assert_eq!(moved, route);
        }
    }

    #[test]
    fn test_reverse_orders_indices() {
        assert_eq!(reverse(&[0, 1, 2, 3, 4], 1, 3), vec![0, 3, 2, 1, 4]);
        assert_eq!(reverse(&[0, 1, 2, 3, 4], 4, 1), vec![0, 4, 3, 2, 1]);
        assert_eq!(reverse(&[0, 1, 2, 3, 4], 2, 2), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let m = matrix(6);
        let route = Route::new(&m, vec![0, 1, 2, 3, 4, 5]);
        let before = route.clone();
        for kind in MoveKind::ALL {
            let candidate = Move::new(kind, 1, 4).apply(&route, &m);
            assert_ne!(candidate.cities(), route.cities());
            assert!((candidate.cost() - m.tour_cost(candidate.cities())).abs() < 1e-12);
        }
        assert_eq!(route, before);
    }

    #[test]
    fn test_tabu_equivalence_is_kind_specific() {
        // Swap and Reverse ignore the order of the two positions
        let swap_a = Move::new(MoveKind::Swap, 2, 5);
        assert!(swap_a.is_equivalent(&Move::new(MoveKind::Swap, 5, 2)));
        let rev_a = Move::new(MoveKind::Reverse, 1, 3);
        assert!(rev_a.is_equivalent(&Move::new(MoveKind::Reverse, 3, 1)));

        // Insert is directional
        let ins = Move::new(MoveKind::Insert, 2, 5);
        assert!(ins.is_equivalent(&Move::new(MoveKind::Insert, 2, 5)));
        assert!(!ins.is_equivalent(&Move::new(MoveKind::Insert, 5, 2)));

        // Different kinds never match
        assert!(!swap_a.is_equivalent(&Move::new(MoveKind::Reverse, 2, 5)));
        assert!(!swap_a.is_equivalent(&Move::new(MoveKind::Swap, 2, 4)));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("swap".parse::<MoveSelector>().unwrap(), MoveSelector::Fixed(MoveKind::Swap));
        assert_eq!("INSERT".parse::<MoveSelector>().unwrap(), MoveSelector::Fixed(MoveKind::Insert));
        assert_eq!("Revert".parse::<MoveSelector>().unwrap(), MoveSelector::Fixed(MoveKind::Reverse));
        assert_eq!("2-opt".parse::<MoveSelector>().unwrap(), MoveSelector::Fixed(MoveKind::Reverse));
        assert_eq!("random".parse::<MoveSelector>().unwrap(), MoveSelector::Random);

        let err = "shuffle".parse::<MoveSelector>().unwrap_err();
        assert!(matches!(err, TspError::UnknownMoveKind(ref s) if s == "shuffle"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_move_kind_rejects_random() {
        assert_eq!("reverse".parse::<MoveKind>().unwrap(), MoveKind::Reverse);
        assert!(matches!("random".parse::<MoveKind>(), Err(TspError::InvalidConfig(_))));
        assert!(matches!("bogus".parse::<MoveKind>(), Err(TspError::UnknownMoveKind(_))));
    }

    #[test]
    fn test_selector_serde() {
        let json = serde_json::to_string(&MoveSelector::Random).unwrap();
        assert_eq!(json, "\"random\"");
        let parsed: MoveSelector = serde_json::from_str("\"reverse\"").unwrap();
        assert_eq!(parsed, MoveSelector::Fixed(MoveKind::Reverse));
        assert!(serde_json::from_str::<MoveSelector>("\"sideways\"").is_err());

        let kind: MoveKind = serde_json::from_str("\"insert\"").unwrap();
        assert_eq!(kind, MoveKind::Insert);
        assert_eq!(serde_json::to_string(&MoveKind::Swap).unwrap(), "\"swap\"");
    }

    #[test]
    fn test_distinct_positions() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let (i, j) = distinct_positions(&mut rng, 2);
            assert_ne!(i, j);
            assert!(i < 2 && j < 2);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_operators_keep_permutation(n in 2usize..25, a in 0usize..25, b in 0usize..25) {
            let (i, j) = (a % n, b % n);
            let m = matrix(n);
            let route = Route::new(&m, (0..n).rev().collect());
            for kind in MoveKind::ALL {
                let moved = Move::new(kind, i, j).apply(&route, &m);
                prop_assert!(moved.is_permutation_of(n));
            }
        }

        #[test]
        fn prop_swap_and_reverse_are_involutions(n in 2usize..25, a in 0usize..25, b in 0usize..25) {
            let (i, j) = (a % n, b % n);
            let m = matrix(n);
            let route = Route::new(&m, (0..n).collect());
            for kind in [MoveKind::Swap, MoveKind::Reverse] {
                let mv = Move::new(kind, i, j);
                let twice = mv.apply(&mv.apply(&route, &m), &m);
                prop_assert_eq!(twice.cities(), route.cities());
            }
        }

        #[test]
        fn prop_insert_is_undone_by_reverse_insert(n in 2usize..25, a in 0usize..25, b in 0usize..25) {
            let (i, j) = (a % n, b % n);
            let cities: Vec<usize> = (0..n).collect();
            prop_assert_eq!(insert(&insert(&cities, i, j), j, i), cities);
        }
    }
}
