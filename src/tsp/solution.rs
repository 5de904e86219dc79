//! Linked-list tour representation for the TSP.
//!
//! A tour is stored as two mutually inverse permutations: `after[i]` is the
//! successor of city `i` and `before[i]` its predecessor, forming a single
//! Hamiltonian cycle through all cities. Solutions are immutable value
//! objects: every neighborhood move produces a new solution, usually with its
//! cost already known from the O(1) delta update.

use crate::tsp::instance::TspInstance;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A TSP tour as a doubly-linked permutation, starting at depot 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSolution {
    /// Successor of each city along the tour
    pub after: Vec<usize>,
    /// Predecessor of each city along the tour
    pub before: Vec<usize>,
    /// Memoized round-trip cost; set at construction when a move already knows
    /// the delta, otherwise computed on first access
    #[serde(skip)]
    cost: OnceLock<f64>,
}

impl PathSolution {
    /// Wrap successor/predecessor mappings into a solution.
    ///
    /// `cost` should be supplied whenever the caller already knows it (delta
    /// updates); pass `None` to defer the O(n) walk to the first access.
    pub fn new(after: Vec<usize>, before: Vec<usize>, cost: Option<f64>) -> Self {
        let cell = OnceLock::new();
        if let Some(cost) = cost {
            let _ = cell.set(cost);
        }
        PathSolution {
            after,
            before,
            cost: cell,
        }
    }

    /// Number of cities in the tour
    #[inline]
    pub fn dimension(&self) -> usize {
        self.after.len()
    }

    /// Memoized round-trip cost of the tour.
    ///
    /// The first access walks the cycle from the depot via `after`, summing
    /// edge distances until the walk returns to the depot.
    pub fn cost(&self, instance: &TspInstance) -> f64 {
        *self.cost.get_or_init(|| {
            let mut result = 0.0;
            let mut last = 0;
            let mut current = self.after[0];
            while current != 0 {
                result += instance.distance(last, current);
                last = current;
                current = self.after[current];
            }
            result + instance.distance(last, 0)
        })
    }

    /// The tour as an ordered sequence of cities starting at the depot
    pub fn get_path(&self) -> Vec<usize> {
        let mut path = vec![0];
        let mut current = self.after[0];
        while current != 0 {
            path.push(current);
            current = self.after[current];
        }
        path
    }

    /// Greedy nearest-neighbor construction.
    ///
    /// Repeatedly extends the path with the unvisited city nearest to the
    /// current tail (ties broken by ascending city index), then wraps the
    /// result into a cycle.
    pub fn initial(instance: &TspInstance) -> Self {
        let n = instance.dimension;
        let mut path = Vec::with_capacity(n);
        path.push(0);
        let mut unvisited: Vec<usize> = (1..n).collect();

        while !unvisited.is_empty() {
            let current = *path.last().unwrap_or(&0);
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (position, &city) in unvisited.iter().enumerate() {
                let d = instance.distance(current, city);
                if d < best_distance {
                    best_distance = d;
                    best = position;
                }
            }
            path.push(unvisited.swap_remove(best));
        }

        let mut after = vec![0; n];
        let mut before = vec![0; n];
        for index in 0..n {
            after[path[index]] = path[(index + 1) % n];
            before[path[index]] = path[(index + n - 1) % n];
        }

        PathSolution::new(after, before, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_instance() -> TspInstance {
        TspInstance::from_coordinates(
            "square",
            vec![0.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_cost_walks_the_cycle() {
        let instance = square_instance();
        // 0 -> 1 -> 2 -> 3 -> 0, perimeter of the unit square
        let solution = PathSolution::new(vec![1, 2, 3, 0], vec![3, 0, 1, 2], None);
        assert!((solution.cost(&instance) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_cost_is_kept() {
        let instance = square_instance();
        let solution = PathSolution::new(vec![1, 2, 3, 0], vec![3, 0, 1, 2], Some(42.0));
        assert_eq!(solution.cost(&instance), 42.0);
    }

    #[test]
    fn test_get_path() {
        let solution = PathSolution::new(vec![2, 0, 3, 1], vec![1, 3, 0, 2], None);
        assert_eq!(solution.get_path(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_initial_is_hamiltonian() {
        let instance = TspInstance::from_coordinates(
            "line",
            vec![0.0, 5.0, 1.0, 3.0, 9.0, 7.0],
            vec![0.0; 6],
        );
        let solution = PathSolution::initial(&instance);
        let path = solution.get_path();
        assert_eq!(path.len(), 6);
        let mut seen = path.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
        // after/before must be mutual inverses
        for i in 0..6 {
            assert_eq!(solution.before[solution.after[i]], i);
        }
        // Nearest neighbor on a line starting at 0: 0, 1 is at 5.0 but 2 is at
        // 1.0, so the walk hugs ascending coordinates
        assert_eq!(path, vec![0, 2, 3, 1, 5, 4]);
    }
}
