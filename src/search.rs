//! Tabu-search driver shared by both problems.
//!
//! Each iteration asks every neighborhood for its best non-tabu candidate,
//! then unconditionally moves to the cheapest of them, worse or better; the
//! tabu lists prevent immediate cycling back. The best solution ever visited
//! is tracked separately and returned. One tabu list exists per move kind,
//! owned here and handed to the operators by mutable reference.

use crate::d2d::instance::D2dInstance;
use crate::d2d::solution::D2dSolution;
use crate::tabu::{MoveKind, MoveSignature, TabuList, DEFAULT_TABU_CAPACITY};
use crate::tsp::instance::TspInstance;
use crate::tsp::solution::PathSolution;
use std::collections::HashMap;

/// Driver parameters
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of tabu-search iterations
    pub iterations: usize,
    /// Capacity of each per-move-kind tabu list
    pub tabu_capacity: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            iterations: 100,
            tabu_capacity: DEFAULT_TABU_CAPACITY,
        }
    }
}

type TabuLists = HashMap<MoveKind, TabuList<MoveSignature>>;

fn tabu_list_for<'a>(
    lists: &'a mut TabuLists,
    kind: MoveKind,
    capacity: usize,
) -> &'a mut TabuList<MoveSignature> {
    lists
        .entry(kind)
        .or_insert_with(|| TabuList::with_capacity(capacity))
}

/// Run tabu search on a TSP instance from the greedy initial tour
pub fn solve_tsp(instance: &TspInstance, options: &SearchOptions) -> PathSolution {
    let mut current = PathSolution::initial(instance);
    let mut best = current.clone();
    let mut lists = TabuLists::new();
    log::info!(
        "TSP search on {} ({} cities): initial cost {:.3}",
        instance.name,
        instance.dimension,
        current.cost(instance)
    );

    for iteration in 0..options.iterations {
        let mut chosen: Option<PathSolution> = None;
        for neighborhood in current.get_neighborhoods() {
            let list = tabu_list_for(&mut lists, neighborhood.kind(), options.tabu_capacity);
            if let Some(candidate) = neighborhood.find_best_candidate(instance, &current, list) {
                let is_better = chosen
                    .as_ref()
                    .map_or(true, |c| candidate.cost(instance) < c.cost(instance));
                if is_better {
                    chosen = Some(candidate);
                }
            }
        }

        match chosen {
            Some(next) => {
                current = next;
                if current.cost(instance) < best.cost(instance) {
                    best = current.clone();
                    log::debug!(
                        "iteration {}: new best cost {:.3}",
                        iteration,
                        best.cost(instance)
                    );
                }
            }
            None => {
                log::info!("no admissible move left at iteration {}", iteration);
                break;
            }
        }
    }

    log::info!("TSP search finished: best cost {:.3}", best.cost(instance));
    best
}

/// Run tabu search on a D2D instance from the greedy initial assignment
pub fn solve_d2d(instance: &D2dInstance, options: &SearchOptions) -> D2dSolution {
    let mut current = D2dSolution::initial(instance);
    let mut best = current.clone();
    let mut lists = TabuLists::new();
    log::info!(
        "D2D search on {} ({} customers): initial makespan {:.3}",
        instance.name,
        instance.customers_count,
        current.cost()
    );

    for iteration in 0..options.iterations {
        let mut chosen: Option<D2dSolution> = None;
        for neighborhood in current.get_neighborhoods() {
            let list = tabu_list_for(&mut lists, neighborhood.kind(), options.tabu_capacity);
            if let Some(candidate) = neighborhood.find_best_candidate(instance, &current, list) {
                let is_better = chosen.as_ref().map_or(true, |c| candidate.cost() < c.cost());
                if is_better {
                    chosen = Some(candidate);
                }
            }
        }

        match chosen {
            Some(next) => {
                current = next;
                if current.cost() < best.cost() {
                    best = current.clone();
                    log::debug!(
                        "iteration {}: new best makespan {:.3}",
                        iteration,
                        best.cost()
                    );
                }
            }
            None => {
                log::info!("no admissible move left at iteration {}", iteration);
                break;
            }
        }
    }

    log::info!("D2D search finished: best makespan {:.3}", best.cost());
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d2d::config::{DroneConfig, DronePowerModel, TruckConfig};

    #[test]
    fn test_tsp_search_never_worsens_the_initial_tour() {
        // Points on a circle: the optimal tour follows the perimeter
        let n = 10;
        let x: Vec<f64> = (0..n)
            .map(|i| (i as f64 / n as f64 * std::f64::consts::TAU).cos() * 50.0)
            .collect();
        let y: Vec<f64> = (0..n)
            .map(|i| (i as f64 / n as f64 * std::f64::consts::TAU).sin() * 50.0)
            .collect();
        let instance = TspInstance::from_coordinates("circle", x, y);

        let initial_cost = PathSolution::initial(&instance).cost(&instance);
        let options = SearchOptions {
            iterations: 30,
            tabu_capacity: 20,
        };
        let best = solve_tsp(&instance, &options);
        assert!(best.cost(&instance) <= initial_cost + 1e-9);

        // The result is still a Hamiltonian cycle
        let mut path = best.get_path();
        assert_eq!(path.len(), n);
        path.sort_unstable();
        assert_eq!(path, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_d2d_search_preserves_coverage() {
        let instance = D2dInstance {
            name: "driver-test".to_string(),
            customers_count: 6,
            drones_count: 1,
            technicians_count: 1,
            flight_duration: 1e9,
            x: vec![0.0, 10.0, -10.0, 0.0, 0.0, 15.0, -15.0],
            y: vec![0.0, 0.0, 0.0, 10.0, -10.0, 15.0, -15.0],
            demands: vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            dronable: vec![true, true, true, false, false, true, true],
            technician_service_time: vec![0.0; 7],
            drone_service_time: vec![0.0; 7],
            truck: TruckConfig {
                maximum_velocity: 10.0,
                coefficients: vec![1.0],
            },
            drones: vec![DroneConfig {
                altitude: 10.0,
                takeoff_speed: 10.0,
                cruise_speed: 10.0,
                landing_speed: 10.0,
                capacity: 100.0,
                battery: 1e12,
                power: DronePowerModel::Linear {
                    beta: 1.0,
                    gamma: 10.0,
                },
            }],
        };

        let initial_cost = D2dSolution::initial(&instance).cost();
        let options = SearchOptions {
            iterations: 15,
            tabu_capacity: 10,
        };
        let best = solve_d2d(&instance, &options);
        assert!(best.cost() <= initial_cost + 1e-9);

        let mut counts = vec![0usize; 7];
        for paths in &best.drone_paths {
            for path in paths {
                for &index in path {
                    if index != 0 {
                        counts[index] += 1;
                        assert!(instance.dronable[index]);
                    }
                }
            }
        }
        for path in &best.technician_paths {
            for &index in path {
                if index != 0 {
                    counts[index] += 1;
                }
            }
        }
        for customer in 1..7 {
            assert_eq!(counts[customer], 1);
        }
    }
}
