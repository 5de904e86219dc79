//! Solution representation for the D2D problem.
//!
//! A solution assigns each drone an ordered sequence of depot-to-depot
//! routes and each technician truck a single route. Arrival timestamps,
//! per-vehicle timespans and waiting times are derived once at construction
//! and cached; moves rebuild only the metrics of the vehicles they touch.
//! Solutions are immutable value objects.

use crate::d2d::instance::D2dInstance;
use crate::d2d::simulation::waiting_time;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A D2D solution with cached timing metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct D2dSolution {
    /// Per drone, the ordered sequence of routes, each starting and ending
    /// at the depot
    pub drone_paths: Vec<Vec<Vec<usize>>>,
    /// One route per technician truck, starting and ending at the depot
    pub technician_paths: Vec<Vec<usize>>,
    /// Arrival timestamps mirroring `drone_paths`; each drone's routes are
    /// seeded with its cumulative busy time
    pub drone_arrival_timestamps: Vec<Vec<Vec<f64>>>,
    /// Arrival timestamps mirroring `technician_paths`
    pub technician_arrival_timestamps: Vec<Vec<f64>>,
    /// Total busy time per drone
    pub drone_timespans: Vec<f64>,
    /// Waiting time per drone route
    pub drone_waiting_times: Vec<Vec<f64>>,
    /// Total busy time per technician
    pub technician_timespans: Vec<f64>,
    /// Waiting time per technician route
    pub technician_waiting_times: Vec<f64>,
}

impl D2dSolution {
    /// Build a solution from route assignments, deriving all cached metrics
    pub fn new(
        instance: &D2dInstance,
        drone_paths: Vec<Vec<Vec<usize>>>,
        technician_paths: Vec<Vec<usize>>,
    ) -> Self {
        let mut solution = D2dSolution {
            drone_arrival_timestamps: vec![Vec::new(); drone_paths.len()],
            technician_arrival_timestamps: vec![Vec::new(); technician_paths.len()],
            drone_timespans: vec![0.0; drone_paths.len()],
            drone_waiting_times: vec![Vec::new(); drone_paths.len()],
            technician_timespans: vec![0.0; technician_paths.len()],
            technician_waiting_times: vec![0.0; technician_paths.len()],
            drone_paths,
            technician_paths,
        };
        for drone in 0..solution.drone_paths.len() {
            solution.recompute_drone(instance, drone);
        }
        for technician in 0..solution.technician_paths.len() {
            solution.recompute_technician(instance, technician);
        }
        solution
    }

    /// Derive a new solution with some routes replaced, recomputing cached
    /// metrics only for the vehicles named in `changed_drones` and
    /// `changed_technicians`.
    pub fn with_updated_routes(
        &self,
        instance: &D2dInstance,
        drone_paths: Vec<Vec<Vec<usize>>>,
        technician_paths: Vec<Vec<usize>>,
        changed_drones: &[usize],
        changed_technicians: &[usize],
    ) -> Self {
        let mut solution = D2dSolution {
            drone_arrival_timestamps: self.drone_arrival_timestamps.clone(),
            technician_arrival_timestamps: self.technician_arrival_timestamps.clone(),
            drone_timespans: self.drone_timespans.clone(),
            drone_waiting_times: self.drone_waiting_times.clone(),
            technician_timespans: self.technician_timespans.clone(),
            technician_waiting_times: self.technician_waiting_times.clone(),
            drone_paths,
            technician_paths,
        };
        for &drone in changed_drones {
            solution.recompute_drone(instance, drone);
        }
        for &technician in changed_technicians {
            solution.recompute_technician(instance, technician);
        }
        solution
    }

    fn recompute_drone(&mut self, instance: &D2dInstance, drone: usize) {
        let paths = &self.drone_paths[drone];
        let mut arrivals_per_route = Vec::with_capacity(paths.len());
        let mut waitings = Vec::with_capacity(paths.len());
        let mut offset = 0.0;
        for path in paths {
            let arrivals = instance.drone_arrival_timestamps(path, drone, offset);
            offset = *arrivals.last().unwrap_or(&offset);
            waitings.push(waiting_time(path, &arrivals, &instance.drone_service_time));
            arrivals_per_route.push(arrivals);
        }
        self.drone_arrival_timestamps[drone] = arrivals_per_route;
        self.drone_timespans[drone] = offset;
        self.drone_waiting_times[drone] = waitings;
    }

    fn recompute_technician(&mut self, instance: &D2dInstance, technician: usize) {
        let path = &self.technician_paths[technician];
        let arrivals = instance.truck_arrival_timestamps(path);
        self.technician_timespans[technician] = *arrivals.last().unwrap_or(&0.0);
        self.technician_waiting_times[technician] =
            waiting_time(path, &arrivals, &instance.technician_service_time);
        self.technician_arrival_timestamps[technician] = arrivals;
    }

    /// Scalar cost: the makespan, i.e. the largest vehicle timespan
    pub fn cost(&self) -> f64 {
        self.drone_timespans
            .iter()
            .chain(self.technician_timespans.iter())
            .fold(0.0, |acc, &timespan| acc.max(timespan))
    }

    /// Total waiting time accumulated over every route
    pub fn total_waiting_time(&self) -> f64 {
        let drones: f64 = self
            .drone_waiting_times
            .iter()
            .flat_map(|w| w.iter())
            .sum();
        drones + self.technician_waiting_times.iter().sum::<f64>()
    }

    /// Greedy initial construction.
    ///
    /// Technician-only customers are spread round-robin across trucks, each
    /// truck greedily extending its tail with the nearest unassigned one.
    /// Dronable customers are spread round-robin across drones; a customer
    /// whose hypothetical route extension violates an endurance constraint
    /// closes the current route, opens a fresh one, and is itself handed to
    /// the truck whose tail is nearest at that moment.
    pub fn initial(instance: &D2dInstance) -> Self {
        let customers = 1..=instance.customers_count;

        // Technician-only pass
        let mut technician_paths: Vec<Vec<usize>> = vec![vec![0]; instance.technicians_count];
        let mut remaining: Vec<usize> = customers
            .clone()
            .filter(|&c| !instance.dronable[c])
            .collect();
        let mut turn = 0;
        while !remaining.is_empty() && instance.technicians_count > 0 {
            let path = &mut technician_paths[turn % instance.technicians_count];
            turn += 1;
            let tail = *path.last().unwrap_or(&0);
            let position = nearest_position(instance, tail, &remaining);
            path.push(remaining.remove(position));
        }
        for path in &mut technician_paths {
            path.push(0);
        }

        // Dronable pass with endurance-driven route splitting
        let mut drone_paths: Vec<Vec<Vec<usize>>> = vec![vec![vec![0]]; instance.drones_count];
        let mut remaining: Vec<usize> =
            customers.filter(|&c| instance.dronable[c]).collect();
        let mut turn = 0;
        while !remaining.is_empty() && instance.drones_count > 0 {
            let drone = turn % instance.drones_count;
            turn += 1;
            let paths = &mut drone_paths[drone];
            let tail = *paths
                .last()
                .and_then(|path| path.last())
                .unwrap_or(&0);
            let position = nearest_position(instance, tail, &remaining);
            let customer = remaining.remove(position);

            let mut hypothetical = paths.last().cloned().unwrap_or_else(|| vec![0]);
            hypothetical.push(customer);
            hypothetical.push(0);

            if instance.drone_route_feasible(&hypothetical, drone) {
                if let Some(path) = paths.last_mut() {
                    path.push(customer);
                }
            } else {
                // Close the open route and start a fresh one; the offending
                // customer goes to the truck whose tail is nearest right now
                if let Some(path) = paths.last_mut() {
                    path.push(0);
                }
                paths.push(vec![0]);

                let nearest_truck = technician_paths
                    .iter_mut()
                    .min_by_key(|path| {
                        OrderedFloat(instance.distance(customer, path[path.len() - 2]))
                    });
                match nearest_truck {
                    Some(path) => {
                        let at = path.len() - 1;
                        path.insert(at, customer);
                    }
                    None => {
                        // No trucks to absorb the customer; keep it on the
                        // fresh route
                        log::warn!(
                            "no technician route available for customer {}, keeping it airborne",
                            customer
                        );
                        if let Some(path) = paths.last_mut() {
                            path.push(customer);
                        }
                    }
                }
            }
        }
        for paths in &mut drone_paths {
            if let Some(path) = paths.last_mut() {
                path.push(0);
            }
        }

        // Routes that never left the depot are dropped
        let drone_paths: Vec<Vec<Vec<usize>>> = drone_paths
            .into_iter()
            .map(|paths| paths.into_iter().filter(|path| path.len() > 2).collect())
            .collect();

        Self::new(instance, drone_paths, technician_paths)
    }
}

/// Index of the entry of `candidates` nearest to `from`, first-seen on ties
fn nearest_position(instance: &D2dInstance, from: usize, candidates: &[usize]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (position, &candidate) in candidates.iter().enumerate() {
        let d = instance.distance(from, candidate);
        if d < best_distance {
            best_distance = d;
            best = position;
        }
    }
    best
}
