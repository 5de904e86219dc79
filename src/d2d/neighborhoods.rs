//! Neighborhood move operators for the D2D problem.
//!
//! The inter-route exchange enumerates pairs of routes across the whole
//! fleet, swaps fixed-length customer segments between them, and keeps only
//! candidates that respect dronability and the drone endurance constraints.
//! Cost is evaluated through the solution's incremental metric rebuild, so
//! only the two touched vehicles are resimulated per candidate.

use crate::d2d::instance::D2dInstance;
use crate::d2d::solution::D2dSolution;
use crate::error::{Result, SolverError};
use crate::tabu::{MoveKind, MoveSignature, TabuList};

/// A family of moves transforming one fleet assignment into another
pub trait D2dNeighborhood: Send + Sync {
    /// Tabu universe this operator belongs to
    fn kind(&self) -> MoveKind;

    fn name(&self) -> &str;

    /// Evaluate every non-tabu candidate move and return the cheapest
    /// resulting solution, recording its signature in `tabu`.
    /// Ties are broken in favor of the first candidate seen.
    fn find_best_candidate(
        &self,
        instance: &D2dInstance,
        solution: &D2dSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<D2dSolution>;
}

impl D2dSolution {
    /// The standard operator set searched at every iteration
    pub fn get_neighborhoods(&self) -> Vec<Box<dyn D2dNeighborhood>> {
        vec![
            Box::new(RouteSwap {
                first_length: 1,
                second_length: 1,
            }),
            Box::new(RouteSwap {
                first_length: 2,
                second_length: 1,
            }),
            Box::new(RouteSwap {
                first_length: 2,
                second_length: 2,
            }),
        ]
    }
}

// ==================== RouteSwap ====================

/// Identifies one route of the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteRef {
    Drone { drone: usize, route: usize },
    Technician { technician: usize },
}

/// Exchanges a fixed-length customer segment of one route with a
/// fixed-length segment of another route.
///
/// Segments never include the depot. A segment may only enter a drone route
/// if every customer in it is dronable, and a modified drone route must stay
/// within its endurance constraints.
pub struct RouteSwap {
    pub(crate) first_length: usize,
    pub(crate) second_length: usize,
}

impl RouteSwap {
    pub fn new(first_length: usize, second_length: usize) -> Result<Self> {
        if first_length == 0 || second_length == 0 {
            return Err(SolverError::InvalidNeighborhood(
                "exchanged segment lengths must be at least 1".to_string(),
            ));
        }
        Ok(RouteSwap {
            first_length,
            second_length,
        })
    }

    fn routes(solution: &D2dSolution) -> Vec<RouteRef> {
        let mut result = Vec::new();
        for (drone, paths) in solution.drone_paths.iter().enumerate() {
            for route in 0..paths.len() {
                result.push(RouteRef::Drone { drone, route });
            }
        }
        for technician in 0..solution.technician_paths.len() {
            result.push(RouteRef::Technician { technician });
        }
        result
    }

    fn path_of<'a>(solution: &'a D2dSolution, reference: RouteRef) -> &'a [usize] {
        match reference {
            RouteRef::Drone { drone, route } => &solution.drone_paths[drone][route],
            RouteRef::Technician { technician } => &solution.technician_paths[technician],
        }
    }

    /// Splice `replacement` into `path` in place of `path[start..start + length]`
    fn spliced(path: &[usize], start: usize, length: usize, replacement: &[usize]) -> Vec<usize> {
        let mut result = Vec::with_capacity(path.len() - length + replacement.len());
        result.extend_from_slice(&path[..start]);
        result.extend_from_slice(replacement);
        result.extend_from_slice(&path[start + length..]);
        result
    }

    /// Build the candidate solution for one exchange, or `None` when a
    /// modified drone route violates an endurance constraint.
    fn apply(
        &self,
        instance: &D2dInstance,
        solution: &D2dSolution,
        first: RouteRef,
        first_start: usize,
        second: RouteRef,
        second_start: usize,
    ) -> Option<D2dSolution> {
        let first_path = Self::path_of(solution, first);
        let second_path = Self::path_of(solution, second);
        let first_segment = &first_path[first_start..first_start + self.first_length];
        let second_segment = &second_path[second_start..second_start + self.second_length];

        let new_first = Self::spliced(first_path, first_start, self.first_length, second_segment);
        let new_second =
            Self::spliced(second_path, second_start, self.second_length, first_segment);

        if let RouteRef::Drone { drone, .. } = first {
            if !instance.drone_route_feasible(&new_first, drone) {
                return None;
            }
        }
        if let RouteRef::Drone { drone, .. } = second {
            if !instance.drone_route_feasible(&new_second, drone) {
                return None;
            }
        }

        let mut drone_paths = solution.drone_paths.clone();
        let mut technician_paths = solution.technician_paths.clone();
        let mut changed_drones = Vec::new();
        let mut changed_technicians = Vec::new();
        for (reference, path) in [(first, new_first), (second, new_second)] {
            match reference {
                RouteRef::Drone { drone, route } => {
                    drone_paths[drone][route] = path;
                    changed_drones.push(drone);
                }
                RouteRef::Technician { technician } => {
                    technician_paths[technician] = path;
                    changed_technicians.push(technician);
                }
            }
        }
        changed_drones.dedup();

        Some(solution.with_updated_routes(
            instance,
            drone_paths,
            technician_paths,
            &changed_drones,
            &changed_technicians,
        ))
    }
}

impl D2dNeighborhood for RouteSwap {
    fn kind(&self) -> MoveKind {
        MoveKind::RouteSwap
    }

    fn name(&self) -> &str {
        "RouteSwap"
    }

    fn find_best_candidate(
        &self,
        instance: &D2dInstance,
        solution: &D2dSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<D2dSolution> {
        let routes = Self::routes(solution);
        let symmetric = self.first_length == self.second_length;

        let mut result: Option<D2dSolution> = None;
        let mut best_cost = f64::INFINITY;
        let mut best_pair: Option<MoveSignature> = None;

        for (i, &first) in routes.iter().enumerate() {
            let first_path = Self::path_of(solution, first);
            if first_path.len() < self.first_length + 2 {
                continue;
            }
            for (j, &second) in routes.iter().enumerate() {
                if i == j || (symmetric && j < i) {
                    continue;
                }
                let second_path = Self::path_of(solution, second);
                if second_path.len() < self.second_length + 2 {
                    continue;
                }

                for first_start in 1..first_path.len() - self.first_length {
                    let first_segment =
                        &first_path[first_start..first_start + self.first_length];
                    // A segment leaving for a drone route must be fully
                    // dronable
                    if matches!(second, RouteRef::Drone { .. })
                        && first_segment.iter().any(|&c| !instance.dronable[c])
                    {
                        continue;
                    }

                    for second_start in 1..second_path.len() - self.second_length {
                        let second_segment =
                            &second_path[second_start..second_start + self.second_length];
                        if matches!(first, RouteRef::Drone { .. })
                            && second_segment.iter().any(|&c| !instance.dronable[c])
                        {
                            continue;
                        }

                        let heads = (first_segment[0], second_segment[0]);
                        let pair = (heads.0.min(heads.1), heads.0.max(heads.1));
                        if tabu.contains(&pair) {
                            continue;
                        }

                        let candidate = match self.apply(
                            instance,
                            solution,
                            first,
                            first_start,
                            second,
                            second_start,
                        ) {
                            Some(candidate) => candidate,
                            None => continue,
                        };
                        let cost = candidate.cost();
                        if cost < best_cost {
                            best_cost = cost;
                            result = Some(candidate);
                            best_pair = Some(pair);
                        }
                    }
                }
            }
        }

        if let Some(pair) = best_pair {
            tabu.add(pair);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d2d::config::{DroneConfig, DronePowerModel, TruckConfig};

    fn build_instance(
        coords: &[(f64, f64)],
        demands: &[f64],
        dronable: &[bool],
        drones: usize,
        technicians: usize,
        capacity: f64,
    ) -> D2dInstance {
        let mut x = vec![0.0];
        let mut y = vec![0.0];
        for &(cx, cy) in coords {
            x.push(cx);
            y.push(cy);
        }
        let n = coords.len();
        let mut all_demands = vec![0.0];
        all_demands.extend_from_slice(demands);
        let mut all_dronable = vec![true];
        all_dronable.extend_from_slice(dronable);

        D2dInstance {
            name: "test".to_string(),
            customers_count: n,
            drones_count: drones,
            technicians_count: technicians,
            flight_duration: 1e9,
            x,
            y,
            demands: all_demands,
            dronable: all_dronable,
            technician_service_time: vec![0.0; n + 1],
            drone_service_time: vec![0.0; n + 1],
            truck: TruckConfig {
                maximum_velocity: 10.0,
                coefficients: vec![1.0],
            },
            drones: (0..drones)
                .map(|_| DroneConfig {
                    altitude: 10.0,
                    takeoff_speed: 10.0,
                    cruise_speed: 10.0,
                    landing_speed: 10.0,
                    capacity,
                    battery: 1e12,
                    power: DronePowerModel::Linear {
                        beta: 1.0,
                        gamma: 10.0,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_route_swap_untangles_crossed_routes() {
        // Customers 1 and 3 sit east, 2 and 4 west; the starting routes each
        // cross the whole map. Exchanging 1 with 2 and exchanging 4 with 3
        // untangle them equally well; first-seen tie-break picks (1, 2).
        let instance = build_instance(
            &[(10.0, 0.0), (-10.0, 0.0), (10.0, 1.0), (-10.0, 1.0)],
            &[1.0, 1.0, 1.0, 1.0],
            &[false, false, false, false],
            0,
            2,
            1.0,
        );
        let solution = D2dSolution::new(
            &instance,
            Vec::new(),
            vec![vec![0, 1, 4, 0], vec![0, 2, 3, 0]],
        );
        let original_cost = solution.cost();

        let neighborhood = RouteSwap::new(1, 1).unwrap();
        let mut tabu = TabuList::new();
        let best = neighborhood
            .find_best_candidate(&instance, &solution, &mut tabu)
            .unwrap();

        assert!(best.cost() < original_cost);
        assert_eq!(best.technician_paths[0], vec![0, 2, 4, 0]);
        assert_eq!(best.technician_paths[1], vec![0, 1, 3, 0]);
        assert!(tabu.contains(&(1, 2)));
    }

    #[test]
    fn test_non_dronable_customer_never_enters_drone_route() {
        // The only possible 1x1 exchange would move customer 2 onto the
        // drone, which dronability forbids
        let instance = build_instance(
            &[(10.0, 0.0), (-10.0, 0.0)],
            &[1.0, 1.0],
            &[true, false],
            1,
            1,
            100.0,
        );
        let solution = D2dSolution::new(
            &instance,
            vec![vec![vec![0, 1, 0]]],
            vec![vec![0, 2, 0]],
        );

        let neighborhood = RouteSwap::new(1, 1).unwrap();
        let mut tabu = TabuList::new();
        assert!(neighborhood
            .find_best_candidate(&instance, &solution, &mut tabu)
            .is_none());
        assert!(tabu.is_empty());
    }

    #[test]
    fn test_endurance_violating_exchange_is_rejected() {
        // Swapping customer 2 (weight 5) onto the capacity-1 drone would
        // overload it; the reverse direction is the same move, so nothing
        // remains
        let instance = build_instance(
            &[(10.0, 0.0), (-10.0, 0.0)],
            &[1.0, 5.0],
            &[true, true],
            1,
            1,
            1.0,
        );
        let solution = D2dSolution::new(
            &instance,
            vec![vec![vec![0, 1, 0]]],
            vec![vec![0, 2, 0]],
        );

        let neighborhood = RouteSwap::new(1, 1).unwrap();
        let mut tabu = TabuList::new();
        assert!(neighborhood
            .find_best_candidate(&instance, &solution, &mut tabu)
            .is_none());
    }

    #[test]
    fn test_tabu_signature_blocks_reversal() {
        let instance = build_instance(
            &[(10.0, 0.0), (-10.0, 0.0), (10.0, 1.0), (-10.0, 1.0)],
            &[1.0, 1.0, 1.0, 1.0],
            &[false, false, false, false],
            0,
            2,
            1.0,
        );
        let solution = D2dSolution::new(
            &instance,
            Vec::new(),
            vec![vec![0, 1, 4, 0], vec![0, 2, 3, 0]],
        );

        let neighborhood = RouteSwap::new(1, 1).unwrap();
        let mut tabu = TabuList::new();
        let improved = neighborhood
            .find_best_candidate(&instance, &solution, &mut tabu)
            .unwrap();
        assert_eq!(tabu.len(), 1);

        // From the improved solution, the winning pair is forbidden, so the
        // immediate undo is not available
        let next = neighborhood.find_best_candidate(&instance, &improved, &mut tabu);
        if let Some(next) = next {
            assert_ne!(next.technician_paths, solution.technician_paths);
        }
    }

    #[test]
    fn test_asymmetric_exchange_moves_two_for_one() {
        // A 2x1 exchange rebalances a three-customer truck against a
        // one-customer truck
        let instance = build_instance(
            &[(10.0, 0.0), (10.0, 2.0), (10.0, 4.0), (-10.0, 0.0)],
            &[1.0, 1.0, 1.0, 1.0],
            &[false, false, false, false],
            0,
            2,
            1.0,
        );
        let solution = D2dSolution::new(
            &instance,
            Vec::new(),
            vec![vec![0, 1, 2, 3, 0], vec![0, 4, 0]],
        );

        let neighborhood = RouteSwap::new(2, 1).unwrap();
        let mut tabu = TabuList::new();
        let best = neighborhood
            .find_best_candidate(&instance, &solution, &mut tabu)
            .unwrap();

        // Every customer still served exactly once
        let mut served: Vec<usize> = best
            .technician_paths
            .iter()
            .flatten()
            .copied()
            .filter(|&c| c != 0)
            .collect();
        served.sort_unstable();
        assert_eq!(served, vec![1, 2, 3, 4]);
        // Route lengths reflect the 2-for-1 trade in one direction or the
        // other
        let lengths: Vec<usize> = best
            .technician_paths
            .iter()
            .map(|p| p.len() - 2)
            .collect();
        assert!(lengths == vec![2, 2] || lengths == vec![1, 3] || lengths == vec![3, 1]);
    }

    #[test]
    fn test_route_swap_rejects_zero_lengths() {
        assert!(RouteSwap::new(0, 1).is_err());
        assert!(RouteSwap::new(1, 0).is_err());
        assert!(RouteSwap::new(2, 2).is_ok());
    }

    #[test]
    fn test_standard_neighborhood_set() {
        let instance = build_instance(&[(10.0, 0.0)], &[1.0], &[true], 1, 0, 100.0);
        let solution = D2dSolution::new(&instance, vec![vec![vec![0, 1, 0]]], Vec::new());
        let neighborhoods = solution.get_neighborhoods();
        assert_eq!(neighborhoods.len(), 3);
        for neighborhood in &neighborhoods {
            assert_eq!(neighborhood.kind(), MoveKind::RouteSwap);
        }
    }
}
