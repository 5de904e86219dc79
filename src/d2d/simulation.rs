//! Arrival-time and energy simulation for the D2D fleet.
//!
//! Truck velocity is scaled by an hourly coefficient cycling through the
//! configured sequence, one coefficient per elapsed hour of the trip; an edge
//! crossing an hour boundary is consumed piecewise. Drones pay a fixed
//! vertical time per edge (takeoff plus landing) and accumulate energy per
//! flight phase, with power depending on the currently carried payload.
//!
//! The hour counter restarts at the first coefficient on every call: cycling
//! is per-route-call, not calendar-aligned.

use crate::d2d::instance::D2dInstance;
use crate::error::{Result, SolverError};

/// Length of one velocity-coefficient window, in time units
pub const SECONDS_PER_HOUR: f64 = 3600.0;

impl D2dInstance {
    /// Arrival timestamps of a technician truck along `path`, seeded at 0.
    ///
    /// The sequence is non-decreasing and contains one entry per visited
    /// location, the first being the depot departure.
    pub fn truck_arrival_timestamps(&self, path: &[usize]) -> Vec<f64> {
        let config = &self.truck;
        let mut result = Vec::with_capacity(path.len());
        result.push(0.0);

        let mut coefficient_index = 0;
        let mut within_hour = 0.0;
        let mut velocity = config.maximum_velocity * config.coefficients[coefficient_index];

        let mut last = path[0];
        for &index in &path[1..] {
            let mut timestamp = *result.last().unwrap_or(&0.0);
            let mut distance = self.distance(last, index);

            while distance > 0.0 {
                let time_shift = (distance / velocity).min(SECONDS_PER_HOUR - within_hour);
                timestamp += time_shift;
                distance -= time_shift * velocity;
                within_hour += time_shift;

                if within_hour >= SECONDS_PER_HOUR {
                    within_hour = 0.0;
                    coefficient_index = (coefficient_index + 1) % config.coefficients.len();
                    velocity = config.maximum_velocity * config.coefficients[coefficient_index];
                }
            }

            result.push(timestamp);
            last = index;
        }

        result
    }

    /// Arrival timestamps of drone `drone` along `path`, seeded at `offset`
    /// (the drone's cumulative busy time from prior routes).
    ///
    /// Each edge costs the service time of the departed location, the fixed
    /// vertical time and the horizontal cruise time.
    pub fn drone_arrival_timestamps(&self, path: &[usize], drone: usize, offset: f64) -> Vec<f64> {
        let config = &self.drones[drone];
        let vertical_time = config.vertical_time();

        let mut result = Vec::with_capacity(path.len());
        result.push(offset);

        let mut last = path[0];
        for &index in &path[1..] {
            let cruise_time = self.distance(last, index) / config.cruise_speed;
            let previous = *result.last().unwrap_or(&offset);
            result.push(previous + self.drone_service_time[last] + vertical_time + cruise_time);
            last = index;
        }

        result
    }

    /// Resolve arrival timestamps from whichever information was supplied:
    /// precomputed timestamps win, otherwise they are derived from the drone
    /// index. Supplying neither is an invalid-argument failure.
    fn ensure_drone_arrivals(
        &self,
        path: &[usize],
        drone: Option<usize>,
        arrivals: Option<&[f64]>,
    ) -> Result<Vec<f64>> {
        if let Some(arrivals) = arrivals {
            return Ok(arrivals.to_vec());
        }
        match drone {
            Some(drone) => Ok(self.drone_arrival_timestamps(path, drone, 0.0)),
            None => Err(SolverError::MissingArrivalData(
                "neither precomputed timestamps nor a drone index supplied".to_string(),
            )),
        }
    }

    /// Total waiting time of a drone route: idle time accrued because the
    /// drone returns to the depot only after its last productive stop
    pub fn drone_waiting_time(
        &self,
        path: &[usize],
        drone: Option<usize>,
        arrivals: Option<&[f64]>,
    ) -> Result<f64> {
        let arrivals = self.ensure_drone_arrivals(path, drone, arrivals)?;
        Ok(waiting_time(path, &arrivals, &self.drone_service_time))
    }

    /// Total waiting time of a technician route
    pub fn truck_waiting_time(&self, path: &[usize], arrivals: Option<&[f64]>) -> f64 {
        match arrivals {
            Some(arrivals) => waiting_time(path, arrivals, &self.technician_service_time),
            None => {
                let arrivals = self.truck_arrival_timestamps(path);
                waiting_time(path, &arrivals, &self.technician_service_time)
            }
        }
    }

    /// Total weight carried over a route
    pub fn total_weight(&self, path: &[usize]) -> f64 {
        path.iter().map(|&index| self.demands[index]).sum()
    }

    /// Flight duration of a drone route, from depot departure to the return
    pub fn drone_flight_duration(
        &self,
        path: &[usize],
        drone: Option<usize>,
        arrivals: Option<&[f64]>,
    ) -> Result<f64> {
        let arrivals = self.ensure_drone_arrivals(path, drone, arrivals)?;
        match (arrivals.first(), arrivals.last()) {
            (Some(first), Some(last)) => Ok(last - first),
            _ => Ok(0.0),
        }
    }

    /// Energy consumed by drone `drone` over `path`.
    ///
    /// Per edge: takeoff power times takeoff time, cruise power times cruise
    /// time, landing power times landing time, all evaluated at the payload
    /// carried on that edge. The payload grows by each customer's demand as
    /// the route progresses.
    pub fn drone_energy_consumption(&self, path: &[usize], drone: usize) -> f64 {
        let config = &self.drones[drone];
        let takeoff_time = config.takeoff_time();
        let landing_time = config.landing_time();

        let mut result = 0.0;
        let mut payload = 0.0;
        for window in path.windows(2) {
            let (last, index) = (window[0], window[1]);
            let cruise_time = self.distance(last, index) / config.cruise_speed;
            result += takeoff_time * config.takeoff_power(payload)
                + cruise_time * config.cruise_power(payload)
                + landing_time * config.landing_power(payload);
            payload += self.demands[index];
        }

        result
    }

    /// Check a (possibly hypothetical) drone route against the endurance
    /// constraints: carried weight, total flight duration and battery.
    pub fn drone_route_feasible(&self, path: &[usize], drone: usize) -> bool {
        let config = &self.drones[drone];
        if self.total_weight(path) > config.capacity {
            return false;
        }

        let arrivals = self.drone_arrival_timestamps(path, drone, 0.0);
        let duration = match (arrivals.first(), arrivals.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        duration <= self.flight_duration
            && self.drone_energy_consumption(path, drone) <= config.battery
    }
}

/// Σ over stops of (final arrival − stop arrival − stop service time)
pub(crate) fn waiting_time(path: &[usize], arrivals: &[f64], service_times: &[f64]) -> f64 {
    let finish = *arrivals.last().unwrap_or(&0.0);
    path.iter()
        .zip(arrivals)
        .map(|(&index, &arrival)| finish - arrival - service_times[index])
        .sum()
}
