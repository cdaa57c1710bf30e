// route_generation.rs
//
// Generates the vehicle demand for one run. Entry times follow a Weibull
// distribution (shape 2) rescaled onto [0, max_steps]; 90% of vehicles go
// straight (60% north-south, 40% east-west, split over the through and
// through-right lanes) and 10% turn left from one of the four approaches.
// The generator is seeded so runs are reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::shared_data::SimTime;
use crate::simulation_engine::vehicles::{Approach, Movement, Vehicle};

const WEIBULL_SHAPE: f64 = 2.0;
const STRAIGHT_SHARE: f64 = 0.9;
const NORTH_SOUTH_SHARE: f64 = 0.6;

/// Draws `count` unit-scale Weibull samples, sorted ascending.
fn weibull_timings(rng: &mut SmallRng, count: usize) -> Vec<f64> {
    let mut timings: Vec<f64> = (0..count)
        .map(|_| {
            let u: f64 = rng.random();
            (-(1.0 - u).ln()).powf(1.0 / WEIBULL_SHAPE)
        })
        .collect();
    timings.sort_by(f64::total_cmp);
    timings
}

/// Linearly maps the sorted samples onto `[0, max_step]` and rounds them.
pub fn rescale_entry_times(timings: &[f64], max_step: SimTime) -> Vec<SimTime> {
    let (Some(&first), Some(&last)) = (timings.get(1).or(timings.first()), timings.last()) else {
        return Vec::new();
    };
    let min_old = first.floor();
    let max_old = last.ceil();
    let max_new = max_step as f64;
    if max_old <= min_old {
        return vec![0; timings.len()];
    }

    timings
        .iter()
        .map(|&time| {
            let scaled = (max_new / (max_old - min_old)) * (time - max_old) + max_new;
            scaled.round_ties_even().clamp(0.0, max_new) as SimTime
        })
        .collect()
}

fn pick_route(rng: &mut SmallRng) -> (Approach, Movement) {
    let road = rng.random_range(1..5);
    if rng.random::<f64>() < STRAIGHT_SHARE {
        let (first, second) = if rng.random::<f64>() < NORTH_SOUTH_SHARE {
            (Approach::Northbound, Approach::Southbound)
        } else {
            (Approach::Eastbound, Approach::Westbound)
        };
        match road {
            1 => (first, Movement::Through),
            2 => (first, Movement::ThroughRight),
            3 => (second, Movement::Through),
            _ => (second, Movement::ThroughRight),
        }
    } else {
        (Approach::ALL[road - 1], Movement::Left)
    }
}

/// Builds the full demand for a run, ordered by departure time.
pub fn generate_demand(config: &SimulationConfig) -> Vec<Vehicle> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let timings = weibull_timings(&mut rng, config.total_vehicles);
    let entry_times = rescale_entry_times(&timings, config.max_steps);

    let mut demand: Vec<Vehicle> = entry_times
        .into_iter()
        .enumerate()
        .map(|(counter, depart)| {
            let (approach, movement) = pick_route(&mut rng);
            Vehicle::new(counter, approach, movement, depart)
        })
        .collect();
    demand.sort_by_key(|v| v.depart);

    log::info!(
        "Generated {} vehicles over {} steps (seed {})",
        demand.len(),
        config.max_steps,
        config.seed
    );
    demand
}
