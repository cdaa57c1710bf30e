use std::collections::HashMap;

use crate::error::ControlError;
use crate::shared_data::{CycleSample, SimTime};
use crate::simulation_engine::environment::Environment;
use crate::simulation_engine::intersections::Intersection;

/// Accumulates per-tick detector observations and closes them into one
/// `CycleSample` per sampling period.
#[derive(Debug)]
pub struct CycleSampler {
    label: String,
    cycle: u32,
    max_queue: u32,
    waiting: HashMap<String, f64>,
}

impl CycleSampler {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            cycle: 0,
            max_queue: 0,
            waiting: HashMap::new(),
        }
    }

    /// Reads every detector once. The tick's queue is the total vehicle count
    /// across detectors; each vehicle's latest waiting time is kept.
    pub fn observe<E: Environment + ?Sized>(
        &mut self,
        intersection: &Intersection,
        env: &E,
    ) -> Result<(), ControlError> {
        let mut queue = 0u32;
        for detector in intersection.detectors() {
            let reading = env.read_detector(&detector.id)?;
            queue += reading.vehicle_count;
            for (vehicle, waited) in reading.vehicle_waiting_times {
                self.waiting.insert(vehicle, waited);
            }
        }
        self.max_queue = self.max_queue.max(queue);
        Ok(())
    }

    /// Closes the current period and resets the accumulators.
    pub fn close_period(&mut self, time: SimTime) -> CycleSample {
        let avg_waiting = if self.waiting.is_empty() {
            0.0
        } else {
            self.waiting.values().sum::<f64>() / self.waiting.len() as f64
        };
        let sample = CycleSample {
            label: self.label.clone(),
            cycle: self.cycle,
            time,
            max_queue: self.max_queue,
            avg_waiting,
        };
        self.cycle += 1;
        self.max_queue = 0;
        self.waiting.clear();
        sample
    }
}
