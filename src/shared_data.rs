// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simulation time in whole seconds.
pub type SimTime = u64;

/// One detector read: how many vehicles are on it and how long each has waited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorReading {
    pub vehicle_count: u32,
    pub vehicle_waiting_times: BTreeMap<String, f64>,
}

impl DetectorReading {
    /// Mean accumulated waiting of the vehicles currently present, 0 when empty.
    pub fn average_waiting(&self) -> f64 {
        if self.vehicle_waiting_times.is_empty() {
            return 0.0;
        }
        let total: f64 = self.vehicle_waiting_times.values().sum();
        total / self.vehicle_waiting_times.len() as f64
    }
}

/// Metrics closed at the end of one sampling period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSample {
    pub label: String,
    pub cycle: u32,
    pub time: SimTime,
    pub max_queue: u32,
    pub avg_waiting: f64,
}
