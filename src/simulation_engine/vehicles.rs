use serde::{Deserialize, Serialize};

use crate::shared_data::SimTime;

/// Movement a vehicle makes through the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Through,
    ThroughRight,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Approach {
    Northbound,
    Eastbound,
    Southbound,
    Westbound,
}

impl Approach {
    pub const ALL: [Approach; 4] = [
        Approach::Northbound,
        Approach::Eastbound,
        Approach::Southbound,
        Approach::Westbound,
    ];

    /// Prefix of the detector ids on this approach.
    pub fn detector_prefix(&self) -> &'static str {
        match self {
            Approach::Northbound => "N",
            Approach::Eastbound => "E",
            Approach::Southbound => "S",
            Approach::Westbound => "W",
        }
    }
}

impl Movement {
    pub fn detector_suffix(&self) -> &'static str {
        match self {
            Movement::Through => "T",
            Movement::ThroughRight => "TR",
            Movement::Left => "L",
        }
    }
}

/// A vehicle scheduled to enter the intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub approach: Approach,
    pub movement: Movement,
    pub depart: SimTime,
}

impl Vehicle {
    pub fn new(counter: usize, approach: Approach, movement: Movement, depart: SimTime) -> Self {
        Self {
            id: format!("{:?}.{}_{}", approach, movement.detector_suffix(), counter),
            approach,
            movement,
            depart,
        }
    }

    /// Detector watching the lane this vehicle queues on.
    pub fn detector_id(&self) -> String {
        format!(
            "{}_{}",
            self.approach.detector_prefix(),
            self.movement.detector_suffix()
        )
    }
}
