// simulation_engine/mod.rs
pub mod environment;
pub mod intersections;
pub mod lanes;
pub mod queue_intersection;
pub mod route_generation;
pub mod simulation;
pub mod vehicles;
