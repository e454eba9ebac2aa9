pub mod menu;
pub mod order;
pub mod parameters;
pub mod simulation;
pub mod statistics;
pub mod workflow;
