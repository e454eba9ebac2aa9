pub mod errors;
pub mod event;
pub mod event_scheduler;
pub mod process;
pub mod random;
pub mod resource;
pub mod simulation_engine;
pub mod types;

#[cfg(test)]
mod tests;
