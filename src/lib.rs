pub mod core;
pub mod experiment;
pub mod restaurant;

// Re-export commonly used types
pub use crate::core::errors::SimError;
pub use crate::core::process::{Context, Process, Step};
pub use crate::core::simulation_engine::Simulation;
pub use crate::core::types::{ProcessId, ResourceId, SimTime};
pub use crate::experiment::analyzer::{analyze, EffectTable};
pub use crate::experiment::config::{ConcurrencyMode, ExperimentConfig};
pub use crate::experiment::dataset::{Dataset, FactorRow};
pub use crate::experiment::designer::{ExperimentDesigner, Factor, FactorKind};
pub use crate::restaurant::menu::{Menu, MenuItem};
pub use crate::restaurant::parameters::{Parameters, Staffing};
pub use crate::restaurant::simulation::{simulate_wait_time, RestaurantSimulation, RunSummary};
pub use crate::restaurant::statistics::WaitTime;
