use super::parameters::{Parameters, Staffing};
use super::statistics::{Statistics, WaitTime};
use super::workflow::{ArrivalProcess, RestaurantState, Stations};
use crate::core::errors::SimError;
use crate::core::process::Process;
use crate::core::simulation_engine::Simulation;
use crate::core::types::{ProcessId, SimTime};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// One simulated day
pub const DAY_SECONDS: SimTime = 24.0 * 60.0 * 60.0;

/// Derived metrics of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub completed_orders: usize,
    pub abandoned_orders: usize,
    /// Mean wait in seconds, unrounded
    pub mean_wait_seconds: f64,
    pub mean_wait: WaitTime,
    /// Share of station capacity in use over the run
    pub avg_load: Option<f64>,
    /// Mean number of customers in the system
    pub avg_requests: Option<f64>,
}

/// Fast-food restaurant modelled as a queueing network.
///
/// Customers order at a terminal, at a cashier, or online; every item is
/// cooked by a chef one at a time; the order is assembled and, if needed,
/// brought to the table by the service staff who also run the cashiers.
pub struct RestaurantSimulation {
    engine: Simulation<RestaurantState>,
    staffing: Staffing,
    active_time: SimTime,
    arrivals_started: bool,
}

impl RestaurantSimulation {
    /// Set up a restaurant. Fails if the menu cannot be sampled from.
    pub fn new(staffing: Staffing, params: Option<Parameters>, seed: u64) -> Result<Self, SimError> {
        let params = params.unwrap_or_default();
        params.menu().validate()?;
        let staffing = Staffing::new(staffing.terminals, staffing.services, staffing.chefs);

        let engine = Simulation::build(|resources| RestaurantState {
            params,
            stats: Statistics::new(),
            rng: StdRng::seed_from_u64(seed),
            stations: Stations {
                terminals: resources.add("terminals", staffing.terminals),
                services: resources.add("services", staffing.services),
                chefs: resources.add("chefs", staffing.chefs),
            },
        });

        Ok(Self {
            engine,
            staffing,
            active_time: 0.0,
            arrivals_started: false,
        })
    }

    /// Start the arrival stream (once) and run until `until` seconds
    pub fn run(&mut self, until: SimTime) -> Result<&Statistics, SimError> {
        if !self.arrivals_started {
            self.engine.spawn(Box::new(ArrivalProcess::new()));
            self.arrivals_started = true;
        }
        let end = self.engine.run(until)?;
        self.active_time = end;

        let stats = &self.engine.state().stats;
        info!(
            "run of {:.0}s with {:?}: {} orders completed, {} abandoned, {} in flight",
            end,
            self.staffing,
            stats.completed(),
            stats.abandoned,
            stats.in_system
        );
        Ok(stats)
    }

    /// Start an extra process, e.g. a hand-made order
    pub fn spawn(&mut self, process: Box<dyn Process<RestaurantState>>) -> ProcessId {
        self.engine.spawn(process)
    }

    /// Advance the engine without starting the arrival stream
    pub fn run_without_arrivals(&mut self, until: SimTime) -> Result<SimTime, SimError> {
        let end = self.engine.run(until)?;
        self.active_time = end;
        Ok(end)
    }

    pub fn stations(&self) -> Stations {
        self.engine.state().stations
    }

    pub fn staffing(&self) -> Staffing {
        self.staffing
    }

    pub fn statistics(&self) -> &Statistics {
        &self.engine.state().stats
    }

    pub fn parameters(&self) -> &Parameters {
        &self.engine.state().params
    }

    pub fn engine(&self) -> &Simulation<RestaurantState> {
        &self.engine
    }

    /// Mean wait of completed orders in whole minutes and seconds
    pub fn avg_wait_time(&self) -> Result<WaitTime, SimError> {
        self.statistics()
            .mean_wait()
            .map(WaitTime::from_seconds)
            .ok_or(SimError::NoCompletedOrders)
    }

    /// Busy unit-seconds over available unit-seconds, across all stations
    pub fn avg_load(&self) -> Option<f64> {
        let resources = self.engine.resources();
        let capacity = resources
            .iter()
            .map(|resource| resource.capacity())
            .fold(0usize, usize::saturating_add);
        if self.active_time <= 0.0 || capacity == 0 {
            return None;
        }
        let busy: f64 = resources.iter().map(|resource| resource.busy_time()).sum();
        Some(busy / (self.active_time * capacity as f64))
    }

    pub fn avg_requests(&self) -> Option<f64> {
        self.statistics().avg_requests()
    }

    pub fn summary(&self) -> Result<RunSummary, SimError> {
        let stats = self.statistics();
        let mean_wait_seconds = stats.mean_wait().ok_or(SimError::NoCompletedOrders)?;
        Ok(RunSummary {
            completed_orders: stats.completed(),
            abandoned_orders: stats.abandoned,
            mean_wait_seconds,
            mean_wait: WaitTime::from_seconds(mean_wait_seconds),
            avg_load: self.avg_load(),
            avg_requests: self.avg_requests(),
        })
    }
}

/// Run one seeded day and return the mean wait.
///
/// Station counts are clamped to at least one and truncated.
pub fn simulate_wait_time(
    terminals: f64,
    services: f64,
    chefs: f64,
    params: Option<Parameters>,
    seed: u64,
) -> Result<WaitTime, SimError> {
    let staffing = Staffing::from_levels(terminals, services, chefs);
    let mut simulation = RestaurantSimulation::new(staffing, params, seed)?;
    simulation.run(DAY_SECONDS)?;
    let wait = simulation.avg_wait_time()?;
    info!("mean wait for {:?}: {}", staffing, wait);
    Ok(wait)
}
