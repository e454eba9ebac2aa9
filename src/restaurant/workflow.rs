//! Customer-side processes: the arrival stream and the per-order workflow.

use super::order::{Channel, Order};
use super::parameters::Parameters;
use super::statistics::Statistics;
use crate::core::errors::SimError;
use crate::core::process::{Context, Process, Step};
use crate::core::random::exponential;
use crate::core::types::{ResourceId, SimTime};
use log::trace;
use rand::rngs::StdRng;

/// Handles of the three station pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stations {
    pub terminals: ResourceId,
    /// Cashiers, also used for assembly and delivery
    pub services: ResourceId,
    pub chefs: ResourceId,
}

/// Model state shared by every process of one run
pub struct RestaurantState {
    pub params: Parameters,
    pub stats: Statistics,
    pub rng: StdRng,
    pub stations: Stations,
}

fn draw(ctx: &mut Context<'_, RestaurantState>, mean: f64) -> f64 {
    exponential(&mut ctx.state().rng, mean)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Arrived,
    /// Waiting for a terminal or cashier; carries the mean ordering time
    QueuedToOrder(ResourceId, f64),
    Ordering(ResourceId),
    QueuedToCook(usize),
    Cooking(usize),
    QueuedToAssemble,
    Assembling,
    QueuedToDeliver,
    Delivering,
}

/// Workflow of one order:
/// arrival, ordering, cooking item by item, assembly, optional delivery.
///
/// The customer's own time at the terminal or cashier is not counted as
/// waiting; queueing for it is.
pub struct OrderProcess {
    order: Order,
    stations: Stations,
    stage: Stage,
    arrival_time: SimTime,
    ordering_started: SimTime,
    excluded_time: SimTime,
}

impl OrderProcess {
    pub fn new(order: Order, stations: Stations) -> Self {
        Self {
            order,
            stations,
            stage: Stage::Arrived,
            arrival_time: 0.0,
            ordering_started: 0.0,
            excluded_time: 0.0,
        }
    }

    fn queue_to_cook(&mut self, index: usize) -> Step {
        self.stage = Stage::QueuedToCook(index);
        Step::Acquire(self.stations.chefs)
    }

    fn complete(&mut self, ctx: &mut Context<'_, RestaurantState>) -> Step {
        let wait = ctx.now() - self.arrival_time - self.excluded_time;
        trace!(
            "{} completed {} items via {:?}, waited {:.1}s",
            ctx.process_id(),
            self.order.item_count(),
            self.order.channel,
            wait
        );
        ctx.state().stats.record_completion(wait);
        Step::Done
    }
}

impl Process<RestaurantState> for OrderProcess {
    fn name(&self) -> &str {
        "order"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RestaurantState>) -> Result<Step, SimError> {
        let step = match self.stage {
            Stage::Arrived => {
                self.arrival_time = ctx.now();
                if self.order.is_abandoned() {
                    ctx.state().stats.record_abandonment();
                    return Ok(Step::Done);
                }
                ctx.state().stats.record_arrival();

                let params = &ctx.state().params;
                match self.order.channel {
                    Channel::Terminal => {
                        let mean = params.terminal_order_time();
                        self.stage = Stage::QueuedToOrder(self.stations.terminals, mean);
                        Step::Acquire(self.stations.terminals)
                    }
                    Channel::Cashier => {
                        let mean = params.cashier_order_time();
                        self.stage = Stage::QueuedToOrder(self.stations.services, mean);
                        Step::Acquire(self.stations.services)
                    }
                    Channel::Online => self.queue_to_cook(0),
                }
            }
            Stage::QueuedToOrder(station, mean) => {
                self.ordering_started = ctx.now();
                self.stage = Stage::Ordering(station);
                Step::Delay(draw(ctx, mean))
            }
            Stage::Ordering(station) => {
                ctx.release(station)?;
                self.excluded_time += ctx.now() - self.ordering_started;
                self.queue_to_cook(0)
            }
            Stage::QueuedToCook(index) => {
                let mean = self.order.items[index].mean_cooking_time();
                self.stage = Stage::Cooking(index);
                Step::Delay(draw(ctx, mean))
            }
            Stage::Cooking(index) => {
                ctx.release(self.stations.chefs)?;
                if index + 1 < self.order.item_count() {
                    self.queue_to_cook(index + 1)
                } else {
                    self.stage = Stage::QueuedToAssemble;
                    Step::Acquire(self.stations.services)
                }
            }
            Stage::QueuedToAssemble => {
                let per_item = ctx.state().params.collect_time_per_item();
                let mean = self.order.item_count() as f64 * per_item;
                self.stage = Stage::Assembling;
                Step::Delay(draw(ctx, mean))
            }
            Stage::Assembling => {
                ctx.release(self.stations.services)?;
                if self.order.needs_delivery {
                    self.stage = Stage::QueuedToDeliver;
                    Step::Acquire(self.stations.services)
                } else {
                    self.complete(ctx)
                }
            }
            Stage::QueuedToDeliver => {
                let mean = ctx.state().params.bring_time();
                self.stage = Stage::Delivering;
                Step::Delay(draw(ctx, mean))
            }
            Stage::Delivering => {
                ctx.release(self.stations.services)?;
                self.complete(ctx)
            }
        };
        Ok(step)
    }
}

/// Endless arrival stream: wait an exponential gap, start one order, repeat.
pub struct ArrivalProcess {
    started: bool,
}

impl ArrivalProcess {
    pub fn new() -> Self {
        Self { started: false }
    }
}

impl Default for ArrivalProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl Process<RestaurantState> for ArrivalProcess {
    fn name(&self) -> &str {
        "arrivals"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RestaurantState>) -> Result<Step, SimError> {
        if self.started {
            let state = ctx.state();
            let order = Order::from_parameters(&mut state.rng, &state.params)?;
            let stations = state.stations;
            ctx.spawn(Box::new(OrderProcess::new(order, stations)));
        }
        self.started = true;

        let mean = ctx.state().params.request_timeout();
        Ok(Step::Delay(draw(ctx, mean)))
    }
}
