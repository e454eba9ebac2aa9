use super::errors::SimError;
use super::event::{Event, EventKind};
use super::event_scheduler::EventScheduler;
use super::resource::{Resource, ResourcePool};
use super::types::{ProcessId, ResourceId, SimTime};
use log::debug;

/// Suspension point returned by a process each time it yields control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Resume after the given amount of simulated time
    Delay(SimTime),
    /// Resume once a unit of the resource has been reserved
    Acquire(ResourceId),
    /// The process has finished
    Done,
}

/// A resumable computation driven by the simulation engine.
///
/// `resume` runs until the next suspension point. Between two suspension
/// points nothing else executes, so the process sees a consistent snapshot
/// of `S` and of every resource.
pub trait Process<S> {
    fn name(&self) -> &str {
        "process"
    }

    fn resume(&mut self, ctx: &mut Context<'_, S>) -> Result<Step, SimError>;
}

/// What a process can see and touch while it is executing
pub struct Context<'a, S> {
    pub(crate) now: SimTime,
    pub(crate) process: ProcessId,
    pub(crate) state: &'a mut S,
    pub(crate) resources: &'a mut ResourcePool,
    pub(crate) scheduler: &'a mut EventScheduler,
    pub(crate) spawned: Vec<Box<dyn Process<S>>>,
}

impl<'a, S> Context<'a, S> {
    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Id of the process being resumed
    pub fn process_id(&self) -> ProcessId {
        self.process
    }

    /// Shared model state
    pub fn state(&mut self) -> &mut S {
        self.state
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SimError> {
        self.resources.get(id)
    }

    /// Free one unit of `id` held by the current process. A waiting requester
    /// is granted the unit immediately and resumed at the current time.
    pub fn release(&mut self, id: ResourceId) -> Result<(), SimError> {
        let resource = self.resources.get_mut(id)?;
        if let Some(next) = resource.release(self.process, self.now)? {
            debug!("{} handed {} to {}", self.process, id, next);
            self.scheduler
                .schedule_event(Event::new(next, EventKind::Granted(id)), self.now);
        }
        Ok(())
    }

    /// Start a new process at the current time. The caller does not wait for it.
    pub fn spawn(&mut self, process: Box<dyn Process<S>>) {
        self.spawned.push(process);
    }
}
