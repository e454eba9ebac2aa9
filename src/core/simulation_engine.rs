use super::errors::SimError;
use super::event::{Event, EventKind};
use super::event_scheduler::EventScheduler;
use super::process::{Context, Process, Step};
use super::resource::{Resource, ResourcePool};
use super::types::{ProcessId, ResourceId, SimTime};
use log::debug;
use std::collections::HashMap;

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when simulated time advances
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called after each resumption has been handled
    fn on_step_complete(&mut self, time: SimTime, pending_events: usize);
}

/// Single-threaded discrete-event engine.
///
/// Owns the model state `S`, every resource and every live process. Pending
/// resumptions are popped earliest-first; ties resolve in scheduling order.
pub struct Simulation<S> {
    state: S,
    scheduler: EventScheduler,
    resources: ResourcePool,
    processes: HashMap<ProcessId, Box<dyn Process<S>>>,
    next_process_id: u64,
    now: SimTime,
    events_processed: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<S> Simulation<S> {
    /// Create an engine at time zero around the given model state
    pub fn new(state: S) -> Self {
        Self::with_resources(ResourcePool::new(), state)
    }

    /// Create an engine whose state is built from the resources it registers,
    /// so the state can keep their handles
    pub fn build<F>(setup: F) -> Self
    where
        F: FnOnce(&mut ResourcePool) -> S,
    {
        let mut resources = ResourcePool::new();
        let state = setup(&mut resources);
        Self::with_resources(resources, state)
    }

    fn with_resources(resources: ResourcePool, state: S) -> Self {
        Self {
            state,
            scheduler: EventScheduler::new(),
            resources,
            processes: HashMap::new(),
            next_process_id: 0,
            now: 0.0,
            events_processed: 0,
            observers: Vec::new(),
        }
    }

    /// Register a resource and return its handle
    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        self.resources.add(name, capacity)
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SimError> {
        self.resources.get(id)
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Register a process and schedule its first resumption at the current time
    pub fn spawn(&mut self, process: Box<dyn Process<S>>) -> ProcessId {
        let id = ProcessId(self.next_process_id);
        self.next_process_id += 1;
        debug!("spawn {} '{}' at {:.3}", id, process.name(), self.now);
        self.processes.insert(id, process);
        self.scheduler
            .schedule_event(Event::new(id, EventKind::Start), self.now);
        id
    }

    /// Run until simulated time reaches `until`. Events due at or after the
    /// horizon are left unprocessed and processes still suspended are abandoned.
    pub fn run(&mut self, until: SimTime) -> Result<SimTime, SimError> {
        while let Some(due) = self.scheduler.peek_next_due() {
            if due >= until {
                break;
            }
            self.step()?;
        }

        if until > self.now {
            let old_time = self.now;
            self.now = until;
            self.notify_time_advance(old_time, until);
        }
        Ok(self.now)
    }

    /// Process one resumption, returns true if events remain
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some((due, event)) = self.scheduler.pop_next() else {
            return Ok(false);
        };

        if due > self.now {
            let old_time = self.now;
            self.now = due;
            self.notify_time_advance(old_time, due);
        }

        self.dispatch(event)?;
        self.events_processed += 1;

        let pending = self.scheduler.len();
        self.notify_step_complete(self.now, pending);
        Ok(self.scheduler.has_events())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), SimError> {
        let id = event.process;
        let mut process = self
            .processes
            .remove(&id)
            .ok_or(SimError::UnknownProcess(id))?;

        debug!(
            "t={:.3} resume {} '{}' ({:?})",
            self.now,
            id,
            process.name(),
            event.kind
        );

        let mut ctx = Context {
            now: self.now,
            process: id,
            state: &mut self.state,
            resources: &mut self.resources,
            scheduler: &mut self.scheduler,
            spawned: Vec::new(),
        };
        let step = process.resume(&mut ctx);
        let spawned = std::mem::take(&mut ctx.spawned);

        for child in spawned {
            self.spawn(child);
        }

        match step? {
            Step::Delay(delay) => {
                if !delay.is_finite() || delay < 0.0 {
                    return Err(SimError::InvalidDelay(delay));
                }
                self.scheduler
                    .schedule_event(Event::new(id, EventKind::Timeout), self.now + delay);
                self.processes.insert(id, process);
            }
            Step::Acquire(resource_id) => {
                let resource = self.resources.get_mut(resource_id)?;
                if resource.request(id, self.now) {
                    self.scheduler
                        .schedule_event(Event::new(id, EventKind::Granted(resource_id)), self.now);
                } else {
                    debug!("{} queued on {} ({} waiting)", id, resource_id, resource.queue_len());
                }
                self.processes.insert(id, process);
            }
            Step::Done => self.finish(id)?,
        }
        Ok(())
    }

    /// Release every unit still held by a finished process
    fn finish(&mut self, id: ProcessId) -> Result<(), SimError> {
        for resource in self.resources.iter_mut() {
            while resource.holds(id) {
                debug!("{} finished holding {}, releasing", id, resource.id());
                if let Some(next) = resource.release(id, self.now)? {
                    self.scheduler
                        .schedule_event(Event::new(next, EventKind::Granted(resource.id())), self.now);
                }
            }
        }
        Ok(())
    }

    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    fn notify_step_complete(&mut self, time: SimTime, pending_events: usize) {
        for observer in &mut self.observers {
            observer.on_step_complete(time, pending_events);
        }
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Number of processes that have started but not finished
    pub fn live_processes(&self) -> usize {
        self.processes.len()
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}
