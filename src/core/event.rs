use super::types::{ProcessId, ResourceId};

/// Why a process is being resumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// First resumption of a freshly spawned process
    Start,
    /// A timed delay has elapsed
    Timeout,
    /// A unit of the resource has been reserved for the process
    Granted(ResourceId),
}

/// A pending resumption of one process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub process: ProcessId,
    pub kind: EventKind,
}

impl Event {
    pub fn new(process: ProcessId, kind: EventKind) -> Self {
        Self { process, kind }
    }
}
