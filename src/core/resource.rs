use super::errors::SimError;
use super::types::{ProcessId, ResourceId, SimTime};
use std::collections::VecDeque;

/// Bounded-capacity contention point with a FIFO wait queue.
///
/// At most `capacity` processes hold a unit at any time. Freed units always go
/// to the longest-waiting requester first.
#[derive(Debug, Clone)]
pub struct Resource {
    id: ResourceId,
    name: String,
    capacity: usize,
    /// Current holders and the time each unit was granted
    users: Vec<(ProcessId, SimTime)>,
    /// Requesters waiting for a unit, oldest first
    queue: VecDeque<ProcessId>,
    /// Unit-seconds spent held, accumulated on release
    busy_time: f64,
    total_grants: u64,
}

impl Resource {
    /// Create a resource; capacities below one are raised to one
    pub fn new(id: ResourceId, name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            capacity: capacity.max(1),
            users: Vec::new(),
            queue: VecDeque::new(),
            busy_time: 0.0,
            total_grants: 0,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of units currently reserved
    pub fn in_use(&self) -> usize {
        self.users.len()
    }

    /// Number of requesters waiting for a unit
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_full(&self) -> bool {
        self.users.len() >= self.capacity
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }

    /// Check whether the process holds at least one unit
    pub fn holds(&self, process: ProcessId) -> bool {
        self.users.iter().any(|(holder, _)| *holder == process)
    }

    /// Request a unit. Returns true when it was reserved immediately, false
    /// when the process was appended to the wait queue.
    pub fn request(&mut self, process: ProcessId, now: SimTime) -> bool {
        // A non-empty queue means someone has been waiting longer
        if !self.is_full() && self.queue.is_empty() {
            self.grant(process, now);
            true
        } else {
            self.queue.push_back(process);
            false
        }
    }

    /// Free one unit held by `process`. If anyone is waiting, the head of the
    /// queue is granted the unit at the same instant and returned.
    pub fn release(
        &mut self,
        process: ProcessId,
        now: SimTime,
    ) -> Result<Option<ProcessId>, SimError> {
        let position = self
            .users
            .iter()
            .position(|(holder, _)| *holder == process)
            .ok_or(SimError::NotHolder {
                process,
                resource: self.id,
            })?;

        let (_, granted_at) = self.users.swap_remove(position);
        self.busy_time += (now - granted_at).max(0.0);

        match self.queue.pop_front() {
            Some(next) => {
                self.grant(next, now);
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    fn grant(&mut self, process: ProcessId, now: SimTime) {
        self.users.push((process, now));
        self.total_grants += 1;
    }
}

/// Resources of one engine, indexed by [`ResourceId`]
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    resources: Vec<Resource>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return its handle
    pub fn add(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource::new(id, name, capacity));
        id
    }

    pub fn get(&self, id: ResourceId) -> Result<&Resource, SimError> {
        self.resources.get(id.0).ok_or(SimError::UnknownResource(id))
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Result<&mut Resource, SimError> {
        self.resources
            .get_mut(id.0)
            .ok_or(SimError::UnknownResource(id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        self.resources.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: u64) -> ProcessId {
        ProcessId(raw)
    }

    #[test]
    fn test_pool_assigns_sequential_ids() {
        let mut pool = ResourcePool::new();
        let terminals = pool.add("terminals", 2);
        let chefs = pool.add("chefs", 3);
        assert_eq!(terminals.index(), 0);
        assert_eq!(chefs.index(), 1);
        assert_eq!(pool.get(chefs).unwrap().capacity(), 3);
        assert!(matches!(
            pool.get(ResourceId(7)),
            Err(SimError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        let resource = Resource::new(ResourceId(0), "chefs", 0);
        assert_eq!(resource.capacity(), 1);
    }

    #[test]
    fn test_request_grants_until_full() {
        let mut resource = Resource::new(ResourceId(0), "terminals", 2);
        assert!(resource.request(pid(1), 0.0));
        assert!(resource.request(pid(2), 0.0));
        assert!(!resource.request(pid(3), 0.0));
        assert_eq!(resource.in_use(), 2);
        assert_eq!(resource.queue_len(), 1);
    }

    #[test]
    fn test_release_hands_unit_to_oldest_waiter() {
        let mut resource = Resource::new(ResourceId(0), "services", 1);
        assert!(resource.request(pid(1), 0.0));
        assert!(!resource.request(pid(2), 1.0));
        assert!(!resource.request(pid(3), 2.0));

        let next = resource.release(pid(1), 5.0).unwrap();
        assert_eq!(next, Some(pid(2)));
        assert!(resource.holds(pid(2)));
        assert_eq!(resource.in_use(), 1);

        let next = resource.release(pid(2), 7.0).unwrap();
        assert_eq!(next, Some(pid(3)));
        assert_eq!(resource.busy_time(), 7.0);
    }

    #[test]
    fn test_release_without_holding_fails() {
        let mut resource = Resource::new(ResourceId(4), "chefs", 1);
        let result = resource.release(pid(9), 0.0);
        assert!(matches!(result, Err(SimError::NotHolder { .. })));
    }

    #[test]
    fn test_free_unit_is_not_taken_past_waiters() {
        let mut resource = Resource::new(ResourceId(0), "chefs", 1);
        assert!(resource.request(pid(1), 0.0));
        assert!(!resource.request(pid(2), 0.0));
        // pid 2 is granted inside release, so the unit is never seen as free
        resource.release(pid(1), 1.0).unwrap();
        assert!(!resource.request(pid(3), 1.0));
        assert_eq!(resource.queue_len(), 1);
    }
}
