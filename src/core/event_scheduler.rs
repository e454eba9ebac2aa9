use super::event::Event;
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub due: SimTime,
    pub sequence_num: u64,
    pub event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered queue of pending resumptions.
///
/// Events due at the same instant come out in the order they were scheduled.
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule an event at an absolute simulated time
    pub fn schedule_event(&mut self, event: Event, due: SimTime) {
        let scheduled_event = ScheduledEvent {
            due,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Remove and return the earliest-due event
    pub fn pop_next(&mut self) -> Option<(SimTime, Event)> {
        self.event_queue
            .pop()
            .map(|scheduled| (scheduled.due, scheduled.event))
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Get the due time of the next event without removing it
    pub fn peek_next_due(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.due)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.event_queue.len()
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
