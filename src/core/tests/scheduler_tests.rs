// Tests for EventScheduler ordering
#[cfg(test)]
mod tests {
    use crate::core::event::{Event, EventKind};
    use crate::core::event_scheduler::EventScheduler;
    use crate::core::types::ProcessId;

    fn resume(raw: u64) -> Event {
        Event::new(ProcessId(raw), EventKind::Timeout)
    }

    #[test]
    fn test_pops_earliest_first() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_event(resume(1), 30.0);
        scheduler.schedule_event(resume(2), 10.0);
        scheduler.schedule_event(resume(3), 20.0);

        let order: Vec<u64> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|(_, event)| event.process.raw())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_resolve_in_scheduling_order() {
        let mut scheduler = EventScheduler::new();
        for raw in 0..5 {
            scheduler.schedule_event(resume(raw), 7.5);
        }
        scheduler.schedule_event(resume(99), 1.0);

        assert_eq!(scheduler.peek_next_due(), Some(1.0));
        let (_, first) = scheduler.pop_next().unwrap();
        assert_eq!(first.process.raw(), 99);

        let order: Vec<u64> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|(_, event)| event.process.raw())
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_scheduler() {
        let mut scheduler = EventScheduler::default();
        assert!(!scheduler.has_events());
        assert_eq!(scheduler.peek_next_due(), None);
        assert!(scheduler.pop_next().is_none());

        scheduler.schedule_event(resume(1), 0.0);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.pop_next().is_some());
        assert!(!scheduler.has_events());
    }
}
