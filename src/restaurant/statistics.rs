use serde::{Deserialize, Serialize};

/// Mean wait rounded to whole seconds and split into minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTime {
    pub minutes: u64,
    pub seconds: u64,
}

impl WaitTime {
    pub fn from_seconds(seconds: f64) -> Self {
        let total = seconds.max(0.0).round_ties_even() as u64;
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for WaitTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Accumulators of one simulation run
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Wait of each completed order, in seconds
    pub wait_times: Vec<f64>,
    /// Customers in the system, sampled at each arrival and completion
    pub request_counts: Vec<usize>,
    /// Customers currently between arrival and completion
    pub in_system: usize,
    /// Customers who left without ordering
    pub abandoned: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self) {
        self.in_system += 1;
        self.request_counts.push(self.in_system);
    }

    pub fn record_completion(&mut self, wait_time: f64) {
        self.in_system = self.in_system.saturating_sub(1);
        self.request_counts.push(self.in_system);
        self.wait_times.push(wait_time);
    }

    pub fn record_abandonment(&mut self) {
        self.abandoned += 1;
    }

    pub fn completed(&self) -> usize {
        self.wait_times.len()
    }

    /// Mean wait in seconds, `None` before the first completion
    pub fn mean_wait(&self) -> Option<f64> {
        mean(self.wait_times.iter().copied())
    }

    /// Mean number of customers in the system over all samples
    pub fn avg_requests(&self) -> Option<f64> {
        mean(self.request_counts.iter().map(|count| *count as f64))
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    Some(values.sum::<f64>() / count as f64)
}
