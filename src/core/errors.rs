use super::types::{ProcessId, ResourceId};
use thiserror::Error;

/// Errors raised while configuring or running a simulation or an experiment
#[derive(Debug, Error)]
pub enum SimError {
    #[error("menu has no items")]
    EmptyMenu,

    #[error("invalid menu item '{name}': {reason}")]
    InvalidMenuItem { name: String, reason: String },

    #[error("menu item '{0}' is already registered")]
    DuplicateMenuItem(String),

    #[error("menu item '{0}' not found")]
    UnknownMenuItem(String),

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("{0} is not registered")]
    UnknownProcess(ProcessId),

    #[error("{0} is not registered")]
    UnknownResource(ResourceId),

    #[error("{process} does not hold a unit of {resource}")]
    NotHolder {
        process: ProcessId,
        resource: ResourceId,
    },

    #[error("delay must be finite and non-negative, got {0}")]
    InvalidDelay(f64),

    #[error("no orders were completed before the horizon")]
    NoCompletedOrders,

    #[error("experiment has no factors")]
    NoFactors,

    #[error("{0} factors give more cells than can be enumerated")]
    TooManyFactors(usize),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("row {row} has {found} factor values, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("factor '{factor}' must have exactly two levels, found {found}")]
    NotTwoLevels { factor: String, found: usize },

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("dataset parse error: {0}")]
    Parse(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
