//! Main and two-factor interaction effects of a two-level factorial design.
//!
//! Factor columns are coded to -1 (low level) and +1 (high level). The effect
//! of a factor is the sum of `coded * response` over all rows divided by half
//! the row count; an interaction uses the product of two coded columns.

use super::dataset::Dataset;
use crate::core::errors::SimError;
use log::warn;
use std::collections::BTreeMap;

/// Effects estimated from one dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTable {
    pub main_effects: BTreeMap<String, f64>,
    /// Keyed by factor pairs in dataset column order
    pub interaction_effects: BTreeMap<(String, String), f64>,
}

impl EffectTable {
    pub fn main_effect(&self, factor: &str) -> Option<f64> {
        self.main_effects.get(factor).copied()
    }

    /// Interaction of two factors, in either order
    pub fn interaction_effect(&self, first: &str, second: &str) -> Option<f64> {
        let key = |a: &str, b: &str| (a.to_string(), b.to_string());
        self.interaction_effects
            .get(&key(first, second))
            .or_else(|| self.interaction_effects.get(&key(second, first)))
            .copied()
    }
}

/// Distinct values of a column, ascending
fn distinct_levels(column: &[f64]) -> Vec<f64> {
    let mut levels = column.to_vec();
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    levels
}

/// Recode every factor column to {-1, +1}.
///
/// Each column must hold exactly two distinct values: the smaller becomes -1
/// and the larger +1. Already coded data passes through unchanged.
pub fn code_dataset(dataset: &Dataset) -> Result<Dataset, SimError> {
    if dataset.factor_names().is_empty() {
        return Err(SimError::NoFactors);
    }
    if dataset.is_empty() {
        return Err(SimError::EmptyDataset);
    }

    let mut bounds = Vec::with_capacity(dataset.factor_names().len());
    for (index, name) in dataset.factor_names().iter().enumerate() {
        let levels = distinct_levels(&dataset.column(index));
        if levels.len() != 2 || levels.iter().any(|level| !level.is_finite()) {
            return Err(SimError::NotTwoLevels {
                factor: name.clone(),
                found: levels.len(),
            });
        }
        bounds.push(levels[0]);
    }

    let mut coded = Dataset::new(
        dataset.factor_names().to_vec(),
        dataset.response_name(),
    );
    for row in dataset.rows() {
        let levels = row
            .levels
            .iter()
            .zip(&bounds)
            .map(|(&value, &low)| if value == low { -1.0 } else { 1.0 })
            .collect();
        coded.push_row(levels, row.response)?;
    }

    check_balance(&coded);
    Ok(coded)
}

fn check_balance(coded: &Dataset) {
    let rows = coded.len();
    let factors = coded.factor_names().len() as u32;
    let full = 1usize.checked_shl(factors).unwrap_or(usize::MAX);
    if !rows.is_power_of_two() || rows < full {
        warn!(
            "{} rows cannot form a full factorial over {} factors; effects may be biased",
            rows, factors
        );
    }
    for (index, name) in coded.factor_names().iter().enumerate() {
        let high = coded.column(index).iter().filter(|&&value| value > 0.0).count();
        if high * 2 != rows {
            warn!(
                "factor '{}' is unbalanced: {} of {} rows at the high level",
                name, high, rows
            );
        }
    }
}

/// Estimate effects from an already coded dataset
pub fn estimate_effects(coded: &Dataset) -> EffectTable {
    let names = coded.factor_names();
    let half = coded.len() as f64 / 2.0;
    let contrast = |weights: &dyn Fn(&[f64]) -> f64| -> f64 {
        coded
            .rows()
            .iter()
            .map(|row| weights(&row.levels) * row.response / half)
            .sum()
    };

    let mut table = EffectTable::default();
    for (i, name) in names.iter().enumerate() {
        table
            .main_effects
            .insert(name.clone(), contrast(&|levels| levels[i]));
    }
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            table.interaction_effects.insert(
                (names[i].clone(), names[j].clone()),
                contrast(&|levels| levels[i] * levels[j]),
            );
        }
    }
    table
}

/// Code a raw or coded dataset and estimate its main and interaction effects
pub fn analyze(dataset: &Dataset) -> Result<EffectTable, SimError> {
    let coded = code_dataset(dataset)?;
    Ok(estimate_effects(&coded))
}
