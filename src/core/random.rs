//! Sampling helpers shared by every stochastic part of the model.

use super::errors::SimError;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use rand_distr::Exp;

/// Draw a duration from an exponential distribution with the given mean.
///
/// A non-positive or non-finite mean yields zero, so a service time clamped
/// to zero takes no simulated time.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    if !mean.is_finite() || mean <= 0.0 {
        return 0.0;
    }
    match Exp::new(1.0 / mean) {
        Ok(distribution) => distribution.sample(rng),
        Err(_) => 0.0,
    }
}

/// Pick one value with probability proportional to its weight.
///
/// Weights need not sum to one, but must be finite, non-negative and not all
/// zero.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    choices: &'a [(T, f64)],
) -> Result<&'a T, SimError> {
    let index = WeightedIndex::new(choices.iter().map(|(_, weight)| *weight))
        .map_err(|err| SimError::InvalidWeights(err.to_string()))?;
    Ok(&choices[index.sample(rng)].0)
}

/// Restrict `value` to `[lower, upper]`; either bound may be omitted.
pub fn clamp(value: f64, lower: Option<f64>, upper: Option<f64>) -> f64 {
    let value = lower.map_or(value, |lower| value.max(lower));
    upper.map_or(value, |upper| value.min(upper))
}
