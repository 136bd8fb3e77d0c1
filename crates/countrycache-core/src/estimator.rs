//! Estimated GDP derivation.
//!
//! The estimate is `population * multiplier / exchange_rate`. The multiplier
//! is never read from an ambient random source: callers pass a
//! [`GdpMultiplier`] and the refresh cycle draws from a [`MultiplierDraw`]
//! built once per cycle.

use crate::ValidationError;

pub const DEFAULT_MULTIPLIER_MIN: f64 = 1000.0;
pub const DEFAULT_MULTIPLIER_MAX: f64 = 2000.0;

/// Estimated GDP for one country.
///
/// `exchange_rate` must be a known, strictly positive rate; the caller decides
/// what a missing rate means.
pub fn estimate(population: u64, exchange_rate: f64, multiplier: f64) -> f64 {
    population as f64 * multiplier / exchange_rate
}

/// How the per-record multiplier is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GdpMultiplier {
    /// Every record uses the same value.
    Fixed(f64),
    /// Each record draws uniformly from `[min, max)`.
    ///
    /// Without a seed the generator is seeded from the cycle timestamp.
    Uniform {
        min: f64,
        max: f64,
        seed: Option<u64>,
    },
}

impl Default for GdpMultiplier {
    fn default() -> Self {
        Self::Uniform {
            min: DEFAULT_MULTIPLIER_MIN,
            max: DEFAULT_MULTIPLIER_MAX,
            seed: None,
        }
    }
}

impl GdpMultiplier {
    pub fn fixed(value: f64) -> Result<Self, ValidationError> {
        let multiplier = Self::Fixed(value);
        multiplier.validate()?;
        Ok(multiplier)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Fixed(value) => check_bound(value, "gdp_multiplier"),
            Self::Uniform { min, max, .. } => {
                check_bound(min, "gdp_multiplier.min")?;
                check_bound(max, "gdp_multiplier.max")?;
                if min > max {
                    return Err(ValidationError::EmptyMultiplierRange {
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Start the draw sequence for one refresh cycle.
    pub fn draw_for_cycle(&self, cycle_seed: u64) -> MultiplierDraw {
        match *self {
            Self::Fixed(value) => MultiplierDraw::Fixed(value),
            Self::Uniform { min, max, seed } => MultiplierDraw::Uniform {
                rng: fastrand::Rng::with_seed(seed.unwrap_or(cycle_seed)),
                min,
                max,
            },
        }
    }
}

fn check_bound(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

/// Multiplier sequence scoped to one refresh cycle.
#[derive(Debug, Clone)]
pub enum MultiplierDraw {
    Fixed(f64),
    Uniform {
        rng: fastrand::Rng,
        min: f64,
        max: f64,
    },
}

impl MultiplierDraw {
    pub fn sample(&mut self) -> f64 {
        match self {
            Self::Fixed(value) => *value,
            Self::Uniform { rng, min, max } => *min + rng.f64() * (*max - *min),
        }
    }
}
